// crates/netplane-broker/src/telemetry.rs
// ============================================================================
// Module: Broker Session Telemetry
// Description: Observability hooks for session lifecycle and calls.
// Purpose: Provide event hooks without hard observability dependencies.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This module exposes a thin event interface for session lifecycle and
//! request/reply calls. It is intentionally dependency-light so deployments
//! can plug in their metrics or logging backend without redesign; the default
//! implementation discards every event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use crate::session::Identity;

// ============================================================================
// SECTION: Event Labels
// ============================================================================

/// Outcome classification for a request/reply call.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// Reply arrived within the timeout.
    Reply,
    /// No reply arrived within the timeout.
    Timeout,
    /// The message could not be handed to the broker.
    SendFailed,
}

impl CallOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reply => "reply",
            Self::Timeout => "timeout",
            Self::SendFailed => "send_failed",
        }
    }
}

// ============================================================================
// SECTION: Session Events
// ============================================================================

/// Event hooks invoked by the broker session.
///
/// All hooks have no-op defaults; implementors override the ones they track.
pub trait SessionEvents: Send + Sync {
    /// Invoked after a successful broker connection.
    fn connected(&self, host: &str, port: u16) {
        let _ = (host, port);
    }

    /// Invoked after a successful authentication exchange.
    fn authenticated(&self, identity: &Identity) {
        let _ = identity;
    }

    /// Invoked when a request/reply call resolves.
    fn call_resolved(&self, destination: &str, outcome: CallOutcome, elapsed: Duration) {
        let _ = (destination, outcome, elapsed);
    }

    /// Invoked when the session closes.
    fn closed(&self) {}
}

/// Event sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSessionEvents;

impl SessionEvents for NoopSessionEvents {}
