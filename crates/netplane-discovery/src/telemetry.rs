// crates/netplane-discovery/src/telemetry.rs
// ============================================================================
// Module: Discovery Telemetry
// Description: Observability hooks for the discovery loop and admission gate.
// Purpose: Provide event hooks without hard observability dependencies.
// Dependencies: netplane-core, crate::lifecycle
// ============================================================================

//! ## Overview
//! This module exposes a thin event interface for the discovery loop and the
//! result admission gate. It is intentionally dependency-light so deployments
//! can plug in their metrics or logging backend without redesign; the default
//! implementation discards every event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use netplane_core::SchemaId;

use crate::lifecycle::LifecycleError;

// ============================================================================
// SECTION: Discovery Events
// ============================================================================

/// Event hooks invoked by the discovery loop and the lifecycle actor.
///
/// All hooks have no-op defaults; implementors override the ones they track.
pub trait DiscoveryEvents: Send + Sync {
    /// Invoked when an admitted result is forwarded downstream.
    fn result_admitted(&self, schema: &SchemaId) {
        let _ = schema;
    }

    /// Invoked when a result is dropped for an unregistered schema.
    fn result_dropped(&self, schema: &SchemaId) {
        let _ = schema;
    }

    /// Invoked when a discovery tick fails; the loop keeps running.
    fn tick_failed(&self, error: &LifecycleError) {
        let _ = error;
    }
}

/// Event sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiscoveryEvents;

impl DiscoveryEvents for NoopDiscoveryEvents {}
