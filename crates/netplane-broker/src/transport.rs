// crates/netplane-broker/src/transport.rs
// ============================================================================
// Module: Netplane Broker Transport
// Description: Backend-agnostic transport seam under the broker session.
// Purpose: Define connect/send/bind/close without embedding a wire protocol.
// Dependencies: async-trait, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! [`Transport`] abstracts the publish/subscribe broker under the session:
//! addressed sends with an optional reply-to, durable address bindings, and
//! connection lifecycle. Implementations must deliver per-address messages in
//! order; no ordering is guaranteed across addresses.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

// ============================================================================
// SECTION: Transport Errors
// ============================================================================

/// Errors surfaced by transport implementations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Broker refused or dropped the connection handshake.
    #[error("broker refused the connection: {0}")]
    Refused(String),
    /// Message could not be handed to the broker.
    #[error("broker send failed: {0}")]
    Send(String),
    /// Transport is closed.
    #[error("transport is closed")]
    Closed,
}

// ============================================================================
// SECTION: Delivery
// ============================================================================

/// One inbound message delivered on a bound address.
///
/// # Invariants
/// - `reply_to` carries the sender's ephemeral reply address when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Reply address supplied by the sender, if any.
    pub reply_to: Option<String>,
    /// Message body.
    pub body: Value,
}

// ============================================================================
// SECTION: Transport Trait
// ============================================================================

/// Backend-agnostic broker transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens the broker connection.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Refused`] when the handshake fails.
    async fn connect(&self, host: &str, port: u16) -> Result<(), TransportError>;

    /// Sends a message to an address with an optional reply-to address.
    ///
    /// Addresses without a bound consumer accept and discard the message;
    /// that is broker semantics, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the message cannot be handed over.
    async fn send(
        &self,
        to: &str,
        reply_to: Option<&str>,
        body: Value,
    ) -> Result<(), TransportError>;

    /// Binds a consumer to an address and returns its delivery stream.
    ///
    /// Rebinding an address replaces the previous consumer.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] when the transport is closed.
    async fn bind(&self, address: &str) -> Result<mpsc::Receiver<Delivery>, TransportError>;

    /// Releases the connection; must be safe to call at any lifecycle stage.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when teardown fails.
    async fn close(&self) -> Result<(), TransportError>;
}
