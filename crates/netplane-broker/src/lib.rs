// crates/netplane-broker/src/lib.rs
// ============================================================================
// Module: Netplane Broker Library
// Description: Broker session primitives for the Netplane control plane.
// Purpose: Provide request/reply and subscribe primitives over a transport.
// Dependencies: netplane-core, async-trait, rand, serde_json, tokio
// ============================================================================

//! ## Overview
//! The broker crate owns one connection to the message broker and exposes the
//! two primitives every other Netplane component is built on: an ephemeral
//! request/reply [`BrokerSession::call`] and a durable
//! [`BrokerSession::subscribe`]. A [`LoopbackTransport`] reference
//! implementation routes messages in-process for tests and demos.
//! Invariants:
//! - Every call uses a fresh reply address; uniqueness is carried entirely by
//!   the address, not by broker-level request ids.
//! - Calls resolve exactly once: first reply, timeout, or send failure.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod loopback;
pub mod session;
pub mod telemetry;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use loopback::LoopbackBroker;
pub use loopback::LoopbackTransport;
pub use session::AUTHENTICATION_ADDRESS;
pub use session::CAPABILITIES_ADDRESS;
pub use session::BrokerSession;
pub use session::Identity;
pub use session::SessionError;
pub use telemetry::CallOutcome;
pub use telemetry::NoopSessionEvents;
pub use telemetry::SessionEvents;
pub use transport::Delivery;
pub use transport::Transport;
pub use transport::TransportError;
