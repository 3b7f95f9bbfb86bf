// crates/netplane-bus/src/lib.rs
// ============================================================================
// Module: Netplane Bus Library
// Description: In-process dispatch fabric connecting Netplane services.
// Purpose: Provide request/reply and publish/subscribe over service addresses.
// Dependencies: netplane-core, serde_json, tokio
// ============================================================================

//! ## Overview
//! The dispatch bus is the wiring contract between Netplane services and the
//! gateway/CLI surfaces: requests are `{action, params}` envelopes answered
//! exactly once with `{service, action, content | error}`, and snapshots are
//! published on well-known broadcast topics for passive subscribers.
//! Invariants:
//! - Every request resolves exactly once; unknown addresses resolve with an
//!   error response, never a hang.
//! - Publications are fire-and-forget; absent subscribers are not an error.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod addresses;
pub mod bus;
pub mod envelope;
pub mod storage;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use addresses::DATA_SERVICE;
pub use addresses::ROUTING_SERVICE;
pub use addresses::STORAGE_SERVICE;
pub use addresses::TOPOLOGY_SERVICE;
pub use addresses::TOPIC_LINK_DELETED;
pub use addresses::TOPIC_NODE_DELETED;
pub use addresses::TOPIC_PREFIXES_UPDATED;
pub use addresses::TOPIC_ROUTES_UPDATED;
pub use addresses::TOPIC_TOPOLOGY_UPDATED;
pub use bus::Bus;
pub use bus::BusRequest;
pub use bus::Publication;
pub use envelope::Request;
pub use envelope::Response;
pub use storage::StorageClient;
pub use storage::StorageError;
