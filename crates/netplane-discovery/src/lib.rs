// crates/netplane-discovery/src/lib.rs
// ============================================================================
// Module: Netplane Discovery Library
// Description: Capability rediscovery and the specification lifecycle.
// Purpose: Turn discovered capabilities into correlated result streams.
// Dependencies: netplane-broker, netplane-bus, netplane-core, tokio
// ============================================================================

//! ## Overview
//! Discovery is a loop, not a one-shot exchange: a periodic tick clears
//! stale state, rediscovers capabilities for the authenticated role, and
//! issues a renewed specification for each newly observed agent. The
//! lifecycle actor owns the active-specification registry and is the single
//! admission gate for streamed results; the data service actor exposes the
//! whole surface on the dispatch bus.
//! Invariants:
//! - A schema is registered at most once across active specifications.
//! - Results with unregistered schemas are dropped, never queued.
//! - Seen-set reset precedes refresh within a discovery tick.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod driver;
pub mod lifecycle;
pub mod registry;
pub mod service;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use driver::DiscoveryCadence;
pub use driver::DiscoveryDriver;
pub use lifecycle::LifecycleError;
pub use lifecycle::LifecycleHandle;
pub use lifecycle::spawn_lifecycle;
pub use lifecycle::spawn_lifecycle_with_events;
pub use registry::CapabilityRegistry;
pub use service::spawn_data_service;
pub use telemetry::DiscoveryEvents;
pub use telemetry::NoopDiscoveryEvents;
