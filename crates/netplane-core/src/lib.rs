// crates/netplane-core/src/lib.rs
// ============================================================================
// Module: Netplane Core Library
// Description: Canonical data model for the Netplane control plane.
// Purpose: Define capabilities, specifications, receipts, results, and topology.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Netplane Core defines the wire-visible model shared by every Netplane
//! service: advertised [`Capability`] records, time-bounded [`Specification`]
//! tasks with their [`Receipt`] acknowledgments and [`Interrupt`]
//! cancellations, streamed [`Measurement`] results, and the reconciled
//! topology [`Graph`].
//! Invariants:
//! - A [`Receipt`] carrying errors is never treated as an accepted task.
//! - Schema identifiers correlate a receipt, its results, and any interrupt.
//! - Link identity is undirected; path computation treats links as directed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod model;
pub mod topology;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use model::AgentId;
pub use model::Capability;
pub use model::Interrupt;
pub use model::Measurement;
pub use model::NodeId;
pub use model::PrefixId;
pub use model::PrefixRecord;
pub use model::Receipt;
pub use model::RouteId;
pub use model::RouteRecord;
pub use model::RouteStatus;
pub use model::Schedule;
pub use model::ScheduleError;
pub use model::ScheduleStart;
pub use model::SchemaId;
pub use model::Specification;
pub use topology::Graph;
pub use topology::GraphError;
pub use topology::Link;
pub use topology::LinkStatus;
pub use topology::Node;
pub use topology::NodeStatus;
