// crates/netplane-core/src/model/mod.rs
// ============================================================================
// Module: Netplane Model
// Description: Wire model for the capability and specification lifecycle.
// Purpose: Group the message types exchanged with agents over the broker.
// Dependencies: crate submodules
// ============================================================================

//! ## Overview
//! The model module groups the message types that travel between the control
//! plane and remote agents: capability advertisements, specification tasks,
//! receipts, interrupts, and streamed measurement results, plus the routing
//! records delegated to storage.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod capability;
pub mod identifiers;
pub mod record;
pub mod routing;
pub mod schedule;
pub mod task;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use capability::Capability;
pub use identifiers::AgentId;
pub use identifiers::NodeId;
pub use identifiers::PrefixId;
pub use identifiers::RouteId;
pub use identifiers::SchemaId;
pub use record::Measurement;
pub use routing::PrefixRecord;
pub use routing::RouteRecord;
pub use routing::RouteStatus;
pub use schedule::Schedule;
pub use schedule::ScheduleError;
pub use schedule::ScheduleStart;
pub use task::Interrupt;
pub use task::Receipt;
pub use task::Specification;
