// crates/netplane-topology/src/lib.rs
// ============================================================================
// Module: Netplane Topology Library
// Description: Result-driven topology reconciliation and its bus surface.
// Purpose: Maintain and publish the live node/link graph.
// Dependencies: netplane-bus, netplane-core, tokio
// ============================================================================

//! ## Overview
//! Topology is reconciled, not declared: streamed results from
//! topology-producing specifications upsert nodes and links, a periodic
//! reset decays everything that stopped reporting, and every change
//! publishes a read-only snapshot for routing and passive subscribers.
//! Invariants:
//! - ACTIVE nodes are demoted only by the periodic reset.
//! - Link identity is undirected for upserts.
//! - Readers consume published snapshots, never live state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod reconciler;
pub mod service;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use reconciler::TopologyReconciler;
pub use service::spawn_topology_service;
