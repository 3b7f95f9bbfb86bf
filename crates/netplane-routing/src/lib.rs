// crates/netplane-routing/src/lib.rs
// ============================================================================
// Module: Netplane Routing Library
// Description: Route planning over the reconciled topology snapshot.
// Purpose: Validate, plan, and manage prefixes and routes.
// Dependencies: netplane-bus, netplane-core, tokio
// ============================================================================

//! ## Overview
//! Routing operates against read-only topology snapshots plus prefix/route
//! records held in storage. Manual routes are validated entity by entity;
//! automatic routes are planned with a uniform-weight Dijkstra over directed
//! adjacency. The service actor cascades topology deletions and republishes
//! the affected collections after every change.
//! Invariants:
//! - New records always enter storage as `pending`.
//! - Automatic routing is refused until the graph has been populated.
//! - Path computation is directed even though link identity is undirected.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod path;
pub mod planner;
pub mod service;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use path::ShortestPath;
pub use path::shortest_path;
pub use planner::RoutingError;
pub use planner::RoutingPlanner;
pub use service::spawn_routing_service;
