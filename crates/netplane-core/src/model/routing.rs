// crates/netplane-core/src/model/routing.rs
// ============================================================================
// Module: Netplane Routing Records
// Description: Registered prefix and route records delegated to storage.
// Purpose: Model the routing entities the planner validates and stores.
// Dependencies: serde, crate::model
// ============================================================================

//! ## Overview
//! Routing operates on two stored record kinds: a [`PrefixRecord`] registers
//! an address block anchored at a node, and a [`RouteRecord`] provisions a
//! node path carrying traffic for a prefix. Both are persisted by storage;
//! the planner only validates and shapes them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::model::identifiers::NodeId;
use crate::model::identifiers::PrefixId;
use crate::model::identifiers::RouteId;

// ============================================================================
// SECTION: Route Status
// ============================================================================

/// Provisioning status of a routing record.
///
/// # Invariants
/// - New records always enter storage as [`RouteStatus::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    /// Recorded but not yet provisioned.
    Pending,
    /// Provisioned on the network.
    Installed,
}

// ============================================================================
// SECTION: Prefix Record
// ============================================================================

/// Registered routing prefix anchored at a topology node.
///
/// # Invariants
/// - `node` must exist in storage at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRecord {
    /// Prefix identifier.
    pub id: PrefixId,
    /// Human-readable prefix name (e.g. the address block).
    pub name: String,
    /// Node the prefix is anchored at.
    pub node: NodeId,
    /// Provisioning status.
    pub status: RouteStatus,
}

// ============================================================================
// SECTION: Route Record
// ============================================================================

/// Provisioned route carrying traffic for a prefix along a node path.
///
/// # Invariants
/// - Every node in `path` must exist in storage at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Route identifier.
    pub id: RouteId,
    /// Prefix the route carries traffic for.
    pub prefix: PrefixId,
    /// Node the route originates from.
    pub from_node: NodeId,
    /// Node the route terminates at.
    pub target_node: NodeId,
    /// Ordered node path from origin to target.
    pub path: Vec<NodeId>,
    /// Provisioning status.
    pub status: RouteStatus,
}
