// crates/netplane-core/src/topology.rs
// ============================================================================
// Module: Netplane Topology Model
// Description: Reconciled node/link graph with liveness status.
// Purpose: Provide upsert and staleness semantics for topology snapshots.
// Dependencies: serde, serde_json, thiserror, crate::model
// ============================================================================

//! ## Overview
//! The topology [`Graph`] is the reconciled set of nodes (agents) and links
//! (observed adjacencies) with liveness status. Reconciliation upserts nodes
//! and links from streamed results; a periodic staleness reset demotes
//! everything so agents that stop reporting visibly decay.
//! Invariants:
//! - An `ACTIVE` node is never downgraded by an upsert; only
//!   [`Graph::reset_stale`] can transition `ACTIVE` to `INACTIVE`.
//! - Link identity is undirected: `(A,B)` and `(B,A)` are the same link.
//! - Snapshots round-trip through JSON preserving node/link membership.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::model::identifiers::NodeId;

// ============================================================================
// SECTION: Status Enums
// ============================================================================

/// Liveness status of a topology node.
///
/// # Invariants
/// - Promotion to `Active` happens only on fresh observation.
/// - Demotion to `Inactive` happens only via the periodic reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeStatus {
    /// Freshly observed and reporting.
    Active,
    /// Known by reference only, or aged out by the periodic reset.
    Inactive,
}

/// Liveness status of a topology link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkStatus {
    /// Link observed up.
    Up,
    /// Link observed down, or aged out by the periodic reset.
    Down,
}

impl LinkStatus {
    /// Parses a link status cell case-insensitively.
    ///
    /// Returns `None` for values that are neither `UP` nor `DOWN`.
    #[must_use]
    pub fn parse_cell(cell: &str) -> Option<Self> {
        match cell.to_ascii_uppercase().as_str() {
            "UP" => Some(Self::Up),
            "DOWN" => Some(Self::Down),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Node and Link
// ============================================================================

/// Topology vertex.
///
/// # Invariants
/// - `id` equals the node name for reconciler-created nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier.
    pub id: NodeId,
    /// Node name (agent name segment).
    pub name: String,
    /// Node type (agent type segment, or the untyped sentinel).
    #[serde(rename = "type")]
    pub kind: String,
    /// Liveness status.
    pub status: NodeStatus,
}

/// Topology edge between two nodes.
///
/// # Invariants
/// - Identity is undirected: `{src, dst}` set equality.
/// - Direction is preserved as stored for path computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link identifier.
    pub id: String,
    /// Source node reference (by id).
    #[serde(rename = "src")]
    pub source: NodeId,
    /// Target node reference (by id).
    #[serde(rename = "dst")]
    pub target: NodeId,
    /// Liveness status.
    pub status: LinkStatus,
}

impl Link {
    /// Returns true when the link joins the same unordered endpoint pair.
    #[must_use]
    pub fn joins(&self, a: &NodeId, b: &NodeId) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }
}

// ============================================================================
// SECTION: Graph Errors
// ============================================================================

/// Errors produced while decoding a graph snapshot.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Snapshot JSON did not match the expected shape.
    #[error("invalid graph snapshot: {0}")]
    InvalidSnapshot(String),
}

// ============================================================================
// SECTION: Graph
// ============================================================================

/// Serialized form of a graph snapshot (`{"nodes": [...], "links": [...]}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphSnapshot {
    /// Snapshot nodes in unspecified order.
    nodes: Vec<Node>,
    /// Snapshot links in stored order.
    links: Vec<Link>,
}

/// Reconciled topology graph: nodes keyed by id plus a link list.
///
/// # Invariants
/// - Owned by a single reconciliation task; readers consume snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GraphSnapshot", into = "GraphSnapshot")]
pub struct Graph {
    /// Nodes keyed by identifier.
    nodes: BTreeMap<NodeId, Node>,
    /// Links in observation order.
    links: Vec<Link>,
}

impl From<GraphSnapshot> for Graph {
    fn from(snapshot: GraphSnapshot) -> Self {
        let nodes = snapshot.nodes.into_iter().map(|node| (node.id.clone(), node)).collect();
        Self {
            nodes,
            links: snapshot.links,
        }
    }
}

impl From<Graph> for GraphSnapshot {
    fn from(graph: Graph) -> Self {
        Self {
            nodes: graph.nodes.into_values().collect(),
            links: graph.links,
        }
    }
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a graph from a JSON snapshot value.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidSnapshot`] when the value does not match
    /// the `{"nodes": [...], "links": [...]}` shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, GraphError> {
        serde_json::from_value(value).map_err(|err| GraphError::InvalidSnapshot(err.to_string()))
    }

    /// Encodes the graph as a JSON snapshot value.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidSnapshot`] when encoding fails.
    pub fn to_value(&self) -> Result<serde_json::Value, GraphError> {
        serde_json::to_value(self).map_err(|err| GraphError::InvalidSnapshot(err.to_string()))
    }

    /// Returns true when both the node set and the link list are non-empty.
    #[must_use]
    pub fn is_set(&self) -> bool {
        !(self.nodes.is_empty() || self.links.is_empty())
    }

    /// Returns the nodes keyed by identifier.
    #[must_use]
    pub const fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    /// Returns the links in stored order.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Looks up a node by identifier.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Upserts a node.
    ///
    /// An existing `ACTIVE` node is kept as-is: upserts never downgrade a
    /// live node, only the periodic reset does. An existing `INACTIVE` node
    /// is replaced, and absent nodes are inserted.
    pub fn upsert_node(&mut self, node: Node) {
        match self.nodes.get(&node.id) {
            Some(existing) if existing.status == NodeStatus::Active => {}
            _ => {
                self.nodes.insert(node.id.clone(), node);
            }
        }
    }

    /// Upserts a link by undirected endpoint identity.
    ///
    /// A link joining the same unordered endpoint pair is replaced in place,
    /// status included; otherwise the link is appended.
    pub fn upsert_link(&mut self, link: Link) {
        match self.links.iter_mut().find(|known| known.joins(&link.source, &link.target)) {
            Some(slot) => *slot = link,
            None => self.links.push(link),
        }
    }

    /// Removes a node by identifier along with every link touching it.
    ///
    /// Returns the removed node when it existed.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<Node> {
        let removed = self.nodes.remove(id);
        if removed.is_some() {
            self.links.retain(|link| &link.source != id && &link.target != id);
        }
        removed
    }

    /// Removes a link by undirected endpoint identity.
    ///
    /// Returns the removed link when it existed.
    pub fn remove_link(&mut self, a: &NodeId, b: &NodeId) -> Option<Link> {
        let index = self.links.iter().position(|link| link.joins(a, b))?;
        Some(self.links.remove(index))
    }

    /// Demotes every node to `INACTIVE` and every link to `DOWN`.
    ///
    /// Idempotent: repeated resets leave the graph unchanged.
    pub fn reset_stale(&mut self) {
        for node in self.nodes.values_mut() {
            node.status = NodeStatus::Inactive;
        }
        for link in &mut self.links {
            link.status = LinkStatus::Down;
        }
    }
}
