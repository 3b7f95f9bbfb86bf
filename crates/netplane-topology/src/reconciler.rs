// crates/netplane-topology/src/reconciler.rs
// ============================================================================
// Module: Topology Reconciler
// Description: Result-driven node/link upsert and staleness decay.
// Purpose: Keep the live graph consistent with streamed agent results.
// Dependencies: netplane-core
// ============================================================================

//! ## Overview
//! The reconciler consumes correlated results for topology-producing
//! specifications and upserts the node/link graph. The reporting agent is
//! promoted to ACTIVE; targets it merely references are created INACTIVE
//! until they report for themselves. Staleness is handled by the periodic
//! reset, never by the absence of a single result. This is a continuous
//! loop: tick, maybe reset, rediscover, results stream in, snapshot out.

// ============================================================================
// SECTION: Imports
// ============================================================================

use netplane_core::AgentId;
use netplane_core::Graph;
use netplane_core::GraphError;
use netplane_core::Link;
use netplane_core::LinkStatus;
use netplane_core::Measurement;
use netplane_core::Node;
use netplane_core::NodeId;
use netplane_core::NodeStatus;

// ============================================================================
// SECTION: Topology Reconciler
// ============================================================================

/// Owns the live topology graph and applies result-driven upserts.
///
/// # Invariants
/// - An ACTIVE node is never downgraded by an upsert; only `reset_stale`
///   demotes.
/// - Link identity is undirected; re-observation replaces in place.
#[derive(Debug, Default)]
pub struct TopologyReconciler {
    /// Reconciled graph.
    graph: Graph,
}

impl TopologyReconciler {
    /// Creates a reconciler with an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the reconciled graph.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Applies one correlated result to the graph.
    ///
    /// The reporting agent is upserted ACTIVE; every row contributes its
    /// `target` node (INACTIVE when newly created) and the joining link with
    /// the row's status. Rows whose `target` or `status` cells are missing
    /// or unparseable are skipped. The owner publishes a fresh snapshot
    /// after every applied result.
    pub fn on_result(&mut self, result: &Measurement) {
        let (source_name, source_kind) = result.agent_id.split_node_identity();
        let source = NodeId::new(source_name);
        self.graph.upsert_node(Node {
            id: source.clone(),
            name: source_name.to_string(),
            kind: source_kind.to_string(),
            status: NodeStatus::Active,
        });
        for row in &result.rows {
            let Some(target_cell) = result.cell(row, "target") else {
                continue;
            };
            let Some(status) = result.cell(row, "status").and_then(LinkStatus::parse_cell) else {
                continue;
            };
            let target_agent = AgentId::new(target_cell);
            let (target_name, target_kind) = target_agent.split_node_identity();
            let target = NodeId::new(target_name);
            self.graph.upsert_node(Node {
                id: target.clone(),
                name: target_name.to_string(),
                kind: target_kind.to_string(),
                status: NodeStatus::Inactive,
            });
            self.graph.upsert_link(Link {
                id: format!("{source}--{target}"),
                source: source.clone(),
                target,
                status,
            });
        }
    }

    /// Marks every node INACTIVE and every link DOWN.
    ///
    /// Invoked immediately before the next discovery tick whenever the reset
    /// cadence elapses so silent agents visibly decay. Idempotent.
    pub fn reset_stale(&mut self) {
        self.graph.reset_stale();
    }

    /// Upserts a node directly (manual edit path).
    pub fn upsert_node(&mut self, node: Node) {
        self.graph.upsert_node(node);
    }

    /// Upserts a link directly (manual edit path).
    pub fn upsert_link(&mut self, link: Link) {
        self.graph.upsert_link(link);
    }

    /// Removes a node and every link touching it.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<Node> {
        self.graph.remove_node(id)
    }

    /// Removes the link joining the given endpoint pair.
    pub fn remove_link(&mut self, a: &NodeId, b: &NodeId) -> Option<Link> {
        self.graph.remove_link(a, b)
    }

    /// Renders the current graph as a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] when serialization fails.
    pub fn snapshot(&self) -> Result<serde_json::Value, GraphError> {
        self.graph.to_value()
    }
}
