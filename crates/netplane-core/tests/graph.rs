// crates/netplane-core/tests/graph.rs
// ============================================================================
// Module: Topology Graph Tests
// Description: Tests for graph upsert semantics, staleness, and snapshots.
// ============================================================================
//! ## Overview
//! Validates node promotion monotonicity, undirected link identity, reset
//! idempotence, and snapshot round trips.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeSet;

use netplane_core::Graph;
use netplane_core::Link;
use netplane_core::LinkStatus;
use netplane_core::Node;
use netplane_core::NodeId;
use netplane_core::NodeStatus;
use proptest::prelude::any;
use proptest::prelude::prop;
use proptest::prelude::proptest;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Builds a node with the given id and status.
fn node(id: &str, status: NodeStatus) -> Node {
    Node {
        id: NodeId::new(id),
        name: id.to_string(),
        kind: "router".to_string(),
        status,
    }
}

/// Builds a link between two node ids.
fn link(src: &str, dst: &str, status: LinkStatus) -> Link {
    Link {
        id: format!("{src}--{dst}"),
        source: NodeId::new(src),
        target: NodeId::new(dst),
        status,
    }
}

// ============================================================================
// SECTION: Node Upsert Tests
// ============================================================================

/// Tests node upsert inserts absent nodes.
#[test]
fn node_upsert_inserts_absent_node() {
    let mut graph = Graph::new();
    graph.upsert_node(node("R1", NodeStatus::Active));
    assert_eq!(graph.node(&NodeId::new("R1")).map(|n| n.status), Some(NodeStatus::Active));
}

/// Tests node upsert never downgrades an active node.
#[test]
fn node_upsert_never_downgrades_active_node() {
    let mut graph = Graph::new();
    graph.upsert_node(node("R1", NodeStatus::Active));
    graph.upsert_node(node("R1", NodeStatus::Inactive));
    assert_eq!(graph.node(&NodeId::new("R1")).map(|n| n.status), Some(NodeStatus::Active));
}

/// Tests node upsert promotes an inactive node.
#[test]
fn node_upsert_promotes_inactive_node() {
    let mut graph = Graph::new();
    graph.upsert_node(node("R1", NodeStatus::Inactive));
    graph.upsert_node(node("R1", NodeStatus::Active));
    assert_eq!(graph.node(&NodeId::new("R1")).map(|n| n.status), Some(NodeStatus::Active));
}

// ============================================================================
// SECTION: Link Upsert Tests
// ============================================================================

/// Tests link upsert with reversed endpoints updates the existing link.
#[test]
fn link_upsert_reversed_endpoints_updates_in_place() {
    let mut graph = Graph::new();
    graph.upsert_link(link("R1", "R2", LinkStatus::Down));
    graph.upsert_link(link("R2", "R1", LinkStatus::Up));
    assert_eq!(graph.links().len(), 1);
    assert_eq!(graph.links()[0].status, LinkStatus::Up);
}

/// Tests link upsert appends links with distinct endpoint pairs.
#[test]
fn link_upsert_appends_distinct_pairs() {
    let mut graph = Graph::new();
    graph.upsert_link(link("R1", "R2", LinkStatus::Up));
    graph.upsert_link(link("R2", "R3", LinkStatus::Up));
    assert_eq!(graph.links().len(), 2);
}

// ============================================================================
// SECTION: Staleness Reset Tests
// ============================================================================

/// Tests reset demotes every node and link, and is idempotent.
#[test]
fn reset_stale_is_idempotent() {
    let mut graph = Graph::new();
    graph.upsert_node(node("R1", NodeStatus::Active));
    graph.upsert_node(node("R2", NodeStatus::Active));
    graph.upsert_link(link("R1", "R2", LinkStatus::Up));

    graph.reset_stale();
    let once = graph.clone();
    graph.reset_stale();

    assert_eq!(graph, once);
    assert!(graph.nodes().values().all(|n| n.status == NodeStatus::Inactive));
    assert!(graph.links().iter().all(|l| l.status == LinkStatus::Down));
}

// ============================================================================
// SECTION: Removal Tests
// ============================================================================

/// Tests node removal drops the node and every touching link.
#[test]
fn remove_node_drops_touching_links() {
    let mut graph = Graph::new();
    graph.upsert_node(node("R1", NodeStatus::Active));
    graph.upsert_node(node("R2", NodeStatus::Active));
    graph.upsert_node(node("R3", NodeStatus::Active));
    graph.upsert_link(link("R1", "R2", LinkStatus::Up));
    graph.upsert_link(link("R2", "R3", LinkStatus::Up));

    let removed = graph.remove_node(&NodeId::new("R2"));
    assert!(removed.is_some());
    assert!(graph.links().is_empty());
}

/// Tests link removal honors undirected identity.
#[test]
fn remove_link_honors_undirected_identity() {
    let mut graph = Graph::new();
    graph.upsert_link(link("R1", "R2", LinkStatus::Up));
    let removed = graph.remove_link(&NodeId::new("R2"), &NodeId::new("R1"));
    assert!(removed.is_some());
    assert!(graph.links().is_empty());
}

// ============================================================================
// SECTION: Snapshot Round Trip Tests
// ============================================================================

/// Tests a graph survives a JSON snapshot round trip with equal membership.
#[test]
fn graph_round_trips_through_json_snapshot() {
    let mut graph = Graph::new();
    graph.upsert_node(node("R1", NodeStatus::Active));
    graph.upsert_node(node("R2", NodeStatus::Inactive));
    graph.upsert_link(link("R1", "R2", LinkStatus::Up));

    let value = graph.to_value().expect("encode snapshot");
    let decoded = Graph::from_value(value).expect("decode snapshot");

    let node_ids: BTreeSet<_> = graph.nodes().keys().cloned().collect();
    let decoded_ids: BTreeSet<_> = decoded.nodes().keys().cloned().collect();
    assert_eq!(node_ids, decoded_ids);
    assert_eq!(graph.links(), decoded.links());
}

/// Tests snapshot decoding rejects malformed values.
#[test]
fn graph_snapshot_rejects_malformed_value() {
    let err = Graph::from_value(serde_json::json!({"nodes": 7}));
    assert!(err.is_err());
}

/// Tests `is_set` requires both nodes and links.
#[test]
fn graph_is_set_requires_nodes_and_links() {
    let mut graph = Graph::new();
    assert!(!graph.is_set());
    graph.upsert_node(node("R1", NodeStatus::Active));
    assert!(!graph.is_set());
    graph.upsert_link(link("R1", "R2", LinkStatus::Up));
    assert!(graph.is_set());
}

// ============================================================================
// SECTION: Property Tests
// ============================================================================

proptest! {
    /// Upserting any sequence of links over a small id space never produces
    /// two links joining the same unordered endpoint pair.
    #[test]
    fn link_identity_stays_undirected(
        pairs in prop::collection::vec((0u8 .. 4, 0u8 .. 4, any::<bool>()), 0 .. 32)
    ) {
        let mut graph = Graph::new();
        for (a, b, up) in pairs {
            let status = if up { LinkStatus::Up } else { LinkStatus::Down };
            graph.upsert_link(link(&format!("N{a}"), &format!("N{b}"), status));
        }
        for (index, first) in graph.links().iter().enumerate() {
            for second in &graph.links()[index + 1 ..] {
                assert!(!first.joins(&second.source, &second.target));
            }
        }
    }
}
