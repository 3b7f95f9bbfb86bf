// crates/netplane-routing/tests/path.rs
// ============================================================================
// Module: Shortest Path Tests
// Description: Tests for uniform-weight Dijkstra over directed adjacency.
// ============================================================================
//! ## Overview
//! Validates minimum-hop path selection, directedness, disconnection and
//! unknown-endpoint outcomes, and path validity over generated graphs.

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

use netplane_core::Graph;
use netplane_core::Link;
use netplane_core::LinkStatus;
use netplane_core::Node;
use netplane_core::NodeId;
use netplane_core::NodeStatus;
use netplane_routing::ShortestPath;
use netplane_routing::shortest_path;
use proptest::prelude::prop;
use proptest::prelude::proptest;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Builds a graph from directed edges, creating nodes as needed.
fn graph(edges: &[(&str, &str)]) -> Graph {
    let mut graph = Graph::new();
    for (source, target) in edges {
        for id in [source, target] {
            graph.upsert_node(Node {
                id: NodeId::new(*id),
                name: (*id).to_string(),
                kind: "router".to_string(),
                status: NodeStatus::Active,
            });
        }
        graph.upsert_link(Link {
            id: format!("{source}--{target}"),
            source: NodeId::new(*source),
            target: NodeId::new(*target),
            status: LinkStatus::Up,
        });
    }
    graph
}

/// Shorthand for a node id list.
fn ids(names: &[&str]) -> Vec<NodeId> {
    names.iter().map(|name| NodeId::new(*name)).collect()
}

// ============================================================================
// SECTION: Path Tests
// ============================================================================

#[test]
fn chain_yields_the_full_hop_sequence() {
    let graph = graph(&[("A", "B"), ("B", "C")]);
    let outcome = shortest_path(&graph, &NodeId::new("A"), &NodeId::new("C"));
    assert_eq!(outcome, ShortestPath::Path(ids(&["A", "B", "C"])));
}

#[test]
fn shorter_alternative_wins_over_a_longer_chain() {
    let graph = graph(&[("A", "B"), ("B", "C"), ("C", "D"), ("A", "D")]);
    let outcome = shortest_path(&graph, &NodeId::new("A"), &NodeId::new("D"));
    assert_eq!(outcome, ShortestPath::Path(ids(&["A", "D"])));
}

#[test]
fn edges_are_directed_for_path_computation() {
    let graph = graph(&[("A", "B")]);
    let outcome = shortest_path(&graph, &NodeId::new("B"), &NodeId::new("A"));
    assert_eq!(outcome, ShortestPath::NoPath);
}

#[test]
fn disconnected_endpoints_yield_no_path() {
    let graph = graph(&[("A", "B"), ("C", "D")]);
    let outcome = shortest_path(&graph, &NodeId::new("A"), &NodeId::new("D"));
    assert_eq!(outcome, ShortestPath::NoPath);
}

#[test]
fn unknown_endpoints_are_named() {
    let graph = graph(&[("A", "B")]);
    let outcome = shortest_path(&graph, &NodeId::new("A"), &NodeId::new("Z"));
    assert_eq!(outcome, ShortestPath::UnknownNode(NodeId::new("Z")));
    let outcome = shortest_path(&graph, &NodeId::new("Z"), &NodeId::new("B"));
    assert_eq!(outcome, ShortestPath::UnknownNode(NodeId::new("Z")));
}

#[test]
fn source_equal_to_target_yields_no_path() {
    let graph = graph(&[("A", "B")]);
    let outcome = shortest_path(&graph, &NodeId::new("A"), &NodeId::new("A"));
    assert_eq!(outcome, ShortestPath::NoPath);
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    /// Any returned path runs source to target along directed links.
    #[test]
    fn returned_paths_follow_directed_links(
        edges in prop::collection::vec((0_u8..8, 0_u8..8), 1..24),
        source in 0_u8..8,
        target in 0_u8..8,
    ) {
        let named: Vec<(String, String)> = edges
            .iter()
            .map(|(a, b)| (format!("N{a}"), format!("N{b}")))
            .collect();
        let borrowed: Vec<(&str, &str)> =
            named.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let graph = graph(&borrowed);
        let source = NodeId::new(format!("N{source}"));
        let target = NodeId::new(format!("N{target}"));

        if let ShortestPath::Path(path) = shortest_path(&graph, &source, &target) {
            assert!(path.len() >= 2);
            assert_eq!(path.first(), Some(&source));
            assert_eq!(path.last(), Some(&target));
            for hop in path.windows(2) {
                let followed = graph
                    .links()
                    .iter()
                    .any(|link| link.source == hop[0] && link.target == hop[1]);
                assert!(followed, "hop {:?} -> {:?} has no directed link", hop[0], hop[1]);
            }
        }
    }

    /// Dijkstra never returns a longer path than direct adjacency allows.
    #[test]
    fn direct_edges_bound_the_hop_count(
        edges in prop::collection::vec((0_u8..6, 0_u8..6), 1..16),
        endpoints in (0_u8..6, 0_u8..6),
    ) {
        let named: Vec<(String, String)> = edges
            .iter()
            .map(|(a, b)| (format!("N{a}"), format!("N{b}")))
            .collect();
        let borrowed: Vec<(&str, &str)> =
            named.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let graph = graph(&borrowed);
        let source = NodeId::new(format!("N{}", endpoints.0));
        let target = NodeId::new(format!("N{}", endpoints.1));
        let direct = graph
            .links()
            .iter()
            .any(|link| link.source == source && link.target == target);

        if direct && source != target
            && let ShortestPath::Path(path) = shortest_path(&graph, &source, &target)
        {
            assert_eq!(path.len(), 2, "a direct edge admits a two-node path");
        }
    }
}
