// crates/netplane-store-memory/tests/store.rs
// ============================================================================
// Module: Memory Store Tests
// Description: Tests for the storage contract over the dispatch bus.
// ============================================================================
//! ## Overview
//! Validates entity round trips through the typed client, `not found`
//! surfacing, and the cascade deletions routing relies on.

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

use netplane_bus::Bus;
use netplane_bus::Request;
use netplane_bus::STORAGE_SERVICE;
use netplane_bus::StorageClient;
use netplane_bus::StorageError;
use netplane_core::Link;
use netplane_core::LinkStatus;
use netplane_core::Node;
use netplane_core::NodeId;
use netplane_core::NodeStatus;
use netplane_core::PrefixId;
use netplane_core::PrefixRecord;
use netplane_core::RouteId;
use netplane_core::RouteRecord;
use netplane_core::RouteStatus;
use netplane_store_memory::spawn_memory_store;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Spawns a fresh store and returns a typed client for it.
fn fresh_store() -> (Bus, StorageClient) {
    let bus = Bus::new();
    let _ = spawn_memory_store(&bus);
    (bus.clone(), StorageClient::new(bus))
}

/// Builds an active node with the given id.
fn node(id: &str) -> Node {
    Node {
        id: NodeId::new(id),
        name: id.to_string(),
        kind: "router".to_string(),
        status: NodeStatus::Active,
    }
}

/// Builds a prefix anchored at the given node.
fn prefix(id: &str, node: &str) -> PrefixRecord {
    PrefixRecord {
        id: PrefixId::new(id),
        name: format!("10.0.0.0/24 ({id})"),
        node: NodeId::new(node),
        status: RouteStatus::Pending,
    }
}

/// Builds a pending route along the given path.
fn route(id: &str, prefix: &str, path: &[&str]) -> RouteRecord {
    let path: Vec<NodeId> = path.iter().map(|node| NodeId::new(*node)).collect();
    RouteRecord {
        id: RouteId::new(id),
        prefix: PrefixId::new(prefix),
        from_node: path.first().cloned().unwrap_or_else(|| NodeId::new(id)),
        target_node: path.last().cloned().unwrap_or_else(|| NodeId::new(id)),
        path,
        status: RouteStatus::Pending,
    }
}

// ============================================================================
// SECTION: Node Tests
// ============================================================================

#[tokio::test]
async fn nodes_round_trip_and_missing_ids_surface_not_found() {
    let (_bus, storage) = fresh_store();
    storage.add_node(&node("R1")).await.expect("add must succeed");

    let fetched = storage.get_node(&NodeId::new("R1")).await.expect("get must succeed");
    assert_eq!(fetched, node("R1"));

    let missing = storage.get_node(&NodeId::new("R9")).await.expect_err("missing must fail");
    assert!(matches!(missing, StorageError::NotFound(_)));
}

#[tokio::test]
async fn get_nodes_returns_only_the_existing_subset() {
    let (_bus, storage) = fresh_store();
    storage.add_node(&node("R1")).await.expect("add must succeed");
    storage.add_node(&node("R2")).await.expect("add must succeed");

    let found = storage
        .get_nodes(&[NodeId::new("R1"), NodeId::new("R9"), NodeId::new("R2")])
        .await
        .expect("get_nodes must succeed");
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn deleting_a_node_cascades_its_links() {
    let (_bus, storage) = fresh_store();
    storage.add_node(&node("R1")).await.expect("add must succeed");
    storage.add_node(&node("R2")).await.expect("add must succeed");
    storage
        .add_link(&Link {
            id: "R1--R2".to_string(),
            source: NodeId::new("R1"),
            target: NodeId::new("R2"),
            status: LinkStatus::Up,
        })
        .await
        .expect("add_link must succeed");

    storage.del_node(&NodeId::new("R1")).await.expect("del must succeed");
    storage.del_links_by_node(&NodeId::new("R1")).await.expect("cascade must succeed");
    let links = storage.get_all_links().await.expect("get_all_links must succeed");
    assert!(links.as_array().is_some_and(Vec::is_empty));
}

// ============================================================================
// SECTION: Prefix and Route Tests
// ============================================================================

#[tokio::test]
async fn prefixes_round_trip_and_cascade_by_node() {
    let (_bus, storage) = fresh_store();
    storage.add_prefix(&prefix("P1", "R1")).await.expect("add must succeed");
    storage.add_prefix(&prefix("P2", "R2")).await.expect("add must succeed");

    storage.del_prefix_by_node(&NodeId::new("R1")).await.expect("cascade must succeed");
    let remaining = storage.get_all_prefixes().await.expect("get must succeed");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id.as_str(), "P2");

    let missing =
        storage.get_prefix(&PrefixId::new("P1")).await.expect_err("deleted must be gone");
    assert!(matches!(missing, StorageError::NotFound(_)));
}

#[tokio::test]
async fn routes_cascade_by_node_link_and_prefix() {
    let (_bus, storage) = fresh_store();
    storage.add_route(&route("RT1", "P1", &["A", "B", "C"])).await.expect("add must succeed");
    storage.add_route(&route("RT2", "P1", &["A", "D"])).await.expect("add must succeed");
    storage.add_route(&route("RT3", "P2", &["D", "E"])).await.expect("add must succeed");

    // Link B--C crossed only by RT1, regardless of direction.
    storage
        .del_routes_by_link(&NodeId::new("C"), &NodeId::new("B"))
        .await
        .expect("cascade must succeed");
    assert_eq!(storage.get_all_routes().await.expect("get must succeed").len(), 2);

    storage.del_routes_by_node(&NodeId::new("D")).await.expect("cascade must succeed");
    let remaining = storage.get_all_routes().await.expect("get must succeed");
    assert!(remaining.is_empty());

    storage.add_route(&route("RT4", "P2", &["A", "B"])).await.expect("add must succeed");
    storage.del_routes_by_prefix(&PrefixId::new("P2")).await.expect("cascade must succeed");
    assert!(storage.get_all_routes().await.expect("get must succeed").is_empty());
}

#[tokio::test]
async fn deleting_a_missing_route_surfaces_not_found() {
    let (_bus, storage) = fresh_store();
    let missing = storage.del_route(&RouteId::new("RT9")).await.expect_err("must fail");
    assert!(matches!(missing, StorageError::NotFound(_)));
}

// ============================================================================
// SECTION: Envelope Tests
// ============================================================================

#[tokio::test]
async fn unknown_actions_reply_with_an_error_envelope() {
    let (bus, _storage) = fresh_store();
    let reply = bus.request(STORAGE_SERVICE, Request::bare("mystery")).await;
    assert_eq!(reply.error.as_deref(), Some("unknown action"));
}

#[tokio::test]
async fn topology_snapshot_reflects_stored_nodes_and_links() {
    let (_bus, storage) = fresh_store();
    storage.add_node(&node("R1")).await.expect("add must succeed");
    let snapshot = storage.get_topology().await.expect("get_topology must succeed");
    assert!(snapshot["nodes"].as_array().is_some_and(|nodes| nodes.len() == 1));
    assert!(snapshot["links"].as_array().is_some_and(Vec::is_empty));
}
