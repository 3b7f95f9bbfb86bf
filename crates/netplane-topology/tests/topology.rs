// crates/netplane-topology/tests/topology.rs
// ============================================================================
// Module: Topology Tests
// Description: Tests for result-driven reconciliation and the bus surface.
// ============================================================================
//! ## Overview
//! Validates the reconciliation scenario (reporting agent ACTIVE, referenced
//! target INACTIVE, joining link with the row status), staleness decay, and
//! the topology service actions including deletion cascades.

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

use std::time::Duration;

use netplane_bus::Bus;
use netplane_bus::Request;
use netplane_bus::Response;
use netplane_bus::STORAGE_SERVICE;
use netplane_bus::StorageClient;
use netplane_bus::TOPIC_NODE_DELETED;
use netplane_bus::TOPIC_TOPOLOGY_UPDATED;
use netplane_bus::TOPOLOGY_SERVICE;
use netplane_core::AgentId;
use netplane_core::LinkStatus;
use netplane_core::Measurement;
use netplane_core::NodeId;
use netplane_core::NodeStatus;
use netplane_core::SchemaId;
use netplane_topology::TopologyReconciler;
use netplane_topology::spawn_topology_service;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Builds a topology result reported by `agent` with one row per target.
fn result(agent: &str, rows: &[(&str, &str)]) -> Measurement {
    Measurement {
        agent_id: AgentId::new(agent),
        schema: SchemaId::new("S1"),
        columns: vec!["target".to_string(), "status".to_string()],
        rows: rows
            .iter()
            .map(|(target, status)| vec![(*target).to_string(), (*status).to_string()])
            .collect(),
    }
}

/// Serves a storage stub acknowledging every action and reporting names.
fn serve_storage_stub(bus: &Bus) -> mpsc::UnboundedReceiver<String> {
    let mut mailbox = bus.serve(STORAGE_SERVICE);
    let (seen, observed) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(queued) = mailbox.recv().await {
            let action = queued.request.action.clone();
            let _ = seen.send(action.clone());
            let _ = queued.reply.send(Response::content(STORAGE_SERVICE, action, json!({})));
        }
    });
    observed
}

/// Spawns the topology service and returns the measurement/reset senders.
fn spawn_service(bus: &Bus) -> (mpsc::Sender<Measurement>, mpsc::Sender<()>) {
    let (measurement_tx, measurement_rx) = mpsc::channel(8);
    let (reset_tx, reset_rx) = mpsc::channel(4);
    let _ = spawn_topology_service(bus, StorageClient::new(bus.clone()), measurement_rx, reset_rx);
    (measurement_tx, reset_tx)
}

// ============================================================================
// SECTION: Reconciler Tests
// ============================================================================

#[test]
fn reporting_agent_becomes_active_and_target_stays_inactive() {
    let mut reconciler = TopologyReconciler::new();
    reconciler.on_result(&result("R1-router", &[("R2-router", "UP")]));

    let graph = reconciler.graph();
    let r1 = graph.node(&NodeId::new("R1")).expect("R1 must exist");
    assert_eq!(r1.status, NodeStatus::Active);
    assert_eq!(r1.kind, "router");
    let r2 = graph.node(&NodeId::new("R2")).expect("R2 must exist");
    assert_eq!(r2.status, NodeStatus::Inactive);
    assert_eq!(graph.links().len(), 1);
    assert!(graph.links()[0].joins(&NodeId::new("R1"), &NodeId::new("R2")));
    assert_eq!(graph.links()[0].status, LinkStatus::Up);
}

#[test]
fn target_promotes_itself_when_it_reports() {
    let mut reconciler = TopologyReconciler::new();
    reconciler.on_result(&result("R1-router", &[("R2-router", "UP")]));
    reconciler.on_result(&result("R2-router", &[("R1-router", "UP")]));

    let graph = reconciler.graph();
    assert_eq!(
        graph.node(&NodeId::new("R2")).expect("R2 must exist").status,
        NodeStatus::Active
    );
    // Reverse observation updates the same undirected link.
    assert_eq!(graph.links().len(), 1);
}

#[test]
fn referenced_target_never_downgrades_an_active_node() {
    let mut reconciler = TopologyReconciler::new();
    reconciler.on_result(&result("R2-router", &[("R3-router", "UP")]));
    reconciler.on_result(&result("R1-router", &[("R2-router", "UP")]));

    let graph = reconciler.graph();
    assert_eq!(
        graph.node(&NodeId::new("R2")).expect("R2 must exist").status,
        NodeStatus::Active
    );
}

#[test]
fn rows_with_unparseable_cells_are_skipped() {
    let mut reconciler = TopologyReconciler::new();
    reconciler.on_result(&result("R1-router", &[("R2-router", "FLAPPING")]));

    let graph = reconciler.graph();
    assert!(graph.node(&NodeId::new("R1")).is_some());
    assert!(graph.node(&NodeId::new("R2")).is_none());
    assert!(graph.links().is_empty());
}

#[test]
fn reset_decays_everything_until_the_next_report() {
    let mut reconciler = TopologyReconciler::new();
    reconciler.on_result(&result("R1-router", &[("R2-router", "UP")]));
    reconciler.reset_stale();

    let graph = reconciler.graph();
    assert!(graph.nodes().values().all(|node| node.status == NodeStatus::Inactive));
    assert!(graph.links().iter().all(|link| link.status == LinkStatus::Down));

    reconciler.on_result(&result("R1-router", &[("R2-router", "UP")]));
    let graph = reconciler.graph();
    assert_eq!(
        graph.node(&NodeId::new("R1")).expect("R1 must exist").status,
        NodeStatus::Active
    );
    assert_eq!(graph.links()[0].status, LinkStatus::Up);
}

// ============================================================================
// SECTION: Service Tests
// ============================================================================

#[tokio::test]
async fn measurements_update_the_graph_and_publish_snapshots() {
    let bus = Bus::new();
    let _storage_actions = serve_storage_stub(&bus);
    let mut snapshots = bus.subscribe(TOPIC_TOPOLOGY_UPDATED);
    let (measurements, _resets) = spawn_service(&bus);

    measurements
        .send(result("R1-router", &[("R2-router", "UP")]))
        .await
        .expect("service must accept measurements");
    let published = timeout(Duration::from_secs(1), snapshots.recv())
        .await
        .expect("snapshot must be published")
        .expect("topic must stay open");
    assert!(published.content["nodes"].as_array().is_some_and(|nodes| nodes.len() == 2));

    let reply = bus.request(TOPOLOGY_SERVICE, Request::bare("get_all_nodes")).await;
    assert!(reply.content.and_then(|nodes| nodes.as_array().map(Vec::len)) == Some(2));
}

#[tokio::test]
async fn del_node_cascades_into_storage_and_notifies_routing() {
    let bus = Bus::new();
    let mut storage_actions = serve_storage_stub(&bus);
    let mut deletions = bus.subscribe(TOPIC_NODE_DELETED);
    let mut snapshots = bus.subscribe(TOPIC_TOPOLOGY_UPDATED);
    let (measurements, _resets) = spawn_service(&bus);
    measurements
        .send(result("R1-router", &[("R2-router", "UP")]))
        .await
        .expect("service must accept measurements");
    let _ = timeout(Duration::from_secs(1), snapshots.recv())
        .await
        .expect("measurement snapshot must be published");

    let reply = bus
        .request(TOPOLOGY_SERVICE, Request::new("del_node", json!({ "id": "R2" })))
        .await;
    assert!(!reply.is_error(), "deletion must succeed: {:?}", reply.error);

    let mut seen = Vec::new();
    for _ in 0..2 {
        seen.push(
            timeout(Duration::from_secs(1), storage_actions.recv())
                .await
                .expect("storage call must happen")
                .expect("stub must stay open"),
        );
    }
    assert!(seen.contains(&"del_node".to_string()));
    assert!(seen.contains(&"del_links_by_node".to_string()));
    let notice = timeout(Duration::from_secs(1), deletions.recv())
        .await
        .expect("deletion notice must be published")
        .expect("topic must stay open");
    assert_eq!(notice.content["node"], json!("R2"));

    let topology = bus.request(TOPOLOGY_SERVICE, Request::bare("get_topology")).await;
    let content = topology.content.expect("topology must be returned");
    assert!(content["links"].as_array().is_some_and(Vec::is_empty));
}

#[tokio::test]
async fn reset_signal_publishes_a_decayed_snapshot() {
    let bus = Bus::new();
    let _storage_actions = serve_storage_stub(&bus);
    let mut snapshots = bus.subscribe(TOPIC_TOPOLOGY_UPDATED);
    let (measurements, resets) = spawn_service(&bus);
    measurements
        .send(result("R1-router", &[("R2-router", "UP")]))
        .await
        .expect("service must accept measurements");
    let _ = timeout(Duration::from_secs(1), snapshots.recv())
        .await
        .expect("measurement snapshot must be published");
    resets.send(()).await.expect("service must accept resets");

    let published = timeout(Duration::from_secs(1), snapshots.recv())
        .await
        .expect("snapshot must be published")
        .expect("topic must stay open");
    let nodes = published.content["nodes"].as_array().cloned().unwrap_or_default();
    assert!(!nodes.is_empty());
    assert!(nodes.iter().all(|node| node["status"] == json!("INACTIVE")));
}

#[tokio::test]
async fn unknown_actions_reply_with_an_error_envelope() {
    let bus = Bus::new();
    let _storage_actions = serve_storage_stub(&bus);
    let (_measurements, _resets) = spawn_service(&bus);

    let reply = bus.request(TOPOLOGY_SERVICE, Request::bare("mystery")).await;
    assert_eq!(reply.error.as_deref(), Some("unknown action"));
}
