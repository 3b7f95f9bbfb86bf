// crates/netplane-topology/src/service.rs
// ============================================================================
// Module: Topology Service Actor
// Description: Bus-facing surface for topology queries and manual edits.
// Purpose: Own the reconciler on one task; publish snapshots on change.
// Dependencies: netplane-bus, netplane-core, serde_json, tokio,
//               crate::reconciler
// ============================================================================

//! ## Overview
//! The topology service owns the reconciler exclusively on one task and
//! multiplexes three inputs: bus requests (queries and manual node/link
//! edits), the admitted-result stream, and the staleness reset signal.
//! Every graph change publishes a fresh snapshot on `topology-updated`;
//! deletions additionally publish on the deletion topics so routing can
//! cascade. External readers only ever see published snapshots, never a
//! graph mid-mutation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use netplane_bus::Bus;
use netplane_bus::BusRequest;
use netplane_bus::Response;
use netplane_bus::StorageClient;
use netplane_bus::TOPIC_LINK_DELETED;
use netplane_bus::TOPIC_NODE_DELETED;
use netplane_bus::TOPIC_TOPOLOGY_UPDATED;
use netplane_bus::TOPOLOGY_SERVICE;
use netplane_core::Link;
use netplane_core::Measurement;
use netplane_core::Node;
use netplane_core::NodeId;
use serde_json::Value;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::reconciler::TopologyReconciler;

// ============================================================================
// SECTION: Topology Service
// ============================================================================

/// Bus-facing topology service actor.
struct TopologyService {
    /// Dispatch bus handle for publications.
    bus: Bus,
    /// Reconciled graph owner.
    reconciler: TopologyReconciler,
    /// Storage delegate for persisted nodes and cascades.
    storage: StorageClient,
}

/// Spawns the topology service on the bus.
///
/// `measurements` carries admitted results from the data service; `resets`
/// fires when the discovery reset cadence elapses.
#[must_use]
pub fn spawn_topology_service(
    bus: &Bus,
    storage: StorageClient,
    mut measurements: mpsc::Receiver<Measurement>,
    mut resets: mpsc::Receiver<()>,
) -> JoinHandle<()> {
    let mut mailbox = bus.serve(TOPOLOGY_SERVICE);
    let mut service = TopologyService {
        bus: bus.clone(),
        reconciler: TopologyReconciler::new(),
        storage,
    };
    tokio::spawn(async move {
        loop {
            tokio::select! {
                queued = mailbox.recv() => {
                    let Some(BusRequest { request, reply }) = queued else {
                        break;
                    };
                    let response = service.answer(&request.action, request.params).await;
                    let _ = reply.send(response);
                }
                result = measurements.recv() => {
                    let Some(result) = result else {
                        break;
                    };
                    service.reconciler.on_result(&result);
                    service.publish_snapshot();
                }
                reset = resets.recv() => {
                    if reset.is_none() {
                        break;
                    }
                    service.reconciler.reset_stale();
                    service.publish_snapshot();
                }
            }
        }
    })
}

impl TopologyService {
    /// Answers one bus request.
    async fn answer(&mut self, action: &str, params: Value) -> Response {
        let outcome = match action {
            "get_service_info" => Ok(json!({
                "service": TOPOLOGY_SERVICE,
                "info": "topology reconciliation and manual graph edits",
            })),
            "get_topology" => self.reconciler.snapshot().map_err(|err| err.to_string()),
            "get_all_nodes" => self.get_all_nodes(),
            "get_all_links" => self.get_all_links(),
            "add_node" => self.add_node(params).await,
            "add_link" => self.add_link(params).await,
            "del_node" => self.del_node(&params).await,
            "del_link" => self.del_link(&params).await,
            _ => Err("unknown action".to_string()),
        };
        match outcome {
            Ok(content) => Response::content(TOPOLOGY_SERVICE, action, content),
            Err(error) => Response::error(TOPOLOGY_SERVICE, action, error),
        }
    }

    /// Publishes the current snapshot on the topology topic.
    fn publish_snapshot(&self) {
        if let Ok(snapshot) = self.reconciler.snapshot() {
            self.bus.publish(TOPIC_TOPOLOGY_UPDATED, TOPOLOGY_SERVICE, snapshot);
        }
    }

    /// Lists every node in the reconciled graph.
    fn get_all_nodes(&self) -> Result<Value, String> {
        let nodes: Vec<&Node> = self.reconciler.graph().nodes().values().collect();
        serde_json::to_value(nodes).map_err(|err| err.to_string())
    }

    /// Lists every link in the reconciled graph.
    fn get_all_links(&self) -> Result<Value, String> {
        serde_json::to_value(self.reconciler.graph().links()).map_err(|err| err.to_string())
    }

    /// Upserts a node manually and persists it.
    async fn add_node(&mut self, params: Value) -> Result<Value, String> {
        let node: Node = serde_json::from_value(params).map_err(|err| err.to_string())?;
        self.storage.add_node(&node).await.map_err(|err| err.to_string())?;
        self.reconciler.upsert_node(node.clone());
        self.publish_snapshot();
        serde_json::to_value(node).map_err(|err| err.to_string())
    }

    /// Upserts a link manually and persists it.
    async fn add_link(&mut self, params: Value) -> Result<Value, String> {
        let link: Link = serde_json::from_value(params).map_err(|err| err.to_string())?;
        self.storage.add_link(&link).await.map_err(|err| err.to_string())?;
        self.reconciler.upsert_link(link.clone());
        self.publish_snapshot();
        serde_json::to_value(link).map_err(|err| err.to_string())
    }

    /// Deletes a node, cascades its links in storage, and notifies routing.
    async fn del_node(&mut self, params: &Value) -> Result<Value, String> {
        let id = required_id(params, "id")?;
        let removed = self
            .reconciler
            .remove_node(&id)
            .ok_or_else(|| format!("node {id} not found"))?;
        // The stored copy may not exist for probe-reported nodes.
        if let Err(err) = self.storage.del_node(&id).await
            && !matches!(err, netplane_bus::StorageError::NotFound(_))
        {
            return Err(err.to_string());
        }
        self.storage.del_links_by_node(&id).await.map_err(|err| err.to_string())?;
        self.bus.publish(TOPIC_NODE_DELETED, TOPOLOGY_SERVICE, json!({ "node": id }));
        self.publish_snapshot();
        serde_json::to_value(removed).map_err(|err| err.to_string())
    }

    /// Deletes a link by its endpoint pair and notifies routing.
    async fn del_link(&mut self, params: &Value) -> Result<Value, String> {
        let src = required_id(params, "src")?;
        let dst = required_id(params, "dst")?;
        let removed = self
            .reconciler
            .remove_link(&src, &dst)
            .ok_or_else(|| format!("link {src}--{dst} not found"))?;
        // The stored copy may not exist for probe-reported links.
        if let Err(err) = self.storage.del_link(&src, &dst).await
            && !matches!(err, netplane_bus::StorageError::NotFound(_))
        {
            return Err(err.to_string());
        }
        self.bus.publish(
            TOPIC_LINK_DELETED,
            TOPOLOGY_SERVICE,
            json!({ "src": src, "dst": dst }),
        );
        self.publish_snapshot();
        serde_json::to_value(removed).map_err(|err| err.to_string())
    }
}

/// Extracts a required node-id field from the request parameters.
fn required_id(params: &Value, field: &str) -> Result<NodeId, String> {
    params
        .get(field)
        .and_then(Value::as_str)
        .map(NodeId::new)
        .ok_or_else(|| format!("missing field: {field}"))
}
