// crates/netplane-routing/src/service.rs
// ============================================================================
// Module: Routing Service Actor
// Description: Bus-facing surface for prefix and route management.
// Purpose: Answer routing actions; cascade topology deletions; republish.
// Dependencies: netplane-bus, netplane-core, serde_json, tokio,
//               crate::planner
// ============================================================================

//! ## Overview
//! The routing service owns the planner on one task and multiplexes bus
//! requests with three topology topics: snapshot updates refresh the
//! planner's graph, node deletions cascade prefix and route removal, and
//! link deletions drop the routes crossing the link. After every mutation or
//! cascade the current prefix/route collections are republished so passive
//! subscribers stay current.

// ============================================================================
// SECTION: Imports
// ============================================================================

use netplane_bus::Bus;
use netplane_bus::BusRequest;
use netplane_bus::ROUTING_SERVICE;
use netplane_bus::Response;
use netplane_bus::StorageClient;
use netplane_bus::TOPIC_LINK_DELETED;
use netplane_bus::TOPIC_NODE_DELETED;
use netplane_bus::TOPIC_PREFIXES_UPDATED;
use netplane_bus::TOPIC_ROUTES_UPDATED;
use netplane_bus::TOPIC_TOPOLOGY_UPDATED;
use netplane_core::Graph;
use netplane_core::NodeId;
use netplane_core::PrefixId;
use netplane_core::RouteId;
use serde_json::Value;
use serde_json::json;
use tokio::task::JoinHandle;

use crate::planner::RoutingPlanner;

// ============================================================================
// SECTION: Routing Service
// ============================================================================

/// Bus-facing routing service actor.
struct RoutingService {
    /// Dispatch bus handle for publications.
    bus: Bus,
    /// Planner owning validation and the graph snapshot.
    planner: RoutingPlanner,
    /// Storage delegate for queries and cascades.
    storage: StorageClient,
}

/// Spawns the routing service on the bus.
#[must_use]
pub fn spawn_routing_service(bus: &Bus, storage: StorageClient) -> JoinHandle<()> {
    let mut mailbox = bus.serve(ROUTING_SERVICE);
    let mut snapshots = bus.subscribe(TOPIC_TOPOLOGY_UPDATED);
    let mut node_deletions = bus.subscribe(TOPIC_NODE_DELETED);
    let mut link_deletions = bus.subscribe(TOPIC_LINK_DELETED);
    let mut service = RoutingService {
        bus: bus.clone(),
        planner: RoutingPlanner::new(storage.clone()),
        storage,
    };
    tokio::spawn(async move {
        loop {
            tokio::select! {
                queued = mailbox.recv() => {
                    let Some(BusRequest { request, reply }) = queued else {
                        break;
                    };
                    let response = service.answer(&request.action, &request.params).await;
                    let _ = reply.send(response);
                }
                snapshot = snapshots.recv() => {
                    if let Ok(publication) = snapshot
                        && let Ok(graph) = Graph::from_value(publication.content)
                    {
                        service.planner.update_graph(graph);
                    }
                }
                deletion = node_deletions.recv() => {
                    if let Ok(publication) = deletion {
                        service.on_node_deleted(&publication.content).await;
                    }
                }
                deletion = link_deletions.recv() => {
                    if let Ok(publication) = deletion {
                        service.on_link_deleted(&publication.content).await;
                    }
                }
            }
        }
    })
}

impl RoutingService {
    /// Answers one bus request.
    async fn answer(&mut self, action: &str, params: &Value) -> Response {
        let outcome = match action {
            "get_service_info" => Ok(json!({
                "service": ROUTING_SERVICE,
                "info": "prefix registration and route planning",
            })),
            "get_all_reg_pref" => self.get_all_prefixes().await,
            "get_reg_pref" => self.get_prefix(params).await,
            "get_all_routes" => self.get_all_routes().await,
            "get_route" => self.get_route(params).await,
            "add_reg_pref" => self.add_prefix(params).await,
            "add_route" => self.add_route(params).await,
            "add_auto_route" => self.add_auto_route(params).await,
            "del_reg_pref" => self.del_prefix(params).await,
            "del_route" => self.del_route(params).await,
            _ => Err("unknown action".to_string()),
        };
        match outcome {
            Ok(content) => Response::content(ROUTING_SERVICE, action, content),
            Err(error) => Response::error(ROUTING_SERVICE, action, error),
        }
    }

    /// Cascades a node deletion into prefixes and routes.
    async fn on_node_deleted(&self, notice: &Value) {
        let Some(node) = notice.get("node").and_then(Value::as_str).map(NodeId::new) else {
            return;
        };
        let _ = self.storage.del_prefix_by_node(&node).await;
        let _ = self.storage.del_routes_by_node(&node).await;
        self.republish_prefixes().await;
        self.republish_routes().await;
    }

    /// Cascades a link deletion into the routes crossing it.
    async fn on_link_deleted(&self, notice: &Value) {
        let src = notice.get("src").and_then(Value::as_str).map(NodeId::new);
        let dst = notice.get("dst").and_then(Value::as_str).map(NodeId::new);
        let (Some(src), Some(dst)) = (src, dst) else {
            return;
        };
        let _ = self.storage.del_routes_by_link(&src, &dst).await;
        self.republish_routes().await;
    }

    /// Republishes the current prefix collection.
    async fn republish_prefixes(&self) {
        if let Ok(prefixes) = self.storage.get_all_prefixes().await
            && let Ok(content) = serde_json::to_value(prefixes)
        {
            self.bus.publish(TOPIC_PREFIXES_UPDATED, ROUTING_SERVICE, content);
        }
    }

    /// Republishes the current route collection.
    async fn republish_routes(&self) {
        if let Ok(routes) = self.storage.get_all_routes().await
            && let Ok(content) = serde_json::to_value(routes)
        {
            self.bus.publish(TOPIC_ROUTES_UPDATED, ROUTING_SERVICE, content);
        }
    }

    /// Lists every registered prefix.
    async fn get_all_prefixes(&self) -> Result<Value, String> {
        let prefixes = self.storage.get_all_prefixes().await.map_err(|err| err.to_string())?;
        serde_json::to_value(prefixes).map_err(|err| err.to_string())
    }

    /// Returns one registered prefix by id.
    async fn get_prefix(&self, params: &Value) -> Result<Value, String> {
        let id = required_str(params, "id").map(PrefixId::new)?;
        let prefix = self.storage.get_prefix(&id).await.map_err(|err| err.to_string())?;
        serde_json::to_value(prefix).map_err(|err| err.to_string())
    }

    /// Lists every recorded route.
    async fn get_all_routes(&self) -> Result<Value, String> {
        let routes = self.storage.get_all_routes().await.map_err(|err| err.to_string())?;
        serde_json::to_value(routes).map_err(|err| err.to_string())
    }

    /// Returns one recorded route by id.
    async fn get_route(&self, params: &Value) -> Result<Value, String> {
        let id = required_str(params, "id").map(RouteId::new)?;
        let route = self.storage.get_route(&id).await.map_err(|err| err.to_string())?;
        serde_json::to_value(route).map_err(|err| err.to_string())
    }

    /// Registers a prefix and republishes the collection.
    async fn add_prefix(&self, params: &Value) -> Result<Value, String> {
        let id = required_str(params, "id").map(PrefixId::new)?;
        let name = required_str(params, "name")?.to_string();
        let node = required_str(params, "node").map(NodeId::new)?;
        let prefix =
            self.planner.add_prefix(id, name, node).await.map_err(|err| err.to_string())?;
        self.republish_prefixes().await;
        serde_json::to_value(prefix).map_err(|err| err.to_string())
    }

    /// Records a manual route and republishes the collection.
    async fn add_route(&self, params: &Value) -> Result<Value, String> {
        let prefix = required_str(params, "prefix").map(PrefixId::new)?;
        let from_node = required_str(params, "from_node").map(NodeId::new)?;
        let path = params
            .get("path")
            .and_then(Value::as_array)
            .ok_or_else(|| "missing field: path".to_string())?
            .iter()
            .map(|node| node.as_str().map(NodeId::new))
            .collect::<Option<Vec<NodeId>>>()
            .ok_or_else(|| "path must be a list of node ids".to_string())?;
        let route =
            self.planner.add_route(prefix, from_node, path).await.map_err(|err| err.to_string())?;
        self.republish_routes().await;
        serde_json::to_value(route).map_err(|err| err.to_string())
    }

    /// Plans an automatic route and republishes the collection.
    async fn add_auto_route(&self, params: &Value) -> Result<Value, String> {
        let prefix = required_str(params, "prefix").map(PrefixId::new)?;
        let from_node = required_str(params, "from_node").map(NodeId::new)?;
        let target_node = required_str(params, "target_node").map(NodeId::new)?;
        let route = self
            .planner
            .add_auto_route(prefix, from_node, target_node)
            .await
            .map_err(|err| err.to_string())?;
        self.republish_routes().await;
        serde_json::to_value(route).map_err(|err| err.to_string())
    }

    /// Deletes a prefix, cascades its routes, and republishes both.
    async fn del_prefix(&self, params: &Value) -> Result<Value, String> {
        let id = required_str(params, "id").map(PrefixId::new)?;
        self.planner.del_prefix(&id).await.map_err(|err| err.to_string())?;
        self.republish_prefixes().await;
        self.republish_routes().await;
        Ok(json!({ "deleted": id }))
    }

    /// Deletes a route and republishes the collection.
    async fn del_route(&self, params: &Value) -> Result<Value, String> {
        let id = required_str(params, "id").map(RouteId::new)?;
        self.planner.del_route(&id).await.map_err(|err| err.to_string())?;
        self.republish_routes().await;
        Ok(json!({ "deleted": id }))
    }
}

/// Extracts a required string field from the request parameters.
fn required_str<'params>(params: &'params Value, field: &str) -> Result<&'params str, String> {
    params
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing field: {field}"))
}
