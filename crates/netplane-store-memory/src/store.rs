// crates/netplane-store-memory/src/store.rs
// ============================================================================
// Module: Memory Store Actor
// Description: In-memory storage service answering the storage contract.
// Purpose: Back the storage address for tests, demos, and single-process runs.
// Dependencies: netplane-bus, netplane-core, serde_json, tokio
// ============================================================================

//! ## Overview
//! The memory store is a single-owner actor holding every persisted
//! collection (nodes, links, prefixes, routes, results) in plain maps and
//! answering the storage actions over the dispatch bus. Missing entities
//! reply with a `not found` error; every request is answered exactly once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use netplane_bus::Bus;
use netplane_bus::BusRequest;
use netplane_bus::Response;
use netplane_bus::STORAGE_SERVICE;
use netplane_core::Link;
use netplane_core::Measurement;
use netplane_core::Node;
use netplane_core::NodeId;
use netplane_core::PrefixId;
use netplane_core::PrefixRecord;
use netplane_core::RouteId;
use netplane_core::RouteRecord;
use serde_json::Value;
use serde_json::json;
use tokio::task::JoinHandle;

// ============================================================================
// SECTION: Memory Store
// ============================================================================

/// In-memory storage collections.
#[derive(Debug, Default)]
struct MemoryStore {
    /// Persisted nodes keyed by identifier.
    nodes: BTreeMap<NodeId, Node>,
    /// Persisted links.
    links: Vec<Link>,
    /// Registered prefixes keyed by identifier.
    prefixes: BTreeMap<PrefixId, PrefixRecord>,
    /// Recorded routes keyed by identifier.
    routes: BTreeMap<RouteId, RouteRecord>,
    /// Appended measurement results.
    results: Vec<Measurement>,
}

/// Spawns the memory store on the storage service address.
#[must_use]
pub fn spawn_memory_store(bus: &Bus) -> JoinHandle<()> {
    let mut mailbox = bus.serve(STORAGE_SERVICE);
    let mut store = MemoryStore::default();
    tokio::spawn(async move {
        while let Some(BusRequest { request, reply }) = mailbox.recv().await {
            let response = match store.answer(&request.action, request.params) {
                Ok(content) => Response::content(STORAGE_SERVICE, request.action, content),
                Err(error) => Response::error(STORAGE_SERVICE, request.action, error),
            };
            let _ = reply.send(response);
        }
    })
}

impl MemoryStore {
    /// Answers one storage action.
    fn answer(&mut self, action: &str, params: Value) -> Result<Value, String> {
        match action {
            "get_node" => self.get_node(&params),
            "get_nodes" => self.get_nodes(&params),
            "get_all_nodes" => to_value(self.nodes.values().collect::<Vec<_>>()),
            "add_node" => self.add_node(params),
            "del_node" => self.del_node(&params),
            "add_link" => self.add_link(params),
            "del_link" => self.del_link(&params),
            "del_links_by_node" => self.del_links_by_node(&params),
            "get_all_links" => to_value(&self.links),
            "get_prefix" => self.get_prefix(&params),
            "get_all_prefixes" => to_value(self.prefixes.values().collect::<Vec<_>>()),
            "add_prefix" => self.add_prefix(params),
            "del_prefix" => self.del_prefix(&params),
            "del_prefix_by_node" => self.del_prefix_by_node(&params),
            "get_route" => self.get_route(&params),
            "get_all_routes" => to_value(self.routes.values().collect::<Vec<_>>()),
            "add_route" => self.add_route(params),
            "del_route" => self.del_route(&params),
            "del_routes_by_node" => self.del_routes_by_node(&params),
            "del_routes_by_link" => self.del_routes_by_link(&params),
            "del_routes_by_prefix" => self.del_routes_by_prefix(&params),
            "get_topology" => Ok(json!({ "nodes": self.nodes.values().collect::<Vec<_>>(),
                                         "links": self.links })),
            "add_result" => self.add_result(params),
            _ => Err("unknown action".to_string()),
        }
    }

    // ------------------------------------------------------------------
    // Nodes and links
    // ------------------------------------------------------------------

    /// Returns one node by identifier.
    fn get_node(&self, params: &Value) -> Result<Value, String> {
        let id = required_id::<NodeId>(params, "id")?;
        let node = self.nodes.get(&id).ok_or_else(|| format!("node {id} not found"))?;
        to_value(node)
    }

    /// Returns the subset of the requested nodes that exist.
    fn get_nodes(&self, params: &Value) -> Result<Value, String> {
        let ids: Vec<NodeId> = params
            .get("ids")
            .cloned()
            .ok_or_else(|| "missing field: ids".to_string())
            .and_then(|ids| serde_json::from_value(ids).map_err(|err| err.to_string()))?;
        let found: Vec<&Node> = ids.iter().filter_map(|id| self.nodes.get(id)).collect();
        to_value(found)
    }

    /// Inserts or replaces a node.
    fn add_node(&mut self, params: Value) -> Result<Value, String> {
        let node: Node = serde_json::from_value(params).map_err(|err| err.to_string())?;
        let stored = to_value(&node)?;
        self.nodes.insert(node.id.clone(), node);
        Ok(stored)
    }

    /// Deletes a node by identifier.
    fn del_node(&mut self, params: &Value) -> Result<Value, String> {
        let id = required_id::<NodeId>(params, "id")?;
        let removed = self.nodes.remove(&id).ok_or_else(|| format!("node {id} not found"))?;
        to_value(removed)
    }

    /// Inserts or replaces a link by its undirected endpoint pair.
    fn add_link(&mut self, params: Value) -> Result<Value, String> {
        let link: Link = serde_json::from_value(params).map_err(|err| err.to_string())?;
        let stored = to_value(&link)?;
        if let Some(existing) =
            self.links.iter_mut().find(|held| held.joins(&link.source, &link.target))
        {
            *existing = link;
        } else {
            self.links.push(link);
        }
        Ok(stored)
    }

    /// Deletes one link by its undirected endpoint pair.
    fn del_link(&mut self, params: &Value) -> Result<Value, String> {
        let src = required_id::<NodeId>(params, "src")?;
        let dst = required_id::<NodeId>(params, "dst")?;
        let Some(index) = self.links.iter().position(|link| link.joins(&src, &dst)) else {
            return Err(format!("link {src}--{dst} not found"));
        };
        let removed = self.links.remove(index);
        to_value(&removed)
    }

    /// Deletes every link touching a node.
    fn del_links_by_node(&mut self, params: &Value) -> Result<Value, String> {
        let id = required_id::<NodeId>(params, "id")?;
        let before = self.links.len();
        self.links.retain(|link| link.source != id && link.target != id);
        Ok(json!({ "deleted": before - self.links.len() }))
    }

    // ------------------------------------------------------------------
    // Prefixes
    // ------------------------------------------------------------------

    /// Returns one registered prefix by identifier.
    fn get_prefix(&self, params: &Value) -> Result<Value, String> {
        let id = required_id::<PrefixId>(params, "id")?;
        let prefix = self.prefixes.get(&id).ok_or_else(|| format!("prefix {id} not found"))?;
        to_value(prefix)
    }

    /// Registers a prefix.
    fn add_prefix(&mut self, params: Value) -> Result<Value, String> {
        let prefix: PrefixRecord = serde_json::from_value(params).map_err(|err| err.to_string())?;
        let stored = to_value(&prefix)?;
        self.prefixes.insert(prefix.id.clone(), prefix);
        Ok(stored)
    }

    /// Deletes a registered prefix by identifier.
    fn del_prefix(&mut self, params: &Value) -> Result<Value, String> {
        let id = required_id::<PrefixId>(params, "id")?;
        let removed =
            self.prefixes.remove(&id).ok_or_else(|| format!("prefix {id} not found"))?;
        to_value(removed)
    }

    /// Deletes every prefix anchored at a node.
    fn del_prefix_by_node(&mut self, params: &Value) -> Result<Value, String> {
        let id = required_id::<NodeId>(params, "id")?;
        let before = self.prefixes.len();
        self.prefixes.retain(|_, prefix| prefix.node != id);
        Ok(json!({ "deleted": before - self.prefixes.len() }))
    }

    // ------------------------------------------------------------------
    // Routes
    // ------------------------------------------------------------------

    /// Returns one recorded route by identifier.
    fn get_route(&self, params: &Value) -> Result<Value, String> {
        let id = required_id::<RouteId>(params, "id")?;
        let route = self.routes.get(&id).ok_or_else(|| format!("route {id} not found"))?;
        to_value(route)
    }

    /// Records a route.
    fn add_route(&mut self, params: Value) -> Result<Value, String> {
        let route: RouteRecord = serde_json::from_value(params).map_err(|err| err.to_string())?;
        let stored = to_value(&route)?;
        self.routes.insert(route.id.clone(), route);
        Ok(stored)
    }

    /// Deletes a route by identifier.
    fn del_route(&mut self, params: &Value) -> Result<Value, String> {
        let id = required_id::<RouteId>(params, "id")?;
        let removed = self.routes.remove(&id).ok_or_else(|| format!("route {id} not found"))?;
        to_value(removed)
    }

    /// Deletes every route traversing a node.
    fn del_routes_by_node(&mut self, params: &Value) -> Result<Value, String> {
        let id = required_id::<NodeId>(params, "id")?;
        let before = self.routes.len();
        self.routes.retain(|_, route| {
            route.from_node != id && route.target_node != id && !route.path.contains(&id)
        });
        Ok(json!({ "deleted": before - self.routes.len() }))
    }

    /// Deletes every route whose path crosses the given link.
    fn del_routes_by_link(&mut self, params: &Value) -> Result<Value, String> {
        let src = required_id::<NodeId>(params, "src")?;
        let dst = required_id::<NodeId>(params, "dst")?;
        let before = self.routes.len();
        self.routes.retain(|_, route| !path_crosses(&route.path, &src, &dst));
        Ok(json!({ "deleted": before - self.routes.len() }))
    }

    /// Deletes every route carrying a prefix.
    fn del_routes_by_prefix(&mut self, params: &Value) -> Result<Value, String> {
        let id = required_id::<PrefixId>(params, "id")?;
        let before = self.routes.len();
        self.routes.retain(|_, route| route.prefix != id);
        Ok(json!({ "deleted": before - self.routes.len() }))
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    /// Appends one measurement result.
    fn add_result(&mut self, params: Value) -> Result<Value, String> {
        let result: Measurement = serde_json::from_value(params).map_err(|err| err.to_string())?;
        self.results.push(result);
        Ok(json!({ "stored": self.results.len() }))
    }
}

/// Extracts a required identifier field from the request parameters.
fn required_id<Id: From<String>>(params: &Value, field: &str) -> Result<Id, String> {
    params
        .get(field)
        .and_then(Value::as_str)
        .map(|id| Id::from(id.to_string()))
        .ok_or_else(|| format!("missing field: {field}"))
}

/// Serializes a stored value into a reply payload.
fn to_value<T: serde::Serialize>(value: T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|err| err.to_string())
}

/// Returns true when consecutive path hops cross the undirected link.
fn path_crosses(path: &[NodeId], src: &NodeId, dst: &NodeId) -> bool {
    path.windows(2).any(|hop| {
        (&hop[0] == src && &hop[1] == dst) || (&hop[0] == dst && &hop[1] == src)
    })
}
