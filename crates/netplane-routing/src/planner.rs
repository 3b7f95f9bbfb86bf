// crates/netplane-routing/src/planner.rs
// ============================================================================
// Module: Routing Planner
// Description: Prefix/route validation and automatic path planning.
// Purpose: Record validated routes against storage and the graph snapshot.
// Dependencies: netplane-bus, netplane-core, thiserror, tokio, crate::path
// ============================================================================

//! ## Overview
//! The planner validates every prefix and route request against storage
//! before recording it, and plans automatic routes over the latest topology
//! snapshot. Existence checks for a manual route run concurrently; both must
//! pass. New records always enter storage as `pending`. Automatic routing is
//! unavailable until the graph has been populated at least once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use netplane_bus::StorageClient;
use netplane_bus::StorageError;
use netplane_core::Graph;
use netplane_core::NodeId;
use netplane_core::PrefixId;
use netplane_core::PrefixRecord;
use netplane_core::RouteId;
use netplane_core::RouteRecord;
use netplane_core::RouteStatus;
use thiserror::Error;

use crate::path::ShortestPath;
use crate::path::shortest_path;

// ============================================================================
// SECTION: Routing Errors
// ============================================================================

/// Errors surfaced by the routing planner.
///
/// # Invariants
/// - Validation failures name the missing entity.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A referenced prefix or node does not exist.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The graph has never been populated.
    #[error("automatic path option is not available")]
    AutoUnavailable,
    /// Both endpoints exist but no directed path connects them.
    #[error("no path from {0} to {1}")]
    NoPath(NodeId, NodeId),
    /// Storage round trip failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// ============================================================================
// SECTION: Routing Planner
// ============================================================================

/// Validates and records prefixes and routes.
///
/// # Invariants
/// - `graph` is a read-only published snapshot, replaced wholesale on
///   every topology update.
pub struct RoutingPlanner {
    /// Storage delegate for records and existence checks.
    storage: StorageClient,
    /// Latest topology snapshot.
    graph: Graph,
}

impl RoutingPlanner {
    /// Creates a planner with an empty snapshot.
    #[must_use]
    pub fn new(storage: StorageClient) -> Self {
        Self {
            storage,
            graph: Graph::new(),
        }
    }

    /// Replaces the topology snapshot.
    pub fn update_graph(&mut self, graph: Graph) {
        self.graph = graph;
    }

    /// Registers a prefix after checking its anchor node exists.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Validation`] when the node is missing and
    /// storage errors otherwise.
    pub async fn add_prefix(
        &self,
        id: PrefixId,
        name: String,
        node: NodeId,
    ) -> Result<PrefixRecord, RoutingError> {
        match self.storage.get_node(&node).await {
            Ok(_) => {}
            Err(StorageError::NotFound(_)) => {
                return Err(RoutingError::Validation(format!("node {node} not found")));
            }
            Err(err) => return Err(err.into()),
        }
        let prefix = PrefixRecord {
            id,
            name,
            node,
            status: RouteStatus::Pending,
        };
        self.storage.add_prefix(&prefix).await?;
        Ok(prefix)
    }

    /// Records a manual route after concurrent prefix/node existence checks.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Validation`] naming the missing entity when
    /// either check fails, and storage errors otherwise.
    pub async fn add_route(
        &self,
        prefix: PrefixId,
        from_node: NodeId,
        path: Vec<NodeId>,
    ) -> Result<RouteRecord, RoutingError> {
        let (prefix_found, nodes_found) =
            tokio::join!(self.storage.get_prefix(&prefix), self.storage.get_nodes(&path));
        match prefix_found {
            Ok(_) => {}
            Err(StorageError::NotFound(_)) => {
                return Err(RoutingError::Validation(format!("prefix {prefix} not found")));
            }
            Err(err) => return Err(err.into()),
        }
        let found: BTreeSet<NodeId> = nodes_found?.into_iter().map(|node| node.id).collect();
        for node in &path {
            if !found.contains(node) {
                return Err(RoutingError::Validation(format!("node {node} not found")));
            }
        }
        let target_node = path.last().cloned().unwrap_or_else(|| from_node.clone());
        let route = RouteRecord {
            id: route_id(&prefix, &from_node),
            prefix,
            from_node,
            target_node,
            path,
            status: RouteStatus::Pending,
        };
        self.storage.add_route(&route).await?;
        Ok(route)
    }

    /// Plans and records an automatic route over the snapshot graph.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::AutoUnavailable`] while the graph is
    /// unpopulated, [`RoutingError::Validation`] for missing entities,
    /// [`RoutingError::NoPath`] when the endpoints are disconnected, and
    /// storage errors otherwise.
    pub async fn add_auto_route(
        &self,
        prefix: PrefixId,
        from_node: NodeId,
        target_node: NodeId,
    ) -> Result<RouteRecord, RoutingError> {
        if !self.graph.is_set() {
            return Err(RoutingError::AutoUnavailable);
        }
        let endpoints = vec![from_node.clone(), target_node.clone()];
        let (prefix_found, nodes_found) =
            tokio::join!(self.storage.get_prefix(&prefix), self.storage.get_nodes(&endpoints));
        match prefix_found {
            Ok(_) => {}
            Err(StorageError::NotFound(_)) => {
                return Err(RoutingError::Validation(format!("prefix {prefix} not found")));
            }
            Err(err) => return Err(err.into()),
        }
        let found: BTreeSet<NodeId> = nodes_found?.into_iter().map(|node| node.id).collect();
        for node in &endpoints {
            if !found.contains(node) {
                return Err(RoutingError::Validation(format!("node {node} not found")));
            }
        }
        let path = match shortest_path(&self.graph, &from_node, &target_node) {
            ShortestPath::Path(path) => path,
            ShortestPath::NoPath => {
                return Err(RoutingError::NoPath(from_node, target_node));
            }
            ShortestPath::UnknownNode(node) => {
                return Err(RoutingError::Validation(format!("node {node} not found")));
            }
        };
        let route = RouteRecord {
            id: route_id(&prefix, &from_node),
            prefix,
            from_node,
            target_node,
            path,
            status: RouteStatus::Pending,
        };
        self.storage.add_route(&route).await?;
        Ok(route)
    }

    /// Deletes a route.
    ///
    /// # Errors
    ///
    /// Returns storage errors, including [`StorageError::NotFound`].
    pub async fn del_route(&self, id: &RouteId) -> Result<(), RoutingError> {
        self.storage.del_route(id).await?;
        Ok(())
    }

    /// Deletes a prefix and cascades its routes.
    ///
    /// # Errors
    ///
    /// Returns storage errors, including [`StorageError::NotFound`].
    pub async fn del_prefix(&self, id: &PrefixId) -> Result<(), RoutingError> {
        self.storage.del_prefix(id).await?;
        self.storage.del_routes_by_prefix(id).await?;
        Ok(())
    }
}

/// Derives a route identifier from its prefix and origin.
fn route_id(prefix: &PrefixId, from_node: &NodeId) -> RouteId {
    RouteId::new(format!("{prefix}--{from_node}"))
}
