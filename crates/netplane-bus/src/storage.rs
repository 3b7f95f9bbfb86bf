// crates/netplane-bus/src/storage.rs
// ============================================================================
// Module: Netplane Storage Client
// Description: Typed client for the storage service address.
// Purpose: Wrap the storage action contract behind method calls.
// Dependencies: netplane-core, serde_json, crate::bus
// ============================================================================

//! ## Overview
//! Storage is an external collaborator consumed over the dispatch bus:
//! `{action, params}` in, `{content | error}` out. [`StorageClient`] names
//! every storage action as a typed method so callers never hand-assemble
//! envelopes.
//! Invariants:
//! - Missing entities surface as [`StorageError::NotFound`].
//! - Every other error reply surfaces as [`StorageError::Backend`].

// ============================================================================
// SECTION: Imports
// ============================================================================

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
use thiserror::Error;

use crate::addresses::STORAGE_SERVICE;
use crate::bus::Bus;
use crate::envelope::Request;

// ============================================================================
// SECTION: Storage Errors
// ============================================================================

/// Marker substring storage services use for missing entities.
const NOT_FOUND_MARKER: &str = "not found";

/// Errors surfaced by storage calls.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Requested entity does not exist.
    #[error("storage entity not found: {0}")]
    NotFound(String),
    /// Storage reported an operational error.
    #[error("storage error: {0}")]
    Backend(String),
    /// Storage replied without content.
    #[error("storage reply carried no content for action {0}")]
    MissingContent(String),
    /// Storage content failed to decode.
    #[error("storage content for action {action} failed to decode: {detail}")]
    Decode {
        /// Action whose content was malformed.
        action: String,
        /// Decoder error description.
        detail: String,
    },
}

// ============================================================================
// SECTION: Storage Client
// ============================================================================

/// Typed client for the storage service address.
///
/// # Invariants
/// - Stateless; clones share the underlying bus handle.
#[derive(Debug, Clone)]
pub struct StorageClient {
    /// Bus the storage service is registered on.
    bus: Bus,
}

impl StorageClient {
    /// Creates a storage client over the given bus.
    #[must_use]
    pub const fn new(bus: Bus) -> Self {
        Self {
            bus,
        }
    }

    /// Sends one storage action and unwraps the content envelope.
    async fn call(&self, action: &str, params: Value) -> Result<Value, StorageError> {
        let response = self.bus.request(STORAGE_SERVICE, Request::new(action, params)).await;
        if let Some(error) = response.error {
            if error.contains(NOT_FOUND_MARKER) {
                return Err(StorageError::NotFound(error));
            }
            return Err(StorageError::Backend(error));
        }
        response.content.ok_or_else(|| StorageError::MissingContent(action.to_string()))
    }

    /// Decodes a storage content payload into a typed value.
    fn decode<T: serde::de::DeserializeOwned>(
        action: &str,
        content: Value,
    ) -> Result<T, StorageError> {
        serde_json::from_value(content).map_err(|err| StorageError::Decode {
            action: action.to_string(),
            detail: err.to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Fetches one node by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] for unknown identifiers.
    pub async fn get_node(&self, id: &NodeId) -> Result<Node, StorageError> {
        let content = self.call("get_node", json!({ "id": id })).await?;
        Self::decode("get_node", content)
    }

    /// Fetches the subset of the given nodes that exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn get_nodes(&self, ids: &[NodeId]) -> Result<Vec<Node>, StorageError> {
        let content = self.call("get_nodes", json!({ "ids": ids })).await?;
        Self::decode("get_nodes", content)
    }

    /// Fetches every stored node.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn get_all_nodes(&self) -> Result<Vec<Node>, StorageError> {
        let content = self.call("get_all_nodes", json!({})).await?;
        Self::decode("get_all_nodes", content)
    }

    /// Inserts or replaces a node.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn add_node(&self, node: &Node) -> Result<(), StorageError> {
        self.call("add_node", json!(node)).await.map(|_| ())
    }

    /// Deletes a node by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] for unknown identifiers.
    pub async fn del_node(&self, id: &NodeId) -> Result<(), StorageError> {
        self.call("del_node", json!({ "id": id })).await.map(|_| ())
    }

    /// Deletes every link touching a node.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn del_links_by_node(&self, id: &NodeId) -> Result<(), StorageError> {
        self.call("del_links_by_node", json!({ "id": id })).await.map(|_| ())
    }

    /// Inserts or replaces a link by its undirected endpoint pair.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn add_link(&self, link: &Link) -> Result<(), StorageError> {
        self.call("add_link", json!(link)).await.map(|_| ())
    }

    /// Deletes one link by its undirected endpoint pair.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] for unknown endpoint pairs.
    pub async fn del_link(&self, src: &NodeId, dst: &NodeId) -> Result<(), StorageError> {
        self.call("del_link", json!({ "src": src, "dst": dst })).await.map(|_| ())
    }

    /// Fetches every stored link.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn get_all_links(&self) -> Result<Value, StorageError> {
        self.call("get_all_links", json!({})).await
    }

    // ------------------------------------------------------------------
    // Prefixes
    // ------------------------------------------------------------------

    /// Fetches one registered prefix by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] for unknown identifiers.
    pub async fn get_prefix(&self, id: &PrefixId) -> Result<PrefixRecord, StorageError> {
        let content = self.call("get_prefix", json!({ "id": id })).await?;
        Self::decode("get_prefix", content)
    }

    /// Fetches every registered prefix.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn get_all_prefixes(&self) -> Result<Vec<PrefixRecord>, StorageError> {
        let content = self.call("get_all_prefixes", json!({})).await?;
        Self::decode("get_all_prefixes", content)
    }

    /// Registers a prefix.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn add_prefix(&self, prefix: &PrefixRecord) -> Result<(), StorageError> {
        self.call("add_prefix", json!(prefix)).await.map(|_| ())
    }

    /// Deletes a registered prefix by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] for unknown identifiers.
    pub async fn del_prefix(&self, id: &PrefixId) -> Result<(), StorageError> {
        self.call("del_prefix", json!({ "id": id })).await.map(|_| ())
    }

    /// Deletes every prefix anchored at a node.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn del_prefix_by_node(&self, id: &NodeId) -> Result<(), StorageError> {
        self.call("del_prefix_by_node", json!({ "id": id })).await.map(|_| ())
    }

    // ------------------------------------------------------------------
    // Routes
    // ------------------------------------------------------------------

    /// Fetches one route by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] for unknown identifiers.
    pub async fn get_route(&self, id: &RouteId) -> Result<RouteRecord, StorageError> {
        let content = self.call("get_route", json!({ "id": id })).await?;
        Self::decode("get_route", content)
    }

    /// Fetches every stored route.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn get_all_routes(&self) -> Result<Vec<RouteRecord>, StorageError> {
        let content = self.call("get_all_routes", json!({})).await?;
        Self::decode("get_all_routes", content)
    }

    /// Records a route.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn add_route(&self, route: &RouteRecord) -> Result<(), StorageError> {
        self.call("add_route", json!(route)).await.map(|_| ())
    }

    /// Deletes a route by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] for unknown identifiers.
    pub async fn del_route(&self, id: &RouteId) -> Result<(), StorageError> {
        self.call("del_route", json!({ "id": id })).await.map(|_| ())
    }

    /// Deletes every route traversing a node.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn del_routes_by_node(&self, id: &NodeId) -> Result<(), StorageError> {
        self.call("del_routes_by_node", json!({ "id": id })).await.map(|_| ())
    }

    /// Deletes every route traversing a link.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn del_routes_by_link(&self, src: &NodeId, dst: &NodeId) -> Result<(), StorageError> {
        self.call("del_routes_by_link", json!({ "src": src, "dst": dst })).await.map(|_| ())
    }

    /// Deletes every route carrying a prefix.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn del_routes_by_prefix(&self, id: &PrefixId) -> Result<(), StorageError> {
        self.call("del_routes_by_prefix", json!({ "id": id })).await.map(|_| ())
    }

    // ------------------------------------------------------------------
    // Topology and results
    // ------------------------------------------------------------------

    /// Fetches the persisted topology snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn get_topology(&self) -> Result<Value, StorageError> {
        self.call("get_topology", json!({})).await
    }

    /// Persists one streamed measurement result.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the storage call fails.
    pub async fn add_result(&self, result: &Measurement) -> Result<(), StorageError> {
        self.call("add_result", json!(result)).await.map(|_| ())
    }
}
