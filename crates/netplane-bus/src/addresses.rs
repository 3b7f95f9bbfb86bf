// crates/netplane-bus/src/addresses.rs
// ============================================================================
// Module: Netplane Bus Addresses
// Description: Well-known service addresses and broadcast topics.
// Purpose: Name the wiring points shared by services and subscribers.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Service addresses answer `{action, params}` requests; broadcast topics
//! carry fire-and-forget snapshots for passive subscribers (gateway, CLI,
//! peer services).

// ============================================================================
// SECTION: Service Addresses
// ============================================================================

/// Data streaming service address (capabilities, specifications, interrupts).
pub const DATA_SERVICE: &str = "netplane.data";

/// Topology service address (graph queries and manual node/link edits).
pub const TOPOLOGY_SERVICE: &str = "netplane.topology";

/// Routing service address (prefix and route management).
pub const ROUTING_SERVICE: &str = "netplane.routing";

/// Storage service address (persistence delegate).
pub const STORAGE_SERVICE: &str = "netplane.storage";

// ============================================================================
// SECTION: Broadcast Topics
// ============================================================================

/// Published after every topology snapshot refresh.
pub const TOPIC_TOPOLOGY_UPDATED: &str = "topology-updated";

/// Published after the registered-prefix collection changes.
pub const TOPIC_PREFIXES_UPDATED: &str = "routing-prefixes-updated";

/// Published after the route collection changes.
pub const TOPIC_ROUTES_UPDATED: &str = "routing-routes-updated";

/// Published when a node is deleted so dependents can cascade.
pub const TOPIC_NODE_DELETED: &str = "topology-node-deleted";

/// Published when a link is deleted so dependents can cascade.
pub const TOPIC_LINK_DELETED: &str = "topology-link-deleted";
