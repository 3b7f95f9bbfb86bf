// crates/netplane-routing/src/path.rs
// ============================================================================
// Module: Shortest Path
// Description: Uniform-weight Dijkstra over the topology snapshot.
// Purpose: Compute minimum-hop directed paths for automatic routing.
// Dependencies: netplane-core
// ============================================================================

//! ## Overview
//! Single-source, uniform-weight Dijkstra over directed adjacency derived
//! from the snapshot's links (edges run source to target as stored, even
//! though link identity is undirected for upserts). The outcome type
//! distinguishes a found path, an absent path, and an unknown endpoint;
//! none of these is an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use netplane_core::Graph;
use netplane_core::NodeId;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Outcome of a shortest-path computation.
///
/// # Invariants
/// - `Path` sequences run source first, target last, minimum hop count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortestPath {
    /// Minimum-hop directed path from source to target.
    Path(Vec<NodeId>),
    /// Both endpoints exist but no directed path connects them.
    NoPath,
    /// The named endpoint is not present in the snapshot.
    UnknownNode(NodeId),
}

// ============================================================================
// SECTION: Dijkstra
// ============================================================================

/// Computes the minimum-hop directed path from `source` to `target`.
///
/// Distances default to unreached; the unsettled node with the strictly
/// smallest known distance is settled first. Path reconstruction walks
/// predecessors from the target back and reverses; a chain that does not
/// reach the source means no path exists. A source equal to the target
/// yields `NoPath` since no predecessor chain is recorded for it.
#[must_use]
pub fn shortest_path(graph: &Graph, source: &NodeId, target: &NodeId) -> ShortestPath {
    if graph.node(source).is_none() {
        return ShortestPath::UnknownNode(source.clone());
    }
    if graph.node(target).is_none() {
        return ShortestPath::UnknownNode(target.clone());
    }

    let mut adjacency: BTreeMap<&NodeId, Vec<&NodeId>> = BTreeMap::new();
    for link in graph.links() {
        adjacency.entry(&link.source).or_default().push(&link.target);
    }

    let mut distance: BTreeMap<&NodeId, u64> = BTreeMap::new();
    let mut predecessor: BTreeMap<&NodeId, &NodeId> = BTreeMap::new();
    let mut settled: BTreeSet<&NodeId> = BTreeSet::new();
    let mut unsettled: BTreeSet<&NodeId> = BTreeSet::new();
    distance.insert(source, 0);
    unsettled.insert(source);

    while let Some(current) = pick_closest(&unsettled, &distance) {
        unsettled.remove(current);
        settled.insert(current);
        let reached = distance.get(current).copied().unwrap_or(u64::MAX);
        for &next in adjacency.get(current).map(Vec::as_slice).unwrap_or_default() {
            if settled.contains(next) {
                continue;
            }
            let relaxed = reached.saturating_add(1);
            if relaxed < distance.get(next).copied().unwrap_or(u64::MAX) {
                distance.insert(next, relaxed);
                predecessor.insert(next, current);
            }
            unsettled.insert(next);
        }
    }

    let mut path = vec![target.clone()];
    let mut cursor = target;
    while let Some(&previous) = predecessor.get(cursor) {
        path.push(previous.clone());
        cursor = previous;
    }
    if cursor != source || path.len() < 2 {
        return ShortestPath::NoPath;
    }
    path.reverse();
    ShortestPath::Path(path)
}

/// Returns the unsettled node with the strictly smallest known distance.
fn pick_closest<'graph>(
    unsettled: &BTreeSet<&'graph NodeId>,
    distance: &BTreeMap<&'graph NodeId, u64>,
) -> Option<&'graph NodeId> {
    unsettled
        .iter()
        .min_by_key(|node| distance.get(*node).copied().unwrap_or(u64::MAX))
        .copied()
}
