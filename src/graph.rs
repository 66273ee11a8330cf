// Static transport graph the game is played on
//
// Nodes are positive integers; every undirected edge carries the set of
// transport modes that connect its endpoints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{NodeId, Transport, TransportSet};

/// Undirected graph with per-edge transport sets
///
/// Two graphs compare equal when they have the same nodes and edges, which is
/// what the distance oracle and evaluators use to detect a stale cache.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Graph {
    adjacency: BTreeMap<NodeId, BTreeMap<NodeId, TransportSet>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from `(a, b, mode)` triples; repeated pairs accumulate modes
    pub fn from_edges(edges: &[(NodeId, NodeId, Transport)]) -> Self {
        let mut graph = Graph::new();
        for &(a, b, mode) in edges {
            graph.add_edge(a, b, mode);
        }
        graph
    }

    pub fn add_node(&mut self, node: NodeId) {
        self.adjacency.entry(node).or_default();
    }

    /// Adds `mode` to the edge between `a` and `b`, creating both nodes if needed
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, mode: Transport) {
        self.adjacency
            .entry(a)
            .or_default()
            .entry(b)
            .or_default()
            .insert(mode);
        self.adjacency
            .entry(b)
            .or_default()
            .entry(a)
            .or_default()
            .insert(mode);
    }

    /// All nodes in ascending order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// Largest node identifier, or 0 for an empty graph
    pub fn max_node(&self) -> NodeId {
        self.adjacency.keys().next_back().copied().unwrap_or(0)
    }

    /// Adjacent nodes together with the transport modes on the connecting edge
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = (NodeId, TransportSet)> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(n, modes)| (*n, *modes)))
    }

    #[cfg(test)]
    fn edge(&self, a: NodeId, b: NodeId) -> Option<TransportSet> {
        self.adjacency.get(&a).and_then(|edges| edges.get(&b)).copied()
    }
}
