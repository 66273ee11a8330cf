//! All-pairs shortest-path distances over the transport graph.
//!
//! The oracle runs Dijkstra from every node once at construction and answers
//! `distance(a, b)` in O(1) afterwards. How much an edge costs is decided by an
//! [`EdgeCost`] policy injected at build time:
//!
//! - [`UniformCost`]: every edge costs 1, so distances are move counts.
//! - [`TicketWeightedCost`]: an edge costs as much as its cheapest transport
//!   mode, so nodes only reachable through scarce tickets look farther away.
//!
//! An oracle is immutable once built. If the graph changes, build a new one;
//! [`DistanceOracle::built_for`] tells callers whether a cached oracle is stale.

use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

use crate::config::EdgeCostConfig;
use crate::graph::Graph;
use crate::types::{NodeId, TransportSet};

/// Distance reported between nodes with no connecting path
pub const UNREACHABLE: u32 = u32::MAX;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("cannot build a distance oracle for an empty graph")]
    EmptyGraph,
    #[error("node {0} is not part of the graph this oracle was built from")]
    UnknownNode(NodeId),
}

/// Cost of travelling along one edge, given the modes available on it
pub trait EdgeCost: Debug + Send + Sync {
    fn cost(&self, modes: TransportSet) -> u32;
}

/// Every edge costs one move
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformCost;

impl EdgeCost for UniformCost {
    fn cost(&self, _modes: TransportSet) -> u32 {
        1
    }
}

/// Edges cost as much as the cheapest ticket that can travel them
#[derive(Debug, Clone)]
pub struct TicketWeightedCost {
    costs: EdgeCostConfig,
}

impl TicketWeightedCost {
    pub fn new(costs: EdgeCostConfig) -> Self {
        TicketWeightedCost { costs }
    }
}

impl EdgeCost for TicketWeightedCost {
    fn cost(&self, modes: TransportSet) -> u32 {
        modes
            .iter()
            .map(|mode| self.costs.cost_of(mode.required_ticket()))
            .min()
            .unwrap_or(self.costs.double)
    }
}

/// Precomputed distance matrix for one graph under one cost policy
#[derive(Debug)]
pub struct DistanceOracle {
    graph: Arc<Graph>,
    index: HashMap<NodeId, usize>,
    node_count: usize,
    /// Row-major `node_count * node_count` matrix
    distances: Vec<u32>,
}

impl DistanceOracle {
    /// Runs Dijkstra from every node of `graph` and caches the results
    pub fn build(graph: Arc<Graph>, cost: Arc<dyn EdgeCost>) -> Result<Self, OracleError> {
        if graph.is_empty() {
            return Err(OracleError::EmptyGraph);
        }

        let nodes: Vec<NodeId> = graph.nodes().collect();
        let index: HashMap<NodeId, usize> =
            nodes.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        let node_count = nodes.len();

        // Index-based adjacency with edge costs resolved once up front
        let adjacency: Vec<Vec<(usize, u32)>> = nodes
            .iter()
            .map(|node| {
                graph
                    .neighbours(*node)
                    .filter_map(|(n, modes)| index.get(&n).map(|i| (*i, cost.cost(modes))))
                    .collect()
            })
            .collect();

        let rows: Vec<Vec<u32>> = (0..node_count)
            .into_par_iter()
            .map(|source| single_source(&adjacency, source))
            .collect();

        let distances = rows.into_iter().flatten().collect();

        Ok(DistanceOracle {
            graph,
            index,
            node_count,
            distances,
        })
    }

    /// Distance between two nodes of the graph
    ///
    /// # Panics
    /// If either node is not part of the graph the oracle was built from. Use
    /// [`DistanceOracle::try_distance`] when that cannot be guaranteed.
    pub fn distance(&self, from: NodeId, to: NodeId) -> u32 {
        match self.try_distance(from, to) {
            Ok(d) => d,
            Err(e) => panic!("distance lookup on foreign node: {}", e),
        }
    }

    pub fn try_distance(&self, from: NodeId, to: NodeId) -> Result<u32, OracleError> {
        let i = self.index_of(from)?;
        let j = self.index_of(to)?;
        Ok(self.distances[i * self.node_count + j])
    }

    pub fn is_reachable(&self, from: NodeId, to: NodeId) -> bool {
        matches!(self.try_distance(from, to), Ok(d) if d != UNREACHABLE)
    }

    /// Whether this oracle was built from a graph equal to `graph`
    pub fn built_for(&self, graph: &Graph) -> bool {
        std::ptr::eq(self.graph.as_ref(), graph) || self.graph.as_ref() == graph
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    fn index_of(&self, node: NodeId) -> Result<usize, OracleError> {
        self.index
            .get(&node)
            .copied()
            .ok_or(OracleError::UnknownNode(node))
    }
}

/// Dijkstra from one source over index-based adjacency
///
/// The frontier is an ordered set of `(tentative, index)` pairs; improving a
/// node's distance removes its old entry and re-inserts it.
fn single_source(adjacency: &[Vec<(usize, u32)>], source: usize) -> Vec<u32> {
    let mut tentative = vec![UNREACHABLE; adjacency.len()];
    let mut settled = vec![false; adjacency.len()];
    let mut frontier: BTreeSet<(u32, usize)> = BTreeSet::new();

    tentative[source] = 0;
    frontier.insert((0, source));

    while let Some((dist, current)) = frontier.pop_first() {
        settled[current] = true;

        for &(next, edge_cost) in &adjacency[current] {
            if settled[next] {
                continue;
            }
            let candidate = dist.saturating_add(edge_cost);
            if candidate < tentative[next] {
                if tentative[next] != UNREACHABLE {
                    frontier.remove(&(tentative[next], next));
                }
                tentative[next] = candidate;
                frontier.insert((candidate, next));
            }
        }
    }

    tentative
}
