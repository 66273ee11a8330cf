//! Static evaluation of game states from the evader's point of view.
//!
//! Scores live in `[SEEKERS_WIN, EVADER_WINS]`: terminal states map onto the
//! two sentinels, everything else is a heuristic clipped into that range.
//! The sentinels are finite so that scores can still be compared and summed.

use log::warn;
use std::sync::Arc;

use crate::board::BoardState;
use crate::config::{Config, EvaluationConfig};
use crate::distance::{DistanceOracle, OracleError, TicketWeightedCost, UniformCost};
use crate::graph::Graph;
use crate::types::{Piece, Side, Ticket};

/// Score of a state the evader has won
pub const EVADER_WINS: f32 = 10_000.0;
/// Score of a state the seekers have won
pub const SEEKERS_WIN: f32 = 0.0;

/// Turns a state into a scalar score; higher is better for the evader
///
/// Implementations cache per-graph data. Callers must check
/// [`Evaluator::matches_graph`] before scoring a state and rebuild the
/// evaluator when it fails: scores on a foreign graph are meaningless.
pub trait Evaluator<S: BoardState>: Send + Sync {
    fn score(&self, state: &S) -> f32;

    fn matches_graph(&self, graph: &Graph) -> bool;
}

/// Terminal sentinel for finished games, `None` while the game is going
pub fn terminal_score<S: BoardState>(state: &S) -> Option<f32> {
    match state.winner() {
        Some(Side::Evader) => Some(EVADER_WINS),
        Some(Side::Seekers) => Some(SEEKERS_WIN),
        None => None,
    }
}

/// Clamps a heuristic score into the sentinel range
///
/// A clipped score means a heuristic produced something out of range, which is
/// logged rather than tolerated silently.
pub fn clip_score(score: f32) -> f32 {
    let clipped = score.clamp(SEEKERS_WIN, EVADER_WINS);
    if clipped != score || score.is_nan() {
        warn!("Heuristic score {} clipped to {}", score, clipped);
    }
    if score.is_nan() {
        SEEKERS_WIN
    } else {
        clipped
    }
}

/// Sum of hop distances from the evader to every seeker
#[derive(Debug, Clone)]
pub struct SumOfDistancesEvaluator {
    oracle: Arc<DistanceOracle>,
}

impl SumOfDistancesEvaluator {
    /// Builds a uniform-cost oracle for `graph`
    pub fn new(graph: Arc<Graph>) -> Result<Self, OracleError> {
        let oracle = DistanceOracle::build(graph, Arc::new(UniformCost))?;
        Ok(SumOfDistancesEvaluator {
            oracle: Arc::new(oracle),
        })
    }

    pub fn distance_oracle(&self) -> &Arc<DistanceOracle> {
        &self.oracle
    }

    /// Whether the cached oracle was built from `graph`
    pub fn matches_graph(&self, graph: &Graph) -> bool {
        self.oracle.built_for(graph)
    }
}

impl<S: BoardState> Evaluator<S> for SumOfDistancesEvaluator {
    fn score(&self, state: &S) -> f32 {
        if let Some(score) = terminal_score(state) {
            return score;
        }
        let evader = state.evader_location();
        let total: f32 = state
            .seeker_locations()
            .iter()
            .map(|(_, location)| self.oracle.distance(evader, *location) as f32)
            .sum();
        clip_score(total)
    }

    fn matches_graph(&self, graph: &Graph) -> bool {
        self.oracle.built_for(graph)
    }
}

/// Composite score dominated by the ticket-weighted distance to the nearest seeker
///
/// Also rewards a large mean seeker distance, a large set of candidate evader
/// locations and a healthy supply of secret tickets.
#[derive(Debug, Clone)]
pub struct ClosestSeekerEvaluator {
    oracle: Arc<DistanceOracle>,
    weights: EvaluationConfig,
}

impl ClosestSeekerEvaluator {
    /// Builds a ticket-weighted oracle for `graph`
    pub fn new(graph: Arc<Graph>, config: &Config) -> Result<Self, OracleError> {
        let policy = TicketWeightedCost::new(config.edge_costs.clone());
        let oracle = DistanceOracle::build(graph, Arc::new(policy))?;
        Ok(ClosestSeekerEvaluator {
            oracle: Arc::new(oracle),
            weights: config.evaluation.clone(),
        })
    }

    pub fn distance_oracle(&self) -> &Arc<DistanceOracle> {
        &self.oracle
    }

    /// Whether the cached oracle was built from `graph`
    pub fn matches_graph(&self, graph: &Graph) -> bool {
        self.oracle.built_for(graph)
    }
}

impl<S: BoardState> Evaluator<S> for ClosestSeekerEvaluator {
    fn score(&self, state: &S) -> f32 {
        if let Some(score) = terminal_score(state) {
            return score;
        }
        let evader = state.evader_location();
        let distances: Vec<f32> = state
            .seeker_locations()
            .iter()
            .map(|(_, location)| self.oracle.distance(*location, evader) as f32)
            .collect();

        let (nearest, mean) = if distances.is_empty() {
            (0.0, 0.0)
        } else {
            let nearest = distances.iter().copied().fold(f32::INFINITY, f32::min);
            let mean = distances.iter().sum::<f32>() / distances.len() as f32;
            (nearest, mean)
        };
        let candidates = state.candidate_locations().len() as f32;
        let secrets = state.ticket_count(Piece::Evader, Ticket::Secret) as f32;

        let score = self.weights.nearest_seeker_weight * nearest
            + self.weights.mean_distance_weight * mean
            + self.weights.candidate_locations_weight * candidates
            + self.weights.secret_tickets_weight * secrets;
        clip_score(score)
    }

    fn matches_graph(&self, graph: &Graph) -> bool {
        self.oracle.built_for(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_score_keeps_in_range_values() {
        assert_eq!(clip_score(42.0), 42.0);
        assert_eq!(clip_score(SEEKERS_WIN), SEEKERS_WIN);
        assert_eq!(clip_score(EVADER_WINS), EVADER_WINS);
    }

    #[test]
    fn test_clip_score_clamps_out_of_range_values() {
        assert_eq!(clip_score(1e9), EVADER_WINS);
        assert_eq!(clip_score(-5.0), SEEKERS_WIN);
        assert_eq!(clip_score(f32::NAN), SEEKERS_WIN);
    }
}
