// Move pickers that sit between the game orchestration layer and the search
//
// The evader agent runs the iterative-deepening search under a wall-clock
// budget; the seeker agent looks one move ahead. Both always hand back a legal
// move, falling back to the first legal one when anything goes wrong.

use log::{debug, error, info, warn};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::board::BoardState;
use crate::config::Config;
use crate::debug_logger::{DebugLogger, DecisionRecord};
use crate::distance::{DistanceOracle, OracleError, UniformCost};
use crate::eval::{ClosestSeekerEvaluator, Evaluator, SumOfDistancesEvaluator};
use crate::graph::Graph;
use crate::search::{HistoryTable, IterativeDeepening, Search, SearchError};
use crate::types::{Move, Side};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error("state has no legal moves")]
    NoLegalMoves,
}

/// Time-boxed paranoid-search agent for the evader
///
/// Takes static configuration plus the graph it expects to play on, and keeps
/// its precomputed distance data and history table across moves. History
/// ordering is only used on that reference graph.
pub struct EvaderAgent {
    config: Config,
    reference_graph: Arc<Graph>,
    evaluator: Arc<ClosestSeekerEvaluator>,
    oracle: Arc<DistanceOracle>,
    history: Option<HistoryTable>,
    debug_logger: DebugLogger,
}

impl EvaderAgent {
    /// Precomputes distances for `graph`
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the agent's lifetime
    /// * `graph` - Graph most games will be played on; other graphs trigger a rebuild
    pub fn new(config: Config, graph: Arc<Graph>) -> Result<Self, AgentError> {
        let evaluator = ClosestSeekerEvaluator::new(graph.clone(), &config)?;
        let oracle = DistanceOracle::build(graph.clone(), Arc::new(UniformCost))?;
        Ok(EvaderAgent {
            config,
            reference_graph: graph,
            evaluator: Arc::new(evaluator),
            oracle: Arc::new(oracle),
            history: None,
            debug_logger: DebugLogger::disabled(),
        })
    }

    /// Same as [`EvaderAgent::new`], with the decision log opened as the
    /// `[debug]` section of `config` asks
    pub async fn from_config(config: Config, graph: Arc<Graph>) -> Result<Self, AgentError> {
        let debug_logger =
            DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
        let mut agent = Self::new(config, graph)?;
        agent.debug_logger = debug_logger;
        Ok(agent)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Computes the evader's next move within the configured time budget
    ///
    /// This method orchestrates the async polling and CPU-bound search:
    /// 1. Spawns the iterative-deepening search on the blocking thread pool
    /// 2. Polls until the effective budget is spent or the search finishes
    /// 3. Cancels the search and returns the deepest completed result
    ///
    /// # Returns
    /// * `Ok(Move)` - A legal move for the evader
    /// * `Err(AgentError)` - The state is terminal or not the evader's turn
    pub async fn pick_move<S>(&mut self, state: &S) -> Result<Move, AgentError>
    where
        S: BoardState + 'static,
    {
        let start_time = Instant::now();
        let round = state.round();
        info!("Round {}: Computing evader move", round);

        self.refresh_for_graph(state.graph())?;
        let on_reference = self.is_reference_graph(state.graph());
        let use_history = self.config.move_ordering.use_history && on_reference;

        let pieces = state.seeker_locations().len() + 1;
        let max_node = state.graph().max_node();
        let mut history = match self.history.take() {
            Some(table) if table.fits(pieces, max_node) => table,
            _ => HistoryTable::new(pieces, max_node),
        };
        history.clear();

        let search = Search::new(
            self.evaluator.clone(),
            state.clone(),
            self.oracle.clone(),
            history,
            use_history,
            &self.config,
        )?;
        let mut driver = IterativeDeepening::new(search, self.config.timing.max_search_depth);
        let handle = driver.handle();

        let worker = tokio::task::spawn_blocking(move || {
            driver.run();
            driver.into_search().into_history()
        });

        // Polling loop: check for completion or timeout
        let effective_budget = self.config.timing.effective_budget_ms();
        let polling_interval = Duration::from_millis(self.config.timing.polling_interval_ms);
        loop {
            let elapsed = start_time.elapsed().as_millis() as u64;
            if elapsed >= effective_budget || worker.is_finished() {
                break;
            }
            tokio::time::sleep(polling_interval).await;
        }

        handle.cancel();
        match worker.await {
            Ok(history) => self.history = Some(history),
            Err(e) => error!("Search worker failed: {}", e),
        }

        let legal = state.available_moves();
        let mut chosen = handle.best_move();
        if !legal.contains(&chosen) {
            error!("Search returned an illegal move {}, falling back", chosen);
            chosen = *legal.first().ok_or(AgentError::NoLegalMoves)?;
        }

        let outcome = handle.last_outcome();
        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Round {}: Chose {} (score: {:?}, depth: {}, time: {}ms)",
            round,
            chosen,
            outcome.as_ref().map(|o| o.score),
            handle.completed_depth(),
            elapsed_ms
        );

        self.debug_logger.log_decision(DecisionRecord {
            round,
            chosen_move: chosen,
            completed_depth: handle.completed_depth(),
            score: outcome.as_ref().map(|o| o.score),
            pv: outcome
                .map(|o| o.pv.moves().to_vec())
                .unwrap_or_default(),
            elapsed_ms,
        });

        Ok(chosen)
    }

    fn is_reference_graph(&self, graph: &Arc<Graph>) -> bool {
        Arc::ptr_eq(&self.reference_graph, graph) || *self.reference_graph == **graph
    }

    /// Rebuilds cached distance data when the state is on a different graph
    fn refresh_for_graph(&mut self, graph: &Arc<Graph>) -> Result<(), AgentError> {
        if self.evaluator.matches_graph(graph) && self.oracle.built_for(graph) {
            return Ok(());
        }
        warn!("Cached distances do not match the game graph, rebuilding");
        self.evaluator = Arc::new(ClosestSeekerEvaluator::new(graph.clone(), &self.config)?);
        self.oracle = Arc::new(DistanceOracle::build(graph.clone(), Arc::new(UniformCost))?);
        Ok(())
    }
}

/// One-move lookahead agent using the sum-of-distances evaluation
///
/// Seekers do not see the evader, so a seeker move is scored by summing the
/// distances from every candidate evader location to the seekers after the
/// move, and the lowest total wins. If asked to move for the evader it
/// maximises the evaluation of the resulting state instead. With probability
/// `1 - best_move_probability` a uniformly random legal move is played.
pub struct SeekerAgent {
    config: Config,
    evaluator: SumOfDistancesEvaluator,
}

impl SeekerAgent {
    pub fn new(config: Config, graph: Arc<Graph>) -> Result<Self, AgentError> {
        let evaluator = SumOfDistancesEvaluator::new(graph)?;
        Ok(SeekerAgent { config, evaluator })
    }

    pub fn pick_move<S: BoardState>(&mut self, state: &S) -> Result<Move, AgentError> {
        if !self.evaluator.matches_graph(state.graph()) {
            warn!("Cached distances do not match the game graph, rebuilding");
            self.evaluator = SumOfDistancesEvaluator::new(state.graph().clone())?;
        }

        let moves = state.available_moves();
        let Some(first) = moves.first() else {
            return Err(AgentError::NoLegalMoves);
        };
        let maximise = first.commenced_by().side() == Side::Evader;

        let mut best: Option<(f32, Move)> = None;
        for mv in &moves {
            let next = state.advance(mv);
            let score = if maximise {
                self.evaluator.score(&next)
            } else {
                self.candidate_distance_total(state, &next)
            };
            let better = match best {
                None => true,
                Some((best_score, _)) if maximise => score >= best_score,
                Some((best_score, _)) => score <= best_score,
            };
            if better {
                best = Some((score, *mv));
            }
        }

        let mut rng = rand::rng();
        let chosen = if rng.random::<f64>() > self.config.seeker.best_move_probability {
            moves.choose(&mut rng).copied()
        } else {
            best.map(|(_, mv)| mv)
        };

        Ok(chosen.unwrap_or(*first))
    }

    /// Sum of uniform distances from each of `before`'s candidate evader
    /// locations to every seeker in `after`
    fn candidate_distance_total<S: BoardState>(&self, before: &S, after: &S) -> f32 {
        let oracle = self.evaluator.distance_oracle();
        let seekers = after.seeker_locations();
        let mut total = 0.0;
        for &candidate in before.candidate_locations() {
            for (piece, location) in &seekers {
                match oracle.try_distance(candidate, *location) {
                    Ok(d) => total += d as f32,
                    Err(e) => debug!("Skipping {} at {} in seeker scoring: {}", piece, location, e),
                }
            }
        }
        total
    }
}
