//! Iterative deepening driver.
//!
//! Runs the search at depth 1, 2, 3, ... until cancelled, publishing the best
//! move after every completed depth. A depth interrupted by cancellation is
//! discarded, so callers only ever see moves from fully searched depths.
//!
//! `run` blocks the calling thread. Cancel it and read results from other
//! threads through a [`DriverHandle`]:
//!
//! ```ignore
//! let mut driver = IterativeDeepening::new(search, config.timing.max_search_depth);
//! let handle = driver.handle();
//! let worker = std::thread::spawn(move || driver.run());
//! std::thread::sleep(budget);
//! handle.cancel();
//! let best = handle.best_move();
//! ```

use log::{info, warn};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;

use super::minimax::{Search, SearchError, SearchOutcome};
use super::CancelToken;
use crate::board::BoardState;
use crate::eval::Evaluator;
use crate::types::Move;

/// What the driver has published so far
#[derive(Debug, Clone)]
struct Published {
    best_move: Move,
    outcome: Option<SearchOutcome>,
}

/// Cloneable view of a running driver, usable from any thread
#[derive(Debug, Clone)]
pub struct DriverHandle {
    cancel: CancelToken,
    published: Arc<Mutex<Published>>,
}

impl DriverHandle {
    /// Asks the driver to stop; the running depth unwinds and is discarded
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Best move of the deepest completed depth, or the initial fallback move
    pub fn best_move(&self) -> Move {
        self.published.lock().best_move
    }

    /// Deepest fully searched depth, 0 if none has completed yet
    pub fn completed_depth(&self) -> usize {
        self.published
            .lock()
            .outcome
            .as_ref()
            .map_or(0, |outcome| outcome.depth)
    }

    /// Full result of the deepest completed depth
    pub fn last_outcome(&self) -> Option<SearchOutcome> {
        self.published.lock().outcome.clone()
    }
}

/// Anytime wrapper around a [`Search`]
pub struct IterativeDeepening<S, E> {
    search: Search<S, E>,
    max_depth: usize,
    handle: DriverHandle,
}

impl<S, E> IterativeDeepening<S, E>
where
    S: BoardState,
    E: Evaluator<S>,
{
    /// Wraps `search`, seeding the best move with a random legal root move
    ///
    /// `max_depth` caps the deepening loop; it otherwise runs until cancelled.
    pub fn new(search: Search<S, E>, max_depth: usize) -> Self {
        let moves = search.root_moves();
        let initial = moves[rand::rng().random_range(0..moves.len())];
        let handle = DriverHandle {
            cancel: search.cancel_token(),
            published: Arc::new(Mutex::new(Published {
                best_move: initial,
                outcome: None,
            })),
        };

        IterativeDeepening {
            search,
            max_depth,
            handle,
        }
    }

    pub fn handle(&self) -> DriverHandle {
        self.handle.clone()
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn best_move(&self) -> Move {
        self.handle.best_move()
    }

    /// Deepens until cancelled (or the depth cap is reached) and returns the
    /// best move of the last completed depth
    pub fn run(&mut self) -> Move {
        let started = Instant::now();
        let mut depth = 1;

        while !self.handle.is_cancelled() && depth <= self.max_depth {
            match self.search.best_move(depth) {
                Ok(outcome) => {
                    info!(
                        "Depth {} complete: {} (score: {}, pv length: {}, time: {}ms)",
                        depth,
                        outcome.best_move,
                        outcome.score,
                        outcome.pv.len(),
                        started.elapsed().as_millis()
                    );
                    let mut published = self.handle.published.lock();
                    published.best_move = outcome.best_move;
                    published.outcome = Some(outcome);
                }
                Err(SearchError::Interrupted) => {
                    info!("Search interrupted during depth {}", depth);
                    break;
                }
                Err(e) => {
                    warn!("Depth {} produced no move ({}), keeping previous result", depth, e);
                    break;
                }
            }
            depth += 1;
        }

        self.best_move()
    }

    pub fn search(&self) -> &Search<S, E> {
        &self.search
    }

    /// Releases the wrapped search, e.g. to recover its history table
    pub fn into_search(self) -> Search<S, E> {
        self.search
    }
}
