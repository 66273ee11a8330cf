//! Paranoid alpha-beta search from the evader's point of view.
//!
//! The evader maximises and all seekers together form one minimising
//! adversary. Each call walks the same pipeline: terminal check, move
//! generation, domain filtering, move ordering, then child expansion inside a
//! fail-hard alpha-beta window. Cutoff moves feed the killer and history
//! tables; the best line found at one depth seeds ordering at the next.

use log::{debug, info};
use std::cmp::Ordering;
use std::mem;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use super::filter::{Child, FilterOutcome, MoveFilter};
use super::history::HistoryTable;
use super::killer::KillerTable;
use super::pv::PvLine;
use super::CancelToken;
use crate::board::BoardState;
use crate::config::Config;
use crate::distance::DistanceOracle;
use crate::eval::Evaluator;
use crate::types::{Move, Side};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("search root must not be a terminal state")]
    TerminalRoot,
    #[error("search root must be the evader's turn")]
    NotEvaderTurn,
    #[error("search interrupted")]
    Interrupted,
    #[error("search finished without finding a move")]
    NoMoveFound,
}

/// Counters collected over one fixed-depth search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaf_evaluations: u64,
    pub cutoffs: u64,
    pub degenerate_filters: u64,
}

/// Result of one completed fixed-depth search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best_move: Move,
    pub score: f32,
    pub pv: PvLine,
    pub depth: usize,
    pub stats: SearchStats,
}

/// Ordering buckets, searched in ascending order
const BUCKET_PV: u8 = 0;
const BUCKET_KILLER: u8 = 1;
const BUCKET_PREVIOUS_KILLER: u8 = 2;
const BUCKET_HISTORY: u8 = 3;
const BUCKET_REST: u8 = 4;

#[derive(Debug, Clone, Copy)]
struct OrderKey {
    bucket: u8,
    history: u32,
    eval: f32,
}

/// One search instance, owning its root and its move-ordering tables
///
/// Not meant to be shared: run two searches concurrently by building two
/// instances over the same evaluator and oracle.
pub struct Search<S, E> {
    root: S,
    root_moves: Vec<Move>,
    evaluator: Arc<E>,
    oracle: Arc<DistanceOracle>,
    history: HistoryTable,
    use_history: bool,
    filtering: bool,
    opening_rounds: usize,
    killers_per_ply: usize,
    previous_pv: PvLine,
    current_killers: KillerTable,
    previous_killers: KillerTable,
    cancel: CancelToken,
    max_depth: usize,
    stats: SearchStats,
}

impl<S, E> Search<S, E>
where
    S: BoardState,
    E: Evaluator<S>,
{
    /// Creates a search rooted at `root`
    ///
    /// # Arguments
    /// * `evaluator` - Scores leaves and breaks ordering ties
    /// * `root` - Non-terminal state with the evader to move
    /// * `oracle` - Uniform-cost oracle used by seeker move filtering
    /// * `history` - Table to reuse; it is cleared at every depth
    /// * `use_history` - Whether history scores take part in move ordering
    /// * `config` - Filtering and ordering constants
    pub fn new(
        evaluator: Arc<E>,
        root: S,
        oracle: Arc<DistanceOracle>,
        history: HistoryTable,
        use_history: bool,
        config: &Config,
    ) -> Result<Self, SearchError> {
        let root_moves = root.available_moves();
        if root.is_terminal() || root_moves.is_empty() {
            return Err(SearchError::TerminalRoot);
        }
        if root_moves[0].commenced_by().side() != Side::Evader {
            return Err(SearchError::NotEvaderTurn);
        }

        Ok(Search {
            root,
            root_moves,
            evaluator,
            oracle,
            history,
            use_history,
            filtering: config.filtering.enabled,
            opening_rounds: config.filtering.opening_rounds,
            killers_per_ply: config.move_ordering.killer_moves_per_ply,
            previous_pv: PvLine::new(),
            current_killers: KillerTable::default(),
            previous_killers: KillerTable::default(),
            cancel: CancelToken::new(),
            max_depth: 0,
            stats: SearchStats::default(),
        })
    }

    pub fn root(&self) -> &S {
        &self.root
    }

    /// Legal moves at the root, in generation order
    pub fn root_moves(&self) -> &[Move] {
        &self.root_moves
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Sets the cancellation flag; an in-progress search unwinds promptly
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn history(&self) -> &HistoryTable {
        &self.history
    }

    /// Gives the history table back for reuse by a later search
    pub fn into_history(self) -> HistoryTable {
        self.history
    }

    /// Principal variation of the last completed depth
    pub fn previous_pv(&self) -> &PvLine {
        &self.previous_pv
    }

    /// Searches to `max_depth` plies and returns the best root move
    ///
    /// On interruption nothing from this depth is kept: the previous PV and
    /// killers stay in place for the next call.
    pub fn best_move(&mut self, max_depth: usize) -> Result<SearchOutcome, SearchError> {
        let started = Instant::now();
        self.max_depth = max_depth;
        self.history.clear();
        self.current_killers = KillerTable::new(max_depth, self.killers_per_ply);
        self.stats = SearchStats::default();

        let root = self.root.clone();
        let is_pv = !self.previous_pv.is_empty();
        let mut line = PvLine::new();
        let score = self.search(
            &root,
            max_depth,
            f32::NEG_INFINITY,
            f32::INFINITY,
            &mut line,
            is_pv,
        )?;

        self.previous_pv = line.clone();
        self.previous_killers = mem::take(&mut self.current_killers);

        debug!(
            "Depth {} searched in {}ms: {} nodes, {} leaves, {} cutoffs, {} degenerate filters",
            max_depth,
            started.elapsed().as_millis(),
            self.stats.nodes,
            self.stats.leaf_evaluations,
            self.stats.cutoffs,
            self.stats.degenerate_filters
        );

        let best_move = *line.first().ok_or(SearchError::NoMoveFound)?;
        Ok(SearchOutcome {
            best_move,
            score,
            pv: line,
            depth: max_depth,
            stats: self.stats,
        })
    }

    fn search(
        &mut self,
        state: &S,
        depth: usize,
        mut alpha: f32,
        mut beta: f32,
        pline: &mut PvLine,
        is_pv: bool,
    ) -> Result<f32, SearchError> {
        if self.cancel.is_cancelled() {
            return Err(SearchError::Interrupted);
        }
        self.stats.nodes += 1;
        pline.clear();

        if depth == 0 || state.is_terminal() {
            self.stats.leaf_evaluations += 1;
            return Ok(self.evaluator.score(state));
        }

        let moves = state.available_moves();
        if moves.is_empty() {
            info!("Non-terminal state without legal moves, scoring as a leaf");
            self.stats.leaf_evaluations += 1;
            return Ok(self.evaluator.score(state));
        }
        let is_maximiser = moves[0].commenced_by().is_evader();
        let ply = self.max_depth - depth;

        let mut children: Vec<Child<S>> = moves
            .into_iter()
            .map(|mv| Child {
                state: state.advance(&mv),
                mv,
            })
            .collect();

        if self.filtering {
            let filter = MoveFilter::new(&self.oracle, self.opening_rounds);
            if filter.apply(state, &mut children) == FilterOutcome::Degenerate {
                self.stats.degenerate_filters += 1;
            }
        }

        let children = self.order_moves(children, is_pv, ply)?;

        let mut line = PvLine::new();
        let mut best = if is_maximiser {
            f32::NEG_INFINITY
        } else {
            f32::INFINITY
        };

        for (i, child) in children.iter().enumerate() {
            let next_is_pv = is_pv && i == 0 && ply + 1 < self.previous_pv.len();
            let value = self.search(&child.state, depth - 1, alpha, beta, &mut line, next_is_pv)?;

            if is_maximiser {
                best = best.max(value);
                if best >= beta {
                    self.record_cutoff(child.mv, ply, depth);
                    return Ok(beta);
                }
                if best > alpha {
                    alpha = best;
                    pline.set_line(child.mv, &line);
                }
            } else {
                best = best.min(value);
                if best <= alpha {
                    self.record_cutoff(child.mv, ply, depth);
                    return Ok(alpha);
                }
                if best < beta {
                    beta = best;
                    pline.set_line(child.mv, &line);
                }
            }
        }

        Ok(best)
    }

    fn record_cutoff(&mut self, mv: Move, ply: usize, depth: usize) {
        self.stats.cutoffs += 1;
        self.current_killers.insert(mv, ply);
        self.history.cutoff_encountered(&mv, depth);
    }

    /// Sorts children best-first
    ///
    /// Priority: previous PV move (while on the PV), current killers, previous
    /// killers, history score when enabled. Within a bucket the child's static
    /// evaluation decides, from the mover's point of view.
    fn order_moves(
        &self,
        children: Vec<Child<S>>,
        is_pv: bool,
        ply: usize,
    ) -> Result<Vec<Child<S>>, SearchError> {
        let mut keyed = Vec::with_capacity(children.len());
        for child in children {
            if self.cancel.is_cancelled() {
                return Err(SearchError::Interrupted);
            }
            let key = self.order_key(&child, is_pv, ply);
            keyed.push((key, child));
        }

        keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b));
        Ok(keyed.into_iter().map(|(_, child)| child).collect())
    }

    fn order_key(&self, child: &Child<S>, is_pv: bool, ply: usize) -> OrderKey {
        let mut eval = self.evaluator.score(&child.state);
        if child.mv.commenced_by().is_evader() {
            eval = -eval;
        }

        let mv = &child.mv;
        let (bucket, history) = if is_pv && self.previous_pv.get(ply) == Some(mv) {
            (BUCKET_PV, 0)
        } else if self.current_killers.is_killer(mv, ply) {
            (BUCKET_KILLER, 0)
        } else if self.previous_killers.is_killer(mv, ply) {
            (BUCKET_PREVIOUS_KILLER, 0)
        } else if self.use_history {
            (BUCKET_HISTORY, self.history.history_score(mv))
        } else {
            (BUCKET_REST, 0)
        };

        OrderKey {
            bucket,
            history,
            eval,
        }
    }
}

/// Ascending order of keys; `eval` is already negated for the maximiser
fn compare_keys(a: &OrderKey, b: &OrderKey) -> Ordering {
    a.bucket
        .cmp(&b.bucket)
        .then_with(|| b.history.cmp(&a.history))
        .then_with(|| a.eval.total_cmp(&b.eval))
}
