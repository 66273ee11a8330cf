pub mod filter;
pub mod history;
pub mod iterative_deepening;
pub mod killer;
pub mod minimax;
pub mod pv;

pub use filter::{Child, FilterOutcome, MoveFilter};
pub use history::HistoryTable;
pub use iterative_deepening::{DriverHandle, IterativeDeepening};
pub use killer::{KillerTable, KILLERS_PER_PLY};
pub use minimax::{Search, SearchError, SearchOutcome, SearchStats};
pub use pv::PvLine;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a search and its canceller
///
/// The search polls it at the start of every recursive call; setting it from
/// any thread makes the running depth unwind with [`SearchError::Interrupted`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
