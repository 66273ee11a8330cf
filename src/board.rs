// Capability set the search consumes from the rules engine
//
// The rules engine owns legal-move generation, ticket bookkeeping, win
// detection and hidden-position tracking. The search only ever talks to it
// through this trait.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::graph::Graph;
use crate::types::{Move, NodeId, Piece, Side, Ticket};

/// An immutable game position as seen by the search
///
/// States handed to the search are "perfect information" states: the evader's
/// true location is known, while `candidate_locations` still reports what the
/// seekers could deduce from public information.
pub trait BoardState: Clone + Send {
    /// Graph the game is being played on
    fn graph(&self) -> &Arc<Graph>;

    /// Legal moves for the piece(s) to move; empty once the game is over
    fn available_moves(&self) -> Vec<Move>;

    /// Applies a legal move, producing the successor state
    fn advance(&self, mv: &Move) -> Self;

    /// Winning side, or `None` while the game is still going
    fn winner(&self) -> Option<Side>;

    /// Remaining tickets of the given type held by `piece`
    fn ticket_count(&self, piece: Piece, ticket: Ticket) -> u32;

    fn evader_location(&self) -> NodeId;

    /// Every seeker with its current location
    fn seeker_locations(&self) -> Vec<(Piece, NodeId)>;

    /// Nodes the evader could occupy given public observations
    fn candidate_locations(&self) -> &BTreeSet<NodeId>;

    /// Number of evader rounds already played (length of the travel log)
    fn round(&self) -> usize;

    /// One flag per round of the game; `true` where the evader must reveal
    fn reveal_rounds(&self) -> &[bool];

    fn is_terminal(&self) -> bool {
        self.winner().is_some()
    }

    /// Whether the round with the given index forces the evader to reveal
    fn is_reveal_round(&self, round: usize) -> bool {
        self.reveal_rounds().get(round).copied().unwrap_or(false)
    }

    /// Non-revealing rounds from `round` (inclusive) to the end of the game
    fn hidden_rounds_from(&self, round: usize) -> usize {
        self.reveal_rounds()
            .iter()
            .skip(round)
            .filter(|reveal| !**reveal)
            .count()
    }
}
