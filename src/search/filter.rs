//! Domain-specific pruning of candidate moves before they are ordered.
//!
//! These rules encode how the game is usually played well and shrink the
//! branching factor so that the search can go deeper:
//!
//! - The evader prefers single moves and only considers double moves when every
//!   single move lets a seeker capture it on the reply.
//! - Secret moves are held back during the opening rounds, on reveal rounds and
//!   when every neighbour is reachable by taxi anyway. A double move counts as
//!   landing on the round of its second leg. When the evader holds
//!   enough secret tickets for every remaining hidden round, only secret moves
//!   are considered.
//! - Seekers are assumed to let the one that can get closest to the evader move
//!   first; moves by every other seeker are dropped.
//!
//! Filtering never empties a move list. If the rules would remove everything,
//! the node is searched unfiltered and a warning is logged.

use log::warn;

use crate::board::BoardState;
use crate::distance::DistanceOracle;
use crate::types::{Move, Piece, Side, Ticket};

/// A generated move together with the state it leads to
#[derive(Debug, Clone)]
pub struct Child<S> {
    pub mv: Move,
    pub state: S,
}

/// Result of filtering one node's children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Filters ran; `removed` children were dropped
    Applied { removed: usize },
    /// Filters would have removed every child, so none were dropped
    Degenerate,
}

/// Stateless move filter bound to a uniform-cost oracle
#[derive(Debug, Clone, Copy)]
pub struct MoveFilter<'a> {
    oracle: &'a DistanceOracle,
    opening_rounds: usize,
}

impl<'a> MoveFilter<'a> {
    pub fn new(oracle: &'a DistanceOracle, opening_rounds: usize) -> Self {
        MoveFilter {
            oracle,
            opening_rounds,
        }
    }

    /// Filters the children of `parent` in place
    pub fn apply<S: BoardState>(&self, parent: &S, children: &mut Vec<Child<S>>) -> FilterOutcome {
        let Some(first) = children.first() else {
            return FilterOutcome::Applied { removed: 0 };
        };

        let all: Vec<usize> = (0..children.len()).collect();
        let survivors = match first.mv.commenced_by().side() {
            Side::Evader => self.evader_survivors(parent, children, all),
            Side::Seekers => self.seeker_survivors(parent, children, all),
        };

        if survivors.is_empty() {
            warn!(
                "Move filtering removed all {} candidate moves; searching unfiltered",
                children.len()
            );
            return FilterOutcome::Degenerate;
        }

        let removed = children.len() - survivors.len();
        let mut keep = vec![false; children.len()];
        for i in survivors {
            keep[i] = true;
        }
        let mut flags = keep.into_iter();
        children.retain(|_| flags.next().unwrap_or(false));
        FilterOutcome::Applied { removed }
    }

    fn evader_survivors<S: BoardState>(
        &self,
        parent: &S,
        children: &[Child<S>],
        survivors: Vec<usize>,
    ) -> Vec<usize> {
        let survivors = Self::double_move_survivors(children, survivors);
        // Survivors are either all single or all double moves
        let legs = match survivors.first() {
            Some(&i) if children[i].mv.is_double() => 2,
            _ => 1,
        };
        let (survivors, only_secret) =
            Self::secret_only_survivors(parent, children, survivors, legs);
        if survivors.is_empty() {
            return survivors;
        }

        let round = parent.round();
        let all_secret = survivors
            .iter()
            .all(|&i| children[i].mv.uses_ticket(Ticket::Secret));
        let hold_back_secret = round + legs <= self.opening_rounds
            || parent.is_reveal_round(round + legs - 1)
            || Self::taxi_covers_neighbourhood(parent);

        if only_secret || all_secret || !hold_back_secret {
            return survivors;
        }
        survivors
            .into_iter()
            .filter(|&i| !children[i].mv.uses_ticket(Ticket::Secret))
            .collect()
    }

    /// Keeps only single moves, unless every single move can be captured on the
    /// reply, in which case only double moves are kept
    fn double_move_survivors<S: BoardState>(children: &[Child<S>], survivors: Vec<usize>) -> Vec<usize> {
        let mut double_present = false;
        let mut allow_double = true;
        for &i in &survivors {
            let child = &children[i];
            if child.mv.is_double() {
                double_present = true;
            } else if allow_double && !Self::capturable(&child.state) {
                allow_double = false;
            }
        }

        if allow_double && !double_present {
            return survivors;
        }
        survivors
            .into_iter()
            .filter(|&i| children[i].mv.is_double() == allow_double)
            .collect()
    }

    /// Whether the seekers win or can land on the evader with their next move
    fn capturable<S: BoardState>(state: &S) -> bool {
        match state.winner() {
            Some(Side::Seekers) => return true,
            Some(Side::Evader) => return false,
            None => {}
        }
        let evader = state.evader_location();
        state
            .available_moves()
            .iter()
            .any(|mv| !mv.commenced_by().is_evader() && mv.destination() == evader)
    }

    /// Restricts the evader to secret moves when it can afford one on every
    /// remaining hidden round; the flag reports whether that happened.
    ///
    /// `legs` is the number of rounds the surviving moves span. The reveal
    /// check looks at the round the last leg lands on.
    fn secret_only_survivors<S: BoardState>(
        parent: &S,
        children: &[Child<S>],
        survivors: Vec<usize>,
        legs: usize,
    ) -> (Vec<usize>, bool) {
        let round = parent.round();
        let secrets = parent.ticket_count(Piece::Evader, Ticket::Secret) as usize;
        let only_secret = !parent.is_reveal_round(round + legs - 1)
            && secrets >= parent.hidden_rounds_from(round);
        if !only_secret {
            return (survivors, false);
        }

        let kept = survivors
            .into_iter()
            .filter(|&i| {
                children[i]
                    .mv
                    .tickets()
                    .iter()
                    .all(|t| *t == Ticket::Secret)
            })
            .collect();
        (kept, true)
    }

    /// True when the evader holds taxi tickets and no neighbour offers a
    /// non-taxi mode the evader could pay for
    fn taxi_covers_neighbourhood<S: BoardState>(parent: &S) -> bool {
        if parent.ticket_count(Piece::Evader, Ticket::Taxi) == 0 {
            return false;
        }
        let location = parent.evader_location();
        parent.graph().neighbours(location).all(|(_, modes)| {
            modes.iter().all(|mode| {
                let ticket = mode.required_ticket();
                ticket == Ticket::Taxi || parent.ticket_count(Piece::Evader, ticket) == 0
            })
        })
    }

    /// Keeps only the moves of the seeker whose move can land closest to the
    /// evader; ties go to the last such seeker in generation order
    fn seeker_survivors<S: BoardState>(
        &self,
        parent: &S,
        children: &[Child<S>],
        survivors: Vec<usize>,
    ) -> Vec<usize> {
        let evader = parent.evader_location();
        let mut closest: Option<(u32, Piece)> = None;
        for &i in &survivors {
            let mv = &children[i].mv;
            let distance = match self.oracle.try_distance(evader, mv.destination()) {
                Ok(d) => d,
                Err(e) => {
                    warn!("Skipping seeker move {} in filtering: {}", mv, e);
                    continue;
                }
            };
            if closest.map_or(true, |(best, _)| distance <= best) {
                closest = Some((distance, mv.commenced_by()));
            }
        }

        match closest {
            Some((_, piece)) => survivors
                .into_iter()
                .filter(|&i| children[i].mv.commenced_by() == piece)
                .collect(),
            None => survivors,
        }
    }
}
