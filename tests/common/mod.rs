//! Shared fixtures for the integration tests
//!
//! `MiniGame` is a compact hidden-movement rules model: one evader with a
//! ticket wallet, seekers that move one at a time within a round, reveal
//! rounds and a public set of candidate evader locations. `TreeGame` is a
//! synthetic alternating game tree whose leaf values are known up front, used
//! to check the search against a brute-force minimax.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hidden_pursuit::board::BoardState;
use hidden_pursuit::config::Config;
use hidden_pursuit::eval::Evaluator;
use hidden_pursuit::graph::Graph;
use hidden_pursuit::types::{Move, NodeId, Piece, Side, Ticket, Transport};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Default configuration with a budget small enough for tests
pub fn test_config() -> Config {
    let mut config = Config::default_hardcoded();
    config.timing.move_time_budget_ms = 300;
    config.timing.termination_margin_ms = 50;
    config.timing.polling_interval_ms = 5;
    config
}

/// Reveal flags for a 24-round game revealing on rounds 3, 8, 13, 18 and 24
pub fn standard_reveal_rounds() -> Vec<bool> {
    (0..24).map(|i| matches!(i, 2 | 7 | 12 | 17 | 23)).collect()
}

/// Stand-in board that borrows node numbers from the classic map
///
/// This is not the classic map's adjacency. Only the node numbers are real;
/// the edges were made up so that the published hop distances hold (140-132
/// one move, 140-184 two, 140-183 three, 1-128 four). Distance checks on it
/// only show the oracle agrees with a hand-built layout.
pub fn stand_in_board() -> Graph {
    Graph::from_edges(&[
        (140, 132, Transport::Taxi),
        (140, 154, Transport::Taxi),
        (140, 139, Transport::Taxi),
        (154, 184, Transport::Bus),
        (184, 183, Transport::Taxi),
        (184, 185, Transport::Taxi),
        (132, 114, Transport::Taxi),
        (1, 46, Transport::Bus),
        (1, 8, Transport::Taxi),
        (46, 79, Transport::Underground),
        (79, 111, Transport::Underground),
        (111, 128, Transport::Taxi),
        (128, 142, Transport::Taxi),
        (142, 140, Transport::Taxi),
    ])
}

/// Small ring-and-spoke board shared by several scenarios
///
/// ```text
///   2 --- 5 --- 7
///  / \         |
/// 1   4        |
///  \ /         |
///   3 --- 6 ---+
/// ```
///
/// Every edge is taxi; 1-2 also carries a bus line and 6-7 an underground line.
pub fn diamond_board() -> Graph {
    Graph::from_edges(&[
        (1, 2, Transport::Taxi),
        (1, 2, Transport::Bus),
        (1, 3, Transport::Taxi),
        (2, 4, Transport::Taxi),
        (3, 4, Transport::Taxi),
        (2, 5, Transport::Taxi),
        (3, 6, Transport::Taxi),
        (5, 7, Transport::Taxi),
        (6, 7, Transport::Taxi),
        (6, 7, Transport::Underground),
    ])
}

/// Compact hidden-movement rules model implementing [`BoardState`]
#[derive(Debug, Clone)]
pub struct MiniGame {
    graph: Arc<Graph>,
    evader: NodeId,
    seekers: Vec<NodeId>,
    evader_tickets: BTreeMap<Ticket, u32>,
    reveal: Vec<bool>,
    round: usize,
    candidates: BTreeSet<NodeId>,
    /// Seekers still to move this round; empty while the evader is to move
    pending: Vec<u8>,
}

impl MiniGame {
    pub fn new(graph: Graph, evader: NodeId, seekers: &[NodeId]) -> Self {
        let candidates = graph.nodes().filter(|n| !seekers.contains(n)).collect();
        let evader_tickets = BTreeMap::from([
            (Ticket::Taxi, 4),
            (Ticket::Bus, 3),
            (Ticket::Underground, 3),
            (Ticket::Double, 2),
            (Ticket::Secret, 0),
        ]);
        MiniGame {
            graph: Arc::new(graph),
            evader,
            seekers: seekers.to_vec(),
            evader_tickets,
            reveal: standard_reveal_rounds(),
            round: 4,
            candidates,
            pending: Vec::new(),
        }
    }

    pub fn with_tickets(mut self, ticket: Ticket, count: u32) -> Self {
        self.evader_tickets.insert(ticket, count);
        self
    }

    pub fn with_round(mut self, round: usize) -> Self {
        self.round = round;
        self
    }

    pub fn with_reveal_rounds(mut self, reveal: Vec<bool>) -> Self {
        self.reveal = reveal;
        self
    }

    /// Replaces the public set of possible evader locations
    pub fn with_candidates(mut self, candidates: &[NodeId]) -> Self {
        self.candidates = candidates.iter().copied().collect();
        self
    }

    /// Same position with the seekers to move
    pub fn seekers_to_move(mut self) -> Self {
        self.pending = (0..self.seekers.len() as u8).collect();
        self
    }

    pub fn shared_graph(&self) -> Arc<Graph> {
        self.graph.clone()
    }

    fn tickets_left(tickets: &BTreeMap<Ticket, u32>, ticket: Ticket) -> u32 {
        tickets.get(&ticket).copied().unwrap_or(0)
    }

    fn evader_steps(&self, from: NodeId, tickets: &BTreeMap<Ticket, u32>) -> Vec<(Ticket, NodeId)> {
        let mut steps = Vec::new();
        for (destination, modes) in self.graph.neighbours(from) {
            if self.seekers.contains(&destination) {
                continue;
            }
            for mode in modes.iter() {
                let ticket = mode.required_ticket();
                if Self::tickets_left(tickets, ticket) > 0 && !steps.contains(&(ticket, destination)) {
                    steps.push((ticket, destination));
                }
            }
            if Self::tickets_left(tickets, Ticket::Secret) > 0
                && !steps.contains(&(Ticket::Secret, destination))
            {
                steps.push((Ticket::Secret, destination));
            }
        }
        steps
    }

    fn evader_moves(&self) -> Vec<Move> {
        let singles = self.evader_steps(self.evader, &self.evader_tickets);
        let mut moves: Vec<Move> = singles
            .iter()
            .map(|&(ticket, destination)| Move::Single {
                piece: Piece::Evader,
                source: self.evader,
                ticket,
                destination,
            })
            .collect();

        let double_allowed = Self::tickets_left(&self.evader_tickets, Ticket::Double) > 0
            && self.round + 2 <= self.reveal.len();
        if double_allowed {
            for &(first_ticket, first_destination) in &singles {
                let mut remaining = self.evader_tickets.clone();
                if let Some(count) = remaining.get_mut(&first_ticket) {
                    *count -= 1;
                }
                for (second_ticket, second_destination) in
                    self.evader_steps(first_destination, &remaining)
                {
                    moves.push(Move::Double {
                        piece: Piece::Evader,
                        source: self.evader,
                        first_ticket,
                        first_destination,
                        second_ticket,
                        second_destination,
                    });
                }
            }
        }
        moves
    }

    fn seeker_moves(&self, seeker: u8) -> Vec<Move> {
        let source = self.seekers[seeker as usize];
        let mut moves = Vec::new();
        for (destination, modes) in self.graph.neighbours(source) {
            let occupied = self
                .seekers
                .iter()
                .enumerate()
                .any(|(i, location)| i != seeker as usize && *location == destination);
            if occupied {
                continue;
            }
            for mode in modes.iter().filter(|m| *m != Transport::Ferry) {
                moves.push(Move::Single {
                    piece: Piece::Seeker(seeker),
                    source,
                    ticket: mode.required_ticket(),
                    destination,
                });
            }
        }
        moves
    }

    fn record_evader_leg(&mut self, ticket: Ticket, destination: NodeId) {
        if let Some(count) = self.evader_tickets.get_mut(&ticket) {
            *count = count.saturating_sub(1);
        }
        self.evader = destination;

        if self.is_reveal_round(self.round) {
            self.candidates = BTreeSet::from([destination]);
        } else {
            let mut spread: BTreeSet<NodeId> = self
                .candidates
                .iter()
                .flat_map(|c| self.graph.neighbours(*c).map(|(n, _)| n))
                .filter(|n| !self.seekers.contains(n))
                .collect();
            spread.insert(destination);
            self.candidates = spread;
        }
        self.round += 1;
    }

    fn legs(mv: &Move) -> Vec<(Ticket, NodeId)> {
        match *mv {
            Move::Single {
                ticket,
                destination,
                ..
            } => vec![(ticket, destination)],
            Move::Double {
                first_ticket,
                first_destination,
                second_ticket,
                second_destination,
                ..
            } => vec![
                (first_ticket, first_destination),
                (second_ticket, second_destination),
            ],
        }
    }
}

impl BoardState for MiniGame {
    fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    fn available_moves(&self) -> Vec<Move> {
        if self.winner().is_some() {
            return Vec::new();
        }
        if self.pending.is_empty() {
            return self.evader_moves();
        }
        self.pending
            .iter()
            .flat_map(|seeker| self.seeker_moves(*seeker))
            .collect()
    }

    fn advance(&self, mv: &Move) -> Self {
        let mut next = self.clone();
        match mv.commenced_by() {
            Piece::Evader => {
                for (ticket, destination) in Self::legs(mv) {
                    next.record_evader_leg(ticket, destination);
                }
                if mv.is_double() {
                    if let Some(count) = next.evader_tickets.get_mut(&Ticket::Double) {
                        *count = count.saturating_sub(1);
                    }
                }
                next.pending = (0..next.seekers.len() as u8).collect();
            }
            Piece::Seeker(seeker) => {
                next.seekers[seeker as usize] = mv.destination();
                next.pending.retain(|p| *p != seeker);
                next.candidates.remove(&mv.destination());
                if next.candidates.is_empty() {
                    next.candidates.insert(next.evader);
                }
            }
        }

        let stuck: Vec<u8> = next
            .pending
            .iter()
            .filter(|seeker| next.seeker_moves(**seeker).is_empty())
            .copied()
            .collect();
        next.pending.retain(|seeker| !stuck.contains(seeker));
        next
    }

    fn winner(&self) -> Option<Side> {
        if self.seekers.contains(&self.evader) {
            return Some(Side::Seekers);
        }
        if self.pending.is_empty() {
            if self.round >= self.reveal.len() {
                return Some(Side::Evader);
            }
            if self.evader_moves().is_empty() {
                return Some(Side::Seekers);
            }
        }
        None
    }

    fn ticket_count(&self, piece: Piece, ticket: Ticket) -> u32 {
        match piece {
            Piece::Evader => Self::tickets_left(&self.evader_tickets, ticket),
            Piece::Seeker(_) => 10,
        }
    }

    fn evader_location(&self) -> NodeId {
        self.evader
    }

    fn seeker_locations(&self) -> Vec<(Piece, NodeId)> {
        self.seekers
            .iter()
            .enumerate()
            .map(|(i, location)| (Piece::Seeker(i as u8), *location))
            .collect()
    }

    fn candidate_locations(&self) -> &BTreeSet<NodeId> {
        &self.candidates
    }

    fn round(&self) -> usize {
        self.round
    }

    fn reveal_rounds(&self) -> &[bool] {
        &self.reveal
    }
}

/// Alternating game tree of fixed branching and height
///
/// The evader moves on even plies and a single seeker on odd plies. A move is
/// identified by its ply (as the source) and child index (as the destination),
/// so the same move appears in every sibling subtree, as killer moves expect.
#[derive(Debug, Clone)]
pub struct TreeGame {
    graph: Arc<Graph>,
    path: Vec<u32>,
    branching: u32,
    height: usize,
    candidates: BTreeSet<NodeId>,
}

impl TreeGame {
    pub fn new(branching: u32, height: usize) -> Self {
        let span = branching.max(height as u32) + 1;
        let edges: Vec<(NodeId, NodeId, Transport)> =
            (1..span).map(|n| (n, n + 1, Transport::Taxi)).collect();
        TreeGame {
            graph: Arc::new(Graph::from_edges(&edges)),
            path: Vec::new(),
            branching,
            height,
            candidates: BTreeSet::from([1]),
        }
    }

    /// Same tree entered one ply down, with the seeker to move
    pub fn after_first_choice(branching: u32, height: usize) -> Self {
        let mut game = Self::new(branching, height);
        game.path.push(0);
        game
    }

    pub fn path(&self) -> &[u32] {
        &self.path
    }

    pub fn is_leaf(&self) -> bool {
        self.path.len() >= self.height
    }

    /// Distinct value in `1..=branching^height` for every leaf
    pub fn leaf_value(&self) -> f32 {
        let leaves = self.branching.pow(self.height as u32);
        let index = self
            .path
            .iter()
            .fold(0u32, |acc, choice| acc * self.branching + choice);
        ((index * 37) % leaves + 1) as f32
    }

    fn mover(&self) -> Piece {
        if self.path.len() % 2 == 0 {
            Piece::Evader
        } else {
            Piece::Seeker(0)
        }
    }
}

impl BoardState for TreeGame {
    fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    fn available_moves(&self) -> Vec<Move> {
        if self.is_leaf() {
            return Vec::new();
        }
        let piece = self.mover();
        let source = self.path.len() as NodeId + 1;
        (0..self.branching)
            .map(|choice| Move::Single {
                piece,
                source,
                ticket: Ticket::Taxi,
                destination: choice + 1,
            })
            .collect()
    }

    fn advance(&self, mv: &Move) -> Self {
        let mut next = self.clone();
        next.path.push(mv.destination() - 1);
        next
    }

    fn winner(&self) -> Option<Side> {
        None
    }

    fn ticket_count(&self, _piece: Piece, _ticket: Ticket) -> u32 {
        0
    }

    fn evader_location(&self) -> NodeId {
        1
    }

    fn seeker_locations(&self) -> Vec<(Piece, NodeId)> {
        vec![(Piece::Seeker(0), 2)]
    }

    fn candidate_locations(&self) -> &BTreeSet<NodeId> {
        &self.candidates
    }

    fn round(&self) -> usize {
        self.path.len() / 2
    }

    fn reveal_rounds(&self) -> &[bool] {
        &[]
    }
}

/// Scores `TreeGame` leaves with their known values and inner nodes by path sum
#[derive(Debug, Clone, Copy, Default)]
pub struct LeafValueEvaluator;

impl Evaluator<TreeGame> for LeafValueEvaluator {
    fn score(&self, state: &TreeGame) -> f32 {
        if state.is_leaf() {
            state.leaf_value()
        } else {
            state.path().iter().sum::<u32>() as f32
        }
    }

    fn matches_graph(&self, _graph: &Graph) -> bool {
        true
    }
}

/// Leaf evaluator that sleeps before every score
#[derive(Debug, Clone, Copy)]
pub struct SlowEvaluator {
    pub delay: Duration,
}

impl Evaluator<TreeGame> for SlowEvaluator {
    fn score(&self, state: &TreeGame) -> f32 {
        thread::sleep(self.delay);
        LeafValueEvaluator.score(state)
    }

    fn matches_graph(&self, _graph: &Graph) -> bool {
        true
    }
}

/// Plain minimax over a `TreeGame`, with the evader maximising
pub fn brute_force_minimax(state: &TreeGame, depth: usize) -> f32 {
    let moves = state.available_moves();
    if depth == 0 || moves.is_empty() {
        return LeafValueEvaluator.score(state);
    }
    let values = moves
        .iter()
        .map(|mv| brute_force_minimax(&state.advance(mv), depth - 1));
    if moves[0].commenced_by().is_evader() {
        values.fold(f32::NEG_INFINITY, f32::max)
    } else {
        values.fold(f32::INFINITY, f32::min)
    }
}
