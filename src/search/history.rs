//! History heuristic for move ordering in alpha-beta search.
//!
//! Moves that caused cutoffs anywhere in the tree earn a depth-independent
//! score, incremented by depth² per cutoff so deeper cutoffs count for more.
//!
//! # Indexing
//!
//! The table is a flat `[piece][first ticket][source][destination]` array.
//! Double moves are folded in using their first ticket and overall endpoints,
//! so they share a slot with any single move of the same shape.

use crate::types::{Move, NodeId, Piece, Ticket};

/// Ticket kinds that can start a move (the double ticket never does)
const TICKET_KINDS: usize = 4;

/// Cutoff counters for every (piece, ticket, source, destination) tuple
#[derive(Debug, Clone)]
pub struct HistoryTable {
    pieces: usize,
    nodes: usize,
    table: Vec<u32>,
}

impl HistoryTable {
    /// Creates a zeroed table for `pieces` pieces on nodes `1..=max_node`
    pub fn new(pieces: usize, max_node: NodeId) -> Self {
        let nodes = max_node as usize;
        HistoryTable {
            pieces,
            nodes,
            table: vec![0; pieces * TICKET_KINDS * nodes * nodes],
        }
    }

    /// Whether the table can index every move of the given game size
    pub fn fits(&self, pieces: usize, max_node: NodeId) -> bool {
        self.pieces >= pieces && self.nodes >= max_node as usize
    }

    /// Update the history score for a move that caused a cutoff
    pub fn cutoff_encountered(&mut self, mv: &Move, depth: usize) {
        if let Some(slot) = self.slot(mv) {
            let bonus = (depth * depth) as u32;
            self.table[slot] = self.table[slot].saturating_add(bonus);
        }
    }

    /// Get the history score for a move; moves outside the table score 0
    pub fn history_score(&self, mv: &Move) -> u32 {
        self.slot(mv).map(|slot| self.table[slot]).unwrap_or(0)
    }

    /// Clear all history scores
    pub fn clear(&mut self) {
        self.table.fill(0);
    }

    fn slot(&self, mv: &Move) -> Option<usize> {
        let piece = Self::piece_index(mv.commenced_by());
        let ticket = Self::ticket_index(mv.first_ticket())?;
        let source = Self::location_index(mv.source())?;
        let destination = Self::location_index(mv.destination())?;
        if piece >= self.pieces || source >= self.nodes || destination >= self.nodes {
            return None;
        }
        Some(((piece * TICKET_KINDS + ticket) * self.nodes + source) * self.nodes + destination)
    }

    fn piece_index(piece: Piece) -> usize {
        piece.index()
    }

    fn ticket_index(ticket: Ticket) -> Option<usize> {
        match ticket {
            Ticket::Taxi => Some(0),
            Ticket::Bus => Some(1),
            Ticket::Underground => Some(2),
            Ticket::Secret => Some(3),
            Ticket::Double => None,
        }
    }

    fn location_index(node: NodeId) -> Option<usize> {
        (node as usize).checked_sub(1)
    }
}
