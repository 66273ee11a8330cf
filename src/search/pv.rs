// Principal variation: best line of play found from a search node

use serde::Serialize;

use crate::types::Move;

/// Ordered moves from a node downwards; empty means no further play
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PvLine {
    moves: Vec<Move>,
}

impl PvLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the line as terminal or depth-exhausted
    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// Replaces this line with `first` followed by `rest`
    pub fn set_line(&mut self, first: Move, rest: &PvLine) {
        self.moves.clear();
        self.moves.push(first);
        self.moves.extend_from_slice(&rest.moves);
    }

    pub fn get(&self, ply: usize) -> Option<&Move> {
        self.moves.get(ply)
    }

    pub fn first(&self) -> Option<&Move> {
        self.moves.first()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Piece, Ticket};

    fn hop(piece: Piece, to: u32) -> Move {
        Move::Single {
            piece,
            source: 1,
            ticket: Ticket::Taxi,
            destination: to,
        }
    }

    #[test]
    fn test_set_line_prepends_move() {
        let mut child = PvLine::new();
        child.set_line(hop(Piece::Seeker(0), 3), &PvLine::new());

        let mut line = PvLine::new();
        line.set_line(hop(Piece::Evader, 2), &child);

        assert_eq!(line.len(), 2);
        assert_eq!(line.first(), Some(&hop(Piece::Evader, 2)));
        assert_eq!(line.get(1), Some(&hop(Piece::Seeker(0), 3)));
        assert_eq!(line.get(2), None);
    }

    #[test]
    fn test_clear_empties_line() {
        let mut line = PvLine::new();
        line.set_line(hop(Piece::Evader, 2), &PvLine::new());
        line.clear();
        assert!(line.is_empty());
    }
}
