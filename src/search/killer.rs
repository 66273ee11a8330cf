//! Killer moves heuristic for move ordering.
//!
//! Killer moves caused a cutoff at the same ply earlier in the search and are
//! likely to do so again for sibling positions, so they are searched early.

use crate::types::Move;

/// Default number of killer slots per ply
pub const KILLERS_PER_PLY: usize = 3;

/// Per-ply killer slots, most recent first
///
/// Sized for one fixed search depth; plies past that depth are never killers.
#[derive(Debug, Clone)]
pub struct KillerTable {
    per_ply: usize,
    plies: usize,
    slots: Vec<Option<Move>>,
}

impl KillerTable {
    /// Creates an empty table covering plies `0..max_depth`
    pub fn new(max_depth: usize, per_ply: usize) -> Self {
        KillerTable {
            per_ply,
            plies: max_depth,
            slots: vec![None; max_depth * per_ply],
        }
    }

    /// Records a cutoff move at `ply`
    ///
    /// Moves already present are left where they are; otherwise the row shifts
    /// one slot towards the back, evicting the oldest killer.
    pub fn insert(&mut self, mv: Move, ply: usize) {
        if ply >= self.plies || self.per_ply == 0 || self.is_killer(&mv, ply) {
            return;
        }
        let row = &mut self.slots[ply * self.per_ply..(ply + 1) * self.per_ply];
        row.rotate_right(1);
        row[0] = Some(mv);
    }

    pub fn is_killer(&self, mv: &Move, ply: usize) -> bool {
        if ply >= self.plies {
            return false;
        }
        self.slots[ply * self.per_ply..(ply + 1) * self.per_ply]
            .iter()
            .flatten()
            .any(|killer| killer == mv)
    }

    /// Killers at `ply`, most recent first
    #[cfg(test)]
    fn killers_at(&self, ply: usize) -> Vec<Move> {
        if ply >= self.plies {
            return Vec::new();
        }
        self.slots[ply * self.per_ply..(ply + 1) * self.per_ply]
            .iter()
            .flatten()
            .copied()
            .collect()
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        KillerTable::new(0, KILLERS_PER_PLY)
    }
}
