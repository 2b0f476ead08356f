//! Per-junction outgoing-direction set.
//!
//! A fixed 4-slot array (one slot per cardinal direction) avoids heap
//! churn for what is, in practice, never more than four live choices.
//! Two selection modes share the slots: `next()` is a single-threaded
//! rotation used by BFS/DFS-adjacent code paths that never touch
//! DEAD_*/OCCUPIED_* bits; `next_mt()` is the MT-M2-only variant that
//! respects and claims those bits.

use crate::cellstore::CellStore;
use crate::geometry::{Direction, Position};

const SLOT_DIRS: [Direction; 4] = [Direction::North, Direction::East, Direction::South, Direction::West];

pub struct Branches {
    slots: [Direction; 4],
    index: usize,
    count: usize,
}

impl Branches {
    /// Builds the slot set at `p` for walker `tid`. Slots are seeded
    /// `Uninitialized` wherever `p` cannot move in that direction. The
    /// cursor starts at `tid & 3` so walkers sharing a team tend to peel
    /// off in different directions out of the same junction.
    pub fn new(cells: &CellStore, p: Position, tid: u32) -> Self {
        let mut slots = [Direction::Uninitialized; 4];
        let mut count = 0;
        for (i, &d) in SLOT_DIRS.iter().enumerate() {
            if cells.can_move(p, d) {
                slots[i] = d;
                count += 1;
            }
        }
        Self { slots, index: (tid & 3) as usize, count }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The first non-`Uninitialized` slot, or `Uninitialized` if empty.
    /// Used by MT-M2's corridor adoption when exactly one branch remains.
    pub fn first(&self) -> Direction {
        self.slots.iter().copied().find(|&d| d != Direction::Uninitialized).unwrap_or(Direction::Uninitialized)
    }

    fn slot_index_of(&self, dir: Direction) -> Option<usize> {
        self.slots.iter().position(|&d| d == dir)
    }

    /// Clears the first slot equal to `dir`, if any.
    pub fn remove(&mut self, dir: Direction) {
        if let Some(i) = self.slot_index_of(dir) {
            self.slots[i] = Direction::Uninitialized;
            self.count -= 1;
        }
    }

    /// Single-threaded rotation: advance the cursor with wraparound and
    /// return the next non-`Uninitialized` direction. Purely rotational;
    /// never mutates a slot.
    pub fn next(&mut self) -> Direction {
        for _ in 0..4 {
            self.index = (self.index + 1) % 4;
            let d = self.slots[self.index];
            if d != Direction::Uninitialized {
                return d;
            }
        }
        Direction::Uninitialized
    }

    /// MT-M2 selection: prefers an unclaimed, non-dead direction and
    /// claims it (sets OCCUPIED_*) before returning. Falls back to the
    /// first non-dead direction, without claiming it, if every live
    /// direction is already occupied by some other walker.
    pub fn next_mt(&mut self, cells: &mut CellStore, at: Position) -> Direction {
        let mut fallback: Option<usize> = None;
        for _ in 0..4 {
            self.index = (self.index + 1) % 4;
            let d = self.slots[self.index];
            if d == Direction::Uninitialized {
                continue;
            }
            if cells.is_dead(at, d) {
                self.slots[self.index] = Direction::Uninitialized;
                self.count -= 1;
                if self.count == 0 {
                    return Direction::Uninitialized;
                }
                continue;
            }
            if fallback.is_none() {
                fallback = Some(self.index);
            }
            if cells.is_occupied(at, d) {
                continue;
            }
            cells.set_occupied(at, d);
            return d;
        }
        if let Some(i) = fallback {
            self.index = i;
            self.slots[i]
        } else {
            Direction::Uninitialized
        }
    }

    /// Retires the branch currently under the cursor: marks it DEAD on
    /// `at`, clears the slot, and returns the direction that was retired.
    pub fn pop_current_thread(&mut self, cells: &mut CellStore, at: Position) -> Direction {
        let d = self.slots[self.index];
        if d != Direction::Uninitialized {
            cells.set_dead(at, d);
            self.slots[self.index] = Direction::Uninitialized;
            self.count -= 1;
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_only_walkable_slots() {
        let cs = CellStore::new(3, 3);
        let b = Branches::new(&cs, Position::new(1, 1), 0);
        assert_eq!(b.len(), 4);
        let corner = Branches::new(&cs, Position::new(0, 0), 0);
        assert_eq!(corner.len(), 2);
    }

    #[test]
    fn cursor_seeded_from_tid_low_bits() {
        let cs = CellStore::new(3, 3);
        let b = Branches::new(&cs, Position::new(1, 1), 5);
        assert_eq!(b.index, 1);
    }

    #[test]
    fn next_rotates_without_mutating() {
        let cs = CellStore::new(3, 3);
        let mut b = Branches::new(&cs, Position::new(1, 1), 0);
        let before = b.len();
        let _ = b.next();
        assert_eq!(b.len(), before);
    }

    #[test]
    fn next_mt_claims_unoccupied_direction() {
        let mut cs = CellStore::new(3, 3);
        let p = Position::new(1, 1);
        let mut b = Branches::new(&cs, p, 0);
        let d = b.next_mt(&mut cs, p);
        assert_ne!(d, Direction::Uninitialized);
        assert!(cs.is_occupied(p, d));
    }

    #[test]
    fn next_mt_falls_back_when_all_occupied() {
        let mut cs = CellStore::new(3, 3);
        let p = Position::new(1, 1);
        for d in [Direction::North, Direction::East, Direction::South, Direction::West] {
            cs.set_occupied(p, d);
        }
        let mut b = Branches::new(&cs, p, 0);
        let d = b.next_mt(&mut cs, p);
        assert_ne!(d, Direction::Uninitialized);
    }

    #[test]
    fn next_mt_skips_dead_and_can_exhaust() {
        let mut cs = CellStore::new(3, 3);
        let p = Position::new(0, 0); // corner: only East, South walkable
        for d in [Direction::East, Direction::South] {
            cs.set_dead(p, d);
        }
        let mut b = Branches::new(&cs, p, 0);
        assert_eq!(b.next_mt(&mut cs, p), Direction::Uninitialized);
    }

    #[test]
    fn pop_current_thread_marks_dead_and_clears_slot() {
        let mut cs = CellStore::new(3, 3);
        let p = Position::new(1, 1);
        let mut b = Branches::new(&cs, p, 0);
        let d = b.next_mt(&mut cs, p);
        let popped = b.pop_current_thread(&mut cs, p);
        assert_eq!(popped, d);
        assert!(cs.is_dead(p, d));
    }
}
