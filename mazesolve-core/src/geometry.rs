//! Grid positions, cardinal directions, and the fixed start/end cells.

/// A single cell on the grid, row 0 at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Adjacent position in `dir`. No bounds check — callers go through
    /// `CellStore::can_move` first.
    pub fn step(self, dir: Direction) -> Position {
        match dir {
            Direction::North => Position::new(self.row - 1, self.col),
            Direction::South => Position::new(self.row + 1, self.col),
            Direction::East => Position::new(self.row, self.col + 1),
            Direction::West => Position::new(self.row, self.col - 1),
            Direction::Uninitialized => self,
        }
    }
}

/// Cardinal direction, plus the `Uninitialized` sentinel used by `Branches`
/// slots that have no walkable direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Uninitialized,
}

impl Direction {
    pub fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Uninitialized => Direction::Uninitialized,
        }
    }
}

/// `(row, col)` of the maze entrance: top row, middle column.
pub fn start_position(width: i32, height: i32) -> Position {
    let _ = height;
    Position::new(0, width / 2)
}

/// `(row, col)` of the maze exit: bottom row, middle column.
pub fn end_position(width: i32, height: i32) -> Position {
    Position::new(height - 1, width / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_is_involutive() {
        for d in [Direction::North, Direction::East, Direction::South, Direction::West] {
            assert_eq!(d.reverse().reverse(), d);
        }
        assert_eq!(Direction::Uninitialized.reverse(), Direction::Uninitialized);
    }

    #[test]
    fn step_and_back_returns_origin() {
        let p = Position::new(3, 4);
        for d in [Direction::North, Direction::East, Direction::South, Direction::West] {
            assert_eq!(p.step(d).step(d.reverse()), p);
        }
    }

    #[test]
    fn start_and_end_use_integer_midpoint_column() {
        assert_eq!(start_position(7, 9), Position::new(0, 3));
        assert_eq!(end_position(7, 9), Position::new(8, 3));
    }
}
