//! mazesolve-core: bit-packed cell store and the four maze-solving
//! algorithms that share it.
//!
//! Every solver borrows a freshly-`reset()` [`CellStore`] and exposes a
//! `step_by_step()` iterator of [`Phase`] tokens for an external driver
//! to pump — the core never renders anything itself.

pub mod bfs;
pub mod branches;
pub mod cellstore;
pub mod dfs;
pub mod error;
pub mod geometry;
pub mod limits;
pub mod loader;
pub mod mt_m1;
pub mod mt_m2;
pub mod report;
pub mod solver;

pub use bfs::BfsSolver;
pub use cellstore::CellStore;
pub use dfs::DfsSolver;
pub use error::MazeError;
pub use geometry::{end_position, start_position, Direction, Position};
pub use limits::SolverLimits;
pub use loader::{load_maze, load_maze_file};
pub use mt_m1::MtM1Solver;
pub use mt_m2::MtM2Solver;
pub use report::SolveReport;
pub use solver::Phase;

/// Returns the crate version for basic linkage diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_non_empty() {
        assert!(!version().is_empty());
    }
}
