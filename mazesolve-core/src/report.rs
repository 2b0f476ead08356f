//! A serializable summary of a fully-drained solve, for a CLI or test
//! harness that wants the outcome without re-deriving it from raw
//! cell-store bits.

use serde::{Deserialize, Serialize};

use crate::geometry::Position;
use crate::solver::Phase;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    pub solver: String,
    pub width: i32,
    pub height: i32,
    pub phases_emitted: u64,
    pub searching_steps: u64,
    pub backtracking_steps: u64,
    pub finished: bool,
    pub path: Option<Vec<(i32, i32)>>,
}

impl SolveReport {
    /// Folds a drained `Phase` sequence and the final path (if any) into
    /// a report. `path`, when present, is the ON_PATH cells in order
    /// from Start to End.
    pub fn build(solver: &str, width: i32, height: i32, phases: &[Phase], path: Option<Vec<Position>>) -> Self {
        let searching_steps = phases.iter().filter(|p| matches!(p, Phase::Searching)).count() as u64;
        let backtracking_steps = phases.iter().filter(|p| matches!(p, Phase::Backtracking)).count() as u64;
        let finished = matches!(phases.last(), Some(Phase::Finished));
        Self {
            solver: solver.to_string(),
            width,
            height,
            phases_emitted: phases.len() as u64,
            searching_steps,
            backtracking_steps,
            finished,
            path: path.map(|cells| cells.into_iter().map(|p| (p.row, p.col)).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_phases_by_kind() {
        let phases = vec![Phase::Searching, Phase::Searching, Phase::Backtracking, Phase::Finished];
        let report = SolveReport::build("bfs", 3, 3, &phases, Some(vec![Position::new(0, 0)]));
        assert_eq!(report.searching_steps, 2);
        assert_eq!(report.backtracking_steps, 1);
        assert!(report.finished);
        assert_eq!(report.path, Some(vec![(0, 0)]));
    }

    #[test]
    fn no_solution_is_not_finished() {
        let phases = vec![Phase::Searching, Phase::NoSolution];
        let report = SolveReport::build("dfs", 2, 2, &phases, None);
        assert!(!report.finished);
        assert_eq!(report.path, None);
    }
}
