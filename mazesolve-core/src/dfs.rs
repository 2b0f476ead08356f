//! Single-walker depth-first solver: LIFO stack, on-stack and
//! dead-junction bookkeeping, "grey trail" erased on backtrack.

use tracing::debug;

use crate::cellstore::CellStore;
use crate::geometry::{end_position, start_position, Direction, Position};
use crate::limits::SolverLimits;
use crate::solver::Phase;

const NEIGHBOR_ORDER: [Direction; 4] = [Direction::South, Direction::East, Direction::West, Direction::North];

enum Stage {
    Searching,
    Backtracking { path: Vec<Position>, next_index: usize },
    Done,
}

pub struct DfsSolver<'a> {
    cells: &'a mut CellStore,
    start: Position,
    end: Position,
    stack: Vec<(Position, Direction)>,
    next_order: i32,
    steps: u64,
    limits: SolverLimits,
    stage: Stage,
}

impl<'a> DfsSolver<'a> {
    pub fn new(cells: &'a mut CellStore) -> Self {
        let limits = SolverLimits::for_cells((cells.width() * cells.height()).max(0) as usize);
        Self::with_limits(cells, limits)
    }

    pub fn with_limits(cells: &'a mut CellStore, limits: SolverLimits) -> Self {
        let start = start_position(cells.width(), cells.height());
        let end = end_position(cells.width(), cells.height());
        debug!(?start, ?end, "dfs: starting");
        cells.set_visited(start);
        cells.set_on_stack(start);
        cells.set_visit_order(start, 1);
        Self {
            cells,
            start,
            end,
            stack: vec![(start, Direction::Uninitialized)],
            next_order: 1,
            steps: 0,
            limits,
            stage: Stage::Searching,
        }
    }

    pub fn step_by_step(self) -> impl Iterator<Item = Phase> + 'a {
        self
    }

    fn reconstruct_path(&self) -> Vec<Position> {
        let mut path = vec![self.end];
        let mut cur = self.end;
        while cur != self.start {
            let dir = self.cells.parent_dir(cur).expect("visited cell has a parent");
            cur = cur.step(dir);
            path.push(cur);
        }
        path.reverse();
        path
    }
}

impl<'a> Iterator for DfsSolver<'a> {
    type Item = Phase;

    fn next(&mut self) -> Option<Phase> {
        match &mut self.stage {
            Stage::Searching => {
                self.steps += 1;
                if self.steps > self.limits.max_steps {
                    self.stage = Stage::Done;
                    return Some(Phase::NoSolution);
                }
                let Some(&(top, _)) = self.stack.last() else {
                    self.stage = Stage::Done;
                    return Some(Phase::NoSolution);
                };
                if top == self.end {
                    let path = self.reconstruct_path();
                    self.stage = Stage::Backtracking { path, next_index: 0 };
                    return Some(Phase::Searching);
                }
                let advance = NEIGHBOR_ORDER
                    .iter()
                    .copied()
                    .find(|&d| self.cells.can_move(top, d) && !self.cells.is_visited(top.step(d)));
                match advance {
                    Some(dir) => {
                        let n = top.step(dir);
                        self.cells.set_visited(n);
                        self.cells.set_parent(n, dir.reverse());
                        self.cells.set_on_stack(n);
                        self.next_order += 1;
                        self.cells.set_visit_order(n, self.next_order);
                        self.stack.push((n, dir));
                    }
                    None => {
                        self.stack.pop();
                        self.cells.clear_on_stack(top);
                        self.cells.clear_visited(top);
                        if self.cells.is_junction(top) {
                            self.cells.set_dead_junction(top);
                        }
                    }
                }
                Some(Phase::Searching)
            }
            Stage::Backtracking { path, next_index } => {
                if *next_index >= path.len() {
                    self.stage = Stage::Done;
                    return Some(Phase::Finished);
                }
                let p = path[*next_index];
                self.cells.set_on_path(p);
                *next_index += 1;
                Some(Phase::Backtracking)
            }
            Stage::Done => None,
        }
    }
}
