//! Cooperative multi-walker bidirectional DFS. Two teams of three
//! walkers each race from Start and End; the scheduler stops the instant
//! any walker crosses a cell the opposing team has claimed, then splices
//! a path together from a strict parent-pointer backtrack on one side
//! and a stack-guided corridor walk on the other.
//!
//! The "MT" describes six logical workers stepped round-robin, not OS
//! threads — see the crate-level concurrency note in the design ledger.

use tracing::{debug, warn};

use crate::branches::Branches;
use crate::cellstore::CellStore;
use crate::geometry::{end_position, start_position, Direction, Position};
use crate::limits::SolverLimits;
use crate::solver::Phase;

const NUM_WALKERS: u32 = 6;
const NEIGHBOR_ORDER: [Direction; 4] = [Direction::North, Direction::East, Direction::South, Direction::West];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Team {
    Tb,
    Bt,
}

fn team_of(id: u32) -> Team {
    if id < 3 {
        Team::Tb
    } else {
        Team::Bt
    }
}

/// One entry of a walker's private stack: a decision point it branched
/// from, the direction that led into it, and the still-live branches.
struct Junction {
    at: Position,
    came_from: Direction,
    branches: Branches,
}

enum WalkerState {
    Junction,
    Corridor { dir: Direction },
    Backtrack { target: Position },
}

enum StepOutcome {
    Continue,
    Dead,
    FoundTarget(Position),
}

struct Walker {
    id: u32,
    team: Team,
    pos: Position,
    stack: Vec<Junction>,
    state: WalkerState,
    finished: bool,
}

impl Walker {
    fn spawn(id: u32, at: Position, cells: &CellStore) -> Self {
        let branches = Branches::new(cells, at, id);
        Self {
            id,
            team: team_of(id),
            pos: at,
            stack: vec![Junction { at, came_from: Direction::Uninitialized, branches }],
            state: WalkerState::Junction,
            finished: false,
        }
    }

    fn is_collision(&self, cells: &CellStore, at: Position, end: Position) -> bool {
        match self.team {
            Team::Tb => at == end || cells.is_visited_bt(at),
            Team::Bt => cells.is_visited_tb(at),
        }
    }

    fn mark_team(&self, cells: &mut CellStore, at: Position) {
        match self.team {
            Team::Tb => cells.set_visited_tb(at),
            Team::Bt => cells.set_visited_bt(at),
        }
        cells.set_owner(at, self.id as u8);
    }

    fn clear_team(&self, cells: &mut CellStore, at: Position) {
        match self.team {
            Team::Tb => cells.clear_visited_tb(at),
            Team::Bt => cells.clear_visited_bt(at),
        }
    }

    fn step(&mut self, cells: &mut CellStore, end: Position) -> StepOutcome {
        match self.state {
            WalkerState::Junction => self.step_junction(cells, end),
            WalkerState::Corridor { dir } => self.step_corridor(cells, end, dir),
            WalkerState::Backtrack { target } => self.step_backtrack(cells, target),
        }
    }

    fn step_junction(&mut self, cells: &mut CellStore, end: Position) -> StepOutcome {
        let at = self.stack.last().expect("a live walker always has a stack top").at;
        if self.is_collision(cells, at, end) {
            self.pos = at;
            return StepOutcome::FoundTarget(at);
        }
        self.mark_team(cells, at);
        let d = self.stack.last_mut().unwrap().branches.next_mt(cells, at);
        if d == Direction::Uninitialized {
            let popped = self.stack.pop().unwrap();
            if cells.is_junction(popped.at) {
                cells.set_dead_junction(popped.at);
            } else {
                cells.clear_visited_tb(popped.at);
                cells.clear_visited_bt(popped.at);
                cells.clear_visited(popped.at);
            }
            match self.stack.last_mut() {
                Some(parent) => {
                    let parent_at = parent.at;
                    parent.branches.pop_current_thread(cells, parent_at);
                    self.state = WalkerState::Backtrack { target: parent_at };
                    self.pos = popped.at;
                    StepOutcome::Continue
                }
                None => StepOutcome::Dead,
            }
        } else {
            self.state = WalkerState::Corridor { dir: d };
            self.pos = at;
            StepOutcome::Continue
        }
    }

    fn step_corridor(&mut self, cells: &mut CellStore, end: Position, dir: Direction) -> StepOutcome {
        let next = self.pos.step(dir);
        let parent_back = dir.reverse();
        if self.is_collision(cells, next, end) {
            let branches = Branches::new(cells, next, self.id);
            self.stack.push(Junction { at: next, came_from: parent_back, branches });
            self.pos = next;
            return StepOutcome::FoundTarget(next);
        }
        self.mark_team(cells, next);
        cells.set_parent(next, parent_back);
        self.pos = next;
        let mut branches = Branches::new(cells, next, self.id);
        branches.remove(parent_back);
        if branches.len() != 1 {
            self.stack.push(Junction { at: next, came_from: parent_back, branches });
            self.state = WalkerState::Junction;
        } else {
            self.state = WalkerState::Corridor { dir: branches.first() };
        }
        StepOutcome::Continue
    }

    fn step_backtrack(&mut self, cells: &mut CellStore, target: Position) -> StepOutcome {
        let pos = self.pos;
        if !cells.is_junction(pos) {
            self.clear_team(cells, pos);
        }
        if pos == target {
            self.state = WalkerState::Junction;
            return StepOutcome::Continue;
        }
        match cells.parent_dir(pos) {
            Some(dir) => self.pos = pos.step(dir),
            None => self.state = WalkerState::Junction,
        }
        StepOutcome::Continue
    }
}

enum Stage {
    Racing,
    Backtracking { path: Vec<Position>, next_index: usize },
    Done,
}

/// Runs the MT-M2 cooperative bidirectional DFS against a borrowed,
/// freshly-reset `CellStore`.
pub struct MtM2Solver<'a> {
    cells: &'a mut CellStore,
    start: Position,
    end: Position,
    walkers: Vec<Walker>,
    steps: u64,
    limits: SolverLimits,
    stage: Stage,
}

impl<'a> MtM2Solver<'a> {
    pub fn new(cells: &'a mut CellStore) -> Self {
        let limits = SolverLimits::for_cells((cells.width() * cells.height()).max(0) as usize);
        Self::with_limits(cells, limits)
    }

    pub fn with_limits(cells: &'a mut CellStore, limits: SolverLimits) -> Self {
        let start = start_position(cells.width(), cells.height());
        let end = end_position(cells.width(), cells.height());
        debug!(?start, ?end, "mt-m2: starting");
        if start == end {
            return Self {
                cells,
                start,
                end,
                walkers: Vec::new(),
                steps: 0,
                limits,
                stage: Stage::Backtracking { path: vec![start], next_index: 0 },
            };
        }
        let mut walkers = Vec::with_capacity(NUM_WALKERS as usize);
        for id in 0..3 {
            walkers.push(Walker::spawn(id, start, cells));
        }
        for id in 3..NUM_WALKERS {
            walkers.push(Walker::spawn(id, end, cells));
        }
        Self { cells, start, end, walkers, steps: 0, limits, stage: Stage::Racing }
    }

    pub fn step_by_step(self) -> impl Iterator<Item = Phase> + 'a {
        self
    }

    fn reconstruct(&self, reporter_id: u32, collision_pos: Position) -> Vec<Position> {
        let _ = reporter_id;
        let half1 = self.reconstruct_half1(collision_pos);
        let half2 = self.reconstruct_half2(collision_pos);
        let mut path = half1;
        if let Some((first, rest)) = half2.split_first() {
            debug_assert_eq!(*first, collision_pos);
            path.extend_from_slice(rest);
        }
        if path.last() != Some(&self.end) {
            path.push(self.end);
        }
        path
    }

    fn reconstruct_half1(&self, collision_pos: Position) -> Vec<Position> {
        let start_cell = if self.cells.is_visited_tb(collision_pos) {
            collision_pos
        } else {
            NEIGHBOR_ORDER
                .into_iter()
                .map(|d| collision_pos.step(d))
                .find(|&n| self.cells.in_bounds(n) && self.cells.is_visited_tb(n))
                .unwrap_or(collision_pos)
        };
        let mut path = vec![start_cell];
        let mut cur = start_cell;
        while cur != self.start {
            match self.cells.parent_dir(cur) {
                Some(dir) => {
                    cur = cur.step(dir);
                    path.push(cur);
                }
                None => {
                    warn!(?cur, "mt-m2: half1 parent chain broke before reaching start");
                    break;
                }
            }
        }
        path.reverse();
        if start_cell != collision_pos {
            path.push(collision_pos);
        }
        path
    }

    fn reconstruct_half2(&self, collision_pos: Position) -> Vec<Position> {
        let candidate_owner = if self.cells.is_visited_bt(collision_pos) {
            self.cells.owner(collision_pos).filter(|&o| o as u32 >= 3)
        } else {
            None
        }
        .or_else(|| {
            NEIGHBOR_ORDER.into_iter().map(|d| collision_pos.step(d)).find_map(|n| {
                if self.cells.in_bounds(n) && self.cells.is_visited_bt(n) {
                    self.cells.owner(n).filter(|&o| o as u32 >= 3)
                } else {
                    None
                }
            })
        });

        let Some(owner_id) = candidate_owner else {
            warn!(?collision_pos, "mt-m2: half2 could not locate a bt-team owner, truncating");
            return vec![collision_pos];
        };
        let Some(walker) = self.walkers.iter().find(|w| w.id as u8 == owner_id) else {
            warn!(?collision_pos, owner_id, "mt-m2: half2 owner walker missing, truncating");
            return vec![collision_pos];
        };
        let Some(k) = walker.stack.iter().rposition(|j| j.at == collision_pos) else {
            warn!(?collision_pos, "mt-m2: collision cell absent from bt walker's stack, truncating");
            return vec![collision_pos];
        };

        let guard_limit = ((self.cells.width() as i64) * (self.cells.height() as i64)).max(16) as usize;
        let mut out = vec![collision_pos];
        let mut cur = collision_pos;
        let mut last_dir: Option<Direction> = None;

        for i in (1..=k).rev() {
            let came_from = walker.stack[i].came_from;
            if came_from == Direction::Uninitialized {
                warn!(i, "mt-m2: half2 segment has no came_from direction, truncating");
                return out;
            }
            let prev_at = walker.stack[i - 1].at;
            cur = cur.step(came_from);
            out.push(cur);
            last_dir = Some(came_from);

            let mut guard = 0usize;
            while cur != prev_at {
                guard += 1;
                if guard > guard_limit {
                    warn!(?cur, "mt-m2: half2 corridor walk exceeded its step guard, truncating");
                    return out;
                }
                let direct = NEIGHBOR_ORDER
                    .into_iter()
                    .find(|&d| self.cells.can_move(cur, d) && cur.step(d) == prev_at);
                if let Some(d) = direct {
                    cur = cur.step(d);
                    out.push(cur);
                    last_dir = Some(d);
                    break;
                }
                let reverse_of_last = last_dir.map(Direction::reverse);
                let strict = NEIGHBOR_ORDER.into_iter().find(|&d| {
                    Some(d) != reverse_of_last
                        && self.cells.can_move(cur, d)
                        && self.cells.owner(cur.step(d)) == Some(owner_id)
                        && self.cells.is_visited_bt(cur.step(d))
                });
                let relaxed = strict.or_else(|| {
                    NEIGHBOR_ORDER.into_iter().find(|&d| {
                        Some(d) != reverse_of_last
                            && self.cells.can_move(cur, d)
                            && self.cells.is_visited_bt(cur.step(d))
                    })
                });
                match relaxed {
                    Some(d) => {
                        cur = cur.step(d);
                        out.push(cur);
                        last_dir = Some(d);
                    }
                    None => {
                        warn!(?cur, "mt-m2: half2 corridor walk stuck, truncating");
                        return out;
                    }
                }
            }
        }
        out
    }
}

impl<'a> Iterator for MtM2Solver<'a> {
    type Item = Phase;

    fn next(&mut self) -> Option<Phase> {
        match &mut self.stage {
            Stage::Racing => {
                self.steps += 1;
                if self.steps > self.limits.max_steps {
                    self.stage = Stage::Done;
                    return Some(Phase::NoSolution);
                }
                let mut collision: Option<(u32, Position)> = None;
                for i in 0..self.walkers.len() {
                    if self.walkers[i].finished {
                        continue;
                    }
                    let end = self.end;
                    match self.walkers[i].step(self.cells, end) {
                        StepOutcome::Continue => {}
                        StepOutcome::Dead => self.walkers[i].finished = true,
                        StepOutcome::FoundTarget(pos) => {
                            collision = Some((self.walkers[i].id, pos));
                            break;
                        }
                    }
                }
                if let Some((reporter, pos)) = collision {
                    let path = self.reconstruct(reporter, pos);
                    self.stage = Stage::Backtracking { path, next_index: 0 };
                    return Some(Phase::Searching);
                }
                if self.walkers.iter().all(|w| w.finished) {
                    self.stage = Stage::Done;
                    return Some(Phase::NoSolution);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_by_one_maze_is_immediately_finished() {
        let mut cells = CellStore::new(1, 1);
        let phases: Vec<Phase> = MtM2Solver::new(&mut cells).step_by_step().collect();
        assert_eq!(*phases.last().unwrap(), Phase::Finished);
        assert!(cells.is_on_path(Position::new(0, 0)));
    }

    #[test]
    fn two_cell_maze_meets_at_end_and_connects() {
        // width=1, height=2: Start=(0,0), End=(1,0), one open edge between them.
        let mut cells = CellStore::new(1, 2);
        let phases: Vec<Phase> = MtM2Solver::new(&mut cells).step_by_step().collect();
        assert_eq!(*phases.last().unwrap(), Phase::Finished);
        assert!(cells.is_on_path(Position::new(0, 0)));
        assert!(cells.is_on_path(Position::new(1, 0)));
        assert!(cells.can_move(Position::new(0, 0), Direction::South));
    }

    #[test]
    fn walled_off_start_yields_no_solution() {
        let mut cells = CellStore::new(2, 2);
        let start = start_position(2, 2);
        cells.set_wall(start, Direction::South);
        cells.set_wall(Position::new(0, 0), Direction::East);
        let phases: Vec<Phase> = MtM2Solver::new(&mut cells).step_by_step().collect();
        assert_eq!(*phases.last().unwrap(), Phase::NoSolution);
    }

    #[test]
    fn finished_path_always_includes_start_and_end() {
        let mut cells = CellStore::new(3, 5);
        MtM2Solver::new(&mut cells).step_by_step().for_each(drop);
        let start = start_position(3, 5);
        let end = end_position(3, 5);
        assert!(cells.is_on_path(start));
        assert!(cells.is_on_path(end));
    }
}
