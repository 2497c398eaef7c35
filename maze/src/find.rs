use std::{cmp::Ordering, collections::BinaryHeap, fmt::Display};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::grid::{CellStorage, Grid, Point};
use crate::trace::{CellState, Observer, Transition};

/// Score of a cell the search has not reached yet
pub const INFINITY: usize = usize::MAX;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Status {
    #[default]
    Unseen,
    Open,
    Current,
    Closed,
}

/// The transient per-cell values of one search. A fresh (or reset) storage of these is used for
/// every solve, the grid itself is never touched.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SearchState {
    /// best known cost from the start
    pub g: usize,
    /// Manhattan distance to the goal, set on discovery
    pub h: usize,
    /// `g + h`, the ordering key of the open set
    pub f: usize,
    pub parent: Option<Point>,
    pub status: Status,
    pub on_path: bool,
    /// discovery sequence number, breaks ties between equal `f`
    pub discovered: usize,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            g: INFINITY,
            h: 0,
            f: INFINITY,
            parent: None,
            status: Status::Unseen,
            on_path: false,
            discovered: 0,
        }
    }
}

impl Display for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Status::Unseen => write!(f, "{:03} ", ""),
            _ => write!(f, "{:03} ", self.g),
        }
    }
}

/// The objects that we store in the priority queue
#[derive(Debug, Eq, PartialEq)]
struct ToVisit {
    f: usize,
    discovered: usize,
    point: Point,
}

impl Ord for ToVisit {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.f, self.discovered)
            .cmp(&(other.f, other.discovered))
            .reverse() // reverse for BinaryHeap to be a min-heap
    }
}

impl PartialOrd for ToVisit {
    fn partial_cmp(&self, other: &ToVisit) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct PathResult {
    pub path: Vec<Point>,
    pub start: Point,
    pub goal: Point,
    pub total_cost: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFinderState {
    Computing,
    NoPathFound,
    PathFound(PathResult),
}

impl PathFinderState {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing)
    }
}

/// Outcome of a complete solve, suitable for replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub found: bool,
    pub path: Vec<Point>,
    pub trace: Vec<Transition>,
}

/// A* search over a [`Grid`] with unit step cost and the Manhattan heuristic.
///
/// The search advances one atomic step per call to [`PathFinder::step`]: either selecting the
/// cheapest open cell as current, or expanding that current cell. Every state change is appended
/// to the trace, so driving the finder step by step or running it to completion produces the same
/// trace.
#[derive(Debug)]
pub struct PathFinder {
    start: Point,
    goal: Point,
    search: CellStorage<SearchState>,
    visit_list: BinaryHeap<ToVisit>,
    current: Option<Point>,
    discovered: usize,
    expanded: usize,
    trace: Vec<Transition>,
    notified: usize,
    state: PathFinderState,
}

impl PathFinder {
    pub fn new(grid: &Grid, start: Point, goal: Point) -> Self {
        Self::with_storage(grid.create_storage(), start, goal)
    }

    /// Start a search reusing the storage of an earlier one. The storage is reset first.
    pub fn with_storage(mut search: CellStorage<SearchState>, start: Point, goal: Point) -> Self {
        search.reset();

        let mut finder = Self {
            start,
            goal,
            search,
            visit_list: BinaryHeap::new(),
            current: None,
            discovered: 0,
            expanded: 0,
            trace: Vec::new(),
            notified: 0,
            state: PathFinderState::Computing,
        };

        if !finder.search.is_valid(start) {
            debug!("start {} is outside of the grid", start);
            finder.state = PathFinderState::NoPathFound;
            return finder;
        }

        let h = start.manhattan(goal);
        *finder.search.get_mut(start) = SearchState {
            g: 0,
            h,
            f: h,
            status: Status::Open,
            ..Default::default()
        };
        finder.visit_list.push(ToVisit {
            f: h,
            discovered: 0,
            point: start,
        });
        finder.discovered = 1;
        finder.emit(start, CellState::Open);

        finder
    }

    /// Run the search to completion without pausing
    pub fn finish(mut self, grid: &Grid) -> Solution {
        while !self.step(grid).is_done() {}
        self.into_solution()
    }

    /// Run the search, handing every transition to `observer` in order. The observer may suspend
    /// the search (by blocking in `on_step`) or cancel it between atomic steps. A cancelled search
    /// can be resumed by calling `run` again.
    pub fn run<O: Observer + ?Sized>(&mut self, grid: &Grid, observer: &mut O) -> PathFinderState {
        loop {
            for transition in &self.trace[self.notified..] {
                observer.on_transition(transition);
            }
            self.notified = self.trace.len();

            if self.state.is_done() {
                return self.state.clone();
            }

            if observer.on_step(&self.state).is_break() {
                debug!(
                    "search cancelled after {} transitions",
                    self.trace.len()
                );
                return self.state.clone();
            }

            self.step(grid);
        }
    }

    /// Perform one atomic step of the search
    pub fn step(&mut self, grid: &Grid) -> PathFinderState {
        if self.state.is_done() {
            return self.state.clone();
        }

        match self.current.take() {
            Some(current) => self.expand(grid, current),
            None => self.select(),
        }

        self.state.clone()
    }

    fn select(&mut self) {
        let Some(point) = self.pop_open() else {
            debug!(
                "no path from {} to {}, open set exhausted after expanding {} cells",
                self.start, self.goal, self.expanded
            );
            trace!("scores when the open set ran out:\n{}", self.search);
            self.state = PathFinderState::NoPathFound;
            return;
        };

        self.search.get_mut(point).status = Status::Current;
        self.emit(point, CellState::Current);

        if point == self.goal {
            self.reconstruct(point);
        } else {
            self.current = Some(point);
        }
    }

    /// Pop the open cell with the lowest `f`, earliest discovery first on ties
    fn pop_open(&mut self) -> Option<Point> {
        while let Some(visit) = self.visit_list.pop() {
            let state = self.search.get(visit.point);
            // entries superseded by a cheaper route are skipped
            if state.status == Status::Open && state.f == visit.f {
                return Some(visit.point);
            }
        }
        None
    }

    fn expand(&mut self, grid: &Grid, current: Point) {
        let g = {
            let state = self.search.get_mut(current);
            state.status = Status::Closed;
            state.g
        };
        self.emit(current, CellState::Closed);
        self.expanded += 1;

        let tentative_g = g + 1;

        for neighbor in grid.neighbors_of(current) {
            if grid.is_wall(neighbor) {
                continue;
            }

            let state = self.search.get(neighbor);
            match state.status {
                Status::Closed | Status::Current => continue,
                Status::Open if tentative_g >= state.g => continue,
                Status::Open => {}
                Status::Unseen => {
                    let discovered = self.discovered;
                    self.discovered += 1;

                    let state = self.search.get_mut(neighbor);
                    state.h = neighbor.manhattan(self.goal);
                    state.status = Status::Open;
                    state.discovered = discovered;
                    self.emit(neighbor, CellState::Open);
                }
            }

            let state = self.search.get_mut(neighbor);
            state.parent = Some(current);
            state.g = tentative_g;
            state.f = tentative_g + state.h;

            let visit = ToVisit {
                f: state.f,
                discovered: state.discovered,
                point: neighbor,
            };
            self.visit_list.push(visit);
        }
    }

    fn reconstruct(&mut self, goal: Point) {
        let mut path = vec![goal];
        let mut previous = self.search.get(goal).parent;

        while let Some(from) = previous {
            path.push(from);
            previous = self.search.get(from).parent;
        }

        path.reverse();

        for &point in &path {
            self.search.get_mut(point).on_path = true;
            self.emit(point, CellState::PathFinal);
        }

        let total_cost = self.search.get(goal).g;
        debug!(
            "found path from {} to {}: cost={}, expanded {} cells",
            self.start, self.goal, total_cost, self.expanded
        );
        trace!("scores:\n{}", self.search);

        self.state = PathFinderState::PathFound(PathResult {
            path,
            start: self.start,
            goal: self.goal,
            total_cost,
        });
    }

    fn emit(&mut self, point: Point, state: CellState) {
        let transition = Transition::new(point, state);
        trace!("{}", transition);
        self.trace.push(transition);
    }

    pub fn into_solution(self) -> Solution {
        let (found, path) = match self.state {
            PathFinderState::PathFound(result) => (true, result.path),
            _ => (false, Vec::new()),
        };

        Solution {
            found,
            path,
            trace: self.trace,
        }
    }

    pub fn state(&self) -> &PathFinderState {
        &self.state
    }

    pub fn get_search(&self) -> &CellStorage<SearchState> {
        &self.search
    }

    pub fn trace(&self) -> &[Transition] {
        &self.trace
    }

    /// The cell selected for expansion, if the next step expands it
    pub fn current(&self) -> Option<Point> {
        self.current
    }

    /// Number of cells moved to the closed set so far
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }
}

/// Find the shortest route from `start` to `goal`, running the search to completion
pub fn solve(grid: &Grid, start: Point, goal: Point) -> Solution {
    PathFinder::new(grid, start, goal).finish(grid)
}
