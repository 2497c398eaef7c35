use std::{fmt::Display, ops::ControlFlow, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::find::PathFinderState;
use crate::grid::{CellStorage, Grid, Point};

/// The state a cell moves into during a search
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellState {
    Open,
    Current,
    Closed,
    PathFinal,
}

impl Display for CellState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CellState::Open => "open",
                CellState::Current => "current",
                CellState::Closed => "closed",
                CellState::PathFinal => "path-final",
            }
        )
    }
}

impl FromStr for CellState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(CellState::Open),
            "current" => Ok(CellState::Current),
            "closed" => Ok(CellState::Closed),
            "path-final" => Ok(CellState::PathFinal),
            _ => Err(anyhow::anyhow!("Invalid cell state: {}", s)),
        }
    }
}

/// One discrete change emitted by the search, in the order it happened
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub point: Point,
    pub state: CellState,
}

impl Transition {
    pub fn new(point: Point, state: CellState) -> Self {
        Self { point, state }
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.point, self.state)
    }
}

/// Receives the transitions of a running search.
///
/// `on_step` is called between atomic steps, which is the only place a search may be suspended
/// or cancelled.
pub trait Observer {
    fn on_transition(&mut self, transition: &Transition);

    /// Called with the state reached so far. Return `ControlFlow::Break` to stop the search
    /// before its next step
    fn on_step(&mut self, _state: &PathFinderState) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<F: FnMut(&Transition)> Observer for F {
    fn on_transition(&mut self, transition: &Transition) {
        self(transition)
    }
}

/// Display flags of a single cell, rebuilt from transitions
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Visual {
    pub open: bool,
    pub closed: bool,
    pub current: bool,
    pub path_final: bool,
}

impl Visual {
    pub fn apply(&mut self, state: CellState) {
        match state {
            CellState::Open => {
                self.open = true;
                self.closed = false;
                self.current = false;
            }
            CellState::Current => {
                self.current = true;
                self.open = false;
                self.closed = false;
            }
            CellState::Closed => {
                self.closed = true;
                self.open = false;
                self.current = false;
            }
            CellState::PathFinal => self.path_final = true,
        }
    }
}

/// Replays a transition stream onto per-cell [`Visual`] flags so a renderer can draw any
/// intermediate frame of a search
#[derive(Clone, Debug)]
pub struct Replay {
    cells: CellStorage<Visual>,
    applied: usize,
}

impl Replay {
    pub fn new(grid: &Grid) -> Self {
        Self {
            cells: grid.create_storage(),
            applied: 0,
        }
    }

    pub fn apply(&mut self, transition: &Transition) {
        self.cells.get_mut(transition.point).apply(transition.state);
        self.applied += 1;
    }

    pub fn visual(&self, point: Point) -> Visual {
        self.cells.get(point)
    }

    /// Number of transitions applied so far
    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn reset(&mut self) {
        self.cells.reset();
        self.applied = 0;
    }
}

impl Observer for Replay {
    fn on_transition(&mut self, transition: &Transition) {
        self.apply(transition);
    }
}
