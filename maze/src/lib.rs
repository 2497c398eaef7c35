//! Perfect maze generation and an A* search that records every state change it makes, so the
//! search can be replayed or animated by a renderer.

pub mod find;
pub mod generate;
pub mod grid;
pub mod trace;

#[cfg(test)]
mod util;

pub use find::{solve, PathFinder, PathFinderState, PathResult, SearchState, Solution, Status};
pub use generate::{coerce_size, generate, MazeGenerator};
pub use grid::{Cell, CellStorage, Grid, Point};
pub use trace::{CellState, Observer, Replay, Transition, Visual};
