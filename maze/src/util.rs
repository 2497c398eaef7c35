//! Brute force helpers that the tests use as an oracle for the search.

use std::collections::VecDeque;

use crate::grid::{CellStorage, Grid, Point};

/// Breadth-first distances from `from` through non-wall cells, `None` where unreachable
pub fn bfs_distances(grid: &Grid, from: Point) -> CellStorage<Option<usize>> {
    let mut distances = grid.create_storage::<Option<usize>>();
    let mut queue = VecDeque::from([from]);
    *distances.get_mut(from) = Some(0);

    while let Some(point) = queue.pop_front() {
        let distance = distances.get(point).unwrap_or_default();

        for neighbor in grid.neighbors_of(point) {
            if grid.is_wall(neighbor) || distances.get(neighbor).is_some() {
                continue;
            }
            *distances.get_mut(neighbor) = Some(distance + 1);
            queue.push_back(neighbor);
        }
    }

    distances
}
