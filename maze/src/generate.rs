use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::grid::{Grid, Point};

/// Smallest dimension that still leaves one carvable cell inside the wall border
pub const MIN_SIZE: usize = 3;

/// Coerce a requested dimension to an odd value of at least [`MIN_SIZE`]. Even values are bumped
/// up by one so the carving lattice ends on a cell next to the border.
pub fn coerce_size(requested: usize) -> usize {
    let size = requested.max(MIN_SIZE);
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

/// Carve a perfect maze with a randomized depth-first search.
///
/// Both dimensions are coerced with [`coerce_size`]. Carving starts at (1, 1) and moves two cells
/// at a time, opening the wall in between, so every cell with odd coordinates ends up on a single
/// spanning tree. The start is placed at (1, 1) and the end at (rows - 2, columns - 2).
pub fn generate<R: Rng>(rows: usize, columns: usize, rng: &mut R) -> Grid {
    let rows = coerce_size(rows);
    let columns = coerce_size(columns);

    let mut grid = Grid::new(rows, columns);

    let origin = Point::new(1, 1);
    grid.set_wall(origin, false);

    // explicit stack instead of recursion, large mazes would blow the call stack
    let mut stack = vec![origin];
    let mut carved = 1;

    while let Some(&current) = stack.last() {
        let candidates = carve_candidates(&grid, current);

        if candidates.is_empty() {
            stack.pop();
            continue;
        }

        let next = candidates[rng.gen_range(0..candidates.len())];
        let between = Point::new((current.row + next.row) / 2, (current.col + next.col) / 2);

        grid.set_wall(between, false);
        grid.set_wall(next, false);
        carved += 2;

        stack.push(next);
    }

    let end = Point::new(rows - 2, columns - 2);
    grid.set_start(origin);
    grid.set_end(end);

    debug!(
        "generated {}x{} maze with {} path cells, start {} end {}",
        rows, columns, carved, origin, end
    );

    grid
}

/// The cells two steps away from `from` (up, down, left, right) that lie strictly inside the
/// border and are still walls
fn carve_candidates(grid: &Grid, from: Point) -> Vec<Point> {
    let mut points = Vec::with_capacity(4);

    if from.row >= 3 {
        points.push(Point::new(from.row - 2, from.col));
    }
    if from.row + 2 <= grid.rows() - 2 {
        points.push(Point::new(from.row + 2, from.col));
    }
    if from.col >= 3 {
        points.push(Point::new(from.row, from.col - 2));
    }
    if from.col + 2 <= grid.columns() - 2 {
        points.push(Point::new(from.row, from.col + 2));
    }

    points.retain(|p| grid.is_wall(*p));
    points
}

/// Owns a random source and generates mazes from it
#[derive(Debug)]
pub struct MazeGenerator<R: Rng = StdRng> {
    rng: R,
}

impl MazeGenerator<StdRng> {
    /// Same seed, same sequence of mazes
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> MazeGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate(&mut self, rows: usize, columns: usize) -> Grid {
        generate(rows, columns, &mut self.rng)
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::util::bfs_distances;

    #[test]
    fn test_coerce_size() {
        for (requested, expected) in [(0, 3), (1, 3), (2, 3), (3, 3), (4, 5), (5, 5), (10, 11)] {
            assert_eq!(coerce_size(requested), expected, "requested {}", requested);
        }
    }

    #[test]
    fn test_dimensions_are_coerced() {
        let grid = MazeGenerator::from_seed(1).generate(10, 7);

        assert_eq!(grid.rows(), 11);
        assert_eq!(grid.columns(), 7);
        assert_eq!(grid.start(), Some(Point::new(1, 1)));
        assert_eq!(grid.end(), Some(Point::new(9, 5)));
    }

    #[test]
    fn test_start_and_end_are_open() {
        let mut generator = MazeGenerator::from_seed(7);

        for size in [3, 5, 8, 21, 40] {
            let grid = generator.generate(size, size);
            let start = grid.start().unwrap();
            let end = grid.end().unwrap();

            assert!(!grid.is_wall(start));
            assert!(!grid.is_wall(end));
            assert!(grid.cell(start).is_start);
            assert!(grid.cell(end).is_end);
        }
    }

    #[test]
    fn test_smallest_maze() {
        let grid = MazeGenerator::from_seed(0).generate(0, 2);

        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.path_cells().collect::<Vec<_>>(), vec![Point::new(1, 1)]);
        // start and end fall on the same cell
        assert_eq!(grid.start(), grid.end());
    }

    #[test]
    fn test_border_stays_walled() {
        let grid = MazeGenerator::from_seed(3).generate(25, 17);

        for row in 0..grid.rows() {
            for col in 0..grid.columns() {
                if row == 0 || col == 0 || row == grid.rows() - 1 || col == grid.columns() - 1 {
                    assert!(grid.is_wall(Point::new(row, col)), "({}, {})", row, col);
                }
            }
        }
    }

    #[test]
    fn test_maze_is_spanning_tree() {
        let mut generator = MazeGenerator::from_seed(42);

        for (rows, columns) in [(5, 5), (9, 15), (21, 21), (30, 12)] {
            let grid = generator.generate(rows, columns);
            let distances = bfs_distances(&grid, grid.start().unwrap());

            // every path cell can be reached from the start
            for point in grid.path_cells() {
                assert!(distances.get(point).is_some(), "{} unreachable", point);
            }

            // every lattice cell was carved
            for row in (1..grid.rows() - 1).step_by(2) {
                for col in (1..grid.columns() - 1).step_by(2) {
                    assert!(!grid.is_wall(Point::new(row, col)));
                }
            }

            // a connected graph with one edge less than nodes has no loops
            let cells = grid.path_cells().count();
            let edges = grid
                .path_cells()
                .flat_map(|p| [Point::new(p.row + 1, p.col), Point::new(p.row, p.col + 1)])
                .filter(|p| grid.is_valid(*p) && !grid.is_wall(*p))
                .count();
            assert_eq!(edges, cells - 1);
        }
    }

    #[test]
    fn test_same_seed_same_maze() {
        let a = MazeGenerator::from_seed(1234).generate(31, 31);
        let b = MazeGenerator::from_seed(1234).generate(31, 31);
        let c = MazeGenerator::from_seed(4321).generate(31, 31);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_generator_matches_free_function() {
        let mut rng = StdRng::seed_from_u64(99);
        let from_fn = generate(15, 15, &mut rng);
        let from_generator = MazeGenerator::new(StdRng::seed_from_u64(99)).generate(15, 15);

        assert_eq!(from_fn, from_generator);
    }
}
