use std::{fmt::Display, str::FromStr};

use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};

/// The static topology of a single cell. Survives any number of solves and is only replaced when
/// a new maze is generated.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Cell {
    pub is_wall: bool,
    pub is_start: bool,
    pub is_end: bool,
}

impl Cell {
    pub const WALL: Cell = Cell {
        is_wall: true,
        is_start: false,
        is_end: false,
    };
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Cell { is_start: true, .. } => "S",
                Cell { is_end: true, .. } => "E",
                Cell { is_wall: true, .. } => "#",
                _ => " ",
            }
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance, `|drow| + |dcol|`
    pub fn manhattan(&self, other: Point) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Per-cell values for a rectangular grid, stored row-major in one single vec
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CellStorage<T> {
    rows: usize,
    columns: usize,
    cells: Vec<T>,
}

impl<T: Copy> CellStorage<T> {
    pub fn new(rows: usize, columns: usize, value: T) -> Self {
        Self {
            rows,
            columns,
            cells: vec![value; rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn is_valid(&self, node: Point) -> bool {
        node.row < self.rows && node.col < self.columns
    }

    pub fn get(&self, node: Point) -> T {
        self.cells[self.index(node)]
    }

    pub fn get_mut(&mut self, node: Point) -> &mut T {
        let index = self.index(node);
        &mut self.cells[index]
    }

    /// Iterate over all values together with their coordinate, row by row
    pub fn iter(&self) -> impl Iterator<Item = (Point, &T)> + '_ {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, value)| (Point::new(i / columns, i % columns), value))
    }

    fn index(&self, node: Point) -> usize {
        debug_assert!(self.is_valid(node), "{} outside of storage", node);
        node.row * self.columns + node.col
    }
}

impl<T: Copy + Default> CellStorage<T> {
    /// Put every cell back to its default value
    pub fn reset(&mut self) {
        self.cells.fill(T::default());
    }
}

impl<T: Display> Display for CellStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.columns.max(1)) {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// A rectangular grid of cells with at most one start and one end cell
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Grid {
    cells: CellStorage<Cell>,
    start: Option<Point>,
    end: Option<Point>,
}

impl Grid {
    /// Create a grid where every cell is a wall and no start or end is set
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            cells: CellStorage::new(rows, columns, Cell::WALL),
            start: None,
            end: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.rows()
    }

    pub fn columns(&self) -> usize {
        self.cells.columns()
    }

    pub fn is_valid(&self, node: Point) -> bool {
        self.cells.is_valid(node)
    }

    pub fn cell(&self, node: Point) -> Cell {
        self.cells.get(node)
    }

    pub fn is_wall(&self, node: Point) -> bool {
        self.cells.get(node).is_wall
    }

    pub fn set_wall(&mut self, node: Point, is_wall: bool) {
        self.cells.get_mut(node).is_wall = is_wall;
    }

    pub fn start(&self) -> Option<Point> {
        self.start
    }

    pub fn end(&self) -> Option<Point> {
        self.end
    }

    /// Move the start flag to `node` and force that cell open
    pub fn set_start(&mut self, node: Point) {
        if let Some(old) = self.start.replace(node) {
            self.cells.get_mut(old).is_start = false;
        }
        let cell = self.cells.get_mut(node);
        cell.is_start = true;
        cell.is_wall = false;
    }

    /// Move the end flag to `node` and force that cell open
    pub fn set_end(&mut self, node: Point) {
        if let Some(old) = self.end.replace(node) {
            self.cells.get_mut(old).is_end = false;
        }
        let cell = self.cells.get_mut(node);
        cell.is_end = true;
        cell.is_wall = false;
    }

    /// The in-bounds 4-connected neighbors of `node`, ordered up, down, left, right. Walls are
    /// included.
    pub fn neighbors_of(&self, node: Point) -> impl Iterator<Item = Point> {
        let mut points = Vec::with_capacity(4);

        if node.row > 0 {
            points.push(Point::new(node.row - 1, node.col));
        }
        if node.row + 1 < self.rows() {
            points.push(Point::new(node.row + 1, node.col));
        }
        if node.col > 0 {
            points.push(Point::new(node.row, node.col - 1));
        }
        if node.col + 1 < self.columns() {
            points.push(Point::new(node.row, node.col + 1));
        }

        points.into_iter()
    }

    /// All cells that are not walls, row by row
    pub fn path_cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.is_wall)
            .map(|(point, _)| point)
    }

    /// Create a storage for values of type T, one per cell
    pub fn create_storage<T: Default + Copy>(&self) -> CellStorage<T> {
        CellStorage::new(self.rows(), self.columns(), T::default())
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cells)
    }
}

/// Parses the format written by `Display`: `#` wall, ` ` or `.` path, `S` start, `E` end.
/// Empty lines are ignored.
impl FromStr for Grid {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<Vec<char>> = s
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().collect())
            .collect();

        let columns = match lines.first() {
            Some(line) => line.len(),
            None => bail!("grid text is empty"),
        };

        let mut grid = Grid::new(lines.len(), columns);

        for (row, line) in lines.iter().enumerate() {
            if line.len() != columns {
                bail!(
                    "row {} has {} columns, expected {}",
                    row,
                    line.len(),
                    columns
                );
            }

            for (col, c) in line.iter().enumerate() {
                let point = Point::new(row, col);
                match c {
                    '#' => {}
                    ' ' | '.' => grid.set_wall(point, false),
                    'S' => {
                        if grid.start.is_some() {
                            bail!("second start cell at {}", point);
                        }
                        grid.set_start(point);
                    }
                    'E' => {
                        if grid.end.is_some() {
                            bail!("second end cell at {}", point);
                        }
                        grid.set_end(point);
                    }
                    other => bail!("invalid cell {:?} at {}", other, point),
                }
            }
        }

        if grid.start.is_none() {
            return Err(anyhow!("grid has no start cell"));
        }
        if grid.end.is_none() {
            return Err(anyhow!("grid has no end cell"));
        }

        Ok(grid)
    }
}
