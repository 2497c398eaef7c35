use anyhow::anyhow;
use image::{Rgb, RgbImage};
use maze::{Cell, Grid, Point, Replay, Visual};

pub const WALL: Rgb<u8> = Rgb([0x33, 0x33, 0x33]);
pub const PATH: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
pub const START: Rgb<u8> = Rgb([0x28, 0xa7, 0x45]);
pub const END: Rgb<u8> = Rgb([0xdc, 0x35, 0x45]);
pub const OPEN: Rgb<u8> = Rgb([0xad, 0xd8, 0xe6]);
pub const CLOSED: Rgb<u8> = Rgb([0xb0, 0xc4, 0xde]);
pub const CURRENT: Rgb<u8> = Rgb([0xff, 0xc1, 0x07]);
pub const PATH_FINAL: Rgb<u8> = Rgb([0xff, 0xeb, 0x3b]);
pub const GRID_LINE: Rgb<u8> = Rgb([0xee, 0xee, 0xee]);

/// Colour of a cell, later rules win: wall, closed, open, current, path, start, end
pub fn cell_color(cell: Cell, visual: Visual) -> Rgb<u8> {
    let mut color = PATH;

    if cell.is_wall {
        color = WALL;
    }
    if visual.closed {
        color = CLOSED;
    }
    if visual.open {
        color = OPEN;
    }
    if visual.current {
        color = CURRENT;
    }
    if visual.path_final {
        color = PATH_FINAL;
    }
    if cell.is_start {
        color = START;
    }
    if cell.is_end {
        color = END;
    }

    color
}

/// Same precedence as [`cell_color`], for terminals
pub fn cell_char(cell: Cell, visual: Visual) -> char {
    match (cell, visual) {
        (Cell { is_end: true, .. }, _) => 'E',
        (Cell { is_start: true, .. }, _) => 'S',
        (_, Visual { path_final: true, .. }) => '*',
        (_, Visual { current: true, .. }) => '@',
        (_, Visual { open: true, .. }) => 'o',
        (_, Visual { closed: true, .. }) => '.',
        (Cell { is_wall: true, .. }, _) => '#',
        _ => ' ',
    }
}

pub fn to_ascii(grid: &Grid, replay: &Replay) -> String {
    let mut out = String::with_capacity((grid.columns() + 1) * grid.rows());

    for row in 0..grid.rows() {
        for col in 0..grid.columns() {
            let point = Point::new(row, col);
            out.push(cell_char(grid.cell(point), replay.visual(point)));
        }
        out.push('\n');
    }

    out
}

/// Pixel size of a frame, as long as it fits into an image buffer
pub fn frame_size(grid: &Grid, cell_size: u32) -> anyhow::Result<(u32, u32)> {
    let cell_size = cell_size.max(1);
    let pixels = |cells: usize| {
        u32::try_from(cells)
            .ok()
            .and_then(|cells| cells.checked_mul(cell_size))
    };

    let size = match (pixels(grid.columns()), pixels(grid.rows())) {
        (Some(width), Some(height)) => (width as usize)
            .checked_mul(height as usize)
            .and_then(|area| area.checked_mul(3))
            .map(|_| (width, height)),
        _ => None,
    };

    size.ok_or_else(|| {
        anyhow!(
            "a {}x{} maze with {} pixel cells is too large for an image",
            grid.rows(),
            grid.columns(),
            cell_size
        )
    })
}

/// Draw one frame with `cell_size` pixels per cell. Cells of at least 4 pixels get a one pixel
/// grid line on their top and left edge.
pub fn to_image(grid: &Grid, replay: &Replay, cell_size: u32) -> anyhow::Result<RgbImage> {
    let (width, height) = frame_size(grid, cell_size)?;
    let cell_size = cell_size.max(1);
    let mut img = RgbImage::new(width, height);
    let grid_lines = cell_size >= 4;

    for row in 0..grid.rows() {
        for col in 0..grid.columns() {
            let point = Point::new(row, col);
            let color = cell_color(grid.cell(point), replay.visual(point));

            let x0 = col as u32 * cell_size;
            let y0 = row as u32 * cell_size;
            for dy in 0..cell_size {
                for dx in 0..cell_size {
                    let on_line = grid_lines && (dx == 0 || dy == 0);
                    img.put_pixel(x0 + dx, y0 + dy, if on_line { GRID_LINE } else { color });
                }
            }
        }
    }

    Ok(img)
}

#[cfg(test)]
mod test {

    use maze::{CellState, Transition};

    use super::*;

    fn create_basic_map() -> Grid {
        "#####\n#S..#\n###.#\n#E..#\n#####\n".parse().unwrap()
    }

    #[test]
    fn test_color_precedence() {
        let path = Cell::default();
        let both = Visual {
            open: true,
            closed: true,
            current: true,
            path_final: true,
        };

        assert_eq!(cell_color(Cell::WALL, Visual::default()), WALL);
        assert_eq!(cell_color(path, Visual::default()), PATH);
        assert_eq!(cell_color(path, both), PATH_FINAL);
        assert_eq!(
            cell_color(
                path,
                Visual {
                    open: true,
                    closed: true,
                    ..Default::default()
                }
            ),
            OPEN
        );
        assert_eq!(
            cell_color(
                Cell {
                    is_start: true,
                    ..Default::default()
                },
                both
            ),
            START
        );
        assert_eq!(
            cell_color(
                Cell {
                    is_end: true,
                    ..Default::default()
                },
                both
            ),
            END
        );
    }

    #[test]
    fn test_ascii_frame() {
        let grid = create_basic_map();
        let mut replay = Replay::new(&grid);

        assert_eq!(to_ascii(&grid, &replay), grid.to_string());

        replay.apply(&Transition::new(Point::new(1, 2), CellState::Closed));
        replay.apply(&Transition::new(Point::new(1, 3), CellState::Open));
        replay.apply(&Transition::new(Point::new(2, 3), CellState::Current));
        replay.apply(&Transition::new(Point::new(1, 1), CellState::PathFinal));

        assert_eq!(
            to_ascii(&grid, &replay),
            "#####\n#S.o#\n###@#\n#E  #\n#####\n"
        );
    }

    #[test]
    fn test_image_frame() {
        let grid = create_basic_map();
        let mut replay = Replay::new(&grid);
        replay.apply(&Transition::new(Point::new(2, 3), CellState::Current));

        let img = to_image(&grid, &replay, 10).unwrap();

        assert_eq!(img.dimensions(), (50, 50));
        // grid line in the corner of every cell
        assert_eq!(*img.get_pixel(0, 0), GRID_LINE);
        assert_eq!(*img.get_pixel(5, 5), WALL);
        assert_eq!(*img.get_pixel(15, 15), START);
        assert_eq!(*img.get_pixel(15, 35), END);
        assert_eq!(*img.get_pixel(35, 25), CURRENT);
        assert_eq!(*img.get_pixel(25, 15), PATH);

        let tiny = to_image(&grid, &replay, 1).unwrap();
        assert_eq!(tiny.dimensions(), (5, 5));
        assert_eq!(*tiny.get_pixel(0, 0), WALL);
    }

    #[test]
    fn test_oversized_frame() {
        let grid = create_basic_map();
        let replay = Replay::new(&grid);

        assert_eq!(frame_size(&grid, 0).unwrap(), (5, 5));
        assert_eq!(frame_size(&grid, 20).unwrap(), (100, 100));
        assert!(frame_size(&grid, u32::MAX / 4).is_err());
        assert!(to_image(&grid, &replay, u32::MAX).is_err());
    }
}
