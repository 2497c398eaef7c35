//! Generate a maze, solve it with A* and show the search in the terminal, as PNG frames or as a
//! JSON trace

use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use log::info;

use app::App;
use presenter::{FrameWriter, Presenter};
use settings::Settings;

mod app;
mod presenter;
mod render;
mod settings;

/// Perfect maze generator and A* visualizer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Settings file (JSON), flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maze size, used for both rows and columns
    #[arg(long)]
    size: Option<usize>,

    /// Number of rows, even values are bumped to the next odd one
    #[arg(long)]
    rows: Option<usize>,

    /// Number of columns, even values are bumped to the next odd one
    #[arg(long)]
    cols: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Animate the search in the terminal
    #[arg(long)]
    animate: bool,

    /// Pause after each selected cell while animating, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Write PNG frames of the search into this directory
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Write a frame every n transitions
    #[arg(long)]
    frame_every: Option<usize>,

    /// Cell size of the PNG frames in pixels
    #[arg(long)]
    cell_size: Option<u32>,

    /// Write the solution and its transition trace as JSON to this file
    #[arg(long)]
    trace: Option<PathBuf>,
}

impl Args {
    fn apply(self, settings: &mut Settings) {
        if let Some(size) = self.size {
            settings.rows = size;
            settings.columns = size;
        }
        if let Some(rows) = self.rows {
            settings.rows = rows;
        }
        if let Some(columns) = self.cols {
            settings.columns = columns;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        if self.animate {
            settings.animate = true;
        }
        if let Some(delay_ms) = self.delay_ms {
            settings.delay_ms = delay_ms;
        }
        if self.frames.is_some() {
            settings.frames = self.frames;
        }
        if let Some(frame_every) = self.frame_every {
            settings.frame_every = frame_every;
        }
        if let Some(cell_size) = self.cell_size {
            settings.cell_size = cell_size;
        }
        if self.trace.is_some() {
            settings.trace = self.trace;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    args.apply(&mut settings);

    let mut app = App::new(settings.clone());
    let grid = app.grid().clone();

    let frames = settings
        .frames
        .clone()
        .map(|dir| FrameWriter::new(&grid, dir, settings.frame_every, settings.cell_size))
        .transpose()?;
    let delay = settings.animate.then(|| settings.delay());

    let mut presenter = Presenter::new(&grid, delay, frames);
    presenter.begin()?;

    app.solve(&mut presenter)?;
    // a failed frame or draw stops the search, report that error first
    let replay = presenter.finish()?;
    let solution = app
        .solution()
        .context("search stopped before it finished")?;

    if !settings.animate {
        print!("{}", render::to_ascii(&grid, &replay));
    }

    if let Some(path) = &settings.trace {
        let json = serde_json::to_string_pretty(solution)?;
        fs::write(path, json).with_context(|| format!("writing trace to {}", path.display()))?;
        info!("wrote trace to {}", path.display());
    }

    if solution.found {
        println!(
            "Path found: {} steps, {} transitions",
            solution.path.len() - 1,
            solution.trace.len()
        );
    } else {
        println!("No path found, {} transitions", solution.trace.len());
    }

    Ok(())
}
