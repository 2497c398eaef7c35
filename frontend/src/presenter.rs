use std::{
    fs,
    io::{self, Write},
    ops::ControlFlow,
    path::PathBuf,
    thread,
    time::Duration,
};

use anyhow::Context;
use crossterm::{
    cursor::MoveTo,
    terminal::{Clear, ClearType},
    QueueableCommand,
};
use log::{debug, info};
use maze::{CellState, Grid, Observer, PathFinderState, Replay, Transition};

use crate::render;

/// Writes numbered PNG frames of a replay into a directory
pub struct FrameWriter {
    dir: PathBuf,
    every: usize,
    cell_size: u32,
    written: usize,
    since_last: usize,
}

impl FrameWriter {
    /// Fails early when frames of `grid` would not fit into an image
    pub fn new(grid: &Grid, dir: PathBuf, every: usize, cell_size: u32) -> anyhow::Result<Self> {
        render::frame_size(grid, cell_size)?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating frame directory {}", dir.display()))?;

        Ok(Self {
            dir,
            every: every.max(1),
            cell_size,
            written: 0,
            since_last: 0,
        })
    }

    pub fn write(&mut self, grid: &Grid, replay: &Replay) -> anyhow::Result<()> {
        let path = self.dir.join(format!("frame_{:05}.png", self.written));
        render::to_image(grid, replay, self.cell_size)?
            .save(&path)
            .with_context(|| format!("writing frame {}", path.display()))?;

        self.written += 1;
        self.since_last = 0;
        Ok(())
    }

    /// Count one transition and write a frame if it is due
    pub fn tick(&mut self, grid: &Grid, replay: &Replay) -> anyhow::Result<()> {
        self.since_last += 1;
        if self.since_last >= self.every {
            self.write(grid, replay)?;
        }
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

/// Presents a running search: keeps a replay of its transitions, redraws the terminal and writes
/// frames. Pacing happens here, the search itself never waits.
pub struct Presenter<'a> {
    grid: &'a Grid,
    replay: Replay,
    delay: Option<Duration>,
    frames: Option<FrameWriter>,
    error: Option<anyhow::Error>,
    /// Cells shown as open right now
    open: usize,
    /// A cell was closed since the last step boundary
    expanded: bool,
}

impl<'a> Presenter<'a> {
    /// `delay` enables terminal animation
    pub fn new(grid: &'a Grid, delay: Option<Duration>, frames: Option<FrameWriter>) -> Self {
        Self {
            grid,
            replay: Replay::new(grid),
            delay,
            frames,
            error: None,
            open: 0,
            expanded: false,
        }
    }

    /// Draw the untouched maze before the first transition
    pub fn begin(&mut self) -> anyhow::Result<()> {
        if self.delay.is_some() {
            self.draw()?;
        }
        if let Some(frames) = &mut self.frames {
            frames.write(self.grid, &self.replay)?;
        }
        Ok(())
    }

    /// Write the final frame and report the first error seen while presenting
    pub fn finish(mut self) -> anyhow::Result<Replay> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        if self.delay.is_some() {
            self.draw()?;
        }
        if let Some(frames) = &mut self.frames {
            frames.write(self.grid, &self.replay)?;
            info!(
                "wrote {} frames to {}",
                frames.written(),
                frames.dir.display()
            );
        }
        Ok(self.replay)
    }

    /// How long to hold the frame after a transition
    fn pause_after(&self, transition: &Transition, delay: Duration) -> Duration {
        match transition.state {
            CellState::Current => delay,
            CellState::PathFinal => {
                let cell = self.grid.cell(transition.point);
                if cell.is_start || cell.is_end {
                    Duration::ZERO
                } else {
                    delay / 2
                }
            }
            CellState::Open | CellState::Closed => Duration::ZERO,
        }
    }

    /// How long to hold the frame between two steps. Only an expansion that left cells to visit
    /// gets a pause, so its freshly opened neighbours are on screen.
    fn pause_between_steps(&self, delay: Duration) -> Duration {
        if self.expanded && self.open > 0 {
            (delay / 5).max(Duration::from_millis(1))
        } else {
            Duration::ZERO
        }
    }

    fn draw(&self) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.queue(MoveTo(0, 0))?;
        stdout.queue(Clear(ClearType::All))?;
        for line in render::to_ascii(self.grid, &self.replay).lines() {
            // raw newlines do not return the cursor once the screen was cleared
            write!(stdout, "{}\r\n", line)?;
        }
        stdout.flush()
    }

    fn present(&mut self, transition: &Transition) -> anyhow::Result<()> {
        self.replay.apply(transition);
        match transition.state {
            CellState::Open => self.open += 1,
            CellState::Current => self.open = self.open.saturating_sub(1),
            CellState::Closed => self.expanded = true,
            CellState::PathFinal => {}
        }

        if let Some(delay) = self.delay {
            let pause = self.pause_after(transition, delay);
            if !pause.is_zero() {
                self.draw()?;
                thread::sleep(pause);
            }
        }

        if let Some(frames) = &mut self.frames {
            frames.tick(self.grid, &self.replay)?;
        }

        Ok(())
    }
}

impl Observer for Presenter<'_> {
    fn on_transition(&mut self, transition: &Transition) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.present(transition) {
            self.error = Some(error);
        }
    }

    fn on_step(&mut self, _state: &PathFinderState) -> ControlFlow<()> {
        if self.error.is_none() {
            if let Some(delay) = self.delay {
                let pause = self.pause_between_steps(delay);
                if !pause.is_zero() {
                    match self.draw() {
                        Ok(()) => thread::sleep(pause),
                        Err(error) => self.error = Some(error.into()),
                    }
                }
            }
        }
        self.expanded = false;

        if self.error.is_some() {
            debug!("stopping search, presenting failed");
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}
