use anyhow::anyhow;
use log::{debug, info};
use maze::{Grid, MazeGenerator, Observer, PathFinder, PathFinderState, Solution};

use crate::settings::Settings;

/// One maze at a time, and the searches run on it
pub struct App {
    settings: Settings,
    generator: MazeGenerator,
    grid: Grid,
    solved: Option<Solution>,
}

impl App {
    /// Set up the session and generate the first maze
    pub fn new(settings: Settings) -> Self {
        let generator = match settings.seed {
            Some(seed) => MazeGenerator::from_seed(seed),
            None => MazeGenerator::from_entropy(),
        };

        let mut app = Self {
            settings,
            generator,
            grid: Grid::new(0, 0),
            solved: None,
        };
        app.generate();
        app
    }

    /// Replace the maze with a freshly generated one. Any earlier solution is dropped with it.
    pub fn generate(&mut self) -> &Grid {
        self.grid = self
            .generator
            .generate(self.settings.rows, self.settings.columns);
        self.solved = None;

        info!(
            "generated {}x{} maze",
            self.grid.rows(),
            self.grid.columns()
        );
        &self.grid
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The last completed solve on the current maze
    pub fn solution(&self) -> Option<&Solution> {
        self.solved.as_ref()
    }

    /// Create a fresh search from the start to the end of the current maze
    pub fn pathfinder(&self) -> anyhow::Result<PathFinder> {
        let start = self
            .grid
            .start()
            .ok_or_else(|| anyhow!("maze has no start cell"))?;
        let end = self
            .grid
            .end()
            .ok_or_else(|| anyhow!("maze has no end cell"))?;

        Ok(PathFinder::new(&self.grid, start, end))
    }

    /// Solve the current maze, feeding every transition to `observer`. Returns `None` when the
    /// observer cancelled the search.
    pub fn solve<O: Observer + ?Sized>(
        &mut self,
        observer: &mut O,
    ) -> anyhow::Result<Option<&Solution>> {
        let mut finder = self.pathfinder()?;

        let state = finder.run(&self.grid, observer);
        match &state {
            PathFinderState::Computing => {
                debug!("search stopped after {} transitions", finder.trace().len());
                return Ok(None);
            }
            PathFinderState::PathFound(result) => info!(
                "path found: {} steps, {} cells expanded",
                result.total_cost,
                finder.expanded()
            ),
            PathFinderState::NoPathFound => {
                info!("no path found, {} cells expanded", finder.expanded())
            }
        }

        self.solved = Some(finder.into_solution());
        Ok(self.solved.as_ref())
    }
}

#[cfg(test)]
mod test {

    use std::ops::ControlFlow;

    use maze::{Point, Transition};

    use super::*;

    fn seeded(seed: u64, size: usize) -> Settings {
        Settings {
            rows: size,
            columns: size,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_seeded_sessions_agree() {
        let a = App::new(seeded(77, 15));
        let b = App::new(seeded(77, 15));

        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.grid().start(), Some(Point::new(1, 1)));
        assert_eq!(a.grid().end(), Some(Point::new(13, 13)));
    }

    #[test]
    fn test_solve_then_regenerate() {
        let mut app = App::new(seeded(5, 12));
        let mut count = 0;

        let solution = app
            .solve(&mut |_: &Transition| count += 1)
            .unwrap()
            .cloned()
            .unwrap();

        assert!(solution.found);
        assert_eq!(solution.trace.len(), count);
        assert_eq!(solution.path.first(), app.grid().start().as_ref());
        assert_eq!(solution.path.last(), app.grid().end().as_ref());

        // solving again gives the same answer
        let again = app.solve(&mut |_: &Transition| {}).unwrap().cloned();
        assert_eq!(again, Some(solution.clone()));

        let old = app.grid().clone();
        app.generate();
        assert!(app.solution().is_none());
        assert_ne!(app.grid(), &old);
        assert_eq!(app.grid().rows(), 13);
    }

    struct Cancel;

    impl Observer for Cancel {
        fn on_transition(&mut self, _: &Transition) {}

        fn on_step(&mut self, _: &PathFinderState) -> ControlFlow<()> {
            ControlFlow::Break(())
        }
    }

    #[test]
    fn test_cancelled_solve() {
        let mut app = App::new(seeded(1, 9));

        assert!(app.solve(&mut Cancel).unwrap().is_none());
        assert!(app.solution().is_none());
    }
}
