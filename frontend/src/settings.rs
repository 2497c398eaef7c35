use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use log::debug;

/// Everything the session needs to know. Loaded from an optional JSON file, command line flags
/// override individual values.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old files
pub struct Settings {
    /// requested rows, coerced to an odd value of at least 3
    pub rows: usize,
    /// requested columns, coerced like `rows`
    pub columns: usize,
    /// fixed random seed, a fresh one is drawn when absent
    pub seed: Option<u64>,
    /// pause after each selected cell when animating
    pub delay_ms: u64,
    pub animate: bool,
    /// directory for PNG frames of the search
    pub frames: Option<PathBuf>,
    /// write a frame every n transitions
    pub frame_every: usize,
    /// size of one cell in the PNG frames, in pixels
    pub cell_size: u32,
    /// where to write the solution and its trace as JSON
    pub trace: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rows: 21,
            columns: 21,
            seed: None,
            delay_ms: 50,
            animate: false,
            frames: None,
            frame_every: 1,
            cell_size: 20,
            trace: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("parsing settings in {}", path.display()))?;

        debug!("loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
