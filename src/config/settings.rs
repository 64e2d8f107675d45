//! Configuration settings for the Life engine

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub grid: GridConfig,
    pub simulation: SimulationConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    /// Edge length of one cell in pixels, used by the SVG renderer
    pub cell_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub tick_interval_ms: u64,
    /// Probability that a cell starts alive when the board is randomized
    pub alive_probability: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub random_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub initial_pattern_file: Option<PathBuf>,
    /// Top-left cell the initial pattern is stamped at
    #[serde(default)]
    pub pattern_offset: (usize, usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Format used when an output path has no recognised extension
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
    Svg,
}

impl OutputFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "txt" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "svg" => Some(OutputFormat::Svg),
            _ => None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid: GridConfig {
                rows: 50,
                cols: 50,
                cell_size: 20,
            },
            simulation: SimulationConfig {
                tick_interval_ms: 100,
                alive_probability: 0.3,
                seed: None,
                random_start: false,
            },
            input: InputConfig {
                initial_pattern_file: None,
                pattern_offset: (0, 0),
            },
            output: OutputConfig {
                format: OutputFormat::Text,
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            log::debug!("config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            anyhow::bail!(
                "Grid dimensions must be positive, got {}x{}",
                self.grid.rows, self.grid.cols
            );
        }

        if self.grid.rows.checked_mul(self.grid.cols).is_none() {
            anyhow::bail!("Grid of {}x{} cells is too large", self.grid.rows, self.grid.cols);
        }

        if self.grid.cell_size == 0 {
            anyhow::bail!("Cell size must be positive");
        }

        if self.simulation.tick_interval_ms == 0 {
            anyhow::bail!("Tick interval must be positive");
        }

        let p = self.simulation.alive_probability;
        if !(0.0..=1.0).contains(&p) {
            anyhow::bail!("Alive probability must be within [0, 1], got {}", p);
        }

        if let Some(ref pattern) = self.input.initial_pattern_file {
            if !pattern.exists() {
                anyhow::bail!("Initial pattern file does not exist: {}", pattern.display());
            }
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.simulation.tick_interval_ms)
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(rows) = cli_overrides.rows {
            self.grid.rows = rows;
        }
        if let Some(cols) = cli_overrides.cols {
            self.grid.cols = cols;
        }
        if let Some(interval) = cli_overrides.tick_interval_ms {
            self.simulation.tick_interval_ms = interval;
        }
        if let Some(p) = cli_overrides.alive_probability {
            self.simulation.alive_probability = p;
        }
        if cli_overrides.seed.is_some() {
            self.simulation.seed = cli_overrides.seed;
        }
        if cli_overrides.random_start {
            self.simulation.random_start = true;
        }
        if let Some(ref pattern) = cli_overrides.pattern_file {
            self.input.initial_pattern_file = Some(pattern.clone());
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub tick_interval_ms: Option<u64>,
    pub alive_probability: Option<f64>,
    pub seed: Option<u64>,
    pub random_start: bool,
    pub pattern_file: Option<PathBuf>,
}
