//! The Life engine: grid store, run state and simulation driver

use super::driver::SimulationDriver;
use super::store::{Frame, GridStore};
use crate::config::Settings;
use crate::error::{LifeError, LifeResult};
use crate::game_of_life::{create_empty, create_random, load_pattern, Grid};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

/// Runtime parameters of an engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub tick_interval: Duration,
    pub alive_probability: f64,
    pub seed: Option<u64>,
    /// Stop the simulation on its own after this many ticks per run
    pub max_generations: Option<u64>,
}

impl EngineConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tick_interval: settings.tick_interval(),
            alive_probability: settings.simulation.alive_probability,
            seed: settings.simulation.seed,
            max_generations: None,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Owns the current generation and the run state.
///
/// User mutations (toggle, randomize, clear) are rejected while the
/// simulation runs so the driver is the only writer during a run.
#[derive(Debug)]
pub struct LifeEngine {
    config: EngineConfig,
    store: Arc<GridStore>,
    driver: Option<SimulationDriver>,
    rng: StdRng,
}

impl LifeEngine {
    pub fn new(grid: Grid, config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            store: Arc::new(GridStore::new(grid)),
            driver: None,
            rng,
        }
    }

    /// Build an engine from settings, loading or randomizing the initial grid as configured
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let config = EngineConfig::from_settings(settings);
        let (rows, cols) = (settings.grid.rows, settings.grid.cols);
        let mut engine = Self::new(create_empty(rows, cols)?, config);

        if let Some(ref path) = settings.input.initial_pattern_file {
            let pattern = load_pattern(path)?;
            let (row, col) = settings.input.pattern_offset;
            let grid = create_empty(rows, cols)?
                .with_pattern(&pattern, row, col)
                .with_context(|| format!("Failed to place pattern {}", path.display()))?;
            engine.store.replace(grid)?;
            log::info!("loaded initial pattern from {}", path.display());
        } else if settings.simulation.random_start {
            engine.randomize()?;
        }

        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_max_generations(&mut self, max_generations: Option<u64>) {
        self.config.max_generations = max_generations;
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.store.dimensions()
    }

    pub fn snapshot(&self) -> Arc<Grid> {
        self.store.snapshot()
    }

    pub fn frame(&self) -> Frame {
        self.store.frame()
    }

    pub fn generation(&self) -> u64 {
        self.store.generation()
    }

    pub fn subscribe(&self) -> Receiver<Frame> {
        self.store.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.driver.as_ref().is_some_and(SimulationDriver::is_running)
    }

    /// Wait for the next frame on `receiver`.
    ///
    /// Returns `None` once the simulation is no longer running and every
    /// frame it published has been received. The store keeps the senders
    /// alive, so the channel alone never reports the end of a run.
    pub fn next_frame(&self, receiver: &Receiver<Frame>) -> Option<Frame> {
        loop {
            match receiver.recv_timeout(self.config.tick_interval) {
                Ok(frame) => return Some(frame),
                Err(RecvTimeoutError::Timeout) if self.is_running() => continue,
                Err(RecvTimeoutError::Timeout) => return receiver.try_recv().ok(),
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Start the simulation loop. Returns false if it was already running.
    pub fn start(&mut self) -> Result<bool> {
        if self.is_running() {
            return Ok(false);
        }
        self.reap_finished()?;

        let driver = SimulationDriver::spawn(
            Arc::clone(&self.store),
            self.config.tick_interval,
            self.config.max_generations,
        )?;
        self.driver = Some(driver);
        log::info!("simulation started at generation {}", self.generation());
        Ok(true)
    }

    /// Stop the simulation loop and wait for it to exit.
    /// Returns the number of generations the run produced.
    pub fn stop(&mut self) -> Result<u64> {
        match self.driver.take() {
            Some(driver) => {
                let ticks = driver.stop()?;
                log::info!("simulation stopped at generation {}", self.generation());
                Ok(ticks)
            }
            None => Ok(0),
        }
    }

    /// Flip the run state; returns the new state
    pub fn toggle_run(&mut self) -> Result<bool> {
        if self.is_running() {
            self.stop()?;
            Ok(false)
        } else {
            self.start()
        }
    }

    /// Replace the grid with a random one
    pub fn randomize(&mut self) -> LifeResult<Frame> {
        self.ensure_idle()?;
        let (rows, cols) = self.dimensions();
        let grid = create_random(rows, cols, self.config.alive_probability, &mut self.rng)?;
        let frame = self.store.replace(grid)?;
        log::debug!("grid randomized ({} alive)", frame.grid.living_count());
        Ok(frame)
    }

    /// Replace the grid with an empty one
    pub fn clear(&mut self) -> LifeResult<Frame> {
        self.ensure_idle()?;
        let (rows, cols) = self.dimensions();
        let frame = self.store.replace(create_empty(rows, cols)?)?;
        log::debug!("grid cleared");
        Ok(frame)
    }

    /// Replace the grid with `grid`, which must have the engine's dimensions
    pub fn load(&mut self, grid: Grid) -> LifeResult<Frame> {
        self.ensure_idle()?;
        self.store.replace(grid)
    }

    /// Flip a single cell
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> LifeResult<Frame> {
        self.ensure_idle()?;
        self.store.modify(|grid| grid.toggled(row, col))
    }

    fn ensure_idle(&mut self) -> LifeResult<()> {
        if self.is_running() {
            return Err(LifeError::SimulationRunning);
        }
        if let Err(e) = self.reap_finished() {
            log::warn!("{:#}", e);
        }
        Ok(())
    }

    /// Join a driver that stopped on its own
    fn reap_finished(&mut self) -> Result<()> {
        if self.driver.as_ref().is_some_and(|driver| !driver.is_running()) {
            self.stop()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_of_life::Cell;
    use std::thread;
    use std::time::Instant;
    use tempfile::tempdir;

    fn test_config() -> EngineConfig {
        EngineConfig {
            tick_interval: Duration::from_millis(1),
            alive_probability: 0.3,
            seed: Some(7),
            max_generations: None,
        }
    }

    fn wait_until_stopped(engine: &LifeEngine) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while engine.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_toggle_run_starts_and_stops() {
        let grid = Grid::with_alive(5, 5, &[(2, 1), (2, 2), (2, 3)]).unwrap();
        let mut engine = LifeEngine::new(grid, test_config());
        let receiver = engine.subscribe();

        assert!(!engine.is_running());
        assert!(engine.toggle_run().unwrap());
        assert!(engine.is_running());
        assert!(!engine.start().unwrap());

        receiver.recv().unwrap();
        assert!(!engine.toggle_run().unwrap());
        assert!(!engine.is_running());
        assert!(engine.generation() >= 1);
    }

    #[test]
    fn test_mutations_rejected_while_running() {
        let mut engine = LifeEngine::new(Grid::new(5, 5).unwrap(), test_config());
        engine.start().unwrap();

        assert_eq!(engine.toggle_cell(0, 0).unwrap_err(), LifeError::SimulationRunning);
        assert_eq!(engine.randomize().unwrap_err(), LifeError::SimulationRunning);
        assert_eq!(engine.clear().unwrap_err(), LifeError::SimulationRunning);

        engine.stop().unwrap();
        assert!(engine.toggle_cell(0, 0).is_ok());
    }

    #[test]
    fn test_toggle_cell_and_bounds() {
        let mut engine = LifeEngine::new(Grid::new(3, 3).unwrap(), test_config());
        let frame = engine.toggle_cell(1, 2).unwrap();
        assert_eq!(frame.grid.get(1, 2), Ok(Cell::Alive));

        assert!(matches!(
            engine.toggle_cell(3, 0),
            Err(LifeError::OutOfBounds { row: 3, col: 0, .. })
        ));

        engine.toggle_cell(1, 2).unwrap();
        assert!(engine.snapshot().is_empty());
    }

    #[test]
    fn test_randomize_and_clear() {
        let mut engine = LifeEngine::new(Grid::new(20, 20).unwrap(), test_config());
        let frame = engine.randomize().unwrap();
        assert!(frame.grid.living_count() > 0);
        assert_eq!(frame.generation, 0);

        let frame = engine.clear().unwrap();
        assert!(frame.grid.is_empty());
        assert_eq!(engine.dimensions(), (20, 20));
    }

    #[test]
    fn test_seeded_engines_randomize_identically() {
        let mut a = LifeEngine::new(Grid::new(10, 10).unwrap(), test_config());
        let mut b = LifeEngine::new(Grid::new(10, 10).unwrap(), test_config());
        assert_eq!(a.randomize().unwrap().grid, b.randomize().unwrap().grid);
    }

    #[test]
    fn test_generation_limit_self_stops() {
        let grid = Grid::with_alive(5, 5, &[(2, 1), (2, 2), (2, 3)]).unwrap();
        let mut engine = LifeEngine::new(grid.clone(), test_config());
        engine.set_max_generations(Some(4));

        engine.start().unwrap();
        wait_until_stopped(&engine);

        assert!(!engine.is_running());
        assert_eq!(engine.generation(), 4);
        assert_eq!(*engine.snapshot(), grid);
        // finished driver is reaped, so the board is editable again
        assert!(engine.clear().is_ok());
    }

    #[test]
    fn test_next_frame_ends_with_the_run() {
        let grid = Grid::with_alive(5, 5, &[(2, 1), (2, 2), (2, 3)]).unwrap();
        let mut engine = LifeEngine::new(grid, test_config());
        engine.set_max_generations(Some(3));
        let receiver = engine.subscribe();

        engine.start().unwrap();
        let mut generations = Vec::new();
        while let Some(frame) = engine.next_frame(&receiver) {
            generations.push(frame.generation);
        }

        assert_eq!(generations, vec![1, 2, 3]);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_next_frame_when_idle() {
        let mut engine = LifeEngine::new(Grid::new(3, 3).unwrap(), test_config());
        let receiver = engine.subscribe();
        assert!(engine.next_frame(&receiver).is_none());

        engine.toggle_cell(0, 0).unwrap();
        let frame = engine.next_frame(&receiver).unwrap();
        assert_eq!(frame.grid.living_cells(), vec![(0, 0)]);
    }

    #[test]
    fn test_from_settings_rejects_unplaceable_offset() {
        let temp_dir = tempdir().unwrap();
        let pattern_path = temp_dir.path().join("blinker.txt");
        std::fs::write(&pattern_path, "111\n").unwrap();

        let mut settings = Settings::default();
        settings.input.initial_pattern_file = Some(pattern_path);
        settings.input.pattern_offset = (usize::MAX, 0);
        assert!(LifeEngine::from_settings(&settings).is_err());

        settings.input.pattern_offset = (0, usize::MAX - 1);
        assert!(LifeEngine::from_settings(&settings).is_err());
    }

    #[test]
    fn test_from_settings_places_pattern() {
        let temp_dir = tempdir().unwrap();
        let pattern_path = temp_dir.path().join("blinker.txt");
        std::fs::write(&pattern_path, "111\n").unwrap();

        let mut settings = Settings::default();
        settings.grid.rows = 6;
        settings.grid.cols = 6;
        settings.input.initial_pattern_file = Some(pattern_path);
        settings.input.pattern_offset = (2, 1);

        let engine = LifeEngine::from_settings(&settings).unwrap();
        assert_eq!(engine.snapshot().living_cells(), vec![(2, 1), (2, 2), (2, 3)]);
    }

    #[test]
    fn test_from_settings_random_start() {
        let mut settings = Settings::default();
        settings.simulation.random_start = true;
        settings.simulation.seed = Some(3);

        let engine = LifeEngine::from_settings(&settings).unwrap();
        assert_eq!(engine.dimensions(), (50, 50));
        assert!(engine.snapshot().living_count() > 0);
    }
}
