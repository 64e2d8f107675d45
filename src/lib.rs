//! Conway's Game of Life engine
//!
//! A fixed-size, non-wrapping Life board with a pure step function, a
//! shared store publishing whole generations, and a stoppable background
//! driver that advances the board at a fixed interval.

pub mod config;
pub mod engine;
pub mod error;
pub mod game_of_life;
pub mod utils;

pub use config::Settings;
pub use engine::{Action, Controls, LifeEngine};
pub use error::LifeError;
pub use game_of_life::{Cell, Grid};

use anyhow::Result;

/// Run a configured engine headless for `generations` ticks and return the final grid
pub fn run_generations(settings: &Settings, generations: u64) -> Result<Grid> {
    let mut engine = LifeEngine::from_settings(settings)?;
    engine.set_max_generations(Some(generations));
    let receiver = engine.subscribe();

    if generations > 0 {
        engine.start()?;
        while let Some(frame) = engine.next_frame(&receiver) {
            if frame.generation >= generations {
                break;
            }
        }
        engine.stop()?;
    }

    Ok(engine.snapshot().as_ref().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_generations_headless() {
        let mut settings = Settings::default();
        settings.simulation.tick_interval_ms = 1;
        settings.simulation.random_start = true;
        settings.simulation.seed = Some(5);

        let start = LifeEngine::from_settings(&settings).unwrap().snapshot();
        let after = run_generations(&settings, 3).unwrap();

        let expected = game_of_life::GameOfLifeRules::evolve_generations(start.as_ref().clone(), 3);
        assert_eq!(after, expected);
    }
}
