//! Model of the board's control surface

use super::life::LifeEngine;
use super::store::Frame;
use anyhow::Result;

/// A user interaction with the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The START/STOP button
    ToggleRun,
    Random,
    Clear,
    ClickCell { row: usize, col: usize },
}

/// What an action did
#[derive(Debug, Clone)]
pub enum Outcome {
    Started,
    Stopped { generations: u64 },
    Updated(Frame),
    /// The control is disabled in the current run state
    Ignored,
}

/// Buttons and cells wired to an engine.
///
/// Random, Clear and cell clicks are disabled while the simulation runs;
/// dispatching them then is a no-op rather than an error.
#[derive(Debug)]
pub struct Controls {
    engine: LifeEngine,
}

impl Controls {
    pub fn new(engine: LifeEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &LifeEngine {
        &self.engine
    }

    pub fn into_engine(self) -> LifeEngine {
        self.engine
    }

    /// Label of the run button
    pub fn run_label(&self) -> &'static str {
        if self.engine.is_running() { "STOP" } else { "START" }
    }

    pub fn random_enabled(&self) -> bool {
        !self.engine.is_running()
    }

    pub fn clear_enabled(&self) -> bool {
        !self.engine.is_running()
    }

    pub fn cells_enabled(&self) -> bool {
        !self.engine.is_running()
    }

    pub fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        log::debug!("dispatch {:?}", action);
        let outcome = match action {
            Action::ToggleRun => {
                if self.engine.is_running() {
                    Outcome::Stopped { generations: self.engine.stop()? }
                } else {
                    self.engine.start()?;
                    Outcome::Started
                }
            }
            Action::Random if self.random_enabled() => Outcome::Updated(self.engine.randomize()?),
            Action::Clear if self.clear_enabled() => Outcome::Updated(self.engine.clear()?),
            Action::ClickCell { row, col } if self.cells_enabled() => {
                Outcome::Updated(self.engine.toggle_cell(row, col)?)
            }
            Action::Random | Action::Clear | Action::ClickCell { .. } => Outcome::Ignored,
        };
        Ok(outcome)
    }
}
