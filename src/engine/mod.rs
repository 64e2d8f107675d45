//! Running simulation: shared grid store, stepping driver and controls

pub mod controls;
pub mod driver;
pub mod life;
pub mod store;

pub use controls::{Action, Controls, Outcome};
pub use driver::SimulationDriver;
pub use life::{EngineConfig, LifeEngine};
pub use store::{Frame, GridStore};
