//! Configuration management for the Life engine

pub mod settings;

pub use settings::{
    Settings, GridConfig, SimulationConfig, InputConfig, OutputConfig, OutputFormat, CliOverrides
};
