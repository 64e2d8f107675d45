//! Game of Life core functionality

pub mod grid;
pub mod rules;
pub mod io;

pub use grid::{create_empty, create_random, toggle_cell, Cell, Grid, NEIGHBOR_OFFSETS};
pub use rules::{step, GameOfLifeRules};
pub use io::{create_example_grids, load_grid_from_file, load_pattern, save_grid, save_grid_to_file};
