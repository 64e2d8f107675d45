//! Game of Life transition rules

use super::grid::{Cell, Grid};
use rayon::prelude::*;

/// Game of Life rules engine
pub struct GameOfLifeRules;

impl GameOfLifeRules {
    /// Evolve the grid one generation forward.
    ///
    /// Every cell is evaluated against `current` only; the next generation
    /// is built in a fresh buffer, so no cell sees a partially updated grid.
    pub fn step(current: &Grid) -> Grid {
        let cols = current.cols();
        let next_cells: Vec<Cell> = (0..current.rows())
            .into_par_iter()
            .flat_map_iter(|row| {
                (0..cols).map(move |col| {
                    let neighbors = current.count_neighbors(row, col);
                    let state = current.cells()[row * cols + col];
                    Self::next_state(state, neighbors)
                })
            })
            .collect();

        Grid::from_parts(current.rows(), cols, next_cells)
    }

    /// Evolve the grid for multiple generations
    pub fn evolve_generations(mut grid: Grid, generations: usize) -> Grid {
        for _ in 0..generations {
            grid = Self::step(&grid);
        }
        grid
    }

    /// State of a cell in the next generation given its current state and neighbor count
    pub fn next_state(current: Cell, neighbors: u8) -> Cell {
        match (current, neighbors) {
            (_, n) if n < 2 => Cell::Dead,     // underpopulation
            (_, n) if n > 3 => Cell::Dead,     // overpopulation
            (Cell::Dead, 3) => Cell::Alive,    // birth
            (state, _) => state,
        }
    }

    /// Check if a cell should be alive in the next generation
    pub fn should_be_alive(current_alive: bool, neighbors: u8) -> bool {
        Self::next_state(Cell::from(current_alive), neighbors).is_alive()
    }

    /// Check whether `grid` is unchanged by one step
    pub fn is_still_life(grid: &Grid) -> bool {
        Self::step(grid) == *grid
    }
}

/// One generation of the Game of Life
pub fn step(grid: &Grid) -> Grid {
    GameOfLifeRules::step(grid)
}
