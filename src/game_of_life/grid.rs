//! Grid representation and utilities for Game of Life

use crate::error::{LifeError, LifeResult};
use anyhow::Result;
use itertools::iproduct;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative positions of the Moore neighborhood, excluding the cell itself
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (0, 1),
    (0, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
    (-1, -1),
    (1, 0),
    (-1, 0),
];

/// State of a single cell
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Dead,
    Alive,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }

    pub fn toggled(self) -> Self {
        match self {
            Cell::Alive => Cell::Dead,
            Cell::Dead => Cell::Alive,
        }
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        if alive { Cell::Alive } else { Cell::Dead }
    }
}

/// A fixed-size Game of Life grid stored row-major.
///
/// Dimensions never change once a grid exists; every operation that
/// "modifies" a shared grid returns a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

#[derive(Deserialize)]
struct GridRepr {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl TryFrom<GridRepr> for Grid {
    type Error = LifeError;

    fn try_from(repr: GridRepr) -> LifeResult<Self> {
        let len = cell_count(repr.rows, repr.cols)?;
        if repr.cells.len() != len {
            return Err(LifeError::InvalidDimensions { rows: repr.rows, cols: repr.cols });
        }
        Ok(Grid::from_parts(repr.rows, repr.cols, repr.cells))
    }
}

/// Number of cells in a `rows` x `cols` grid; both must be positive and the product must fit
fn cell_count(rows: usize, cols: usize) -> LifeResult<usize> {
    if rows == 0 || cols == 0 {
        return Err(LifeError::InvalidDimensions { rows, cols });
    }
    rows.checked_mul(cols)
        .ok_or(LifeError::InvalidDimensions { rows, cols })
}

impl Grid {
    /// Create a new grid with every cell dead
    pub fn new(rows: usize, cols: usize) -> LifeResult<Self> {
        let len = cell_count(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: vec![Cell::Dead; len],
        })
    }

    /// Create a grid where each cell is independently alive with probability `density`.
    ///
    /// A cell is alive when a uniform draw in `[0, 1)` exceeds `1 - density`,
    /// so the default density of 0.3 reproduces the classic 0.7 threshold.
    pub fn random<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        density: f64,
        rng: &mut R,
    ) -> LifeResult<Self> {
        let mut grid = Self::new(rows, cols)?;
        let threshold = 1.0 - density;
        for cell in grid.cells.iter_mut() {
            *cell = Cell::from(rng.random::<f64>() > threshold);
        }
        Ok(grid)
    }

    /// Create a grid from a 2D boolean array
    pub fn from_cells(cells: Vec<Vec<bool>>) -> Result<Self> {
        if cells.is_empty() {
            anyhow::bail!("Grid cannot be empty");
        }

        let rows = cells.len();
        let cols = cells[0].len();

        if cols == 0 {
            anyhow::bail!("Grid width cannot be zero");
        }

        for (i, row) in cells.iter().enumerate() {
            if row.len() != cols {
                anyhow::bail!("Row {} has length {}, expected {}", i, row.len(), cols);
            }
        }

        Ok(Self {
            rows,
            cols,
            cells: cells.into_iter().flatten().map(Cell::from).collect(),
        })
    }

    /// Create a grid with exactly the listed cells alive
    pub fn with_alive(rows: usize, cols: usize, alive: &[(usize, usize)]) -> LifeResult<Self> {
        let mut grid = Self::new(rows, cols)?;
        for &(row, col) in alive {
            grid.set(row, col, Cell::Alive)?;
        }
        Ok(grid)
    }

    /// Assemble a grid from a row-major buffer of matching length
    pub(crate) fn from_parts(rows: usize, cols: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), rows * cols);
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn check_bounds(&self, row: usize, col: usize) -> LifeResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(LifeError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Get cell state at coordinates
    pub fn get(&self, row: usize, col: usize) -> LifeResult<Cell> {
        self.check_bounds(row, col)?;
        Ok(self.cells[self.index(row, col)])
    }

    /// Set cell state at coordinates
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> LifeResult<()> {
        self.check_bounds(row, col)?;
        let idx = self.index(row, col);
        self.cells[idx] = cell;
        Ok(())
    }

    /// Cell at signed coordinates, `None` outside the grid. Edges never wrap.
    #[inline]
    pub fn cell_at(&self, row: isize, col: isize) -> Option<Cell> {
        if row < 0 || col < 0 || row >= self.rows as isize || col >= self.cols as isize {
            return None;
        }
        Some(self.cells[self.index(row as usize, col as usize)])
    }

    /// Return a copy of this grid with one cell flipped
    pub fn toggled(&self, row: usize, col: usize) -> LifeResult<Self> {
        let current = self.get(row, col)?;
        let mut next = self.clone();
        next.set(row, col, current.toggled())?;
        Ok(next)
    }

    /// Return a copy of this grid with `pattern` stamped at (`row`, `col`).
    /// Pattern cells overwrite the target area, dead cells included.
    pub fn with_pattern(&self, pattern: &Grid, row: usize, col: usize) -> LifeResult<Self> {
        let fits = |start: usize, len: usize, limit: usize| {
            start.checked_add(len).is_some_and(|end| end <= limit)
        };
        if !fits(row, pattern.rows, self.rows) || !fits(col, pattern.cols, self.cols) {
            return Err(LifeError::PatternDoesNotFit {
                pattern_rows: pattern.rows,
                pattern_cols: pattern.cols,
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }

        let mut next = self.clone();
        for (r, c) in iproduct!(0..pattern.rows, 0..pattern.cols) {
            let idx = next.index(row + r, col + c);
            next.cells[idx] = pattern.cells[pattern.index(r, c)];
        }
        Ok(next)
    }

    /// Count living neighbors for a cell; positions beyond the edge count as dead
    pub fn count_neighbors(&self, row: usize, col: usize) -> u8 {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| self.cell_at(row as isize + dr, col as isize + dc))
            .filter(|cell| cell.is_alive())
            .count() as u8
    }

    /// Get all living cell coordinates
    pub fn living_cells(&self) -> Vec<(usize, usize)> {
        iproduct!(0..self.rows, 0..self.cols)
            .filter(|&(row, col)| self.cells[self.index(row, col)].is_alive())
            .collect()
    }

    /// Count total living cells
    pub fn living_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Count total dead cells
    pub fn dead_count(&self) -> usize {
        self.cells.len() - self.living_count()
    }

    /// Check if the grid has no living cells
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_alive())
    }

    /// Iterate over rows as slices
    pub fn row_slices(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols)
    }
}

/// Create an all-dead grid
pub fn create_empty(rows: usize, cols: usize) -> LifeResult<Grid> {
    Grid::new(rows, cols)
}

/// Create a randomly populated grid
pub fn create_random<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    density: f64,
    rng: &mut R,
) -> LifeResult<Grid> {
    Grid::random(rows, cols, density, rng)
}

/// Flip one cell, returning the new grid and leaving `grid` untouched
pub fn toggle_cell(grid: &Grid, row: usize, col: usize) -> LifeResult<Grid> {
    grid.toggled(row, col)
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.row_slices() {
            for cell in row {
                let symbol = if cell.is_alive() { "⬛" } else { "⬜" };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
