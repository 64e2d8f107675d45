//! File I/O operations for Game of Life patterns

use super::Grid;
use crate::config::OutputFormat;
use crate::utils::render_svg;
use anyhow::{Context, Result};
use std::path::Path;

/// Canonical patterns written by `create_example_grids`
pub const EXAMPLE_PATTERNS: [(&str, &str); 4] = [
    ("glider", "00100\n10100\n01100\n00000\n00000\n"),
    ("blinker", "000\n111\n000\n"),
    ("block", "0000\n0110\n0110\n0000\n"),
    ("beacon", "110000\n110000\n001100\n001100\n"),
];

/// Load a grid from a text file
/// Format: Each line represents a row, with '1' for alive cells and '0' for dead cells
pub fn load_grid_from_file<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read grid file: {}", path.as_ref().display()))?;

    parse_grid_from_string(&content)
        .with_context(|| format!("Failed to parse grid from file: {}", path.as_ref().display()))
}

/// Load a pattern, picking the format from the file extension
pub fn load_pattern<P: AsRef<Path>>(path: P) -> Result<Grid> {
    match path.as_ref().extension().and_then(|ext| ext.to_str()) {
        Some("json") => load_grid_json(path),
        _ => load_grid_from_file(path),
    }
}

/// Parse a grid from a string representation
pub fn parse_grid_from_string(content: &str) -> Result<Grid> {
    let lines: Vec<&str> = content.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        anyhow::bail!("Grid file is empty or contains no valid rows");
    }

    let width = lines[0].len();
    let mut cells = Vec::with_capacity(lines.len());

    for (row_idx, line) in lines.iter().enumerate() {
        if line.len() != width {
            anyhow::bail!("Row {} has length {}, expected {} (all rows must have the same length)",
                         row_idx, line.len(), width);
        }

        let mut row = Vec::with_capacity(width);
        for (col_idx, ch) in line.chars().enumerate() {
            match ch {
                '0' => row.push(false),
                '1' => row.push(true),
                _ => anyhow::bail!("Invalid character '{}' at position ({}, {}). Only '0' and '1' are allowed",
                                 ch, row_idx, col_idx),
            }
        }
        cells.push(row);
    }

    Grid::from_cells(cells)
}

/// Convert a grid to string representation
pub fn grid_to_string(grid: &Grid) -> String {
    let mut result = String::with_capacity(grid.rows() * (grid.cols() + 1));

    for row in grid.row_slices() {
        for cell in row {
            result.push(if cell.is_alive() { '1' } else { '0' });
        }
        result.push('\n');
    }

    result
}

fn write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write grid to file: {}", path.as_ref().display()))
}

/// Save a grid to a text file
pub fn save_grid_to_file<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    write_file(path, &grid_to_string(grid))
}

/// Save a grid as pretty-printed JSON
pub fn save_grid_json<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(grid)
        .context("Failed to serialize grid")?;
    write_file(path, &json)
}

/// Load a grid from JSON
pub fn load_grid_json<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read grid file: {}", path.as_ref().display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse grid JSON: {}", path.as_ref().display()))
}

/// Save a grid in the requested output format
pub fn save_grid<P: AsRef<Path>>(
    grid: &Grid,
    path: P,
    format: OutputFormat,
    cell_size: usize,
) -> Result<()> {
    match format {
        OutputFormat::Text => save_grid_to_file(grid, path),
        OutputFormat::Json => save_grid_json(grid, path),
        OutputFormat::Svg => write_file(path, &render_svg(grid, cell_size)),
    }
}

/// Create example pattern files
pub fn create_example_grids<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    for (name, content) in EXAMPLE_PATTERNS {
        let filename = format!("{}.txt", name);
        std::fs::write(dir.join(&filename), content)
            .with_context(|| format!("Failed to write {}", filename))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_of_life::{Cell, GameOfLifeRules};
    use tempfile::tempdir;

    #[test]
    fn test_parse_grid_from_string() {
        let content = "010\n101\n010\n";
        let grid = parse_grid_from_string(content).unwrap();

        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.living_cells(), vec![(0, 1), (1, 0), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_blank_lines_and_padding_ignored() {
        let grid = parse_grid_from_string("\n  011 \n\n110\n").unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid_to_string(&grid), "011\n110\n");
    }

    #[test]
    fn test_text_file_operations() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("nested/test_grid.txt");

        let original = Grid::with_alive(2, 3, &[(0, 0), (0, 2), (1, 1)]).unwrap();
        save_grid_to_file(&original, &file_path).unwrap();

        let loaded = load_pattern(&file_path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_json_file_operations() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("grid.json");

        let original = Grid::with_alive(4, 4, &[(1, 1), (2, 3)]).unwrap();
        save_grid(&original, &file_path, OutputFormat::Json, 20).unwrap();

        let loaded = load_pattern(&file_path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_svg_output_written() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("grid.svg");
        let grid = Grid::with_alive(2, 2, &[(0, 0)]).unwrap();

        save_grid(&grid, &file_path, OutputFormat::Svg, 10).unwrap();
        let content = std::fs::read_to_string(&file_path).unwrap();
        assert!(content.starts_with("<svg"));
    }

    #[test]
    fn test_invalid_input() {
        assert!(parse_grid_from_string("010\n1X1\n010\n").is_err());
        assert!(parse_grid_from_string("010\n11\n010\n").is_err());
        assert!(parse_grid_from_string("").is_err());
        assert!(load_grid_from_file("definitely/missing.txt").is_err());
    }

    #[test]
    fn test_create_example_grids() {
        let temp_dir = tempdir().unwrap();
        create_example_grids(temp_dir.path()).unwrap();

        for (name, _) in EXAMPLE_PATTERNS {
            assert!(temp_dir.path().join(format!("{}.txt", name)).exists());
        }

        let glider = load_grid_from_file(temp_dir.path().join("glider.txt")).unwrap();
        assert_eq!(glider.rows(), 5);
        assert_eq!(glider.cols(), 5);
        assert_eq!(glider.living_count(), 5);

        let block = load_grid_from_file(temp_dir.path().join("block.txt")).unwrap();
        assert!(GameOfLifeRules::is_still_life(&block));

        let beacon = load_grid_from_file(temp_dir.path().join("beacon.txt")).unwrap();
        let next = GameOfLifeRules::step(&beacon);
        assert_eq!(next.get(1, 1), Ok(Cell::Dead));
        assert_eq!(GameOfLifeRules::step(&next), beacon);
    }
}
