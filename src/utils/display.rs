//! Display and output formatting utilities

use crate::engine::{Frame, Outcome};
use crate::game_of_life::{Cell, Grid};
use std::fmt::Write;

const ALIVE_FILL: &str = "pink";
const BORDER_STROKE: &str = "black";

/// Format grids for terminal output
pub struct GridFormatter;

impl GridFormatter {
    /// Format a grid in compact form
    pub fn format_grid_compact(grid: &Grid) -> String {
        let mut output = String::with_capacity(grid.rows() * (grid.cols() + 1) * 3);
        for row in grid.row_slices() {
            for cell in row {
                output.push(cell_glyph(*cell));
            }
            output.push('\n');
        }
        output
    }

    /// Format a grid with coordinates
    pub fn format_grid_with_coords(grid: &Grid) -> String {
        let mut output = String::new();

        // Header with column numbers
        output.push_str("   ");
        for col in 0..grid.cols() {
            output.push_str(&format!("{:2}", col % 10));
        }
        output.push('\n');

        for (row, cells) in grid.row_slices().enumerate() {
            output.push_str(&format!("{:2} ", row));
            for cell in cells {
                output.push_str(if cell.is_alive() { "██" } else { "··" });
            }
            output.push('\n');
        }

        output
    }

    /// One-line summary of a published generation
    pub fn format_frame_header(frame: &Frame) -> String {
        let grid = &frame.grid;
        let total = grid.rows() * grid.cols();
        format!(
            "Generation {} | Living: {} | Density: {:.1}%",
            frame.generation,
            grid.living_count(),
            (grid.living_count() as f64 / total as f64) * 100.0
        )
    }

    /// Header plus board
    pub fn format_frame(frame: &Frame) -> String {
        format!(
            "{}\n{}",
            Self::format_frame_header(frame),
            Self::format_grid_compact(&frame.grid)
        )
    }
}

/// Render a grid as SVG: one `cell_size` square per cell, alive cells
/// filled, every cell outlined.
pub fn render_svg(grid: &Grid, cell_size: usize) -> String {
    let width = grid.cols() * cell_size;
    let height = grid.rows() * cell_size;
    let mut svg = String::new();

    // writing into a String cannot fail
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    );
    let _ = writeln!(svg, r#"<rect width="{}" height="{}" fill="white"/>"#, width, height);

    for (row, cells) in grid.row_slices().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            let fill = if cell.is_alive() { ALIVE_FILL } else { "none" };
            let _ = writeln!(
                svg,
                r#"<rect x="{}" y="{}" width="{s}" height="{s}" fill="{}" stroke="{}" stroke-width="1"/>"#,
                col * cell_size,
                row * cell_size,
                fill,
                BORDER_STROKE,
                s = cell_size
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// ANSI colouring for terminal output.
///
/// `detect` turns colour off when `NO_COLOR` is set or `TERM=dumb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn detect() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none()
            && std::env::var("TERM").map_or(true, |term| term != "dumb");
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn ansi() -> Self {
        Self { enabled: true }
    }

    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.enabled {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, Color::Green)
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, Color::Red)
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(text, Color::Yellow)
    }

    pub fn info(&self, text: &str) -> String {
        self.paint(text, Color::Blue)
    }

    /// Compact board with runs of live cells highlighted
    pub fn board(&self, grid: &Grid) -> String {
        if !self.enabled {
            return GridFormatter::format_grid_compact(grid);
        }

        let mut output = String::new();
        for row in grid.row_slices() {
            for run in row.chunk_by(|a, b| a == b) {
                let glyphs: String = run.iter().map(|cell| cell_glyph(*cell)).collect();
                if run[0].is_alive() {
                    output.push_str(&self.paint(&glyphs, Color::Magenta));
                } else {
                    output.push_str(&glyphs);
                }
            }
            output.push('\n');
        }
        output
    }

    pub fn frame(&self, frame: &Frame) -> String {
        if !self.enabled {
            return GridFormatter::format_frame(frame);
        }
        format!(
            "{}\n{}",
            self.paint(&GridFormatter::format_frame_header(frame), Color::Cyan),
            self.board(&frame.grid)
        )
    }

    /// Run state marker shown next to the controls
    pub fn run_state(&self, running: bool) -> String {
        if running {
            self.success("● running")
        } else {
            self.warning("■ stopped")
        }
    }

    /// What the user sees after dispatching a control
    pub fn outcome(&self, outcome: &Outcome) -> String {
        match outcome {
            Outcome::Started => self.success("Simulation started"),
            Outcome::Stopped { generations } => {
                self.success(&format!("Simulation stopped after {} generations", generations))
            }
            Outcome::Updated(frame) => self.frame(frame),
            Outcome::Ignored => self.warning("That control is disabled while the simulation runs"),
        }
    }
}

fn cell_glyph(cell: Cell) -> char {
    if cell.is_alive() { '█' } else { '·' }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Magenta => 35,
            Color::Cyan => 36,
        }
    }
}
