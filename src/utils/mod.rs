//! Terminal and image output helpers

pub mod display;

pub use display::{render_svg, Color, GridFormatter, Palette};
