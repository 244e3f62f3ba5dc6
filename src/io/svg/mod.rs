//! SVG rendering of a solver run.

mod color;
mod writer;

pub use writer::{write_svg, write_svg_string};
