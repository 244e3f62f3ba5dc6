//! Input and output around the engine.
//!
//! - `tsplib` - TSPLIB instances in, instances out
//! - `cache` - on-disk distance tables keyed by instance content
//! - `report` - TSV connection report, TSPLIB tour files, JSON summary
//! - `svg` - SVG rendering of points and rings

mod cache;
mod report;
mod svg;
mod tsplib;

pub use cache::DistanceCache;
pub use report::{RingSummary, TourSummary, write_report, write_report_file, write_tour, write_tour_file};
pub use svg::{write_svg, write_svg_string};
pub use tsplib::{Instance, WeightType, parse_tsplib, random_instance, read_tsplib, write_tsplib, write_tsplib_string};
