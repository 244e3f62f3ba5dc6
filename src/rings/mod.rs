mod detect;
mod merge;
mod ring;

pub use detect::RingDetector;
pub use merge::{MergeCandidate, MergeKind, MergeReport, RingMerger};
pub use ring::{Ring, RingKind};
