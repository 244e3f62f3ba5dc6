#![doc = "tourweave public API"]
mod common;
mod config;
mod construct;
mod error;
mod graph;
mod index;
mod rings;
mod solver;

pub mod io;

#[doc(inline)]
pub use config::{EngineConfig, EquilibriumConfig, EvictionWeights, MergeConfig};

#[doc(inline)]
pub use construct::{Equilibrium, EquilibriumLoop, EvictionCost, GreedyAssigner, LoopState, PassStats};

#[doc(inline)]
pub use error::{Result, TourError};

#[doc(inline)]
pub use graph::ConnectionGraph;

#[doc(inline)]
pub use index::{DistanceIndex, Edge, Point};

#[doc(inline)]
pub use rings::{MergeCandidate, MergeKind, MergeReport, Ring, RingDetector, RingKind, RingMerger};

#[doc(inline)]
pub use solver::{MIN_POINTS, Solver, TourResult};
