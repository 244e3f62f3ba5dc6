mod cost;
mod equilibrium;
mod greedy;

pub use cost::EvictionCost;
pub(crate) use cost::EPSILON;
pub use equilibrium::{Equilibrium, EquilibriumLoop, LoopState};
pub use greedy::{GreedyAssigner, PassStats};
