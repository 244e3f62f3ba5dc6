use ahash::AHashSet;

use crate::config::{EquilibriumConfig, EvictionWeights};
use crate::construct::GreedyAssigner;
use crate::error::Result;
use crate::graph::ConnectionGraph;
use crate::index::DistanceIndex;

/// States of the equilibrium loop. `Closed` and `Stalled` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Every point has two connections.
    Closed,
    /// Greedy passes stopped making progress before closure.
    Stalled,
}

/// Outcome of an equilibrium run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Equilibrium {
    pub state: LoopState,
    pub iterations: usize,
}

/// Drives the greedy assigner to closure or a fixed point.
#[derive(Clone, Copy, Debug)]
pub struct EquilibriumLoop {
    assigner: GreedyAssigner,
    config: EquilibriumConfig,
}

impl EquilibriumLoop {
    pub fn new(config: EquilibriumConfig, weights: EvictionWeights) -> Self {
        Self { assigner: GreedyAssigner::new(weights), config }
    }

    /// Run greedy passes until the graph closes or stalls.
    ///
    /// A pass counts towards the stall counter when it leaves the graph
    /// unchanged or returns it to a state already seen during this run;
    /// the loop stalls once the counter exceeds the configured threshold
    /// or the iteration ceiling is reached.
    pub fn run(&self, index: &mut DistanceIndex, graph: &mut ConnectionGraph) -> Result<Equilibrium> {
        let mut seen = AHashSet::new();
        seen.insert(graph.fingerprint());

        let mut previous = graph.snapshot();
        let mut state = LoopState::Running;
        let mut stalls = 0;
        let mut iterations = 0;

        while state == LoopState::Running {
            iterations += 1;
            let stats = self.assigner.pass(index, graph)?;
            log::debug!("[equilibrium] pass {iterations}: {stats:?}");

            if graph.is_closed() {
                state = LoopState::Closed;
                continue;
            }

            if *graph == previous || !seen.insert(graph.fingerprint()) {
                stalls += 1;
            } else {
                stalls = 0;
                previous = graph.snapshot();
            }

            if stalls > self.config.stall_threshold {
                state = LoopState::Stalled;
            } else if iterations >= self.config.max_iterations {
                log::warn!("[equilibrium] iteration ceiling {} reached", self.config.max_iterations);
                state = LoopState::Stalled;
            }
        }

        log::debug!("[equilibrium] {state:?} after {iterations} passes, {} incomplete", graph.incomplete_count());
        Ok(Equilibrium { state, iterations })
    }
}
