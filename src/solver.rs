use crate::config::EngineConfig;
use crate::construct::{EquilibriumLoop, LoopState};
use crate::error::{Result, TourError};
use crate::graph::ConnectionGraph;
use crate::index::{DistanceIndex, Edge};
use crate::rings::{Ring, RingDetector, RingKind, RingMerger};

/// Smallest instance that admits a closed tour.
pub const MIN_POINTS: usize = 3;

/// The outcome of a solver run.
#[derive(Clone, Debug)]
pub struct TourResult {
    pub graph: ConnectionGraph,
    pub rings: Vec<Ring>,
    /// Sum of actual lengths over every connected edge.
    pub total_length: f64,
    /// Exactly one ring remains and it is closed.
    pub complete: bool,
    /// State of the final equilibrium run.
    pub state: LoopState,
    pub rounds: usize,
    /// Greedy passes across all rounds.
    pub iterations: usize,
    pub merges: usize,
}

impl TourResult {
    /// The visiting order of a complete tour.
    pub fn tour(&self) -> Option<&[usize]> {
        self.complete.then(|| self.rings[0].points())
    }

    /// Number of points missing a connection.
    pub fn unbalanced(&self) -> usize { self.graph.incomplete_count() }
}

/// Runs equilibrium, detection and merge rounds over a distance index.
#[derive(Debug)]
pub struct Solver {
    index: DistanceIndex,
    config: EngineConfig,
}

impl Solver {
    pub fn new(index: DistanceIndex, config: EngineConfig) -> Self {
        Self { index, config }
    }

    /// Get the distance index, including the per-point state of the last run.
    #[inline] pub fn index(&self) -> &DistanceIndex { &self.index }

    #[inline] pub fn config(&self) -> &EngineConfig { &self.config }

    #[inline] pub fn into_index(self) -> DistanceIndex { self.index }

    /// Build a tour from scratch.
    ///
    /// Each round drives the greedy assigner to equilibrium, detects rings,
    /// and merges compatible rings. A single chain covering every point is
    /// closed through its loose ends. The run ends with a single closed ring,
    /// when a merge pass applies nothing, or after `max_rounds` rounds.
    pub fn solve(&mut self) -> Result<TourResult> {
        if self.index.len() < MIN_POINTS {
            return Err(TourError::InsufficientPoints { count: self.index.len(), required: MIN_POINTS });
        }

        self.index.reset_elevations();
        self.index.reset_usable();
        self.index.clear_rings();

        let equilibrium = EquilibriumLoop::new(self.config.equilibrium, self.config.eviction);
        let merger = RingMerger::new(self.config.merge);
        let mut graph = ConnectionGraph::new(self.index.len());

        log::info!("[solver] start points={} max_rounds={}", self.index.len(), self.config.max_rounds);

        let (mut rounds, mut iterations, mut merges) = (0, 0, 0);
        let (state, rings) = loop {
            rounds += 1;
            let outcome = equilibrium.run(&mut self.index, &mut graph)?;
            iterations += outcome.iterations;

            let mut rings = RingDetector.detect(&mut self.index, &graph)?;
            if let Some(edge) = closing_edge(&rings) {
                graph.connect_locked(edge)?;
                log::info!("[solver] round {rounds}: closing the last chain with {edge}");
                rings = RingDetector.detect(&mut self.index, &graph)?;
            }
            log::info!(
                "[solver] round {rounds}: {:?} after {} passes, {} rings, length {:.3}",
                outcome.state, outcome.iterations, rings.len(), graph.total_length(&self.index),
            );

            if rings.len() == 1 && rings[0].is_closed() {
                break (outcome.state, rings);
            }
            if rounds >= self.config.max_rounds {
                log::warn!("[solver] round ceiling {} reached with {} rings", self.config.max_rounds, rings.len());
                break (outcome.state, rings);
            }

            let report = merger.merge_pass(&mut self.index, &mut graph, &rings)?;
            if report.merges() == 0 {
                log::warn!("[solver] no legal merge among {} rings ({} rejected)", rings.len(), report.rejected);
                break (outcome.state, rings);
            }
            merges += report.merges();
        };

        let total_length = graph.total_length(&self.index);
        let complete = rings.len() == 1 && rings[0].is_closed();
        if complete {
            log::info!("[solver] complete tour length={total_length:.3} rounds={rounds} merges={merges}");
        } else {
            log::warn!(
                "[solver] partial result: {} rings, {} unbalanced points, length={total_length:.3}",
                rings.len(), graph.incomplete_count(),
            );
        }

        Ok(TourResult { graph, rings, total_length, complete, state, rounds, iterations, merges })
    }
}

/// The edge joining the loose ends of a chain that already covers every point.
fn closing_edge(rings: &[Ring]) -> Option<Edge> {
    match rings {
        [ring] => match ring.kind() {
            RingKind::Open { endpoints: [a, b] } if a != b => Some(Edge::new(a, b)),
            _ => None,
        },
        _ => None,
    }
}
