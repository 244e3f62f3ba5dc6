use smallvec::SmallVec;

use crate::config::EvictionWeights;
use crate::construct::EvictionCost;
use crate::error::Result;
use crate::graph::ConnectionGraph;
use crate::index::{DistanceIndex, Edge};

/// Counters collected during one greedy pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Edges placed at a target with a free slot.
    pub connected: usize,
    /// Edges placed by evicting an incumbent at a full target.
    pub evicted: usize,
    /// Points still missing a connection when the pass ended.
    pub incomplete: usize,
}

/// Single-pass degree-constrained edge assignment with conflict eviction.
#[derive(Clone, Copy, Debug)]
pub struct GreedyAssigner {
    cost: EvictionCost,
}

impl GreedyAssigner {
    pub fn new(weights: EvictionWeights) -> Self {
        Self { cost: EvictionCost::new(weights) }
    }

    #[inline] pub fn cost(&self) -> &EvictionCost { &self.cost }

    /// Run one pass over every under-connected point in id order.
    ///
    /// Points still incomplete afterwards accumulate starvation elevation,
    /// which strengthens their claims in later passes.
    pub fn pass(&self, index: &mut DistanceIndex, graph: &mut ConnectionGraph) -> Result<PassStats> {
        let mut stats = PassStats::default();

        for p in 0..graph.len() {
            if !graph.is_complete(p) {
                self.fill(index, graph, p, &mut stats)?;
            }
        }

        let step = self.cost.weights().starvation_step;
        for p in (0..graph.len()).filter(|&p| !graph.is_complete(p)) {
            index.raise_elevation(p, step);
            stats.incomplete += 1;
        }

        Ok(stats)
    }

    /// Scan the sorted neighbors of `p` until it is complete or the row is exhausted.
    fn fill(&self, index: &mut DistanceIndex, graph: &mut ConnectionGraph, p: usize, stats: &mut PassStats) -> Result<()> {
        for k in 0..index.sorted_row(p).len() {
            if graph.is_complete(p) { break }

            let t = index.sorted_row(p)[k] as usize;
            let edge = Edge::new(p, t);
            if graph.contains(edge) || !index.is_usable(edge) { continue }

            if !graph.is_complete(t) {
                graph.connect(edge)?;
                stats.connected += 1;
            } else if self.evict(index, graph, p, t, edge)? {
                stats.evicted += 1;
            }
        }
        Ok(())
    }

    /// Try to replace one of `t`'s biddable incumbents by `candidate`, worst first.
    fn evict(&self, index: &mut DistanceIndex, graph: &mut ConnectionGraph, p: usize, t: usize, candidate: Edge) -> Result<bool> {
        let claim = self.cost.claim(index, p, t, candidate);

        let mut incumbents = graph.edges_of(t)
            .filter(|&edge| graph.is_biddable(t, edge))
            .map(|edge| (edge, self.cost.hold(index, t, edge)))
            .collect::<SmallVec<[(Edge, f64); 2]>>();
        incumbents.sort_by(|x, y| y.1.total_cmp(&x.1).then(x.0.cmp(&y.0)));

        for (incumbent, hold) in incumbents {
            if self.cost.beats(claim, hold) {
                graph.replace(t, incumbent, candidate)?;
                index.raise_elevation(t, self.cost.commitment(index, t, candidate));
                log::trace!("[greedy] {p} evicted {incumbent} at {t} (claim {claim:.3} < hold {hold:.3})");
                return Ok(true);
            }
        }
        Ok(false)
    }
}
