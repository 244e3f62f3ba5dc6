use crate::config::EvictionWeights;
use crate::index::{DistanceIndex, Edge};

/// Epsilon margin a claim must clear before it evicts an incumbent.
pub(crate) const EPSILON: f64 = 1e-9;

/// Eviction score for a candidate edge targeting a full point.
///
/// Lengths are normalized against the target's local minimum
///     baseline(t) = (d₁(t) + d₂(t)) / 2
/// where d₁, d₂ are the two smallest distances from `t`, and
///     excess(len, t) = (len − baseline(t)) / baseline(t).
///
/// An incumbent edge `f` at `t` is held with score `excess(|f|, t)`. A
/// candidate `e = (p, t)` claims the slot with
///     excess(|e|, t) + w_c · elevation(t) − w_s · elevation(p)
/// and wins iff its claim is below the hold by more than [`EPSILON`].
/// The score is monotone in candidate length relative to the local minimum
/// and in the commitment already accumulated at the target.
#[derive(Clone, Copy, Debug)]
pub struct EvictionCost {
    weights: EvictionWeights,
}

impl EvictionCost {
    pub fn new(weights: EvictionWeights) -> Self { Self { weights } }

    #[inline] pub fn weights(&self) -> &EvictionWeights { &self.weights }

    /// Local length scale at `t`; never below [`EPSILON`].
    pub fn baseline(&self, index: &DistanceIndex, t: usize) -> f64 {
        let baseline = match index.min_two_distances(t) {
            [d1, d2] if d2.is_finite() => (d1 + d2) / 2.0,
            [d1, _] if d1.is_finite() => d1,
            _ => 1.0,
        };
        baseline.max(EPSILON)
    }

    /// Relative excess of `length` over the local minimum at `t`.
    #[inline]
    pub fn excess(&self, index: &DistanceIndex, length: f64, t: usize) -> f64 {
        let baseline = self.baseline(index, t);
        (length - baseline) / baseline
    }

    /// Score with which `t` holds on to its incumbent edge.
    #[inline]
    pub fn hold(&self, index: &DistanceIndex, t: usize, incumbent: Edge) -> f64 {
        self.excess(index, index.length(incumbent), t)
    }

    /// Score of the claim `p` lays on a slot of `t` through `candidate`.
    pub fn claim(&self, index: &DistanceIndex, p: usize, t: usize, candidate: Edge) -> f64 {
        self.excess(index, index.length(candidate), t)
            + self.weights.commitment_weight * index.elevation(t)
            - self.weights.starvation_weight * index.elevation(p)
    }

    #[inline] pub fn beats(&self, claim: f64, hold: f64) -> bool { claim < hold - EPSILON }

    /// Elevation gained by `t` when it accepts `candidate`.
    pub fn commitment(&self, index: &DistanceIndex, t: usize, candidate: Edge) -> f64 {
        self.weights.commitment_step * self.excess(index, index.length(candidate), t).max(0.0)
    }
}
