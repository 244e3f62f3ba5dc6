use smallvec::{SmallVec, smallvec};

use crate::config::MergeConfig;
use crate::construct::EPSILON;
use crate::error::Result;
use crate::graph::ConnectionGraph;
use crate::index::{DistanceIndex, Edge};
use crate::rings::{Ring, RingKind};

/// How a merge joins its two rings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeKind {
    /// One edge from each ring is replaced by two edges across.
    Crossover,
    /// The loose ends of an open ring are wired into one edge of a closed ring.
    Splice,
}

/// A candidate reconnection between two rings.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeCandidate {
    pub kind: MergeKind,
    pub source: usize,
    pub target: usize,
    pub removed: SmallVec<[Edge; 2]>,
    pub added: [Edge; 2],
    /// Change in total length.
    pub delta: f64,
    /// `delta` biased by the elevation around the joint.
    pub rank: f64,
}

/// Summary of one merge pass.
#[derive(Clone, Debug, Default)]
pub struct MergeReport {
    pub applied: Vec<MergeCandidate>,
    /// Best candidates dropped for exceeding `max_merge_delta`.
    pub rejected: usize,
}

impl MergeReport {
    #[inline] pub fn merges(&self) -> usize { self.applied.len() }

    /// Total length change of the applied merges.
    pub fn delta(&self) -> f64 { self.applied.iter().map(|c| c.delta).sum() }
}

/// Stitches rings together through minimum-cost edge swaps.
#[derive(Clone, Copy, Debug)]
pub struct RingMerger {
    config: MergeConfig,
}

impl RingMerger {
    pub fn new(config: MergeConfig) -> Self { Self { config } }

    /// Merge each ring with its best compatible partner, at most once per ring.
    ///
    /// Rings are visited in number order; a ring that has been merged is
    /// consumed for the rest of the pass. New edges are locked against
    /// greedy eviction and masked unusable until the pass ends, when the
    /// mask is reset.
    pub fn merge_pass(&self, index: &mut DistanceIndex, graph: &mut ConnectionGraph, rings: &[Ring]) -> Result<MergeReport> {
        let mut report = MergeReport::default();
        let mut consumed = vec![false; rings.len()];

        for (i, source) in rings.iter().enumerate() {
            if consumed[i] { continue }

            let view: &DistanceIndex = index;
            let best = rings.iter().enumerate()
                .filter(|&(j, target)| j != i && !consumed[j] && source.can_connect(target))
                .filter_map(|(_, target)| self.best_between(view, source, target))
                .min_by(|a, b| a.rank.total_cmp(&b.rank));

            let Some(candidate) = best else { continue };
            if self.config.max_merge_delta.is_some_and(|limit| candidate.delta > limit + EPSILON) {
                log::debug!("[merge] ring {} -> {} rejected (delta {:.3})", candidate.source, candidate.target, candidate.delta);
                report.rejected += 1;
                continue;
            }

            self.apply(index, graph, &candidate)?;
            consumed[i] = true;
            if let Some(j) = rings.iter().position(|r| r.number == candidate.target) { consumed[j] = true }
            report.applied.push(candidate);
        }

        index.reset_usable();
        log::debug!("[merge] pass applied {} merges, delta {:.3}", report.merges(), report.delta());
        Ok(report)
    }

    /// Find the best-ranked reconnection between two rings.
    pub fn best_between(&self, index: &DistanceIndex, source: &Ring, target: &Ring) -> Option<MergeCandidate> {
        match (source.kind, target.kind) {
            (RingKind::Closed, RingKind::Closed) => {
                self.crossovers(index, source, source.edges(), target, target.edges())
            }
            (RingKind::Open { endpoints }, RingKind::Closed) => {
                let inner = inner_edges(source.edges(), endpoints);
                let crossover = self.crossovers(index, source, &inner, target, target.edges());
                let splice = self.splices(index, source, endpoints, target);
                better(crossover, splice)
            }
            (RingKind::Closed, RingKind::Open { endpoints }) => {
                let inner = inner_edges(target.edges(), endpoints);
                let crossover = self.crossovers(index, source, source.edges(), target, &inner);
                let splice = self.splices(index, target, endpoints, source)
                    .map(|c| MergeCandidate { source: source.number, target: target.number, ..c });
                better(crossover, splice)
            }
            (RingKind::Open { .. }, RingKind::Open { .. }) => None,
        }
    }

    /// Every pair of edges, both reconnections each.
    fn crossovers(&self, index: &DistanceIndex, source: &Ring, ours: &[Edge], target: &Ring, theirs: &[Edge]) -> Option<MergeCandidate> {
        let mut best: Option<MergeCandidate> = None;
        for &mine in ours {
            let [a1, a2] = mine.endpoints();
            for &other in theirs {
                let [b1, b2] = other.endpoints();
                for added in [[Edge::new(a1, b1), Edge::new(a2, b2)], [Edge::new(a1, b2), Edge::new(a2, b1)]] {
                    let candidate = self.candidate(index, MergeKind::Crossover, source, target, smallvec![mine, other], added);
                    best = better(best, candidate);
                }
            }
        }
        best
    }

    /// Wire the loose ends of `open` into each edge `(x, y)` of `closed`.
    fn splices(&self, index: &DistanceIndex, open: &Ring, endpoints: [usize; 2], closed: &Ring) -> Option<MergeCandidate> {
        let [e1, e2] = endpoints;
        let mut best: Option<MergeCandidate> = None;
        for &edge in closed.edges() {
            let [x, y] = edge.endpoints();
            for added in [[Edge::new(e1, x), Edge::new(e2, y)], [Edge::new(e1, y), Edge::new(e2, x)]] {
                let candidate = self.candidate(index, MergeKind::Splice, open, closed, smallvec![edge], added);
                best = better(best, candidate);
            }
        }
        best
    }

    fn candidate(&self, index: &DistanceIndex, kind: MergeKind, source: &Ring, target: &Ring,
        removed: SmallVec<[Edge; 2]>, added: [Edge; 2],
    ) -> Option<MergeCandidate> {
        if !added.iter().all(|&edge| index.is_usable(edge)) { return None }

        let removed_length = removed.iter().map(|&e| index.length(e)).sum::<f64>();
        let delta = added.iter().map(|&e| index.length(e)).sum::<f64>() - removed_length;
        let scale = removed_length / removed.len() as f64;
        let elevation = added.iter()
            .flat_map(|edge| edge.endpoints())
            .map(|p| index.elevation(p))
            .sum::<f64>();

        Some(MergeCandidate {
            kind,
            source: source.number,
            target: target.number,
            removed,
            added,
            delta,
            rank: delta + self.config.joint_bias * elevation * scale,
        })
    }

    /// Swap the edges of a candidate into the graph.
    fn apply(&self, index: &mut DistanceIndex, graph: &mut ConnectionGraph, candidate: &MergeCandidate) -> Result<()> {
        for &edge in &candidate.removed {
            graph.release(edge.a(), edge)?;
        }
        for edge in candidate.added {
            graph.connect_locked(edge)?;
            index.set_usable(edge.a(), edge.b(), false)?;
            for p in edge.endpoints() {
                index.raise_elevation(p, self.config.joint_penalty);
            }
        }
        log::debug!(
            "[merge] {:?} ring {} + ring {}: removed {:?}, added {} {}, delta {:.3}",
            candidate.kind, candidate.source, candidate.target,
            candidate.removed.as_slice(), candidate.added[0], candidate.added[1], candidate.delta,
        );
        Ok(())
    }
}

/// Edges of an open ring that do not touch its loose ends.
fn inner_edges(edges: &[Edge], endpoints: [usize; 2]) -> Vec<Edge> {
    edges.iter()
        .copied()
        .filter(|edge| !edge.contains(endpoints[0]) && !edge.contains(endpoints[1]))
        .collect()
}

/// Keep the lower-ranked candidate; the earlier one wins ties.
fn better(current: Option<MergeCandidate>, challenger: Option<MergeCandidate>) -> Option<MergeCandidate> {
    match (current, challenger) {
        (Some(current), Some(challenger)) if challenger.rank < current.rank => Some(challenger),
        (Some(current), _) => Some(current),
        (None, challenger) => challenger,
    }
}
