use std::hash::{BuildHasher, Hash, Hasher};

use ahash::RandomState;
use smallvec::SmallVec;

use crate::error::{Result, TourError};
use crate::index::{DistanceIndex, Edge};

/// An occupied connection slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Link {
    edge: Edge,
    biddable: bool, // false for edges placed by the ring merger
}

/// The working assignment of edges to points, at most two per point.
///
/// Every edge is stored at both of its endpoints; all mutating operations
/// keep the two sides in sync or fail without modifying anything.
#[derive(Clone, Debug)]
pub struct ConnectionGraph {
    slots: Vec<[Option<Link>; 2]>, // slots[p] = connections of point p
}

impl ConnectionGraph {
    /// Construct an empty graph over `size` points.
    pub fn new(size: usize) -> Self {
        Self { slots: vec![[None; 2]; size] }
    }

    /// Get the number of points.
    #[inline] pub fn len(&self) -> usize { self.slots.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// Get the number of occupied slots at a point.
    #[inline]
    pub fn degree(&self, point: usize) -> usize {
        self.slots[point].iter().flatten().count()
    }

    /// Check whether a point has both slots occupied.
    #[inline] pub fn is_complete(&self, point: usize) -> bool { self.degree(point) == 2 }

    /// Check whether every point is complete.
    pub fn is_closed(&self) -> bool {
        (0..self.len()).all(|p| self.is_complete(p))
    }

    /// Count the points that are not complete.
    pub fn incomplete_count(&self) -> usize {
        (0..self.len()).filter(|&p| !self.is_complete(p)).count()
    }

    /// Get the edges connected at a point.
    #[inline]
    pub fn edges_of(&self, point: usize) -> impl Iterator<Item = Edge> + '_ {
        self.slots[point].iter().flatten().map(|link| link.edge)
    }

    /// Get the points connected to a point.
    pub fn neighbors(&self, point: usize) -> SmallVec<[usize; 2]> {
        self.edges_of(point).filter_map(|edge| edge.other(point)).collect()
    }

    /// The slot contents of a point, for error context.
    fn slot_edges(&self, point: usize) -> [Option<Edge>; 2] {
        self.slots[point].map(|slot| slot.map(|link| link.edge))
    }

    fn position(&self, point: usize, edge: Edge) -> Option<usize> {
        self.slots[point].iter().position(|slot| slot.is_some_and(|link| link.edge == edge))
    }

    /// Check whether an edge is connected (at either endpoint).
    #[inline]
    pub fn contains(&self, edge: Edge) -> bool {
        edge.b() < self.len() && self.position(edge.a(), edge).is_some()
    }

    /// Check whether the greedy pass may evict this edge at `point`.
    pub fn is_biddable(&self, point: usize, edge: Edge) -> bool {
        self.position(point, edge)
            .and_then(|i| self.slots[point][i])
            .is_some_and(|link| link.biddable)
    }

    /// Verify that `edge` can be placed at `point` without modifying anything.
    fn check_reserve(&self, point: usize, edge: Edge) -> Result<usize> {
        if !edge.contains(point) || edge.b() >= self.len() || self.position(point, edge).is_some() {
            return Err(TourError::InvalidEdge { point, edge });
        }
        self.slots[point].iter().position(Option::is_none).ok_or_else(|| {
            TourError::SlotsFull { point, edge, slots: self.slot_edges(point) }
        })
    }

    /// Occupy the first free slot of `point` with `edge`.
    ///
    /// This only touches one side; callers keeping the graph symmetric should
    /// use [`ConnectionGraph::connect`].
    pub fn reserve(&mut self, point: usize, edge: Edge) -> Result<()> {
        let free = self.check_reserve(point, edge)?;
        self.slots[point][free] = Some(Link { edge, biddable: true });
        Ok(())
    }

    fn link(&mut self, edge: Edge, biddable: bool) -> Result<()> {
        let [a, b] = edge.endpoints();
        let (free_a, free_b) = (self.check_reserve(a, edge)?, self.check_reserve(b, edge)?);
        self.slots[a][free_a] = Some(Link { edge, biddable });
        self.slots[b][free_b] = Some(Link { edge, biddable });
        Ok(())
    }

    /// Reserve an edge at both of its endpoints.
    pub fn connect(&mut self, edge: Edge) -> Result<()> { self.link(edge, true) }

    /// Reserve an edge at both endpoints and protect it from greedy eviction.
    pub fn connect_locked(&mut self, edge: Edge) -> Result<()> { self.link(edge, false) }

    /// Remove an edge connected at `point` from both of its endpoints.
    pub fn release(&mut self, point: usize, edge: Edge) -> Result<()> {
        self.release_link(point, edge).map(|_| ())
    }

    fn release_link(&mut self, point: usize, edge: Edge) -> Result<Link> {
        let other = edge.other(point).ok_or(TourError::InvalidEdge { point, edge })?;
        let here = self.position(point, edge)
            .ok_or_else(|| TourError::NotConnected { point, edge, slots: self.slot_edges(point) })?;
        let there = self.position(other, edge)
            .ok_or_else(|| TourError::NotConnected { point: other, edge, slots: self.slot_edges(other) })?;

        let link = self.slots[point][here].take();
        self.slots[other][there] = None;
        link.ok_or(TourError::NotConnected { point, edge, slots: self.slot_edges(point) })
    }

    /// Atomically swap `old` (connected at `point`) for `new`.
    ///
    /// On failure the graph is left exactly as it was.
    pub fn replace(&mut self, point: usize, old: Edge, new: Edge) -> Result<()> {
        let link = self.release_link(point, old)?;
        if let Err(err) = self.connect(new) {
            self.link(old, link.biddable)?;
            return Err(err);
        }
        Ok(())
    }

    /// Get every connected edge exactly once, in ascending order.
    pub fn edges(&self) -> Vec<Edge> {
        (0..self.len())
            .flat_map(|p| self.edges_of(p).filter(move |edge| edge.a() == p))
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sum of actual lengths over every connected edge.
    pub fn total_length(&self, index: &DistanceIndex) -> f64 {
        self.edges().into_iter().map(|edge| index.length(edge)).sum()
    }

    /// Take a deep copy for equilibrium comparison.
    #[inline] pub fn snapshot(&self) -> Self { self.clone() }

    /// A hash of the edge set, independent of slot order and lock state.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = RandomState::with_seeds(0x7e11, 0xa5a5, 0x0f0f, 0x3c3c).build_hasher();
        self.len().hash(&mut hasher);
        self.edges().hash(&mut hasher);
        hasher.finish()
    }
}

impl PartialEq for ConnectionGraph {
    /// Graphs are equal when every point has the same set of edges.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && (0..self.len()).all(|p| {
            let mut ours = self.slot_edges(p);
            let mut theirs = other.slot_edges(p);
            ours.sort();
            theirs.sort();
            ours == theirs
        })
    }
}

impl Eq for ConnectionGraph {}
