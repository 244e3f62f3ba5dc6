use std::collections::BTreeSet;

use geo::{Area, LineString, Polygon};

use crate::index::{DistanceIndex, Edge};

/// Whether a ring is a cycle or a chain with two loose ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RingKind {
    Closed,
    /// A chain; an isolated point has no edges and both endpoints equal to itself.
    Open { endpoints: [usize; 2] },
}

/// A connected component of the connection graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    pub(crate) number: usize,
    pub(crate) kind: RingKind,
    pub(crate) points: Vec<usize>, // walk order
    pub(crate) edges: Vec<Edge>,   // edges[i] joins points[i] and points[i + 1] (wrapping when closed)
    pub(crate) level: usize,
    pub(crate) enclosing: Option<usize>,
}

impl Ring {
    pub(crate) fn new(number: usize, kind: RingKind, points: Vec<usize>, edges: Vec<Edge>) -> Self {
        Self { number, kind, points, edges, level: 0, enclosing: None }
    }

    #[inline] pub fn number(&self) -> usize { self.number }

    #[inline] pub fn kind(&self) -> RingKind { self.kind }

    #[inline] pub fn is_closed(&self) -> bool { self.kind == RingKind::Closed }

    /// Get the points in walk order.
    #[inline] pub fn points(&self) -> &[usize] { &self.points }

    /// Get the edges in connectivity order.
    #[inline] pub fn edges(&self) -> &[Edge] { &self.edges }

    /// Get the nesting depth (0 = outermost).
    #[inline] pub fn level(&self) -> usize { self.level }

    /// Get the number of the immediately containing ring.
    #[inline] pub fn enclosing(&self) -> Option<usize> { self.enclosing }

    #[inline] pub fn len(&self) -> usize { self.points.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.points.is_empty() }

    /// The loose ends of an open ring.
    #[inline]
    pub fn endpoints(&self) -> Option<[usize; 2]> {
        match self.kind {
            RingKind::Closed => None,
            RingKind::Open { endpoints } => Some(endpoints),
        }
    }

    /// The edge set, for comparing partitions independently of walk start and direction.
    pub fn edge_set(&self) -> BTreeSet<Edge> { self.edges.iter().copied().collect() }

    /// Sum of actual edge lengths.
    pub fn length(&self, index: &DistanceIndex) -> f64 {
        self.edges.iter().map(|&edge| index.length(edge)).sum()
    }

    /// The polygon traced by a closed ring.
    pub fn polygon(&self, index: &DistanceIndex) -> Option<Polygon<f64>> {
        if !self.is_closed() || self.points.len() < 3 { return None }
        let exterior = self.points.iter()
            .map(|&p| index.point(p).coords())
            .collect::<Vec<_>>();
        Some(Polygon::new(LineString::from(exterior), vec![]))
    }

    /// Area enclosed by a closed ring; zero for open rings.
    pub fn area(&self, index: &DistanceIndex) -> f64 {
        self.polygon(index).map_or(0.0, |polygon| polygon.unsigned_area())
    }

    /// Check whether two rings may be merged under the nesting rule:
    /// both un-enclosed, siblings under the same ring, or parent and child.
    pub fn can_connect(&self, other: &Ring) -> bool {
        self.enclosing == other.enclosing
            || self.enclosing == Some(other.number)
            || other.enclosing == Some(self.number)
    }
}
