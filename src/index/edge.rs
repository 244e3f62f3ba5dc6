use std::fmt;

use serde::{Deserialize, Serialize};

/// An undirected edge between two points, stored with its endpoints in
/// ascending order so that `Edge::new(a, b) == Edge::new(b, a)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    a: u32,
    b: u32,
}

impl Edge {
    /// Construct the edge joining `i` and `j` (in either order).
    #[inline]
    pub fn new(i: usize, j: usize) -> Self {
        let (a, b) = if i <= j { (i, j) } else { (j, i) };
        Self { a: a as u32, b: b as u32 }
    }

    /// The lower endpoint.
    #[inline] pub fn a(&self) -> usize { self.a as usize }

    /// The higher endpoint.
    #[inline] pub fn b(&self) -> usize { self.b as usize }

    #[inline] pub fn endpoints(&self) -> [usize; 2] { [self.a(), self.b()] }

    /// Check whether `point` is one of the endpoints.
    #[inline]
    pub fn contains(&self, point: usize) -> bool {
        self.a() == point || self.b() == point
    }

    /// Get the endpoint opposite to `point`, or `None` if `point` is not an endpoint.
    #[inline]
    pub fn other(&self, point: usize) -> Option<usize> {
        if self.a() == point { Some(self.b()) }
        else if self.b() == point { Some(self.a()) }
        else { None }
    }

    /// Get the endpoint shared with `other`, if any.
    pub fn shared_point(&self, other: &Edge) -> Option<usize> {
        self.endpoints().into_iter().find(|&p| other.contains(p))
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}-{})", self.a, self.b)
    }
}
