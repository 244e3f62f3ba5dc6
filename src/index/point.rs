/// A point of the instance together with its per-run working state.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub sequence: usize,
    pub x: f64,
    pub y: f64,
    pub(crate) elevation: f64,   // heuristic penalty score, not a height
    pub(crate) ring: Option<usize>,
}

impl Point {
    pub(crate) fn new(sequence: usize, x: f64, y: f64) -> Self {
        Self { sequence, x, y, elevation: 0.0, ring: None }
    }

    #[inline] pub fn coords(&self) -> (f64, f64) { (self.x, self.y) }

    #[inline] pub fn elevation(&self) -> f64 { self.elevation }

    /// The ring this point was assigned to by the last detection pass.
    #[inline] pub fn ring(&self) -> Option<usize> { self.ring }
}
