use crate::index::Edge;

/// Errors raised by the tour engine.
///
/// Every variant except `InvalidInput` and `InsufficientPoints` signals a
/// broken structural invariant; the run is aborted with enough context to
/// diagnose the offending point and edge.
#[derive(Debug, thiserror::Error)]
pub enum TourError {
    #[error("edge {edge} is not incident to point {point}")]
    InvalidEdge { point: usize, edge: Edge },

    #[error("point {point} already has two connections {slots:?}; cannot reserve {edge}")]
    SlotsFull { point: usize, edge: Edge, slots: [Option<Edge>; 2] },

    #[error("edge {edge} is not connected at point {point} (connections {slots:?})")]
    NotConnected { point: usize, edge: Edge, slots: [Option<Edge>; 2] },

    #[error("no edge between {a} and {b}")]
    NotFound { a: usize, b: usize },

    #[error("degenerate ring at point {point}: {reason}")]
    DegenerateRing { point: usize, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("at least {required} points are required, got {count}")]
    InsufficientPoints { count: usize, required: usize },
}

pub type Result<T> = std::result::Result<T, TourError>;
