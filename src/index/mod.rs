mod distance;
mod edge;
mod point;

pub use distance::DistanceIndex;
pub use edge::Edge;
pub use point::Point;
