pub mod point;
pub mod trajectory;

pub use point::Point;
pub use trajectory::Trajectory;
