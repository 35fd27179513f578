pub mod box2;

pub use box2::Box2;

/// 2D point type in the radial/axial (r, z) plane.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Default relative tolerance for padded bounding-box queries.
pub const BOX_EPSILON: f64 = 1e-6;
