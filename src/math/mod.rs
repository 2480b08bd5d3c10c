pub mod intersect_2d;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f32>;

/// 3D point type (x, y and render depth).
pub type Point3 = nalgebra::Point3<f32>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f32>;

/// 4D vector type, used for vertex tangents.
pub type Vector4 = nalgebra::Vector4<f32>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f32>;

/// General floating-point tolerance.
pub const EPSILON: f32 = 1e-5;

/// Looser tolerance for UV wrapping and overlap tests.
pub const EPSILON_RELAXED: f32 = 1e-3;

/// Depth step between consecutive segment drawcalls.
pub const EPSILON_ORDER: f32 = -1e-4;

/// Distance a boundary ray is extended before miter intersection.
pub const EXTEND_SEGMENT: f32 = 10_000.0;
