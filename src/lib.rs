pub mod buffers;
pub mod config;
pub mod error;
pub mod estimate;
pub mod generator;
pub mod math;
pub mod shape;

pub use buffers::{Aabb, BufferCapacity, Drawcall, OutputBuffers};
pub use config::{FillTexture, GeneratorOptions, ShapeParams};
pub use error::{ShapeError, Result};
pub use generator::{SegmentSpan, ShapeGenerator, ShapeSummary};
