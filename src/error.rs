use thiserror::Error;

/// Top-level error type for shape mesh generation.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Which sprite table an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteTable {
    Edge,
    Corner,
}

impl std::fmt::Display for SpriteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edge => f.write_str("edge"),
            Self::Corner => f.write_str("corner"),
        }
    }
}

/// Errors caused by invalid caller-supplied data.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{table} sprite {index} has no texture rect (tight packing is not supported)")]
    MissingTextureRect { table: SpriteTable, index: usize },

    #[error("edge sprite {sprite} has borders leaving no usable content width")]
    InvalidBorders { sprite: usize },

    #[error("sprite index {index} is out of range for a table of {count} sprites")]
    SpriteOutOfRange { index: usize, count: usize },

    #[error("at least {required} control points are required, got {count}")]
    TooFewPoints { count: usize, required: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Output buffer identifiers used in capacity diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Vertices,
    Indices,
    Drawcalls,
    Collider,
}

impl std::fmt::Display for BufferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertices => f.write_str("vertex"),
            Self::Indices => f.write_str("index"),
            Self::Drawcalls => f.write_str("drawcall"),
            Self::Collider => f.write_str("collider"),
        }
    }
}

/// The caller-declared output budget was too small.
#[derive(Debug, Error)]
pub enum CapacityError {
    #[error("{buffer} buffer needs {required} elements but only {capacity} were reserved")]
    Exceeded {
        buffer: BufferKind,
        required: usize,
        capacity: usize,
    },
}

/// Errors related to fill tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`ShapeError`].
pub type Result<T> = std::result::Result<T, ShapeError>;
