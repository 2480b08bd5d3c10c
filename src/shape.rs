//! Caller-supplied description of a sprite shape.
//!
//! Everything here is read-only input to the generator: the ordered control
//! points of the authoring spline, the edge and corner sprite tables, and the
//! angle ranges that map edge slopes to edge sprites.

use crate::math::{Point2, Vector2};

/// How a control point's tangents are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TangentMode {
    /// Straight edges; tangents are ignored.
    #[default]
    Linear,
    /// Smooth point; edges through it may share one strip.
    Continuous,
    /// Independent left and right tangents.
    Broken,
}

/// Corner behavior requested for a control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CornerMode {
    /// Never synthesize a corner here.
    Disabled,
    /// Insert a corner sprite when the point is an eligible hard corner.
    #[default]
    Automatic,
    /// Stretch neighboring edges into the corner instead of using a sprite.
    Stretched,
}

/// A control point of the authoring spline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePoint {
    pub position: Point2,
    /// Tangent towards the previous point, relative to `position`.
    pub left_tangent: Vector2,
    /// Tangent towards the next point, relative to `position`.
    pub right_tangent: Vector2,
    pub mode: TangentMode,
    pub height: f32,
    /// Preferred sprite variant within the resolved angle range.
    pub sprite_index: usize,
    pub corner: CornerMode,
}

impl ShapePoint {
    /// Creates a linear point with unit height and automatic corners.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Point2::new(x, y),
            left_tangent: Vector2::zeros(),
            right_tangent: Vector2::zeros(),
            mode: TangentMode::Linear,
            height: 1.0,
            sprite_index: 0,
            corner: CornerMode::Automatic,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: TangentMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_tangents(mut self, left: Vector2, right: Vector2) -> Self {
        self.left_tangent = left;
        self.right_tangent = right;
        self
    }

    #[must_use]
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_sprite(mut self, sprite_index: usize) -> Self {
        self.sprite_index = sprite_index;
        self
    }

    #[must_use]
    pub fn with_corner(mut self, corner: CornerMode) -> Self {
        self.corner = corner;
        self
    }
}

/// An axis-aligned rectangle in texture pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` if every component is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.width == 0.0 && self.height == 0.0
    }
}

/// Nine-slice border insets in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Border {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

/// Atlas metadata for one sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDesc {
    /// Location of the sprite inside its texture, in pixels.
    pub texture_rect: Rect,
    /// Full texture size in pixels.
    pub texture_size: Vector2,
    /// Untrimmed sprite size in pixels.
    pub rect_size: Vector2,
    pub pixels_per_unit: f32,
    /// Vertical pivot in pixels from the bottom of the texture rect.
    pub pivot_y: f32,
    pub border: Border,
}

impl SpriteDesc {
    /// Creates a sprite filling a whole `width` x `height` texture with a
    /// centered pivot and no borders.
    #[must_use]
    pub fn full_texture(width: f32, height: f32, pixels_per_unit: f32) -> Self {
        Self {
            texture_rect: Rect::new(0.0, 0.0, width, height),
            texture_size: Vector2::new(width, height),
            rect_size: Vector2::new(width, height),
            pixels_per_unit,
            pivot_y: height * 0.5,
            border: Border::default(),
        }
    }

    #[must_use]
    pub fn with_border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }
}

/// An arc of edge-slope angles mapped to a run of edge sprites.
///
/// Angles are in degrees with `0` meaning an edge whose outward side faces up.
/// Ranges consume consecutive entries of the edge sprite table in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleRangeDesc {
    pub start: f32,
    pub end: f32,
    pub order: i32,
    pub sprite_count: usize,
}

impl AngleRangeDesc {
    #[must_use]
    pub fn new(start: f32, end: f32, sprite_count: usize) -> Self {
        Self {
            start,
            end,
            order: 0,
            sprite_count,
        }
    }
}

/// The eight hard-corner sprite slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CornerType {
    OuterTopLeft,
    OuterTopRight,
    OuterBottomLeft,
    OuterBottomRight,
    InnerTopLeft,
    InnerTopRight,
    InnerBottomLeft,
    InnerBottomRight,
}

impl CornerType {
    /// All corner types in slot order.
    pub const ALL: [CornerType; 8] = [
        CornerType::OuterTopLeft,
        CornerType::OuterTopRight,
        CornerType::OuterBottomLeft,
        CornerType::OuterBottomRight,
        CornerType::InnerTopLeft,
        CornerType::InnerTopRight,
        CornerType::InnerBottomLeft,
        CornerType::InnerBottomRight,
    ];

    /// Zero-based slot of this type in the corner sprite table.
    #[must_use]
    pub fn slot(self) -> usize {
        match self {
            Self::OuterTopLeft => 0,
            Self::OuterTopRight => 1,
            Self::OuterBottomLeft => 2,
            Self::OuterBottomRight => 3,
            Self::InnerTopLeft => 4,
            Self::InnerTopRight => 5,
            Self::InnerBottomLeft => 6,
            Self::InnerBottomRight => 7,
        }
    }

    #[must_use]
    pub fn is_outer(self) -> bool {
        self.slot() < 4
    }
}

/// Edge and corner sprite tables.
///
/// Missing entries (`None`) are allowed: edges resolving to them are skipped
/// and corners of that type are never synthesized.
#[derive(Debug, Clone, Default)]
pub struct SpriteTables {
    pub edges: Vec<Option<SpriteDesc>>,
    pub corners: [Option<SpriteDesc>; 8],
}

impl SpriteTables {
    #[must_use]
    pub fn new(edges: Vec<Option<SpriteDesc>>) -> Self {
        Self {
            edges,
            corners: [None; 8],
        }
    }

    #[must_use]
    pub fn with_corner(mut self, corner: CornerType, sprite: SpriteDesc) -> Self {
        self.corners[corner.slot()] = Some(sprite);
        self
    }
}
