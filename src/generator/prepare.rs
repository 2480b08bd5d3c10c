use crate::error::{InputError, SpriteTable};
use crate::math::{Point2, Vector2};
use crate::shape::{
    Border, CornerMode, CornerType, Rect, ShapePoint, SpriteDesc, SpriteTables, TangentMode,
};

/// Extra state a control point picks up during corner synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointExtra {
    None,
    /// Neighboring single-edge segments may be stretched into this point.
    Stretch,
    CornerStart(CornerType),
    CornerEnd(CornerType),
}

/// A control point in the generator's working set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ControlPoint {
    pub position: Point2,
    pub left_tangent: Vector2,
    pub right_tangent: Vector2,
    pub mode: TangentMode,
    pub corner: CornerMode,
    pub height: f32,
    /// Preferred variant within whichever range the outgoing edge hits.
    pub variant: usize,
    /// Edge sprite resolved for the edge leaving this point.
    pub sprite: usize,
    pub render_order: f32,
    pub extra: PointExtra,
}

impl ControlPoint {
    pub fn from_input(p: &ShapePoint) -> Self {
        let linear = p.mode == TangentMode::Linear;
        Self {
            position: p.position,
            left_tangent: if linear { Vector2::zeros() } else { p.left_tangent },
            right_tangent: if linear { Vector2::zeros() } else { p.right_tangent },
            mode: p.mode,
            corner: p.corner,
            height: p.height,
            variant: p.sprite_index,
            sprite: 0,
            render_order: 0.0,
            extra: PointExtra::None,
        }
    }

    pub fn is_plain(&self) -> bool {
        self.extra == PointExtra::None
    }

    pub fn is_stretch(&self) -> bool {
        self.extra == PointExtra::Stretch
    }

    pub fn corner_type(&self) -> Option<CornerType> {
        match self.extra {
            PointExtra::CornerStart(ct) | PointExtra::CornerEnd(ct) => Some(ct),
            PointExtra::None | PointExtra::Stretch => None,
        }
    }

    /// Downgrades a continuous point to broken; used on open-shape endpoints.
    pub fn break_continuity(&mut self) {
        if self.mode == TangentMode::Continuous {
            self.mode = TangentMode::Broken;
        }
    }
}

/// Sprite metadata in the form the tessellator consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SpriteInfo {
    pub texture_rect: Rect,
    /// `texture_rect` normalized by the texture size.
    pub uv_rect: Rect,
    pub pixels_per_unit: f32,
    /// Vertical pivot as a fraction of the texture rect height.
    pub pivot: f32,
    pub rect_size: Vector2,
    pub border: Border,
}

impl SpriteInfo {
    fn from_desc(desc: &SpriteDesc, table: SpriteTable, index: usize) -> Result<Self, InputError> {
        let tr = desc.texture_rect;
        if tr.is_empty() {
            return Err(InputError::MissingTextureRect { table, index });
        }
        if !desc.pixels_per_unit.is_finite() || desc.pixels_per_unit <= 0.0 {
            return Err(InputError::InvalidParameter(format!(
                "{table} sprite {index} has invalid pixels per unit {}",
                desc.pixels_per_unit
            )));
        }
        if !(desc.texture_size.x > 0.0 && desc.texture_size.y > 0.0) {
            return Err(InputError::InvalidParameter(format!(
                "{table} sprite {index} has an empty texture"
            )));
        }
        let size = desc.texture_size;
        let pivot = if tr.height > 0.0 {
            desc.pivot_y / tr.height
        } else {
            0.0
        };
        Ok(Self {
            texture_rect: tr,
            uv_rect: Rect::new(
                tr.x / size.x,
                tr.y / size.y,
                tr.width / size.x,
                tr.height / size.y,
            ),
            pixels_per_unit: desc.pixels_per_unit,
            pivot,
            rect_size: desc.rect_size,
            border: desc.border,
        })
    }

    pub fn has_uv(&self) -> bool {
        !self.uv_rect.is_empty()
    }

    /// Column shift applied to both column endpoints.
    pub fn pivot_offset(&self) -> f32 {
        0.5 - self.pivot
    }

    /// Texture rect size in world units.
    pub fn texture_size_units(&self) -> Vector2 {
        Vector2::new(self.texture_rect.width, self.texture_rect.height) / self.pixels_per_unit
    }

    /// Untrimmed rect size in world units.
    pub fn rect_size_units(&self) -> Vector2 {
        self.rect_size / self.pixels_per_unit
    }

    pub fn border_units(&self) -> Border {
        let r = 1.0 / self.pixels_per_unit;
        Border {
            left: self.border.left * r,
            bottom: self.border.bottom * r,
            right: self.border.right * r,
            top: self.border.top * r,
        }
    }

    /// Maps a sprite-local UV in `[0, 1]` into the atlas.
    pub fn map_uv(&self, u: f32, v: f32) -> Point2 {
        Point2::new(
            u * self.uv_rect.width + self.uv_rect.x,
            v * self.uv_rect.height + self.uv_rect.y,
        )
    }
}

/// Validated edge and corner sprite tables.
#[derive(Debug, Clone, Default)]
pub(crate) struct SpriteSet {
    pub edges: Vec<Option<SpriteInfo>>,
    pub corners: [Option<SpriteInfo>; 8],
}

impl SpriteSet {
    pub fn from_tables(tables: &SpriteTables) -> Result<Self, InputError> {
        let mut edges = Vec::with_capacity(tables.edges.len());
        for (i, desc) in tables.edges.iter().enumerate() {
            edges.push(
                desc.as_ref()
                    .map(|d| SpriteInfo::from_desc(d, SpriteTable::Edge, i))
                    .transpose()?,
            );
        }
        let mut corners = [None; 8];
        for (slot, desc) in tables.corners.iter().enumerate() {
            corners[slot] = desc
                .as_ref()
                .map(|d| SpriteInfo::from_desc(d, SpriteTable::Corner, slot))
                .transpose()?;
        }
        Ok(Self { edges, corners })
    }

    pub fn edge(&self, index: usize) -> Option<&SpriteInfo> {
        self.edges.get(index).and_then(Option::as_ref)
    }

    pub fn corner(&self, corner: CornerType) -> Option<&SpriteInfo> {
        self.corners[corner.slot()].as_ref()
    }
}

/// Converts caller points to working control points.
pub(crate) fn prepare_points(
    points: &[ShapePoint],
    closed: bool,
) -> Result<Vec<ControlPoint>, InputError> {
    let required = if closed { 3 } else { 2 };
    if points.len() < required {
        return Err(InputError::TooFewPoints {
            count: points.len(),
            required,
        });
    }
    for (i, p) in points.iter().enumerate() {
        let finite = p.position.coords.iter().all(|v| v.is_finite())
            && p.left_tangent.iter().all(|v| v.is_finite())
            && p.right_tangent.iter().all(|v| v.is_finite())
            && p.height.is_finite();
        if !finite {
            return Err(InputError::InvalidParameter(format!(
                "control point {i} has non-finite data"
            )));
        }
    }
    Ok(points.iter().map(ControlPoint::from_input).collect())
}
