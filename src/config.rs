use crate::error::InputError;
use crate::math::Matrix4;

/// Size of the repeating fill texture, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillTexture {
    pub width: f32,
    pub height: f32,
}

/// Per-shape parameters owned by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParams {
    /// Whether the last control point connects back to the first.
    pub closed: bool,
    /// Fit a whole number of tiles into each segment instead of leaving a
    /// remainder tile.
    pub adaptive_uv: bool,
    /// Map fill UVs to the shape bounds instead of world space.
    pub stretch_uv: bool,
    /// Honor sprite nine-slice borders as head/tail caps.
    pub sprite_borders: bool,
    /// Fill texture; `None` disables the interior fill.
    pub fill_texture: Option<FillTexture>,
    pub fill_scale: f32,
    /// Offset of the fill contour along the outline normal.
    pub border_pivot: f32,
    /// Tolerance in degrees around 90 for automatic corners; `0` disables
    /// corners except for `90` which accepts every angle.
    pub corner_angle_threshold: f32,
    /// Bezier samples per control-point edge.
    pub spline_detail: usize,
    pub local_to_world: Matrix4,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            closed: true,
            adaptive_uv: true,
            stretch_uv: false,
            sprite_borders: true,
            fill_texture: None,
            fill_scale: 1.0,
            border_pivot: 0.0,
            corner_angle_threshold: 30.0,
            spline_detail: 16,
            local_to_world: Matrix4::identity(),
        }
    }
}

impl ShapeParams {
    /// Checks the parameters for values the generator cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> Result<(), InputError> {
        if !self.fill_scale.is_finite() || self.fill_scale <= 0.0 {
            return Err(InputError::InvalidParameter(format!(
                "fill scale must be positive, got {}",
                self.fill_scale
            )));
        }
        if !self.border_pivot.is_finite() {
            return Err(InputError::InvalidParameter(
                "border pivot must be finite".into(),
            ));
        }
        if !(0.0..=90.0).contains(&self.corner_angle_threshold) {
            return Err(InputError::InvalidParameter(format!(
                "corner angle threshold must be within [0, 90], got {}",
                self.corner_angle_threshold
            )));
        }
        if let Some(fill) = self.fill_texture {
            if !(fill.width > 0.0 && fill.height > 0.0) {
                return Err(InputError::InvalidParameter(
                    "fill texture size must be positive".into(),
                ));
            }
        }
        if self.local_to_world.iter().any(|v| !v.is_finite()) {
            return Err(InputError::InvalidParameter(
                "local-to-world matrix must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Options toggling optional generator passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorOptions {
    /// Simplify the fill contour before triangulation.
    pub optimize_geometry: bool,
    /// Produce collider points.
    pub update_collider: bool,
    /// Simplify collider points before trimming overlaps.
    pub optimize_collider: bool,
    /// Collider offset from the edge center line, in `[-0.5, 0.5]`.
    pub collider_offset: f32,
    pub collider_detail: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            optimize_geometry: true,
            update_collider: true,
            optimize_collider: true,
            collider_offset: 0.0,
            collider_detail: 16,
        }
    }
}

impl GeneratorOptions {
    /// # Errors
    ///
    /// Returns [`InputError::InvalidParameter`] if the collider offset is out
    /// of range.
    pub fn validate(&self) -> Result<(), InputError> {
        if !(-0.5..=0.5).contains(&self.collider_offset) {
            return Err(InputError::InvalidParameter(format!(
                "collider offset must be within [-0.5, 0.5], got {}",
                self.collider_offset
            )));
        }
        Ok(())
    }
}

/// Tolerances derived from the detail settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualitySettings {
    pub spline_detail: usize,
    pub render_tolerance: f32,
    pub collider_tolerance: f32,
    pub collider_pivot: f32,
}

impl QualitySettings {
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    pub fn new(params: &ShapeParams, options: &GeneratorOptions) -> Self {
        let render_detail = params.spline_detail.clamp(4, 16) as f32;
        let collider_detail = options.collider_detail.clamp(4, 16) as f32;
        let collider_pivot = if options.collider_offset == 0.0 {
            0.001
        } else {
            -options.collider_offset
        };
        Self {
            spline_detail: params.spline_detail.max(4),
            render_tolerance: (16.0 - render_detail + 2.0) * 0.0002,
            collider_tolerance: (16.0 - collider_detail + 2.0) * 0.002,
            collider_pivot,
        }
    }
}
