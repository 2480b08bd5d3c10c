//! The regeneration pipeline.
//!
//! Stages run once per [`ShapeGenerator::execute`] in a fixed order:
//! control-point preparation, corner synthesis, segment grouping, contour
//! expansion, fill triangulation, edge strips, corner quads, the collider
//! outline and finally bounds and fill UVs.

mod angles;
mod bounds;
mod collider;
mod columns;
mod contour;
mod corner_mesh;
mod corners;
mod edges;
mod fill;
mod prepare;
mod segments;
mod simplify;
mod stretch;

pub use simplify::{optimize_points, trim_overlaps, COLLINEAR_DEDUP};

use tracing::{debug, debug_span};

use crate::buffers::OutputBuffers;
use crate::config::{GeneratorOptions, QualitySettings, ShapeParams};
use crate::error::Result;
use crate::shape::{AngleRangeDesc, ShapePoint, SpriteTables};

/// A drawn run of control-point edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSpan {
    /// First control point, indexing the synthesized point list.
    pub start: usize,
    pub end: usize,
    /// Edge sprite, `None` when no angle range matched.
    pub sprite: Option<usize>,
    pub render_order: f32,
    /// Contour length in world units.
    pub length: f32,
}

/// What a regeneration produced besides the output buffers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeSummary {
    /// Control points after corner synthesis.
    pub control_points: usize,
    pub corners: usize,
    pub segments: Vec<SegmentSpan>,
}

/// Generates the render mesh and collider of one sprite shape.
pub struct ShapeGenerator<'a> {
    points: &'a [ShapePoint],
    sprites: &'a SpriteTables,
    ranges: &'a [AngleRangeDesc],
    params: ShapeParams,
    options: GeneratorOptions,
}

impl<'a> ShapeGenerator<'a> {
    /// Creates a generator with default options.
    #[must_use]
    pub fn new(
        points: &'a [ShapePoint],
        sprites: &'a SpriteTables,
        ranges: &'a [AngleRangeDesc],
        params: ShapeParams,
    ) -> Self {
        Self {
            points,
            sprites,
            ranges,
            params,
            options: GeneratorOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Regenerates the shape into `out`.
    ///
    /// `out` is cleared first. On error it is cleared again so no partial
    /// geometry is left behind.
    ///
    /// # Errors
    ///
    /// Returns an input error for invalid points, sprites or parameters, a
    /// capacity error if `out` is too small, or a tessellation error if the
    /// fill cannot be triangulated.
    pub fn execute(&self, out: &mut OutputBuffers) -> Result<ShapeSummary> {
        let _span = debug_span!("regenerate", points = self.points.len()).entered();
        out.clear();
        let result = self.run(out);
        if result.is_err() {
            out.clear();
        }
        result
    }

    fn run(&self, out: &mut OutputBuffers) -> Result<ShapeSummary> {
        let params = &self.params;
        params.validate()?;
        self.options.validate()?;

        let sprites = prepare::SpriteSet::from_tables(self.sprites)?;
        let ranges = angles::build_ranges(self.ranges, sprites.edges.len())?;
        let input = prepare::prepare_points(self.points, params.closed)?;
        let quality = QualitySettings::new(params, &self.options);
        let detail = quality.spline_detail;

        let corners::CornerSynthesis {
            mut points,
            corners,
            slots,
        } = corners::generate_control_points(&input, &ranges, &sprites, params);
        let mut segments =
            segments::generate_segments(&mut points, &slots, &ranges, &sprites, params.closed);
        let contour = contour::generate_contour(&points, detail);
        segments::update_lengths(&mut segments, &contour, detail);

        let raw_fill = contour::fill_points(&contour, detail, params.border_pivot);
        let fill = if params.closed && params.fill_texture.is_some() {
            Some(if self.options.optimize_geometry {
                optimize_points(quality.render_tolerance, &raw_fill, true)
            } else {
                raw_fill.clone()
            })
        } else {
            None
        };
        fill::tessellate_fill(fill.as_deref(), out)?;

        let strips =
            edges::EdgeTessellator::new(&points, &contour, &segments, &sprites, params, detail)
                .execute(out)?;
        corner_mesh::tessellate_corners(&corners, &sprites, out)?;

        let outline = collider::collect_outline(
            &strips,
            &segments,
            &corners,
            &contour,
            quality.collider_pivot,
        );
        collider::finish_collider(
            outline,
            &raw_fill,
            &quality,
            &self.options,
            params.closed,
            points.len(),
            out,
        )?;

        out.bounds = bounds::compute_bounds(out, &contour);
        bounds::fill_tex_coords(out, params);

        debug!(
            vertices = out.vertex_count(),
            indices = out.indices.len(),
            drawcalls = out.drawcalls.len(),
            collider = out.collider_outline().len(),
            "shape regenerated"
        );

        Ok(ShapeSummary {
            control_points: points.len(),
            corners: corners.len(),
            segments: segments
                .iter()
                .map(|s| SegmentSpan {
                    start: s.start,
                    end: s.end,
                    sprite: s.sprite,
                    render_order: s.render_order,
                    length: s.length,
                })
                .collect(),
        })
    }
}
