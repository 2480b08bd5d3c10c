use tracing::{debug, trace};

use super::columns::{end_column, start_column, tri_column, Column};
use super::contour::ContourPoint;
use super::prepare::{ControlPoint, SpriteInfo, SpriteSet};
use super::segments::Segment;
use super::stretch::{fetch_stretcher, stretch_corners, Intersectors, StripMetrics};
use crate::buffers::{Drawcall, OutputBuffers};
use crate::config::ShapeParams;
use crate::error::{InputError, Result};
use crate::math::polygon_2d::normalize_or_zero;
use crate::math::{Point2, Point3, Vector4, EPSILON, EPSILON_ORDER, EPSILON_RELAXED};
use crate::shape::{Border, TangentMode};

/// Cross product below which a contour sample counts as collinear.
const REDUNDANT_SAMPLE_CROSS: f32 = 1e-4;

/// One textured quad of an edge strip.
///
/// Vertex order is left-top, right-top, left-bottom, right-bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Quad {
    pub positions: [Point2; 4],
    pub uvs: [Point2; 4],
    /// Cap vertices are left out of the collider.
    pub caps: [bool; 4],
    pub tangent: Vector4,
}

/// What the edge pass produced for one segment, consumed by the collider.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Strip {
    /// Nothing drawn; contour samples `start..end` stand in for the segment.
    Skipped { start: usize, end: usize },
    Quads(Vec<Quad>),
}

/// A sample along a segment's strip before columns are generated.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StripVertex {
    position: Point2,
    height: f32,
}

impl From<&ContourPoint> for StripVertex {
    fn from(cp: &ContourPoint) -> Self {
        Self {
            position: cp.position,
            height: cp.height,
        }
    }
}

/// Per-segment layout decided before walking the contour.
#[derive(Debug, Clone, Copy)]
struct Layout {
    use_closure: bool,
    valid_head: bool,
    valid_tail: bool,
    first_segment: bool,
    final_segment: bool,
    /// Sprite rect size in world units.
    width: f32,
    border: Border,
    /// Distance between tile cuts along the contour.
    tile_length: f32,
}

/// Tessellates every segment into textured quad strips.
pub(crate) struct EdgeTessellator<'a> {
    points: &'a [ControlPoint],
    contour: &'a [ContourPoint],
    segments: &'a [Segment],
    sprites: &'a SpriteSet,
    params: &'a ShapeParams,
    detail: usize,
    intersectors: Intersectors,
    first_column: Option<Column>,
}

impl<'a> EdgeTessellator<'a> {
    pub fn new(
        points: &'a [ControlPoint],
        contour: &'a [ContourPoint],
        segments: &'a [Segment],
        sprites: &'a SpriteSet,
        params: &'a ShapeParams,
        detail: usize,
    ) -> Self {
        Self {
            points,
            contour,
            segments,
            sprites,
            params,
            detail,
            intersectors: Intersectors::new(points.len()),
            first_column: None,
        }
    }

    /// Writes one drawcall per segment and returns the strips in segment order.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidBorders`] if a sprite's borders leave no
    /// content width, or a capacity error if an output buffer fills up.
    pub fn execute(mut self, out: &mut OutputBuffers) -> Result<Vec<Strip>> {
        let segments = self.segments;
        let sprites = self.sprites;
        let mut strips = Vec::with_capacity(segments.len());
        for (i, seg) in segments.iter().enumerate() {
            let drawn = seg
                .sprite
                .and_then(|s| sprites.edge(s).map(|info| (s, info)))
                .filter(|(_, info)| info.has_uv());

            let strip = match drawn {
                Some((sprite, info)) => self.tessellate_segment(i, seg, sprite, info)?,
                None => {
                    trace!(segment = i, "segment has no drawable sprite");
                    Strip::Skipped {
                        start: seg.start * self.detail,
                        end: (seg.end * self.detail).saturating_sub(1),
                    }
                }
            };
            write_strip(out, i, seg, &strip)?;
            strips.push(strip);
        }
        debug!(segments = segments.len(), vertices = out.vertex_count(), "edges tessellated");
        Ok(strips)
    }

    #[allow(clippy::float_cmp)]
    fn layout(&self, index: usize, seg: &Segment, sprite: &SpriteInfo) -> Result<Layout> {
        let count = self.points.len();
        let closed = self.params.closed;
        let size = sprite.rect_size_units();
        let border = sprite.border_units();
        let cp0_continuous = self.points[0].mode == TangentMode::Continuous;
        let last_segment = self.segments.len() - 1;

        let use_closure = cp0_continuous && seg.end == count - 1;
        let first_segment = index == 0 && !closed && !use_closure;
        let final_segment = index == last_segment && !closed && !use_closure;
        let borders = self.params.sprite_borders;

        let mut valid_head = borders
            && border.left > 0.0
            && (self.points[seg.start].is_plain() || first_segment);
        let mut valid_tail = borders
            && border.right > 0.0
            && (self.points[seg.end].is_plain() || final_segment);
        if cp0_continuous {
            valid_head &= !closed;
            valid_tail &= !closed;
        }
        if seg.start == 0 && cp0_continuous && closed {
            valid_head = false;
        }

        let content = size.x - border.left - border.right;
        if !(content.is_finite() && content >= EPSILON) {
            return Err(InputError::InvalidBorders {
                sprite: seg.sprite.unwrap_or_default(),
            }
            .into());
        }
        let tiles = (seg.length / content).floor();
        let tiles = if tiles == 0.0 { 1.0 } else { tiles };
        let tile_length = if self.params.adaptive_uv {
            seg.length / tiles
        } else {
            content
        };

        Ok(Layout {
            use_closure,
            valid_head,
            valid_tail,
            first_segment,
            final_segment,
            width: size.x,
            border,
            tile_length,
        })
    }

    fn tessellate_segment(
        &mut self,
        index: usize,
        seg: &Segment,
        sprite_index: usize,
        sprite: &SpriteInfo,
    ) -> Result<Strip> {
        let layout = self.layout(index, seg, sprite)?;
        if layout.tile_length < EPSILON {
            trace!(segment = index, "zero-length segment");
            return Ok(Strip::Quads(Vec::new()));
        }

        let strip = self.walk_contour(seg, &layout);
        let metrics = StripMetrics {
            height: sprite.rect_size_units().y,
            pivot: sprite.pivot_offset(),
        };
        let columns = self.columns(seg, &strip, &layout, metrics);
        let mut quads = build_quads(&strip, &columns, &layout, sprite);

        if seg.is_single_edge() && self.segments.len() > 1 {
            let stretcher = fetch_stretcher(
                index,
                self.segments,
                self.points,
                self.params.closed,
                metrics,
                &mut self.intersectors,
            );
            if let Some(stretcher) = stretcher {
                trace!(segment = index, ?stretcher, "stretching into corner");
                stretch_corners(&mut quads, seg, layout.valid_head, stretcher, &self.intersectors);
            }
        }

        trace!(segment = index, sprite = sprite_index, quads = quads.len(), "segment tessellated");
        Ok(Strip::Quads(quads))
    }

    /// Samples the contour at tile boundaries, plus head and tail caps.
    fn walk_contour(&self, seg: &Segment, layout: &Layout) -> Vec<StripVertex> {
        let contour = self.contour;
        let st = seg.start * self.detail;
        let en = (seg.end * self.detail).saturating_sub(1);
        let pxl = layout.tile_length;
        let mut strip: Vec<StripVertex> = Vec::new();

        if layout.valid_head && st + 1 < contour.len() {
            let v1 = contour[st].position;
            let v2 = contour[st + 1].position;
            strip.push(StripVertex {
                position: v1 + normalize_or_zero(v1 - v2) * layout.border.left,
                height: contour[st].height,
            });
        }

        let mut sl = 0.0;
        let mut extend = 0.0;
        for it in st..en {
            let (icp, ncp) = (&contour[it], &contour[it + 1]);
            let df = ncp.position - icp.position;
            let al = df.norm();
            if al <= EPSILON {
                continue;
            }
            sl += al;

            let add = strip
                .last()
                .is_none_or(|last| (last.position - icp.position).norm() > EPSILON_RELAXED);
            let redundant = it > st && strip.last().is_some_and(|last| is_redundant(last, icp, ncp));
            if add && !redundant {
                strip.push(icp.into());
            }

            let step = df / al;
            let mut sp = icp.position;
            let mut hl = 0.0;
            while sl > pxl {
                let ip = sp + step * (pxl - extend);
                hl += (ip - sp).norm();
                let vertex = StripVertex {
                    position: ip,
                    height: icp.height + (ncp.height - icp.height) * (hl / al),
                };
                if strip.last().is_none_or(|last| last.position != ip) {
                    strip.push(vertex);
                }
                sl -= pxl;
                sp = ip;
                extend = 0.0;
            }
            extend = sl;
        }

        if sl > EPSILON {
            strip.push((&contour[en]).into());
        }

        if layout.valid_tail && en >= 1 {
            let v1 = contour[en].position;
            let v2 = contour[en - 1].position;
            strip.push(StripVertex {
                position: v1 + normalize_or_zero(v1 - v2) * layout.border.right,
                height: contour[en].height,
            });
        }
        strip
    }

    /// One column per strip vertex; `None` where the direction degenerates.
    fn columns(
        &mut self,
        seg: &Segment,
        strip: &[StripVertex],
        layout: &Layout,
        metrics: StripMetrics,
    ) -> Vec<Option<Column>> {
        let n = strip.len();
        if n < 2 {
            return vec![None; n];
        }
        let points = self.points;
        let scp = &points[seg.start];
        let ecp = &points[seg.end];
        let (h, pivot) = (metrics.height, metrics.pivot);

        let mut columns = Vec::with_capacity(n);
        for k in 0..n {
            let pos = &strip[k].position;
            let column = if k == 0 {
                start_column(scp, pos, &strip[1].position, h, pivot)
            } else if k == n - 1 {
                match self.first_column.filter(|_| layout.use_closure) {
                    Some(first) => Some(first),
                    None => end_column(ecp, pos, &strip[k - 1].position, h, pivot),
                }
            } else {
                tri_column(
                    &strip[k - 1].position,
                    pos,
                    &strip[k + 1].position,
                    h,
                    strip[k].height * 0.5,
                    pivot,
                )
            };
            columns.push(column);
        }

        if seg.start == 0 {
            self.first_column = columns[0];
        }
        columns
    }
}

/// Whether `cur` lies on the straight line from `last` to `next` with a
/// linearly interpolated height.
fn is_redundant(last: &StripVertex, cur: &ContourPoint, next: &ContourPoint) -> bool {
    let into = cur.position - last.position;
    let out = next.position - cur.position;
    let (Some(a), Some(b)) = (into.try_normalize(EPSILON), out.try_normalize(EPSILON)) else {
        return false;
    };
    if a.perp(&b).abs() >= REDUNDANT_SAMPLE_CROSS || a.dot(&b) <= 0.0 {
        return false;
    }
    let span = into.norm() + out.norm();
    let t = into.norm() / span;
    let expected = last.height + (next.height - last.height) * t;
    (expected - cur.height).abs() < EPSILON_RELAXED
}

/// Tracks the u coordinate across body tiles.
#[derive(Debug, Clone, Copy)]
struct UvRun {
    start: f32,
    end: f32,
    total: f32,
    inter: f32,
    per_unit: f32,
    now: f32,
    dist: f32,
}

impl UvRun {
    fn new(layout: &Layout) -> Self {
        let start = layout.border.left;
        let end = layout.width - layout.border.right;
        let total = layout.width;
        let inter = end - start;
        Self {
            start,
            end,
            total,
            inter,
            per_unit: inter / layout.tile_length,
            now: start / total,
            dist: 0.0,
        }
    }

    /// Returns the u range of a body quad spanning `distance`.
    fn advance(&mut self, distance: f32) -> (f32, f32) {
        if self.inter - self.dist < EPSILON_RELAXED {
            self.now = self.start / self.total;
            self.dist = 0.0;
        }
        self.dist += distance * self.per_unit;
        let mut next = (self.dist + self.start) / self.total;
        if self.dist - self.inter > EPSILON_RELAXED {
            next = self.end / self.total;
            self.dist = self.end;
        }
        let range = (self.now, next);
        self.now = next;
        range
    }
}

fn build_quads(
    strip: &[StripVertex],
    columns: &[Option<Column>],
    layout: &Layout,
    sprite: &SpriteInfo,
) -> Vec<Quad> {
    let n = strip.len();
    let mut quads = Vec::with_capacity(n.saturating_sub(1));
    let mut uv = UvRun::new(layout);
    let w = layout.width;

    for i in 0..n.saturating_sub(1) {
        let (Some(l), Some(r)) = (columns[i], columns[i + 1]) else {
            continue;
        };
        let dir = normalize_or_zero(r.top - l.top);
        let mut caps = [false; 4];
        let local = if layout.valid_head && i == 0 {
            let b = layout.border.left / w;
            caps[0] = !layout.first_segment;
            caps[2] = !layout.first_segment;
            [(0.0, 0.0), (b, 0.0), (0.0, 1.0), (b, 1.0)]
        } else if layout.valid_tail && i == n - 2 {
            let b = (w - layout.border.right) / w;
            caps[1] = !layout.final_segment;
            caps[3] = !layout.final_segment;
            [(b, 0.0), (1.0, 0.0), (b, 1.0), (1.0, 1.0)]
        } else {
            let d = (strip[i + 1].position - strip[i].position).norm();
            let (u0, u1) = uv.advance(d);
            [(u0, 0.0), (u1, 0.0), (u0, 1.0), (u1, 1.0)]
        };

        quads.push(Quad {
            positions: [l.top, r.top, l.bottom, r.bottom],
            uvs: local.map(|(u, v)| sprite.map_uv(u, v)),
            caps,
            tangent: Vector4::new(dir.x, dir.y, 0.0, -1.0),
        });
    }
    quads
}

/// Appends a segment's quads to the output and records its drawcall.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn write_strip(out: &mut OutputBuffers, index: usize, seg: &Segment, strip: &Strip) -> Result<()> {
    let vertex_offset = out.vertex_count();
    let index_offset = out.indices.len();
    let sprite_id = seg.sprite.map_or(-1, |s| s as i32);

    if let Strip::Quads(quads) = strip {
        out.positions.ensure_room(quads.len() * 4)?;
        out.indices.ensure_room(quads.len() * 6)?;
        let sprite = seg.sprite.unwrap_or_default() as f32;
        let z = (index + 1) as f32 * EPSILON_ORDER + sprite * EPSILON_ORDER * 0.001;
        for (k, quad) in quads.iter().enumerate() {
            for (p, uv) in quad.positions.iter().zip(quad.uvs) {
                out.push_vertex(Point3::new(p.x, p.y, z), uv, quad.tangent)?;
            }
            let b = k * 4;
            out.push_triangle([b, b + 3, b + 1])?;
            out.push_triangle([b, b + 2, b + 3])?;
        }
    }

    out.drawcalls.push(Drawcall {
        geom_index: index + 1,
        index_offset,
        index_count: out.indices.len() - index_offset,
        vertex_offset,
        vertex_count: out.vertex_count() - vertex_offset,
        sprite_id,
    })?;
    Ok(())
}
