use tracing::{debug, trace};

use super::angles::{resolve_angle, AngleRange, SpriteSlot};
use super::contour::{contour_length, ContourPoint};
use super::prepare::{ControlPoint, PointExtra, SpriteSet};
use crate::math::polygon_2d::edge_slope_angle;
use crate::math::Vector2;
use crate::shape::TangentMode;

/// A run of control-point edges drawn with one edge sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Segment {
    pub start: usize,
    pub end: usize,
    /// `None` for placeholders over unresolved edges.
    pub sprite: Option<usize>,
    pub first_sprite: usize,
    /// Texture rect size of the sprite, in pixels.
    pub pixel_size: Vector2,
    pub render_order: f32,
    /// Contour distance from `start` to `end`.
    pub length: f32,
}

impl Segment {
    fn placeholder(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            sprite: None,
            first_sprite: 0,
            pixel_size: Vector2::zeros(),
            render_order: 0.0,
            length: 0.0,
        }
    }

    pub fn is_single_edge(&self) -> bool {
        self.end.abs_diff(self.start) == 1
    }
}

/// Groups control-point edges into segments and records each point's sprite.
///
/// Consecutive edges share a segment while the joining point is continuous,
/// the segment's first edge was resolved and the sprite stays the same.
/// Edges between a corner's start and end points get no segment.
pub(crate) fn generate_segments(
    points: &mut [ControlPoint],
    slots: &[SpriteSlot],
    ranges: &[AngleRange],
    sprites: &SpriteSet,
    closed: bool,
) -> Vec<Segment> {
    let count = points.len();
    let mut segments: Vec<Segment> = Vec::with_capacity(count);
    let mut active: Option<usize> = None;
    let mut active_sprite = 0;
    let mut angle = 0.0;

    for i in 0..count {
        let mut next = (i + 1) % count;
        let mut wrap = false;
        if next == 0 {
            if !closed {
                continue;
            }
            next = 1;
            wrap = true;
        }

        let (cur, nxt) = (points[i], points[next]);
        if matches!(cur.extra, PointExtra::CornerStart(_)) && cur.corner_type() == nxt.corner_type() {
            continue;
        }

        let (lo, hi) = (i.min(next), i.max(next));
        let mut continue_strip = cur.mode == TangentMode::Continuous;
        if !continue_strip || segments.is_empty() {
            angle = edge_slope_angle(&cur.position, &nxt.position);
        }

        let Some(res) = resolve_angle(ranges, angle, cur.variant) else {
            if !wrap {
                trace!(edge = i, angle, "unresolved edge gets a placeholder segment");
                points[i].sprite = active_sprite;
                segments.push(Segment::placeholder(lo, hi));
                active = Some(segments.len() - 1);
            }
            continue;
        };

        active_sprite = res.sprite;
        points[i].sprite = res.sprite;
        points[i].render_order = res.render_order;
        if wrap {
            continue;
        }

        if let Some(a) = active {
            let seg = &segments[a];
            continue_strip = continue_strip
                && slots.get(seg.start).is_some_and(|s| s.resolved)
                && seg.sprite == Some(active_sprite);
        }

        let mut extended = false;
        if continue_strip && i != count - 1 {
            if let Some(s) = segments
                .iter()
                .position(|s| s.start == lo + 1 || s.end + 1 == hi)
            {
                let seg = &mut segments[s];
                if seg.start == lo + 1 {
                    seg.start = lo;
                } else {
                    seg.end = hi;
                }
                active = Some(s);
                extended = true;
            }
        }

        if !extended {
            let pixel_size = sprites
                .edge(active_sprite)
                .map_or_else(Vector2::zeros, |s| {
                    Vector2::new(s.texture_rect.width, s.texture_rect.height)
                });
            segments.push(Segment {
                start: lo,
                end: hi,
                sprite: Some(active_sprite),
                first_sprite: res.first_sprite,
                pixel_size,
                render_order: res.render_order,
                length: 0.0,
            });
            active = Some(segments.len() - 1);
        }
    }

    debug!(segments = segments.len(), "segments built");
    segments
}

/// Fills in the contour length of every drawable segment.
pub(crate) fn update_lengths(segments: &mut [Segment], contour: &[ContourPoint], detail: usize) {
    for seg in segments.iter_mut().filter(|s| s.sprite.is_some()) {
        seg.length = contour_length(contour, detail, seg.start, seg.end);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::config::ShapeParams;
    use crate::generator::angles::build_ranges;
    use crate::generator::contour::generate_contour;
    use crate::generator::corners::generate_control_points;
    use crate::shape::{AngleRangeDesc, ShapePoint, SpriteDesc, SpriteTables};

    fn build(
        raw: &[ShapePoint],
        descs: &[AngleRangeDesc],
        edge_count: usize,
        closed: bool,
    ) -> (Vec<ControlPoint>, Vec<Segment>) {
        let edges = (0..edge_count)
            .map(|_| Some(SpriteDesc::full_texture(100.0, 50.0, 100.0)))
            .collect();
        let sprites = SpriteSet::from_tables(&SpriteTables::new(edges)).unwrap();
        let ranges = build_ranges(descs, edge_count).unwrap();
        let input: Vec<ControlPoint> = raw.iter().map(ControlPoint::from_input).collect();
        let params = ShapeParams {
            closed,
            ..ShapeParams::default()
        };
        let mut synth = generate_control_points(&input, &ranges, &sprites, &params);
        let segs = generate_segments(&mut synth.points, &synth.slots, &ranges, &sprites, closed);
        (synth.points, segs)
    }

    fn pentagon() -> Vec<ShapePoint> {
        [(0.0, 0.0), (4.0, 0.0), (5.0, 3.0), (2.0, 5.0), (-1.0, 3.0)]
            .iter()
            .map(|&(x, y)| ShapePoint::new(x, y))
            .collect()
    }

    #[test]
    fn closed_segments_cover_every_edge_once() {
        let descs = [
            AngleRangeDesc::new(-45.0, 45.0, 1),
            AngleRangeDesc::new(45.0, 135.0, 1),
            AngleRangeDesc::new(135.0, 225.0, 1),
            AngleRangeDesc::new(225.0, 315.0, 1),
        ];
        let (points, segs) = build(&pentagon(), &descs, 4, true);
        assert_eq!(points.len(), 6);
        let mut edges = vec![0; points.len() - 1];
        for s in &segs {
            for e in s.start..s.end {
                edges[e] += 1;
            }
        }
        assert!(edges.iter().all(|&c| c == 1), "{edges:?}");
    }

    #[test]
    fn unmatched_edges_get_one_placeholder_each() {
        let descs = [AngleRangeDesc::new(10.0, 20.0, 1)];
        let (points, segs) = build(&pentagon(), &descs, 1, true);
        assert_eq!(segs.len(), points.len() - 1);
        assert!(segs.iter().all(|s| s.sprite.is_none() && s.is_single_edge()));
    }

    #[test]
    fn continuous_run_coalesces() {
        let raw: Vec<ShapePoint> = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]
            .iter()
            .map(|&(x, y)| ShapePoint::new(x, y).with_mode(TangentMode::Continuous))
            .collect();
        let (_, segs) = build(&raw, &[AngleRangeDesc::new(-180.0, 180.0, 1)], 1, false);
        assert_eq!(segs.len(), 1);
        assert_eq!((segs[0].start, segs[0].end), (0, 3));
        assert_eq!(segs[0].sprite, Some(0));
        assert_relative_eq!(segs[0].pixel_size.x, 100.0);
    }

    #[test]
    fn linear_points_split_segments() {
        let raw: Vec<ShapePoint> = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]
            .iter()
            .map(|&(x, y)| ShapePoint::new(x, y))
            .collect();
        let (_, segs) = build(&raw, &[AngleRangeDesc::new(-180.0, 180.0, 1)], 1, false);
        assert_eq!(segs.len(), 2);
        assert!(segs.iter().all(Segment::is_single_edge));
    }

    #[test]
    fn lengths_follow_contour() {
        let raw: Vec<ShapePoint> = [(0.0, 0.0), (1.0, 0.0), (3.0, 0.0)]
            .iter()
            .map(|&(x, y)| ShapePoint::new(x, y))
            .collect();
        let (points, mut segs) = build(&raw, &[AngleRangeDesc::new(-180.0, 180.0, 1)], 1, false);
        let contour = generate_contour(&points, 8);
        update_lengths(&mut segs, &contour, 8);
        assert_relative_eq!(segs[0].length, 1.0, epsilon = 1e-5);
        assert_relative_eq!(segs[1].length, 2.0, epsilon = 1e-5);
    }
}
