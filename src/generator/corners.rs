use tracing::trace;

use super::angles::{resolve_sprite_slots, AngleRange, SpriteSlot};
use super::columns::bi_column;
use super::prepare::{ControlPoint, PointExtra, SpriteInfo, SpriteSet};
use crate::config::ShapeParams;
use crate::math::intersect_2d::line_intersection;
use crate::math::polygon_2d::{angle_between, normalize_or_zero, slope_angle};
use crate::math::{Point2, Vector2, EPSILON, EXTEND_SEGMENT};
use crate::shape::{CornerMode, CornerType, TangentMode};

/// Geometry of one synthesized corner quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CornerInfo {
    pub corner: CornerType,
    pub top: Point2,
    pub bottom: Point2,
    pub left: Point2,
    pub right: Point2,
    /// Index of the corner-end control point in the generated set.
    pub end_point: usize,
}

/// Control points after corner synthesis.
#[derive(Debug, Clone, Default)]
pub(crate) struct CornerSynthesis {
    pub points: Vec<ControlPoint>,
    pub corners: Vec<CornerInfo>,
    /// Sprite slots of `points`, resolved after insertion.
    pub slots: Vec<SpriteSlot>,
}

/// Slope buckets for corner classification: (low, high, inner, outer).
const CORNER_BUCKETS: [(f32, f32, CornerType, CornerType); 3] = [
    (-135.0, -35.0, CornerType::InnerTopLeft, CornerType::OuterBottomLeft),
    (35.0, 135.0, CornerType::InnerBottomRight, CornerType::OuterTopRight),
    (-35.0, 35.0, CornerType::InnerTopRight, CornerType::OuterTopLeft),
];

/// Picks a corner type from the turn angle and the incoming edge direction.
pub(crate) fn classify_corner(angle: f32, incoming: Vector2) -> CornerType {
    let slope = slope_angle(incoming);
    let inner = angle > 0.0;
    CORNER_BUCKETS
        .iter()
        .find(|(lo, hi, _, _)| slope > *lo && slope < *hi)
        .map_or(
            if inner {
                CornerType::InnerBottomLeft
            } else {
                CornerType::OuterBottomRight
            },
            |&(_, _, i, o)| if inner { i } else { o },
        )
}

/// Whether a turn of `angle` degrees qualifies as a hard corner.
#[allow(clippy::float_cmp)]
fn angle_within_threshold(angle: f32, threshold: f32) -> bool {
    if threshold == 90.0 {
        return true;
    }
    if threshold <= 0.0 {
        return false;
    }
    let start = 90.0 - threshold;
    (angle.abs() - start).rem_euclid(360.0) <= threshold * 2.0
}

/// Checks corner eligibility of `points[index]`, returning its turn angle.
#[allow(clippy::float_cmp)]
fn corner_angle(
    points: &[ControlPoint],
    slots: &[SpriteSlot],
    index: usize,
    sprites: &SpriteSet,
    threshold: f32,
) -> Option<f32> {
    let count = points.len();
    let prev = if index == 0 { count - 1 } else { index - 1 };
    let next = (index + 1) % count;

    let (ps, cs) = (slots[prev], slots[index]);
    if ps.sprite >= sprites.edges.len() || cs.sprite >= sprites.edges.len() {
        return None;
    }
    if !ps.resolved || !cs.resolved {
        return None;
    }

    let (pcp, icp, ncp) = (&points[prev], &points[index], &points[next]);
    if icp.corner == CornerMode::Disabled
        || pcp.mode != TangentMode::Linear
        || icp.mode != TangentMode::Linear
        || ncp.mode != TangentMode::Linear
    {
        return None;
    }
    if pcp.height != icp.height || icp.height != ncp.height {
        return None;
    }
    let pivot = |slot: SpriteSlot| sprites.edge(slot.sprite).map(|s| s.pivot);
    if pivot(ps) != pivot(cs) {
        return None;
    }

    let angle = angle_between(
        normalize_or_zero(ncp.position - icp.position),
        normalize_or_zero(pcp.position - icp.position),
    );
    angle_within_threshold(angle, threshold).then_some(angle)
}

/// Mitered socket of a corner: the two synthesized points and the quad.
fn attach_corner(
    points: &[ControlPoint],
    index: usize,
    corner: CornerType,
    sprite: &SpriteInfo,
) -> Option<(ControlPoint, ControlPoint, CornerInfo)> {
    let count = points.len();
    let prev = if index == 0 { count - 1 } else { index - 1 };
    let next = (index + 1) % count;
    let (lp, cp, rp) = (
        points[prev].position,
        points[index].position,
        points[next].position,
    );

    let size = sprite.texture_size_units();
    let h = size.y;
    let pivot = sprite.pivot_offset();

    let left_out = bi_column(&lp, &cp, false, h, 0.5, pivot)?;
    let left_in = bi_column(&cp, &lp, false, h, 0.5, pivot)?;
    let right_out = bi_column(&cp, &rp, false, h, 0.5, pivot)?;
    let right_in = bi_column(&rp, &cp, false, h, 0.5, pivot)?;

    let (lb0, lt0) = (left_out.top, left_out.bottom);
    let (rt0, rb0) = (left_in.top, left_in.bottom);
    let (lb1, lt1) = (right_out.top, right_out.bottom);
    let (rt1, rb1) = (right_in.top, right_in.bottom);

    let rt0 = rt0 + normalize_or_zero(rt0 - lt0) * EXTEND_SEGMENT;
    let rb0 = rb0 + normalize_or_zero(rb0 - lb0) * EXTEND_SEGMENT;
    let lt1 = lt1 + normalize_or_zero(lt1 - rt1) * EXTEND_SEGMENT;
    let lb1 = lb1 + normalize_or_zero(lb1 - rb1) * EXTEND_SEGMENT;

    let tp = line_intersection(EPSILON, &lt0, &rt0, &lt1, &rt1)?;
    let bt = line_intersection(EPSILON, &lb0, &rb0, &lb1, &rb1)?;

    let border = sprite.border_units();
    let size_needed = h - border.bottom * 2.0;
    let (ld, rd) = ((lp - cp).norm(), (rp - cp).norm());
    if ld < size_needed || rd < size_needed {
        trace!(point = index, ld, rd, "corner neighbors too close");
        return None;
    }

    let ldir = normalize_or_zero(lp - cp);
    let rdir = normalize_or_zero(rp - cp);
    let a = angle_between(ldir, rdir);
    let (lrd, rrd) = if a > 0.0 {
        (ld - (lb0 - bt).norm(), rd - (bt - rb1).norm())
    } else {
        (ld - (lt0 - tp).norm(), rd - (tp - rt1).norm())
    };
    let la = cp + ldir * lrd;
    let ra = cp + rdir * rrd;

    let mut start = points[index];
    start.position = la;
    start.extra = PointExtra::CornerStart(corner);
    let mut end = points[index];
    end.position = ra;
    end.extra = PointExtra::CornerEnd(corner);

    let lcol = bi_column(&la, &lp, false, h, sprite.pivot, pivot)?;
    let rcol = bi_column(&ra, &rp, false, h, sprite.pivot, pivot)?;
    let (top, bottom, left, right) = if a > 0.0 {
        (tp, bt, lcol.top, rcol.bottom)
    } else {
        (bt, tp, lcol.bottom, rcol.top)
    };

    Some((
        start,
        end,
        CornerInfo {
            corner,
            top,
            bottom,
            left,
            right,
            end_point: 0,
        },
    ))
}

/// Replaces eligible hard corners with mitered corner-sprite sockets.
///
/// Every eligible point becomes a corner-start/corner-end pair. Open shapes
/// keep their endpoints untouched apart from continuity and stretch flags;
/// closed shapes get a trailing copy of the first generated point.
pub(crate) fn generate_control_points(
    input: &[ControlPoint],
    ranges: &[AngleRange],
    sprites: &SpriteSet,
    params: &ShapeParams,
) -> CornerSynthesis {
    let count = input.len();
    let slots = resolve_sprite_slots(input, ranges);
    let mut points = Vec::with_capacity(count * 2 + 1);
    let mut corners = Vec::new();

    let (first, last) = if params.closed {
        (0, count)
    } else {
        let mut cp = input[0];
        cp.break_continuity();
        points.push(cp);
        (1, count - 1)
    };

    for i in first..last {
        let angle = corner_angle(input, &slots, i, sprites, params.corner_angle_threshold);
        if let Some(angle) = angle {
            if input[i].corner == CornerMode::Automatic {
                let prev = if i == 0 { count - 1 } else { i - 1 };
                let incoming = normalize_or_zero(input[i].position - input[prev].position);
                let ct = classify_corner(angle, incoming);
                let attached = sprites
                    .corner(ct)
                    .and_then(|sprite| attach_corner(input, i, ct, sprite));
                if let Some((start, end, mut info)) = attached {
                    points.push(start);
                    points.push(end);
                    info.end_point = points.len() - 1;
                    corners.push(info);
                    continue;
                }
                trace!(point = i, corner = ?ct, "corner not synthesized");
            }
        }
        let mut cp = input[i];
        cp.extra = if angle.is_some() && cp.corner == CornerMode::Stretched {
            PointExtra::Stretch
        } else {
            PointExtra::None
        };
        points.push(cp);
    }

    if params.closed {
        if let Some(&head) = points.first() {
            points.push(head);
        }
    } else {
        points[0].extra = PointExtra::Stretch;
        let mut cp = input[count - 1];
        cp.break_continuity();
        cp.extra = PointExtra::Stretch;
        points.push(cp);
    }

    let slots = resolve_sprite_slots(&points, ranges);
    CornerSynthesis {
        points,
        corners,
        slots,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::generator::angles::build_ranges;
    use crate::shape::{AngleRangeDesc, ShapePoint, SpriteDesc, SpriteTables};

    fn square_tables() -> SpriteTables {
        let corner = SpriteDesc::full_texture(100.0, 100.0, 100.0);
        let mut tables = SpriteTables::new(vec![Some(SpriteDesc::full_texture(
            100.0, 100.0, 100.0,
        ))]);
        for ct in CornerType::ALL {
            tables = tables.with_corner(ct, corner);
        }
        tables
    }

    fn square() -> Vec<ControlPoint> {
        [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]
            .iter()
            .map(|&(x, y)| ControlPoint::from_input(&ShapePoint::new(x, y)))
            .collect()
    }

    fn run(params: &ShapeParams) -> CornerSynthesis {
        let sprites = SpriteSet::from_tables(&square_tables()).unwrap();
        let ranges = build_ranges(&[AngleRangeDesc::new(-180.0, 180.0, 1)], 1).unwrap();
        generate_control_points(&square(), &ranges, &sprites, params)
    }

    #[test]
    fn classify_by_incoming_slope() {
        // Rightward incoming edge, left turn.
        assert_eq!(
            classify_corner(90.0, Vector2::new(1.0, 0.0)),
            CornerType::InnerBottomRight
        );
        assert_eq!(
            classify_corner(-90.0, Vector2::new(1.0, 0.0)),
            CornerType::OuterTopRight
        );
        // Downward incoming edge falls outside every bucket.
        assert_eq!(
            classify_corner(90.0, Vector2::new(0.0, -1.0)),
            CornerType::InnerBottomLeft
        );
    }

    #[test]
    fn threshold_bounds() {
        assert!(angle_within_threshold(-90.0, 30.0));
        assert!(angle_within_threshold(115.0, 30.0));
        assert!(!angle_within_threshold(125.0, 30.0));
        assert!(!angle_within_threshold(90.0, 0.0));
        assert!(angle_within_threshold(10.0, 90.0));
    }

    #[test]
    fn square_gets_four_corners() {
        let out = run(&ShapeParams::default());
        assert_eq!(out.corners.len(), 4);
        // Two points per corner plus the closing copy.
        assert_eq!(out.points.len(), 9);
        assert_eq!(out.slots.len(), out.points.len());
        for info in &out.corners {
            assert!(matches!(
                out.points[info.end_point].extra,
                PointExtra::CornerEnd(ct) if ct == info.corner
            ));
        }
    }

    #[test]
    fn corner_socket_geometry() {
        let out = run(&ShapeParams::default());
        let info = out.corners[1];
        // Corner at (4, 0): sockets pulled half a sprite in along each edge.
        assert_relative_eq!(out.points[2].position.x, 3.5, epsilon = 1e-4);
        assert_relative_eq!(out.points[2].position.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(out.points[3].position.x, 4.0, epsilon = 1e-4);
        assert_relative_eq!(out.points[3].position.y, 0.5, epsilon = 1e-4);
        for p in [info.top, info.bottom, info.left, info.right] {
            assert!((3.5 - 1e-4..=4.5 + 1e-4).contains(&p.x));
            assert!((-0.5 - 1e-4..=0.5 + 1e-4).contains(&p.y));
        }
    }

    #[test]
    fn zero_threshold_disables_corners() {
        let params = ShapeParams {
            corner_angle_threshold: 0.0,
            ..ShapeParams::default()
        };
        let out = run(&params);
        assert!(out.corners.is_empty());
        assert_eq!(out.points.len(), 5);
    }

    #[test]
    fn stretched_point_is_flagged() {
        let sprites = SpriteSet::from_tables(&square_tables()).unwrap();
        let ranges = build_ranges(&[AngleRangeDesc::new(-180.0, 180.0, 1)], 1).unwrap();
        let mut pts = square();
        pts[2].corner = CornerMode::Stretched;
        let out = generate_control_points(&pts, &ranges, &sprites, &ShapeParams::default());
        assert_eq!(out.corners.len(), 3);
        assert!(out.points.iter().any(ControlPoint::is_stretch));
    }

    #[test]
    fn open_endpoints_are_stretch_and_broken() {
        let sprites = SpriteSet::from_tables(&square_tables()).unwrap();
        let ranges = build_ranges(&[AngleRangeDesc::new(-180.0, 180.0, 1)], 1).unwrap();
        let pts: Vec<ControlPoint> = [(0.0, 0.0), (2.0, 0.0), (4.0, 1.0)]
            .iter()
            .map(|&(x, y)| {
                ControlPoint::from_input(
                    &ShapePoint::new(x, y).with_mode(TangentMode::Continuous),
                )
            })
            .collect();
        let params = ShapeParams {
            closed: false,
            ..ShapeParams::default()
        };
        let out = generate_control_points(&pts, &ranges, &sprites, &params);
        assert_eq!(out.points.len(), 3);
        assert!(out.points[0].is_stretch());
        assert!(out.points[2].is_stretch());
        assert_eq!(out.points[0].mode, TangentMode::Broken);
        assert_eq!(out.points[1].mode, TangentMode::Continuous);
        assert_eq!(out.points[2].mode, TangentMode::Broken);
    }
}
