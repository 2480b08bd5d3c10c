use super::{Point2, EXTEND_SEGMENT};
use super::polygon_2d::normalize_or_zero;

/// Orientation of an ordered point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

fn orientation(epsilon: f32, p: &Point2, q: &Point2, r: &Point2) -> Orientation {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if val > -epsilon && val < epsilon {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Returns `true` if `q` lies inside the bounding box of `p` and `r`.
fn within_bounds(p: &Point2, q: &Point2, r: &Point2) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Tests whether segments `p1-q1` and `p2-q2` touch or cross.
#[must_use]
pub fn segments_intersect(epsilon: f32, p1: &Point2, q1: &Point2, p2: &Point2, q2: &Point2) -> bool {
    let o1 = orientation(epsilon, p1, q1, p2);
    let o2 = orientation(epsilon, p1, q1, q2);
    let o3 = orientation(epsilon, p2, q2, p1);
    let o4 = orientation(epsilon, p2, q2, q1);
    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && within_bounds(p1, p2, q1))
        || (o2 == Orientation::Collinear && within_bounds(p1, q2, q1))
        || (o3 == Orientation::Collinear && within_bounds(p2, p1, q2))
        || (o4 == Orientation::Collinear && within_bounds(p2, q1, q2))
}

/// Bounded intersection of segment `p1-p2` with segment `p3-p4`.
///
/// Returns `None` when the segments do not meet or are parallel.
#[must_use]
pub fn line_intersection(
    epsilon: f32,
    p1: &Point2,
    p2: &Point2,
    p3: &Point2,
    p4: &Point2,
) -> Option<Point2> {
    if !segments_intersect(epsilon, p1, p2, p3, p4) {
        return None;
    }

    let b = p2 - p1;
    let d = p4 - p3;
    let b_dot_d_perp = b.x * d.y - b.y * d.x;
    if b_dot_d_perp.abs() < epsilon {
        return None;
    }
    let c = p3 - p1;
    let t = (c.x * d.y - c.y * d.x) / b_dot_d_perp;
    if t >= -epsilon && t <= 1.0 + epsilon {
        Some(p1 + b * t)
    } else {
        None
    }
}

/// Returns `true` if `c` lies on segment `a-b` within `epsilon`.
#[must_use]
pub fn is_point_on_line(epsilon: f32, a: &Point2, b: &Point2, c: &Point2) -> bool {
    let cross = (c.y - a.y) * (b.x - a.x) - (c.x - a.x) * (b.y - a.y);
    if cross.abs() > epsilon {
        return false;
    }
    let dot = (c.x - a.x) * (b.x - a.x) + (c.y - a.y) * (b.y - a.y);
    if dot < 0.0 {
        return false;
    }
    let len_sq = (b.x - a.x) * (b.x - a.x) + (b.y - a.y) * (b.y - a.y);
    dot <= len_sq
}

/// Returns `true` if `r` lies on both segments.
#[must_use]
pub fn is_point_on_lines(
    epsilon: f32,
    p1: &Point2,
    p2: &Point2,
    p3: &Point2,
    p4: &Point2,
    r: &Point2,
) -> bool {
    is_point_on_line(epsilon, p1, p2, r) && is_point_on_line(epsilon, p3, p4, r)
}

/// Extends segment `l-r` by [`EXTEND_SEGMENT`] in both directions.
#[must_use]
pub fn extend_segment(l: &Point2, r: &Point2) -> (Point2, Point2) {
    let dir = normalize_or_zero(r - l);
    (l - dir * EXTEND_SEGMENT, r + dir * EXTEND_SEGMENT)
}
