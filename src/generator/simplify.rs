//! Outline simplification shared by the fill and the collider.

use crate::math::intersect_2d::{is_point_on_lines, line_intersection};
use crate::math::polygon_2d::are_collinear;
use crate::math::{Point2, EPSILON, EPSILON_RELAXED};

/// Distance below which consecutive points are merged after simplifying.
pub const COLLINEAR_DEDUP: f32 = 1e-4;

/// Fewest points [`optimize_points`] will touch.
const MIN_OPTIMIZE_POINTS: usize = 8;

/// Fewest points [`trim_overlaps`] will touch.
const MIN_TRIM_POINTS: usize = 4;

fn dedup(points: Vec<Point2>, tolerance: f32) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_none_or(|last| (p - last).norm() > tolerance) {
            out.push(p);
        }
    }
    out
}

/// Drops points collinear with the last kept point and their successor.
///
/// The first point is always kept. Open outlines also keep their last point.
/// Closed outlines are scanned as a ring and come back terminated by a copy
/// of the first point; a trailing copy on the input is ignored.
#[must_use]
pub fn optimize_points(tolerance: f32, points: &[Point2], closed: bool) -> Vec<Point2> {
    if points.len() < MIN_OPTIMIZE_POINTS {
        return points.to_vec();
    }

    let ring = if closed && points.first() == points.last() {
        &points[..points.len() - 1]
    } else {
        points
    };
    let n = ring.len();

    let mut kept = Vec::with_capacity(n + 1);
    kept.push(ring[0]);
    let mut anchor = ring[0];
    let interior_end = if closed { n } else { n - 1 };
    for k in 1..interior_end {
        let next = ring[(k + 1) % n];
        if !are_collinear(&anchor, &ring[k], &next, tolerance) {
            kept.push(ring[k]);
            anchor = ring[k];
        }
    }
    kept.push(if closed { ring[0] } else { ring[n - 1] });

    dedup(kept, COLLINEAR_DEDUP)
}

/// Resolves local self-intersections of a point loop.
///
/// Each vertex's incoming edge is tested against a bounded window of
/// upcoming edges. A hit replaces the overlapping run with the intersection
/// point. The window is `min(clamp(detail * 3, 0, 8), len / 2, cp_count)`.
#[must_use]
pub fn trim_overlaps(points: &[Point2], detail: usize, cp_count: usize, closed: bool) -> Vec<Point2> {
    let len = points.len();
    if len < MIN_TRIM_POINTS {
        return points.to_vec();
    }
    let neighbors = (detail * 3).clamp(0, 8).min(len / 2).min(cp_count);

    let mut out = Vec::with_capacity(len + 1);
    if !closed {
        out.push(points[0]);
    }

    let mut i = 0;
    while i < len {
        let h = if i > 0 { i - 1 } else { len - 1 };
        let (v0, v1) = (points[h], points[i]);
        let mut hit = None;
        for step in (2..=neighbors).rev() {
            let j = (i + step - 1) % len;
            let k = (i + step) % len;
            if k == 0 || i == 0 {
                continue;
            }
            let (v2, v3) = (points[j], points[k]);
            if (v0 - v3).norm() < EPSILON {
                break;
            }
            if let Some(vi) = line_intersection(EPSILON_RELAXED, &v0, &v1, &v2, &v3) {
                if is_point_on_lines(EPSILON_RELAXED, &v0, &v1, &v2, &v3, &vi) {
                    hit = Some((vi, step));
                    break;
                }
            }
        }
        match hit {
            Some((vi, step)) => {
                out.push(vi);
                i += step;
            }
            None => {
                out.push(v1);
                i += 1;
            }
        }
    }

    let mut out = dedup(out, EPSILON);
    if out.len() > MIN_TRIM_POINTS {
        let last = out.len() - 1;
        if let Some(vin) = line_intersection(EPSILON_RELAXED, &out[0], &out[1], &out[last], &out[last - 1]) {
            out[0] = vin;
            out[last] = vin;
        }
    }
    out
}
