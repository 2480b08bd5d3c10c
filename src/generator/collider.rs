use tracing::{debug, warn};

use super::contour::ContourPoint;
use super::corners::CornerInfo;
use super::edges::{Quad, Strip};
use super::segments::Segment;
use super::simplify::{optimize_points, trim_overlaps};
use crate::buffers::OutputBuffers;
use crate::config::{GeneratorOptions, QualitySettings};
use crate::error::Result;
use crate::math::Point2;

/// Fewest real points a collider may keep before falling back to the fill.
const MIN_COLLIDER_POINTS: usize = 4;

/// Point between `a` and `b`, shifted along `a - b` by `pivot`.
fn pivot_point(a: &Point2, b: &Point2, pivot: f32) -> Point2 {
    nalgebra::center(a, b) + (a - b) * pivot
}

/// Collects the raw collider outline from the edge strips.
///
/// Skipped segments contribute their contour samples. Drawn segments
/// contribute the corner socket they start on, then one point per quad
/// column that is not a cap.
pub(crate) fn collect_outline(
    strips: &[Strip],
    segments: &[Segment],
    corners: &[CornerInfo],
    contour: &[ContourPoint],
    pivot: f32,
) -> Vec<Point2> {
    let mut points = Vec::new();
    for (strip, seg) in strips.iter().zip(segments) {
        match strip {
            Strip::Skipped { start, end } => {
                let end = (*end).min(contour.len());
                if *start < end {
                    points.extend(contour[*start..end].iter().map(|c| c.position));
                }
            }
            Strip::Quads(quads) => {
                if let Some(corner) = corners.iter().find(|c| c.end_point == seg.start) {
                    let (v0, v2) = if corner.corner.is_outer() {
                        (corner.bottom, corner.top)
                    } else {
                        (corner.top, corner.bottom)
                    };
                    points.push(pivot_point(&v0, &v2, pivot));
                }
                push_quad_points(&mut points, quads, pivot);
            }
        }
    }
    points
}

fn push_quad_points(points: &mut Vec<Point2>, quads: &[Quad], pivot: f32) {
    for q in quads {
        if !q.caps[0] {
            points.push(pivot_point(&q.positions[0], &q.positions[2], pivot));
        }
    }
    if let Some(q) = quads.last() {
        if !q.caps[3] {
            points.push(pivot_point(&q.positions[1], &q.positions[3], pivot));
        }
    }
}

/// Simplifies the raw outline and writes it, plus two zero terminators.
///
/// Outlines that simplify below four points are replaced by `fallback`.
///
/// # Errors
///
/// Returns a capacity error if the collider buffer cannot hold the result.
pub(crate) fn finish_collider(
    raw: Vec<Point2>,
    fallback: &[Point2],
    quality: &QualitySettings,
    options: &GeneratorOptions,
    closed: bool,
    control_points: usize,
    out: &mut OutputBuffers,
) -> Result<()> {
    let points = if options.update_collider {
        let raw_count = raw.len();
        let optimized = if options.optimize_collider {
            optimize_points(quality.collider_tolerance, &raw, closed)
        } else {
            raw
        };
        let trimmed = trim_overlaps(
            &optimized,
            quality.spline_detail,
            control_points.saturating_sub(1),
            closed,
        );
        debug!(raw = raw_count, simplified = trimmed.len(), "collider simplified");
        if trimmed.len() < MIN_COLLIDER_POINTS {
            warn!(points = trimmed.len(), "collider degenerate, using fill contour");
            fallback.to_vec()
        } else {
            trimmed
        }
    } else {
        Vec::new()
    };

    out.collider.ensure_room(points.len() + 2)?;
    for p in points {
        out.collider.push(p)?;
    }
    out.collider.push(Point2::origin())?;
    out.collider.push(Point2::origin())?;
    Ok(())
}
