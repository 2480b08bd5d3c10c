use tracing::debug;

use super::prepare::ControlPoint;
use crate::math::polygon_2d::{bezier_point, left_normal};
use crate::math::{Point2, EPSILON};

/// One Bezier sample of the outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ContourPoint {
    pub position: Point2,
    pub height: f32,
}

/// Subdivides every control-point edge into `detail` Bezier samples.
///
/// Sample `i * detail + n` is the `n`-th sample of edge `i`. Heights are
/// interpolated by arc length along the edge rather than by the curve
/// parameter.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn generate_contour(points: &[ControlPoint], detail: usize) -> Vec<ContourPoint> {
    let edges = points.len().saturating_sub(1);
    let mut contour = Vec::with_capacity(edges * detail);
    let fmax = detail.saturating_sub(1).max(1) as f32;

    for pair in points.windows(2) {
        let (cp, np) = (&pair[0], &pair[1]);
        let p0 = cp.position;
        let p1 = np.position;
        let c0 = p0 + cp.right_tangent;
        let c1 = p1 + np.left_tangent;

        let first = contour.len();
        let mut total = 0.0;
        let mut prev = p0;
        for n in 0..detail {
            let bp = bezier_point(&p0, &c0, &c1, &p1, n as f32 / fmax);
            total += (bp - prev).norm();
            contour.push(ContourPoint {
                position: bp,
                height: cp.height,
            });
            prev = bp;
        }

        if total > 0.0 {
            let mut run = 0.0;
            let mut prev = p0;
            for sample in &mut contour[first..] {
                run += (sample.position - prev).norm();
                sample.height = cp.height + (np.height - cp.height) * (run / total);
                prev = sample.position;
            }
        }
    }
    contour
}

/// Offsets contour samples along their bisected normals for the fill.
///
/// The last sample of every edge is skipped since it coincides with the
/// first sample of the next edge.
pub(crate) fn fill_points(contour: &[ContourPoint], detail: usize, border_pivot: f32) -> Vec<Point2> {
    let count = contour.len();
    let mut out = Vec::with_capacity(count);
    if count < 3 || detail == 0 {
        return out;
    }

    for i in 0..count {
        if (i + 1) % detail == 0 {
            continue;
        }
        let mut h = if i == 0 { count - 1 } else { i - 1 };
        if i % detail == 0 {
            h = h.saturating_sub(1);
        }
        let j = (i + 1) % count;

        let (pp, cp, np) = (contour[h].position, contour[i].position, contour[j].position);
        let incoming = cp - pp;
        let outgoing = np - cp;
        if incoming.norm() < EPSILON || outgoing.norm() < EPSILON {
            continue;
        }

        let bisector = left_normal(incoming.normalize()) + left_normal(outgoing.normalize());
        let Some(dir) = bisector.try_normalize(f32::MIN_POSITIVE) else {
            continue;
        };
        out.push(cp + dir * border_pivot);
    }
    debug!(samples = count, fill = out.len(), "contour expanded");
    out
}

/// Contour distance covered by the edges `start..end`.
pub(crate) fn contour_length(contour: &[ContourPoint], detail: usize, start: usize, end: usize) -> f32 {
    let first = start * detail;
    let last = (end * detail).saturating_sub(1).min(contour.len().saturating_sub(1));
    if first >= last {
        return 0.0;
    }
    contour[first..=last]
        .windows(2)
        .map(|w| (w[1].position - w[0].position).norm())
        .sum()
}
