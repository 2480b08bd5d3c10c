use super::{Point2, Vector2};

/// Normalizes `v`, returning the zero vector for degenerate input.
#[must_use]
pub fn normalize_or_zero(v: Vector2) -> Vector2 {
    v.try_normalize(f32::MIN_POSITIVE).unwrap_or_else(Vector2::zeros)
}

/// Returns the left-pointing normal of a direction vector.
#[must_use]
pub fn left_normal(dir: Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}

/// Slope angle of a normalized direction, in signed degrees.
///
/// The angle is measured from the up axis `(0, 1)`, positive towards the
/// right axis. Directions exactly parallel to up map to `0`, and exactly
/// opposite to up map to `-180`, so `acos` is never trusted near `±1`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn slope_angle(dir: Vector2) -> f32 {
    let dr = dir.x;
    let du = dir.y;
    if du == 1.0 {
        return 0.0;
    }
    if du == -1.0 {
        return -180.0;
    }
    let sign = if dr >= 0.0 { 1.0 } else { -1.0 };
    du.clamp(-1.0, 1.0).acos().to_degrees() * sign
}

/// Slope angle of the edge running from `start` to `end`.
#[must_use]
pub fn edge_slope_angle(start: &Point2, end: &Point2) -> f32 {
    slope_angle(normalize_or_zero(end - start))
}

/// Signed angle from `a` to `b` in degrees, positive counter-clockwise.
#[must_use]
pub fn angle_between(a: Vector2, b: Vector2) -> f32 {
    let dot = a.dot(&b);
    let det = a.x * b.y - b.x * a.y;
    det.atan2(dot).to_degrees()
}

/// Returns `true` if the triangle `a, b, c` has (doubled) area below `tolerance`.
#[must_use]
pub fn are_collinear(a: &Point2, b: &Point2, c: &Point2, tolerance: f32) -> bool {
    let ax = (a.y - b.y) * (a.x - c.x);
    let bx = (a.y - c.y) * (a.x - b.x);
    (ax - bx).abs() < tolerance
}

/// Evaluates a cubic Bezier in Bernstein form.
///
/// `start_ctrl` and `end_ctrl` are absolute control positions.
#[must_use]
pub fn bezier_point(
    start: &Point2,
    start_ctrl: &Point2,
    end_ctrl: &Point2,
    end: &Point2,
    t: f32,
) -> Point2 {
    let nt = 1.0 - t;
    let p = start.coords * (nt * nt * nt)
        + start_ctrl.coords * (3.0 * nt * nt * t)
        + end_ctrl.coords * (3.0 * nt * t * t)
        + end.coords * (t * t * t);
    Point2::from(p)
}
