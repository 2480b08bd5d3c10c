use super::prepare::ControlPoint;
use crate::math::polygon_2d::{left_normal, normalize_or_zero};
use crate::math::{Point2, Vector2};

/// A cross-section of an edge strip.
///
/// `top` maps to texture v = 0 and `bottom` to v = 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Column {
    pub top: Point2,
    pub bottom: Point2,
}

impl Column {
    pub fn midpoint(&self) -> Point2 {
        nalgebra::center(&self.top, &self.bottom)
    }
}

fn offset_column(at: &Point2, normal: Vector2, extent: f32, pivot: f32) -> Column {
    let v = normal * extent;
    let top = at - v;
    let bottom = at + v;
    let shift = (bottom - top) * pivot;
    Column {
        top: top + shift,
        bottom: bottom + shift,
    }
}

/// Column at `a`, perpendicular to `a -> b` (or `b -> a` when `flip`).
///
/// `height` is the sprite height in world units and `scale` the fraction of
/// it spanned on each side. Returns `None` for a degenerate direction.
pub(crate) fn bi_column(
    a: &Point2,
    b: &Point2,
    flip: bool,
    height: f32,
    scale: f32,
    pivot: f32,
) -> Option<Column> {
    let dir = if flip { a - b } else { b - a };
    let dir = dir.try_normalize(f32::MIN_POSITIVE)?;
    Some(offset_column(a, left_normal(dir), height * scale, pivot))
}

/// Column at `b` along the bisector of the joint `a -> b -> c`.
pub(crate) fn tri_column(
    a: &Point2,
    b: &Point2,
    c: &Point2,
    height: f32,
    scale: f32,
    pivot: f32,
) -> Option<Column> {
    let bisector = normalize_or_zero(left_normal(b - a)) + normalize_or_zero(left_normal(c - b));
    let bisector = bisector.try_normalize(f32::MIN_POSITIVE)?;
    Some(offset_column(b, bisector, height * scale, pivot))
}

/// Leading column of a segment starting at control point `cp`.
///
/// The column follows the point's right tangent when it has one.
pub(crate) fn start_column(
    cp: &ControlPoint,
    at: &Point2,
    toward: &Point2,
    height: f32,
    pivot: f32,
) -> Option<Column> {
    let toward = if cp.right_tangent == Vector2::zeros() {
        *toward
    } else {
        at + cp.right_tangent
    };
    bi_column(at, &toward, false, height, cp.height * 0.5, pivot)
}

/// Trailing column of a segment ending at control point `cp`.
pub(crate) fn end_column(
    cp: &ControlPoint,
    at: &Point2,
    toward: &Point2,
    height: f32,
    pivot: f32,
) -> Option<Column> {
    let toward = if cp.left_tangent == Vector2::zeros() {
        *toward
    } else {
        at + cp.left_tangent
    };
    bi_column(at, &toward, true, height, cp.height * 0.5, pivot)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::shape::ShapePoint;

    #[test]
    fn bi_column_straddles_the_edge() {
        let c = bi_column(
            &Point2::new(0.0, 0.0),
            &Point2::new(3.0, 0.0),
            false,
            1.0,
            0.5,
            0.0,
        )
        .unwrap();
        assert_relative_eq!(c.top, Point2::new(0.0, -0.5));
        assert_relative_eq!(c.bottom, Point2::new(0.0, 0.5));
        assert_relative_eq!(c.midpoint(), Point2::origin());
    }

    #[test]
    fn flipped_column_keeps_orientation() {
        let a = bi_column(
            &Point2::new(3.0, 0.0),
            &Point2::new(0.0, 0.0),
            true,
            1.0,
            0.5,
            0.0,
        )
        .unwrap();
        assert_relative_eq!(a.top, Point2::new(3.0, -0.5));
        assert_relative_eq!(a.bottom, Point2::new(3.0, 0.5));
    }

    #[test]
    fn pivot_shifts_both_ends() {
        let c = bi_column(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            false,
            2.0,
            0.5,
            0.25,
        )
        .unwrap();
        assert_relative_eq!(c.top, Point2::new(0.0, -0.5));
        assert_relative_eq!(c.bottom, Point2::new(0.0, 1.5));
    }

    #[test]
    fn degenerate_direction_has_no_column() {
        let p = Point2::new(1.0, 1.0);
        assert!(bi_column(&p, &p, false, 1.0, 0.5, 0.0).is_none());
        // A full reversal cancels the bisector.
        assert!(tri_column(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(0.0, 0.0),
            1.0,
            0.5,
            0.0
        )
        .is_none());
    }

    #[test]
    fn tri_column_bisects_right_angle() {
        let c = tri_column(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(1.0, 1.0),
            1.0,
            0.5,
            0.0,
        )
        .unwrap();
        let d = (c.bottom - c.top).normalize();
        let h = std::f32::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(d.x, -h, epsilon = 1e-6);
        assert_relative_eq!(d.y, h, epsilon = 1e-6);
        assert_relative_eq!(c.midpoint(), Point2::new(1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn start_column_prefers_tangent() {
        let cp = ControlPoint::from_input(
            &ShapePoint::new(0.0, 0.0)
                .with_mode(crate::shape::TangentMode::Broken)
                .with_tangents(Vector2::zeros(), Vector2::new(0.0, 1.0)),
        );
        let c = start_column(&cp, &cp.position, &Point2::new(1.0, 0.0), 1.0, 0.0).unwrap();
        // Column follows the upward tangent, not the edge direction.
        assert_relative_eq!(c.top, Point2::new(0.5, 0.0));
        assert_relative_eq!(c.bottom, Point2::new(-0.5, 0.0));
    }
}
