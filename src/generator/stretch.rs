//! Stretch correction for single-edge segments meeting at stretched corners.

use super::columns::{end_column, start_column, Column};
use super::edges::Quad;
use super::prepare::ControlPoint;
use super::segments::Segment;
use crate::math::intersect_2d::{extend_segment, line_intersection};
use crate::math::{Point2, EPSILON};
use crate::shape::CornerMode;

/// Mitered junction of two segments at a control point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Socket {
    pub top: Point2,
    pub bottom: Point2,
}

/// Junctions computed so far, indexed by control point.
///
/// Whichever neighboring segment reaches a junction first computes it and
/// the other reuses the stored result.
#[derive(Debug, Clone, Default)]
pub(crate) struct Intersectors {
    sockets: Vec<Option<Socket>>,
}

impl Intersectors {
    pub fn new(point_count: usize) -> Self {
        Self {
            sockets: vec![None; point_count],
        }
    }

    pub fn get(&self, point: usize) -> Option<Socket> {
        self.sockets.get(point).copied().flatten()
    }

    fn set(&mut self, point: usize, socket: Socket) {
        if let Some(slot) = self.sockets.get_mut(point) {
            *slot = Some(socket);
        }
    }
}

/// Scale factors applied to the top and bottom rows of a stretched strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Stretcher {
    pub top: f32,
    pub bottom: f32,
}

/// Strip geometry parameters shared by every segment drawn with one sprite.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StripMetrics {
    pub height: f32,
    pub pivot: f32,
}

/// Top and bottom boundary lines of a segment, from its end columns.
#[derive(Debug, Clone, Copy)]
struct BoundaryLines {
    left: Column,
    right: Column,
}

impl BoundaryLines {
    fn of(points: &[ControlPoint], seg: &Segment, metrics: StripMetrics) -> Option<Self> {
        let scp = points.get(seg.start)?;
        let ecp = points.get(seg.end)?;
        let left = start_column(scp, &scp.position, &ecp.position, metrics.height, metrics.pivot)?;
        let right = end_column(ecp, &ecp.position, &scp.position, metrics.height, metrics.pivot)?;
        Some(Self { left, right })
    }

    /// Both lines pushed far past the segment ends.
    fn extended(&self) -> Rails {
        Rails {
            top: extend_segment(&self.left.top, &self.right.top),
            bottom: extend_segment(&self.left.bottom, &self.right.bottom),
        }
    }
}

/// Extended top and bottom lines of a segment.
struct Rails {
    top: (Point2, Point2),
    bottom: (Point2, Point2),
}

fn junction(prev: &Rails, next: &Rails) -> Option<Socket> {
    let (a, b) = prev.top;
    let (c, d) = next.top;
    let top = line_intersection(EPSILON, &a, &b, &c, &d)?;
    let (a, b) = prev.bottom;
    let (c, d) = next.bottom;
    let bottom = line_intersection(EPSILON, &a, &b, &c, &d)?;
    Some(Socket { top, bottom })
}

/// Computes the stretch factors for segment `index`, if it needs any.
///
/// A side needs stretching when its control point is a stretched corner and
/// the neighboring segment on that side spans a single edge. On open shapes
/// the first and last control points never stretch.
pub(crate) fn fetch_stretcher(
    index: usize,
    segments: &[Segment],
    points: &[ControlPoint],
    closed: bool,
    metrics: StripMetrics,
    intersectors: &mut Intersectors,
) -> Option<Stretcher> {
    let seg = segments.get(index)?;
    let last = segments.len() - 1;
    let prev = &segments[if index == 0 { last } else { index - 1 }];
    let next = &segments[if index == last { 0 } else { index + 1 }];
    let scp = points.get(seg.start)?;
    let ecp = points.get(seg.end)?;

    let mut stretch_left = scp.corner == CornerMode::Stretched && prev.is_single_edge();
    let mut stretch_right = ecp.corner == CornerMode::Stretched && next.is_single_edge();
    if !closed {
        stretch_left &= seg.start != 0;
        stretch_right &= seg.end != points.len() - 1;
    }
    if !(stretch_left || stretch_right) {
        return None;
    }

    let own = BoundaryLines::of(points, seg, metrics)?;
    let own_ext = own.extended();
    let mut left = Socket {
        top: own.left.top,
        bottom: own.left.bottom,
    };
    let mut right = Socket {
        top: own.right.top,
        bottom: own.right.bottom,
    };

    let mut needs_left = false;
    if stretch_left {
        if let Some(cached) = intersectors.get(seg.start) {
            left = cached;
            needs_left = true;
        } else if scp.is_stretch() {
            let hit = BoundaryLines::of(points, prev, metrics)
                .and_then(|p| junction(&p.extended(), &own_ext));
            if let Some(socket) = hit {
                intersectors.set(seg.start, socket);
                left = socket;
                needs_left = true;
            }
        }
    }

    let mut needs_right = false;
    if stretch_right {
        if let Some(cached) = intersectors.get(seg.end) {
            right = cached;
            needs_right = true;
        } else if ecp.is_stretch() {
            let hit = BoundaryLines::of(points, next, metrics)
                .and_then(|n| junction(&own_ext, &n.extended()));
            if let Some(socket) = hit {
                intersectors.set(seg.end, socket);
                right = socket;
                needs_right = true;
            }
        }
    }

    if !(needs_left || needs_right) {
        return None;
    }
    let m = (own.left.midpoint() - own.right.midpoint()).norm();
    if m < EPSILON {
        return None;
    }
    Some(Stretcher {
        top: (left.top - right.top).norm() / m,
        bottom: (left.bottom - right.bottom).norm() / m,
    })
}

/// Rescales a segment's quads so its ends land on the cached junctions.
///
/// The head-cap quad, if any, is left alone.
pub(crate) fn stretch_corners(
    quads: &mut [Quad],
    seg: &Segment,
    valid_head: bool,
    stretcher: Stretcher,
    intersectors: &Intersectors,
) {
    let first = usize::from(valid_head);
    let Some(last) = quads.len().checked_sub(1) else {
        return;
    };
    if first > last {
        return;
    }

    let origin_top = quads[first].positions[0];
    let origin_bottom = quads[first].positions[2];
    let (lt, lb) = intersectors
        .get(seg.start)
        .map_or((origin_top, origin_bottom), |s| (s.top, s.bottom));
    let (rt, rb) = intersectors.get(seg.end).map_or(
        (quads[last].positions[1], quads[last].positions[3]),
        |s| (s.top, s.bottom),
    );

    for quad in &mut quads[first..] {
        for v in 0..2 {
            quad.positions[v] = lt + (quad.positions[v] - origin_top) * stretcher.top;
        }
        for v in 2..4 {
            quad.positions[v] = lb + (quad.positions[v] - origin_bottom) * stretcher.bottom;
        }
    }

    quads[first].positions[0] = lt;
    quads[first].positions[2] = lb;
    quads[last].positions[1] = rt;
    quads[last].positions[3] = rb;
}
