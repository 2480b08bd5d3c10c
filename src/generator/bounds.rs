use tracing::trace;

use super::contour::ContourPoint;
use crate::buffers::{Aabb, OutputBuffers};
use crate::config::ShapeParams;
use crate::math::{Point2, Vector4, EPSILON};

/// Box around every emitted vertex and every contour sample.
///
/// Returns the default zero box when there is nothing to measure.
pub(crate) fn compute_bounds(out: &OutputBuffers, contour: &[ContourPoint]) -> Aabb {
    let mut bounds = Aabb::empty();
    for p in out.positions.as_slice() {
        bounds.expand(&p.xy());
    }
    for c in contour {
        bounds.expand(&c.position);
    }
    if bounds.is_valid() {
        bounds
    } else {
        Aabb::default()
    }
}

/// Writes fill UVs into the vertices of drawcall 0.
///
/// Stretch mode maps the bounds onto `[0, fill_scale]`. World mode projects
/// through `local_to_world` and tiles the fill texture every
/// `texture_size / fill_scale` units.
pub(crate) fn fill_tex_coords(out: &mut OutputBuffers, params: &ShapeParams) {
    let Some(fill) = params.fill_texture else {
        return;
    };
    let Some(dc) = out.drawcalls.first().copied() else {
        return;
    };
    let range = dc.vertex_offset..dc.vertex_offset + dc.vertex_count;
    let bounds = out.bounds;

    let uv_of = |x: f32, y: f32, z: f32| -> Point2 {
        if params.stretch_uv {
            let ext = bounds.extent();
            let axis = |v: f32, min: f32, len: f32| {
                if len.abs() < EPSILON {
                    0.0
                } else {
                    (v - min) / len * params.fill_scale
                }
            };
            Point2::new(axis(x, bounds.min.x, ext.x), axis(y, bounds.min.y, ext.y))
        } else {
            let w = params.local_to_world * Vector4::new(x, y, z, 1.0);
            Point2::new(
                w.x / (fill.width / params.fill_scale),
                w.y / (fill.height / params.fill_scale),
            )
        }
    };

    let positions = out.positions.as_slice();
    let uvs = out.uvs.as_mut_slice();
    for i in range {
        if let (Some(p), Some(uv)) = (positions.get(i), uvs.get_mut(i)) {
            *uv = uv_of(p.x, p.y, p.z);
        }
    }
    trace!(vertices = dc.vertex_count, stretch = params.stretch_uv, "fill uvs written");
}
