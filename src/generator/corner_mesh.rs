use tracing::debug;

use super::corners::CornerInfo;
use super::prepare::SpriteSet;
use crate::buffers::{Drawcall, OutputBuffers};
use crate::error::Result;
use crate::math::{Point2, Point3, Vector4};
use crate::shape::CornerType;

const CORNER_TANGENT: Vector4 = Vector4::new(1.0, 0.0, 0.0, -1.0);

/// Sprite-local UVs of a corner quad, in the order right, top, bottom, left.
const CORNER_UVS: [[(f32, f32); 4]; 8] = [
    [(1.0, 1.0), (0.0, 1.0), (1.0, 0.0), (0.0, 0.0)],
    [(1.0, 0.0), (1.0, 1.0), (0.0, 0.0), (0.0, 1.0)],
    [(0.0, 1.0), (0.0, 0.0), (1.0, 1.0), (1.0, 0.0)],
    [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
    [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)],
    [(0.0, 1.0), (1.0, 1.0), (0.0, 0.0), (1.0, 0.0)],
    [(1.0, 0.0), (0.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
    [(1.0, 1.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)],
];

const RIGHT: usize = 0;
const TOP: usize = 1;
const BOTTOM: usize = 2;
const LEFT: usize = 3;

/// Emits one quad per synthesized corner, batched into a drawcall per type.
///
/// Drawcall sprite ids continue after the edge sprites: corner slot `s` is
/// drawn as `edge_count + s`.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) fn tessellate_corners(
    corners: &[CornerInfo],
    sprites: &SpriteSet,
    out: &mut OutputBuffers,
) -> Result<()> {
    let z = out.positions.first().map_or(0.0, |p| p.z);

    for ct in CornerType::ALL {
        let Some(sprite) = sprites.corner(ct) else {
            continue;
        };
        let batch: Vec<&CornerInfo> = corners.iter().filter(|c| c.corner == ct).collect();
        if batch.is_empty() {
            continue;
        }

        let vertex_offset = out.vertex_count();
        let index_offset = out.indices.len();
        out.positions.ensure_room(batch.len() * 4)?;
        out.indices.ensure_room(batch.len() * 6)?;

        let uvs = CORNER_UVS[ct.slot()];
        let ccw = ct.is_outer();
        for (k, corner) in batch.iter().enumerate() {
            let quad: [(Point2, usize); 4] = [
                (corner.top, TOP),
                (corner.right, RIGHT),
                (corner.left, LEFT),
                (corner.bottom, BOTTOM),
            ];
            for (p, uv_slot) in quad {
                let (u, v) = uvs[uv_slot];
                out.push_vertex(Point3::new(p.x, p.y, z), sprite.map_uv(u, v), CORNER_TANGENT)?;
            }
            let b = k * 4;
            let (i1, i2) = if ccw { (1, 3) } else { (3, 1) };
            let (i4, i5) = if ccw { (3, 2) } else { (2, 3) };
            out.push_triangle([b, b + i1, b + i2])?;
            out.push_triangle([b, b + i4, b + i5])?;
        }

        out.drawcalls.push(Drawcall {
            geom_index: out.drawcalls.len(),
            index_offset,
            index_count: out.indices.len() - index_offset,
            vertex_offset,
            vertex_count: out.vertex_count() - vertex_offset,
            sprite_id: (sprites.edges.len() + ct.slot()) as i32,
        })?;
        debug!(corner = ?ct, quads = batch.len(), "corner quads emitted");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::buffers::BufferCapacity;
    use crate::shape::{SpriteDesc, SpriteTables};

    fn corner(ct: CornerType) -> CornerInfo {
        CornerInfo {
            corner: ct,
            top: Point2::new(1.0, 1.0),
            bottom: Point2::new(0.0, 0.0),
            left: Point2::new(0.0, 1.0),
            right: Point2::new(1.0, 0.0),
            end_point: 2,
        }
    }

    fn sprites() -> SpriteSet {
        let sprite = SpriteDesc::full_texture(64.0, 64.0, 64.0);
        let tables = SpriteTables::new(vec![Some(sprite), Some(sprite)])
            .with_corner(CornerType::OuterTopLeft, sprite)
            .with_corner(CornerType::InnerTopLeft, sprite);
        SpriteSet::from_tables(&tables).unwrap()
    }

    #[test]
    fn one_drawcall_per_corner_type() {
        let corners = [
            corner(CornerType::OuterTopLeft),
            corner(CornerType::InnerTopLeft),
            corner(CornerType::OuterTopLeft),
        ];
        let mut out = OutputBuffers::with_capacity(BufferCapacity::from_estimate(64, 4));
        tessellate_corners(&corners, &sprites(), &mut out).unwrap();
        assert_eq!(out.drawcalls.len(), 2);
        assert_eq!(out.drawcalls[0].vertex_count, 8);
        assert_eq!(out.drawcalls[0].sprite_id, 2);
        assert_eq!(out.drawcalls[1].sprite_id, 6);
        assert_eq!(out.indices.len(), 18);
    }

    #[test]
    fn winding_flips_for_inner_corners() {
        let mut out = OutputBuffers::with_capacity(BufferCapacity::from_estimate(64, 4));
        tessellate_corners(&[corner(CornerType::OuterTopLeft)], &sprites(), &mut out).unwrap();
        assert_eq!(out.indices.as_slice(), &[0, 1, 3, 0, 3, 2]);

        let mut out = OutputBuffers::with_capacity(BufferCapacity::from_estimate(64, 4));
        tessellate_corners(&[corner(CornerType::InnerTopLeft)], &sprites(), &mut out).unwrap();
        assert_eq!(out.indices.as_slice(), &[0, 3, 1, 0, 2, 3]);
    }

    #[test]
    fn uvs_follow_corner_table() {
        let mut out = OutputBuffers::with_capacity(BufferCapacity::from_estimate(64, 4));
        tessellate_corners(&[corner(CornerType::OuterTopLeft)], &sprites(), &mut out).unwrap();
        // Top vertex of an outer top-left corner samples (0, 1).
        assert_relative_eq!(out.uvs[0], Point2::new(0.0, 1.0));
        assert_relative_eq!(out.uvs[1], Point2::new(1.0, 1.0));
        assert!(out.tangents.iter().all(|t| *t == CORNER_TANGENT));
    }

    #[test]
    fn corners_without_sprites_are_dropped() {
        let mut out = OutputBuffers::with_capacity(BufferCapacity::from_estimate(64, 4));
        tessellate_corners(&[corner(CornerType::OuterBottomRight)], &sprites(), &mut out).unwrap();
        assert!(out.drawcalls.is_empty());
        assert_eq!(out.vertex_count(), 0);
    }
}
