use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};
use tracing::debug;

use crate::buffers::{Drawcall, OutputBuffers};
use crate::error::{Result, TessellationError};
use crate::math::{Point2, Point3, Vector4};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Tangent written to every fill vertex.
pub(crate) const FILL_TANGENT: Vector4 = Vector4::new(1.0, 0.0, 0.0, -1.0);

/// Triangulates the fill polygon and writes drawcall 0.
///
/// The drawcall is always written; it has zero counts when `points` is
/// `None` or describes fewer than three distinct points. Fill UVs are left
/// at the origin for the bounds pass to fill in.
///
/// # Errors
///
/// Returns an error if the triangulation rejects a point or an output buffer
/// runs out of room.
pub(crate) fn tessellate_fill(points: Option<&[Point2]>, out: &mut OutputBuffers) -> Result<()> {
    let vertex_offset = out.vertex_count();
    let index_offset = out.indices.len();

    if let Some(points) = points {
        let ring = match points {
            [first, .., last] if first == last => &points[..points.len() - 1],
            _ => points,
        };
        if ring.len() >= 3 {
            let cdt = build_cdt(ring)?;
            emit_interior(&cdt, out)?;
        }
    }

    let vertex_count = out.vertex_count() - vertex_offset;
    let index_count = out.indices.len() - index_offset;
    debug!(vertices = vertex_count, indices = index_count, "fill tessellated");
    out.drawcalls.push(Drawcall {
        geom_index: 0,
        index_offset,
        index_count,
        vertex_offset,
        vertex_count,
        sprite_id: -1,
    })?;
    Ok(())
}

fn build_cdt(ring: &[Point2]) -> Result<Cdt> {
    let mut cdt = Cdt::new();
    let mut handles = Vec::with_capacity(ring.len());
    for p in ring {
        let h = cdt
            .insert(SpadePoint2::new(f64::from(p.x), f64::from(p.y)))
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    // Splitting keeps self-touching outlines from tripping over crossing
    // constraints.
    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from != to {
            cdt.add_constraint_and_split(from, to, |v| v);
        }
    }
    Ok(cdt)
}

#[allow(clippy::cast_possible_truncation)]
fn emit_interior(cdt: &Cdt, out: &mut OutputBuffers) -> Result<()> {
    let interior = classify_interior_faces(cdt);
    let mut vertex_map: HashMap<usize, usize> = HashMap::new();

    for face in cdt.inner_faces() {
        if !interior.contains(&face.fix().index()) {
            continue;
        }
        let mut tri = [0usize; 3];
        for (slot, vh) in tri.iter_mut().zip(face.vertices()) {
            let idx = vh.fix().index();
            *slot = if let Some(&existing) = vertex_map.get(&idx) {
                existing
            } else {
                let pos = vh.position();
                let local = vertex_map.len();
                out.push_vertex(
                    Point3::new(pos.x as f32, pos.y as f32, 0.0),
                    Point2::origin(),
                    FILL_TANGENT,
                )?;
                vertex_map.insert(idx, local);
                local
            };
        }
        out.push_triangle(tri)?;
    }
    Ok(())
}

/// Flood-fills from the outer face; odd constraint-crossing depth is inside.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        let face = cdt.face(face_fix);
        for edge in face.adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let n_idx = neighbor.fix().index();
            if depth_map.contains_key(&n_idx) {
                continue;
            }
            let new_depth = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(n_idx, new_depth);
            if new_depth % 2 == 1 {
                interior.insert(n_idx);
            }
            queue.push_back((neighbor.fix(), new_depth));
        }
    }

    interior
}
