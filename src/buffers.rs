//! Caller-owned, fixed-capacity output buffers.
//!
//! Buffers are sized once before a regeneration and never grow while the
//! generator writes into them. Every push is checked against the declared
//! capacity and overruns surface as [`CapacityError::Exceeded`].

use crate::error::{BufferKind, CapacityError};
use crate::math::{Point2, Point3, Vector2, Vector4};

/// Largest element count any single buffer may be sized to.
pub const MAX_ARRAY_COUNT: usize = 65_536;

/// A vector that refuses to grow past a fixed capacity.
#[derive(Debug, Clone)]
pub struct FixedBuffer<T> {
    kind: BufferKind,
    capacity: usize,
    items: Vec<T>,
}

impl<T> FixedBuffer<T> {
    #[must_use]
    pub fn with_capacity(kind: BufferKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Appends an element.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::Exceeded`] if the buffer is full.
    pub fn push(&mut self, item: T) -> Result<(), CapacityError> {
        self.ensure_room(1)?;
        self.items.push(item);
        Ok(())
    }

    /// Checks that `additional` more elements fit.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::Exceeded`] if they do not.
    pub fn ensure_room(&self, additional: usize) -> Result<(), CapacityError> {
        let required = self.items.len() + additional;
        if required > self.capacity {
            return Err(CapacityError::Exceeded {
                buffer: self.kind,
                required,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> std::ops::Deref for FixedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

/// One entry of the drawcall table.
///
/// Entry 0 is always the fill. Entries `1..=segments` are edge segments and
/// the remaining entries are corner quads. Index values are local to the
/// drawcall's vertex range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Drawcall {
    pub geom_index: usize,
    pub index_offset: usize,
    pub index_count: usize,
    pub vertex_offset: usize,
    pub vertex_count: usize,
    /// Sprite drawn by this call; `-1` for the fill.
    pub sprite_id: i32,
}

/// Axis-aligned bounding box in local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point2,
    pub max: Point2,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Point2::origin(),
            max: Point2::origin(),
        }
    }
}

impl Aabb {
    /// Returns an inverted box that any point will expand.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f32::MAX, f32::MAX),
            max: Point2::new(f32::MIN, f32::MIN),
        }
    }

    pub fn expand(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    #[must_use]
    pub fn extent(&self) -> Vector2 {
        self.max - self.min
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Element budget for each output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCapacity {
    pub vertices: usize,
    pub indices: usize,
    pub drawcalls: usize,
    pub collider: usize,
}

impl BufferCapacity {
    /// Sizes buffers from a [`crate::estimate::max_array_count`] result.
    ///
    /// Indices get twice the vertex budget since every quad emits six
    /// indices for four vertices. The drawcall table reserves eight entries
    /// per control point.
    #[must_use]
    pub fn from_estimate(max_array_count: usize, point_count: usize) -> Self {
        let count = max_array_count.min(MAX_ARRAY_COUNT);
        Self {
            vertices: count,
            indices: count * 2,
            drawcalls: point_count * 8,
            collider: count,
        }
    }
}

/// Output of one regeneration.
#[derive(Debug, Clone)]
pub struct OutputBuffers {
    pub positions: FixedBuffer<Point3>,
    pub uvs: FixedBuffer<Point2>,
    pub tangents: FixedBuffer<Vector4>,
    pub indices: FixedBuffer<u16>,
    pub drawcalls: FixedBuffer<Drawcall>,
    /// Collider outline terminated by two zero points.
    pub collider: FixedBuffer<Point2>,
    pub bounds: Aabb,
}

impl OutputBuffers {
    #[must_use]
    pub fn with_capacity(capacity: BufferCapacity) -> Self {
        Self {
            positions: FixedBuffer::with_capacity(BufferKind::Vertices, capacity.vertices),
            uvs: FixedBuffer::with_capacity(BufferKind::Vertices, capacity.vertices),
            tangents: FixedBuffer::with_capacity(BufferKind::Vertices, capacity.vertices),
            indices: FixedBuffer::with_capacity(BufferKind::Indices, capacity.indices),
            drawcalls: FixedBuffer::with_capacity(BufferKind::Drawcalls, capacity.drawcalls),
            collider: FixedBuffer::with_capacity(BufferKind::Collider, capacity.collider),
            bounds: Aabb::default(),
        }
    }

    /// Appends one vertex to the three parallel vertex channels.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::Exceeded`] if the vertex buffers are full.
    pub fn push_vertex(
        &mut self,
        position: Point3,
        uv: Point2,
        tangent: Vector4,
    ) -> Result<(), CapacityError> {
        self.positions.ensure_room(1)?;
        self.uvs.ensure_room(1)?;
        self.tangents.ensure_room(1)?;
        self.positions.push(position)?;
        self.uvs.push(uv)?;
        self.tangents.push(tangent)
    }

    /// Appends a triangle of drawcall-local vertex indices.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::Exceeded`] if the index buffer is full or a
    /// local index does not fit in 16 bits.
    pub fn push_triangle(&mut self, triangle: [usize; 3]) -> Result<(), CapacityError> {
        self.indices.ensure_room(3)?;
        let mut local = [0u16; 3];
        for (slot, i) in local.iter_mut().zip(triangle) {
            *slot = u16::try_from(i).map_err(|_| CapacityError::Exceeded {
                buffer: BufferKind::Indices,
                required: i + 1,
                capacity: usize::from(u16::MAX) + 1,
            })?;
        }
        for i in local {
            self.indices.push(i)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Collider points before the zero-zero terminator.
    #[must_use]
    pub fn collider_outline(&self) -> &[Point2] {
        let pts = self.collider.as_slice();
        let end = pts
            .windows(2)
            .position(|w| w[0] == Point2::origin() && w[1] == Point2::origin())
            .unwrap_or(pts.len());
        &pts[..end]
    }

    /// Empties every buffer, keeping capacities.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.uvs.clear();
        self.tangents.clear();
        self.indices.clear();
        self.drawcalls.clear();
        self.collider.clear();
        self.bounds = Aabb::default();
    }
}
