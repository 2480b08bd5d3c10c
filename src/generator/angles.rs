use tracing::trace;

use super::prepare::ControlPoint;
use crate::error::InputError;
use crate::math::polygon_2d::edge_slope_angle;
use crate::shape::AngleRangeDesc;

/// Render-order slots reserved per angle range.
pub(crate) const ORDER_STRIDE: f32 = 32.0;

/// An angle range in slope space (caller angles shifted by 90 degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AngleRange {
    pub start: f32,
    pub end: f32,
    pub first_sprite: usize,
    pub sprite_count: usize,
    pub order: i32,
}

impl AngleRange {
    /// Tests whether `angle` falls inside this range, wrapping at 360.
    pub fn contains(&self, angle: f32) -> bool {
        let span = self.end - self.start;
        let a = (angle - self.start).rem_euclid(360.0);
        a >= 0.0 && a <= span
    }
}

/// Result of mapping an edge slope to a sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Resolution {
    pub sprite: usize,
    pub first_sprite: usize,
    pub render_order: f32,
}

/// Builds slope-space ranges, assigning each range its run of edge sprites.
pub(crate) fn build_ranges(
    descs: &[AngleRangeDesc],
    edge_count: usize,
) -> Result<Vec<AngleRange>, InputError> {
    let mut ranges = Vec::with_capacity(descs.len());
    let mut first_sprite = 0;
    for desc in descs {
        if !desc.start.is_finite() || !desc.end.is_finite() {
            return Err(InputError::InvalidParameter(
                "angle range bounds must be finite".into(),
            ));
        }
        let (start, end) = if desc.start > desc.end {
            (desc.end, desc.start)
        } else {
            (desc.start, desc.end)
        };
        if desc.sprite_count > 0 && first_sprite + desc.sprite_count > edge_count {
            return Err(InputError::SpriteOutOfRange {
                index: first_sprite + desc.sprite_count - 1,
                count: edge_count,
            });
        }
        ranges.push(AngleRange {
            start: start + 90.0,
            end: end + 90.0,
            first_sprite,
            sprite_count: desc.sprite_count,
            order: desc.order,
        });
        first_sprite += desc.sprite_count;
    }
    Ok(ranges)
}

/// Finds the first range containing `angle` and picks the sprite variant.
///
/// `variant` is clamped to the range's last sprite. Ranges without sprites
/// never match.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn resolve_angle(ranges: &[AngleRange], angle: f32, variant: usize) -> Option<Resolution> {
    ranges
        .iter()
        .filter(|r| r.sprite_count > 0)
        .find(|r| r.contains(angle))
        .map(|r| {
            let index = variant.min(r.sprite_count - 1);
            Resolution {
                sprite: r.first_sprite + index,
                first_sprite: r.first_sprite,
                render_order: r.order as f32 * ORDER_STRIDE + index as f32,
            }
        })
}

/// Sprite picked for a control point's outgoing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SpriteSlot {
    pub sprite: usize,
    pub resolved: bool,
}

/// Resolves every edge, carrying the last sprite forward over misses.
pub(crate) fn resolve_sprite_slots(points: &[ControlPoint], ranges: &[AngleRange]) -> Vec<SpriteSlot> {
    let count = points.len();
    let mut active = 0;
    let mut slots = Vec::with_capacity(count);
    for (i, cp) in points.iter().enumerate() {
        let next = &points[(i + 1) % count];
        let angle = edge_slope_angle(&cp.position, &next.position);
        match resolve_angle(ranges, angle, cp.variant) {
            Some(res) => {
                active = res.sprite;
                slots.push(SpriteSlot {
                    sprite: active,
                    resolved: true,
                });
            }
            None => {
                trace!(point = i, angle, "edge slope matches no angle range");
                slots.push(SpriteSlot {
                    sprite: active,
                    resolved: false,
                });
            }
        }
    }
    slots
}
