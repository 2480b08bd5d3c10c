//! Worst-case output sizing, run before buffers are allocated.

use crate::buffers::MAX_ARRAY_COUNT;
use crate::config::{GeneratorOptions, ShapeParams};
use crate::math::polygon_2d::bezier_point;
use crate::math::{Vector2, EPSILON};
use crate::shape::{ShapePoint, SpriteDesc, SpriteTables, TangentMode};

/// Starting value for the smallest sprite width search.
const NO_SPRITE_WIDTH: f32 = 99_999.0;

/// Content width of a sprite in world units, excluding its borders.
fn content_width(sprite: &SpriteDesc) -> f32 {
    let ppu = sprite.pixels_per_unit;
    (sprite.rect_size.x - sprite.border.left - sprite.border.right) / ppu
}

/// Bezier length of the open outline and the shortest sample step seen.
#[allow(clippy::cast_precision_loss)]
fn bezier_length(points: &[ShapePoint], detail: usize, smallest: &mut f32) -> f32 {
    let fmax = detail.saturating_sub(1).max(1) as f32;
    let tangent = |p: &ShapePoint, t: Vector2| {
        if p.mode == TangentMode::Linear {
            Vector2::zeros()
        } else {
            t
        }
    };

    let mut length = 0.0;
    for pair in points.windows(2) {
        let (cp, np) = (&pair[0], &pair[1]);
        let p0 = cp.position;
        let p1 = np.position;
        let c0 = p0 + tangent(cp, cp.right_tangent);
        let c1 = p1 + tangent(np, np.left_tangent);
        let mut prev = p0;
        for n in 1..detail {
            let bp = bezier_point(&p0, &c0, &c1, &p1, n as f32 / fmax);
            let d = (bp - prev).norm();
            *smallest = smallest.min(d);
            length += d;
            prev = bp;
        }
    }
    length
}

/// Estimates the element count every output buffer must hold.
///
/// The estimate accounts for one tile per smallest sprite width along four
/// times the outline length, plus fill and corner headroom. The result is
/// capped at [`MAX_ARRAY_COUNT`].
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn max_array_count(
    points: &[ShapePoint],
    sprites: &SpriteTables,
    params: &ShapeParams,
    options: &GeneratorOptions,
) -> usize {
    let detail = params.spline_detail.max(4);

    let mut smallest = NO_SPRITE_WIDTH;
    let mut has_sprites = false;
    for sprite in sprites.edges.iter().chain(&sprites.corners).flatten() {
        has_sprites = true;
        smallest = smallest.min(content_width(sprite));
    }

    let length = bezier_length(points, detail, &mut smallest) * 4.0;
    let mut shape = points.len() * 4 * detail;
    let width = if has_sprites {
        (length / smallest.max(EPSILON)) as usize * detail + shape
    } else {
        0
    };
    if !options.optimize_geometry {
        shape *= 2;
    }
    if params.fill_texture.is_none() {
        shape = 0;
    }

    shape.saturating_add(width).min(MAX_ARRAY_COUNT)
}
