#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use shapemesh::error::{InputError, ShapeError};
use shapemesh::estimate::max_array_count;
use shapemesh::math::Point2;
use shapemesh::shape::{
    AngleRangeDesc, Border, CornerType, ShapePoint, SpriteDesc, SpriteTables, TangentMode,
};
use shapemesh::{
    BufferCapacity, FillTexture, GeneratorOptions, OutputBuffers, ShapeGenerator, ShapeParams,
};

const FULL_CIRCLE: [AngleRangeDesc; 1] = [AngleRangeDesc {
    start: -180.0,
    end: 180.0,
    order: 0,
    sprite_count: 1,
}];

fn unit_sprite() -> SpriteDesc {
    SpriteDesc::full_texture(100.0, 100.0, 100.0)
}

fn cornered_tables() -> SpriteTables {
    let mut tables = SpriteTables::new(vec![Some(unit_sprite())]);
    for ct in CornerType::ALL {
        tables = tables.with_corner(ct, unit_sprite());
    }
    tables
}

fn square() -> Vec<ShapePoint> {
    [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]
        .iter()
        .map(|&(x, y)| ShapePoint::new(x, y))
        .collect()
}

fn filled() -> ShapeParams {
    ShapeParams {
        fill_texture: Some(FillTexture {
            width: 64.0,
            height: 64.0,
        }),
        ..ShapeParams::default()
    }
}

fn buffers_for(points: &[ShapePoint], tables: &SpriteTables, params: &ShapeParams) -> OutputBuffers {
    let count = max_array_count(points, tables, params, &GeneratorOptions::default());
    OutputBuffers::with_capacity(BufferCapacity::from_estimate(count, points.len()))
}

fn triangle_area(out: &OutputBuffers, drawcall: usize) -> f32 {
    let dc = out.drawcalls[drawcall];
    let idx = &out.indices[dc.index_offset..dc.index_offset + dc.index_count];
    idx.chunks(3)
        .map(|t| {
            let p = |i: u16| out.positions[dc.vertex_offset + usize::from(i)].xy();
            let (a, b, c) = (p(t[0]), p(t[1]), p(t[2]));
            ((b - a).perp(&(c - a)) * 0.5).abs()
        })
        .sum()
}

fn assert_well_formed(out: &OutputBuffers) {
    assert_eq!(out.positions.len(), out.uvs.len());
    assert_eq!(out.positions.len(), out.tangents.len());
    for dc in out.drawcalls.iter() {
        assert_eq!(dc.index_count % 3, 0);
        let idx = &out.indices[dc.index_offset..dc.index_offset + dc.index_count];
        assert!(idx.iter().all(|&i| usize::from(i) < dc.vertex_count));
    }
    let collider = out.collider.as_slice();
    assert!(collider.len() >= 2);
    assert_eq!(collider[collider.len() - 1], Point2::origin());
    assert_eq!(collider[collider.len() - 2], Point2::origin());
}

#[test]
fn straight_open_run_is_one_quad() {
    let points: Vec<ShapePoint> = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]
        .iter()
        .map(|&(x, y)| ShapePoint::new(x, y).with_mode(TangentMode::Continuous))
        .collect();
    let tables = SpriteTables::new(vec![Some(SpriteDesc::full_texture(300.0, 100.0, 100.0))]);
    let params = ShapeParams {
        closed: false,
        ..ShapeParams::default()
    };
    let mut out = buffers_for(&points, &tables, &params);

    let summary = ShapeGenerator::new(&points, &tables, &FULL_CIRCLE, params)
        .execute(&mut out)
        .unwrap();

    assert_eq!(summary.segments.len(), 1);
    assert_eq!(summary.corners, 0);
    assert_eq!(out.vertex_count(), 4);
    assert_eq!(out.indices.len(), 6);
    assert_eq!(out.drawcalls.len(), 2);
    assert_eq!(out.drawcalls[0].vertex_count, 0);
    assert_relative_eq!(out.bounds.min, Point2::new(0.0, -0.5), epsilon = 1e-4);
    assert_relative_eq!(out.bounds.max, Point2::new(3.0, 0.5), epsilon = 1e-4);
    assert_well_formed(&out);
}

#[test]
fn square_gets_corner_quads() {
    let points = square();
    let tables = cornered_tables();
    let params = filled();
    let mut out = buffers_for(&points, &tables, &params);

    let summary = ShapeGenerator::new(&points, &tables, &FULL_CIRCLE, params)
        .execute(&mut out)
        .unwrap();

    assert_eq!(summary.corners, 4);
    assert_eq!(summary.control_points, 9);
    assert_eq!(summary.segments.len(), 4);
    assert!(summary.segments.iter().all(|s| s.sprite == Some(0)));

    let edge_calls = 1 + summary.segments.len();
    for (i, dc) in out.drawcalls[1..edge_calls].iter().enumerate() {
        assert_eq!(dc.geom_index, i + 1);
        assert!(dc.vertex_count > 0);
        assert_eq!(dc.vertex_count % 4, 0);
        assert_eq!(dc.index_count, dc.vertex_count / 4 * 6);
    }
    let corner_vertices: usize = out.drawcalls[edge_calls..]
        .iter()
        .map(|dc| dc.vertex_count)
        .sum();
    assert_eq!(corner_vertices, 16);
    assert!(out.drawcalls[edge_calls..].iter().all(|dc| dc.sprite_id >= 1));

    assert_relative_eq!(out.bounds.min, Point2::new(-0.5, -0.5), epsilon = 1e-2);
    assert_relative_eq!(out.bounds.max, Point2::new(4.5, 4.5), epsilon = 1e-2);
    assert_well_formed(&out);
}

#[test]
fn closed_fill_covers_the_outline() {
    let points = square();
    let tables = cornered_tables();
    let params = filled();
    let mut out = buffers_for(&points, &tables, &params);

    ShapeGenerator::new(&points, &tables, &FULL_CIRCLE, params)
        .execute(&mut out)
        .unwrap();

    let fill = out.drawcalls[0];
    assert_eq!(fill.sprite_id, -1);
    assert!(fill.index_count > 0);
    // The square minus four mitered corners with half-unit legs.
    assert_relative_eq!(triangle_area(&out, 0), 15.5, epsilon = 2e-2);
}

#[test]
fn every_closed_edge_is_covered_once() {
    let points = square();
    let tables = cornered_tables();
    let params = ShapeParams {
        corner_angle_threshold: 0.0,
        ..filled()
    };
    let mut out = buffers_for(&points, &tables, &params);

    let summary = ShapeGenerator::new(&points, &tables, &FULL_CIRCLE, params)
        .execute(&mut out)
        .unwrap();

    assert_eq!(summary.corners, 0);
    assert_eq!(summary.control_points, 5);
    let mut covered = vec![0; summary.control_points - 1];
    for s in &summary.segments {
        for e in s.start..s.end {
            covered[e] += 1;
        }
    }
    assert!(covered.iter().all(|&c| c == 1), "{covered:?}");
    assert!(summary
        .segments
        .iter()
        .all(|s| (s.length - 4.0).abs() < 1e-3));
}

#[test]
fn regeneration_is_idempotent() {
    let points = square();
    let tables = cornered_tables();
    let params = filled();
    let generator = ShapeGenerator::new(&points, &tables, &FULL_CIRCLE, params);
    let mut out = buffers_for(&points, &tables, &params);

    let first = generator.execute(&mut out).unwrap();
    let positions = out.positions.as_slice().to_vec();
    let indices = out.indices.as_slice().to_vec();
    let collider = out.collider.as_slice().to_vec();
    let bounds = out.bounds;

    let second = generator.execute(&mut out).unwrap();
    assert_eq!(first, second);
    assert_eq!(out.positions.as_slice(), positions.as_slice());
    assert_eq!(out.indices.as_slice(), indices.as_slice());
    assert_eq!(out.collider.as_slice(), collider.as_slice());
    assert_eq!(out.bounds, bounds);
}

#[test]
fn collider_is_terminated_and_non_degenerate() {
    let points = square();
    let tables = cornered_tables();
    let params = filled();
    let mut out = buffers_for(&points, &tables, &params);

    ShapeGenerator::new(&points, &tables, &FULL_CIRCLE, params)
        .execute(&mut out)
        .unwrap();

    assert!(out.collider_outline().len() >= 4);
    assert!(out.collider.len() <= out.collider.capacity());
    assert_well_formed(&out);
}

#[test]
fn collider_can_be_disabled() {
    let points = square();
    let tables = cornered_tables();
    let params = filled();
    let options = GeneratorOptions {
        update_collider: false,
        ..GeneratorOptions::default()
    };
    let mut out = buffers_for(&points, &tables, &params);

    ShapeGenerator::new(&points, &tables, &FULL_CIRCLE, params)
        .with_options(options)
        .execute(&mut out)
        .unwrap();

    assert_eq!(out.collider.as_slice(), &[Point2::origin(), Point2::origin()]);
}

#[test]
fn unmatched_ranges_degrade_to_skipped_segments() {
    let points: Vec<ShapePoint> = [(0.0, 0.0), (4.0, 0.0), (5.0, 3.0), (2.0, 5.0), (-1.0, 3.0)]
        .iter()
        .map(|&(x, y)| ShapePoint::new(x, y))
        .collect();
    let tables = cornered_tables();
    let ranges = [AngleRangeDesc::new(10.0, 20.0, 1)];
    let params = filled();
    let mut out = buffers_for(&points, &tables, &params);

    let summary = ShapeGenerator::new(&points, &tables, &ranges, params)
        .execute(&mut out)
        .unwrap();

    assert_eq!(summary.corners, 0);
    assert!(summary.segments.iter().all(|s| s.sprite.is_none()));
    for dc in &out.drawcalls[1..] {
        assert_eq!(dc.vertex_count, 0);
        assert_eq!(dc.sprite_id, -1);
    }
    assert!(out.drawcalls[0].index_count > 0);
    assert!(out.collider_outline().len() >= 4);
    assert_well_formed(&out);
}

#[test]
fn too_few_points_is_rejected() {
    let points = [ShapePoint::new(0.0, 0.0), ShapePoint::new(1.0, 0.0)];
    let tables = cornered_tables();
    let mut out = OutputBuffers::with_capacity(BufferCapacity::from_estimate(256, 8));

    let err = ShapeGenerator::new(&points, &tables, &FULL_CIRCLE, ShapeParams::default())
        .execute(&mut out)
        .unwrap_err();

    assert!(matches!(
        err,
        ShapeError::Input(InputError::TooFewPoints {
            count: 2,
            required: 3
        })
    ));
}

#[test]
fn borders_without_content_are_rejected() {
    let points = [ShapePoint::new(0.0, 0.0), ShapePoint::new(3.0, 0.0)];
    let sprite = unit_sprite().with_border(Border {
        left: 50.0,
        bottom: 0.0,
        right: 50.0,
        top: 0.0,
    });
    let tables = SpriteTables::new(vec![Some(sprite)]);
    let params = ShapeParams {
        closed: false,
        ..ShapeParams::default()
    };
    let mut out = OutputBuffers::with_capacity(BufferCapacity::from_estimate(1024, 8));

    let err = ShapeGenerator::new(&points, &tables, &FULL_CIRCLE, params)
        .execute(&mut out)
        .unwrap_err();

    assert!(matches!(
        err,
        ShapeError::Input(InputError::InvalidBorders { sprite: 0 })
    ));
    assert_eq!(out.vertex_count(), 0);
}

#[test]
fn undersized_buffers_fail_cleanly() {
    let points = square();
    let tables = cornered_tables();
    let cap = BufferCapacity {
        vertices: 8,
        indices: 12,
        drawcalls: 32,
        collider: 64,
    };
    let mut out = OutputBuffers::with_capacity(cap);

    let err = ShapeGenerator::new(&points, &tables, &FULL_CIRCLE, filled())
        .execute(&mut out)
        .unwrap_err();

    assert!(matches!(err, ShapeError::Capacity(_)));
    assert_eq!(out.vertex_count(), 0);
    assert!(out.indices.is_empty());
    assert!(out.drawcalls.is_empty());
    assert!(out.collider.is_empty());
}

#[test]
fn invalid_parameters_are_rejected() {
    let points = square();
    let tables = cornered_tables();
    let params = ShapeParams {
        fill_scale: -1.0,
        ..filled()
    };
    let mut out = buffers_for(&points, &tables, &filled());

    let err = ShapeGenerator::new(&points, &tables, &FULL_CIRCLE, params)
        .execute(&mut out)
        .unwrap_err();

    assert!(matches!(
        err,
        ShapeError::Input(InputError::InvalidParameter(_))
    ));
}
