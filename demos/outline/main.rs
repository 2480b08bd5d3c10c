//! Outline demo: generates a cornered, filled island and prints what came out.
//!
//! Usage:
//! ```text
//! cargo run --example outline                      # square island
//! cargo run --example outline -- hill              # open curved strip
//! RUST_LOG=shapemesh=trace cargo run --example outline
//! ```

use shapemesh::estimate::max_array_count;
use shapemesh::math::Vector2;
use shapemesh::shape::{
    AngleRangeDesc, Border, CornerType, ShapePoint, SpriteDesc, SpriteTables, TangentMode,
};
use shapemesh::{
    BufferCapacity, FillTexture, GeneratorOptions, OutputBuffers, ShapeError, ShapeGenerator,
    ShapeParams,
};

fn island() -> (Vec<ShapePoint>, ShapeParams) {
    let points = [(0.0, 0.0), (6.0, 0.0), (6.0, 3.0), (0.0, 3.0)]
        .iter()
        .map(|&(x, y)| ShapePoint::new(x, y))
        .collect();
    let params = ShapeParams {
        fill_texture: Some(FillTexture {
            width: 256.0,
            height: 256.0,
        }),
        ..ShapeParams::default()
    };
    (points, params)
}

fn hill() -> (Vec<ShapePoint>, ShapeParams) {
    let points = vec![
        ShapePoint::new(0.0, 0.0),
        ShapePoint::new(4.0, 2.0)
            .with_mode(TangentMode::Continuous)
            .with_tangents(Vector2::new(-1.5, 0.0), Vector2::new(1.5, 0.0))
            .with_height(1.5),
        ShapePoint::new(8.0, 0.0),
    ];
    let params = ShapeParams {
        closed: false,
        ..ShapeParams::default()
    };
    (points, params)
}

fn sprites() -> SpriteTables {
    let edge = SpriteDesc::full_texture(128.0, 64.0, 64.0).with_border(Border {
        left: 16.0,
        bottom: 0.0,
        right: 16.0,
        top: 0.0,
    });
    let corner = SpriteDesc::full_texture(64.0, 64.0, 64.0);
    CornerType::ALL
        .iter()
        .fold(SpriteTables::new(vec![Some(edge)]), |t, &ct| {
            t.with_corner(ct, corner)
        })
}

fn main() -> Result<(), ShapeError> {
    // Default: WARN for everything, DEBUG for the generator.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("shapemesh=debug".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let (points, params) = match std::env::args().nth(1).as_deref() {
        Some("hill") => hill(),
        _ => island(),
    };
    let tables = sprites();
    let ranges = [AngleRangeDesc::new(-180.0, 180.0, 1)];
    let options = GeneratorOptions::default();

    let count = max_array_count(&points, &tables, &params, &options);
    let mut out = OutputBuffers::with_capacity(BufferCapacity::from_estimate(count, points.len()));
    let summary = ShapeGenerator::new(&points, &tables, &ranges, params)
        .with_options(options)
        .execute(&mut out)?;

    println!(
        "control points: {}  corners: {}  segments: {}",
        summary.control_points,
        summary.corners,
        summary.segments.len()
    );
    for (i, seg) in summary.segments.iter().enumerate() {
        println!(
            "  segment {i}: points {}..{} sprite {:?} length {:.3}",
            seg.start, seg.end, seg.sprite, seg.length
        );
    }
    for dc in out.drawcalls.iter() {
        println!(
            "  drawcall {}: sprite {} vertices {} indices {}",
            dc.geom_index, dc.sprite_id, dc.vertex_count, dc.index_count
        );
    }
    println!(
        "vertices: {}  indices: {}  collider points: {}",
        out.vertex_count(),
        out.indices.len(),
        out.collider_outline().len()
    );
    println!("bounds: {:?} .. {:?}", out.bounds.min, out.bounds.max);
    Ok(())
}
