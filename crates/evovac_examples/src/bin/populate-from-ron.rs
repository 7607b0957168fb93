use std::sync::Arc;

use evovac::config::load_spawn_setup;
use evovac::prelude::*;
use evovac_examples::{init_tracing, render_world_to_png, RenderConfig};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/spawn_table.ron");
    let setup = load_spawn_setup(path)?;
    let max_distance = setup.config.max_spawn_distance;
    let safe_radius = setup.config.safe_radius;

    let mut engine = setup.into_engine(Some(make_terrain()))?;
    let mut rng = StdRng::seed_from_u64(2024);
    let report = engine.populate(1500, &mut rng);
    println!(
        "spawned {}/{} ({} placement failures, {} without archetype)",
        report.spawned, report.requested, report.placement_failures, report.missing_archetype
    );
    SpawnStatistics::collect(engine.store(), engine.hub(), max_distance, 6).log();

    let render = RenderConfig::new((1000, 1000), max_distance * 1.1)
        .with_rings([safe_radius, max_distance]);
    render_world_to_png(
        engine.store(),
        engine.sampler().zones(),
        engine.hub(),
        &render,
        "populate-from-ron.png",
    )?;
    Ok(())
}

fn make_terrain() -> Arc<dyn Terrain> {
    let half = 200.0;
    let cells = 100;
    let cell_size = 2.0 * half / cells as f32;
    match HeightGrid::from_fn(Vec2::splat(-half), cell_size, cells + 1, cells + 1, |x, z| {
        (x * 0.04).sin() * 4.0 + (z * 0.02).cos() * 6.0
    }) {
        Some(grid) => Arc::new(grid),
        None => Arc::new(FlatTerrain::centered(half)),
    }
}
