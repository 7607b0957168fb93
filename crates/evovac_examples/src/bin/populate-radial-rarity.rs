use std::sync::Arc;

use evovac::prelude::*;
use evovac_examples::{init_tracing, render_world_to_png, RenderConfig};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = SpawnConfig::new()
        .with_hub(Vec3::ZERO)
        .with_safe_radius(20.0)
        .with_max_spawn_distance(200.0);
    let terrain: Arc<dyn Terrain> = Arc::new(FlatTerrain::centered(220.0));

    let mut engine = DistributionEngine::try_new(config, make_table(), Some(terrain))?;
    let mut rng = StdRng::seed_from_u64(7);
    let report = engine.populate(2000, &mut rng);
    println!(
        "spawned {}/{} in {} draws",
        report.spawned, report.requested, report.attempts
    );

    let stats = SpawnStatistics::collect(engine.store(), engine.hub(), 200.0, 10);
    stats.log();

    let render = RenderConfig::new((1000, 1000), 220.0).with_rings([20.0, 200.0]);
    render_world_to_png(
        engine.store(),
        engine.sampler().zones(),
        engine.hub(),
        &render,
        "populate-radial-rarity.png",
    )?;
    Ok(())
}

fn make_table() -> SpawnTable {
    let mut table = SpawnTable::new()
        .with_tier(Rarity::Common, 0.6)
        .with_tier(Rarity::Uncommon, 0.25)
        .with_tier(Rarity::Rare, 0.1)
        .with_tier(Rarity::Epic, 0.05)
        .with_default_curves(200.0);
    for (id, rarity) in [
        ("bottle", Rarity::Common),
        ("can", Rarity::Common),
        ("tire", Rarity::Uncommon),
        ("radio", Rarity::Rare),
        ("meteorite", Rarity::Epic),
    ] {
        table.register_archetype(Archetype::new(id, rarity));
    }
    table
}
