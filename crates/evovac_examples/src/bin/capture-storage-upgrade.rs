use std::sync::Arc;

use evovac::prelude::*;
use evovac_examples::init_tracing;
use glam::Vec3;

const FRAME_DT: f32 = 1.0 / 60.0;

/// Fill a tiny storage until an item bounces off, upgrade, and sell.
fn main() -> anyhow::Result<()> {
    init_tracing();
    let terrain: Arc<dyn Terrain> = Arc::new(FlatTerrain::centered(80.0));
    let table = SpawnTable::new()
        .with_tier(Rarity::Common, 1.0)
        .with_archetype(
            Archetype::new("tire", Rarity::Common)
                .with_weight(4.0)
                .with_storage_size(2)
                .with_sell_value(6),
        );
    let engine = DistributionEngine::try_new(
        SpawnConfig::new()
            .with_hub(Vec3::ZERO)
            .with_max_spawn_distance(60.0),
        table,
        Some(terrain.clone()),
    )?;
    let vacuum = Vacuum::try_new(CaptureConfig::default(), PoolLimits::new(4, 50.0, 100.0))?;
    let mut sim = Simulation::try_new(
        SimContext::new(3),
        engine,
        vacuum,
        PointMassWorld::new().with_ground(terrain),
    )?;
    sim.populate(6);

    let mut rejected = false;
    while !rejected {
        let Some(target) = sim.store().iter().next().map(|c| c.position) else {
            break;
        };
        match capture(&mut sim, target) {
            Some(CaptureOutcome::Collected(item)) => {
                println!("collected {} ({} units)", item.archetype.id, item.footprint())
            }
            Some(CaptureOutcome::Rejected { reason, .. }) => {
                println!("rejected: {reason}");
                rejected = true;
            }
            None => break,
        }
    }

    sim.upgrade_capacity(4);
    println!("storage upgraded to {}", sim.status().max_capacity);
    let first = sim.store().iter().next().map(|c| c.position);
    if let Some(target) = first {
        if let Some(CaptureOutcome::Collected(item)) = capture(&mut sim, target) {
            println!("collected {} after upgrade", item.archetype.id);
        }
    }

    let value = sim.vacuum().inventory().total_value();
    let sold = sim.remove_from_inventory("tire", u32::MAX);
    println!(
        "sold {sold} tires for {value}, storage {}/{}",
        sim.status().used_capacity,
        sim.status().max_capacity
    );
    Ok(())
}

fn capture(sim: &mut Simulation<PointMassWorld>, target: Vec3) -> Option<CaptureOutcome> {
    sim.set_nozzle(Nozzle::looking_at(target + Vec3::new(0.0, 0.5, -4.0), target));
    sim.set_engaged(true);
    let mut outcome = None;
    for _ in 0..900 {
        outcome = sim.advance(FRAME_DT);
        if outcome.is_some() {
            break;
        }
    }
    sim.set_engaged(false);
    sim.drain_events();
    outcome
}
