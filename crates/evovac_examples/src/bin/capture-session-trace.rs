use std::sync::Arc;

use evovac::prelude::*;
use evovac_examples::init_tracing;
use glam::Vec3;

const FRAME_DT: f32 = 1.0 / 60.0;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let terrain: Arc<dyn Terrain> = Arc::new(FlatTerrain::centered(120.0));
    let table = SpawnTable::new()
        .with_tier(Rarity::Common, 0.8)
        .with_tier(Rarity::Rare, 0.2)
        .with_default_curves(100.0)
        .with_archetype(Archetype::new("bottle", Rarity::Common).with_weight(0.3))
        .with_archetype(
            Archetype::new("radio", Rarity::Rare)
                .with_weight(3.0)
                .with_storage_size(2)
                .with_sell_value(25),
        );
    let engine = DistributionEngine::try_new(
        SpawnConfig::new()
            .with_hub(Vec3::ZERO)
            .with_max_spawn_distance(100.0),
        table,
        Some(terrain.clone()),
    )?;
    let vacuum = Vacuum::try_new(
        CaptureConfig::default().with_suction_power(15.0),
        PoolLimits::default(),
    )?;
    let mut sim = Simulation::try_new(
        SimContext::new(99),
        engine,
        vacuum,
        PointMassWorld::new().with_ground(terrain),
    )?;

    sim.populate(20);
    print_events(&sim, 0);

    let targets: Vec<Vec3> = sim.store().iter().take(3).map(|c| c.position).collect();
    let mut frame = 0u32;
    for target in targets {
        sim.set_nozzle(Nozzle::looking_at(
            target + Vec3::new(0.0, 1.0, -5.0),
            target,
        ));
        sim.set_engaged(true);
        for _ in 0..600 {
            frame += 1;
            let outcome = sim.advance(FRAME_DT);
            print_events(&sim, frame);
            if outcome.is_some() {
                break;
            }
        }
        sim.set_engaged(false);
        print_events(&sim, frame);
    }

    let status = sim.status();
    println!(
        "energy {:.1}/{:.1}, storage {}/{}, weight {:.1}/{:.1}, inventory value {}",
        status.energy,
        status.max_energy,
        status.used_capacity,
        status.max_capacity,
        status.used_weight,
        status.max_weight,
        sim.vacuum().inventory().total_value()
    );
    Ok(())
}

fn print_events(sim: &Simulation<PointMassWorld>, frame: u32) {
    for event in sim.drain_events() {
        match event {
            SimEvent::Spawn(SpawnEvent::PopulateFinished { report }) => {
                println!("[{frame:>4}] populated {} items", report.spawned)
            }
            SimEvent::Spawn(_) => {}
            SimEvent::Capture(e) => println!("[{frame:>4}] {e:?}"),
        }
    }
}
