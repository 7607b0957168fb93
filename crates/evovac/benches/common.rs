#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use criterion::{Criterion, Throughput};
use evovac::prelude::{ExclusionZone, FlatTerrain, HeightGrid, Terrain};
use glam::{Vec2, Vec3};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub const WORLD_HALF_EXTENT: f32 = 250.0;

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

pub fn flat_terrain() -> Arc<dyn Terrain> {
    Arc::new(FlatTerrain::centered(WORLD_HALF_EXTENT))
}

/// 129x129 grid of gentle hills over the same extent as [`flat_terrain`].
pub fn rolling_terrain() -> Arc<dyn Terrain> {
    let cells = 128;
    let cell_size = 2.0 * WORLD_HALF_EXTENT / cells as f32;
    match HeightGrid::from_fn(
        Vec2::splat(-WORLD_HALF_EXTENT),
        cell_size,
        cells + 1,
        cells + 1,
        |x, z| (x * 0.05).sin() * 3.0 + (z * 0.03).cos() * 2.0,
    ) {
        Some(grid) => Arc::new(grid),
        None => flat_terrain(),
    }
}

/// `count` zones of alternating shape spread on a ring of radius 100.
pub fn ring_of_zones(count: usize) -> Vec<Arc<ExclusionZone>> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count.max(1) as f32 * std::f32::consts::TAU;
            let at = Vec3::new(angle.cos() * 100.0, 0.0, angle.sin() * 100.0);
            let name = format!("zone-{i}");
            let zone = match i % 3 {
                0 => ExclusionZone::circle(name, at, 12.0),
                1 => ExclusionZone::boxed(name, at, Vec2::new(20.0, 10.0)).with_yaw(angle),
                _ => ExclusionZone::triangle(name, at, 15.0),
            };
            Arc::new(zone)
        })
        .collect()
}
