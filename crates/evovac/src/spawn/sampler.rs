//! Rejection sampling of placement points around the hub.
use std::sync::Arc;

use glam::{Vec2, Vec3};
use mint::Vector2;
use rand::RngCore;

use crate::math::{horizontal_distance, rand01};
use crate::spawn::terrain::Terrain;
use crate::spawn::zone::ExclusionZone;

/// Proposes uniformly distributed ground points and judges them against the
/// hub ring and the registered exclusion zones.
#[derive(Clone, Debug)]
pub struct SpatialSampler {
    pub hub: Vec3,
    /// Minimum horizontal distance from the hub (inclusive).
    pub safe_radius: f32,
    /// Maximum horizontal distance from the hub (inclusive).
    pub max_spawn_distance: f32,
    /// Added to the terrain height of every sampled point.
    pub height_offset: f32,
    zones: Vec<Arc<ExclusionZone>>,
}

impl SpatialSampler {
    pub fn new(hub: Vec3, safe_radius: f32, max_spawn_distance: f32) -> Self {
        Self {
            hub,
            safe_radius,
            max_spawn_distance,
            height_offset: 0.0,
            zones: Vec::new(),
        }
    }

    pub fn with_height_offset(mut self, offset: f32) -> Self {
        self.height_offset = offset;
        self
    }

    pub fn with_zone(mut self, zone: Arc<ExclusionZone>) -> Self {
        self.zones.push(zone);
        self
    }

    pub fn add_zone(&mut self, zone: Arc<ExclusionZone>) {
        self.zones.push(zone);
    }

    pub fn zones(&self) -> &[Arc<ExclusionZone>] {
        &self.zones
    }

    /// Draw one point uniformly within the terrain's horizontal extent and lift
    /// it onto the surface. The point is not validated.
    ///
    /// Returns `None` only when the terrain reports an empty or non-finite
    /// extent, or a non-finite height at the drawn position.
    pub fn sample(&self, terrain: &dyn Terrain, rng: &mut dyn RngCore) -> Option<Vec3> {
        let (min, max) = terrain.horizontal_bounds();
        let (min, max) = (Vec2::from(min), Vec2::from(max));
        if !min.is_finite() || !max.is_finite() || max.x < min.x || max.y < min.y {
            return None;
        }

        let x = min.x + (max.x - min.x) * rand01(rng);
        let z = min.y + (max.y - min.y) * rand01(rng);
        let y = terrain.height_at(Vector2 { x, y: z });
        if !y.is_finite() {
            return None;
        }
        Some(Vec3::new(x, y + self.height_offset, z))
    }

    /// True iff the point lies within the hub ring and outside every zone.
    pub fn is_valid(&self, point: Vec3) -> bool {
        let d = horizontal_distance(point, self.hub);
        d >= self.safe_radius
            && d <= self.max_spawn_distance
            && !self.zones.iter().any(|z| z.contains(point))
    }

    /// Sample up to `attempts` times and return the first valid point together
    /// with the number of draws used.
    pub fn find_valid(
        &self,
        terrain: &dyn Terrain,
        rng: &mut dyn RngCore,
        attempts: u32,
    ) -> (Option<Vec3>, u32) {
        for attempt in 1..=attempts {
            if let Some(p) = self.sample(terrain, rng) {
                if self.is_valid(p) {
                    return (Some(p), attempt);
                }
            }
        }
        (None, attempts)
    }
}
