//! Populate runs: sample, select a tier, instantiate an archetype.
use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::sync::Arc;

use glam::{Quat, Vec3};
use rand::RngCore;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::events::EventSink;
use crate::math::{rand01, rand_index};
use crate::spawn::events::{SkipReason, SpawnEvent};
use crate::spawn::sampler::SpatialSampler;
use crate::spawn::selection::RaritySelector;
use crate::spawn::terrain::Terrain;
use crate::spawn::zone::ExclusionZone;
use crate::spawn::{Archetype, CollectibleId, CollectibleStore, Rarity, SpawnTable};

/// Configuration of a [`DistributionEngine`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnConfig {
    /// Reference point for spawn distances. `None` falls back to `origin`.
    pub hub: Option<Vec3>,
    /// Position of the engine itself.
    pub origin: Vec3,
    /// Minimum horizontal distance from the hub.
    pub safe_radius: f32,
    /// Maximum horizontal distance from the hub.
    pub max_spawn_distance: f32,
    /// Sampling attempts per requested item.
    pub max_attempts: u32,
    /// Lift applied above the terrain surface.
    pub height_offset: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            hub: None,
            origin: Vec3::ZERO,
            safe_radius: 20.0,
            max_spawn_distance: 200.0,
            max_attempts: 30,
            height_offset: 0.1,
        }
    }
}

impl SpawnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hub(mut self, hub: Vec3) -> Self {
        self.hub = Some(hub);
        self
    }

    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_safe_radius(mut self, safe_radius: f32) -> Self {
        self.safe_radius = safe_radius;
        self
    }

    pub fn with_max_spawn_distance(mut self, max_spawn_distance: f32) -> Self {
        self.max_spawn_distance = max_spawn_distance;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_height_offset(mut self, height_offset: f32) -> Self {
        self.height_offset = height_offset;
        self
    }

    /// Hub in effect: the configured hub or the engine origin.
    pub fn effective_hub(&self) -> Vec3 {
        self.hub.unwrap_or(self.origin)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.safe_radius.is_finite() && self.safe_radius >= 0.0) {
            return Err(Error::InvalidConfig(
                "safe_radius must be finite and >= 0".into(),
            ));
        }
        if !(self.max_spawn_distance.is_finite() && self.max_spawn_distance >= self.safe_radius) {
            return Err(Error::InvalidConfig(
                "max_spawn_distance must be finite and >= safe_radius".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidConfig("max_attempts must be > 0".into()));
        }
        if !self.height_offset.is_finite() {
            return Err(Error::InvalidConfig("height_offset must be finite".into()));
        }
        if !self.effective_hub().is_finite() {
            return Err(Error::InvalidConfig("hub must be finite".into()));
        }
        Ok(())
    }
}

/// Summary of one populate run.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulateReport {
    /// Items requested.
    pub requested: usize,
    /// Items that became live collectibles.
    pub spawned: usize,
    /// Total sampling attempts across all items.
    pub attempts: u64,
    /// Items skipped because no valid point was found in budget.
    pub placement_failures: usize,
    /// Items skipped because the selected tier has no archetype.
    pub missing_archetype: usize,
    /// Ids of the spawned collectibles, in spawn order.
    pub spawned_ids: Vec<CollectibleId>,
}

/// Owns the live collectibles and regenerates them on demand.
pub struct DistributionEngine {
    config: SpawnConfig,
    table: SpawnTable,
    archetypes: BTreeMap<Rarity, Vec<Arc<Archetype>>>,
    sampler: SpatialSampler,
    selector: RaritySelector,
    terrain: Option<Arc<dyn Terrain>>,
    store: CollectibleStore,
}

impl DistributionEngine {
    pub fn try_new(
        config: SpawnConfig,
        table: SpawnTable,
        terrain: Option<Arc<dyn Terrain>>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, table, terrain))
    }

    pub fn new(config: SpawnConfig, table: SpawnTable, terrain: Option<Arc<dyn Terrain>>) -> Self {
        debug_assert!(config.safe_radius >= 0.0, "safe_radius must be >= 0");
        debug_assert!(
            config.max_spawn_distance >= config.safe_radius,
            "max_spawn_distance must be >= safe_radius"
        );
        debug_assert!(config.max_attempts > 0, "max_attempts must be > 0");
        Self::build(config, table, terrain)
    }

    fn build(config: SpawnConfig, table: SpawnTable, terrain: Option<Arc<dyn Terrain>>) -> Self {
        if config.hub.is_none() {
            warn!(
                "No hub configured; measuring spawn distances from origin {}.",
                config.origin
            );
        }
        if terrain.is_none() {
            warn!("No terrain configured; populate will spawn nothing.");
        }
        if table.archetypes.is_empty() {
            warn!("Spawn table has no archetypes; populate will spawn nothing.");
        }

        let hub = config.effective_hub();
        let mut archetypes: BTreeMap<Rarity, Vec<Arc<Archetype>>> = BTreeMap::new();
        for a in &table.archetypes {
            archetypes
                .entry(a.rarity)
                .or_default()
                .push(Arc::new(a.clone()));
        }

        Self {
            sampler: SpatialSampler::new(hub, config.safe_radius, config.max_spawn_distance)
                .with_height_offset(config.height_offset),
            selector: RaritySelector::from_table(&table, hub),
            config,
            table,
            archetypes,
            terrain,
            store: CollectibleStore::new(),
        }
    }

    pub fn with_zones(mut self, zones: impl IntoIterator<Item = Arc<ExclusionZone>>) -> Self {
        for zone in zones {
            self.sampler.add_zone(zone);
        }
        self
    }

    pub fn add_zone(&mut self, zone: Arc<ExclusionZone>) {
        self.sampler.add_zone(zone);
    }

    pub fn set_terrain(&mut self, terrain: Option<Arc<dyn Terrain>>) {
        self.terrain = terrain;
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    pub fn table(&self) -> &SpawnTable {
        &self.table
    }

    pub fn hub(&self) -> Vec3 {
        self.sampler.hub
    }

    pub fn sampler(&self) -> &SpatialSampler {
        &self.sampler
    }

    pub fn selector(&self) -> &RaritySelector {
        &self.selector
    }

    pub fn store(&self) -> &CollectibleStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CollectibleStore {
        &mut self.store
    }

    /// Remove every live collectible, returning their ids.
    pub fn clear(&mut self) -> Vec<CollectibleId> {
        self.store.clear()
    }

    /// Clear the live set and spawn up to `count` new collectibles.
    pub fn populate(&mut self, count: usize, rng: &mut impl RngCore) -> PopulateReport {
        self.populate_internal(count, rng, &mut ())
    }

    pub fn populate_with_events(
        &mut self,
        count: usize,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink<SpawnEvent>,
    ) -> PopulateReport {
        self.populate_internal(count, rng, sink)
    }

    fn populate_internal(
        &mut self,
        count: usize,
        rng: &mut dyn RngCore,
        sink: &mut dyn EventSink<SpawnEvent>,
    ) -> PopulateReport {
        self.clear();
        sink.send(SpawnEvent::PopulateStarted { requested: count });

        let mut report = PopulateReport {
            requested: count,
            ..Default::default()
        };

        let Some(terrain) = self.terrain.clone() else {
            degraded(sink, "No terrain configured; nothing spawned.");
            return finish(report, sink);
        };
        if self.archetypes.is_empty() {
            degraded(sink, "No archetypes registered; nothing spawned.");
            return finish(report, sink);
        }

        let attempts = self.config.max_attempts;
        for index in 0..count {
            let (point, used) = self.sampler.find_valid(terrain.as_ref(), rng, attempts);
            report.attempts += u64::from(used);
            let Some(point) = point else {
                report.placement_failures += 1;
                sink.send(SpawnEvent::ItemSkipped {
                    index,
                    reason: SkipReason::NoValidPosition { attempts: used },
                });
                continue;
            };

            let rarity = self.selector.select(point, rng);
            let candidates = self.archetypes.get(&rarity).map_or(&[][..], Vec::as_slice);
            let Some(archetype) = rand_index(rng, candidates.len()).map(|i| &candidates[i]) else {
                report.missing_archetype += 1;
                sink.send(SpawnEvent::ItemSkipped {
                    index,
                    reason: SkipReason::NoArchetype { rarity },
                });
                continue;
            };

            let rotation = Quat::from_rotation_y(rand01(rng) * TAU);
            let id = self.store.insert(archetype.clone(), point, rotation);
            report.spawned += 1;
            report.spawned_ids.push(id);
            sink.send(SpawnEvent::ItemSpawned {
                id,
                rarity,
                archetype_id: archetype.id.clone(),
                position: point,
            });
        }

        finish(report, sink)
    }
}

fn degraded(sink: &mut dyn EventSink<SpawnEvent>, message: &str) {
    warn!("{}", message);
    sink.send(SpawnEvent::Warning {
        context: "populate".into(),
        message: message.into(),
    });
}

fn finish(report: PopulateReport, sink: &mut dyn EventSink<SpawnEvent>) -> PopulateReport {
    info!(
        "Populate finished: spawned {}/{} (attempts: {}, no position: {}, no archetype: {})",
        report.spawned,
        report.requested,
        report.attempts,
        report.placement_failures,
        report.missing_archetype
    );
    sink.send(SpawnEvent::PopulateFinished {
        report: report.clone(),
    });
    report
}
