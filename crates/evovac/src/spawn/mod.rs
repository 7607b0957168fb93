//! Procedural placement of collectibles around a hub.
//!
//! A [`SpawnTable`] lists rarity tiers (in registration order) and the archetypes
//! registered for each tier. The [`engine::DistributionEngine`] samples candidate
//! points with [`sampler::SpatialSampler`], picks a tier with
//! [`selection::RaritySelector`], and instantiates a random archetype of that tier
//! into its [`CollectibleStore`].
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use glam::{Quat, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capture::config::CaptureThresholds;
use crate::capture::physics::LayerMask;

pub mod analytics;
pub mod curve;
pub mod engine;
pub mod events;
pub mod sampler;
pub mod selection;
pub mod terrain;
pub mod zone;

/// Base spawn chance assigned to a tier that is registered implicitly by an archetype.
pub const DEFAULT_BASE_SPAWN_CHANCE: f32 = 0.25;

/// Discrete rarity category. Ordering follows declaration (Common is lowest).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        };
        f.write_str(name)
    }
}

pub type ArchetypeId = String;

/// Template from which concrete [`Collectible`]s are instantiated.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct Archetype {
    /// Unique identifier.
    pub id: ArchetypeId,
    /// Display name.
    pub name: String,
    /// Tier this archetype belongs to.
    pub rarity: Rarity,
    /// Mass used for suction and for the weight ceiling of the resource pool.
    pub weight: f32,
    /// Capacity units occupied once collected.
    pub storage_size: u32,
    /// Value reported to economy collaborators.
    pub sell_value: u32,
    /// Radius of the collision sphere handed to the physics backend.
    pub collider_radius: f32,
    /// Per-archetype capture distances; `None` uses the capture tool's defaults.
    pub thresholds: Option<CaptureThresholds>,
    /// Physics layer of spawned bodies, matched against the capturable layers.
    pub layer: LayerMask,
}

impl Default for Archetype {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            rarity: Rarity::Common,
            weight: 1.0,
            storage_size: 1,
            sell_value: 0,
            collider_radius: 0.25,
            thresholds: None,
            layer: LayerMask::COLLECTIBLE,
        }
    }
}

impl Archetype {
    pub fn new(id: impl Into<ArchetypeId>, rarity: Rarity) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            rarity,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_storage_size(mut self, storage_size: u32) -> Self {
        self.storage_size = storage_size;
        self
    }

    pub fn with_sell_value(mut self, sell_value: u32) -> Self {
        self.sell_value = sell_value;
        self
    }

    pub fn with_collider_radius(mut self, radius: f32) -> Self {
        self.collider_radius = radius;
        self
    }

    pub fn with_thresholds(mut self, thresholds: CaptureThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn with_layer(mut self, layer: LayerMask) -> Self {
        self.layer = layer;
        self
    }
}

/// A rarity tier registered in a [`SpawnTable`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RarityTier {
    pub rarity: Rarity,
    /// Base chance in [0, 1], multiplied by the tier's distance curve.
    pub base_spawn_chance: f32,
}

/// Tiers, distance curves and archetypes that drive a populate run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, Default)]
pub struct SpawnTable {
    /// Tiers in registration order. Selection walks them in this order.
    pub tiers: Vec<RarityTier>,
    /// Distance curves; a tier without a curve uses a multiplier of 1.
    pub curves: Vec<curve::RarityDistanceCurve>,
    pub archetypes: Vec<Archetype>,
}

impl SpawnTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tier, or update the base chance of an already registered one
    /// while keeping its position.
    pub fn with_tier(mut self, rarity: Rarity, base_spawn_chance: f32) -> Self {
        self.set_tier(rarity, base_spawn_chance);
        self
    }

    pub fn set_tier(&mut self, rarity: Rarity, base_spawn_chance: f32) {
        if let Some(tier) = self.tiers.iter_mut().find(|t| t.rarity == rarity) {
            tier.base_spawn_chance = base_spawn_chance;
        } else {
            self.tiers.push(RarityTier {
                rarity,
                base_spawn_chance,
            });
        }
    }

    /// Install a curve, replacing any existing curve for the same rarity.
    pub fn with_curve(mut self, curve: curve::RarityDistanceCurve) -> Self {
        self.curves.retain(|c| c.rarity != curve.rarity);
        self.curves.push(curve);
        self
    }

    /// Register an archetype. Its tier is registered implicitly with
    /// [`DEFAULT_BASE_SPAWN_CHANCE`] if missing.
    pub fn with_archetype(mut self, archetype: Archetype) -> Self {
        self.register_archetype(archetype);
        self
    }

    pub fn register_archetype(&mut self, archetype: Archetype) {
        if self.tier(archetype.rarity).is_none() {
            debug!(
                "Registering tier '{}' implicitly for archetype '{}'.",
                archetype.rarity, archetype.id
            );
            self.set_tier(archetype.rarity, DEFAULT_BASE_SPAWN_CHANCE);
        }
        self.archetypes.push(archetype);
    }

    /// Install the default eased curves over `[0, max_distance]` when no curve is
    /// authored: commons thin out with distance, rarer tiers become more likely.
    pub fn with_default_curves(mut self, max_distance: f32) -> Self {
        if self.curves.is_empty() {
            self.curves = curve::RarityDistanceCurve::defaults(max_distance);
        }
        self
    }

    pub fn tier(&self, rarity: Rarity) -> Option<&RarityTier> {
        self.tiers.iter().find(|t| t.rarity == rarity)
    }

    pub fn curve_for(&self, rarity: Rarity) -> Option<&curve::RarityDistanceCurve> {
        self.curves.iter().find(|c| c.rarity == rarity)
    }

    pub fn archetypes_for(&self, rarity: Rarity) -> impl Iterator<Item = &Archetype> {
        self.archetypes.iter().filter(move |a| a.rarity == rarity)
    }
}

/// Identity of a live collectible. Identifiers are never reused within a store.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectibleId(pub u64);

impl fmt::Display for CollectibleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One placed, capturable object.
#[derive(Clone, Debug)]
pub struct Collectible {
    pub id: CollectibleId,
    pub archetype: Arc<Archetype>,
    /// Last known world position (synchronised from the physics backend).
    pub position: Vec3,
    pub rotation: Quat,
    /// Uniform visual scale; 1 at rest, shrinks toward 0 during capture.
    pub scale: f32,
    pub highlighted: bool,
    pub being_captured: bool,
}

impl Collectible {
    pub fn rarity(&self) -> Rarity {
        self.archetype.rarity
    }

    pub fn mass(&self) -> f32 {
        self.archetype.weight
    }

    pub fn footprint(&self) -> u32 {
        self.archetype.storage_size
    }

    pub fn sell_value(&self) -> u32 {
        self.archetype.sell_value
    }
}

/// The live set of collectibles. Iteration is ordered by id.
#[derive(Debug, Default)]
pub struct CollectibleStore {
    items: BTreeMap<CollectibleId, Collectible>,
    next_id: u64,
}

impl CollectibleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        archetype: Arc<Archetype>,
        position: Vec3,
        rotation: Quat,
    ) -> CollectibleId {
        let id = CollectibleId(self.next_id);
        self.next_id += 1;
        self.items.insert(
            id,
            Collectible {
                id,
                archetype,
                position,
                rotation,
                scale: 1.0,
                highlighted: false,
                being_captured: false,
            },
        );
        id
    }

    pub fn get(&self, id: CollectibleId) -> Option<&Collectible> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: CollectibleId) -> Option<&mut Collectible> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: CollectibleId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn remove(&mut self, id: CollectibleId) -> Option<Collectible> {
        self.items.remove(&id)
    }

    /// Remove everything, returning the ids that were live.
    pub fn clear(&mut self) -> Vec<CollectibleId> {
        let ids = self.items.keys().copied().collect();
        self.items.clear();
        ids
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collectible> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Collectible> {
        self.items.values_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = CollectibleId> + '_ {
        self.items.keys().copied()
    }

    pub fn highlighted(&self) -> impl Iterator<Item = CollectibleId> + '_ {
        self.items.values().filter(|c| c.highlighted).map(|c| c.id)
    }
}
