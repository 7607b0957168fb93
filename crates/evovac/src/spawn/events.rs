//! Events emitted while populating the world.
use glam::Vec3;

use crate::spawn::engine::PopulateReport;
use crate::spawn::{ArchetypeId, CollectibleId, Rarity};

/// Why a single requested item was not spawned.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The sampler exhausted its attempt budget without a valid point.
    NoValidPosition { attempts: u32 },
    /// The selected tier has no archetype registered.
    NoArchetype { rarity: Rarity },
}

/// Describes events emitted by [`crate::spawn::engine::DistributionEngine`].
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum SpawnEvent {
    /// Emitted after the previous set was cleared, before the first item.
    PopulateStarted {
        /// Number of items requested.
        requested: usize,
    },

    /// Emitted for every live collectible created.
    ItemSpawned {
        id: CollectibleId,
        rarity: Rarity,
        archetype_id: ArchetypeId,
        position: Vec3,
    },

    /// Emitted when one requested item could not be spawned.
    ItemSkipped {
        /// Zero-based index of the item within the run.
        index: usize,
        reason: SkipReason,
    },

    /// Emitted once the run completes.
    PopulateFinished { report: PopulateReport },

    /// A degraded configuration was detected.
    Warning { context: String, message: String },
}
