#![forbid(unsafe_code)]
//! evovac: hub-distance weighted collectible scattering and a vacuum capture state machine.
//!
//! Modules:
//! - spawn: rarity tables and distance curves, exclusion zones, terrain sampling, population
//! - capture: target acquisition, the Approach/Align/Shrink/Collecting session, resource pool, inventory
//! - sim: fixed-step physics plus per-frame visual scheduling over a pluggable physics backend
//! - config (feature `ron`): load spawn and capture setups from RON
//!
//! For examples and docs, see README.
pub mod capture;
#[cfg(feature = "ron")]
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod math;
pub mod sim;
pub mod spawn;

/// Convenient re-exports for common types. Import with `use evovac::prelude::*;`.
pub mod prelude {
    pub use crate::capture::acquisition::TargetAcquisition;
    pub use crate::capture::config::{AccelerationCurve, CaptureConfig, CaptureThresholds};
    pub use crate::capture::events::{CaptureEvent, RejectReason, SessionEndReason};
    pub use crate::capture::inventory::{Inventory, InventoryEntry};
    pub use crate::capture::overlap::{OverlapEvent, OverlapKind, OverlapTracker};
    pub use crate::capture::physics::{
        BodyDesc, BodySnapshot, LayerMask, Nozzle, PhysicsPort, PhysicsStep, RayHit,
        RaycastQuery,
    };
    pub use crate::capture::point_mass::PointMassWorld;
    pub use crate::capture::resources::{Admission, PoolLimits, Recharge, ResourcePool};
    pub use crate::capture::session::{
        CaptureContext, CaptureOutcome, CapturePhase, CaptureSession, CaptureStateMachine,
    };
    pub use crate::capture::vacuum::{Vacuum, VacuumStatus};
    #[cfg(feature = "ron")]
    pub use crate::config::{SpawnSetup, VacuumSetup};
    pub use crate::error::{Error, Result};
    pub use crate::events::{ChannelSink, EventBus, EventSink, FnSink, MultiSink, VecSink};
    pub use crate::input::{set_input_enabled_all, InputEnabled};
    pub use crate::sim::{SimContext, SimEvent, Simulation};
    pub use crate::spawn::analytics::{DistanceBand, SpawnStatistics};
    pub use crate::spawn::curve::{Curve, CurveInterpolation, CurveKey, RarityDistanceCurve};
    pub use crate::spawn::engine::{DistributionEngine, PopulateReport, SpawnConfig};
    pub use crate::spawn::events::{SkipReason, SpawnEvent};
    pub use crate::spawn::sampler::SpatialSampler;
    pub use crate::spawn::selection::{pick_weighted, RaritySelector};
    pub use crate::spawn::terrain::{FlatTerrain, HeightGrid, Terrain};
    pub use crate::spawn::zone::{ExclusionZone, ZoneShape};
    pub use crate::spawn::{
        Archetype, ArchetypeId, Collectible, CollectibleId, CollectibleStore, Rarity, RarityTier,
        SpawnTable,
    };
}
