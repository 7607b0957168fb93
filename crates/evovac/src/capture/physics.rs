//! Seams to the physics backend.
//!
//! The capture pipeline never integrates motion itself. It issues force,
//! impulse, velocity and kinematic directives through [`PhysicsPort`], reads
//! body snapshots back, and asks [`RaycastQuery`] for the first body along the
//! nozzle's forward axis. Bodies are keyed by the [`CollectibleId`] they back.
use glam::Vec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::spawn::CollectibleId;

/// Bit set of collision layers.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const DEFAULT: LayerMask = LayerMask(1);
    pub const COLLECTIBLE: LayerMask = LayerMask(1 << 1);

    /// Mask with only bit `index` set (`index` is taken modulo 32).
    pub const fn layer(index: u32) -> Self {
        LayerMask(1 << (index % 32))
    }

    pub const fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: LayerMask) -> Self {
        LayerMask(self.0 | other.0)
    }
}

/// Initial state of a body handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    /// Radius of the sphere used for ray queries and ground contact.
    pub radius: f32,
    pub layer: LayerMask,
}

impl BodyDesc {
    pub fn new(position: Vec3, mass: f32, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            mass,
            radius,
            layer: LayerMask::COLLECTIBLE,
        }
    }

    pub fn with_layer(mut self, layer: LayerMask) -> Self {
        self.layer = layer;
        self
    }
}

/// Consistent read of a body at the start of a physics tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub body: CollectibleId,
    pub point: Vec3,
    pub distance: f32,
}

/// Directives the capture pipeline issues to a physics backend.
///
/// Every directive addressed to an unknown body is ignored.
pub trait PhysicsPort {
    fn insert_body(&mut self, id: CollectibleId, desc: BodyDesc);

    /// Returns `false` if the body was not present.
    fn remove_body(&mut self, id: CollectibleId) -> bool;

    fn body(&self, id: CollectibleId) -> Option<BodySnapshot>;

    /// Continuous force, integrated over the next step.
    fn apply_force(&mut self, id: CollectibleId, force: Vec3);

    /// Instantaneous change of momentum.
    fn apply_impulse(&mut self, id: CollectibleId, impulse: Vec3);

    fn set_velocity(&mut self, id: CollectibleId, velocity: Vec3);

    /// Move the body to `position` on the next step without integrating forces
    /// into the move.
    fn set_kinematic_position(&mut self, id: CollectibleId, position: Vec3);

    /// While suspended a body ignores gravity and experiences capture drag.
    /// Clearing the flag restores the default behaviour.
    fn set_suspended(&mut self, id: CollectibleId, suspended: bool);
}

/// Nearest-hit ray query.
pub trait RaycastQuery {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: LayerMask,
    ) -> Option<RayHit>;
}

/// Advances a backend by one fixed interval.
pub trait PhysicsStep {
    fn step(&mut self, dt: f32);
}

/// Viewpoint of the capture tool: the point items are pulled toward and the
/// axis detection looks along.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nozzle {
    pub position: Vec3,
    /// Forward axis; need not be normalised.
    pub forward: Vec3,
}

impl Default for Nozzle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::Z,
        }
    }
}

impl Nozzle {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self { position, forward }
    }

    /// Nozzle at `position` looking at `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self::new(position, target - position)
    }
}
