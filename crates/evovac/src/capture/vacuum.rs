//! The capture tool: acquisition, state machine and resources wired together.
//!
//! The engage input has held semantics: while engaged, an idle tool starts a
//! session on the current candidate every visual tick until one starts.
use tracing::{debug, info};

use crate::capture::acquisition::TargetAcquisition;
use crate::capture::config::CaptureConfig;
use crate::capture::events::{CaptureEvent, SessionEndReason};
use crate::capture::inventory::Inventory;
use crate::capture::overlap::{OverlapEvent, OverlapTracker};
use crate::capture::physics::{Nozzle, PhysicsPort, RaycastQuery};
use crate::capture::resources::{PoolLimits, Recharge, ResourcePool};
use crate::capture::session::{CaptureContext, CaptureOutcome, CapturePhase, CaptureStateMachine};
use crate::error::Result;
use crate::events::EventSink;
use crate::input::InputEnabled;
use crate::spawn::{CollectibleId, CollectibleStore};

/// Read-only snapshot for HUDs and tests.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct VacuumStatus {
    pub energy: f32,
    pub max_energy: f32,
    pub used_capacity: u32,
    pub max_capacity: u32,
    pub used_weight: f32,
    pub max_weight: f32,
    pub depleted: bool,
    pub phase: Option<CapturePhase>,
    pub target: Option<CollectibleId>,
    pub candidate: Option<CollectibleId>,
    /// Bodies inside the collection volume.
    pub overlapping: usize,
    pub engaged: bool,
    pub input_enabled: bool,
}

pub struct Vacuum {
    acquisition: TargetAcquisition,
    machine: CaptureStateMachine,
    pool: ResourcePool,
    inventory: Inventory,
    overlap: OverlapTracker,
    engaged: bool,
    input_enabled: bool,
    release_pending: bool,
}

impl Vacuum {
    pub fn try_new(config: CaptureConfig, limits: PoolLimits) -> Result<Self> {
        config.validate()?;
        let pool = ResourcePool::try_new(limits)?;
        Ok(Self::assemble(CaptureStateMachine::new(config), pool))
    }

    pub fn new(config: CaptureConfig, limits: PoolLimits) -> Self {
        Self::assemble(CaptureStateMachine::new(config), ResourcePool::new(limits))
    }

    fn assemble(machine: CaptureStateMachine, pool: ResourcePool) -> Self {
        let overlap = OverlapTracker::new(machine.config().capturable_layers);
        Self {
            acquisition: TargetAcquisition::new(),
            machine,
            pool,
            inventory: Inventory::new(),
            overlap,
            engaged: false,
            input_enabled: true,
            release_pending: false,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        self.machine.config()
    }

    pub fn machine(&self) -> &CaptureStateMachine {
        &self.machine
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn overlap(&self) -> &OverlapTracker {
        &self.overlap
    }

    pub fn candidate(&self) -> Option<CollectibleId> {
        self.acquisition.current()
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Engage input edge. A press starts a session on the current candidate
    /// right away when possible; a release stops the active session.
    pub fn set_engaged(&mut self, engaged: bool, ctx: &mut CaptureContext<'_>) {
        if !self.input_enabled {
            return;
        }
        self.engaged = engaged;
        if engaged {
            self.try_start(ctx);
        } else {
            self.machine.stop(SessionEndReason::Released, ctx);
        }
    }

    /// Release the session immediately. Returns `false` if none was active.
    pub fn release(&mut self, reason: SessionEndReason, ctx: &mut CaptureContext<'_>) -> bool {
        self.machine.stop(reason, ctx)
    }

    /// Apply a release requested while no tick context was available.
    pub fn flush_pending(&mut self, ctx: &mut CaptureContext<'_>) {
        if std::mem::take(&mut self.release_pending) {
            self.machine.stop(SessionEndReason::InputDisabled, ctx);
        }
    }

    fn try_start(&mut self, ctx: &mut CaptureContext<'_>) {
        if self.machine.is_active() {
            return;
        }
        if self.pool.is_depleted() {
            debug!("Ignoring engage: energy depleted.");
            return;
        }
        self.machine.start(self.acquisition.current(), ctx);
    }

    /// Visual tick: detection and highlight, held-engage start, energy drain,
    /// rotation and shrinking, collection.
    pub fn advance_visual<B>(
        &mut self,
        dt: f32,
        nozzle: Nozzle,
        store: &mut CollectibleStore,
        backend: &mut B,
        sink: &mut dyn EventSink<CaptureEvent>,
    ) -> Option<CaptureOutcome>
    where
        B: PhysicsPort + RaycastQuery,
    {
        self.acquisition
            .update(&nozzle, self.machine.config(), &*backend, store, sink);

        let mut ctx = CaptureContext {
            nozzle,
            store,
            physics: backend,
            sink,
        };
        self.flush_pending(&mut ctx);
        if self.engaged {
            self.try_start(&mut ctx);
        }

        if self.engaged && self.pool.drain(self.machine.config().energy_drain_rate, dt) {
            self.machine.stop(SessionEndReason::Depleted, &mut ctx);
            ctx.sink.send(CaptureEvent::EnergyDepleted);
        }

        let outcome = self.machine.advance_visual(dt, &mut self.pool, &mut ctx);
        if let Some(CaptureOutcome::Collected(item)) = &outcome {
            self.inventory.add(item.archetype.clone());
            self.overlap.forget(item.id);
        }
        outcome
    }

    /// Physics tick: forces and snap moves for the active session.
    pub fn advance_physics(&mut self, dt: f32, ctx: &mut CaptureContext<'_>) {
        self.flush_pending(ctx);
        self.machine.advance_physics(dt, ctx);
    }

    /// Feed one trigger notification of the collection volume.
    pub fn on_overlap(&mut self, event: OverlapEvent) -> bool {
        self.overlap.handle(event)
    }

    /// Forget a collectible that left the world outside of a capture.
    pub fn forget(&mut self, id: CollectibleId) {
        self.overlap.forget(id);
    }

    pub fn upgrade_capacity(&mut self, amount: u32) {
        self.pool.upgrade_capacity(amount);
    }

    pub fn upgrade_energy_max(&mut self, amount: f32) {
        self.pool.upgrade_energy_max(amount);
    }

    pub fn recharge_energy(&mut self, recharge: Recharge) {
        self.pool.recharge(recharge);
    }

    /// Sell or drop items: removes them from the inventory and frees their
    /// storage.
    pub fn remove_from_inventory(&mut self, archetype_id: &str, quantity: u32) -> u32 {
        let removed = self
            .inventory
            .remove(archetype_id, quantity, &mut self.pool);
        if removed > 0 {
            info!(
                "Storage now {}/{}",
                self.pool.used_capacity(),
                self.pool.max_capacity()
            );
        }
        removed
    }

    pub fn status(&self) -> VacuumStatus {
        VacuumStatus {
            energy: self.pool.energy(),
            max_energy: self.pool.max_energy(),
            used_capacity: self.pool.used_capacity(),
            max_capacity: self.pool.max_capacity(),
            used_weight: self.pool.used_weight(),
            max_weight: self.pool.max_weight(),
            depleted: self.pool.is_depleted(),
            phase: self.machine.phase(),
            target: self.machine.target(),
            candidate: self.acquisition.current(),
            overlapping: self.overlap.len(),
            engaged: self.engaged,
            input_enabled: self.input_enabled,
        }
    }
}

impl InputEnabled for Vacuum {
    /// Disabling drops the engage input; an active session is released on the
    /// next tick (or immediately through [`Vacuum::flush_pending`]).
    fn set_input_enabled(&mut self, enabled: bool) {
        if self.input_enabled == enabled {
            return;
        }
        self.input_enabled = enabled;
        if !enabled {
            self.engaged = false;
            self.release_pending = self.machine.is_active();
        }
    }

    fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::{Quat, Vec3};

    use super::*;
    use crate::capture::physics::BodyDesc;
    use crate::capture::point_mass::PointMassWorld;
    use crate::events::VecSink;
    use crate::spawn::{Archetype, Rarity};

    struct Rig {
        store: CollectibleStore,
        world: PointMassWorld,
        sink: VecSink<CaptureEvent>,
        nozzle: Nozzle,
        id: CollectibleId,
    }

    impl Rig {
        fn new(distance: f32) -> Self {
            let mut store = CollectibleStore::new();
            let mut world = PointMassWorld::new().with_gravity(Vec3::ZERO);
            let arch = Arc::new(Archetype::new("can", Rarity::Common).with_sell_value(2));
            let p = Vec3::Z * distance;
            let id = store.insert(arch, p, Quat::IDENTITY);
            world.insert_body(id, BodyDesc::new(p, 1.0, 0.25));
            Self {
                store,
                world,
                sink: VecSink::new(),
                nozzle: Nozzle::default(),
                id,
            }
        }

        fn visual(&mut self, vac: &mut Vacuum, dt: f32) -> Option<CaptureOutcome> {
            vac.advance_visual(dt, self.nozzle, &mut self.store, &mut self.world, &mut self.sink)
        }

        fn ctx(&mut self) -> CaptureContext<'_> {
            CaptureContext {
                nozzle: self.nozzle,
                store: &mut self.store,
                physics: &mut self.world,
                sink: &mut self.sink,
            }
        }
    }

    #[test]
    fn held_engage_starts_on_candidate() {
        let mut rig = Rig::new(5.0);
        let mut vac = Vacuum::new(CaptureConfig::default(), PoolLimits::default());
        // Pressed before anything is in sight: nothing to start.
        vac.set_engaged(true, &mut rig.ctx());
        assert!(!vac.machine().is_active());

        rig.visual(&mut vac, 0.016);
        assert_eq!(vac.status().target, Some(rig.id));
        assert_eq!(vac.status().phase, Some(CapturePhase::Approach));

        vac.set_engaged(false, &mut rig.ctx());
        assert!(!vac.machine().is_active());
    }

    #[test]
    fn depletion_stops_session_in_same_tick() {
        let mut rig = Rig::new(5.0);
        let mut vac = Vacuum::new(
            CaptureConfig::default().with_energy_drain_rate(10.0),
            PoolLimits::new(100, 50.0, 1.0),
        );
        rig.visual(&mut vac, 0.016);
        vac.set_engaged(true, &mut rig.ctx());
        assert!(vac.machine().is_active());

        rig.visual(&mut vac, 0.1);
        let status = vac.status();
        assert!(status.depleted);
        assert_eq!(status.energy, 0.0);
        assert_eq!(status.phase, None);
        assert!(rig.sink.as_slice().iter().any(|e| matches!(
            e,
            CaptureEvent::SessionEnded {
                reason: SessionEndReason::Depleted,
                ..
            }
        )));
        assert!(rig
            .sink
            .as_slice()
            .iter()
            .any(|e| matches!(e, CaptureEvent::EnergyDepleted)));

        // Still held, but depleted: no new session.
        rig.visual(&mut vac, 0.016);
        assert!(!vac.machine().is_active());

        vac.recharge_energy(Recharge::Full);
        rig.visual(&mut vac, 0.016);
        assert!(vac.machine().is_active());
    }

    #[test]
    fn energy_drains_while_engaged_without_target() {
        // Well outside the detection range, so nothing is ever acquired.
        let mut rig = Rig::new(100.0);
        let mut vac = Vacuum::new(
            CaptureConfig::default().with_energy_drain_rate(10.0),
            PoolLimits::new(100, 50.0, 5.0),
        );
        vac.set_engaged(true, &mut rig.ctx());
        assert!(!vac.machine().is_active());

        rig.visual(&mut vac, 0.1);
        assert!(vac.status().energy < 5.0);
        assert!(!vac.status().depleted);

        for _ in 0..10 {
            rig.visual(&mut vac, 0.1);
        }
        let status = vac.status();
        assert!(status.depleted);
        assert_eq!(status.energy, 0.0);
        let depleted = rig
            .sink
            .as_slice()
            .iter()
            .filter(|e| matches!(e, CaptureEvent::EnergyDepleted))
            .count();
        assert_eq!(depleted, 1);
        assert!(!rig
            .sink
            .as_slice()
            .iter()
            .any(|e| matches!(e, CaptureEvent::SessionEnded { .. })));
    }

    #[test]
    fn idle_vacuum_keeps_its_energy() {
        let mut rig = Rig::new(5.0);
        let mut vac = Vacuum::new(
            CaptureConfig::default().with_energy_drain_rate(10.0),
            PoolLimits::new(100, 50.0, 5.0),
        );
        for _ in 0..10 {
            rig.visual(&mut vac, 0.1);
        }
        assert_eq!(vac.status().energy, 5.0);
        assert!(!vac.status().depleted);
    }

    #[test]
    fn disabling_input_releases_session() {
        let mut rig = Rig::new(5.0);
        let mut vac = Vacuum::new(CaptureConfig::default(), PoolLimits::default());
        rig.visual(&mut vac, 0.016);
        vac.set_engaged(true, &mut rig.ctx());
        assert!(vac.machine().is_active());

        vac.set_input_enabled(false);
        assert!(!vac.is_input_enabled());
        vac.flush_pending(&mut rig.ctx());
        assert!(!vac.machine().is_active());

        // Presses are ignored while disabled.
        vac.set_engaged(true, &mut rig.ctx());
        rig.visual(&mut vac, 0.016);
        assert!(!vac.machine().is_active());
    }

    #[test]
    fn full_capture_fills_inventory() {
        let mut rig = Rig::new(3.0);
        let mut vac = Vacuum::new(CaptureConfig::default(), PoolLimits::default());
        rig.visual(&mut vac, 0.016);
        vac.set_engaged(true, &mut rig.ctx());

        let dt = 1.0 / 50.0;
        let mut collected = false;
        for _ in 0..2000 {
            vac.advance_physics(dt, &mut rig.ctx());
            crate::capture::physics::PhysicsStep::step(&mut rig.world, dt);
            if let Some(CaptureOutcome::Collected(_)) = rig.visual(&mut vac, dt) {
                collected = true;
                break;
            }
        }
        assert!(collected);
        assert_eq!(vac.inventory().quantity("can"), 1);
        assert_eq!(vac.inventory().total_value(), 2);
        assert!(rig.store.is_empty());
    }
}
