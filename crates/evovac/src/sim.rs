//! Explicit composition of the spawn and capture pipelines.
//!
//! [`Simulation`] owns the distribution engine, the capture tool and a physics
//! backend, and drives them from two clocks: [`Simulation::advance_physics`]
//! at a fixed interval and [`Simulation::advance_visual`] once per frame.
//! [`Simulation::advance`] runs both from a frame delta with a fixed-step
//! accumulator. Events of both pipelines land on one bus that the owner
//! drains once per frame.
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::capture::events::{CaptureEvent, SessionEndReason};
use crate::capture::overlap::OverlapEvent;
use crate::capture::physics::{BodyDesc, Nozzle, PhysicsPort, PhysicsStep, RaycastQuery};
use crate::capture::resources::Recharge;
use crate::capture::session::{CaptureContext, CaptureOutcome};
use crate::capture::vacuum::{Vacuum, VacuumStatus};
use crate::error::{Error, Result};
use crate::events::{ChannelSink, EventBus};
use crate::input::InputEnabled;
use crate::spawn::analytics::SpawnStatistics;
use crate::spawn::engine::{DistributionEngine, PopulateReport};
use crate::spawn::events::SpawnEvent;
use crate::spawn::CollectibleStore;

/// Process-wide state handed to the simulation at construction: the random
/// source and the clock settings.
pub struct SimContext {
    pub rng: StdRng,
    pub seed: u64,
    /// Physics interval in seconds.
    pub fixed_dt: f32,
    /// Upper bound on physics steps per [`Simulation::advance`] call.
    pub max_substeps: u32,
    /// Cap on undrained events. `None` keeps every event until
    /// [`Simulation::drain_events`] is called.
    pub event_capacity: Option<usize>,
}

impl SimContext {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            fixed_dt: 1.0 / 50.0,
            max_substeps: 8,
            event_capacity: None,
        }
    }

    pub fn with_fixed_dt(mut self, fixed_dt: f32) -> Self {
        self.fixed_dt = fixed_dt;
        self
    }

    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == Some(0) {
            return Err(Error::InvalidConfig("event_capacity must be > 0".into()));
        }
        if !(self.fixed_dt.is_finite() && self.fixed_dt > 0.0) {
            return Err(Error::InvalidConfig("fixed_dt must be finite and > 0".into()));
        }
        if self.max_substeps == 0 {
            return Err(Error::InvalidConfig("max_substeps must be > 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum SimEvent {
    Spawn(SpawnEvent),
    Capture(CaptureEvent),
}

impl From<SpawnEvent> for SimEvent {
    fn from(e: SpawnEvent) -> Self {
        SimEvent::Spawn(e)
    }
}

impl From<CaptureEvent> for SimEvent {
    fn from(e: CaptureEvent) -> Self {
        SimEvent::Capture(e)
    }
}

pub struct Simulation<B> {
    ctx: SimContext,
    engine: DistributionEngine,
    vacuum: Vacuum,
    backend: B,
    bus: EventBus<SimEvent>,
    nozzle: Nozzle,
    accumulator: f32,
}

impl<B> Simulation<B>
where
    B: PhysicsPort + RaycastQuery + PhysicsStep,
{
    pub fn try_new(
        ctx: SimContext,
        engine: DistributionEngine,
        vacuum: Vacuum,
        backend: B,
    ) -> Result<Self> {
        ctx.validate()?;
        Ok(Self::new(ctx, engine, vacuum, backend))
    }

    pub fn new(ctx: SimContext, engine: DistributionEngine, vacuum: Vacuum, backend: B) -> Self {
        debug_assert!(ctx.fixed_dt > 0.0, "fixed_dt must be > 0");
        let bus = match ctx.event_capacity {
            Some(capacity) => EventBus::bounded(capacity),
            None => EventBus::new(),
        };
        Self {
            ctx,
            engine,
            vacuum,
            backend,
            bus,
            nozzle: Nozzle::default(),
            accumulator: 0.0,
        }
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    pub fn engine(&self) -> &DistributionEngine {
        &self.engine
    }

    pub fn vacuum(&self) -> &Vacuum {
        &self.vacuum
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn store(&self) -> &CollectibleStore {
        self.engine.store()
    }

    pub fn nozzle(&self) -> Nozzle {
        self.nozzle
    }

    pub fn set_nozzle(&mut self, nozzle: Nozzle) {
        self.nozzle = nozzle;
    }

    /// Release any session, clear the world and spawn `count` collectibles,
    /// registering a physics body for each.
    pub fn populate(&mut self, count: usize) -> PopulateReport {
        self.clear();
        let mut sink: ChannelSink<SimEvent> = self.bus.sink();
        let report = self
            .engine
            .populate_with_events(count, &mut self.ctx.rng, &mut sink);
        for c in self.engine.store().iter() {
            self.backend.insert_body(
                c.id,
                BodyDesc::new(c.position, c.mass(), c.archetype.collider_radius)
                    .with_layer(c.archetype.layer),
            );
        }
        report
    }

    /// Remove every live collectible. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let mut sink: ChannelSink<SimEvent> = self.bus.sink();
        let mut cctx = CaptureContext {
            nozzle: self.nozzle,
            store: self.engine.store_mut(),
            physics: &mut self.backend,
            sink: &mut sink,
        };
        self.vacuum.release(SessionEndReason::Cleared, &mut cctx);

        let removed = self.engine.clear();
        for id in &removed {
            self.backend.remove_body(*id);
            self.vacuum.forget(*id);
        }
        debug!("Cleared {} collectibles", removed.len());
        removed.len()
    }

    /// Engage input edge (press = `true`, release = `false`).
    pub fn set_engaged(&mut self, engaged: bool) {
        let mut sink: ChannelSink<SimEvent> = self.bus.sink();
        let mut cctx = CaptureContext {
            nozzle: self.nozzle,
            store: self.engine.store_mut(),
            physics: &mut self.backend,
            sink: &mut sink,
        };
        self.vacuum.set_engaged(engaged, &mut cctx);
    }

    pub fn on_overlap(&mut self, event: OverlapEvent) -> bool {
        self.vacuum.on_overlap(event)
    }

    /// One visual tick.
    pub fn advance_visual(&mut self, dt: f32) -> Option<CaptureOutcome> {
        let mut sink: ChannelSink<SimEvent> = self.bus.sink();
        self.vacuum.advance_visual(
            dt,
            self.nozzle,
            self.engine.store_mut(),
            &mut self.backend,
            &mut sink,
        )
    }

    /// One physics tick: capture directives, backend step, position sync.
    pub fn advance_physics(&mut self, dt: f32) {
        let mut sink: ChannelSink<SimEvent> = self.bus.sink();
        let mut cctx = CaptureContext {
            nozzle: self.nozzle,
            store: self.engine.store_mut(),
            physics: &mut self.backend,
            sink: &mut sink,
        };
        self.vacuum.advance_physics(dt, &mut cctx);
        self.backend.step(dt);

        let backend = &self.backend;
        for c in self.engine.store_mut().iter_mut() {
            if let Some(body) = backend.body(c.id) {
                c.position = body.position;
            }
        }
    }

    /// Advance by one frame: as many fixed physics steps as the accumulated
    /// time allows (bounded by `max_substeps`), then one visual tick.
    pub fn advance(&mut self, frame_dt: f32) -> Option<CaptureOutcome> {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }
        let fixed = self.ctx.fixed_dt;
        let mut steps = 0;
        while self.accumulator >= fixed && steps < self.ctx.max_substeps {
            self.advance_physics(fixed);
            self.accumulator -= fixed;
            steps += 1;
        }
        if steps == self.ctx.max_substeps {
            // Drop the backlog instead of spiralling.
            self.accumulator = self.accumulator.min(fixed);
        }
        self.advance_visual(frame_dt.max(0.0))
    }

    /// Drain all events emitted since the previous call, in order. Call once
    /// per frame; undrained events accumulate on the bus.
    pub fn drain_events(&self) -> Vec<SimEvent> {
        self.bus.drain()
    }

    pub fn status(&self) -> VacuumStatus {
        self.vacuum.status()
    }

    pub fn statistics(&self, bands: usize) -> SpawnStatistics {
        SpawnStatistics::collect(
            self.engine.store(),
            self.engine.hub(),
            self.engine.config().max_spawn_distance,
            bands,
        )
    }

    pub fn upgrade_capacity(&mut self, amount: u32) {
        self.vacuum.upgrade_capacity(amount);
    }

    pub fn upgrade_energy_max(&mut self, amount: f32) {
        self.vacuum.upgrade_energy_max(amount);
    }

    pub fn recharge_energy(&mut self, recharge: Recharge) {
        self.vacuum.recharge_energy(recharge);
    }

    pub fn remove_from_inventory(&mut self, archetype_id: &str, quantity: u32) -> u32 {
        self.vacuum.remove_from_inventory(archetype_id, quantity)
    }
}

impl<B> InputEnabled for Simulation<B>
where
    B: PhysicsPort + RaycastQuery + PhysicsStep,
{
    /// Disabling releases an active session within the same call.
    fn set_input_enabled(&mut self, enabled: bool) {
        self.vacuum.set_input_enabled(enabled);
        let mut sink: ChannelSink<SimEvent> = self.bus.sink();
        let mut cctx = CaptureContext {
            nozzle: self.nozzle,
            store: self.engine.store_mut(),
            physics: &mut self.backend,
            sink: &mut sink,
        };
        self.vacuum.flush_pending(&mut cctx);
    }

    fn is_input_enabled(&self) -> bool {
        self.vacuum.is_input_enabled()
    }
}
