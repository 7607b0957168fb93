//! The capture state machine.
//!
//! A session moves one collectible through `Approach → Align → Shrink →
//! Collecting`. Transitions fire on the distance to the nozzle crossing the
//! descending thresholds, at most one edge per tick, and never regress. The
//! physics clock pulls the item (forces in Approach/Align, kinematic snap in
//! Shrink); the visual clock rotates and shrinks it and decides collection.
use std::fmt;

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::capture::config::{CaptureConfig, CaptureThresholds};
use crate::capture::events::{CaptureEvent, RejectReason, SessionEndReason};
use crate::capture::physics::{Nozzle, PhysicsPort};
use crate::capture::resources::{Admission, ResourcePool};
use crate::error::Result;
use crate::events::EventSink;
use crate::math::{look_rotation, move_towards, rotate_towards};
use crate::spawn::{Collectible, CollectibleId, CollectibleStore};

/// Below this nozzle offset the pull direction is considered degenerate.
const MIN_DIRECTION_LENGTH: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CapturePhase {
    Approach,
    Align,
    Shrink,
    Collecting,
}

impl fmt::Display for CapturePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CapturePhase::Approach => "approach",
            CapturePhase::Align => "align",
            CapturePhase::Shrink => "shrink",
            CapturePhase::Collecting => "collecting",
        };
        f.write_str(name)
    }
}

/// The exclusive link between the capture tool and one collectible.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSession {
    pub target: CollectibleId,
    pub phase: CapturePhase,
    /// Distance to the nozzle when the current phase was entered.
    pub phase_entry_distance: f32,
    /// Distance measured at the latest tick.
    pub last_distance: f32,
    /// Velocity read at the latest physics tick.
    pub velocity: Vec3,
    thresholds: CaptureThresholds,
    original_scale: f32,
}

impl CaptureSession {
    pub fn thresholds(&self) -> &CaptureThresholds {
        &self.thresholds
    }
}

/// What a finished session produced.
#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    /// Admitted; ownership of the collectible leaves the world.
    Collected(Collectible),
    /// Refused by the pool; the item is back in the world.
    Rejected {
        target: CollectibleId,
        reason: RejectReason,
    },
}

/// Everything a tick touches besides the state machine itself.
pub struct CaptureContext<'a> {
    pub nozzle: Nozzle,
    pub store: &'a mut CollectibleStore,
    pub physics: &'a mut dyn PhysicsPort,
    pub sink: &'a mut dyn EventSink<CaptureEvent>,
}

pub struct CaptureStateMachine {
    config: CaptureConfig,
    session: Option<CaptureSession>,
}

impl CaptureStateMachine {
    pub fn try_new(config: CaptureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn new(config: CaptureConfig) -> Self {
        debug_assert!(config.suction_power > 0.0, "suction_power must be > 0");
        debug_assert!(config.detection_range > 0.0, "detection_range must be > 0");
        Self {
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CaptureConfig {
        &mut self.config
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn phase(&self) -> Option<CapturePhase> {
        self.session.as_ref().map(|s| s.phase)
    }

    pub fn target(&self) -> Option<CollectibleId> {
        self.session.as_ref().map(|s| s.target)
    }

    /// Begin a session on `target`.
    ///
    /// No-op (returns `false`) while a session is active, for `None`, or for an
    /// id that is not live.
    pub fn start(&mut self, target: Option<CollectibleId>, ctx: &mut CaptureContext<'_>) -> bool {
        if let Some(active) = &self.session {
            debug!(
                "Ignoring start request: session on {} is active.",
                active.target
            );
            return false;
        }
        let Some(target) = target else {
            return false;
        };
        let Some(item) = ctx.store.get_mut(target) else {
            return false;
        };

        item.being_captured = true;
        ctx.physics.set_suspended(target, true);
        let position = ctx
            .physics
            .body(target)
            .map_or(item.position, |b| b.position);
        let distance = position.distance(ctx.nozzle.position);
        self.session = Some(CaptureSession {
            target,
            phase: CapturePhase::Approach,
            phase_entry_distance: distance,
            last_distance: distance,
            velocity: Vec3::ZERO,
            thresholds: item.archetype.thresholds.unwrap_or(self.config.thresholds),
            original_scale: item.scale,
        });
        debug!("Capture session started on {} at {:.2}", target, distance);
        ctx.sink.send(CaptureEvent::SessionStarted { target });
        true
    }

    /// Release the active session, restoring the target's default behaviour.
    /// Idempotent; returns `false` when there was nothing to release.
    pub fn stop(&mut self, reason: SessionEndReason, ctx: &mut CaptureContext<'_>) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        restore(&session, ctx);
        debug!("Capture session on {} ended: {:?}", session.target, reason);
        ctx.sink.send(CaptureEvent::SessionEnded {
            target: session.target,
            reason,
        });
        true
    }

    /// Physics tick: pull forces, snap moves and distance transitions.
    pub fn advance_physics(&mut self, dt: f32, ctx: &mut CaptureContext<'_>) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let target = session.target;
        let (Some(body), Some(mass)) = (
            ctx.physics.body(target),
            ctx.store.get(target).map(|c| c.mass()),
        ) else {
            self.stop(SessionEndReason::TargetLost, ctx);
            return;
        };

        if !(body.position.is_finite() && body.velocity.is_finite()) {
            warn!(
                "Non-finite body state on {} (position {}, velocity {}); skipping tick.",
                target, body.position, body.velocity
            );
            return;
        }

        let to_nozzle = ctx.nozzle.position - body.position;
        let distance = to_nozzle.length();
        let phase = session.phase;
        let thresholds = session.thresholds;
        if let Some(s) = self.session.as_mut() {
            s.last_distance = distance;
            s.velocity = body.velocity;
        }

        match phase {
            CapturePhase::Approach | CapturePhase::Align => {
                self.pull(target, to_nozzle, distance, mass, body.velocity, ctx);
                let next = match phase {
                    CapturePhase::Approach if distance < thresholds.rotate_distance => {
                        Some(CapturePhase::Align)
                    }
                    CapturePhase::Align if distance < thresholds.shrink_distance => {
                        Some(CapturePhase::Shrink)
                    }
                    _ => None,
                };
                if let Some(next) = next {
                    self.enter(next, distance, ctx);
                }
            }
            CapturePhase::Shrink => {
                if to_nozzle.length() < MIN_DIRECTION_LENGTH {
                    return;
                }
                let next = move_towards(
                    body.position,
                    ctx.nozzle.position,
                    self.config.snap_speed * dt,
                );
                ctx.physics.set_kinematic_position(target, next);
                ctx.physics.set_velocity(
                    target,
                    body.velocity.clamp_length_max(self.config.max_shrink_velocity),
                );
            }
            CapturePhase::Collecting => {}
        }
    }

    fn pull(
        &self,
        target: CollectibleId,
        to_nozzle: Vec3,
        distance: f32,
        mass: f32,
        velocity: Vec3,
        ctx: &mut CaptureContext<'_>,
    ) {
        if to_nozzle.length() < MIN_DIRECTION_LENGTH || mass <= 0.0 {
            return;
        }
        let cfg = &self.config;
        let speed = (cfg.suction_power / mass.max(cfg.min_mass)).clamp(1.0, 100.0);
        let closeness = 1.0 - (distance / cfg.detection_range).clamp(0.0, 1.0);
        let multiplier = cfg.acceleration_curve.evaluate(closeness);
        let force = to_nozzle.normalize_or_zero() * speed * multiplier;
        if !force.is_finite() {
            warn!("Invalid suction force {} on {}; skipping tick.", force, target);
            return;
        }

        ctx.physics.set_velocity(
            target,
            velocity.clamp_length_max(cfg.max_pull_velocity),
        );
        ctx.physics
            .apply_force(target, force.clamp_length_max(cfg.max_force));
    }

    fn enter(&mut self, phase: CapturePhase, distance: f32, ctx: &mut CaptureContext<'_>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let from = session.phase;
        if phase <= from {
            return;
        }
        session.phase = phase;
        session.phase_entry_distance = distance;
        debug!(
            "Capture {} phase {} -> {} at {:.2}",
            session.target, from, phase, distance
        );
        ctx.sink.send(CaptureEvent::PhaseChanged {
            target: session.target,
            from,
            to: phase,
        });
    }

    /// Visual tick: rotation, shrinking and the collection decision.
    ///
    /// Returns the outcome when the session finished during this tick.
    pub fn advance_visual(
        &mut self,
        dt: f32,
        pool: &mut ResourcePool,
        ctx: &mut CaptureContext<'_>,
    ) -> Option<CaptureOutcome> {
        let session = self.session.as_ref()?;
        let target = session.target;
        let phase = session.phase;
        let thresholds = session.thresholds;
        let original_scale = session.original_scale;

        let body_position = ctx.physics.body(target).map(|b| b.position);
        let Some(item) = ctx.store.get_mut(target) else {
            self.stop(SessionEndReason::TargetLost, ctx);
            return None;
        };
        let position = body_position.unwrap_or(item.position);
        let to_nozzle = ctx.nozzle.position - position;
        let distance = to_nozzle.length();

        if matches!(phase, CapturePhase::Align | CapturePhase::Shrink) {
            if let Some(look) = look_rotation(to_nozzle) {
                item.rotation = rotate_towards(item.rotation, look, self.config.rotate_rate * dt);
            }
        }

        if phase != CapturePhase::Shrink {
            return None;
        }
        item.scale = (item.scale - self.config.shrink_rate * dt * original_scale).max(0.0);
        let collect = distance < thresholds.collect_distance
            || item.scale < self.config.scale_floor * original_scale;
        if !collect {
            return None;
        }

        let footprint = item.footprint();
        let mass = item.mass();
        let archetype = item.archetype.clone();
        self.enter(CapturePhase::Collecting, distance, ctx);
        let session = self.session.take()?;

        match pool.try_admit(footprint, mass) {
            Admission::Accepted => {
                ctx.physics.remove_body(target);
                let Some(collected) = ctx.store.remove(target) else {
                    pool.release(footprint, mass);
                    ctx.sink.send(CaptureEvent::SessionEnded {
                        target,
                        reason: SessionEndReason::TargetLost,
                    });
                    return None;
                };
                info!(
                    "Collected '{}' ({}) | storage {}/{} | weight {:.1}/{:.1}",
                    archetype.name,
                    archetype.rarity,
                    pool.used_capacity(),
                    pool.max_capacity(),
                    pool.used_weight(),
                    pool.max_weight()
                );
                ctx.sink
                    .send(CaptureEvent::ItemCollected { target, archetype });
                ctx.sink.send(CaptureEvent::SessionEnded {
                    target,
                    reason: SessionEndReason::Collected,
                });
                Some(CaptureOutcome::Collected(collected))
            }
            admission => {
                let reason = admission.reject_reason().unwrap_or(RejectReason::Capacity);
                self.reject(&session, reason, ctx);
                info!("Rejected '{}': {}", archetype.name, reason);
                ctx.sink.send(CaptureEvent::ItemRejected {
                    target,
                    archetype,
                    reason,
                });
                ctx.sink.send(CaptureEvent::SessionEnded {
                    target,
                    reason: SessionEndReason::Rejected,
                });
                Some(CaptureOutcome::Rejected { target, reason })
            }
        }
    }

    /// Release a refused item and push it away from the nozzle.
    fn reject(&self, session: &CaptureSession, reason: RejectReason, ctx: &mut CaptureContext<'_>) {
        let target = session.target;
        restore(session, ctx);
        let away = ctx.physics.body(target).and_then(|b| {
            (b.position - ctx.nozzle.position)
                .try_normalize()
                .or_else(|| (-b.velocity).try_normalize())
        });
        debug!("Ejecting {} ({})", target, reason);
        ctx.physics
            .apply_impulse(target, away.unwrap_or(Vec3::Y) * self.config.reject_impulse);
    }
}

/// Undo everything a session changed on its target.
fn restore(session: &CaptureSession, ctx: &mut CaptureContext<'_>) {
    ctx.physics.set_suspended(session.target, false);
    if let Some(item) = ctx.store.get_mut(session.target) {
        item.being_captured = false;
        item.scale = session.original_scale;
    }
}
