//! A small reference physics backend: point masses with sphere colliders.
//!
//! Integration is semi-implicit Euler with linear drag. Kinematic moves replace
//! integration for the step they are issued in. Collisions between bodies are
//! not resolved; bodies only rest on an optional ground [`Terrain`].
use std::collections::BTreeMap;
use std::sync::Arc;

use glam::Vec3;
use mint::Vector2;

use crate::capture::physics::{
    BodyDesc, BodySnapshot, LayerMask, PhysicsPort, PhysicsStep, RayHit, RaycastQuery,
};
use crate::spawn::terrain::Terrain;
use crate::spawn::CollectibleId;

pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

#[derive(Debug, Clone)]
struct Body {
    position: Vec3,
    velocity: Vec3,
    mass: f32,
    radius: f32,
    layer: LayerMask,
    suspended: bool,
    force: Vec3,
    kinematic_target: Option<Vec3>,
}

impl Body {
    fn inverse_mass(&self) -> f32 {
        if self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }
}

pub struct PointMassWorld {
    bodies: BTreeMap<CollectibleId, Body>,
    gravity: Vec3,
    /// Drag while suspended by a capture session.
    pub suspended_drag: f32,
    /// Drag otherwise.
    pub free_drag: f32,
    ground: Option<Arc<dyn Terrain>>,
}

impl Default for PointMassWorld {
    fn default() -> Self {
        Self {
            bodies: BTreeMap::new(),
            gravity: DEFAULT_GRAVITY,
            suspended_drag: 2.0,
            free_drag: 0.5,
            ground: None,
        }
    }
}

impl PointMassWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_ground(mut self, ground: Arc<dyn Terrain>) -> Self {
        self.ground = Some(ground);
        self
    }

    pub fn with_drag(mut self, suspended: f32, free: f32) -> Self {
        self.suspended_drag = suspended;
        self.free_drag = free;
        self
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn is_suspended(&self, id: CollectibleId) -> Option<bool> {
        self.bodies.get(&id).map(|b| b.suspended)
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }
}

impl PhysicsPort for PointMassWorld {
    fn insert_body(&mut self, id: CollectibleId, desc: BodyDesc) {
        self.bodies.insert(
            id,
            Body {
                position: desc.position,
                velocity: desc.velocity,
                mass: desc.mass,
                radius: desc.radius.max(0.0),
                layer: desc.layer,
                suspended: false,
                force: Vec3::ZERO,
                kinematic_target: None,
            },
        );
    }

    fn remove_body(&mut self, id: CollectibleId) -> bool {
        self.bodies.remove(&id).is_some()
    }

    fn body(&self, id: CollectibleId) -> Option<BodySnapshot> {
        self.bodies.get(&id).map(|b| BodySnapshot {
            position: b.position,
            velocity: b.velocity,
            mass: b.mass,
        })
    }

    fn apply_force(&mut self, id: CollectibleId, force: Vec3) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.force += force;
        }
    }

    fn apply_impulse(&mut self, id: CollectibleId, impulse: Vec3) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.velocity += impulse * b.inverse_mass();
        }
    }

    fn set_velocity(&mut self, id: CollectibleId, velocity: Vec3) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.velocity = velocity;
        }
    }

    fn set_kinematic_position(&mut self, id: CollectibleId, position: Vec3) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.kinematic_target = Some(position);
        }
    }

    fn set_suspended(&mut self, id: CollectibleId, suspended: bool) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.suspended = suspended;
        }
    }
}

impl PhysicsStep for PointMassWorld {
    fn step(&mut self, dt: f32) {
        if dt.is_nan() || dt <= 0.0 {
            return;
        }
        for body in self.bodies.values_mut() {
            let force = std::mem::take(&mut body.force);
            if let Some(target) = body.kinematic_target.take() {
                body.position = target;
                continue;
            }

            let gravity = if body.suspended {
                Vec3::ZERO
            } else {
                self.gravity
            };
            let drag = if body.suspended {
                self.suspended_drag
            } else {
                self.free_drag
            };
            body.velocity += (force * body.inverse_mass() + gravity) * dt;
            body.velocity *= 1.0 / (1.0 + drag.max(0.0) * dt);
            body.position += body.velocity * dt;

            if let Some(ground) = &self.ground {
                let floor = ground.height_at(Vector2 {
                    x: body.position.x,
                    y: body.position.z,
                }) + body.radius;
                if floor.is_finite() && body.position.y < floor {
                    body.position.y = floor;
                    body.velocity.y = body.velocity.y.max(0.0);
                }
            }
        }
    }
}

impl RaycastQuery for PointMassWorld {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: LayerMask,
    ) -> Option<RayHit> {
        let dir = direction.try_normalize()?;
        self.bodies
            .iter()
            .filter(|(_, b)| b.layer.intersects(filter))
            .filter_map(|(id, b)| {
                let t = ray_sphere(origin, dir, b.position, b.radius)?;
                (t <= max_distance).then(|| RayHit {
                    body: *id,
                    point: origin + dir * t,
                    distance: t,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Distance along the normalised ray to the first sphere contact; 0 if the
/// origin is inside the sphere.
fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let s = disc.sqrt();
    let far = -b + s;
    if far < 0.0 {
        return None;
    }
    Some((-b - s).max(0.0))
}
