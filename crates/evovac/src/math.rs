//! Small numeric helpers shared by the spawn and capture modules.
//!
//! Randomness goes through [`RngCore`] so that every consumer can be driven by a
//! seeded generator (or a fixed stub in tests).
use glam::{Quat, Vec2, Vec3};
use rand::RngCore;

/// Generate a random float in the range [0, 1].
///
/// The upper bound is reachable because `u32::MAX as f32` rounds up to 2^32.
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Uniform draw in `[min, max)`. Returns `min` when the range is empty.
#[inline]
pub(crate) fn rand_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    let v = min + (max - min) * rand01(rng);
    // f32 rounding can land exactly on `max` for very wide ranges.
    if v >= max {
        next_down(max)
    } else {
        v
    }
}

/// Uniform index into a collection of `len` elements.
#[inline]
pub(crate) fn rand_index(rng: &mut dyn RngCore, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let idx = (rand01(rng) * len as f32) as usize;
    Some(idx.min(len - 1))
}

/// Compute the next smaller representable float value.
#[inline]
pub(crate) fn next_down(val: f32) -> f32 {
    if val.is_nan() {
        return f32::NAN;
    }
    if val == f32::NEG_INFINITY {
        return f32::NEG_INFINITY;
    }
    if val == f32::INFINITY {
        return f32::MAX;
    }
    if val == 0.0 {
        return -f32::MIN_POSITIVE;
    }

    let bits = val.to_bits();
    if val > 0.0 {
        f32::from_bits(bits.saturating_sub(1))
    } else {
        f32::from_bits(bits.saturating_add(1))
    }
}

/// Cubic Hermite ease with zero end tangents; `t` is clamped to [0, 1].
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Distance between two points projected onto the XZ ground plane.
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting.
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_delta || dist <= f32::EPSILON {
        return target;
    }
    current + delta / dist * max_delta.max(0.0)
}

/// Rotate `from` toward `to` by at most `max_angle` radians.
pub fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    if max_angle <= 0.0 {
        return from;
    }
    let angle = from.angle_between(to);
    if angle <= max_angle || angle <= f32::EPSILON {
        return to;
    }
    from.slerp(to, (max_angle / angle).clamp(0.0, 1.0))
}

/// Orientation whose local +Z axis points along `direction`.
///
/// Returns `None` for degenerate or non-finite directions.
pub fn look_rotation(direction: Vec3) -> Option<Quat> {
    let dir = direction.try_normalize()?;
    Some(Quat::from_rotation_arc(Vec3::Z, dir))
}
