//! Tuning of the capture tool.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::capture::physics::LayerMask;
use crate::error::{Error, Result};
use crate::spawn::curve::Curve;

/// Maps the normalised closeness `1 - clamp01(distance / detection_range)` to a
/// force multiplier.
pub type AccelerationCurve = Curve;

/// Descending distance thresholds that drive the capture phases.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureThresholds {
    /// Outermost capture distance; bounds the descending thresholds below it.
    pub acquire_distance: f32,
    /// Approach → Align.
    pub rotate_distance: f32,
    /// Align → Shrink.
    pub shrink_distance: f32,
    /// Shrink → Collecting.
    pub collect_distance: f32,
}

impl Default for CaptureThresholds {
    fn default() -> Self {
        Self {
            acquire_distance: 15.0,
            rotate_distance: 1.5,
            shrink_distance: 0.5,
            collect_distance: 0.2,
        }
    }
}

impl CaptureThresholds {
    pub fn new(acquire: f32, rotate: f32, shrink: f32, collect: f32) -> Self {
        Self {
            acquire_distance: acquire,
            rotate_distance: rotate,
            shrink_distance: shrink,
            collect_distance: collect,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let all = [
            self.acquire_distance,
            self.rotate_distance,
            self.shrink_distance,
            self.collect_distance,
        ];
        if all.iter().any(|d| !d.is_finite()) {
            return Err(Error::InvalidConfig(
                "capture thresholds must be finite".into(),
            ));
        }
        if !(self.acquire_distance >= self.rotate_distance
            && self.rotate_distance > self.shrink_distance
            && self.shrink_distance > self.collect_distance
            && self.collect_distance >= 0.0)
        {
            return Err(Error::InvalidConfig(
                "capture thresholds must satisfy acquire >= rotate > shrink > collect >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration of the capture state machine and target acquisition.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Base suction strength, divided by the target mass.
    pub suction_power: f32,
    /// Lower bound on the mass used in the pull formula.
    pub min_mass: f32,
    /// Length of the acquisition ray.
    pub detection_range: f32,
    /// Half angle (radians) of the fallback acquisition cone; 0 disables it.
    pub cone_half_angle: f32,
    /// Default thresholds for archetypes without their own.
    pub thresholds: CaptureThresholds,
    pub acceleration_curve: AccelerationCurve,
    /// Ceiling on the magnitude of a single pull force.
    pub max_force: f32,
    /// Velocity ceiling enforced before each pull force.
    pub max_pull_velocity: f32,
    /// Speed of the position-controlled snap during Shrink.
    pub snap_speed: f32,
    /// Velocity ceiling enforced after each snap move.
    pub max_shrink_velocity: f32,
    /// Angular rate (radians per second) of the Align/Shrink rotation.
    pub rotate_rate: f32,
    /// Scale units removed per second during Shrink.
    pub shrink_rate: f32,
    /// Scale below which the item is collected regardless of distance.
    pub scale_floor: f32,
    /// Outward impulse applied to a rejected item.
    pub reject_impulse: f32,
    /// Energy drained per second while a session is active.
    pub energy_drain_rate: f32,
    /// Layers the acquisition ray may hit.
    pub capturable_layers: LayerMask,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            suction_power: 10.0,
            min_mass: 0.1,
            detection_range: 15.0,
            cone_half_angle: 0.0,
            thresholds: CaptureThresholds::default(),
            acceleration_curve: Curve::ease_in_out(0.0, 0.0, 1.0, 1.0),
            max_force: 500.0,
            max_pull_velocity: 50.0,
            snap_speed: 20.0,
            max_shrink_velocity: 10.0,
            rotate_rate: 5.0,
            shrink_rate: 3.0,
            scale_floor: 0.1,
            reject_impulse: 5.0,
            energy_drain_rate: 5.0,
            capturable_layers: LayerMask::COLLECTIBLE,
        }
    }
}

impl CaptureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suction_power(mut self, power: f32) -> Self {
        self.suction_power = power;
        self
    }

    pub fn with_min_mass(mut self, min_mass: f32) -> Self {
        self.min_mass = min_mass;
        self
    }

    /// Sets the detection range and the default acquire distance together.
    pub fn with_detection_range(mut self, range: f32) -> Self {
        self.detection_range = range;
        self.thresholds.acquire_distance = range;
        self
    }

    pub fn with_cone_half_angle(mut self, radians: f32) -> Self {
        self.cone_half_angle = radians;
        self
    }

    pub fn with_thresholds(mut self, thresholds: CaptureThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_acceleration_curve(mut self, curve: AccelerationCurve) -> Self {
        self.acceleration_curve = curve;
        self
    }

    pub fn with_max_force(mut self, max_force: f32) -> Self {
        self.max_force = max_force;
        self
    }

    pub fn with_snap_speed(mut self, snap_speed: f32) -> Self {
        self.snap_speed = snap_speed;
        self
    }

    pub fn with_rotate_rate(mut self, rate: f32) -> Self {
        self.rotate_rate = rate;
        self
    }

    pub fn with_shrink_rate(mut self, rate: f32) -> Self {
        self.shrink_rate = rate;
        self
    }

    pub fn with_reject_impulse(mut self, impulse: f32) -> Self {
        self.reject_impulse = impulse;
        self
    }

    pub fn with_energy_drain_rate(mut self, rate: f32) -> Self {
        self.energy_drain_rate = rate;
        self
    }

    pub fn with_capturable_layers(mut self, layers: LayerMask) -> Self {
        self.capturable_layers = layers;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("suction_power", self.suction_power),
            ("min_mass", self.min_mass),
            ("detection_range", self.detection_range),
            ("max_force", self.max_force),
            ("max_pull_velocity", self.max_pull_velocity),
            ("snap_speed", self.snap_speed),
            ("max_shrink_velocity", self.max_shrink_velocity),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!("{name} must be finite and > 0")));
            }
        }

        let non_negative = [
            ("rotate_rate", self.rotate_rate),
            ("shrink_rate", self.shrink_rate),
            ("scale_floor", self.scale_floor),
            ("reject_impulse", self.reject_impulse),
            ("energy_drain_rate", self.energy_drain_rate),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidConfig(format!("{name} must be finite and >= 0")));
            }
        }

        if !(0.0..std::f32::consts::FRAC_PI_2).contains(&self.cone_half_angle) {
            return Err(Error::InvalidConfig(
                "cone_half_angle must be in [0, pi/2)".into(),
            ));
        }
        self.thresholds.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(CaptureConfig::default().validate().is_ok());
        assert!(CaptureThresholds::default().validate().is_ok());
    }

    #[test]
    fn thresholds_must_descend() {
        let t = CaptureThresholds::new(15.0, 0.5, 0.5, 0.2);
        assert!(matches!(t.validate(), Err(Error::InvalidConfig(_))));
        let t = CaptureThresholds::new(1.0, 1.5, 0.5, 0.2);
        assert!(t.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_power() {
        let cfg = CaptureConfig::new().with_suction_power(0.0);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("suction_power"));
    }

    #[test]
    fn detection_range_updates_acquire_distance() {
        let cfg = CaptureConfig::new().with_detection_range(30.0);
        assert_eq!(cfg.thresholds.acquire_distance, 30.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn cone_angle_is_bounded() {
        let cfg = CaptureConfig::new().with_cone_half_angle(2.0);
        assert!(cfg.validate().is_err());
    }
}
