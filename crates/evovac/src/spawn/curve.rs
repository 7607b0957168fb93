//! Piecewise curves mapping a scalar input to a non-negative multiplier.
//!
//! [`Curve`] is shared by the spawn side (distance-from-hub → rarity multiplier via
//! [`RarityDistanceCurve`]) and the capture side (normalized closeness → suction
//! acceleration).
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::math::smoothstep;
use crate::spawn::Rarity;

/// How values are blended between two successive keys.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CurveInterpolation {
    Linear,
    /// Ease-in-out (smoothstep) between keys.
    #[default]
    Smooth,
}

/// A control point of a [`Curve`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveKey {
    pub input: f32,
    pub value: f32,
}

impl CurveKey {
    pub fn new(input: f32, value: f32) -> Self {
        Self { input, value }
    }
}

/// Ordered control points with a shared interpolation mode.
///
/// Evaluation clamps inputs outside the key range to the nearest key and always
/// returns a finite value `>= 0`. A curve without keys evaluates to 1.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "CurveDef"))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Curve {
    keys: Vec<CurveKey>,
    pub interpolation: CurveInterpolation,
}

/// Deserialized form; routed through [`Curve::from_keys`] so loaded curves are
/// filtered and sorted like built ones.
#[cfg(feature = "serde")]
#[derive(Deserialize, Default)]
#[serde(default)]
struct CurveDef {
    keys: Vec<CurveKey>,
    interpolation: CurveInterpolation,
}

#[cfg(feature = "serde")]
impl From<CurveDef> for Curve {
    fn from(def: CurveDef) -> Self {
        Curve::from_keys(def.keys, def.interpolation)
    }
}

impl Curve {
    /// Build a curve from arbitrary keys. Non-finite keys are dropped and the rest
    /// sorted by input.
    pub fn from_keys(
        keys: impl IntoIterator<Item = CurveKey>,
        interpolation: CurveInterpolation,
    ) -> Self {
        let mut keys: Vec<CurveKey> = keys
            .into_iter()
            .filter(|k| {
                let ok = k.input.is_finite() && k.value.is_finite();
                if !ok {
                    warn!("Dropping non-finite curve key ({}, {}).", k.input, k.value);
                }
                ok
            })
            .collect();
        keys.sort_by(|a, b| a.input.total_cmp(&b.input));
        Self {
            keys,
            interpolation,
        }
    }

    pub fn constant(value: f32) -> Self {
        Self::from_keys([CurveKey::new(0.0, value)], CurveInterpolation::Linear)
    }

    pub fn linear(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::from_keys(
            [CurveKey::new(x0, y0), CurveKey::new(x1, y1)],
            CurveInterpolation::Linear,
        )
    }

    pub fn ease_in_out(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::from_keys(
            [CurveKey::new(x0, y0), CurveKey::new(x1, y1)],
            CurveInterpolation::Smooth,
        )
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    pub fn evaluate(&self, input: f32) -> f32 {
        let raw = self.evaluate_raw(input);
        if raw.is_finite() {
            raw.max(0.0)
        } else {
            0.0
        }
    }

    fn evaluate_raw(&self, input: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return 1.0,
        };
        if input.is_nan() || input <= first.input {
            return first.value;
        }
        if input >= last.input {
            return last.value;
        }

        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if input > b.input {
                continue;
            }
            let span = b.input - a.input;
            if span <= 0.0 {
                return b.value;
            }
            let t = (input - a.input) / span;
            let t = match self.interpolation {
                CurveInterpolation::Linear => t,
                CurveInterpolation::Smooth => smoothstep(t),
            };
            return a.value + (b.value - a.value) * t;
        }

        last.value
    }
}

/// Probability multiplier of a rarity tier as a function of hub distance.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RarityDistanceCurve {
    pub rarity: Rarity,
    pub curve: Curve,
}

impl RarityDistanceCurve {
    pub fn new(rarity: Rarity, curve: Curve) -> Self {
        Self { rarity, curve }
    }

    /// Constant multiplier at every distance.
    pub fn flat(rarity: Rarity, value: f32) -> Self {
        Self::new(rarity, Curve::constant(value))
    }

    /// Eased transition from `near` at the hub to `far` at `max_distance`.
    pub fn eased(rarity: Rarity, near: f32, far: f32, max_distance: f32) -> Self {
        Self::new(rarity, Curve::ease_in_out(0.0, near, max_distance, far))
    }

    pub fn evaluate(&self, distance: f32) -> f32 {
        self.curve.evaluate(distance)
    }

    /// Default distribution: commons dominate near the hub, epics far away.
    pub fn defaults(max_distance: f32) -> Vec<Self> {
        vec![
            Self::eased(Rarity::Common, 1.0, 0.2, max_distance),
            Self::eased(Rarity::Uncommon, 0.3, 0.8, max_distance),
            Self::eased(Rarity::Rare, 0.1, 1.0, max_distance),
            Self::eased(Rarity::Epic, 0.05, 1.2, max_distance),
        ]
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn empty_curve_is_neutral() {
        assert_eq!(Curve::default().evaluate(42.0), 1.0);
    }

    #[test]
    fn clamps_outside_key_range() {
        let c = Curve::linear(10.0, 2.0, 20.0, 4.0);
        assert_eq!(c.evaluate(0.0), 2.0);
        assert_eq!(c.evaluate(100.0), 4.0);
        assert_eq!(c.evaluate(f32::NAN), 2.0);
        assert!((c.evaluate(15.0) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn smooth_interpolation_eases_ends() {
        let c = Curve::ease_in_out(0.0, 0.0, 1.0, 1.0);
        assert!(c.evaluate(0.1) < 0.1);
        assert!(c.evaluate(0.9) > 0.9);
        assert!((c.evaluate(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn negative_values_clamp_to_zero() {
        let c = Curve::linear(0.0, -1.0, 1.0, -1.0);
        assert_eq!(c.evaluate(0.5), 0.0);
    }

    #[test]
    fn keys_are_sorted_and_non_finite_dropped() {
        let c = Curve::from_keys(
            [
                CurveKey::new(5.0, 1.0),
                CurveKey::new(f32::NAN, 3.0),
                CurveKey::new(0.0, 0.0),
            ],
            CurveInterpolation::Linear,
        );
        assert_eq!(c.keys().len(), 2);
        assert_eq!(c.keys()[0].input, 0.0);
    }

    #[test]
    fn multi_key_curve_picks_correct_segment() {
        let c = Curve::from_keys(
            [
                CurveKey::new(0.0, 0.0),
                CurveKey::new(10.0, 1.0),
                CurveKey::new(20.0, 0.0),
            ],
            CurveInterpolation::Linear,
        );
        assert!((c.evaluate(5.0) - 0.5).abs() < 1e-6);
        assert!((c.evaluate(15.0) - 0.5).abs() < 1e-6);
        assert_eq!(c.evaluate(10.0), 1.0);
    }

    #[test]
    fn default_curves_shift_toward_rare_with_distance() {
        let curves = RarityDistanceCurve::defaults(200.0);
        let common = &curves[0];
        let epic = &curves[3];
        assert_eq!(common.evaluate(0.0), 1.0);
        assert!((common.evaluate(200.0) - 0.2).abs() < 1e-6);
        assert!(epic.evaluate(200.0) > epic.evaluate(0.0));
    }

    proptest! {
        #[test]
        fn default_curves_are_finite_and_non_negative(d in -50.0f32..400.0) {
            for c in RarityDistanceCurve::defaults(200.0) {
                let v = c.evaluate(d);
                prop_assert!(v.is_finite());
                prop_assert!(v >= 0.0);
            }
        }
    }
}
