//! Distance-weighted rarity roulette.
//!
//! Each tier with at least one registered archetype gets the weight
//! `base_spawn_chance * curve(distance)`. [`pick_weighted`] walks the tiers in
//! registration order; ties resolve to the earlier tier.
use glam::Vec3;
use rand::RngCore;

use crate::math::{horizontal_distance, rand_range};
use crate::spawn::curve::RarityDistanceCurve;
use crate::spawn::{Rarity, SpawnTable};

/// Draw an item with probability proportional to its weight.
///
/// Non-finite and negative weights count as zero. Returns `None` when the total
/// weight is not positive.
pub fn pick_weighted<T: Clone>(items: &[(T, f32)], rng: &mut dyn RngCore) -> Option<T> {
    let weight = |w: f32| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let total: f32 = items.iter().map(|(_, w)| weight(*w)).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let draw = rand_range(rng, 0.0, total);
    let mut cumulative = 0.0;
    for (item, w) in items {
        let w = weight(*w);
        if w == 0.0 {
            continue;
        }
        cumulative += w;
        if cumulative >= draw {
            return Some(item.clone());
        }
    }

    // Rounding left the draw past the accumulated sum.
    items
        .iter()
        .rev()
        .find(|(_, w)| weight(*w) > 0.0)
        .map(|(item, _)| item.clone())
}

#[derive(Clone, Debug)]
struct WeightedTier {
    rarity: Rarity,
    base_spawn_chance: f32,
    curve: Option<RarityDistanceCurve>,
}

/// Picks a rarity tier for a placement point.
#[derive(Clone, Debug)]
pub struct RaritySelector {
    hub: Vec3,
    tiers: Vec<WeightedTier>,
}

impl RaritySelector {
    /// Snapshot the tiers of `table` that have at least one archetype.
    pub fn from_table(table: &SpawnTable, hub: Vec3) -> Self {
        let tiers = table
            .tiers
            .iter()
            .filter(|t| table.archetypes_for(t.rarity).next().is_some())
            .map(|t| WeightedTier {
                rarity: t.rarity,
                base_spawn_chance: t.base_spawn_chance,
                curve: table.curve_for(t.rarity).cloned(),
            })
            .collect();
        Self { hub, tiers }
    }

    pub fn hub(&self) -> Vec3 {
        self.hub
    }

    /// Tiers considered by the roulette, in registration order.
    pub fn rarities(&self) -> impl Iterator<Item = Rarity> + '_ {
        self.tiers.iter().map(|t| t.rarity)
    }

    /// Per-tier weights at the given horizontal distance from the hub.
    pub fn weights_at(&self, distance: f32) -> Vec<(Rarity, f32)> {
        self.tiers
            .iter()
            .map(|t| {
                let multiplier = t.curve.as_ref().map_or(1.0, |c| c.evaluate(distance));
                let w = t.base_spawn_chance * multiplier;
                (t.rarity, if w.is_finite() && w > 0.0 { w } else { 0.0 })
            })
            .collect()
    }

    /// Select a tier for `point`. Falls back to [`Rarity::Common`] when every
    /// weight is zero.
    pub fn select(&self, point: Vec3, rng: &mut dyn RngCore) -> Rarity {
        self.select_at_distance(horizontal_distance(point, self.hub), rng)
    }

    pub fn select_at_distance(&self, distance: f32, rng: &mut dyn RngCore) -> Rarity {
        pick_weighted(&self.weights_at(distance), rng).unwrap_or(Rarity::Common)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::math::tests::FixedRng;
    use crate::spawn::Archetype;

    fn table(common: f32, rare: f32) -> SpawnTable {
        SpawnTable::new()
            .with_tier(Rarity::Common, common)
            .with_tier(Rarity::Rare, rare)
            .with_curve(RarityDistanceCurve::flat(Rarity::Common, 1.0))
            .with_curve(RarityDistanceCurve::flat(Rarity::Rare, 1.0))
            .with_archetype(Archetype::new("can", Rarity::Common))
            .with_archetype(Archetype::new("watch", Rarity::Rare))
    }

    #[test]
    fn pick_weighted_walks_in_order() {
        let items = [("a", 0.7), ("b", 0.3)];
        assert_eq!(pick_weighted(&items, &mut FixedRng::at(0.0)), Some("a"));
        assert_eq!(pick_weighted(&items, &mut FixedRng::at(0.69)), Some("a"));
        assert_eq!(pick_weighted(&items, &mut FixedRng::at(0.8)), Some("b"));
        assert_eq!(pick_weighted(&items, &mut FixedRng::at(1.0)), Some("b"));
    }

    #[test]
    fn pick_weighted_skips_zero_and_invalid_weights() {
        let items = [("nan", f32::NAN), ("zero", 0.0), ("neg", -1.0), ("ok", 2.0)];
        assert_eq!(pick_weighted(&items, &mut FixedRng::at(0.0)), Some("ok"));
        let none: [(&str, f32); 2] = [("a", 0.0), ("b", f32::INFINITY)];
        assert_eq!(pick_weighted(&none, &mut FixedRng::at(0.5)), None);
    }

    #[test]
    fn tiers_without_archetypes_are_ignored() {
        let table = SpawnTable::new()
            .with_tier(Rarity::Epic, 1.0)
            .with_archetype(Archetype::new("can", Rarity::Common));
        let selector = RaritySelector::from_table(&table, Vec3::ZERO);
        assert_eq!(selector.rarities().collect::<Vec<_>>(), vec![Rarity::Common]);
    }

    #[test]
    fn zero_weights_fall_back_to_common() {
        let selector = RaritySelector::from_table(&table(0.0, 0.0), Vec3::ZERO);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            assert_eq!(selector.select(Vec3::new(50.0, 0.0, 0.0), &mut rng), Rarity::Common);
        }
    }

    #[test]
    fn curves_scale_base_chance() {
        let table = table(1.0, 1.0)
            .with_curve(RarityDistanceCurve::new(
                Rarity::Rare,
                crate::spawn::curve::Curve::linear(0.0, 0.0, 100.0, 2.0),
            ));
        let selector = RaritySelector::from_table(&table, Vec3::ZERO);
        let weights = selector.weights_at(50.0);
        assert_eq!(weights[0], (Rarity::Common, 1.0));
        assert_eq!(weights[1].0, Rarity::Rare);
        assert!((weights[1].1 - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empirical_frequencies_converge_to_weights() {
        let selector = RaritySelector::from_table(&table(0.7, 0.3), Vec3::ZERO);
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 100_000;
        let mut counts: HashMap<Rarity, u32> = HashMap::new();
        for _ in 0..draws {
            *counts.entry(selector.select_at_distance(75.0, &mut rng)).or_default() += 1;
        }
        let common = counts[&Rarity::Common] as f32 / draws as f32;
        let rare = counts[&Rarity::Rare] as f32 / draws as f32;
        assert!((common - 0.7).abs() < 0.02, "common frequency {common}");
        assert!((rare - 0.3).abs() < 0.02, "rare frequency {rare}");
    }
}
