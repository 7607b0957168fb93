//! Distribution statistics over the live collectibles.
use std::collections::BTreeMap;

use glam::Vec3;
use tracing::info;

use crate::math::horizontal_distance;
use crate::spawn::{CollectibleStore, Rarity};

/// Count of collectibles whose hub distance falls in `[min, max)`; the last band
/// also includes `max` and anything beyond it.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceBand {
    pub min: f32,
    pub max: f32,
    pub count: usize,
    pub by_rarity: BTreeMap<Rarity, usize>,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnStatistics {
    pub total: usize,
    pub by_rarity: BTreeMap<Rarity, usize>,
    pub bands: Vec<DistanceBand>,
    pub min_distance: f32,
    pub max_distance: f32,
    pub average_distance: f32,
}

impl SpawnStatistics {
    /// Gather statistics, splitting `[0, max_distance]` into `band_count` equal
    /// bands (no bands when `band_count` is 0 or `max_distance` is not positive).
    pub fn collect(
        store: &CollectibleStore,
        hub: Vec3,
        max_distance: f32,
        band_count: usize,
    ) -> Self {
        let band_width = if band_count > 0 && max_distance > 0.0 {
            max_distance / band_count as f32
        } else {
            0.0
        };
        let mut bands: Vec<DistanceBand> = (0..band_count)
            .filter(|_| band_width > 0.0)
            .map(|i| DistanceBand {
                min: i as f32 * band_width,
                max: (i + 1) as f32 * band_width,
                count: 0,
                by_rarity: BTreeMap::new(),
            })
            .collect();

        let mut stats = Self {
            min_distance: f32::INFINITY,
            ..Default::default()
        };
        let mut sum = 0.0f64;
        for c in store.iter() {
            let d = horizontal_distance(c.position, hub);
            stats.total += 1;
            *stats.by_rarity.entry(c.rarity()).or_default() += 1;
            stats.min_distance = stats.min_distance.min(d);
            stats.max_distance = stats.max_distance.max(d);
            sum += f64::from(d);
            if !bands.is_empty() {
                let idx = ((d / band_width) as usize).min(bands.len() - 1);
                bands[idx].count += 1;
                *bands[idx].by_rarity.entry(c.rarity()).or_default() += 1;
            }
        }

        if stats.total == 0 {
            stats.min_distance = 0.0;
        } else {
            stats.average_distance = (sum / stats.total as f64) as f32;
        }
        stats.bands = bands;
        stats
    }

    pub fn count(&self, rarity: Rarity) -> usize {
        self.by_rarity.get(&rarity).copied().unwrap_or(0)
    }

    /// Share of `rarity` in percent; 0 for an empty set.
    pub fn percentage(&self, rarity: Rarity) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(rarity) as f32 * 100.0 / self.total as f32
    }

    pub fn log(&self) {
        info!(
            "Spawn statistics: {} items, distance min {:.1} / avg {:.1} / max {:.1}",
            self.total, self.min_distance, self.average_distance, self.max_distance
        );
        for (rarity, count) in &self.by_rarity {
            info!(
                "  {}: {} ({:.1}%)",
                rarity,
                count,
                self.percentage(*rarity)
            );
        }
        for band in &self.bands {
            info!("  {:.0}-{:.0}: {}", band.min, band.max, band.count);
        }
    }
}
