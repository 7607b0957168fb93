//! Collected items, stacked by archetype.
use std::sync::Arc;

use tracing::info;

use crate::capture::resources::ResourcePool;
use crate::spawn::Archetype;

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryEntry {
    pub archetype: Arc<Archetype>,
    pub quantity: u32,
}

/// Stacks of collected archetypes in first-collected order.
///
/// Capacity and weight are accounted in the [`ResourcePool`]; the inventory
/// only records what was admitted.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    entries: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one admitted item.
    pub fn add(&mut self, archetype: Arc<Archetype>) {
        match self.entries.iter_mut().find(|e| e.archetype.id == archetype.id) {
            Some(entry) => entry.quantity += 1,
            None => self.entries.push(InventoryEntry {
                archetype,
                quantity: 1,
            }),
        }
    }

    /// Remove up to `quantity` items of archetype `id`, releasing their storage
    /// and weight back to `pool`. Returns the number actually removed.
    pub fn remove(&mut self, id: &str, quantity: u32, pool: &mut ResourcePool) -> u32 {
        let Some(idx) = self.entries.iter().position(|e| e.archetype.id == id) else {
            return 0;
        };
        let entry = &mut self.entries[idx];
        let removed = quantity.min(entry.quantity);
        entry.quantity -= removed;
        pool.release(
            entry.archetype.storage_size.saturating_mul(removed),
            entry.archetype.weight * removed as f32,
        );
        if entry.quantity == 0 {
            self.entries.remove(idx);
        }
        if removed > 0 {
            info!("Removed {} x '{}' from inventory", removed, id);
        }
        removed
    }

    pub fn quantity(&self, id: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.archetype.id == id)
            .map_or(0, |e| e.quantity)
    }

    /// Sum of sell values over all stacks.
    pub fn total_value(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| u64::from(e.archetype.sell_value) * u64::from(e.quantity))
            .sum()
    }

    pub fn total_items(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }

    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::resources::PoolLimits;
    use crate::spawn::Rarity;

    fn bottle() -> Arc<Archetype> {
        Arc::new(
            Archetype::new("bottle", Rarity::Common)
                .with_storage_size(2)
                .with_weight(1.5)
                .with_sell_value(3),
        )
    }

    #[test]
    fn stacks_by_archetype_id() {
        let mut inv = Inventory::new();
        inv.add(bottle());
        inv.add(bottle());
        inv.add(Arc::new(Archetype::new("watch", Rarity::Rare).with_sell_value(40)));
        assert_eq!(inv.entries().len(), 2);
        assert_eq!(inv.quantity("bottle"), 2);
        assert_eq!(inv.total_items(), 3);
        assert_eq!(inv.total_value(), 46);
    }

    #[test]
    fn remove_releases_pool_resources() {
        let mut pool = ResourcePool::new(PoolLimits::default());
        let mut inv = Inventory::new();
        for _ in 0..3 {
            assert!(pool.try_admit(2, 1.5).is_accepted());
            inv.add(bottle());
        }
        assert_eq!(inv.remove("bottle", 2, &mut pool), 2);
        assert_eq!(pool.used_capacity(), 2);
        assert!((pool.used_weight() - 1.5).abs() < 1e-6);

        assert_eq!(inv.remove("bottle", 5, &mut pool), 1);
        assert!(inv.is_empty());
        assert_eq!(pool.used_capacity(), 0);
        assert_eq!(inv.remove("bottle", 1, &mut pool), 0);
    }
}
