//! Capacity, weight and energy bookkeeping of the capture tool.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::capture::events::RejectReason;
use crate::error::{Error, Result};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolLimits {
    /// Storage units available.
    pub max_capacity: u32,
    pub max_weight: f32,
    pub max_energy: f32,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_capacity: 100,
            max_weight: 50.0,
            max_energy: 100.0,
        }
    }
}

impl PoolLimits {
    pub fn new(max_capacity: u32, max_weight: f32, max_energy: f32) -> Self {
        Self {
            max_capacity,
            max_weight,
            max_energy,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.max_weight.is_finite() && self.max_weight >= 0.0) {
            return Err(Error::InvalidConfig(
                "max_weight must be finite and >= 0".into(),
            ));
        }
        if !(self.max_energy.is_finite() && self.max_energy >= 0.0) {
            return Err(Error::InvalidConfig(
                "max_energy must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of [`ResourcePool::try_admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    RejectedCapacity,
    RejectedWeight,
}

impl Admission {
    pub fn is_accepted(self) -> bool {
        matches!(self, Admission::Accepted)
    }

    pub fn reject_reason(self) -> Option<RejectReason> {
        match self {
            Admission::Accepted => None,
            Admission::RejectedCapacity => Some(RejectReason::Capacity),
            Admission::RejectedWeight => Some(RejectReason::Weight),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recharge {
    Full,
    Amount(f32),
}

/// Capacity and energy of the capture tool.
///
/// `used_capacity <= max_capacity` is not enforced: an overflowing admission is
/// what produces a rejection. Energy always stays within `[0, max_energy]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePool {
    limits: PoolLimits,
    used_capacity: u32,
    used_weight: f32,
    energy: f32,
    depleted: bool,
}

impl Default for ResourcePool {
    fn default() -> Self {
        Self::new(PoolLimits::default())
    }
}

impl ResourcePool {
    pub fn try_new(limits: PoolLimits) -> Result<Self> {
        limits.validate()?;
        Ok(Self::new(limits))
    }

    /// Full energy, nothing stored.
    pub fn new(limits: PoolLimits) -> Self {
        debug_assert!(limits.max_energy >= 0.0, "max_energy must be >= 0");
        Self {
            limits,
            used_capacity: 0,
            used_weight: 0.0,
            energy: limits.max_energy,
            depleted: false,
        }
    }

    /// Admit an item, committing both increments only if neither ceiling is
    /// exceeded.
    pub fn try_admit(&mut self, footprint: u32, weight: f32) -> Admission {
        if u64::from(self.used_capacity) + u64::from(footprint) > u64::from(self.limits.max_capacity)
        {
            debug!(
                "Admission refused: storage {}+{} > {}",
                self.used_capacity, footprint, self.limits.max_capacity
            );
            return Admission::RejectedCapacity;
        }
        let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
        if self.used_weight + weight > self.limits.max_weight {
            debug!(
                "Admission refused: weight {:.1}+{:.1} > {:.1}",
                self.used_weight, weight, self.limits.max_weight
            );
            return Admission::RejectedWeight;
        }

        self.used_capacity += footprint;
        self.used_weight += weight;
        Admission::Accepted
    }

    /// Give back capacity and weight, e.g. when items leave the inventory.
    pub fn release(&mut self, footprint: u32, weight: f32) {
        self.used_capacity = self.used_capacity.saturating_sub(footprint);
        if weight.is_finite() {
            self.used_weight = (self.used_weight - weight).max(0.0);
        }
    }

    /// Subtract `rate * dt` from the energy. Returns `true` exactly on the call
    /// that depletes the pool.
    pub fn drain(&mut self, rate: f32, dt: f32) -> bool {
        let amount = rate * dt;
        if !(amount.is_finite() && amount > 0.0) || self.depleted {
            return false;
        }
        self.energy = (self.energy - amount).max(0.0);
        if self.energy == 0.0 {
            self.depleted = true;
            info!("Energy depleted.");
            return true;
        }
        false
    }

    /// Raise energy (clamped to max). Clears depletion when energy ends up > 0.
    pub fn recharge(&mut self, recharge: Recharge) {
        self.energy = match recharge {
            Recharge::Full => self.limits.max_energy,
            Recharge::Amount(x) if x.is_finite() && x > 0.0 => {
                (self.energy + x).min(self.limits.max_energy)
            }
            Recharge::Amount(_) => self.energy,
        };
        if self.energy > 0.0 {
            self.depleted = false;
        }
        info!(
            "Energy recharged to {:.1}/{:.1}",
            self.energy, self.limits.max_energy
        );
    }

    pub fn upgrade_capacity(&mut self, amount: u32) {
        self.limits.max_capacity = self.limits.max_capacity.saturating_add(amount);
        info!("Capacity upgraded to {}", self.limits.max_capacity);
    }

    /// Raise max energy, refill to the new max and clear depletion.
    pub fn upgrade_energy_max(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.limits.max_energy += amount;
        }
        self.energy = self.limits.max_energy;
        if self.energy > 0.0 {
            self.depleted = false;
        }
        info!("Max energy upgraded to {:.1}", self.limits.max_energy);
    }

    pub fn limits(&self) -> &PoolLimits {
        &self.limits
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn max_energy(&self) -> f32 {
        self.limits.max_energy
    }

    pub fn used_capacity(&self) -> u32 {
        self.used_capacity
    }

    pub fn max_capacity(&self) -> u32 {
        self.limits.max_capacity
    }

    pub fn used_weight(&self) -> f32 {
        self.used_weight
    }

    pub fn max_weight(&self) -> f32 {
        self.limits.max_weight
    }

    pub fn is_depleted(&self) -> bool {
        self.depleted
    }

    pub fn is_full(&self) -> bool {
        self.used_capacity >= self.limits.max_capacity || self.used_weight >= self.limits.max_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(capacity: u32, weight: f32, energy: f32) -> ResourcePool {
        ResourcePool::new(PoolLimits::new(capacity, weight, energy))
    }

    #[test]
    fn overflowing_admission_leaves_pool_untouched() {
        let mut p = pool(10, 50.0, 100.0);
        assert!(p.try_admit(8, 1.0).is_accepted());
        assert_eq!(p.try_admit(5, 2.0), Admission::RejectedCapacity);
        assert_eq!(p.used_capacity(), 8);
        assert_eq!(p.used_weight(), 1.0);
    }

    #[test]
    fn exact_fit_is_accepted() {
        let mut p = pool(10, 5.0, 100.0);
        assert!(p.try_admit(10, 5.0).is_accepted());
        assert!(p.is_full());
        assert_eq!(p.try_admit(0, 0.1), Admission::RejectedWeight);
        assert_eq!(
            Admission::RejectedWeight.reject_reason(),
            Some(RejectReason::Weight)
        );
    }

    #[test]
    fn huge_footprint_does_not_overflow() {
        let mut p = pool(u32::MAX, 50.0, 100.0);
        assert!(p.try_admit(u32::MAX, 0.0).is_accepted());
        assert_eq!(p.try_admit(1, 0.0), Admission::RejectedCapacity);
    }

    #[test]
    fn drain_flags_depletion_once() {
        let mut p = pool(10, 10.0, 1.0);
        assert!(!p.drain(5.0, 0.1));
        assert!(p.drain(5.0, 0.1));
        assert!(p.is_depleted());
        assert_eq!(p.energy(), 0.0);
        assert!(!p.drain(5.0, 0.1));
    }

    #[test]
    fn recharge_clears_depletion_only_above_zero() {
        let mut p = pool(10, 10.0, 1.0);
        p.drain(10.0, 1.0);
        p.recharge(Recharge::Amount(0.0));
        assert!(p.is_depleted());
        p.recharge(Recharge::Amount(0.25));
        assert!(!p.is_depleted());
        assert_eq!(p.energy(), 0.25);
        p.recharge(Recharge::Amount(10.0));
        assert_eq!(p.energy(), 1.0);
    }

    #[test]
    fn upgrades_raise_limits() {
        let mut p = pool(10, 10.0, 10.0);
        p.drain(100.0, 1.0);
        p.upgrade_energy_max(5.0);
        assert_eq!(p.energy(), 15.0);
        assert!(!p.is_depleted());
        p.upgrade_capacity(5);
        assert_eq!(p.max_capacity(), 15);
    }

    #[test]
    fn release_saturates() {
        let mut p = pool(10, 10.0, 10.0);
        p.try_admit(3, 2.0);
        p.release(5, 4.0);
        assert_eq!(p.used_capacity(), 0);
        assert_eq!(p.used_weight(), 0.0);
    }

    #[test]
    fn limits_validate() {
        assert!(ResourcePool::try_new(PoolLimits::new(1, -1.0, 1.0)).is_err());
        assert!(ResourcePool::try_new(PoolLimits::default()).is_ok());
    }
}
