//! Finite ore deposits backing each planet's mines.
//!
//! Mines do not create resources from nothing: every unit mined is
//! drawn from a finite per-planet deposit. Extraction efficiency is
//! full until the deposit runs low, then falls off linearly, so
//! long-neglected mining worlds taper off instead of stopping dead.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::DepositConfig;
use crate::math::{fixed_serde, percent, Fixed};
use crate::position::Position;
use crate::resources::ResourceKind;

/// One resource's deposit on a planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DepositState {
    /// Size at planet creation.
    #[serde(with = "fixed_serde")]
    pub initial: Fixed,
    /// Amount still extractable.
    #[serde(with = "fixed_serde")]
    pub current: Fixed,
    /// Low-deposit warning already raised.
    #[serde(default)]
    pub warned: bool,
    /// Depletion notice already raised.
    #[serde(default)]
    pub depleted_notified: bool,
}

impl DepositState {
    /// Fresh deposit of the given size.
    #[must_use]
    pub fn new(size: Fixed) -> Self {
        Self {
            initial: size,
            current: size,
            warned: false,
            depleted_notified: false,
        }
    }

    /// Fraction still in the ground, zero for exhausted deposits.
    #[must_use]
    pub fn remaining_ratio(&self) -> Fixed {
        if self.initial <= Fixed::ZERO || self.current <= Fixed::ZERO {
            Fixed::ZERO
        } else {
            self.current / self.initial
        }
    }

    /// Extraction efficiency given the configured decay threshold.
    ///
    /// Full efficiency down to the threshold, then a linear ramp to
    /// zero as the deposit empties.
    #[must_use]
    pub fn efficiency(&self, decay_threshold: Fixed) -> Fixed {
        if self.initial <= Fixed::ZERO || self.current <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        let remaining = self.remaining_ratio();
        if remaining >= decay_threshold {
            Fixed::ONE
        } else if decay_threshold <= Fixed::ZERO {
            Fixed::ONE
        } else {
            remaining / decay_threshold
        }
    }

    /// Extract up to `amount`, returning how much actually came out.
    ///
    /// Never yields more than remains and never drives the deposit
    /// negative.
    pub fn consume(&mut self, amount: Fixed) -> Fixed {
        if amount <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        let extracted = amount.min(self.current).max(Fixed::ZERO);
        self.current -= extracted;
        extracted
    }

    /// Latch the low-deposit warning; true exactly once.
    pub fn check_warning(&mut self, warning_threshold: Fixed) -> bool {
        if !self.warned
            && self.initial > Fixed::ZERO
            && self.remaining_ratio() <= warning_threshold
        {
            self.warned = true;
            return true;
        }
        false
    }

    /// Latch the depletion notice; true exactly once.
    pub fn check_depleted(&mut self) -> bool {
        if !self.depleted_notified && self.initial > Fixed::ZERO && self.current <= Fixed::ZERO {
            self.depleted_notified = true;
            return true;
        }
        false
    }
}

/// The three ore deposits of one planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OreDeposits {
    /// Metal deposit.
    pub metal: DepositState,
    /// Crystal deposit.
    pub crystal: DepositState,
    /// Deuterium deposit.
    pub deuterium: DepositState,
}

impl OreDeposits {
    /// Roll deposits for a newly formed planet.
    ///
    /// Sizing is deterministic in position (temperate mid-system slots
    /// and outer galaxies are richer) with a bounded random variance
    /// on top.
    /// The variance is intentionally drawn from the caller's entropy
    /// source rather than a world seed: two colonies on mirrored
    /// coordinates should not have identical geology.
    pub fn generate<R: Rng + ?Sized>(position: Position, cfg: &DepositConfig, rng: &mut R) -> Self {
        let slot_factor = cfg.slot_multiplier(position.slot);
        let galaxy_factor = Fixed::ONE
            + percent(i64::from(cfg.galaxy_bonus_percent))
                * Fixed::from_num(position.galaxy.saturating_sub(1));
        let mut roll = |base: i64| {
            let variance = i64::from(cfg.variance_percent);
            let jitter = rng.gen_range(-variance..=variance);
            let size = Fixed::from_num(base)
                .saturating_mul(slot_factor)
                .saturating_mul(galaxy_factor)
                .saturating_mul(Fixed::ONE + percent(jitter));
            DepositState::new(size.floor())
        };
        Self {
            metal: roll(cfg.base_metal),
            crystal: roll(cfg.base_crystal),
            deuterium: roll(cfg.base_deuterium),
        }
    }

    /// The deposit backing a mined resource, if that kind is mined.
    #[must_use]
    pub fn state(&self, kind: ResourceKind) -> Option<&DepositState> {
        match kind {
            ResourceKind::Metal => Some(&self.metal),
            ResourceKind::Crystal => Some(&self.crystal),
            ResourceKind::Deuterium => Some(&self.deuterium),
            ResourceKind::DarkMatter | ResourceKind::Energy => None,
        }
    }

    /// Mutable access to the deposit backing a mined resource.
    pub fn state_mut(&mut self, kind: ResourceKind) -> Option<&mut DepositState> {
        match kind {
            ResourceKind::Metal => Some(&mut self.metal),
            ResourceKind::Crystal => Some(&mut self.crystal),
            ResourceKind::Deuterium => Some(&mut self.deuterium),
            ResourceKind::DarkMatter | ResourceKind::Energy => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn cfg() -> DepositConfig {
        DepositConfig::default()
    }

    #[test]
    fn test_consume_clamps_to_remaining() {
        let mut deposit = DepositState::new(Fixed::from_num(100));
        assert_eq!(deposit.consume(Fixed::from_num(60)), Fixed::from_num(60));
        assert_eq!(deposit.consume(Fixed::from_num(60)), Fixed::from_num(40));
        assert_eq!(deposit.consume(Fixed::from_num(60)), Fixed::ZERO);
        assert_eq!(deposit.current, Fixed::ZERO);
    }

    #[test]
    fn test_consume_ignores_non_positive_requests() {
        let mut deposit = DepositState::new(Fixed::from_num(100));
        assert_eq!(deposit.consume(Fixed::from_num(-5)), Fixed::ZERO);
        assert_eq!(deposit.current, Fixed::from_num(100));
    }

    #[test]
    fn test_efficiency_full_above_threshold() {
        let mut deposit = DepositState::new(Fixed::from_num(1_000));
        let threshold = percent(30);
        assert_eq!(deposit.efficiency(threshold), Fixed::ONE);
        deposit.consume(Fixed::from_num(700));
        // Exactly at the threshold still counts as full
        assert_eq!(deposit.efficiency(threshold), Fixed::ONE);
    }

    #[test]
    fn test_efficiency_decays_linearly_below_threshold() {
        let mut deposit = DepositState::new(Fixed::from_num(1_000));
        let threshold = percent(30);
        deposit.consume(Fixed::from_num(850));
        // 15% remaining of a 30% threshold => half efficiency
        assert_eq!(deposit.efficiency(threshold), Fixed::from_num(0.5));
        deposit.consume(Fixed::from_num(150));
        assert_eq!(deposit.efficiency(threshold), Fixed::ZERO);
    }

    #[test]
    fn test_zero_initial_has_zero_efficiency() {
        let deposit = DepositState::new(Fixed::ZERO);
        assert_eq!(deposit.efficiency(percent(30)), Fixed::ZERO);
    }

    #[test]
    fn test_warning_and_depletion_latch_once() {
        let mut deposit = DepositState::new(Fixed::from_num(100));
        deposit.consume(Fixed::from_num(90));
        assert!(deposit.check_warning(percent(15)));
        assert!(!deposit.check_warning(percent(15)));
        deposit.consume(Fixed::from_num(10));
        assert!(deposit.check_depleted());
        assert!(!deposit.check_depleted());
    }

    #[test]
    fn test_generation_respects_position_richness() {
        let config = cfg();
        let mut rng = StdRng::seed_from_u64(7);
        // Same seed, richer slot and galaxy => strictly larger deposit
        let poor = OreDeposits::generate(Position::new(1, 50, 1), &config, &mut rng);
        let mut rng = StdRng::seed_from_u64(7);
        let rich = OreDeposits::generate(Position::new(5, 50, 8), &config, &mut rng);
        assert!(rich.metal.initial > poor.metal.initial);
        assert!(rich.deuterium.initial > poor.deuterium.initial);
    }

    #[test]
    fn test_generation_variance_is_bounded() {
        let config = cfg();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            let deposits = OreDeposits::generate(Position::new(3, 100, 8), &config, &mut rng);
            let nominal = Fixed::from_num(config.base_metal)
                * config.slot_multiplier(8)
                * (Fixed::ONE + percent(i64::from(config.galaxy_bonus_percent)) * Fixed::from_num(2));
            let lo = nominal * (Fixed::ONE - percent(i64::from(config.variance_percent)));
            let hi = nominal * (Fixed::ONE + percent(i64::from(config.variance_percent)));
            assert!(deposits.metal.initial >= lo.floor() && deposits.metal.initial <= hi);
        }
    }
}
