//! Engine tuning knobs.
//!
//! Externalized constants so a deployment can adjust pacing without
//! recompiling. Everything has a playable default; `EngineConfig` is
//! passed explicitly into the engine entry points rather than read
//! from any global.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, percent, Fixed};
use crate::resources::Resources;
use crate::time::MS_PER_HOUR;

/// Sizing and decay parameters for finite ore deposits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepositConfig {
    /// Base metal deposit before multipliers.
    pub base_metal: i64,
    /// Base crystal deposit before multipliers.
    pub base_crystal: i64,
    /// Base deuterium deposit before multipliers.
    pub base_deuterium: i64,
    /// Richness bonus per galaxy beyond the first, in percent.
    pub galaxy_bonus_percent: u16,
    /// Random sizing variance, in percent of the deterministic size.
    pub variance_percent: u16,
    /// Remaining fraction below which extraction efficiency decays.
    #[serde(with = "fixed_serde")]
    pub decay_threshold: Fixed,
    /// Remaining fraction that triggers a low-deposit warning.
    #[serde(with = "fixed_serde")]
    pub warning_threshold: Fixed,
    /// Per-slot richness multiplier, in percent, slots 1 through 15.
    pub slot_multiplier_percent: [u16; 15],
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            base_metal: 3_000_000,
            base_crystal: 1_800_000,
            base_deuterium: 1_000_000,
            galaxy_bonus_percent: 5,
            variance_percent: 15,
            decay_threshold: percent(30),
            warning_threshold: percent(15),
            slot_multiplier_percent: [
                60, 70, 80, 90, 100, 110, 120, 130, 120, 110, 100, 90, 80, 70, 60,
            ],
        }
    }
}

impl DepositConfig {
    /// Richness multiplier for a 1-based slot index.
    #[must_use]
    pub fn slot_multiplier(&self, slot: u8) -> Fixed {
        let index = usize::from(slot.clamp(1, 15)) - 1;
        percent(i64::from(self.slot_multiplier_percent[index]))
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Global pacing multiplier applied to production and travel.
    pub universe_speed: u32,
    /// Base hourly income independent of mines.
    pub base_income: Resources,
    /// Storage cap at storage level 0.
    pub storage_base_capacity: i64,
    /// Account dark matter cap before tanks.
    pub dark_matter_base_capacity: i64,
    /// Deposit sizing and decay.
    pub deposits: DepositConfig,
    /// Shortest possible construction time.
    pub min_build_ms: i64,
    /// Maximum combat rounds before a draw is declared.
    pub max_battle_rounds: u32,
    /// Fraction of target stocks plundered on an attacker win.
    #[serde(with = "fixed_serde")]
    pub plunder_fraction: Fixed,
    /// Fraction of destroyed ship cost deposited as debris.
    #[serde(with = "fixed_serde")]
    pub debris_fraction: Fixed,
    /// Chance for each destroyed defense unit to rematerialize.
    #[serde(with = "fixed_serde")]
    pub defense_restore_chance: Fixed,
    /// Debris mass per percent point of moon chance.
    pub moon_chance_divisor: i64,
    /// Moon chance ceiling in percent.
    pub moon_chance_cap: u32,
    /// Time a fleet loiters in the expedition zone.
    pub expedition_hold_ms: i64,
    /// Debris fields evaporate after this long.
    pub debris_expiry_ms: i64,
    /// Fleet slots before technology and officer bonuses.
    pub base_fleet_slots: u32,
    /// Active queue entries per queue before officer bonuses.
    pub base_queue_slots: u32,
    /// Smallest gift an NPC will consider.
    pub gift_min_total: i64,
    /// Resource value per reputation point gained from gifts.
    pub gift_points_divisor: i64,
    /// Reputation gain cap for a single gift.
    pub gift_gain_cap: i32,
    /// Notifications kept per player.
    pub notification_cap: usize,
    /// Reports kept per report log.
    pub report_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            universe_speed: 1,
            base_income: Resources::new(30, 15, 0),
            storage_base_capacity: 10_000,
            dark_matter_base_capacity: 10_000,
            deposits: DepositConfig::default(),
            min_build_ms: 1_000,
            max_battle_rounds: 6,
            plunder_fraction: percent(50),
            debris_fraction: percent(30),
            defense_restore_chance: percent(70),
            moon_chance_divisor: 100_000,
            moon_chance_cap: 20,
            expedition_hold_ms: MS_PER_HOUR,
            debris_expiry_ms: 72 * MS_PER_HOUR,
            base_fleet_slots: 1,
            base_queue_slots: 1,
            gift_min_total: 1_000,
            gift_points_divisor: 2_500,
            gift_gain_cap: 15,
            notification_cap: 50,
            report_cap: 30,
        }
    }
}

impl EngineConfig {
    /// Parse a config override from RON text.
    ///
    /// Missing fields fall back to defaults, so deployment files only
    /// list what they change.
    pub fn from_ron_str(text: &str) -> crate::error::Result<Self> {
        ron::from_str(text).map_err(|e| crate::error::GameError::DataParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_playable() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.universe_speed, 1);
        assert!(cfg.plunder_fraction < Fixed::ONE);
        assert!(cfg.deposits.decay_threshold > cfg.deposits.warning_threshold);
    }

    #[test]
    fn test_slot_multiplier_peaks_mid_system() {
        let deposits = DepositConfig::default();
        assert!(deposits.slot_multiplier(8) > deposits.slot_multiplier(1));
        assert!(deposits.slot_multiplier(8) > deposits.slot_multiplier(15));
        // Out-of-range slots clamp instead of panicking
        assert_eq!(deposits.slot_multiplier(0), deposits.slot_multiplier(1));
    }

    #[test]
    fn test_partial_ron_override() {
        let cfg = EngineConfig::from_ron_str("(universeSpeed: 4)").unwrap();
        assert_eq!(cfg.universe_speed, 4);
        assert_eq!(cfg.max_battle_rounds, 6);
    }

    #[test]
    fn test_malformed_ron_is_reported() {
        assert!(EngineConfig::from_ron_str("(universeSpeed: )").is_err());
    }
}
