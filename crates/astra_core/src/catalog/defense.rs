//! Defense catalog: stationary units, missiles and count storage.

use serde::{Deserialize, Serialize};

use crate::catalog::buildings::BuildingKind;
use crate::catalog::ships::CombatStats;
use crate::catalog::Requirement;
use crate::math::Fixed;
use crate::resources::Resources;

/// Every buildable defense kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefenseKind {
    /// Cheap bulk defense.
    RocketLauncher,
    /// Light energy weapon.
    LightLaser,
    /// Heavy energy weapon.
    HeavyLaser,
    /// Heavy kinetic weapon.
    GaussCannon,
    /// Shield-heavy disruptor.
    IonCannon,
    /// Top-tier turret.
    PlasmaTurret,
    /// Planet-wide shield, one per planet.
    SmallShieldDome,
    /// Stronger planet-wide shield, one per planet.
    LargeShieldDome,
    /// Intercepts incoming interplanetary missiles one for one.
    AntiBallisticMissile,
    /// Offensive missile launched at enemy defense.
    InterplanetaryMissile,
    /// Massive energy barrier, one per planet.
    PlanetaryShield,
}

impl DefenseKind {
    /// All defense kinds in persisted field order.
    pub const ALL: [Self; 11] = [
        Self::RocketLauncher,
        Self::LightLaser,
        Self::HeavyLaser,
        Self::GaussCannon,
        Self::IonCannon,
        Self::PlasmaTurret,
        Self::SmallShieldDome,
        Self::LargeShieldDome,
        Self::AntiBallisticMissile,
        Self::InterplanetaryMissile,
        Self::PlanetaryShield,
    ];

    /// Stable identifier matching the persisted field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RocketLauncher => "rocketLauncher",
            Self::LightLaser => "lightLaser",
            Self::HeavyLaser => "heavyLaser",
            Self::GaussCannon => "gaussCannon",
            Self::IonCannon => "ionCannon",
            Self::PlasmaTurret => "plasmaTurret",
            Self::SmallShieldDome => "smallShieldDome",
            Self::LargeShieldDome => "largeShieldDome",
            Self::AntiBallisticMissile => "antiBallisticMissile",
            Self::InterplanetaryMissile => "interplanetaryMissile",
            Self::PlanetaryShield => "planetaryShield",
        }
    }

    /// Construction cost per unit.
    #[must_use]
    pub fn cost(self) -> Resources {
        let (metal, crystal, deuterium) = match self {
            Self::RocketLauncher => (2_000, 0, 0),
            Self::LightLaser => (1_500, 500, 0),
            Self::HeavyLaser => (6_000, 2_000, 0),
            Self::GaussCannon => (20_000, 15_000, 2_000),
            Self::IonCannon => (5_000, 3_000, 0),
            Self::PlasmaTurret => (50_000, 50_000, 30_000),
            Self::SmallShieldDome => (10_000, 10_000, 0),
            Self::LargeShieldDome => (50_000, 50_000, 0),
            Self::AntiBallisticMissile => (8_000, 0, 2_000),
            Self::InterplanetaryMissile => (12_500, 2_500, 10_000),
            Self::PlanetaryShield => (500_000, 500_000, 100_000),
        };
        Resources::new(metal, crystal, deuterium)
    }

    /// Combat statistics before technology bonuses.
    #[must_use]
    pub const fn combat_stats(self) -> CombatStats {
        let (weapon, shield, armor) = match self {
            Self::RocketLauncher => (80, 20, 200),
            Self::LightLaser => (100, 25, 200),
            Self::HeavyLaser => (250, 100, 800),
            Self::GaussCannon => (1_100, 200, 3_500),
            Self::IonCannon => (150, 500, 800),
            Self::PlasmaTurret => (3_000, 300, 10_000),
            Self::SmallShieldDome => (1, 2_000, 2_000),
            Self::LargeShieldDome => (1, 10_000, 10_000),
            Self::AntiBallisticMissile => (1, 1, 800),
            Self::InterplanetaryMissile => (12_000, 1, 1_500),
            Self::PlanetaryShield => (0, 100_000, 100_000),
        };
        CombatStats {
            weapon,
            shield,
            armor,
        }
    }

    /// Whether only a single unit may exist per planet.
    #[must_use]
    pub const fn unique_per_planet(self) -> bool {
        matches!(
            self,
            Self::SmallShieldDome | Self::LargeShieldDome | Self::PlanetaryShield
        )
    }

    /// Whether the unit sits in the missile silo instead of the field.
    #[must_use]
    pub const fn is_missile(self) -> bool {
        matches!(self, Self::AntiBallisticMissile | Self::InterplanetaryMissile)
    }

    /// Prerequisites to build this defense.
    #[must_use]
    pub const fn requirements(self) -> &'static [Requirement] {
        use crate::catalog::technologies::TechnologyKind as T;
        use BuildingKind as B;
        use Requirement as R;
        match self {
            Self::RocketLauncher => &[R::Building(B::Hangar, 1)],
            Self::LightLaser => &[R::Building(B::Hangar, 1), R::Technology(T::LaserTechnology, 3)],
            Self::HeavyLaser => &[
                R::Building(B::Hangar, 2),
                R::Technology(T::LaserTechnology, 6),
                R::Technology(T::EnergyTechnology, 3),
            ],
            Self::GaussCannon => &[
                R::Building(B::Hangar, 4),
                R::Technology(T::WeaponsTechnology, 3),
                R::Technology(T::EnergyTechnology, 6),
                R::Technology(T::ShieldingTechnology, 1),
            ],
            Self::IonCannon => &[R::Building(B::Hangar, 3), R::Technology(T::IonTechnology, 4)],
            Self::PlasmaTurret => &[
                R::Building(B::Hangar, 6),
                R::Technology(T::PlasmaTechnology, 7),
            ],
            Self::SmallShieldDome => &[
                R::Building(B::Hangar, 1),
                R::Technology(T::ShieldingTechnology, 2),
            ],
            Self::LargeShieldDome => &[
                R::Building(B::Hangar, 5),
                R::Technology(T::ShieldingTechnology, 6),
            ],
            Self::AntiBallisticMissile => &[R::Building(B::MissileSilo, 2)],
            Self::InterplanetaryMissile => &[
                R::Building(B::MissileSilo, 4),
                R::Technology(T::ImpulseDrive, 1),
            ],
            Self::PlanetaryShield => &[
                R::Building(B::Hangar, 8),
                R::Technology(T::ShieldingTechnology, 10),
                R::Technology(T::EnergyTechnology, 12),
            ],
        }
    }
}

/// Defense counts of a single planet or moon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DefenseCounts {
    /// Rocket launchers.
    pub rocket_launcher: u32,
    /// Light lasers.
    pub light_laser: u32,
    /// Heavy lasers.
    pub heavy_laser: u32,
    /// Gauss cannons.
    pub gauss_cannon: u32,
    /// Ion cannons.
    pub ion_cannon: u32,
    /// Plasma turrets.
    pub plasma_turret: u32,
    /// Small shield dome (0 or 1).
    pub small_shield_dome: u32,
    /// Large shield dome (0 or 1).
    pub large_shield_dome: u32,
    /// Anti-ballistic missiles.
    pub anti_ballistic_missile: u32,
    /// Interplanetary missiles.
    pub interplanetary_missile: u32,
    /// Planetary shield (0 or 1).
    pub planetary_shield: u32,
}

impl DefenseCounts {
    /// Count of the given defense kind.
    #[must_use]
    pub const fn count(&self, kind: DefenseKind) -> u32 {
        match kind {
            DefenseKind::RocketLauncher => self.rocket_launcher,
            DefenseKind::LightLaser => self.light_laser,
            DefenseKind::HeavyLaser => self.heavy_laser,
            DefenseKind::GaussCannon => self.gauss_cannon,
            DefenseKind::IonCannon => self.ion_cannon,
            DefenseKind::PlasmaTurret => self.plasma_turret,
            DefenseKind::SmallShieldDome => self.small_shield_dome,
            DefenseKind::LargeShieldDome => self.large_shield_dome,
            DefenseKind::AntiBallisticMissile => self.anti_ballistic_missile,
            DefenseKind::InterplanetaryMissile => self.interplanetary_missile,
            DefenseKind::PlanetaryShield => self.planetary_shield,
        }
    }

    /// Mutable count of the given defense kind.
    pub fn count_mut(&mut self, kind: DefenseKind) -> &mut u32 {
        match kind {
            DefenseKind::RocketLauncher => &mut self.rocket_launcher,
            DefenseKind::LightLaser => &mut self.light_laser,
            DefenseKind::HeavyLaser => &mut self.heavy_laser,
            DefenseKind::GaussCannon => &mut self.gauss_cannon,
            DefenseKind::IonCannon => &mut self.ion_cannon,
            DefenseKind::PlasmaTurret => &mut self.plasma_turret,
            DefenseKind::SmallShieldDome => &mut self.small_shield_dome,
            DefenseKind::LargeShieldDome => &mut self.large_shield_dome,
            DefenseKind::AntiBallisticMissile => &mut self.anti_ballistic_missile,
            DefenseKind::InterplanetaryMissile => &mut self.interplanetary_missile,
            DefenseKind::PlanetaryShield => &mut self.planetary_shield,
        }
    }

    /// Total number of defense units.
    #[must_use]
    pub fn total(&self) -> u32 {
        DefenseKind::ALL.iter().map(|k| self.count(*k)).sum()
    }

    /// Whether no defense units are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Iterate over `(kind, count)` pairs with count > 0.
    pub fn iter_present(&self) -> impl Iterator<Item = (DefenseKind, u32)> + '_ {
        DefenseKind::ALL
            .into_iter()
            .map(|k| (k, self.count(k)))
            .filter(|(_, count)| *count > 0)
    }

    /// Total build cost of every unit.
    #[must_use]
    pub fn build_cost(&self) -> Resources {
        let mut cost = Resources::ZERO;
        for (kind, count) in self.iter_present() {
            cost += kind.cost().scale(Fixed::from_num(count));
        }
        cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_kinds() {
        assert!(DefenseKind::SmallShieldDome.unique_per_planet());
        assert!(DefenseKind::PlanetaryShield.unique_per_planet());
        assert!(!DefenseKind::RocketLauncher.unique_per_planet());
    }

    #[test]
    fn test_missile_kinds() {
        assert!(DefenseKind::AntiBallisticMissile.is_missile());
        assert!(DefenseKind::InterplanetaryMissile.is_missile());
        assert!(!DefenseKind::GaussCannon.is_missile());
    }

    #[test]
    fn test_count_accessors_cover_every_kind() {
        let mut counts = DefenseCounts::default();
        for (i, kind) in DefenseKind::ALL.into_iter().enumerate() {
            *counts.count_mut(kind) = i as u32 + 1;
        }
        for (i, kind) in DefenseKind::ALL.into_iter().enumerate() {
            assert_eq!(counts.count(kind), i as u32 + 1, "kind {}", kind.name());
        }
    }

    #[test]
    fn test_build_cost() {
        let counts = DefenseCounts {
            rocket_launcher: 3,
            light_laser: 1,
            ..Default::default()
        };
        assert_eq!(counts.build_cost(), Resources::new(7_500, 500, 0));
    }
}
