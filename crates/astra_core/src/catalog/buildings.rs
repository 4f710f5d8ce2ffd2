//! Building catalog: kinds, costs, growth curves and level storage.
//!
//! Costs follow the classic exponential scheme `base * growth^(level-1)`
//! for the upgrade to `level`. The variant serde names double as the
//! persisted field names, so saved planets keep their shape.

use serde::{Deserialize, Serialize};

use crate::catalog::Requirement;
use crate::math::{pow_growth, Fixed};
use crate::resources::Resources;

/// Every constructible building kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildingKind {
    /// Extracts metal from the planet's deposit.
    MetalMine,
    /// Extracts crystal from the planet's deposit.
    CrystalMine,
    /// Synthesizes deuterium; output scales with planet temperature.
    DeuteriumSynthesizer,
    /// Primary energy producer.
    SolarPlant,
    /// Burns deuterium for energy; scales with energy technology.
    FusionReactor,
    /// Speeds up construction.
    RoboticsFactory,
    /// Halves construction time per level.
    NaniteFactory,
    /// Required for ship construction; level gates ship kinds.
    Shipyard,
    /// Required for defense construction.
    Hangar,
    /// Required for research; level gates technologies.
    ResearchLab,
    /// Raises the metal storage cap.
    MetalStorage,
    /// Raises the crystal storage cap.
    CrystalStorage,
    /// Raises the deuterium storage cap.
    DeuteriumTank,
    /// Trickle source of account-scoped dark matter.
    DarkMatterCollector,
    /// Raises the account dark matter cap.
    DarkMatterTank,
    /// Stores interplanetary and anti-ballistic missiles.
    MissileSilo,
    /// Adds usable fields to the planet.
    Terraformer,
    /// Moon-only: adds usable fields to the moon.
    LunarBase,
    /// Moon-only: long-range fleet surveillance.
    SensorPhalanx,
    /// Moon-only: instant fleet transfer between gates.
    JumpGate,
    /// Gates deathstar construction.
    PlanetDestroyerFactory,
}

impl BuildingKind {
    /// All building kinds in persisted field order.
    pub const ALL: [Self; 21] = [
        Self::MetalMine,
        Self::CrystalMine,
        Self::DeuteriumSynthesizer,
        Self::SolarPlant,
        Self::FusionReactor,
        Self::RoboticsFactory,
        Self::NaniteFactory,
        Self::Shipyard,
        Self::Hangar,
        Self::ResearchLab,
        Self::MetalStorage,
        Self::CrystalStorage,
        Self::DeuteriumTank,
        Self::DarkMatterCollector,
        Self::DarkMatterTank,
        Self::MissileSilo,
        Self::Terraformer,
        Self::LunarBase,
        Self::SensorPhalanx,
        Self::JumpGate,
        Self::PlanetDestroyerFactory,
    ];

    /// Stable identifier matching the persisted field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MetalMine => "metalMine",
            Self::CrystalMine => "crystalMine",
            Self::DeuteriumSynthesizer => "deuteriumSynthesizer",
            Self::SolarPlant => "solarPlant",
            Self::FusionReactor => "fusionReactor",
            Self::RoboticsFactory => "roboticsFactory",
            Self::NaniteFactory => "naniteFactory",
            Self::Shipyard => "shipyard",
            Self::Hangar => "hangar",
            Self::ResearchLab => "researchLab",
            Self::MetalStorage => "metalStorage",
            Self::CrystalStorage => "crystalStorage",
            Self::DeuteriumTank => "deuteriumTank",
            Self::DarkMatterCollector => "darkMatterCollector",
            Self::DarkMatterTank => "darkMatterTank",
            Self::MissileSilo => "missileSilo",
            Self::Terraformer => "terraformer",
            Self::LunarBase => "lunarBase",
            Self::SensorPhalanx => "sensorPhalanx",
            Self::JumpGate => "jumpGate",
            Self::PlanetDestroyerFactory => "planetDestroyerFactory",
        }
    }

    /// Cost of the first level.
    #[must_use]
    pub fn base_cost(self) -> Resources {
        let (metal, crystal, deuterium) = match self {
            Self::MetalMine => (60, 15, 0),
            Self::CrystalMine => (48, 24, 0),
            Self::DeuteriumSynthesizer => (225, 75, 0),
            Self::SolarPlant => (75, 30, 0),
            Self::FusionReactor => (900, 360, 180),
            Self::RoboticsFactory => (400, 120, 200),
            Self::NaniteFactory => (1_000_000, 500_000, 100_000),
            Self::Shipyard => (400, 200, 100),
            Self::Hangar => (600, 300, 100),
            Self::ResearchLab => (200, 400, 200),
            Self::MetalStorage => (1_000, 0, 0),
            Self::CrystalStorage => (1_000, 500, 0),
            Self::DeuteriumTank => (1_000, 1_000, 0),
            Self::DarkMatterCollector => (2_000, 4_000, 1_000),
            Self::DarkMatterTank => (3_000, 2_000, 1_000),
            Self::MissileSilo => (20_000, 20_000, 1_000),
            Self::Terraformer => (0, 50_000, 100_000),
            Self::LunarBase => (20_000, 40_000, 20_000),
            Self::SensorPhalanx => (20_000, 40_000, 20_000),
            Self::JumpGate => (2_000_000, 4_000_000, 2_000_000),
            Self::PlanetDestroyerFactory => (5_000_000, 2_500_000, 1_000_000),
        };
        Resources::new(metal, crystal, deuterium)
    }

    /// Per-level cost growth factor.
    #[must_use]
    pub fn growth(self) -> Fixed {
        let tenths = match self {
            Self::MetalMine | Self::DeuteriumSynthesizer | Self::SolarPlant => 15,
            Self::CrystalMine => 16,
            Self::FusionReactor | Self::DarkMatterCollector => 18,
            _ => 20,
        };
        Fixed::from_num(tenths) / Fixed::from_num(10)
    }

    /// Cost of upgrading to `level` (1-based).
    ///
    /// Level 0 requests are treated as level 1; callers never demolish.
    #[must_use]
    pub fn cost(self, level: u32) -> Resources {
        let factor = pow_growth(self.growth(), level.saturating_sub(1));
        self.base_cost().scale(factor)
    }

    /// Whether this building can only be raised on a moon.
    #[must_use]
    pub const fn moon_only(self) -> bool {
        matches!(self, Self::LunarBase | Self::SensorPhalanx | Self::JumpGate)
    }

    /// Whether a moon can host this building at all.
    ///
    /// Moons have no deposits and no stocks, so production and storage
    /// chains stay planetside; only the lunar installations and the
    /// robotics to speed them up go here.
    #[must_use]
    pub const fn buildable_on_moon(self) -> bool {
        matches!(
            self,
            Self::LunarBase | Self::SensorPhalanx | Self::JumpGate | Self::RoboticsFactory
        )
    }

    /// Prerequisites for the first level.
    #[must_use]
    pub const fn requirements(self) -> &'static [Requirement] {
        use crate::catalog::technologies::TechnologyKind as T;
        use Requirement as R;
        match self {
            Self::FusionReactor => &[
                R::Building(Self::DeuteriumSynthesizer, 5),
                R::Technology(T::EnergyTechnology, 3),
            ],
            Self::NaniteFactory => &[
                R::Building(Self::RoboticsFactory, 10),
                R::Technology(T::ComputerTechnology, 10),
            ],
            Self::Shipyard => &[R::Building(Self::RoboticsFactory, 2)],
            Self::Hangar => &[R::Building(Self::Shipyard, 1)],
            Self::DarkMatterCollector => &[
                R::Technology(T::EnergyTechnology, 5),
                R::Technology(T::DarkMatterTechnology, 1),
            ],
            Self::DarkMatterTank => &[R::Building(Self::DarkMatterCollector, 1)],
            Self::MissileSilo => &[R::Building(Self::Shipyard, 1)],
            Self::Terraformer => &[
                R::Building(Self::NaniteFactory, 1),
                R::Technology(T::TerraformingTechnology, 1),
            ],
            Self::SensorPhalanx => &[R::Building(Self::LunarBase, 1)],
            Self::JumpGate => &[
                R::Building(Self::LunarBase, 1),
                R::Technology(T::HyperspaceTechnology, 7),
            ],
            Self::PlanetDestroyerFactory => &[
                R::Building(Self::NaniteFactory, 1),
                R::Technology(T::GravitonTechnology, 1),
            ],
            _ => &[],
        }
    }

    /// Extra usable fields granted per level (terraformer and lunar base).
    #[must_use]
    pub const fn fields_granted_per_level(self) -> u32 {
        match self {
            Self::Terraformer => 5,
            Self::LunarBase => 3,
            _ => 0,
        }
    }
}

/// Building levels of a single planet or moon.
///
/// Field names match the persisted document shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildingLevels {
    /// Metal mine level.
    pub metal_mine: u32,
    /// Crystal mine level.
    pub crystal_mine: u32,
    /// Deuterium synthesizer level.
    pub deuterium_synthesizer: u32,
    /// Solar plant level.
    pub solar_plant: u32,
    /// Fusion reactor level.
    pub fusion_reactor: u32,
    /// Robotics factory level.
    pub robotics_factory: u32,
    /// Nanite factory level.
    pub nanite_factory: u32,
    /// Shipyard level.
    pub shipyard: u32,
    /// Hangar level.
    pub hangar: u32,
    /// Research lab level.
    pub research_lab: u32,
    /// Metal storage level.
    pub metal_storage: u32,
    /// Crystal storage level.
    pub crystal_storage: u32,
    /// Deuterium tank level.
    pub deuterium_tank: u32,
    /// Dark matter collector level.
    pub dark_matter_collector: u32,
    /// Dark matter tank level.
    pub dark_matter_tank: u32,
    /// Missile silo level.
    pub missile_silo: u32,
    /// Terraformer level.
    pub terraformer: u32,
    /// Lunar base level (moons only).
    pub lunar_base: u32,
    /// Sensor phalanx level (moons only).
    pub sensor_phalanx: u32,
    /// Jump gate level (moons only).
    pub jump_gate: u32,
    /// Planet destroyer factory level.
    pub planet_destroyer_factory: u32,
}

impl BuildingLevels {
    /// Level of the given building.
    #[must_use]
    pub const fn level(&self, kind: BuildingKind) -> u32 {
        match kind {
            BuildingKind::MetalMine => self.metal_mine,
            BuildingKind::CrystalMine => self.crystal_mine,
            BuildingKind::DeuteriumSynthesizer => self.deuterium_synthesizer,
            BuildingKind::SolarPlant => self.solar_plant,
            BuildingKind::FusionReactor => self.fusion_reactor,
            BuildingKind::RoboticsFactory => self.robotics_factory,
            BuildingKind::NaniteFactory => self.nanite_factory,
            BuildingKind::Shipyard => self.shipyard,
            BuildingKind::Hangar => self.hangar,
            BuildingKind::ResearchLab => self.research_lab,
            BuildingKind::MetalStorage => self.metal_storage,
            BuildingKind::CrystalStorage => self.crystal_storage,
            BuildingKind::DeuteriumTank => self.deuterium_tank,
            BuildingKind::DarkMatterCollector => self.dark_matter_collector,
            BuildingKind::DarkMatterTank => self.dark_matter_tank,
            BuildingKind::MissileSilo => self.missile_silo,
            BuildingKind::Terraformer => self.terraformer,
            BuildingKind::LunarBase => self.lunar_base,
            BuildingKind::SensorPhalanx => self.sensor_phalanx,
            BuildingKind::JumpGate => self.jump_gate,
            BuildingKind::PlanetDestroyerFactory => self.planet_destroyer_factory,
        }
    }

    /// Set the level of the given building.
    pub fn set_level(&mut self, kind: BuildingKind, level: u32) {
        let slot = match kind {
            BuildingKind::MetalMine => &mut self.metal_mine,
            BuildingKind::CrystalMine => &mut self.crystal_mine,
            BuildingKind::DeuteriumSynthesizer => &mut self.deuterium_synthesizer,
            BuildingKind::SolarPlant => &mut self.solar_plant,
            BuildingKind::FusionReactor => &mut self.fusion_reactor,
            BuildingKind::RoboticsFactory => &mut self.robotics_factory,
            BuildingKind::NaniteFactory => &mut self.nanite_factory,
            BuildingKind::Shipyard => &mut self.shipyard,
            BuildingKind::Hangar => &mut self.hangar,
            BuildingKind::ResearchLab => &mut self.research_lab,
            BuildingKind::MetalStorage => &mut self.metal_storage,
            BuildingKind::CrystalStorage => &mut self.crystal_storage,
            BuildingKind::DeuteriumTank => &mut self.deuterium_tank,
            BuildingKind::DarkMatterCollector => &mut self.dark_matter_collector,
            BuildingKind::DarkMatterTank => &mut self.dark_matter_tank,
            BuildingKind::MissileSilo => &mut self.missile_silo,
            BuildingKind::Terraformer => &mut self.terraformer,
            BuildingKind::LunarBase => &mut self.lunar_base,
            BuildingKind::SensorPhalanx => &mut self.sensor_phalanx,
            BuildingKind::JumpGate => &mut self.jump_gate,
            BuildingKind::PlanetDestroyerFactory => &mut self.planet_destroyer_factory,
        };
        *slot = level;
    }

    /// Sum of all levels; one field is occupied per level built.
    #[must_use]
    pub fn total_levels(&self) -> u32 {
        BuildingKind::ALL.iter().map(|k| self.level(*k)).sum()
    }

    /// Iterate over `(kind, level)` pairs with level > 0.
    pub fn iter_built(&self) -> impl Iterator<Item = (BuildingKind, u32)> + '_ {
        BuildingKind::ALL
            .into_iter()
            .map(|k| (k, self.level(k)))
            .filter(|(_, level)| *level > 0)
    }
}
