//! Technology catalog: research kinds, costs and prerequisites.

use serde::{Deserialize, Serialize};

use crate::catalog::buildings::BuildingKind;
use crate::catalog::Requirement;
use crate::math::{pow_growth, Fixed};
use crate::resources::Resources;

/// Every researchable technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TechnologyKind {
    /// Unlocks energy-hungry structures and reactors.
    EnergyTechnology,
    /// Unlocks laser-based weaponry.
    LaserTechnology,
    /// Unlocks ion weaponry.
    IonTechnology,
    /// Unlocks hyperspace-dependent ships and the jump gate.
    HyperspaceTechnology,
    /// Boosts mine yields and unlocks plasma turrets.
    PlasmaTechnology,
    /// Each level grants one additional fleet slot.
    ComputerTechnology,
    /// Governs spy report depth and detection odds.
    EspionageTechnology,
    /// First-generation ship drive.
    CombustionDrive,
    /// Second-generation ship drive.
    ImpulseDrive,
    /// Third-generation ship drive.
    HyperspaceDrive,
    /// Raises weapon power of ships and defense.
    WeaponsTechnology,
    /// Raises shield power of ships and defense.
    ShieldingTechnology,
    /// Raises hull strength of ships and defense.
    ArmourTechnology,
    /// Each level allows one additional colony.
    Astrophysics,
    /// Exotic physics gating the deathstar.
    GravitonTechnology,
    /// Unlocks dark matter harvesting.
    DarkMatterTechnology,
    /// Unlocks the terraformer.
    TerraformingTechnology,
    /// Gates planet-destruction weaponry.
    PlanetDestructionTech,
}

impl TechnologyKind {
    /// All technologies in persisted field order.
    pub const ALL: [Self; 18] = [
        Self::EnergyTechnology,
        Self::LaserTechnology,
        Self::IonTechnology,
        Self::HyperspaceTechnology,
        Self::PlasmaTechnology,
        Self::ComputerTechnology,
        Self::EspionageTechnology,
        Self::CombustionDrive,
        Self::ImpulseDrive,
        Self::HyperspaceDrive,
        Self::WeaponsTechnology,
        Self::ShieldingTechnology,
        Self::ArmourTechnology,
        Self::Astrophysics,
        Self::GravitonTechnology,
        Self::DarkMatterTechnology,
        Self::TerraformingTechnology,
        Self::PlanetDestructionTech,
    ];

    /// Stable identifier matching the persisted field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EnergyTechnology => "energyTechnology",
            Self::LaserTechnology => "laserTechnology",
            Self::IonTechnology => "ionTechnology",
            Self::HyperspaceTechnology => "hyperspaceTechnology",
            Self::PlasmaTechnology => "plasmaTechnology",
            Self::ComputerTechnology => "computerTechnology",
            Self::EspionageTechnology => "espionageTechnology",
            Self::CombustionDrive => "combustionDrive",
            Self::ImpulseDrive => "impulseDrive",
            Self::HyperspaceDrive => "hyperspaceDrive",
            Self::WeaponsTechnology => "weaponsTechnology",
            Self::ShieldingTechnology => "shieldingTechnology",
            Self::ArmourTechnology => "armourTechnology",
            Self::Astrophysics => "astrophysics",
            Self::GravitonTechnology => "gravitonTechnology",
            Self::DarkMatterTechnology => "darkMatterTechnology",
            Self::TerraformingTechnology => "terraformingTechnology",
            Self::PlanetDestructionTech => "planetDestructionTech",
        }
    }

    /// Cost of the first level.
    #[must_use]
    pub fn base_cost(self) -> Resources {
        let (metal, crystal, deuterium) = match self {
            Self::EnergyTechnology => (0, 800, 400),
            Self::LaserTechnology => (200, 100, 0),
            Self::IonTechnology => (1_000, 300, 100),
            Self::HyperspaceTechnology => (0, 4_000, 2_000),
            Self::PlasmaTechnology => (2_000, 4_000, 1_000),
            Self::ComputerTechnology => (0, 400, 600),
            Self::EspionageTechnology => (200, 1_000, 200),
            Self::CombustionDrive => (400, 0, 600),
            Self::ImpulseDrive => (2_000, 4_000, 600),
            Self::HyperspaceDrive => (10_000, 20_000, 6_000),
            Self::WeaponsTechnology => (800, 200, 0),
            Self::ShieldingTechnology => (200, 600, 0),
            Self::ArmourTechnology => (1_000, 0, 0),
            Self::Astrophysics => (4_000, 8_000, 4_000),
            Self::GravitonTechnology => (500_000, 1_000_000, 500_000),
            Self::DarkMatterTechnology => (4_000, 8_000, 4_000),
            Self::TerraformingTechnology => (0, 50_000, 25_000),
            Self::PlanetDestructionTech => (1_000_000, 500_000, 250_000),
        };
        Resources::new(metal, crystal, deuterium)
    }

    /// Per-level cost growth factor.
    #[must_use]
    pub fn growth(self) -> Fixed {
        match self {
            Self::Astrophysics => Fixed::from_num(7) / Fixed::from_num(4),
            _ => Fixed::from_num(2),
        }
    }

    /// Cost of researching `level` (1-based).
    #[must_use]
    pub fn cost(self, level: u32) -> Resources {
        let factor = pow_growth(self.growth(), level.saturating_sub(1));
        self.base_cost().scale(factor)
    }

    /// Prerequisites for the first level.
    #[must_use]
    pub const fn requirements(self) -> &'static [Requirement] {
        use BuildingKind as B;
        use Requirement as R;
        match self {
            Self::EnergyTechnology | Self::ComputerTechnology => {
                &[R::Building(B::ResearchLab, 1)]
            }
            Self::LaserTechnology => &[
                R::Building(B::ResearchLab, 1),
                R::Technology(Self::EnergyTechnology, 2),
            ],
            Self::IonTechnology => &[
                R::Building(B::ResearchLab, 4),
                R::Technology(Self::LaserTechnology, 5),
                R::Technology(Self::EnergyTechnology, 4),
            ],
            Self::HyperspaceTechnology => &[
                R::Building(B::ResearchLab, 7),
                R::Technology(Self::EnergyTechnology, 5),
                R::Technology(Self::ShieldingTechnology, 5),
            ],
            Self::PlasmaTechnology => &[
                R::Building(B::ResearchLab, 4),
                R::Technology(Self::EnergyTechnology, 8),
                R::Technology(Self::LaserTechnology, 10),
                R::Technology(Self::IonTechnology, 5),
            ],
            Self::EspionageTechnology => &[R::Building(B::ResearchLab, 3)],
            Self::CombustionDrive => &[
                R::Building(B::ResearchLab, 1),
                R::Technology(Self::EnergyTechnology, 1),
            ],
            Self::ImpulseDrive => &[
                R::Building(B::ResearchLab, 2),
                R::Technology(Self::EnergyTechnology, 1),
            ],
            Self::HyperspaceDrive => &[
                R::Building(B::ResearchLab, 7),
                R::Technology(Self::HyperspaceTechnology, 3),
            ],
            Self::WeaponsTechnology => &[R::Building(B::ResearchLab, 4)],
            Self::ShieldingTechnology => &[
                R::Building(B::ResearchLab, 6),
                R::Technology(Self::EnergyTechnology, 3),
            ],
            Self::ArmourTechnology => &[R::Building(B::ResearchLab, 2)],
            Self::Astrophysics => &[
                R::Building(B::ResearchLab, 3),
                R::Technology(Self::EspionageTechnology, 4),
                R::Technology(Self::ImpulseDrive, 3),
            ],
            Self::GravitonTechnology => &[R::Building(B::ResearchLab, 12)],
            Self::DarkMatterTechnology => &[
                R::Building(B::ResearchLab, 5),
                R::Technology(Self::EnergyTechnology, 6),
            ],
            Self::TerraformingTechnology => &[
                R::Building(B::ResearchLab, 8),
                R::Technology(Self::EnergyTechnology, 10),
            ],
            Self::PlanetDestructionTech => &[
                R::Building(B::ResearchLab, 10),
                R::Technology(Self::GravitonTechnology, 1),
                R::Technology(Self::WeaponsTechnology, 10),
            ],
        }
    }
}

/// Technology levels of one player or NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnologyLevels {
    /// Energy technology level.
    pub energy_technology: u32,
    /// Laser technology level.
    pub laser_technology: u32,
    /// Ion technology level.
    pub ion_technology: u32,
    /// Hyperspace technology level.
    pub hyperspace_technology: u32,
    /// Plasma technology level.
    pub plasma_technology: u32,
    /// Computer technology level.
    pub computer_technology: u32,
    /// Espionage technology level.
    pub espionage_technology: u32,
    /// Combustion drive level.
    pub combustion_drive: u32,
    /// Impulse drive level.
    pub impulse_drive: u32,
    /// Hyperspace drive level.
    pub hyperspace_drive: u32,
    /// Weapons technology level.
    pub weapons_technology: u32,
    /// Shielding technology level.
    pub shielding_technology: u32,
    /// Armour technology level.
    pub armour_technology: u32,
    /// Astrophysics level.
    pub astrophysics: u32,
    /// Graviton technology level.
    pub graviton_technology: u32,
    /// Dark matter technology level.
    pub dark_matter_technology: u32,
    /// Terraforming technology level.
    pub terraforming_technology: u32,
    /// Planet destruction tech level.
    pub planet_destruction_tech: u32,
}

impl TechnologyLevels {
    /// Level of the given technology.
    #[must_use]
    pub const fn level(&self, kind: TechnologyKind) -> u32 {
        match kind {
            TechnologyKind::EnergyTechnology => self.energy_technology,
            TechnologyKind::LaserTechnology => self.laser_technology,
            TechnologyKind::IonTechnology => self.ion_technology,
            TechnologyKind::HyperspaceTechnology => self.hyperspace_technology,
            TechnologyKind::PlasmaTechnology => self.plasma_technology,
            TechnologyKind::ComputerTechnology => self.computer_technology,
            TechnologyKind::EspionageTechnology => self.espionage_technology,
            TechnologyKind::CombustionDrive => self.combustion_drive,
            TechnologyKind::ImpulseDrive => self.impulse_drive,
            TechnologyKind::HyperspaceDrive => self.hyperspace_drive,
            TechnologyKind::WeaponsTechnology => self.weapons_technology,
            TechnologyKind::ShieldingTechnology => self.shielding_technology,
            TechnologyKind::ArmourTechnology => self.armour_technology,
            TechnologyKind::Astrophysics => self.astrophysics,
            TechnologyKind::GravitonTechnology => self.graviton_technology,
            TechnologyKind::DarkMatterTechnology => self.dark_matter_technology,
            TechnologyKind::TerraformingTechnology => self.terraforming_technology,
            TechnologyKind::PlanetDestructionTech => self.planet_destruction_tech,
        }
    }

    /// Set the level of the given technology.
    pub fn set_level(&mut self, kind: TechnologyKind, level: u32) {
        let slot = match kind {
            TechnologyKind::EnergyTechnology => &mut self.energy_technology,
            TechnologyKind::LaserTechnology => &mut self.laser_technology,
            TechnologyKind::IonTechnology => &mut self.ion_technology,
            TechnologyKind::HyperspaceTechnology => &mut self.hyperspace_technology,
            TechnologyKind::PlasmaTechnology => &mut self.plasma_technology,
            TechnologyKind::ComputerTechnology => &mut self.computer_technology,
            TechnologyKind::EspionageTechnology => &mut self.espionage_technology,
            TechnologyKind::CombustionDrive => &mut self.combustion_drive,
            TechnologyKind::ImpulseDrive => &mut self.impulse_drive,
            TechnologyKind::HyperspaceDrive => &mut self.hyperspace_drive,
            TechnologyKind::WeaponsTechnology => &mut self.weapons_technology,
            TechnologyKind::ShieldingTechnology => &mut self.shielding_technology,
            TechnologyKind::ArmourTechnology => &mut self.armour_technology,
            TechnologyKind::Astrophysics => &mut self.astrophysics,
            TechnologyKind::GravitonTechnology => &mut self.graviton_technology,
            TechnologyKind::DarkMatterTechnology => &mut self.dark_matter_technology,
            TechnologyKind::TerraformingTechnology => &mut self.terraforming_technology,
            TechnologyKind::PlanetDestructionTech => &mut self.planet_destruction_tech,
        };
        *slot = level;
    }

    /// Iterate over `(kind, level)` pairs with level > 0.
    pub fn iter_researched(&self) -> impl Iterator<Item = (TechnologyKind, u32)> + '_ {
        TechnologyKind::ALL
            .into_iter()
            .map(|k| (k, self.level(k)))
            .filter(|(_, level)| *level > 0)
    }
}
