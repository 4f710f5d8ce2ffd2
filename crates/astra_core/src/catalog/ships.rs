//! Ship catalog: hull stats, logistics and fleet composition storage.

use serde::{Deserialize, Serialize};

use crate::catalog::buildings::BuildingKind;
use crate::catalog::Requirement;
use crate::math::{from_u64_saturating, Fixed};
use crate::resources::Resources;

/// Every buildable ship kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShipKind {
    /// Cheap escort fighter.
    LightFighter,
    /// Armored fighter.
    HeavyFighter,
    /// Fast mid-game attack ship.
    Cruiser,
    /// Heavy line ship.
    Battleship,
    /// Fast capital ship.
    Battlecruiser,
    /// Siege ship specialized against defense.
    Bomber,
    /// Late-game heavy hitter.
    Destroyer,
    /// Small freighter.
    SmallCargo,
    /// Large freighter.
    LargeCargo,
    /// Founds new colonies; consumed on success.
    ColonyShip,
    /// Harvests debris fields.
    Recycler,
    /// Scouts enemy planets.
    EspionageProbe,
    /// Stationary orbital power source; cannot fly missions.
    SolarSatellite,
    /// Gathers dark matter on expeditions and in orbit.
    DarkMatterHarvester,
    /// Moon-sized superweapon.
    Deathstar,
}

/// Combat statistics of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatStats {
    /// Weapon power per round.
    pub weapon: u32,
    /// Shield points regenerating each round.
    pub shield: u32,
    /// Hull points.
    pub armor: u32,
}

impl ShipKind {
    /// All ship kinds in persisted field order.
    pub const ALL: [Self; 15] = [
        Self::LightFighter,
        Self::HeavyFighter,
        Self::Cruiser,
        Self::Battleship,
        Self::Battlecruiser,
        Self::Bomber,
        Self::Destroyer,
        Self::SmallCargo,
        Self::LargeCargo,
        Self::ColonyShip,
        Self::Recycler,
        Self::EspionageProbe,
        Self::SolarSatellite,
        Self::DarkMatterHarvester,
        Self::Deathstar,
    ];

    /// Stable identifier matching the persisted field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LightFighter => "lightFighter",
            Self::HeavyFighter => "heavyFighter",
            Self::Cruiser => "cruiser",
            Self::Battleship => "battleship",
            Self::Battlecruiser => "battlecruiser",
            Self::Bomber => "bomber",
            Self::Destroyer => "destroyer",
            Self::SmallCargo => "smallCargo",
            Self::LargeCargo => "largeCargo",
            Self::ColonyShip => "colonyShip",
            Self::Recycler => "recycler",
            Self::EspionageProbe => "espionageProbe",
            Self::SolarSatellite => "solarSatellite",
            Self::DarkMatterHarvester => "darkMatterHarvester",
            Self::Deathstar => "deathstar",
        }
    }

    /// Construction cost per unit.
    #[must_use]
    pub fn cost(self) -> Resources {
        let (metal, crystal, deuterium) = match self {
            Self::LightFighter => (3_000, 1_000, 0),
            Self::HeavyFighter => (6_000, 4_000, 0),
            Self::Cruiser => (20_000, 7_000, 2_000),
            Self::Battleship => (45_000, 15_000, 0),
            Self::Battlecruiser => (30_000, 40_000, 15_000),
            Self::Bomber => (50_000, 25_000, 15_000),
            Self::Destroyer => (60_000, 50_000, 15_000),
            Self::SmallCargo => (2_000, 2_000, 0),
            Self::LargeCargo => (6_000, 6_000, 0),
            Self::ColonyShip => (10_000, 20_000, 10_000),
            Self::Recycler => (10_000, 6_000, 2_000),
            Self::EspionageProbe => (0, 1_000, 0),
            Self::SolarSatellite => (0, 2_000, 500),
            Self::DarkMatterHarvester => (15_000, 10_000, 5_000),
            Self::Deathstar => (5_000_000, 4_000_000, 1_000_000),
        };
        Resources::new(metal, crystal, deuterium)
    }

    /// Combat statistics before technology bonuses.
    #[must_use]
    pub const fn combat_stats(self) -> CombatStats {
        let (weapon, shield, armor) = match self {
            Self::LightFighter => (50, 10, 400),
            Self::HeavyFighter => (150, 25, 1_000),
            Self::Cruiser => (400, 50, 2_700),
            Self::Battleship => (1_000, 200, 6_000),
            Self::Battlecruiser => (700, 400, 7_000),
            Self::Bomber => (1_000, 500, 7_500),
            Self::Destroyer => (2_000, 500, 11_000),
            Self::SmallCargo => (5, 10, 400),
            Self::LargeCargo => (5, 25, 1_200),
            Self::ColonyShip => (50, 100, 3_000),
            Self::Recycler => (1, 10, 1_600),
            Self::EspionageProbe => (0, 0, 100),
            Self::SolarSatellite => (1, 1, 200),
            Self::DarkMatterHarvester => (1, 50, 2_500),
            Self::Deathstar => (200_000, 50_000, 900_000),
        };
        CombatStats {
            weapon,
            shield,
            armor,
        }
    }

    /// Cargo hold per unit.
    #[must_use]
    pub const fn cargo_capacity(self) -> u32 {
        match self {
            Self::LightFighter => 50,
            Self::HeavyFighter => 100,
            Self::Cruiser => 800,
            Self::Battleship => 1_500,
            Self::Battlecruiser => 750,
            Self::Bomber => 500,
            Self::Destroyer => 2_000,
            Self::SmallCargo => 5_000,
            Self::LargeCargo => 25_000,
            Self::ColonyShip => 7_500,
            Self::Recycler => 20_000,
            Self::EspionageProbe => 5,
            Self::SolarSatellite => 0,
            Self::DarkMatterHarvester => 10_000,
            Self::Deathstar => 1_000_000,
        }
    }

    /// Base flight speed; zero means the unit cannot fly missions.
    #[must_use]
    pub const fn base_speed(self) -> u32 {
        match self {
            Self::LightFighter => 12_500,
            Self::HeavyFighter => 10_000,
            Self::Cruiser => 15_000,
            Self::Battleship => 10_000,
            Self::Battlecruiser => 10_000,
            Self::Bomber => 4_000,
            Self::Destroyer => 5_000,
            Self::SmallCargo => 5_000,
            Self::LargeCargo => 7_500,
            Self::ColonyShip => 2_500,
            Self::Recycler => 2_000,
            Self::EspionageProbe => 100_000,
            Self::SolarSatellite => 0,
            Self::DarkMatterHarvester => 3_000,
            Self::Deathstar => 100,
        }
    }

    /// Deuterium burned per unit per 1000 distance.
    #[must_use]
    pub const fn fuel_per_1k_distance(self) -> u32 {
        match self {
            Self::LightFighter => 20,
            Self::HeavyFighter => 75,
            Self::Cruiser => 300,
            Self::Battleship => 500,
            Self::Battlecruiser => 250,
            Self::Bomber => 700,
            Self::Destroyer => 1_000,
            Self::SmallCargo => 10,
            Self::LargeCargo => 50,
            Self::ColonyShip => 1_000,
            Self::Recycler => 300,
            Self::EspionageProbe => 1,
            Self::SolarSatellite => 0,
            Self::DarkMatterHarvester => 500,
            Self::Deathstar => 1,
        }
    }

    /// Prerequisites to build this ship.
    #[must_use]
    pub const fn requirements(self) -> &'static [Requirement] {
        use crate::catalog::technologies::TechnologyKind as T;
        use BuildingKind as B;
        use Requirement as R;
        match self {
            Self::LightFighter => &[
                R::Building(B::Shipyard, 1),
                R::Technology(T::CombustionDrive, 1),
            ],
            Self::HeavyFighter => &[
                R::Building(B::Shipyard, 3),
                R::Technology(T::ArmourTechnology, 2),
                R::Technology(T::ImpulseDrive, 2),
            ],
            Self::Cruiser => &[
                R::Building(B::Shipyard, 5),
                R::Technology(T::ImpulseDrive, 4),
                R::Technology(T::IonTechnology, 2),
            ],
            Self::Battleship => &[
                R::Building(B::Shipyard, 7),
                R::Technology(T::HyperspaceDrive, 4),
            ],
            Self::Battlecruiser => &[
                R::Building(B::Shipyard, 8),
                R::Technology(T::HyperspaceTechnology, 5),
                R::Technology(T::HyperspaceDrive, 5),
                R::Technology(T::LaserTechnology, 12),
            ],
            Self::Bomber => &[
                R::Building(B::Shipyard, 8),
                R::Technology(T::ImpulseDrive, 6),
                R::Technology(T::PlasmaTechnology, 5),
            ],
            Self::Destroyer => &[
                R::Building(B::Shipyard, 9),
                R::Technology(T::HyperspaceDrive, 6),
                R::Technology(T::HyperspaceTechnology, 5),
            ],
            Self::SmallCargo => &[
                R::Building(B::Shipyard, 2),
                R::Technology(T::CombustionDrive, 2),
            ],
            Self::LargeCargo => &[
                R::Building(B::Shipyard, 4),
                R::Technology(T::CombustionDrive, 6),
            ],
            Self::ColonyShip => &[
                R::Building(B::Shipyard, 4),
                R::Technology(T::ImpulseDrive, 3),
            ],
            Self::Recycler => &[
                R::Building(B::Shipyard, 4),
                R::Technology(T::CombustionDrive, 6),
                R::Technology(T::ShieldingTechnology, 2),
            ],
            Self::EspionageProbe => &[
                R::Building(B::Shipyard, 3),
                R::Technology(T::CombustionDrive, 3),
                R::Technology(T::EspionageTechnology, 2),
            ],
            Self::SolarSatellite => &[R::Building(B::Shipyard, 1)],
            Self::DarkMatterHarvester => &[
                R::Building(B::Shipyard, 6),
                R::Technology(T::DarkMatterTechnology, 3),
            ],
            Self::Deathstar => &[
                R::Building(B::Shipyard, 12),
                R::Building(B::PlanetDestroyerFactory, 1),
                R::Technology(T::HyperspaceDrive, 7),
                R::Technology(T::GravitonTechnology, 1),
            ],
        }
    }
}

/// Ship counts stationed at a planet or assigned to a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FleetComposition {
    /// Light fighters.
    pub light_fighter: u32,
    /// Heavy fighters.
    pub heavy_fighter: u32,
    /// Cruisers.
    pub cruiser: u32,
    /// Battleships.
    pub battleship: u32,
    /// Battlecruisers.
    pub battlecruiser: u32,
    /// Bombers.
    pub bomber: u32,
    /// Destroyers.
    pub destroyer: u32,
    /// Small cargos.
    pub small_cargo: u32,
    /// Large cargos.
    pub large_cargo: u32,
    /// Colony ships.
    pub colony_ship: u32,
    /// Recyclers.
    pub recycler: u32,
    /// Espionage probes.
    pub espionage_probe: u32,
    /// Solar satellites.
    pub solar_satellite: u32,
    /// Dark matter harvesters.
    pub dark_matter_harvester: u32,
    /// Deathstars.
    pub deathstar: u32,
}

impl FleetComposition {
    /// Count of the given ship kind.
    #[must_use]
    pub const fn count(&self, kind: ShipKind) -> u32 {
        match kind {
            ShipKind::LightFighter => self.light_fighter,
            ShipKind::HeavyFighter => self.heavy_fighter,
            ShipKind::Cruiser => self.cruiser,
            ShipKind::Battleship => self.battleship,
            ShipKind::Battlecruiser => self.battlecruiser,
            ShipKind::Bomber => self.bomber,
            ShipKind::Destroyer => self.destroyer,
            ShipKind::SmallCargo => self.small_cargo,
            ShipKind::LargeCargo => self.large_cargo,
            ShipKind::ColonyShip => self.colony_ship,
            ShipKind::Recycler => self.recycler,
            ShipKind::EspionageProbe => self.espionage_probe,
            ShipKind::SolarSatellite => self.solar_satellite,
            ShipKind::DarkMatterHarvester => self.dark_matter_harvester,
            ShipKind::Deathstar => self.deathstar,
        }
    }

    /// Mutable count of the given ship kind.
    pub fn count_mut(&mut self, kind: ShipKind) -> &mut u32 {
        match kind {
            ShipKind::LightFighter => &mut self.light_fighter,
            ShipKind::HeavyFighter => &mut self.heavy_fighter,
            ShipKind::Cruiser => &mut self.cruiser,
            ShipKind::Battleship => &mut self.battleship,
            ShipKind::Battlecruiser => &mut self.battlecruiser,
            ShipKind::Bomber => &mut self.bomber,
            ShipKind::Destroyer => &mut self.destroyer,
            ShipKind::SmallCargo => &mut self.small_cargo,
            ShipKind::LargeCargo => &mut self.large_cargo,
            ShipKind::ColonyShip => &mut self.colony_ship,
            ShipKind::Recycler => &mut self.recycler,
            ShipKind::EspionageProbe => &mut self.espionage_probe,
            ShipKind::SolarSatellite => &mut self.solar_satellite,
            ShipKind::DarkMatterHarvester => &mut self.dark_matter_harvester,
            ShipKind::Deathstar => &mut self.deathstar,
        }
    }

    /// Total number of ships.
    #[must_use]
    pub fn total(&self) -> u32 {
        ShipKind::ALL.iter().map(|k| self.count(*k)).sum()
    }

    /// Whether no ships are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Number of ships able to fly missions (satellites stay in orbit).
    #[must_use]
    pub fn flying_total(&self) -> u32 {
        self.total() - self.solar_satellite
    }

    /// Combined cargo hold of the composition.
    #[must_use]
    pub fn cargo_capacity(&self) -> Fixed {
        let mut capacity: u64 = 0;
        for kind in ShipKind::ALL {
            capacity += u64::from(self.count(kind)) * u64::from(kind.cargo_capacity());
        }
        from_u64_saturating(capacity)
    }

    /// Speed of the slowest flying ship, or `None` for a grounded fleet.
    #[must_use]
    pub fn slowest_speed(&self) -> Option<u32> {
        ShipKind::ALL
            .into_iter()
            .filter(|k| self.count(*k) > 0 && k.base_speed() > 0)
            .map(|k| k.base_speed())
            .min()
    }

    /// Deuterium burn for the whole composition over `distance`.
    #[must_use]
    pub fn fuel_for_distance(&self, distance: u32) -> Fixed {
        let mut per_1k: u64 = 0;
        for kind in ShipKind::ALL {
            per_1k += u64::from(self.count(kind)) * u64::from(kind.fuel_per_1k_distance());
        }
        from_u64_saturating(per_1k).saturating_mul(Fixed::from_num(distance)) / Fixed::from_num(1_000)
    }

    /// Whether every channel of `other` fits inside this composition.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        ShipKind::ALL
            .into_iter()
            .all(|k| self.count(k) >= other.count(k))
    }

    /// Add every count from `other`.
    pub fn merge(&mut self, other: &Self) {
        for kind in ShipKind::ALL {
            *self.count_mut(kind) = self.count(kind).saturating_add(other.count(kind));
        }
    }

    /// Remove every count in `other`; counts never go below zero.
    pub fn subtract(&mut self, other: &Self) {
        for kind in ShipKind::ALL {
            *self.count_mut(kind) = self.count(kind).saturating_sub(other.count(kind));
        }
    }

    /// Iterate over `(kind, count)` pairs with count > 0.
    pub fn iter_present(&self) -> impl Iterator<Item = (ShipKind, u32)> + '_ {
        ShipKind::ALL
            .into_iter()
            .map(|k| (k, self.count(k)))
            .filter(|(_, count)| *count > 0)
    }

    /// Total build cost of every ship in the composition.
    #[must_use]
    pub fn build_cost(&self) -> Resources {
        let mut cost = Resources::ZERO;
        for (kind, count) in self.iter_present() {
            cost += kind.cost().scale(Fixed::from_num(count));
        }
        cost
    }
}
