//! Planets, moons, and their on-ground state.

use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingKind, BuildingLevels, DefenseCounts, FleetComposition};
use crate::deposits::OreDeposits;
use crate::math::{fixed_serde, Fixed};
use crate::position::Position;
use crate::queue::{BuildQueueItem, WaitingQueueItem};
use crate::resources::Resources;
use crate::time::Timestamp;

/// Surface slots a fresh planet offers for construction.
pub const DEFAULT_MAX_FIELDS: u32 = 163;

/// Surface temperature range in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Temperature {
    /// Night-side low.
    pub min: i32,
    /// Day-side high.
    pub max: i32,
}

impl Default for Temperature {
    fn default() -> Self {
        Self { min: -40, max: 40 }
    }
}

impl Temperature {
    /// Climate for an orbital slot.
    ///
    /// Inner slots run hot, outer slots cold, with the temperate
    /// band around slot eight. The day/night spread is a constant
    /// eighty degrees.
    #[must_use]
    pub fn for_slot(slot: u8) -> Self {
        let max = 40 + 15 * (8 - i32::from(slot));
        Self { min: max - 80, max }
    }
}

/// A moon orbiting a planet.
///
/// Moons have no mines and no deposits; they exist for their special
/// installations and as a second place to base fleets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moon {
    /// Unique id within the owner's empire.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Diameter in kilometres; fixes the buildable surface.
    pub size: u32,
    /// Surface slots.
    pub max_fields: u32,
    /// Installations built so far.
    pub buildings: BuildingLevels,
    /// Ships stationed here.
    pub fleet: FleetComposition,
    /// Defensive installations.
    pub defense: DefenseCounts,
    /// Constructions in progress.
    pub build_queue: Vec<BuildQueueItem>,
}

impl Moon {
    /// A freshly coalesced moon of the given diameter.
    #[must_use]
    pub fn new(id: u64, size: u32) -> Self {
        Self {
            id,
            name: "Moon".to_owned(),
            size,
            max_fields: 1 + size / 500,
            buildings: BuildingLevels::default(),
            fleet: FleetComposition::default(),
            defense: DefenseCounts::default(),
            build_queue: Vec::new(),
        }
    }

    /// Surface slots already taken by installations.
    #[must_use]
    pub fn used_fields(&self) -> u32 {
        self.buildings.total_levels()
    }

    /// Surface slots still free, counting lunar base extensions.
    #[must_use]
    pub fn free_fields(&self) -> u32 {
        let granted = self.buildings.level(BuildingKind::LunarBase)
            * BuildingKind::LunarBase.fields_granted_per_level();
        (self.max_fields + granted).saturating_sub(self.used_fields())
    }
}

/// One colonized world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    /// Unique id within the owner's empire.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Galactic coordinates.
    pub position: Position,
    /// Stockpiles on the ground.
    pub resources: Resources,
    /// Grid output as of the last engine run.
    #[serde(with = "fixed_serde")]
    pub energy_produced: Fixed,
    /// Grid demand as of the last engine run.
    #[serde(with = "fixed_serde")]
    pub energy_consumed: Fixed,
    /// Buildings and their levels.
    pub buildings: BuildingLevels,
    /// Ships stationed here.
    pub fleet: FleetComposition,
    /// Defensive installations.
    pub defense: DefenseCounts,
    /// Constructions and unit orders in progress.
    pub build_queue: Vec<BuildQueueItem>,
    /// Orders waiting for a free queue slot.
    pub waiting_build_queue: Vec<WaitingQueueItem>,
    /// Surface slots before terraforming.
    pub max_fields: u32,
    /// Surface temperature; drives deuterium yield and satellites.
    pub temperature: Temperature,
    /// Up to when production has been accounted.
    pub last_update: Timestamp,
    /// Finite ore backing the mines. Worlds settled before deposit
    /// surveys existed carry `None` and mine unconstrained.
    pub ore_deposits: Option<OreDeposits>,
    /// Whether this is the player's founding world.
    pub is_homeworld: bool,
    /// Orbiting moon, if battle debris ever formed one.
    pub moon: Option<Moon>,
}

impl Planet {
    /// The founding world of a new empire.
    #[must_use]
    pub fn homeworld(id: u64, position: Position, now: Timestamp, deposits: OreDeposits) -> Self {
        let mut planet = Self::colony(id, "Homeworld".to_owned(), position, now, deposits);
        planet.resources = Resources::new(500, 300, 100);
        planet.is_homeworld = true;
        planet
    }

    /// A newly settled colony. Arrives empty; whatever the colony
    /// ship carried is deposited by the mission that settled it.
    #[must_use]
    pub fn colony(
        id: u64,
        name: String,
        position: Position,
        now: Timestamp,
        deposits: OreDeposits,
    ) -> Self {
        Self {
            id,
            name,
            position,
            resources: Resources::ZERO,
            energy_produced: Fixed::ZERO,
            energy_consumed: Fixed::ZERO,
            buildings: BuildingLevels::default(),
            fleet: FleetComposition::default(),
            defense: DefenseCounts::default(),
            build_queue: Vec::new(),
            waiting_build_queue: Vec::new(),
            max_fields: DEFAULT_MAX_FIELDS,
            temperature: Temperature::for_slot(position.slot),
            last_update: now,
            ore_deposits: Some(deposits),
            is_homeworld: false,
            moon: None,
        }
    }

    /// Surface slots already taken by buildings.
    #[must_use]
    pub fn used_fields(&self) -> u32 {
        self.buildings.total_levels()
    }

    /// Total surface slots, counting terraformer extensions.
    #[must_use]
    pub fn field_capacity(&self) -> u32 {
        let granted = self.buildings.level(BuildingKind::Terraformer)
            * BuildingKind::Terraformer.fields_granted_per_level();
        self.max_fields + granted
    }

    /// Whether at least one surface slot is free.
    #[must_use]
    pub fn has_free_field(&self) -> bool {
        self.used_fields() < self.field_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_gradient() {
        assert_eq!(Temperature::for_slot(8), Temperature { min: -40, max: 40 });
        assert!(Temperature::for_slot(1).max > Temperature::for_slot(8).max);
        assert!(Temperature::for_slot(15).max < 0);
        for slot in 1..=15 {
            let t = Temperature::for_slot(slot);
            assert_eq!(t.max - t.min, 80);
        }
    }

    #[test]
    fn test_homeworld_starts_stocked() {
        let planet = Planet::homeworld(1, Position::new(1, 1, 8), 0, OreDeposits::default());
        assert!(planet.is_homeworld);
        assert_eq!(planet.resources, Resources::new(500, 300, 100));
        assert_eq!(planet.max_fields, DEFAULT_MAX_FIELDS);
    }

    #[test]
    fn test_colony_starts_empty() {
        let planet = Planet::colony(
            2,
            "Outpost".to_owned(),
            Position::new(3, 200, 12),
            5_000,
            OreDeposits::default(),
        );
        assert!(!planet.is_homeworld);
        assert!(planet.resources.is_empty());
        assert_eq!(planet.last_update, 5_000);
        assert_eq!(planet.temperature, Temperature::for_slot(12));
    }

    #[test]
    fn test_terraformer_extends_fields() {
        let mut planet = Planet::homeworld(1, Position::new(1, 1, 8), 0, OreDeposits::default());
        assert_eq!(planet.field_capacity(), DEFAULT_MAX_FIELDS);
        planet.buildings.set_level(BuildingKind::Terraformer, 2);
        assert_eq!(planet.field_capacity(), DEFAULT_MAX_FIELDS + 10);
    }

    #[test]
    fn test_moon_fields_scale_with_size() {
        let small = Moon::new(1, 2_000);
        let large = Moon::new(2, 8_000);
        assert_eq!(small.max_fields, 5);
        assert_eq!(large.max_fields, 17);
        assert!(small.free_fields() > 0);
    }
}
