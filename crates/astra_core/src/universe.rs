//! The shared universe registry: NPC worlds and debris fields.
//!
//! Everything here is mutated by many players' missions, so entries are
//! keyed by [`Position`] and every mutation touches exactly one key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{GameError, Result};
use crate::math::{fixed_serde, Fixed};
use crate::planet::Planet;
use crate::position::{Position, GALAXY_COUNT, SLOTS_PER_SYSTEM, SYSTEMS_PER_GALAXY};
use crate::resources::Resources;
use crate::time::Timestamp;

/// A world held by an NPC faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcWorld {
    /// Owning NPC.
    pub npc_id: u64,
    /// The world itself, same shape as a player planet.
    pub planet: Planet,
}

/// Wreckage left behind by destroyed ships; recyclers collect it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebrisField {
    /// Recoverable metal.
    #[serde(with = "fixed_serde")]
    pub metal: Fixed,
    /// Recoverable crystal.
    #[serde(with = "fixed_serde")]
    pub crystal: Fixed,
    /// When the field first formed.
    pub created_at: Timestamp,
    /// When the field evaporates if nobody collects it.
    pub expires_at: Timestamp,
}

impl DebrisField {
    /// Combined recoverable mass.
    #[must_use]
    pub fn total(&self) -> Fixed {
        self.metal.saturating_add(self.crystal)
    }

    /// Whether nothing is left to collect.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.metal <= Fixed::ZERO && self.crystal <= Fixed::ZERO
    }
}

/// Shared world state, separate from any one player's save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Universe {
    /// Galaxy count.
    pub galaxies: u16,
    /// Systems per galaxy.
    pub systems: u16,
    /// Colonizable slots per system.
    pub positions: u8,
    /// NPC worlds by position.
    pub planets: BTreeMap<Position, NpcWorld>,
    /// Debris fields by position.
    pub debris_fields: BTreeMap<Position, DebrisField>,
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}

impl Universe {
    /// An empty universe with the standard grid dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            galaxies: GALAXY_COUNT,
            systems: SYSTEMS_PER_GALAXY,
            positions: SLOTS_PER_SYSTEM,
            planets: BTreeMap::new(),
            debris_fields: BTreeMap::new(),
        }
    }

    /// Whether a position names a colonizable slot of this universe.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (1..=self.galaxies).contains(&position.galaxy)
            && (1..=self.systems).contains(&position.system)
            && (1..=self.positions).contains(&position.slot)
    }

    /// NPC world at a position.
    #[must_use]
    pub fn npc_world(&self, position: Position) -> Option<&NpcWorld> {
        self.planets.get(&position)
    }

    /// Mutable NPC world at a position.
    pub fn npc_world_mut(&mut self, position: Position) -> Option<&mut NpcWorld> {
        self.planets.get_mut(&position)
    }

    /// All worlds held by one NPC, in position order.
    pub fn npc_planets(&self, npc_id: u64) -> impl Iterator<Item = &Planet> + '_ {
        self.planets
            .values()
            .filter(move |world| world.npc_id == npc_id)
            .map(|world| &world.planet)
    }

    /// Register an NPC world. The slot must be free.
    pub fn insert_npc_world(&mut self, npc_id: u64, planet: Planet) -> Result<()> {
        let position = planet.position;
        if !self.contains(position) {
            return Err(GameError::InvalidMissionTarget(position.key()));
        }
        if self.planets.contains_key(&position) {
            return Err(GameError::PositionOccupied(position.key()));
        }
        self.planets.insert(position, NpcWorld { npc_id, planet });
        Ok(())
    }

    /// Remove an NPC world, returning it if one was registered.
    pub fn remove_npc_world(&mut self, position: Position) -> Option<NpcWorld> {
        self.planets.remove(&position)
    }

    /// Debris field at a position.
    #[must_use]
    pub fn debris_at(&self, position: Position) -> Option<&DebrisField> {
        self.debris_fields.get(&position)
    }

    /// Add wreckage at a position. Merges into an existing field and
    /// pushes its expiry out; non-positive amounts are ignored.
    pub fn deposit_debris(
        &mut self,
        position: Position,
        metal: Fixed,
        crystal: Fixed,
        now: Timestamp,
        cfg: &EngineConfig,
    ) {
        let metal = metal.max(Fixed::ZERO);
        let crystal = crystal.max(Fixed::ZERO);
        if metal <= Fixed::ZERO && crystal <= Fixed::ZERO {
            return;
        }
        let expires_at = now + cfg.debris_expiry_ms;
        match self.debris_fields.get_mut(&position) {
            Some(field) => {
                field.metal = field.metal.saturating_add(metal);
                field.crystal = field.crystal.saturating_add(crystal);
                field.expires_at = field.expires_at.max(expires_at);
            }
            None => {
                self.debris_fields.insert(
                    position,
                    DebrisField {
                        metal,
                        crystal,
                        created_at: now,
                        expires_at,
                    },
                );
            }
        }
    }

    /// Collect debris up to the given cargo capacity, metal first.
    /// The field is removed once fully drained.
    pub fn collect_debris(&mut self, position: Position, capacity: Fixed) -> Resources {
        let Some(field) = self.debris_fields.get_mut(&position) else {
            return Resources::default();
        };
        let mut remaining = capacity.max(Fixed::ZERO);
        let metal = field.metal.min(remaining);
        field.metal -= metal;
        remaining -= metal;
        let crystal = field.crystal.min(remaining);
        field.crystal -= crystal;
        if field.is_drained() {
            self.debris_fields.remove(&position);
        }
        Resources {
            metal,
            crystal,
            deuterium: Fixed::ZERO,
        }
    }

    /// Drop debris fields whose expiry has passed, returning where
    /// they were.
    pub fn prune_expired_debris(&mut self, now: Timestamp) -> Vec<Position> {
        let expired: Vec<Position> = self
            .debris_fields
            .iter()
            .filter(|(_, field)| field.expires_at <= now)
            .map(|(position, _)| *position)
            .collect();
        for position in &expired {
            self.debris_fields.remove(position);
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use crate::deposits::OreDeposits;

    use super::*;

    fn world_at(galaxy: u16, system: u16, slot: u8) -> Planet {
        Planet::colony(
            50,
            "Outpost".to_owned(),
            Position::new(galaxy, system, slot),
            0,
            OreDeposits::default(),
        )
    }

    #[test]
    fn test_insert_rejects_occupied_slot() {
        let mut universe = Universe::new();
        universe.insert_npc_world(1, world_at(1, 10, 5)).unwrap();
        let error = universe.insert_npc_world(2, world_at(1, 10, 5)).unwrap_err();
        assert!(matches!(error, GameError::PositionOccupied(_)));
        assert_eq!(universe.planets.len(), 1);
    }

    #[test]
    fn test_insert_rejects_out_of_bounds() {
        let mut universe = Universe::new();
        let error = universe.insert_npc_world(1, world_at(9, 10, 5)).unwrap_err();
        assert!(matches!(error, GameError::InvalidMissionTarget(_)));
    }

    #[test]
    fn test_deposit_merges_and_extends_expiry() {
        let cfg = EngineConfig::default();
        let mut universe = Universe::new();
        let position = Position::new(2, 100, 7);
        universe.deposit_debris(position, Fixed::from_num(1_000), Fixed::ZERO, 0, &cfg);
        universe.deposit_debris(position, Fixed::from_num(500), Fixed::from_num(200), 5_000, &cfg);
        let field = universe.debris_at(position).unwrap();
        assert_eq!(field.metal, Fixed::from_num(1_500));
        assert_eq!(field.crystal, Fixed::from_num(200));
        assert_eq!(field.created_at, 0);
        assert_eq!(field.expires_at, 5_000 + cfg.debris_expiry_ms);
    }

    #[test]
    fn test_deposit_ignores_empty_wreckage() {
        let cfg = EngineConfig::default();
        let mut universe = Universe::new();
        universe.deposit_debris(Position::new(1, 1, 1), Fixed::ZERO, Fixed::ZERO, 0, &cfg);
        assert!(universe.debris_fields.is_empty());
    }

    #[test]
    fn test_collect_clamps_to_capacity_metal_first() {
        let cfg = EngineConfig::default();
        let mut universe = Universe::new();
        let position = Position::new(3, 50, 9);
        universe.deposit_debris(
            position,
            Fixed::from_num(800),
            Fixed::from_num(600),
            0,
            &cfg,
        );
        let haul = universe.collect_debris(position, Fixed::from_num(1_000));
        assert_eq!(haul.metal, Fixed::from_num(800));
        assert_eq!(haul.crystal, Fixed::from_num(200));
        let field = universe.debris_at(position).unwrap();
        assert_eq!(field.crystal, Fixed::from_num(400));
        // Draining the rest removes the field
        let rest = universe.collect_debris(position, Fixed::from_num(10_000));
        assert_eq!(rest.crystal, Fixed::from_num(400));
        assert!(universe.debris_at(position).is_none());
    }

    #[test]
    fn test_collect_from_empty_position_is_noop() {
        let mut universe = Universe::new();
        let haul = universe.collect_debris(Position::new(1, 1, 1), Fixed::from_num(500));
        assert_eq!(haul, Resources::default());
    }

    #[test]
    fn test_prune_expired_debris() {
        let cfg = EngineConfig::default();
        let mut universe = Universe::new();
        let old = Position::new(1, 1, 1);
        let fresh = Position::new(1, 1, 2);
        universe.deposit_debris(old, Fixed::from_num(100), Fixed::ZERO, 0, &cfg);
        universe.deposit_debris(fresh, Fixed::from_num(100), Fixed::ZERO, cfg.debris_expiry_ms, &cfg);
        let removed = universe.prune_expired_debris(cfg.debris_expiry_ms);
        assert_eq!(removed, vec![old]);
        assert!(universe.debris_at(fresh).is_some());
    }
}
