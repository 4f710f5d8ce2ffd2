//! Persistence boundary for saved game state.
//!
//! Players are stored whole under their id. Universe records are
//! stored one per composite key, encoded as the canonical
//! `galaxy:system:position` string, so a backend can upsert the few
//! keys a sync touched instead of rewriting the universe. The
//! in-memory implementation below holds the same bincode blobs a
//! durable backend would.

use std::collections::BTreeMap;
use std::sync::RwLock;

use astra_core::npc::Npc;
use astra_core::player::Player;
use astra_core::position::Position;
use astra_core::universe::{DebrisField, NpcWorld, Universe};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Failures at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record failed to encode or decode.
    #[error("serialization failed: {0}")]
    Serialization(String),
    /// A requested record does not exist.
    #[error("{what} {id} not found")]
    NotFound {
        /// Kind of record.
        what: &'static str,
        /// Its key.
        id: String,
    },
    /// A lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Durable player records, keyed by player id.
pub trait PlayerStore: Send + Sync {
    /// Load one player.
    fn load_player(&self, id: u64) -> Result<Player, StoreError>;
    /// Insert or replace one player.
    fn save_player(&self, player: &Player) -> Result<(), StoreError>;
    /// Ids of every stored player.
    fn player_ids(&self) -> Result<Vec<u64>, StoreError>;
}

/// Durable universe records, upserted per composite key.
pub trait UniverseStore: Send + Sync {
    /// Reassemble the whole universe from its records.
    fn load_universe(&self) -> Result<Universe, StoreError>;
    /// Store the grid dimensions.
    fn save_dimensions(&self, universe: &Universe) -> Result<(), StoreError>;
    /// Insert or replace one NPC world under its coordinates.
    fn save_world(&self, world: &NpcWorld) -> Result<(), StoreError>;
    /// Drop the world record at the given coordinates.
    fn remove_world(&self, position: Position) -> Result<(), StoreError>;
    /// Insert or replace one debris field under its coordinates.
    fn save_debris(&self, position: Position, debris: &DebrisField) -> Result<(), StoreError>;
    /// Drop the debris record at the given coordinates.
    fn remove_debris(&self, position: Position) -> Result<(), StoreError>;
}

/// Durable NPC faction records, keyed by faction id.
pub trait NpcStore: Send + Sync {
    /// Load every faction.
    fn load_npcs(&self) -> Result<Vec<Npc>, StoreError>;
    /// Insert or replace one faction.
    fn save_npc(&self, npc: &Npc) -> Result<(), StoreError>;
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(value).map_err(|error| StoreError::Serialization(error.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    bincode::deserialize(bytes).map_err(|error| StoreError::Serialization(error.to_string()))
}

/// Blob store backed by in-process maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    players: RwLock<BTreeMap<u64, Vec<u8>>>,
    dimensions: RwLock<Option<Vec<u8>>>,
    worlds: RwLock<BTreeMap<String, Vec<u8>>>,
    debris: RwLock<BTreeMap<String, Vec<u8>>>,
    npcs: RwLock<BTreeMap<u64, Vec<u8>>>,
}

impl MemoryStore {
    /// A fresh, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlayerStore for MemoryStore {
    fn load_player(&self, id: u64) -> Result<Player, StoreError> {
        let players = self.players.read().map_err(|_| StoreError::Poisoned)?;
        let bytes = players.get(&id).ok_or(StoreError::NotFound {
            what: "player",
            id: id.to_string(),
        })?;
        decode(bytes)
    }

    fn save_player(&self, player: &Player) -> Result<(), StoreError> {
        let bytes = encode(player)?;
        let mut players = self.players.write().map_err(|_| StoreError::Poisoned)?;
        players.insert(player.id, bytes);
        Ok(())
    }

    fn player_ids(&self) -> Result<Vec<u64>, StoreError> {
        let players = self.players.read().map_err(|_| StoreError::Poisoned)?;
        Ok(players.keys().copied().collect())
    }
}

impl UniverseStore for MemoryStore {
    fn load_universe(&self) -> Result<Universe, StoreError> {
        let mut universe = {
            let dimensions = self.dimensions.read().map_err(|_| StoreError::Poisoned)?;
            match dimensions.as_deref() {
                Some(bytes) => decode::<Universe>(bytes)?,
                None => Universe::new(),
            }
        };
        let worlds = self.worlds.read().map_err(|_| StoreError::Poisoned)?;
        for bytes in worlds.values() {
            let world: NpcWorld = decode(bytes)?;
            universe.planets.insert(world.planet.position, world);
        }
        let debris = self.debris.read().map_err(|_| StoreError::Poisoned)?;
        for (key, bytes) in debris.iter() {
            let position: Position = key
                .parse()
                .map_err(|_| StoreError::Serialization(format!("bad debris key {key}")))?;
            universe.debris_fields.insert(position, decode(bytes)?);
        }
        Ok(universe)
    }

    fn save_dimensions(&self, universe: &Universe) -> Result<(), StoreError> {
        // Stored without the keyed maps; those live as per-key records.
        let mut bare = universe.clone();
        bare.planets.clear();
        bare.debris_fields.clear();
        let bytes = encode(&bare)?;
        let mut dimensions = self.dimensions.write().map_err(|_| StoreError::Poisoned)?;
        *dimensions = Some(bytes);
        Ok(())
    }

    fn save_world(&self, world: &NpcWorld) -> Result<(), StoreError> {
        let bytes = encode(world)?;
        let mut worlds = self.worlds.write().map_err(|_| StoreError::Poisoned)?;
        worlds.insert(world.planet.position.to_string(), bytes);
        Ok(())
    }

    fn remove_world(&self, position: Position) -> Result<(), StoreError> {
        let mut worlds = self.worlds.write().map_err(|_| StoreError::Poisoned)?;
        worlds.remove(&position.to_string());
        Ok(())
    }

    fn save_debris(&self, position: Position, debris: &DebrisField) -> Result<(), StoreError> {
        let bytes = encode(debris)?;
        let mut fields = self.debris.write().map_err(|_| StoreError::Poisoned)?;
        fields.insert(position.to_string(), bytes);
        Ok(())
    }

    fn remove_debris(&self, position: Position) -> Result<(), StoreError> {
        let mut fields = self.debris.write().map_err(|_| StoreError::Poisoned)?;
        fields.remove(&position.to_string());
        Ok(())
    }
}

impl NpcStore for MemoryStore {
    fn load_npcs(&self) -> Result<Vec<Npc>, StoreError> {
        let npcs = self.npcs.read().map_err(|_| StoreError::Poisoned)?;
        npcs.values().map(|bytes| decode(bytes)).collect()
    }

    fn save_npc(&self, npc: &Npc) -> Result<(), StoreError> {
        let bytes = encode(npc)?;
        let mut npcs = self.npcs.write().map_err(|_| StoreError::Poisoned)?;
        npcs.insert(npc.id, bytes);
        Ok(())
    }
}
