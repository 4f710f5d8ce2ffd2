//! Catch-up orchestration over the persistence boundary.
//!
//! Every entry point follows the same shape: lock the player, load
//! state, run the deterministic catch-up to `now`, apply the command,
//! persist what changed. The core never sees the store and the store
//! never sees game rules.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use astra_core::campaign::CampaignConfig;
use astra_core::config::EngineConfig;
use astra_core::deposits::OreDeposits;
use astra_core::engine::{self, GameEvent};
use astra_core::error::GameError;
use astra_core::npc::Npc;
use astra_core::planet::Planet;
use astra_core::player::Player;
use astra_core::position::Position;
use astra_core::time::Timestamp;
use astra_core::universe::Universe;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::store::{NpcStore, PlayerStore, StoreError, UniverseStore};

/// Failures while syncing a saved game.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The persistence boundary failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A game rule rejected the request.
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Loads, advances, and persists saved games around a shared store.
///
/// One instance serves many players; per-player locks keep concurrent
/// requests for the same save serialized while different players
/// proceed in parallel.
pub struct SyncService<S> {
    store: Arc<S>,
    campaign: CampaignConfig,
    cfg: EngineConfig,
    player_locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl<S: PlayerStore + UniverseStore + NpcStore> SyncService<S> {
    /// Wrap a store with the given campaign and engine configuration.
    pub fn new(store: Arc<S>, campaign: CampaignConfig, cfg: EngineConfig) -> Self {
        Self {
            store,
            campaign,
            cfg,
            player_locks: Mutex::new(HashMap::new()),
        }
    }

    fn player_lock(&self, player_id: u64) -> Result<Arc<Mutex<()>>, SyncError> {
        let mut locks = self
            .player_locks
            .lock()
            .map_err(|_| StoreError::Poisoned)?;
        Ok(Arc::clone(locks.entry(player_id).or_default()))
    }

    /// Catch a player up to `now`, run a command against the fresh
    /// state, and persist the result.
    ///
    /// A failed command leaves state exactly as catch-up left it, so
    /// the catch-up mutations are persisted either way; only the
    /// command's error is surfaced.
    pub fn with_player<T>(
        &self,
        player_id: u64,
        now: Timestamp,
        op: impl FnOnce(&mut Player, &mut Universe, &mut [Npc]) -> Result<T, GameError>,
    ) -> Result<(T, Vec<GameEvent>), SyncError> {
        let lock = self.player_lock(player_id)?;
        let _guard = lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut player = self.store.load_player(player_id)?;
        let mut universe = self.store.load_universe()?;
        let mut npcs = self.store.load_npcs()?;
        let universe_before = universe.clone();
        let npcs_before = npcs.clone();

        let events = engine::advance(
            &mut player,
            &mut universe,
            &mut npcs,
            &self.campaign,
            &self.cfg,
            now,
        );
        let outcome = op(&mut player, &mut universe, &mut npcs);

        self.store.save_player(&player)?;
        self.persist_universe_delta(&universe_before, &universe)?;
        self.persist_npc_delta(&npcs_before, &npcs)?;

        let value = outcome?;
        Ok((value, events))
    }

    /// Catch a player up to `now` without running a command.
    pub fn sync_player(&self, player_id: u64, now: Timestamp) -> Result<Vec<GameEvent>, SyncError> {
        let ((), events) = self.with_player(player_id, now, |_, _, _| Ok(()))?;
        Ok(events)
    }

    /// Sync every stored player, skipping ones that fail.
    ///
    /// Returns how many players were synced.
    pub fn run_tick(&self, now: Timestamp) -> Result<usize, StoreError> {
        let ids = self.store.player_ids()?;
        let mut synced = 0;
        for id in ids {
            match self.sync_player(id, now) {
                Ok(events) => {
                    synced += 1;
                    if !events.is_empty() {
                        tracing::debug!(player = id, events = events.len(), "catch-up events");
                    }
                }
                Err(error) => tracing::warn!(player = id, %error, "sync failed, skipping"),
            }
        }
        Ok(synced)
    }

    /// Register a new player with a homeworld at the given coordinates.
    pub fn create_player(
        &self,
        id: u64,
        name: impl Into<String>,
        position: Position,
        now: Timestamp,
    ) -> Result<Player, SyncError> {
        if self.store.load_player(id).is_ok() {
            return Err(GameError::InvalidInput {
                field: "playerId".to_owned(),
                message: format!("player {id} already exists"),
            }
            .into());
        }
        let universe = self.store.load_universe()?;
        if !universe.contains(position) {
            return Err(GameError::InvalidInput {
                field: "position".to_owned(),
                message: format!("{position} is outside the universe grid"),
            }
            .into());
        }
        if universe.npc_world(position).is_some() {
            return Err(GameError::PositionOccupied(position.key()).into());
        }
        for existing_id in self.store.player_ids()? {
            let existing = self.store.load_player(existing_id)?;
            if existing.planets.iter().any(|planet| planet.position == position) {
                return Err(GameError::PositionOccupied(position.key()).into());
            }
        }

        let mut rng = StdRng::from_entropy();
        let deposits = OreDeposits::generate(position, &self.cfg.deposits, &mut rng);
        let homeworld = Planet::homeworld(1, position, now, deposits);
        let player = Player::new(id, name, homeworld);
        self.store.save_player(&player)?;
        tracing::info!(player = player.id, %position, "player created");
        Ok(player)
    }

    /// Write a whole universe into the store, record by record.
    pub fn seed_universe(&self, universe: &Universe) -> Result<(), StoreError> {
        self.store.save_dimensions(universe)?;
        for world in universe.planets.values() {
            self.store.save_world(world)?;
        }
        for (position, debris) in &universe.debris_fields {
            self.store.save_debris(*position, debris)?;
        }
        Ok(())
    }

    /// Write NPC factions into the store.
    pub fn seed_npcs(&self, npcs: &[Npc]) -> Result<(), StoreError> {
        for npc in npcs {
            self.store.save_npc(npc)?;
        }
        Ok(())
    }

    fn persist_universe_delta(&self, before: &Universe, after: &Universe) -> Result<(), StoreError> {
        for (position, world) in &after.planets {
            if before.planets.get(position) != Some(world) {
                self.store.save_world(world)?;
            }
        }
        for position in before.planets.keys() {
            if !after.planets.contains_key(position) {
                self.store.remove_world(*position)?;
            }
        }
        for (position, debris) in &after.debris_fields {
            if before.debris_fields.get(position) != Some(debris) {
                self.store.save_debris(*position, debris)?;
            }
        }
        for position in before.debris_fields.keys() {
            if !after.debris_fields.contains_key(position) {
                self.store.remove_debris(*position)?;
            }
        }
        Ok(())
    }

    fn persist_npc_delta(&self, before: &[Npc], after: &[Npc]) -> Result<(), StoreError> {
        for (was, is) in before.iter().zip(after) {
            if was != is {
                self.store.save_npc(is)?;
            }
        }
        Ok(())
    }
}
