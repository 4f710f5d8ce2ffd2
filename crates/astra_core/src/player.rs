//! The player aggregate: empire, queues, missions, and records.

use serde::{Deserialize, Serialize};

use crate::campaign::CampaignState;
use crate::catalog::{BuildingKind, TechnologyKind, TechnologyLevels};
use crate::config::EngineConfig;
use crate::diplomacy::DiplomaticReport;
use crate::error::{GameError, Result};
use crate::math::{fixed_serde, from_u64_saturating, pow_growth, Fixed};
use crate::missions::{FleetMission, MissileAttack, MissionReport};
use crate::officers::{BonusSet, OfficerRoster};
use crate::planet::Planet;
use crate::position::Position;
use crate::queue::{BuildQueueItem, WaitingQueueItem};
use crate::reports::{BattleReport, BoundedLog, Notification, SpyReport};
use crate::time::Timestamp;

// ============================================================================
// Achievements
// ============================================================================

/// Lifetime counters behind achievements and statistics screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AchievementStats {
    /// Building upgrades completed.
    pub buildings_constructed: u32,
    /// Technology levels completed.
    pub technologies_researched: u32,
    /// Defensive units built.
    pub defense_units_built: u32,
    /// Ships rolled off shipyards.
    pub total_ships_produced: u64,
    /// Fleet missions launched, of any kind.
    pub total_flight_missions: u32,
    /// Transport runs launched.
    pub transport_missions: u32,
    /// Deployment runs launched.
    pub deploy_missions: u32,
    /// Espionage probes launched.
    pub spy_missions: u32,
    /// Recycler runs launched.
    pub recycling_missions: u32,
    /// Expeditions launched.
    pub expeditions_total: u32,
    /// Expeditions that came back with something.
    pub expeditions_successful: u32,
    /// Colonies successfully settled.
    pub colonizations: u32,
    /// Battles won on the attack.
    pub attacks_won: u32,
    /// Battles lost on the attack.
    pub attacks_lost: u32,
    /// Hostile visits repelled at home.
    pub defenses_successful: u32,
    /// Gifts delivered to NPCs.
    pub gifts_sent: u32,
    /// Total resources given away.
    pub gift_resources_total: u64,
    /// Total resources scooped from debris fields.
    pub recycled_resources: u64,
    /// Deuterium burned as fuel.
    pub fuel_consumed: u64,
    /// Planets destroyed outright.
    pub planet_destructions: u32,
    /// Moons formed over the player's battles.
    pub moons_formed: u32,
    /// Times an NPC raid reached a player world.
    #[serde(rename = "attackedByNPC")]
    pub attacked_by_npc: u32,
    /// Times an NPC probe scanned a player world.
    #[serde(rename = "spiedByNPC")]
    pub spied_by_npc: u32,
}

// ============================================================================
// Player
// ============================================================================

/// Everything one player owns, pending, and remembers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Unique player id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Colonized worlds; the homeworld sits first.
    pub planets: Vec<Planet>,
    /// Empire-wide research levels.
    pub technologies: TechnologyLevels,
    /// Officer contracts.
    pub officers: OfficerRoster,
    /// Premium currency, account-scoped.
    #[serde(with = "fixed_serde")]
    pub dark_matter: Fixed,
    /// Current total score, refreshed by the engine.
    pub points: u64,
    /// Active research orders, run serially.
    pub research_queue: Vec<BuildQueueItem>,
    /// Research orders waiting for the queue to free up.
    pub waiting_research_queue: Vec<WaitingQueueItem>,
    /// Fleets currently away from their harbors.
    pub fleet_missions: Vec<FleetMission>,
    /// Missile salvos in flight.
    pub missile_attacks: Vec<MissileAttack>,
    /// Battle records, newest first.
    pub battle_reports: BoundedLog<BattleReport>,
    /// Espionage records, newest first.
    pub spy_reports: BoundedLog<SpyReport>,
    /// Mission outcome records, newest first.
    pub mission_reports: BoundedLog<MissionReport>,
    /// Reputation change records, newest first.
    pub diplomatic_reports: BoundedLog<DiplomaticReport>,
    /// Short-lived notices for the player.
    pub notifications: BoundedLog<Notification>,
    /// Lifetime statistics.
    pub achievements: AchievementStats,
    /// Campaign progress; `None` until the campaign is started.
    pub campaign: Option<CampaignState>,
    /// Source of every per-player id: planets, queue items, missions,
    /// reports. Strictly monotonic.
    pub id_seq: u64,
    /// Seed pool for mission outcomes. Every draw advances it, so
    /// replaying a saved state replays the same luck.
    pub rng_state: u64,
    /// Account creation time.
    pub created_at: Timestamp,
}

impl Player {
    /// A fresh account holding only its homeworld.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, homeworld: Planet) -> Self {
        let created_at = homeworld.last_update;
        let id_seq = homeworld.id;
        Self {
            id,
            name: name.into(),
            planets: vec![homeworld],
            technologies: TechnologyLevels::default(),
            officers: OfficerRoster::default(),
            dark_matter: Fixed::ZERO,
            points: 0,
            research_queue: Vec::new(),
            waiting_research_queue: Vec::new(),
            fleet_missions: Vec::new(),
            missile_attacks: Vec::new(),
            battle_reports: BoundedLog::new(),
            spy_reports: BoundedLog::new(),
            mission_reports: BoundedLog::new(),
            diplomatic_reports: BoundedLog::new(),
            notifications: BoundedLog::new(),
            achievements: AchievementStats::default(),
            campaign: None,
            id_seq,
            rng_state: id,
            created_at,
        }
    }

    /// Next unique id for anything this player owns.
    pub fn next_id(&mut self) -> u64 {
        self.id_seq += 1;
        self.id_seq
    }

    /// Draw a mission seed, advancing the seed pool.
    pub fn next_seed(&mut self) -> u64 {
        self.rng_state = self.rng_state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut mixed = self.rng_state;
        mixed = (mixed ^ (mixed >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        mixed = (mixed ^ (mixed >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        mixed ^ (mixed >> 31)
    }

    /// Planet by id.
    #[must_use]
    pub fn planet(&self, id: u64) -> Option<&Planet> {
        self.planets.iter().find(|planet| planet.id == id)
    }

    /// Mutable planet by id.
    pub fn planet_mut(&mut self, id: u64) -> Option<&mut Planet> {
        self.planets.iter_mut().find(|planet| planet.id == id)
    }

    /// Planet at a position, if the player holds it.
    #[must_use]
    pub fn planet_at(&self, position: Position) -> Option<&Planet> {
        self.planets.iter().find(|planet| planet.position == position)
    }

    /// Mutable planet at a position.
    pub fn planet_at_mut(&mut self, position: Position) -> Option<&mut Planet> {
        self.planets
            .iter_mut()
            .find(|planet| planet.position == position)
    }

    /// The founding world. Falls back to the first colony if the
    /// homeworld was ever lost.
    #[must_use]
    pub fn homeworld(&self) -> Option<&Planet> {
        self.planets
            .iter()
            .find(|planet| planet.is_homeworld)
            .or_else(|| self.planets.first())
    }

    /// Colonies the player may hold, grown by astrophysics.
    #[must_use]
    pub fn max_colonies(&self) -> usize {
        let astro = self.technologies.level(TechnologyKind::Astrophysics);
        1 + ((astro + 1) / 2) as usize
    }

    /// Concurrent fleet missions the player commands.
    #[must_use]
    pub fn fleet_slot_capacity(&self, bonuses: &BonusSet, cfg: &EngineConfig) -> usize {
        (cfg.base_fleet_slots
            + self.technologies.level(TechnologyKind::ComputerTechnology)
            + bonuses.extra_fleet_slots) as usize
    }

    /// Dark matter the account can hold; tanks anywhere in the
    /// empire extend it.
    #[must_use]
    pub fn dark_matter_capacity(&self, bonuses: &BonusSet, cfg: &EngineConfig) -> Fixed {
        let tanks: u32 = self
            .planets
            .iter()
            .map(|planet| planet.buildings.level(BuildingKind::DarkMatterTank))
            .sum();
        from_u64_saturating(cfg.dark_matter_base_capacity.max(0).unsigned_abs())
            .saturating_mul(pow_growth(Fixed::from_num(2), tanks))
            .saturating_mul(Fixed::ONE + bonuses.storage_capacity)
    }

    /// Credit dark matter up to capacity. A balance already above
    /// capacity is left alone rather than truncated.
    pub fn credit_dark_matter(&mut self, amount: Fixed, bonuses: &BonusSet, cfg: &EngineConfig) {
        if amount <= Fixed::ZERO {
            return;
        }
        let cap = self.dark_matter_capacity(bonuses, cfg);
        if self.dark_matter >= cap {
            return;
        }
        self.dark_matter = self.dark_matter.saturating_add(amount).min(cap);
    }

    /// Spend dark matter, all or nothing.
    pub fn spend_dark_matter(&mut self, amount: Fixed) -> Result<()> {
        if self.dark_matter < amount {
            return Err(GameError::InsufficientResources {
                resource: "darkMatter".to_owned(),
                required: amount.to_num::<i64>(),
                available: self.dark_matter.to_num::<i64>(),
            });
        }
        self.dark_matter -= amount;
        Ok(())
    }

    /// Serialize the whole account for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|error| GameError::InvalidState(format!("serialize player: {error}")))
    }

    /// Restore an account from storage.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|error| GameError::InvalidState(format!("deserialize player: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use crate::deposits::OreDeposits;

    use super::*;

    fn sample_player() -> Player {
        let homeworld = Planet::homeworld(1, Position::new(1, 42, 8), 1_000, OreDeposits::default());
        Player::new(7, "Tester", homeworld)
    }

    #[test]
    fn test_new_player_shape() {
        let player = sample_player();
        assert_eq!(player.planets.len(), 1);
        assert!(player.planets[0].is_homeworld);
        assert_eq!(player.created_at, 1_000);
        assert!(player.campaign.is_none());
        assert_eq!(player.points, 0);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut player = sample_player();
        let first = player.next_id();
        let second = player.next_id();
        assert!(second > first);
        // The homeworld id is never reissued
        assert!(first > player.planets[0].id);
    }

    #[test]
    fn test_seed_pool_is_deterministic() {
        let mut a = sample_player();
        let mut b = sample_player();
        let first = a.next_seed();
        assert_eq!(first, b.next_seed());
        let second = a.next_seed();
        assert_eq!(second, b.next_seed());
        assert_ne!(first, second);
    }

    #[test]
    fn test_max_colonies_follows_astrophysics() {
        let mut player = sample_player();
        assert_eq!(player.max_colonies(), 1);
        player.technologies.set_level(TechnologyKind::Astrophysics, 1);
        assert_eq!(player.max_colonies(), 2);
        player.technologies.set_level(TechnologyKind::Astrophysics, 4);
        assert_eq!(player.max_colonies(), 3);
    }

    #[test]
    fn test_fleet_slots_fold_in_computer_tech() {
        let cfg = EngineConfig::default();
        let mut player = sample_player();
        let mut bonuses = BonusSet::default();
        assert_eq!(player.fleet_slot_capacity(&bonuses, &cfg), 1);
        player
            .technologies
            .set_level(TechnologyKind::ComputerTechnology, 3);
        assert_eq!(player.fleet_slot_capacity(&bonuses, &cfg), 4);
        bonuses.extra_fleet_slots = 2;
        assert_eq!(player.fleet_slot_capacity(&bonuses, &cfg), 6);
    }

    #[test]
    fn test_dark_matter_credit_respects_cap() {
        let cfg = EngineConfig::default();
        let bonuses = BonusSet::default();
        let mut player = sample_player();
        player.credit_dark_matter(Fixed::from_num(25_000), &bonuses, &cfg);
        assert_eq!(player.dark_matter, Fixed::from_num(10_000));
        // Above-cap balances are preserved, just not added to
        player.dark_matter = Fixed::from_num(50_000);
        player.credit_dark_matter(Fixed::from_num(100), &bonuses, &cfg);
        assert_eq!(player.dark_matter, Fixed::from_num(50_000));
    }

    #[test]
    fn test_spend_dark_matter_is_all_or_nothing() {
        let mut player = sample_player();
        player.dark_matter = Fixed::from_num(500);
        let error = player.spend_dark_matter(Fixed::from_num(2_000)).unwrap_err();
        assert!(matches!(error, GameError::InsufficientResources { .. }));
        assert_eq!(player.dark_matter, Fixed::from_num(500));
        player.spend_dark_matter(Fixed::from_num(500)).unwrap();
        assert_eq!(player.dark_matter, Fixed::ZERO);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut player = sample_player();
        player.dark_matter = Fixed::from_num(123.5);
        player.technologies.set_level(TechnologyKind::EnergyTechnology, 4);
        let bytes = player.to_bytes().unwrap();
        let restored = Player::from_bytes(&bytes).unwrap();
        assert_eq!(restored, player);
    }
}
