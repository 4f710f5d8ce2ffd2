//! NPC factions: identity, disposition, and behavior tracking.
//!
//! NPC worlds live in the shared universe registry; the faction record
//! here carries everything else: technology, temperament, standing
//! toward each player, and the missions its fleets are flying.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::TechnologyLevels;
use crate::diplomacy::{DiplomaticRelation, DiplomaticStatus};
use crate::missions::FleetMission;
use crate::time::{Timestamp, MS_PER_HOUR};

/// How long an attacked NPC stays on alert.
pub const ALERT_WINDOW_MS: i64 = 24 * MS_PER_HOUR;

/// Strength tier of an NPC faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum NpcDifficulty {
    /// Weak worlds, forgiving reactions.
    Easy,
    /// The baseline.
    #[default]
    Medium,
    /// Heavily developed worlds, quick to retaliate.
    Hard,
}

/// Behavioral archetype steering an NPC's decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum NpcPersonality {
    /// Raids readily, refuses tribute while hostile.
    Aggressive,
    /// Fortifies, rarely leaves home.
    Defensive,
    /// Values gifts and commerce.
    Trader,
    /// Settles new worlds when it can.
    Expansionist,
    /// A bit of everything.
    #[default]
    Balanced,
}

/// Raid bookkeeping for one opposing player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AttackRecord {
    /// Raids absorbed from this player.
    pub count: u32,
    /// When the latest raid arrived.
    pub last_attack_time: Option<Timestamp>,
    /// The world that was hit last.
    pub planet_id: Option<u64>,
}

/// A computer-controlled faction sharing the universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    /// Unique NPC id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Faction-wide technology levels, used in combat.
    pub technologies: TechnologyLevels,
    /// Strength tier.
    pub difficulty: NpcDifficulty,
    /// Behavioral archetype.
    pub personality: NpcPersonality,
    /// Last time this faction sent a probe anywhere.
    pub last_spy_time: Option<Timestamp>,
    /// Last time this faction attacked anyone.
    pub last_attack_time: Option<Timestamp>,
    /// Missions its fleets are currently flying.
    pub fleet_missions: Vec<FleetMission>,
    /// Raids absorbed, by attacking player id.
    pub attacked_by: BTreeMap<u64, AttackRecord>,
    /// On alert until this time after being raided.
    pub alert_until: Option<Timestamp>,
    /// Standing toward each player, by player id.
    pub relations: BTreeMap<u64, DiplomaticRelation>,
    /// Friendly NPC factions.
    pub allies: Vec<u64>,
    /// Rival NPC factions.
    pub enemies: Vec<u64>,
}

impl Npc {
    /// A fresh faction with default technology and no history.
    #[must_use]
    pub fn new(
        id: u64,
        name: impl Into<String>,
        difficulty: NpcDifficulty,
        personality: NpcPersonality,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            technologies: TechnologyLevels::default(),
            difficulty,
            personality,
            last_spy_time: None,
            last_attack_time: None,
            fleet_missions: Vec::new(),
            attacked_by: BTreeMap::new(),
            alert_until: None,
            relations: BTreeMap::new(),
            allies: Vec::new(),
            enemies: Vec::new(),
        }
    }

    /// Standing toward a player, if any contact has happened.
    #[must_use]
    pub fn relation(&self, player_id: u64) -> Option<&DiplomaticRelation> {
        self.relations.get(&player_id)
    }

    /// Standing toward a player, created neutral on first contact.
    pub fn relation_mut(&mut self, player_id: u64) -> &mut DiplomaticRelation {
        self.relations.entry(player_id).or_default()
    }

    /// Status band toward a player; strangers are neutral.
    #[must_use]
    pub fn status_toward(&self, player_id: u64) -> DiplomaticStatus {
        self.relations
            .get(&player_id)
            .map_or(DiplomaticStatus::Neutral, |relation| relation.status)
    }

    /// Whether the faction would fire on this player's fleets.
    #[must_use]
    pub fn is_hostile_toward(&self, player_id: u64) -> bool {
        self.status_toward(player_id) == DiplomaticStatus::Hostile
    }

    /// Whether the faction is still reeling from a recent raid.
    #[must_use]
    pub fn is_on_alert(&self, now: Timestamp) -> bool {
        self.alert_until.is_some_and(|until| until > now)
    }

    /// Record an inbound raid and raise the alert.
    pub fn record_attack_by(&mut self, player_id: u64, planet_id: u64, now: Timestamp) {
        let record = self.attacked_by.entry(player_id).or_default();
        record.count += 1;
        record.last_attack_time = Some(now);
        record.planet_id = Some(planet_id);
        self.alert_until = Some(now + ALERT_WINDOW_MS);
    }
}

#[cfg(test)]
mod tests {
    use crate::diplomacy::ReputationReason;

    use super::*;

    #[test]
    fn test_strangers_are_neutral() {
        let npc = Npc::new(3, "Kovar Syndicate", NpcDifficulty::Medium, NpcPersonality::Trader);
        assert!(npc.relation(1).is_none());
        assert_eq!(npc.status_toward(1), DiplomaticStatus::Neutral);
        assert!(!npc.is_hostile_toward(1));
    }

    #[test]
    fn test_first_contact_creates_neutral_relation() {
        let mut npc = Npc::new(3, "Kovar Syndicate", NpcDifficulty::Easy, NpcPersonality::Balanced);
        npc.relation_mut(1)
            .apply_change(-60, ReputationReason::Attack, 500, 30);
        assert_eq!(npc.status_toward(1), DiplomaticStatus::Hostile);
        assert!(npc.is_hostile_toward(1));
        // Other players are unaffected
        assert_eq!(npc.status_toward(2), DiplomaticStatus::Neutral);
    }

    #[test]
    fn test_raids_raise_the_alert() {
        let mut npc = Npc::new(9, "Hollow Crown", NpcDifficulty::Hard, NpcPersonality::Aggressive);
        assert!(!npc.is_on_alert(1_000));
        npc.record_attack_by(1, 77, 1_000);
        npc.record_attack_by(1, 78, 2_000);
        let record = npc.attacked_by.get(&1).unwrap();
        assert_eq!(record.count, 2);
        assert_eq!(record.planet_id, Some(78));
        assert!(npc.is_on_alert(2_000 + ALERT_WINDOW_MS - 1));
        assert!(!npc.is_on_alert(2_000 + ALERT_WINDOW_MS));
    }
}
