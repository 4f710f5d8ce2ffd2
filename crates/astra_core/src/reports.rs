//! Player-facing report and notification logs.
//!
//! Everything here is bounded: logs keep the newest entries and
//! silently drop the oldest once they reach their cap, so a player
//! state can never grow without limit no matter how long it runs.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingLevels, DefenseCounts, FleetComposition, OfficerKind, TechnologyLevels};
use crate::combat::BattleWinner;
use crate::diplomacy::GiftRejection;
use crate::math::{fixed_serde, Fixed};
use crate::missions::MissionKind;
use crate::position::Position;
use crate::resources::{ResourceKind, Resources};
use crate::time::Timestamp;

// ============================================================================
// Bounded log
// ============================================================================

/// Newest-first log that drops its oldest entries past a cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundedLog<T>(VecDeque<T>);

impl<T> Default for BoundedLog<T> {
    fn default() -> Self {
        Self(VecDeque::new())
    }
}

impl<T> BoundedLog<T> {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an entry, trimming the tail down to `cap`.
    pub fn push(&mut self, entry: T, cap: usize) {
        self.0.push_front(entry);
        self.0.truncate(cap);
    }

    /// Newest entry, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.0.front()
    }

    /// Entries newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing has been logged yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop entries failing the predicate.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.0.retain(keep);
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<'a, T> IntoIterator for &'a BoundedLog<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Short-lived notice shown to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Monotonic per-player id.
    pub id: u64,
    /// When the event happened.
    pub timestamp: Timestamp,
    /// Whether the player has seen it.
    pub read: bool,
    /// What happened.
    pub kind: NotificationKind,
}

impl Notification {
    /// Fresh unread notification.
    #[must_use]
    pub fn new(id: u64, timestamp: Timestamp, kind: NotificationKind) -> Self {
        Self {
            id,
            timestamp,
            read: false,
            kind,
        }
    }
}

/// Everything a notification can announce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    /// An NPC probe scanned one of the player's planets.
    #[serde(rename_all = "camelCase")]
    Spied {
        /// Scanning NPC.
        npc_id: u64,
        /// NPC display name.
        npc_name: String,
        /// Planet that was scanned.
        position: Position,
    },
    /// A fleet is inbound on one of the player's planets.
    #[serde(rename_all = "camelCase")]
    IncomingFleet {
        /// Mission en route.
        mission_id: u64,
        /// Mission type, as far as sensors can tell.
        kind: MissionKind,
        /// Where it launched from.
        origin: Position,
        /// Which planet it is headed for.
        target: Position,
        /// When it lands.
        arrival: Timestamp,
        /// Whether the mission is an act of aggression.
        hostile: bool,
    },
    /// Notable NPC behaviour observed in the universe.
    #[serde(rename_all = "camelCase")]
    NpcActivity {
        /// Acting NPC.
        npc_id: u64,
        /// NPC display name.
        npc_name: String,
        /// Free-form description of the activity.
        details: String,
    },
    /// An NPC accepted a resource gift.
    #[serde(rename_all = "camelCase")]
    GiftAccepted {
        /// Receiving NPC.
        npc_id: u64,
        /// NPC display name.
        npc_name: String,
        /// What was handed over.
        resources: Resources,
        /// Reputation gained.
        reputation_gain: i32,
    },
    /// An NPC turned a gift away; the cargo comes back.
    #[serde(rename_all = "camelCase")]
    GiftRejected {
        /// Rejecting NPC.
        npc_id: u64,
        /// NPC display name.
        npc_name: String,
        /// The refused cargo.
        resources: Resources,
        /// Why it was refused.
        reason: GiftRejection,
    },
    /// A campaign quest was completed.
    #[serde(rename_all = "camelCase")]
    QuestCompleted {
        /// Finished quest.
        quest_id: String,
        /// Quest title.
        title: String,
    },
    /// A campaign quest became available.
    #[serde(rename_all = "camelCase")]
    QuestUnlocked {
        /// Newly available quest.
        quest_id: String,
        /// Quest title.
        title: String,
    },
    /// An ore deposit dropped below its warning level.
    #[serde(rename_all = "camelCase")]
    DepositWarning {
        /// Affected planet.
        position: Position,
        /// Which ore is running out.
        resource: ResourceKind,
    },
    /// An ore deposit ran dry.
    #[serde(rename_all = "camelCase")]
    DepositDepleted {
        /// Affected planet.
        position: Position,
        /// Which ore is gone.
        resource: ResourceKind,
    },
    /// An officer's contract ran out.
    #[serde(rename_all = "camelCase")]
    OfficerExpired {
        /// Which officer left.
        officer: OfficerKind,
    },
    /// A completion made new construction or research options available.
    #[serde(rename_all = "camelCase")]
    UnlocksAvailable {
        /// Planet whose completion triggered the unlocks.
        position: Position,
        /// Newly available entries by catalog name.
        entries: Vec<String>,
    },
    /// Battle debris coalesced into a new moon.
    #[serde(rename_all = "camelCase")]
    MoonFormed {
        /// Planet the moon now orbits.
        position: Position,
    },
}

impl BoundedLog<Notification> {
    /// Flag every retained notification as seen.
    pub fn mark_all_read(&mut self) {
        for entry in &mut self.0 {
            entry.read = true;
        }
    }

    /// Number of notifications the player has not seen yet.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.0.iter().filter(|n| !n.read).count()
    }
}

// ============================================================================
// Battle and espionage reports
// ============================================================================

/// Full account of one battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleReport {
    /// Monotonic per-player id.
    pub id: u64,
    /// When the battle was fought.
    pub timestamp: Timestamp,
    /// Where it was fought.
    pub position: Position,
    /// Attacking party's display name.
    pub attacker_name: String,
    /// Defending party's display name.
    pub defender_name: String,
    /// Rounds fought before a decision.
    pub rounds: u8,
    /// Who held the field.
    pub winner: BattleWinner,
    /// Attacker ships destroyed.
    pub attacker_losses: FleetComposition,
    /// Defender ships destroyed.
    pub defender_fleet_losses: FleetComposition,
    /// Defender installations destroyed.
    pub defender_defense_losses: DefenseCounts,
    /// Resources carried off by the winner.
    pub plunder: Resources,
    /// Metal left floating at the site.
    #[serde(with = "fixed_serde")]
    pub debris_metal: Fixed,
    /// Crystal left floating at the site.
    #[serde(with = "fixed_serde")]
    pub debris_crystal: Fixed,
    /// Whether the debris formed a moon.
    pub moon_formed: bool,
}

/// Intelligence gathered by an espionage probe.
///
/// How much of the target is visible depends on the espionage
/// technology gap; fields the probe could not resolve stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpyReport {
    /// Monotonic per-player id.
    pub id: u64,
    /// When the probe reported in.
    pub timestamp: Timestamp,
    /// Scanned planet.
    pub position: Position,
    /// Owner's display name.
    pub target_name: String,
    /// Owning NPC, if the target is NPC-held.
    pub npc_id: Option<u64>,
    /// Stockpiles on the ground.
    pub resources: Resources,
    /// Building levels, at moderate tech advantage.
    pub buildings: Option<BuildingLevels>,
    /// Stationed fleet, at higher tech advantage.
    pub fleet: Option<FleetComposition>,
    /// Defensive installations, at higher tech advantage.
    pub defense: Option<DefenseCounts>,
    /// Researched technologies, at full tech advantage.
    pub technologies: Option<TechnologyLevels>,
    /// Whether the target noticed the probe.
    pub detected: bool,
}
