//! Reputation between the player and NPC factions.
//!
//! Reputation is a clamped score per NPC; crossing the outer bands
//! flips the diplomatic status, which in turn changes how that NPC
//! treats inbound fleets and gifts.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::math::Fixed;
use crate::npc::NpcPersonality;
use crate::reports::BoundedLog;
use crate::time::Timestamp;

/// Lowest reachable reputation.
pub const REPUTATION_MIN: i32 = -100;
/// Highest reachable reputation.
pub const REPUTATION_MAX: i32 = 100;
/// At or below this the NPC turns hostile.
pub const HOSTILE_THRESHOLD: i32 = -50;
/// At or above this the NPC turns friendly.
pub const FRIENDLY_THRESHOLD: i32 = 50;
/// Above this, further gifts count for half.
pub const GIFT_DIMINISHING_THRESHOLD: i32 = 50;

/// Reputation lost when a fleet attacks an NPC world.
pub const ATTACK_PENALTY: i32 = -15;
/// Reputation lost when an espionage probe is detected.
pub const ESPIONAGE_DETECTED_PENALTY: i32 = -10;
/// Reputation lost even when a probe slips through unseen.
pub const ESPIONAGE_UNDETECTED_PENALTY: i32 = -2;

/// How an NPC currently regards the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DiplomaticStatus {
    /// Open hostility; fleets are attacked on sight.
    Hostile,
    /// No strong opinion either way.
    #[default]
    Neutral,
    /// Trusted; some interactions get better terms.
    Friendly,
}

/// Why reputation moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReputationReason {
    /// The player attacked one of the NPC's worlds.
    Attack,
    /// An espionage probe was spotted over an NPC world.
    EspionageDetected,
    /// A probe got through, but traces were found later.
    EspionageUndetected,
    /// The player delivered a resource gift.
    Gift,
}

/// Why an NPC turned a gift away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GiftRejection {
    /// Reputation is already at its ceiling.
    ReputationCap,
    /// The NPC is hostile and refuses tribute.
    Hostile,
    /// The offering was too small to register.
    TooSmall,
}

/// One reputation movement, kept in the relation's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationEvent {
    /// When the change happened.
    pub timestamp: Timestamp,
    /// Signed reputation delta after clamping.
    pub change: i32,
    /// What caused it.
    pub reason: ReputationReason,
}

/// The player's standing with one NPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiplomaticRelation {
    /// Clamped reputation score.
    pub reputation: i32,
    /// Band derived from the score.
    pub status: DiplomaticStatus,
    /// Last time the score moved.
    pub last_updated: Timestamp,
    /// Recent movements, newest first.
    pub history: BoundedLog<ReputationEvent>,
}

impl Default for DiplomaticRelation {
    fn default() -> Self {
        Self {
            reputation: 0,
            status: DiplomaticStatus::Neutral,
            last_updated: 0,
            history: BoundedLog::new(),
        }
    }
}

/// A record of a reputation movement, surfaced to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiplomaticReport {
    /// Report id.
    pub id: u64,
    /// When the change happened.
    pub timestamp: Timestamp,
    /// The NPC involved.
    pub npc_id: u64,
    /// Its display name at the time.
    pub npc_name: String,
    /// What caused the movement.
    pub reason: ReputationReason,
    /// Signed delta actually applied.
    pub reputation_change: i32,
    /// Score after the change.
    pub new_reputation: i32,
    /// Band before the change.
    pub old_status: DiplomaticStatus,
    /// Band after the change.
    pub new_status: DiplomaticStatus,
}

/// Clamp a raw score into the legal reputation range.
#[must_use]
pub fn clamp_reputation(value: i32) -> i32 {
    value.clamp(REPUTATION_MIN, REPUTATION_MAX)
}

/// The status band a score falls into.
#[must_use]
pub fn status_for(reputation: i32) -> DiplomaticStatus {
    if reputation <= HOSTILE_THRESHOLD {
        DiplomaticStatus::Hostile
    } else if reputation >= FRIENDLY_THRESHOLD {
        DiplomaticStatus::Friendly
    } else {
        DiplomaticStatus::Neutral
    }
}

impl DiplomaticRelation {
    /// Apply a reputation change, recording it in the history.
    /// Returns the status bands before and after.
    pub fn apply_change(
        &mut self,
        change: i32,
        reason: ReputationReason,
        now: Timestamp,
        history_cap: usize,
    ) -> (DiplomaticStatus, DiplomaticStatus) {
        let old_status = self.status;
        let before = self.reputation;
        self.reputation = clamp_reputation(self.reputation.saturating_add(change));
        let applied = self.reputation - before;
        self.status = status_for(self.reputation);
        self.last_updated = now;
        self.history.push(
            ReputationEvent {
                timestamp: now,
                change: applied,
                reason,
            },
            history_cap,
        );
        (old_status, self.status)
    }
}

/// Judge a gift offering, returning the reputation gain it buys.
///
/// Hostile aggressors refuse tribute outright, maxed-out relations
/// cannot be improved further, and tiny offerings are ignored. Large
/// gifts are capped, and above the diminishing threshold everything
/// counts for half.
pub fn evaluate_gift(
    relation: &DiplomaticRelation,
    personality: NpcPersonality,
    total_value: Fixed,
    cfg: &EngineConfig,
) -> Result<i32, GiftRejection> {
    if total_value < Fixed::from_num(cfg.gift_min_total) {
        return Err(GiftRejection::TooSmall);
    }
    if relation.status == DiplomaticStatus::Hostile && personality == NpcPersonality::Aggressive {
        return Err(GiftRejection::Hostile);
    }
    if relation.reputation >= REPUTATION_MAX {
        return Err(GiftRejection::ReputationCap);
    }
    let raw: i32 = (total_value / Fixed::from_num(cfg.gift_points_divisor.max(1))).to_num();
    let mut gain = raw.clamp(1, cfg.gift_gain_cap);
    if relation.reputation > GIFT_DIMINISHING_THRESHOLD {
        gain = (gain / 2).max(1);
    }
    Ok(gain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reputation_clamps_at_both_ends() {
        assert_eq!(clamp_reputation(250), REPUTATION_MAX);
        assert_eq!(clamp_reputation(-250), REPUTATION_MIN);
        assert_eq!(clamp_reputation(42), 42);
    }

    #[test]
    fn test_status_bands() {
        assert_eq!(status_for(-100), DiplomaticStatus::Hostile);
        assert_eq!(status_for(-50), DiplomaticStatus::Hostile);
        assert_eq!(status_for(-49), DiplomaticStatus::Neutral);
        assert_eq!(status_for(0), DiplomaticStatus::Neutral);
        assert_eq!(status_for(49), DiplomaticStatus::Neutral);
        assert_eq!(status_for(50), DiplomaticStatus::Friendly);
        assert_eq!(status_for(100), DiplomaticStatus::Friendly);
    }

    #[test]
    fn test_attacks_sour_the_relation() {
        let mut relation = DiplomaticRelation {
            reputation: -40,
            ..Default::default()
        };
        let (old, new) = relation.apply_change(ATTACK_PENALTY, ReputationReason::Attack, 1_000, 30);
        assert_eq!(old, DiplomaticStatus::Neutral);
        assert_eq!(new, DiplomaticStatus::Hostile);
        assert_eq!(relation.reputation, -55);
        assert_eq!(relation.history.latest().unwrap().change, -15);
    }

    #[test]
    fn test_recorded_change_reflects_clamping() {
        let mut relation = DiplomaticRelation {
            reputation: -95,
            status: DiplomaticStatus::Hostile,
            ..Default::default()
        };
        relation.apply_change(ATTACK_PENALTY, ReputationReason::Attack, 0, 30);
        assert_eq!(relation.reputation, REPUTATION_MIN);
        // Only 5 points were actually lost
        assert_eq!(relation.history.latest().unwrap().change, -5);
    }

    #[test]
    fn test_espionage_penalties_scale_with_detection() {
        assert!(ESPIONAGE_DETECTED_PENALTY < ESPIONAGE_UNDETECTED_PENALTY);
        let mut relation = DiplomaticRelation::default();
        relation.apply_change(
            ESPIONAGE_UNDETECTED_PENALTY,
            ReputationReason::EspionageUndetected,
            0,
            30,
        );
        assert_eq!(relation.reputation, -2);
    }

    #[test]
    fn test_history_is_capped() {
        let mut relation = DiplomaticRelation::default();
        for day in 0..10 {
            relation.apply_change(1, ReputationReason::Gift, day, 4);
        }
        assert_eq!(relation.history.len(), 4);
        assert_eq!(relation.history.latest().unwrap().timestamp, 9);
    }

    #[test]
    fn test_gift_too_small_is_ignored() {
        let cfg = EngineConfig::default();
        let relation = DiplomaticRelation::default();
        let verdict = evaluate_gift(
            &relation,
            NpcPersonality::Trader,
            Fixed::from_num(500),
            &cfg,
        );
        assert_eq!(verdict, Err(GiftRejection::TooSmall));
    }

    #[test]
    fn test_gift_gain_scales_and_caps() {
        let cfg = EngineConfig::default();
        let relation = DiplomaticRelation::default();
        // 10000 / 2500 = 4 points
        assert_eq!(
            evaluate_gift(&relation, NpcPersonality::Trader, Fixed::from_num(10_000), &cfg),
            Ok(4)
        );
        // A fortune still caps out
        assert_eq!(
            evaluate_gift(
                &relation,
                NpcPersonality::Trader,
                Fixed::from_num(1_000_000),
                &cfg
            ),
            Ok(cfg.gift_gain_cap)
        );
        // The smallest accepted gift is worth one point
        assert_eq!(
            evaluate_gift(&relation, NpcPersonality::Trader, Fixed::from_num(1_000), &cfg),
            Ok(1)
        );
    }

    #[test]
    fn test_gifts_count_half_near_the_top() {
        let cfg = EngineConfig::default();
        let relation = DiplomaticRelation {
            reputation: 60,
            status: DiplomaticStatus::Friendly,
            ..Default::default()
        };
        assert_eq!(
            evaluate_gift(&relation, NpcPersonality::Trader, Fixed::from_num(10_000), &cfg),
            Ok(2)
        );
    }

    #[test]
    fn test_maxed_relation_rejects_gifts() {
        let cfg = EngineConfig::default();
        let relation = DiplomaticRelation {
            reputation: REPUTATION_MAX,
            status: DiplomaticStatus::Friendly,
            ..Default::default()
        };
        assert_eq!(
            evaluate_gift(&relation, NpcPersonality::Trader, Fixed::from_num(10_000), &cfg),
            Err(GiftRejection::ReputationCap)
        );
    }

    #[test]
    fn test_hostile_aggressor_refuses_tribute() {
        let cfg = EngineConfig::default();
        let relation = DiplomaticRelation {
            reputation: -80,
            status: DiplomaticStatus::Hostile,
            ..Default::default()
        };
        assert_eq!(
            evaluate_gift(
                &relation,
                NpcPersonality::Aggressive,
                Fixed::from_num(10_000),
                &cfg
            ),
            Err(GiftRejection::Hostile)
        );
        // A hostile trader still takes the money
        assert!(evaluate_gift(
            &relation,
            NpcPersonality::Trader,
            Fixed::from_num(10_000),
            &cfg
        )
        .is_ok());
    }
}
