//! Campaign progression for a single player.
//!
//! Quest definitions live in [`quests`]; this module tracks which
//! quests a player has unlocked, started, completed and claimed.
//! Objective counters are re-measured from absolute player state on
//! every refresh, so the tracker cannot drift no matter how long the
//! player was away or how often the engine caught up.
//!
//! Claims gate unlocking: a quest's successors become available when
//! its rewards are taken, not when its objectives complete.

pub mod quests;

pub use quests::{
    BattleScope, CampaignConfig, ObjectiveDef, ObjectiveKind, QuestDef, QuestRewards, SpyScope,
    ALLIANCE_REPUTATION_FLOOR,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::npc::Npc;
use crate::player::Player;
use crate::time::Timestamp;

/// Lifecycle of one quest for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestStatus {
    /// Prerequisites not yet claimed.
    Locked,
    /// Unlocked, waiting to be started.
    Available,
    /// Started; objectives are being measured.
    Active,
    /// All objectives done; rewards may be pending.
    Completed,
}

impl QuestStatus {
    /// Lowercase label for error messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Available => "available",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// Measured progress toward one objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveProgress {
    /// Last measured count, capped at the requirement.
    pub current: u64,
    /// Latched once the requirement is reached.
    pub completed: bool,
}

/// One player's progress on one quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestProgress {
    /// Where this quest is in its lifecycle.
    pub status: QuestStatus,
    /// One slot per quest objective, in definition order.
    pub objectives: Vec<ObjectiveProgress>,
    /// When the quest was started.
    pub started_at: Option<Timestamp>,
    /// When the last objective completed.
    pub completed_at: Option<Timestamp>,
    /// Whether the payout has been taken.
    pub rewards_claimed: bool,
}

impl QuestProgress {
    fn fresh(status: QuestStatus, objective_count: usize) -> Self {
        Self {
            status,
            objectives: vec![ObjectiveProgress::default(); objective_count],
            started_at: None,
            completed_at: None,
            rewards_claimed: false,
        }
    }
}

/// Campaign bookkeeping surfaced to the caller by a refresh or claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignEvent {
    /// All objectives of an active quest completed.
    QuestCompleted {
        /// Finished quest.
        quest_id: String,
        /// Its display title.
        title: String,
    },
    /// A quest's prerequisites are all claimed.
    QuestUnlocked {
        /// Newly available quest.
        quest_id: String,
        /// Its display title.
        title: String,
    },
    /// A quest from a later chapter unlocked.
    ChapterAdvanced {
        /// The chapter now reached.
        chapter: u32,
    },
}

/// One player's campaign state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignState {
    /// Which campaign this progress belongs to.
    pub campaign_id: String,
    /// Highest chapter reached so far. Never regresses.
    pub current_chapter: u32,
    /// Per-quest progress, keyed by quest id.
    pub quest_progress: BTreeMap<String, QuestProgress>,
    /// Claimed quests, in claim order.
    pub completed_quests: Vec<String>,
    /// Quests visible to the player.
    pub unlocked_quests: Vec<String>,
}

impl CampaignState {
    /// Fresh progress with only the opening quest available.
    #[must_use]
    pub fn new(config: &CampaignConfig) -> Self {
        let mut state = Self {
            campaign_id: config.id.clone(),
            current_chapter: 1,
            quest_progress: BTreeMap::new(),
            completed_quests: Vec::new(),
            unlocked_quests: Vec::new(),
        };
        if let Some(first) = config.opening_quest() {
            state.unlocked_quests.push(first.id.clone());
            state.quest_progress.insert(
                first.id.clone(),
                QuestProgress::fresh(QuestStatus::Available, first.objectives.len()),
            );
        }
        state
    }

    /// Status of a quest, `Locked` when it has never been seen.
    #[must_use]
    pub fn status_of(&self, quest_id: &str) -> QuestStatus {
        if let Some(progress) = self.quest_progress.get(quest_id) {
            return progress.status;
        }
        if self.unlocked_quests.iter().any(|id| id == quest_id) {
            return QuestStatus::Available;
        }
        QuestStatus::Locked
    }

    /// Mark a quest as actively pursued.
    ///
    /// Only unlocked, unclaimed quests can be started. Starting an
    /// already active quest refreshes its start time and nothing else.
    pub fn start_quest(
        &mut self,
        config: &CampaignConfig,
        quest_id: &str,
        now: Timestamp,
    ) -> Result<()> {
        let quest = config
            .quest(quest_id)
            .ok_or_else(|| GameError::QuestNotFound(quest_id.to_owned()))?;
        if !self.unlocked_quests.iter().any(|id| id == quest_id) {
            return Err(GameError::QuestNotAvailable {
                id: quest_id.to_owned(),
                status: QuestStatus::Locked.label().to_owned(),
            });
        }
        if self.completed_quests.iter().any(|id| id == quest_id) {
            return Err(GameError::QuestNotAvailable {
                id: quest_id.to_owned(),
                status: QuestStatus::Completed.label().to_owned(),
            });
        }
        let progress = self
            .quest_progress
            .entry(quest_id.to_owned())
            .or_insert_with(|| QuestProgress::fresh(QuestStatus::Available, quest.objectives.len()));
        progress.status = QuestStatus::Active;
        progress.started_at = Some(now);
        tracing::debug!(quest_id, "quest started");
        Ok(())
    }

    /// Re-measure every active quest against current player state.
    ///
    /// Counters follow the measurement in both directions until an
    /// objective completes; completion itself is permanent. A quest
    /// whose objectives are all complete flips to `Completed`.
    pub fn refresh(
        &mut self,
        config: &CampaignConfig,
        player: &Player,
        npcs: &[Npc],
        now: Timestamp,
    ) -> Vec<CampaignEvent> {
        let mut events = Vec::new();
        for quest in &config.quests {
            let Some(progress) = self.quest_progress.get_mut(&quest.id) else {
                continue;
            };
            if progress.status != QuestStatus::Active {
                continue;
            }
            if progress.objectives.len() != quest.objectives.len() {
                // Definition changed under saved progress; re-measure
                // from scratch rather than guessing a mapping.
                progress.objectives =
                    vec![ObjectiveProgress::default(); quest.objectives.len()];
            }
            for (objective, slot) in quest.objectives.iter().zip(progress.objectives.iter_mut()) {
                if slot.completed {
                    continue;
                }
                slot.current = objective.kind.measure(player, npcs);
                if slot.current >= objective.kind.required() {
                    slot.completed = true;
                }
            }
            if progress.objectives.iter().all(|slot| slot.completed) {
                progress.status = QuestStatus::Completed;
                progress.completed_at = Some(now);
                tracing::debug!(quest_id = %quest.id, "quest completed");
                events.push(CampaignEvent::QuestCompleted {
                    quest_id: quest.id.clone(),
                    title: quest.title.clone(),
                });
            }
        }
        events
    }

    /// Take the payout for a completed quest.
    ///
    /// Exactly-once: the claim is recorded before successors unlock,
    /// so a repeated call fails rather than paying twice. The caller
    /// applies the returned rewards to the player.
    pub fn claim_rewards(
        &mut self,
        config: &CampaignConfig,
        quest_id: &str,
    ) -> Result<(QuestRewards, Vec<CampaignEvent>)> {
        let quest = config
            .quest(quest_id)
            .ok_or_else(|| GameError::QuestNotFound(quest_id.to_owned()))?;
        let progress = self
            .quest_progress
            .get_mut(quest_id)
            .ok_or_else(|| GameError::QuestNotFound(quest_id.to_owned()))?;
        if progress.status != QuestStatus::Completed {
            return Err(GameError::QuestNotAvailable {
                id: quest_id.to_owned(),
                status: progress.status.label().to_owned(),
            });
        }
        if progress.rewards_claimed {
            return Err(GameError::RewardsAlreadyClaimed(quest_id.to_owned()));
        }
        progress.rewards_claimed = true;
        if !self.completed_quests.iter().any(|id| id == quest_id) {
            self.completed_quests.push(quest_id.to_owned());
        }
        let events = self.unlock_eligible(config);
        tracing::info!(quest_id, unlocked = events.len(), "quest rewards claimed");
        Ok((quest.rewards.clone(), events))
    }

    /// Unlock every quest whose prerequisites are all claimed.
    ///
    /// Quests with no prerequisites never unlock here; the opening
    /// quest is seeded by [`CampaignState::new`] alone.
    fn unlock_eligible(&mut self, config: &CampaignConfig) -> Vec<CampaignEvent> {
        let mut events = Vec::new();
        for quest in &config.quests {
            if self.unlocked_quests.iter().any(|id| id == &quest.id) {
                continue;
            }
            if quest.requires.is_empty() {
                continue;
            }
            let ready = quest
                .requires
                .iter()
                .all(|req| self.completed_quests.iter().any(|done| done == req));
            if !ready {
                continue;
            }
            self.unlocked_quests.push(quest.id.clone());
            self.quest_progress.insert(
                quest.id.clone(),
                QuestProgress::fresh(QuestStatus::Available, quest.objectives.len()),
            );
            events.push(CampaignEvent::QuestUnlocked {
                quest_id: quest.id.clone(),
                title: quest.title.clone(),
            });
            if quest.chapter > self.current_chapter {
                self.current_chapter = quest.chapter;
                events.push(CampaignEvent::ChapterAdvanced {
                    chapter: quest.chapter,
                });
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{BuildingKind, ShipKind};
    use crate::deposits::OreDeposits;
    use crate::planet::Planet;
    use crate::position::Position;
    use crate::resources::Resources;

    use super::*;

    fn test_player() -> Player {
        let homeworld = Planet::homeworld(1, Position::new(1, 1, 8), 0, OreDeposits::default());
        Player::new(1, "Tester", homeworld)
    }

    // Two-quest fixture: one fighter quest, then a chapter 2 follow-up.
    fn mini_campaign() -> CampaignConfig {
        CampaignConfig {
            id: "mini".to_owned(),
            quests: vec![
                QuestDef {
                    id: "first".to_owned(),
                    chapter: 1,
                    title: "First".to_owned(),
                    description: String::new(),
                    requires: Vec::new(),
                    objectives: vec![ObjectiveDef {
                        description: String::new(),
                        kind: ObjectiveKind::ProduceShips {
                            ship: ShipKind::LightFighter,
                            count: 5,
                        },
                    }],
                    rewards: QuestRewards {
                        resources: Resources::new(1_000, 0, 0),
                        points: 10,
                        ..QuestRewards::default()
                    },
                },
                QuestDef {
                    id: "second".to_owned(),
                    chapter: 2,
                    title: "Second".to_owned(),
                    description: String::new(),
                    requires: vec!["first".to_owned()],
                    objectives: vec![ObjectiveDef {
                        description: String::new(),
                        kind: ObjectiveKind::SendGifts { count: 1 },
                    }],
                    rewards: QuestRewards::default(),
                },
            ],
        }
    }

    #[test]
    fn test_new_campaign_opens_only_the_first_quest() {
        let campaign = CampaignConfig::standard();
        let state = CampaignState::new(&campaign);
        assert_eq!(state.current_chapter, 1);
        assert_eq!(state.status_of("quest_1_1"), QuestStatus::Available);
        assert_eq!(state.status_of("quest_1_2"), QuestStatus::Locked);
        assert_eq!(state.status_of("quest_5_5"), QuestStatus::Locked);
    }

    #[test]
    fn test_quest_progresses_only_while_active() {
        let campaign = mini_campaign();
        let mut state = CampaignState::new(&campaign);
        let mut player = test_player();
        player.planets[0].fleet.light_fighter = 5;

        // Available but never started: refresh measures nothing
        assert!(state.refresh(&campaign, &player, &[], 100).is_empty());
        assert_eq!(state.status_of("first"), QuestStatus::Available);

        state.start_quest(&campaign, "first", 200).unwrap();
        let events = state.refresh(&campaign, &player, &[], 300);
        assert_eq!(
            events,
            vec![CampaignEvent::QuestCompleted {
                quest_id: "first".to_owned(),
                title: "First".to_owned(),
            }]
        );
        let progress = &state.quest_progress["first"];
        assert_eq!(progress.status, QuestStatus::Completed);
        assert_eq!(progress.started_at, Some(200));
        assert_eq!(progress.completed_at, Some(300));
    }

    #[test]
    fn test_locked_and_unknown_quests_cannot_be_started() {
        let campaign = mini_campaign();
        let mut state = CampaignState::new(&campaign);
        assert!(matches!(
            state.start_quest(&campaign, "second", 0),
            Err(GameError::QuestNotAvailable { .. })
        ));
        assert!(matches!(
            state.start_quest(&campaign, "twelfth", 0),
            Err(GameError::QuestNotFound(_))
        ));
    }

    #[test]
    fn test_counter_follows_state_until_completion_latches() {
        let campaign = mini_campaign();
        let mut state = CampaignState::new(&campaign);
        let mut player = test_player();
        state.start_quest(&campaign, "first", 0).unwrap();

        player.planets[0].fleet.light_fighter = 3;
        state.refresh(&campaign, &player, &[], 1);
        assert_eq!(state.quest_progress["first"].objectives[0].current, 3);

        // Losing ships moves the counter back down
        player.planets[0].fleet.light_fighter = 1;
        state.refresh(&campaign, &player, &[], 2);
        assert_eq!(state.quest_progress["first"].objectives[0].current, 1);

        player.planets[0].fleet.light_fighter = 9;
        state.refresh(&campaign, &player, &[], 3);
        let slot = state.quest_progress["first"].objectives[0];
        assert!(slot.completed);
        assert_eq!(slot.current, 5);

        // Completion survives losing the ships afterwards
        player.planets[0].fleet.light_fighter = 0;
        state.refresh(&campaign, &player, &[], 4);
        let slot = state.quest_progress["first"].objectives[0];
        assert!(slot.completed);
        assert_eq!(slot.current, 5);
        assert_eq!(state.quest_progress["first"].status, QuestStatus::Completed);
    }

    #[test]
    fn test_claim_pays_once_and_unlocks_successors() {
        let campaign = mini_campaign();
        let mut state = CampaignState::new(&campaign);
        let mut player = test_player();
        player.planets[0].fleet.light_fighter = 5;
        state.start_quest(&campaign, "first", 0).unwrap();
        state.refresh(&campaign, &player, &[], 1);

        let (rewards, events) = state.claim_rewards(&campaign, "first").unwrap();
        assert_eq!(rewards.resources, Resources::new(1_000, 0, 0));
        assert_eq!(rewards.points, 10);
        assert_eq!(
            events,
            vec![
                CampaignEvent::QuestUnlocked {
                    quest_id: "second".to_owned(),
                    title: "Second".to_owned(),
                },
                CampaignEvent::ChapterAdvanced { chapter: 2 },
            ]
        );
        assert_eq!(state.current_chapter, 2);
        assert_eq!(state.status_of("second"), QuestStatus::Available);
        assert_eq!(state.completed_quests, vec!["first".to_owned()]);

        assert!(matches!(
            state.claim_rewards(&campaign, "first"),
            Err(GameError::RewardsAlreadyClaimed(_))
        ));
    }

    #[test]
    fn test_claim_requires_completion() {
        let campaign = mini_campaign();
        let mut state = CampaignState::new(&campaign);
        let player = test_player();
        state.start_quest(&campaign, "first", 0).unwrap();
        state.refresh(&campaign, &player, &[], 1);
        assert!(matches!(
            state.claim_rewards(&campaign, "first"),
            Err(GameError::QuestNotAvailable { .. })
        ));
    }

    #[test]
    fn test_standard_opening_quest_walkthrough() {
        let campaign = CampaignConfig::standard();
        let mut state = CampaignState::new(&campaign);
        let mut player = test_player();
        state.start_quest(&campaign, "quest_1_1", 0).unwrap();

        let buildings = &mut player.planets[0].buildings;
        buildings.set_level(BuildingKind::MetalMine, 2);
        buildings.set_level(BuildingKind::CrystalMine, 2);
        state.refresh(&campaign, &player, &[], 10);
        assert_eq!(state.status_of("quest_1_1"), QuestStatus::Active);

        player
            .planets[0]
            .buildings
            .set_level(BuildingKind::SolarPlant, 2);
        let events = state.refresh(&campaign, &player, &[], 20);
        assert_eq!(events.len(), 1);

        let (rewards, events) = state.claim_rewards(&campaign, "quest_1_1").unwrap();
        assert_eq!(rewards.resources, Resources::new(5_000, 2_500, 0));
        assert_eq!(rewards.points, 100);
        assert!(events.contains(&CampaignEvent::QuestUnlocked {
            quest_id: "quest_1_2".to_owned(),
            title: "Spark of Inquiry".to_owned(),
        }));
        // Chapter only advances when a later chapter quest unlocks
        assert_eq!(state.current_chapter, 1);
    }
}
