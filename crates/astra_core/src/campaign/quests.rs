//! Campaign quest definitions and objective measurement.
//!
//! Quests are pure data: a chapter, prerequisite quests, a list of
//! objectives, and a reward bundle. Objective progress is always
//! measured from current player state rather than accumulated from
//! events, so a progress refresh is idempotent and survives any
//! catch-up cadence.

use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingKind, FleetComposition, ShipKind, TechnologyKind};
use crate::diplomacy::DiplomaticStatus;
use crate::math::{fixed_serde, Fixed};
use crate::npc::Npc;
use crate::player::Player;
use crate::resources::Resources;

/// Reputation floor, on top of friendly status, for an alliance to count.
pub const ALLIANCE_REPUTATION_FLOOR: i32 = 80;

/// Which targets count toward an espionage objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpyScope {
    /// Any scanned world.
    Any,
    /// Only worlds of factions currently hostile to the player.
    Hostile,
}

/// Which battles count toward a combat objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BattleScope {
    /// Won raids only.
    Attack,
    /// Successful defenses only.
    Defense,
    /// Either.
    Any,
}

/// A single thing a quest asks the player to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectiveKind {
    /// Raise a building to a level on any planet.
    #[serde(rename_all = "camelCase")]
    BuildBuilding {
        /// Which building.
        building: BuildingKind,
        /// Level to reach.
        level: u32,
    },
    /// Research a technology to a level.
    #[serde(rename_all = "camelCase")]
    ResearchTechnology {
        /// Which technology.
        technology: TechnologyKind,
        /// Level to reach.
        level: u32,
    },
    /// Have a number of a given ship stationed across the empire.
    #[serde(rename_all = "camelCase")]
    ProduceShips {
        /// Which hull.
        ship: ShipKind,
        /// Units required.
        count: u32,
    },
    /// Hold a combined stockpile across all planets.
    #[serde(rename_all = "camelCase")]
    AccumulateResources {
        /// Combined metal, crystal and deuterium required.
        total: i64,
    },
    /// Hold a number of colonies beyond the homeworld.
    #[serde(rename_all = "camelCase")]
    ColonizePlanets {
        /// Colonies required.
        count: u32,
    },
    /// Hold espionage reports on foreign worlds.
    #[serde(rename_all = "camelCase")]
    SpyTargets {
        /// Which targets count.
        scope: SpyScope,
        /// Reports required.
        count: u32,
    },
    /// Deliver resource gifts to NPC factions.
    #[serde(rename_all = "camelCase")]
    SendGifts {
        /// Gifts required.
        count: u32,
    },
    /// Fly expeditions into the outer zone.
    #[serde(rename_all = "camelCase")]
    CompleteExpeditions {
        /// Expeditions required.
        count: u32,
    },
    /// Win battles.
    #[serde(rename_all = "camelCase")]
    WinBattles {
        /// Which battles count.
        scope: BattleScope,
        /// Wins required.
        count: u32,
    },
    /// Harvest debris fields.
    #[serde(rename_all = "camelCase")]
    RecycleDebris {
        /// Recycling runs required.
        count: u32,
    },
    /// Bring any NPC relation to a given standing.
    #[serde(rename_all = "camelCase")]
    ReachRelationStatus {
        /// Standing to reach.
        status: DiplomaticStatus,
    },
    /// Cement an alliance with a deeply friendly faction.
    FormAlliance,
    /// Defeat NPC fleets in battle.
    #[serde(rename_all = "camelCase")]
    DefeatNpc {
        /// Victories required.
        count: u32,
    },
    /// Destroy planets outright.
    #[serde(rename_all = "camelCase")]
    DestroyPlanet {
        /// Destructions required.
        count: u32,
    },
}

impl ObjectiveKind {
    /// The count at which this objective is complete.
    #[must_use]
    pub fn required(&self) -> u64 {
        match *self {
            Self::BuildBuilding { .. }
            | Self::ResearchTechnology { .. }
            | Self::ReachRelationStatus { .. }
            | Self::FormAlliance => 1,
            Self::ProduceShips { count, .. }
            | Self::ColonizePlanets { count }
            | Self::SpyTargets { count, .. }
            | Self::SendGifts { count }
            | Self::CompleteExpeditions { count }
            | Self::WinBattles { count, .. }
            | Self::RecycleDebris { count }
            | Self::DefeatNpc { count }
            | Self::DestroyPlanet { count } => u64::from(count),
            Self::AccumulateResources { total } => total.max(0) as u64,
        }
    }

    /// Current progress measured from player state, capped at the
    /// requirement.
    #[must_use]
    pub fn measure(&self, player: &Player, npcs: &[Npc]) -> u64 {
        let raw = match *self {
            Self::BuildBuilding { building, level } => {
                let reached = player
                    .planets
                    .iter()
                    .any(|planet| planet.buildings.level(building) >= level);
                u64::from(reached)
            }
            Self::ResearchTechnology { technology, level } => {
                u64::from(player.technologies.level(technology) >= level)
            }
            Self::ProduceShips { ship, .. } => player
                .planets
                .iter()
                .map(|planet| u64::from(planet.fleet.count(ship)))
                .sum(),
            Self::AccumulateResources { .. } => {
                let total: Fixed = player
                    .planets
                    .iter()
                    .fold(Fixed::ZERO, |acc, planet| {
                        acc.saturating_add(planet.resources.total())
                    });
                crate::math::floor_u64(total)
            }
            Self::ColonizePlanets { .. } => player.planets.len().saturating_sub(1) as u64,
            Self::SpyTargets { scope, .. } => match scope {
                SpyScope::Any => player.spy_reports.len() as u64,
                SpyScope::Hostile => {
                    let report_counts = player
                        .spy_reports
                        .iter()
                        .filter(|report| {
                            report.npc_id.is_some_and(|npc_id| {
                                npcs.iter()
                                    .any(|npc| npc.id == npc_id && npc.is_hostile_toward(player.id))
                            })
                        })
                        .count();
                    report_counts as u64
                }
            },
            Self::SendGifts { .. } => u64::from(player.achievements.gifts_sent),
            Self::CompleteExpeditions { .. } => u64::from(player.achievements.expeditions_total),
            Self::WinBattles { scope, .. } => {
                let attack = u64::from(player.achievements.attacks_won);
                let defense = u64::from(player.achievements.defenses_successful);
                match scope {
                    BattleScope::Attack => attack,
                    BattleScope::Defense => defense,
                    BattleScope::Any => attack + defense,
                }
            }
            Self::RecycleDebris { .. } => u64::from(player.achievements.recycling_missions),
            Self::ReachRelationStatus { status } => {
                let reached = npcs
                    .iter()
                    .any(|npc| npc.status_toward(player.id) == status);
                u64::from(reached)
            }
            Self::FormAlliance => {
                let allied = npcs.iter().any(|npc| {
                    npc.relation(player.id).is_some_and(|relation| {
                        relation.status == DiplomaticStatus::Friendly
                            && relation.reputation >= ALLIANCE_REPUTATION_FLOOR
                    })
                });
                u64::from(allied)
            }
            Self::DefeatNpc { .. } => u64::from(player.achievements.attacks_won),
            Self::DestroyPlanet { .. } => u64::from(player.achievements.planet_destructions),
        };
        raw.min(self.required())
    }
}

/// One objective with its player-facing description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveDef {
    /// What the player is asked to do, in words.
    pub description: String,
    /// What is actually measured.
    pub kind: ObjectiveKind,
}

/// What claiming a completed quest pays out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestRewards {
    /// Resources delivered to the first planet.
    pub resources: Resources,
    /// Dark matter credited to the account.
    #[serde(with = "fixed_serde")]
    pub dark_matter: Fixed,
    /// Score points.
    pub points: u64,
    /// Ships delivered to the first planet.
    pub ships: FleetComposition,
}

/// One campaign quest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestDef {
    /// Stable id; the persisted progress contract.
    pub id: String,
    /// Chapter this quest belongs to.
    pub chapter: u32,
    /// Display title.
    pub title: String,
    /// Short flavor description.
    pub description: String,
    /// Quests that must be claimed before this one unlocks.
    pub requires: Vec<String>,
    /// What has to be done.
    pub objectives: Vec<ObjectiveDef>,
    /// What claiming pays out.
    pub rewards: QuestRewards,
}

/// A full campaign: an ordered quest list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignConfig {
    /// Campaign id recorded in player progress.
    pub id: String,
    /// Quests in presentation order.
    pub quests: Vec<QuestDef>,
}

impl CampaignConfig {
    /// Look up a quest definition.
    #[must_use]
    pub fn quest(&self, id: &str) -> Option<&QuestDef> {
        self.quests.iter().find(|quest| quest.id == id)
    }

    /// The first quest of the campaign, available from the start.
    #[must_use]
    pub fn opening_quest(&self) -> Option<&QuestDef> {
        self.quests.first()
    }

    /// Highest chapter number in the campaign.
    #[must_use]
    pub fn final_chapter(&self) -> u32 {
        self.quests.iter().map(|quest| quest.chapter).max().unwrap_or(1)
    }

    /// Parse a campaign from RON text.
    pub fn from_ron_str(text: &str) -> crate::error::Result<Self> {
        ron::from_str(text).map_err(|e| crate::error::GameError::DataParseError(e.to_string()))
    }

    /// The built-in five chapter story campaign.
    #[must_use]
    pub fn standard() -> Self {
        let mut quests = Vec::with_capacity(25);
        quests.extend(chapter_one());
        quests.extend(chapter_two());
        quests.extend(chapter_three());
        quests.extend(chapter_four());
        quests.extend(chapter_five());
        Self {
            id: "main_campaign".to_owned(),
            quests,
        }
    }
}

fn obj(description: &str, kind: ObjectiveKind) -> ObjectiveDef {
    ObjectiveDef {
        description: description.to_owned(),
        kind,
    }
}

fn payout(metal: i64, crystal: i64, deuterium: i64, dark_matter: i64, points: u64) -> QuestRewards {
    QuestRewards {
        resources: Resources::new(metal, crystal, deuterium),
        dark_matter: Fixed::from_num(dark_matter),
        points,
        ships: FleetComposition::default(),
    }
}

fn quest(
    id: &str,
    chapter: u32,
    title: &str,
    description: &str,
    requires: &[&str],
    objectives: Vec<ObjectiveDef>,
    rewards: QuestRewards,
) -> QuestDef {
    QuestDef {
        id: id.to_owned(),
        chapter,
        title: title.to_owned(),
        description: description.to_owned(),
        requires: requires.iter().map(|&r| r.to_owned()).collect(),
        objectives,
        rewards,
    }
}

fn chapter_one() -> Vec<QuestDef> {
    vec![
        quest(
            "quest_1_1",
            1,
            "Breaking Ground",
            "Establish a mining base on your homeworld.",
            &[],
            vec![
                obj(
                    "Raise the metal mine to level 2",
                    ObjectiveKind::BuildBuilding {
                        building: BuildingKind::MetalMine,
                        level: 2,
                    },
                ),
                obj(
                    "Raise the crystal mine to level 2",
                    ObjectiveKind::BuildBuilding {
                        building: BuildingKind::CrystalMine,
                        level: 2,
                    },
                ),
                obj(
                    "Raise the solar plant to level 2",
                    ObjectiveKind::BuildBuilding {
                        building: BuildingKind::SolarPlant,
                        level: 2,
                    },
                ),
            ],
            payout(5_000, 2_500, 0, 50, 100),
        ),
        quest(
            "quest_1_2",
            1,
            "Spark of Inquiry",
            "Open a research program.",
            &["quest_1_1"],
            vec![
                obj(
                    "Build a research lab",
                    ObjectiveKind::BuildBuilding {
                        building: BuildingKind::ResearchLab,
                        level: 1,
                    },
                ),
                obj(
                    "Research energy technology",
                    ObjectiveKind::ResearchTechnology {
                        technology: TechnologyKind::EnergyTechnology,
                        level: 1,
                    },
                ),
            ],
            payout(3_000, 3_000, 1_000, 75, 150),
        ),
        quest(
            "quest_1_3",
            1,
            "First Wings",
            "Stand up a shipyard and a fighter wing.",
            &["quest_1_2"],
            vec![
                obj(
                    "Raise the shipyard to level 2",
                    ObjectiveKind::BuildBuilding {
                        building: BuildingKind::Shipyard,
                        level: 2,
                    },
                ),
                obj(
                    "Research combustion drive",
                    ObjectiveKind::ResearchTechnology {
                        technology: TechnologyKind::CombustionDrive,
                        level: 1,
                    },
                ),
                obj(
                    "Station 5 light fighters",
                    ObjectiveKind::ProduceShips {
                        ship: ShipKind::LightFighter,
                        count: 5,
                    },
                ),
            ],
            QuestRewards {
                ships: FleetComposition {
                    small_cargo: 2,
                    ..FleetComposition::default()
                },
                ..payout(5_000, 2_000, 500, 100, 200)
            },
        ),
        quest(
            "quest_1_4",
            1,
            "Eyes in the Dark",
            "Learn what the neighbors are hiding.",
            &["quest_1_3"],
            vec![
                obj(
                    "Research espionage technology",
                    ObjectiveKind::ResearchTechnology {
                        technology: TechnologyKind::EspionageTechnology,
                        level: 1,
                    },
                ),
                obj(
                    "Station 3 espionage probes",
                    ObjectiveKind::ProduceShips {
                        ship: ShipKind::EspionageProbe,
                        count: 3,
                    },
                ),
                obj(
                    "Scan a foreign world",
                    ObjectiveKind::SpyTargets {
                        scope: SpyScope::Any,
                        count: 1,
                    },
                ),
            ],
            payout(4_000, 4_000, 1_000, 150, 250),
        ),
        quest(
            "quest_1_5",
            1,
            "An Open Hand",
            "Make a first diplomatic gesture.",
            &["quest_1_4"],
            vec![obj(
                "Deliver a gift to any faction",
                ObjectiveKind::SendGifts { count: 1 },
            )],
            payout(10_000, 5_000, 2_000, 200, 500),
        ),
    ]
}

fn chapter_two() -> Vec<QuestDef> {
    vec![
        quest(
            "quest_2_1",
            2,
            "A Second Home",
            "Settle a world of your own choosing.",
            &["quest_1_5"],
            vec![
                obj(
                    "Research astrophysics",
                    ObjectiveKind::ResearchTechnology {
                        technology: TechnologyKind::Astrophysics,
                        level: 1,
                    },
                ),
                obj(
                    "Station a colony ship",
                    ObjectiveKind::ProduceShips {
                        ship: ShipKind::ColonyShip,
                        count: 1,
                    },
                ),
                obj(
                    "Found a colony",
                    ObjectiveKind::ColonizePlanets { count: 1 },
                ),
            ],
            payout(15_000, 10_000, 5_000, 300, 600),
        ),
        quest(
            "quest_2_2",
            2,
            "Into the Void",
            "Send fleets past the last charted orbit.",
            &["quest_2_1"],
            vec![
                obj(
                    "Raise astrophysics to level 3",
                    ObjectiveKind::ResearchTechnology {
                        technology: TechnologyKind::Astrophysics,
                        level: 3,
                    },
                ),
                obj(
                    "Complete 3 expeditions",
                    ObjectiveKind::CompleteExpeditions { count: 3 },
                ),
            ],
            payout(20_000, 15_000, 8_000, 500, 800),
        ),
        quest(
            "quest_2_3",
            2,
            "Deeper Still",
            "The first sweeps found something. Keep looking.",
            &["quest_2_2"],
            vec![obj(
                "Complete 5 expeditions",
                ObjectiveKind::CompleteExpeditions { count: 5 },
            )],
            payout(25_000, 20_000, 10_000, 750, 1_000),
        ),
        quest(
            "quest_2_4",
            2,
            "The Signal",
            "Chase the source of the repeating signal.",
            &["quest_2_3"],
            vec![obj(
                "Complete 6 expeditions",
                ObjectiveKind::CompleteExpeditions { count: 6 },
            )],
            payout(30_000, 25_000, 15_000, 1_000, 1_500),
        ),
        quest(
            "quest_2_5",
            2,
            "Refinement",
            "Whatever sent that signal flies faster than you.",
            &["quest_2_4"],
            vec![
                obj(
                    "Raise impulse drive to level 3",
                    ObjectiveKind::ResearchTechnology {
                        technology: TechnologyKind::ImpulseDrive,
                        level: 3,
                    },
                ),
                obj(
                    "Raise laser technology to level 5",
                    ObjectiveKind::ResearchTechnology {
                        technology: TechnologyKind::LaserTechnology,
                        level: 5,
                    },
                ),
            ],
            payout(40_000, 30_000, 20_000, 1_500, 2_000),
        ),
    ]
}

fn chapter_three() -> Vec<QuestDef> {
    vec![
        quest(
            "quest_3_1",
            3,
            "Tribute Routes",
            "Goodwill is bought one convoy at a time.",
            &["quest_2_5"],
            vec![obj(
                "Deliver 3 gifts",
                ObjectiveKind::SendGifts { count: 3 },
            )],
            payout(25_000, 20_000, 10_000, 500, 1_000),
        ),
        quest(
            "quest_3_2",
            3,
            "Trusted Neighbors",
            "Turn a trade partner into a friend.",
            &["quest_3_1"],
            vec![obj(
                "Reach friendly standing with any faction",
                ObjectiveKind::ReachRelationStatus {
                    status: DiplomaticStatus::Friendly,
                },
            )],
            payout(30_000, 25_000, 15_000, 750, 1_200),
        ),
        quest(
            "quest_3_3",
            3,
            "Know Your Enemy",
            "Your new friends have old enemies.",
            &["quest_3_2"],
            vec![obj(
                "Hold spy reports on 2 hostile worlds",
                ObjectiveKind::SpyTargets {
                    scope: SpyScope::Hostile,
                    count: 2,
                },
            )],
            payout(35_000, 30_000, 18_000, 1_000, 1_500),
        ),
        quest(
            "quest_3_4",
            3,
            "The Pact",
            "Seal the friendship in writing.",
            &["quest_3_3"],
            vec![obj("Form an alliance", ObjectiveKind::FormAlliance)],
            payout(40_000, 35_000, 20_000, 1_250, 1_800),
        ),
        quest(
            "quest_3_5",
            3,
            "Deterrence",
            "An alliance is worth defending.",
            &["quest_3_4"],
            vec![
                obj(
                    "Raise the missile silo to level 2",
                    ObjectiveKind::BuildBuilding {
                        building: BuildingKind::MissileSilo,
                        level: 2,
                    },
                ),
                obj(
                    "Station 10 cruisers",
                    ObjectiveKind::ProduceShips {
                        ship: ShipKind::Cruiser,
                        count: 10,
                    },
                ),
            ],
            payout(50_000, 40_000, 25_000, 2_000, 2_500),
        ),
    ]
}

fn chapter_four() -> Vec<QuestDef> {
    vec![
        quest(
            "quest_4_1",
            4,
            "Hold the Line",
            "The raids have started.",
            &["quest_3_5"],
            vec![obj(
                "Repel an attack",
                ObjectiveKind::WinBattles {
                    scope: BattleScope::Defense,
                    count: 1,
                },
            )],
            payout(40_000, 35_000, 20_000, 1_000, 1_500),
        ),
        quest(
            "quest_4_2",
            4,
            "Shadow Charts",
            "Map the aggressors before striking back.",
            &["quest_4_1"],
            vec![obj(
                "Hold spy reports on 5 hostile worlds",
                ObjectiveKind::SpyTargets {
                    scope: SpyScope::Hostile,
                    count: 5,
                },
            )],
            payout(45_000, 40_000, 25_000, 1_250, 1_800),
        ),
        quest(
            "quest_4_3",
            4,
            "Counterstrike",
            "Take the war to them.",
            &["quest_4_2"],
            vec![obj(
                "Win 3 attacks",
                ObjectiveKind::WinBattles {
                    scope: BattleScope::Attack,
                    count: 3,
                },
            )],
            payout(50_000, 45_000, 30_000, 1_500, 2_000),
        ),
        quest(
            "quest_4_4",
            4,
            "Ashes to Ingots",
            "Battlefields are mines that someone else dug.",
            &["quest_4_3"],
            vec![obj(
                "Fly 5 recycling runs",
                ObjectiveKind::RecycleDebris { count: 5 },
            )],
            payout(55_000, 50_000, 35_000, 1_750, 2_200),
        ),
        quest(
            "quest_4_5",
            4,
            "Heavy Metal",
            "Build a fleet the shadows will respect.",
            &["quest_4_4"],
            vec![
                obj(
                    "Station 20 battleships",
                    ObjectiveKind::ProduceShips {
                        ship: ShipKind::Battleship,
                        count: 20,
                    },
                ),
                obj(
                    "Raise hyperspace drive to level 3",
                    ObjectiveKind::ResearchTechnology {
                        technology: TechnologyKind::HyperspaceDrive,
                        level: 3,
                    },
                ),
            ],
            payout(70_000, 60_000, 40_000, 2_500, 3_000),
        ),
    ]
}

fn chapter_five() -> Vec<QuestDef> {
    vec![
        quest(
            "quest_5_1",
            5,
            "The Nebula Calls",
            "The signal's origin lies inside the nebula.",
            &["quest_4_5"],
            vec![obj(
                "Complete 9 expeditions",
                ObjectiveKind::CompleteExpeditions { count: 9 },
            )],
            payout(80_000, 70_000, 50_000, 3_000, 4_000),
        ),
        quest(
            "quest_5_2",
            5,
            "Forbidden Mathematics",
            "The recovered fragments describe impossible engines.",
            &["quest_5_1"],
            vec![
                obj(
                    "Raise computer technology to level 10",
                    ObjectiveKind::ResearchTechnology {
                        technology: TechnologyKind::ComputerTechnology,
                        level: 10,
                    },
                ),
                obj(
                    "Research graviton technology",
                    ObjectiveKind::ResearchTechnology {
                        technology: TechnologyKind::GravitonTechnology,
                        level: 1,
                    },
                ),
            ],
            payout(100_000, 80_000, 60_000, 5_000, 5_000),
        ),
        quest(
            "quest_5_3",
            5,
            "The Guardian",
            "Something ancient keeps the vault. Defeat it.",
            &["quest_5_2"],
            vec![obj(
                "Defeat the guardian fleet",
                ObjectiveKind::DefeatNpc { count: 1 },
            )],
            QuestRewards {
                ships: FleetComposition {
                    deathstar: 1,
                    ..FleetComposition::default()
                },
                ..payout(150_000, 120_000, 80_000, 10_000, 10_000)
            },
        ),
        quest(
            "quest_5_4",
            5,
            "Manifest Destiny",
            "Claim the vault's worlds for your own.",
            &["quest_5_3"],
            vec![obj(
                "Hold 5 colonies",
                ObjectiveKind::ColonizePlanets { count: 5 },
            )],
            payout(200_000, 150_000, 100_000, 8_000, 8_000),
        ),
        quest(
            "quest_5_5",
            5,
            "A Million Suns",
            "An empire is measured in what it keeps.",
            &["quest_5_4"],
            vec![obj(
                "Hold 1,000,000 combined resources",
                ObjectiveKind::AccumulateResources { total: 1_000_000 },
            )],
            payout(500_000, 400_000, 250_000, 20_000, 20_000),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::deposits::OreDeposits;
    use crate::planet::Planet;
    use crate::position::Position;

    use super::*;

    fn test_player() -> Player {
        let homeworld = Planet::homeworld(1, Position::new(1, 1, 8), 0, OreDeposits::default());
        Player::new(1, "Tester", homeworld)
    }

    #[test]
    fn test_standard_campaign_shape() {
        let campaign = CampaignConfig::standard();
        assert_eq!(campaign.quests.len(), 25);
        assert_eq!(campaign.final_chapter(), 5);
        assert_eq!(campaign.opening_quest().unwrap().id, "quest_1_1");
        // Every prerequisite refers to a real quest
        for quest in &campaign.quests {
            for req in &quest.requires {
                assert!(campaign.quest(req).is_some(), "{req} missing");
            }
        }
        // Ids are unique
        for quest in &campaign.quests {
            assert_eq!(
                campaign.quests.iter().filter(|q| q.id == quest.id).count(),
                1
            );
        }
    }

    #[test]
    fn test_building_objective_is_binary() {
        let mut player = test_player();
        let objective = ObjectiveKind::BuildBuilding {
            building: BuildingKind::MetalMine,
            level: 2,
        };
        assert_eq!(objective.measure(&player, &[]), 0);
        player.planets[0].buildings.set_level(BuildingKind::MetalMine, 1);
        assert_eq!(objective.measure(&player, &[]), 0);
        player.planets[0].buildings.set_level(BuildingKind::MetalMine, 3);
        assert_eq!(objective.measure(&player, &[]), 1);
    }

    #[test]
    fn test_ship_objective_counts_across_planets() {
        let mut player = test_player();
        let objective = ObjectiveKind::ProduceShips {
            ship: ShipKind::LightFighter,
            count: 5,
        };
        player.planets[0].fleet.light_fighter = 3;
        assert_eq!(objective.measure(&player, &[]), 3);
        player.planets.push(Planet::colony(
            2,
            "Annex".to_owned(),
            Position::new(1, 2, 4),
            0,
            OreDeposits::default(),
        ));
        player.planets[1].fleet.light_fighter = 9;
        // Capped at the requirement
        assert_eq!(objective.measure(&player, &[]), 5);
    }

    #[test]
    fn test_accumulate_counts_all_stockpiles() {
        let mut player = test_player();
        player.planets[0].resources = Resources::new(600_000, 300_000, 100_000);
        let objective = ObjectiveKind::AccumulateResources { total: 1_000_000 };
        assert_eq!(objective.measure(&player, &[]), 1_000_000);
        assert_eq!(objective.required(), 1_000_000);
    }

    #[test]
    fn test_win_battle_scopes() {
        let mut player = test_player();
        player.achievements.attacks_won = 2;
        player.achievements.defenses_successful = 1;
        let attack = ObjectiveKind::WinBattles {
            scope: BattleScope::Attack,
            count: 5,
        };
        let defense = ObjectiveKind::WinBattles {
            scope: BattleScope::Defense,
            count: 5,
        };
        let any = ObjectiveKind::WinBattles {
            scope: BattleScope::Any,
            count: 5,
        };
        assert_eq!(attack.measure(&player, &[]), 2);
        assert_eq!(defense.measure(&player, &[]), 1);
        assert_eq!(any.measure(&player, &[]), 3);
    }

    #[test]
    fn test_campaign_round_trips_through_ron() {
        let campaign = CampaignConfig::standard();
        let text = ron::to_string(&campaign).unwrap();
        let back = CampaignConfig::from_ron_str(&text).unwrap();
        assert_eq!(back, campaign);
    }
}
