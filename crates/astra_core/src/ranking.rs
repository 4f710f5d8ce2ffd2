//! Score tables over the player and every NPC faction.
//!
//! All scores are derived from current state alone: cumulative build
//! spend for buildings and research, stationed unit value for fleet
//! and defense. One point per thousand resources, floored once per
//! category, so the table can be recomputed at any time without a
//! scoring ledger.

use serde::{Deserialize, Serialize};

use crate::catalog::{
    BuildingKind, BuildingLevels, DefenseCounts, FleetComposition, TechnologyKind,
    TechnologyLevels,
};
use crate::math::floor_u64;
use crate::npc::Npc;
use crate::planet::Planet;
use crate::player::Player;
use crate::resources::Resources;
use crate::universe::Universe;

/// Which score a ranking table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum RankingCategory {
    /// Sum of the other four.
    #[default]
    Total,
    /// Cumulative building spend.
    Building,
    /// Cumulative research spend.
    Research,
    /// Stationed ship value.
    Fleet,
    /// Stationed defense value.
    Defense,
}

impl RankingCategory {
    /// Every category.
    pub const ALL: [Self; 5] = [
        Self::Total,
        Self::Building,
        Self::Research,
        Self::Fleet,
        Self::Defense,
    ];
}

/// Score breakdown for one ranked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Sum of the other four.
    pub total: u64,
    /// Building points.
    pub building: u64,
    /// Research points.
    pub research: u64,
    /// Fleet points.
    pub fleet: u64,
    /// Defense points.
    pub defense: u64,
}

impl ScoreBreakdown {
    /// The score for one category.
    #[must_use]
    pub const fn of(&self, category: RankingCategory) -> u64 {
        match category {
            RankingCategory::Total => self.total,
            RankingCategory::Building => self.building,
            RankingCategory::Research => self.research,
            RankingCategory::Fleet => self.fleet,
            RankingCategory::Defense => self.defense,
        }
    }
}

/// One row of a ranking table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// Player or NPC id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Whether this row is the player.
    pub is_player: bool,
    /// Worlds held.
    pub planet_count: u32,
    /// Score breakdown.
    pub scores: ScoreBreakdown,
}

fn spend(cost: Resources) -> u64 {
    floor_u64(cost.metal) + floor_u64(cost.crystal) + floor_u64(cost.deuterium)
}

/// Cumulative spend over every built level, each level floored on its
/// own the way the build queue charged it.
fn building_spend(buildings: &BuildingLevels) -> u64 {
    let mut total = 0u64;
    for kind in BuildingKind::ALL {
        for level in 1..=buildings.level(kind) {
            total += spend(kind.cost(level));
        }
    }
    total
}

fn research_spend(technologies: &TechnologyLevels) -> u64 {
    let mut total = 0u64;
    for kind in TechnologyKind::ALL {
        for level in 1..=technologies.level(kind) {
            total += spend(kind.cost(level));
        }
    }
    total
}

fn fleet_value(fleet: &FleetComposition) -> u64 {
    fleet
        .iter_present()
        .map(|(kind, count)| spend(kind.cost()) * u64::from(count))
        .sum()
}

fn defense_value(defense: &DefenseCounts) -> u64 {
    defense
        .iter_present()
        .map(|(kind, count)| spend(kind.cost()) * u64::from(count))
        .sum()
}

fn breakdown<'a>(
    planets: impl Iterator<Item = &'a Planet>,
    technologies: &TechnologyLevels,
) -> ScoreBreakdown {
    let mut building_total = 0u64;
    let mut fleet_total = 0u64;
    let mut defense_total = 0u64;
    for planet in planets {
        building_total += building_spend(&planet.buildings);
        fleet_total += fleet_value(&planet.fleet);
        defense_total += defense_value(&planet.defense);
    }
    let building = building_total / 1_000;
    let research = research_spend(technologies) / 1_000;
    let fleet = fleet_total / 1_000;
    let defense = defense_total / 1_000;
    ScoreBreakdown {
        total: building + research + fleet + defense,
        building,
        research,
        fleet,
        defense,
    }
}

/// Score the player across all categories.
#[must_use]
pub fn score_player(player: &Player) -> ScoreBreakdown {
    breakdown(player.planets.iter(), &player.technologies)
}

/// Score one NPC faction across all categories.
#[must_use]
pub fn score_npc(npc: &Npc, universe: &Universe) -> ScoreBreakdown {
    breakdown(universe.npc_planets(npc.id), &npc.technologies)
}

/// The full ranking table, best first.
///
/// Factions with no remaining worlds are not ranked. Ties keep the
/// insertion order, player first, so the table is deterministic.
#[must_use]
pub fn ranking(
    player: &Player,
    universe: &Universe,
    npcs: &[Npc],
    category: RankingCategory,
) -> Vec<RankingEntry> {
    let mut entries = Vec::with_capacity(1 + npcs.len());
    entries.push(RankingEntry {
        id: player.id,
        name: player.name.clone(),
        is_player: true,
        planet_count: player.planets.len() as u32,
        scores: score_player(player),
    });
    for npc in npcs {
        let worlds = universe.npc_planets(npc.id).count();
        if worlds == 0 {
            continue;
        }
        entries.push(RankingEntry {
            id: npc.id,
            name: npc.name.clone(),
            is_player: false,
            planet_count: worlds as u32,
            scores: score_npc(npc, universe),
        });
    }
    entries.sort_by(|a, b| b.scores.of(category).cmp(&a.scores.of(category)));
    entries
}

/// The player's 1-based position in a category.
#[must_use]
pub fn player_rank(
    player: &Player,
    universe: &Universe,
    npcs: &[Npc],
    category: RankingCategory,
) -> u32 {
    ranking(player, universe, npcs, category)
        .iter()
        .position(|entry| entry.is_player)
        .map_or(1, |index| index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use crate::deposits::OreDeposits;
    use crate::npc::{NpcDifficulty, NpcPersonality};
    use crate::position::Position;
    use crate::universe::NpcWorld;

    use super::*;

    fn test_player() -> Player {
        let homeworld = Planet::homeworld(1, Position::new(1, 1, 8), 0, OreDeposits::default());
        Player::new(1, "Tester", homeworld)
    }

    #[test]
    fn test_building_score_accumulates_per_level_spend() {
        let mut player = test_player();
        player.planets[0]
            .buildings
            .set_level(BuildingKind::Shipyard, 4);
        // 700 + 1400 + 2800 + 5600 = 10500 spent
        assert_eq!(score_player(&player).building, 10);
    }

    #[test]
    fn test_research_score_counts_account_levels() {
        let mut player = test_player();
        player
            .technologies
            .set_level(TechnologyKind::HyperspaceDrive, 3);
        // 36000 + 72000 + 144000 = 252000 spent
        assert_eq!(score_player(&player).research, 252);
    }

    #[test]
    fn test_unit_scores_floor_once_per_category() {
        let mut player = test_player();
        player.planets[0].fleet.light_fighter = 250;
        player.planets[0].defense.rocket_launcher = 400;
        let scores = score_player(&player);
        assert_eq!(scores.fleet, 1_000);
        assert_eq!(scores.defense, 800);
        assert_eq!(scores.total, 1_800);
        assert_eq!(scores.of(RankingCategory::Fleet), 1_000);
    }

    #[test]
    fn test_ranking_sorts_by_category_and_skips_landless_npcs() {
        let mut player = test_player();
        player.planets[0].fleet.light_fighter = 100;

        let mut universe = Universe::new();
        let rich = Npc::new(5, "Kovar Syndicate", NpcDifficulty::Medium, NpcPersonality::Trader);
        let mut outpost = Planet::colony(
            900,
            "Outpost".to_owned(),
            Position::new(1, 2, 4),
            0,
            OreDeposits::default(),
        );
        outpost.fleet.cruiser = 100;
        universe.planets.insert(
            outpost.position,
            NpcWorld {
                npc_id: 5,
                planet: outpost,
            },
        );
        let landless = Npc::new(6, "Ghosts", NpcDifficulty::Medium, NpcPersonality::Trader);
        let npcs = [rich, landless];

        let table = ranking(&player, &universe, &npcs, RankingCategory::Fleet);
        assert_eq!(table.len(), 2);
        assert!(!table[0].is_player);
        assert_eq!(table[0].scores.fleet, 2_900);
        assert_eq!(table[1].scores.fleet, 400);
        assert_eq!(
            player_rank(&player, &universe, &npcs, RankingCategory::Fleet),
            2
        );
    }

    #[test]
    fn test_tied_scores_rank_player_first() {
        let player = test_player();
        let universe = Universe::new();
        let npc = Npc::new(7, "Echo", NpcDifficulty::Medium, NpcPersonality::Trader);
        // Landless NPC is skipped entirely, so the player stands alone
        assert_eq!(
            player_rank(&player, &universe, &[npc], RankingCategory::Total),
            1
        );
    }
}
