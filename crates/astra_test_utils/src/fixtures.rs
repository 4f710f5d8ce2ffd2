//! Test fixtures and helpers.
//!
//! Pre-built players, worlds and NPC factions for consistent testing.

use astra_core::catalog::BuildingKind;
use astra_core::deposits::{DepositState, OreDeposits};
use astra_core::npc::{Npc, NpcDifficulty, NpcPersonality};
use astra_core::planet::Planet;
use astra_core::player::Player;
use astra_core::position::Position;
use astra_core::resources::Resources;
use astra_core::time::{Timestamp, MS_PER_DAY, MS_PER_HOUR};
use astra_core::universe::{NpcWorld, Universe};
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Timestamp `count` hours after the epoch.
#[must_use]
pub fn hours(count: i64) -> Timestamp {
    count * MS_PER_HOUR
}

/// Timestamp `count` days after the epoch.
#[must_use]
pub fn days(count: i64) -> Timestamp {
    count * MS_PER_DAY
}

/// Deposits far too large to run dry inside a test horizon.
#[must_use]
pub fn rich_deposits() -> OreDeposits {
    OreDeposits {
        metal: DepositState::new(fixed(50_000_000)),
        crystal: DepositState::new(fixed(50_000_000)),
        deuterium: DepositState::new(fixed(50_000_000)),
    }
}

/// A homeworld with mines, power, labs and storage ready to go.
#[must_use]
pub fn developed_homeworld(id: u64, position: Position, now: Timestamp) -> Planet {
    let mut planet = Planet::homeworld(id, position, now, rich_deposits());
    planet.resources = Resources::new(100_000, 100_000, 50_000);
    let buildings = &mut planet.buildings;
    buildings.set_level(BuildingKind::MetalMine, 8);
    buildings.set_level(BuildingKind::CrystalMine, 6);
    buildings.set_level(BuildingKind::DeuteriumSynthesizer, 4);
    buildings.set_level(BuildingKind::SolarPlant, 12);
    buildings.set_level(BuildingKind::RoboticsFactory, 2);
    buildings.set_level(BuildingKind::Shipyard, 2);
    buildings.set_level(BuildingKind::ResearchLab, 2);
    buildings.set_level(BuildingKind::MetalStorage, 8);
    buildings.set_level(BuildingKind::CrystalStorage, 8);
    buildings.set_level(BuildingKind::DeuteriumTank, 8);
    planet
}

/// A player holding one developed homeworld at 1:1:8.
///
/// The homeworld always carries planet id 1, whatever the player id,
/// matching the signup path.
#[must_use]
pub fn developed_player(id: u64, now: Timestamp) -> Player {
    let homeworld = developed_homeworld(1, Position::new(1, 1, 8), now);
    Player::new(id, format!("Player {id}"), homeworld)
}

/// An NPC faction settled on one world of the universe.
pub fn npc_with_world(
    universe: &mut Universe,
    id: u64,
    position: Position,
    now: Timestamp,
) -> Npc {
    let npc = Npc::new(
        id,
        format!("Faction {id}"),
        NpcDifficulty::Medium,
        NpcPersonality::Balanced,
    );
    let mut planet = Planet::colony(
        id * 1_000,
        format!("Holdout {id}"),
        position,
        now,
        rich_deposits(),
    );
    planet.resources = Resources::new(20_000, 15_000, 5_000);
    universe.planets.insert(position, NpcWorld { npc_id: id, planet });
    npc
}
