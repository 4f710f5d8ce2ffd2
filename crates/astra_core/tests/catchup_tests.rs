//! Catch-up equivalence tests for astra_core.
//!
//! A server may sync a player every few seconds or once a week, and
//! the split points land wherever network timing puts them. These
//! tests pin the engine's core promise: however a window is split,
//! the final state matches the single-call replay exactly.

use astra_core::catalog::{BuildingKind, FleetComposition, ShipKind, TechnologyKind};
use astra_core::config::EngineConfig;
use astra_core::engine;
use astra_core::missions::{LaunchOrder, MissionKind};
use astra_core::officers::OfficerRecord;
use astra_core::position::Position;
use astra_core::resources::Resources;
use astra_test_utils::catchup::{run_split, World};
use astra_test_utils::fixtures::{developed_player, hours, npc_with_world};
use astra_test_utils::proptest::prelude::*;

const NPC_HOME: Position = Position {
    galaxy: 1,
    system: 2,
    slot: 6,
};

/// A player with work on every track: construction, shipyard batch,
/// research, a lapsing officer, and a raid underway against an NPC
/// world.
fn busy_world() -> World {
    let cfg = EngineConfig::default();
    let mut player = developed_player(1, 0);
    player.technologies.set_level(TechnologyKind::CombustionDrive, 1);
    player.planets[0].fleet.light_fighter = 20;
    player.officers.geologist = OfficerRecord {
        active: true,
        hired_at: Some(0),
        expires_at: Some(hours(30)),
    };
    engine::enqueue_building(&mut player, 1, BuildingKind::MetalMine, &cfg, 0).expect("mine");
    engine::enqueue_ship_order(&mut player, 1, ShipKind::LightFighter, 5, &cfg, 0).expect("ships");
    engine::enqueue_research(&mut player, 1, TechnologyKind::EnergyTechnology, &cfg, 0)
        .expect("research");

    let mut world = World::solo(player);
    let npc = npc_with_world(&mut world.universe, 50, NPC_HOME, 0);
    world.npcs.push(npc);

    let order = LaunchOrder {
        origin_planet_id: 1,
        kind: MissionKind::Attack,
        target: NPC_HOME,
        target_is_moon: false,
        ships: FleetComposition {
            light_fighter: 10,
            ..FleetComposition::default()
        },
        cargo: Resources::ZERO,
    };
    engine::launch_mission(
        &mut world.player,
        &world.universe,
        &world.npcs,
        order,
        &world.cfg,
        0,
    )
    .expect("launch");
    world
}

#[test]
fn test_boundary_exact_splits_match_direct_run() {
    let world = busy_world();
    let first_completion = world.player.planets[0]
        .build_queue
        .first()
        .map(|item| item.end_time)
        .expect("queued order");
    let battle = world.player.fleet_missions[0].arrival_time;

    let outcome = run_split(&world, &[first_completion, battle, hours(30)], hours(48));
    outcome.assert_equivalent();
    assert_eq!(outcome.direct_events, outcome.stepped_events);
}

#[test]
fn test_hourly_steps_match_direct_run() {
    let world = busy_world();
    let splits: Vec<i64> = (1..48).map(hours).collect();
    let outcome = run_split(&world, &splits, hours(48));
    outcome.assert_equivalent();
    assert_eq!(outcome.direct_events, outcome.stepped_events);
}

#[test]
fn test_stale_and_duplicate_splits_are_harmless() {
    let world = busy_world();
    let outcome = run_split(&world, &[0, 0, hours(12), hours(12), hours(3)], hours(24));
    outcome.assert_equivalent();
}

proptest! {
    #[test]
    fn prop_random_splits_never_diverge(
        splits in prop::collection::vec(0_i64..=48 * 3_600_000, 0..8),
    ) {
        let world = busy_world();
        let outcome = run_split(&world, &splits, hours(48));
        outcome.assert_equivalent();
    }
}
