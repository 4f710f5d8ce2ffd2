//! Catch-up and combat benchmarks for astra_core.
//!
//! Run with: `cargo bench -p astra_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use astra_core::campaign::CampaignConfig;
use astra_core::catalog::{BuildingKind, DefenseCounts, FleetComposition, TechnologyLevels};
use astra_core::combat::{simulate_battle, Combatant};
use astra_core::config::EngineConfig;
use astra_core::deposits::{DepositState, OreDeposits};
use astra_core::engine;
use astra_core::math::Fixed;
use astra_core::planet::Planet;
use astra_core::player::Player;
use astra_core::position::Position;
use astra_core::resources::Resources;
use astra_core::time::MS_PER_DAY;
use astra_core::universe::Universe;

fn offline_player(cfg: &EngineConfig) -> Player {
    let deposits = OreDeposits {
        metal: DepositState::new(Fixed::from_num(5_000_000)),
        crystal: DepositState::new(Fixed::from_num(5_000_000)),
        deuterium: DepositState::new(Fixed::from_num(5_000_000)),
    };
    let mut homeworld = Planet::homeworld(1, Position::new(1, 42, 8), 0, deposits);
    homeworld.resources = Resources::new(1_000_000, 1_000_000, 1_000_000);
    let buildings = &mut homeworld.buildings;
    buildings.set_level(BuildingKind::MetalMine, 20);
    buildings.set_level(BuildingKind::CrystalMine, 18);
    buildings.set_level(BuildingKind::DeuteriumSynthesizer, 15);
    buildings.set_level(BuildingKind::SolarPlant, 24);
    buildings.set_level(BuildingKind::RoboticsFactory, 8);
    buildings.set_level(BuildingKind::MetalStorage, 12);
    buildings.set_level(BuildingKind::CrystalStorage, 12);
    buildings.set_level(BuildingKind::DeuteriumTank, 12);
    let mut player = Player::new(1, "Bench", homeworld);
    engine::enqueue_building(&mut player, 1, BuildingKind::MetalMine, cfg, 0).expect("enqueue");
    player
}

/// A month of offline progress replayed in a single call.
pub fn catchup_benchmark(c: &mut Criterion) {
    let cfg = EngineConfig::default();
    let campaign = CampaignConfig::standard();
    let player = offline_player(&cfg);
    c.bench_function("advance_30_days_offline", |b| {
        b.iter_batched(
            || (player.clone(), Universe::new()),
            |(mut player, mut universe)| {
                let events = engine::advance(
                    &mut player,
                    &mut universe,
                    &mut [],
                    &campaign,
                    &cfg,
                    30 * MS_PER_DAY,
                );
                black_box((player, events))
            },
            BatchSize::SmallInput,
        );
    });
}

/// A mid-game raid resolved round by round.
pub fn battle_benchmark(c: &mut Criterion) {
    let cfg = EngineConfig::default();
    let attacker = Combatant {
        fleet: FleetComposition {
            light_fighter: 400,
            heavy_fighter: 120,
            cruiser: 60,
            battleship: 25,
            ..FleetComposition::default()
        },
        defense: DefenseCounts::default(),
        technologies: TechnologyLevels::default(),
        defense_bonus: Fixed::ZERO,
    };
    let defender = Combatant {
        fleet: FleetComposition {
            light_fighter: 250,
            cruiser: 40,
            ..FleetComposition::default()
        },
        defense: DefenseCounts {
            rocket_launcher: 300,
            light_laser: 150,
            heavy_laser: 40,
            ..DefenseCounts::default()
        },
        technologies: TechnologyLevels::default(),
        defense_bonus: Fixed::ZERO,
    };
    c.bench_function("simulate_battle_mid_game", |b| {
        b.iter(|| {
            black_box(simulate_battle(
                black_box(&attacker),
                black_box(&defender),
                Resources::new(50_000, 30_000, 10_000),
                false,
                0xA57A_BAD5_EED5_u64,
                &cfg,
            ))
        });
    });
}

criterion_group!(benches, catchup_benchmark, battle_benchmark);
criterion_main!(benches);
