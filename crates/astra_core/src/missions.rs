//! Fleet missions: dispatch, flight, and resolution.
//!
//! A mission is a small state machine: `Outbound` until the fleet
//! reaches its target, `Returning` until it lands back home, then it
//! is archived into reports and removed. Every transition is guarded
//! by the status field, never by timestamp comparison alone, so
//! replaying an advance over an overlapping window applies each
//! side effect exactly once.
//!
//! Resolution is strictly chronological across every in-flight mission
//! and missile salvo, which keeps one long catch-up equivalent to many
//! short ones.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::combat::{simulate_battle, simulate_missile_strike, BattleWinner, Combatant};
use crate::config::EngineConfig;
use crate::deposits::OreDeposits;
use crate::diplomacy::{
    GiftRejection, ReputationReason, ATTACK_PENALTY, ESPIONAGE_DETECTED_PENALTY,
    ESPIONAGE_UNDETECTED_PENALTY,
};
use crate::error::{GameError, Result};
use crate::math::{fixed_serde, floor_u64, Fixed};
use crate::npc::Npc;
use crate::officers::BonusSet;
use crate::planet::{Moon, Planet};
use crate::player::Player;
use crate::position::Position;
use crate::reports::{BattleReport, Notification, NotificationKind, SpyReport};
use crate::catalog::{DefenseKind, FleetComposition, ShipKind, TechnologyKind};
use crate::resources::Resources;
use crate::time::Timestamp;
use crate::universe::Universe;

/// Shortest possible flight leg.
pub const MIN_TRAVEL_MS: i64 = 60_000;
/// Flight speed of an interplanetary missile, distance units per hour.
pub const MISSILE_SPEED: u32 = 25_000;

// ============================================================================
// Mission state
// ============================================================================

/// What a dispatched fleet is flying out to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissionKind {
    /// Haul cargo to a destination, then come home.
    Transport,
    /// Relocate ships and cargo to another owned planet.
    Deploy,
    /// Settle a free slot with a colony ship.
    Colonize,
    /// Scan a foreign world with espionage probes.
    Espionage,
    /// Raid a foreign world.
    Attack,
    /// Venture into the expedition zone and see what turns up.
    Expedition,
    /// Harvest a debris field with recyclers.
    Recycle,
    /// Deliver tribute to an NPC faction.
    #[serde(rename_all = "camelCase")]
    Gift {
        /// Receiving faction.
        npc_id: u64,
    },
}

impl MissionKind {
    /// Whether the mission is an act of aggression against its target.
    #[must_use]
    pub fn is_hostile(self) -> bool {
        matches!(self, Self::Attack)
    }

    /// Whether the fleet flies home after acting at the target.
    /// One-way kinds only return when the mission fails.
    #[must_use]
    pub fn is_round_trip(self) -> bool {
        !matches!(self, Self::Deploy | Self::Colonize)
    }
}

/// Where a mission currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissionStatus {
    /// Flying toward the target; the arrival effect is pending.
    Outbound,
    /// Flying home; the return merge is pending.
    Returning,
    /// Fully resolved; the record is about to be dropped.
    Arrived,
}

/// A fleet away from its harbor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetMission {
    /// Mission id, unique within the owner.
    pub id: u64,
    /// What the fleet was sent to do.
    pub kind: MissionKind,
    /// Lifecycle state; guards every transition.
    pub status: MissionStatus,
    /// Planet the fleet launched from.
    pub origin_planet_id: u64,
    /// Where it is headed.
    pub target: Position,
    /// Whether the target is the moon at that position.
    pub target_is_moon: bool,
    /// Ships on the mission.
    pub ships: FleetComposition,
    /// Resources in the holds.
    pub cargo: Resources,
    /// Dark matter picked up along the way, credited on return.
    #[serde(with = "fixed_serde")]
    pub dark_matter_cargo: Fixed,
    /// When the fleet left.
    pub departure_time: Timestamp,
    /// When it reaches the target.
    pub arrival_time: Timestamp,
    /// When it lands back home; set on dispatch for round trips and
    /// on failure for one-way missions.
    pub return_time: Option<Timestamp>,
    /// Seed for every random draw this mission makes.
    pub seed: u64,
    /// The NPC party to this mission, if any.
    pub npc_id: Option<u64>,
    /// Whether the defender has been warned about this fleet.
    pub announced: bool,
}

impl FleetMission {
    /// When the next transition for this mission falls due.
    #[must_use]
    pub fn next_due(&self) -> Option<Timestamp> {
        match self.status {
            MissionStatus::Outbound => Some(self.resolve_time()),
            MissionStatus::Returning => self.return_time,
            MissionStatus::Arrived => None,
        }
    }

    /// When the arrival effect resolves.
    ///
    /// Expeditions loiter in the zone after arrival and roll their
    /// outcome only when the hold ends; everything else acts the
    /// moment it arrives. The hold end is recovered from the return
    /// schedule, which was laid out at launch as
    /// `arrival + hold + return leg`.
    #[must_use]
    pub fn resolve_time(&self) -> Timestamp {
        match self.kind {
            MissionKind::Expedition => {
                let leg = self.arrival_time - self.departure_time;
                self.return_time
                    .map_or(self.arrival_time, |return_time| return_time - leg)
            }
            _ => self.arrival_time,
        }
    }
}

/// Lifecycle of a missile salvo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissileStatus {
    /// In flight; the strike is pending.
    Flying,
    /// Struck the target.
    Arrived,
    /// Every warhead was shot down.
    Intercepted,
}

/// An interplanetary missile salvo in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissileAttack {
    /// Salvo id, unique within the owner.
    pub id: u64,
    /// Planet the silo fired from.
    pub origin_planet_id: u64,
    /// Target coordinates.
    pub target: Position,
    /// Warheads in the salvo.
    pub missile_count: u32,
    /// When the silo fired.
    pub launch_time: Timestamp,
    /// When the salvo lands.
    pub arrival_time: Timestamp,
    /// Lifecycle state; guards the strike.
    pub status: MissileStatus,
}

// ============================================================================
// Mission reports
// ============================================================================

/// What an expedition stumbled into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpeditionFind {
    /// Empty space.
    Nothing,
    /// A drifting cache of resources.
    #[serde(rename_all = "camelCase")]
    Resources {
        /// What was recovered.
        resources: Resources,
    },
    /// A pocket of raw dark matter.
    #[serde(rename_all = "camelCase")]
    DarkMatter {
        /// Amount recovered, credited on return.
        #[serde(with = "fixed_serde")]
        amount: Fixed,
    },
    /// Abandoned ships, crewed and flown home.
    #[serde(rename_all = "camelCase")]
    Ships {
        /// What joined the fleet.
        ships: FleetComposition,
    },
    /// A navigational hazard claimed part of the fleet.
    #[serde(rename_all = "camelCase")]
    FleetLoss {
        /// Ships that did not come back.
        lost: FleetComposition,
    },
    /// A pirate ambush, fought to a result on the spot.
    #[serde(rename_all = "camelCase")]
    Pirates {
        /// Who held the field.
        winner: BattleWinner,
        /// Ships lost in the exchange.
        losses: FleetComposition,
    },
}

/// Structured outcome attached to a mission report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissionOutcome {
    /// Cargo was handed over at the destination.
    #[serde(rename_all = "camelCase")]
    Delivered {
        /// What was delivered.
        cargo: Resources,
    },
    /// Ships and cargo joined the destination garrison.
    #[serde(rename_all = "camelCase")]
    Deployed {
        /// What relocated.
        ships: FleetComposition,
    },
    /// A new colony was founded.
    #[serde(rename_all = "camelCase")]
    ColonyFounded {
        /// Id of the new planet.
        planet_id: u64,
    },
    /// The mission could not act at its target.
    #[serde(rename_all = "camelCase")]
    Failed {
        /// What went wrong.
        reason: String,
    },
    /// A probe scanned the target.
    #[serde(rename_all = "camelCase")]
    Espionage {
        /// Whether the target noticed.
        detected: bool,
    },
    /// A battle was fought.
    #[serde(rename_all = "camelCase")]
    Battle {
        /// Who held the field.
        winner: BattleWinner,
    },
    /// An expedition concluded.
    #[serde(rename_all = "camelCase")]
    Expedition {
        /// What it found.
        find: ExpeditionFind,
    },
    /// Debris was harvested.
    #[serde(rename_all = "camelCase")]
    Recycled {
        /// What was scooped up.
        collected: Resources,
    },
    /// Tribute was accepted.
    #[serde(rename_all = "camelCase")]
    GiftDelivered {
        /// Reputation bought.
        reputation_gain: i32,
    },
    /// Tribute was turned away; the cargo comes home.
    #[serde(rename_all = "camelCase")]
    GiftRefused {
        /// Why it was refused.
        reason: GiftRejection,
    },
    /// A missile salvo concluded.
    #[serde(rename_all = "camelCase")]
    MissileStrike {
        /// Defense units destroyed.
        destroyed: u32,
        /// Warheads shot down.
        intercepted: u32,
    },
}

/// One archived mission resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionReport {
    /// Report id.
    pub id: u64,
    /// When the resolution happened.
    pub timestamp: Timestamp,
    /// Mission type.
    pub kind: MissionKind,
    /// Launching planet.
    pub origin_planet_id: u64,
    /// Mission target.
    pub target: Position,
    /// Whether the mission achieved its purpose.
    pub success: bool,
    /// What happened, in detail.
    pub outcome: MissionOutcome,
}

/// Observable things mission resolution did, for the engine's event log.
#[derive(Debug, Clone, PartialEq)]
pub enum MissionEvent {
    /// A fleet acted at its target.
    FleetArrived {
        /// The mission.
        mission_id: u64,
        /// Its type.
        kind: MissionKind,
    },
    /// A fleet landed back home.
    FleetReturned {
        /// The mission.
        mission_id: u64,
    },
    /// A battle was fought.
    BattleResolved {
        /// Where.
        position: Position,
        /// Verdict.
        winner: BattleWinner,
    },
    /// Debris coalesced into a moon.
    MoonFormed {
        /// Orbited position.
        position: Position,
    },
    /// A colony was founded.
    ColonyFounded {
        /// New planet id.
        planet_id: u64,
        /// Where.
        position: Position,
    },
    /// A missile salvo concluded.
    MissileStrikeResolved {
        /// The salvo.
        attack_id: u64,
        /// Warheads shot down.
        intercepted: u32,
    },
    /// An NPC fleet finished a leg of its mission.
    NpcFleetResolved {
        /// Acting faction.
        npc_id: u64,
        /// Mission type.
        kind: MissionKind,
    },
}

// ============================================================================
// Flight math
// ============================================================================

/// Flight time over `distance` at the given hull speed.
#[must_use]
pub fn travel_time_ms(
    distance: u32,
    slowest_speed: u32,
    fleet_speed_bonus: Fixed,
    cfg: &EngineConfig,
) -> i64 {
    let speed = Fixed::from_num(slowest_speed.max(1))
        .saturating_mul(Fixed::ONE + fleet_speed_bonus.max(Fixed::ZERO))
        .saturating_mul_int(i64::from(cfg.universe_speed.max(1)));
    let hours = Fixed::from_num(distance) / speed;
    let ms = hours.saturating_mul_int(3_600).to_num::<i64>().saturating_mul(1_000);
    ms.max(MIN_TRAVEL_MS)
}

fn fuel_cost(
    ships: &FleetComposition,
    distance: u32,
    legs: i64,
    bonuses: &BonusSet,
) -> Fixed {
    let discount = (Fixed::ONE - bonuses.fuel_reduction).max(Fixed::ZERO);
    ships
        .fuel_for_distance(distance)
        .saturating_mul(discount)
        .saturating_mul_int(legs)
}

// ============================================================================
// Dispatch
// ============================================================================

/// Parameters for dispatching a fleet.
#[derive(Debug, Clone)]
pub struct LaunchOrder {
    /// Planet to launch from.
    pub origin_planet_id: u64,
    /// What to do.
    pub kind: MissionKind,
    /// Where to go.
    pub target: Position,
    /// Whether to act against the moon at the target.
    pub target_is_moon: bool,
    /// Ships to send.
    pub ships: FleetComposition,
    /// Cargo to load.
    pub cargo: Resources,
}

/// Parameters for firing a missile salvo.
#[derive(Debug, Clone, Copy)]
pub struct MissileOrder {
    /// Planet whose silo fires.
    pub origin_planet_id: u64,
    /// Target coordinates.
    pub target: Position,
    /// Warheads to fire.
    pub missile_count: u32,
}

fn require_ships(
    ships: &FleetComposition,
    kind: ShipKind,
    minimum: u32,
) -> Result<()> {
    if ships.count(kind) < minimum {
        return Err(GameError::FleetUnavailable {
            ship: kind.name().to_owned(),
            requested: minimum,
            available: ships.count(kind),
        });
    }
    Ok(())
}

fn validate_cargo(order: &LaunchOrder) -> Result<()> {
    let carries = matches!(
        order.kind,
        MissionKind::Transport | MissionKind::Deploy | MissionKind::Colonize | MissionKind::Gift { .. }
    );
    if !carries && !order.cargo.is_empty() {
        return Err(GameError::InvalidInput {
            field: "cargo".to_owned(),
            message: "this mission type cannot carry cargo".to_owned(),
        });
    }
    if matches!(order.kind, MissionKind::Transport | MissionKind::Gift { .. })
        && order.cargo.is_empty()
    {
        return Err(GameError::InvalidInput {
            field: "cargo".to_owned(),
            message: "nothing loaded".to_owned(),
        });
    }
    if order.cargo.metal < Fixed::ZERO
        || order.cargo.crystal < Fixed::ZERO
        || order.cargo.deuterium < Fixed::ZERO
    {
        return Err(GameError::InvalidInput {
            field: "cargo".to_owned(),
            message: "negative amounts".to_owned(),
        });
    }
    if order.cargo.total() > order.ships.cargo_capacity() {
        return Err(GameError::InvalidInput {
            field: "cargo".to_owned(),
            message: "exceeds fleet cargo capacity".to_owned(),
        });
    }
    Ok(())
}

fn validate_target(
    player: &Player,
    universe: &Universe,
    npcs: &[Npc],
    order: &LaunchOrder,
) -> Result<()> {
    let key = order.target.key();
    match order.kind {
        MissionKind::Transport => {
            let own = player.planet_at(order.target).is_some();
            if !own && universe.npc_world(order.target).is_none() {
                return Err(GameError::InvalidMissionTarget(key));
            }
        }
        MissionKind::Deploy => {
            let Some(destination) = player.planet_at(order.target) else {
                return Err(GameError::InvalidMissionTarget(key));
            };
            if order.target_is_moon && destination.moon.is_none() {
                return Err(GameError::InvalidMissionTarget(key));
            }
        }
        MissionKind::Colonize => {
            if !universe.contains(order.target) {
                return Err(GameError::InvalidMissionTarget(key));
            }
            if player.planet_at(order.target).is_some()
                || universe.npc_world(order.target).is_some()
            {
                return Err(GameError::PositionOccupied(key));
            }
            if player.planets.len() >= player.max_colonies() {
                return Err(GameError::RequirementNotMet(format!(
                    "astrophysics level {} allows only {} colonies",
                    player.technologies.level(TechnologyKind::Astrophysics),
                    player.max_colonies()
                )));
            }
        }
        MissionKind::Espionage | MissionKind::Attack => {
            if universe.npc_world(order.target).is_none() {
                return Err(GameError::InvalidMissionTarget(key));
            }
        }
        MissionKind::Expedition => {
            if !order.target.is_expedition_zone()
                || !(1..=universe.galaxies).contains(&order.target.galaxy)
                || !(1..=universe.systems).contains(&order.target.system)
            {
                return Err(GameError::InvalidMissionTarget(key));
            }
        }
        MissionKind::Recycle => {
            if universe.debris_at(order.target).is_none() {
                return Err(GameError::InvalidMissionTarget(key));
            }
        }
        MissionKind::Gift { npc_id } => {
            if !npcs.iter().any(|npc| npc.id == npc_id) {
                return Err(GameError::NpcNotFound(npc_id));
            }
            let hosts = universe
                .npc_world(order.target)
                .is_some_and(|world| world.npc_id == npc_id);
            if !hosts {
                return Err(GameError::InvalidMissionTarget(key));
            }
        }
    }
    Ok(())
}

/// Dispatch a fleet. Validates everything up front; on success the
/// ships, cargo and fuel have left the origin planet and the mission
/// id is returned.
pub fn launch_mission(
    player: &mut Player,
    universe: &Universe,
    npcs: &[Npc],
    bonuses: &BonusSet,
    order: LaunchOrder,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Result<u64> {
    if order.ships.is_empty() {
        return Err(GameError::InvalidInput {
            field: "ships".to_owned(),
            message: "no ships selected".to_owned(),
        });
    }
    if order.ships.solar_satellite > 0 {
        return Err(GameError::InvalidInput {
            field: "ships".to_owned(),
            message: "solar satellites cannot fly missions".to_owned(),
        });
    }
    match order.kind {
        MissionKind::Colonize => require_ships(&order.ships, ShipKind::ColonyShip, 1)?,
        MissionKind::Espionage => require_ships(&order.ships, ShipKind::EspionageProbe, 1)?,
        MissionKind::Recycle => require_ships(&order.ships, ShipKind::Recycler, 1)?,
        _ => {}
    }
    validate_cargo(&order)?;

    let in_flight = player.fleet_missions.len();
    let capacity = player.fleet_slot_capacity(bonuses, cfg);
    if in_flight >= capacity {
        return Err(GameError::FleetSlotsExhausted {
            in_flight,
            capacity,
        });
    }

    validate_target(player, universe, npcs, &order)?;

    let origin = player
        .planet(order.origin_planet_id)
        .ok_or(GameError::PlanetNotFound(order.origin_planet_id))?;
    if !origin.fleet.contains(&order.ships) {
        let (kind, requested) = order
            .ships
            .iter_present()
            .find(|(kind, count)| origin.fleet.count(*kind) < *count)
            .ok_or_else(|| GameError::InvalidInput {
                field: "ships".to_owned(),
                message: "empty fleet selection".to_owned(),
            })?;
        return Err(GameError::FleetUnavailable {
            ship: kind.name().to_owned(),
            requested,
            available: origin.fleet.count(kind),
        });
    }
    let Some(slowest) = order.ships.slowest_speed() else {
        return Err(GameError::InvalidInput {
            field: "ships".to_owned(),
            message: "fleet cannot fly".to_owned(),
        });
    };

    let origin_position = origin.position;
    let distance = origin_position.distance(order.target);
    let leg_ms = travel_time_ms(distance, slowest, bonuses.fleet_speed, cfg);
    let legs = if order.kind.is_round_trip() { 2 } else { 1 };
    let fuel = fuel_cost(&order.ships, distance, legs, bonuses);
    let spend = order.cargo + Resources {
        metal: Fixed::ZERO,
        crystal: Fixed::ZERO,
        deuterium: fuel,
    };

    // The NPC party, recorded up front so resolution does not have to
    // guess whose world was hit after the map changes.
    let npc_id = match order.kind {
        MissionKind::Gift { npc_id } => Some(npc_id),
        MissionKind::Espionage | MissionKind::Attack => {
            universe.npc_world(order.target).map(|world| world.npc_id)
        }
        _ => None,
    };

    let arrival_time = now + leg_ms;
    let return_time = match order.kind {
        MissionKind::Deploy | MissionKind::Colonize => None,
        MissionKind::Expedition => Some(arrival_time + cfg.expedition_hold_ms + leg_ms),
        _ => Some(arrival_time + leg_ms),
    };

    // Validation is done; everything below must succeed together.
    let origin = player
        .planet_mut(order.origin_planet_id)
        .ok_or(GameError::PlanetNotFound(order.origin_planet_id))?;
    origin.resources.checked_spend(spend)?;
    origin.fleet.subtract(&order.ships);

    let id = player.next_id();
    let seed = player.next_seed();
    player.fleet_missions.push(FleetMission {
        id,
        kind: order.kind,
        status: MissionStatus::Outbound,
        origin_planet_id: order.origin_planet_id,
        target: order.target,
        target_is_moon: order.target_is_moon,
        ships: order.ships,
        cargo: order.cargo,
        dark_matter_cargo: Fixed::ZERO,
        departure_time: now,
        arrival_time,
        return_time,
        seed,
        npc_id,
        announced: false,
    });

    let stats = &mut player.achievements;
    stats.total_flight_missions += 1;
    stats.fuel_consumed += floor_u64(fuel);
    match order.kind {
        MissionKind::Transport => stats.transport_missions += 1,
        MissionKind::Deploy => stats.deploy_missions += 1,
        MissionKind::Espionage => stats.spy_missions += 1,
        MissionKind::Recycle => stats.recycling_missions += 1,
        MissionKind::Expedition => stats.expeditions_total += 1,
        MissionKind::Gift { .. } => {
            stats.gifts_sent += 1;
            stats.gift_resources_total += floor_u64(order.cargo.total());
        }
        _ => {}
    }

    tracing::debug!(
        mission = id,
        kind = ?order.kind,
        target = %order.target,
        arrival = arrival_time,
        "fleet dispatched"
    );
    Ok(id)
}

/// Fire interplanetary missiles at an NPC world.
pub fn launch_missiles(
    player: &mut Player,
    universe: &Universe,
    order: MissileOrder,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Result<u64> {
    if order.missile_count == 0 {
        return Err(GameError::InvalidInput {
            field: "missileCount".to_owned(),
            message: "must fire at least one missile".to_owned(),
        });
    }
    if universe.npc_world(order.target).is_none() {
        return Err(GameError::InvalidMissionTarget(order.target.key()));
    }
    let origin = player
        .planet(order.origin_planet_id)
        .ok_or(GameError::PlanetNotFound(order.origin_planet_id))?;
    let stocked = origin.defense.interplanetary_missile;
    if stocked < order.missile_count {
        return Err(GameError::FleetUnavailable {
            ship: "interplanetaryMissile".to_owned(),
            requested: order.missile_count,
            available: stocked,
        });
    }
    let distance = origin.position.distance(order.target);
    let flight = travel_time_ms(distance, MISSILE_SPEED, Fixed::ZERO, cfg);

    let origin = player
        .planet_mut(order.origin_planet_id)
        .ok_or(GameError::PlanetNotFound(order.origin_planet_id))?;
    origin.defense.interplanetary_missile -= order.missile_count;

    let id = player.next_id();
    player.missile_attacks.push(MissileAttack {
        id,
        origin_planet_id: order.origin_planet_id,
        target: order.target,
        missile_count: order.missile_count,
        launch_time: now,
        arrival_time: now + flight,
        status: MissileStatus::Flying,
    });
    Ok(id)
}

// ============================================================================
// Resolution
// ============================================================================

/// Earliest pending transition across the player's missions, missiles,
/// and every NPC's missions.
#[must_use]
pub fn next_mission_due(player: &Player, npcs: &[Npc]) -> Option<Timestamp> {
    let player_missions = player.fleet_missions.iter().filter_map(FleetMission::next_due);
    let missiles = player
        .missile_attacks
        .iter()
        .filter(|attack| attack.status == MissileStatus::Flying)
        .map(|attack| attack.arrival_time);
    let npc_missions = npcs
        .iter()
        .flat_map(|npc| npc.fleet_missions.iter())
        .filter_map(FleetMission::next_due);
    player_missions.chain(missiles).chain(npc_missions).min()
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DueSource {
    PlayerMission(usize),
    Missile(usize),
    NpcMission { npc: usize, mission: usize },
}

fn pick_next_due(player: &Player, npcs: &[Npc], now: Timestamp) -> Option<DueSource> {
    let mut best: Option<(Timestamp, u8, u64, DueSource)> = None;
    let mut consider = |time: Timestamp, rank: u8, id: u64, source: DueSource| {
        if time > now {
            return;
        }
        let candidate = (time, rank, id, source);
        if best.map_or(true, |current| candidate < current) {
            best = Some(candidate);
        }
    };
    for (index, mission) in player.fleet_missions.iter().enumerate() {
        if let Some(time) = mission.next_due() {
            consider(time, 0, mission.id, DueSource::PlayerMission(index));
        }
    }
    for (index, attack) in player.missile_attacks.iter().enumerate() {
        if attack.status == MissileStatus::Flying {
            consider(attack.arrival_time, 1, attack.id, DueSource::Missile(index));
        }
    }
    for (npc_index, npc) in npcs.iter().enumerate() {
        for (mission_index, mission) in npc.fleet_missions.iter().enumerate() {
            if let Some(time) = mission.next_due() {
                consider(
                    time,
                    2,
                    mission.id,
                    DueSource::NpcMission {
                        npc: npc_index,
                        mission: mission_index,
                    },
                );
            }
        }
    }
    best.map(|(_, _, _, source)| source)
}

/// Process every mission transition due at or before `now`, in
/// chronological order. Safe to call repeatedly with overlapping
/// windows; the status guards make each transition fire once.
pub fn advance_missions(
    player: &mut Player,
    universe: &mut Universe,
    npcs: &mut [Npc],
    cfg: &EngineConfig,
    now: Timestamp,
) -> Vec<MissionEvent> {
    let mut events = Vec::new();
    announce_incoming(player, universe, npcs, cfg);

    while let Some(source) = pick_next_due(player, npcs, now) {
        match source {
            DueSource::PlayerMission(index) => {
                let mut mission = player.fleet_missions.remove(index);
                match mission.status {
                    MissionStatus::Outbound => {
                        resolve_player_arrival(
                            &mut mission,
                            player,
                            universe,
                            npcs,
                            cfg,
                            &mut events,
                        );
                        if mission.status != MissionStatus::Arrived {
                            player.fleet_missions.push(mission);
                        }
                    }
                    MissionStatus::Returning => {
                        resolve_player_return(mission, player, cfg, &mut events);
                    }
                    MissionStatus::Arrived => {}
                }
            }
            DueSource::Missile(index) => {
                let mut attack = player.missile_attacks.remove(index);
                resolve_missile_strike(&mut attack, player, universe, npcs, cfg, &mut events);
            }
            DueSource::NpcMission { npc, mission } => {
                let mut record = npcs[npc].fleet_missions.remove(mission);
                match record.status {
                    MissionStatus::Outbound => {
                        resolve_npc_arrival(
                            &mut record,
                            npc,
                            player,
                            universe,
                            npcs,
                            cfg,
                            &mut events,
                        );
                        if record.status != MissionStatus::Arrived {
                            npcs[npc].fleet_missions.push(record);
                        }
                    }
                    MissionStatus::Returning => {
                        resolve_npc_return(record, npcs[npc].id, universe, &mut events);
                    }
                    MissionStatus::Arrived => {}
                }
            }
        }
    }
    events
}

/// Warn the player about hostile or prying NPC fleets they have not
/// been told about yet.
fn announce_incoming(
    player: &mut Player,
    universe: &Universe,
    npcs: &mut [Npc],
    cfg: &EngineConfig,
) {
    let mut alerts = Vec::new();
    for npc in npcs.iter_mut() {
        for mission in &mut npc.fleet_missions {
            if mission.status != MissionStatus::Outbound || mission.announced {
                continue;
            }
            if player.planet_at(mission.target).is_none() {
                continue;
            }
            let origin = universe
                .planets
                .values()
                .find(|world| world.npc_id == npc.id && world.planet.id == mission.origin_planet_id)
                .map_or(mission.target, |world| world.planet.position);
            alerts.push((mission.departure_time, NotificationKind::IncomingFleet {
                mission_id: mission.id,
                kind: mission.kind,
                origin,
                target: mission.target,
                arrival: mission.arrival_time,
                hostile: mission.kind.is_hostile(),
            }));
            mission.announced = true;
        }
    }
    for (seen_at, kind) in alerts {
        let id = player.next_id();
        player
            .notifications
            .push(Notification::new(id, seen_at, kind), cfg.notification_cap);
    }
}

fn push_mission_report(
    player: &mut Player,
    mission: &FleetMission,
    at: Timestamp,
    success: bool,
    outcome: MissionOutcome,
    cfg: &EngineConfig,
) {
    let id = player.next_id();
    player.mission_reports.push(
        MissionReport {
            id,
            timestamp: at,
            kind: mission.kind,
            origin_planet_id: mission.origin_planet_id,
            target: mission.target,
            success,
            outcome,
        },
        cfg.report_cap,
    );
}

fn notify(player: &mut Player, at: Timestamp, kind: NotificationKind, cfg: &EngineConfig) {
    let id = player.next_id();
    player
        .notifications
        .push(Notification::new(id, at, kind), cfg.notification_cap);
}

fn begin_return(mission: &mut FleetMission) {
    if mission.return_time.is_none() {
        let leg = mission.arrival_time - mission.departure_time;
        mission.return_time = Some(mission.arrival_time + leg);
    }
    mission.status = MissionStatus::Returning;
}

fn resolve_player_arrival(
    mission: &mut FleetMission,
    player: &mut Player,
    universe: &mut Universe,
    npcs: &mut [Npc],
    cfg: &EngineConfig,
    events: &mut Vec<MissionEvent>,
) {
    events.push(MissionEvent::FleetArrived {
        mission_id: mission.id,
        kind: mission.kind,
    });
    match mission.kind {
        MissionKind::Transport => arrive_transport(mission, player, universe, cfg),
        MissionKind::Deploy => arrive_deploy(mission, player, cfg),
        MissionKind::Colonize => arrive_colonize(mission, player, universe, cfg, events),
        MissionKind::Espionage => arrive_espionage(mission, player, universe, npcs, cfg),
        MissionKind::Attack => arrive_attack(mission, player, universe, npcs, cfg, events),
        MissionKind::Expedition => arrive_expedition(mission, player, cfg),
        MissionKind::Recycle => arrive_recycle(mission, player, universe, cfg),
        MissionKind::Gift { npc_id } => arrive_gift(mission, npc_id, player, universe, npcs, cfg),
    }
}

fn arrive_transport(
    mission: &mut FleetMission,
    player: &mut Player,
    universe: &mut Universe,
    cfg: &EngineConfig,
) {
    let at = mission.arrival_time;
    let cargo = mission.cargo;
    if let Some(planet) = player.planet_at_mut(mission.target) {
        planet.resources += cargo;
        mission.cargo = Resources::ZERO;
        push_mission_report(player, mission, at, true, MissionOutcome::Delivered { cargo }, cfg);
    } else if let Some(world) = universe.npc_world_mut(mission.target) {
        world.planet.resources += cargo;
        mission.cargo = Resources::ZERO;
        push_mission_report(player, mission, at, true, MissionOutcome::Delivered { cargo }, cfg);
    } else {
        push_mission_report(
            player,
            mission,
            at,
            false,
            MissionOutcome::Failed {
                reason: "destination no longer exists".to_owned(),
            },
            cfg,
        );
    }
    begin_return(mission);
}

fn arrive_deploy(mission: &mut FleetMission, player: &mut Player, cfg: &EngineConfig) {
    let at = mission.arrival_time;
    let ships = mission.ships;
    let cargo = mission.cargo;
    let target_is_moon = mission.target_is_moon;
    let deployed = match player.planet_at_mut(mission.target) {
        Some(planet) => {
            if target_is_moon {
                match planet.moon.as_mut() {
                    Some(moon) => {
                        moon.fleet.merge(&ships);
                        planet.resources += cargo;
                        true
                    }
                    None => false,
                }
            } else {
                planet.fleet.merge(&ships);
                planet.resources += cargo;
                true
            }
        }
        None => false,
    };
    if deployed {
        push_mission_report(player, mission, at, true, MissionOutcome::Deployed { ships }, cfg);
        mission.status = MissionStatus::Arrived;
    } else {
        push_mission_report(
            player,
            mission,
            at,
            false,
            MissionOutcome::Failed {
                reason: "destination no longer exists".to_owned(),
            },
            cfg,
        );
        begin_return(mission);
    }
}

fn arrive_colonize(
    mission: &mut FleetMission,
    player: &mut Player,
    universe: &mut Universe,
    cfg: &EngineConfig,
    events: &mut Vec<MissionEvent>,
) {
    let at = mission.arrival_time;
    let free = universe.contains(mission.target)
        && universe.npc_world(mission.target).is_none()
        && player.planet_at(mission.target).is_none();
    let under_cap = player.planets.len() < player.max_colonies();
    if !free || !under_cap {
        let reason = if free {
            "colony limit reached".to_owned()
        } else {
            "position no longer free".to_owned()
        };
        push_mission_report(player, mission, at, false, MissionOutcome::Failed { reason }, cfg);
        begin_return(mission);
        return;
    }

    mission.ships.colony_ship -= 1;
    let mut rng = StdRng::seed_from_u64(mission.seed);
    let deposits = OreDeposits::generate(mission.target, &cfg.deposits, &mut rng);
    let planet_id = player.next_id();
    let mut colony = Planet::colony(planet_id, "Colony".to_owned(), mission.target, at, deposits);
    colony.resources += mission.cargo;
    mission.cargo = Resources::ZERO;
    player.planets.push(colony);
    player.achievements.colonizations += 1;

    push_mission_report(
        player,
        mission,
        at,
        true,
        MissionOutcome::ColonyFounded { planet_id },
        cfg,
    );
    events.push(MissionEvent::ColonyFounded {
        planet_id,
        position: mission.target,
    });

    if mission.ships.is_empty() {
        mission.status = MissionStatus::Arrived;
    } else {
        begin_return(mission);
    }
}

fn arrive_espionage(
    mission: &mut FleetMission,
    player: &mut Player,
    universe: &Universe,
    npcs: &mut [Npc],
    cfg: &EngineConfig,
) {
    let at = mission.arrival_time;
    let Some(world) = universe.npc_world(mission.target) else {
        push_mission_report(
            player,
            mission,
            at,
            false,
            MissionOutcome::Failed {
                reason: "target no longer exists".to_owned(),
            },
            cfg,
        );
        begin_return(mission);
        return;
    };

    let npc = npcs.iter_mut().find(|npc| npc.id == world.npc_id);
    let npc_espionage = npc
        .as_ref()
        .map_or(0, |npc| npc.technologies.level(TechnologyKind::EspionageTechnology));
    let own_espionage = player.technologies.level(TechnologyKind::EspionageTechnology);
    let advantage = i64::from(own_espionage) - i64::from(npc_espionage);

    let mut rng = StdRng::seed_from_u64(mission.seed);
    let detection_chance = (25 + (i64::from(npc_espionage) - i64::from(own_espionage)) * 10)
        .clamp(5, 95);
    let detected = rng.gen_range(0..100_i64) < detection_chance;

    let (name, scanned_resources, buildings, fleet, defense) = if mission.target_is_moon {
        match world.planet.moon.as_ref() {
            Some(moon) => (
                moon.name.clone(),
                Resources::ZERO,
                moon.buildings,
                moon.fleet,
                moon.defense,
            ),
            None => (
                world.planet.name.clone(),
                world.planet.resources,
                world.planet.buildings,
                world.planet.fleet,
                world.planet.defense,
            ),
        }
    } else {
        (
            world.planet.name.clone(),
            world.planet.resources,
            world.planet.buildings,
            world.planet.fleet,
            world.planet.defense,
        )
    };
    let npc_technologies = npc.as_ref().map(|npc| npc.technologies);
    let npc_id = world.npc_id;

    let report_id = player.next_id();
    player.spy_reports.push(
        SpyReport {
            id: report_id,
            timestamp: at,
            position: mission.target,
            target_name: name,
            npc_id: Some(npc_id),
            resources: scanned_resources,
            buildings: (advantage >= 1).then_some(buildings),
            fleet: (advantage >= 2).then_some(fleet),
            defense: (advantage >= 3).then_some(defense),
            technologies: npc_technologies.filter(|_| advantage >= 4),
            detected,
        },
        cfg.report_cap,
    );

    if let Some(npc) = npc {
        let penalty = if detected {
            ESPIONAGE_DETECTED_PENALTY
        } else {
            ESPIONAGE_UNDETECTED_PENALTY
        };
        let reason = if detected {
            ReputationReason::EspionageDetected
        } else {
            ReputationReason::EspionageUndetected
        };
        let npc_name = npc.name.clone();
        let relation = npc.relation_mut(player.id);
        let (old_status, new_status) = relation.apply_change(penalty, reason, at, cfg.report_cap);
        let new_reputation = relation.reputation;
        push_diplomatic_report(
            player,
            at,
            npc_id,
            npc_name,
            reason,
            penalty,
            new_reputation,
            old_status,
            new_status,
            cfg,
        );
    }

    push_mission_report(
        player,
        mission,
        at,
        true,
        MissionOutcome::Espionage { detected },
        cfg,
    );
    begin_return(mission);
}

fn push_diplomatic_report(
    player: &mut Player,
    at: Timestamp,
    npc_id: u64,
    npc_name: String,
    reason: ReputationReason,
    change: i32,
    new_reputation: i32,
    old_status: crate::diplomacy::DiplomaticStatus,
    new_status: crate::diplomacy::DiplomaticStatus,
    cfg: &EngineConfig,
) {
    let id = player.next_id();
    player.diplomatic_reports.push(
        crate::diplomacy::DiplomaticReport {
            id,
            timestamp: at,
            npc_id,
            npc_name,
            reason,
            reputation_change: change,
            new_reputation,
            old_status,
            new_status,
        },
        cfg.report_cap,
    );
}

fn arrive_attack(
    mission: &mut FleetMission,
    player: &mut Player,
    universe: &mut Universe,
    npcs: &mut [Npc],
    cfg: &EngineConfig,
    events: &mut Vec<MissionEvent>,
) {
    let at = mission.arrival_time;
    let snapshot = universe.npc_world(mission.target).map(|world| {
        let (fleet, defense) = if mission.target_is_moon {
            world
                .planet
                .moon
                .as_ref()
                .map_or((world.planet.fleet, world.planet.defense), |moon| {
                    (moon.fleet, moon.defense)
                })
        } else {
            (world.planet.fleet, world.planet.defense)
        };
        let stocks = if mission.target_is_moon && world.planet.moon.is_some() {
            Resources::ZERO
        } else {
            world.planet.resources
        };
        (
            world.npc_id,
            world.planet.id,
            fleet,
            defense,
            stocks,
            world.planet.moon.is_some(),
        )
    });
    let Some((npc_id, target_planet_id, def_fleet, def_defense, def_stocks, has_moon)) = snapshot
    else {
        push_mission_report(
            player,
            mission,
            at,
            false,
            MissionOutcome::Failed {
                reason: "target no longer exists".to_owned(),
            },
            cfg,
        );
        begin_return(mission);
        return;
    };

    let npc_technologies = npcs
        .iter()
        .find(|npc| npc.id == npc_id)
        .map(|npc| npc.technologies)
        .unwrap_or_default();
    let attacker = Combatant {
        fleet: mission.ships,
        defense: Default::default(),
        technologies: player.technologies,
        defense_bonus: Fixed::ZERO,
    };
    let defender = Combatant {
        fleet: def_fleet,
        defense: def_defense,
        technologies: npc_technologies,
        defense_bonus: Fixed::ZERO,
    };
    let outcome = simulate_battle(&attacker, &defender, def_stocks, has_moon, mission.seed, cfg);

    // Settle the defender's side of the field
    if let Some(world) = universe.npc_world_mut(mission.target) {
        let mut standing = outcome.defender_defense_remaining;
        for (kind, restored) in outcome.defender_defense_restored.iter_present() {
            *standing.count_mut(kind) += restored;
        }
        if mission.target_is_moon {
            if let Some(moon) = world.planet.moon.as_mut() {
                moon.fleet = outcome.defender_fleet_remaining;
                moon.defense = standing;
            }
        } else {
            world.planet.fleet = outcome.defender_fleet_remaining;
            world.planet.defense = standing;
            world.planet.resources = world.planet.resources.saturating_sub(outcome.plunder);
        }
        if outcome.moon_formed && world.planet.moon.is_none() {
            let size = moon_size(outcome.debris_metal.saturating_add(outcome.debris_crystal));
            world.planet.moon = Some(Moon::new(mission.id, size));
        }
    }
    universe.deposit_debris(
        mission.target,
        outcome.debris_metal,
        outcome.debris_crystal,
        at,
        cfg,
    );

    let npc_name = if let Some(npc) = npcs.iter_mut().find(|npc| npc.id == npc_id) {
        npc.record_attack_by(player.id, target_planet_id, at);
        let npc_name = npc.name.clone();
        let relation = npc.relation_mut(player.id);
        let (old_status, new_status) =
            relation.apply_change(ATTACK_PENALTY, ReputationReason::Attack, at, cfg.report_cap);
        let new_reputation = relation.reputation;
        push_diplomatic_report(
            player,
            at,
            npc_id,
            npc_name.clone(),
            ReputationReason::Attack,
            ATTACK_PENALTY,
            new_reputation,
            old_status,
            new_status,
            cfg,
        );
        npc_name
    } else {
        "Unknown".to_owned()
    };

    mission.ships = outcome.attacker_remaining;
    mission.cargo += outcome.plunder;

    let report_id = player.next_id();
    let attacker_name = player.name.clone();
    player.battle_reports.push(
        BattleReport {
            id: report_id,
            timestamp: at,
            position: mission.target,
            attacker_name,
            defender_name: npc_name,
            rounds: outcome.rounds,
            winner: outcome.winner,
            attacker_losses: outcome.attacker_losses,
            defender_fleet_losses: outcome.defender_fleet_losses,
            defender_defense_losses: outcome.defender_defense_losses,
            plunder: outcome.plunder,
            debris_metal: outcome.debris_metal,
            debris_crystal: outcome.debris_crystal,
            moon_formed: outcome.moon_formed,
        },
        cfg.report_cap,
    );
    match outcome.winner {
        BattleWinner::Attacker => player.achievements.attacks_won += 1,
        BattleWinner::Defender => player.achievements.attacks_lost += 1,
        BattleWinner::Draw => {}
    }
    if outcome.moon_formed {
        events.push(MissionEvent::MoonFormed {
            position: mission.target,
        });
    }
    events.push(MissionEvent::BattleResolved {
        position: mission.target,
        winner: outcome.winner,
    });
    push_mission_report(
        player,
        mission,
        at,
        outcome.winner == BattleWinner::Attacker,
        MissionOutcome::Battle {
            winner: outcome.winner,
        },
        cfg,
    );

    if mission.ships.is_empty() {
        mission.status = MissionStatus::Arrived;
    } else {
        begin_return(mission);
    }
}

fn moon_size(debris_total: Fixed) -> u32 {
    let bonus = (debris_total.to_num::<i64>() / 100).clamp(0, 7_000) as u32;
    1_000 + bonus
}

/// A raiding party sized against the fleet it ambushes.
fn pirate_fleet(ships: &FleetComposition, rng: &mut StdRng) -> FleetComposition {
    let strength = ships.flying_total().max(1);
    let scale = rng.gen_range(40..=90_u32);
    let raiders = (strength * scale / 100).max(1);
    FleetComposition {
        light_fighter: raiders,
        cruiser: raiders / 8,
        ..FleetComposition::default()
    }
}

fn arrive_expedition(mission: &mut FleetMission, player: &mut Player, cfg: &EngineConfig) {
    let at = mission.resolve_time();
    let mut rng = StdRng::seed_from_u64(mission.seed);
    let roll = rng.gen_range(0..100_i64);
    let find = if roll < 30 {
        let share = rng.gen_range(10..=50_i64);
        let haul = mission
            .ships
            .cargo_capacity()
            .saturating_mul(crate::math::percent(share));
        let found = Resources {
            metal: haul.saturating_mul(crate::math::percent(50)),
            crystal: haul.saturating_mul(crate::math::percent(30)),
            deuterium: haul.saturating_mul(crate::math::percent(20)),
        };
        mission.cargo += found;
        ExpeditionFind::Resources { resources: found }
    } else if roll < 42 {
        let amount = Fixed::from_num(rng.gen_range(100..=500_i64));
        mission.dark_matter_cargo = mission.dark_matter_cargo.saturating_add(amount);
        ExpeditionFind::DarkMatter { amount }
    } else if roll < 52 {
        let found = FleetComposition {
            light_fighter: 1 + mission.ships.flying_total() / 10,
            ..FleetComposition::default()
        };
        mission.ships.merge(&found);
        ExpeditionFind::Ships { ships: found }
    } else if roll < 66 {
        let share = rng.gen_range(10..=33_i64);
        let mut lost = FleetComposition::default();
        for (kind, count) in mission.ships.iter_present() {
            *lost.count_mut(kind) = (i64::from(count) * share / 100) as u32;
        }
        if lost.is_empty() {
            // Too small a fleet for the hazard to claim a hull.
            ExpeditionFind::Nothing
        } else {
            mission.ships.subtract(&lost);
            ExpeditionFind::FleetLoss { lost }
        }
    } else if roll < 78 {
        let pirates = pirate_fleet(&mission.ships, &mut rng);
        let attacker = Combatant {
            fleet: mission.ships,
            defense: Default::default(),
            technologies: player.technologies,
            defense_bonus: Fixed::ZERO,
        };
        let defender = Combatant {
            fleet: pirates,
            defense: Default::default(),
            technologies: Default::default(),
            defense_bonus: Fixed::ZERO,
        };
        // Empty holds and no orbit to seed a moon over, out here.
        let outcome =
            simulate_battle(&attacker, &defender, Resources::ZERO, true, rng.gen(), cfg);
        mission.ships = outcome.attacker_remaining;
        match outcome.winner {
            BattleWinner::Attacker => player.achievements.attacks_won += 1,
            BattleWinner::Defender => player.achievements.attacks_lost += 1,
            BattleWinner::Draw => {}
        }
        ExpeditionFind::Pirates {
            winner: outcome.winner,
            losses: outcome.attacker_losses,
        }
    } else {
        ExpeditionFind::Nothing
    };

    let success = match &find {
        ExpeditionFind::Resources { .. }
        | ExpeditionFind::DarkMatter { .. }
        | ExpeditionFind::Ships { .. } => true,
        ExpeditionFind::Pirates { winner, .. } => *winner == BattleWinner::Attacker,
        ExpeditionFind::FleetLoss { .. } | ExpeditionFind::Nothing => false,
    };
    if success {
        player.achievements.expeditions_successful += 1;
    }
    push_mission_report(
        player,
        mission,
        at,
        success,
        MissionOutcome::Expedition { find },
        cfg,
    );
    if mission.ships.is_empty() {
        mission.status = MissionStatus::Arrived;
    } else {
        mission.status = MissionStatus::Returning;
    }
}

fn arrive_recycle(
    mission: &mut FleetMission,
    player: &mut Player,
    universe: &mut Universe,
    cfg: &EngineConfig,
) {
    let at = mission.arrival_time;
    let free_hold = mission
        .ships
        .cargo_capacity()
        .saturating_sub(mission.cargo.total())
        .max(Fixed::ZERO);
    let collected = universe.collect_debris(mission.target, free_hold);
    mission.cargo += collected;
    player.achievements.recycled_resources += floor_u64(collected.total());
    push_mission_report(
        player,
        mission,
        at,
        !collected.is_empty(),
        MissionOutcome::Recycled { collected },
        cfg,
    );
    begin_return(mission);
}

fn arrive_gift(
    mission: &mut FleetMission,
    npc_id: u64,
    player: &mut Player,
    universe: &mut Universe,
    npcs: &mut [Npc],
    cfg: &EngineConfig,
) {
    let at = mission.arrival_time;
    let Some(npc) = npcs.iter_mut().find(|npc| npc.id == npc_id) else {
        push_mission_report(
            player,
            mission,
            at,
            false,
            MissionOutcome::Failed {
                reason: "faction no longer exists".to_owned(),
            },
            cfg,
        );
        begin_return(mission);
        return;
    };
    let npc_name = npc.name.clone();
    let offered = mission.cargo;
    let relation_snapshot = npc.relation(player.id).cloned().unwrap_or_default();
    match crate::diplomacy::evaluate_gift(&relation_snapshot, npc.personality, offered.total(), cfg)
    {
        Ok(gain) => {
            let relation = npc.relation_mut(player.id);
            let (old_status, new_status) =
                relation.apply_change(gain, ReputationReason::Gift, at, cfg.report_cap);
            let new_reputation = relation.reputation;
            if let Some(world) = universe.npc_world_mut(mission.target) {
                world.planet.resources += offered;
            }
            mission.cargo = Resources::ZERO;
            notify(
                player,
                at,
                NotificationKind::GiftAccepted {
                    npc_id,
                    npc_name: npc_name.clone(),
                    resources: offered,
                    reputation_gain: gain,
                },
                cfg,
            );
            push_diplomatic_report(
                player,
                at,
                npc_id,
                npc_name,
                ReputationReason::Gift,
                gain,
                new_reputation,
                old_status,
                new_status,
                cfg,
            );
            push_mission_report(
                player,
                mission,
                at,
                true,
                MissionOutcome::GiftDelivered {
                    reputation_gain: gain,
                },
                cfg,
            );
        }
        Err(reason) => {
            notify(
                player,
                at,
                NotificationKind::GiftRejected {
                    npc_id,
                    npc_name,
                    resources: offered,
                    reason,
                },
                cfg,
            );
            push_mission_report(
                player,
                mission,
                at,
                false,
                MissionOutcome::GiftRefused { reason },
                cfg,
            );
        }
    }
    begin_return(mission);
}

fn resolve_player_return(
    mission: FleetMission,
    player: &mut Player,
    cfg: &EngineConfig,
    events: &mut Vec<MissionEvent>,
) {
    let at = mission.return_time.unwrap_or(mission.arrival_time);
    // Land at the origin planet, or the first surviving one if it was lost
    let harbor = player
        .planets
        .iter()
        .position(|planet| planet.id == mission.origin_planet_id)
        .unwrap_or(0);
    if let Some(planet) = player.planets.get_mut(harbor) {
        planet.fleet.merge(&mission.ships);
        planet.resources += mission.cargo;
    }
    if mission.dark_matter_cargo > Fixed::ZERO {
        let bonuses = BonusSet::from_roster(&player.officers, at);
        player.credit_dark_matter(mission.dark_matter_cargo, &bonuses, cfg);
    }
    events.push(MissionEvent::FleetReturned {
        mission_id: mission.id,
    });
}

fn resolve_missile_strike(
    attack: &mut MissileAttack,
    player: &mut Player,
    universe: &mut Universe,
    npcs: &mut [Npc],
    cfg: &EngineConfig,
    events: &mut Vec<MissionEvent>,
) {
    let at = attack.arrival_time;
    let snapshot = universe
        .npc_world(attack.target)
        .map(|world| (world.npc_id, world.planet.id, world.planet.defense));
    let Some((npc_id, target_planet_id, defense)) = snapshot else {
        attack.status = MissileStatus::Arrived;
        return;
    };
    let npc_armour = npcs
        .iter()
        .find(|npc| npc.id == npc_id)
        .map_or(0, |npc| npc.technologies.level(TechnologyKind::ArmourTechnology));
    let weapons = player.technologies.level(TechnologyKind::WeaponsTechnology);
    let outcome = simulate_missile_strike(attack.missile_count, &defense, weapons, npc_armour);

    if let Some(world) = universe.npc_world_mut(attack.target) {
        for (kind, lost) in outcome.defense_losses.iter_present() {
            let standing = world.planet.defense.count_mut(kind);
            *standing = standing.saturating_sub(lost);
        }
        let abm = world
            .planet
            .defense
            .count_mut(DefenseKind::AntiBallisticMissile);
        *abm = abm.saturating_sub(outcome.interceptors_used);
    }

    if let Some(npc) = npcs.iter_mut().find(|npc| npc.id == npc_id) {
        npc.record_attack_by(player.id, target_planet_id, at);
        let npc_name = npc.name.clone();
        let relation = npc.relation_mut(player.id);
        let (old_status, new_status) =
            relation.apply_change(ATTACK_PENALTY, ReputationReason::Attack, at, cfg.report_cap);
        let new_reputation = relation.reputation;
        push_diplomatic_report(
            player,
            at,
            npc_id,
            npc_name,
            ReputationReason::Attack,
            ATTACK_PENALTY,
            new_reputation,
            old_status,
            new_status,
            cfg,
        );
    }

    attack.status = if outcome.intercepted == attack.missile_count {
        MissileStatus::Intercepted
    } else {
        MissileStatus::Arrived
    };
    let destroyed = outcome.defense_losses.total();
    let report_id = player.next_id();
    player.mission_reports.push(
        MissionReport {
            id: report_id,
            timestamp: at,
            kind: MissionKind::Attack,
            origin_planet_id: attack.origin_planet_id,
            target: attack.target,
            success: destroyed > 0,
            outcome: MissionOutcome::MissileStrike {
                destroyed,
                intercepted: outcome.intercepted,
            },
        },
        cfg.report_cap,
    );
    events.push(MissionEvent::MissileStrikeResolved {
        attack_id: attack.id,
        intercepted: outcome.intercepted,
    });
}

fn resolve_npc_arrival(
    mission: &mut FleetMission,
    npc_index: usize,
    player: &mut Player,
    universe: &mut Universe,
    npcs: &mut [Npc],
    cfg: &EngineConfig,
    events: &mut Vec<MissionEvent>,
) {
    let at = mission.arrival_time;
    let npc_id = npcs[npc_index].id;
    events.push(MissionEvent::NpcFleetResolved {
        npc_id,
        kind: mission.kind,
    });
    let target_owned = player.planet_at(mission.target).is_some();
    if !target_owned {
        begin_return(mission);
        return;
    }
    match mission.kind {
        MissionKind::Espionage => {
            let npc = &mut npcs[npc_index];
            npc.last_spy_time = Some(at);
            let npc_name = npc.name.clone();
            player.achievements.spied_by_npc += 1;
            notify(
                player,
                at,
                NotificationKind::Spied {
                    npc_id,
                    npc_name,
                    position: mission.target,
                },
                cfg,
            );
            begin_return(mission);
        }
        MissionKind::Attack => {
            npc_attack_player(mission, npc_index, player, universe, npcs, cfg, events);
        }
        _ => {
            // NPC logistics between its own worlds never touch the player
            begin_return(mission);
        }
    }
}

fn npc_attack_player(
    mission: &mut FleetMission,
    npc_index: usize,
    player: &mut Player,
    universe: &mut Universe,
    npcs: &mut [Npc],
    cfg: &EngineConfig,
    events: &mut Vec<MissionEvent>,
) {
    let at = mission.arrival_time;
    let npc = &mut npcs[npc_index];
    let npc_name = npc.name.clone();
    npc.last_attack_time = Some(at);

    let bonuses = BonusSet::from_roster(&player.officers, at);
    let Some(planet) = player.planet_at(mission.target) else {
        begin_return(mission);
        return;
    };
    let defender = Combatant {
        fleet: planet.fleet,
        defense: planet.defense,
        technologies: player.technologies,
        defense_bonus: bonuses.defense,
    };
    let defender_stocks = planet.resources;
    let defender_has_moon = planet.moon.is_some();
    let attacker = Combatant {
        fleet: mission.ships,
        defense: Default::default(),
        technologies: npcs[npc_index].technologies,
        defense_bonus: Fixed::ZERO,
    };
    let outcome = simulate_battle(
        &attacker,
        &defender,
        defender_stocks,
        defender_has_moon,
        mission.seed,
        cfg,
    );

    let moon_id = outcome.moon_formed.then(|| player.next_id());
    if let Some(planet) = player.planet_at_mut(mission.target) {
        planet.fleet = outcome.defender_fleet_remaining;
        let mut standing = outcome.defender_defense_remaining;
        for (kind, restored) in outcome.defender_defense_restored.iter_present() {
            *standing.count_mut(kind) += restored;
        }
        planet.defense = standing;
        planet.resources = planet.resources.saturating_sub(outcome.plunder);
        if let Some(moon_id) = moon_id {
            if planet.moon.is_none() {
                let size =
                    moon_size(outcome.debris_metal.saturating_add(outcome.debris_crystal));
                planet.moon = Some(Moon::new(moon_id, size));
            }
        }
    }
    universe.deposit_debris(
        mission.target,
        outcome.debris_metal,
        outcome.debris_crystal,
        at,
        cfg,
    );

    mission.ships = outcome.attacker_remaining;
    mission.cargo += outcome.plunder;

    let report_id = player.next_id();
    let defender_name = player.name.clone();
    player.battle_reports.push(
        BattleReport {
            id: report_id,
            timestamp: at,
            position: mission.target,
            attacker_name: npc_name,
            defender_name,
            rounds: outcome.rounds,
            winner: outcome.winner,
            attacker_losses: outcome.attacker_losses,
            defender_fleet_losses: outcome.defender_fleet_losses,
            defender_defense_losses: outcome.defender_defense_losses,
            plunder: outcome.plunder,
            debris_metal: outcome.debris_metal,
            debris_crystal: outcome.debris_crystal,
            moon_formed: outcome.moon_formed,
        },
        cfg.report_cap,
    );
    player.achievements.attacked_by_npc += 1;
    if outcome.winner == BattleWinner::Defender {
        player.achievements.defenses_successful += 1;
    }
    if outcome.moon_formed {
        player.achievements.moons_formed += 1;
        notify(
            player,
            at,
            NotificationKind::MoonFormed {
                position: mission.target,
            },
            cfg,
        );
        events.push(MissionEvent::MoonFormed {
            position: mission.target,
        });
    }
    events.push(MissionEvent::BattleResolved {
        position: mission.target,
        winner: outcome.winner,
    });

    if mission.ships.is_empty() {
        mission.status = MissionStatus::Arrived;
    } else {
        begin_return(mission);
    }
}

fn resolve_npc_return(
    mission: FleetMission,
    npc_id: u64,
    universe: &mut Universe,
    events: &mut Vec<MissionEvent>,
) {
    let origin = universe
        .planets
        .values_mut()
        .find(|world| world.npc_id == npc_id && world.planet.id == mission.origin_planet_id);
    if let Some(world) = origin {
        world.planet.fleet.merge(&mission.ships);
        world.planet.resources += mission.cargo;
    }
    events.push(MissionEvent::NpcFleetResolved {
        npc_id,
        kind: mission.kind,
    });
}

#[cfg(test)]
mod tests {
    use crate::catalog::DefenseCounts;
    use crate::npc::{NpcDifficulty, NpcPersonality};

    use super::*;

    const HOUR: i64 = crate::time::MS_PER_HOUR;

    fn test_player() -> Player {
        let mut homeworld = Planet::homeworld(
            1,
            Position::new(1, 42, 8),
            0,
            OreDeposits::default(),
        );
        homeworld.resources = Resources::new(1_000_000, 1_000_000, 1_000_000);
        homeworld.fleet = FleetComposition {
            light_fighter: 200,
            small_cargo: 50,
            large_cargo: 20,
            colony_ship: 2,
            recycler: 10,
            espionage_probe: 10,
            ..FleetComposition::default()
        };
        let mut player = Player::new(1, "Tester", homeworld);
        player
            .technologies
            .set_level(TechnologyKind::ComputerTechnology, 5);
        player
            .technologies
            .set_level(TechnologyKind::Astrophysics, 3);
        player
    }

    fn test_world(npc_id: u64, position: Position) -> crate::universe::NpcWorld {
        let mut planet = Planet::colony(
            900 + npc_id,
            "Outpost".to_owned(),
            position,
            0,
            OreDeposits::default(),
        );
        planet.resources = Resources::new(40_000, 30_000, 10_000);
        planet.defense = DefenseCounts {
            rocket_launcher: 10,
            ..DefenseCounts::default()
        };
        crate::universe::NpcWorld {
            npc_id,
            planet,
        }
    }

    fn setup() -> (Player, Universe, Vec<Npc>, EngineConfig) {
        let player = test_player();
        let mut universe = Universe::new();
        let world = test_world(5, Position::new(1, 42, 10));
        universe.planets.insert(world.planet.position, world);
        let npcs = vec![Npc::new(
            5,
            "Kovar Syndicate",
            NpcDifficulty::Medium,
            NpcPersonality::Trader,
        )];
        (player, universe, npcs, EngineConfig::default())
    }

    fn order(kind: MissionKind, target: Position, ships: FleetComposition, cargo: Resources) -> LaunchOrder {
        LaunchOrder {
            origin_planet_id: 1,
            kind,
            target,
            target_is_moon: false,
            ships,
            cargo,
        }
    }

    #[test]
    fn test_launch_rejects_missing_ships() {
        let (mut player, universe, npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        let err = launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Attack,
                Position::new(1, 42, 10),
                FleetComposition {
                    battleship: 1,
                    ..FleetComposition::default()
                },
                Resources::ZERO,
            ),
            &cfg,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, GameError::FleetUnavailable { .. }));
        assert!(player.fleet_missions.is_empty());
    }

    #[test]
    fn test_launch_rejects_overloaded_cargo() {
        let (mut player, universe, npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        let err = launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Transport,
                Position::new(1, 42, 8),
                FleetComposition {
                    small_cargo: 1,
                    ..FleetComposition::default()
                },
                Resources::new(6_000, 0, 0),
            ),
            &cfg,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, GameError::InvalidInput { ref field, .. } if field == "cargo"));
    }

    #[test]
    fn test_launch_respects_fleet_slots() {
        let (mut player, universe, npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        // Base slot + computer tech 5 = 6 slots
        for _ in 0..6 {
            launch_mission(
                &mut player,
                &universe,
                &npcs,
                &bonuses,
                order(
                    MissionKind::Espionage,
                    Position::new(1, 42, 10),
                    FleetComposition {
                        espionage_probe: 1,
                        ..FleetComposition::default()
                    },
                    Resources::ZERO,
                ),
                &cfg,
                0,
            )
            .unwrap();
        }
        let err = launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Attack,
                Position::new(1, 42, 10),
                FleetComposition {
                    light_fighter: 10,
                    ..FleetComposition::default()
                },
                Resources::ZERO,
            ),
            &cfg,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, GameError::FleetSlotsExhausted { .. }));
    }

    #[test]
    fn test_launch_deducts_ships_cargo_and_fuel() {
        let (mut player, universe, npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        let before = player.planets[0].resources;
        launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Transport,
                Position::new(1, 42, 10),
                FleetComposition {
                    small_cargo: 10,
                    ..FleetComposition::default()
                },
                Resources::new(20_000, 10_000, 0),
            ),
            &cfg,
            0,
        )
        .unwrap();
        let after = player.planets[0].resources;
        assert_eq!(player.planets[0].fleet.small_cargo, 40);
        assert_eq!(before.metal - after.metal, Fixed::from_num(20_000));
        assert_eq!(before.crystal - after.crystal, Fixed::from_num(10_000));
        assert!(after.deuterium < before.deuterium, "fuel must be burned");
        assert_eq!(player.achievements.transport_missions, 1);
    }

    #[test]
    fn test_transport_delivers_and_returns() {
        let (mut player, mut universe, mut npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        let npc_stock_before = universe
            .npc_world(Position::new(1, 42, 10))
            .unwrap()
            .planet
            .resources;
        let id = launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Transport,
                Position::new(1, 42, 10),
                FleetComposition {
                    small_cargo: 10,
                    ..FleetComposition::default()
                },
                Resources::new(5_000, 0, 0),
            ),
            &cfg,
            0,
        )
        .unwrap();
        let mission = player.fleet_missions[0].clone();
        assert_eq!(mission.id, id);

        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, mission.arrival_time);
        let npc_stock_after = universe
            .npc_world(Position::new(1, 42, 10))
            .unwrap()
            .planet
            .resources;
        assert_eq!(
            npc_stock_after.metal - npc_stock_before.metal,
            Fixed::from_num(5_000)
        );
        assert_eq!(player.fleet_missions[0].status, MissionStatus::Returning);

        advance_missions(
            &mut player,
            &mut universe,
            &mut npcs,
            &cfg,
            mission.return_time.unwrap(),
        );
        assert!(player.fleet_missions.is_empty());
        assert_eq!(player.planets[0].fleet.small_cargo, 50);
    }

    #[test]
    fn test_resolution_is_exactly_once() {
        let (mut player, mut universe, mut npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Transport,
                Position::new(1, 42, 10),
                FleetComposition {
                    small_cargo: 10,
                    ..FleetComposition::default()
                },
                Resources::new(5_000, 0, 0),
            ),
            &cfg,
            0,
        )
        .unwrap();
        let arrival = player.fleet_missions[0].arrival_time;
        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, arrival);
        let stock = universe
            .npc_world(Position::new(1, 42, 10))
            .unwrap()
            .planet
            .resources;
        // Same window again: no double delivery
        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, arrival);
        let stock_again = universe
            .npc_world(Position::new(1, 42, 10))
            .unwrap()
            .planet
            .resources;
        assert_eq!(stock, stock_again);
        assert_eq!(player.mission_reports.len(), 1);
    }

    #[test]
    fn test_colonize_founds_planet_with_deposits() {
        let (mut player, mut universe, mut npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        let target = Position::new(1, 50, 5);
        launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Colonize,
                target,
                FleetComposition {
                    colony_ship: 1,
                    ..FleetComposition::default()
                },
                Resources::new(1_000, 500, 0),
            ),
            &cfg,
            0,
        )
        .unwrap();
        let arrival = player.fleet_missions[0].arrival_time;
        let events = advance_missions(&mut player, &mut universe, &mut npcs, &cfg, arrival);
        assert!(events
            .iter()
            .any(|e| matches!(e, MissionEvent::ColonyFounded { .. })));
        assert_eq!(player.planets.len(), 2);
        let colony = player.planet_at(target).unwrap();
        assert!(colony.ore_deposits.is_some());
        assert_eq!(colony.resources.metal, Fixed::from_num(1_000));
        assert_eq!(player.achievements.colonizations, 1);
        // Lone colony ship was consumed; nothing flies home
        assert!(player.fleet_missions.is_empty());
    }

    #[test]
    fn test_colonize_occupied_slot_comes_home() {
        let (mut player, mut universe, mut npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        // Occupied by the NPC outpost
        let target = Position::new(1, 42, 10);
        let err = launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Colonize,
                target,
                FleetComposition {
                    colony_ship: 1,
                    ..FleetComposition::default()
                },
                Resources::ZERO,
            ),
            &cfg,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, GameError::PositionOccupied(_)));

        // A slot that frees up being taken between launch and arrival
        let free = Position::new(1, 60, 6);
        launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Colonize,
                free,
                FleetComposition {
                    colony_ship: 1,
                    ..FleetComposition::default()
                },
                Resources::ZERO,
            ),
            &cfg,
            0,
        )
        .unwrap();
        let world = test_world(5, free);
        universe.planets.insert(free, world);
        let arrival = player.fleet_missions[0].arrival_time;
        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, arrival);
        assert_eq!(player.planets.len(), 1);
        let mission = &player.fleet_missions[0];
        assert_eq!(mission.status, MissionStatus::Returning);
        assert_eq!(mission.ships.colony_ship, 1);
        assert!(!player.mission_reports.latest().unwrap().success);
    }

    #[test]
    fn test_attack_resolves_battle_and_reputation() {
        let (mut player, mut universe, mut npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        let target = Position::new(1, 42, 10);
        launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Attack,
                target,
                FleetComposition {
                    light_fighter: 200,
                    ..FleetComposition::default()
                },
                Resources::ZERO,
            ),
            &cfg,
            0,
        )
        .unwrap();
        let arrival = player.fleet_missions[0].arrival_time;
        let events = advance_missions(&mut player, &mut universe, &mut npcs, &cfg, arrival);

        assert!(events
            .iter()
            .any(|e| matches!(e, MissionEvent::BattleResolved { .. })));
        let report = player.battle_reports.latest().unwrap();
        assert_eq!(report.winner, BattleWinner::Attacker);
        assert!(!report.plunder.is_empty());
        assert_eq!(player.achievements.attacks_won, 1);
        // Reputation drops and the raid is remembered
        let npc = &npcs[0];
        assert_eq!(npc.relation(1).unwrap().reputation, ATTACK_PENALTY);
        assert_eq!(npc.attacked_by.get(&1).unwrap().count, 1);
        // Plundered stocks left the defender
        let world = universe.npc_world(target).unwrap();
        assert!(world.planet.resources.metal < Fixed::from_num(40_000));
        // Survivors fly home with the loot
        let mission = &player.fleet_missions[0];
        assert_eq!(mission.status, MissionStatus::Returning);
        assert!(!mission.cargo.is_empty());
    }

    #[test]
    fn test_espionage_tier_gating_and_penalty() {
        let (mut player, mut universe, mut npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        player
            .technologies
            .set_level(TechnologyKind::EspionageTechnology, 2);
        let target = Position::new(1, 42, 10);
        launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Espionage,
                target,
                FleetComposition {
                    espionage_probe: 2,
                    ..FleetComposition::default()
                },
                Resources::ZERO,
            ),
            &cfg,
            0,
        )
        .unwrap();
        let arrival = player.fleet_missions[0].arrival_time;
        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, arrival);

        let report = player.spy_reports.latest().unwrap();
        assert_eq!(report.npc_id, Some(5));
        assert_eq!(report.resources.metal, Fixed::from_num(40_000));
        // Advantage 2: buildings and fleet visible, defense and tech hidden
        assert!(report.buildings.is_some());
        assert!(report.fleet.is_some());
        assert!(report.defense.is_none());
        assert!(report.technologies.is_none());
        // Probing costs standing either way
        assert!(npcs[0].relation(1).unwrap().reputation < 0);
    }

    #[test]
    fn test_expedition_outcome_is_seeded() {
        let (mut player, mut universe, mut npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        let zone = Position::expedition_zone(1, 42);
        launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Expedition,
                zone,
                FleetComposition {
                    light_fighter: 50,
                    large_cargo: 5,
                    ..FleetComposition::default()
                },
                Resources::ZERO,
            ),
            &cfg,
            0,
        )
        .unwrap();
        let mission = player.fleet_missions[0].clone();
        // Outbound leg, loiter, return leg
        assert!(mission.return_time.unwrap() >= mission.arrival_time + cfg.expedition_hold_ms);
        assert_eq!(
            mission.resolve_time(),
            mission.arrival_time + cfg.expedition_hold_ms
        );

        // Nothing resolves while the fleet is still loitering.
        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, mission.arrival_time);
        assert!(player.mission_reports.latest().is_none());
        assert_eq!(player.fleet_missions[0].status, MissionStatus::Outbound);

        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, mission.resolve_time());
        let report = player.mission_reports.latest().unwrap();
        assert!(matches!(report.outcome, MissionOutcome::Expedition { .. }));
        assert_eq!(report.timestamp, mission.arrival_time + cfg.expedition_hold_ms);
        assert_eq!(player.achievements.expeditions_total, 1);
    }

    #[test]
    fn test_expedition_hazards_and_ambushes_occur() {
        // The outcome table must also hurt: across many seeds the
        // zone claims hulls and springs pirate ambushes, it does not
        // only hand out finds and empty space.
        let dispatched = FleetComposition {
            light_fighter: 40,
            cruiser: 10,
            battleship: 5,
            large_cargo: 5,
            ..FleetComposition::default()
        };
        let mut saw_fleet_loss = false;
        let mut saw_ambush = false;
        for trial in 0..200_u64 {
            let (mut player, mut universe, mut npcs, cfg) = setup();
            player.rng_state = trial;
            player.planets[0].fleet.merge(&dispatched);
            let bonuses = BonusSet::default();
            launch_mission(
                &mut player,
                &universe,
                &npcs,
                &bonuses,
                order(
                    MissionKind::Expedition,
                    Position::expedition_zone(1, 42),
                    dispatched,
                    Resources::ZERO,
                ),
                &cfg,
                0,
            )
            .unwrap();
            let resolve = player.fleet_missions[0].resolve_time();
            advance_missions(&mut player, &mut universe, &mut npcs, &cfg, resolve);

            let report = player.mission_reports.latest().unwrap();
            let MissionOutcome::Expedition { find } = &report.outcome else {
                panic!("expedition report expected");
            };
            let fought = player.achievements.attacks_won + player.achievements.attacks_lost;
            match find {
                ExpeditionFind::FleetLoss { lost } => {
                    saw_fleet_loss = true;
                    assert!(!lost.is_empty());
                    assert!(!report.success);
                    assert!(
                        player.fleet_missions[0].ships.flying_total()
                            < dispatched.flying_total()
                    );
                    assert_eq!(fought, 0);
                }
                ExpeditionFind::Pirates { winner, .. } => {
                    saw_ambush = true;
                    // Decisive ambushes land on the battle counters.
                    match winner {
                        BattleWinner::Draw => assert_eq!(fought, 0),
                        BattleWinner::Attacker => {
                            assert_eq!(player.achievements.attacks_won, 1);
                            assert!(report.success);
                        }
                        BattleWinner::Defender => {
                            assert_eq!(player.achievements.attacks_lost, 1);
                            assert!(!report.success);
                        }
                    }
                }
                _ => assert_eq!(fought, 0),
            }
        }
        assert!(saw_fleet_loss);
        assert!(saw_ambush);
    }

    #[test]
    fn test_recycle_scoops_debris() {
        let (mut player, mut universe, mut npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        let site = Position::new(1, 42, 9);
        universe.deposit_debris(site, Fixed::from_num(30_000), Fixed::from_num(12_000), 0, &cfg);
        launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Recycle,
                site,
                FleetComposition {
                    recycler: 1,
                    ..FleetComposition::default()
                },
                Resources::ZERO,
            ),
            &cfg,
            0,
        )
        .unwrap();
        let arrival = player.fleet_missions[0].arrival_time;
        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, arrival);
        // One recycler holds 20000: all the metal was scooped first
        let mission = &player.fleet_missions[0];
        assert_eq!(mission.cargo.metal, Fixed::from_num(20_000));
        let field = universe.debris_at(site).unwrap();
        assert_eq!(field.metal, Fixed::from_num(10_000));
        assert_eq!(player.achievements.recycled_resources, 20_000);
    }

    #[test]
    fn test_gift_buys_reputation() {
        let (mut player, mut universe, mut npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        let target = Position::new(1, 42, 10);
        launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Gift { npc_id: 5 },
                target,
                FleetComposition {
                    large_cargo: 2,
                    ..FleetComposition::default()
                },
                Resources::new(20_000, 5_000, 0),
            ),
            &cfg,
            0,
        )
        .unwrap();
        let arrival = player.fleet_missions[0].arrival_time;
        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, arrival);
        // 25000 / 2500 = 10 reputation
        assert_eq!(npcs[0].relation(1).unwrap().reputation, 10);
        assert!(player
            .notifications
            .iter()
            .any(|n| matches!(n.kind, NotificationKind::GiftAccepted { reputation_gain: 10, .. })));
        // Cargo was handed over; the fleet flies home empty
        assert!(player.fleet_missions[0].cargo.is_empty());
        assert_eq!(player.achievements.gifts_sent, 1);
    }

    #[test]
    fn test_small_gift_is_refused_and_returned() {
        let (mut player, mut universe, mut npcs, cfg) = setup();
        let bonuses = BonusSet::default();
        launch_mission(
            &mut player,
            &universe,
            &npcs,
            &bonuses,
            order(
                MissionKind::Gift { npc_id: 5 },
                Position::new(1, 42, 10),
                FleetComposition {
                    small_cargo: 1,
                    ..FleetComposition::default()
                },
                Resources::new(500, 0, 0),
            ),
            &cfg,
            0,
        )
        .unwrap();
        let arrival = player.fleet_missions[0].arrival_time;
        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, arrival);
        assert!(npcs[0].relation(1).is_none());
        assert!(player
            .notifications
            .iter()
            .any(|n| matches!(
                n.kind,
                NotificationKind::GiftRejected {
                    reason: GiftRejection::TooSmall,
                    ..
                }
            )));
        // The refused cargo rides home
        assert_eq!(player.fleet_missions[0].cargo.metal, Fixed::from_num(500));
    }

    #[test]
    fn test_missiles_fly_and_strike() {
        let (mut player, mut universe, mut npcs, cfg) = setup();
        player.planets[0].defense.interplanetary_missile = 6;
        let target = Position::new(1, 42, 10);
        let id = launch_missiles(
            &mut player,
            &universe,
            MissileOrder {
                origin_planet_id: 1,
                target,
                missile_count: 4,
            },
            &cfg,
            0,
        )
        .unwrap();
        assert_eq!(player.planets[0].defense.interplanetary_missile, 2);
        let arrival = player.missile_attacks[0].arrival_time;
        let events = advance_missions(&mut player, &mut universe, &mut npcs, &cfg, arrival);
        assert!(events
            .iter()
            .any(|e| matches!(e, MissionEvent::MissileStrikeResolved { attack_id, .. } if *attack_id == id)));
        // Salvo resolved and archived
        assert!(player.missile_attacks.is_empty());
        // Rockets died and the strike soured relations
        let world = universe.npc_world(target).unwrap();
        assert!(world.planet.defense.rocket_launcher < 10);
        assert_eq!(npcs[0].relation(1).unwrap().reputation, ATTACK_PENALTY);
    }

    #[test]
    fn test_npc_raid_alerts_and_resolves() {
        let (mut player, mut universe, mut npcs, cfg) = setup();
        player.planets[0].defense = DefenseCounts {
            rocket_launcher: 300,
            light_laser: 120,
            ..DefenseCounts::default()
        };
        let raid = FleetMission {
            id: 9_001,
            kind: MissionKind::Attack,
            status: MissionStatus::Outbound,
            origin_planet_id: 905,
            target: Position::new(1, 42, 8),
            target_is_moon: false,
            ships: FleetComposition {
                light_fighter: 30,
                ..FleetComposition::default()
            },
            cargo: Resources::ZERO,
            dark_matter_cargo: Fixed::ZERO,
            departure_time: 0,
            arrival_time: 2 * HOUR,
            return_time: Some(4 * HOUR),
            seed: 77,
            npc_id: Some(5),
            announced: false,
        };
        npcs[0].fleet_missions.push(raid);

        // Before arrival: the player is warned once
        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, HOUR);
        let warnings = player
            .notifications
            .iter()
            .filter(|n| matches!(n.kind, NotificationKind::IncomingFleet { hostile: true, .. }))
            .count();
        assert_eq!(warnings, 1);
        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, HOUR);
        let warnings_again = player
            .notifications
            .iter()
            .filter(|n| matches!(n.kind, NotificationKind::IncomingFleet { .. }))
            .count();
        assert_eq!(warnings_again, 1);

        // Arrival: the wall holds
        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, 2 * HOUR);
        assert_eq!(player.achievements.attacked_by_npc, 1);
        assert_eq!(player.achievements.defenses_successful, 1);
        let report = player.battle_reports.latest().unwrap();
        assert_eq!(report.winner, BattleWinner::Defender);
        assert_eq!(report.attacker_name, "Kovar Syndicate");
        // The raiders were wiped out; nothing returns
        assert!(npcs[0].fleet_missions.is_empty());
    }

    #[test]
    fn test_npc_spy_visit_notifies_player() {
        let (mut player, mut universe, mut npcs, cfg) = setup();
        npcs[0].fleet_missions.push(FleetMission {
            id: 9_002,
            kind: MissionKind::Espionage,
            status: MissionStatus::Outbound,
            origin_planet_id: 905,
            target: Position::new(1, 42, 8),
            target_is_moon: false,
            ships: FleetComposition {
                espionage_probe: 1,
                ..FleetComposition::default()
            },
            cargo: Resources::ZERO,
            dark_matter_cargo: Fixed::ZERO,
            departure_time: 0,
            arrival_time: HOUR,
            return_time: Some(2 * HOUR),
            seed: 3,
            npc_id: Some(5),
            announced: false,
        });
        advance_missions(&mut player, &mut universe, &mut npcs, &cfg, HOUR);
        assert_eq!(player.achievements.spied_by_npc, 1);
        assert!(player
            .notifications
            .iter()
            .any(|n| matches!(n.kind, NotificationKind::Spied { npc_id: 5, .. })));
        assert_eq!(npcs[0].last_spy_time, Some(HOUR));
    }

    #[test]
    fn test_catch_up_matches_stepwise_resolution() {
        let make = || {
            let (mut player, mut universe, mut npcs, cfg) = setup();
            let bonuses = BonusSet::default();
            launch_mission(
                &mut player,
                &universe,
                &npcs,
                &bonuses,
                order(
                    MissionKind::Transport,
                    Position::new(1, 42, 10),
                    FleetComposition {
                        small_cargo: 5,
                        ..FleetComposition::default()
                    },
                    Resources::new(2_000, 0, 0),
                ),
                &cfg,
                0,
            )
            .unwrap();
            launch_mission(
                &mut player,
                &universe,
                &npcs,
                &bonuses,
                order(
                    MissionKind::Attack,
                    Position::new(1, 42, 10),
                    FleetComposition {
                        light_fighter: 100,
                        ..FleetComposition::default()
                    },
                    Resources::ZERO,
                ),
                &cfg,
                1_000,
            )
            .unwrap();
            (player, universe, npcs, cfg)
        };

        let (mut stepped, mut stepped_universe, mut stepped_npcs, cfg) = make();
        let horizon = 12 * HOUR;
        let mut cursor = 0;
        while cursor < horizon {
            cursor += 17 * 60 * 1_000;
            advance_missions(
                &mut stepped,
                &mut stepped_universe,
                &mut stepped_npcs,
                &cfg,
                cursor.min(horizon),
            );
        }

        let (mut jumped, mut jumped_universe, mut jumped_npcs, _) = make();
        advance_missions(&mut jumped, &mut jumped_universe, &mut jumped_npcs, &cfg, horizon);

        assert_eq!(stepped.planets[0].fleet, jumped.planets[0].fleet);
        assert_eq!(stepped.planets[0].resources, jumped.planets[0].resources);
        assert_eq!(stepped.fleet_missions, jumped.fleet_missions);
        assert_eq!(
            stepped_universe.npc_world(Position::new(1, 42, 10)),
            jumped_universe.npc_world(Position::new(1, 42, 10))
        );
        assert_eq!(
            stepped_npcs[0].relation(1).map(|r| r.reputation),
            jumped_npcs[0].relation(1).map(|r| r.reputation)
        );
    }
}
