//! Construction, unit, and research queues.
//!
//! Active queues run serially: each item starts when its predecessor
//! ends. Queue depth is limited; orders past the limit land in a
//! waiting queue and are promoted, re-validated, and paid for when a
//! slot frees up. Waiting orders cost nothing until they promote, so
//! a promotion that can no longer be afforded or justified is skipped
//! rather than silently forced through.

use serde::{Deserialize, Serialize};

use crate::catalog::{
    check_requirements, BuildingKind, DefenseKind, ShipKind, TechnologyKind, TechnologyLevels,
};
use crate::config::EngineConfig;
use crate::error::{GameError, Result};
use crate::math::{pow_growth, Fixed};
use crate::officers::BonusSet;
use crate::planet::Planet;
use crate::player::Player;
use crate::resources::Resources;
use crate::time::Timestamp;

// ============================================================================
// Queue items
// ============================================================================

/// What a queue item is building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueueTarget {
    /// Upgrade a building to a level.
    #[serde(rename_all = "camelCase")]
    Building {
        /// Building under construction.
        kind: BuildingKind,
        /// Level reached on completion.
        target_level: u32,
    },
    /// Research a technology to a level.
    #[serde(rename_all = "camelCase")]
    Technology {
        /// Technology under research.
        kind: TechnologyKind,
        /// Level reached on completion.
        target_level: u32,
    },
    /// Build a batch of ships.
    #[serde(rename_all = "camelCase")]
    Ship {
        /// Hull under construction.
        kind: ShipKind,
        /// Batch size.
        quantity: u32,
    },
    /// Build a batch of defensive installations.
    #[serde(rename_all = "camelCase")]
    Defense {
        /// Installation under construction.
        kind: DefenseKind,
        /// Batch size.
        quantity: u32,
    },
}

impl QueueTarget {
    /// What completing this item costs up front.
    #[must_use]
    pub fn cost(&self) -> Resources {
        match *self {
            Self::Building { kind, target_level } => kind.cost(target_level),
            Self::Technology { kind, target_level } => kind.cost(target_level),
            Self::Ship { kind, quantity } => kind.cost().scale(Fixed::from_num(quantity)),
            Self::Defense { kind, quantity } => kind.cost().scale(Fixed::from_num(quantity)),
        }
    }
}

/// An order in an active queue, scheduled on the serial chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildQueueItem {
    /// Monotonic per-player id.
    pub id: u64,
    /// What is being built.
    pub target: QueueTarget,
    /// When work begins.
    pub start_time: Timestamp,
    /// When the order completes.
    pub end_time: Timestamp,
}

/// An order parked until the active queue has room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingQueueItem {
    /// Monotonic per-player id.
    pub id: u64,
    /// What will be built once promoted.
    pub target: QueueTarget,
    /// Higher promotes first.
    pub priority: u32,
    /// Enqueue time; breaks priority ties, oldest first.
    pub added_time: Timestamp,
    /// Planet that pays on promotion. Research orders need this;
    /// building orders are paid by the planet that owns the queue.
    pub planet_id: Option<u64>,
}

/// Where an enqueue landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuePlacement {
    /// Scheduled on the active queue; paid for.
    Active {
        /// Item id.
        id: u64,
        /// Scheduled completion.
        end_time: Timestamp,
    },
    /// Parked in the waiting queue; not yet paid for.
    Waiting {
        /// Item id.
        id: u64,
    },
}

/// Something a queue pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueEvent {
    /// A building reached a new level.
    BuildingCompleted {
        /// Finished building.
        kind: BuildingKind,
        /// New level.
        level: u32,
    },
    /// A technology reached a new level.
    TechnologyCompleted {
        /// Finished technology.
        kind: TechnologyKind,
        /// New level.
        level: u32,
    },
    /// A ship batch rolled off the line.
    ShipsCompleted {
        /// Hull built.
        kind: ShipKind,
        /// Batch size.
        quantity: u32,
    },
    /// A defense batch was installed.
    DefenseCompleted {
        /// Installation built.
        kind: DefenseKind,
        /// Batch size.
        quantity: u32,
    },
    /// A waiting order moved onto the active queue and was paid for.
    ItemPromoted {
        /// Promoted item id.
        id: u64,
        /// What it will build.
        target: QueueTarget,
    },
    /// A waiting order could not be promoted and stays parked.
    PromotionSkipped {
        /// Skipped item id.
        id: u64,
        /// Why promotion failed.
        reason: String,
    },
}

// ============================================================================
// Timing
// ============================================================================

/// Construction time for a building of the given cost.
#[must_use]
pub fn build_duration_ms(
    cost: Resources,
    robotics: u32,
    nanite: u32,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
) -> i64 {
    let hours = cost.metal.saturating_add(cost.crystal)
        / Fixed::from_num(2_500)
        / Fixed::from_num(i64::from(robotics) + 1)
        / pow_growth(Fixed::from_num(2), nanite)
        / Fixed::from_num(cfg.universe_speed)
        / (Fixed::ONE + bonuses.building_speed);
    clamp_duration(hours, cfg)
}

/// Research time for a technology of the given cost.
#[must_use]
pub fn research_duration_ms(
    cost: Resources,
    lab_level: u32,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
) -> i64 {
    let hours = cost.metal.saturating_add(cost.crystal)
        / Fixed::from_num(1_000)
        / Fixed::from_num(i64::from(lab_level) + 1)
        / Fixed::from_num(cfg.universe_speed)
        / (Fixed::ONE + bonuses.research_speed);
    clamp_duration(hours, cfg)
}

/// Production time for a batch of ships or defenses.
#[must_use]
pub fn unit_duration_ms(
    unit_cost: Resources,
    quantity: u32,
    shipyard: u32,
    nanite: u32,
    cfg: &EngineConfig,
) -> i64 {
    let hours = unit_cost.metal.saturating_add(unit_cost.crystal)
        / Fixed::from_num(5_000)
        / Fixed::from_num(i64::from(shipyard) + 1)
        / pow_growth(Fixed::from_num(2), nanite)
        / Fixed::from_num(cfg.universe_speed);
    let per_unit = clamp_duration(hours, cfg);
    per_unit
        .saturating_mul(i64::from(quantity))
        .max(cfg.min_build_ms)
}

fn clamp_duration(hours: Fixed, cfg: &EngineConfig) -> i64 {
    let seconds = hours.saturating_mul_int(3_600);
    seconds
        .to_num::<i64>()
        .saturating_mul(1_000)
        .max(cfg.min_build_ms)
}

/// Concurrent queue depth a player commands.
#[must_use]
pub fn queue_capacity(bonuses: &BonusSet, cfg: &EngineConfig) -> usize {
    (cfg.base_queue_slots + bonuses.extra_build_queue) as usize
}

/// When the serial chain has room for a new start.
fn chain_tail(queue: &[BuildQueueItem], now: Timestamp) -> Timestamp {
    queue.last().map_or(now, |item| item.end_time.max(now))
}

/// Pull forward items whose predecessors vanished, keeping durations.
fn rechain(queue: &mut [BuildQueueItem], now: Timestamp) {
    let mut cursor = now;
    for item in queue {
        if item.start_time > cursor {
            let duration = item.end_time - item.start_time;
            item.start_time = cursor;
            item.end_time = cursor + duration;
        }
        cursor = item.end_time;
    }
}

// ============================================================================
// Planet-side enqueue
// ============================================================================

/// Queue a building upgrade on a planet.
///
/// The target level stacks on top of upgrades already queued for the
/// same building. With the active queue at depth, the order parks in
/// the waiting queue unpaid; requirement checks are then deferred to
/// promotion, which allows queuing ahead of a prerequisite that is
/// itself still under construction.
pub fn enqueue_building(
    planet: &mut Planet,
    kind: BuildingKind,
    technologies: &TechnologyLevels,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
    now: Timestamp,
    next_id: &mut u64,
) -> Result<QueuePlacement> {
    if kind.moon_only() {
        return Err(GameError::InvalidInput {
            field: "building".to_owned(),
            message: format!("{} can only be built on a moon", kind.name()),
        });
    }
    let target_level = next_building_level(planet, kind);
    let target = QueueTarget::Building { kind, target_level };
    if planet.build_queue.len() >= queue_capacity(bonuses, cfg) {
        return Ok(park(&mut planet.waiting_build_queue, target, now, None, next_id));
    }
    validate_building(planet, kind, technologies)?;
    let cost = target.cost();
    planet.resources.checked_spend(cost)?;
    let duration = build_duration_ms(
        cost,
        planet.buildings.level(BuildingKind::RoboticsFactory),
        planet.buildings.level(BuildingKind::NaniteFactory),
        bonuses,
        cfg,
    );
    Ok(schedule(&mut planet.build_queue, target, duration, now, next_id))
}

/// Queue a batch of ships on a planet's shipyard.
pub fn enqueue_ship_order(
    planet: &mut Planet,
    kind: ShipKind,
    quantity: u32,
    technologies: &TechnologyLevels,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
    now: Timestamp,
    next_id: &mut u64,
) -> Result<QueuePlacement> {
    require_positive_quantity(quantity)?;
    let target = QueueTarget::Ship { kind, quantity };
    if planet.build_queue.len() >= queue_capacity(bonuses, cfg) {
        return Ok(park(&mut planet.waiting_build_queue, target, now, None, next_id));
    }
    check_requirements(kind.requirements(), &planet.buildings, technologies)
        .map_err(GameError::RequirementNotMet)?;
    let cost = target.cost();
    planet.resources.checked_spend(cost)?;
    let duration = unit_duration_ms(
        kind.cost(),
        quantity,
        planet.buildings.level(BuildingKind::Shipyard),
        planet.buildings.level(BuildingKind::NaniteFactory),
        cfg,
    );
    Ok(schedule(&mut planet.build_queue, target, duration, now, next_id))
}

/// Queue a batch of defensive installations.
pub fn enqueue_defense_order(
    planet: &mut Planet,
    kind: DefenseKind,
    quantity: u32,
    technologies: &TechnologyLevels,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
    now: Timestamp,
    next_id: &mut u64,
) -> Result<QueuePlacement> {
    require_positive_quantity(quantity)?;
    validate_defense(planet, kind, quantity)?;
    let target = QueueTarget::Defense { kind, quantity };
    if planet.build_queue.len() >= queue_capacity(bonuses, cfg) {
        return Ok(park(&mut planet.waiting_build_queue, target, now, None, next_id));
    }
    check_requirements(kind.requirements(), &planet.buildings, technologies)
        .map_err(GameError::RequirementNotMet)?;
    let cost = target.cost();
    planet.resources.checked_spend(cost)?;
    let duration = unit_duration_ms(
        kind.cost(),
        quantity,
        planet.buildings.level(BuildingKind::Shipyard),
        planet.buildings.level(BuildingKind::NaniteFactory),
        cfg,
    );
    Ok(schedule(&mut planet.build_queue, target, duration, now, next_id))
}

/// Cancel an active or waiting order on a planet, or an order on its
/// moon.
///
/// Active orders refund their full cost; waiting orders never paid.
/// Later orders on the chain are pulled forward. Moon orders refund to
/// the parent planet, which paid for them.
pub fn cancel_planet_item(planet: &mut Planet, id: u64, now: Timestamp) -> Result<()> {
    if let Some(index) = planet.build_queue.iter().position(|item| item.id == id) {
        let item = planet.build_queue.remove(index);
        planet.resources += item.target.cost();
        rechain(&mut planet.build_queue, now);
        return Ok(());
    }
    if let Some(index) = planet
        .waiting_build_queue
        .iter()
        .position(|item| item.id == id)
    {
        planet.waiting_build_queue.remove(index);
        return Ok(());
    }
    if let Some(moon) = planet.moon.as_mut() {
        if let Some(index) = moon.build_queue.iter().position(|item| item.id == id) {
            let item = moon.build_queue.remove(index);
            rechain(&mut moon.build_queue, now);
            planet.resources += item.target.cost();
            return Ok(());
        }
    }
    Err(GameError::InvalidInput {
        field: "queueItemId".to_owned(),
        message: format!("no queued order with id {id}"),
    })
}

/// Complete due orders and promote waiting ones on a planet.
pub fn advance_build_queue(
    planet: &mut Planet,
    technologies: &TechnologyLevels,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Vec<QueueEvent> {
    let mut events = Vec::new();
    loop {
        while planet
            .build_queue
            .first()
            .is_some_and(|item| item.end_time <= now)
        {
            let item = planet.build_queue.remove(0);
            match item.target {
                QueueTarget::Building { kind, target_level } => {
                    let level = target_level.max(planet.buildings.level(kind));
                    planet.buildings.set_level(kind, level);
                    events.push(QueueEvent::BuildingCompleted { kind, level });
                }
                QueueTarget::Ship { kind, quantity } => {
                    *planet.fleet.count_mut(kind) += quantity;
                    events.push(QueueEvent::ShipsCompleted { kind, quantity });
                }
                QueueTarget::Defense { kind, quantity } => {
                    *planet.defense.count_mut(kind) += quantity;
                    events.push(QueueEvent::DefenseCompleted { kind, quantity });
                }
                QueueTarget::Technology { .. } => {
                    tracing::warn!(item = item.id, "technology order on a planet queue dropped");
                }
            }
        }
        if planet.build_queue.len() >= queue_capacity(bonuses, cfg)
            || planet.waiting_build_queue.is_empty()
        {
            break;
        }
        if !promote_planet_item(planet, technologies, bonuses, cfg, now, &mut events) {
            break;
        }
    }
    events
}

/// Try to move the best waiting order onto a planet's active queue.
///
/// Candidates are re-validated and paid for at promotion time; the
/// ones that fail stay parked and the next candidate gets its turn.
/// Returns whether anything was promoted.
fn promote_planet_item(
    planet: &mut Planet,
    technologies: &TechnologyLevels,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
    now: Timestamp,
    events: &mut Vec<QueueEvent>,
) -> bool {
    let mut candidates = planet.waiting_build_queue.clone();
    candidates.sort_by_key(|item| (u32::MAX - item.priority, item.added_time, item.id));
    for parked in candidates {
        match promote_on_planet(planet, &parked, technologies, bonuses, cfg, now) {
            Ok(target) => {
                planet
                    .waiting_build_queue
                    .retain(|item| item.id != parked.id);
                events.push(QueueEvent::ItemPromoted {
                    id: parked.id,
                    target,
                });
                return true;
            }
            Err(error) => {
                events.push(QueueEvent::PromotionSkipped {
                    id: parked.id,
                    reason: error.to_string(),
                });
            }
        }
    }
    false
}

/// Validate, pay, and schedule one parked order. Building targets are
/// re-leveled against the current state so stacked upgrades stay
/// consistent no matter what completed in the meantime.
fn promote_on_planet(
    planet: &mut Planet,
    parked: &WaitingQueueItem,
    technologies: &TechnologyLevels,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Result<QueueTarget> {
    let target = match parked.target {
        QueueTarget::Building { kind, .. } => QueueTarget::Building {
            kind,
            target_level: next_building_level(planet, kind),
        },
        other => other,
    };
    let duration = match target {
        QueueTarget::Building { kind, .. } => {
            validate_building(planet, kind, technologies)?;
            build_duration_ms(
                target.cost(),
                planet.buildings.level(BuildingKind::RoboticsFactory),
                planet.buildings.level(BuildingKind::NaniteFactory),
                bonuses,
                cfg,
            )
        }
        QueueTarget::Ship { kind, quantity } => {
            check_requirements(kind.requirements(), &planet.buildings, technologies)
                .map_err(GameError::RequirementNotMet)?;
            unit_duration_ms(
                kind.cost(),
                quantity,
                planet.buildings.level(BuildingKind::Shipyard),
                planet.buildings.level(BuildingKind::NaniteFactory),
                cfg,
            )
        }
        QueueTarget::Defense { kind, quantity } => {
            validate_defense(planet, kind, quantity)?;
            check_requirements(kind.requirements(), &planet.buildings, technologies)
                .map_err(GameError::RequirementNotMet)?;
            unit_duration_ms(
                kind.cost(),
                quantity,
                planet.buildings.level(BuildingKind::Shipyard),
                planet.buildings.level(BuildingKind::NaniteFactory),
                cfg,
            )
        }
        QueueTarget::Technology { .. } => {
            return Err(GameError::InvalidInput {
                field: "target".to_owned(),
                message: "research orders cannot promote onto a planet queue".to_owned(),
            })
        }
    };
    planet.resources.checked_spend(target.cost())?;
    let start = chain_tail(&planet.build_queue, now);
    planet.build_queue.push(BuildQueueItem {
        id: parked.id,
        target,
        start_time: start,
        end_time: start + duration,
    });
    Ok(target)
}

// ============================================================================
// Moon-side enqueue
// ============================================================================

/// Queue a building on a planet's moon.
///
/// The parent planet pays, since moons hold no stocks of their own.
/// Moon queues have no waiting queue; a full queue rejects the order.
pub fn enqueue_moon_building(
    planet: &mut Planet,
    kind: BuildingKind,
    technologies: &TechnologyLevels,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
    now: Timestamp,
    next_id: &mut u64,
) -> Result<QueuePlacement> {
    if !kind.buildable_on_moon() {
        return Err(GameError::InvalidInput {
            field: "building".to_owned(),
            message: format!("{} cannot be built on a moon", kind.name()),
        });
    }
    let moon = planet.moon.as_mut().ok_or_else(|| GameError::InvalidInput {
        field: "planetId".to_owned(),
        message: "planet has no moon".to_owned(),
    })?;
    let capacity = queue_capacity(bonuses, cfg);
    if moon.build_queue.len() >= capacity {
        return Err(GameError::QueueFull { capacity });
    }
    check_requirements(kind.requirements(), &moon.buildings, technologies)
        .map_err(GameError::RequirementNotMet)?;
    let queued = moon.build_queue.len() as u32;
    if queued >= moon.free_fields() {
        return Err(GameError::RequirementNotMet(format!(
            "no free fields on {}",
            moon.name
        )));
    }
    let mut target_level = moon.buildings.level(kind);
    for item in &moon.build_queue {
        if let QueueTarget::Building {
            kind: on_queue,
            target_level: queued_level,
        } = item.target
        {
            if on_queue == kind {
                target_level = target_level.max(queued_level);
            }
        }
    }
    let target = QueueTarget::Building {
        kind,
        target_level: target_level + 1,
    };
    let cost = target.cost();
    let duration = build_duration_ms(
        cost,
        moon.buildings.level(BuildingKind::RoboticsFactory),
        0,
        bonuses,
        cfg,
    );
    planet.resources.checked_spend(cost)?;
    Ok(schedule(&mut moon.build_queue, target, duration, now, next_id))
}

/// Complete due orders on a planet's moon.
pub fn advance_moon_queue(planet: &mut Planet, now: Timestamp) -> Vec<QueueEvent> {
    let mut events = Vec::new();
    let Some(moon) = planet.moon.as_mut() else {
        return events;
    };
    while moon
        .build_queue
        .first()
        .is_some_and(|item| item.end_time <= now)
    {
        let item = moon.build_queue.remove(0);
        if let QueueTarget::Building { kind, target_level } = item.target {
            let level = target_level.max(moon.buildings.level(kind));
            moon.buildings.set_level(kind, level);
            events.push(QueueEvent::BuildingCompleted { kind, level });
        } else {
            tracing::warn!(item = item.id, "non-building order on a moon queue dropped");
        }
    }
    events
}

// ============================================================================
// Research enqueue
// ============================================================================

/// Queue a technology for research, paid by one of the player's
/// planets and run in that planet's research lab.
pub fn enqueue_research(
    player: &mut Player,
    planet_id: u64,
    kind: TechnologyKind,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Result<QueuePlacement> {
    let target_level = next_technology_level(player, kind);
    let target = QueueTarget::Technology { kind, target_level };
    if player.research_queue.len() >= queue_capacity(bonuses, cfg) {
        let mut next_id = player.id_seq;
        let placement = park(
            &mut player.waiting_research_queue,
            target,
            now,
            Some(planet_id),
            &mut next_id,
        );
        player.id_seq = next_id;
        return Ok(placement);
    }
    let technologies = player.technologies;
    let planet = player
        .planet_mut(planet_id)
        .ok_or(GameError::PlanetNotFound(planet_id))?;
    check_requirements(kind.requirements(), &planet.buildings, &technologies)
        .map_err(GameError::RequirementNotMet)?;
    let cost = target.cost();
    planet.resources.checked_spend(cost)?;
    let lab = planet.buildings.level(BuildingKind::ResearchLab);
    let duration = research_duration_ms(cost, lab, bonuses, cfg);
    let mut next_id = player.id_seq;
    let placement = schedule(&mut player.research_queue, target, duration, now, &mut next_id);
    player.id_seq = next_id;
    Ok(placement)
}

/// Cancel an active or waiting research order, refunding to a planet.
pub fn cancel_research_item(
    player: &mut Player,
    id: u64,
    refund_planet_id: u64,
    now: Timestamp,
) -> Result<()> {
    if let Some(index) = player.research_queue.iter().position(|item| item.id == id) {
        let item = player.research_queue.remove(index);
        rechain(&mut player.research_queue, now);
        let planet = player
            .planet_mut(refund_planet_id)
            .ok_or(GameError::PlanetNotFound(refund_planet_id))?;
        planet.resources += item.target.cost();
        return Ok(());
    }
    if let Some(index) = player
        .waiting_research_queue
        .iter()
        .position(|item| item.id == id)
    {
        player.waiting_research_queue.remove(index);
        return Ok(());
    }
    Err(GameError::InvalidInput {
        field: "queueItemId".to_owned(),
        message: format!("no queued research with id {id}"),
    })
}

/// Complete due research and promote waiting orders.
pub fn advance_research_queue(
    player: &mut Player,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Vec<QueueEvent> {
    let mut events = Vec::new();
    loop {
        while player
            .research_queue
            .first()
            .is_some_and(|item| item.end_time <= now)
        {
            let item = player.research_queue.remove(0);
            if let QueueTarget::Technology { kind, target_level } = item.target {
                let level = target_level.max(player.technologies.level(kind));
                player.technologies.set_level(kind, level);
                events.push(QueueEvent::TechnologyCompleted { kind, level });
            } else {
                tracing::warn!(item = item.id, "non-research order on the research queue dropped");
            }
        }
        if player.research_queue.len() >= queue_capacity(bonuses, cfg)
            || player.waiting_research_queue.is_empty()
        {
            break;
        }
        if !promote_research_item(player, bonuses, cfg, now, &mut events) {
            break;
        }
    }
    events
}

fn promote_research_item(
    player: &mut Player,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
    now: Timestamp,
    events: &mut Vec<QueueEvent>,
) -> bool {
    let mut candidates = player.waiting_research_queue.clone();
    candidates.sort_by_key(|item| (u32::MAX - item.priority, item.added_time, item.id));
    for parked in candidates {
        match promote_research(player, &parked, bonuses, cfg, now) {
            Ok(target) => {
                player
                    .waiting_research_queue
                    .retain(|item| item.id != parked.id);
                events.push(QueueEvent::ItemPromoted {
                    id: parked.id,
                    target,
                });
                return true;
            }
            Err(error) => {
                events.push(QueueEvent::PromotionSkipped {
                    id: parked.id,
                    reason: error.to_string(),
                });
            }
        }
    }
    false
}

fn promote_research(
    player: &mut Player,
    parked: &WaitingQueueItem,
    bonuses: &BonusSet,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Result<QueueTarget> {
    let QueueTarget::Technology { kind, .. } = parked.target else {
        return Err(GameError::InvalidInput {
            field: "target".to_owned(),
            message: "only research orders can promote onto the research queue".to_owned(),
        });
    };
    let planet_id = parked.planet_id.ok_or_else(|| GameError::InvalidInput {
        field: "planetId".to_owned(),
        message: "waiting research order lost its paying planet".to_owned(),
    })?;
    let target = QueueTarget::Technology {
        kind,
        target_level: next_technology_level(player, kind),
    };
    let technologies = player.technologies;
    let planet = player
        .planet_mut(planet_id)
        .ok_or(GameError::PlanetNotFound(planet_id))?;
    check_requirements(kind.requirements(), &planet.buildings, &technologies)
        .map_err(GameError::RequirementNotMet)?;
    let cost = target.cost();
    planet.resources.checked_spend(cost)?;
    let lab = planet.buildings.level(BuildingKind::ResearchLab);
    let duration = research_duration_ms(cost, lab, bonuses, cfg);
    let start = chain_tail(&player.research_queue, now);
    player.research_queue.push(BuildQueueItem {
        id: parked.id,
        target,
        start_time: start,
        end_time: start + duration,
    });
    Ok(target)
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Next level for a building, stacking on upgrades already queued.
fn next_building_level(planet: &Planet, kind: BuildingKind) -> u32 {
    let mut level = planet.buildings.level(kind);
    for item in &planet.build_queue {
        if let QueueTarget::Building {
            kind: queued,
            target_level,
        } = item.target
        {
            if queued == kind {
                level = level.max(target_level);
            }
        }
    }
    level + 1
}

/// Next level for a technology, stacking on queued research.
fn next_technology_level(player: &Player, kind: TechnologyKind) -> u32 {
    let mut level = player.technologies.level(kind);
    for item in &player.research_queue {
        if let QueueTarget::Technology {
            kind: queued,
            target_level,
        } = item.target
        {
            if queued == kind {
                level = level.max(target_level);
            }
        }
    }
    level + 1
}

fn validate_building(
    planet: &Planet,
    kind: BuildingKind,
    technologies: &TechnologyLevels,
) -> Result<()> {
    check_requirements(kind.requirements(), &planet.buildings, technologies)
        .map_err(GameError::RequirementNotMet)?;
    let queued = planet
        .build_queue
        .iter()
        .filter(|item| matches!(item.target, QueueTarget::Building { .. }))
        .count() as u32;
    if planet.used_fields() + queued >= planet.field_capacity() {
        return Err(GameError::RequirementNotMet(format!(
            "no free fields on {}",
            planet.name
        )));
    }
    Ok(())
}

fn validate_defense(planet: &Planet, kind: DefenseKind, quantity: u32) -> Result<()> {
    if kind.unique_per_planet() {
        let queued: u32 = planet
            .build_queue
            .iter()
            .filter_map(|item| match item.target {
                QueueTarget::Defense {
                    kind: queued,
                    quantity,
                } if queued == kind => Some(quantity),
                _ => None,
            })
            .sum();
        if planet.defense.count(kind) + queued + quantity > 1 {
            return Err(GameError::RequirementNotMet(format!(
                "{} is unique per planet",
                kind.name()
            )));
        }
    }
    if kind.is_missile() {
        let silo = planet.buildings.level(BuildingKind::MissileSilo);
        let capacity = silo * 10;
        let slots = |kind: DefenseKind, count: u32| match kind {
            DefenseKind::InterplanetaryMissile => count * 2,
            _ => count,
        };
        let mut used = slots(
            DefenseKind::AntiBallisticMissile,
            planet.defense.count(DefenseKind::AntiBallisticMissile),
        ) + slots(
            DefenseKind::InterplanetaryMissile,
            planet.defense.count(DefenseKind::InterplanetaryMissile),
        );
        for item in &planet.build_queue {
            if let QueueTarget::Defense {
                kind: queued,
                quantity,
            } = item.target
            {
                if queued.is_missile() {
                    used += slots(queued, quantity);
                }
            }
        }
        if used + slots(kind, quantity) > capacity {
            return Err(GameError::RequirementNotMet(format!(
                "missile silo holds {capacity} slots"
            )));
        }
    }
    Ok(())
}

fn require_positive_quantity(quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(GameError::InvalidInput {
            field: "quantity".to_owned(),
            message: "order quantity must be at least one".to_owned(),
        });
    }
    Ok(())
}

fn schedule(
    queue: &mut Vec<BuildQueueItem>,
    target: QueueTarget,
    duration: i64,
    now: Timestamp,
    next_id: &mut u64,
) -> QueuePlacement {
    *next_id += 1;
    let id = *next_id;
    let start = chain_tail(queue, now);
    let end_time = start + duration;
    queue.push(BuildQueueItem {
        id,
        target,
        start_time: start,
        end_time,
    });
    QueuePlacement::Active { id, end_time }
}

fn park(
    waiting: &mut Vec<WaitingQueueItem>,
    target: QueueTarget,
    now: Timestamp,
    planet_id: Option<u64>,
    next_id: &mut u64,
) -> QueuePlacement {
    *next_id += 1;
    let id = *next_id;
    waiting.push(WaitingQueueItem {
        id,
        target,
        priority: 0,
        added_time: now,
        planet_id,
    });
    QueuePlacement::Waiting { id }
}
