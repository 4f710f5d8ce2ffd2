//! Time-advance driver and the player-facing command surface.
//!
//! [`advance`] is the engine's single clock. It replays every discrete
//! transition between the state's bookkeeping marks and `now` in
//! chronological order: production accrues up to each boundary with
//! the bonuses that were valid during that stretch, then the
//! boundary's completions, expiries and mission transitions apply at
//! their exact instants. Calling it again with the same or an older
//! `now` changes nothing, so callers can sync as often as they like.
//!
//! The command functions below it validate fully before touching
//! state; an `Err` return means nothing happened.

use crate::campaign::{CampaignConfig, CampaignEvent, CampaignState};
use crate::catalog::{BuildingKind, DefenseKind, OfficerKind, ShipKind, TechnologyKind, UnlockSet};
use crate::config::EngineConfig;
use crate::error::{GameError, Result};
use crate::math::{floor_u64, Fixed};
use crate::missions::{self, LaunchOrder, MissileOrder, MissionEvent};
use crate::npc::Npc;
use crate::officers::BonusSet;
use crate::player::Player;
use crate::position::Position;
use crate::production::{apply_production, ProductionEvent};
use crate::queue::{self, QueueEvent, QueuePlacement};
use crate::reports::{Notification, NotificationKind};
use crate::resources::Resources;
use crate::time::Timestamp;
use crate::universe::Universe;

// ============================================================================
// Events
// ============================================================================

/// Something an advance did, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Production crossed a deposit threshold on a planet.
    Deposit {
        /// Planet whose deposit moved.
        planet_id: u64,
        /// Its coordinates.
        position: Position,
        /// What the deposit did.
        event: ProductionEvent,
    },
    /// A planet's construction queue completed or promoted an order.
    PlanetQueue {
        /// Planet that owns the queue.
        planet_id: u64,
        /// What the queue did.
        event: QueueEvent,
    },
    /// A moon's construction queue completed an order.
    MoonQueue {
        /// Parent planet of the moon.
        planet_id: u64,
        /// What the queue did.
        event: QueueEvent,
    },
    /// The research queue completed or promoted an order.
    Research(QueueEvent),
    /// An officer's term ran out.
    OfficerExpired {
        /// The officer that left.
        kind: OfficerKind,
    },
    /// A fleet, missile or NPC transition resolved.
    Mission(MissionEvent),
    /// Campaign bookkeeping moved.
    Campaign(CampaignEvent),
    /// A debris field evaporated unharvested.
    DebrisExpired {
        /// Where it hung.
        position: Position,
    },
}

// ============================================================================
// Advance
// ============================================================================

/// Catch the whole account up to `now`.
///
/// The window since the last call is walked boundary by boundary: the
/// earliest pending completion, officer expiry or mission due time is
/// found, production is accrued up to exactly that instant, and the
/// transition is applied before the search repeats. Rates therefore
/// change mid-window precisely when the thing that changes them
/// lands, no matter how long the player was away.
///
/// A `now` at or before every bookkeeping mark leaves the state
/// untouched and returns no events.
pub fn advance(
    player: &mut Player,
    universe: &mut Universe,
    npcs: &mut [Npc],
    campaign: &CampaignConfig,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    loop {
        let boundary = next_boundary(player, npcs, now);
        let step_to = boundary.unwrap_or(now);
        advance_to(player, universe, npcs, cfg, step_to, &mut events);
        if boundary.is_none() {
            break;
        }
    }
    for position in universe.prune_expired_debris(now) {
        events.push(GameEvent::DebrisExpired { position });
    }
    refresh_campaign(player, npcs, campaign, cfg, now, &mut events);
    events
}

/// Earliest pending discrete transition at or before `up_to`.
fn next_boundary(player: &Player, npcs: &[Npc], up_to: Timestamp) -> Option<Timestamp> {
    let mut best: Option<Timestamp> = None;
    let mut consider = |time: Timestamp| {
        if time <= up_to && best.map_or(true, |current| time < current) {
            best = Some(time);
        }
    };
    for planet in &player.planets {
        if let Some(item) = planet.build_queue.first() {
            consider(item.end_time);
        }
        if let Some(item) = planet.moon.as_ref().and_then(|moon| moon.build_queue.first()) {
            consider(item.end_time);
        }
    }
    if let Some(item) = player.research_queue.first() {
        consider(item.end_time);
    }
    if let Some(due) = missions::next_mission_due(player, npcs) {
        consider(due);
    }
    for kind in OfficerKind::ALL {
        let record = player.officers.record(kind);
        if record.active {
            if let Some(expiry) = record.expires_at {
                consider(expiry);
            }
        }
    }
    best
}

/// One chronological step: production up to `to`, then everything
/// that falls due at `to`.
fn advance_to(
    player: &mut Player,
    universe: &mut Universe,
    npcs: &mut [Npc],
    cfg: &EngineConfig,
    to: Timestamp,
    events: &mut Vec<GameEvent>,
) {
    produce(player, cfg, to, events);
    sweep_officers(player, cfg, to, events);
    run_queues(player, cfg, to, events);
    for event in missions::advance_missions(player, universe, npcs, cfg, to) {
        events.push(GameEvent::Mission(event));
    }
}

/// Accrue production on every planet up to `to`.
fn produce(player: &mut Player, cfg: &EngineConfig, to: Timestamp, events: &mut Vec<GameEvent>) {
    // A term lapsing exactly at the boundary still covers the stretch
    // that ends there, so the segment is priced one tick earlier.
    let bonuses = BonusSet::from_roster(&player.officers, to.saturating_sub(1));
    let technologies = player.technologies;
    let mut dark_matter = Fixed::ZERO;
    let mut notices = Vec::new();
    for planet in &mut player.planets {
        let outcome = apply_production(planet, &technologies, &bonuses, cfg, to);
        dark_matter = dark_matter.saturating_add(outcome.dark_matter);
        for event in outcome.events {
            notices.push((planet.id, planet.position, event));
        }
    }
    player.credit_dark_matter(dark_matter, &bonuses, cfg);
    for (planet_id, position, event) in notices {
        let kind = match event {
            ProductionEvent::DepositWarning { resource } => {
                NotificationKind::DepositWarning { position, resource }
            }
            ProductionEvent::DepositDepleted { resource } => {
                NotificationKind::DepositDepleted { position, resource }
            }
        };
        let id = player.next_id();
        player
            .notifications
            .push(Notification::new(id, to, kind), cfg.notification_cap);
        events.push(GameEvent::Deposit {
            planet_id,
            position,
            event,
        });
    }
}

/// Retire officers whose terms lapsed at or before `to`.
fn sweep_officers(
    player: &mut Player,
    cfg: &EngineConfig,
    to: Timestamp,
    events: &mut Vec<GameEvent>,
) {
    for kind in player.officers.sweep_expired(to) {
        tracing::debug!(officer = kind.name(), "officer term lapsed");
        let id = player.next_id();
        player.notifications.push(
            Notification::new(id, to, NotificationKind::OfficerExpired { officer: kind }),
            cfg.notification_cap,
        );
        events.push(GameEvent::OfficerExpired { kind });
    }
}

/// Complete due queue items on every planet, moon and the research
/// track, scoring completions and raising unlock notices.
fn run_queues(player: &mut Player, cfg: &EngineConfig, to: Timestamp, events: &mut Vec<GameEvent>) {
    let bonuses = BonusSet::from_roster(&player.officers, to);
    let technologies = player.technologies;
    for index in 0..player.planets.len() {
        let (planet_id, position, queue_events, moon_events, fresh, moon_fresh) = {
            let planet = &mut player.planets[index];
            let due = planet
                .build_queue
                .first()
                .is_some_and(|item| item.end_time <= to);
            let moon_due = planet.moon.as_ref().is_some_and(|moon| {
                moon.build_queue
                    .first()
                    .is_some_and(|item| item.end_time <= to)
            });
            let before = due.then(|| UnlockSet::snapshot(&planet.buildings, &technologies));
            let moon_before = moon_due.then(|| {
                planet
                    .moon
                    .as_ref()
                    .map(|moon| UnlockSet::snapshot(&moon.buildings, &technologies))
            });
            let queue_events = queue::advance_build_queue(planet, &technologies, &bonuses, cfg, to);
            let moon_events = queue::advance_moon_queue(planet, to);
            let fresh = before.map(|before| {
                before.newly_unlocked(&UnlockSet::snapshot(&planet.buildings, &technologies))
            });
            let moon_fresh = moon_before.flatten().and_then(|before| {
                planet.moon.as_ref().map(|moon| {
                    before.newly_unlocked(&UnlockSet::snapshot(&moon.buildings, &technologies))
                })
            });
            (
                planet.id,
                planet.position,
                queue_events,
                moon_events,
                fresh,
                moon_fresh,
            )
        };
        for event in queue_events {
            score_completion(player, &event);
            events.push(GameEvent::PlanetQueue { planet_id, event });
        }
        for event in moon_events {
            score_completion(player, &event);
            events.push(GameEvent::MoonQueue { planet_id, event });
        }
        notify_unlocks(player, position, fresh, cfg, to);
        notify_unlocks(player, position, moon_fresh, cfg, to);
    }

    let research_due = player
        .research_queue
        .first()
        .is_some_and(|item| item.end_time <= to);
    let before = if research_due {
        player
            .planets
            .first()
            .map(|home| UnlockSet::snapshot(&home.buildings, &player.technologies))
    } else {
        None
    };
    let research_events = queue::advance_research_queue(player, &bonuses, cfg, to);
    let fresh = before.and_then(|before| {
        player
            .planets
            .first()
            .map(|home| before.newly_unlocked(&UnlockSet::snapshot(&home.buildings, &player.technologies)))
    });
    let home_position = player.planets.first().map(|home| home.position);
    if let Some(position) = home_position {
        notify_unlocks(player, position, fresh, cfg, to);
    }
    for event in research_events {
        score_completion(player, &event);
        events.push(GameEvent::Research(event));
    }
}

/// Award score and lifetime counters for a finished order.
fn score_completion(player: &mut Player, event: &QueueEvent) {
    match *event {
        QueueEvent::BuildingCompleted { kind, level } => {
            player.points += points_for(kind.cost(level));
            player.achievements.buildings_constructed += 1;
        }
        QueueEvent::TechnologyCompleted { kind, level } => {
            player.points += points_for(kind.cost(level));
            player.achievements.technologies_researched += 1;
        }
        QueueEvent::ShipsCompleted { kind, quantity } => {
            player.points += points_for(kind.cost()) * u64::from(quantity);
            player.achievements.total_ships_produced += u64::from(quantity);
        }
        QueueEvent::DefenseCompleted { kind, quantity } => {
            player.points += points_for(kind.cost()) * u64::from(quantity);
            player.achievements.defense_units_built += quantity;
        }
        QueueEvent::ItemPromoted { .. } => {}
        QueueEvent::PromotionSkipped { id, ref reason } => {
            tracing::warn!(item = id, reason = reason.as_str(), "waiting order held back");
        }
    }
}

/// Score value of spent resources, one point per thousand.
fn points_for(cost: Resources) -> u64 {
    floor_u64(cost.total() / Fixed::from_num(1_000))
}

/// Raise one notice naming everything a completion made available.
fn notify_unlocks(
    player: &mut Player,
    position: Position,
    fresh: Option<UnlockSet>,
    cfg: &EngineConfig,
    to: Timestamp,
) {
    let Some(fresh) = fresh else {
        return;
    };
    if fresh.is_empty() {
        return;
    }
    let entries: Vec<String> = fresh
        .buildings
        .iter()
        .map(|kind| kind.name().to_owned())
        .chain(fresh.technologies.iter().map(|kind| kind.name().to_owned()))
        .chain(fresh.ships.iter().map(|kind| kind.name().to_owned()))
        .chain(fresh.defense.iter().map(|kind| kind.name().to_owned()))
        .collect();
    let id = player.next_id();
    player.notifications.push(
        Notification::new(id, to, NotificationKind::UnlocksAvailable { position, entries }),
        cfg.notification_cap,
    );
}

/// Re-measure campaign objectives against the caught-up state.
fn refresh_campaign(
    player: &mut Player,
    npcs: &[Npc],
    campaign: &CampaignConfig,
    cfg: &EngineConfig,
    now: Timestamp,
    events: &mut Vec<GameEvent>,
) {
    let Some(mut state) = player.campaign.take() else {
        return;
    };
    let campaign_events = state.refresh(campaign, player, npcs, now);
    player.campaign = Some(state);
    push_campaign_events(player, campaign_events, cfg, now, events);
}

fn push_campaign_events(
    player: &mut Player,
    campaign_events: Vec<CampaignEvent>,
    cfg: &EngineConfig,
    now: Timestamp,
    events: &mut Vec<GameEvent>,
) {
    for event in campaign_events {
        match &event {
            CampaignEvent::QuestCompleted { quest_id, title } => {
                let id = player.next_id();
                player.notifications.push(
                    Notification::new(
                        id,
                        now,
                        NotificationKind::QuestCompleted {
                            quest_id: quest_id.clone(),
                            title: title.clone(),
                        },
                    ),
                    cfg.notification_cap,
                );
            }
            CampaignEvent::QuestUnlocked { quest_id, title } => {
                let id = player.next_id();
                player.notifications.push(
                    Notification::new(
                        id,
                        now,
                        NotificationKind::QuestUnlocked {
                            quest_id: quest_id.clone(),
                            title: title.clone(),
                        },
                    ),
                    cfg.notification_cap,
                );
            }
            CampaignEvent::ChapterAdvanced { chapter } => {
                tracing::info!(chapter, "campaign chapter reached");
            }
        }
        events.push(GameEvent::Campaign(event));
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Queue a building upgrade on a planet.
pub fn enqueue_building(
    player: &mut Player,
    planet_id: u64,
    kind: BuildingKind,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Result<QueuePlacement> {
    let bonuses = BonusSet::from_roster(&player.officers, now);
    let technologies = player.technologies;
    let mut next_id = player.id_seq;
    let planet = player
        .planet_mut(planet_id)
        .ok_or(GameError::PlanetNotFound(planet_id))?;
    let placement =
        queue::enqueue_building(planet, kind, &technologies, &bonuses, cfg, now, &mut next_id)?;
    player.id_seq = next_id;
    Ok(placement)
}

/// Queue a building on a planet's moon. The parent planet pays.
pub fn enqueue_moon_building(
    player: &mut Player,
    planet_id: u64,
    kind: BuildingKind,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Result<QueuePlacement> {
    let bonuses = BonusSet::from_roster(&player.officers, now);
    let technologies = player.technologies;
    let mut next_id = player.id_seq;
    let planet = player
        .planet_mut(planet_id)
        .ok_or(GameError::PlanetNotFound(planet_id))?;
    let placement =
        queue::enqueue_moon_building(planet, kind, &technologies, &bonuses, cfg, now, &mut next_id)?;
    player.id_seq = next_id;
    Ok(placement)
}

/// Queue a batch of ships at a planet's shipyard.
pub fn enqueue_ship_order(
    player: &mut Player,
    planet_id: u64,
    kind: ShipKind,
    quantity: u32,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Result<QueuePlacement> {
    let bonuses = BonusSet::from_roster(&player.officers, now);
    let technologies = player.technologies;
    let mut next_id = player.id_seq;
    let planet = player
        .planet_mut(planet_id)
        .ok_or(GameError::PlanetNotFound(planet_id))?;
    let placement = queue::enqueue_ship_order(
        planet,
        kind,
        quantity,
        &technologies,
        &bonuses,
        cfg,
        now,
        &mut next_id,
    )?;
    player.id_seq = next_id;
    Ok(placement)
}

/// Queue a batch of defensive units on a planet.
pub fn enqueue_defense_order(
    player: &mut Player,
    planet_id: u64,
    kind: DefenseKind,
    quantity: u32,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Result<QueuePlacement> {
    let bonuses = BonusSet::from_roster(&player.officers, now);
    let technologies = player.technologies;
    let mut next_id = player.id_seq;
    let planet = player
        .planet_mut(planet_id)
        .ok_or(GameError::PlanetNotFound(planet_id))?;
    let placement = queue::enqueue_defense_order(
        planet,
        kind,
        quantity,
        &technologies,
        &bonuses,
        cfg,
        now,
        &mut next_id,
    )?;
    player.id_seq = next_id;
    Ok(placement)
}

/// Queue a technology level, paid by the named planet.
pub fn enqueue_research(
    player: &mut Player,
    planet_id: u64,
    kind: TechnologyKind,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Result<QueuePlacement> {
    let bonuses = BonusSet::from_roster(&player.officers, now);
    queue::enqueue_research(player, planet_id, kind, &bonuses, cfg, now)
}

/// Cancel a queued order by id, refunding what was paid.
///
/// The planet's own queues are searched first, then the research
/// track; research refunds land on the named planet.
pub fn cancel_queue_item(
    player: &mut Player,
    planet_id: u64,
    item_id: u64,
    now: Timestamp,
) -> Result<()> {
    {
        let planet = player
            .planet_mut(planet_id)
            .ok_or(GameError::PlanetNotFound(planet_id))?;
        match queue::cancel_planet_item(planet, item_id, now) {
            Ok(()) => return Ok(()),
            Err(GameError::InvalidInput { .. }) => {}
            Err(error) => return Err(error),
        }
    }
    match queue::cancel_research_item(player, item_id, planet_id, now) {
        Err(GameError::InvalidInput { .. }) => Err(GameError::InvalidInput {
            field: "queueItemId".to_owned(),
            message: format!("no queued item with id {item_id}"),
        }),
        other => other,
    }
}

/// Dispatch a fleet on a mission.
pub fn launch_mission(
    player: &mut Player,
    universe: &Universe,
    npcs: &[Npc],
    order: LaunchOrder,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Result<u64> {
    let bonuses = BonusSet::from_roster(&player.officers, now);
    missions::launch_mission(player, universe, npcs, &bonuses, order, cfg, now)
}

/// Fire interplanetary missiles at a hostile world.
pub fn launch_missiles(
    player: &mut Player,
    universe: &Universe,
    order: MissileOrder,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Result<u64> {
    missions::launch_missiles(player, universe, order, cfg, now)
}

/// Hire an officer for one term, paid in dark matter.
///
/// Hiring an already active officer extends the running term.
pub fn hire_officer(player: &mut Player, kind: OfficerKind, now: Timestamp) -> Result<()> {
    player.spend_dark_matter(kind.term_cost())?;
    player.officers.hire(kind, now);
    tracing::debug!(officer = kind.name(), "officer engaged");
    Ok(())
}

/// Begin pursuing an unlocked quest.
///
/// The first call on a fresh account seeds campaign progress with the
/// opening quest available.
pub fn start_quest(
    player: &mut Player,
    campaign: &CampaignConfig,
    quest_id: &str,
    now: Timestamp,
) -> Result<()> {
    let state = player
        .campaign
        .get_or_insert_with(|| CampaignState::new(campaign));
    state.start_quest(campaign, quest_id, now)
}

/// Take the payout of a completed quest.
///
/// Rewards apply in a fixed order: resources to the first planet,
/// then dark matter, score, and ships. The claim itself is recorded
/// before anything pays out, so a repeated call fails instead of
/// paying twice.
pub fn claim_quest_rewards(
    player: &mut Player,
    campaign: &CampaignConfig,
    quest_id: &str,
    cfg: &EngineConfig,
    now: Timestamp,
) -> Result<Vec<GameEvent>> {
    let Some(mut state) = player.campaign.take() else {
        return Err(GameError::CampaignNotInitialized);
    };
    let outcome = state.claim_rewards(campaign, quest_id);
    player.campaign = Some(state);
    let (rewards, campaign_events) = outcome?;
    let bonuses = BonusSet::from_roster(&player.officers, now);
    if let Some(home) = player.planets.first_mut() {
        home.resources += rewards.resources;
    }
    player.credit_dark_matter(rewards.dark_matter, &bonuses, cfg);
    player.points += rewards.points;
    if let Some(home) = player.planets.first_mut() {
        home.fleet.merge(&rewards.ships);
    }
    let mut events = Vec::new();
    push_campaign_events(player, campaign_events, cfg, now, &mut events);
    Ok(events)
}

/// Rename a planet.
pub fn rename_planet(player: &mut Player, planet_id: u64, name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > 32 {
        return Err(GameError::InvalidInput {
            field: "name".to_owned(),
            message: "planet names run 1 to 32 characters".to_owned(),
        });
    }
    let planet = player
        .planet_mut(planet_id)
        .ok_or(GameError::PlanetNotFound(planet_id))?;
    planet.name = trimmed.to_owned();
    Ok(())
}

/// Give up a colony.
///
/// The last remaining planet can never be abandoned, and neither can
/// a planet with fleets still out; their return slot would vanish
/// with it.
pub fn abandon_planet(player: &mut Player, planet_id: u64) -> Result<()> {
    if player.planets.len() <= 1 {
        return Err(GameError::LastColony);
    }
    let index = player
        .planets
        .iter()
        .position(|planet| planet.id == planet_id)
        .ok_or(GameError::PlanetNotFound(planet_id))?;
    if player
        .fleet_missions
        .iter()
        .any(|mission| mission.origin_planet_id == planet_id)
    {
        return Err(GameError::InvalidInput {
            field: "planetId".to_owned(),
            message: "fleets from this planet are still en route".to_owned(),
        });
    }
    let planet = player.planets.remove(index);
    tracing::info!(planet = planet.id, position = %planet.position, "colony abandoned");
    Ok(())
}
