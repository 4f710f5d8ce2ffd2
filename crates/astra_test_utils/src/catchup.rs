//! Catch-up equivalence harness.
//!
//! The engine promises that advancing a state to an instant in one
//! call lands on exactly the state reached by advancing through any
//! sequence of intermediate instants. The harness runs both journeys
//! over clones of the same starting world and panics with a readable
//! dump when they disagree.
//!
//! # Testing Strategy
//!
//! Catch-up equivalence is the property everything else leans on: a
//! server may sync a player every few seconds or once a week, and the
//! split points land wherever network timing puts them. Sources of
//! divergence to watch for:
//!
//! - **Rounding that accumulates**: per-segment arithmetic must be
//!   exact, or two short segments drift from one long one. Fixed-point
//!   rates times integer millisecond spans keep it exact.
//!
//! - **Order of same-instant transitions**: completions, expiries and
//!   arrivals due at one boundary must apply in a fixed order, or the
//!   journey that separates them disagrees with the one that batches.
//!
//! - **State read at the wrong instant**: a rate read after a
//!   completion instead of before it pays the new rate too early.
//!
//! Property tests drive this harness with randomized split sequences;
//! integration tests drive it with hand-placed boundary-exact splits.

use astra_core::campaign::CampaignConfig;
use astra_core::config::EngineConfig;
use astra_core::engine::{self, GameEvent};
use astra_core::npc::Npc;
use astra_core::player::Player;
use astra_core::time::Timestamp;
use astra_core::universe::Universe;

/// One full game state, bundled so both journeys clone the same
/// starting point.
#[derive(Debug, Clone)]
pub struct World {
    /// The player under test.
    pub player: Player,
    /// Shared universe state.
    pub universe: Universe,
    /// NPC factions.
    pub npcs: Vec<Npc>,
    /// Campaign definitions measured on refresh.
    pub campaign: CampaignConfig,
    /// Engine tuning.
    pub cfg: EngineConfig,
}

impl World {
    /// A lone player in an empty universe under default tuning.
    #[must_use]
    pub fn solo(player: Player) -> Self {
        Self {
            player,
            universe: Universe::new(),
            npcs: Vec::new(),
            campaign: CampaignConfig::standard(),
            cfg: EngineConfig::default(),
        }
    }

    /// Advance this world to `now`, returning the events.
    pub fn advance(&mut self, now: Timestamp) -> Vec<GameEvent> {
        engine::advance(
            &mut self.player,
            &mut self.universe,
            &mut self.npcs,
            &self.campaign,
            &self.cfg,
            now,
        )
    }
}

/// Result of running both journeys.
#[derive(Debug, Clone)]
pub struct CatchupOutcome {
    /// World after the single direct call.
    pub direct: World,
    /// World after the stepped calls.
    pub stepped: World,
    /// Events from the direct call.
    pub direct_events: Vec<GameEvent>,
    /// Events from the stepped calls, concatenated.
    pub stepped_events: Vec<GameEvent>,
}

impl CatchupOutcome {
    /// Assert that both journeys reached the same state, with a
    /// readable dump on divergence.
    ///
    /// # Panics
    ///
    /// Panics if any part of the two worlds differs.
    pub fn assert_equivalent(&self) {
        if self.direct.player != self.stepped.player {
            panic!(
                "catch-up diverged on player state\n--- direct ---\n{}\n--- stepped ---\n{}",
                dump(&self.direct.player),
                dump(&self.stepped.player),
            );
        }
        assert_eq!(
            self.direct.universe, self.stepped.universe,
            "catch-up diverged on universe state"
        );
        assert_eq!(
            self.direct.npcs, self.stepped.npcs,
            "catch-up diverged on NPC state"
        );
    }
}

fn dump(player: &Player) -> String {
    ron::ser::to_string_pretty(player, ron::ser::PrettyConfig::default())
        .unwrap_or_else(|error| format!("<unserializable: {error}>"))
}

/// Run `world` to `horizon` once directly and once through `splits`.
///
/// Splits may arrive unsorted or duplicated and may land exactly on
/// completion boundaries; they are sorted and clamped to the horizon
/// before stepping, and a final call at the horizon closes the
/// stepped journey.
#[must_use]
pub fn run_split(world: &World, splits: &[Timestamp], horizon: Timestamp) -> CatchupOutcome {
    let mut direct = world.clone();
    let direct_events = direct.advance(horizon);

    let mut stepped = world.clone();
    let mut stepped_events = Vec::new();
    let mut ordered: Vec<Timestamp> = splits.iter().map(|&split| split.min(horizon)).collect();
    ordered.sort_unstable();
    for split in ordered {
        stepped_events.extend(stepped.advance(split));
    }
    stepped_events.extend(stepped.advance(horizon));

    CatchupOutcome {
        direct,
        stepped,
        direct_events,
        stepped_events,
    }
}
