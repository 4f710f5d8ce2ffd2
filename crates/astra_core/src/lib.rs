//! # Astra Core
//!
//! Deterministic progression engine for a persistent space-empire
//! game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No wall-clock reads (time always arrives as a parameter)
//!
//! Every state change flows through [`engine::advance`] or one of the
//! command functions next to it, all of which are pure transformations
//! of the state they are handed. The same saved state advanced to the
//! same instant always lands on the same result, however many calls
//! the journey is split into. That property is what lets a server
//! catch a player up after a week offline in one call, and what makes
//! combat over a recorded seed replayable.
//!
//! ## Crate Structure
//!
//! - [`engine`] - time advance, catch-up, and the command surface
//! - [`production`] / [`deposits`] - resource income and finite ore
//! - [`queue`] - construction, shipyard and research scheduling
//! - [`missions`] / [`combat`] - fleet movement and battle resolution
//! - [`diplomacy`] / [`npc`] - reputation and NPC empires
//! - [`campaign`] - quest chains and rewards
//! - [`ranking`] - score and leaderboards
//! - [`catalog`] - static building, ship, defense and tech data
//! - [`math`] - fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod campaign;
pub mod catalog;
pub mod combat;
pub mod config;
pub mod deposits;
pub mod diplomacy;
pub mod engine;
pub mod error;
pub mod math;
pub mod missions;
pub mod npc;
pub mod officers;
pub mod planet;
pub mod player;
pub mod position;
pub mod production;
pub mod queue;
pub mod ranking;
pub mod reports;
pub mod resources;
pub mod time;
pub mod universe;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::campaign::{CampaignConfig, CampaignEvent, CampaignState};
    pub use crate::catalog::{
        BuildingKind, DefenseKind, FleetComposition, OfficerKind, ShipKind, TechnologyKind,
    };
    pub use crate::config::EngineConfig;
    pub use crate::engine::{self, advance, GameEvent};
    pub use crate::error::{GameError, Result};
    pub use crate::math::Fixed;
    pub use crate::missions::{LaunchOrder, MissileOrder, MissionKind, MissionStatus};
    pub use crate::npc::Npc;
    pub use crate::planet::{Moon, Planet};
    pub use crate::player::Player;
    pub use crate::position::Position;
    pub use crate::ranking::{ranking, RankingCategory, RankingEntry};
    pub use crate::resources::{ResourceKind, Resources};
    pub use crate::time::Timestamp;
    pub use crate::universe::Universe;
}
