//! Error types for the game engine.
//!
//! Variants fall into three families: validation (malformed input),
//! domain rules (well-formed but forbidden by game state), and lookups
//! (referenced entity does not exist). Every fallible entry point
//! validates completely before mutating, so an `Err` return always
//! leaves state untouched.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game engine errors.
#[derive(Debug, Error)]
pub enum GameError {
    // Validation

    /// Caller-supplied value failed validation.
    #[error("Invalid {field}: {message}")]
    InvalidInput {
        /// Name of the offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// A position key did not parse as `galaxy:system:slot`.
    #[error("Malformed position key: {0}")]
    MalformedPosition(String),

    // Domain rules

    /// Insufficient resources for the requested operation.
    #[error("Insufficient resources: need {required} {resource}, have {available}")]
    InsufficientResources {
        /// Resource name.
        resource: String,
        /// Whole units required.
        required: i64,
        /// Whole units available.
        available: i64,
    },

    /// Not enough ships of a kind stationed at the origin planet.
    #[error("Fleet unavailable: need {requested} {ship}, have {available}")]
    FleetUnavailable {
        /// Ship kind name.
        ship: String,
        /// Ships requested.
        requested: u32,
        /// Ships stationed.
        available: u32,
    },

    /// Building or technology prerequisite not satisfied.
    #[error("Requirement not met: {0}")]
    RequirementNotMet(String),

    /// Queue already holds its maximum number of active entries.
    #[error("Queue is full (capacity {capacity})")]
    QueueFull {
        /// Active-slot capacity including officer bonuses.
        capacity: usize,
    },

    /// Every fleet slot is occupied by an in-flight mission.
    #[error("All fleet slots in use: {in_flight} of {capacity}")]
    FleetSlotsExhausted {
        /// Missions currently flying.
        in_flight: usize,
        /// Slot capacity including technology and officer bonuses.
        capacity: usize,
    },

    /// Mission target is not legal for the mission kind.
    #[error("Invalid mission target: {0}")]
    InvalidMissionTarget(String),

    /// Target coordinates already host a planet.
    #[error("Position already occupied: {0}")]
    PositionOccupied(String),

    /// Quest cannot be started or claimed in its current status.
    #[error("Quest {id} is not available: {status}")]
    QuestNotAvailable {
        /// Quest identifier.
        id: String,
        /// Status that blocked the operation.
        status: String,
    },

    /// Quest rewards were already claimed.
    #[error("Rewards already claimed for quest {0}")]
    RewardsAlreadyClaimed(String),

    /// Campaign state was never initialized for this player.
    #[error("Campaign not initialized")]
    CampaignNotInitialized,

    /// The last remaining colony cannot be abandoned.
    #[error("Cannot abandon the last remaining colony")]
    LastColony,

    // Lookups

    /// Referenced planet does not exist or is not owned by the caller.
    #[error("Planet not found: {0}")]
    PlanetNotFound(u64),

    /// Referenced NPC faction does not exist.
    #[error("NPC not found: {0}")]
    NpcNotFound(u64),

    /// Referenced quest does not exist in the campaign config.
    #[error("Quest not found: {0}")]
    QuestNotFound(String),

    // Infrastructure

    /// Config or scenario data failed to parse.
    #[error("Failed to parse data: {0}")]
    DataParseError(String),

    /// Snapshot bytes did not decode into a valid state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
