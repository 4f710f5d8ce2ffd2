//! Galaxy coordinates and the canonical position key.
//!
//! Persisted maps are keyed by the string form `"galaxy:system:slot"`.
//! That encoding is a compatibility contract: state written by earlier
//! deployments must keep resolving to the same coordinates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GameError;

/// Number of galaxies in the universe.
pub const GALAXY_COUNT: u16 = 5;
/// Number of systems per galaxy.
pub const SYSTEMS_PER_GALAXY: u16 = 499;
/// Number of colonizable planet slots per system.
pub const SLOTS_PER_SYSTEM: u8 = 15;
/// Virtual slot index used as the expedition staging zone.
pub const EXPEDITION_SLOT: u8 = 16;

/// A location in the universe grid.
///
/// Orders lexicographically by `(galaxy, system, slot)`, which keeps
/// map iteration deterministic. Serializes as the canonical string key,
/// so position-keyed maps persist exactly as `{"1:42:8": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Galaxy index, 1-based.
    pub galaxy: u16,
    /// System index within the galaxy, 1-based.
    pub system: u16,
    /// Planet slot within the system, 1-based. 16 is the expedition zone.
    pub slot: u8,
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(galaxy: u16, system: u16, slot: u8) -> Self {
        Self {
            galaxy,
            system,
            slot,
        }
    }

    /// Whether the coordinates lie inside the universe grid.
    #[must_use]
    pub fn in_bounds(self) -> bool {
        (1..=GALAXY_COUNT).contains(&self.galaxy)
            && (1..=SYSTEMS_PER_GALAXY).contains(&self.system)
            && self.slot >= 1
            && (self.slot <= SLOTS_PER_SYSTEM || self.slot == EXPEDITION_SLOT)
    }

    /// Whether this position is the expedition staging zone of its system.
    #[must_use]
    pub const fn is_expedition_zone(self) -> bool {
        self.slot == EXPEDITION_SLOT
    }

    /// The expedition zone of the given system.
    #[must_use]
    pub const fn expedition_zone(galaxy: u16, system: u16) -> Self {
        Self::new(galaxy, system, EXPEDITION_SLOT)
    }

    /// Canonical string key, `"galaxy:system:slot"`.
    #[must_use]
    pub fn key(self) -> String {
        self.to_string()
    }

    /// Abstract flight distance between two positions.
    ///
    /// Crossing galaxies dominates, then systems, then slots; two
    /// fleets between the same pair of coordinates always compute the
    /// same distance regardless of direction.
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        if self.galaxy != other.galaxy {
            u32::from(self.galaxy.abs_diff(other.galaxy)) * 20_000
        } else if self.system != other.system {
            2_700 + u32::from(self.system.abs_diff(other.system)) * 95
        } else if self.slot != other.slot {
            1_000 + u32::from(self.slot.abs_diff(other.slot)) * 5
        } else {
            5
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.galaxy, self.system, self.slot)
    }
}

impl FromStr for Position {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GameError::MalformedPosition(s.to_string());
        let mut parts = s.split(':');
        let galaxy = parts
            .next()
            .and_then(|p| p.parse::<u16>().ok())
            .ok_or_else(malformed)?;
        let system = parts
            .next()
            .and_then(|p| p.parse::<u16>().ok())
            .ok_or_else(malformed)?;
        let slot = parts
            .next()
            .and_then(|p| p.parse::<u8>().ok())
            .ok_or_else(malformed)?;
        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok(Self {
            galaxy,
            system,
            slot,
        })
    }
}
