//! # Astra Server
//!
//! Persistence and sync shell around the simulation core.
//!
//! The core never does IO and never reads a clock; this crate owns
//! both. It loads saved state, hands it to the engine together with
//! the current time, and writes back what changed - players whole,
//! universe records per composite key. Nothing here computes game
//! rules.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod store;
pub mod sync;

use serde::{Deserialize, Serialize};

/// Server tuning, separate from the engine's game rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// How often the background tick catches every player up, in ms.
    pub tick_interval_ms: u64,
    /// Log filter applied when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 60_000,
            log_filter: "info".to_owned(),
        }
    }
}

impl ServerConfig {
    /// Parse a config override from RON text.
    ///
    /// Missing fields fall back to defaults, so deployment files only
    /// list what they change.
    pub fn from_ron_str(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_override() {
        let cfg = ServerConfig::from_ron_str("(tickIntervalMs: 5000)").expect("parse");
        assert_eq!(cfg.tick_interval_ms, 5_000);
        assert_eq!(cfg.log_filter, "info");
    }
}
