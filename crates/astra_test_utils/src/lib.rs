//! # Astra Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Catch-up equivalence harness
//! - Fixture builders for players, worlds and NPC factions
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catchup;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
