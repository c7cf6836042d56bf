//! Rating system: ELO calculations and rating persistence
//!
//! This module provides the pure rating engine, the storage contract it is
//! persisted through, and the in-memory and SQLite store implementations.

pub mod calculator;
pub mod elo;
pub mod sqlite;
pub mod storage;

// Re-export commonly used types
pub use calculator::RatingCalculator;
pub use elo::{EloCalculatorConfig, EloRatingCalculator};
pub use sqlite::SqliteRatingStore;
pub use storage::{InMemoryRatingStore, RatingStore};
