//! Movie ELO - pairwise movie ranking service
//!
//! Users are shown two movies at a time and pick a winner (or call a tie).
//! Each outcome updates both movies' ELO ratings, persisted in SQLite, and the
//! leaderboard is the catalogue ordered by rating.

pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod pairing;
pub mod rating;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RankingError, Result};
pub use types::*;

// Re-export key components
pub use rating::{EloRatingCalculator, RatingCalculator, RatingStore};
pub use service::{AppState, RankingService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
