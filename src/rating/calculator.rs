//! Rating calculator trait
//!
//! This module defines the interface for rating calculations. Calculators are
//! pure: they never touch storage and accept any integer ratings as-is.

use crate::types::{MatchOutcome, RatingUpdate};

/// Trait for calculating rating changes after a pairwise comparison
pub trait RatingCalculator: Send + Sync {
    /// Calculate the new ratings of both participants
    ///
    /// # Arguments
    /// * `rating_a` - Rating of the first participant before the match
    /// * `rating_b` - Rating of the second participant before the match
    /// * `outcome` - Result of the match seen from the first participant
    fn calculate(&self, rating_a: i64, rating_b: i64, outcome: MatchOutcome) -> RatingUpdate;

    /// Probability-weighted score the first participant is expected to get
    fn expected_score(&self, rating_a: i64, rating_b: i64) -> f64;

    /// Get the initial rating for new movies
    fn initial_rating(&self) -> i64;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}
