//! Rating system configuration

use crate::types::DEFAULT_RATING;
use serde::{Deserialize, Serialize};

/// Parameters of the ELO rating engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    /// Sensitivity of a single match outcome
    pub k_factor: f64,
    /// Rating assigned to newly added movies
    pub initial_rating: i64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            k_factor: 32.0,
            initial_rating: DEFAULT_RATING,
        }
    }
}
