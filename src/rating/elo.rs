//! ELO rating system implementation
//!
//! Expected scores come from the `elo` module of the skillratings crate
//! (logistic model on a 400 point scale). New ratings are rounded to the
//! nearest integer with ties going to the even neighbour.

use crate::config::RatingSettings;
use crate::rating::calculator::RatingCalculator;
use crate::types::{MatchOutcome, RatingUpdate, DEFAULT_RATING};
use serde::{Deserialize, Serialize};
use skillratings::elo::{EloConfig, EloRating};

/// Configuration for the ELO calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EloCalculatorConfig {
    /// Core ELO parameters (K-factor)
    pub elo_config: EloConfig,
    /// Initial rating for new movies
    pub initial_rating: i64,
}

impl Default for EloCalculatorConfig {
    fn default() -> Self {
        Self {
            elo_config: EloConfig { k: 32.0 },
            initial_rating: DEFAULT_RATING,
        }
    }
}

impl From<&RatingSettings> for EloCalculatorConfig {
    fn from(settings: &RatingSettings) -> Self {
        Self {
            elo_config: EloConfig {
                k: settings.k_factor,
            },
            initial_rating: settings.initial_rating,
        }
    }
}

impl EloCalculatorConfig {
    /// Create configuration with a custom K-factor
    pub fn with_k_factor(k: f64) -> Self {
        Self {
            elo_config: EloConfig { k },
            ..Self::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.elo_config.k.is_finite() || self.elo_config.k <= 0.0 {
            return Err(crate::error::RankingError::ConfigurationError {
                message: "K-factor must be a positive finite number".to_string(),
            }
            .into());
        }

        if self.initial_rating < 0 {
            return Err(crate::error::RankingError::ConfigurationError {
                message: "Initial rating must be non-negative".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// ELO rating calculator implementation
#[derive(Debug, Clone)]
pub struct EloRatingCalculator {
    config: EloCalculatorConfig,
}

impl EloRatingCalculator {
    /// Create a new ELO rating calculator
    pub fn new(config: EloCalculatorConfig) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    /// K-factor in use
    pub fn k_factor(&self) -> f64 {
        self.config.elo_config.k
    }

    fn adjust(&self, rating: i64, actual: f64, expected: f64) -> i64 {
        let raw = rating as f64 + self.config.elo_config.k * (actual - expected);
        raw.round_ties_even() as i64
    }
}

impl Default for EloRatingCalculator {
    fn default() -> Self {
        Self {
            config: EloCalculatorConfig::default(),
        }
    }
}

impl RatingCalculator for EloRatingCalculator {
    fn calculate(&self, rating_a: i64, rating_b: i64, outcome: MatchOutcome) -> RatingUpdate {
        // Each side's expectation is computed from its own perspective so that
        // relabelling the participants yields bit-identical results.
        let expected_a = self.expected_score(rating_a, rating_b);
        let expected_b = self.expected_score(rating_b, rating_a);

        RatingUpdate {
            rating_a_before: rating_a,
            rating_b_before: rating_b,
            rating_a_after: self.adjust(rating_a, outcome.score_a(), expected_a),
            rating_b_after: self.adjust(rating_b, outcome.score_b(), expected_b),
        }
    }

    fn expected_score(&self, rating_a: i64, rating_b: i64) -> f64 {
        let (expected, _) = skillratings::elo::expected_score(
            &EloRating {
                rating: rating_a as f64,
            },
            &EloRating {
                rating: rating_b as f64,
            },
        );
        expected
    }

    fn initial_rating(&self) -> i64 {
        self.config.initial_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "elo",
            "k_factor": self.config.elo_config.k,
            "initial_rating": self.config.initial_rating,
            "rounding": "half_to_even"
        })
    }
}
