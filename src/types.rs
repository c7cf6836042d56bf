//! Common types used throughout the ranking service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier assigned to a movie at creation
pub type ItemId = i64;

/// Identifier of a recorded match
pub type MatchId = i64;

/// Rating assigned to movies that have never been compared
pub const DEFAULT_RATING: i64 = 1500;

/// A movie taking part in the ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub image_url: Option<String>,
    pub rating: i64,
    pub matches_played: i64,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub image_url: Option<String>,
}

/// Outcome of a comparison between two movies, seen from the first one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    AWins,
    BWins,
    Draw,
}

impl MatchOutcome {
    /// The same outcome described from the other participant's side
    pub fn swapped(self) -> Self {
        match self {
            MatchOutcome::AWins => MatchOutcome::BWins,
            MatchOutcome::BWins => MatchOutcome::AWins,
            MatchOutcome::Draw => MatchOutcome::Draw,
        }
    }

    /// Actual score credited to the first participant
    pub fn score_a(self) -> f64 {
        match self {
            MatchOutcome::AWins => 1.0,
            MatchOutcome::BWins => 0.0,
            MatchOutcome::Draw => 0.5,
        }
    }

    /// Actual score credited to the second participant
    pub fn score_b(self) -> f64 {
        1.0 - self.score_a()
    }

    /// Label used in logs and metrics
    pub fn as_str(self) -> &'static str {
        match self {
            MatchOutcome::AWins => "a_wins",
            MatchOutcome::BWins => "b_wins",
            MatchOutcome::Draw => "draw",
        }
    }
}

impl std::fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Before/after ratings produced by one application of the rating engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub rating_a_before: i64,
    pub rating_b_before: i64,
    pub rating_a_after: i64,
    pub rating_b_after: i64,
}

impl RatingUpdate {
    pub fn delta_a(&self) -> i64 {
        self.rating_a_after - self.rating_a_before
    }

    pub fn delta_b(&self) -> i64 {
        self.rating_b_after - self.rating_b_before
    }
}

/// Append-only record of a decisive match or a tie
///
/// For decisive matches `first_id` is the winner and `second_id` the loser.
/// Ties keep the order in which the pair was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub first_id: ItemId,
    pub second_id: ItemId,
    pub first_rating_before: i64,
    pub second_rating_before: i64,
    pub first_rating_after: i64,
    pub second_rating_after: i64,
    pub is_draw: bool,
    pub played_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Whether this record references the given movie on either side
    pub fn involves(&self, item_id: ItemId) -> bool {
        self.first_id == item_id || self.second_id == item_id
    }

    /// The outcome this record was produced from
    pub fn outcome(&self) -> MatchOutcome {
        if self.is_draw {
            MatchOutcome::Draw
        } else {
            MatchOutcome::AWins
        }
    }
}
