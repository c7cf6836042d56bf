//! Rating storage interface and in-memory implementation
//!
//! This module defines the persistence contract the ranking service relies
//! on. Every mutating operation is all-or-nothing: a failure part way through
//! leaves no partial rating update behind.

use crate::error::{RankingError, Result};
use crate::rating::calculator::RatingCalculator;
use crate::types::{Item, ItemId, MatchId, MatchOutcome, MatchRecord, NewItem, RatingUpdate};
use crate::utils::current_timestamp;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Trait for rating storage operations
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Get a movie by id
    async fn get_item(&self, item_id: ItemId) -> Result<Option<Item>>;

    /// Get the current rating of a movie
    async fn get_rating(&self, item_id: ItemId) -> Result<Option<i64>>;

    /// Insert a new movie with the given starting rating and zero matches
    async fn insert_item(&self, item: NewItem, initial_rating: i64) -> Result<Item>;

    /// Read both ratings, apply the calculator and persist both updates plus
    /// one match record as a single atomic unit
    ///
    /// Fails with [`RankingError::ItemNotFound`] if either id is unknown.
    async fn apply_match(
        &self,
        first_id: ItemId,
        second_id: ItemId,
        outcome: MatchOutcome,
        calculator: &dyn RatingCalculator,
    ) -> Result<MatchRecord>;

    /// Remove a movie and every match record referencing it
    ///
    /// Returns whether the movie existed.
    async fn delete_item(&self, item_id: ItemId) -> Result<bool>;

    /// All movies ordered by rating, highest first (ties by id)
    async fn list_by_rating(&self) -> Result<Vec<Item>>;

    /// Match history, newest first
    async fn list_matches(&self, limit: Option<usize>) -> Result<Vec<MatchRecord>>;

    /// Snapshot of all movies ordered by id, used as pairing candidates
    async fn list_items(&self) -> Result<Vec<Item>>;

    /// Get total number of movies
    async fn item_count(&self) -> Result<usize>;
}

/// Participants of a match normalised so that a decisive winner comes first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NormalizedMatch {
    pub first_id: ItemId,
    pub second_id: ItemId,
    pub outcome: MatchOutcome,
}

impl NormalizedMatch {
    pub(crate) fn new(first_id: ItemId, second_id: ItemId, outcome: MatchOutcome) -> Result<Self> {
        if first_id == second_id {
            return Err(RankingError::invalid("A movie cannot be matched against itself").into());
        }

        Ok(match outcome {
            MatchOutcome::BWins => Self {
                first_id: second_id,
                second_id: first_id,
                outcome: MatchOutcome::AWins,
            },
            _ => Self {
                first_id,
                second_id,
                outcome,
            },
        })
    }

    pub(crate) fn record(&self, id: MatchId, update: &RatingUpdate) -> MatchRecord {
        MatchRecord {
            id,
            first_id: self.first_id,
            second_id: self.second_id,
            first_rating_before: update.rating_a_before,
            second_rating_before: update.rating_b_before,
            first_rating_after: update.rating_a_after,
            second_rating_after: update.rating_b_after,
            is_draw: self.outcome == MatchOutcome::Draw,
            played_at: current_timestamp(),
        }
    }
}

#[derive(Debug, Default)]
struct InMemoryState {
    items: BTreeMap<ItemId, Item>,
    matches: Vec<MatchRecord>,
    last_item_id: ItemId,
    last_match_id: MatchId,
}

impl InMemoryState {
    fn rating_of(&self, item_id: ItemId) -> std::result::Result<i64, RankingError> {
        self.items
            .get(&item_id)
            .map(|item| item.rating)
            .ok_or(RankingError::ItemNotFound { item_id })
    }
}

/// In-memory rating storage implementation
///
/// A single lock guards movies and matches together, so each operation is
/// atomic with respect to every other.
#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    state: RwLock<InMemoryState>,
}

impl InMemoryRatingStore {
    /// Create a new in-memory rating store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RatingStore for InMemoryRatingStore {
    async fn get_item(&self, item_id: ItemId) -> Result<Option<Item>> {
        let state = self.state.read().await;
        Ok(state.items.get(&item_id).cloned())
    }

    async fn get_rating(&self, item_id: ItemId) -> Result<Option<i64>> {
        let state = self.state.read().await;
        Ok(state.items.get(&item_id).map(|item| item.rating))
    }

    async fn insert_item(&self, item: NewItem, initial_rating: i64) -> Result<Item> {
        let mut state = self.state.write().await;

        state.last_item_id += 1;
        let item = Item {
            id: state.last_item_id,
            name: item.name,
            image_url: item.image_url,
            rating: initial_rating,
            matches_played: 0,
            created_at: current_timestamp(),
        };
        state.items.insert(item.id, item.clone());

        Ok(item)
    }

    async fn apply_match(
        &self,
        first_id: ItemId,
        second_id: ItemId,
        outcome: MatchOutcome,
        calculator: &dyn RatingCalculator,
    ) -> Result<MatchRecord> {
        let normalized = NormalizedMatch::new(first_id, second_id, outcome)?;
        let mut state = self.state.write().await;

        let first_rating = state.rating_of(normalized.first_id)?;
        let second_rating = state.rating_of(normalized.second_id)?;

        let update = calculator.calculate(first_rating, second_rating, normalized.outcome);

        for (item_id, rating) in [
            (normalized.first_id, update.rating_a_after),
            (normalized.second_id, update.rating_b_after),
        ] {
            if let Some(item) = state.items.get_mut(&item_id) {
                item.rating = rating;
                item.matches_played += 1;
            }
        }

        state.last_match_id += 1;
        let record = normalized.record(state.last_match_id, &update);
        state.matches.push(record.clone());

        Ok(record)
    }

    async fn delete_item(&self, item_id: ItemId) -> Result<bool> {
        let mut state = self.state.write().await;

        if state.items.remove(&item_id).is_none() {
            return Ok(false);
        }
        state.matches.retain(|record| !record.involves(item_id));

        Ok(true)
    }

    async fn list_by_rating(&self) -> Result<Vec<Item>> {
        let state = self.state.read().await;

        let mut items: Vec<Item> = state.items.values().cloned().collect();
        items.sort_by(|a, b| b.rating.cmp(&a.rating).then(a.id.cmp(&b.id)));

        Ok(items)
    }

    async fn list_matches(&self, limit: Option<usize>) -> Result<Vec<MatchRecord>> {
        let state = self.state.read().await;

        let records = state.matches.iter().rev().cloned();
        Ok(match limit {
            Some(limit) => records.take(limit).collect(),
            None => records.collect(),
        })
    }

    async fn list_items(&self) -> Result<Vec<Item>> {
        let state = self.state.read().await;
        Ok(state.items.values().cloned().collect())
    }

    async fn item_count(&self) -> Result<usize> {
        let state = self.state.read().await;
        Ok(state.items.len())
    }
}
