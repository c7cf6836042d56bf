//! Match orchestration over the rating engine and store
//!
//! `RankingService` is the boundary the transport layer calls into: it
//! validates input, picks pairs, and hands each vote to the store as one
//! atomic read-compute-write unit.

use crate::error::{RankingError, Result};
use crate::metrics::MetricsCollector;
use crate::pairing::{PairSelection, PairingPolicy};
use crate::rating::{RatingCalculator, RatingStore};
use crate::types::{Item, ItemId, MatchOutcome, MatchRecord, NewItem};
use crate::utils::validate_item_id;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Maximum accepted length of a movie name, in characters
pub const MAX_NAME_LENGTH: usize = 200;

/// Two movies chosen for comparison, or the reason none could be chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingResult {
    Pair(Item, Item),
    InsufficientItems { available: usize },
}

impl PairingResult {
    /// Convert into the pair, surfacing a shortage as
    /// [`RankingError::InsufficientItems`]
    pub fn into_pair(self) -> Result<(Item, Item)> {
        match self {
            PairingResult::Pair(a, b) => Ok((a, b)),
            PairingResult::InsufficientItems { available } => {
                Err(RankingError::InsufficientItems { available }.into())
            }
        }
    }
}

/// Coordinates the rating engine, the store and pair selection
pub struct RankingService {
    store: Arc<dyn RatingStore>,
    calculator: Arc<dyn RatingCalculator>,
    pairing: PairingPolicy,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RankingService {
    pub fn new(store: Arc<dyn RatingStore>, calculator: Arc<dyn RatingCalculator>) -> Self {
        Self {
            store,
            calculator,
            pairing: PairingPolicy::default(),
            metrics: None,
        }
    }

    pub fn with_pairing(mut self, pairing: PairingPolicy) -> Self {
        self.pairing = pairing;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn store(&self) -> Arc<dyn RatingStore> {
        self.store.clone()
    }

    pub fn calculator(&self) -> Arc<dyn RatingCalculator> {
        self.calculator.clone()
    }

    /// Record a vote where `winner_id` beat `loser_id`
    pub async fn record_decisive_match(
        &self,
        winner_id: ItemId,
        loser_id: ItemId,
    ) -> Result<MatchRecord> {
        self.record(winner_id, loser_id, MatchOutcome::AWins).await
    }

    /// Record a tie between two movies
    pub async fn record_draw(&self, item_a_id: ItemId, item_b_id: ItemId) -> Result<MatchRecord> {
        self.record(item_a_id, item_b_id, MatchOutcome::Draw).await
    }

    async fn record(
        &self,
        first_id: ItemId,
        second_id: ItemId,
        outcome: MatchOutcome,
    ) -> Result<MatchRecord> {
        validate_item_id(first_id)?;
        validate_item_id(second_id)?;
        if first_id == second_id {
            return Err(RankingError::invalid("A movie cannot be matched against itself").into());
        }

        let start_time = Instant::now();
        let result = self
            .store
            .apply_match(first_id, second_id, outcome, self.calculator.as_ref())
            .await;
        let elapsed = start_time.elapsed();

        match &result {
            Ok(record) => {
                info!(
                    "Recorded {} match {} vs {}: {} -> {}, {} -> {} ({:.2}ms)",
                    outcome,
                    record.first_id,
                    record.second_id,
                    record.first_rating_before,
                    record.first_rating_after,
                    record.second_rating_before,
                    record.second_rating_after,
                    elapsed.as_secs_f64() * 1000.0
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_match(outcome, elapsed);
                }
            }
            Err(e) => {
                warn!(
                    "Failed to record {} match {} vs {}: {}",
                    outcome, first_id, second_id, e
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_match_error();
                }
            }
        }

        result
    }

    /// Acknowledge a skipped pair; ratings are left untouched
    pub fn skip(&self, pair: Option<(ItemId, ItemId)>) {
        match pair {
            Some((a, b)) => debug!("Pair {} vs {} skipped", a, b),
            None => debug!("Pair skipped"),
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_skip();
        }
    }

    /// Add a movie with the configured starting rating
    pub async fn add_item(&self, name: &str, image_url: Option<&str>) -> Result<ItemId> {
        let new_item = validate_new_item(name, image_url)?;
        let item = self
            .store
            .insert_item(new_item, self.calculator.initial_rating())
            .await?;

        info!("Added movie {} '{}'", item.id, item.name);
        if let Some(metrics) = &self.metrics {
            metrics.record_item_added();
        }
        Ok(item.id)
    }

    /// Delete a movie and its match history
    ///
    /// Fails with [`RankingError::ItemNotFound`] if nothing was deleted.
    pub async fn delete_item(&self, item_id: ItemId) -> Result<()> {
        validate_item_id(item_id)?;

        if !self.store.delete_item(item_id).await? {
            return Err(RankingError::ItemNotFound { item_id }.into());
        }

        info!("Deleted movie {}", item_id);
        if let Some(metrics) = &self.metrics {
            metrics.record_item_deleted();
        }
        Ok(())
    }

    /// Leaderboard, highest rating first
    pub async fn list_by_rating(&self) -> Result<Vec<Item>> {
        self.store.list_by_rating().await
    }

    /// Most recent matches first
    pub async fn match_history(&self, limit: Option<usize>) -> Result<Vec<MatchRecord>> {
        self.store.list_matches(limit).await
    }

    /// Choose two movies to compare, avoiding the previously shown pair
    ///
    /// Both movies come from one snapshot of the catalogue; nothing is
    /// looked up again after the draw.
    pub async fn pick_pair(&self, exclude: Option<(ItemId, ItemId)>) -> Result<PairingResult> {
        let mut snapshot: HashMap<ItemId, Item> = self
            .store
            .list_items()
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();
        let mut candidates: Vec<ItemId> = snapshot.keys().copied().collect();
        candidates.sort_unstable();

        let selection = {
            let mut rng = rand::rng();
            self.pairing.pick_pair(&candidates, exclude, &mut rng)
        };

        let result = match selection {
            PairSelection::Pair(a, b) => {
                let (Some(first), Some(second)) = (snapshot.remove(&a), snapshot.remove(&b))
                else {
                    return Err(RankingError::Storage {
                        message: format!("Paired ids {} and {} missing from snapshot", a, b),
                    }
                    .into());
                };
                debug!("Paired {} vs {}", first.id, second.id);
                PairingResult::Pair(first, second)
            }
            PairSelection::InsufficientItems { available } => {
                debug!("Cannot pair: only {} movies available", available);
                PairingResult::InsufficientItems { available }
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_pairing(matches!(result, PairingResult::Pair(..)));
        }
        Ok(result)
    }
}

/// Validate and normalise input for a new movie
pub fn validate_new_item(name: &str, image_url: Option<&str>) -> Result<NewItem> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RankingError::invalid("Movie name cannot be empty").into());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(RankingError::invalid(format!(
            "Movie name cannot exceed {} characters",
            MAX_NAME_LENGTH
        ))
        .into());
    }

    let image_url = image_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    Ok(NewItem {
        name: name.to_string(),
        image_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{EloRatingCalculator, InMemoryRatingStore};
    use async_trait::async_trait;

    fn service() -> RankingService {
        RankingService::new(
            Arc::new(InMemoryRatingStore::new()),
            Arc::new(EloRatingCalculator::default()),
        )
    }

    fn ranking_error(err: &anyhow::Error) -> &RankingError {
        err.downcast_ref::<RankingError>()
            .expect("expected a RankingError")
    }

    #[tokio::test]
    async fn test_vote_updates_leaderboard() {
        let service = service();
        let alien = service.add_item("Alien", None).await.unwrap();
        let brazil = service.add_item("Brazil", Some("b.jpg")).await.unwrap();

        let record = service.record_decisive_match(brazil, alien).await.unwrap();
        assert_eq!(record.first_id, brazil);
        assert_eq!(record.first_rating_after, 1516);

        let board = service.list_by_rating().await.unwrap();
        assert_eq!(board[0].id, brazil);
        assert_eq!(board[0].rating, 1516);
        assert_eq!(board[1].rating, 1484);
        assert!(board.iter().all(|item| item.matches_played == 1));
    }

    #[tokio::test]
    async fn test_draw_between_equals_changes_nothing_but_count() {
        let service = service();
        let a = service.add_item("Alien", None).await.unwrap();
        let b = service.add_item("Brazil", None).await.unwrap();

        let record = service.record_draw(a, b).await.unwrap();
        assert!(record.is_draw);
        assert_eq!(record.first_rating_after, 1500);
        assert_eq!(record.second_rating_after, 1500);

        let history = service.match_history(None).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_vote_for_unknown_item() {
        let service = service();
        let a = service.add_item("Alien", None).await.unwrap();

        let err = service.record_decisive_match(a, 77).await.unwrap_err();
        assert!(matches!(
            ranking_error(&err),
            RankingError::ItemNotFound { item_id: 77 }
        ));

        let err = service.record_draw(77, a).await.unwrap_err();
        assert!(matches!(
            ranking_error(&err),
            RankingError::ItemNotFound { item_id: 77 }
        ));
    }

    #[tokio::test]
    async fn test_invalid_match_input() {
        let service = service();
        let a = service.add_item("Alien", None).await.unwrap();

        for (first, second) in [(a, a), (0, a), (a, -1)] {
            let err = service.record_decisive_match(first, second).await.unwrap_err();
            assert!(matches!(
                ranking_error(&err),
                RankingError::InvalidInput { .. }
            ));
        }
    }

    #[tokio::test]
    async fn test_add_item_validation() {
        let service = service();

        let err = service.add_item("   ", None).await.unwrap_err();
        assert!(matches!(
            ranking_error(&err),
            RankingError::InvalidInput { .. }
        ));

        let long_name = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(service.add_item(&long_name, None).await.is_err());

        let id = service.add_item("  Heat  ", Some("  ")).await.unwrap();
        let item = service.store().get_item(id).await.unwrap().unwrap();
        assert_eq!(item.name, "Heat");
        assert!(item.image_url.is_none());
        assert_eq!(item.rating, 1500);
    }

    #[tokio::test]
    async fn test_delete_item() {
        let service = service();
        let a = service.add_item("Alien", None).await.unwrap();
        let b = service.add_item("Brazil", None).await.unwrap();
        service.record_decisive_match(a, b).await.unwrap();

        service.delete_item(a).await.unwrap();
        assert!(service.match_history(None).await.unwrap().is_empty());

        let err = service.delete_item(a).await.unwrap_err();
        assert!(matches!(
            ranking_error(&err),
            RankingError::ItemNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_pick_pair() {
        let service = service();

        let result = service.pick_pair(None).await.unwrap();
        assert_eq!(result, PairingResult::InsufficientItems { available: 0 });
        assert!(matches!(
            ranking_error(&result.into_pair().unwrap_err()),
            RankingError::InsufficientItems { available: 0 }
        ));

        let a = service.add_item("Alien", None).await.unwrap();
        let b = service.add_item("Brazil", None).await.unwrap();

        let (first, second) = service
            .pick_pair(Some((a, b)))
            .await
            .unwrap()
            .into_pair()
            .unwrap();
        let mut ids = [first.id, second.id];
        ids.sort();
        assert_eq!(ids, [a, b]);
    }

    #[tokio::test]
    async fn test_metrics_recorded() {
        let metrics = Arc::new(MetricsCollector::new().unwrap());
        let service = service().with_metrics(metrics.clone());

        let a = service.add_item("Alien", None).await.unwrap();
        let b = service.add_item("Brazil", None).await.unwrap();
        service.record_decisive_match(a, b).await.unwrap();
        service.record_draw(a, b).await.unwrap();
        let _ = service.record_draw(a, 999).await;
        service.skip(Some((a, b)));
        service.pick_pair(None).await.unwrap();

        assert_eq!(metrics.items().items_added_total.get(), 2);
        assert_eq!(metrics.matches().match_errors_total.get(), 1);
        assert_eq!(metrics.matches().skips_total.get(), 1);
        assert_eq!(
            metrics
                .matches()
                .matches_recorded_total
                .with_label_values(&["draw"])
                .get(),
            1
        );
    }

    /// Store whose writes always fail, for error propagation tests
    struct FailingStore;

    #[async_trait]
    impl RatingStore for FailingStore {
        async fn get_item(&self, _item_id: ItemId) -> Result<Option<Item>> {
            Ok(None)
        }

        async fn get_rating(&self, _item_id: ItemId) -> Result<Option<i64>> {
            Ok(None)
        }

        async fn insert_item(&self, _item: NewItem, _initial_rating: i64) -> Result<Item> {
            Err(RankingError::Storage {
                message: "disk full".to_string(),
            }
            .into())
        }

        async fn apply_match(
            &self,
            _first_id: ItemId,
            _second_id: ItemId,
            _outcome: MatchOutcome,
            _calculator: &dyn RatingCalculator,
        ) -> Result<MatchRecord> {
            Err(RankingError::Storage {
                message: "disk full".to_string(),
            }
            .into())
        }

        async fn delete_item(&self, _item_id: ItemId) -> Result<bool> {
            Ok(false)
        }

        async fn list_by_rating(&self) -> Result<Vec<Item>> {
            Ok(Vec::new())
        }

        async fn list_matches(&self, _limit: Option<usize>) -> Result<Vec<MatchRecord>> {
            Ok(Vec::new())
        }

        async fn list_items(&self) -> Result<Vec<Item>> {
            Err(RankingError::Storage {
                message: "database is locked".to_string(),
            }
            .into())
        }

        async fn item_count(&self) -> Result<usize> {
            Ok(2)
        }
    }

    #[tokio::test]
    async fn test_storage_failures_propagate() {
        let service = RankingService::new(
            Arc::new(FailingStore),
            Arc::new(EloRatingCalculator::default()),
        );

        let err = service.record_decisive_match(1, 2).await.unwrap_err();
        assert!(matches!(ranking_error(&err), RankingError::Storage { .. }));

        let err = service.add_item("Alien", None).await.unwrap_err();
        assert!(matches!(ranking_error(&err), RankingError::Storage { .. }));

        let err = service.pick_pair(None).await.unwrap_err();
        assert!(matches!(ranking_error(&err), RankingError::Storage { .. }));
    }

    /// In-memory store that deletes a movie right after handing out a snapshot
    struct DeletingAfterListStore {
        inner: InMemoryRatingStore,
        victim: ItemId,
    }

    #[async_trait]
    impl RatingStore for DeletingAfterListStore {
        async fn get_item(&self, item_id: ItemId) -> Result<Option<Item>> {
            self.inner.get_item(item_id).await
        }

        async fn get_rating(&self, item_id: ItemId) -> Result<Option<i64>> {
            self.inner.get_rating(item_id).await
        }

        async fn insert_item(&self, item: NewItem, initial_rating: i64) -> Result<Item> {
            self.inner.insert_item(item, initial_rating).await
        }

        async fn apply_match(
            &self,
            first_id: ItemId,
            second_id: ItemId,
            outcome: MatchOutcome,
            calculator: &dyn RatingCalculator,
        ) -> Result<MatchRecord> {
            self.inner
                .apply_match(first_id, second_id, outcome, calculator)
                .await
        }

        async fn delete_item(&self, item_id: ItemId) -> Result<bool> {
            self.inner.delete_item(item_id).await
        }

        async fn list_by_rating(&self) -> Result<Vec<Item>> {
            self.inner.list_by_rating().await
        }

        async fn list_matches(&self, limit: Option<usize>) -> Result<Vec<MatchRecord>> {
            self.inner.list_matches(limit).await
        }

        async fn list_items(&self) -> Result<Vec<Item>> {
            let snapshot = self.inner.list_items().await?;
            self.inner.delete_item(self.victim).await?;
            Ok(snapshot)
        }

        async fn item_count(&self) -> Result<usize> {
            self.inner.item_count().await
        }
    }

    #[tokio::test]
    async fn test_pick_pair_survives_delete_after_snapshot() {
        let inner = InMemoryRatingStore::new();
        for name in ["Alien", "Brazil"] {
            inner
                .insert_item(
                    NewItem {
                        name: name.to_string(),
                        image_url: None,
                    },
                    crate::types::DEFAULT_RATING,
                )
                .await
                .unwrap();
        }
        let store = Arc::new(DeletingAfterListStore { inner, victim: 1 });
        let service = RankingService::new(store.clone(), Arc::new(EloRatingCalculator::default()));

        // The pair comes from the catalogue as listed, before movie 1 went away
        let (first, second) = service
            .pick_pair(None)
            .await
            .unwrap()
            .into_pair()
            .unwrap();
        let mut ids = [first.id, second.id];
        ids.sort();
        assert_eq!(ids, [1, 2]);
        assert!(store.inner.get_item(1).await.unwrap().is_none());
    }
}
