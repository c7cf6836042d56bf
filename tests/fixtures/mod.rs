//! Test fixtures shared by the integration tests

#![allow(dead_code)]

use movie_elo::rating::{
    EloRatingCalculator, InMemoryRatingStore, RatingStore, SqliteRatingStore,
};
use movie_elo::service::RankingService;
use movie_elo::types::ItemId;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static DATABASE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Temporary on-disk SQLite database, removed on drop
pub struct TempDatabase {
    dir: PathBuf,
}

impl TempDatabase {
    pub fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "movie-elo-it-{}-{}-{}",
            name,
            std::process::id(),
            DATABASE_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}", self.dir.join("movies.db").display())
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// Ranking service over a fresh in-memory SQLite database
pub async fn sqlite_service() -> (RankingService, Arc<SqliteRatingStore>) {
    let store = Arc::new(SqliteRatingStore::in_memory().await.unwrap());
    let service = RankingService::new(store.clone(), Arc::new(EloRatingCalculator::default()));
    (service, store)
}

/// Ranking service over an on-disk SQLite database with a connection pool
pub async fn file_service(
    database: &TempDatabase,
    max_connections: u32,
) -> (RankingService, Arc<SqliteRatingStore>) {
    let store = Arc::new(
        SqliteRatingStore::connect(&database.url(), max_connections)
            .await
            .unwrap(),
    );
    let service = RankingService::new(store.clone(), Arc::new(EloRatingCalculator::default()));
    (service, store)
}

/// Ranking service over the in-memory store
pub fn memory_service() -> (RankingService, Arc<InMemoryRatingStore>) {
    let store = Arc::new(InMemoryRatingStore::new());
    let service = RankingService::new(store.clone(), Arc::new(EloRatingCalculator::default()));
    (service, store)
}

/// Add the given movies and return their ids in order
pub async fn seed_movies(service: &RankingService, names: &[&str]) -> Vec<ItemId> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.push(service.add_item(name, None).await.unwrap());
    }
    ids
}

pub async fn rating_of(store: &dyn RatingStore, item_id: ItemId) -> i64 {
    store.get_rating(item_id).await.unwrap().unwrap()
}

pub async fn matches_played(store: &dyn RatingStore, item_id: ItemId) -> i64 {
    store.get_item(item_id).await.unwrap().unwrap().matches_played
}
