//! SQLite-backed rating storage
//!
//! Movies and match history live in the `movies` and `matches` tables created
//! by the embedded migrations. Mutating operations run inside a transaction;
//! writers additionally take an async mutex so that concurrent votes on a
//! shared movie serialize their read-modify-write instead of racing.

use crate::error::{RankingError, Result};
use crate::rating::calculator::RatingCalculator;
use crate::rating::storage::{NormalizedMatch, RatingStore};
use crate::types::{Item, ItemId, MatchOutcome, MatchRecord, NewItem};
use crate::utils::current_timestamp;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::SqliteConnection;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Column list for the `movies` table.
const MOVIE_COLUMNS: &str = "id, name, image_url, elo_rating, matches_played, created_at";

/// Column list for the `matches` table.
const MATCH_COLUMNS: &str = "id, winner_id, loser_id, winner_elo_before, loser_elo_before, \
    winner_elo_after, loser_elo_after, is_draw, match_date";

#[derive(Debug, sqlx::FromRow)]
struct MovieRow {
    id: i64,
    name: String,
    image_url: Option<String>,
    elo_rating: i64,
    matches_played: i64,
    created_at: DateTime<Utc>,
}

impl From<MovieRow> for Item {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image_url: row.image_url,
            rating: row.elo_rating,
            matches_played: row.matches_played,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MatchRow {
    id: i64,
    winner_id: i64,
    loser_id: i64,
    winner_elo_before: i64,
    loser_elo_before: i64,
    winner_elo_after: i64,
    loser_elo_after: i64,
    is_draw: bool,
    match_date: DateTime<Utc>,
}

impl From<MatchRow> for MatchRecord {
    fn from(row: MatchRow) -> Self {
        Self {
            id: row.id,
            first_id: row.winner_id,
            second_id: row.loser_id,
            first_rating_before: row.winner_elo_before,
            second_rating_before: row.loser_elo_before,
            first_rating_after: row.winner_elo_after,
            second_rating_after: row.loser_elo_after,
            is_draw: row.is_draw,
            played_at: row.match_date,
        }
    }
}

/// Rating store persisting to a SQLite database
#[derive(Debug)]
pub struct SqliteRatingStore {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl SqliteRatingStore {
    /// Connect to (and create if missing) the database at `url`, then run
    /// pending migrations
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database URL: {}", url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database {}", url))?;

        let store = Self::from_pool(pool);
        store.migrate().await?;

        info!("Rating store ready at {}", url);
        Ok(store)
    }

    /// Open a private in-memory database (one connection, never recycled)
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Wrap an existing pool; the caller is responsible for migrations
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_rating(conn: &mut SqliteConnection, item_id: ItemId) -> Result<i64> {
        let rating: Option<i64> = sqlx::query_scalar("SELECT elo_rating FROM movies WHERE id = ?")
            .bind(item_id)
            .fetch_optional(&mut *conn)
            .await?;

        rating.ok_or_else(|| RankingError::ItemNotFound { item_id }.into())
    }

    async fn store_rating(conn: &mut SqliteConnection, item_id: ItemId, rating: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE movies SET elo_rating = ?, matches_played = matches_played + 1 WHERE id = ?",
        )
        .bind(rating)
        .bind(item_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() != 1 {
            return Err(RankingError::Storage {
                message: format!("Rating update for movie {} touched no rows", item_id),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl RatingStore for SqliteRatingStore {
    async fn get_item(&self, item_id: ItemId) -> Result<Option<Item>> {
        let query = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?");
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Item::from))
    }

    async fn get_rating(&self, item_id: ItemId) -> Result<Option<i64>> {
        let rating = sqlx::query_scalar("SELECT elo_rating FROM movies WHERE id = ?")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rating)
    }

    async fn insert_item(&self, item: NewItem, initial_rating: i64) -> Result<Item> {
        let query = format!(
            "INSERT INTO movies (name, image_url, elo_rating, matches_played, created_at) \
             VALUES (?, ?, ?, 0, ?) \
             RETURNING {MOVIE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(&item.name)
            .bind(&item.image_url)
            .bind(initial_rating)
            .bind(current_timestamp())
            .fetch_one(&self.pool)
            .await?;

        debug!("Inserted movie {} ({})", row.id, row.name);
        Ok(row.into())
    }

    async fn apply_match(
        &self,
        first_id: ItemId,
        second_id: ItemId,
        outcome: MatchOutcome,
        calculator: &dyn RatingCalculator,
    ) -> Result<MatchRecord> {
        let normalized = NormalizedMatch::new(first_id, second_id, outcome)?;

        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let first_rating = Self::fetch_rating(&mut tx, normalized.first_id).await?;
        let second_rating = Self::fetch_rating(&mut tx, normalized.second_id).await?;

        let update = calculator.calculate(first_rating, second_rating, normalized.outcome);

        Self::store_rating(&mut tx, normalized.first_id, update.rating_a_after).await?;
        Self::store_rating(&mut tx, normalized.second_id, update.rating_b_after).await?;

        let mut record = normalized.record(0, &update);
        let result = sqlx::query(
            "INSERT INTO matches \
                (winner_id, loser_id, winner_elo_before, loser_elo_before, \
                 winner_elo_after, loser_elo_after, is_draw, match_date) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.first_id)
        .bind(record.second_id)
        .bind(record.first_rating_before)
        .bind(record.second_rating_before)
        .bind(record.first_rating_after)
        .bind(record.second_rating_after)
        .bind(record.is_draw)
        .bind(record.played_at)
        .execute(&mut *tx)
        .await?;
        record.id = result.last_insert_rowid();

        tx.commit().await?;
        Ok(record)
    }

    async fn delete_item(&self, item_id: ItemId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let removed_matches = sqlx::query("DELETE FROM matches WHERE winner_id = ? OR loser_id = ?")
            .bind(item_id)
            .bind(item_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let removed = sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(item_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if removed > 0 {
            debug!(
                "Deleted movie {} and {} match records",
                item_id, removed_matches
            );
        }
        Ok(removed > 0)
    }

    async fn list_by_rating(&self) -> Result<Vec<Item>> {
        let query = format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY elo_rating DESC, id ASC");
        let rows = sqlx::query_as::<_, MovieRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn list_matches(&self, limit: Option<usize>) -> Result<Vec<MatchRecord>> {
        // LIMIT -1 means no limit in SQLite
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let query = format!("SELECT {MATCH_COLUMNS} FROM matches ORDER BY id DESC LIMIT ?");
        let rows = sqlx::query_as::<_, MatchRow>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(MatchRecord::from).collect())
    }

    async fn list_items(&self) -> Result<Vec<Item>> {
        let query = format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY id");
        let rows = sqlx::query_as::<_, MovieRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn item_count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}
