//! Main application state and service coordination
//!
//! This module contains the AppState that wires the configured rating store,
//! the rating engine, metrics and the ranking service together.

use crate::config::AppConfig;
use crate::metrics::MetricsCollector;
use crate::rating::{
    EloCalculatorConfig, EloRatingCalculator, InMemoryRatingStore, RatingStore,
    SqliteRatingStore,
};
use crate::service::ranking::RankingService;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    Storage { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Orchestrator behind every route
    ranking: Arc<RankingService>,

    /// Metrics collector shared with the HTTP layer
    metrics: Arc<MetricsCollector>,

    /// When the service was initialised
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Initialize the application with all dependencies
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing movie-elo service");
        info!(
            "Configuration: service={}, database={}",
            config.service.name, config.database.url
        );

        let store = Self::initialize_store(&config).await?;
        Self::with_store(config, store).await
    }

    /// Initialize the application around an already constructed store
    pub async fn with_store(
        config: AppConfig,
        store: Arc<dyn RatingStore>,
    ) -> Result<Self, ServiceError> {
        let calculator = EloRatingCalculator::new(EloCalculatorConfig::from(&config.rating))
            .map_err(|e| ServiceError::Configuration {
                message: e.to_string(),
            })?;

        let metrics =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );

        let item_count = store
            .item_count()
            .await
            .map_err(|e| ServiceError::Storage {
                message: e.to_string(),
            })?;
        metrics.set_item_count(item_count);
        info!("Rating store holds {} movies", item_count);

        let ranking = Arc::new(
            RankingService::new(store, Arc::new(calculator)).with_metrics(metrics.clone()),
        );

        Ok(Self {
            config,
            ranking,
            metrics,
            started_at: Utc::now(),
        })
    }

    async fn initialize_store(config: &AppConfig) -> Result<Arc<dyn RatingStore>, ServiceError> {
        if config.uses_memory_store() {
            info!("Using in-memory rating store; data will not survive restarts");
            return Ok(Arc::new(InMemoryRatingStore::new()));
        }

        let store =
            SqliteRatingStore::connect(&config.database.url, config.database.max_connections)
                .await
                .map_err(|e| ServiceError::Storage {
                    message: format!("{:#}", e),
                })?;
        Ok(Arc::new(store))
    }

    /// Get application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the ranking service
    pub fn ranking(&self) -> Arc<RankingService> {
        self.ranking.clone()
    }

    /// Get the metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Admin token, if admin routes are enabled
    pub fn admin_token(&self) -> Option<&str> {
        self.config.admin.token.as_deref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MEMORY_DATABASE_URL;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = MEMORY_DATABASE_URL.to_string();
        config
    }

    #[tokio::test]
    async fn test_app_state_with_memory_store() {
        let state = AppState::new(memory_config()).await.unwrap();

        let ranking = state.ranking();
        ranking.add_item("Alien", None).await.unwrap();
        assert_eq!(state.metrics().items().items.get(), 1);
        assert!(state.admin_token().is_none());
    }

    #[tokio::test]
    async fn test_rating_settings_applied() {
        let mut config = memory_config();
        config.rating.k_factor = 16.0;
        config.rating.initial_rating = 1200;
        let state = AppState::new(config).await.unwrap();

        let ranking = state.ranking();
        let a = ranking.add_item("Alien", None).await.unwrap();
        let b = ranking.add_item("Brazil", None).await.unwrap();
        let record = ranking.record_decisive_match(a, b).await.unwrap();
        assert_eq!(record.first_rating_before, 1200);
        assert_eq!(record.first_rating_after, 1208);
    }

    #[tokio::test]
    async fn test_invalid_rating_settings_rejected() {
        let mut config = memory_config();
        config.rating.k_factor = 0.0;

        let result = AppState::new(config).await;
        assert!(matches!(result, Err(ServiceError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_existing_items_seed_gauge() {
        let store = Arc::new(InMemoryRatingStore::new());
        store
            .insert_item(
                crate::types::NewItem {
                    name: "Alien".to_string(),
                    image_url: None,
                },
                1500,
            )
            .await
            .unwrap();

        let state = AppState::with_store(memory_config(), store).await.unwrap();
        assert_eq!(state.metrics().items().items.get(), 1);
    }
}
