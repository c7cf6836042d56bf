//! Health check and monitoring
//!
//! This module provides health check functionality for the movie-elo service.

use crate::service::app::AppState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Seconds since the service was initialised
    pub uptime_seconds: i64,
    /// Number of stored movies, when the store answered
    pub movies: Option<usize>,
    /// Store error, when it did not
    pub message: Option<String>,
}

impl HealthCheck {
    /// Check that the rating store answers queries
    pub async fn check(app_state: Arc<AppState>) -> Self {
        let start_time = std::time::Instant::now();
        let now = chrono::Utc::now();

        let (status, movies, message) = match app_state.ranking().store().item_count().await {
            Ok(count) => (HealthStatus::Healthy, Some(count), None),
            Err(e) => {
                error!("Rating store health check failed: {}", e);
                (HealthStatus::Unhealthy, None, Some(e.to_string()))
            }
        };

        debug!(
            "Health check completed in {:.2}ms",
            start_time.elapsed().as_secs_f64() * 1000.0
        );

        HealthCheck {
            status,
            service: app_state.config().service.name.clone(),
            version: crate::VERSION.to_string(),
            timestamp: now,
            uptime_seconds: (now - app_state.started_at()).num_seconds(),
            movies,
            message,
        }
    }
}
