//! Error types for the ranking service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

use crate::types::ItemId;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ranking scenarios
#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("Movie not found: {item_id}")]
    ItemNotFound { item_id: ItemId },

    #[error("Not enough movies to form a pair: {available} available, 2 required")]
    InsufficientItems { available: usize },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Admin capability required")]
    Unauthorized,

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl RankingError {
    /// Shorthand for an [`RankingError::InvalidInput`] with a formatted reason
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
