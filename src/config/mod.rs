//! Configuration management for the movie-elo service
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{
    validate_config, AdminSettings, AppConfig, ConfigOverrides, DatabaseSettings,
    ServiceSettings, MEMORY_DATABASE_URL,
};
pub use rating::RatingSettings;
