//! Metrics and monitoring for the movie-elo service

pub mod collector;

pub use collector::{ItemMetrics, MatchMetrics, MetricsCollector};
