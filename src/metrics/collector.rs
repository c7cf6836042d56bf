//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the movie-elo service using
//! Prometheus metrics.

use crate::types::MatchOutcome;
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Main metrics collector for the ranking service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Match-related metrics
    match_metrics: MatchMetrics,

    /// Catalogue metrics
    item_metrics: ItemMetrics,
}

/// Match-related metrics
#[derive(Clone)]
pub struct MatchMetrics {
    /// Matches recorded, by outcome (decisive/draw)
    pub matches_recorded_total: IntCounterVec,

    /// Failed attempts to record a match
    pub match_errors_total: IntCounter,

    /// Time spent in the read-compute-write cycle of a match
    pub match_record_duration_seconds: Histogram,

    /// Pairing requests, by result (paired/insufficient)
    pub pairings_total: IntCounterVec,

    /// Pairs skipped without a vote
    pub skips_total: IntCounter,
}

/// Catalogue metrics
#[derive(Clone)]
pub struct ItemMetrics {
    /// Movies added
    pub items_added_total: IntCounter,

    /// Movies deleted
    pub items_deleted_total: IntCounter,

    /// Movies currently stored
    pub items: IntGauge,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let match_metrics = MatchMetrics::new(&registry)?;
        let item_metrics = ItemMetrics::new(&registry)?;

        Ok(Self {
            registry,
            match_metrics,
            item_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn matches(&self) -> &MatchMetrics {
        &self.match_metrics
    }

    pub fn items(&self) -> &ItemMetrics {
        &self.item_metrics
    }

    /// Record a successfully stored match
    pub fn record_match(&self, outcome: MatchOutcome, duration: Duration) {
        let label = match outcome {
            MatchOutcome::Draw => "draw",
            MatchOutcome::AWins | MatchOutcome::BWins => "decisive",
        };

        self.match_metrics
            .matches_recorded_total
            .with_label_values(&[label])
            .inc();
        self.match_metrics
            .match_record_duration_seconds
            .observe(duration.as_secs_f64());
    }

    pub fn record_match_error(&self) {
        self.match_metrics.match_errors_total.inc();
    }

    /// Record the result of a pairing request
    pub fn record_pairing(&self, paired: bool) {
        let label = if paired { "paired" } else { "insufficient" };
        self.match_metrics
            .pairings_total
            .with_label_values(&[label])
            .inc();
    }

    pub fn record_skip(&self) {
        self.match_metrics.skips_total.inc();
    }

    pub fn record_item_added(&self) {
        self.item_metrics.items_added_total.inc();
        self.item_metrics.items.inc();
    }

    pub fn record_item_deleted(&self) {
        self.item_metrics.items_deleted_total.inc();
        self.item_metrics.items.dec();
    }

    /// Reset the stored-movie gauge from an authoritative count
    pub fn set_item_count(&self, count: usize) {
        self.item_metrics.items.set(count as i64);
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let metric_families = self.registry.gather();
        TextEncoder::new()
            .encode_to_string(&metric_families)
            .map_err(|e| anyhow::anyhow!("Failed to encode metrics: {}", e))
    }

    /// Content type of [`MetricsCollector::render`] output
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}

impl MatchMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let matches_recorded_total = IntCounterVec::new(
            Opts::new(
                "movie_elo_matches_recorded_total",
                "Total matches recorded",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(matches_recorded_total.clone()))?;

        let match_errors_total = IntCounter::new(
            "movie_elo_match_errors_total",
            "Total failed match recordings",
        )?;
        registry.register(Box::new(match_errors_total.clone()))?;

        let match_record_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "movie_elo_match_record_duration_seconds",
                "Time to record a match",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(match_record_duration_seconds.clone()))?;

        let pairings_total = IntCounterVec::new(
            Opts::new("movie_elo_pairings_total", "Total pairing requests"),
            &["result"],
        )?;
        registry.register(Box::new(pairings_total.clone()))?;

        let skips_total = IntCounter::new("movie_elo_skips_total", "Total skipped pairs")?;
        registry.register(Box::new(skips_total.clone()))?;

        Ok(Self {
            matches_recorded_total,
            match_errors_total,
            match_record_duration_seconds,
            pairings_total,
            skips_total,
        })
    }
}

impl ItemMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let items_added_total =
            IntCounter::new("movie_elo_items_added_total", "Total movies added")?;
        registry.register(Box::new(items_added_total.clone()))?;

        let items_deleted_total =
            IntCounter::new("movie_elo_items_deleted_total", "Total movies deleted")?;
        registry.register(Box::new(items_deleted_total.clone()))?;

        let items = IntGauge::new("movie_elo_items", "Movies currently stored")?;
        registry.register(Box::new(items.clone()))?;

        Ok(Self {
            items_added_total,
            items_deleted_total,
            items,
        })
    }
}
