//! Service layer: ranking orchestration, application state and health

pub mod app;
pub mod health;
pub mod ranking;

pub use app::{AppState, ServiceError};
pub use health::{HealthCheck, HealthStatus};
pub use ranking::{PairingResult, RankingService};
