//! Mapping of service errors onto HTTP responses

use crate::error::RankingError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// Error returned by route handlers
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl ApiError {
    /// HTTP status for the wrapped error
    pub fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<RankingError>() {
            Some(RankingError::ItemNotFound { .. }) => StatusCode::NOT_FOUND,
            Some(RankingError::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
            Some(RankingError::InsufficientItems { .. }) => StatusCode::CONFLICT,
            Some(RankingError::Unauthorized) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {:#}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(json!({
                "success": false,
                "error": message
            })),
        )
            .into_response()
    }
}
