//! Admin capability check for catalogue mutations
//!
//! Adding and removing movies requires the configured admin token in the
//! `x-admin-token` header. The check happens here, before the ranking service
//! is invoked; the service itself has no notion of callers.

use crate::error::RankingError;
use crate::http::error::ApiError;
use crate::service::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;
use tracing::warn;

/// Header carrying the admin token
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Proof that the request carried a valid admin token
#[derive(Debug, Clone, Copy)]
pub struct AdminCapability;

impl AdminCapability {
    /// Check a provided token against the configured one
    pub fn verify(expected: Option<&str>, provided: Option<&str>) -> Result<Self, RankingError> {
        let Some(expected) = expected else {
            warn!("Admin request rejected: admin routes are disabled (no token configured)");
            return Err(RankingError::Unauthorized);
        };

        match provided {
            Some(provided) if provided == expected => Ok(AdminCapability),
            Some(_) => {
                warn!("Admin request rejected: invalid token");
                Err(RankingError::Unauthorized)
            }
            None => {
                warn!("Admin request rejected: missing {} header", ADMIN_TOKEN_HEADER);
                Err(RankingError::Unauthorized)
            }
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AdminCapability {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());

        Ok(Self::verify(state.admin_token(), provided)?)
    }
}
