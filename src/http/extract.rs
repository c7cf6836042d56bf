//! Request extractors that report malformed input in the API error shape
//!
//! axum's stock `Json`, `Query` and `Path` extractors reject bad input with a
//! plain-text body. These wrappers run the same extraction and turn any
//! rejection into [`RankingError::InvalidInput`], answered as a JSON 400.

use crate::error::RankingError;
use crate::http::error::ApiError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;

/// JSON request body
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

/// Query string parameters
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

/// Path parameters
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

fn invalid(kind: &str, detail: String) -> ApiError {
    debug!("Rejected malformed {}: {}", kind, detail);
    RankingError::invalid(detail).into()
}

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(invalid("body", json_detail(&rejection))),
        }
    }
}

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(invalid("query", query_detail(&rejection))),
        }
    }
}

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(invalid("path", path_detail(&rejection))),
        }
    }
}

fn json_detail(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Request body must be JSON (Content-Type: application/json)".to_string()
        }
        other => format!("Invalid JSON body: {}", other.body_text()),
    }
}

fn query_detail(rejection: &QueryRejection) -> String {
    format!("Invalid query string: {}", rejection.body_text())
}

fn path_detail(rejection: &PathRejection) -> String {
    format!("Invalid path: {}", rejection.body_text())
}
