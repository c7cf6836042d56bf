//! Route handlers
//!
//! Handlers only translate between JSON and the ranking service; all rules
//! live in [`RankingService`](crate::service::RankingService).

use crate::http::admin::AdminCapability;
use crate::http::error::ApiError;
use crate::http::extract::{ApiJson, ApiPath, ApiQuery};
use crate::service::{AppState, HealthCheck, HealthStatus, PairingResult};
use crate::types::{Item, ItemId, MatchRecord};
use crate::utils::parse_pair;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// Message shown when there is nothing to compare
pub const INSUFFICIENT_ITEMS_MESSAGE: &str = "You need at least 2 movies to start matching!";

/// Default number of history entries returned
const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    /// Previously shown pair as `"a,b"`
    pub exclude: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SkipQuery {
    /// Skipped pair as `"a,b"`
    pub pair: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(deserialize_with = "lenient_id")]
    pub winner_id: ItemId,
    #[serde(deserialize_with = "lenient_id")]
    pub loser_id: ItemId,
}

#[derive(Debug, Deserialize)]
pub struct TieRequest {
    #[serde(deserialize_with = "lenient_id")]
    pub movie_a_id: ItemId,
    #[serde(deserialize_with = "lenient_id")]
    pub movie_b_id: ItemId,
}

/// Movie id sent either as a JSON integer or as a decimal string (`"3"`)
fn lenient_id<'de, D>(deserializer: D) -> Result<ItemId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(ItemId),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("movie id must be an integer, got {:?}", text))
        }),
    }
}

#[derive(Debug, Deserialize)]
pub struct AddMovieRequest {
    pub name: String,
    pub image_url: Option<String>,
}

/// Response to a recorded vote or tie
#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub success: bool,
    #[serde(rename = "match")]
    pub record: MatchRecord,
}

/// One leaderboard row
#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub id: ItemId,
    pub name: String,
    pub image_url: Option<String>,
    pub rating: i64,
    pub matches_played: i64,
}

pub async fn root_handler() -> Redirect {
    Redirect::to("/match")
}

/// Two movies to compare, avoiding the previously shown pair
pub async fn match_handler(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<MatchQuery>,
) -> Result<Response, ApiError> {
    let exclude = query.exclude.as_deref().map(parse_pair).transpose()?;

    let response = match state.ranking().pick_pair(exclude).await? {
        PairingResult::Pair(first, second) => Json(json!({ "items": [first, second] })),
        PairingResult::InsufficientItems { available } => Json(json!({
            "error": INSUFFICIENT_ITEMS_MESSAGE,
            "available": available
        })),
    };

    Ok(response.into_response())
}

pub async fn vote_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<VoteRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    debug!(
        "Vote received: {} beats {}",
        request.winner_id, request.loser_id
    );

    let record = state
        .ranking()
        .record_decisive_match(request.winner_id, request.loser_id)
        .await?;

    Ok(Json(MatchResponse {
        success: true,
        record,
    }))
}

pub async fn tie_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<TieRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    debug!(
        "Tie received: {} and {}",
        request.movie_a_id, request.movie_b_id
    );

    let record = state
        .ranking()
        .record_draw(request.movie_a_id, request.movie_b_id)
        .await?;

    Ok(Json(MatchResponse {
        success: true,
        record,
    }))
}

pub async fn skip_handler(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SkipQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pair = query.pair.as_deref().map(parse_pair).transpose()?;
    state.ranking().skip(pair);

    Ok(Json(json!({ "success": true })))
}

pub async fn leaderboard_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let items = state.ranking().list_by_rating().await?;

    let entries = items
        .into_iter()
        .enumerate()
        .map(|(index, item): (usize, Item)| LeaderboardEntry {
            rank: index + 1,
            id: item.id,
            name: item.name,
            image_url: item.image_url,
            rating: item.rating,
            matches_played: item.matches_played,
        })
        .collect();

    Ok(Json(entries))
}

pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> Result<Json<Vec<MatchRecord>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let records = state.ranking().match_history(Some(limit)).await?;
    Ok(Json(records))
}

pub async fn add_handler(
    _admin: AdminCapability,
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<AddMovieRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let id = state
        .ranking()
        .add_item(&request.name, request.image_url.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "id": id })),
    ))
}

pub async fn delete_handler(
    _admin: AdminCapability,
    State(state): State<Arc<AppState>>,
    ApiPath(item_id): ApiPath<ItemId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.ranking().delete_item(item_id).await?;

    Ok(Json(json!({ "success": true })))
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = HealthCheck::check(state).await;
    let status = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(health))
}

/// Prometheus metrics endpoint handler
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let metrics = state.metrics();

    match metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, metrics.content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}
