//! Search history listing and appends.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{require_identity, AppState};
use crate::domain::SearchHistoryEntry;
use crate::error::AppError;

const HISTORY_PAGE_SIZE: i64 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendHistoryRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub items: Vec<SearchHistoryEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItemResponse {
    pub item: SearchHistoryEntry,
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<HistoryResponse>, AppError> {
    let identity = require_identity(&headers, &state.config)?;
    let items = state
        .repo
        .list_search_history(&identity.user_id, HISTORY_PAGE_SIZE)
        .await?;
    Ok(Json(HistoryResponse { items }))
}

/// Append a query, suppressing a consecutive duplicate of the latest entry
/// (case-insensitive). The store itself never deduplicates; that policy
/// lives here.
pub async fn append(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AppendHistoryRequest>,
) -> Result<Json<HistoryItemResponse>, AppError> {
    let identity = require_identity(&headers, &state.config)?;

    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err(AppError::BadRequest("query is required".to_string()));
    }

    if let Some(latest) = state.repo.latest_search_history(&identity.user_id).await? {
        if latest.query.to_lowercase() == query.to_lowercase() {
            return Ok(Json(HistoryItemResponse { item: latest }));
        }
    }

    let item = state
        .repo
        .append_search_history(&identity.user_id, &query)
        .await?;
    Ok(Json(HistoryItemResponse { item }))
}
