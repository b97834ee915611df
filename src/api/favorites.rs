//! Favorite listing and management.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{require_identity, AppState};
use crate::domain::{CompositeKey, Favorite, FavoriteDraft, MediaType, SortOrder};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutFavoriteRequest {
    pub movie_id: String,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub year: Option<String>,
    pub platform: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFavoriteQuery {
    pub movie_id: Option<String>,
    pub media_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesResponse {
    pub items: Vec<Favorite>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub item: Favorite,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedResponse {
    pub success: bool,
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FavoritesResponse>, AppError> {
    let identity = require_identity(&headers, &state.config)?;
    let items = state
        .repo
        .list_favorites(&identity.user_id, SortOrder::Desc)
        .await?;
    Ok(Json(FavoritesResponse { items }))
}

pub async fn put(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PutFavoriteRequest>,
) -> Result<Json<FavoriteResponse>, AppError> {
    let identity = require_identity(&headers, &state.config)?;

    if req.movie_id.trim().is_empty() {
        return Err(AppError::BadRequest("movieId is required".to_string()));
    }
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_string()));
    }

    let key = CompositeKey::new(identity.user_id, req.movie_id, req.media_type);
    let draft = FavoriteDraft {
        title: req.title,
        poster_path: req.poster_path,
        year: req.year,
        platform: req.platform,
    };

    let item = state.repo.upsert_favorite(&key, &draft).await?;
    Ok(Json(FavoriteResponse { item }))
}

/// Removing a favorite that does not exist still reports success; absence is
/// the state the caller asked for.
pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RemoveFavoriteQuery>,
) -> Result<Json<RemovedResponse>, AppError> {
    let identity = require_identity(&headers, &state.config)?;

    let movie_id = params
        .movie_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("movieId is required".to_string()))?;
    let media_type = MediaType::from_query(params.media_type.as_deref());

    state
        .repo
        .delete_favorite(&CompositeKey::new(identity.user_id, movie_id, media_type))
        .await?;
    Ok(Json(RemovedResponse { success: true }))
}
