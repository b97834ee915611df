//! Rating submission and community-average lookups.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{bearer_identity, require_identity, AppState};
use crate::domain::{CompositeKey, MediaType, Rating, RatingDraft, SubjectKey};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutRatingRequest {
    pub movie_id: String,
    pub media_type: MediaType,
    pub value: i64,
    pub movie_title: Option<String>,
    pub poster_path: Option<String>,
    pub year: Option<String>,
    pub platform: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub rating: Rating,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub media_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub average: Option<f64>,
    pub votes: i64,
    pub my_rating: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityRequest {
    pub keys: Vec<SubjectKey>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityResponse {
    pub items: Vec<CommunityItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityItem {
    #[serde(flatten)]
    pub key: SubjectKey,
    pub average: Option<f64>,
}

pub async fn put_rating(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PutRatingRequest>,
) -> Result<Json<RatingResponse>, AppError> {
    let identity = require_identity(&headers, &state.config)?;

    if req.movie_id.trim().is_empty() {
        return Err(AppError::BadRequest("movieId is required".to_string()));
    }
    if !(1..=10).contains(&req.value) {
        return Err(AppError::BadRequest(
            "value must be an integer between 1 and 10".to_string(),
        ));
    }

    let key = CompositeKey::new(identity.user_id, req.movie_id, req.media_type);
    let draft = RatingDraft {
        value: req.value,
        movie_title: req.movie_title,
        poster_path: req.poster_path,
        year: req.year,
        platform: req.platform,
    };

    let rating = state.repo.upsert_rating(&key, &draft).await?;
    Ok(Json(RatingResponse { rating }))
}

/// Community average, vote count, and the caller's own rating when a valid
/// bearer token accompanies the request.
pub async fn rating_summary(
    Path(movie_id): Path<String>,
    Query(params): Query<SummaryQuery>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SummaryResponse>, AppError> {
    let media_type = MediaType::from_query(params.media_type.as_deref());
    let subject = SubjectKey::new(movie_id.clone(), media_type);

    let average = state.repo.rating_average(&subject).await?;
    let votes = state.repo.rating_count(&subject).await?;

    let my_rating = match bearer_identity(&headers, &state.config) {
        Some(identity) => state
            .repo
            .find_rating(&CompositeKey::new(identity.user_id, movie_id, media_type))
            .await?
            .map(|r| r.value),
        None => None,
    };

    Ok(Json(SummaryResponse {
        average,
        votes,
        my_rating,
    }))
}

/// Batched annotation of externally sourced listings with community
/// averages: one store round trip for a whole page of subject keys.
pub async fn community_ratings(
    State(state): State<AppState>,
    Json(req): Json<CommunityRequest>,
) -> Result<Json<CommunityResponse>, AppError> {
    let averages = state.repo.group_rating_averages(&req.keys).await?;
    let items = averages
        .into_iter()
        .map(|(key, average)| CommunityItem { key, average })
        .collect();
    Ok(Json(CommunityResponse { items }))
}
