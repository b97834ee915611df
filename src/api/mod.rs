pub mod auth;
pub mod favorites;
pub mod health;
pub mod history;
pub mod ratings;

use crate::auth::TokenClaims;
use crate::config::Config;
use crate::db::Repository;
use crate::error::AppError;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        Self { repo, config }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/auth/register", post(auth::register))
        .route("/v1/auth/login", post(auth::login))
        .route("/v1/auth/me", get(auth::me))
        .route("/v1/ratings", post(ratings::put_rating))
        .route("/v1/ratings/community", post(ratings::community_ratings))
        .route("/v1/ratings/:movie_id", get(ratings::rating_summary))
        .route(
            "/v1/favorites",
            get(favorites::list)
                .post(favorites::put)
                .delete(favorites::remove),
        )
        .route("/v1/history", get(history::list).post(history::append))
        .layer(cors)
        .with_state(state)
}

/// Extract the verified identity from a bearer Authorization header, if any.
pub fn bearer_identity(headers: &HeaderMap, config: &Config) -> Option<TokenClaims> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    crate::auth::verify_token(token, &config.auth_secret, Utc::now().timestamp())
}

pub fn require_identity(headers: &HeaderMap, config: &Config) -> Result<TokenClaims, AppError> {
    bearer_identity(headers, config)
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
}
