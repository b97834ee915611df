//! Registration, login, and profile lookup.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::{require_identity, AppState};
use crate::auth::{hash_password, sign_token, verify_password};
use crate::db::RepoError;
use crate::domain::UserProfile;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: UserProfile,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let email = req.email.trim().to_string();
    let name = req.name.trim().to_string();
    if !email.contains('@') {
        return Err(AppError::BadRequest("A valid email is required".to_string()));
    }
    if name.chars().count() < 2 || name.chars().count() > 50 {
        return Err(AppError::BadRequest(
            "name must be between 2 and 50 characters".to_string(),
        ));
    }
    if req.password.len() < 6 || req.password.len() > 100 {
        return Err(AppError::BadRequest(
            "password must be between 6 and 100 characters".to_string(),
        ));
    }

    if state.repo.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_password(&req.password);
    let user = match state.repo.create_user(&email, &name, &password_hash).await {
        Ok(user) => user,
        // Unique-constraint backstop for a registration racing the pre-check.
        Err(RepoError::Conflict) => {
            return Err(AppError::Conflict("Email already exists".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(SessionResponse {
        token: issue_token(&state, &user.id),
        user: SessionUser {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .repo
        .find_user_by_email(req.email.trim())
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&req.password, &user.password_hash) {
        return Err(invalid());
    }

    Ok(Json(SessionResponse {
        token: issue_token(&state, &user.id),
        user: SessionUser {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    }))
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, AppError> {
    let identity = require_identity(&headers, &state.config)?;
    let user = state
        .repo
        .find_user_profile_by_id(&identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(MeResponse { user }))
}

fn issue_token(state: &AppState, user_id: &str) -> String {
    sign_token(
        user_id,
        &state.config.auth_secret,
        state.config.token_ttl_secs,
        Utc::now().timestamp(),
    )
}
