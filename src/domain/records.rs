//! Flat record types returned by the record access layer.
//!
//! All identifiers are server-generated opaque strings; timestamps are UTC.
//! None of these carry relational behavior of their own.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::MediaType;

/// A registered account. The password hash is opaque to this layer and never
/// serialized outward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Typed projection of a user without credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One user's rating of one title. At most one per composite key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: String,
    pub user_id: String,
    pub movie_id: String,
    pub media_type: MediaType,
    pub value: i64,
    pub movie_title: Option<String>,
    pub poster_path: Option<String>,
    pub year: Option<String>,
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable fields of a rating upsert, denormalized display data included.
#[derive(Debug, Clone, Default)]
pub struct RatingDraft {
    pub value: i64,
    pub movie_title: Option<String>,
    pub poster_path: Option<String>,
    pub year: Option<String>,
    pub platform: Option<String>,
}

/// A favorited title. Replace-in-place: no update timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub user_id: String,
    pub movie_id: String,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub year: Option<String>,
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Mutable fields of a favorite upsert.
#[derive(Debug, Clone, Default)]
pub struct FavoriteDraft {
    pub title: String,
    pub poster_path: Option<String>,
    pub year: Option<String>,
    pub platform: Option<String>,
}

/// One appended search query. Append-only, never updated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub id: String,
    pub user_id: String,
    pub query: String,
    pub created_at: DateTime<Utc>,
}

/// Ordering over a record's creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Desc,
    Asc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Desc => "DESC",
            SortOrder::Asc => "ASC",
        }
    }
}
