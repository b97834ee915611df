//! Record access layer over the bootstrapped store.
//!
//! This module provides the `Repository` struct for all store operations.
//! Methods are organized across submodules by record kind:
//! - `users.rs` - account lookup and creation
//! - `ratings.rs` - rating upsert and aggregates
//! - `favorites.rs` - favorite upsert, delete, and listing
//! - `history.rs` - append-only search history

mod favorites;
mod history;
mod ratings;
mod users;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqlitePool;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::domain::MediaType;

/// Errors surfaced by repository operations.
///
/// Absence of a record is never an error; lookups return `Option`.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Unique-constraint conflict, e.g. an email that is already registered.
    #[error("record already exists")]
    Conflict,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Repository for store operations. Owns the pool handed over by the
/// bootstrapper; constructed once at the composition root and injected.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Cheap liveness probe against the underlying store.
    pub async fn ping(&self) -> Result<(), RepoError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Generate a new opaque record identifier (32 hex chars, collision odds
/// negligible at this record volume).
fn new_record_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Current time truncated to the precision that survives a round trip
/// through storage.
fn now_utc() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

/// Fixed-width RFC 3339 form; lexicographic order matches chronological.
fn to_stored(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_stored(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            warn!(raw, error = %e, "Failed to parse stored timestamp, using epoch");
            DateTime::<Utc>::UNIX_EPOCH
        })
}

fn media_type_from_stored(raw: &str) -> MediaType {
    match raw {
        "movie" => MediaType::Movie,
        "tv" => MediaType::Tv,
        other => {
            warn!(media_type = other, "Unknown stored media type, defaulting to movie");
            MediaType::Movie
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}
