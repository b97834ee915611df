//! Store bootstrap: locate, open, and prepare the embedded database.
//!
//! Candidate locations are tried in order until one opens: the configured
//! primary path, a project-local fallback directory, a directory under the
//! platform tmpdir, and finally a non-persistent in-memory store. Falling
//! back trades durability for availability and is always logged.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Relative path used when `DATABASE_URL` is unset or not a `file:` URL.
const DEFAULT_DB_FILE: &str = "./dev.db";

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("unable to open any store location: {0}")]
    Exhausted(String),
}

/// One place the store may live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCandidate {
    File(PathBuf),
    InMemory,
}

impl std::fmt::Display for StoreCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreCandidate::File(path) => write!(f, "{}", path.display()),
            StoreCandidate::InMemory => write!(f, "in-memory sqlite"),
        }
    }
}

/// Resolve the primary database file from the configured URL.
///
/// Anything that is not a `file:` URL is treated as a placeholder and maps
/// to the default relative path.
pub fn resolve_primary_path(database_url: &str) -> PathBuf {
    match database_url.strip_prefix("file:") {
        Some(rel) if !rel.is_empty() => PathBuf::from(rel),
        _ => PathBuf::from(DEFAULT_DB_FILE),
    }
}

fn candidate_chain(database_url: &str) -> Vec<StoreCandidate> {
    vec![
        StoreCandidate::File(resolve_primary_path(database_url)),
        StoreCandidate::File(PathBuf::from("./.data/dev.db")),
        StoreCandidate::File(std::env::temp_dir().join("cinelog").join("dev.db")),
        StoreCandidate::InMemory,
    ]
}

/// Open the store for the process lifetime, falling back through the
/// candidate chain when the configured location is unusable.
pub async fn open_store(database_url: &str) -> Result<SqlitePool, BootstrapError> {
    open_first_usable(&candidate_chain(database_url)).await
}

async fn open_first_usable(candidates: &[StoreCandidate]) -> Result<SqlitePool, BootstrapError> {
    let mut last_error: Option<sqlx::Error> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        match open_candidate(candidate).await {
            Ok(pool) => {
                if index > 0 {
                    warn!(
                        "Store fallback in use ({}); primary candidate {} was unusable",
                        candidate, candidates[0]
                    );
                }
                info!("Store ready at {}", candidate);
                return Ok(pool);
            }
            Err(e) => {
                warn!("Store candidate {} unusable: {}", candidate, e);
                last_error = Some(e);
            }
        }
    }

    Err(BootstrapError::Exhausted(
        last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no candidate locations".to_string()),
    ))
}

async fn open_candidate(candidate: &StoreCandidate) -> Result<SqlitePool, sqlx::Error> {
    let options = SqlitePoolOptions::new()
        .after_connect(|conn, _meta| Box::pin(async move { configure_pragmas(conn).await }));

    let pool = match candidate {
        StoreCandidate::File(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
                }
            }
            options
                .max_connections(5)
                .connect(&format!("sqlite:{}?mode=rwc", path.display()))
                .await?
        }
        StoreCandidate::InMemory => {
            // A pooled in-memory database lives and dies with its connection;
            // pin a single connection and never reap it.
            options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect("sqlite::memory:")
                .await?
        }
    };

    apply_schema(&pool).await?;
    Ok(pool)
}

/// Execute the idempotent schema, statement by statement.
async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA_SQL.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

async fn configure_pragmas(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    use sqlx::Row;

    // WAL is best-effort; read-only filesystems may refuse it.
    match sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await
    {
        Ok(row) => {
            let mode: String = row.get(0);
            info!("SQLite journal_mode set to: {}", mode);
        }
        Err(e) => warn!("Could not enable WAL journal mode: {}", e),
    }

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;

    Ok(())
}
