//! Append-only search history, read most-recent-first.
//!
//! The store never deduplicates queries; suppressing consecutive duplicates
//! is the caller's policy, built on `latest_search_history`.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{new_record_id, now_utc, parse_stored, to_stored, RepoError, Repository};
use crate::domain::SearchHistoryEntry;

impl Repository {
    pub async fn append_search_history(
        &self,
        user_id: &str,
        query: &str,
    ) -> Result<SearchHistoryEntry, RepoError> {
        let entry = SearchHistoryEntry {
            id: new_record_id(),
            user_id: user_id.to_string(),
            query: query.to_string(),
            created_at: now_utc(),
        };

        sqlx::query("INSERT INTO search_history (id, user_id, query, created_at) VALUES (?, ?, ?, ?)")
            .bind(&entry.id)
            .bind(&entry.user_id)
            .bind(&entry.query)
            .bind(to_stored(entry.created_at))
            .execute(&self.pool)
            .await?;

        Ok(entry)
    }

    /// Most recent entries first, capped at `limit`.
    pub async fn list_search_history(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<SearchHistoryEntry>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, query, created_at
            FROM search_history
            WHERE user_id = ?
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(entry_from_row).collect())
    }

    pub async fn latest_search_history(
        &self,
        user_id: &str,
    ) -> Result<Option<SearchHistoryEntry>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, query, created_at
            FROM search_history
            WHERE user_id = ?
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(entry_from_row))
    }
}

fn entry_from_row(row: &SqliteRow) -> SearchHistoryEntry {
    let created_at: String = row.get("created_at");
    SearchHistoryEntry {
        id: row.get("id"),
        user_id: row.get("user_id"),
        query: row.get("query"),
        created_at: parse_stored(&created_at),
    }
}
