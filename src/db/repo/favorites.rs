//! Favorite upsert, delete, and listing. Same composite-key discipline as
//! ratings, without an update timestamp.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{
    media_type_from_stored, new_record_id, now_utc, parse_stored, to_stored, RepoError, Repository,
};
use crate::domain::{CompositeKey, Favorite, FavoriteDraft, SortOrder};

impl Repository {
    /// Insert-or-replace the favorite for a composite key in one atomic
    /// statement. Favorites are replace-in-place: the conflict arm rewrites
    /// the display fields only, id and creation timestamp stay put.
    pub async fn upsert_favorite(
        &self,
        key: &CompositeKey,
        draft: &FavoriteDraft,
    ) -> Result<Favorite, RepoError> {
        sqlx::query(
            r#"
            INSERT INTO favorites
                (id, user_id, movie_id, media_type, title,
                 poster_path, year, platform, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, movie_id, media_type) DO UPDATE SET
                title = excluded.title,
                poster_path = excluded.poster_path,
                year = excluded.year,
                platform = excluded.platform
            "#,
        )
        .bind(new_record_id())
        .bind(&key.user_id)
        .bind(&key.movie_id)
        .bind(key.media_type.as_str())
        .bind(&draft.title)
        .bind(&draft.poster_path)
        .bind(&draft.year)
        .bind(&draft.platform)
        .bind(to_stored(now_utc()))
        .execute(&self.pool)
        .await?;

        self.fetch_favorite(key)
            .await?
            .ok_or(RepoError::Database(sqlx::Error::RowNotFound))
    }

    /// Remove a favorite by composite key. Returns whether a row existed;
    /// deleting an absent key is not an error.
    pub async fn delete_favorite(&self, key: &CompositeKey) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "DELETE FROM favorites WHERE user_id = ? AND movie_id = ? AND media_type = ?",
        )
        .bind(&key.user_id)
        .bind(&key.movie_id)
        .bind(key.media_type.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All of one user's favorites, ordered by creation time.
    pub async fn list_favorites(
        &self,
        user_id: &str,
        order: SortOrder,
    ) -> Result<Vec<Favorite>, RepoError> {
        let sql = format!(
            "SELECT id, user_id, movie_id, media_type, title, \
                    poster_path, year, platform, created_at \
             FROM favorites WHERE user_id = ? ORDER BY created_at {}",
            order.sql()
        );

        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(favorite_from_row).collect())
    }

    async fn fetch_favorite(&self, key: &CompositeKey) -> Result<Option<Favorite>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, movie_id, media_type, title,
                   poster_path, year, platform, created_at
            FROM favorites
            WHERE user_id = ? AND movie_id = ? AND media_type = ?
            LIMIT 1
            "#,
        )
        .bind(&key.user_id)
        .bind(&key.movie_id)
        .bind(key.media_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(favorite_from_row))
    }
}

fn favorite_from_row(row: &SqliteRow) -> Favorite {
    let media_type: String = row.get("media_type");
    let created_at: String = row.get("created_at");
    Favorite {
        id: row.get("id"),
        user_id: row.get("user_id"),
        movie_id: row.get("movie_id"),
        media_type: media_type_from_stored(&media_type),
        title: row.get("title"),
        poster_path: row.get("poster_path"),
        year: row.get("year"),
        platform: row.get("platform"),
        created_at: parse_stored(&created_at),
    }
}
