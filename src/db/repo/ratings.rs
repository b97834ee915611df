//! Rating upsert, lookup, and store-side aggregates.

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{
    media_type_from_stored, new_record_id, now_utc, parse_stored, to_stored, RepoError, Repository,
};
use crate::domain::{CompositeKey, Rating, RatingDraft, SubjectKey};

impl Repository {
    /// Insert-or-update the rating for a composite key in one atomic
    /// statement. The conflict arm refreshes the mutable fields and the
    /// update timestamp; id and creation timestamp keep their original
    /// values, so concurrent upserts for the same key serialize inside the
    /// store and leave exactly one row.
    pub async fn upsert_rating(
        &self,
        key: &CompositeKey,
        draft: &RatingDraft,
    ) -> Result<Rating, RepoError> {
        let ts = to_stored(now_utc());

        sqlx::query(
            r#"
            INSERT INTO ratings
                (id, user_id, movie_id, media_type, value,
                 movie_title, poster_path, year, platform, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, movie_id, media_type) DO UPDATE SET
                value = excluded.value,
                movie_title = excluded.movie_title,
                poster_path = excluded.poster_path,
                year = excluded.year,
                platform = excluded.platform,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(new_record_id())
        .bind(&key.user_id)
        .bind(&key.movie_id)
        .bind(key.media_type.as_str())
        .bind(draft.value)
        .bind(&draft.movie_title)
        .bind(&draft.poster_path)
        .bind(&draft.year)
        .bind(&draft.platform)
        .bind(&ts)
        .bind(&ts)
        .execute(&self.pool)
        .await?;

        self.find_rating(key)
            .await?
            .ok_or(RepoError::Database(sqlx::Error::RowNotFound))
    }

    /// Look up one user's rating for one title.
    pub async fn find_rating(&self, key: &CompositeKey) -> Result<Option<Rating>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, movie_id, media_type, value,
                   movie_title, poster_path, year, platform, created_at, updated_at
            FROM ratings
            WHERE user_id = ? AND movie_id = ? AND media_type = ?
            LIMIT 1
            "#,
        )
        .bind(&key.user_id)
        .bind(&key.movie_id)
        .bind(key.media_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| rating_from_row(&r)))
    }

    /// Community average for a title, `None` when nobody has rated it.
    pub async fn rating_average(&self, subject: &SubjectKey) -> Result<Option<f64>, RepoError> {
        let row = sqlx::query(
            "SELECT AVG(value) AS avg_value FROM ratings WHERE movie_id = ? AND media_type = ?",
        )
        .bind(&subject.movie_id)
        .bind(subject.media_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<Option<f64>, _>("avg_value"))
    }

    pub async fn rating_count(&self, subject: &SubjectKey) -> Result<i64, RepoError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS votes FROM ratings WHERE movie_id = ? AND media_type = ?",
        )
        .bind(&subject.movie_id)
        .bind(subject.media_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("votes"))
    }

    /// Batched community averages over an explicit set of subject keys, in
    /// one round trip. The result holds an entry for every requested key;
    /// titles without ratings map to `None`.
    pub async fn group_rating_averages(
        &self,
        subjects: &[SubjectKey],
    ) -> Result<HashMap<SubjectKey, Option<f64>>, RepoError> {
        let mut averages: HashMap<SubjectKey, Option<f64>> =
            subjects.iter().cloned().map(|s| (s, None)).collect();
        if averages.is_empty() {
            return Ok(averages);
        }

        let clause = vec!["(movie_id = ? AND media_type = ?)"; subjects.len()].join(" OR ");
        let sql = format!(
            "SELECT movie_id, media_type, AVG(value) AS avg_value \
             FROM ratings WHERE {clause} GROUP BY movie_id, media_type"
        );

        let mut query = sqlx::query(&sql);
        for subject in subjects {
            query = query.bind(&subject.movie_id).bind(subject.media_type.as_str());
        }

        for row in query.fetch_all(&self.pool).await? {
            let movie_id: String = row.get("movie_id");
            let media_type: String = row.get("media_type");
            let key = SubjectKey::new(movie_id, media_type_from_stored(&media_type));
            averages.insert(key, row.get::<Option<f64>, _>("avg_value"));
        }

        Ok(averages)
    }
}

fn rating_from_row(row: &SqliteRow) -> Rating {
    let media_type: String = row.get("media_type");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    Rating {
        id: row.get("id"),
        user_id: row.get("user_id"),
        movie_id: row.get("movie_id"),
        media_type: media_type_from_stored(&media_type),
        value: row.get("value"),
        movie_title: row.get("movie_title"),
        poster_path: row.get("poster_path"),
        year: row.get("year"),
        platform: row.get("platform"),
        created_at: parse_stored(&created_at),
        updated_at: parse_stored(&updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;
    use crate::domain::MediaType;
    use std::sync::Arc;

    fn draft(value: i64) -> RatingDraft {
        RatingDraft {
            value,
            movie_title: Some("Dune".to_string()),
            poster_path: Some("/dune.jpg".to_string()),
            year: Some("2021".to_string()),
            platform: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_twice_keeps_one_row_with_second_value() {
        let (repo, _temp) = test_support::repository().await;
        let key = CompositeKey::new("u1", "m1", MediaType::Movie);

        let first = repo.upsert_rating(&key, &draft(4)).await.unwrap();
        let second = repo.upsert_rating(&key, &draft(9)).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.value, 9);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= second.created_at);
        assert_eq!(repo.rating_count(&key.subject()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_same_movie_different_media_type_is_distinct() {
        let (repo, _temp) = test_support::repository().await;
        repo.upsert_rating(&CompositeKey::new("u1", "m1", MediaType::Movie), &draft(3))
            .await
            .unwrap();
        repo.upsert_rating(&CompositeKey::new("u1", "m1", MediaType::Tv), &draft(7))
            .await
            .unwrap();

        let movie = repo
            .find_rating(&CompositeKey::new("u1", "m1", MediaType::Movie))
            .await
            .unwrap()
            .unwrap();
        let tv = repo
            .find_rating(&CompositeKey::new("u1", "m1", MediaType::Tv))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(movie.value, 3);
        assert_eq!(tv.value, 7);
    }

    #[tokio::test]
    async fn test_average_and_count_across_users() {
        let (repo, _temp) = test_support::repository().await;
        let subject = SubjectKey::new("m1", MediaType::Movie);

        repo.upsert_rating(&CompositeKey::new("u1", "m1", MediaType::Movie), &draft(4))
            .await
            .unwrap();
        repo.upsert_rating(&CompositeKey::new("u2", "m1", MediaType::Movie), &draft(8))
            .await
            .unwrap();

        assert_eq!(repo.rating_average(&subject).await.unwrap(), Some(6.0));
        assert_eq!(repo.rating_count(&subject).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_average_of_unrated_title_is_none() {
        let (repo, _temp) = test_support::repository().await;
        let subject = SubjectKey::new("nope", MediaType::Tv);
        assert_eq!(repo.rating_average(&subject).await.unwrap(), None);
        assert_eq!(repo.rating_count(&subject).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_group_averages_cover_every_requested_key() {
        let (repo, _temp) = test_support::repository().await;
        repo.upsert_rating(&CompositeKey::new("u1", "m1", MediaType::Movie), &draft(2))
            .await
            .unwrap();
        repo.upsert_rating(&CompositeKey::new("u2", "m1", MediaType::Movie), &draft(5))
            .await
            .unwrap();
        repo.upsert_rating(&CompositeKey::new("u1", "s1", MediaType::Tv), &draft(10))
            .await
            .unwrap();

        let rated_movie = SubjectKey::new("m1", MediaType::Movie);
        let rated_show = SubjectKey::new("s1", MediaType::Tv);
        let unrated = SubjectKey::new("m2", MediaType::Movie);
        // Same movie id, other media kind: must not pick up the movie's ratings.
        let unrated_twin = SubjectKey::new("m1", MediaType::Tv);

        let averages = repo
            .group_rating_averages(&[
                rated_movie.clone(),
                rated_show.clone(),
                unrated.clone(),
                unrated_twin.clone(),
            ])
            .await
            .unwrap();

        assert_eq!(averages.len(), 4);
        assert_eq!(averages[&rated_movie], Some(3.5));
        assert_eq!(averages[&rated_show], Some(10.0));
        assert_eq!(averages[&unrated], None);
        assert_eq!(averages[&unrated_twin], None);
    }

    #[tokio::test]
    async fn test_group_averages_empty_input() {
        let (repo, _temp) = test_support::repository().await;
        let averages = repo.group_rating_averages(&[]).await.unwrap();
        assert!(averages.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_upserts_for_new_key_leave_one_row() {
        let (repo, _temp) = test_support::repository().await;
        let repo = Arc::new(repo);
        let key = CompositeKey::new("u1", "m1", MediaType::Movie);

        let a = {
            let repo = Arc::clone(&repo);
            let key = key.clone();
            tokio::spawn(async move { repo.upsert_rating(&key, &draft(3)).await })
        };
        let b = {
            let repo = Arc::clone(&repo);
            let key = key.clone();
            tokio::spawn(async move { repo.upsert_rating(&key, &draft(8)).await })
        };

        a.await.unwrap().expect("first upsert failed");
        b.await.unwrap().expect("second upsert failed");

        assert_eq!(repo.rating_count(&key.subject()).await.unwrap(), 1);
        let value = repo.find_rating(&key).await.unwrap().unwrap().value;
        assert!(value == 3 || value == 8);
    }
}
