//! Account lookup and creation.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{
    is_unique_violation, new_record_id, now_utc, parse_stored, to_stored, RepoError, Repository,
};
use crate::domain::{User, UserProfile};

const USER_COLUMNS: &str = "id, email, name, password_hash, created_at, updated_at";

impl Repository {
    /// Look up a user by exact, case-sensitive email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| user_from_row(&r)))
    }

    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ? LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| user_from_row(&r)))
    }

    /// Projection without credential material, for profile responses.
    pub async fn find_user_profile_by_id(
        &self,
        id: &str,
    ) -> Result<Option<UserProfile>, RepoError> {
        let row = sqlx::query("SELECT id, email, name, created_at FROM users WHERE id = ? LIMIT 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| {
            let created_at: String = r.get("created_at");
            UserProfile {
                id: r.get("id"),
                email: r.get("email"),
                name: r.get("name"),
                created_at: parse_stored(&created_at),
            }
        }))
    }

    /// Insert a new account with a server-generated id and timestamps.
    ///
    /// # Errors
    /// Returns `RepoError::Conflict` when the email is already registered;
    /// callers are expected to pre-check, the store constraint is the
    /// backstop.
    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<User, RepoError> {
        let now = now_utc();
        let user = User {
            id: new_record_id(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(to_stored(user.created_at))
        .bind(to_stored(user.updated_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(RepoError::Conflict),
            Err(e) => Err(e.into()),
        }
    }
}

fn user_from_row(row: &SqliteRow) -> User {
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        created_at: parse_stored(&created_at),
        updated_at: parse_stored(&updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let (repo, _temp) = test_support::repository().await;

        let created = repo
            .create_user("a@x.com", "Aliya", "hash-opaque")
            .await
            .expect("create failed");
        assert_eq!(created.id.len(), 32);

        let by_email = repo
            .find_user_by_email("a@x.com")
            .await
            .expect("lookup failed")
            .expect("user missing");
        assert_eq!(by_email, created);

        let by_id = repo
            .find_user_by_id(&created.id)
            .await
            .expect("lookup failed")
            .expect("user missing");
        assert_eq!(by_id, created);
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let (repo, _temp) = test_support::repository().await;
        repo.create_user("a@x.com", "Aliya", "h").await.unwrap();

        let miss = repo.find_user_by_email("A@X.COM").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict_and_first_user_unaffected() {
        let (repo, _temp) = test_support::repository().await;
        let first = repo.create_user("a@x.com", "Aliya", "h1").await.unwrap();

        let second = repo.create_user("a@x.com", "Bek", "h2").await;
        assert!(matches!(second, Err(RepoError::Conflict)));

        let stored = repo
            .find_user_by_email("a@x.com")
            .await
            .unwrap()
            .expect("first user missing");
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn test_missing_user_is_none_not_error() {
        let (repo, _temp) = test_support::repository().await;
        assert!(repo.find_user_by_id("nope").await.unwrap().is_none());
        assert!(repo.find_user_by_email("n@o.pe").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_profile_projection_has_no_credentials() {
        let (repo, _temp) = test_support::repository().await;
        let created = repo.create_user("a@x.com", "Aliya", "h").await.unwrap();

        let profile = repo
            .find_user_profile_by_id(&created.id)
            .await
            .unwrap()
            .expect("profile missing");
        assert_eq!(profile.id, created.id);
        assert_eq!(profile.email, "a@x.com");
        assert_eq!(profile.name, "Aliya");

        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("passwordHash").is_none());
    }
}
