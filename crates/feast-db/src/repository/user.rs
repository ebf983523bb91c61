//! # User Repository
//!
//! Account rows. Emails are stored lowercased by the service layer; the
//! UNIQUE index on `users.email` is the final word on duplicates.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use feast_core::User;

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

/// An account to insert. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Repository for accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts an account.
    ///
    /// ## Errors
    /// - `UniqueViolation` when the email is taken
    pub async fn create(&self, new: &NewUser) -> DbResult<User> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email"),
            other => other,
        })?;

        debug!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Gets an account by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets an account by (normalized) email.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ?1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn test_create_and_find() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;

        let by_email = db.users().find_by_email("ayu@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.password_hash, "$argon2id$test");

        let by_id = db.users().get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ayu@example.com");

        assert!(db.users().find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = testing::database().await;
        testing::user(&db, "ayu@example.com").await;

        let err = db
            .users()
            .create(&NewUser {
                name: "Other".to_string(),
                email: "ayu@example.com".to_string(),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { ref field } if field == "email"));
    }
}
