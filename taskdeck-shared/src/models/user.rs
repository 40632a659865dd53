/// User model and database operations
///
/// A user is the owning principal for task records. Emails are unique with
/// case-sensitive exact matching, ids are immutable once assigned, and the
/// credential digest never crosses the store boundary: [`User`] skips it on
/// serialization and handlers only ever return [`PublicUser`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     full_name VARCHAR(100) NOT NULL,
///     hashed_password VARCHAR(255) NOT NULL,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User account row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id (UUID v4), immutable once assigned
    pub id: Uuid,

    /// Email address, unique, matched case-sensitively
    pub email: String,

    /// Display name
    pub full_name: String,

    /// Argon2id credential digest; never serialized
    #[serde(skip_serializing)]
    pub hashed_password: String,

    /// Inactive accounts authenticate but are refused at the gate
    pub is_active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Public projection of a user account
///
/// The only user shape handlers return to callers — no credential digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
///
/// Takes the already-hashed credential, never the plaintext password.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub full_name: String,
    pub hashed_password: String,
}

/// Input for updating an existing user
///
/// Only non-None fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
}

/// Error returned by user writes
///
/// Duplicate email is an expected, routine outcome and gets its own kind
/// instead of hiding inside the database error.
#[derive(Debug, thiserror::Error)]
pub enum UserWriteError {
    /// Another account already uses this email
    #[error("email is already registered")]
    DuplicateEmail,

    /// Any other database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

fn map_unique_violation(err: sqlx::Error) -> UserWriteError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            UserWriteError::DuplicateEmail
        }
        _ => UserWriteError::Database(err),
    }
}

impl User {
    /// Public projection without the credential digest
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Creates a new user
    ///
    /// # Errors
    ///
    /// `UserWriteError::DuplicateEmail` when the email is already taken
    /// (unique constraint), `UserWriteError::Database` otherwise.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, UserWriteError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, full_name, hashed_password)
            VALUES ($1, $2, $3)
            RETURNING id, email, full_name, hashed_password, is_active, created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.full_name)
        .bind(data.hashed_password)
        .fetch_one(pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(user)
    }

    /// Finds a user by id
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, hashed_password, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by email (exact, case-sensitive match)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, hashed_password, is_active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` are written; `updated_at` always is.
    ///
    /// # Returns
    ///
    /// The updated user, or `None` when the id does not exist.
    ///
    /// # Errors
    ///
    /// `UserWriteError::DuplicateEmail` when changing the email collides
    /// with another account.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, UserWriteError> {
        if data.email.is_none() && data.full_name.is_none() && data.is_active.is_none() {
            return Self::find_by_id(pool, id).await.map_err(UserWriteError::from);
        }

        // Build the SET list from whichever fields are present.
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.full_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", full_name = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, email, full_name, hashed_password, is_active, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(full_name) = data.full_name {
            q = q.bind(full_name);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        q.fetch_optional(pool).await.map_err(map_unique_violation)
    }

    /// Replaces the credential digest
    ///
    /// # Returns
    ///
    /// True when the user existed and the digest was written.
    pub async fn change_password(
        pool: &PgPool,
        id: Uuid,
        new_hashed_password: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET hashed_password = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(new_hashed_password)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user by id
    ///
    /// # Returns
    ///
    /// True when a row was removed. Owned tasks go with the account.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists users, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, hashed_password, is_active, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Counts all users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            full_name: "Test User".to_string(),
            hashed_password: "$argon2id$not-a-real-digest".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_serialization_never_exposes_digest() {
        let user = sample_user();

        let as_json = serde_json::to_value(&user).unwrap();
        assert!(as_json.get("hashed_password").is_none());
        assert_eq!(as_json["email"], "test@example.com");

        let public = serde_json::to_value(user.to_public()).unwrap();
        assert!(public.get("hashed_password").is_none());
    }

    #[test]
    fn test_to_public_carries_all_fields() {
        let user = sample_user();
        let public = user.to_public();

        assert_eq!(public.id, user.id);
        assert_eq!(public.email, user.email);
        assert_eq!(public.full_name, user.full_name);
        assert_eq!(public.is_active, user.is_active);
    }

    #[test]
    fn test_update_user_default_is_empty() {
        let update = UpdateUser::default();
        assert!(update.email.is_none());
        assert!(update.full_name.is_none());
        assert!(update.is_active.is_none());
    }

    // Database-backed coverage for these queries lives in
    // taskdeck-api/tests/integration_test.rs.
}
