//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use seeker_core::UserId;

use super::RepositoryError;
use crate::models::{User, UserSummary};

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by Discord ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, username, avatar, created_at, stock_checked_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Ensure a user record exists, refreshing the profile fields.
    ///
    /// Idempotent: repeat callbacks for the same Discord ID leave exactly one
    /// row. Returns the row and whether it was created by this call.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure(
        &self,
        id: &UserId,
        username: &str,
        avatar: Option<&str>,
    ) -> Result<(User, bool), RepositoryError> {
        let inserted = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (id, username, avatar)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, username, avatar, created_at, stock_checked_at
            ",
        )
        .bind(id)
        .bind(username)
        .bind(avatar)
        .fetch_optional(self.pool)
        .await?;

        if let Some(user) = inserted {
            return Ok((user, true));
        }

        // Row already existed; refresh the Discord profile snapshot.
        let user = sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET username = $2, avatar = $3
            WHERE id = $1
            RETURNING id, username, avatar, created_at, stock_checked_at
            ",
        )
        .bind(id)
        .bind(username)
        .bind(avatar)
        .fetch_one(self.pool)
        .await?;

        Ok((user, false))
    }

    /// Delete a user and, via the schema's cascade, their seeking list.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: &UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List all users with their seeking-list item counts (admin listing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_counts(&self) -> Result<Vec<UserSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserSummary>(
            r"
            SELECT u.id, u.username, COUNT(c.user_id) AS item_count
            FROM users u
            LEFT JOIN seeking_cards c ON c.user_id = u.id
            GROUP BY u.id, u.username
            ORDER BY u.created_at ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// List all users (digest job).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, User>(
            r"
            SELECT id, username, avatar, created_at, stock_checked_at
            FROM users
            ORDER BY created_at ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Pick the user the stock checker should visit next: never-checked users
    /// first, then the stalest, skipping anyone checked after `threshold`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn next_for_stock_check(
        &self,
        threshold: DateTime<Utc>,
    ) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, username, avatar, created_at, stock_checked_at
            FROM users
            WHERE stock_checked_at IS NULL OR stock_checked_at < $1
            ORDER BY stock_checked_at ASC NULLS FIRST
            LIMIT 1
            ",
        )
        .bind(threshold)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Stamp a user's `stock_checked_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn mark_stock_checked(&self, id: &UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET stock_checked_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
