//! Seeking-list repository for database operations.

use sqlx::PgPool;

use seeker_core::UserId;

use super::RepositoryError;
use crate::models::{CardKey, NewSeekingCard, SeekingCard, StockSnapshot};

/// Repository for seeking-list database operations.
pub struct SeekingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SeekingRepository<'a> {
    /// Create a new seeking-list repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a card to a user's seeking list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the card is already on the list
    /// (duplicate adds are rejected, not upserted).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        user_id: &UserId,
        card: &NewSeekingCard,
    ) -> Result<SeekingCard, RepositoryError> {
        let row = sqlx::query_as::<_, SeekingCard>(
            r"
            INSERT INTO seeking_cards
                (user_id, set_code, collector_number, language, finish,
                 scryfall_id, oracle_id, name, image_uri)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING user_id, set_code, collector_number, language, finish,
                      scryfall_id, oracle_id, name, image_uri,
                      cardtrader_id, cardtrader_stock,
                      cardtrader_low_price_cents, created_at
            ",
        )
        .bind(user_id)
        .bind(&card.set_code)
        .bind(&card.collector_number)
        .bind(&card.language)
        .bind(card.finish)
        .bind(&card.id)
        .bind(&card.oracle_id)
        .bind(&card.name)
        .bind(&card.image_uri)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "Card already exists in seeking list".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        Ok(row)
    }

    /// List a user's seeking list, oldest additions first.
    ///
    /// A user with no rows (or no list at all) gets an empty vec.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<SeekingCard>, RepositoryError> {
        let rows = sqlx::query_as::<_, SeekingCard>(
            r"
            SELECT user_id, set_code, collector_number, language, finish,
                   scryfall_id, oracle_id, name, image_uri,
                   cardtrader_id, cardtrader_stock,
                   cardtrader_low_price_cents, created_at
            FROM seeking_cards
            WHERE user_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// List the rows currently marked in stock for a user (digest job).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_in_stock(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SeekingCard>, RepositoryError> {
        let rows = sqlx::query_as::<_, SeekingCard>(
            r"
            SELECT user_id, set_code, collector_number, language, finish,
                   scryfall_id, oracle_id, name, image_uri,
                   cardtrader_id, cardtrader_stock,
                   cardtrader_low_price_cents, created_at
            FROM seeking_cards
            WHERE user_id = $1 AND cardtrader_stock
            ORDER BY created_at ASC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Remove a card from a user's seeking list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no matching row exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn remove(&self, user_id: &UserId, key: &CardKey) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM seeking_cards
            WHERE user_id = $1 AND set_code = $2 AND collector_number = $3
              AND language = $4 AND finish = $5
            ",
        )
        .bind(user_id)
        .bind(&key.set_code)
        .bind(&key.collector_number)
        .bind(&key.language)
        .bind(key.finish)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Write a stock snapshot back onto a row (stock checker).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row vanished since it was
    /// read (the user removed the card mid-check).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_stock(
        &self,
        user_id: &UserId,
        key: &CardKey,
        snapshot: StockSnapshot,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE seeking_cards
            SET cardtrader_id = $6,
                cardtrader_stock = $7,
                cardtrader_low_price_cents = $8
            WHERE user_id = $1 AND set_code = $2 AND collector_number = $3
              AND language = $4 AND finish = $5
            ",
        )
        .bind(user_id)
        .bind(&key.set_code)
        .bind(&key.collector_number)
        .bind(&key.language)
        .bind(key.finish)
        .bind(snapshot.blueprint_id)
        .bind(snapshot.in_stock)
        .bind(snapshot.low_price_cents)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
