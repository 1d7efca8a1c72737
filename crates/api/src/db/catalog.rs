//! Catalog repository: the local mirror of Cardtrader expansions and
//! blueprints.

use sqlx::PgPool;

use seeker_core::{BlueprintId, ExpansionId};

use super::RepositoryError;
use crate::models::{Blueprint, Expansion};

/// Repository for the Cardtrader catalog mirror.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert one expansion row, keyed by Cardtrader's ID.
    ///
    /// `blueprints_synced_at` is deliberately left alone so a catalog refresh
    /// doesn't reset the blueprint sync rotation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_expansion(
        &self,
        id: ExpansionId,
        code: &str,
        name: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO expansions (id, code, name, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (id) DO UPDATE
            SET code = EXCLUDED.code,
                name = EXCLUDED.name,
                updated_at = NOW()
            ",
        )
        .bind(id)
        .bind(code)
        .bind(name)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Pick the expansion whose blueprints should be synced next:
    /// never-synced expansions first, then the one synced longest ago.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn next_expansion_to_sync(&self) -> Result<Option<Expansion>, RepositoryError> {
        let expansion = sqlx::query_as::<_, Expansion>(
            r"
            SELECT id, code, name, blueprints_synced_at, updated_at
            FROM expansions
            ORDER BY blueprints_synced_at ASC NULLS FIRST
            LIMIT 1
            ",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(expansion)
    }

    /// Stamp an expansion's `blueprints_synced_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the expansion doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn mark_blueprints_synced(&self, id: ExpansionId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE expansions SET blueprints_synced_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Upsert one blueprint row, keyed by Cardtrader's ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert_blueprint(
        &self,
        id: BlueprintId,
        expansion_code: &str,
        name: &str,
        collector_number: Option<&str>,
        rarity: Option<&str>,
        scryfall_id: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO blueprints
                (id, expansion_code, name, collector_number, rarity,
                 scryfall_id, image_url, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (id) DO UPDATE
            SET expansion_code = EXCLUDED.expansion_code,
                name = EXCLUDED.name,
                collector_number = EXCLUDED.collector_number,
                rarity = EXCLUDED.rarity,
                scryfall_id = EXCLUDED.scryfall_id,
                image_url = EXCLUDED.image_url,
                updated_at = NOW()
            ",
        )
        .bind(id)
        .bind(expansion_code)
        .bind(name)
        .bind(collector_number)
        .bind(rarity)
        .bind(scryfall_id)
        .bind(image_url)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Find a blueprint by set code and card name (stock checker lookup).
    ///
    /// Multiple printings can share a name within a set; the first match is
    /// returned, mirroring how the checker treats ambiguity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_blueprint(
        &self,
        expansion_code: &str,
        name: &str,
    ) -> Result<Option<Blueprint>, RepositoryError> {
        let blueprint = sqlx::query_as::<_, Blueprint>(
            r"
            SELECT id, expansion_code, name, collector_number, rarity,
                   scryfall_id, image_url, updated_at
            FROM blueprints
            WHERE expansion_code = $1 AND name = $2
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .bind(expansion_code)
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(blueprint)
    }
}
