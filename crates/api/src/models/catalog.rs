//! Cardtrader catalog mirror types.
//!
//! These rows are refreshed wholesale by the sync jobs; Cardtrader's own IDs
//! are the primary keys, so re-running a sync upserts rather than duplicates.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use seeker_core::{BlueprintId, ExpansionId};

/// A Cardtrader expansion (MTG set) mirrored locally.
#[derive(Debug, Clone, FromRow)]
pub struct Expansion {
    /// Cardtrader expansion ID.
    pub id: ExpansionId,
    /// Set code (lowercase).
    pub code: String,
    /// Set name.
    pub name: String,
    /// When this expansion's blueprints were last synced, if ever.
    pub blueprints_synced_at: Option<DateTime<Utc>>,
    /// When the expansion row itself was last refreshed.
    pub updated_at: DateTime<Utc>,
}

/// A Cardtrader blueprint (a specific card printing) mirrored locally.
#[derive(Debug, Clone, FromRow)]
pub struct Blueprint {
    /// Cardtrader blueprint ID.
    pub id: BlueprintId,
    /// Set code of the owning expansion.
    pub expansion_code: String,
    /// Card name.
    pub name: String,
    /// Collector number, when Cardtrader knows it.
    pub collector_number: Option<String>,
    /// MTG rarity, when Cardtrader knows it.
    pub rarity: Option<String>,
    /// Scryfall ID, when Cardtrader links one.
    pub scryfall_id: Option<String>,
    /// Card image URL.
    pub image_url: Option<String>,
    /// When the blueprint row was last refreshed.
    pub updated_at: DateTime<Utc>,
}
