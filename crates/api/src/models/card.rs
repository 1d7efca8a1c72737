//! Seeking-list domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seeker_core::{BlueprintId, CardFinish, UserId};

/// A row in a user's seeking list.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SeekingCard {
    /// Owning user.
    #[serde(skip)]
    pub user_id: UserId,
    /// Scryfall set code (lowercase).
    pub set_code: String,
    /// Collector number within the set.
    pub collector_number: String,
    /// Card language code (Scryfall style, e.g. `en`, `zhs`).
    pub language: String,
    /// Print finish.
    pub finish: CardFinish,
    /// Scryfall card ID.
    pub scryfall_id: String,
    /// Scryfall oracle ID (shared across printings).
    pub oracle_id: String,
    /// Card name.
    pub name: String,
    /// Card image URL.
    pub image_uri: String,
    /// Cardtrader blueprint resolved by the stock checker, if any.
    pub cardtrader_id: Option<BlueprintId>,
    /// Whether the card was in stock at the last check.
    pub cardtrader_stock: bool,
    /// Lowest listing price in cents at the last check.
    pub cardtrader_low_price_cents: Option<i32>,
    /// When the card was added to the list.
    pub created_at: DateTime<Utc>,
}

/// Payload for adding a card to the seeking list.
///
/// Field names match what the frontend submits (Scryfall card data).
#[derive(Debug, Clone, Deserialize)]
pub struct NewSeekingCard {
    /// Scryfall card ID.
    pub id: String,
    /// Card name.
    pub name: String,
    /// Scryfall set code.
    pub set_code: String,
    /// Collector number within the set.
    pub collector_number: String,
    /// Card language code.
    pub language: String,
    /// Scryfall oracle ID.
    pub oracle_id: String,
    /// Card image URL.
    pub image_uri: String,
    /// Print finish.
    pub finish: CardFinish,
}

/// Composite key identifying one seeking-list row within a user's list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CardKey {
    /// Scryfall set code.
    pub set_code: String,
    /// Collector number within the set.
    pub collector_number: String,
    /// Card language code.
    pub language: String,
    /// Print finish.
    pub finish: CardFinish,
}

impl CardKey {
    /// The key of an existing row.
    #[must_use]
    pub fn of(card: &SeekingCard) -> Self {
        Self {
            set_code: card.set_code.clone(),
            collector_number: card.collector_number.clone(),
            language: card.language.clone(),
            finish: card.finish,
        }
    }
}

/// Marketplace availability for one seeking-list row, as written back by the
/// stock checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockSnapshot {
    /// Blueprint the row resolved to, or `None` when no blueprint matched.
    pub blueprint_id: Option<BlueprintId>,
    /// Whether any listing matched.
    pub in_stock: bool,
    /// Lowest matching listing price in cents.
    pub low_price_cents: Option<i32>,
}

impl StockSnapshot {
    /// Snapshot for a card whose blueprint could not be resolved.
    pub const MISSING: Self = Self {
        blueprint_id: None,
        in_stock: false,
        low_price_cents: None,
    };

    /// Whether writing this snapshot to the given row would change it.
    #[must_use]
    pub fn differs_from(&self, card: &SeekingCard) -> bool {
        self.blueprint_id != card.cardtrader_id
            || self.in_stock != card.cardtrader_stock
            || self.low_price_cents != card.cardtrader_low_price_cents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_card() -> SeekingCard {
        SeekingCard {
            user_id: UserId::new("42"),
            set_code: "mh3".to_string(),
            collector_number: "120".to_string(),
            language: "en".to_string(),
            finish: CardFinish::Nonfoil,
            scryfall_id: "ab-cd".to_string(),
            oracle_id: "ef-gh".to_string(),
            name: "Flare of Denial".to_string(),
            image_uri: "https://cards.scryfall.io/large/x.jpg".to_string(),
            cardtrader_id: Some(BlueprintId::new(42024)),
            cardtrader_stock: true,
            cardtrader_low_price_cents: Some(1250),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_unchanged() {
        let card = sample_card();
        let snapshot = StockSnapshot {
            blueprint_id: Some(BlueprintId::new(42024)),
            in_stock: true,
            low_price_cents: Some(1250),
        };
        assert!(!snapshot.differs_from(&card));
    }

    #[test]
    fn test_snapshot_price_change() {
        let card = sample_card();
        let snapshot = StockSnapshot {
            blueprint_id: Some(BlueprintId::new(42024)),
            in_stock: true,
            low_price_cents: Some(999),
        };
        assert!(snapshot.differs_from(&card));
    }

    #[test]
    fn test_snapshot_missing_blueprint_clears_stock() {
        let card = sample_card();
        assert!(StockSnapshot::MISSING.differs_from(&card));
    }

    #[test]
    fn test_card_key_of() {
        let card = sample_card();
        let key = CardKey::of(&card);
        assert_eq!(key.set_code, "mh3");
        assert_eq!(key.finish, CardFinish::Nonfoil);
    }
}
