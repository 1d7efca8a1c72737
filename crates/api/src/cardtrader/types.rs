//! Cardtrader API v2 response types.

use std::collections::HashMap;

use serde::Deserialize;

use seeker_core::{BlueprintId, ExpansionId};

/// Magic: The Gathering's game ID on Cardtrader.
pub const MTG_GAME_ID: i64 = 1;

/// An expansion (set) from `GET /expansions`.
#[derive(Debug, Clone, Deserialize)]
pub struct CtExpansion {
    pub id: ExpansionId,
    pub game_id: i64,
    pub code: String,
    pub name: String,
}

impl CtExpansion {
    /// Whether this expansion belongs to Magic: The Gathering.
    #[must_use]
    pub fn is_mtg(&self) -> bool {
        self.game_id == MTG_GAME_ID
    }
}

/// A card blueprint from `GET /blueprints/export`.
#[derive(Debug, Clone, Deserialize)]
pub struct CtBlueprint {
    pub id: BlueprintId,
    pub name: String,
    #[serde(default)]
    pub fixed_properties: CtFixedProperties,
    pub scryfall_id: Option<String>,
    pub image_url: Option<String>,
}

/// Printing-level properties nested under a blueprint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CtFixedProperties {
    pub collector_number: Option<String>,
    pub mtg_rarity: Option<String>,
}

/// A single listing from `GET /marketplace/products`.
#[derive(Debug, Clone, Deserialize)]
pub struct CtListing {
    pub price_cents: Option<i32>,
}

/// Response body of `GET /marketplace/products`.
///
/// The API keys listings by blueprint ID rendered as a string, e.g.
/// `{"42024": [{...}, {...}]}` when in stock and `{"33922": []}` when not.
pub type MarketplaceProducts = HashMap<String, Vec<CtListing>>;

/// Lowest asking price across listings, in cents.
#[must_use]
pub fn lowest_price_cents(listings: &[CtListing]) -> Option<i32> {
    listings.iter().filter_map(|l| l.price_cents).min()
}
