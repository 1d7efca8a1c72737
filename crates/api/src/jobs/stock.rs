//! Marketplace stock checking.
//!
//! One user per run, rotating through everyone roughly once a day. For
//! each seeking row the blueprint is resolved from the synced catalog by
//! set code and card name, then the marketplace is asked for matching
//! listings. Only changed rows are written back.

use std::time::Duration;

use chrono::Utc;
use seeker_core::CardFinish;
use tokio::time::Instant;

use crate::cardtrader::{CardtraderError, lowest_price_cents};
use crate::db::{CatalogRepository, RepositoryError, SeekingRepository, UserRepository};
use crate::error::AppError;
use crate::models::{CardKey, SeekingCard, StockSnapshot};
use crate::state::AppState;

/// Don't revisit a user checked more recently than this.
const CHECK_INTERVAL: chrono::Duration = chrono::Duration::hours(24);

/// Minimum spacing between marketplace calls. Cardtrader allows roughly one
/// request per second; this stays just above it.
const RATE_LIMIT: Duration = Duration::from_millis(1100);

/// Scryfall set codes that differ from Cardtrader's.
const SET_CODE_ALIASES: &[(&str, &str)] = &[("4bb", "4ebb")];

/// Scryfall language codes that Cardtrader spells differently.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[("zhs", "zh-CN"), ("zht", "zh-TW")];

/// Check marketplace stock for the stalest eligible user.
///
/// The user's `stock_checked_at` is stamped even when the list is empty or
/// the run aborts on rate limiting, so the rotation always advances.
///
/// # Errors
///
/// Returns an error if a database operation fails. Upstream failures for
/// individual cards are logged and skipped.
pub async fn check_stock(state: &AppState) -> Result<(), AppError> {
    let users = UserRepository::new(state.pool());

    let threshold = Utc::now() - CHECK_INTERVAL;
    let Some(user) = users.next_for_stock_check(threshold).await? else {
        tracing::info!("No users due for a stock check");
        return Ok(());
    };

    tracing::info!(user_id = %user.id, "Checking stock");

    let seeking = SeekingRepository::new(state.pool());
    let cards = seeking.list(&user.id).await?;

    let mut updated = 0usize;
    let mut api_calls = 0usize;
    let mut last_call: Option<Instant> = None;

    for card in &cards {
        match check_card(state, card, &mut last_call, &mut api_calls).await {
            Ok(Some(snapshot)) => {
                if snapshot.differs_from(card) {
                    match seeking
                        .update_stock(&user.id, &CardKey::of(card), snapshot)
                        .await
                    {
                        Ok(()) => updated += 1,
                        // Row removed mid-check; nothing to record
                        Err(RepositoryError::NotFound) => {}
                        Err(e) => return Err(e.into()),
                    }
                }
            }
            Ok(None) => {}
            Err(CardtraderError::RateLimited) => {
                tracing::warn!(user_id = %user.id, "Rate limited, aborting stock run");
                break;
            }
            Err(e) => {
                tracing::error!(card = %card.name, error = %e, "Stock check failed for card");
            }
        }
    }

    users.mark_stock_checked(&user.id).await?;
    tracing::info!(
        user_id = %user.id,
        cards = cards.len(),
        api_calls,
        updated,
        "Stock check complete"
    );
    Ok(())
}

/// Check one card, returning the snapshot to write or `None` to skip.
async fn check_card(
    state: &AppState,
    card: &SeekingCard,
    last_call: &mut Option<Instant>,
    api_calls: &mut usize,
) -> Result<Option<StockSnapshot>, CardtraderError> {
    let catalog = CatalogRepository::new(state.pool());
    let set_code = cardtrader_set_code(&card.set_code);

    let blueprint = match catalog.find_blueprint(set_code, &card.name).await {
        Ok(found) => found,
        Err(e) => {
            tracing::error!(card = %card.name, error = %e, "Blueprint lookup failed");
            return Ok(None);
        }
    };

    let Some(blueprint) = blueprint else {
        tracing::warn!(
            card = %card.name,
            set_code = %card.set_code,
            "No blueprint for card, clearing stock"
        );
        return Ok(Some(StockSnapshot::MISSING));
    };

    // Pace marketplace calls
    if let Some(last) = *last_call {
        let elapsed = last.elapsed();
        if elapsed < RATE_LIMIT {
            tokio::time::sleep(RATE_LIMIT - elapsed).await;
        }
    }

    let listings = state
        .cardtrader()
        .marketplace_listings(
            blueprint.id,
            Some(cardtrader_language(&card.language)),
            foil_filter(card.finish),
        )
        .await;
    *last_call = Some(Instant::now());
    *api_calls += 1;

    let listings = listings?;
    Ok(Some(StockSnapshot {
        blueprint_id: Some(blueprint.id),
        in_stock: !listings.is_empty(),
        low_price_cents: lowest_price_cents(&listings),
    }))
}

/// Translate a Scryfall set code to Cardtrader's where they differ.
fn cardtrader_set_code(scryfall_code: &str) -> &str {
    SET_CODE_ALIASES
        .iter()
        .find(|(from, _)| *from == scryfall_code)
        .map_or(scryfall_code, |(_, to)| to)
}

/// Translate a Scryfall language code to Cardtrader's where they differ.
fn cardtrader_language(scryfall_lang: &str) -> &str {
    LANGUAGE_ALIASES
        .iter()
        .find(|(from, _)| *from == scryfall_lang)
        .map_or(scryfall_lang, |(_, to)| to)
}

/// Foil query filter for a finish. Etched prints list under the foil flag.
fn foil_filter(finish: CardFinish) -> Option<bool> {
    Some(finish.is_foil())
}
