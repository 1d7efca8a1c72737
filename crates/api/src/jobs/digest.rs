//! Stock digest notifications.
//!
//! Posts one Discord webhook message per user who has seeking-list cards
//! currently in stock, pinging the user with an embed listing the cards.

use chrono::Utc;
use serde_json::{Value, json};

use crate::db::{SeekingRepository, UserRepository};
use crate::error::AppError;
use crate::models::SeekingCard;
use crate::state::AppState;

/// Discord caps embeds at 25 fields; one slot is reserved for the
/// truncation notice when a list overflows.
const MAX_EMBED_FIELDS: usize = 25;

/// Send stock digests to every user with in-stock cards.
///
/// Does nothing when no webhook URL is configured. A failed post for one
/// user doesn't stop the others.
///
/// # Errors
///
/// Returns an error if a database read fails.
pub async fn send_stock_digest(state: &AppState) -> Result<(), AppError> {
    let Some(webhook) = state.webhook() else {
        tracing::debug!("No stock digest webhook configured, skipping");
        return Ok(());
    };

    let users = UserRepository::new(state.pool());
    let seeking = SeekingRepository::new(state.pool());

    let mut digests_sent = 0usize;
    for user in users.list().await? {
        let in_stock = seeking.list_in_stock(&user.id).await?;
        if in_stock.is_empty() {
            continue;
        }

        let embed = build_embed(&in_stock);
        let ping = format!("<@{}>", user.id);

        match webhook.post_embed(&ping, embed).await {
            Ok(()) => {
                digests_sent += 1;
                tracing::info!(user_id = %user.id, cards = in_stock.len(), "Stock digest sent");
            }
            Err(e) => {
                sentry::capture_error(&e);
                tracing::error!(user_id = %user.id, error = %e, "Failed to send stock digest");
            }
        }
    }

    tracing::info!(digests_sent, "Stock digest run complete");
    Ok(())
}

/// Build the digest embed for a user's in-stock cards.
fn build_embed(cards: &[SeekingCard]) -> Value {
    let mut fields: Vec<Value> = Vec::new();

    for (i, card) in cards.iter().enumerate() {
        if fields.len() >= MAX_EMBED_FIELDS - 1 && cards.len() > MAX_EMBED_FIELDS {
            fields.push(json!({
                "name": "...",
                "value": format!("Message truncated. {} more items not shown.", cards.len() - i),
                "inline": false,
            }));
            break;
        }

        let name = format!(
            "{} ({} #{})",
            card.name,
            card.set_code.to_uppercase(),
            card.collector_number
        );
        let mut value = format!("[{}/{}]", card.language, card.finish);
        if let Some(cents) = card.cardtrader_low_price_cents {
            value.push_str(&format!("\nLowest price: {:.2} EUR", f64::from(cents) / 100.0));
        }

        fields.push(json!({
            "name": truncated(&name, 256),
            "value": truncated(&value, 1024),
            "inline": false,
        }));
    }

    json!({
        "title": "Seeker Stock Alert!",
        "description": format!("Found {} item(s) in stock for you:", cards.len()),
        "color": 0x00ff_00,
        "fields": fields,
        "timestamp": Utc::now().to_rfc3339(),
    })
}

/// Clip a string to Discord's per-field character limits.
fn truncated(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    s.chars().take(max).collect()
}
