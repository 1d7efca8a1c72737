//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seeker_core::UserId;

/// A Seeker user record.
///
/// Created at first successful OAuth callback; the Discord profile is the
/// source of truth, this row only anchors the seeking list.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Discord user ID.
    pub id: UserId,
    /// Discord username at last login.
    pub username: String,
    /// Discord avatar hash, if the user has one.
    pub avatar: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the stock checker last visited this user's list.
    pub stock_checked_at: Option<DateTime<Utc>>,
}

/// The authenticated caller, as resolved from a bearer token.
///
/// `is_admin` is derived from the configured allow-list, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Discord user ID.
    pub id: UserId,
    /// Discord username.
    pub username: String,
    /// Discord avatar hash.
    pub avatar: Option<String>,
    /// Whether the caller is on the admin allow-list.
    pub is_admin: bool,
}

/// A user row with its seeking-list item count, for the admin listing.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserSummary {
    /// Discord user ID.
    #[serde(rename = "userId")]
    pub id: UserId,
    /// Discord username at last login.
    pub username: String,
    /// Number of seeking-list rows.
    #[serde(rename = "itemCount")]
    pub item_count: i64,
}
