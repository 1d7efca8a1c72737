//! Discord API response types.
//!
//! Only the fields the app reads are modeled; Discord responses carry much
//! more, and serde ignores the rest.

use serde::Deserialize;

/// OAuth2 token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// Bearer token to act on the user's behalf.
    #[serde(default)]
    pub access_token: String,
}

/// A Discord user profile, from `/users/@me`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordProfile {
    /// Snowflake user ID.
    pub id: String,
    /// Account username.
    pub username: String,
    /// Avatar hash, absent if the user has no custom avatar.
    pub avatar: Option<String>,
}

/// A guild as listed by `/users/@me/guilds`.
#[derive(Debug, Deserialize)]
pub struct PartialGuild {
    pub id: String,
}

/// Guild membership info, from `/users/@me/guilds/{id}/member`.
#[derive(Debug, Deserialize)]
pub struct GuildMember {
    /// Role IDs the member holds in the guild.
    #[serde(default)]
    pub roles: Vec<String>,
}
