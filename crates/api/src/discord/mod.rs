//! Discord OAuth2 and API client.
//!
//! Discord is both the identity provider and the notification channel:
//!
//! # OAuth Flow
//!
//! 1. Generate the authorization URL with `authorization_url()`
//! 2. Redirect the user to Discord's consent page
//! 3. Discord redirects back with an authorization code
//! 4. Exchange the code for a token with `exchange_code()`
//! 5. Validate bearers per request via `fetch_profile()` / `member_roles()`
//!
//! Everything request handlers touch goes through the [`IdentityProvider`]
//! trait so tests can substitute a fake instead of Discord.

mod types;

pub use types::*;

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::DiscordConfig;

/// Discord API base URL.
const API_BASE: &str = "https://discord.com/api/v10";

/// OAuth2 scopes requested at login.
const OAUTH_SCOPES: &str = "identify guilds guilds.members.read";

/// Errors that can occur when talking to Discord.
#[derive(Debug, Error)]
pub enum DiscordError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token was rejected.
    #[error("Unauthorized: token rejected by Discord")]
    Unauthorized,

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body didn't have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// The slice of Discord the request path depends on.
///
/// Narrow by design: handlers and the auth extractor only ever need these six
/// operations, and tests fake them instead of Discord.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Build the authorization URL carrying the frontend return path as
    /// OAuth state.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String, DiscordError>;

    /// Best-effort revoke an access token upstream.
    async fn revoke_token(&self, token: &str) -> Result<(), DiscordError>;

    /// Fetch the token owner's profile.
    async fn fetch_profile(&self, token: &str) -> Result<DiscordProfile, DiscordError>;

    /// Whether the token owner is a member of the required guild.
    async fn is_guild_member(&self, token: &str) -> Result<bool, DiscordError>;

    /// The token owner's roles in the required guild.
    ///
    /// A 403/404 from the member endpoint (user left the guild, bot lacks
    /// permissions) yields an empty role list rather than an error; the role
    /// check downstream then fails closed.
    async fn member_roles(&self, token: &str) -> Result<Vec<String>, DiscordError>;
}

/// Client for the Discord OAuth2 and user APIs.
#[derive(Clone)]
pub struct DiscordClient {
    inner: Arc<DiscordClientInner>,
}

struct DiscordClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    required_guild_id: String,
}

impl DiscordClient {
    /// Create a new Discord API client.
    #[must_use]
    pub fn new(config: &DiscordConfig) -> Self {
        Self {
            inner: Arc::new(DiscordClientInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
                redirect_uri: config.redirect_uri.clone(),
                required_guild_id: config.required_guild_id.clone(),
            }),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, DiscordError> {
        let response = self
            .inner
            .client
            .get(format!("{API_BASE}{path}"))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(DiscordError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DiscordError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for DiscordClient {
    fn authorization_url(&self, state: &str) -> String {
        format!(
            "https://discord.com/api/oauth2/authorize?\
            client_id={}&\
            redirect_uri={}&\
            response_type=code&\
            scope={}&\
            state={}&\
            prompt=consent",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(&self.inner.redirect_uri),
            urlencoding::encode(OAUTH_SCOPES),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<String, DiscordError> {
        let params = [
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.inner.redirect_uri.as_str()),
            ("scope", OAUTH_SCOPES),
        ];

        let response = self
            .inner
            .client
            .post(format!("{API_BASE}/oauth2/token"))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DiscordError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response.json().await?;
        if token.access_token.is_empty() {
            return Err(DiscordError::Parse(
                "no access token in token response".to_string(),
            ));
        }

        Ok(token.access_token)
    }

    async fn revoke_token(&self, token: &str) -> Result<(), DiscordError> {
        // Discord expects client credentials via Basic auth for revocation
        let basic = BASE64.encode(format!(
            "{}:{}",
            self.inner.client_id, self.inner.client_secret
        ));

        let params = [("token", token), ("token_type_hint", "access_token")];

        let response = self
            .inner
            .client
            .post(format!("{API_BASE}/oauth2/token/revoke"))
            .header("Authorization", format!("Basic {basic}"))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DiscordError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    async fn fetch_profile(&self, token: &str) -> Result<DiscordProfile, DiscordError> {
        self.get_json("/users/@me", token).await
    }

    async fn is_guild_member(&self, token: &str) -> Result<bool, DiscordError> {
        let guilds: Vec<PartialGuild> = self.get_json("/users/@me/guilds", token).await?;
        Ok(guilds
            .iter()
            .any(|g| g.id == self.inner.required_guild_id))
    }

    async fn member_roles(&self, token: &str) -> Result<Vec<String>, DiscordError> {
        let path = format!("/users/@me/guilds/{}/member", self.inner.required_guild_id);
        match self.get_json::<GuildMember>(&path, token).await {
            Ok(member) => Ok(member.roles),
            // User left the guild, or the app lacks the members scope there.
            Err(DiscordError::Api {
                status: 403 | 404, ..
            }) => {
                tracing::warn!("member lookup failed, proceeding without roles");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

/// Client for posting stock digests to a Discord webhook.
#[derive(Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    /// Create a webhook client for the given webhook URL.
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Post a message with one embed, pinging `content`.
    ///
    /// # Errors
    ///
    /// Returns an error if the webhook rejects the payload.
    pub async fn post_embed(
        &self,
        content: &str,
        embed: serde_json::Value,
    ) -> Result<(), DiscordError> {
        let payload = serde_json::json!({
            "content": content,
            "embeds": [embed],
        });

        let response = self.client.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DiscordError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn test_client() -> DiscordClient {
        DiscordClient::new(&DiscordConfig {
            client_id: "12345".to_string(),
            client_secret: SecretString::from("shhh"),
            redirect_uri: "http://localhost:3000/auth/callback".to_string(),
            required_guild_id: "999".to_string(),
            required_role_id: "111".to_string(),
            stock_digest_webhook_url: None,
        })
    }

    #[test]
    fn test_authorization_url() {
        let url = test_client().authorization_url("/seeking");
        assert!(url.starts_with("https://discord.com/api/oauth2/authorize?"));
        assert!(url.contains("client_id=12345"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=identify%20guilds%20guilds.members.read"));
        assert!(url.contains("state=%2Fseeking"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"));
    }

    #[test]
    fn test_discord_error_display() {
        let err = DiscordError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 502 - bad gateway");
    }
}
