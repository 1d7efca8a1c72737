//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::cardtrader::CardtraderClient;
use crate::config::SeekerConfig;
use crate::discord::{DiscordClient, IdentityProvider, WebhookClient};
use crate::models::CurrentUser;

/// How long a validated bearer token stays cached before Discord is asked
/// again. Long enough to absorb request bursts, short enough that a revoked
/// token goes stale quickly.
const TOKEN_CACHE_TTL: Duration = Duration::from_secs(300);

/// Maximum number of cached token validations.
const TOKEN_CACHE_CAPACITY: u64 = 10_000;

/// Shared application state, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SeekerConfig,
    pool: PgPool,
    identity: Arc<dyn IdentityProvider>,
    cardtrader: CardtraderClient,
    webhook: Option<WebhookClient>,
    /// Bearer token -> validated user, keyed by the raw token.
    token_cache: Cache<String, CurrentUser>,
}

impl AppState {
    /// Build state from config and a connected pool, wiring up the real
    /// upstream clients.
    #[must_use]
    pub fn new(config: SeekerConfig, pool: PgPool) -> Self {
        let identity: Arc<dyn IdentityProvider> = Arc::new(DiscordClient::new(&config.discord));
        let cardtrader = CardtraderClient::new(&config.cardtrader);
        let webhook = config
            .discord
            .stock_digest_webhook_url
            .clone()
            .map(WebhookClient::new);

        Self::with_identity(config, pool, identity, cardtrader, webhook)
    }

    /// Build state with an explicit identity provider. Tests inject a fake
    /// here instead of calling Discord.
    #[must_use]
    pub fn with_identity(
        config: SeekerConfig,
        pool: PgPool,
        identity: Arc<dyn IdentityProvider>,
        cardtrader: CardtraderClient,
        webhook: Option<WebhookClient>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                identity,
                cardtrader,
                webhook,
                token_cache: Cache::builder()
                    .max_capacity(TOKEN_CACHE_CAPACITY)
                    .time_to_live(TOKEN_CACHE_TTL)
                    .build(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SeekerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    #[must_use]
    pub fn cardtrader(&self) -> &CardtraderClient {
        &self.inner.cardtrader
    }

    #[must_use]
    pub fn webhook(&self) -> Option<&WebhookClient> {
        self.inner.webhook.as_ref()
    }

    #[must_use]
    pub fn token_cache(&self) -> &Cache<String, CurrentUser> {
        &self.inner.token_cache
    }
}
