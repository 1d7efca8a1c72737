//! Cardtrader marketplace API client.
//!
//! Covers the three endpoints the app reads:
//!
//! - `GET /expansions` for the set catalog
//! - `GET /blueprints/export?expansion_id=` for per-set card blueprints
//! - `GET /marketplace/products?blueprint_id=` for live listings
//!
//! Authentication is a bearer JWT. Cardtrader rate-limits aggressively; the
//! stock job paces itself and treats 429 as a signal to stop for the run,
//! surfaced here as [`CardtraderError::RateLimited`].

mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use seeker_core::{BlueprintId, ExpansionId};

use crate::config::CardtraderConfig;

/// Cardtrader API base URL.
const API_BASE: &str = "https://api.cardtrader.com/api/v2";

/// Per-request timeout. Blueprint exports for large sets are the slow case.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when talking to Cardtrader.
#[derive(Debug, Error)]
pub enum CardtraderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned 429.
    #[error("Rate limited by Cardtrader")]
    RateLimited,

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Client for the Cardtrader API.
#[derive(Clone)]
pub struct CardtraderClient {
    inner: Arc<CardtraderClientInner>,
}

struct CardtraderClientInner {
    client: reqwest::Client,
    api_key: SecretString,
}

impl CardtraderClient {
    /// Create a new Cardtrader API client.
    #[must_use]
    pub fn new(config: &CardtraderConfig) -> Self {
        Self {
            inner: Arc::new(CardtraderClientInner {
                client: reqwest::Client::builder()
                    .timeout(REQUEST_TIMEOUT)
                    .build()
                    .unwrap_or_default(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CardtraderError> {
        let response = self
            .inner
            .client
            .get(format!("{API_BASE}{path}"))
            .bearer_auth(self.inner.api_key.expose_secret())
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CardtraderError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CardtraderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch every expansion Cardtrader knows about, all games included.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn list_expansions(&self) -> Result<Vec<CtExpansion>, CardtraderError> {
        self.get_json("/expansions", &[]).await
    }

    /// Fetch all blueprints for one expansion.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn export_blueprints(
        &self,
        expansion_id: ExpansionId,
    ) -> Result<Vec<CtBlueprint>, CardtraderError> {
        self.get_json(
            "/blueprints/export",
            &[("expansion_id", expansion_id.to_string())],
        )
        .await
    }

    /// Fetch marketplace listings for a blueprint, optionally filtered to a
    /// language and foil state, returning the listings for that blueprint.
    ///
    /// A 404 means no product matches the filter; that reads as out of
    /// stock, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CardtraderError::RateLimited`] on 429, or another error if
    /// the request fails.
    pub async fn marketplace_listings(
        &self,
        blueprint_id: BlueprintId,
        language: Option<&str>,
        foil: Option<bool>,
    ) -> Result<Vec<CtListing>, CardtraderError> {
        let mut query: Vec<(&str, String)> = vec![("blueprint_id", blueprint_id.to_string())];
        if let Some(language) = language {
            query.push(("language", language.to_string()));
        }
        if let Some(foil) = foil {
            query.push(("foil", foil.to_string()));
        }

        let result: Result<MarketplaceProducts, CardtraderError> =
            self.get_json("/marketplace/products", &query).await;

        match result {
            Ok(mut products) => Ok(products
                .remove(&blueprint_id.to_string())
                .unwrap_or_default()),
            Err(CardtraderError::Api { status: 404, .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_display() {
        assert_eq!(
            CardtraderError::RateLimited.to_string(),
            "Rate limited by Cardtrader"
        );
    }
}
