//! Seeker configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SEEKER_DATABASE_URL` - `PostgreSQL` connection string
//! - `FRONTEND_URL` - Base URL of the frontend the auth flow redirects to
//! - `DISCORD_CLIENT_ID` - Discord OAuth2 application client ID
//! - `DISCORD_CLIENT_SECRET` - Discord OAuth2 application client secret
//! - `DISCORD_REDIRECT_URI` - Public URL of the `/auth/callback` route
//! - `REQUIRED_GUILD_ID` - Discord guild users must belong to
//! - `REQUIRED_ROLE_ID` - Guild role users must hold
//! - `CARDTRADER_API_KEY` - Cardtrader API bearer token
//!
//! ## Optional
//! - `SEEKER_HOST` - Bind address (default: 127.0.0.1)
//! - `SEEKER_PORT` - Listen port (default: 3000)
//! - `ADMIN_USER_IDS` - Comma-separated Discord IDs granted admin access
//! - `STOCK_DIGEST_WEBHOOK_URL` - Discord webhook for stock digests
//! - `EXPANSION_SYNC_INTERVAL_SECS` - Sets sync cadence (default: 86400)
//! - `BLUEPRINT_SYNC_INTERVAL_SECS` - Blueprint sync cadence (default: 900)
//! - `STOCK_CHECK_INTERVAL_SECS` - Stock check cadence (default: 600)
//! - `STOCK_DIGEST_INTERVAL_SECS` - Digest cadence (default: 86400)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use seeker_core::UserId;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Seeker application configuration.
#[derive(Debug, Clone)]
pub struct SeekerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Base URL of the frontend, used for auth redirects and CORS
    pub frontend_url: String,
    /// Discord OAuth2 and guild configuration
    pub discord: DiscordConfig,
    /// Cardtrader API configuration
    pub cardtrader: CardtraderConfig,
    /// Discord IDs granted admin access
    pub admin_user_ids: HashSet<UserId>,
    /// Background job cadence
    pub jobs: JobsConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Discord OAuth2 and guild membership configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct DiscordConfig {
    /// OAuth2 application client ID
    pub client_id: String,
    /// OAuth2 application client secret
    pub client_secret: SecretString,
    /// Public URL of the OAuth callback route
    pub redirect_uri: String,
    /// Guild users must be a member of
    pub required_guild_id: String,
    /// Guild role users must hold
    pub required_role_id: String,
    /// Webhook URL for stock digest notifications
    pub stock_digest_webhook_url: Option<String>,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("required_guild_id", &self.required_guild_id)
            .field("required_role_id", &self.required_role_id)
            .field("stock_digest_webhook_url", &self.stock_digest_webhook_url)
            .finish()
    }
}

/// Cardtrader API configuration.
#[derive(Clone)]
pub struct CardtraderConfig {
    /// API bearer token
    pub api_key: SecretString,
}

impl std::fmt::Debug for CardtraderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardtraderConfig")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Background job cadence.
#[derive(Debug, Clone)]
pub struct JobsConfig {
    /// How often the full expansion list is refreshed
    pub expansion_sync_interval: Duration,
    /// How often one expansion's blueprints are refreshed
    pub blueprint_sync_interval: Duration,
    /// How often one user's stock is checked
    pub stock_check_interval: Duration,
    /// How often stock digests are sent
    pub stock_digest_interval: Duration,
}

impl SeekerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SEEKER_DATABASE_URL")?;
        let host = get_env_or_default("SEEKER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SEEKER_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SEEKER_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SEEKER_PORT".to_string(), e.to_string()))?;
        let frontend_url = get_required_env("FRONTEND_URL")?
            .trim_end_matches('/')
            .to_string();

        let discord = DiscordConfig::from_env()?;
        let cardtrader = CardtraderConfig::from_env()?;
        let admin_user_ids = parse_admin_ids(&get_env_or_default("ADMIN_USER_IDS", ""));
        let jobs = JobsConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            frontend_url,
            discord,
            cardtrader,
            admin_user_ids,
            jobs,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Configuration-driven admin predicate.
    ///
    /// The admin flag is derived from the allow-list, never stored.
    #[must_use]
    pub fn is_admin(&self, user_id: &UserId) -> bool {
        self.admin_user_ids.contains(user_id)
    }
}

impl DiscordConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: get_required_env("DISCORD_CLIENT_ID")?,
            client_secret: get_validated_secret("DISCORD_CLIENT_SECRET")?,
            redirect_uri: get_required_env("DISCORD_REDIRECT_URI")?,
            required_guild_id: get_required_env("REQUIRED_GUILD_ID")?,
            required_role_id: get_required_env("REQUIRED_ROLE_ID")?,
            stock_digest_webhook_url: get_optional_env("STOCK_DIGEST_WEBHOOK_URL"),
        })
    }
}

impl CardtraderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_validated_secret("CARDTRADER_API_KEY")?,
        })
    }
}

impl JobsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            expansion_sync_interval: get_interval("EXPANSION_SYNC_INTERVAL_SECS", 86_400)?,
            blueprint_sync_interval: get_interval("BLUEPRINT_SYNC_INTERVAL_SECS", 900)?,
            stock_check_interval: get_interval("STOCK_CHECK_INTERVAL_SECS", 600)?,
            stock_digest_interval: get_interval("STOCK_DIGEST_INTERVAL_SECS", 86_400)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a job interval in seconds.
fn get_interval(key: &str, default_secs: u64) -> Result<Duration, ConfigError> {
    let secs = get_env_or_default(key, &default_secs.to_string())
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(Duration::from_secs(secs))
}

/// Parse the comma-separated admin allow-list.
fn parse_admin_ids(raw: &str) -> HashSet<UserId> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(UserId::from)
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the real credential."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_admin_ids() {
        let ids = parse_admin_ids("123, 456 ,,789,");
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&UserId::new("456")));
        assert!(!ids.contains(&UserId::new("999")));
    }

    #[test]
    fn test_parse_admin_ids_empty() {
        assert!(parse_admin_ids("").is_empty());
    }

    #[test]
    fn test_is_admin_predicate() {
        let config = test_config(parse_admin_ids("111,222"));
        assert!(config.is_admin(&UserId::new("111")));
        assert!(!config.is_admin(&UserId::new("333")));
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config(HashSet::new());
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_discord_config_debug_redacts_secret() {
        let config = test_config(HashSet::new());
        let debug_output = format!("{:?}", config.discord);

        assert!(debug_output.contains("client_id_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_private_value"));
    }

    /// Build a config without touching the process environment.
    pub(crate) fn test_config(admin_user_ids: HashSet<UserId>) -> SeekerConfig {
        SeekerConfig {
            database_url: SecretString::from("postgres://localhost/seeker_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            frontend_url: "http://localhost:5173".to_string(),
            discord: DiscordConfig {
                client_id: "client_id_value".to_string(),
                client_secret: SecretString::from("super_private_value"),
                redirect_uri: "http://localhost:3000/auth/callback".to_string(),
                required_guild_id: "1111".to_string(),
                required_role_id: "2222".to_string(),
                stock_digest_webhook_url: None,
            },
            cardtrader: CardtraderConfig {
                api_key: SecretString::from("ct_api_key_value"),
            },
            admin_user_ids,
            jobs: JobsConfig {
                expansion_sync_interval: Duration::from_secs(86_400),
                blueprint_sync_interval: Duration::from_secs(900),
                stock_check_interval: Duration::from_secs(600),
                stock_digest_interval: Duration::from_secs(86_400),
            },
            sentry_dsn: None,
        }
    }
}
