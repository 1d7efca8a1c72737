//! Authentication extractors.
//!
//! Every protected route authenticates with a Discord bearer token. The
//! token is validated against Discord on first sight (profile, guild
//! membership, required role) and the result is cached so a burst of
//! requests doesn't hammer the Discord API.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::AppError;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Extractor that requires a valid Discord bearer token.
///
/// Rejects with 401 when the token is missing or invalid, and 403 when the
/// token's owner is not in the required guild or lacks the required role.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user = validate_token(state, token).await?;
        Ok(Self(user))
    }
}

/// Extractor that requires an authenticated admin.
///
/// Admins are a fixed allow-list of Discord user IDs from configuration.
/// Rejects with 403 when the caller authenticates but is not on the list.
#[derive(Debug)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(AppError::Forbidden(
                "Admin privileges required".to_string(),
            ));
        }
        Ok(Self(user))
    }
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))
}

/// Validate a bearer token and resolve the user behind it.
///
/// Cache hits skip Discord entirely. On a miss the token must map to a
/// profile, the profile must be a member of the required guild, and the
/// member must hold the required role.
///
/// # Errors
///
/// Returns `Unauthorized` for a rejected token and `Forbidden` for a valid
/// token whose owner fails the guild or role check.
pub async fn validate_token(state: &AppState, token: &str) -> Result<CurrentUser, AppError> {
    if let Some(user) = state.token_cache().get(token).await {
        return Ok(user);
    }

    let identity = state.identity();
    let profile = identity.fetch_profile(token).await?;

    if !identity.is_guild_member(token).await? {
        return Err(AppError::Forbidden(
            "Not a member of the required server".to_string(),
        ));
    }

    let roles = identity.member_roles(token).await?;
    let required_role = &state.config().discord.required_role_id;
    if !roles.iter().any(|r| r == required_role) {
        return Err(AppError::Forbidden(
            "Missing the required server role".to_string(),
        ));
    }

    let user_id = seeker_core::UserId::from(profile.id);
    let user = CurrentUser {
        is_admin: state.config().is_admin(&user_id),
        id: user_id,
        username: profile.username,
        avatar: profile.avatar,
    };

    state.token_cache().insert(token.to_string(), user.clone()).await;
    Ok(user)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use axum::http::Request;
    use seeker_core::UserId;

    use crate::cardtrader::CardtraderClient;
    use crate::config::tests::test_config;
    use crate::discord::{DiscordError, DiscordProfile, IdentityProvider};

    use super::*;

    /// Identity provider with canned answers for each validation step.
    /// `profile: None` stands in for a token Discord rejects.
    struct FakeIdentity {
        profile: Option<DiscordProfile>,
        in_guild: bool,
        roles: Vec<String>,
    }

    impl FakeIdentity {
        fn member(id: &str, roles: &[&str]) -> Self {
            Self {
                profile: Some(DiscordProfile {
                    id: id.to_string(),
                    username: "tester".to_string(),
                    avatar: None,
                }),
                in_guild: true,
                roles: roles.iter().map(ToString::to_string).collect(),
            }
        }

        fn rejected() -> Self {
            Self {
                profile: None,
                in_guild: false,
                roles: Vec::new(),
            }
        }
    }

    #[async_trait::async_trait]
    impl IdentityProvider for FakeIdentity {
        fn authorization_url(&self, _state: &str) -> String {
            String::new()
        }

        async fn exchange_code(&self, _code: &str) -> Result<String, DiscordError> {
            Ok("token".to_string())
        }

        async fn revoke_token(&self, _token: &str) -> Result<(), DiscordError> {
            Ok(())
        }

        async fn fetch_profile(&self, _token: &str) -> Result<DiscordProfile, DiscordError> {
            self.profile.clone().ok_or(DiscordError::Unauthorized)
        }

        async fn is_guild_member(&self, _token: &str) -> Result<bool, DiscordError> {
            Ok(self.in_guild)
        }

        async fn member_roles(&self, _token: &str) -> Result<Vec<String>, DiscordError> {
            Ok(self.roles.clone())
        }
    }

    /// Test config wires `required_role_id: "2222"`.
    const REQUIRED_ROLE: &str = "2222";

    fn test_state(identity: FakeIdentity, admin_user_ids: HashSet<UserId>) -> AppState {
        let config = test_config(admin_user_ids);
        let pool = sqlx::PgPool::connect_lazy("postgres://localhost/seeker_test").unwrap();
        let cardtrader = CardtraderClient::new(&config.cardtrader);
        AppState::with_identity(config, pool, Arc::new(identity), cardtrader, None)
    }

    #[tokio::test]
    async fn test_validate_token_rejected_upstream() {
        let state = test_state(FakeIdentity::rejected(), HashSet::new());
        let err = validate_token(&state, "bad-token").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Discord(DiscordError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_validate_token_not_in_guild() {
        let mut identity = FakeIdentity::member("42", &[REQUIRED_ROLE]);
        identity.in_guild = false;
        let state = test_state(identity, HashSet::new());
        let err = validate_token(&state, "token").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m.contains("server")));
    }

    #[tokio::test]
    async fn test_validate_token_missing_role() {
        let state = test_state(FakeIdentity::member("42", &["9999"]), HashSet::new());
        let err = validate_token(&state, "token").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m.contains("role")));
    }

    #[tokio::test]
    async fn test_validate_token_resolves_user() {
        let state = test_state(FakeIdentity::member("42", &[REQUIRED_ROLE]), HashSet::new());
        let user = validate_token(&state, "token").await.unwrap();
        assert_eq!(user.id, UserId::new("42"));
        assert_eq!(user.username, "tester");
        assert!(!user.is_admin);
    }

    #[tokio::test]
    async fn test_validate_token_admin_flag() {
        let admins = HashSet::from([UserId::new("42")]);
        let state = test_state(FakeIdentity::member("42", &[REQUIRED_ROLE]), admins);
        let user = validate_token(&state, "token").await.unwrap();
        assert!(user.is_admin);
    }

    #[tokio::test]
    async fn test_validate_token_cache_hit_skips_provider() {
        // A provider that rejects everything, so only the cache can answer.
        let state = test_state(FakeIdentity::rejected(), HashSet::new());
        let cached = CurrentUser {
            id: UserId::new("42"),
            username: "tester".to_string(),
            avatar: None,
            is_admin: false,
        };
        state
            .token_cache()
            .insert("token".to_string(), cached.clone())
            .await;

        let user = validate_token(&state, "token").await.unwrap();
        assert_eq!(user.id, cached.id);
    }

    #[tokio::test]
    async fn test_require_admin_rejects_non_admin() {
        let state = test_state(FakeIdentity::member("42", &[REQUIRED_ROLE]), HashSet::new());
        let mut parts = parts_with_auth(Some("Bearer token"));
        let err = RequireAdmin::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/seeking");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_present() {
        let parts = parts_with_auth(Some("Bearer abc123"));
        assert_eq!(bearer_token(&parts).unwrap(), "abc123");
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let parts = parts_with_auth(None);
        assert!(matches!(
            bearer_token(&parts),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let parts = parts_with_auth(Some("Basic abc123"));
        assert!(bearer_token(&parts).is_err());
    }

    #[test]
    fn test_bearer_token_empty() {
        let parts = parts_with_auth(Some("Bearer "));
        assert!(bearer_token(&parts).is_err());
    }
}
