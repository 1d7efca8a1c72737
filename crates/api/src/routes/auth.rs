//! Discord OAuth2 routes.
//!
//! The browser-facing half of authentication. The token never touches our
//! storage: the callback hands it to the frontend in the URL fragment and
//! every later request presents it as a bearer header.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Redirect},
};
use serde::Deserialize;
use serde_json::json;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    /// Frontend path to return to after authentication.
    state: Option<String>,
}

/// `GET /auth/login` - redirect the browser to Discord's consent page.
pub async fn login(State(state): State<AppState>, Query(params): Query<LoginParams>) -> Redirect {
    let return_path = params.state.as_deref().unwrap_or("/");
    let url = state.identity().authorization_url(return_path);
    tracing::debug!(return_path, "Redirecting to Discord authorization");
    Redirect::to(&url)
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

/// `GET /auth/callback` - complete the OAuth flow.
///
/// Exchanges the authorization code, verifies guild membership, makes sure a
/// user record exists, then sends the browser back to the frontend with the
/// token in the URL fragment. Every failure mode also redirects to the
/// frontend, to its login page with an error code, because the browser is
/// mid-navigation and a JSON error would strand it.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    let frontend = &state.config().frontend_url;

    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        return error_redirect(frontend, "no_code", "Authorization code missing.");
    };

    let token = match state.identity().exchange_code(code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Token exchange failed");
            sentry::capture_error(&e);
            return error_redirect(frontend, "discord_api_error", "Communication error with Discord.");
        }
    };

    match state.identity().is_guild_member(&token).await {
        Ok(true) => {}
        Ok(false) => {
            return error_redirect(
                frontend,
                "server_required",
                "You must be a member of the required Discord server.",
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Guild membership check failed");
            sentry::capture_error(&e);
            return error_redirect(frontend, "discord_api_error", "Communication error with Discord.");
        }
    }

    // Repeat logins upsert, leaving exactly one record per Discord user.
    match state.identity().fetch_profile(&token).await {
        Ok(profile) => {
            let user_id = seeker_core::UserId::from(profile.id);
            let repo = UserRepository::new(state.pool());
            if let Err(e) = repo
                .ensure(&user_id, &profile.username, profile.avatar.as_deref())
                .await
            {
                tracing::error!(error = %e, user_id = %user_id, "Failed to ensure user record");
                sentry::capture_error(&e);
                return error_redirect(frontend, "callback_failed", "Failed to initialize account.");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Profile fetch failed");
            sentry::capture_error(&e);
            return error_redirect(frontend, "discord_api_error", "Communication error with Discord.");
        }
    }

    let url = token_redirect_url(frontend, &token, params.state.as_deref());
    Redirect::to(&url)
}

/// `POST /auth/logout` - best-effort token revocation.
///
/// The frontend has already dropped its copy of the token by the time this
/// is called, so the response is 204 no matter what happens upstream.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty());

    if let Some(token) = token {
        state.token_cache().invalidate(token).await;
        if let Err(e) = state.identity().revoke_token(token).await {
            tracing::warn!(error = %e, "Token revocation failed");
        }
    } else {
        tracing::debug!("Logout without bearer token, nothing to revoke");
    }

    StatusCode::NO_CONTENT
}

/// `GET /auth/userinfo` - resolve the bearer token to a profile with roles.
///
/// 401 when the token is missing or rejected by Discord, 403 when the
/// required role is absent. A 403/404 from the member endpoint is tolerated
/// with an empty role list, which then fails the role check.
pub async fn userinfo(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let identity = state.identity();
    let profile = identity.fetch_profile(token).await?;
    let roles = identity.member_roles(token).await?;

    let required_role = &state.config().discord.required_role_id;
    if !roles.iter().any(|r| r == required_role) {
        tracing::warn!(user_id = %profile.id, "User lacks the required role");
        return Err(AppError::Forbidden(
            "User does not have the required role.".to_string(),
        ));
    }

    Ok(Json(json!({
        "id": profile.id,
        "username": profile.username,
        "avatar": profile.avatar,
        "roles": roles,
    })))
}

/// Build the frontend redirect carrying the token in the URL fragment.
///
/// The fragment never reaches a server in HTTP requests, which is why the
/// token rides there instead of in a query string.
fn token_redirect_url(frontend: &str, token: &str, return_path: Option<&str>) -> String {
    let path = match return_path {
        Some(p) if p.starts_with('/') => p,
        _ => "/",
    };
    format!(
        "{frontend}{path}#token={}&state={}",
        urlencoding::encode(token),
        urlencoding::encode(path),
    )
}

/// Build the frontend login-page redirect for a failed callback.
fn error_redirect(frontend: &str, code: &str, message: &str) -> Redirect {
    let url = format!(
        "{frontend}/login?error={}&message={}",
        urlencoding::encode(code),
        urlencoding::encode(message),
    );
    Redirect::to(&url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_redirect_uses_state_as_path() {
        let url = token_redirect_url("https://seeker.example.com", "tok123", Some("/seeking"));
        assert_eq!(
            url,
            "https://seeker.example.com/seeking#token=tok123&state=%2Fseeking"
        );
    }

    #[test]
    fn test_token_redirect_rejects_non_path_state() {
        // state must be a path, not an absolute URL someone smuggled in
        let url = token_redirect_url("https://seeker.example.com", "tok", Some("https://evil.example"));
        assert!(url.starts_with("https://seeker.example.com/#token=tok"));
    }

    #[test]
    fn test_token_redirect_defaults_to_root() {
        let url = token_redirect_url("https://seeker.example.com", "tok", None);
        assert_eq!(url, "https://seeker.example.com/#token=tok&state=%2F");
    }

    #[test]
    fn test_error_redirect_targets_login_page() {
        let url = format!(
            "{}/login?error={}&message={}",
            "https://seeker.example.com",
            urlencoding::encode("no_code"),
            urlencoding::encode("Authorization code missing."),
        );
        assert_eq!(
            url,
            "https://seeker.example.com/login?error=no_code&message=Authorization%20code%20missing."
        );
    }
}
