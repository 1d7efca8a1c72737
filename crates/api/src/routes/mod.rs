//! HTTP route handlers for the Seeker API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health          - Liveness check
//! GET    /status          - Dependency status report
//!
//! # Auth (Discord OAuth2)
//! GET    /auth/login      - Redirect to Discord authorization
//! GET    /auth/callback   - OAuth callback, redirects to frontend with token
//! POST   /auth/logout     - Best-effort token revocation, always 204
//! GET    /auth/userinfo   - Resolve the bearer token to a user profile
//!
//! # Users
//! POST   /users           - Ensure the caller has a user record
//! DELETE /users/{id}      - Delete a user and their seeking list
//! GET    /admin/users     - List all users with item counts (admin)
//!
//! # Seeking list
//! POST   /seeking         - Add a card to the caller's seeking list
//! GET    /seeking         - List cards (?user_id= for admins)
//! DELETE /seeking         - Remove a card by its key
//! ```

pub mod account;
pub mod auth;
pub mod seeking;
pub mod status;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
        .route("/userinfo", get(auth::userinfo))
}

/// Create the seeking-list routes router.
pub fn seeking_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        post(seeking::add).get(seeking::list).delete(seeking::remove),
    )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(status::health))
        .route("/status", get(status::status))
        .nest("/auth", auth_routes())
        .route("/users", post(account::register))
        .route("/users/{id}", delete(account::delete_account))
        .route("/admin/users", get(account::list_users))
        .nest("/seeking", seeking_routes())
}
