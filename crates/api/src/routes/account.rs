//! User lifecycle routes.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use serde_json::json;

use seeker_core::UserId;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::state::AppState;

/// `POST /users` - make sure the caller has a user record.
///
/// Idempotent; the frontend calls this right after login and doesn't care
/// whether the record is new.
pub async fn register(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let repo = UserRepository::new(state.pool());
    let (_, created) = repo
        .ensure(&user.id, &user.username, user.avatar.as_deref())
        .await?;

    let message = if created {
        "Account created successfully"
    } else {
        "Account already exists"
    };

    tracing::info!(user_id = %user.id, created, "User registration");
    Ok(Json(json!({ "message": message })))
}

/// `DELETE /users/{id}` - delete a user and, by cascade, their seeking list.
///
/// Users may delete themselves; admins may delete anyone. 404 when the
/// record never existed or is already gone.
pub async fn delete_account(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let target = UserId::from(id);
    if target != user.id && !user.is_admin {
        return Err(AppError::Forbidden(
            "You may only delete your own account".to_string(),
        ));
    }

    let repo = UserRepository::new(state.pool());
    if !repo.delete(&target).await? {
        return Err(AppError::NotFound(
            "Account already deleted or not found".to_string(),
        ));
    }

    tracing::info!(user_id = %target, deleted_by = %user.id, "Account deleted");
    Ok(Json(json!({ "message": "Account deleted successfully" })))
}

/// `GET /admin/users` - list every user with their seeking-list item count.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    let repo = UserRepository::new(state.pool());
    let users = repo.list_with_counts().await?;
    Ok(Json(users))
}
