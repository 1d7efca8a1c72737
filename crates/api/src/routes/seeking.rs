//! Seeking-list routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;

use seeker_core::UserId;

use crate::db::SeekingRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CardKey, CurrentUser, NewSeekingCard};
use crate::state::AppState;

/// `POST /seeking` - add a card to the caller's seeking list.
///
/// Duplicates (same set, collector number, language and finish) are
/// rejected with 409 and code `ALREADY_EXISTS`.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(card): Json<NewSeekingCard>,
) -> Result<impl IntoResponse> {
    validate_new_card(&card)?;

    let repo = SeekingRepository::new(state.pool());
    let row = repo.add(&user.id, &card).await?;

    tracing::info!(user_id = %user.id, card = %row.name, "Card added to seeking list");
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Card added to seeking list successfully",
            "id": card.id,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Admin-only override to view another user's list.
    user_id: Option<String>,
}

/// `GET /seeking` - list seeking cards.
///
/// Plain callers see their own list. Admins may pass `?user_id=` to view
/// another user's; anyone else gets 403 for trying. A user with no rows
/// gets an empty list, not a 404.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse> {
    let target = effective_user(&user, params.user_id)?;

    let repo = SeekingRepository::new(state.pool());
    let cards = repo.list(&target).await?;

    Ok(Json(json!({ "cards": cards })))
}

/// `DELETE /seeking` - remove a card by its key.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(key): Json<CardKey>,
) -> Result<impl IntoResponse> {
    let repo = SeekingRepository::new(state.pool());
    repo.remove(&user.id, &key).await?;

    tracing::info!(user_id = %user.id, set_code = %key.set_code, "Card removed from seeking list");
    Ok(Json(json!({ "message": "Card deleted successfully" })))
}

/// Resolve whose list a read targets, enforcing the admin gate.
fn effective_user(caller: &CurrentUser, target: Option<String>) -> Result<UserId> {
    match target {
        Some(target) if !target.is_empty() => {
            if !caller.is_admin {
                return Err(AppError::Forbidden(
                    "You do not have permission to view this user's data".to_string(),
                ));
            }
            Ok(UserId::from(target))
        }
        _ => Ok(caller.id.clone()),
    }
}

/// Reject blank required fields before they reach the database.
fn validate_new_card(card: &NewSeekingCard) -> Result<()> {
    let required = [
        ("id", &card.id),
        ("name", &card.name),
        ("set_code", &card.set_code),
        ("collector_number", &card.collector_number),
        ("language", &card.language),
        ("oracle_id", &card.oracle_id),
        ("image_uri", &card.image_uri),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "Missing required field: {field}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use seeker_core::CardFinish;

    use super::*;

    fn caller(is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: UserId::from("100"),
            username: "tester".to_string(),
            avatar: None,
            is_admin,
        }
    }

    fn card() -> NewSeekingCard {
        NewSeekingCard {
            id: "f295b713-1d6a-43fd-910d-fb35414bf58a".to_string(),
            name: "Lightning Bolt".to_string(),
            set_code: "lea".to_string(),
            collector_number: "161".to_string(),
            language: "en".to_string(),
            oracle_id: "4457ed35-7c10-48c8-9776-456485fdf070".to_string(),
            image_uri: "https://cards.example.com/bolt.jpg".to_string(),
            finish: CardFinish::Nonfoil,
        }
    }

    #[test]
    fn test_effective_user_self() {
        let target = effective_user(&caller(false), None).unwrap();
        assert_eq!(target, UserId::from("100"));
    }

    #[test]
    fn test_effective_user_admin_override() {
        let target = effective_user(&caller(true), Some("200".to_string())).unwrap();
        assert_eq!(target, UserId::from("200"));
    }

    #[test]
    fn test_effective_user_non_admin_override_forbidden() {
        let result = effective_user(&caller(false), Some("200".to_string()));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_effective_user_empty_override_is_self() {
        let target = effective_user(&caller(false), Some(String::new())).unwrap();
        assert_eq!(target, UserId::from("100"));
    }

    #[test]
    fn test_validate_new_card_accepts_complete() {
        assert!(validate_new_card(&card()).is_ok());
    }

    #[test]
    fn test_validate_new_card_rejects_blank_field() {
        let mut bad = card();
        bad.oracle_id = "  ".to_string();
        let err = validate_new_card(&bad).unwrap_err();
        assert!(err.to_string().contains("oracle_id"));
    }
}
