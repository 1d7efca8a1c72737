//! User management commands.
//!
//! Operational tooling that talks to the database directly; the HTTP API's
//! admin routes cover the same ground for the frontend.

use seeker_core::UserId;
use sqlx::Row;

use super::{CliError, connect};

/// List every user with their seeking-list item count.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list_users() -> Result<(), CliError> {
    let pool = connect().await?;

    let rows = sqlx::query(
        r"
        SELECT u.id, u.username, u.created_at::TEXT AS created_at,
               COUNT(s.user_id) AS item_count
        FROM users u
        LEFT JOIN seeking_cards s ON s.user_id = u.id
        GROUP BY u.id, u.username, u.created_at
        ORDER BY u.created_at ASC
        ",
    )
    .fetch_all(&pool)
    .await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:<22} {:<32} {:<28} {}", "ID", "USERNAME", "CREATED", "ITEMS");
        for row in &rows {
            let id: String = row.get("id");
            let username: String = row.get("username");
            let created_at: String = row.get("created_at");
            let item_count: i64 = row.get("item_count");
            println!("{id:<22} {username:<32} {created_at:<28} {item_count}");
        }
        println!("{} user(s)", rows.len());
    }

    Ok(())
}

/// Delete a user; their seeking list goes with them by cascade.
///
/// # Errors
///
/// Returns `CliError::NotFound` if no user has the given ID.
pub async fn delete_user(id: &str) -> Result<(), CliError> {
    let pool = connect().await?;

    let user_id = UserId::from(id);
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(&user_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CliError::NotFound(format!("no user with id {id}")));
    }

    tracing::info!(user_id = id, "User deleted");
    Ok(())
}
