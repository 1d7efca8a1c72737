//! Repository contract tests against a real `PostgreSQL` database.
//!
//! These tests require a running database (see the crate docs) and are
//! ignored by default. Each test owns a distinct slice of IDs and clears
//! it up front, so the suite can run repeatedly against the same database.
//!
//! Run with: cargo test -p seeker-integration-tests -- --ignored

use sqlx::PgPool;

use seeker_api::db::{CatalogRepository, RepositoryError, SeekingRepository, UserRepository};
use seeker_api::models::{CardKey, NewSeekingCard};
use seeker_core::{BlueprintId, CardFinish, ExpansionId, UserId};
use seeker_integration_tests::test_pool;

/// Remove any rows a previous run left behind for this user.
async fn reset_user(pool: &PgPool, id: &UserId) {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .expect("Failed to reset test user");
}

fn sample_card() -> NewSeekingCard {
    NewSeekingCard {
        id: "11111111-2222-3333-4444-555555555555".to_string(),
        name: "Flare of Denial".to_string(),
        set_code: "mh3".to_string(),
        collector_number: "120".to_string(),
        language: "en".to_string(),
        oracle_id: "66666666-7777-8888-9999-000000000000".to_string(),
        image_uri: "https://cards.scryfall.io/large/flare.jpg".to_string(),
        finish: CardFinish::Nonfoil,
    }
}

async fn seeking_count(pool: &PgPool, id: &UserId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM seeking_cards WHERE user_id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("Failed to count seeking rows")
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_repeat_ensure_keeps_single_row() {
    let pool = test_pool().await.expect("Failed to connect");
    let id = UserId::new("900001");
    reset_user(&pool, &id).await;
    let repo = UserRepository::new(&pool);

    let (_, created) = repo
        .ensure(&id, "first_login", None)
        .await
        .expect("First ensure failed");
    assert!(created);

    // Same Discord ID coming back with a fresh profile snapshot.
    let (user, created) = repo
        .ensure(&id, "renamed", Some("a1b2c3"))
        .await
        .expect("Second ensure failed");
    assert!(!created);
    assert_eq!(user.username, "renamed");
    assert_eq!(user.avatar.as_deref(), Some("a1b2c3"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = $1")
        .bind(&id)
        .fetch_one(&pool)
        .await
        .expect("Failed to count users");
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_delete_cascades_seeking_rows() {
    let pool = test_pool().await.expect("Failed to connect");
    let id = UserId::new("900002");
    reset_user(&pool, &id).await;

    let users = UserRepository::new(&pool);
    let seeking = SeekingRepository::new(&pool);

    users
        .ensure(&id, "cascade_tester", None)
        .await
        .expect("Failed to create user");
    seeking
        .add(&id, &sample_card())
        .await
        .expect("Failed to add card");
    assert_eq!(seeking_count(&pool, &id).await, 1);

    assert!(users.delete(&id).await.expect("Delete failed"));
    assert_eq!(seeking_count(&pool, &id).await, 0);

    // Deleting again reports nothing was there.
    assert!(!users.delete(&id).await.expect("Second delete failed"));
}

// ============================================================================
// Seeking list
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_duplicate_add_is_conflict() {
    let pool = test_pool().await.expect("Failed to connect");
    let id = UserId::new("900003");
    reset_user(&pool, &id).await;

    let users = UserRepository::new(&pool);
    let seeking = SeekingRepository::new(&pool);

    users
        .ensure(&id, "dup_tester", None)
        .await
        .expect("Failed to create user");
    seeking
        .add(&id, &sample_card())
        .await
        .expect("First add failed");

    let err = seeking
        .add(&id, &sample_card())
        .await
        .expect_err("Duplicate add should be rejected");
    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert_eq!(seeking_count(&pool, &id).await, 1);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_remove_missing_card_is_not_found() {
    let pool = test_pool().await.expect("Failed to connect");
    let id = UserId::new("900004");
    reset_user(&pool, &id).await;

    let users = UserRepository::new(&pool);
    let seeking = SeekingRepository::new(&pool);

    users
        .ensure(&id, "remove_tester", None)
        .await
        .expect("Failed to create user");

    let key = CardKey {
        set_code: "mh3".to_string(),
        collector_number: "120".to_string(),
        language: "en".to_string(),
        finish: CardFinish::Nonfoil,
    };
    let err = seeking
        .remove(&id, &key)
        .await
        .expect_err("Removing a missing card should fail");
    assert!(matches!(err, RepositoryError::NotFound));
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_repeated_catalog_sync_leaves_no_duplicates() {
    let pool = test_pool().await.expect("Failed to connect");
    let expansion_id = ExpansionId::new(990_001);
    let blueprint_id = BlueprintId::new(990_001);

    sqlx::query("DELETE FROM blueprints WHERE id = $1")
        .bind(blueprint_id)
        .execute(&pool)
        .await
        .expect("Failed to reset blueprint");
    sqlx::query("DELETE FROM expansions WHERE id = $1")
        .bind(expansion_id)
        .execute(&pool)
        .await
        .expect("Failed to reset expansion");

    let repo = CatalogRepository::new(&pool);

    // Two sync runs for the same Cardtrader IDs, the second with renames.
    repo.upsert_expansion(expansion_id, "tst", "Test Set")
        .await
        .expect("First expansion upsert failed");
    repo.upsert_expansion(expansion_id, "tst", "Test Set (Revised)")
        .await
        .expect("Second expansion upsert failed");

    repo.upsert_blueprint(
        blueprint_id,
        "tst",
        "Test Card",
        Some("1"),
        Some("rare"),
        None,
        None,
    )
    .await
    .expect("First blueprint upsert failed");
    repo.upsert_blueprint(
        blueprint_id,
        "tst",
        "Test Card",
        Some("1a"),
        Some("mythic"),
        None,
        None,
    )
    .await
    .expect("Second blueprint upsert failed");

    let expansions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM expansions WHERE id = $1")
        .bind(expansion_id)
        .fetch_one(&pool)
        .await
        .expect("Failed to count expansions");
    assert_eq!(expansions, 1);

    let name: String = sqlx::query_scalar("SELECT name FROM expansions WHERE id = $1")
        .bind(expansion_id)
        .fetch_one(&pool)
        .await
        .expect("Failed to read expansion");
    assert_eq!(name, "Test Set (Revised)");

    let blueprints: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blueprints WHERE id = $1")
        .bind(blueprint_id)
        .fetch_one(&pool)
        .await
        .expect("Failed to count blueprints");
    assert_eq!(blueprints, 1);

    let found = repo
        .find_blueprint("tst", "Test Card")
        .await
        .expect("Lookup failed")
        .expect("Blueprint should resolve");
    assert_eq!(found.id, blueprint_id);
    assert_eq!(found.collector_number.as_deref(), Some("1a"));
}
