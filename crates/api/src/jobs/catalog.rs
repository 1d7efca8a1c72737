//! Cardtrader catalog sync jobs.

use crate::db::CatalogRepository;
use crate::error::AppError;
use crate::state::AppState;

/// Refresh the expansion table from Cardtrader.
///
/// Fetches the full expansion list, keeps Magic only, and upserts keyed by
/// Cardtrader's own ID so repeated runs converge on the latest payload.
///
/// # Errors
///
/// Returns an error if the Cardtrader request or a database write fails.
pub async fn sync_expansions(state: &AppState) -> Result<(), AppError> {
    let expansions = state.cardtrader().list_expansions().await?;
    let repo = CatalogRepository::new(state.pool());

    let mut synced = 0usize;
    for expansion in expansions.iter().filter(|e| e.is_mtg()) {
        repo.upsert_expansion(expansion.id, &expansion.code.to_lowercase(), &expansion.name)
            .await?;
        synced += 1;
    }

    tracing::info!(synced, "Expansion sync complete");
    Ok(())
}

/// Refresh blueprints for one expansion.
///
/// Each run handles a single expansion, picked oldest-synced-first with
/// never-synced ones ahead of everything. The full catalog converges over
/// successive runs without ever holding a giant batch in flight.
///
/// # Errors
///
/// Returns an error if the Cardtrader request or a database write fails.
pub async fn sync_blueprints(state: &AppState) -> Result<(), AppError> {
    let repo = CatalogRepository::new(state.pool());

    let Some(expansion) = repo.next_expansion_to_sync().await? else {
        tracing::info!("No expansions to sync yet");
        return Ok(());
    };

    tracing::info!(
        expansion = %expansion.code,
        expansion_id = %expansion.id,
        "Syncing blueprints"
    );

    let blueprints = state.cardtrader().export_blueprints(expansion.id).await?;

    let mut synced = 0usize;
    for blueprint in &blueprints {
        repo.upsert_blueprint(
            blueprint.id,
            &expansion.code,
            &blueprint.name,
            blueprint.fixed_properties.collector_number.as_deref(),
            blueprint.fixed_properties.mtg_rarity.as_deref(),
            blueprint.scryfall_id.as_deref(),
            blueprint.image_url.as_deref(),
        )
        .await?;
        synced += 1;
    }

    repo.mark_blueprints_synced(expansion.id).await?;
    tracing::info!(expansion = %expansion.code, synced, "Blueprint sync complete");
    Ok(())
}
