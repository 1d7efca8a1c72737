//! Background jobs.
//!
//! The marketplace sync pipeline runs as in-process tokio interval tasks:
//!
//! - `catalog::sync_expansions` - refresh the full expansion list
//! - `catalog::sync_blueprints` - refresh one expansion's blueprints per run
//! - `stock::check_stock` - check marketplace stock for one user per run
//! - `digest::send_stock_digest` - post in-stock digests to Discord
//!
//! Jobs process a bounded slice of work per tick (one expansion, one user)
//! so a tick that dies partway leaves the rotation intact; the next tick
//! picks up whatever is stalest.

pub mod catalog;
pub mod digest;
pub mod stock;

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::error::AppError;
use crate::state::AppState;

/// Spawn every background job onto the runtime.
pub fn spawn_all(state: &AppState) {
    let jobs = &state.config().jobs;

    spawn_interval(
        "sync_expansions",
        jobs.expansion_sync_interval,
        state.clone(),
        |state| async move { catalog::sync_expansions(&state).await },
    );
    spawn_interval(
        "sync_blueprints",
        jobs.blueprint_sync_interval,
        state.clone(),
        |state| async move { catalog::sync_blueprints(&state).await },
    );
    spawn_interval(
        "check_stock",
        jobs.stock_check_interval,
        state.clone(),
        |state| async move { stock::check_stock(&state).await },
    );
    spawn_interval(
        "send_stock_digest",
        jobs.stock_digest_interval,
        state.clone(),
        |state| async move { digest::send_stock_digest(&state).await },
    );
}

/// Run a job on a fixed interval, logging failures without dying.
fn spawn_interval<F, Fut>(name: &'static str, period: Duration, state: AppState, job: F)
where
    F: Fn(AppState) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), AppError>> + Send,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // A slow tick shouldn't cause a burst of catch-up runs
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            tracing::debug!(job = name, "Job tick");
            if let Err(e) = job(state.clone()).await {
                sentry::capture_error(&e);
                tracing::error!(job = name, error = %e, "Job run failed");
            }
        }
    });
}
