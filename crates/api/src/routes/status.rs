//! Liveness and dependency status routes.

use std::time::Instant;

use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

/// `GET /health` - liveness only, no dependency checks.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Health of one dependency probe.
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub name: &'static str,
    pub status: &'static str,
    pub response_time: String,
    #[serde(skip)]
    pub elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentStatus {
    fn healthy(&self) -> bool {
        self.status == "running"
    }
}

/// `GET /status` - probe the service's actual dependencies.
///
/// Checks PostgreSQL, the Discord API, and the Cardtrader API with
/// per-probe latency. Always 200; degradation is reported in the body so
/// a status page can render it.
#[allow(clippy::cast_precision_loss)]
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let components = vec![
        probe_database(&state).await,
        probe_discord().await,
        probe_cardtrader().await,
    ];

    let healthy = components.iter().filter(|c| c.healthy()).count();
    let total = components.len();
    let all_healthy = healthy == total;
    let avg_ms = components.iter().map(|c| c.elapsed_ms).sum::<f64>() / total as f64;
    let health_pct = healthy as f64 / total as f64 * 100.0;

    Json(json!({
        "state": if all_healthy { "running" } else { "degraded" },
        "availability": if all_healthy { "normal" } else { "limited" },
        "last_checked": Utc::now().to_rfc3339(),
        "components": components,
        "metrics": [
            { "name": "Total Components", "value": total },
            { "name": "Healthy Components", "value": healthy },
            { "name": "Average Response Time", "value": format!("{avg_ms:.0}ms") },
            { "name": "Health Percentage", "value": format!("{health_pct:.1}%") },
        ],
    }))
}

async fn probe_database(state: &AppState) -> ComponentStatus {
    let start = Instant::now();
    let result = sqlx::query("SELECT 1").execute(state.pool()).await;
    finish_probe("postgres", start, result.err().map(|e| e.to_string()))
}

/// Unauthenticated Discord endpoint; proves reachability, not credentials.
async fn probe_discord() -> ComponentStatus {
    let start = Instant::now();
    let result = reqwest::get("https://discord.com/api/v10/gateway").await;
    finish_probe(
        "discord",
        start,
        match result {
            Ok(r) if r.status().is_success() => None,
            Ok(r) => Some(format!("status {}", r.status())),
            Err(e) => Some(e.to_string()),
        },
    )
}

async fn probe_cardtrader() -> ComponentStatus {
    let start = Instant::now();
    let result = reqwest::get("https://api.cardtrader.com/api/v2/info").await;
    finish_probe(
        "cardtrader",
        start,
        match result {
            // Any HTTP answer, even 401 for the unauthenticated probe,
            // means the API is up.
            Ok(r) if r.status().as_u16() < 500 => None,
            Ok(r) => Some(format!("status {}", r.status())),
            Err(e) => Some(e.to_string()),
        },
    )
}

fn finish_probe(name: &'static str, start: Instant, error: Option<String>) -> ComponentStatus {
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    ComponentStatus {
        name,
        status: if error.is_none() { "running" } else { "error" },
        response_time: format!("{elapsed_ms:.0}ms"),
        elapsed_ms,
        error,
    }
}
