use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::usage::UsageEvent;
use crate::services::report;
use crate::state::AppState;

/// The `GET /health` payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub users: usize,
    pub active_codes: usize,
    pub total_usage: usize,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

/// The `GET /api/stats` payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub users: usize,
    pub active_codes: usize,
    pub total_usage: usize,
    pub recent_activity: Vec<UsageEvent>,
    pub system: SystemInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub uptime: u64,
    pub memory: u64,
    pub version: &'static str,
}

/// Liveness endpoint with live aggregate counts.
#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.store.read().unwrap().snapshot();

    Json(HealthResponse {
        status: "running",
        users: snapshot.user_count,
        active_codes: snapshot.active_code_count,
        total_usage: snapshot.total_events,
        uptime_seconds: state.uptime().as_secs(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Aggregate counts plus the last ten usage events.
#[axum::debug_handler]
pub async fn api_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let (snapshot, recent_activity) = {
        let store = state.store.read().unwrap();
        (store.snapshot(), store.recent_events(10))
    };

    Json(StatsResponse {
        users: snapshot.user_count,
        active_codes: snapshot.active_code_count,
        total_usage: snapshot.total_events,
        recent_activity,
        system: SystemInfo {
            uptime: state.uptime().as_secs(),
            memory: report::resident_memory_mb(),
            version: env!("CARGO_PKG_VERSION"),
        },
    })
}
