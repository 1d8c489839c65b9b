//! Reporting surface tests against the live router

mod common;

use axum_test::TestServer;
use chrono::Utc;
use serde_json::Value;

use common::test_state;
use pairbot::handlers;

#[tokio::test]
async fn health_reports_live_counts() {
    let state = test_state(&[]);
    {
        let mut store = state.store.write().unwrap();
        store.issue("alice@c.us", "Alice", Utc::now()).unwrap();
        store.issue("bob@c.us", "Bob", Utc::now()).unwrap();
    }

    let server = TestServer::new(handlers::create_router(state)).unwrap();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "running");
    assert_eq!(body["users"], 2);
    assert_eq!(body["activeCodes"], 2);
    assert_eq!(body["totalUsage"], 2);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
    assert!(body["uptimeSeconds"].is_u64());
}

#[tokio::test]
async fn api_stats_includes_recent_activity_and_system_info() {
    let state = test_state(&[]);
    {
        let mut store = state.store.write().unwrap();
        let now = Utc::now();
        store.issue("alice@c.us", "Alice", now).unwrap();
        store.sweep_expired(now + chrono::Duration::hours(25));
    }

    let server = TestServer::new(handlers::create_router(state)).unwrap();
    let response = server.get("/api/stats").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["users"], 1);
    assert_eq!(body["activeCodes"], 0);
    assert_eq!(body["totalUsage"], 2);

    let recent = body["recentActivity"].as_array().unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0]["action"], "generated");
    assert_eq!(recent[1]["action"], "expired");
    assert_eq!(recent[0]["owner"], "alice@c.us");

    assert!(body["system"]["uptime"].is_u64());
    assert!(body["system"]["memory"].is_u64());
    assert!(body["system"]["version"].is_string());
}

#[tokio::test]
async fn dashboard_renders_the_live_counters() {
    let state = test_state(&[]);
    {
        let mut store = state.store.write().unwrap();
        store.issue("alice@c.us", "Alice", Utc::now()).unwrap();
    }

    let server = TestServer::new(handlers::create_router(state)).unwrap();
    let response = server.get("/").await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains("Pair Code Bot"));
    assert!(html.contains("Total Users"));
    assert!(html.contains("Active Codes"));
    assert!(html.contains("!pair"));
}
