//! Integration tests for the operational HTTP API
//!
//! Tests health, metrics, status, optimization history, trade intake and
//! engine lifecycle actions.

#[path = "api_server/test_utils.rs"]
mod test_utils;

use serde_json::{json, Value};

use test_utils::TestApiServer;

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "hydra-bot");
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApiServer::new().await;
    for _ in 0..3 {
        let _ = app.server.get("/health").await;
    }

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    assert!(
        body.contains("hydra_http_requests_total"),
        "Expected hydra_http_requests_total metric"
    );
    assert!(
        body.contains("hydra_http_request_duration_seconds"),
        "Expected hydra_http_request_duration_seconds metric"
    );
    assert!(body.contains("hydra_current_score"));
    assert!(app.metrics.http_requests_total.get() >= 3);
}

#[tokio::test]
async fn status_lists_engines_and_live_parameters() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/status").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let engines = body["engines"].as_array().expect("engines array");
    assert_eq!(engines.len(), 7);
    assert!(engines.iter().any(|e| e["id"] == "sniper"));
    assert!(engines.iter().all(|e| e["status"] == "STOPPED"));
    assert_eq!(body["current_score"], 50.0);
    assert_eq!(body["revision"], 0);
    assert_eq!(body["parameters"]["momentum_threshold"], 0.10);
    assert!(body["last_optimization"].is_null());
}

#[tokio::test]
async fn history_starts_empty_and_reflects_rollouts() {
    let app = TestApiServer::new().await;
    let body: Value = app.server.get("/optimization/history").await.json();
    assert_eq!(body, json!([]));

    app.record_rollout(51.5, 50.0).await;

    let body: Value = app.server.get("/optimization/history").await.json();
    let entries = body.as_array().expect("history array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["score"], 51.5);
    assert_eq!(entries[0]["previous_score"], 50.0);
    assert_eq!(entries[0]["method"], "bayesian");

    let status: Value = app.server.get("/status").await.json();
    assert_eq!(status["revision"], 1);
    assert_eq!(status["current_score"], 51.5);
    assert_eq!(status["last_optimization"]["score"], 51.5);
}

#[tokio::test]
async fn trades_are_accepted_for_known_engines() {
    let app = TestApiServer::new().await;
    let trade = json!({
        "trade_id": "t-1",
        "engine_id": "sniper",
        "pnl": 12.5,
        "execution_ms": 640.0,
        "timestamp": "2024-05-01T12:00:00Z"
    });

    let response = app.server.post("/trades").json(&trade).await;
    assert_eq!(response.status_code(), 202);
    // replays are accepted but not double counted
    let response = app.server.post("/trades").json(&trade).await;
    assert_eq!(response.status_code(), 202);
    assert_eq!(app.app.tracker.trade_count().await, 1);

    let unknown = json!({
        "engine_id": "ghost",
        "pnl": null,
        "execution_ms": 0.0,
        "timestamp": "2024-05-01T12:00:00Z"
    });
    let response = app.server.post("/trades").json(&unknown).await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn engine_actions_drive_the_lifecycle() {
    let app = TestApiServer::new().await;

    let response = app.server.post("/engines/sniper/start").await;
    assert_eq!(response.status_code(), 204);
    let response = app.server.post("/engines/sniper/maintenance").await;
    assert_eq!(response.status_code(), 204);

    let status: Value = app.server.get("/status").await.json();
    let sniper = status["engines"]
        .as_array()
        .and_then(|engines| engines.iter().find(|e| e["id"] == "sniper"))
        .cloned()
        .expect("sniper listed");
    assert_eq!(sniper["status"], "MAINTENANCE");

    assert_eq!(app.server.post("/engines/ghost/start").await.status_code(), 404);
    assert_eq!(app.server.post("/engines/sniper/explode").await.status_code(), 404);
}

#[tokio::test]
async fn faulted_engine_must_be_restarted() {
    let app = TestApiServer::new().await;
    assert_eq!(app.server.post("/engines/faulty/start").await.status_code(), 204);
    app.app.orchestrator.tick().await;

    assert_eq!(app.server.post("/engines/faulty/start").await.status_code(), 409);
    assert_eq!(app.server.post("/engines/faulty/restart").await.status_code(), 204);
}
