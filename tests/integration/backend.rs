//! Integration tests for the HTTP backend sink

use chrono::Utc;
use hydra::error::SinkError;
use hydra::models::{
    EngineKind, EngineState, EngineStatus, EngineStatusReport, SignalSide, SignalStrength,
    TradingSignal,
};
use hydra::services::{HttpBackend, SignalSink, StatusSink};
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signal() -> TradingSignal {
    TradingSignal {
        engine: "sniper".to_string(),
        side: SignalSide::Buy,
        symbol: "BOOMROACH".to_string(),
        confidence: 0.82,
        price: 0.000_125,
        reasoning: "momentum breakout".to_string(),
        timestamp: Utc::now(),
        expected_return: 0.05,
        strength: SignalStrength::Medium,
        timeframe: "1h".to_string(),
    }
}

#[tokio::test]
async fn signals_are_posted_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/hydra-bot/signals"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(server.uri()).expect("client");
    backend.publish(&signal()).await.expect("publish succeeds");

    let requests = server.received_requests().await.expect("wiremock requests");
    let body: Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert_eq!(body["engine"], "sniper");
    assert_eq!(body["symbol"], "BOOMROACH");
    assert_eq!(body["type"], "BUY");
}

#[tokio::test]
async fn engine_status_is_posted_to_its_own_route() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/hydra-bot/engine-status"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(format!("{}/", server.uri())).expect("client");
    let state = EngineState {
        id: "guardian".to_string(),
        name: "Guardian Engine".to_string(),
        kind: EngineKind::Guardian,
        status: EngineStatus::Running,
        last_signal_at: None,
        metrics: Default::default(),
    };
    backend
        .report(&EngineStatusReport::from_state(&state, Utc::now()))
        .await
        .expect("report succeeds");
}

#[tokio::test]
async fn non_success_status_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/hydra-bot/signals"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(server.uri()).expect("client");
    match backend.publish(&signal()).await {
        Err(SinkError::Rejected { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
}
