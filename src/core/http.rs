//! Operational HTTP surface using Axum

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, RwLock};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use crate::engines::Orchestrator;
use crate::error::OrchestratorError;
use crate::metrics::Metrics;
use crate::models::{LiveParameters, TradeOutcome};
use crate::optimization::OptimizationHistory;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub orchestrator: Arc<Orchestrator>,
    pub live: watch::Receiver<Arc<LiveParameters>>,
    pub history: Arc<OptimizationHistory>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "hydra-bot"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Engines plus the live parameter set, its score and the last rollout
async fn status_handler(State(state): State<AppState>) -> Json<Value> {
    let engines = state.orchestrator.statuses().await;
    let live = state.live.borrow().clone();
    Json(json!({
        "engines": engines,
        "current_score": live.score,
        "revision": live.revision,
        "parameters": live.parameters,
        "last_optimization": state.history.latest().await,
    }))
}

async fn history_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.history.entries().await))
}

/// Settled trades reported by the execution side
async fn record_trade(
    State(state): State<AppState>,
    Json(outcome): Json<TradeOutcome>,
) -> Result<StatusCode, StatusCode> {
    state
        .orchestrator
        .settle_trade(outcome)
        .await
        .map(|()| StatusCode::ACCEPTED)
        .map_err(error_status)
}

async fn engine_action(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    let orchestrator = &state.orchestrator;
    let result = match action.as_str() {
        "start" => orchestrator.start(&id).await,
        "stop" => orchestrator.stop(&id).await,
        "restart" => orchestrator.restart(&id).await,
        "maintenance" => orchestrator.enter_maintenance(&id).await,
        _ => return Err(StatusCode::NOT_FOUND),
    };
    result.map(|()| StatusCode::NO_CONTENT).map_err(error_status)
}

fn error_status(err: OrchestratorError) -> StatusCode {
    warn!(error = %err, "Engine request rejected");
    match err {
        OrchestratorError::UnknownEngine(_) => StatusCode::NOT_FOUND,
        OrchestratorError::DuplicateEngine(_) | OrchestratorError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
    }
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    } else if status.is_client_error() {
        tracing::debug!(method = %method, path = %path, status = %status, "HTTP request refused");
    }

    response
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/status", get(status_handler))
        .route("/optimization/history", get(history_handler))
        .route("/trades", post(record_trade))
        .route("/engines/{id}/{action}", post(engine_action))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Serve until `shutdown` flips to true
pub async fn start_server(
    state: AppState,
    port: u16,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await?;

    Ok(())
}
