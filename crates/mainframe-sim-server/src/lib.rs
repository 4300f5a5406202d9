//! HTTP metrics exporter for the mainframe simulator.
//!
//! Serves the simulator's Prometheus registry at `/metrics`, along with a
//! small JSON index and health check for humans and load balancers.

mod registry;

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use log::{error, info};
use serde::Serialize;
use thiserror::Error;

pub use registry::PrometheusSink;

/// Failures from registry setup, exposition encoding, or the listener.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("exposition is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Static description of the running simulation, shown on `/` and `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct ExporterInfo {
    pub lpars: Vec<String>,
    pub sysplex: String,
    pub interval_secs: f64,
}

/// Shared server state.
struct AppState {
    sink: Arc<PrometheusSink>,
    info: ExporterInfo,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    lpars: usize,
    sysplex: String,
}

async fn handle_metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.sink.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, state.sink.content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("failed to render metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        lpars: state.info.lpars.len(),
        sysplex: state.info.sysplex.clone(),
    })
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "Mainframe Metrics Simulator",
        "version": mainframe_sim_core::VERSION,
        "lpars": state.info.lpars,
        "sysplex": state.info.sysplex,
        "interval_secs": state.info.interval_secs,
        "endpoints": {
            "/": "This API index",
            "/metrics": "Prometheus text exposition of all simulated series",
            "/health": "Health check",
        },
    }))
}

/// Build the axum router.
fn build_router(sink: Arc<PrometheusSink>, info: ExporterInfo) -> Router {
    let state = Arc::new(AppState { sink, info });

    Router::new()
        .route("/", get(handle_index))
        .route("/metrics", get(handle_metrics))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Serve the exporter until `shutdown` resolves.
pub async fn run_server<F>(
    sink: Arc<PrometheusSink>,
    info: ExporterInfo,
    host: &str,
    port: u16,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(sink, info);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("exporter listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("exporter stopped");
    Ok(())
}
