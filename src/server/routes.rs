//! Control API endpoints
//!
//! - `GET /` - API description
//! - `GET /health` - Composite health of MediaMTX and the camera
//! - `GET /status` - Mode and service states only
//! - `GET /mode` - Current mode
//! - `POST /mode` - Switch mode (`{"mode": "minimal"|"recording"}`)
//! - `POST /restart` - Restart services (`{"service": "all"|"mediamtx"|"camera"}`)

use crate::config::ControlConfig;
use crate::control::{
    compute_health, compute_status, switch_mode, HealthReport, Mode, ModeStore,
    ParseModeError, ParseServiceTargetError, ServiceController, ServiceStatus, ServiceTarget,
};
use crate::server::error::ApiError;
use crate::server::shutdown::ShutdownSignal;
use crate::system::{CommandProber, CommandRunner, SystemProber};
use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const API_NAME: &str = "Dashcam Control API";
pub const API_VERSION: &str = "1.0";

const MISSING_MODE_MESSAGE: &str = "Missing 'mode' in request body";

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    config: Arc<ControlConfig>,
    store: ModeStore,
    prober: Arc<dyn SystemProber>,
    services: Arc<ServiceController>,
}

impl AppState {
    /// Production wiring: one runner shared by the prober and the controller
    pub fn new(config: ControlConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let prober = Arc::new(CommandProber::new(runner.clone(), &config));
        let services = Arc::new(ServiceController::new(runner, &config));
        Self::with_parts(config, prober, services)
    }

    pub fn with_parts(
        config: ControlConfig,
        prober: Arc<dyn SystemProber>,
        services: Arc<ServiceController>,
    ) -> Self {
        let store = ModeStore::new(config.config_file.clone(), &config.mode_key);
        Self {
            config: Arc::new(config),
            store,
            prober,
            services,
        }
    }
}

/// Body of a successful `POST /mode`
#[derive(Debug, Serialize)]
pub struct ModeChangeResponse {
    pub message: String,
    pub mode: Mode,
    pub restart_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_command: Option<String>,
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": API_NAME,
        "version": API_VERSION,
        "endpoints": {
            "GET /": "API documentation",
            "GET /health": "Detailed health check of all components",
            "GET /status": "Simple status of services",
            "GET /mode": "Get current recording mode",
            "POST /mode": "Set recording mode (body: {mode: 'minimal'|'recording'})",
            "POST /restart": "Restart services (body: {service: 'all'|'mediamtx'|'camera'})"
        }
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let report = compute_health(state.prober.as_ref(), &state.store, &state.config).await;
    info!(
        status = ?report.status,
        score = %report.health_score,
        "Health check complete"
    );
    Json(report)
}

async fn status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(compute_status(state.prober.as_ref(), &state.store, &state.config).await)
}

async fn get_mode(State(state): State<AppState>) -> Json<Value> {
    let mode = state.store.get_mode().await;
    Json(json!({ "mode": mode }))
}

async fn set_mode(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ModeChangeResponse>, ApiError> {
    let requested = parse_mode_request(&body)?;
    let outcome = switch_mode(&state.store, requested).await?;

    let restart_command = outcome
        .restart_required()
        .then(|| state.config.restart_command());

    Ok(Json(ModeChangeResponse {
        message: outcome.message(),
        mode: outcome.mode(),
        restart_required: outcome.restart_required(),
        restart_command,
    }))
}

async fn restart(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let target = parse_restart_request(&body)?;
    let message = state.services.restart(target).await;
    Ok(Json(json!({ "message": message })))
}

/// Extract the requested mode from a `POST /mode` body
///
/// Anything that isn't a JSON object with a `mode` key counts as missing;
/// a `mode` that isn't one of the two literals is invalid.
pub fn parse_mode_request(body: &[u8]) -> Result<Mode, ApiError> {
    let missing = || ApiError::BadRequest(MISSING_MODE_MESSAGE.to_string());

    let value: Value = serde_json::from_slice(body).map_err(|_| missing())?;
    let raw = value
        .as_object()
        .and_then(|fields| fields.get("mode"))
        .ok_or_else(missing)?;

    raw.as_str()
        .ok_or(ParseModeError)
        .and_then(str::parse::<Mode>)
        .map_err(|e| {
            warn!(requested = %raw, "Rejected mode request");
            ApiError::BadRequest(e.to_string())
        })
}

/// Extract the restart target from a `POST /restart` body
///
/// An empty body, an empty JSON value (`null`, `false`, `0`, `""`, `[]`,
/// `{}`), or an object without `service` means `all`. Any other non-object
/// body is rejected.
pub fn parse_restart_request(body: &[u8]) -> Result<ServiceTarget, ApiError> {
    let invalid = || ApiError::BadRequest(ParseServiceTargetError.to_string());

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ServiceTarget::default());
    }

    let value: Value = serde_json::from_slice(body).map_err(|_| invalid())?;
    if is_empty_value(&value) {
        return Ok(ServiceTarget::default());
    }

    let raw = match &value {
        Value::Object(fields) => match fields.get("service") {
            Some(raw) => raw,
            None => return Ok(ServiceTarget::default()),
        },
        _ => return Err(invalid()),
    };

    raw.as_str()
        .and_then(|s| s.parse::<ServiceTarget>().ok())
        .ok_or_else(|| {
            warn!(requested = %raw, "Rejected restart request");
            invalid()
        })
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// Build the router for the control API
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/mode", get(get_mode).post(set_mode))
        .route("/restart", post(restart))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the control API on all interfaces until `shutdown` fires
pub async fn run_control_server(
    port: u16,
    state: AppState,
    mut shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(port = %port, "Control API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
}
