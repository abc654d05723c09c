//! Axum route handlers for the capital explorer HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`            - Returns `{"status": "ok", "version": ...}`
//! - `GET  /capitals`          - The roster, `{"allCapitals": [...]}`
//! - `GET  /capital/:code`     - Bare `CapitalRecord` for an alpha-2 code
//! - `GET  /api/capital/:code` - Same as above
//! - `POST /tools/capital`     - `{ "name": ... }` → record + roster
//! - `POST /mcp`               - JSON-RPC tool endpoint (see [`super::mcp`])

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::mcp::mcp_handler;
use crate::capitals::{CapitalRecord, ErrorKind};
use crate::config::{ConfigError, ExplorerConfig};
use crate::gateway::{GatewayError, IdentifierNormalizer, ToolGateway, ToolResponse};

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ToolGateway>,
}

impl AppState {
    pub fn new(gateway: ToolGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    /// Load the dataset and enrichment providers named by `config`.
    pub fn from_config(config: &ExplorerConfig) -> Result<Self, ConfigError> {
        let repository = config.load_repository()?;
        let normalizer = IdentifierNormalizer::from_repository(&repository);
        tracing::debug!(identifiers = normalizer.len(), "identifier table built");
        let resolver = config.build_resolver(repository)?;
        Ok(Self::new(
            ToolGateway::new(Arc::new(resolver)).with_normalizer(normalizer),
        ))
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/capitals", get(list_capitals_handler))
        .route("/capital/:code", get(get_capital_handler))
        .route("/api/capital/:code", get(get_capital_handler))
        .route("/tools/capital", post(invoke_tool_handler))
        .route("/mcp", post(mcp_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::DataIntegrity | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: GatewayError) -> (StatusCode, Json<GatewayError>) {
    let status = status_for(err.kind);
    if status.is_server_error() {
        tracing::warn!(kind = %err.kind, "capital request failed");
    }
    (status, Json(err))
}

/// GET /health: liveness probe.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "capital-explorer",
        "capitals": state.gateway.roster().len(),
    }))
}

/// GET /capitals: every known capital, in dataset order.
async fn list_capitals_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "allCapitals": state.gateway.roster() }))
}

/// GET /capital/:code: synchronous resolution for non-agent consumers.
async fn get_capital_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CapitalRecord>, (StatusCode, Json<GatewayError>)> {
    state
        .gateway
        .resolve_code(&code)
        .await
        .map(Json)
        .map_err(error_response)
}

/// POST /tools/capital: the tool invocation.
///
/// Request:  `{ "name": "France" }` (or `"countryCode"`)
/// Response: `{ "structuredContent": { "capital": ... }, "responseMetadata": { "allCapitals": [...] } }`
///
/// The raw body is handed to the gateway so malformed payloads get the
/// same `{error, kind}` shape as every other failure.
async fn invoke_tool_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ToolResponse>, (StatusCode, Json<GatewayError>)> {
    let response = state
        .gateway
        .invoke_json(&body)
        .await
        .map_err(error_response)?;
    tracing::debug!(
        capital = %response.capital().name,
        code = %response.capital().country.cca2,
        "capital resolved"
    );
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
