//! HTTP transport — the JSON-RPC endpoint plus the thin management surface.
//!
//! Routing and serialization only; every handler is a direct call onto the
//! facade or registry. The JSON-RPC endpoint reads the body as raw text so a
//! malformed payload comes back as a proper envelope error instead of a
//! framework 4xx.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::rpc::{McpFacade, RpcResponse};
use crate::types::rpc_code;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<McpFacade>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/mcp/health", get(health))
        .route("/api/tools/reload", post(reload_tools))
        .route("/api/tools/status", get(tool_status))
        .route("/api/tools/info/{name}", get(tool_info))
        .with_state(state)
}

/// Parse the out-of-band project scope. Unparseable values are logged and
/// treated as absent, never rejected.
fn parse_scope(raw: Option<&String>) -> Option<i64> {
    let raw = raw?;
    match raw.trim().parse::<i64>() {
        Ok(scope) => Some(scope),
        Err(_) => {
            tracing::warn!("unparseable project scope {:?}, treating as absent", raw);
            None
        }
    }
}

/// `POST /mcp` — the JSON-RPC 2.0 endpoint. Envelope results always ship with
/// HTTP 200; protocol faults live inside the envelope.
async fn handle_mcp(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Json<RpcResponse> {
    let scope = parse_scope(query.get("projectId"));

    let request: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("malformed rpc body: {}", e);
            return Json(RpcResponse::failure(
                Value::Null,
                rpc_code::INVALID_REQUEST,
                format!("invalid request: malformed JSON body: {e}"),
            ));
        }
    };

    Json(state.facade.handle(request, scope).await)
}

/// `GET /mcp/health` — static protocol health document.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let info = state.facade.server_info();
    Json(json!({
        "status": "healthy",
        "protocol": "MCP JSON-RPC 2.0",
        "service": info.name,
        "version": info.version,
        "capabilities": ["tools"],
    }))
}

/// `POST /api/tools/reload` — management reload trigger.
async fn reload_tools(State(state): State<AppState>) -> Json<Value> {
    let report = state.facade.registry().reload().await;
    Json(json!({
        "success": true,
        "beforeCount": report.before,
        "afterCount": report.after,
        "newToolsAdded": report.delta(),
        "timestamp": chrono::Utc::now().timestamp_millis(),
    }))
}

/// `GET /api/tools/status` — registry introspection.
async fn tool_status(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.facade.registry().snapshot();
    Json(json!({
        "totalTools": snapshot.len(),
        "registeredTools": snapshot.names(),
        "timestamp": chrono::Utc::now().timestamp_millis(),
    }))
}

/// `GET /api/tools/info/{name}` — one tool's full definition plus its
/// required-parameter hint.
async fn tool_info(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let registry = state.facade.registry();
    match registry.lookup(&name) {
        Some(tool) => {
            let hint = registry
                .describe_required_params(&name)
                .unwrap_or_else(|| "no required parameters".to_string());
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "tool": &*tool,
                    "parameterHint": hint,
                    "timestamp": chrono::Utc::now().timestamp_millis(),
                })),
            )
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "message": format!("tool not found: {name}"),
                "timestamp": chrono::Utc::now().timestamp_millis(),
            })),
        ),
    }
}
