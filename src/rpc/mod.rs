//! Protocol facade — JSON-RPC 2.0 envelope over the registry and engine.
//!
//! One request, one response. Envelope-level failures (bad version, unknown
//! method, malformed params, handler faults) use standard JSON-RPC error
//! codes; per-invocation failures are textual results inside a *successful*
//! envelope and never become protocol faults.

mod handlers;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::engine::InvocationEngine;
use crate::registry::ToolRegistry;
use crate::types::{rpc_code, Error};

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server identity advertised by `initialize` and the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "toolbridge".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Dynamic API tool bridge speaking MCP JSON-RPC 2.0".to_string(),
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// JSON-RPC 2.0 response envelope. The request id is echoed verbatim,
/// including `null`.
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// The MCP-facing facade: validates envelopes and routes methods onto the
/// registry and invocation engine.
#[derive(Debug)]
pub struct McpFacade {
    registry: Arc<ToolRegistry>,
    engine: Arc<InvocationEngine>,
    server_info: ServerInfo,
}

impl McpFacade {
    pub fn new(
        registry: Arc<ToolRegistry>,
        engine: Arc<InvocationEngine>,
        server_info: ServerInfo,
    ) -> Self {
        Self {
            registry,
            engine,
            server_info,
        }
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Handle one JSON-RPC request. `scope` is the out-of-band project scope,
    /// already parsed by the transport (absent when unparseable).
    pub async fn handle(&self, request: Value, scope: Option<i64>) -> RpcResponse {
        let id = request.get("id").cloned().unwrap_or(Value::Null);

        let jsonrpc = request.get("jsonrpc").and_then(Value::as_str);
        if jsonrpc != Some(JSONRPC_VERSION) {
            return RpcResponse::failure(
                id,
                rpc_code::INVALID_REQUEST,
                "invalid request: jsonrpc must be \"2.0\"",
            );
        }

        let Some(method) = request.get("method").and_then(Value::as_str) else {
            return RpcResponse::failure(
                id,
                rpc_code::INVALID_REQUEST,
                "invalid request: missing method",
            );
        };

        let params = request.get("params").cloned().unwrap_or(Value::Null);
        tracing::debug!(method, ?scope, "handling rpc request");

        let outcome = match method {
            "initialize" => handlers::initialize(&self.server_info),
            "tools/list" => handlers::tools_list(&self.registry, scope),
            "tools/call" => handlers::tools_call(&self.engine, &params, scope).await,
            "tools/reload" => handlers::tools_reload(&self.registry).await,
            other => Err(Error::not_found(format!("unknown method: {other}"))),
        };

        match outcome {
            Ok(result) => RpcResponse::success(id, result),
            Err(e) => {
                tracing::warn!(method, "rpc request failed: {}", e);
                RpcResponse::failure(id, e.to_rpc_code(), e.to_string())
            }
        }
    }
}
