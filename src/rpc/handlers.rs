//! Method handlers for the JSON-RPC facade.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::engine::InvocationEngine;
use crate::registry::ToolRegistry;
use crate::types::{Error, Result};

use super::{ServerInfo, PROTOCOL_VERSION};

/// `initialize` — static capability and identity descriptor, no state read.
pub fn initialize(info: &ServerInfo) -> Result<Value> {
    Ok(json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {},
            "resources": {},
            "prompts": {},
        },
        "serverInfo": {
            "name": info.name,
            "version": info.version,
            "description": info.description,
        },
    }))
}

/// `tools/list` — the scope-filtered registry rendered as MCP tool schemas.
pub fn tools_list(registry: &Arc<ToolRegistry>, scope: Option<i64>) -> Result<Value> {
    let tools: Vec<Value> = registry
        .list(scope)
        .iter()
        .map(|tool| {
            let mut properties = Map::new();
            let mut required = Vec::new();

            for param in &tool.params {
                properties.insert(
                    param.name.clone(),
                    json!({
                        "type": param.param_type,
                        "description": param.description,
                    }),
                );
                if param.required {
                    required.push(param.name.clone());
                }
            }

            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                },
            })
        })
        .collect();

    Ok(json!({ "tools": tools }))
}

/// `tools/call` — delegate to the invocation engine. Engine failures become
/// textual content with `isError` set; only a missing tool name is an
/// envelope-level error.
pub async fn tools_call(
    engine: &Arc<InvocationEngine>,
    params: &Value,
    scope: Option<i64>,
) -> Result<Value> {
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::validation("missing tool name"))?;
    let arguments = params.get("arguments");

    let (text, is_error) = match engine.invoke(name, arguments, scope).await {
        Ok(result) => (result, false),
        Err(e) => (e.to_string(), true),
    };

    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    }))
}

/// `tools/reload` — swap in a fresh catalog generation and report the delta.
pub async fn tools_reload(registry: &Arc<ToolRegistry>) -> Result<Value> {
    let report = registry.reload().await;
    Ok(json!({
        "beforeCount": report.before,
        "afterCount": report.after,
        "delta": report.delta(),
    }))
}
