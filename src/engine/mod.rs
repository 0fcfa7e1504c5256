//! Invocation engine — executes one tool call end to end.
//!
//! A single invocation walks a fixed pipeline: resolve the tool, authorize the
//! caller's project scope, extract and validate arguments, dispatch the
//! outbound HTTP call, post-process the response. The pipeline stops at the
//! first failing stage and the failure comes back as a textual payload, never
//! as a protocol fault — callers always receive a well-formed result.

pub mod extract;
pub mod postprocess;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::catalog::ToolDefinition;
use crate::registry::ToolRegistry;
use crate::store::DescriptorKind;
use crate::types::{HttpConfig, Result};

/// Per-invocation failure, rendered as a textual payload.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("tool not found: {0}")]
    NotFound(String),

    #[error("access denied: tool {0} does not belong to project {1}")]
    AccessDenied(String, i64),

    #[error("missing required parameters: {}", .0.join(", "))]
    MissingParams(Vec<String>),

    #[error("tool call failed: {0}")]
    Transport(String),

    #[error("tool call timed out after {1}s: {0}")]
    Timeout(String, u64),
}

/// Executes tool invocations against the current registry generation.
pub struct InvocationEngine {
    registry: Arc<ToolRegistry>,
    client: reqwest::Client,
    timeout: Duration,
}

impl std::fmt::Debug for InvocationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationEngine")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl InvocationEngine {
    pub fn new(registry: Arc<ToolRegistry>, config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            registry,
            client,
            timeout: config.request_timeout,
        })
    }

    /// Execute one invocation.
    ///
    /// `arguments` may be a structured object, a free-text string, or absent.
    /// `scope` restricts the call to tools bound to that project; `None` is
    /// unrestricted.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Option<&Value>,
        scope: Option<i64>,
    ) -> std::result::Result<String, InvokeError> {
        let tool = self
            .registry
            .lookup(name)
            .ok_or_else(|| InvokeError::NotFound(name.to_string()))?;

        if let Some(caller) = scope {
            if tool.project_id != Some(caller) {
                tracing::warn!(
                    "tool {} belongs to project {:?}, caller scope is {}",
                    name,
                    tool.project_id,
                    caller,
                );
                return Err(InvokeError::AccessDenied(name.to_string(), caller));
            }
        }

        let args = collect_args(arguments);
        validate_required(&tool, &args)?;

        let body = self.dispatch(&tool, &args).await?;
        Ok(postprocess::annotate(&body, &tool.data_type))
    }

    async fn dispatch(
        &self,
        tool: &ToolDefinition,
        args: &Map<String, Value>,
    ) -> std::result::Result<String, InvokeError> {
        // Static tools short-circuit to their mock payload, no network call.
        if tool.kind == DescriptorKind::Static {
            if let Some(mock) = &tool.mock_data {
                tracing::debug!("static tool {} served from mock payload", tool.name);
                return Ok(mock.clone());
            }
        }

        tracing::info!("dispatching tool {}: {} {}", tool.name, tool.method, tool.url);

        let mut request = if tool.method == "GET" {
            self.client.get(&tool.url).query(&query_pairs(args))
        } else {
            let method = reqwest::Method::from_bytes(tool.method.as_bytes())
                .map_err(|_| InvokeError::Transport(format!("invalid method: {}", tool.method)))?;
            self.client.request(method, &tool.url).json(args)
        };

        for (key, value) in &tool.headers {
            request = request.header(key.as_str(), coerce_string(value));
        }

        let exchange = async {
            let response = request.send().await?;
            let response = response.error_for_status()?;
            response.text().await
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(body)) => {
                tracing::debug!("tool {} returned {} bytes", tool.name, body.len());
                Ok(body)
            }
            Ok(Err(e)) => {
                tracing::error!("tool {} call failed: {}", tool.name, e);
                Err(InvokeError::Transport(e.to_string()))
            }
            Err(_) => {
                tracing::error!("tool {} timed out after {:?}", tool.name, self.timeout);
                Err(InvokeError::Timeout(
                    tool.name.to_string(),
                    self.timeout.as_secs(),
                ))
            }
        }
    }
}

/// Normalize caller arguments into a key/value map. Objects pass through,
/// strings run the free-text extraction cascade, anything else is empty.
fn collect_args(arguments: Option<&Value>) -> Map<String, Value> {
    match arguments {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(text)) => extract::parse_free_text(text),
        Some(other) => {
            tracing::warn!("unsupported argument shape ({}), ignoring", type_name(other));
            Map::new()
        }
        None => Map::new(),
    }
}

/// Every required parameter must be present with a non-blank string form.
/// All missing names are reported together.
fn validate_required(
    tool: &ToolDefinition,
    args: &Map<String, Value>,
) -> std::result::Result<(), InvokeError> {
    let missing: Vec<String> = tool
        .required_params()
        .filter(|p| args.get(&p.name).map(is_blank).unwrap_or(true))
        .map(|p| p.name.clone())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(InvokeError::MissingParams(missing))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => coerce_string(value).trim().is_empty(),
    }
}

/// GET query pairs; list-valued arguments expand into repeated parameters in
/// element order.
fn query_pairs(args: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(args.len());
    for (key, value) in args {
        match value {
            Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), coerce_string(item)));
                }
            }
            other => pairs.push((key.clone(), coerce_string(other))),
        }
    }
    pairs
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogLoader, ParamSpec};
    use crate::registry::Catalog;
    use crate::store::MemoryStore;
    use crate::types::CatalogConfig;
    use serde_json::json;

    fn engine_with(tools: Vec<ToolDefinition>) -> InvocationEngine {
        let store = Arc::new(MemoryStore::default());
        let loader = CatalogLoader::new(store, &CatalogConfig::default());
        let registry = Arc::new(ToolRegistry::new(loader, None));
        registry.register(Catalog::new(tools));
        InvocationEngine::new(registry, &HttpConfig::default()).unwrap()
    }

    fn tool(name: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            description: String::new(),
            url: "http://127.0.0.1:9/unused".to_string(),
            method: "GET".to_string(),
            kind: DescriptorKind::Sql,
            mock_data: None,
            data_type: String::new(),
            project_id: Some(7),
            headers: Default::default(),
            params: Vec::new(),
        }
    }

    fn required(name: &str) -> ParamSpec {
        ParamSpec {
            name: name.to_string(),
            param_type: "string".to_string(),
            description: String::new(),
            required: true,
            default_value: None,
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let engine = engine_with(vec![]);
        let err = engine.invoke("nope", None, None).await.unwrap_err();
        assert_eq!(err.to_string(), "tool not found: nope");
    }

    #[tokio::test]
    async fn mismatched_scope_is_denied() {
        let engine = engine_with(vec![tool("scoped")]);
        let err = engine.invoke("scoped", None, Some(8)).await.unwrap_err();
        assert!(matches!(err, InvokeError::AccessDenied(_, 8)));
    }

    #[tokio::test]
    async fn matching_scope_reaches_dispatch() {
        let mut t = tool("scoped");
        t.kind = DescriptorKind::Static;
        t.mock_data = Some("ok".to_string());
        let engine = engine_with(vec![t]);

        assert_eq!(engine.invoke("scoped", None, Some(7)).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn missing_required_params_reported_jointly() {
        let mut t = tool("strict");
        t.params = vec![required("id"), required("region")];
        let engine = engine_with(vec![t]);

        let err = engine
            .invoke("strict", Some(&json!({"id": "  "})), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required parameters: id, region");
    }

    #[tokio::test]
    async fn present_required_params_pass() {
        let mut t = tool("strict");
        t.kind = DescriptorKind::Static;
        t.mock_data = Some("{}".to_string());
        t.params = vec![required("id")];
        let engine = engine_with(vec![t]);

        assert!(engine
            .invoke("strict", Some(&json!({"id": "5"})), None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn static_mock_is_annotated_without_network() {
        let mut t = tool("mocked");
        t.kind = DescriptorKind::Static;
        t.mock_data = Some(r#"{"a":1}"#.to_string());
        t.data_type = "point".to_string();
        // Unroutable URL proves no network call happens.
        t.url = "http://192.0.2.1:1/never".to_string();
        let engine = engine_with(vec![t]);

        let result = engine
            .invoke("mocked", Some(&json!({"whatever": "x"})), None)
            .await
            .unwrap();
        assert_eq!(result, r#"{"a":1,"type":"point"}"#);
    }

    #[tokio::test]
    async fn free_text_arguments_are_extracted() {
        let mut t = tool("strict");
        t.kind = DescriptorKind::Static;
        t.mock_data = Some("{}".to_string());
        t.params = vec![required("id")];
        let engine = engine_with(vec![t]);

        assert!(engine
            .invoke("strict", Some(&json!("id=5, name=foo")), None)
            .await
            .is_ok());
        let err = engine
            .invoke("strict", Some(&json!("no pairs here")), None)
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::MissingParams(_)));
    }

    #[test]
    fn query_pairs_expand_lists_in_order() {
        let mut args = Map::new();
        args.insert("ids".to_string(), json!(["1", "2"]));
        args.insert("name".to_string(), json!("foo"));

        let pairs = query_pairs(&args);
        assert_eq!(
            pairs,
            vec![
                ("ids".to_string(), "1".to_string()),
                ("ids".to_string(), "2".to_string()),
                ("name".to_string(), "foo".to_string()),
            ]
        );
    }

    #[test]
    fn coercion_uses_raw_strings_and_json_for_the_rest() {
        assert_eq!(coerce_string(&json!("x")), "x");
        assert_eq!(coerce_string(&json!(5)), "5");
        assert_eq!(coerce_string(&json!(true)), "true");
    }

    #[test]
    fn blank_detection_handles_non_strings() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("  ")));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!("x")));
    }
}
