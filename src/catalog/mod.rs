//! Tool catalog — derived tool definitions and the loader that materializes
//! them from descriptor rows.

pub mod datatype;
pub mod loader;
pub mod params;

pub use datatype::{InferenceTable, DEFAULT_INFERENCE_RULES};
pub use loader::CatalogLoader;
pub use params::parse_param_schema;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::store::DescriptorKind;

/// A single parameter specification for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    /// Semantic type tag as authored (string, number, ...). Display-only.
    pub param_type: String,
    pub description: String,
    pub required: bool,
    /// Default sourced from the descriptor's example value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

/// One invocable tool, derived from exactly one descriptor.
///
/// Definitions are immutable once published into a catalog generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// Resolved absolute endpoint URL.
    pub url: String,
    /// Uppercased HTTP verb.
    pub method: String,
    pub kind: DescriptorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_data: Option<String>,
    /// Display category injected into responses, explicit or inferred.
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    /// Extra headers attached to every dispatch, string-coerced on the wire.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Value>,
    /// Parameter specs in authored order.
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

impl ToolDefinition {
    /// Required parameter specs, in authored order.
    pub fn required_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|p| p.required)
    }
}
