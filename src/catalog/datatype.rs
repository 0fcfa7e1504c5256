//! Data-type inference for descriptors that declare none.
//!
//! A best-effort heuristic over human-readable tool names: the name is scanned
//! (case-insensitively) against an ordered keyword table and the first matching
//! rule's category wins. The table is plain data so deployments can swap it
//! without touching the loader.

/// Built-in keyword rules, checked in order. `point` sits after the more
/// specific `poi` so point-of-interest names do not fall through to the
/// generic point category.
pub const DEFAULT_INFERENCE_RULES: &[(&str, &str)] = &[
    ("legend", "legend"),
    ("point-of-interest", "poi"),
    ("poi", "poi"),
    ("geometry", "geometry"),
    ("path", "path"),
    ("text", "text"),
    ("statistic", "statistics"),
    ("point", "point"),
];

/// Ordered keyword → category table with a fallback category.
#[derive(Debug, Clone)]
pub struct InferenceTable {
    rules: Vec<(String, String)>,
    fallback: String,
}

impl InferenceTable {
    /// Table with the built-in rules and the given fallback category.
    pub fn with_default_rules(fallback: impl Into<String>) -> Self {
        Self::new(
            DEFAULT_INFERENCE_RULES
                .iter()
                .map(|(k, c)| (k.to_string(), c.to_string()))
                .collect(),
            fallback,
        )
    }

    pub fn new(rules: Vec<(String, String)>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// Infer a category from a tool name. First rule whose keyword occurs in
    /// the lowercased name wins; no match yields the fallback.
    pub fn infer(&self, tool_name: &str) -> &str {
        let name = tool_name.to_lowercase();
        self.rules
            .iter()
            .find(|(keyword, _)| name.contains(keyword.as_str()))
            .map(|(_, category)| category.as_str())
            .unwrap_or(&self.fallback)
    }
}
