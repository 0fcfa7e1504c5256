//! Catalog loader — reads active descriptors and materializes tool definitions.
//!
//! Loading fails soft: any store error degrades to an empty catalog with a
//! logged warning. A malformed parameter schema degrades only the tool it
//! belongs to. The process never goes down because an administrator authored a
//! bad descriptor.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::store::{ApiDescriptor, DescriptorStore};
use crate::types::CatalogConfig;

use super::datatype::InferenceTable;
use super::params::parse_param_schema;
use super::ToolDefinition;

/// Materializes descriptor rows into tool definitions.
pub struct CatalogLoader {
    store: Arc<dyn DescriptorStore>,
    base_url: String,
    inference: InferenceTable,
}

impl std::fmt::Debug for CatalogLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogLoader")
            .field("base_url", &self.base_url)
            .field("inference", &self.inference)
            .finish_non_exhaustive()
    }
}

impl CatalogLoader {
    pub fn new(store: Arc<dyn DescriptorStore>, config: &CatalogConfig) -> Self {
        Self {
            store,
            base_url: config.api_base_url.clone(),
            inference: InferenceTable::with_default_rules(config.default_data_type.clone()),
        }
    }

    /// Replace the data-type inference table.
    pub fn with_inference_table(mut self, table: InferenceTable) -> Self {
        self.inference = table;
        self
    }

    /// Load the catalog for a project scope (`None` = all active descriptors).
    ///
    /// Store failures yield an empty list with a warning; they are never
    /// surfaced to the caller. Successfully fetched rows are bulk-marked as
    /// registered, also best-effort.
    pub async fn load(&self, scope: Option<i64>) -> Vec<ToolDefinition> {
        let fetched = match scope {
            Some(id) => self.store.fetch_active_by_scope(id).await,
            None => self.store.fetch_active().await,
        };

        let rows = match fetched {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("catalog load failed, keeping empty catalog: {}", e);
                return Vec::new();
            }
        };

        if rows.is_empty() {
            tracing::warn!(?scope, "no active descriptors found");
            return Vec::new();
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let tools: Vec<ToolDefinition> = rows.into_iter().map(|r| self.to_definition(r)).collect();

        match self.store.mark_registered(&ids).await {
            Ok(count) => tracing::info!("marked {} descriptors as registered", count),
            Err(e) => tracing::warn!("failed to flag descriptors as registered: {}", e),
        }

        tracing::info!(?scope, "loaded {} tools from descriptor store", tools.len());
        for tool in &tools {
            tracing::debug!("tool {} -> {} {}", tool.name, tool.method, tool.url);
        }

        tools
    }

    fn to_definition(&self, row: ApiDescriptor) -> ToolDefinition {
        let params = match row.request_params.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => match parse_param_schema(raw) {
                Ok(specs) => specs,
                Err(e) => {
                    tracing::warn!("invalid parameter schema for tool {}: {}", row.name, e);
                    Vec::new()
                }
            },
            _ => Vec::new(),
        };

        let data_type = match row.data_type.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => explicit.to_string(),
            _ => self.inference.infer(&row.name).to_string(),
        };

        let method = row
            .method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("GET")
            .to_uppercase();

        ToolDefinition {
            name: row.name,
            description: row.description.unwrap_or_default(),
            url: resolve_url(&self.base_url, &row.path),
            method,
            kind: row.kind,
            mock_data: row.mock_data,
            data_type,
            project_id: row.project_id,
            headers: BTreeMap::new(),
            params,
        }
    }
}

/// Resolve a descriptor path against the base URL.
///
/// Paths that already carry a scheme are used verbatim; everything else is
/// joined to the base with exactly one separating slash.
pub fn resolve_url(base_url: &str, path: &str) -> String {
    let path = path.trim();
    let lower = path.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DescriptorKind, MemoryStore, MockDescriptorStore};
    use crate::types::Error;

    fn config() -> CatalogConfig {
        CatalogConfig {
            api_base_url: "http://host:1".to_string(),
            default_project_scope: None,
            default_data_type: "api".to_string(),
        }
    }

    fn row(id: i64, name: &str) -> ApiDescriptor {
        ApiDescriptor {
            id,
            name: name.to_string(),
            path: "foo/bar".to_string(),
            kind: DescriptorKind::Sql,
            method: None,
            auth_type: None,
            sql_data: None,
            mock_data: None,
            datasource: None,
            project_id: Some(7),
            description: Some("a tool".to_string()),
            deleted: false,
            request_params: None,
            data_type: None,
            registered: false,
        }
    }

    #[test]
    fn url_join_normalizes_slashes() {
        assert_eq!(resolve_url("http://host:1", "foo/bar"), "http://host:1/foo/bar");
        assert_eq!(resolve_url("http://host:1/", "/foo/bar"), "http://host:1/foo/bar");
        assert_eq!(resolve_url("http://host:1/", "foo/bar"), "http://host:1/foo/bar");
    }

    #[test]
    fn absolute_paths_pass_verbatim() {
        assert_eq!(resolve_url("http://host:1", "http://other/x"), "http://other/x");
        assert_eq!(resolve_url("http://host:1", "HTTPS://other/x"), "HTTPS://other/x");
    }

    #[tokio::test]
    async fn load_converts_rows() {
        let mut deleted = row(2, "gone");
        deleted.deleted = true;
        let store = Arc::new(MemoryStore::new(vec![row(1, "poi_query"), deleted]));
        let loader = CatalogLoader::new(store, &config());

        let tools = loader.load(None).await;
        assert_eq!(tools.len(), 1);
        let tool = &tools[0];
        assert_eq!(tool.name, "poi_query");
        assert_eq!(tool.url, "http://host:1/foo/bar");
        assert_eq!(tool.method, "GET");
        assert_eq!(tool.data_type, "poi");
        assert_eq!(tool.project_id, Some(7));
    }

    #[tokio::test]
    async fn load_marks_rows_registered() {
        let store = Arc::new(MemoryStore::new(vec![row(1, "a"), row(2, "b")]));
        let loader = CatalogLoader::new(store.clone(), &config());

        loader.load(None).await;

        assert!(store.fetch_by_name("a").await.unwrap().unwrap().registered);
        assert!(store.fetch_by_name("b").await.unwrap().unwrap().registered);
    }

    #[tokio::test]
    async fn explicit_data_type_wins_over_inference() {
        let mut r = row(1, "poi_query");
        r.data_type = Some("custom".to_string());
        let store = Arc::new(MemoryStore::new(vec![r]));
        let loader = CatalogLoader::new(store, &config());

        let tools = loader.load(None).await;
        assert_eq!(tools[0].data_type, "custom");
    }

    #[tokio::test]
    async fn blank_data_type_is_inferred() {
        let mut r = row(1, "site_statistics");
        r.data_type = Some("   ".to_string());
        let store = Arc::new(MemoryStore::new(vec![r]));
        let loader = CatalogLoader::new(store, &config());

        let tools = loader.load(None).await;
        assert_eq!(tools[0].data_type, "statistics");
    }

    #[tokio::test]
    async fn bad_param_schema_degrades_single_tool() {
        let mut bad = row(1, "bad_params");
        bad.request_params = Some("not json at all".to_string());
        let mut good = row(2, "good_params");
        good.request_params =
            Some(r#"[{"paramName": "id", "required": true}]"#.to_string());
        let store = Arc::new(MemoryStore::new(vec![bad, good]));
        let loader = CatalogLoader::new(store, &config());

        let tools = loader.load(None).await;
        assert_eq!(tools.len(), 2);
        assert!(tools[0].params.is_empty());
        assert_eq!(tools[1].params.len(), 1);
    }

    #[tokio::test]
    async fn store_failure_yields_empty_catalog() {
        let mut mock = MockDescriptorStore::new();
        mock.expect_fetch_active()
            .returning(|| Err(Error::store("connection refused")));
        let loader = CatalogLoader::new(Arc::new(mock), &config());

        let tools = loader.load(None).await;
        assert!(tools.is_empty());
    }

    #[tokio::test]
    async fn scoped_load_queries_by_scope() {
        let store = Arc::new(MemoryStore::new(vec![row(1, "a"), {
            let mut r = row(2, "other_scope");
            r.project_id = Some(99);
            r
        }]));
        let loader = CatalogLoader::new(store, &config());

        let tools = loader.load(Some(7)).await;
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "a");
    }

    #[tokio::test]
    async fn custom_inference_table_is_used() {
        use crate::catalog::datatype::InferenceTable;

        let store = Arc::new(MemoryStore::new(vec![row(1, "weather_lookup")]));
        let loader = CatalogLoader::new(store, &config()).with_inference_table(
            InferenceTable::new(vec![("weather".to_string(), "forecast".to_string())], "generic"),
        );

        let tools = loader.load(None).await;
        assert_eq!(tools[0].data_type, "forecast");
    }

    #[tokio::test]
    async fn method_is_uppercased() {
        let mut r = row(1, "poster");
        r.method = Some("post".to_string());
        let store = Arc::new(MemoryStore::new(vec![r]));
        let loader = CatalogLoader::new(store, &config());

        let tools = loader.load(None).await;
        assert_eq!(tools[0].method, "POST");
    }
}
