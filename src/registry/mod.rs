//! Tool registry — the queryable index over the current catalog generation.
//!
//! The catalog is read-mostly and replaced wholesale on reload, so it lives as
//! an immutable `Arc<Catalog>` behind a single swappable reference. Readers
//! clone the `Arc` under a momentary read guard and then work lock-free on
//! their generation; a reload builds the next generation off to the side and
//! swaps the pointer. In-flight invocations holding the previous generation
//! simply finish against it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::catalog::{CatalogLoader, ToolDefinition};

/// One immutable catalog generation.
///
/// Names are unique within a generation; when the loader produces duplicates,
/// the later definition silently shadows the earlier one.
#[derive(Debug, Default)]
pub struct Catalog {
    tools: Vec<Arc<ToolDefinition>>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(definitions: Vec<ToolDefinition>) -> Self {
        let mut tools: Vec<Arc<ToolDefinition>> = Vec::with_capacity(definitions.len());
        let mut index = HashMap::with_capacity(definitions.len());

        for def in definitions {
            let def = Arc::new(def);
            match index.get(&def.name) {
                Some(&slot) => {
                    tools[slot] = def;
                }
                None => {
                    index.insert(def.name.clone(), tools.len());
                    tools.push(def);
                }
            }
        }

        Self { tools, index }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ToolDefinition>> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    /// Tools in load order, optionally filtered by project scope.
    /// `None` returns the full generation.
    pub fn list(&self, scope: Option<i64>) -> Vec<Arc<ToolDefinition>> {
        self.tools
            .iter()
            .filter(|t| scope.is_none() || t.project_id == scope)
            .cloned()
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Before/after bookkeeping for a reload.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReloadReport {
    pub before: usize,
    pub after: usize,
}

impl ReloadReport {
    pub fn delta(&self) -> i64 {
        self.after as i64 - self.before as i64
    }
}

/// Runtime registry over the current catalog generation.
pub struct ToolRegistry {
    loader: CatalogLoader,
    default_scope: Option<i64>,
    current: RwLock<Arc<Catalog>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.snapshot().len())
            .field("default_scope", &self.default_scope)
            .finish_non_exhaustive()
    }
}

impl ToolRegistry {
    /// Registry starting from an empty generation; call [`reload`] to publish
    /// the first real catalog.
    ///
    /// [`reload`]: ToolRegistry::reload
    pub fn new(loader: CatalogLoader, default_scope: Option<i64>) -> Self {
        Self {
            loader,
            default_scope,
            current: RwLock::new(Arc::new(Catalog::default())),
        }
    }

    /// The current generation. Cheap; callers keep the `Arc` for as long as
    /// they need a consistent view.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Atomically publish a new generation.
    pub fn register(&self, catalog: Catalog) {
        let next = Arc::new(catalog);
        let mut slot = self.current.write().unwrap_or_else(|e| e.into_inner());
        *slot = next;
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<ToolDefinition>> {
        self.snapshot().get(name).cloned()
    }

    /// Tools visible to a caller scope; `None` means unfiltered.
    pub fn list(&self, scope: Option<i64>) -> Vec<Arc<ToolDefinition>> {
        self.snapshot().list(scope)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Reload from the descriptor store and swap in the new generation.
    /// Safe under concurrent reads.
    pub async fn reload(&self) -> ReloadReport {
        let before = self.len();
        let definitions = self.loader.load(self.default_scope).await;
        self.register(Catalog::new(definitions));
        let after = self.len();

        let report = ReloadReport { before, after };
        tracing::info!(
            "registry reloaded: {} -> {} tools (delta {})",
            report.before,
            report.after,
            report.delta(),
        );
        report
    }

    /// Human-readable listing of a tool's required parameters, for error
    /// messages and the management surface. `None` when the tool is unknown.
    pub fn describe_required_params(&self, name: &str) -> Option<String> {
        let tool = self.lookup(name)?;
        let required: Vec<String> = tool
            .required_params()
            .map(|p| format!("{} ({})", p.name, p.param_type))
            .collect();

        Some(if required.is_empty() {
            "no required parameters".to_string()
        } else {
            format!("required parameters: {}", required.join(", "))
        })
    }
}
