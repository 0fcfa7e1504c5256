//! Descriptor store — persisted API descriptor rows and the collaborator contract.
//!
//! The real persistence engine lives outside this crate; the `DescriptorStore`
//! trait is the read/update contract the catalog loader requires, and
//! `MemoryStore` is the in-process implementation used by the server binary
//! (seeded from a JSON file) and the test suites.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::RwLock;

use crate::types::{Error, Result};

/// Payload kind of a descriptor.
///
/// Only `Static` drives dispatch behavior (mock short-circuit); `Sql` rows are
/// carried through but proxied like any other HTTP endpoint. Unknown tags are
/// preserved rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DescriptorKind {
    Sql,
    Mock,
    Static,
    Other(String),
}

impl From<String> for DescriptorKind {
    fn from(tag: String) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "sql" => Self::Sql,
            "mock" => Self::Mock,
            "static" => Self::Static,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for DescriptorKind {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<DescriptorKind> for String {
    fn from(kind: DescriptorKind) -> Self {
        match kind {
            DescriptorKind::Sql => "sql".to_string(),
            DescriptorKind::Mock => "mock".to_string(),
            DescriptorKind::Static => "static".to_string(),
            DescriptorKind::Other(tag) => tag,
        }
    }
}

impl Default for DescriptorKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

/// One persisted API descriptor row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDescriptor {
    pub id: i64,
    pub name: String,
    /// Endpoint path, either absolute (`http://...`) or relative to the
    /// configured base URL.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub kind: DescriptorKind,
    /// HTTP verb; blank rows fall back to GET at load time.
    #[serde(default)]
    pub method: Option<String>,
    /// Authorization tag (none/code/secret). Carried, not exercised by dispatch.
    #[serde(default)]
    pub auth_type: Option<String>,
    /// SQL payload for SQL-kind rows. Carried, not exercised by dispatch.
    #[serde(default)]
    pub sql_data: Option<String>,
    #[serde(default)]
    pub mock_data: Option<String>,
    /// Datasource reference for SQL-kind rows.
    #[serde(default)]
    pub datasource: Option<String>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    /// Raw parameter-schema text: a JSON array of parameter descriptors.
    #[serde(default)]
    pub request_params: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    /// Set once the row has been materialized as a tool.
    #[serde(default)]
    pub registered: bool,
}

/// Read/update contract required by the catalog loader.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DescriptorStore: Send + Sync {
    /// All non-deleted descriptors.
    async fn fetch_active(&self) -> Result<Vec<ApiDescriptor>>;

    /// Non-deleted descriptors bound to the given project scope.
    async fn fetch_active_by_scope(&self, scope: i64) -> Result<Vec<ApiDescriptor>>;

    /// Look up one non-deleted descriptor by name.
    async fn fetch_by_name(&self, name: &str) -> Result<Option<ApiDescriptor>>;

    /// Mark the given rows as registered. Idempotent; returns the number of
    /// rows that matched.
    async fn mark_registered(&self, ids: &[i64]) -> Result<usize>;
}

/// In-memory descriptor store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<ApiDescriptor>>,
}

impl MemoryStore {
    pub fn new(rows: Vec<ApiDescriptor>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Seed a store from a JSON file containing an array of descriptor rows.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let rows: Vec<ApiDescriptor> = serde_json::from_str(&text)?;
        Ok(Self::new(rows))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<ApiDescriptor>> {
        // A poisoned lock means a writer panicked mid-update; the row Vec is
        // still structurally sound, so keep serving.
        self.rows.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DescriptorStore for MemoryStore {
    async fn fetch_active(&self) -> Result<Vec<ApiDescriptor>> {
        Ok(self.read().iter().filter(|d| !d.deleted).cloned().collect())
    }

    async fn fetch_active_by_scope(&self, scope: i64) -> Result<Vec<ApiDescriptor>> {
        Ok(self
            .read()
            .iter()
            .filter(|d| !d.deleted && d.project_id == Some(scope))
            .cloned()
            .collect())
    }

    async fn fetch_by_name(&self, name: &str) -> Result<Option<ApiDescriptor>> {
        Ok(self
            .read()
            .iter()
            .find(|d| !d.deleted && d.name == name)
            .cloned())
    }

    async fn mark_registered(&self, ids: &[i64]) -> Result<usize> {
        let wanted: HashSet<i64> = ids.iter().copied().collect();
        let mut rows = self
            .rows
            .write()
            .map_err(|_| Error::store("descriptor store lock poisoned"))?;
        let mut updated = 0;
        for row in rows.iter_mut() {
            if wanted.contains(&row.id) {
                row.registered = true;
                updated += 1;
            }
        }
        Ok(updated)
    }
}
