//! Configuration structures.
//!
//! Configuration is loaded from CLI arguments and environment variables; every
//! section carries serde defaults so partial configs stay valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Global server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Catalog loading configuration.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Outbound HTTP dispatch configuration.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP bind address for the JSON-RPC and management endpoints.
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Catalog loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL prepended to descriptor paths that carry no scheme.
    pub api_base_url: String,

    /// Project scope used by startup load and `tools/reload`. `None` loads
    /// every active descriptor.
    pub default_project_scope: Option<i64>,

    /// Category assigned when data-type inference finds no keyword match.
    pub default_data_type: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            default_project_scope: None,
            default_data_type: "api".to_string(),
        }
    }
}

/// Outbound HTTP dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-invocation deadline for the outbound call. Elapsed deadlines are
    /// converted to textual timeout results, never faults.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = Config::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.http.request_timeout, Duration::from_secs(30));
        assert_eq!(config.catalog.default_data_type, "api");
        assert!(config.catalog.default_project_scope.is_none());
    }

    #[test]
    fn partial_config_deserializes() {
        let config: Config =
            serde_json::from_str(r#"{"http": {"request_timeout": "5s"}}"#).unwrap();
        assert_eq!(config.http.request_timeout, Duration::from_secs(5));
        assert_eq!(config.server.listen_addr, "127.0.0.1:8080");
    }
}
