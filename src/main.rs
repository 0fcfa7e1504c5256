//! Toolbridge server - main entry point.
//!
//! Seeds the descriptor store, performs the initial catalog load, and serves
//! the JSON-RPC endpoint plus the management surface until interrupted.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use toolbridge::catalog::CatalogLoader;
use toolbridge::engine::InvocationEngine;
use toolbridge::http::{router, AppState};
use toolbridge::registry::ToolRegistry;
use toolbridge::rpc::{McpFacade, ServerInfo};
use toolbridge::store::MemoryStore;
use toolbridge::types::Config;

#[derive(Parser, Debug)]
#[command(name = "toolbridge-server", version, about)]
struct Args {
    /// HTTP bind address.
    #[arg(long, env = "TOOLBRIDGE_LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    listen_addr: String,

    /// Base URL prepended to descriptor paths without a scheme.
    #[arg(long, env = "TOOLBRIDGE_API_BASE_URL", default_value = "http://localhost:8080")]
    api_base_url: String,

    /// JSON file of descriptor rows used to seed the in-memory store.
    #[arg(long, env = "TOOLBRIDGE_SEED_FILE")]
    seed_file: Option<String>,

    /// Project scope for startup load and reloads (loads all when omitted).
    #[arg(long, env = "TOOLBRIDGE_PROJECT_SCOPE")]
    project_scope: Option<i64>,

    /// Outbound request timeout in seconds.
    #[arg(long, env = "TOOLBRIDGE_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,
}

impl Args {
    fn into_config(self) -> (Config, Option<String>) {
        let mut config = Config::default();
        config.server.listen_addr = self.listen_addr;
        config.catalog.api_base_url = self.api_base_url;
        config.catalog.default_project_scope = self.project_scope;
        config.http.request_timeout = Duration::from_secs(self.request_timeout_secs);
        (config, self.seed_file)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, seed_file) = Args::parse().into_config();

    // Initialize observability
    toolbridge::observability::init_tracing();

    // Seed the descriptor store; a missing or unreadable seed file degrades to
    // an empty store, the server still comes up.
    let store = match &seed_file {
        Some(path) => match MemoryStore::from_json_file(path) {
            Ok(store) => {
                tracing::info!("seeded {} descriptor rows from {}", store.len(), path);
                store
            }
            Err(e) => {
                tracing::warn!("failed to read seed file {}: {}, starting empty", path, e);
                MemoryStore::default()
            }
        },
        None => {
            tracing::warn!("no seed file configured, descriptor store starts empty");
            MemoryStore::default()
        }
    };

    let loader = CatalogLoader::new(Arc::new(store), &config.catalog);
    let registry = Arc::new(ToolRegistry::new(
        loader,
        config.catalog.default_project_scope,
    ));
    let engine = Arc::new(InvocationEngine::new(registry.clone(), &config.http)?);
    let facade = Arc::new(McpFacade::new(registry.clone(), engine, ServerInfo::default()));

    // Initial catalog load
    let report = registry.reload().await;
    tracing::info!("startup catalog: {} tools", report.after);

    let app = router(AppState { facade });
    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr).await?;
    tracing::info!("toolbridge server listening on {}", config.server.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {}", e);
        return;
    }
    tracing::info!("shutdown signal received");
}
