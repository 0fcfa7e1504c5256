//! Core types for the toolbridge server.
//!
//! This module provides foundational types used throughout the system:
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for server, catalog, and dispatch

mod config;
mod errors;

pub use config::{CatalogConfig, Config, HttpConfig, ObservabilityConfig, ServerConfig};
pub use errors::{rpc_code, Error, Result};
