//! # Toolbridge - Dynamic API Tool Bridge
//!
//! Exposes a database-authored catalog of external HTTP APIs as named,
//! invocable tools over the MCP JSON-RPC 2.0 protocol:
//! - Catalog loading from a descriptor store (fail-soft, scope-aware)
//! - Copy-on-write tool registry with atomic generation swaps
//! - End-to-end invocation engine (resolve, authorize, validate, dispatch,
//!   post-process)
//! - JSON-RPC facade (`initialize`, `tools/list`, `tools/call`, `tools/reload`)
//!   plus a thin management surface
//!
//! ## Architecture
//!
//! ```text
//!   POST /mcp  →  ┌─────────────────────────────────────┐
//!                 │           McpFacade                 │
//!                 │  ┌──────────┐  ┌──────────────────┐ │
//!                 │  │ Registry │  │ InvocationEngine │─┼─→ outbound HTTP
//!                 │  └────┬─────┘  └──────────────────┘ │
//!                 └───────┼───────────────────────────────┘
//!                         │ reload
//!                 ┌───────▼──────┐      ┌─────────────────┐
//!                 │CatalogLoader │ ←──  │ DescriptorStore │
//!                 └──────────────┘      └─────────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod catalog;
pub mod engine;
pub mod http;
pub mod registry;
pub mod rpc;
pub mod store;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
