//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// JSON-RPC 2.0 error codes used by the protocol facade.
pub mod rpc_code {
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Main error enum for the toolbridge server.
#[derive(Error, Debug)]
pub enum Error {
    /// Validation errors (map to JSON-RPC -32602 invalid params).
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found (map to JSON-RPC -32601 when it names a method).
    #[error("not found: {0}")]
    NotFound(String),

    /// Descriptor store failures (fetch or flag update).
    #[error("store error: {0}")]
    Store(String),

    /// Internal errors (map to JSON-RPC -32603).
    #[error("internal error: {0}")]
    Internal(String),

    /// Timeout on an outbound call.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Outbound HTTP transport errors.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert to a JSON-RPC 2.0 error code.
    ///
    /// `NotFound` maps to method-not-found because the only not-found surfaced
    /// through the protocol envelope is an unknown method; unknown *tools* are
    /// reported as textual results, never as envelope errors.
    pub fn to_rpc_code(&self) -> i64 {
        match self {
            Error::Validation(_) => rpc_code::INVALID_PARAMS,
            Error::NotFound(_) => rpc_code::METHOD_NOT_FOUND,
            Error::Store(_)
            | Error::Internal(_)
            | Error::Timeout(_)
            | Error::Serialization(_)
            | Error::Http(_)
            | Error::Io(_) => rpc_code::INTERNAL_ERROR,
        }
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }
}
