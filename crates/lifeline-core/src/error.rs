//! Core error types for lifeline-core.
//!
//! This module defines the error hierarchy using thiserror. Each concern
//! (timer, dispatch, templates, channels, sink, config, storage) has its
//! own enum; `CoreError` is the umbrella type for callers that don't care.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lifeline-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer state machine errors
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Data model errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Dispatch errors
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// CMS collaborator errors
    #[error("CMS error: {0}")]
    Cms(#[from] CmsError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Confirmation timer errors.
///
/// `InvalidTransition` is recoverable: the state machine is untouched and
/// the caller should ignore it rather than abort.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Non-positive countdown duration
    #[error("Invalid countdown timeout: {timeout_secs} seconds (must be > 0)")]
    InvalidTimeout { timeout_secs: u64 },

    /// Operation not valid in the current state
    #[error("Invalid transition: cannot {operation} while {state}")]
    InvalidTransition { operation: String, state: String },
}

/// Data model errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Severity outside the 1-10 scale
    #[error("Severity {severity} out of range (expected 1-10)")]
    SeverityOutOfRange { severity: u8 },

    /// Emergency status may only move forward
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },
}

/// Dispatch errors.
///
/// Per-contact channel failures are *not* errors at this level -- they are
/// recorded inside `DispatchResult`. Only structurally invalid input fails.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The event itself is malformed
    #[error("Malformed emergency event: {0}")]
    MalformedEvent(String),
}

/// Template resolution and rendering errors.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Provider fetch failed (network, auth, decode)
    #[error("Template fetch failed: {0}")]
    Fetch(String),
}

/// Notification channel errors, isolated per contact per channel.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Transport-level failure
    #[error("Send failed: {0}")]
    Send(String),

    /// Gateway rejected the request
    #[error("Gateway returned HTTP {status}")]
    Http { status: u16 },

    /// Channel has no usable credentials
    #[error("Channel not configured")]
    NotConfigured,
}

/// Event log sink errors -- swallowed by the dispatcher after logging.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Append failed
    #[error("Log append failed: {0}")]
    Append(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

/// CMS collaborator errors.
#[derive(Error, Debug)]
pub enum CmsError {
    /// Missing token or space id
    #[error("CMS not configured (missing token or space id)")]
    NotConfigured,

    /// HTTP request failed
    #[error("CMS request failed: {0}")]
    Request(String),

    /// CMS returned a non-success status
    #[error("CMS returned HTTP {status}")]
    Http { status: u16 },

    /// Runtime construction failed
    #[error("Failed to build async runtime: {0}")]
    Runtime(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
