//! Core error types for sitewarden-core.
//!
//! The navigation path never surfaces these to the browser: the guard logs
//! and falls back to Allow. They exist so the CRUD layer, the stores and the
//! CLI can report what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for sitewarden-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    /// A site or schedule referenced by key does not exist
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing storage could not be read or written
    #[error("Store at {path} is unavailable: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored data exists but is not a JSON object or has the wrong shape
    #[error("Store contents are corrupt: {0}")]
    Corrupt(String),

    /// Value could not be encoded or decoded
    #[error("Store value error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Key does not name a configuration field
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse a configuration value
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Data directory could not be created
    #[error("Failed to access data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Time is not a zero-padded 24h `HH:MM`
    #[error("Invalid time '{0}': expected HH:MM (24h)")]
    InvalidTime(String),

    /// Window start after its end
    #[error("Invalid time range: start_time ({start}) must not be after end_time ({end})")]
    InvalidTimeRange { start: String, end: String },

    /// Site input reduced to nothing after normalization
    #[error("Empty host: nothing left of '{0}' after normalization")]
    EmptyHost(String),

    /// Site input names no usable host
    #[error("Invalid host '{input}': {reason}")]
    InvalidHost { input: String, reason: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// URL errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// Input could not be parsed as a URL
    #[error("Malformed URL '{input}': {source}")]
    Malformed {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// URL parsed but carries no host (e.g. `file:///`)
    #[error("URL '{0}' has no host")]
    MissingHost(String),
}

impl CoreError {
    pub(crate) fn site_not_found(url: &str) -> Self {
        CoreError::NotFound {
            kind: "site",
            key: url.to_string(),
        }
    }

    pub(crate) fn schedule_not_found(id: &str) -> Self {
        CoreError::NotFound {
            kind: "schedule",
            key: id.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_kind_and_key() {
        let err = CoreError::site_not_found("example.com");
        assert_eq!(err.to_string(), "site not found: example.com");
    }

    #[test]
    fn validation_error_converts_into_core_error() {
        let err: CoreError = ValidationError::InvalidTime("9:5".into()).into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("9:5"));
    }
}
