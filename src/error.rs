//! Error types for wp-unclaimed

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scanning for unclaimed plugins
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or disallowed target URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to create HTTP client
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),

    /// Request failed at the transport layer (timeout, DNS, TLS, refused)
    #[error("request failed: {0}")]
    Transport(String),

    /// HTTP response error status on a body fetch
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// Target list file could not be read
    #[error("cannot read target list '{path}': {source}")]
    TargetList {
        /// Path of the target list file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No targets were supplied
    #[error("no targets provided (pass URLs or use --file)")]
    NoTargets,

    /// Output operation failed
    #[error("output failed: {0}")]
    OutputFailed(#[source] std::io::Error),

    /// JSON serialization failed
    #[error("JSON serialization failed")]
    SerializationFailed(#[from] serde_json::Error),
}
