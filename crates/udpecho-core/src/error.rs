//! Error types shared by the core library and the udpecho binary.

use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for udpecho.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be read or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Text that is not a valid IPv4 address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Port outside 1..=65535
    #[error("Invalid port number: {0}")]
    InvalidPort(i64),

    /// A socket option could not be applied
    #[error("Failed to set {option}: {source}")]
    SocketOption {
        option: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// No reply arrived within the configured timeout
    #[error("Timeout waiting for response after {0}s")]
    Timeout(u64),
}

impl Error {
    /// Build a configuration error from anything displayable.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
