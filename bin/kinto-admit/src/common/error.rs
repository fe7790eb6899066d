use alloy_primitives::hex::FromHexError;
use kinto_admission::ConfigError;

/// Error types for the kinto-admit commands
#[derive(Debug, thiserror::Error)]
pub enum AdmitError {
    /// Invalid network configuration
    #[error("Invalid network configuration: {0}")]
    Config(#[from] ConfigError),

    /// Failed to read file
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Invalid hex string
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] FromHexError),

    /// Invalid prestate JSON
    #[error("Invalid prestate: {0}")]
    InvalidPrestate(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failed to set up logging
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Result type for the kinto-admit commands
pub type Result<T> = std::result::Result<T, AdmitError>;
