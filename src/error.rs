//! QueryGate error types

use thiserror::Error;

/// QueryGate error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External classifier failed or returned malformed output
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Requester directory error
    #[error("Directory error: {0}")]
    Directory(String),

    /// Authorization rule evaluation error
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Transport failure talking to the classifier
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for QueryGate operations
pub type Result<T> = std::result::Result<T, Error>;
