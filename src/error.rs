//! Error types for training-mapper

use thiserror::Error;

/// Main error type for training-mapper operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Language model returned an empty response")]
    EmptyResponse,

    #[error("Could not parse model response: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for training-mapper operations
pub type Result<T> = std::result::Result<T, Error>;
