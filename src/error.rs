use thiserror::Error;

/// Errors surfaced by the probe pipeline.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The example command could not be turned into a request.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A single dispatch failed below the HTTP layer (connect, TLS, timeout).
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
