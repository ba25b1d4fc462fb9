//! Error types for the IPFS path adder.

use std::fmt;
use thiserror::Error;

/// Errors produced while decoding a content identifier from JSON.
#[derive(Debug, Error)]
pub enum CidError {
    #[error("invalid cid json blob")]
    InvalidBlob,

    #[error("cid was incorrectly formatted")]
    IncorrectlyFormatted,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failure reported by the gateway itself (HTTP status >= 400).
///
/// Rendered as `"{command}: {code}: {message}"`; an empty command or a zero
/// code drops its segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseError {
    pub command: String,
    pub message: String,
    pub code: i64,
}

impl ResponseError {
    pub fn new(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            message: message.into(),
            code: 0,
        }
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.command.is_empty() {
            write!(f, "{}: ", self.command)?;
        }
        if self.code != 0 {
            write!(f, "{}: ", self.code)?;
        }
        f.write_str(&self.message)
    }
}

impl std::error::Error for ResponseError {}

/// Top-level error for gateway calls and path adding.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS or TLS failure.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Gateway(#[from] ResponseError),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Cid(#[from] CidError),

    /// Local filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid gateway url: {0}")]
    InvalidUrl(String),

    #[error("{0}: empty response")]
    EmptyResponse(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
