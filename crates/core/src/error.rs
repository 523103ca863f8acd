//! Error types for the ad collector
//!
//! Only recoverable API failures live here. Rejected ads are not errors: they
//! are reported through collect outcomes. Broken internal invariants panic.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

use crate::expr::ParseError;

/// Result type alias for collector operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the ad collector
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (config files, transport sockets)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Expression text failed to parse
    #[error("Invalid expression: {0}")]
    InvalidExpression(#[from] ParseError),

    /// Configuration could not be read or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport collaborator failed while reading an ad
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl Error {
    /// Build a configuration error from any displayable message
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Build a transport error from any displayable message
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(msg.into())
    }
}
