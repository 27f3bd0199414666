//! Error types for the application.

use std::error::Error as StdError;
use std::io;

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },

    #[error("Missing required setting: {field}")]
    MissingField { field: String },
}

/// Failures of a single review submission to the REST API.
///
/// Non-2xx responses are not errors here: they are a regular outcome
/// carrying the status and body.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Could not connect to the API: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("API request timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("{0}")]
    Unexpected(#[source] reqwest::Error),
}

impl ForwardError {
    /// Classify a transport error. Connection failures win over timeouts,
    /// so a connect timeout counts as a connection failure, and so does a
    /// connection the API closed or reset before answering.
    pub fn classify(error: reqwest::Error) -> Self {
        if error.is_connect() || is_connection_lost(&error) {
            ForwardError::Connection(error)
        } else if error.is_timeout() {
            ForwardError::Timeout(error)
        } else {
            ForwardError::Unexpected(error)
        }
    }
}

/// Whether anything in the source chain says the connection went away.
fn is_connection_lost(error: &(dyn StdError + 'static)) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::BrokenPipe
            ) {
                return true;
            }
        }
        if let Some(hyper) = cause.downcast_ref::<hyper::Error>() {
            if hyper.is_incomplete_message() || hyper.is_closed() {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

/// Discord-related errors.
#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("Failed to add reaction: {0}")]
    ReactFailed(#[source] serenity::Error),

    #[error("Failed to send message: {0}")]
    SendFailed(#[source] serenity::Error),
}

/// Result type alias for Discord operations.
pub type DiscordResult<T> = std::result::Result<T, DiscordError>;
