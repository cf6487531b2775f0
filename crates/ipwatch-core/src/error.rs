//! Error types for the IP watcher
//!
//! Each collaborator has its own error enum so callers (and tests) can match
//! on the failure kind. [`Error`] wraps all of them for code that just wants
//! to propagate.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for watcher operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the public address lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The lookup service could not be reached
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The lookup did not complete within the request timeout
    #[error("lookup timed out")]
    Timeout,

    /// The response body did not carry the expected address field
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The lookup service answered with a non-success status
    #[error("service error: HTTP {status}")]
    ServiceError {
        /// HTTP status code returned by the service
        status: u16,
    },
}

/// Failures of an outbound announcement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The destination could not be resolved or cannot carry text
    #[error("destination unavailable: {0}")]
    DestinationUnavailable(String),

    /// The platform rejected the message or the connection dropped
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Failures of the durable address storage
#[derive(Error, Debug)]
pub enum StoreError {
    /// The storage location exists but could not be read or is corrupt
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The new address could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a check cycle ended without completing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// The current address could not be determined
    #[error("address resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// The changed address could not be announced; nothing was persisted
    #[error("announcement failed: {0}")]
    Notify(#[from] NotifyError),

    /// Another check cycle is still in flight
    #[error("a check is already in progress")]
    AlreadyRunning,
}

/// Top-level error type for the IP watcher
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Check(#[from] CheckError),

    /// Messaging platform session errors (login, event stream)
    #[error("Chat platform error: {0}")]
    Chat(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a chat platform error
    pub fn chat(msg: impl Into<String>) -> Self {
        Self::Chat(msg.into())
    }

    /// Whether this error must stop the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Chat(_))
    }
}
