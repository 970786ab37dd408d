//! Error types for scribble-core

use thiserror::Error;

/// Result type alias using scribble-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in scribble-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local input validation failed; no request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// The server rejected the bearer token; the session has been cleared
    #[error("Session expired, please sign in again")]
    AuthExpired,

    /// No bearer token is available for an operation that needs one
    #[error("Not signed in")]
    Unauthenticated,

    /// The server reported that the resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success HTTP status
    #[error("Request failed with HTTP {status}: {message}")]
    RequestFailed { status: u16, message: String },

    /// Network-level failure (unreachable host, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a payload that does not decode
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A note create is already outstanding
    #[error("A note is already being created")]
    CreateInFlight,

    /// An editor transition was requested from the wrong state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Session persistence backend failure
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True when the failure invalidated the session.
    #[must_use]
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// HTTP status associated with the failure, when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::AuthExpired => Some(401),
            Self::NotFound(_) => Some(404),
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
