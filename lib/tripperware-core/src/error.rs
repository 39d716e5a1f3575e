//! Error types for tripperware handlers.

use derive_more::{Display, Error};
use http::StatusCode;

// ============================================================================
// Error Type
// ============================================================================

/// Main error type returned by handlers and middlewares.
///
/// Errors are compared and returned verbatim by middlewares, so every variant
/// is cheap to clone and comparable.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum Error {
    /// Failure annotated with an HTTP-like status code by the handler or the
    /// transport layer.
    #[display("HTTP error {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        #[error(not(source))]
        message: String,
    },

    /// The request context was cancelled.
    #[display("context canceled")]
    Canceled,

    /// The request context deadline expired.
    #[display("context deadline exceeded")]
    DeadlineExceeded,

    /// Any other handler failure, without a status code.
    #[display("{_0}")]
    Handler(#[error(not(source))] String),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error carrying a status code.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create an unclassified handler error.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }

    /// Returns the status code if the error carries one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify this error for retry decisions.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self.status().and_then(|status| StatusCode::from_u16(status).ok()) {
            Some(code) if code.is_client_error() => ErrorClass::Client(code.as_u16()),
            Some(code) if code.is_server_error() => ErrorClass::Server(code.as_u16()),
            _ => ErrorClass::Unclassified,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self.class(), ErrorClass::Client(_))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self.class(), ErrorClass::Server(_))
    }

    /// Returns `true` if the error comes from a cancelled or expired context.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Canceled | Self::DeadlineExceeded)
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Retry classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself is invalid (4xx); retrying will not help.
    Client(u16),
    /// The server failed (5xx); the request may succeed on retry.
    Server(u16),
    /// No usable status code.
    Unclassified,
}

impl ErrorClass {
    /// Returns `true` if a failure of this class is eligible for retry.
    #[must_use]
    pub const fn is_retriable(self) -> bool {
        !matches!(self, Self::Client(_))
    }
}
