//! Error types for scopekit
//!
//! This module defines the error types used throughout the library.

use thiserror::Error;

use crate::exception::Exception;

/// Result type alias for scopekit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a scope
#[derive(Error, Debug)]
pub enum Error {
    /// An exception escaped the scope
    #[error("{}", .0.summary())]
    Raised(Exception),

    /// The scope protocol was violated (e.g. a procedure that never suspends)
    ///
    /// `context` holds the exception that was in flight when the violation
    /// was detected.
    #[error("configuration error: {message}")]
    Configuration {
        /// What went wrong
        message: String,
        /// Exception raised by the scope body, if any
        #[source]
        context: Option<Exception>,
    },

    /// No scenario with the requested name
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Protocol violation with no exception in flight
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: None,
        }
    }

    /// Attach the in-flight exception to a configuration error
    ///
    /// Other variants, and configuration errors that already carry a
    /// context, are returned unchanged.
    #[must_use]
    pub fn with_context(self, exception: Exception) -> Self {
        match self {
            Self::Configuration {
                message,
                context: None,
            } => Self::Configuration {
                message,
                context: Some(exception),
            },
            other => other,
        }
    }

    /// The escaped exception, if this error carries one
    #[must_use]
    pub fn exception(&self) -> Option<&Exception> {
        match self {
            Self::Raised(exc) => Some(exc),
            _ => None,
        }
    }

    /// Consume the error, returning the escaped exception if any
    #[must_use]
    pub fn into_exception(self) -> Option<Exception> {
        match self {
            Self::Raised(exc) => Some(exc),
            _ => None,
        }
    }

    /// Whether this error is a protocol contract violation
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl From<Exception> for Error {
    fn from(exc: Exception) -> Self {
        Self::Raised(exc)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
