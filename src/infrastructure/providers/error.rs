//! # Provider Errors
//!
//! Error types for provider adapter operations.
//!
//! # Examples
//!
//! ```
//! use financing_aggregator::infrastructure::providers::error::ProviderError;
//!
//! let error = ProviderError::timeout("request timed out after 5000ms");
//! assert!(error.is_retryable());
//!
//! let error = ProviderError::rejected(422, "invalid phone");
//! assert!(!error.is_retryable());
//! ```

use thiserror::Error;

/// Error type for provider adapter operations.
///
/// Every failure an adapter can hit on one outbound request maps to one of
/// these variants. Adapters never retry; callers decide what to do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Request timed out.
    #[error("provider timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
        /// Timeout duration in milliseconds.
        timeout_ms: Option<u64>,
    },

    /// Network or connection error.
    #[error("provider connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Provider answered with a status the adapter does not accept.
    #[error("provider rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// Response body could not be decoded.
    #[error("provider protocol error: {message}")]
    Protocol {
        /// Error message.
        message: String,
    },

    /// Adapter-side failure (client construction, serialization).
    #[error("provider internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl ProviderError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: None,
        }
    }

    /// Creates a timeout error with duration.
    #[must_use]
    pub fn timeout_with_duration(message: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: Some(timeout_ms),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a rejected-status error.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error is transient and may succeed next time.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connection { .. } => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::Protocol { .. } | Self::Internal { .. } => false,
        }
    }

    /// Returns true if the provider rejected the request as malformed.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Rejected { status, .. } if (400..500).contains(status) && *status != 429)
    }

    /// Returns the HTTP status code, if the provider answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
