//! # Domain Errors
//!
//! Errors raised when an entity invariant would be violated.

use crate::domain::value_objects::{OfferStatus, ParseEnumError};
use thiserror::Error;

/// Error type for domain rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A field holds a value outside its allowed range.
    #[error("invalid {field}: {message}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// The offer is already in a terminal status.
    #[error("invalid offer transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OfferStatus,
        /// Requested status.
        to: OfferStatus,
    },

    /// An enum value could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseEnumError),
}

impl DomainError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }

    /// Creates an invalid transition error.
    #[must_use]
    pub fn invalid_transition(from: OfferStatus, to: OfferStatus) -> Self {
        Self::InvalidTransition { from, to }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
