//! # Application Errors
//!
//! Error types for the application layer.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Validation(String)          - Input validation failures
//! ├── Domain(DomainError)         - Entity invariant violations
//! ├── Repository(RepositoryError) - Persistence dependency failures
//! ├── Provider { .. }             - Provider dependency failures
//! ├── NotFound { .. }             - Resource not found
//! ├── Integrity(String)           - Stored data references unknown things
//! └── Internal(String)            - Unexpected internal failure
//! ```
//!
//! # Examples
//!
//! ```
//! use financing_aggregator::application::error::ApplicationError;
//! use financing_aggregator::infrastructure::persistence::RepositoryError;
//!
//! let err = ApplicationError::validation("phone must start with +371");
//! assert!(err.is_validation());
//!
//! let err: ApplicationError = RepositoryError::not_found("Application", "42").into();
//! assert!(err.is_not_found());
//! ```

use crate::domain::errors::DomainError;
use crate::domain::value_objects::ProviderId;
use crate::infrastructure::persistence::RepositoryError;
use crate::infrastructure::providers::ProviderError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Domain error from entity rules.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Persistence failed.
    #[error("repository error: {0}")]
    Repository(RepositoryError),

    /// A provider call failed.
    #[error("provider {provider} error: {source}")]
    Provider {
        /// Provider that failed.
        provider: ProviderId,
        /// Underlying error.
        #[source]
        source: ProviderError,
    },

    /// Resource not found.
    #[error("not found: {resource_type} with id {id}")]
    NotFound {
        /// Type of resource.
        resource_type: String,
        /// Resource identifier.
        id: String,
    },

    /// Stored data references something the process does not know.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a provider error.
    #[must_use]
    pub fn provider(provider: ProviderId, source: ProviderError) -> Self {
        Self::Provider { provider, source }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Creates an integrity error.
    #[must_use]
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true for input validation failures, including domain
    /// value checks.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Domain(DomainError::InvalidValue { .. } | DomainError::Parse(_))
        )
    }

    /// Returns true for not found errors.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true when a persistence or provider dependency failed.
    #[must_use]
    pub fn is_dependency(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::Provider { .. })
    }

    /// Returns true for integrity errors.
    #[must_use]
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound { entity_type, id } => Self::not_found(entity_type, id),
            other => Self::Repository(other),
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
