//! # Repository Traits
//!
//! Port definitions for persistence abstraction.
//!
//! # Available Repositories
//!
//! - [`ApplicationRepository`]: applications and their offers
//! - [`OfferRepository`]: offers, scanned by reconciliation
//!
//! Both are safe for concurrent use: fan-out tasks create offers in
//! parallel while the reconciliation loop lists and updates them.
//!
//! # Examples
//!
//! ```ignore
//! use financing_aggregator::infrastructure::persistence::traits::{OfferFilter, OfferRepository};
//!
//! async fn pending(repo: &impl OfferRepository) {
//!     let offers = repo.list(&OfferFilter::NonFinal).await.unwrap();
//!     println!("{} offers awaiting a decision", offers.len());
//! }
//! ```

use crate::domain::entities::{Application, Offer};
use crate::domain::value_objects::{ApplicationId, OfferId, OfferStatus};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Entity not found.
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Duplicate entity.
    #[error("Duplicate entity: {entity_type} with id {id} already exists")]
    Duplicate {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query error.
    #[error("Query error: {0}")]
    Query(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a duplicate error.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Which offers a query returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OfferFilter {
    /// Every offer.
    #[default]
    All,
    /// Offers in exactly this status.
    Status(OfferStatus),
    /// Offers not yet `PROCESSED` or `DECLINED`.
    NonFinal,
}

impl OfferFilter {
    /// Returns true if an offer with this status passes the filter.
    #[must_use]
    pub fn matches(&self, status: &OfferStatus) -> bool {
        match self {
            Self::All => true,
            Self::Status(wanted) => wanted == status,
            Self::NonFinal => !status.is_terminal(),
        }
    }
}

impl From<OfferStatus> for OfferFilter {
    fn from(status: OfferStatus) -> Self {
        Self::Status(status)
    }
}

/// Repository for applications.
#[async_trait]
pub trait ApplicationRepository: Send + Sync + fmt::Debug {
    /// Persists a new application.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the ID is already stored.
    async fn create(&self, application: &Application) -> RepositoryResult<()>;

    /// Loads an application together with the offers passing `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no application has this ID.
    async fn get_with_offers(
        &self,
        id: ApplicationId,
        filter: &OfferFilter,
    ) -> RepositoryResult<Application>;
}

/// Repository for offers.
#[async_trait]
pub trait OfferRepository: Send + Sync + fmt::Debug {
    /// Persists a new offer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the application already has
    /// an offer from the same provider.
    async fn create(&self, offer: &Offer) -> RepositoryResult<()>;

    /// Lists offers passing `filter`, oldest first.
    async fn list(&self, filter: &OfferFilter) -> RepositoryResult<Vec<Offer>>;

    /// Replaces the stored offer with this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no offer has this ID.
    async fn update(&self, id: OfferId, offer: &Offer) -> RepositoryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches() {
        assert!(OfferFilter::All.matches(&OfferStatus::Declined));
        assert!(OfferFilter::NonFinal.matches(&OfferStatus::Draft));
        assert!(OfferFilter::NonFinal.matches(&OfferStatus::Other("QUEUED".into())));
        assert!(!OfferFilter::NonFinal.matches(&OfferStatus::Processed));
        assert!(OfferFilter::from(OfferStatus::Processed).matches(&OfferStatus::Processed));
        assert!(!OfferFilter::Status(OfferStatus::Processed).matches(&OfferStatus::Draft));
    }

    #[test]
    fn error_predicates() {
        assert!(RepositoryError::not_found("Offer", "1").is_not_found());
        assert!(RepositoryError::duplicate("Offer", "1").is_duplicate());
        assert!(!RepositoryError::query("boom").is_not_found());
    }
}
