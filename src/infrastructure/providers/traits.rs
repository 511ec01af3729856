//! # Provider Adapter Trait
//!
//! Port definition for financing provider integrations.
//!
//! This module defines the [`ProviderAdapter`] trait that every provider
//! integration implements. It gives the fan-out submitter and the
//! reconciliation loop one uniform contract regardless of each provider's
//! wire format or transport policy.
//!
//! # Examples
//!
//! ```ignore
//! use financing_aggregator::infrastructure::providers::traits::ProviderAdapter;
//!
//! struct MyBankAdapter { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl ProviderAdapter for MyBankAdapter {
//!     // ... implement required methods
//! }
//! ```

use crate::domain::entities::{Application, ProviderOffer};
use crate::domain::value_objects::ProviderId;
use crate::infrastructure::providers::error::ProviderResult;
use async_trait::async_trait;
use std::fmt;

/// Default timeout for provider calls in milliseconds.
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 5000;

/// Trait defining the interface for provider adapters.
///
/// # Contract
///
/// Each call performs exactly one outbound request, honors the adapter's
/// timeout and never retries. Failures are returned as `ProviderError`,
/// never as panics.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + fmt::Debug {
    /// Returns the stable provider identifier used as the registry key.
    fn provider_id(&self) -> &ProviderId;

    /// Returns the timeout in milliseconds for provider operations.
    fn timeout_ms(&self) -> u64 {
        DEFAULT_PROVIDER_TIMEOUT_MS
    }

    /// Submits an application to the provider.
    ///
    /// # Errors
    ///
    /// - `ProviderError::Timeout` - Request timed out
    /// - `ProviderError::Connection` - Provider unreachable
    /// - `ProviderError::Rejected` - Non-success status
    /// - `ProviderError::Protocol` - Malformed response body
    async fn submit(&self, application: &Application) -> ProviderResult<ProviderOffer>;

    /// Fetches the current state of a previously submitted application.
    ///
    /// Idempotent read.
    ///
    /// # Errors
    ///
    /// Same as [`ProviderAdapter::submit`].
    async fn fetch_status(&self, external_id: &str) -> ProviderResult<ProviderOffer>;
}
