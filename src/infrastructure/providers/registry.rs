//! # Provider Registry
//!
//! Maps provider identifiers to adapters. Built once at startup and only
//! read afterwards, so it is shared as a plain `Arc` without locking.

use crate::domain::value_objects::ProviderId;
use crate::infrastructure::providers::traits::ProviderAdapter;
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only lookup table of configured providers.
#[derive(Debug, Default, Clone)]
pub struct ProviderRegistry {
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an adapter, keyed by its own provider ID.
    ///
    /// A second adapter with the same ID replaces the first.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.provider_id().clone(), adapter);
        self
    }

    /// Returns every registered adapter, ordered by provider ID.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<dyn ProviderAdapter>> {
        let mut adapters: Vec<_> = self.adapters.values().cloned().collect();
        adapters.sort_by(|a, b| a.provider_id().cmp(b.provider_id()));
        adapters
    }

    /// Looks up the adapter for a provider.
    #[must_use]
    pub fn lookup(&self, provider_id: &ProviderId) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(provider_id).cloned()
    }

    /// Returns the registered provider IDs, sorted.
    #[must_use]
    pub fn provider_ids(&self) -> Vec<ProviderId> {
        let mut ids: Vec<_> = self.adapters.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns the number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns true if no adapters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl FromIterator<Arc<dyn ProviderAdapter>> for ProviderRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<dyn ProviderAdapter>>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |registry, adapter| registry.with_adapter(adapter))
    }
}
