//! # In-Memory Application Repository
//!
//! In-memory implementation of [`ApplicationRepository`] for tests and the
//! database-less serve mode.

use crate::domain::entities::Application;
use crate::domain::value_objects::ApplicationId;
use crate::infrastructure::persistence::in_memory::offer_repository::InMemoryOfferRepository;
use crate::infrastructure::persistence::traits::{
    ApplicationRepository, OfferFilter, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`ApplicationRepository`].
///
/// Offers are read from the [`InMemoryOfferRepository`] it was built with.
#[derive(Debug, Clone)]
pub struct InMemoryApplicationRepository {
    storage: Arc<RwLock<HashMap<ApplicationId, Application>>>,
    offers: InMemoryOfferRepository,
}

impl InMemoryApplicationRepository {
    /// Creates a repository that joins offers from `offers`.
    #[must_use]
    pub fn new(offers: InMemoryOfferRepository) -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            offers,
        }
    }

    /// Returns the number of stored applications.
    pub async fn len(&self) -> usize {
        self.storage.read().await.len()
    }

    /// Returns true if no applications are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn create(&self, application: &Application) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.contains_key(&application.id()) {
            return Err(RepositoryError::duplicate(
                "Application",
                application.id().to_string(),
            ));
        }
        storage.insert(application.id(), application.clone().with_offers(Vec::new()));
        Ok(())
    }

    async fn get_with_offers(
        &self,
        id: ApplicationId,
        filter: &OfferFilter,
    ) -> RepositoryResult<Application> {
        let application = self
            .storage
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("Application", id.to_string()))?;

        let offers = self.offers.for_application(id, filter).await;
        Ok(application.with_offers(offers))
    }
}
