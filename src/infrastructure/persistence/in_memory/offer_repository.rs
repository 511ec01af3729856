//! # In-Memory Offer Repository
//!
//! In-memory implementation of [`OfferRepository`].
//!
//! Enforces the one-offer-per-provider rule the database gets from its
//! unique index.

use crate::domain::entities::Offer;
use crate::domain::value_objects::{ApplicationId, OfferId};
use crate::infrastructure::persistence::traits::{
    OfferFilter, OfferRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`OfferRepository`].
///
/// Clones share storage, so the application repository can read the same
/// offers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOfferRepository {
    storage: Arc<RwLock<HashMap<OfferId, Offer>>>,
}

impl InMemoryOfferRepository {
    /// Creates a new empty in-memory offer repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored offers.
    pub async fn len(&self) -> usize {
        self.storage.read().await.len()
    }

    /// Returns true if no offers are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Gets an offer by ID.
    pub async fn get(&self, id: OfferId) -> Option<Offer> {
        self.storage.read().await.get(&id).cloned()
    }

    /// Returns the offers of one application passing `filter`, oldest first.
    pub async fn for_application(
        &self,
        application_id: ApplicationId,
        filter: &OfferFilter,
    ) -> Vec<Offer> {
        let storage = self.storage.read().await;
        let mut offers: Vec<Offer> = storage
            .values()
            .filter(|o| o.application_id() == application_id && filter.matches(o.status()))
            .cloned()
            .collect();
        sort_oldest_first(&mut offers);
        offers
    }
}

fn sort_oldest_first(offers: &mut [Offer]) {
    offers.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
}

#[async_trait]
impl OfferRepository for InMemoryOfferRepository {
    async fn create(&self, offer: &Offer) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;

        if storage.contains_key(&offer.id()) {
            return Err(RepositoryError::duplicate("Offer", offer.id().to_string()));
        }
        let taken = storage.values().any(|o| {
            o.application_id() == offer.application_id() && o.provider_id() == offer.provider_id()
        });
        if taken {
            return Err(RepositoryError::duplicate(
                "Offer",
                format!("{}/{}", offer.application_id(), offer.provider_id()),
            ));
        }

        storage.insert(offer.id(), offer.clone());
        Ok(())
    }

    async fn list(&self, filter: &OfferFilter) -> RepositoryResult<Vec<Offer>> {
        let storage = self.storage.read().await;
        let mut offers: Vec<Offer> = storage
            .values()
            .filter(|o| filter.matches(o.status()))
            .cloned()
            .collect();
        sort_oldest_first(&mut offers);
        Ok(offers)
    }

    async fn update(&self, id: OfferId, offer: &Offer) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        match storage.get_mut(&id) {
            Some(slot) => {
                *slot = offer.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found("Offer", id.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{OfferTerms, ProviderOffer, Reconciliation};
    use crate::domain::value_objects::{OfferStatus, ProviderId};

    fn draft(application_id: ApplicationId, provider: &str) -> Offer {
        Offer::draft(
            application_id,
            ProviderOffer {
                provider_id: ProviderId::new(provider),
                external_id: format!("{provider}-ext"),
                status: OfferStatus::Draft,
                terms: OfferTerms {
                    number_of_payments: 12,
                    ..OfferTerms::default()
                },
            },
        )
    }

    #[tokio::test]
    async fn create_and_list() {
        let repo = InMemoryOfferRepository::new();
        let app = ApplicationId::new_v4();
        repo.create(&draft(app, "fastbank")).await.unwrap();
        repo.create(&draft(app, "solidbank")).await.unwrap();

        assert_eq!(repo.len().await, 2);
        assert_eq!(repo.list(&OfferFilter::NonFinal).await.unwrap().len(), 2);
        assert!(
            repo.list(&OfferFilter::Status(OfferStatus::Processed))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn one_offer_per_provider() {
        let repo = InMemoryOfferRepository::new();
        let app = ApplicationId::new_v4();
        repo.create(&draft(app, "fastbank")).await.unwrap();

        let err = repo.create(&draft(app, "fastbank")).await.unwrap_err();
        assert!(err.is_duplicate());

        repo.create(&draft(ApplicationId::new_v4(), "fastbank"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_replaces_record() {
        let repo = InMemoryOfferRepository::new();
        let offer = draft(ApplicationId::new_v4(), "fastbank");
        repo.create(&offer).await.unwrap();

        let reported = ProviderOffer {
            provider_id: ProviderId::new("fastbank"),
            external_id: "fastbank-ext".to_string(),
            status: OfferStatus::Processed,
            terms: OfferTerms {
                number_of_payments: 6,
                ..OfferTerms::default()
            },
        };
        let Reconciliation::Changed(next) = offer.reconcile(&reported).unwrap() else {
            panic!("expected change");
        };
        repo.update(offer.id(), &next).await.unwrap();

        let stored = repo.get(offer.id()).await.unwrap();
        assert_eq!(stored.status(), &OfferStatus::Processed);
        assert!(repo.list(&OfferFilter::NonFinal).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_unknown_is_not_found() {
        let repo = InMemoryOfferRepository::new();
        let offer = draft(ApplicationId::new_v4(), "fastbank");
        let err = repo.update(offer.id(), &offer).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
