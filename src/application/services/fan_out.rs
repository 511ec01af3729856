//! # Fan-Out Submitter
//!
//! Submits one application to every registered provider concurrently.
//!
//! The application is persisted first; if that fails nothing else happens
//! and the error is returned. Each provider then gets its own supervised
//! task which calls the adapter and, on success, persists a `DRAFT` offer.
//! The caller gets the application back immediately and never waits on a
//! provider.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::task_supervisor::{TaskLabel, TaskSupervisor};
use crate::domain::entities::{Application, Offer};
use crate::infrastructure::persistence::{ApplicationRepository, OfferRepository};
use crate::infrastructure::providers::{ProviderAdapter, ProviderError, ProviderRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};

/// Dispatches applications to all providers.
#[derive(Debug, Clone)]
pub struct FanOutSubmitter {
    registry: Arc<ProviderRegistry>,
    applications: Arc<dyn ApplicationRepository>,
    offers: Arc<dyn OfferRepository>,
    supervisor: TaskSupervisor,
}

impl FanOutSubmitter {
    /// Creates a new submitter.
    #[must_use]
    pub fn new(
        registry: Arc<ProviderRegistry>,
        applications: Arc<dyn ApplicationRepository>,
        offers: Arc<dyn OfferRepository>,
        supervisor: TaskSupervisor,
    ) -> Self {
        Self {
            registry,
            applications,
            offers,
            supervisor,
        }
    }

    /// Returns the supervisor running the provider tasks.
    #[must_use]
    pub fn supervisor(&self) -> &TaskSupervisor {
        &self.supervisor
    }

    /// Persists `application` and starts one provider task per adapter.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Repository` if the application cannot be
    /// persisted. Provider failures are never returned.
    pub async fn submit(&self, application: Application) -> ApplicationResult<Application> {
        if let Err(e) = self.applications.create(&application).await {
            error!(application_id = %application.id(), error = %e, "failed to create application");
            return Err(e.into());
        }

        let adapters = self.registry.all();
        info!(
            application_id = %application.id(),
            providers = adapters.len(),
            "application created, dispatching to providers"
        );

        for adapter in adapters {
            let label = TaskLabel::new(application.id(), adapter.provider_id().clone());
            let offers = Arc::clone(&self.offers);
            let application = application.clone();
            self.supervisor
                .spawn(label, submit_to_provider(adapter, offers, application));
        }

        Ok(application)
    }
}

async fn submit_to_provider(
    adapter: Arc<dyn ProviderAdapter>,
    offers: Arc<dyn OfferRepository>,
    application: Application,
) -> ApplicationResult<()> {
    let provider_id = adapter.provider_id().clone();
    let timeout_ms = adapter.timeout_ms();

    let mut reported = match timeout(
        Duration::from_millis(timeout_ms),
        adapter.submit(&application),
    )
    .await
    {
        Ok(Ok(reported)) => reported,
        Ok(Err(e)) => return Err(ApplicationError::provider(provider_id, e)),
        Err(_) => {
            return Err(ApplicationError::provider(
                provider_id,
                ProviderError::timeout_with_duration("submit timed out", timeout_ms),
            ));
        }
    };
    reported.provider_id = provider_id;

    let offer = Offer::draft(application.id(), reported);
    offers.create(&offer).await?;

    info!(
        application_id = %application.id(),
        provider = %offer.provider_id(),
        offer_id = %offer.id(),
        external_id = offer.external_id(),
        "draft offer stored"
    );
    Ok(())
}
