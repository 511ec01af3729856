//! # Application Service
//!
//! Entry point used by the transport layer. Wraps the fan-out submitter,
//! the reconciliation loop and the notifier behind the three operations a
//! client can ask for.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::scheduler::ShutdownSignal;
use crate::application::services::fan_out::FanOutSubmitter;
use crate::application::services::notifier::SubscriberNotifier;
use crate::application::services::reconciliation::{ReconciliationLoop, TickReport};
use crate::domain::entities::{Applicant, Application};
use crate::domain::value_objects::{ApplicationId, OfferStatus};
use crate::infrastructure::persistence::{ApplicationRepository, OfferFilter};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Facade over the aggregation core.
#[derive(Debug, Clone)]
pub struct ApplicationService {
    applications: Arc<dyn ApplicationRepository>,
    fan_out: FanOutSubmitter,
    reconciler: Arc<ReconciliationLoop>,
    notifier: Arc<SubscriberNotifier>,
}

impl ApplicationService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        fan_out: FanOutSubmitter,
        reconciler: Arc<ReconciliationLoop>,
        notifier: Arc<SubscriberNotifier>,
    ) -> Self {
        Self {
            applications,
            fan_out,
            reconciler,
            notifier,
        }
    }

    /// Creates an application and dispatches it to every provider.
    ///
    /// Returns as soon as the application is stored.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::Domain` if a money field is negative
    /// - `ApplicationError::Repository` if the application cannot be stored
    pub async fn submit_application(
        &self,
        applicant: Applicant,
        amount: Decimal,
    ) -> ApplicationResult<Application> {
        let application = Application::new(applicant, amount)?;
        self.fan_out.submit(application).await
    }

    /// Loads an application with its `PROCESSED` offers.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` for an unknown ID.
    pub async fn get_application(&self, id: ApplicationId) -> ApplicationResult<Application> {
        debug!(application_id = %id, "loading application");
        self.applications
            .get_with_offers(id, &OfferFilter::Status(OfferStatus::Processed))
            .await
            .map_err(ApplicationError::from)
    }

    /// Runs one reconciliation tick outside the schedule.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Repository` if pending offers cannot be
    /// listed.
    pub async fn update_application_statuses(&self) -> ApplicationResult<TickReport> {
        self.reconciler.tick(&ShutdownSignal::never()).await
    }

    /// Returns the notifier observers subscribe to.
    #[must_use]
    pub fn notifier(&self) -> &Arc<SubscriberNotifier> {
        &self.notifier
    }

    /// Returns the reconciliation loop.
    #[must_use]
    pub fn reconciler(&self) -> &Arc<ReconciliationLoop> {
        &self.reconciler
    }

    /// Returns the fan-out submitter.
    #[must_use]
    pub fn fan_out(&self) -> &FanOutSubmitter {
        &self.fan_out
    }
}
