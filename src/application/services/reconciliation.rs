//! # Reconciliation Loop
//!
//! Re-polls providers for offers that are not final yet.
//!
//! One [`ReconciliationLoop::tick`] walks every non-final offer in order.
//! For each offer it resolves the adapter, fetches the provider's current
//! view, applies the status rules from [`Offer::reconcile`], persists the
//! result and notifies observers. Any failure only skips that offer for
//! this tick; the offer is tried again on the next one.
//!
//! Ticks are serialized, so a manual refresh never races a scheduled one.

use crate::application::error::ApplicationResult;
use crate::application::scheduler::ShutdownSignal;
use crate::application::services::notifier::{OfferUpdate, SubscriberNotifier};
use crate::domain::entities::{Offer, Reconciliation};
use crate::domain::value_objects::OfferStatus;
use crate::infrastructure::persistence::{OfferFilter, OfferRepository};
use crate::infrastructure::providers::{ProviderError, ProviderRegistry};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Summary of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Offers examined.
    pub scanned: usize,
    /// Offers whose new state was persisted.
    pub updated: usize,
    /// Updates published to observers.
    pub notified: usize,
    /// Offers whose provider reported the stored status.
    pub unchanged: usize,
    /// Offers skipped because of a failure.
    pub skipped: usize,
    /// True if shutdown stopped the tick before the last offer.
    pub interrupted: bool,
}

enum OfferOutcome {
    Unchanged,
    Updated { notified: bool },
    Skipped,
}

/// Polls providers and applies offer status transitions.
#[derive(Debug)]
pub struct ReconciliationLoop {
    registry: Arc<ProviderRegistry>,
    offers: Arc<dyn OfferRepository>,
    notifier: Arc<SubscriberNotifier>,
    running: Mutex<()>,
}

impl ReconciliationLoop {
    /// Creates a new loop.
    #[must_use]
    pub fn new(
        registry: Arc<ProviderRegistry>,
        offers: Arc<dyn OfferRepository>,
        notifier: Arc<SubscriberNotifier>,
    ) -> Self {
        Self {
            registry,
            offers,
            notifier,
            running: Mutex::new(()),
        }
    }

    /// Runs one reconciliation pass.
    ///
    /// `shutdown` is checked before each offer; once triggered the offers
    /// left are not touched.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Repository` only if the non-final offers
    /// cannot be listed. Per-offer failures are logged and counted.
    pub async fn tick(&self, shutdown: &ShutdownSignal) -> ApplicationResult<TickReport> {
        let _guard = self.running.lock().await;

        let pending = self.offers.list(&OfferFilter::NonFinal).await.map_err(|e| {
            error!(error = %e, "failed to list pending offers");
            e
        })?;

        let mut report = TickReport::default();
        debug!(pending = pending.len(), "reconciliation tick started");

        for offer in pending {
            if shutdown.is_triggered() {
                report.interrupted = true;
                info!(scanned = report.scanned, "reconciliation tick interrupted by shutdown");
                break;
            }

            report.scanned += 1;
            match self.reconcile_offer(&offer).await {
                OfferOutcome::Unchanged => report.unchanged += 1,
                OfferOutcome::Updated { notified } => {
                    report.updated += 1;
                    if notified {
                        report.notified += 1;
                    }
                }
                OfferOutcome::Skipped => report.skipped += 1,
            }
        }

        Ok(report)
    }

    async fn reconcile_offer(&self, offer: &Offer) -> OfferOutcome {
        let Some(adapter) = self.registry.lookup(offer.provider_id()) else {
            error!(
                offer_id = %offer.id(),
                provider = %offer.provider_id(),
                "offer belongs to unknown provider"
            );
            return OfferOutcome::Skipped;
        };

        let timeout_ms = adapter.timeout_ms();
        let fetched = match timeout(
            Duration::from_millis(timeout_ms),
            adapter.fetch_status(offer.external_id()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::timeout_with_duration(
                "status fetch timed out",
                timeout_ms,
            )),
        };

        let reported = match fetched {
            Ok(reported) => reported,
            Err(e) => {
                warn!(
                    offer_id = %offer.id(),
                    provider = %offer.provider_id(),
                    external_id = offer.external_id(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "failed to fetch offer status"
                );
                return OfferOutcome::Skipped;
            }
        };

        let next = match offer.reconcile(&reported) {
            Ok(Reconciliation::Unchanged) => return OfferOutcome::Unchanged,
            Ok(Reconciliation::Changed(next)) => next,
            Err(e) => {
                warn!(offer_id = %offer.id(), error = %e, "offer cannot change state");
                return OfferOutcome::Skipped;
            }
        };

        if let Err(e) = self.offers.update(offer.id(), &next).await {
            error!(
                offer_id = %offer.id(),
                provider = %offer.provider_id(),
                error = %e,
                "failed to update offer"
            );
            return OfferOutcome::Skipped;
        }

        info!(
            offer_id = %offer.id(),
            application_id = %offer.application_id(),
            provider = %offer.provider_id(),
            from = %offer.status(),
            to = %next.status(),
            "offer status changed"
        );

        if *next.status() == OfferStatus::Declined {
            return OfferOutcome::Updated { notified: false };
        }

        let delivery = self
            .notifier
            .publish(next.application_id(), &OfferUpdate::from(&next));
        debug!(
            application_id = %next.application_id(),
            delivered = delivery.delivered,
            failed = delivery.failed,
            "offer update published"
        );
        OfferOutcome::Updated { notified: true }
    }
}
