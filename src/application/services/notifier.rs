//! # Subscriber Notifier
//!
//! Pushes offer updates to live observers keyed by application.
//!
//! Each observer owns a bounded channel. Publishing never blocks: a full or
//! closed channel counts as a failed delivery, is logged and the observer
//! stays registered. Delivery is at most once and best effort.
//!
//! The observer map sits behind a reader/writer lock. Publishes take the
//! shared side; subscribe, unsubscribe and shutdown take the exclusive side.
//! Nothing awaits while the lock is held.

use crate::domain::entities::{Offer, OfferTerms};
use crate::domain::value_objects::{ApplicationId, OfferId, OfferStatus, ProviderId};
use chrono::NaiveDate;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default per-observer queue length.
pub const DEFAULT_OBSERVER_CAPACITY: usize = 32;

/// Identifies one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// New terms of an offer, as pushed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferUpdate {
    /// Owning application.
    pub application_id: ApplicationId,
    /// Updated offer.
    pub offer_id: OfferId,
    /// Provider that made the offer.
    pub provider: ProviderId,
    /// New status.
    pub status: OfferStatus,
    /// Monthly installment.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_payment_amount: Decimal,
    /// Total repayment.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_repayment_amount: Decimal,
    /// Installment count.
    pub number_of_payments: u32,
    /// Annual percentage rate.
    #[serde(with = "rust_decimal::serde::float")]
    pub annual_percentage_rate: Decimal,
    /// First repayment date.
    pub first_repayment_date: Option<NaiveDate>,
}

impl From<&Offer> for OfferUpdate {
    fn from(offer: &Offer) -> Self {
        let OfferTerms {
            monthly_payment_amount,
            total_repayment_amount,
            number_of_payments,
            annual_percentage_rate,
            first_repayment_date,
        } = offer.terms().clone();

        Self {
            application_id: offer.application_id(),
            offer_id: offer.id(),
            provider: offer.provider_id().clone(),
            status: offer.status().clone(),
            monthly_payment_amount,
            total_repayment_amount,
            number_of_payments,
            annual_percentage_rate,
            first_repayment_date,
        }
    }
}

/// Receiving end of one subscription.
///
/// `recv` returns `None` once the observer is unsubscribed or the notifier
/// shuts down.
#[derive(Debug)]
pub struct ObserverHandle {
    id: SubscriberId,
    application_id: ApplicationId,
    receiver: mpsc::Receiver<OfferUpdate>,
}

impl ObserverHandle {
    /// Returns the subscription ID.
    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Returns the observed application.
    #[must_use]
    pub fn application_id(&self) -> ApplicationId {
        self.application_id
    }

    /// Waits for the next update.
    pub async fn recv(&mut self) -> Option<OfferUpdate> {
        self.receiver.recv().await
    }

    /// Returns a queued update without waiting.
    pub fn try_recv(&mut self) -> Option<OfferUpdate> {
        self.receiver.try_recv().ok()
    }
}

/// Result of one publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Observers the update was queued for.
    pub delivered: usize,
    /// Observers whose queue was full or closed.
    pub failed: usize,
}

#[derive(Debug)]
struct Observer {
    id: SubscriberId,
    sender: mpsc::Sender<OfferUpdate>,
}

/// Fan-in point for reconciliation outcomes, fan-out point for observers.
#[derive(Debug)]
pub struct SubscriberNotifier {
    observers: RwLock<HashMap<ApplicationId, Vec<Observer>>>,
    next_id: AtomicU64,
    capacity: usize,
    closed: AtomicBool,
}

impl Default for SubscriberNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_OBSERVER_CAPACITY)
    }
}

impl SubscriberNotifier {
    /// Creates a notifier with `capacity` queued updates per observer.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            observers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
            closed: AtomicBool::new(false),
        }
    }

    /// Registers a new observer for `application_id`.
    ///
    /// After shutdown the returned handle is already closed.
    #[must_use]
    pub fn subscribe(&self, application_id: ApplicationId) -> ObserverHandle {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel(self.capacity);

        {
            let mut observers = self.observers.write();
            if self.closed.load(Ordering::Acquire) {
                drop(sender);
            } else {
                observers
                    .entry(application_id)
                    .or_default()
                    .push(Observer { id, sender });
            }
        }

        debug!(application_id = %application_id, subscriber = %id, "observer subscribed");
        ObserverHandle {
            id,
            application_id,
            receiver,
        }
    }

    /// Removes exactly one observer. Returns false if it was not registered.
    pub fn unsubscribe(&self, application_id: ApplicationId, id: SubscriberId) -> bool {
        let mut observers = self.observers.write();
        let Some(list) = observers.get_mut(&application_id) else {
            return false;
        };

        let before = list.len();
        list.retain(|o| o.id != id);
        let removed = list.len() < before;
        if list.is_empty() {
            observers.remove(&application_id);
        }

        if removed {
            debug!(application_id = %application_id, subscriber = %id, "observer unsubscribed");
        }
        removed
    }

    /// Queues `update` for every observer of `application_id`.
    pub fn publish(&self, application_id: ApplicationId, update: &OfferUpdate) -> PublishReport {
        let observers = self.observers.read();
        let mut report = PublishReport::default();

        let Some(list) = observers.get(&application_id) else {
            return report;
        };

        for observer in list {
            match observer.sender.try_send(update.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        application_id = %application_id,
                        subscriber = %observer.id,
                        error = %e,
                        "failed to deliver offer update"
                    );
                }
            }
        }
        report
    }

    /// Closes every observer and rejects new ones.
    pub fn shutdown(&self) {
        let mut observers = self.observers.write();
        self.closed.store(true, Ordering::Release);
        let count: usize = observers.values().map(Vec::len).sum();
        observers.clear();
        info!(observers = count, "notifier shut down");
    }

    /// Returns true once [`SubscriberNotifier::shutdown`] ran.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns the number of observers of one application.
    #[must_use]
    pub fn subscriber_count(&self, application_id: ApplicationId) -> usize {
        self.observers
            .read()
            .get(&application_id)
            .map_or(0, Vec::len)
    }

    /// Returns the number of applications with at least one observer.
    #[must_use]
    pub fn application_count(&self) -> usize {
        self.observers.read().len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::ProviderOffer;

    fn update(application_id: ApplicationId) -> OfferUpdate {
        let offer = Offer::draft(
            application_id,
            ProviderOffer {
                provider_id: ProviderId::new("fastbank"),
                external_id: "f-1".to_string(),
                status: OfferStatus::Draft,
                terms: OfferTerms {
                    monthly_payment_amount: Decimal::new(1050, 2),
                    number_of_payments: 12,
                    ..OfferTerms::default()
                },
            },
        );
        OfferUpdate::from(&offer)
    }

    #[tokio::test]
    async fn publish_reaches_only_matching_observers() {
        let notifier = SubscriberNotifier::default();
        let app = ApplicationId::new_v4();
        let other = ApplicationId::new_v4();
        let mut first = notifier.subscribe(app);
        let mut second = notifier.subscribe(app);
        let mut unrelated = notifier.subscribe(other);

        let report = notifier.publish(app, &update(app));
        assert_eq!(report.delivered, 2);

        assert_eq!(first.recv().await.unwrap().application_id, app);
        assert_eq!(second.recv().await.unwrap().number_of_payments, 12);
        assert!(unrelated.try_recv().is_none());
    }

    #[test]
    fn publish_without_observers_is_noop() {
        let notifier = SubscriberNotifier::default();
        let app = ApplicationId::new_v4();
        assert_eq!(notifier.publish(app, &update(app)), PublishReport::default());
    }

    #[test]
    fn unsubscribe_removes_one_and_prunes_empty_sets() {
        let notifier = SubscriberNotifier::default();
        let app = ApplicationId::new_v4();
        let a = notifier.subscribe(app);
        let b = notifier.subscribe(app);
        assert_eq!(notifier.subscriber_count(app), 2);

        assert!(notifier.unsubscribe(app, a.id()));
        assert_eq!(notifier.subscriber_count(app), 1);
        assert!(!notifier.unsubscribe(app, a.id()));

        assert!(notifier.unsubscribe(app, b.id()));
        assert_eq!(notifier.application_count(), 0);
    }

    #[test]
    fn full_queue_fails_without_unregistering() {
        let notifier = SubscriberNotifier::new(1);
        let app = ApplicationId::new_v4();
        let _slow = notifier.subscribe(app);
        let mut fast = notifier.subscribe(app);

        assert_eq!(notifier.publish(app, &update(app)).delivered, 2);
        assert!(fast.try_recv().is_some());

        let report = notifier.publish(app, &update(app));
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(notifier.subscriber_count(app), 2);
    }

    #[test]
    fn dropped_handle_counts_as_failure() {
        let notifier = SubscriberNotifier::default();
        let app = ApplicationId::new_v4();
        drop(notifier.subscribe(app));
        let mut alive = notifier.subscribe(app);

        let report = notifier.publish(app, &update(app));
        assert_eq!(report, PublishReport { delivered: 1, failed: 1 });
        assert!(alive.try_recv().is_some());
    }

    #[tokio::test]
    async fn shutdown_closes_handles() {
        let notifier = SubscriberNotifier::default();
        let app = ApplicationId::new_v4();
        let mut handle = notifier.subscribe(app);

        notifier.shutdown();
        assert!(notifier.is_shut_down());
        assert!(handle.recv().await.is_none());
        assert_eq!(notifier.application_count(), 0);

        let mut late = notifier.subscribe(app);
        assert!(late.recv().await.is_none());
        assert_eq!(notifier.subscriber_count(app), 0);
    }

    #[test]
    fn update_serializes_camel_case() {
        let app = ApplicationId::new_v4();
        let json = serde_json::to_value(update(app)).unwrap();
        assert_eq!(json["monthlyPaymentAmount"], serde_json::json!(10.5));
        assert_eq!(json["numberOfPayments"], serde_json::json!(12));
        assert_eq!(json["provider"], serde_json::json!("fastbank"));
        assert_eq!(json["status"], serde_json::json!("DRAFT"));
    }
}
