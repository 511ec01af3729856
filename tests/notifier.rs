#![allow(clippy::unwrap_used, clippy::panic)]

mod common;

use common::{Harness, MockAdapter, Reply};
use financing_aggregator::application::scheduler::ShutdownSignal;
use financing_aggregator::application::services::{OfferUpdate, SubscriberNotifier};
use financing_aggregator::domain::entities::{Offer, ProviderOffer};
use financing_aggregator::domain::value_objects::{ApplicationId, OfferStatus, ProviderId};
use std::sync::Arc;

fn update_for(application_id: ApplicationId) -> OfferUpdate {
    let offer = Offer::draft(
        application_id,
        ProviderOffer {
            provider_id: ProviderId::new("fastbank"),
            external_id: "f-1".to_string(),
            status: OfferStatus::Draft,
            terms: common::terms(3, 50),
        },
    );
    OfferUpdate::from(&offer)
}

#[tokio::test]
async fn observers_of_other_applications_see_nothing() {
    let notifier = SubscriberNotifier::default();
    let a = ApplicationId::new_v4();
    let b = ApplicationId::new_v4();
    let mut first = notifier.subscribe(a);
    let mut second = notifier.subscribe(a);

    let report = notifier.publish(a, &update_for(a));
    assert_eq!(report.delivered, 2);
    assert_eq!(notifier.publish(b, &update_for(b)).delivered, 0);
    assert!(first.try_recv().is_some());
    assert!(second.try_recv().is_some());

    assert!(notifier.unsubscribe(a, first.id()));
    assert!(notifier.unsubscribe(a, second.id()));

    let report = notifier.publish(a, &update_for(a));
    assert_eq!(report.delivered + report.failed, 0);
}

#[tokio::test]
async fn reconciliation_reaches_every_observer_of_the_application() {
    let fastbank = Arc::new(MockAdapter::new("fastbank", Reply::offer("DRAFT", 3, 50)));
    let harness = Harness::new(vec![fastbank.clone()]);
    let application = harness.submit_and_settle().await;

    let mut first = harness.notifier.subscribe(application.id());
    let mut second = harness.notifier.subscribe(application.id());

    fastbank.set_status_reply(Reply::offer("PROCESSED", 3, 50));
    harness.reconciler.tick(&ShutdownSignal::never()).await.unwrap();

    let a = first.recv().await.unwrap();
    let b = second.recv().await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a.application_id, application.id());
    assert_eq!(a.provider.as_str(), "fastbank");
}

#[tokio::test]
async fn concurrent_subscribe_and_publish() {
    let notifier = Arc::new(SubscriberNotifier::new(256));
    let app = ApplicationId::new_v4();

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let notifier = Arc::clone(&notifier);
        tasks.push(tokio::spawn(async move {
            let handle = notifier.subscribe(app);
            for _ in 0..10 {
                notifier.publish(app, &update_for(app));
                tokio::task::yield_now().await;
            }
            assert!(notifier.unsubscribe(app, handle.id()));
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(notifier.subscriber_count(app), 0);
    assert_eq!(notifier.application_count(), 0);
}

#[tokio::test]
async fn shutdown_ends_every_stream() {
    let notifier = SubscriberNotifier::default();
    let mut handles: Vec<_> = (0..3)
        .map(|_| notifier.subscribe(ApplicationId::new_v4()))
        .collect();

    notifier.shutdown();

    for handle in &mut handles {
        assert!(handle.recv().await.is_none());
    }
    let app = ApplicationId::new_v4();
    assert_eq!(notifier.publish(app, &update_for(app)).delivered, 0);
}
