//! Shared fixtures for integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::panic)]

use async_trait::async_trait;
use financing_aggregator::application::services::{
    FanOutSubmitter, ReconciliationLoop, SubscriberNotifier, TaskSupervisor,
};
use financing_aggregator::domain::entities::{
    Applicant, Application, Offer, OfferTerms, ProviderOffer,
};
use financing_aggregator::domain::value_objects::{
    ApplicationId, MaritalStatus, OfferId, OfferStatus, ProviderId,
};
use financing_aggregator::infrastructure::persistence::in_memory::{
    InMemoryApplicationRepository, InMemoryOfferRepository,
};
use financing_aggregator::infrastructure::persistence::{
    ApplicationRepository, OfferFilter, OfferRepository, RepositoryError, RepositoryResult,
};
use financing_aggregator::infrastructure::providers::{
    ProviderAdapter, ProviderError, ProviderRegistry, ProviderResult,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// What a mock adapter does on the next call.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Return this status and terms.
    Offer { status: String, terms: OfferTerms },
    /// Fail with an HTTP status.
    Reject(u16),
    /// Panic inside the call.
    Panic,
    /// Never complete.
    Hang,
}

impl Reply {
    pub fn offer(status: &str, payments: u32, monthly: i64) -> Self {
        Self::Offer {
            status: status.to_string(),
            terms: terms(payments, monthly),
        }
    }
}

/// Scriptable provider.
#[derive(Debug)]
pub struct MockAdapter {
    id: ProviderId,
    timeout_ms: u64,
    delay: Duration,
    submit_reply: Mutex<Reply>,
    status_reply: Mutex<Reply>,
    pub submit_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
}

impl MockAdapter {
    pub fn new(id: &str, submit_reply: Reply) -> Self {
        Self {
            id: ProviderId::new(id),
            timeout_ms: 1_000,
            delay: Duration::ZERO,
            status_reply: Mutex::new(submit_reply.clone()),
            submit_reply: Mutex::new(submit_reply),
            submit_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_status_reply(&self, reply: Reply) {
        *self.status_reply.lock() = reply;
    }

    pub fn submits(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    async fn answer(&self, reply: Reply, external_id: String) -> ProviderResult<ProviderOffer> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match reply {
            Reply::Offer { status, terms } => Ok(ProviderOffer {
                provider_id: self.id.clone(),
                external_id,
                status: OfferStatus::from_provider(&status),
                terms,
            }),
            Reply::Reject(code) => Err(ProviderError::rejected(code, "scripted failure")),
            Reply::Panic => panic!("scripted panic in {}", self.id),
            Reply::Hang => {
                std::future::pending::<()>().await;
                Err(ProviderError::internal("unreachable"))
            }
        }
    }
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
    fn provider_id(&self) -> &ProviderId {
        &self.id
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    async fn submit(&self, application: &Application) -> ProviderResult<ProviderOffer> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.submit_reply.lock().clone();
        self.answer(reply, format!("{}-{}", self.id, application.id()))
            .await
    }

    async fn fetch_status(&self, external_id: &str) -> ProviderResult<ProviderOffer> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.status_reply.lock().clone();
        self.answer(reply, external_id.to_string()).await
    }
}

/// Application repository whose writes always fail.
#[derive(Debug, Default)]
pub struct FailingApplicationRepository;

#[async_trait]
impl ApplicationRepository for FailingApplicationRepository {
    async fn create(&self, _application: &Application) -> RepositoryResult<()> {
        Err(RepositoryError::connection("database unavailable"))
    }

    async fn get_with_offers(
        &self,
        id: ApplicationId,
        _filter: &OfferFilter,
    ) -> RepositoryResult<Application> {
        Err(RepositoryError::not_found("Application", id.to_string()))
    }
}

/// In-memory offer store whose writes can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyOfferRepository {
    inner: InMemoryOfferRepository,
    fail_create: AtomicBool,
    fail_update: AtomicBool,
}

impl FlakyOfferRepository {
    pub fn new(inner: InMemoryOfferRepository) -> Self {
        Self {
            inner,
            fail_create: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
        }
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl OfferRepository for FlakyOfferRepository {
    async fn create(&self, offer: &Offer) -> RepositoryResult<()> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RepositoryError::connection("offer store down"));
        }
        self.inner.create(offer).await
    }

    async fn list(&self, filter: &OfferFilter) -> RepositoryResult<Vec<Offer>> {
        self.inner.list(filter).await
    }

    async fn update(&self, id: OfferId, offer: &Offer) -> RepositoryResult<()> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(RepositoryError::connection("offer store down"));
        }
        self.inner.update(id, offer).await
    }
}

pub fn terms(payments: u32, monthly: i64) -> OfferTerms {
    OfferTerms {
        monthly_payment_amount: Decimal::from(monthly),
        total_repayment_amount: Decimal::from(monthly) * Decimal::from(payments),
        number_of_payments: payments,
        annual_percentage_rate: Decimal::new(125, 1),
        first_repayment_date: None,
    }
}

pub fn applicant() -> Applicant {
    Applicant {
        phone: "+37126000000".to_string(),
        email: "john@doe.lv".to_string(),
        monthly_income: Decimal::from(1000),
        monthly_expenses: Decimal::from(200),
        monthly_credit_liabilities: Decimal::ZERO,
        dependents: 0,
        marital_status: MaritalStatus::Single,
        agree_to_data_sharing: true,
        agree_to_be_scored: true,
    }
}

pub fn application() -> Application {
    Application::new(applicant(), Decimal::from(100)).unwrap()
}

/// Services wired over in-memory storage.
pub struct Harness {
    pub offers: InMemoryOfferRepository,
    pub offer_store: Arc<FlakyOfferRepository>,
    pub applications: Arc<InMemoryApplicationRepository>,
    pub supervisor: TaskSupervisor,
    pub notifier: Arc<SubscriberNotifier>,
    pub fan_out: FanOutSubmitter,
    pub reconciler: Arc<ReconciliationLoop>,
}

impl Harness {
    pub fn new(adapters: Vec<Arc<MockAdapter>>) -> Self {
        let registry = adapters
            .into_iter()
            .fold(ProviderRegistry::new(), |registry, adapter| {
                registry.with_adapter(adapter)
            });
        let registry = Arc::new(registry);

        let offers = InMemoryOfferRepository::new();
        let offer_store = Arc::new(FlakyOfferRepository::new(offers.clone()));
        let applications = Arc::new(InMemoryApplicationRepository::new(offers.clone()));
        let supervisor = TaskSupervisor::default();
        let notifier = Arc::new(SubscriberNotifier::default());

        let fan_out = FanOutSubmitter::new(
            Arc::clone(&registry),
            applications.clone(),
            offer_store.clone(),
            supervisor.clone(),
        );
        let reconciler = Arc::new(ReconciliationLoop::new(
            registry,
            offer_store.clone(),
            Arc::clone(&notifier),
        ));

        Self {
            offers,
            offer_store,
            applications,
            supervisor,
            notifier,
            fan_out,
            reconciler,
        }
    }

    /// Submits and waits for every provider task.
    pub async fn submit_and_settle(&self) -> Application {
        let application = self.fan_out.submit(application()).await.unwrap();
        assert!(self.supervisor.drain(Duration::from_secs(5)).await);
        application
    }
}
