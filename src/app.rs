//! # Process Wiring
//!
//! Builds the provider registry, repositories and services from
//! [`AppConfig`], serves HTTP and runs the shutdown sequence:
//!
//! 1. stop the reconciliation scheduler (the current offer finishes)
//! 2. shut the notifier down, closing every WebSocket
//! 3. let the HTTP server drain
//! 4. wait briefly for in-flight provider submissions

use crate::api::rest::{AppState, create_router};
use crate::application::scheduler::ReconciliationScheduler;
use crate::application::services::{
    ApplicationService, FanOutSubmitter, ReconciliationLoop, SubscriberNotifier, TaskSupervisor,
};
use crate::config::{AppConfig, ProvidersConfig};
use crate::infrastructure::persistence::in_memory::{
    InMemoryApplicationRepository, InMemoryOfferRepository,
};
use crate::infrastructure::persistence::postgres::{
    self, PostgresApplicationRepository, PostgresOfferRepository,
};
use crate::infrastructure::persistence::{ApplicationRepository, OfferRepository};
use crate::infrastructure::providers::{
    FastBankAdapter, ProviderRegistry, ProviderResult, SolidBankAdapter,
};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How long shutdown waits for in-flight provider submissions.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Storage backends behind the service.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Applications.
    pub applications: Arc<dyn ApplicationRepository>,
    /// Offers.
    pub offers: Arc<dyn OfferRepository>,
}

impl Repositories {
    /// In-process maps, lost on exit.
    #[must_use]
    pub fn in_memory() -> Self {
        let offers = InMemoryOfferRepository::new();
        Self {
            applications: Arc::new(InMemoryApplicationRepository::new(offers.clone())),
            offers: Arc::new(offers),
        }
    }

    /// PostgreSQL through a shared pool.
    ///
    /// # Errors
    ///
    /// Fails if the database is unreachable.
    pub async fn postgres(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = postgres::connect(&config.database.url(), config.database.max_connections)
            .await
            .context("failed to connect to database")?;
        Ok(Self {
            applications: Arc::new(PostgresApplicationRepository::new(pool.clone())),
            offers: Arc::new(PostgresOfferRepository::new(pool)),
        })
    }
}

/// Registers the configured provider adapters.
///
/// # Errors
///
/// Fails if an HTTP client cannot be built.
pub fn build_registry(config: &ProvidersConfig) -> ProviderResult<ProviderRegistry> {
    let registry = ProviderRegistry::new()
        .with_adapter(Arc::new(FastBankAdapter::new(
            config.fastbank_url.clone(),
            config.timeout_ms,
        )?))
        .with_adapter(Arc::new(SolidBankAdapter::new(
            config.solidbank_url.clone(),
            config.timeout_ms,
        )?));
    Ok(registry)
}

/// Wired services sharing one notifier and supervisor.
#[derive(Debug, Clone)]
pub struct Components {
    /// Facade used by the HTTP layer.
    pub service: Arc<ApplicationService>,
    /// Reconciliation loop driven by the scheduler.
    pub reconciler: Arc<ReconciliationLoop>,
    /// Notifier shared by the loop and WebSocket observers.
    pub notifier: Arc<SubscriberNotifier>,
    /// Supervisor of fan-out tasks.
    pub supervisor: TaskSupervisor,
}

impl Components {
    /// Wires the services.
    #[must_use]
    pub fn assemble(registry: Arc<ProviderRegistry>, repositories: Repositories) -> Self {
        let notifier = Arc::new(SubscriberNotifier::default());
        let supervisor = TaskSupervisor::default();

        let fan_out = FanOutSubmitter::new(
            Arc::clone(&registry),
            Arc::clone(&repositories.applications),
            Arc::clone(&repositories.offers),
            supervisor.clone(),
        );
        let reconciler = Arc::new(ReconciliationLoop::new(
            registry,
            Arc::clone(&repositories.offers),
            Arc::clone(&notifier),
        ));
        let service = Arc::new(ApplicationService::new(
            repositories.applications,
            fan_out,
            Arc::clone(&reconciler),
            Arc::clone(&notifier),
        ));

        Self {
            service,
            reconciler,
            notifier,
            supervisor,
        }
    }
}

/// Serves HTTP until SIGINT or SIGTERM.
///
/// # Errors
///
/// Fails if the registry cannot be built or the listener cannot bind.
pub async fn serve(config: AppConfig, repositories: Repositories) -> anyhow::Result<()> {
    let registry = Arc::new(build_registry(&config.providers).context("failed to build providers")?);
    info!(providers = ?registry.provider_ids(), "providers registered");

    let components = Components::assemble(registry, repositories);
    let scheduler = ReconciliationScheduler::start(
        Arc::clone(&components.reconciler),
        config.reconciliation.interval(),
    );

    let router = create_router(
        AppState::new(Arc::clone(&components.service)),
        config.auth.enabled,
    );
    if !config.auth.enabled {
        warn!("authentication disabled");
    }

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(env = ?config.env, %addr, "financing aggregator listening");

    let notifier = Arc::clone(&components.notifier);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("shutdown requested");
            scheduler.stop().await;
            notifier.shutdown();
        })
        .await
        .context("server error")?;

    if !components.supervisor.drain(DRAIN_TIMEOUT).await {
        warn!(
            in_flight = components.supervisor.in_flight(),
            "provider submissions still running at exit"
        );
    }
    info!("shutdown complete");
    Ok(())
}

/// Applies pending schema migrations.
///
/// # Errors
///
/// Fails if the database is unreachable or a migration fails.
pub async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = postgres::connect(&config.database.url(), config.database.max_connections)
        .await
        .context("failed to connect to database")?;
    postgres::migrate(&pool).await.context("migration failed")?;
    info!(database = %config.database.name, "migrations applied");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
