//! # Task Supervisor
//!
//! Spawns detached provider tasks and reports how each one ended.
//!
//! Every task runs on its own tokio task, so it outlives the request that
//! started it. A watcher awaits the task's join handle, logs the outcome
//! and broadcasts a [`TaskReport`] that tests and operators can observe.
//! A panicking task is reported as [`TaskOutcome::Panicked`] and never
//! takes its siblings down.

use crate::application::error::ApplicationResult;
use crate::domain::value_objects::{ApplicationId, ProviderId};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, warn};

/// Default capacity of the report channel.
pub const DEFAULT_REPORT_CAPACITY: usize = 256;

/// Identifies one unit of fan-out work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaskLabel {
    /// Application being submitted.
    pub application_id: ApplicationId,
    /// Provider receiving it.
    pub provider_id: ProviderId,
}

impl TaskLabel {
    /// Creates a label.
    #[must_use]
    pub fn new(application_id: ApplicationId, provider_id: ProviderId) -> Self {
        Self {
            application_id,
            provider_id,
        }
    }
}

impl fmt::Display for TaskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.application_id, self.provider_id)
    }
}

/// How a supervised task ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Finished without error.
    Completed,
    /// Returned an error.
    Failed(String),
    /// Panicked or was aborted.
    Panicked(String),
}

impl TaskOutcome {
    /// Returns true for [`TaskOutcome::Completed`].
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Outcome of one supervised task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    /// Which task.
    pub label: TaskLabel,
    /// How it ended.
    pub outcome: TaskOutcome,
}

/// Spawns and watches detached tasks.
#[derive(Debug, Clone)]
pub struct TaskSupervisor {
    reports: broadcast::Sender<TaskReport>,
    in_flight: Arc<watch::Sender<usize>>,
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_CAPACITY)
    }
}

impl TaskSupervisor {
    /// Creates a supervisor whose report channel holds `capacity` reports.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (reports, _) = broadcast::channel(capacity.max(1));
        let (in_flight, _) = watch::channel(0);
        Self {
            reports,
            in_flight: Arc::new(in_flight),
        }
    }

    /// Subscribes to reports of tasks finishing after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TaskReport> {
        self.reports.subscribe()
    }

    /// Returns the number of tasks still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Spawns `task` detached from the caller.
    pub fn spawn<F>(&self, label: TaskLabel, task: F)
    where
        F: Future<Output = ApplicationResult<()>> + Send + 'static,
    {
        self.in_flight.send_modify(|n| *n += 1);
        let worker = tokio::spawn(task);
        let reports = self.reports.clone();
        let in_flight = Arc::clone(&self.in_flight);

        tokio::spawn(async move {
            let outcome = match worker.await {
                Ok(Ok(())) => {
                    debug!(application_id = %label.application_id, provider = %label.provider_id, "provider task completed");
                    TaskOutcome::Completed
                }
                Ok(Err(e)) => {
                    warn!(application_id = %label.application_id, provider = %label.provider_id, error = %e, "provider task failed");
                    TaskOutcome::Failed(e.to_string())
                }
                Err(e) => {
                    error!(application_id = %label.application_id, provider = %label.provider_id, error = %e, "provider task panicked");
                    TaskOutcome::Panicked(e.to_string())
                }
            };

            // No receivers is fine.
            let _ = reports.send(TaskReport { label, outcome });
            in_flight.send_modify(|n| *n = n.saturating_sub(1));
        });
    }

    /// Waits until no task is running, up to `timeout`.
    ///
    /// Returns true if everything finished in time.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let mut rx = self.in_flight.subscribe();
        tokio::time::timeout(timeout, rx.wait_for(|n| *n == 0))
            .await
            .is_ok_and(|r| r.is_ok())
    }
}
