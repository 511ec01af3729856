//! # Reconciliation Scheduler
//!
//! Runs [`ReconciliationLoop::tick`] at a fixed interval until stopped.
//!
//! Shutdown is a `watch` channel: [`ShutdownTrigger`] flips it once and
//! every [`ShutdownSignal`] clone sees the change. The running tick checks
//! the signal between offers, so stopping lets the current offer finish
//! and skips the rest.

use crate::application::services::reconciliation::ReconciliationLoop;
use std::future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Sending half of a shutdown channel.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

/// Receiving half of a shutdown channel.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

/// Creates a connected trigger and signal.
#[must_use]
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownSignal { rx })
}

impl ShutdownTrigger {
    /// Signals shutdown. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Returns a new signal connected to this trigger.
    #[must_use]
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl ShutdownSignal {
    /// A signal that never fires.
    #[must_use]
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// Returns true once shutdown was triggered.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes when shutdown is triggered. Pends forever if the trigger
    /// was dropped without firing.
    pub async fn triggered(&mut self) {
        if self.rx.wait_for(|fired| *fired).await.is_err() {
            future::pending::<()>().await;
        }
    }
}

/// Background task driving periodic reconciliation.
#[derive(Debug)]
pub struct ReconciliationScheduler {
    trigger: ShutdownTrigger,
    handle: Option<JoinHandle<()>>,
}

impl ReconciliationScheduler {
    /// Starts ticking every `interval`.
    ///
    /// With no interval (or a zero one) the scheduler is disabled: a
    /// warning is logged and no task is spawned.
    #[must_use]
    pub fn start(reconciler: Arc<ReconciliationLoop>, interval: Option<Duration>) -> Self {
        let (trigger, signal) = shutdown_channel();

        let Some(period) = interval.filter(|d| !d.is_zero()) else {
            warn!("reconciliation disabled: no interval configured");
            return Self {
                trigger,
                handle: None,
            };
        };

        info!(interval_secs = period.as_secs_f64(), "reconciliation scheduler started");
        let handle = tokio::spawn(run(reconciler, period, signal));
        Self {
            trigger,
            handle: Some(handle),
        }
    }

    /// Returns true if a background task is running.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.handle.is_some()
    }

    /// Stops the scheduler and waits for the running tick to wind down.
    pub async fn stop(mut self) {
        self.trigger.trigger();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!(error = %e, "reconciliation scheduler task failed");
            }
        }
        info!("reconciliation scheduler stopped");
    }
}

async fn run(reconciler: Arc<ReconciliationLoop>, period: Duration, mut signal: ShutdownSignal) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    ticker.tick().await;
    let tick_signal = signal.clone();

    loop {
        tokio::select! {
            () = signal.triggered() => break,
            _ = ticker.tick() => {
                match reconciler.tick(&tick_signal).await {
                    Ok(report) => info!(
                        scanned = report.scanned,
                        updated = report.updated,
                        notified = report.notified,
                        unchanged = report.unchanged,
                        skipped = report.skipped,
                        "reconciliation tick finished"
                    ),
                    Err(e) => error!(error = %e, "reconciliation tick failed"),
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn trigger_reaches_every_signal() {
        let (trigger, signal) = shutdown_channel();
        let other = trigger.signal();
        assert!(!signal.is_triggered());

        trigger.trigger();
        assert!(signal.is_triggered());
        assert!(other.is_triggered());
        assert!(signal.clone().is_triggered());
    }

    #[test]
    fn never_stays_untriggered() {
        assert!(!ShutdownSignal::never().is_triggered());
    }

    #[tokio::test]
    async fn triggered_resolves_after_trigger() {
        let (trigger, mut signal) = shutdown_channel();
        let waiter = tokio::spawn(async move { signal.triggered().await });
        trigger.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn never_does_not_resolve() {
        let mut signal = ShutdownSignal::never();
        let waited = tokio::time::timeout(Duration::from_millis(20), signal.triggered()).await;
        assert!(waited.is_err());
    }
}
