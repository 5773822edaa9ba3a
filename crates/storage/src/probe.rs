//! Startup probe of the relational backend.
//!
//! The prober makes one bounded attempt to reach the backend and records the
//! outcome in the shared [`StoreAvailability`]. Failures never abort startup;
//! they leave the process in in-memory mode.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::availability::{Availability, StoreAvailability};
use crate::repository::StorageError;

/// Default bound on a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Something that can tell whether a backend is ready to serve queries.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` describing why the backend is not usable.
    async fn check(&self) -> Result<(), StorageError>;
}

pub struct ConnectionProber {
    target: Arc<dyn HealthCheck>,
    timeout: Duration,
    availability: StoreAvailability,
}

impl ConnectionProber {
    #[must_use]
    pub fn new(
        target: Arc<dyn HealthCheck>,
        timeout: Duration,
        availability: StoreAvailability,
    ) -> Self {
        Self {
            target,
            timeout,
            availability,
        }
    }

    /// Attempt one bounded check and record the result.
    pub async fn probe(&self) -> Availability {
        let previous = self.availability.get();
        let outcome = match tokio::time::timeout(self.timeout, self.target.check()).await {
            Ok(Ok(())) => Availability::Available,
            Ok(Err(err)) => {
                if previous != Availability::Unavailable {
                    warn!(error = %err, "relational store unreachable");
                }
                Availability::Unavailable
            }
            Err(_) => {
                if previous != Availability::Unavailable {
                    warn!(
                        timeout_ms = self.timeout.as_millis() as u64,
                        "relational store probe timed out"
                    );
                }
                Availability::Unavailable
            }
        };
        self.availability.set(outcome);
        if outcome != previous {
            info!(mode = outcome.mode_label(), "storage mode selected");
        }
        outcome
    }

    /// Periodically re-probe while the backend is unavailable.
    ///
    /// Once a probe succeeds the dispatcher routes back to the relational
    /// store. Without this task the fallback is permanent for the process.
    #[must_use]
    pub fn spawn_reprobe(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !self.availability.is_available() {
                    self.probe().await;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Toggle(AtomicBool);

    #[async_trait]
    impl HealthCheck for Toggle {
        async fn check(&self) -> Result<(), StorageError> {
            if self.0.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(StorageError::Connection("refused".into()))
            }
        }
    }

    struct Hangs;

    #[async_trait]
    impl HealthCheck for Hangs {
        async fn check(&self) -> Result<(), StorageError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_probe_selects_in_memory_mode() {
        let availability = StoreAvailability::default();
        let prober = ConnectionProber::new(
            Arc::new(Toggle(AtomicBool::new(false))),
            DEFAULT_PROBE_TIMEOUT,
            availability.clone(),
        );
        assert_eq!(prober.probe().await, Availability::Unavailable);
        assert_eq!(availability.get().mode_label(), "in-memory");
    }

    #[tokio::test]
    async fn successful_probe_selects_database_mode() {
        let prober = ConnectionProber::new(
            Arc::new(Toggle(AtomicBool::new(true))),
            DEFAULT_PROBE_TIMEOUT,
            StoreAvailability::default(),
        );
        assert_eq!(prober.probe().await, Availability::Available);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_is_cut_off_by_timeout() {
        let prober = ConnectionProber::new(
            Arc::new(Hangs),
            Duration::from_secs(3),
            StoreAvailability::default(),
        );
        assert_eq!(prober.probe().await, Availability::Unavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn reprobe_recovers_once_backend_returns() {
        let target = Arc::new(Toggle(AtomicBool::new(false)));
        let availability = StoreAvailability::default();
        let prober = Arc::new(ConnectionProber::new(
            Arc::clone(&target) as Arc<dyn HealthCheck>,
            DEFAULT_PROBE_TIMEOUT,
            availability.clone(),
        ));
        prober.probe().await;
        assert_eq!(availability.get(), Availability::Unavailable);

        let handle = Arc::clone(&prober).spawn_reprobe(Duration::from_secs(30));
        target.0.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(availability.get(), Availability::Available);
        handle.abort();
    }
}
