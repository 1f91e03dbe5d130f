//! Background cleanup of presence entries and admin sessions
//!
//! The janitor wakes up on a fixed interval and, inside one critical section,
//! drops presence entries that have been idle longer than the staleness threshold
//! together with admin sessions past their expiry. The document is only written
//! back when something was removed.
//!
//! # Scheduling
//!
//! [`Janitor::run`] drives the sweep from a tokio interval. Each sweep does
//! blocking file IO under the store's mutex, so it is moved onto the blocking
//! pool. A failed sweep is logged and retried on the next tick.

use crate::core::document_store::DocumentStore;
use crate::core::presence::remove_stale;
use crate::core::sessions::remove_expired;
use crate::types::LedgerError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Janitor timing configuration
#[derive(Clone, Debug, PartialEq)]
pub struct JanitorConfig {
    /// Time between sweeps
    pub interval: Duration,
    /// Idle time after which a presence entry is removed
    pub presence_ttl: Duration,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
            presence_ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl JanitorConfig {
    /// Create a JanitorConfig with custom values
    ///
    /// Zero durations fall back to the defaults with a warning.
    pub fn new(interval: Duration, presence_ttl: Duration) -> Self {
        let default = Self::default();

        let interval = if interval.is_zero() {
            warn!(
                default = ?default.interval,
                "invalid janitor interval (0), using default"
            );
            default.interval
        } else {
            interval
        };

        let presence_ttl = if presence_ttl.is_zero() {
            warn!(
                default = ?default.presence_ttl,
                "invalid presence ttl (0), using default"
            );
            default.presence_ttl
        } else {
            presence_ttl
        };

        Self {
            interval,
            presence_ttl,
        }
    }
}

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub presence_removed: usize,
    pub sessions_removed: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.presence_removed == 0 && self.sessions_removed == 0
    }
}

/// Periodic sweeper over the site document
#[derive(Clone)]
pub struct Janitor {
    store: Arc<DocumentStore>,
    config: JanitorConfig,
}

impl Janitor {
    /// Create a janitor over `store`
    ///
    /// Zero durations in `config` are replaced by the defaults, as in
    /// [`JanitorConfig::new`].
    pub fn new(store: Arc<DocumentStore>, config: JanitorConfig) -> Self {
        let config = JanitorConfig::new(config.interval, config.presence_ttl);
        Janitor { store, config }
    }

    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }

    /// Remove stale presence entries and expired sessions as of `now`
    pub fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, LedgerError> {
        let threshold = chrono::Duration::from_std(self.config.presence_ttl)
            .unwrap_or_else(|_| chrono::Duration::MAX);

        self.store.with_lock(|locked| -> Result<SweepReport, LedgerError> {
            let mut document = locked.load_site()?;
            let report = SweepReport {
                presence_removed: remove_stale(&mut document.user_presence, now, threshold),
                sessions_removed: remove_expired(&mut document.admin_sessions, now),
            };

            if !report.is_empty() && !locked.save_site(&document) {
                error!(?report, "failed to persist janitor sweep");
                return Err(LedgerError::persistence("janitor sweep"));
            }
            Ok(report)
        })
    }

    /// Sweep on every interval tick until `cancel` fires
    ///
    /// The first sweep happens one full interval after start.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = time::interval_at(
            time::Instant::now() + self.config.interval,
            self.config.interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval = ?self.config.interval, "janitor started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let janitor = self.clone();
            match tokio::task::spawn_blocking(move || janitor.sweep(Utc::now())).await {
                Ok(Ok(report)) if report.is_empty() => debug!("janitor sweep found nothing to remove"),
                Ok(Ok(report)) => info!(
                    presence_removed = report.presence_removed,
                    sessions_removed = report.sessions_removed,
                    "janitor sweep completed"
                ),
                Ok(Err(e)) => error!(error = %e, "janitor sweep failed"),
                Err(e) => error!(error = %e, "janitor sweep task panicked"),
            }
        }

        info!("janitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::presence::PresenceTracker;
    use crate::core::sessions::SessionRegistry;
    use crate::io::MemoryBackend;
    use rstest::rstest;

    fn setup() -> (Janitor, PresenceTracker, SessionRegistry, MemoryBackend) {
        let backend = MemoryBackend::new();
        let store = Arc::new(DocumentStore::new(backend.clone()));
        let janitor = Janitor::new(Arc::clone(&store), JanitorConfig::default());
        let presence = PresenceTracker::new(Arc::clone(&store));
        let sessions = SessionRegistry::new(store, chrono::Duration::hours(2));
        (janitor, presence, sessions, backend)
    }

    #[rstest]
    #[case::all_defaults(0, 0, 300, 1800)]
    #[case::custom_interval(60, 0, 60, 1800)]
    #[case::custom_ttl(0, 600, 300, 600)]
    #[case::all_custom(10, 20, 10, 20)]
    fn test_config_zero_values_fallback(
        #[case] interval: u64,
        #[case] ttl: u64,
        #[case] expected_interval: u64,
        #[case] expected_ttl: u64,
    ) {
        let config = JanitorConfig::new(Duration::from_secs(interval), Duration::from_secs(ttl));

        assert_eq!(config.interval, Duration::from_secs(expected_interval));
        assert_eq!(config.presence_ttl, Duration::from_secs(expected_ttl));
    }

    #[test]
    fn test_janitor_replaces_zero_durations() {
        let store = Arc::new(DocumentStore::new(MemoryBackend::new()));
        let config = JanitorConfig {
            interval: Duration::ZERO,
            presence_ttl: Duration::ZERO,
        };

        let janitor = Janitor::new(store, config);

        assert_eq!(janitor.config(), &JanitorConfig::default());
    }

    #[tokio::test]
    async fn test_run_with_zero_interval_stops_on_cancel() {
        let store = Arc::new(DocumentStore::new(MemoryBackend::new()));
        let config = JanitorConfig {
            interval: Duration::ZERO,
            presence_ttl: Duration::from_secs(60),
        };
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Janitor::new(store, config).run(cancel.clone()));

        cancel.cancel();

        handle.await.unwrap();
    }

    #[test]
    fn test_sweep_removes_stale_presence_and_expired_sessions() {
        let (janitor, presence, sessions, _) = setup();
        let now = Utc::now();
        presence
            .record_activity("idle", true, now - chrono::Duration::minutes(31))
            .unwrap();
        presence
            .record_activity("active", true, now - chrono::Duration::minutes(29))
            .unwrap();
        let (expired, _) = sessions.open("old-admin", now - chrono::Duration::hours(3)).unwrap();
        let (live, _) = sessions.open("admin", now).unwrap();

        let report = janitor.sweep(now).unwrap();

        assert_eq!(
            report,
            SweepReport {
                presence_removed: 1,
                sessions_removed: 1
            }
        );
        let snapshot = presence.snapshot();
        assert!(snapshot.contains_key("active"));
        assert!(!snapshot.contains_key("idle"));
        assert!(sessions.validate(&live, now).is_ok());
        assert!(sessions.validate(&expired, now).is_err());
    }

    #[test]
    fn test_sweep_with_nothing_stale_does_not_write() {
        let (janitor, presence, _, backend) = setup();
        let now = Utc::now();
        presence.record_activity("active", true, now).unwrap();
        let writes = backend.write_count();

        let report = janitor.sweep(now).unwrap();

        assert!(report.is_empty());
        assert_eq!(backend.write_count(), writes);
    }

    #[test]
    fn test_sweep_persistence_failure_keeps_entries() {
        let (janitor, presence, _, backend) = setup();
        let now = Utc::now();
        presence
            .record_activity("idle", true, now - chrono::Duration::hours(1))
            .unwrap();
        backend.fail_writes(true);

        assert_eq!(
            janitor.sweep(now),
            Err(LedgerError::persistence("janitor sweep"))
        );
        backend.fail_writes(false);
        assert!(presence.snapshot().contains_key("idle"));
    }

    #[tokio::test]
    async fn test_run_sweeps_on_interval_and_stops_on_cancel() {
        let backend = MemoryBackend::new();
        let store = Arc::new(DocumentStore::new(backend));
        let config = JanitorConfig::new(Duration::from_millis(20), Duration::from_secs(30 * 60));
        let janitor = Janitor::new(Arc::clone(&store), config);
        let presence = PresenceTracker::new(store);
        presence
            .record_activity("idle", true, Utc::now() - chrono::Duration::hours(1))
            .unwrap();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(janitor.run(cancel.clone()));

        for _ in 0..100 {
            if presence.snapshot().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(presence.snapshot().is_empty());

        cancel.cancel();
        handle.await.unwrap();
    }
}
