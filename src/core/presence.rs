//! Presence tracking
//!
//! Records when site users were last active. Entries that go quiet for longer
//! than the staleness threshold are removed by the janitor.

use crate::core::document_store::DocumentStore;
use crate::types::{LedgerError, PresenceEntry};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Reads and writes the `userPresence` section of the site document
#[derive(Clone)]
pub struct PresenceTracker {
    store: Arc<DocumentStore>,
}

impl PresenceTracker {
    /// Create a tracker sharing `store` with the ledger and session registry
    pub fn new(store: Arc<DocumentStore>) -> Self {
        PresenceTracker { store }
    }

    /// Mark `username` as seen at `now`
    pub fn record_activity(
        &self,
        username: &str,
        online: bool,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        if username.trim().is_empty() {
            return Err(LedgerError::MissingUserId);
        }

        self.store.with_lock(|locked| -> Result<(), LedgerError> {
            let mut document = locked.load_site()?;
            document.user_presence.insert(
                username.to_string(),
                PresenceEntry {
                    online,
                    last_active: now,
                },
            );

            if !locked.save_site(&document) {
                error!(username, "failed to persist presence");
                return Err(LedgerError::persistence("presence update"));
            }
            debug!(username, online, "presence recorded");
            Ok(())
        })
    }

    /// Current presence entries keyed by username
    pub fn snapshot(&self) -> BTreeMap<String, PresenceEntry> {
        self.store
            .with_lock(|locked| locked.load_site())
            .unwrap_or_default()
            .user_presence
    }

    /// Remove entries idle for longer than `threshold`
    ///
    /// Returns how many entries were removed. Nothing is written when no entry
    /// is stale.
    pub fn sweep_stale(&self, now: DateTime<Utc>, threshold: Duration) -> Result<usize, LedgerError> {
        self.store.with_lock(|locked| -> Result<usize, LedgerError> {
            let mut document = locked.load_site()?;
            let removed = remove_stale(&mut document.user_presence, now, threshold);

            if removed > 0 && !locked.save_site(&document) {
                error!(removed, "failed to persist presence sweep");
                return Err(LedgerError::persistence("presence sweep"));
            }
            Ok(removed)
        })
    }
}

/// Drop stale entries from `entries`, returning how many were removed
pub(crate) fn remove_stale(
    entries: &mut BTreeMap<String, PresenceEntry>,
    now: DateTime<Utc>,
    threshold: Duration,
) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_stale(now, threshold));
    before - entries.len()
}
