//! Admin session registry
//!
//! Sessions are opened by the admin login flow and identified by a random
//! 32-character alphanumeric token. A session is valid until its absolute expiry
//! instant; an expired session is deleted the first time it is presented, or by
//! the janitor, whichever comes first.

use crate::core::document_store::DocumentStore;
use crate::types::{AdminSession, LedgerError};
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

/// Length of generated session tokens
pub const TOKEN_LENGTH: usize = 32;

/// Default session lifetime
pub fn default_session_ttl() -> Duration {
    Duration::hours(2)
}

const SESSION: &str = "Admin session";

/// Admin sessions kept in the `adminSessions` section of the site document
#[derive(Clone)]
pub struct SessionRegistry {
    store: Arc<DocumentStore>,
    ttl: Duration,
}

impl SessionRegistry {
    /// Create a registry whose new sessions live for `ttl`
    pub fn new(store: Arc<DocumentStore>, ttl: Duration) -> Self {
        SessionRegistry { store, ttl }
    }

    /// Open a new session for `username`, returning its token
    pub fn open(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<(String, AdminSession), LedgerError> {
        if username.trim().is_empty() {
            return Err(LedgerError::MissingUserId);
        }
        let token = generate_token();
        let session = AdminSession::start(username, now, self.ttl);

        self.store.with_lock(|locked| -> Result<(String, AdminSession), LedgerError> {
            let mut document = locked.load_site()?;
            document
                .admin_sessions
                .insert(token.clone(), session.clone());

            if !locked.save_site(&document) {
                error!(username, "failed to persist admin session");
                return Err(LedgerError::persistence("session creation"));
            }
            info!(username, expires_at = %session.expires_at, "admin session opened");
            Ok((token, session))
        })
    }

    /// Check `token` and refresh its last activity
    ///
    /// # Errors
    ///
    /// - `NotFound` if no session has this token
    /// - `Expired` if the session is past its expiry; it is deleted
    /// - `Persistence` if the refreshed or pruned document could not be saved
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AdminSession, LedgerError> {
        self.store.with_lock(|locked| -> Result<AdminSession, LedgerError> {
            let mut document = locked.load_site()?;
            let Some(session) = document.admin_sessions.get_mut(token) else {
                return Err(LedgerError::not_found(SESSION));
            };

            if session.is_expired(now) {
                let username = session.username.clone();
                document.admin_sessions.remove(token);
                if !locked.save_site(&document) {
                    error!(%username, "failed to remove expired admin session");
                    return Err(LedgerError::persistence("session expiry"));
                }
                info!(%username, "admin session expired");
                return Err(LedgerError::expired(SESSION));
            }

            session.last_active = now;
            let session = session.clone();
            if !locked.save_site(&document) {
                error!(username = %session.username, "failed to refresh admin session");
                return Err(LedgerError::persistence("session refresh"));
            }
            Ok(session)
        })
    }

    /// End the session identified by `token`
    pub fn logout(&self, token: &str) -> Result<(), LedgerError> {
        self.store.with_lock(|locked| -> Result<(), LedgerError> {
            let mut document = locked.load_site()?;
            let Some(session) = document.admin_sessions.remove(token) else {
                return Err(LedgerError::not_found(SESSION));
            };

            if !locked.save_site(&document) {
                error!(username = %session.username, "failed to persist admin logout");
                return Err(LedgerError::persistence("session logout"));
            }
            info!(username = %session.username, "admin logged out");
            Ok(())
        })
    }

    /// Delete every session past its expiry instant
    ///
    /// Nothing is written when no session has expired.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, LedgerError> {
        self.store.with_lock(|locked| -> Result<usize, LedgerError> {
            let mut document = locked.load_site()?;
            let removed = remove_expired(&mut document.admin_sessions, now);

            if removed > 0 && !locked.save_site(&document) {
                error!(removed, "failed to persist session purge");
                return Err(LedgerError::persistence("session purge"));
            }
            Ok(removed)
        })
    }
}

/// Drop expired sessions from `sessions`, returning how many were removed
pub(crate) fn remove_expired(
    sessions: &mut BTreeMap<String, AdminSession>,
    now: DateTime<Utc>,
) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_expired(now));
    before - sessions.len()
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
