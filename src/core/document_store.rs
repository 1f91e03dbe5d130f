//! Whole-document persistence behind a single process-wide lock
//!
//! This module provides the `DocumentStore`, the only path through which the
//! service touches persisted state. Documents are loaded and replaced as a whole;
//! there are no incremental writes.
//!
//! # Consistency
//!
//! One mutex guards every key. Callers that need to read, modify and write a
//! document back do so inside [`DocumentStore::with_lock`], which hands them a
//! [`LockedStore`] for the duration of the closure. Because the backend is only
//! reachable through that handle, a read-modify-write cycle can never interleave
//! with another one, across all documents. This substitutes for real
//! transactions, at the price of serialising every writer in the process.
//!
//! # Failure Handling
//!
//! - `load` never fails: a missing or unreadable document yields the caller's
//!   default, and the problem is logged.
//! - `save` reports failure as `false` and logs the cause; it never panics.
//! - `load_site` is stricter: an unreadable site document is an error, so no
//!   writer ever replaces it with an empty one.

use crate::core::traits::StorageBackend;
use crate::types::{LedgerError, SiteDocument, SITE_DOCUMENT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, warn};

/// Document store shared by every writer in the process
pub struct DocumentStore {
    /// The backend doubles as the lock's payload so it cannot be reached unlocked
    backend: Mutex<Box<dyn StorageBackend>>,
}

impl DocumentStore {
    /// Create a store over the given backend
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        DocumentStore {
            backend: Mutex::new(Box::new(backend)),
        }
    }

    /// Run `f` inside the critical section
    ///
    /// The lock is held for the whole closure and released on every exit path,
    /// including early returns and panics. Acquisition blocks without a timeout.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut LockedStore<'_>) -> R) -> R {
        let mut locked = LockedStore {
            guard: self.lock(),
        };
        f(&mut locked)
    }

    /// Load a single document in its own critical section
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.with_lock(|store| store.load(key, default))
    }

    /// Save a single document in its own critical section
    pub fn save<T: Serialize>(&self, key: &str, document: &T) -> bool {
        self.with_lock(|store| store.save(key, document))
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn StorageBackend>> {
        // A panic inside a critical section cannot leave a half-written document:
        // state only reaches the backend through whole-document `save` calls.
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Access to the backend while the store's lock is held
pub struct LockedStore<'a> {
    guard: MutexGuard<'a, Box<dyn StorageBackend>>,
}

impl LockedStore<'_> {
    /// Load the document stored under `key`, or `default` if there is none
    ///
    /// Read and parse failures are logged and replaced by `default`.
    pub fn load<T: DeserializeOwned>(&mut self, key: &str, default: T) -> T {
        match self.try_load(key) {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!(key, "document not found, using default");
                default
            }
            Err(e) => {
                warn!(key, error = %e, "failed to load document, using default");
                default
            }
        }
    }

    /// Load the document stored under `key`
    ///
    /// Returns `Ok(None)` when nothing is stored, and an error when the stored
    /// bytes cannot be read or parsed.
    pub fn try_load<T: DeserializeOwned>(&mut self, key: &str) -> io::Result<Option<T>> {
        match self.guard.read(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Serialize `document` and replace whatever is stored under `key`
    ///
    /// Returns `false` if serialization or the write failed.
    pub fn save<T: Serialize>(&mut self, key: &str, document: &T) -> bool {
        let bytes = match serde_json::to_vec_pretty(document) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(key, error = %e, "failed to serialize document");
                return false;
            }
        };

        match self.guard.write(key, &bytes) {
            Ok(()) => {
                debug!(key, bytes = bytes.len(), "document saved");
                true
            }
            Err(e) => {
                error!(key, error = %e, "failed to save document");
                false
            }
        }
    }

    /// Load the site document, filling in wallet owners from their map keys
    ///
    /// A missing document reads as empty. A document that exists but cannot be
    /// read fails with `Persistence`: saving anything in its place would destroy
    /// it, so writers must stop here.
    pub fn load_site(&mut self) -> Result<SiteDocument, LedgerError> {
        let mut document = match self.try_load::<SiteDocument>(SITE_DOCUMENT) {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!(key = SITE_DOCUMENT, "site document not found, starting empty");
                SiteDocument::default()
            }
            Err(e) => {
                error!(
                    key = SITE_DOCUMENT,
                    error = %e,
                    "site document is unreadable, refusing to overwrite it"
                );
                return Err(LedgerError::persistence("site document"));
            }
        };

        for (user_id, wallet) in document.wallets.iter_mut() {
            if wallet.owner_id.is_empty() {
                wallet.owner_id = user_id.clone();
            }
        }
        Ok(document)
    }

    /// Replace the site document
    pub fn save_site(&mut self, document: &SiteDocument) -> bool {
        self.save(SITE_DOCUMENT, document)
    }
}
