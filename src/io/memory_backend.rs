//! In-memory document storage
//!
//! Used by tests and benchmarks. Clones share the same contents, so a test can
//! keep a handle to inspect documents or switch on write failures after handing
//! the backend to a store.

use crate::core::traits::StorageBackend;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    documents: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Store raw bytes under `key`, bypassing serialization
    pub fn insert_raw(&self, key: &str, contents: Vec<u8>) {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), contents);
    }

    /// Raw bytes stored under `key`
    pub fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&mut self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.get_raw(key))
    }

    fn write(&mut self, key: &str, contents: &[u8]) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "simulated write failure",
            ));
        }
        self.insert_raw(key, contents.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
