//! Core traits for document persistence
//!
//! The document store is written against this trait so that the file-backed
//! implementation used in production and the in-memory one used in tests and
//! benchmarks are interchangeable.

use std::io;

/// Raw byte storage for whole documents, addressed by key
///
/// Implementations are only ever called while the document store's lock is
/// held, so they do not need their own synchronisation for correctness.
pub trait StorageBackend: Send {
    /// Read the full contents stored under `key`
    ///
    /// Returns `Ok(None)` if nothing has been stored under `key` yet.
    fn read(&mut self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Replace the full contents stored under `key`
    ///
    /// After a successful return, a subsequent `read` sees exactly `contents`.
    /// After a failed return, `read` sees either the old or the new contents,
    /// never a mixture.
    fn write(&mut self, key: &str, contents: &[u8]) -> io::Result<()>;
}
