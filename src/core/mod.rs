//! Core business logic module
//!
//! This module contains the wallet service components:
//! - `traits` - Storage backend abstraction
//! - `document_store` - Whole-document persistence behind the global lock
//! - `ledger` - Wallet balances and transaction log
//! - `presence` - Last-activity tracking for site users
//! - `sessions` - Admin session tokens with absolute expiry
//! - `janitor` - Periodic sweep of stale presence and expired sessions

pub mod document_store;
pub mod janitor;
pub mod ledger;
pub mod presence;
pub mod sessions;
pub mod traits;

pub use document_store::{DocumentStore, LockedStore};
pub use janitor::{Janitor, JanitorConfig, SweepReport};
pub use ledger::{WalletLedger, DEFAULT_TRANSACTION_LIMIT};
pub use presence::PresenceTracker;
pub use sessions::{default_session_ttl, SessionRegistry};
pub use traits::StorageBackend;
