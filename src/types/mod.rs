//! Types module
//!
//! Contains core data structures used throughout the service.
//! This module organizes types into logical submodules:
//! - `wallet`: Wallet and amount helpers
//! - `transaction`: Wallet transaction log entries
//! - `presence`: Presence entries and admin sessions
//! - `document`: The site document that holds all of the above
//! - `timestamp`: Timestamp parsing for stored documents
//! - `error`: Error types for the service

pub mod document;
pub mod error;
pub mod presence;
pub mod timestamp;
pub mod transaction;
pub mod wallet;

pub use document::{SiteDocument, SITE_DOCUMENT};
pub use error::LedgerError;
pub use presence::{AdminSession, PresenceEntry};
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
pub use wallet::{normalize_amount, UserId, Wallet, MONEY_SCALE};
