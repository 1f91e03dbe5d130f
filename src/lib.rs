//! Community Wallet Library
//! # Overview
//!
//! This library provides a wallet ledger for a small community site. All state lives
//! in a single JSON document that is read and rewritten whole under one global lock.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Wallet, Transaction, SiteDocument, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::document_store`] - Serialised whole-document load and save
//!   - [`core::ledger`] - Balances and the transaction log
//!   - [`core::presence`] / [`core::sessions`] - User presence and admin sessions
//!   - [`core::janitor`] - Periodic removal of stale presence and expired sessions
//! - [`io`] - Storage backends and CSV reporting
//! - [`api`] - axum HTTP endpoints
//!
//! # Transaction Types
//!
//! - **Deposit**: Credit funds to a wallet
//! - **Withdraw**: Debit funds from a wallet (requires sufficient balance)
//! - **Payment**: Debit for a purchase, same rule as a withdrawal
//! - **Refund**: Credit returning a previous payment
//!
//! # Consistency
//!
//! Every operation performs its load, check, mutate and save cycle inside one
//! critical section of the store's lock. Concurrent requests are therefore applied
//! one at a time in lock-acquisition order, no balance ever goes negative, and a
//! balance always equals the sum of its completed transactions.

// Module declarations
pub mod api;
pub mod cli;
pub mod core;
pub mod io;
pub mod types;

pub use core::{DocumentStore, Janitor, JanitorConfig, PresenceTracker, SessionRegistry, WalletLedger};
pub use io::{write_wallets_csv, FileBackend, MemoryBackend};
pub use types::{
    AdminSession, LedgerError, PresenceEntry, SiteDocument, Transaction, TransactionKind,
    TransactionStatus, UserId, Wallet,
};
