//! Error types for the wallet service
//!
//! Every fallible ledger, presence and session operation returns a [`LedgerError`].
//!
//! # Error Categories
//!
//! - **Validation errors**: invalid amounts, missing user ids, insufficient balance.
//!   These are safe to show to the caller as-is.
//! - **Persistence errors**: the document store could not write the document back.
//!   The underlying cause is logged where it happens; the message carried here is
//!   deliberately generic.
//! - **Session errors**: unknown or expired admin session tokens.
//! - **Arithmetic errors**: balance overflow.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the wallet service
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Amount is zero or negative after normalisation to cents
    #[error("Invalid amount {amount}: must be greater than zero")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Debit exceeds the wallet balance
    ///
    /// The wallet and the transaction log are left untouched.
    #[error("Insufficient balance for user {user_id}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        /// Owner of the wallet
        user_id: String,
        /// Balance observed inside the critical section
        balance: Decimal,
        /// Requested debit
        requested: Decimal,
    },

    /// Request did not name a user
    #[error("A user id is required")]
    MissingUserId,

    /// The document could not be written back
    #[error("Failed to persist {operation}")]
    Persistence {
        /// Operation whose write failed
        operation: String,
    },

    /// Referenced entry does not exist
    #[error("{what} not found")]
    NotFound {
        /// Kind of entry that was looked up
        what: String,
    },

    /// Referenced entry existed but is past its expiry instant
    #[error("{what} has expired")]
    Expired {
        /// Kind of entry that expired
        what: String,
    },

    /// Balance arithmetic would overflow
    #[error("Arithmetic overflow in {operation} for user {user_id}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Owner of the wallet
        user_id: String,
    },
}

impl LedgerError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(user_id: &str, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientBalance {
            user_id: user_id.to_string(),
            balance,
            requested,
        }
    }

    /// Create a Persistence error
    pub fn persistence(operation: &str) -> Self {
        LedgerError::Persistence {
            operation: operation.to_string(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(what: &str) -> Self {
        LedgerError::NotFound {
            what: what.to_string(),
        }
    }

    /// Create an Expired error
    pub fn expired(what: &str) -> Self {
        LedgerError::Expired {
            what: what.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, user_id: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            user_id: user_id.to_string(),
        }
    }

    /// Whether the error is a caller mistake rather than a server-side failure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidAmount { .. }
                | LedgerError::InsufficientBalance { .. }
                | LedgerError::MissingUserId
        )
    }
}
