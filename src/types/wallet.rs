//! Wallet types
//!
//! A wallet holds one user's balance. Wallets are created lazily with a zero
//! balance the first time a user is seen by the ledger.

use super::timestamp;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places kept for amounts and balances
pub const MONEY_SCALE: u32 = 2;

/// User identifier as used in the site document
pub type UserId = String;

/// A user's wallet
///
/// Persisted inside the site document under `wallets`, keyed by owner id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredWallet")]
pub struct Wallet {
    /// Owner of the wallet
    ///
    /// Filled from the map key when reading documents that omit it.
    pub owner_id: UserId,

    /// Current balance, never negative
    pub balance: Decimal,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Create an empty wallet with a `0.00` balance
    pub fn new(owner_id: &str, now: DateTime<Utc>) -> Self {
        Wallet {
            owner_id: owner_id.to_string(),
            balance: Decimal::new(0, MONEY_SCALE),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A wallet as found in a site document
///
/// Wallets created elsewhere on the site may hold a float balance and may lack
/// either timestamp. A missing `created_at` falls back to `updated_at`, and a
/// wallet with neither reads as created at the Unix epoch.
#[derive(Deserialize)]
struct StoredWallet {
    #[serde(default)]
    owner_id: UserId,
    balance: Decimal,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    updated_at: Option<DateTime<Utc>>,
}

impl From<StoredWallet> for Wallet {
    fn from(stored: StoredWallet) -> Self {
        let updated_at = stored
            .updated_at
            .or(stored.created_at)
            .unwrap_or_default();
        Wallet {
            owner_id: stored.owner_id,
            balance: normalize_amount(stored.balance),
            created_at: stored.created_at.unwrap_or(updated_at),
            updated_at,
        }
    }
}

/// Round an amount to cents and pin its scale so it always prints with two decimals
pub fn normalize_amount(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}
