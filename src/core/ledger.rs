//! Wallet ledger
//!
//! This module provides the `WalletLedger`, which maintains per-user balances and
//! the append-only transaction log inside the site document.
//!
//! The ledger is responsible for:
//! - Creating wallets lazily with a zero balance
//! - Validating amounts and balance sufficiency
//! - Applying a balance change and appending its transaction as one unit
//! - Listing a user's transactions newest first
//!
//! # Consistency
//!
//! Every mutating operation runs its whole load, check, mutate and save cycle in a
//! single [`DocumentStore::with_lock`] critical section. The sufficiency check for
//! a debit therefore sees the balance that the write will replace, so concurrent
//! requests can neither lose updates nor drive a balance negative. The mutation is
//! made on the loaded copy of the document; if the save fails the copy is dropped
//! and the caller sees no effect at all.

use crate::core::document_store::DocumentStore;
use crate::types::{normalize_amount, LedgerError, Transaction, TransactionKind, Wallet};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info};

/// Number of transactions returned by [`WalletLedger::list_transactions`] when the
/// caller does not ask for a specific limit
pub const DEFAULT_TRANSACTION_LIMIT: usize = 50;

/// Balance and transaction log operations over the site document
#[derive(Clone)]
pub struct WalletLedger {
    store: Arc<DocumentStore>,
}

impl WalletLedger {
    /// Create a ledger over a shared document store
    pub fn new(store: Arc<DocumentStore>) -> Self {
        WalletLedger { store }
    }

    /// Get the wallet for `user_id`, creating and persisting an empty one if needed
    ///
    /// An existing wallet is returned without writing the document.
    ///
    /// # Errors
    ///
    /// - `MissingUserId` if `user_id` is empty
    /// - `Persistence` if a newly created wallet could not be saved
    pub fn get_wallet(&self, user_id: &str) -> Result<Wallet, LedgerError> {
        require_user(user_id)?;

        self.store.with_lock(|locked| -> Result<Wallet, LedgerError> {
            let mut document = locked.load_site()?;
            if let Some(wallet) = document.wallets.get(user_id) {
                return Ok(wallet.clone());
            }

            let wallet = Wallet::new(user_id, Utc::now());
            document
                .wallets
                .insert(user_id.to_string(), wallet.clone());

            if !locked.save_site(&document) {
                error!(user_id, "failed to persist new wallet");
                return Err(LedgerError::persistence("wallet creation"));
            }

            info!(user_id, "wallet created");
            Ok(wallet)
        })
    }

    /// Credit `amount` to the wallet of `user_id`
    ///
    /// # Errors
    ///
    /// - `MissingUserId` if `user_id` is empty
    /// - `InvalidAmount` if `amount` is not positive once rounded to cents
    /// - `ArithmeticOverflow` if the balance would overflow
    /// - `Persistence` if the document could not be saved
    pub fn deposit(&self, user_id: &str, amount: Decimal) -> Result<Transaction, LedgerError> {
        self.apply(user_id, TransactionKind::Deposit, amount, None)
    }

    /// Debit `amount` from the wallet of `user_id`
    ///
    /// # Errors
    ///
    /// As [`WalletLedger::deposit`], plus `InsufficientBalance` if the balance is
    /// lower than `amount`. A rejected withdrawal leaves balance and log unchanged.
    pub fn withdraw(&self, user_id: &str, amount: Decimal) -> Result<Transaction, LedgerError> {
        self.apply(user_id, TransactionKind::Withdraw, amount, None)
    }

    /// Debit `amount` for a purchase; same rules as a withdrawal
    pub fn pay(
        &self,
        user_id: &str,
        amount: Decimal,
        description: &str,
    ) -> Result<Transaction, LedgerError> {
        self.apply(
            user_id,
            TransactionKind::Payment,
            amount,
            Some(description.to_string()),
        )
    }

    /// Credit `amount` back for a reversed payment; same rules as a deposit
    pub fn refund(
        &self,
        user_id: &str,
        amount: Decimal,
        description: &str,
    ) -> Result<Transaction, LedgerError> {
        self.apply(
            user_id,
            TransactionKind::Refund,
            amount,
            Some(description.to_string()),
        )
    }

    /// Transactions of `user_id`, newest first, at most `limit` of them
    ///
    /// Ordered by creation time descending; transactions created at the same
    /// instant come in reverse append order.
    pub fn list_transactions(&self, user_id: &str, limit: usize) -> Vec<Transaction> {
        let document = self
            .store
            .with_lock(|locked| locked.load_site())
            .unwrap_or_default();

        let mut transactions: Vec<Transaction> = document
            .wallet_transactions
            .into_iter()
            .filter(|tx| tx.owner_id == user_id)
            .collect();

        // Reverse first so the stable sort keeps later appends ahead on ties
        transactions.reverse();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        transactions.truncate(limit);
        transactions
    }

    /// Snapshot of every wallet
    pub fn wallets(&self) -> Vec<Wallet> {
        self.store
            .with_lock(|locked| locked.load_site())
            .unwrap_or_default()
            .wallets
            .into_values()
            .collect()
    }

    fn apply(
        &self,
        user_id: &str,
        kind: TransactionKind,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        require_user(user_id)?;

        let amount = normalize_amount(amount);
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount));
        }
        let description = description.unwrap_or_else(|| default_description(kind, amount));

        self.store.with_lock(|locked| -> Result<Transaction, LedgerError> {
            let mut document = locked.load_site()?;
            let now = Utc::now();

            let wallet = document
                .wallets
                .entry(user_id.to_string())
                .or_insert_with(|| Wallet::new(user_id, now));

            let new_balance = if kind.is_credit() {
                wallet
                    .balance
                    .checked_add(amount)
                    .ok_or_else(|| LedgerError::arithmetic_overflow(kind.as_str(), user_id))?
            } else {
                if wallet.balance < amount {
                    return Err(LedgerError::insufficient_balance(
                        user_id,
                        wallet.balance,
                        amount,
                    ));
                }
                wallet.balance - amount
            };

            wallet.balance = new_balance;
            wallet.updated_at = now;

            let transaction = Transaction::completed(user_id, kind, amount, description, now);
            document.wallet_transactions.push(transaction.clone());

            if !locked.save_site(&document) {
                error!(user_id, kind = kind.as_str(), %amount, "failed to persist transaction");
                return Err(LedgerError::persistence(kind.as_str()));
            }

            info!(
                user_id,
                kind = kind.as_str(),
                %amount,
                balance = %new_balance,
                tx = %transaction.id,
                "wallet transaction applied"
            );
            Ok(transaction)
        })
    }
}

fn require_user(user_id: &str) -> Result<(), LedgerError> {
    if user_id.trim().is_empty() {
        return Err(LedgerError::MissingUserId);
    }
    Ok(())
}

fn default_description(kind: TransactionKind, amount: Decimal) -> String {
    match kind {
        TransactionKind::Deposit => format!("Wallet deposit ¥{:.2}", amount),
        TransactionKind::Withdraw => format!("Wallet withdrawal ¥{:.2}", amount),
        TransactionKind::Payment => format!("Payment ¥{:.2}", amount),
        TransactionKind::Refund => format!("Refund ¥{:.2}", amount),
    }
}
