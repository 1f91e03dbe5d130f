//! Wallet transaction types
//!
//! Transactions form an append-only log inside the site document. Once written a
//! transaction is never modified; the position in the log is its chronological
//! position.

use super::timestamp;
use super::wallet::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of wallet transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Credit the wallet
    Deposit,

    /// Debit the wallet; requires sufficient balance
    Withdraw,

    /// Debit the wallet for a purchase; requires sufficient balance
    Payment,

    /// Credit the wallet for a reversed payment
    Refund,
}

impl TransactionKind {
    /// Whether this kind adds to the balance
    pub fn is_credit(self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::Refund)
    }

    /// Name used in logs and error messages
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::Payment => "payment",
            TransactionKind::Refund => "refund",
        }
    }
}

/// Processing status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
}

/// A single entry of the wallet transaction log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique id (UUID v4)
    pub id: String,

    /// Wallet owner
    #[serde(rename = "user_id")]
    pub owner_id: UserId,

    #[serde(rename = "type")]
    pub kind: TransactionKind,

    /// Always positive; the kind decides the direction
    pub amount: Decimal,

    pub description: String,

    pub status: TransactionStatus,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a completed transaction with a fresh id
    pub fn completed(
        owner_id: &str,
        kind: TransactionKind,
        amount: Decimal,
        description: String,
        now: DateTime<Utc>,
    ) -> Self {
        Transaction {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            kind,
            amount,
            description,
            status: TransactionStatus::Completed,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TransactionKind::Deposit, true)]
    #[case(TransactionKind::Refund, true)]
    #[case(TransactionKind::Withdraw, false)]
    #[case(TransactionKind::Payment, false)]
    fn test_is_credit(#[case] kind: TransactionKind, #[case] expected: bool) {
        assert_eq!(kind.is_credit(), expected);
    }

    #[test]
    fn test_completed_transactions_get_distinct_ids() {
        let now = Utc::now();
        let a = Transaction::completed("u1", TransactionKind::Deposit, Decimal::ONE, String::new(), now);
        let b = Transaction::completed("u1", TransactionKind::Deposit, Decimal::ONE, String::new(), now);

        assert_ne!(a.id, b.id);
        assert_eq!(a.status, TransactionStatus::Completed);
    }

    #[test]
    fn test_serialized_field_names() {
        let tx = Transaction::completed(
            "u1",
            TransactionKind::Withdraw,
            Decimal::new(1250, 2),
            "Wallet withdrawal".to_string(),
            Utc::now(),
        );
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["type"], "withdraw");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["amount"], "12.50");
    }
}
