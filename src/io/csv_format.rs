//! CSV export of wallet balances
//!
//! Used by the `balances` command to dump every wallet for reconciliation.
//! The function is pure apart from writing to the given writer.

use crate::types::Wallet;
use std::io::Write;

/// Write wallets in CSV format
///
/// Columns: user_id, balance, created_at, updated_at. Rows are sorted by user id
/// for deterministic output; balances always carry two decimals.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_wallets_csv(wallets: &[Wallet], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["user_id", "balance", "created_at", "updated_at"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_wallets = wallets.to_vec();
    sorted_wallets.sort_by(|a, b| a.owner_id.cmp(&b.owner_id));

    for wallet in sorted_wallets {
        writer
            .write_record(&[
                wallet.owner_id.clone(),
                format!("{:.2}", wallet.balance),
                wallet.created_at.to_rfc3339(),
                wallet.updated_at.to_rfc3339(),
            ])
            .map_err(|e| format!("Failed to write wallet record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn wallet(owner: &str, balance: Decimal) -> Wallet {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Wallet {
            owner_id: owner.to_string(),
            balance,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_write_wallets_sorted_with_two_decimals() {
        let wallets = vec![
            wallet("bob", Decimal::new(5, 0)),
            wallet("alice", Decimal::new(1999, 2)),
        ];
        let mut output = Vec::new();

        write_wallets_csv(&wallets, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "user_id,balance,created_at,updated_at");
        assert_eq!(
            lines[1],
            "alice,19.99,2024-05-01T12:00:00+00:00,2024-05-01T12:00:00+00:00"
        );
        assert!(lines[2].starts_with("bob,5.00,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_empty_wallet_list_writes_header_only() {
        let mut output = Vec::new();

        write_wallets_csv(&[], &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "user_id,balance,created_at,updated_at\n"
        );
    }
}
