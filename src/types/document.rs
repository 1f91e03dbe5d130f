//! The site document
//!
//! All site state lives in one JSON document that is loaded and replaced as a
//! whole. This crate owns the wallet, presence and session sections; every other
//! top-level key (donations, members, applications, ...) belongs to other parts of
//! the site and is carried through untouched.

use super::presence::{AdminSession, PresenceEntry};
use super::transaction::Transaction;
use super::wallet::{UserId, Wallet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Store key of the site document (`data.json` on disk)
pub const SITE_DOCUMENT: &str = "data";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteDocument {
    #[serde(default)]
    pub wallets: BTreeMap<UserId, Wallet>,

    /// Append-only; insertion order is chronological order
    #[serde(default)]
    pub wallet_transactions: Vec<Transaction>,

    /// Unreadable entries are dropped on load
    #[serde(default, rename = "userPresence", deserialize_with = "readable_entries")]
    pub user_presence: BTreeMap<String, PresenceEntry>,

    /// Unreadable entries are dropped on load
    #[serde(default, rename = "adminSessions", deserialize_with = "readable_entries")]
    pub admin_sessions: BTreeMap<String, AdminSession>,

    /// Sections owned by other endpoints
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Deserialize a keyed section entry by entry, skipping entries that do not parse
///
/// Presence and session entries are disposable, so one bad entry must not make
/// the whole document unreadable.
fn readable_entries<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(entry) => Some((key, entry)),
            Err(e) => {
                warn!(%key, error = %e, "dropping unreadable document entry");
                None
            }
        })
        .collect())
}
