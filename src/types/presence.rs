//! Ephemeral presence and admin session entries
//!
//! Both live in the site document and are evicted by time-based policies:
//! presence entries go stale after a period of inactivity, admin sessions expire
//! at an absolute instant.

use super::timestamp;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Last known activity of a site user, keyed by username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    #[serde(default)]
    pub online: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub last_active: DateTime<Utc>,
}

impl PresenceEntry {
    /// Whether more than `threshold` has passed since the last activity
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        now - self.last_active > threshold
    }
}

/// An admin login, keyed by its session token
///
/// Lifecycle: active from login until `expires_at`; once expired it is removed on
/// the next validation or janitor sweep and never becomes active again.
///
/// Sessions opened by the site's login form store `expiresAt` as epoch
/// milliseconds; both that and RFC 3339 are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub username: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub login_time: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub last_active: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Start a session at `now` that lives for `ttl`
    pub fn start(username: &str, now: DateTime<Utc>, ttl: Duration) -> Self {
        AdminSession {
            username: username.to_string(),
            login_time: now,
            last_active: now,
            expires_at: now + ttl,
        }
    }

    /// Sessions are valid up to and including their expiry instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::fresh(Duration::minutes(5), false)]
    #[case::exactly_at_threshold(Duration::minutes(30), false)]
    #[case::past_threshold(Duration::minutes(31), true)]
    fn test_presence_staleness(#[case] idle: Duration, #[case] expected: bool) {
        let now = Utc::now();
        let entry = PresenceEntry {
            online: true,
            last_active: now - idle,
        };

        assert_eq!(entry.is_stale(now, Duration::minutes(30)), expected);
    }

    #[test]
    fn test_session_expiry_boundary() {
        let login = Utc::now();
        let session = AdminSession::start("admin", login, Duration::hours(2));

        assert_eq!(session.expires_at, login + Duration::hours(2));
        assert!(!session.is_expired(login + Duration::hours(2)));
        assert!(session.is_expired(login + Duration::hours(2) + Duration::seconds(1)));
    }

    #[test]
    fn test_reads_session_written_by_login_form() {
        let session: AdminSession = serde_json::from_value(serde_json::json!({
            "username": "admin",
            "loginTime": "2024-05-01T12:00:00.000001",
            "lastActive": "2024-05-01T12:00:00.000001",
            "expiresAt": 1714572000000.0
        }))
        .unwrap();

        assert_eq!(session.expires_at.to_rfc3339(), "2024-05-01T14:00:00+00:00");
        assert!(session.is_expired(session.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_serialized_field_names() {
        let session = AdminSession::start("admin", Utc::now(), Duration::hours(2));
        let json = serde_json::to_value(&session).unwrap();

        assert!(json.get("expiresAt").is_some());
        assert!(json.get("loginTime").is_some());
        assert!(json.get("lastActive").is_some());
    }
}
