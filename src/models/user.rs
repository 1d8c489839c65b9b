use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user pairing bookkeeping, keyed by the user's chat address.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// The user's single active code, absent if none or expired.
    pub current_code: Option<String>,
    /// The timestamp when the user was first seen issuing a code.
    pub created_at: DateTime<Utc>,
    /// Expiry of the current code, absent when `current_code` is.
    pub expires_at: Option<DateTime<Utc>>,
    /// Lifetime count of codes issued to this user, never reset.
    pub total_generated: u64,
    /// Last-seen human-readable name, informational only.
    pub display_name: String,
}

impl UserRecord {
    /// Creates a fresh record for a user issuing their first code.
    pub fn new(display_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            current_code: None,
            created_at: now,
            expires_at: None,
            total_generated: 0,
            display_name: display_name.to_string(),
        }
    }
}
