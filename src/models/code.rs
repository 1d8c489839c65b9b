use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An active pair code, keyed by the code string itself.
///
/// Code strings are unique among currently active codes; once a code is
/// swept, its string may be regenerated and reassigned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CodeRecord {
    /// The chat address of the user the code was issued to.
    pub owner: String,
    /// The owner's display name at issue time.
    pub owner_name: String,
    /// The timestamp when the code was issued.
    pub created_at: DateTime<Utc>,
    /// The timestamp after which the code is swept.
    pub expires_at: DateTime<Utc>,
    /// Informational redemption counter.
    pub redemption_count: u64,
}

impl CodeRecord {
    /// Returns `true` once the code's expiry timestamp has elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
