use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observational presence data for a sender.
///
/// Tracked for every inbound direct message, never expired, and never
/// consulted by the code lifecycle logic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// When the sender was first seen.
    pub first_seen: DateTime<Utc>,
    /// When the sender was last seen.
    pub last_seen: DateTime<Utc>,
    /// How many direct messages the sender has sent.
    pub message_count: u64,
    /// The sender's last-seen display name.
    pub display_name: String,
}

impl SessionInfo {
    /// Creates a session for a sender seen for the first time.
    pub fn new(display_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            first_seen: now,
            last_seen: now,
            message_count: 0,
            display_name: display_name.to_string(),
        }
    }
}
