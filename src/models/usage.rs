use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to a code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageAction {
    Generated,
    Expired,
}

/// An immutable entry in the append-only usage log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    /// The code the event refers to.
    pub code: String,
    /// The chat address of the code's owner.
    pub owner: String,
    /// The owner's display name, recorded for `generated` events.
    pub owner_name: Option<String>,
    /// What happened.
    pub action: UsageAction,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
}
