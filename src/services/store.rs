use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::Config;
use crate::error::Result;
use crate::models::code::CodeRecord;
use crate::models::session::SessionInfo;
use crate::models::usage::{UsageAction, UsageEvent};
use crate::models::user::UserRecord;
use crate::services::generator::{self, CodeFormat};
use crate::services::persistence::PersistedState;
use crate::services::quota::{DenialReason, QuotaDecision, QuotaPolicy};

/// The knobs the store needs from the configuration.
#[derive(Clone, Debug)]
pub struct StoreSettings {
    pub code_length: usize,
    pub code_format: CodeFormat,
    pub code_expiry_hours: i64,
    pub quota: QuotaPolicy,
}

impl StoreSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            code_length: config.code_length,
            code_format: config.code_format,
            code_expiry_hours: config.code_expiry_hours,
            quota: QuotaPolicy {
                max_active_per_user: config.max_codes_per_user,
                allow_multiple_active: config.allow_multiple_active_codes,
            },
        }
    }
}

/// A successfully issued code together with its bookkeeping.
#[derive(Clone, Debug, PartialEq)]
pub struct IssuedCode {
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// The owner's lifetime issue count after this issuance.
    pub total_generated: u64,
}

/// The outcome of an issue request. Quota denial is expected control flow.
#[derive(Clone, Debug, PartialEq)]
pub enum IssueOutcome {
    Issued(IssuedCode),
    Denied(DenialReason),
}

/// A user's currently active code, as returned by [`CodeStore::lookup`].
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveCode {
    pub code: String,
    pub record: CodeRecord,
    pub total_generated: u64,
}

/// O(1) aggregate counts over the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub user_count: usize,
    pub active_code_count: usize,
    pub total_events: usize,
}

/// The in-memory pairing state: user index, active-code index, append-only
/// usage log, and the observational session map.
///
/// Both indices are mutated only by the same operation, so no reader ever
/// observes a code without its owner or a stale owner pointer surviving a
/// sweep.
pub struct CodeStore {
    settings: StoreSettings,
    users: HashMap<String, UserRecord>,
    codes: HashMap<String, CodeRecord>,
    events: Vec<UsageEvent>,
    sessions: HashMap<String, SessionInfo>,
}

impl CodeStore {
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            users: HashMap::new(),
            codes: HashMap::new(),
            events: Vec::new(),
            sessions: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Counts the codes currently active for one owner.
    fn active_code_count_for(&self, user_id: &str) -> usize {
        self.codes.values().filter(|c| c.owner == user_id).count()
    }

    /// Issues a new code to `user_id`, subject to the quota policy.
    ///
    /// On success the user record (created on first issuance), the code
    /// index, and the usage log are all updated in this single call.
    pub fn issue(
        &mut self,
        user_id: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<IssueOutcome> {
        let active_count = self.active_code_count_for(user_id);
        let current_code = self
            .users
            .get(user_id)
            .and_then(|u| u.current_code.clone())
            .filter(|code| self.codes.contains_key(code));

        if let QuotaDecision::Deny(reason) = self
            .settings
            .quota
            .evaluate(active_count, current_code.as_deref())
        {
            return Ok(IssueOutcome::Denied(reason));
        }

        let code = generator::generate(self.settings.code_format, self.settings.code_length, |c| {
            self.codes.contains_key(c)
        })?;
        let expires_at = now + Duration::hours(self.settings.code_expiry_hours);

        let user = self
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| UserRecord::new(display_name, now));
        user.display_name = display_name.to_string();
        user.current_code = Some(code.clone());
        user.expires_at = Some(expires_at);
        user.total_generated += 1;
        let total_generated = user.total_generated;

        self.codes.insert(
            code.clone(),
            CodeRecord {
                owner: user_id.to_string(),
                owner_name: display_name.to_string(),
                created_at: now,
                expires_at,
                redemption_count: 0,
            },
        );

        self.events.push(UsageEvent {
            code: code.clone(),
            owner: user_id.to_string(),
            owner_name: Some(display_name.to_string()),
            action: UsageAction::Generated,
            timestamp: now,
        });

        Ok(IssueOutcome::Issued(IssuedCode {
            code,
            created_at: now,
            expires_at,
            total_generated,
        }))
    }

    /// Returns the user's currently active code, if any.
    pub fn lookup(&self, user_id: &str) -> Option<ActiveCode> {
        let user = self.users.get(user_id)?;
        let code = user.current_code.as_deref()?;
        let record = self.codes.get(code)?;
        Some(ActiveCode {
            code: code.to_string(),
            record: record.clone(),
            total_generated: user.total_generated,
        })
    }

    /// Removes every code whose expiry has elapsed, appending one `expired`
    /// usage event per removal and clearing stale owner pointers so later
    /// issue calls are not blocked.
    ///
    /// Returns the number of codes removed. Idempotent.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .codes
            .iter()
            .filter(|(_, record)| record.is_expired(now))
            .map(|(code, _)| code.clone())
            .collect();

        for code in &expired {
            if let Some(record) = self.codes.remove(code) {
                if let Some(user) = self.users.get_mut(&record.owner) {
                    if user.current_code.as_deref() == Some(code.as_str()) {
                        user.current_code = None;
                        user.expires_at = None;
                    }
                }
                self.events.push(UsageEvent {
                    code: code.clone(),
                    owner: record.owner,
                    owner_name: None,
                    action: UsageAction::Expired,
                    timestamp: now,
                });
            }
        }

        expired.len()
    }

    /// Aggregate counts, no mutation.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            user_count: self.users.len(),
            active_code_count: self.codes.len(),
            total_events: self.events.len(),
        }
    }

    /// Updates the observational session map for an inbound direct message.
    pub fn record_session(&mut self, sender_id: &str, display_name: &str, now: DateTime<Utc>) {
        let session = self
            .sessions
            .entry(sender_id.to_string())
            .or_insert_with(|| SessionInfo::new(display_name, now));
        session.last_seen = now;
        session.message_count += 1;
        session.display_name = display_name.to_string();
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// The last `n` usage events, oldest first.
    pub fn recent_events(&self, n: usize) -> Vec<UsageEvent> {
        let start = self.events.len().saturating_sub(n);
        self.events[start..].to_vec()
    }

    /// How many usage events occurred at or after `cutoff`.
    pub fn events_since(&self, cutoff: DateTime<Utc>) -> usize {
        self.events.iter().filter(|e| e.timestamp >= cutoff).count()
    }

    /// How many users were first seen at or after `cutoff`.
    pub fn new_users_since(&self, cutoff: DateTime<Utc>) -> usize {
        self.users.values().filter(|u| u.created_at >= cutoff).count()
    }

    /// The top `n` users by lifetime issue count, descending.
    pub fn top_users(&self, n: usize) -> Vec<(String, UserRecord)> {
        let mut users: Vec<(String, UserRecord)> = self
            .users
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect();
        users.sort_by(|a, b| b.1.total_generated.cmp(&a.1.total_generated));
        users.truncate(n);
        users
    }

    /// Clones the persistable state for a checkpoint.
    pub fn to_persisted(&self, saved_at: DateTime<Utc>) -> PersistedState {
        PersistedState {
            users: self.users.clone(),
            codes: self.codes.clone(),
            events: self.events.clone(),
            saved_at,
        }
    }

    /// Replaces the persistable state with a previously checkpointed one.
    /// The session map is observational and starts empty.
    pub fn hydrate(&mut self, state: PersistedState) {
        self.users = state.users;
        self.codes = state.codes;
        self.events = state.events;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> CodeStore {
        CodeStore::new(StoreSettings::from_config(&Config::default()))
    }

    fn issue_code(store: &mut CodeStore, user: &str, name: &str, now: DateTime<Utc>) -> IssuedCode {
        match store.issue(user, name, now).unwrap() {
            IssueOutcome::Issued(issued) => issued,
            IssueOutcome::Denied(reason) => panic!("unexpected denial: {reason:?}"),
        }
    }

    #[test]
    fn issue_creates_user_code_and_event_together() {
        let mut store = test_store();
        let now = Utc::now();

        let issued = issue_code(&mut store, "alice@c.us", "Alice", now);

        assert_eq!(issued.code.len(), 8);
        assert_eq!(issued.total_generated, 1);
        assert_eq!(issued.expires_at, now + Duration::hours(24));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.user_count, 1);
        assert_eq!(snapshot.active_code_count, 1);
        assert_eq!(snapshot.total_events, 1);

        let active = store.lookup("alice@c.us").unwrap();
        assert_eq!(active.code, issued.code);
        assert_eq!(active.record.owner, "alice@c.us");
        assert_eq!(active.record.expires_at, issued.expires_at);
    }

    #[test]
    fn second_issue_is_denied_with_the_original_code() {
        let mut store = test_store();
        let now = Utc::now();

        let issued = issue_code(&mut store, "alice@c.us", "Alice", now);
        let before = store.snapshot();

        let outcome = store.issue("alice@c.us", "Alice", now).unwrap();
        assert_eq!(
            outcome,
            IssueOutcome::Denied(DenialReason::AlreadyActive(issued.code))
        );
        // Idempotent denial: no state mutation.
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn ceiling_applies_when_multiple_codes_are_allowed() {
        let mut settings = StoreSettings::from_config(&Config::default());
        settings.quota.allow_multiple_active = true;
        settings.quota.max_active_per_user = 2;
        let mut store = CodeStore::new(settings);
        let now = Utc::now();

        issue_code(&mut store, "bob@c.us", "Bob", now);
        issue_code(&mut store, "bob@c.us", "Bob", now);

        let outcome = store.issue("bob@c.us", "Bob", now).unwrap();
        assert_eq!(
            outcome,
            IssueOutcome::Denied(DenialReason::LimitReached(2))
        );
        assert_eq!(store.snapshot().active_code_count, 2);
    }

    #[test]
    fn active_codes_are_unique_across_users() {
        let mut settings = StoreSettings::from_config(&Config::default());
        // A one-digit alphabet forces collisions to be resolved by retry.
        settings.code_length = 1;
        settings.code_format = CodeFormat::Numeric;
        let mut store = CodeStore::new(settings);
        let now = Utc::now();

        let mut seen = std::collections::HashSet::new();
        for i in 0..8 {
            let issued = issue_code(&mut store, &format!("user{i}@c.us"), "User", now);
            assert!(seen.insert(issued.code), "duplicate active code issued");
        }
    }

    #[test]
    fn sweep_removes_expired_codes_and_clears_pointers() {
        let mut store = test_store();
        let now = Utc::now();

        let issued = issue_code(&mut store, "alice@c.us", "Alice", now);
        issue_code(&mut store, "bob@c.us", "Bob", now + Duration::hours(12));

        let later = now + Duration::hours(25);
        let removed = store.sweep_expired(later);

        assert_eq!(removed, 1);
        assert!(store.lookup("alice@c.us").is_none());
        assert!(store.lookup("bob@c.us").is_some());

        // The swept user's pointer is cleared so a fresh issue succeeds.
        let reissued = issue_code(&mut store, "alice@c.us", "Alice", later);
        assert_eq!(reissued.total_generated, 2);

        let events = store.recent_events(10);
        let expired: Vec<_> = events
            .iter()
            .filter(|e| e.action == UsageAction::Expired)
            .collect();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].code, issued.code);
    }

    #[test]
    fn sweep_is_idempotent() {
        let mut store = test_store();
        let now = Utc::now();
        issue_code(&mut store, "alice@c.us", "Alice", now);

        let later = now + Duration::hours(25);
        assert_eq!(store.sweep_expired(later), 1);
        assert_eq!(store.sweep_expired(later), 0);
    }

    #[test]
    fn expired_code_strings_may_be_reassigned() {
        let mut settings = StoreSettings::from_config(&Config::default());
        settings.code_length = 1;
        settings.code_format = CodeFormat::Numeric;
        settings.quota.allow_multiple_active = true;
        settings.quota.max_active_per_user = 100;
        let mut store = CodeStore::new(settings);
        let now = Utc::now();

        // Fill the entire one-digit space, then expire it.
        for i in 0..10 {
            issue_code(&mut store, &format!("user{i}@c.us"), "User", now);
        }
        assert!(matches!(
            store.issue("late@c.us", "Late", now),
            Err(crate::error::AppError::GenerationExhausted(_))
        ));

        store.sweep_expired(now + Duration::hours(25));
        issue_code(&mut store, "late@c.us", "Late", now + Duration::hours(25));
    }

    #[test]
    fn projections_report_recent_activity_and_top_users() {
        let mut store = test_store();
        let now = Utc::now();

        issue_code(&mut store, "alice@c.us", "Alice", now - Duration::days(10));
        store.sweep_expired(now - Duration::days(9));
        issue_code(&mut store, "alice@c.us", "Alice", now);
        issue_code(&mut store, "bob@c.us", "Bob", now);

        assert_eq!(store.events_since(now - Duration::hours(24)), 2);
        assert_eq!(store.new_users_since(now - Duration::days(7)), 1);

        let top = store.top_users(10);
        assert_eq!(top[0].0, "alice@c.us");
        assert_eq!(top[0].1.total_generated, 2);
        assert_eq!(top[1].1.total_generated, 1);

        let recent = store.recent_events(2);
        assert_eq!(recent.len(), 2);
        assert!(recent.iter().all(|e| e.action == UsageAction::Generated));
    }

    #[test]
    fn sessions_are_observational_only() {
        let mut store = test_store();
        let now = Utc::now();

        store.record_session("carol@c.us", "Carol", now);
        store.record_session("carol@c.us", "Carol", now + Duration::minutes(1));

        assert_eq!(store.session_count(), 1);
        // No user record or code appears from session traffic alone.
        assert_eq!(store.snapshot().user_count, 0);
    }
}
