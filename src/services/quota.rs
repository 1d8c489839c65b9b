/// Rule set deciding whether a new code may be issued to a user.
#[derive(Clone, Copy, Debug)]
pub struct QuotaPolicy {
    /// Hard ceiling on simultaneously active codes per user.
    pub max_active_per_user: usize,
    /// Whether a user may hold more than one active code at a time.
    pub allow_multiple_active: bool,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            max_active_per_user: 10,
            allow_multiple_active: false,
        }
    }
}

/// Why a code request was denied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DenialReason {
    /// The user already holds this active code.
    AlreadyActive(String),
    /// The user is at the active-code ceiling.
    LimitReached(usize),
}

/// The outcome of a quota check. Denial is expected control flow, not an
/// error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuotaDecision {
    Allow,
    Deny(DenialReason),
}

impl QuotaPolicy {
    /// Decides whether a user with `active_count` active codes, currently
    /// holding `current_code`, may mint another one.
    ///
    /// The already-active check is evaluated before the ceiling check; under
    /// the default policy the ceiling is therefore unreachable. Both knobs
    /// stay independently configurable.
    pub fn evaluate(&self, active_count: usize, current_code: Option<&str>) -> QuotaDecision {
        if !self.allow_multiple_active {
            if let Some(code) = current_code {
                return QuotaDecision::Deny(DenialReason::AlreadyActive(code.to_string()));
            }
        }

        if active_count >= self.max_active_per_user {
            return QuotaDecision::Deny(DenialReason::LimitReached(self.max_active_per_user));
        }

        QuotaDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_user_is_allowed() {
        let policy = QuotaPolicy::default();
        assert_eq!(policy.evaluate(0, None), QuotaDecision::Allow);
    }

    #[test]
    fn default_policy_denies_a_second_active_code() {
        let policy = QuotaPolicy::default();
        assert_eq!(
            policy.evaluate(1, Some("A1B2C3D4")),
            QuotaDecision::Deny(DenialReason::AlreadyActive("A1B2C3D4".to_string()))
        );
    }

    #[test]
    fn multiple_codes_are_bounded_by_the_ceiling() {
        let policy = QuotaPolicy {
            max_active_per_user: 3,
            allow_multiple_active: true,
        };
        assert_eq!(policy.evaluate(2, Some("X8Y9Z0W1")), QuotaDecision::Allow);
        assert_eq!(
            policy.evaluate(3, Some("X8Y9Z0W1")),
            QuotaDecision::Deny(DenialReason::LimitReached(3))
        );
    }

    #[test]
    fn already_active_wins_over_the_ceiling() {
        let policy = QuotaPolicy {
            max_active_per_user: 1,
            allow_multiple_active: false,
        };
        // Both conditions hold; the already-active reason is reported.
        assert_eq!(
            policy.evaluate(1, Some("M5N6P7Q8")),
            QuotaDecision::Deny(DenialReason::AlreadyActive("M5N6P7Q8".to_string()))
        );
    }
}
