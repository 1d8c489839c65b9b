use chrono::{Duration, NaiveTime, Utc};

use crate::state::AppState;

/// Aggregates behind the `!status` reply.
#[derive(Clone, Debug)]
pub struct StatusReport {
    pub total_users: usize,
    pub active_codes: usize,
    pub total_usage: usize,
    pub last_24h_activity: usize,
    pub uptime_minutes: u64,
    pub memory_mb: u64,
}

/// One row of the admin top-users table.
#[derive(Clone, Debug)]
pub struct TopUser {
    pub display_name: String,
    pub total_generated: u64,
}

/// Aggregates behind the admin `!users` reply.
#[derive(Clone, Debug)]
pub struct UserStatsReport {
    pub total_users: usize,
    pub active_codes: usize,
    pub total_usage: usize,
    pub uptime_minutes: u64,
    pub top_users: Vec<TopUser>,
}

/// Aggregates behind the admin `!stats` reply.
#[derive(Clone, Debug)]
pub struct DetailedStatsReport {
    pub total_users: usize,
    pub active_codes: usize,
    pub new_users_this_week: usize,
    pub session_count: usize,
    pub total_usage: usize,
    pub today_usage: usize,
    pub daily_average: usize,
    pub uptime_hours: u64,
    pub memory_mb: u64,
}

/// Builds the public status projection. Read-only.
pub fn status(state: &AppState) -> StatusReport {
    let store = state.store.read().unwrap();
    let snapshot = store.snapshot();
    let last_24h_activity = store.events_since(Utc::now() - Duration::hours(24));

    StatusReport {
        total_users: snapshot.user_count,
        active_codes: snapshot.active_code_count,
        total_usage: snapshot.total_events,
        last_24h_activity,
        uptime_minutes: state.uptime().as_secs() / 60,
        memory_mb: resident_memory_mb(),
    }
}

/// Builds the admin user-statistics projection. Read-only.
pub fn user_stats(state: &AppState) -> UserStatsReport {
    let store = state.store.read().unwrap();
    let snapshot = store.snapshot();
    let top_users = store
        .top_users(10)
        .into_iter()
        .map(|(_, record)| TopUser {
            display_name: record.display_name,
            total_generated: record.total_generated,
        })
        .collect();

    UserStatsReport {
        total_users: snapshot.user_count,
        active_codes: snapshot.active_code_count,
        total_usage: snapshot.total_events,
        uptime_minutes: state.uptime().as_secs() / 60,
        top_users,
    }
}

/// Builds the admin detailed-statistics projection. Read-only.
pub fn detailed_stats(state: &AppState) -> DetailedStatsReport {
    let now = Utc::now();
    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let week_ago = now - Duration::days(7);

    let store = state.store.read().unwrap();
    let snapshot = store.snapshot();

    DetailedStatsReport {
        total_users: snapshot.user_count,
        active_codes: snapshot.active_code_count,
        new_users_this_week: store.new_users_since(week_ago),
        session_count: store.session_count(),
        total_usage: snapshot.total_events,
        today_usage: store.events_since(midnight),
        daily_average: snapshot.total_events.div_ceil(7),
        uptime_hours: state.uptime().as_secs() / 3600,
        memory_mb: resident_memory_mb(),
    }
}

/// Resident memory of this process in megabytes, best effort.
pub fn resident_memory_mb() -> u64 {
    #[cfg(target_os = "linux")]
    {
        // /proc/self/statm reports sizes in pages; field 1 is resident.
        std::fs::read_to_string("/proc/self/statm")
            .ok()
            .and_then(|raw| {
                raw.split_whitespace()
                    .nth(1)
                    .and_then(|pages| pages.parse::<u64>().ok())
            })
            .map(|pages| pages * 4096 / (1024 * 1024))
            .unwrap_or(0)
    }
    #[cfg(not(target_os = "linux"))]
    {
        0
    }
}
