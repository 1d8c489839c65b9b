use chrono::Utc;

use crate::error::{AppError, Result};
use crate::services::quota::DenialReason;
use crate::services::report;
use crate::services::store::{IssueOutcome, IssuedCode};
use crate::state::AppState;

/// Fixed reply for non-admins invoking an admin command.
const ADMIN_ONLY: &str = "❌ This command is for administrators only.";
/// Fixed reply for unknown `!`-prefixed commands.
const UNKNOWN_COMMAND: &str = "❌ Unknown command. Type *!help* to see all available commands.";
/// Canned acknowledgment for gratitude keywords.
const THANKS_REPLY: &str = "🙏 You're welcome! Let me know if you need more pair codes.";
const PONG: &str = "🏓 Pong! Bot is active and responding.";
const PAIR_FAILED: &str = "❌ Failed to generate pair code. Please try again.";
/// Generic reply when per-message processing hits an unexpected fault.
const APOLOGY: &str = "❌ An error occurred while processing your request. Please try again.";

/// The closed command vocabulary, resolved once at parse time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Greeting aliases: `!start`, `!hello`, `hi`, `hello`.
    Greet,
    Pair,
    MyCode,
    Help,
    Status,
    /// Admin-only user statistics.
    Users,
    /// Admin-only detailed statistics.
    Stats,
    Ping,
    /// Any other `!`-prefixed text.
    Unknown,
    /// Non-command text containing a gratitude keyword.
    Thanks,
    /// Non-command text that gets no reply.
    Silent,
}

impl Command {
    /// Normalizes inbound text (trim, case-fold) and matches it against the
    /// command vocabulary.
    pub fn parse(text: &str) -> Self {
        let content = text.trim().to_lowercase();
        match content.as_str() {
            "!start" | "!hello" | "hi" | "hello" => Command::Greet,
            "!pair" => Command::Pair,
            "!mycode" => Command::MyCode,
            "!help" => Command::Help,
            "!status" => Command::Status,
            "!users" => Command::Users,
            "!stats" => Command::Stats,
            "!ping" => Command::Ping,
            _ if content.starts_with('!') => Command::Unknown,
            _ if content.contains("thank") => Command::Thanks,
            _ => Command::Silent,
        }
    }
}

/// An outbound notification to one admin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminNotice {
    pub recipient: String,
    pub text: String,
}

/// What the dispatcher wants sent. The bot loop performs the sends; the
/// dispatcher itself never touches the transport.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub reply: Option<String>,
    pub admin_notices: Vec<AdminNotice>,
}

impl DispatchOutcome {
    fn with_reply(text: String) -> Self {
        Self {
            reply: Some(text),
            admin_notices: Vec::new(),
        }
    }

    fn silent() -> Self {
        Self::default()
    }

    /// The generic apology outcome for unexpected per-message faults.
    pub fn apology() -> Self {
        Self::with_reply(APOLOGY.to_string())
    }
}

/// Executes a parsed command for one sender and returns the replies to send.
///
/// Side effects are confined to the code store (for `Pair`); everything else
/// is a read-only projection.
pub fn dispatch(
    state: &AppState,
    sender_id: &str,
    display_name: &str,
    command: Command,
) -> Result<DispatchOutcome> {
    let is_admin = state.config.is_admin(sender_id);

    let outcome = match command {
        Command::Greet => DispatchOutcome::with_reply(welcome_text(state, display_name, is_admin)),
        Command::Pair => handle_pair(state, sender_id, display_name)?,
        Command::MyCode => DispatchOutcome::with_reply(my_code_text(state, sender_id, display_name)),
        Command::Help => DispatchOutcome::with_reply(help_text(state, is_admin)),
        Command::Status => DispatchOutcome::with_reply(status_text(state)),
        Command::Users => {
            if is_admin {
                DispatchOutcome::with_reply(users_text(state))
            } else {
                DispatchOutcome::with_reply(ADMIN_ONLY.to_string())
            }
        }
        Command::Stats => {
            if is_admin {
                DispatchOutcome::with_reply(stats_text(state))
            } else {
                DispatchOutcome::with_reply(ADMIN_ONLY.to_string())
            }
        }
        Command::Ping => DispatchOutcome::with_reply(PONG.to_string()),
        Command::Unknown => DispatchOutcome::with_reply(UNKNOWN_COMMAND.to_string()),
        Command::Thanks => DispatchOutcome::with_reply(THANKS_REPLY.to_string()),
        Command::Silent => DispatchOutcome::silent(),
    };

    Ok(outcome)
}

/// Issues a code and builds the reply plus the admin notifications.
fn handle_pair(state: &AppState, sender_id: &str, display_name: &str) -> Result<DispatchOutcome> {
    let outcome = {
        let mut store = state
            .store
            .write()
            .map_err(|_| AppError::Internal("code store lock poisoned".to_string()))?;
        store.issue(sender_id, display_name, Utc::now())
    };

    match outcome {
        Ok(IssueOutcome::Issued(issued)) => {
            tracing::info!(
                "🔐 Generated code {} for {} ({})",
                issued.code,
                display_name,
                sender_id
            );

            let admin_notices = state
                .config
                .admin_ids
                .iter()
                .filter(|admin| admin.as_str() != sender_id)
                .map(|admin| AdminNotice {
                    recipient: admin.clone(),
                    text: format!(
                        "📊 New pair code generated:\nUser: {}\nCode: {}\nTime: {}",
                        display_name,
                        issued.code,
                        issued.created_at.format("%Y-%m-%d %H:%M:%S UTC")
                    ),
                })
                .collect();

            Ok(DispatchOutcome {
                reply: Some(issued_text(state, display_name, &issued)),
                admin_notices,
            })
        }
        Ok(IssueOutcome::Denied(DenialReason::AlreadyActive(code))) => {
            Ok(DispatchOutcome::with_reply(format!(
                "❌ You already have an active pair code: *{code}*\n\n\
                 Use *!mycode* to check it or wait for it to expire."
            )))
        }
        Ok(IssueOutcome::Denied(DenialReason::LimitReached(max))) => {
            Ok(DispatchOutcome::with_reply(format!(
                "❌ You have reached the maximum limit of {max} active codes. \
                 Please wait for some to expire."
            )))
        }
        Err(e) => {
            tracing::error!("Error generating pair code: {}", e);
            Ok(DispatchOutcome::with_reply(PAIR_FAILED.to_string()))
        }
    }
}

fn welcome_text(state: &AppState, display_name: &str, is_admin: bool) -> String {
    let admin_badge = if is_admin { " 👑" } else { "" };
    let length = state.config.code_length;
    let expiry = state.config.code_expiry_hours;

    format!(
        "👋 Welcome *{display_name}*{admin_badge}!\n\n\
         🤖 *Pair Code Bot v{version}*\n\n\
         I generate *{length}-character unique pair codes* for multiple users simultaneously!\n\n\
         🚀 *Quick Start:*\n\
         Send *!pair* to get your unique code\n\n\
         📋 *Available Commands:*\n\
         🔐 *!pair* - Generate new pair code\n\
         📋 *!mycode* - Show your current active code\n\
         🛠️ *!help* - Detailed help menu\n\
         📊 *!status* - Bot status & statistics\n\n\
         💡 *Features:*\n\
         • {length}-character {format} codes\n\
         • {expiry}-hour validity\n\
         • Unlimited users\n\
         • Real-time generation",
        version = env!("CARGO_PKG_VERSION"),
        format = state.config.code_format,
    )
}

fn issued_text(state: &AppState, display_name: &str, issued: &IssuedCode) -> String {
    format!(
        "✅ *PAIR CODE GENERATED*\n\n\
         👤 *User:* {display_name}\n\
         🔢 *Your Code:* *{code}*\n\n\
         ⏰ *Expires:* {expiry} hours\n\
         📅 *Generated:* {generated}\n\
         📊 *Your Total Codes:* {total}\n\n\
         💡 *Use this {length}-character code in your application for pairing.*\n\
         🔒 *Keep it secure and don't share unnecessarily.*\n\n\
         📋 *Check your code anytime with* !mycode\n\
         🔄 *Generate new code after this expires*",
        code = issued.code,
        expiry = state.config.code_expiry_hours,
        generated = issued.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        total = issued.total_generated,
        length = state.config.code_length,
    )
}

fn my_code_text(state: &AppState, sender_id: &str, display_name: &str) -> String {
    let active = {
        let store = state.store.read().unwrap();
        store.lookup(sender_id)
    };

    match active {
        Some(active) => {
            let remaining = active.record.expires_at - Utc::now();
            let hours = remaining.num_hours().max(0);
            let minutes = (remaining.num_minutes() - hours * 60).max(0);

            format!(
                "📋 *YOUR ACTIVE PAIR CODE*\n\n\
                 👤 *User:* {display_name}\n\
                 🔢 *Code:* *{code}*\n\
                 ⏰ *Expires in:* {hours}h {minutes}m\n\
                 📅 *Generated:* {generated}\n\
                 🔁 *Your Total Codes:* {total}\n\n\
                 💡 *This code is active and ready to use!*\n\
                 🔄 *You can generate a new code after this expires*",
                code = active.code,
                generated = active.record.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                total = active.total_generated,
            )
        }
        None => format!(
            "❌ You don't have an active pair code.\n\n\
             Send *!pair* to generate a new {length}-character code now!\n\n\
             💡 Your code will be valid for {expiry} hours.",
            length = state.config.code_length,
            expiry = state.config.code_expiry_hours,
        ),
    }
}

fn help_text(state: &AppState, is_admin: bool) -> String {
    let mut help = format!(
        "🤖 *PAIR CODE BOT v{version} - HELP*\n\n\
         *Available Commands for All Users:*\n\n\
         🔐 *Pairing Commands*\n\
         !pair - Generate new {length}-character pair code\n\
         !mycode - Show your current active code\n\n\
         📋 *Information Commands*\n\
         !help - Show this help message\n\
         !status - Check bot status & statistics\n\
         !ping - Check if bot is responsive\n\n\
         👥 *Multi-User Features*\n\
         • Unlimited users supported\n\
         • Unique {length}-character codes for everyone\n\
         • {expiry}-hour code expiration\n\
         • Real-time code generation\n\
         • Usage history tracking\n\n\
         🔢 *Code Format:* {length}-character {format}\n\
         ⏰ *Validity:* {expiry} hours\n\
         👥 *Multi-user:* Yes, unlimited",
        version = env!("CARGO_PKG_VERSION"),
        length = state.config.code_length,
        expiry = state.config.code_expiry_hours,
        format = state.config.code_format,
    );

    if is_admin {
        help.push_str(
            "\n\n👑 *Admin Commands:*\n\
             !users - View user statistics\n\
             !stats - Detailed bot statistics",
        );
    }

    help.push_str("\n\n💡 *Tip:* Share this bot with friends who need pair codes!");
    help
}

fn status_text(state: &AppState) -> String {
    let status = report::status(state);

    format!(
        "🤖 *BOT STATUS v{version}*\n\n\
         ✅ *Status:* Online & Active\n\
         👥 *Total Users:* {users}\n\
         🔑 *Active Codes:* {codes}\n\
         📊 *Total Usage:* {usage}\n\
         🔥 *24h Activity:* {recent}\n\n\
         🖥️ *System Info:*\n\
         🕐 *Uptime:* {uptime} minutes\n\
         💾 *Memory:* {memory} MB\n\
         🔢 *Code Length:* {length} characters\n\n\
         🚀 *Ready for unlimited users!*",
        version = env!("CARGO_PKG_VERSION"),
        users = status.total_users,
        codes = status.active_codes,
        usage = status.total_usage,
        recent = status.last_24h_activity,
        uptime = status.uptime_minutes,
        memory = status.memory_mb,
        length = state.config.code_length,
    )
}

fn users_text(state: &AppState) -> String {
    let stats = report::user_stats(state);

    let mut text = format!(
        "📊 *ADMIN - USER STATISTICS*\n\n\
         👥 Total Users: {users}\n\
         🔑 Active Codes: {codes}\n\
         📈 Total Usage: {usage}\n\
         🕐 Server Uptime: {uptime} minutes\n\n\
         🏆 *Top Users by Code Generation:*\n",
        users = stats.total_users,
        codes = stats.active_codes,
        usage = stats.total_usage,
        uptime = stats.uptime_minutes,
    );

    for (index, user) in stats.top_users.iter().enumerate() {
        text.push_str(&format!(
            "{}. {}: {} codes\n",
            index + 1,
            user.display_name,
            user.total_generated
        ));
    }

    text
}

fn stats_text(state: &AppState) -> String {
    let stats = report::detailed_stats(state);
    let config = &state.config;

    format!(
        "📈 *ADMIN - DETAILED STATISTICS*\n\n\
         👥 *User Statistics:*\n\
         • Total Users: {users}\n\
         • Active Codes: {codes}\n\
         • New Users (Week): {new_users}\n\
         • Active Sessions: {sessions}\n\n\
         📊 *Usage Statistics:*\n\
         • Total Code Generations: {usage}\n\
         • Today's Usage: {today}\n\
         • Average Daily: {average}\n\n\
         🖥️ *System Statistics:*\n\
         • Uptime: {uptime} hours\n\
         • Memory: {memory} MB\n\
         • Version: {version}\n\
         • Platform: {platform}\n\n\
         🔧 *Bot Configuration:*\n\
         • Code Length: {length} characters\n\
         • Code Expiry: {expiry} hours\n\
         • Max Codes/User: {max}\n\
         • Code Format: {format}\n\n\
         🌐 *Web Dashboard:* Available\n\
         📊 *API Endpoints:* /health, /api/stats",
        users = stats.total_users,
        codes = stats.active_codes,
        new_users = stats.new_users_this_week,
        sessions = stats.session_count,
        usage = stats.total_usage,
        today = stats.today_usage,
        average = stats.daily_average,
        uptime = stats.uptime_hours,
        memory = stats.memory_mb,
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        length = config.code_length,
        expiry = config.code_expiry_hours,
        max = config.max_codes_per_user,
        format = config.code_format,
    )
}
