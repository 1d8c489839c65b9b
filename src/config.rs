use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::services::generator::CodeFormat;

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The port the reporting web server listens on.
    pub port: u16,
    /// The number of characters in a generated pair code.
    pub code_length: usize,
    /// How long a pair code stays valid, in hours.
    pub code_expiry_hours: i64,
    /// The hard ceiling on simultaneously active codes per user.
    pub max_codes_per_user: usize,
    /// Whether a user may hold more than one active code at a time.
    pub allow_multiple_active_codes: bool,
    /// The alphabet used for generated codes.
    pub code_format: CodeFormat,
    /// Sender identifiers with access to the admin commands.
    pub admin_ids: Vec<String>,
    /// The checkpoint file holding the persisted store.
    pub data_file: PathBuf,
    /// The sender identity used by the console transport.
    pub console_user_id: String,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .context("Invalid PORT")?,
            code_length: env::var("CODE_LENGTH")
                .unwrap_or_else(|_| defaults.code_length.to_string())
                .parse()
                .context("Invalid CODE_LENGTH")?,
            code_expiry_hours: env::var("CODE_EXPIRY_HOURS")
                .unwrap_or_else(|_| defaults.code_expiry_hours.to_string())
                .parse()
                .context("Invalid CODE_EXPIRY_HOURS")?,
            max_codes_per_user: env::var("MAX_CODES_PER_USER")
                .unwrap_or_else(|_| defaults.max_codes_per_user.to_string())
                .parse()
                .context("Invalid MAX_CODES_PER_USER")?,
            allow_multiple_active_codes: env::var("ALLOW_MULTIPLE_ACTIVE_CODES")
                .unwrap_or_else(|_| defaults.allow_multiple_active_codes.to_string())
                .parse()
                .context("Invalid ALLOW_MULTIPLE_ACTIVE_CODES")?,
            code_format: env::var("CODE_FORMAT")
                .unwrap_or_else(|_| "alphanumeric".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid CODE_FORMAT: {e}"))?,
            admin_ids: env::var("ADMIN_IDS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            data_file: env::var("DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| defaults.data_file.clone()),
            console_user_id: env::var("CONSOLE_USER_ID")
                .unwrap_or_else(|_| defaults.console_user_id.clone()),
        })
    }

    /// Returns `true` if the given sender identifier is on the admin allow-list.
    pub fn is_admin(&self, sender_id: &str) -> bool {
        self.admin_ids.iter().any(|id| id == sender_id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            code_length: 8,
            code_expiry_hours: 24,
            max_codes_per_user: 10,
            allow_multiple_active_codes: false,
            code_format: CodeFormat::Alphanumeric,
            admin_ids: Vec::new(),
            data_file: PathBuf::from("./data/bot-data.json"),
            console_user_id: "console@local".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_configuration() {
        let config = Config::default();
        assert_eq!(config.code_length, 8);
        assert_eq!(config.code_expiry_hours, 24);
        assert_eq!(config.max_codes_per_user, 10);
        assert!(!config.allow_multiple_active_codes);
        assert_eq!(config.code_format, CodeFormat::Alphanumeric);
        assert!(config.admin_ids.is_empty());
    }

    #[test]
    fn admin_check_uses_the_allow_list() {
        let config = Config {
            admin_ids: vec!["233245529834@c.us".to_string()],
            ..Config::default()
        };
        assert!(config.is_admin("233245529834@c.us"));
        assert!(!config.is_admin("555000111@c.us"));
    }
}
