//! Runtime configuration for the ledger process.
//!
//! Loaded once at startup from an optional JSON file, then a few
//! environment overrides. Every field has a default, so an empty file,
//! or no file at all, is a valid configuration.

use anyhow::Context;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_DATA_FILE: &str = "SCAR_LEDGER_DATA_FILE";
pub const ENV_REMINDER_INTERVAL: &str = "SCAR_LEDGER_REMINDER_INTERVAL_SECS";

/// Upper bound for hour-valued windows (ten years).
pub const MAX_WINDOW_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub data_file:              String,
    pub grace_period_hours:     i64,
    /// When off, new cases carry no deadline and never become overdue.
    pub deadlines_enabled:      bool,
    pub reminder_interval_secs: u64,
    pub reminder_warning_hours: i64,
    pub platform_timeout_secs:  u64,
    pub audit_display_limit:    usize,
    pub leaderboard_limit:      usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_file:              "data.json".into(),
            grace_period_hours:     72,
            deadlines_enabled:      true,
            reminder_interval_secs: 3600,
            reminder_warning_hours: 24,
            platform_timeout_secs:  10,
            audit_display_limit:    20,
            leaderboard_limit:      10,
        }
    }
}

impl LedgerConfig {
    /// Read `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Cannot read {}", path.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("Cannot parse {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(file) = std::env::var(ENV_DATA_FILE) {
            self.data_file = file;
        }
        if let Ok(secs) = std::env::var(ENV_REMINDER_INTERVAL) {
            self.reminder_interval_secs = secs
                .parse()
                .with_context(|| format!("{ENV_REMINDER_INTERVAL} must be a number of seconds"))?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (1..=MAX_WINDOW_HOURS).contains(&self.grace_period_hours),
            "grace_period_hours must be between 1 and {MAX_WINDOW_HOURS}"
        );
        anyhow::ensure!(
            (0..=MAX_WINDOW_HOURS).contains(&self.reminder_warning_hours),
            "reminder_warning_hours must be between 0 and {MAX_WINDOW_HOURS}"
        );
        anyhow::ensure!(self.reminder_interval_secs > 0, "reminder_interval_secs must be positive");
        anyhow::ensure!(self.platform_timeout_secs > 0, "platform_timeout_secs must be positive");
        Ok(())
    }

    /// Grace period for new cases, or `None` when deadlines are off.
    pub fn grace_period(&self) -> Option<Duration> {
        self.deadlines_enabled
            .then(|| Duration::hours(self.grace_period_hours.clamp(0, MAX_WINDOW_HOURS)))
    }

    pub fn reminder_warning(&self) -> Duration {
        Duration::hours(self.reminder_warning_hours.clamp(0, MAX_WINDOW_HOURS))
    }

    pub fn reminder_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.reminder_interval_secs)
    }

    pub fn platform_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.platform_timeout_secs)
    }
}
