//! Configuration types for the check-in bot.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CheckinError, Result};
use crate::store::json_file::USERS_FILE;
use crate::user::timing::MINUTES_PER_DAY;
use crate::user::{ReminderDelay, ScheduleDefaults, TimeOfDay};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Sweep cadence and schedule defaults.
    pub scheduler: SchedulerConfig,
    /// Where user records are kept.
    pub storage: StorageConfig,
    /// Discord REST credentials.
    pub discord: DiscordConfig,
    /// Emoji decoration of acknowledgments.
    pub enrichment: EnrichmentConfig,
}

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between sweeps.
    pub sweep_interval_secs: u64,
    /// Width of the ping/reminder due window in minutes.
    ///
    /// Should be at least the sweep interval, or some windows fall between
    /// two ticks.
    pub due_window_minutes: u32,
    /// UTC hour at which the daily reminder-flag reset runs.
    pub reset_hour_utc: u32,
    /// Morning time for users who never set one (`HH:MM`).
    pub default_morning_time: String,
    /// Night time for users who never set one (`HH:MM`).
    pub default_night_time: String,
    /// Reminder delay for users who never set one (1-12).
    pub default_reminder_delay_hours: u8,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 30 * 60,
            due_window_minutes: crate::cycle::DEFAULT_WINDOW_MINUTES,
            reset_hour_utc: 4,
            default_morning_time: "09:00".to_owned(),
            default_night_time: "21:00".to_owned(),
            default_reminder_delay_hours: 4,
        }
    }
}

impl SchedulerConfig {
    /// Parse the default times and delay.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Config`] if any default is malformed.
    pub fn schedule_defaults(&self) -> Result<ScheduleDefaults> {
        let morning: TimeOfDay = self
            .default_morning_time
            .parse()
            .map_err(|e| CheckinError::Config(format!("scheduler.default_morning_time: {e}")))?;
        let night: TimeOfDay = self
            .default_night_time
            .parse()
            .map_err(|e| CheckinError::Config(format!("scheduler.default_night_time: {e}")))?;
        let reminder_delay = ReminderDelay::new(self.default_reminder_delay_hours).map_err(|e| {
            CheckinError::Config(format!("scheduler.default_reminder_delay_hours: {e}"))
        })?;
        Ok(ScheduleDefaults {
            morning,
            night,
            reminder_delay,
        })
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory. `None` uses [`crate::paths::data_dir`].
    pub data_dir: Option<PathBuf>,
    /// File name of the user collection inside `data_dir`.
    pub users_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            users_file: USERS_FILE.to_owned(),
        }
    }
}

impl StorageConfig {
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(crate::paths::data_dir)
    }

    pub fn users_path(&self) -> PathBuf {
        self.resolved_data_dir().join(&self.users_file)
    }

    /// Log directory: `logs/` under the configured data directory, else
    /// [`crate::paths::logs_dir`].
    pub fn logs_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.join(crate::paths::LOGS_DIR),
            None => crate::paths::logs_dir(),
        }
    }
}

/// Discord REST configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token. Usually supplied through `DISCORD_TOKEN`.
    pub bot_token: Option<String>,
    pub api_base_url: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base_url: "https://discord.com/api/v10".to_owned(),
        }
    }
}

/// Decoration configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    /// Anthropic API key. Usually supplied through `ANTHROPIC_API_KEY`.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            model: "claude-3-haiku-20240307".to_owned(),
            base_url: "https://api.anthropic.com".to_owned(),
            max_tokens: 100,
        }
    }
}

impl EnrichmentConfig {
    /// Enabled and a non-empty key is present.
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl BotConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CheckinError::Config(e.to_string()))
    }

    /// Load from `path`, or defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CheckinError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path (see [`crate::paths::config_file`]).
    pub fn default_config_path() -> PathBuf {
        crate::paths::config_file()
    }

    /// Apply `DISCORD_TOKEN`, `ANTHROPIC_API_KEY`, `DATA_PATH` and
    /// `CHECKIN_SWEEP_INTERVAL_SECS` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("DISCORD_TOKEN") {
            self.discord.bot_token = Some(token);
        }
        if let Some(key) = non_empty("ANTHROPIC_API_KEY") {
            self.enrichment.api_key = Some(key);
        }
        if let Some(dir) = non_empty("DATA_PATH") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = non_empty("CHECKIN_SWEEP_INTERVAL_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.scheduler.sweep_interval_secs = secs,
                Err(_) => tracing::warn!(
                    value = raw.as_str(),
                    "ignoring invalid CHECKIN_SWEEP_INTERVAL_SECS"
                ),
            }
        }
    }

    /// Check invariants the scheduler relies on.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Config`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let s = &self.scheduler;
        if s.sweep_interval_secs == 0 {
            return Err(CheckinError::Config(
                "scheduler.sweep_interval_secs must be greater than zero".to_owned(),
            ));
        }
        if s.due_window_minutes == 0 || s.due_window_minutes > MINUTES_PER_DAY {
            return Err(CheckinError::Config(
                "scheduler.due_window_minutes must be between 1 and 1440".to_owned(),
            ));
        }
        if s.reset_hour_utc > 23 {
            return Err(CheckinError::Config(
                "scheduler.reset_hour_utc must be between 0 and 23".to_owned(),
            ));
        }
        s.schedule_defaults()?;
        if self.storage.users_file.trim().is_empty() {
            return Err(CheckinError::Config("storage.users_file must not be empty".to_owned()));
        }
        Ok(())
    }
}
