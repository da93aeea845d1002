//! Filesystem locations used by the bot.
//!
//! # Environment Overrides
//!
//! - `CHECKIN_DATA_DIR`, then `DATA_PATH`: override [`data_dir`]
//! - `CHECKIN_CONFIG_DIR`: overrides [`config_dir`]
//!
//! `DATA_PATH` is honoured so that a mounted volume (e.g. `/data` on a
//! container host) can be used without touching the config file.

use std::ffi::OsString;
use std::path::PathBuf;

/// Log directory name inside a data directory.
pub const LOGS_DIR: &str = "logs";

/// Application data root: `users.json` and logs live here.
///
/// Resolves to `dirs::data_dir()/checkin/` unless overridden.
#[must_use]
pub fn data_dir() -> PathBuf {
    resolve_data_dir(|key| std::env::var_os(key))
}

/// Application config directory (`config.toml`).
///
/// Resolves to `dirs::config_dir()/checkin/` unless overridden.
#[must_use]
pub fn config_dir() -> PathBuf {
    resolve_config_dir(|key| std::env::var_os(key))
}

/// Log file directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join(LOGS_DIR)
}

/// Default configuration file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

fn resolve_data_dir(lookup: impl Fn(&str) -> Option<OsString>) -> PathBuf {
    for key in ["CHECKIN_DATA_DIR", "DATA_PATH"] {
        if let Some(dir) = lookup(key).filter(|v| !v.is_empty()) {
            return PathBuf::from(dir);
        }
    }
    dirs::data_dir()
        .map(|d| d.join("checkin"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn resolve_config_dir(lookup: impl Fn(&str) -> Option<OsString>) -> PathBuf {
    if let Some(dir) = lookup("CHECKIN_CONFIG_DIR").filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .map(|d| d.join("checkin"))
        .unwrap_or_else(|| PathBuf::from("config"))
}
