//! Per-user configuration and check-in cycle state.

pub mod timing;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub use timing::{ReminderDelay, ScheduleDefaults, TimeOfDay};

/// Opaque chat-platform user identifier.
pub type UserId = String;

/// The two daily check-in obligations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleKind {
    Morning,
    Night,
}

impl CycleKind {
    pub const ALL: [CycleKind; 2] = [CycleKind::Morning, CycleKind::Night];
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Morning => f.write_str("morning"),
            Self::Night => f.write_str("night"),
        }
    }
}

fn default_save_to_csv() -> bool {
    true
}

/// Read an optional field, treating a value that fails validation as unset.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(raw) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match serde_json::from_value(raw.clone()) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(
                value = %raw,
                error = %e,
                "invalid stored schedule value, using default"
            );
            Ok(None)
        }
    }
}

/// One user's persisted record.
///
/// Field names are camelCase on disk so `users.json` stays readable by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: UserId,
    /// Notification destination. `None` means the user is not set up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// Consumed by the answer export; not used for scheduling.
    #[serde(default = "default_save_to_csv")]
    pub save_to_csv: bool,
    /// IANA zone name; UTC when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub morning_time: Option<TimeOfDay>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub night_time: Option<TimeOfDay>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub reminder_delay_hours: Option<ReminderDelay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check_in: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_night_check_in: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ping: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_night_ping: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reminder_sent: bool,
    #[serde(default)]
    pub night_reminder_sent: bool,
}

impl UserRecord {
    /// A fresh record with every field at its default.
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            channel_id: None,
            save_to_csv: true,
            timezone: None,
            morning_time: None,
            night_time: None,
            reminder_delay_hours: None,
            last_check_in: None,
            last_night_check_in: None,
            last_ping: None,
            last_night_ping: None,
            reminder_sent: false,
            night_reminder_sent: false,
        }
    }

    /// Returns `true` when the user has a notification channel.
    pub fn is_configured(&self) -> bool {
        self.channel_id.as_deref().is_some_and(|c| !c.trim().is_empty())
    }

    /// Resolved timezone. Unknown names fall back to UTC.
    pub fn tz(&self) -> Tz {
        let Some(name) = self.timezone.as_deref() else {
            return Tz::UTC;
        };
        match name.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!(
                    user_id = %self.user_id,
                    timezone = name,
                    "unknown timezone, using UTC"
                );
                Tz::UTC
            }
        }
    }

    pub fn scheduled_time(&self, kind: CycleKind, defaults: &ScheduleDefaults) -> TimeOfDay {
        match kind {
            CycleKind::Morning => self.morning_time.unwrap_or(defaults.morning),
            CycleKind::Night => self.night_time.unwrap_or(defaults.night),
        }
    }

    pub fn reminder_delay(&self, defaults: &ScheduleDefaults) -> ReminderDelay {
        self.reminder_delay_hours.unwrap_or(defaults.reminder_delay)
    }

    /// Local time of day at which the reminder for `kind` may fire.
    pub fn reminder_time(&self, kind: CycleKind, defaults: &ScheduleDefaults) -> TimeOfDay {
        self.scheduled_time(kind, defaults)
            .plus_hours_wrapping(self.reminder_delay(defaults).hours())
    }

    pub fn last_completion(&self, kind: CycleKind) -> Option<DateTime<Utc>> {
        match kind {
            CycleKind::Morning => self.last_check_in,
            CycleKind::Night => self.last_night_check_in,
        }
    }

    pub fn last_ping_at(&self, kind: CycleKind) -> Option<DateTime<Utc>> {
        match kind {
            CycleKind::Morning => self.last_ping,
            CycleKind::Night => self.last_night_ping,
        }
    }

    pub fn reminder_sent_for(&self, kind: CycleKind) -> bool {
        match kind {
            CycleKind::Morning => self.reminder_sent,
            CycleKind::Night => self.night_reminder_sent,
        }
    }

    pub fn set_reminder_sent(&mut self, kind: CycleKind, sent: bool) {
        match kind {
            CycleKind::Morning => self.reminder_sent = sent,
            CycleKind::Night => self.night_reminder_sent = sent,
        }
    }

    /// Record a ping. A new ping re-arms the reminder.
    pub fn record_ping(&mut self, kind: CycleKind, at: DateTime<Utc>) {
        match kind {
            CycleKind::Morning => self.last_ping = Some(at),
            CycleKind::Night => self.last_night_ping = Some(at),
        }
        self.set_reminder_sent(kind, false);
    }

    /// Record a completed check-in. Clears the pending reminder flag.
    pub fn record_completion(&mut self, kind: CycleKind, at: DateTime<Utc>) {
        match kind {
            CycleKind::Morning => self.last_check_in = Some(at),
            CycleKind::Night => self.last_night_check_in = Some(at),
        }
        self.set_reminder_sent(kind, false);
    }
}
