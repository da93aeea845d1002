//! User setup, schedule configuration and status.
//!
//! All input is validated before anything is written; a rejected change
//! leaves the stored record untouched. With the sweep scheduler there is no
//! re-scheduling step: the next sweep reads the new values.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::info;

use crate::cycle::Evaluator;
use crate::error::{CheckinError, Result};
use crate::notify::templates::format_local_time;
use crate::store::UserStore;
use crate::user::{CycleKind, ReminderDelay, TimeOfDay, UserRecord};

const NOT_SET_UP: &str = "You need to set up your check-in channel first!";
const NO_TIMEZONE: &str = "Please set your timezone first.";

/// Create or update a user's notification channel.
///
/// Existing check-in and ping timestamps are kept; both reminder flags are
/// cleared.
///
/// # Errors
///
/// [`CheckinError::Validation`] for a blank channel id, or a persistence error.
pub async fn setup_user(
    store: &dyn UserStore,
    user_id: &str,
    channel_id: &str,
    save_to_csv: bool,
) -> Result<UserRecord> {
    let channel_id = channel_id.trim().to_owned();
    if channel_id.is_empty() {
        return Err(CheckinError::Validation(
            "Please select a text channel for check-ins.".to_owned(),
        ));
    }
    let record = store
        .upsert(
            user_id,
            Box::new(move |r| {
                r.channel_id = Some(channel_id);
                r.save_to_csv = save_to_csv;
                r.reminder_sent = false;
                r.night_reminder_sent = false;
            }),
        )
        .await?;
    info!(user_id, channel_id = ?record.channel_id, "user set up");
    Ok(record)
}

/// Parse an IANA zone name.
///
/// # Errors
///
/// [`CheckinError::Validation`] if the name is unknown.
pub fn parse_timezone(zone: &str) -> Result<Tz> {
    zone.trim()
        .parse::<Tz>()
        .map_err(|_| CheckinError::Validation(format!("Unknown timezone: {}", zone.trim())))
}

/// Set a user's timezone.
///
/// # Errors
///
/// [`CheckinError::Validation`] for an unknown zone or a user who is not set
/// up, or a persistence error.
pub async fn set_timezone(store: &dyn UserStore, user_id: &str, zone: &str) -> Result<UserRecord> {
    let tz = parse_timezone(zone)?;
    require_set_up(store, user_id).await?;

    let name = tz.name().to_owned();
    let record = store
        .update(user_id, Box::new(move |r| r.timezone = Some(name)))
        .await?
        .ok_or_else(|| CheckinError::Validation(NOT_SET_UP.to_owned()))?;
    info!(user_id, timezone = tz.name(), "timezone updated");
    Ok(record)
}

/// Set morning time, night time and reminder delay together.
///
/// All three are parsed first; nothing is written unless all are valid.
///
/// # Errors
///
/// [`CheckinError::Validation`] for a malformed field, a user who is not set
/// up, or one without a timezone, or a persistence error.
pub async fn set_times(
    store: &dyn UserStore,
    user_id: &str,
    morning: &str,
    night: &str,
    reminder_delay: &str,
) -> Result<UserRecord> {
    let morning: TimeOfDay = morning.parse()?;
    let night: TimeOfDay = night.parse()?;
    let delay: ReminderDelay = reminder_delay.parse()?;

    let current = require_set_up(store, user_id).await?;
    if current.timezone.is_none() {
        return Err(CheckinError::Validation(NO_TIMEZONE.to_owned()));
    }

    let record = store
        .update(
            user_id,
            Box::new(move |r| {
                r.morning_time = Some(morning);
                r.night_time = Some(night);
                r.reminder_delay_hours = Some(delay);
            }),
        )
        .await?
        .ok_or_else(|| CheckinError::Validation(NOT_SET_UP.to_owned()))?;
    info!(
        user_id,
        morning = %morning,
        night = %night,
        reminder_delay_hours = delay.hours(),
        "check-in times updated"
    );
    Ok(record)
}

async fn require_set_up(store: &dyn UserStore, user_id: &str) -> Result<UserRecord> {
    match store.get(user_id).await? {
        Some(record) if record.is_configured() => Ok(record),
        _ => Err(CheckinError::Validation(NOT_SET_UP.to_owned())),
    }
}

/// Per-cycle part of a [`StatusReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleStatus {
    pub kind: CycleKind,
    pub scheduled: TimeOfDay,
    pub reminder: TimeOfDay,
    pub completed_this_cycle: bool,
    pub last_completion: Option<DateTime<Utc>>,
    /// `last_completion` on the user's wall clock.
    pub last_completion_local: Option<String>,
}

/// What a user sees when asking for their status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub user_id: String,
    pub configured: bool,
    pub channel_id: Option<String>,
    pub save_to_csv: bool,
    pub timezone: String,
    pub current_local_time: String,
    pub morning: CycleStatus,
    pub night: CycleStatus,
}

/// Status of `record` at `now`, using the user's own zone and times.
pub fn status(record: &UserRecord, evaluator: &Evaluator, now: DateTime<Utc>) -> StatusReport {
    let tz = record.tz();
    let defaults = evaluator.defaults();
    let cycle = |kind: CycleKind| {
        let last = record.last_completion(kind);
        CycleStatus {
            kind,
            scheduled: record.scheduled_time(kind, defaults),
            reminder: record.reminder_time(kind, defaults),
            completed_this_cycle: evaluator.cycle_complete(record, kind, now),
            last_completion: last,
            last_completion_local: last
                .map(|at| at.with_timezone(&tz).format("%Y-%m-%d %-I:%M %p %Z").to_string()),
        }
    };
    StatusReport {
        user_id: record.user_id.clone(),
        configured: record.is_configured(),
        channel_id: record.channel_id.clone(),
        save_to_csv: record.save_to_csv,
        timezone: tz.name().to_owned(),
        current_local_time: format_local_time(now, tz),
        morning: cycle(CycleKind::Morning),
        night: cycle(CycleKind::Night),
    }
}

impl StatusReport {
    /// Plain-text rendering for a chat reply.
    pub fn render(&self) -> String {
        let Some(channel) = self.channel_id.as_deref().filter(|_| self.configured) else {
            return "❌ Not configured\nAsk an admin to set up your check-in channel.".to_owned();
        };
        let mut out = format!(
            "**Check-in Status** for <@{}>\nChannel: <#{channel}> | Save to CSV: {}\nTimezone: {} ({})\n",
            self.user_id,
            if self.save_to_csv { "Yes" } else { "No" },
            self.timezone,
            self.current_local_time,
        );
        for (title, none_yet, cycle) in [
            ("Morning Check-in", "No morning check-ins yet", &self.morning),
            ("Night Reflection", "No night reflections yet", &self.night),
        ] {
            let state = match (&cycle.last_completion_local, cycle.completed_this_cycle) {
                (Some(at), true) => format!("✅ Completed for current cycle ({at})"),
                (Some(at), false) => format!("❌ Not completed this cycle\nLast: {at}"),
                (None, _) => format!("❌ {none_yet}"),
            };
            out.push_str(&format!(
                "\n**{title}** at {} (reminder {})\n{state}\n",
                cycle.scheduled, cycle.reminder
            ));
        }
        out.trim_end().to_owned()
    }
}
