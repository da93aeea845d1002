//! Due-ness and completion decisions.
//!
//! # Daylight-saving policy
//!
//! - A local time that occurs twice (fall-back) resolves to its earliest
//!   instant, and the "already pinged this cycle" check keeps the repeated
//!   wall-clock window from firing a second time.
//! - A local time that does not exist (spring-forward) resolves to the first
//!   valid minute after the gap when computing a cycle boundary. The
//!   wall-clock window test has no special case, so a ping whose entire
//!   window lies inside the gap is skipped for that day.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use super::{DEFAULT_WINDOW_MINUTES, Job};
use crate::user::timing::MINUTES_PER_DAY;
use crate::user::{CycleKind, ScheduleDefaults, TimeOfDay, UserRecord};

/// Longest spring-forward gap searched when resolving a local time.
const MAX_GAP_MINUTES: i64 = 180;

/// Map a local wall-clock date and time in `tz` to a UTC instant.
pub fn resolve_local(tz: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    for step in 0..=MAX_GAP_MINUTES {
        let candidate = naive + Duration::minutes(step);
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => continue,
        }
    }
    Utc.from_utc_datetime(&naive)
}

/// The latest occurrence of `at` in `tz` that is at or before `now`.
///
/// Today's occurrence if it has passed, otherwise yesterday's. The result is
/// never in the future.
pub fn most_recent_occurrence(tz: Tz, at: TimeOfDay, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();
    let todays = resolve_local(tz, today, at.to_naive_time());
    if todays <= now {
        return todays;
    }
    match today.pred_opt() {
        Some(yesterday) => resolve_local(tz, yesterday, at.to_naive_time()),
        None => todays - Duration::days(1),
    }
}

/// `true` when `last_completion` satisfies the cycle that contains `now`.
pub fn is_cycle_complete(
    last_completion: Option<DateTime<Utc>>,
    tz: Tz,
    scheduled: TimeOfDay,
    now: DateTime<Utc>,
) -> bool {
    let Some(completed_at) = last_completion else {
        return false;
    };
    completed_at >= most_recent_occurrence(tz, scheduled, now)
}

/// `true` when local `now` is within `[scheduled, scheduled + window)`.
///
/// Compared on a 24-hour wall clock, so a window opening at 23:50 still
/// covers 00:10.
pub fn is_ping_due(
    now: DateTime<Utc>,
    scheduled: TimeOfDay,
    tz: Tz,
    window_minutes: u32,
) -> bool {
    if window_minutes == 0 {
        return false;
    }
    let local = now.with_timezone(&tz);
    let local_minutes = i64::from(local.hour() * 60 + local.minute());
    let offset = (local_minutes - i64::from(scheduled.minutes_since_midnight()))
        .rem_euclid(i64::from(MINUTES_PER_DAY));
    offset < i64::from(window_minutes)
}

/// `true` when the reminder flag for `kind` is stale and should be cleared.
///
/// Stale means the flag is set, the last ping did not happen on the user's
/// current local date, and that ping belongs to an earlier cycle than the
/// one containing `now`. A reminder that crossed midnight after its ping
/// keeps its flag until the next scheduled occurrence.
pub fn needs_flag_reset(
    record: &UserRecord,
    kind: CycleKind,
    scheduled: TimeOfDay,
    now: DateTime<Utc>,
) -> bool {
    if !record.reminder_sent_for(kind) {
        return false;
    }
    let tz = record.tz();
    let today = now.with_timezone(&tz).date_naive();
    match record.last_ping_at(kind) {
        Some(pinged) => {
            pinged.with_timezone(&tz).date_naive() != today
                && pinged < most_recent_occurrence(tz, scheduled, now)
        }
        None => true,
    }
}

/// Record-level decisions, bound to the configured defaults and window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    defaults: ScheduleDefaults,
    window_minutes: u32,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(ScheduleDefaults::default(), DEFAULT_WINDOW_MINUTES)
    }
}

impl Evaluator {
    /// A zero window is widened to one minute.
    pub fn new(defaults: ScheduleDefaults, window_minutes: u32) -> Self {
        Self {
            defaults,
            window_minutes: window_minutes.max(1),
        }
    }

    pub fn defaults(&self) -> &ScheduleDefaults {
        &self.defaults
    }

    pub fn window_minutes(&self) -> u32 {
        self.window_minutes
    }

    /// Start of the cycle containing `now`.
    pub fn cycle_start(
        &self,
        record: &UserRecord,
        kind: CycleKind,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        most_recent_occurrence(record.tz(), record.scheduled_time(kind, &self.defaults), now)
    }

    pub fn cycle_complete(&self, record: &UserRecord, kind: CycleKind, now: DateTime<Utc>) -> bool {
        is_cycle_complete(
            record.last_completion(kind),
            record.tz(),
            record.scheduled_time(kind, &self.defaults),
            now,
        )
    }

    /// `true` when a ping for `kind` was already sent in the current cycle.
    pub fn pinged_this_cycle(
        &self,
        record: &UserRecord,
        kind: CycleKind,
        now: DateTime<Utc>,
    ) -> bool {
        record
            .last_ping_at(kind)
            .is_some_and(|pinged| pinged >= self.cycle_start(record, kind, now))
    }

    pub fn ping_due(&self, record: &UserRecord, kind: CycleKind, now: DateTime<Utc>) -> bool {
        record.is_configured()
            && is_ping_due(
                now,
                record.scheduled_time(kind, &self.defaults),
                record.tz(),
                self.window_minutes,
            )
            && !self.cycle_complete(record, kind, now)
            && !self.pinged_this_cycle(record, kind, now)
    }

    pub fn reminder_due(&self, record: &UserRecord, kind: CycleKind, now: DateTime<Utc>) -> bool {
        record.is_configured()
            && is_ping_due(
                now,
                record.reminder_time(kind, &self.defaults),
                record.tz(),
                self.window_minutes,
            )
            && !record.reminder_sent_for(kind)
            && record.last_ping_at(kind).is_some()
            && !self.cycle_complete(record, kind, now)
    }

    pub fn is_due(&self, record: &UserRecord, job: Job, now: DateTime<Utc>) -> bool {
        if job.is_reminder() {
            self.reminder_due(record, job.kind(), now)
        } else {
            self.ping_due(record, job.kind(), now)
        }
    }

    /// [`needs_flag_reset`] against the record's own scheduled time.
    pub fn needs_flag_reset(
        &self,
        record: &UserRecord,
        kind: CycleKind,
        now: DateTime<Utc>,
    ) -> bool {
        needs_flag_reset(record, kind, record.scheduled_time(kind, &self.defaults), now)
    }

    /// Every job due for `record` at `now`, in [`Job::ALL`] order.
    pub fn due_actions(&self, record: &UserRecord, now: DateTime<Utc>) -> Vec<Job> {
        if !record.is_configured() {
            return Vec::new();
        }
        Job::ALL
            .into_iter()
            .filter(|job| self.is_due(record, *job, now))
            .collect()
    }
}
