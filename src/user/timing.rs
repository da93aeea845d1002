//! Local time-of-day and reminder offset value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CheckinError;

/// Minutes in a day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Wall-clock time of day in 24-hour format, serialized as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Build a time of day, rejecting out-of-range components.
    pub fn new(hour: u8, minute: u8) -> Result<Self, CheckinError> {
        if hour > 23 || minute > 59 {
            return Err(invalid_time());
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Minutes elapsed since local midnight.
    pub fn minutes_since_midnight(self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }

    /// Same minute-of-hour, `hours` later on a 24-hour clock.
    ///
    /// Wraps at midnight without carrying into the date: 22:15 + 4h is 02:15.
    pub fn plus_hours_wrapping(self, hours: u8) -> Self {
        Self {
            hour: ((u16::from(self.hour) + u16::from(hours)) % 24) as u8,
            minute: self.minute,
        }
    }

    pub fn to_naive_time(self) -> chrono::NaiveTime {
        chrono::NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(chrono::NaiveTime::MIN)
    }
}

fn invalid_time() -> CheckinError {
    CheckinError::Validation(
        "Invalid time format. Please use 24-hour format (HH:MM), e.g., 09:00 or 21:30".to_owned(),
    )
}

impl FromStr for TimeOfDay {
    type Err = CheckinError;

    /// Accepts `H:MM` or `HH:MM`; the minute must have two digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour_part, minute_part) = s.trim().split_once(':').ok_or_else(invalid_time)?;
        let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(hour_part) || hour_part.len() > 2 {
            return Err(invalid_time());
        }
        if !all_digits(minute_part) || minute_part.len() != 2 {
            return Err(invalid_time());
        }
        let hour: u8 = hour_part.parse().map_err(|_| invalid_time())?;
        let minute: u8 = minute_part.parse().map_err(|_| invalid_time())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = CheckinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Hours between a cycle's ping and its follow-up reminder (1-12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ReminderDelay(u8);

impl ReminderDelay {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 12;

    pub fn new(hours: u8) -> Result<Self, CheckinError> {
        if (Self::MIN..=Self::MAX).contains(&hours) {
            Ok(Self(hours))
        } else {
            Err(CheckinError::Validation(
                "Reminder delay must be between 1 and 12 hours.".to_owned(),
            ))
        }
    }

    pub fn hours(self) -> u8 {
        self.0
    }
}

impl Default for ReminderDelay {
    fn default() -> Self {
        Self(4)
    }
}

impl FromStr for ReminderDelay {
    type Err = CheckinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hours: u8 = s.trim().parse().map_err(|_| {
            CheckinError::Validation("Reminder delay must be between 1 and 12 hours.".to_owned())
        })?;
        Self::new(hours)
    }
}

impl TryFrom<u8> for ReminderDelay {
    type Error = CheckinError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReminderDelay> for u8 {
    fn from(value: ReminderDelay) -> Self {
        value.0
    }
}

/// Times used for users who have not configured their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleDefaults {
    pub morning: TimeOfDay,
    pub night: TimeOfDay,
    pub reminder_delay: ReminderDelay,
}

impl Default for ScheduleDefaults {
    fn default() -> Self {
        Self {
            morning: TimeOfDay { hour: 9, minute: 0 },
            night: TimeOfDay { hour: 21, minute: 0 },
            reminder_delay: ReminderDelay::default(),
        }
    }
}
