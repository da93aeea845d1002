//! Check-in cycle evaluation.
//!
//! A cycle is bounded by consecutive occurrences of the user's scheduled
//! local time. Everything here is a pure function of a [`UserRecord`] and
//! an instant, so the scheduler can call it as often as it likes.
//!
//! [`UserRecord`]: crate::user::UserRecord

pub mod evaluator;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::user::CycleKind;

pub use evaluator::{
    Evaluator, is_cycle_complete, is_ping_due, most_recent_occurrence, needs_flag_reset,
    resolve_local,
};

/// Default width of the due window, matching a 30 minute sweep.
pub const DEFAULT_WINDOW_MINUTES: u32 = 30;

/// The four per-user jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Job {
    MorningPing,
    MorningReminder,
    NightPing,
    NightReminder,
}

impl Job {
    pub const ALL: [Job; 4] = [
        Job::MorningPing,
        Job::MorningReminder,
        Job::NightPing,
        Job::NightReminder,
    ];

    pub fn ping(kind: CycleKind) -> Self {
        match kind {
            CycleKind::Morning => Self::MorningPing,
            CycleKind::Night => Self::NightPing,
        }
    }

    pub fn reminder(kind: CycleKind) -> Self {
        match kind {
            CycleKind::Morning => Self::MorningReminder,
            CycleKind::Night => Self::NightReminder,
        }
    }

    pub fn kind(self) -> CycleKind {
        match self {
            Self::MorningPing | Self::MorningReminder => CycleKind::Morning,
            Self::NightPing | Self::NightReminder => CycleKind::Night,
        }
    }

    pub fn is_reminder(self) -> bool {
        matches!(self, Self::MorningReminder | Self::NightReminder)
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MorningPing => "morning_ping",
            Self::MorningReminder => "morning_reminder",
            Self::NightPing => "night_ping",
            Self::NightReminder => "night_reminder",
        };
        f.write_str(name)
    }
}
