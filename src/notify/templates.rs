//! Message texts and call-to-action buttons.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::messenger::{ActionButton, OutboundMessage};
use crate::user::CycleKind;

pub const MORNING_BUTTON_ID: &str = "start_checkin";
pub const NIGHT_BUTTON_ID: &str = "start_night_checkin";

pub fn checkin_button(kind: CycleKind) -> ActionButton {
    let (custom_id, label) = match kind {
        CycleKind::Morning => (MORNING_BUTTON_ID, "Start Daily Check-in"),
        CycleKind::Night => (NIGHT_BUTTON_ID, "Start Nightly Reflection"),
    };
    ActionButton {
        custom_id: custom_id.to_owned(),
        label: label.to_owned(),
    }
}

/// `now` on the user's wall clock, e.g. `9:10 AM EST`.
pub fn format_local_time(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz).format("%-I:%M %p %Z").to_string()
}

pub fn ping_message(user_id: &str, kind: CycleKind, now: DateTime<Utc>, tz: Tz) -> OutboundMessage {
    let local = format_local_time(now, tz);
    let text = match kind {
        CycleKind::Morning => {
            format!("Good morning <@{user_id}>! 🌅\n\nIt's time for your daily check-in. ({local})")
        }
        CycleKind::Night => {
            format!("Good evening <@{user_id}>! 🌙\n\nIt's time for your nightly reflection ✨ ({local})")
        }
    };
    OutboundMessage::text(text).with_action(checkin_button(kind))
}

pub fn reminder_message(user_id: &str, kind: CycleKind) -> OutboundMessage {
    let text = match kind {
        CycleKind::Morning => format!(
            "Hey <@{user_id}>, this is a friendly reminder to complete your daily check-in! 📝\n\n\
             Taking a few moments for reflection can help set a positive tone for your day."
        ),
        CycleKind::Night => {
            format!("Hey <@{user_id}>, this is a reminder to complete your nightly reflection! 🩷")
        }
    };
    OutboundMessage::text(text).with_action(checkin_button(kind))
}
