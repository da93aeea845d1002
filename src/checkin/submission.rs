//! Completed check-in payloads and their acknowledgment text.

use chrono::{DateTime, Utc};

use crate::enrich::DecorationPrompt;
use crate::user::{CycleKind, UserId};

/// Longest message body the platform accepts.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// A completed check-in delivered by the form flow.
///
/// `first` and `second` are the two list prompts: gratitude and "what would
/// make today great" in the morning, highlights and lessons at night.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInSubmission {
    pub user_id: UserId,
    pub kind: CycleKind,
    pub timestamp: DateTime<Utc>,
    pub first: Vec<String>,
    pub second: Vec<String>,
    pub free_text: Option<String>,
}

/// Split a multi-line form field into trimmed, non-empty lines.
pub fn split_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

impl CheckInSubmission {
    /// Build from raw form fields. An absent or blank free-text field is `None`.
    pub fn from_form(
        user_id: impl Into<UserId>,
        kind: CycleKind,
        timestamp: DateTime<Utc>,
        first_raw: &str,
        second_raw: &str,
        free_raw: Option<&str>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            timestamp,
            first: split_lines(first_raw),
            second: split_lines(second_raw),
            free_text: free_raw
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned),
        }
    }

    pub fn decoration_prompt(&self) -> DecorationPrompt {
        DecorationPrompt {
            kind: self.kind,
            first: self.first.clone(),
            second: self.second.clone(),
            free_text: self.free_text.clone(),
        }
    }

    /// Acknowledgment body listing the answers.
    pub fn summary(&self) -> String {
        let (title, subject, first_label, second_label) = match self.kind {
            CycleKind::Morning => (
                "Daily Check-in Complete!",
                "check-in",
                "Today I am grateful for...",
                "What would make today great?",
            ),
            CycleKind::Night => (
                "Nightly Reflection Complete!",
                "reflection",
                "Highlights of the day",
                "What I learned from today",
            ),
        };

        let mut text = format!("**{title}**\n<@{}>'s {subject} for today\n", self.user_id);
        for (label, items) in [(first_label, &self.first), (second_label, &self.second)] {
            text.push_str(&format!("\n**{label}**\n{}\n", numbered(items)));
        }
        if let Some(free) = &self.free_text {
            text.push_str(&format!("\n**Free response**\n{free}\n"));
        }
        truncate_chars(text.trim_end(), MAX_MESSAGE_CHARS)
    }

    /// Summary with `decoration` placed above it.
    pub fn decorated_summary(&self, decoration: &str) -> String {
        truncate_chars(&format!("{decoration}\n\n{}", self.summary()), MAX_MESSAGE_CHARS)
    }
}

fn numbered(items: &[String]) -> String {
    if items.is_empty() {
        return "No response".to_owned();
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
