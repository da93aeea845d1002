//! Error types for the check-in scheduler.

/// Top-level error type for the check-in bot.
#[derive(Debug, thiserror::Error)]
pub enum CheckinError {
    /// User record store unreadable, unwritable, or unparseable.
    ///
    /// The mutation that produced this error was not persisted.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Channel lookup or message send/edit failed.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// User-supplied configuration was rejected. The message is user-facing.
    #[error("{0}")]
    Validation(String),

    /// Configuration file error.
    #[error("config error: {0}")]
    Config(String),

    /// Decoration (emoji) generation failed.
    #[error("enrichment error: {0}")]
    Enrichment(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckinError {
    /// Returns `true` for errors whose message can be shown to the end user.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, CheckinError>;
