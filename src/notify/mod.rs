//! Outbound notifications.
//!
//! [`Messenger`] abstracts the chat platform; [`DiscordMessenger`] is the
//! production implementation. [`Dispatcher`] turns a due [`Job`] into a
//! message and records it on the user's record.
//!
//! [`Job`]: crate::cycle::Job

pub mod discord;
pub mod dispatcher;
pub mod memory;
pub mod messenger;
pub mod templates;

pub use discord::DiscordMessenger;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use memory::{MemoryMessenger, SentMessage};
pub use messenger::{ActionButton, ChannelHandle, MessageHandle, Messenger, OutboundMessage};
