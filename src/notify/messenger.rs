//! Messaging collaborator: channel handles, outbound messages and the `Messenger` trait.

use async_trait::async_trait;

use crate::error::Result;

/// A resolved, text-capable destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    pub id: String,
}

/// A sent message that can later be edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub channel_id: String,
    pub message_id: String,
}

/// Call-to-action button attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub custom_id: String,
    pub label: String,
}

/// Outbound message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub action: Option<ActionButton>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: None,
        }
    }

    pub fn with_action(mut self, action: ActionButton) -> Self {
        self.action = Some(action);
        self
    }
}

/// Chat platform contract. New platforms only need to implement this trait.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Stable platform identifier (e.g. `discord`).
    fn id(&self) -> &'static str;

    /// Resolve a channel id. `Ok(None)` when it does not exist or cannot
    /// carry text.
    async fn fetch_channel(&self, channel_id: &str) -> Result<Option<ChannelHandle>>;

    async fn send(
        &self,
        channel: &ChannelHandle,
        message: OutboundMessage,
    ) -> Result<MessageHandle>;

    /// Replace the text of a previously sent message, keeping its components.
    async fn edit(&self, message: &MessageHandle, text: String) -> Result<()>;
}
