//! In-process messenger for tests and dry runs.
//!
//! Records every send and edit instead of talking to a platform.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::messenger::{ChannelHandle, MessageHandle, Messenger, OutboundMessage};
use crate::error::{CheckinError, Result};

/// A message accepted by [`MemoryMessenger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub handle: MessageHandle,
    pub message: OutboundMessage,
}

#[derive(Debug, Default)]
struct Inner {
    sent: Vec<SentMessage>,
    edits: Vec<(MessageHandle, String)>,
    missing_channels: HashSet<String>,
    failing_channels: HashSet<String>,
    fail_edits: bool,
}

/// Recording [`Messenger`]. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemoryMessenger {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// `fetch_channel` reports `channel_id` as absent.
    pub fn with_missing_channel(self, channel_id: impl Into<String>) -> Self {
        self.lock().missing_channels.insert(channel_id.into());
        self
    }

    /// Sends to `channel_id` fail with a delivery error.
    pub fn with_failing_channel(self, channel_id: impl Into<String>) -> Self {
        self.lock().failing_channels.insert(channel_id.into());
        self
    }

    /// Every edit fails with a delivery error.
    pub fn with_failing_edits(self) -> Self {
        self.lock().fail_edits = true;
        self
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.lock().sent.clone()
    }

    pub fn sent_to(&self, channel_id: &str) -> Vec<SentMessage> {
        self.lock()
            .sent
            .iter()
            .filter(|m| m.handle.channel_id == channel_id)
            .cloned()
            .collect()
    }

    pub fn edits(&self) -> Vec<(MessageHandle, String)> {
        self.lock().edits.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Messenger for MemoryMessenger {
    fn id(&self) -> &'static str {
        "memory"
    }

    async fn fetch_channel(&self, channel_id: &str) -> Result<Option<ChannelHandle>> {
        if self.lock().missing_channels.contains(channel_id) {
            return Ok(None);
        }
        Ok(Some(ChannelHandle {
            id: channel_id.to_owned(),
        }))
    }

    async fn send(
        &self,
        channel: &ChannelHandle,
        message: OutboundMessage,
    ) -> Result<MessageHandle> {
        let mut inner = self.lock();
        if inner.failing_channels.contains(&channel.id) {
            return Err(CheckinError::Delivery(format!("send to {} refused", channel.id)));
        }
        let handle = MessageHandle {
            channel_id: channel.id.clone(),
            message_id: (inner.sent.len() + 1).to_string(),
        };
        inner.sent.push(SentMessage {
            handle: handle.clone(),
            message,
        });
        Ok(handle)
    }

    async fn edit(&self, message: &MessageHandle, text: String) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_edits {
            return Err(CheckinError::Delivery("edit refused".to_owned()));
        }
        inner.edits.push((message.clone(), text));
        Ok(())
    }
}
