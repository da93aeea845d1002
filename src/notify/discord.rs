//! Discord REST messenger.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::messenger::{ChannelHandle, MessageHandle, Messenger, OutboundMessage};
use crate::config::DiscordConfig;
use crate::error::{CheckinError, Result};

/// Channel types that accept messages: guild text, DM, voice, group DM,
/// announcement and the three thread kinds.
const TEXT_CHANNEL_TYPES: [u8; 8] = [0, 1, 2, 3, 5, 10, 11, 12];

#[derive(Debug, Deserialize)]
struct ChannelPayload {
    id: String,
    #[serde(rename = "type")]
    kind: u8,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    id: String,
}

/// Discord messenger over the v10 REST API.
pub struct DiscordMessenger {
    bot_token: String,
    api_base_url: String,
    client: reqwest::Client,
}

impl DiscordMessenger {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base_url: DiscordConfig::default().api_base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Build from config.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Config`] if no bot token is configured.
    pub fn from_config(config: &DiscordConfig) -> Result<Self> {
        let token = config
            .bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                CheckinError::Config("discord bot token is empty (set DISCORD_TOKEN)".to_owned())
            })?;
        Ok(Self::new(token).with_base_url(&config.api_base_url))
    }

    /// Set the API base URL (useful for testing with mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }

    fn auth(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    async fn error_for(action: &str, response: reqwest::Response) -> CheckinError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail: String = body.chars().take(500).collect();
        tracing::error!(status = %status, body = %detail, "discord {action} failed");
        CheckinError::Delivery(format!("discord {action} failed ({status}): {detail}"))
    }
}

#[async_trait]
impl Messenger for DiscordMessenger {
    fn id(&self) -> &'static str {
        "discord"
    }

    async fn fetch_channel(&self, channel_id: &str) -> Result<Option<ChannelHandle>> {
        let response = self
            .client
            .get(self.url(&format!("/channels/{channel_id}")))
            .header("Authorization", self.auth())
            .send()
            .await
            .map_err(|e| CheckinError::Delivery(format!("discord channel lookup: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_for("channel lookup", response).await);
        }

        let channel: ChannelPayload = response
            .json()
            .await
            .map_err(|e| CheckinError::Delivery(format!("discord channel payload: {e}")))?;
        if !TEXT_CHANNEL_TYPES.contains(&channel.kind) {
            tracing::warn!(channel_id, kind = channel.kind, "channel cannot receive text");
            return Ok(None);
        }
        Ok(Some(ChannelHandle { id: channel.id }))
    }

    async fn send(
        &self,
        channel: &ChannelHandle,
        message: OutboundMessage,
    ) -> Result<MessageHandle> {
        let mut body = json!({ "content": message.text });
        if let Some(action) = &message.action {
            body["components"] = json!([{
                "type": 1,
                "components": [{
                    "type": 2,
                    "style": 1,
                    "label": action.label,
                    "custom_id": action.custom_id,
                }]
            }]);
        }

        let response = self
            .client
            .post(self.url(&format!("/channels/{}/messages", channel.id)))
            .header("Authorization", self.auth())
            .json(&body)
            .send()
            .await
            .map_err(|e| CheckinError::Delivery(format!("discord send: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::error_for("send", response).await);
        }
        let sent: MessagePayload = response
            .json()
            .await
            .map_err(|e| CheckinError::Delivery(format!("discord message payload: {e}")))?;
        Ok(MessageHandle {
            channel_id: channel.id.clone(),
            message_id: sent.id,
        })
    }

    async fn edit(&self, message: &MessageHandle, text: String) -> Result<()> {
        let response = self
            .client
            .patch(self.url(&format!(
                "/channels/{}/messages/{}",
                message.channel_id, message.message_id
            )))
            .header("Authorization", self.auth())
            .json(&json!({ "content": text }))
            .send()
            .await
            .map_err(|e| CheckinError::Delivery(format!("discord edit: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::error_for("edit", response).await);
        }
        Ok(())
    }
}
