//! Anthropic Messages API decorator.
//!
//! Sends one non-streaming `POST /v1/messages` request and reads the first
//! text content block.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{DecorationPrompt, Decorator};
use crate::error::{CheckinError, Result};
use crate::user::CycleKind;

const API_VERSION: &str = "2023-06-01";

const INSTRUCTIONS: &str = "\
Based on this check-in, provide exactly 5 emojis that serve as a magical summary for this person's check-in.
The emojis should reflect their gratitude, goals, and overall energy.
Only respond with the 5 emojis, nothing else.
No spaces between emojis.
It should be an aesthetically pleasing arrangement of 5 topical emojis.
Symmetry or repetition is okay. ✨✨✨
--------------------------------";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Emoji decorator backed by Claude.
pub struct AnthropicDecorator {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicDecorator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://api.anthropic.com".to_owned(),
            max_tokens: 100,
            client: reqwest::Client::new(),
        }
    }

    /// Set the base URL (useful for testing with mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// User turn text for `prompt`.
pub fn build_prompt(prompt: &DecorationPrompt) -> String {
    let (heading, first_label, second_label) = match prompt.kind {
        CycleKind::Morning => (
            "Today's check-in:",
            "Grateful for",
            "Would make today great",
        ),
        CycleKind::Night => ("Tonight's reflection:", "Highlights", "Learned today"),
    };
    let mut context = format!(
        "{heading}\n- {first_label}: {}\n- {second_label}: {}\n",
        prompt.first.join(", "),
        prompt.second.join(", "),
    );
    if let Some(extra) = &prompt.free_text {
        context.push_str(&format!("- Additional thoughts: {extra}\n"));
    }
    format!("{INSTRUCTIONS}\n\n{context}")
}

/// Strip all whitespace from the reply; `None` when nothing remains.
fn clean_reply(text: &str) -> Option<String> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

#[async_trait]
impl Decorator for AnthropicDecorator {
    async fn generate(&self, prompt: &DecorationPrompt) -> Result<Option<String>> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{"role": "user", "content": build_prompt(prompt)}],
        });

        tracing::debug!(model = %self.model, "requesting check-in decoration");
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CheckinError::Enrichment(format!("connection error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail: String = body.chars().take(500).collect();
            return Err(CheckinError::Enrichment(format!("HTTP {status}: {detail}")));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| CheckinError::Enrichment(format!("invalid response: {e}")))?;
        let text = parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text);
        Ok(text.as_deref().and_then(clean_reply))
    }
}
