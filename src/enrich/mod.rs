//! Decoration of completed check-ins.
//!
//! A [`Decorator`] turns the submitted answers into a short decorative
//! string (five emoji). Decoration is best-effort: callers log failures and
//! carry on without it.

pub mod anthropic;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::EnrichmentConfig;
use crate::error::Result;
use crate::user::CycleKind;

pub use anthropic::AnthropicDecorator;

/// Fields a decorator may draw on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationPrompt {
    pub kind: CycleKind,
    pub first: Vec<String>,
    pub second: Vec<String>,
    pub free_text: Option<String>,
}

/// Decoration collaborator.
#[async_trait]
pub trait Decorator: Send + Sync {
    /// `Ok(None)` when nothing usable was produced.
    async fn generate(&self, prompt: &DecorationPrompt) -> Result<Option<String>>;
}

/// Produces nothing. Used when no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDecorator;

#[async_trait]
impl Decorator for NoopDecorator {
    async fn generate(&self, _prompt: &DecorationPrompt) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Build the decorator selected by `config`.
pub fn from_config(config: &EnrichmentConfig) -> Arc<dyn Decorator> {
    match config.api_key.as_deref() {
        Some(key) if config.is_active() => Arc::new(
            AnthropicDecorator::new(key, &config.model)
                .with_base_url(&config.base_url)
                .with_max_tokens(config.max_tokens),
        ),
        _ => {
            tracing::info!("enrichment not configured, check-ins will not be decorated");
            Arc::new(NoopDecorator)
        }
    }
}
