//! Provider factory — turns an [`LlmConfig`] into a ready provider.
//!
//! Each variant checks its own required settings before anything else, so a
//! misconfigured provider fails at startup and never at the first request.

use std::sync::Arc;
use jamespot_config::{LlmConfig, LlmProviderKind};
use jamespot_core::error::ProviderError;
use jamespot_core::provider::Provider;
use crate::anthropic::AnthropicProvider;
use crate::openai_compat::{OpenAiCompatProvider, OPENAI_BASE_URL};
use crate::retry::{RetryProvider, DEFAULT_TIMEOUT};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
pub const DEFAULT_SAFEBRAIN_MODEL: &str = "gpt-4o";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// The model that will be requested for this configuration.
pub fn resolve_model(config: &LlmConfig) -> String {
    if let Some(model) = config.model.as_deref().filter(|m| !m.is_empty()) {
        return model.to_string();
    }
    match config.provider {
        LlmProviderKind::OpenAi => DEFAULT_OPENAI_MODEL,
        LlmProviderKind::Safebrain => DEFAULT_SAFEBRAIN_MODEL,
        LlmProviderKind::Anthropic => DEFAULT_ANTHROPIC_MODEL,
    }
    .to_string()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn require<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, ProviderError> {
    non_empty(value).ok_or_else(|| ProviderError::NotConfigured(message.to_string()))
}

/// Build the Safebrain endpoint for a bot and group.
///
/// A bare host gets `https://`; an instance that already names its scheme
/// (e.g. `http://localhost:8080`) is used as-is.
pub fn safebrain_base_url(instance: &str, bot_id: &str, group_id: &str) -> String {
    let instance = instance.trim().trim_end_matches('/');
    let origin = if instance.contains("://") {
        instance.to_string()
    } else {
        format!("https://{instance}")
    };
    format!("{origin}/api/v2/bots/{bot_id}/groups/{group_id}")
}

/// Build the provider selected by `config`, wrapped with retries and a timeout.
///
/// Performs no network I/O.
pub fn build_provider(config: &LlmConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let inner: Arc<dyn Provider> = match config.provider {
        LlmProviderKind::OpenAi => {
            let api_key = require(
                &config.api_key,
                "OpenAI API key is required. Set OPENAI_API_KEY environment variable.",
            )?;
            let base_url = non_empty(&config.base_url).unwrap_or(OPENAI_BASE_URL);
            Arc::new(OpenAiCompatProvider::new("openai", base_url, api_key, DEFAULT_TIMEOUT)?)
        }
        LlmProviderKind::Safebrain => {
            let api_key = require(
                &config.api_key,
                "Safebrain API key is required. Set SAFEBRAIN_API_KEY environment variable.",
            )?;
            let base_url = match non_empty(&config.base_url) {
                Some(url) => url.to_string(),
                None => {
                    let instance = require(
                        &config.instance,
                        "Safebrain instance is required. Set SAFEBRAIN_INSTANCE environment variable (e.g., \"your-instance.safebrain.ai\").",
                    )?;
                    let (Some(bot_id), Some(group_id)) = (non_empty(&config.bot_id), non_empty(&config.group_id)) else {
                        return Err(ProviderError::NotConfigured(
                            "Safebrain Bot ID and Group ID are required. Set SAFEBRAIN_BOT_ID and SAFEBRAIN_GROUP_ID environment variables.".into(),
                        ));
                    };
                    safebrain_base_url(instance, bot_id, group_id)
                }
            };
            tracing::info!(base_url = %base_url, "Using Safebrain endpoint");
            Arc::new(OpenAiCompatProvider::new("safebrain", base_url, api_key, DEFAULT_TIMEOUT)?)
        }
        LlmProviderKind::Anthropic => {
            let api_key = require(
                &config.api_key,
                "Anthropic API key is required. Set ANTHROPIC_API_KEY environment variable.",
            )?;
            let mut provider = AnthropicProvider::new(api_key, DEFAULT_TIMEOUT)?;
            if let Some(url) = non_empty(&config.base_url) {
                provider = provider.with_base_url(url);
            }
            Arc::new(provider)
        }
    };

    Ok(Arc::new(RetryProvider::new(inner)))
}

/// A secret-free, one-line-per-field summary of the LLM settings.
pub fn describe(config: &LlmConfig) -> Vec<String> {
    let mut lines = vec![
        format!("Provider: {}", config.provider),
        format!("Model: {}", resolve_model(config)),
        format!("Temperature: {}", config.temperature),
    ];

    if config.provider == LlmProviderKind::Safebrain {
        if let Some(url) = non_empty(&config.base_url) {
            lines.push(format!("Base URL: {url}"));
        }
        if let Some(bot) = non_empty(&config.bot_id) {
            lines.push(format!("Bot ID: {bot}"));
        }
        if let Some(group) = non_empty(&config.group_id) {
            lines.push(format!("Group ID: {group}"));
        }
    }

    if let Some(max_tokens) = config.max_tokens {
        lines.push(format!("Max Tokens: {max_tokens}"));
    }

    let key = if non_empty(&config.api_key).is_some() { "set" } else { "not set" };
    lines.push(format!("API Key: {key}"));
    lines
}
