// ABOUTME: Completion client factory — resolves the API credential and builds the Groq client.
// ABOUTME: A missing credential is a startup failure, reported before any session begins.

use std::sync::Arc;

use crate::chat::client::{CompletionClient, GroqClient};
use crate::config::{API_KEY_ENV, LlmConfig};
use crate::error::{ChatError, Result};

/// Look up the API key with the given resolver; blank values count as missing.
pub fn resolve_api_key(lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    match lookup(API_KEY_ENV) {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(ChatError::StartupConfiguration(format!(
            "missing {API_KEY_ENV}; add it to your .env or environment"
        ))),
    }
}

/// Create the completion client from the process environment.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn CompletionClient>> {
    let api_key = resolve_api_key(|name| std::env::var(name).ok())?;
    Ok(create_client_with_key(config, api_key))
}

pub fn create_client_with_key(
    config: &LlmConfig,
    api_key: String,
) -> Arc<dyn CompletionClient> {
    let mut client = GroqClient::new(api_key);
    if !config.base_url.trim().is_empty() {
        client = client.with_base_url(config.base_url.trim());
    }
    Arc::new(client)
}
