// ABOUTME: Session module — the single in-memory conversation context for this process.
// ABOUTME: Owns the message store and the mutable chat configuration.

pub mod export;
pub mod store;

pub use export::{ExportRecord, export_json, export_records, write_export};
pub use store::{MessageStore, Role, Turn};

use crate::config::{LlmConfig, SUPPORTED_MODELS};
use crate::error::{ChatError, Result};

/// Settings used for the next request. Each invocation reads a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub model_id: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

impl Configuration {
    /// Check the invariants every request relies on.
    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() {
            return Err(ChatError::Config("model id must not be empty".to_string()));
        }
        if !self.temperature.is_finite() || !(0.0..=1.0).contains(&self.temperature) {
            return Err(ChatError::Config(format!(
                "temperature must be within 0.0..=1.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ChatError::Config(
                "max_tokens must be greater than zero".to_string(),
            ));
        }
        if !SUPPORTED_MODELS.contains(&self.model_id.as_str()) {
            tracing::warn!(model = %self.model_id, "model is not in the known model list");
        }
        Ok(())
    }
}

impl From<&LlmConfig> for Configuration {
    fn from(llm: &LlmConfig) -> Self {
        Self {
            model_id: llm.model.clone(),
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
            system_prompt: llm.system_prompt.clone(),
        }
    }
}

/// A single change to the configuration, applied between turns.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigUpdate {
    Model(String),
    Temperature(f32),
    MaxTokens(u32),
    SystemPrompt(String),
}

/// The one conversation this process serves.
#[derive(Debug)]
pub struct Session {
    store: MessageStore,
    config: Configuration,
}

impl Session {
    pub fn new(config: Configuration) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: MessageStore::new(),
            config,
        })
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MessageStore {
        &mut self.store
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Apply a configuration change. An invalid value leaves the current
    /// configuration untouched.
    pub fn apply(&mut self, update: ConfigUpdate) -> Result<&Configuration> {
        let mut next = self.config.clone();
        match update {
            ConfigUpdate::Model(model) => next.model_id = model,
            ConfigUpdate::Temperature(t) => next.temperature = t,
            ConfigUpdate::MaxTokens(n) => next.max_tokens = n,
            ConfigUpdate::SystemPrompt(prompt) => next.system_prompt = prompt,
        }
        next.validate()?;
        self.config = next;
        Ok(&self.config)
    }

    /// Reset the conversation. Configuration is kept.
    pub fn clear(&mut self) {
        self.store.clear();
    }
}
