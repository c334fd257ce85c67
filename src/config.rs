// ABOUTME: Configuration loading for groqchat.
// ABOUTME: Reads ~/.groqchat/config.toml and exposes data/secret paths; CLI overrides apply on top.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Models offered by the model picker.
pub const SUPPORTED_MODELS: &[&str] = &[
    "deepseek-r1-distill-llama-70b",
    "gemma2-9b-it",
    "llama-3.1-8b-instant",
];

/// Environment variable holding the remote API credential.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful, concise teaching assistant. Use short, clear explanations.";

/// Recommended bounds for `max_tokens`, matching the presenter's slider.
pub const MAX_TOKENS_RANGE: (u32, u32) = (50, 300);

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub ui: UiConfig,
}

/// Remote model settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.7,
            max_tokens: 150,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            base_url: "https://api.groq.com/openai".to_string(),
        }
    }
}

/// Presenter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Characters revealed per tick by the typing effect.
    pub reveal_chars_per_tick: usize,
    pub tick_millis: u64,
    pub export_path: PathBuf,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            reveal_chars_per_tick: 4,
            tick_millis: 16,
            export_path: PathBuf::from("chat_history.json"),
        }
    }
}

impl Config {
    /// Load config from ~/.groqchat/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".groqchat")
            .join("config.toml")
    }

    /// Path to the optional secrets file loaded after `./.env`.
    pub fn secrets_env_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("groqchat")
            .join("secrets.env")
    }

    /// Path to the log file; the TUI owns the terminal so logs go to disk.
    pub fn log_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("groqchat")
            .join("groqchat.log")
    }
}
