// ABOUTME: Error taxonomy for groqchat — startup, store, input, and model invocation failures.
// ABOUTME: Per-turn errors stop at the controller; only startup errors halt the process.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    /// A required startup setting (the API credential) is missing.
    #[error("startup configuration error: {0}")]
    StartupConfiguration(String),

    /// Attempt to store a malformed turn.
    #[error("invalid turn: {0}")]
    InvalidTurn(String),

    /// Submitted input was empty or whitespace-only.
    #[error("input is empty")]
    EmptyInput,

    /// The remote completion call failed.
    #[error("model invocation failed: {message}")]
    ModelInvocation { message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChatError {
    pub fn model(message: impl Into<String>) -> Self {
        Self::ModelInvocation {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
