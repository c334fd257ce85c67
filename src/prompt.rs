// ABOUTME: Prompt assembly — turns session history plus new input into a role-tagged request.
// ABOUTME: Order is always: system instruction, full stored history, then the new human message.

use serde::Serialize;

use crate::error::{ChatError, Result};
use crate::session::{Configuration, MessageStore, Role};

/// A single role-tagged message in an assembled request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The ordered message list sent to the remote model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptRequest {
    pub messages: Vec<PromptMessage>,
}

impl PromptRequest {
    /// Total characters across all message bodies.
    pub fn char_count(&self) -> usize {
        self.messages.iter().map(|m| m.content.chars().count()).sum()
    }
}

/// Build the request for the next turn.
///
/// History is never truncated: every stored turn is included, so request
/// size grows with the length of the conversation.
pub fn build_prompt(
    store: &MessageStore,
    config: &Configuration,
    new_human_text: &str,
) -> Result<PromptRequest> {
    if new_human_text.trim().is_empty() {
        return Err(ChatError::EmptyInput);
    }

    let mut messages = Vec::with_capacity(store.len() + 2);
    messages.push(PromptMessage::new(Role::System, &config.system_prompt));
    messages.extend(
        store
            .all()
            .iter()
            .map(|turn| PromptMessage::new(turn.role(), turn.text())),
    );
    messages.push(PromptMessage::new(Role::Human, new_human_text));

    Ok(PromptRequest { messages })
}
