// ABOUTME: In-memory message store — the ordered, append-only log of one session's turns.
// ABOUTME: Only human and assistant turns are stored; each gets the next sequence index.

use serde::Serialize;

use crate::error::{ChatError, Result};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Human => "human",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One message in the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    text: String,
    sequence_index: u64,
}

impl Turn {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sequence_index(&self) -> u64 {
        self.sequence_index
    }
}

/// Ordered log of turns for a single session.
#[derive(Debug, Default)]
pub struct MessageStore {
    turns: Vec<Turn>,
    next_index: u64,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end of the log.
    ///
    /// Rejects system turns and text that is empty after trimming; a rejected
    /// append leaves the store unchanged.
    pub fn append(&mut self, role: Role, text: impl Into<String>) -> Result<&Turn> {
        let text = text.into();
        if role == Role::System {
            return Err(ChatError::InvalidTurn(
                "system turns are not stored".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(ChatError::InvalidTurn(format!(
                "{} turn has empty text",
                role.as_str()
            )));
        }

        let turn = Turn {
            role,
            text,
            sequence_index: self.next_index,
        };
        self.next_index += 1;
        self.turns.push(turn);
        Ok(&self.turns[self.turns.len() - 1])
    }

    /// Drop every turn and restart sequence numbering.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.next_index = 0;
    }

    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_call_order() {
        let mut store = MessageStore::new();
        store.append(Role::Human, "hi").unwrap();
        store.append(Role::Assistant, "hello").unwrap();
        store.append(Role::Human, "bye").unwrap();

        let texts: Vec<&str> = store.all().iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["hi", "hello", "bye"]);
        assert_eq!(store.all()[1].role(), Role::Assistant);
    }

    #[test]
    fn sequence_index_strictly_increases() {
        let mut store = MessageStore::new();
        for i in 0..6 {
            let role = if i % 2 == 0 { Role::Human } else { Role::Assistant };
            store.append(role, format!("msg {}", i)).unwrap();
        }
        let indices: Vec<u64> = store.all().iter().map(|t| t.sequence_index()).collect();
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(indices[0], 0);
    }

    #[test]
    fn system_turn_is_rejected() {
        let mut store = MessageStore::new();
        store.append(Role::Human, "hi").unwrap();
        let err = store.append(Role::System, "be nice").unwrap_err();
        assert!(matches!(err, ChatError::InvalidTurn(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn blank_text_is_rejected_without_mutation() {
        let mut store = MessageStore::new();
        assert!(matches!(
            store.append(Role::Assistant, ""),
            Err(ChatError::InvalidTurn(_))
        ));
        assert!(matches!(
            store.append(Role::Human, "  \n\t "),
            Err(ChatError::InvalidTurn(_))
        ));
        assert!(store.is_empty());

        // A rejected append does not consume a sequence index.
        let turn = store.append(Role::Human, "ok").unwrap();
        assert_eq!(turn.sequence_index(), 0);
    }

    #[test]
    fn clear_empties_and_is_idempotent() {
        let mut store = MessageStore::new();
        store.append(Role::Human, "hi").unwrap();
        store.append(Role::Assistant, "hello").unwrap();

        store.clear();
        assert!(store.all().is_empty());
        store.clear();
        assert!(store.all().is_empty());

        let turn = store.append(Role::Human, "again").unwrap();
        assert_eq!(turn.sequence_index(), 0);
    }

    #[test]
    fn text_is_stored_verbatim() {
        let mut store = MessageStore::new();
        store.append(Role::Assistant, "  padded  ").unwrap();
        assert_eq!(store.all()[0].text(), "  padded  ");
    }
}
