// ABOUTME: TUI state types — displayed chat lines, input buffer, settings mirror, and typing reveal.
// ABOUTME: The view is rebuilt from controller events; it never mutates the session directly.

use crate::session::{Configuration, ExportRecord};

/// The kind of a single chat message displayed in the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessageKind {
    User,
    Assistant,
    /// Model failure surfaced for one turn.
    Error,
    System,
}

/// A single message in the chat view.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub kind: ChatMessageKind,
    pub content: String,
}

/// Progressive reveal of an already-complete reply.
#[derive(Debug)]
struct Reveal {
    /// Index of the assistant message being filled in.
    index: usize,
    chars: Vec<char>,
    shown: usize,
}

/// Full TUI application state.
pub struct TuiState {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub cursor_pos: usize,
    pub scroll_offset: u16,
    /// A turn is in flight; new messages are not accepted.
    pub busy: bool,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
    /// Stored turn count reported by the controller.
    pub turn_count: usize,
    reveal: Option<Reveal>,
}

impl TuiState {
    /// Create a new empty TUI state mirroring the given configuration.
    pub fn new(config: &Configuration) -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            cursor_pos: 0,
            scroll_offset: 0,
            busy: false,
            model: config.model_id.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
            turn_count: 0,
            reveal: None,
        }
    }

    /// Refresh the displayed settings after the controller accepted a change.
    pub fn sync_config(&mut self, config: &Configuration) {
        self.model = config.model_id.clone();
        self.temperature = config.temperature;
        self.max_tokens = config.max_tokens;
        self.system_prompt = config.system_prompt.clone();
    }

    /// Add a message to the chat history and reset scroll to bottom.
    pub fn push_message(&mut self, kind: ChatMessageKind, content: String) {
        self.messages.push(ChatMessage { kind, content });
        self.scroll_offset = 0;
    }

    /// Rebuild the chat lines from the stored conversation. Notices raised
    /// after the latest question (its error, an empty-reply note) stay;
    /// notices from earlier turns are dropped.
    pub fn sync_history(&mut self, history: &[ExportRecord]) {
        let since = self
            .messages
            .iter()
            .rposition(|m| m.kind == ChatMessageKind::User)
            .map_or(0, |i| i + 1);
        let notices: Vec<ChatMessage> = self.messages[since..]
            .iter()
            .filter(|m| matches!(m.kind, ChatMessageKind::Error | ChatMessageKind::System))
            .cloned()
            .collect();

        let mut messages: Vec<ChatMessage> = history
            .iter()
            .map(|record| ChatMessage {
                kind: if record.role == "assistant" {
                    ChatMessageKind::Assistant
                } else {
                    ChatMessageKind::User
                },
                content: record.text.clone(),
            })
            .collect();

        // A reply still being revealed is the newest stored assistant turn.
        if let Some(mut reveal) = self.reveal.take() {
            let latest = messages
                .iter()
                .rposition(|m| m.kind == ChatMessageKind::Assistant);
            if let Some(index) = latest {
                messages[index].content = reveal.chars[..reveal.shown].iter().collect();
                reveal.index = index;
                self.reveal = Some(reveal);
            }
        }

        messages.extend(notices);
        self.messages = messages;
        self.turn_count = history.len();
    }

    /// Begin revealing a complete reply a few characters at a time.
    pub fn start_reveal(&mut self, text: &str) {
        self.finish_reveal();
        self.push_message(ChatMessageKind::Assistant, String::new());
        self.reveal = Some(Reveal {
            index: self.messages.len() - 1,
            chars: text.chars().collect(),
            shown: 0,
        });
    }

    /// Show up to `n` more characters. Returns true while text remains hidden.
    pub fn advance_reveal(&mut self, n: usize) -> bool {
        let Some(mut reveal) = self.reveal.take() else {
            return false;
        };
        let end = (reveal.shown + n.max(1)).min(reveal.chars.len());
        let chunk: String = reveal.chars[reveal.shown..end].iter().collect();
        reveal.shown = end;
        self.write_revealed(reveal.index, &chunk);

        if reveal.shown < reveal.chars.len() {
            self.reveal = Some(reveal);
            true
        } else {
            false
        }
    }

    /// Show the rest of the reply immediately.
    pub fn finish_reveal(&mut self) {
        if let Some(reveal) = self.reveal.take() {
            let rest: String = reveal.chars[reveal.shown..].iter().collect();
            self.write_revealed(reveal.index, &rest);
        }
    }

    fn write_revealed(&mut self, index: usize, text: &str) {
        if let Some(msg) = self.messages.get_mut(index) {
            msg.content.push_str(text);
        }
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.is_some()
    }

    /// Drop every displayed message.
    pub fn clear_messages(&mut self) {
        self.reveal = None;
        self.messages.clear();
        self.scroll_offset = 0;
        self.turn_count = 0;
    }

    /// Submit the current input buffer. Returns the trimmed text if non-empty.
    pub fn submit_input(&mut self) -> Option<String> {
        let trimmed = self.input.trim().to_string();
        if trimmed.is_empty() {
            return None;
        }
        self.input.clear();
        self.cursor_pos = 0;
        Some(trimmed)
    }

    /// Clamp the cursor position to the valid character range of the input buffer.
    pub fn clamp_cursor(&mut self) {
        self.cursor_pos = self.cursor_pos.min(self.input_char_len());
    }

    /// Return the current cursor byte index in the UTF-8 input buffer.
    pub fn cursor_byte_index(&self) -> usize {
        char_index_to_byte_index(&self.input, self.cursor_pos)
    }

    /// Return the total number of characters in the input buffer.
    pub fn input_char_len(&self) -> usize {
        self.input.chars().count()
    }

    /// Lines of the input buffer (at least one).
    pub fn input_lines(&self) -> Vec<&str> {
        self.input.split('\n').collect()
    }

    pub fn input_line_count(&self) -> usize {
        self.input_lines().len()
    }

    /// Line index the cursor sits on.
    pub fn cursor_line(&self) -> usize {
        self.input
            .chars()
            .take(self.cursor_pos)
            .filter(|&c| c == '\n')
            .count()
    }

    /// Character column of the cursor within its line.
    pub fn cursor_column(&self) -> usize {
        self.input
            .chars()
            .take(self.cursor_pos)
            .collect::<Vec<_>>()
            .iter()
            .rev()
            .take_while(|&&c| c != '\n')
            .count()
    }

    /// Insert a character at the cursor and advance by one character.
    pub fn insert_char_at_cursor(&mut self, c: char) {
        self.clamp_cursor();
        let byte_index = self.cursor_byte_index();
        self.input.insert(byte_index, c);
        self.cursor_pos += 1;
    }

    /// Insert pasted text at the cursor.
    pub fn insert_str_at_cursor(&mut self, text: &str) {
        for c in text.chars().filter(|&c| c != '\r') {
            self.insert_char_at_cursor(c);
        }
    }

    /// Delete the character before the cursor (backspace behavior).
    pub fn backspace_char(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos == 0 {
            return;
        }

        let end = self.cursor_byte_index();
        let start = char_index_to_byte_index(&self.input, self.cursor_pos - 1);
        self.input.replace_range(start..end, "");
        self.cursor_pos -= 1;
    }

    /// Delete the character at the cursor (delete behavior).
    pub fn delete_char_at_cursor(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos >= self.input_char_len() {
            return;
        }

        let start = self.cursor_byte_index();
        let end = char_index_to_byte_index(&self.input, self.cursor_pos + 1);
        self.input.replace_range(start..end, "");
    }

    /// Move cursor one character to the left.
    pub fn move_cursor_left(&mut self) {
        self.clamp_cursor();
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    /// Move cursor one character to the right.
    pub fn move_cursor_right(&mut self) {
        self.clamp_cursor();
        if self.cursor_pos < self.input_char_len() {
            self.cursor_pos += 1;
        }
    }

    /// Move cursor to start of input.
    pub fn move_cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    /// Move cursor to end of input.
    pub fn move_cursor_end(&mut self) {
        self.cursor_pos = self.input_char_len();
    }
}

fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    if char_index == 0 {
        return 0;
    }

    match s.char_indices().nth(char_index) {
        Some((idx, _)) => idx,
        None => s.len(),
    }
}
