// ABOUTME: Keyboard input handling for the TUI — translates key events into actions.
// ABOUTME: Handles typing, scrolling, slash commands, and ignores input while a turn is in flight.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::tui::commands::{SlashCommand, parse_command};
use crate::tui::state::TuiState;

/// The result of processing a key event.
#[derive(Debug, PartialEq)]
pub enum InputResult {
    /// No action needed.
    None,
    /// User submitted a chat message.
    Send(String),
    /// User typed a slash command (or a malformed one).
    Command(Result<SlashCommand, String>),
    /// User wants to quit.
    Quit,
}

/// Process a key event against the current TUI state and return the resulting action.
pub fn handle_key(state: &mut TuiState, key: KeyEvent) -> InputResult {
    if key.kind == KeyEventKind::Release {
        return InputResult::None;
    }

    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return InputResult::Quit;
    }

    // Scrolling works in every mode.
    match key.code {
        KeyCode::PageUp => {
            state.scroll_offset = state.scroll_offset.saturating_add(10);
            return InputResult::None;
        }
        KeyCode::PageDown => {
            state.scroll_offset = state.scroll_offset.saturating_sub(10);
            return InputResult::None;
        }
        KeyCode::Up => {
            state.scroll_offset = state.scroll_offset.saturating_add(1);
            return InputResult::None;
        }
        KeyCode::Down => {
            state.scroll_offset = state.scroll_offset.saturating_sub(1);
            return InputResult::None;
        }
        _ => {}
    }

    // One turn at a time: ignore editing until the reply arrives.
    if state.busy {
        return InputResult::None;
    }

    match key.code {
        // Shift+Enter inserts a newline into the input buffer.
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
            state.insert_char_at_cursor('\n');
            InputResult::None
        }
        KeyCode::Enter => match state.submit_input() {
            Some(text) => match parse_command(&text) {
                Some(command) => InputResult::Command(command),
                None => InputResult::Send(text),
            },
            None => InputResult::None,
        },
        KeyCode::Char(c) => {
            state.insert_char_at_cursor(c);
            InputResult::None
        }
        KeyCode::Backspace => {
            state.backspace_char();
            InputResult::None
        }
        KeyCode::Delete => {
            state.delete_char_at_cursor();
            InputResult::None
        }
        KeyCode::Left => {
            state.move_cursor_left();
            InputResult::None
        }
        KeyCode::Right => {
            state.move_cursor_right();
            InputResult::None
        }
        KeyCode::Home => {
            state.move_cursor_home();
            InputResult::None
        }
        KeyCode::End => {
            state.move_cursor_end();
            InputResult::None
        }
        KeyCode::Esc => InputResult::Quit,
        _ => InputResult::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use crate::session::Configuration;

    fn state() -> TuiState {
        TuiState::new(&Configuration::from(&LlmConfig::default()))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(state: &mut TuiState, text: &str) {
        for c in text.chars() {
            handle_key(state, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn enter_sends_trimmed_message() {
        let mut state = state();
        type_text(&mut state, "  2+2? ");
        let result = handle_key(&mut state, key(KeyCode::Enter));
        assert_eq!(result, InputResult::Send("2+2?".to_string()));
        assert_eq!(state.input, "");
    }

    #[test]
    fn enter_on_blank_input_does_nothing() {
        let mut state = state();
        type_text(&mut state, "   ");
        assert_eq!(handle_key(&mut state, key(KeyCode::Enter)), InputResult::None);
    }

    #[test]
    fn slash_input_becomes_command() {
        let mut state = state();
        type_text(&mut state, "/clear");
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Enter)),
            InputResult::Command(Ok(SlashCommand::Clear))
        );
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut state = state();
        type_text(&mut state, "a");
        handle_key(&mut state, KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        type_text(&mut state, "b");
        assert_eq!(state.input, "a\nb");
    }

    #[test]
    fn busy_state_ignores_typing_and_submit() {
        let mut state = state();
        type_text(&mut state, "draft");
        state.busy = true;
        type_text(&mut state, "xyz");
        assert_eq!(handle_key(&mut state, key(KeyCode::Enter)), InputResult::None);
        assert_eq!(state.input, "draft");
    }

    #[test]
    fn busy_state_still_scrolls() {
        let mut state = state();
        state.busy = true;
        handle_key(&mut state, key(KeyCode::PageUp));
        assert_eq!(state.scroll_offset, 10);
        handle_key(&mut state, key(KeyCode::Down));
        assert_eq!(state.scroll_offset, 9);
    }

    #[test]
    fn ctrl_c_quits_even_when_busy() {
        let mut state = state();
        state.busy = true;
        let result = handle_key(
            &mut state,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert_eq!(result, InputResult::Quit);
    }

    #[test]
    fn escape_quits() {
        let mut state = state();
        assert_eq!(handle_key(&mut state, key(KeyCode::Esc)), InputResult::Quit);
    }
}
