// ABOUTME: TUI module — ratatui full-screen presenter for groqchat.
// ABOUTME: Chat display, input handling, slash commands, and status bar.

pub mod commands;
pub mod input;
pub mod state;
pub mod ui;
pub mod widgets;

pub use state::*;
