// ABOUTME: Slash commands — the TUI's settings and action controls (model, temperature, clear, export).
// ABOUTME: Parses typed commands and maps them to controller events or local notices.

use std::path::PathBuf;

use crate::chat::UserEvent;
use crate::config::{MAX_TOKENS_RANGE, SUPPORTED_MODELS};
use crate::session::ConfigUpdate;
use crate::tui::state::TuiState;

pub const HELP_TEXT: &str = "Commands: /model [id] · /temp <0.0-1.0> · /tokens <n> · \
/system <text> · /clear · /export [path] · /quit";

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq)]
pub enum SlashCommand {
    /// Set a model, or cycle to the next known one when none is given.
    Model(Option<String>),
    Temperature(f32),
    MaxTokens(u32),
    System(String),
    Clear,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

/// What the app should do with a command.
#[derive(Debug)]
pub enum CommandAction {
    Send(UserEvent),
    Notice(String),
    Quit,
}

/// Parse input starting with `/`. Returns `None` for ordinary chat text.
pub fn parse_command(input: &str) -> Option<Result<SlashCommand, String>> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let parsed = match name {
        "model" => Ok(SlashCommand::Model(
            (!arg.is_empty()).then(|| arg.to_string()),
        )),
        "temp" | "temperature" => arg
            .parse::<f32>()
            .map(SlashCommand::Temperature)
            .map_err(|_| format!("Usage: /temp <0.0-1.0> (got '{}')", arg)),
        "tokens" | "max_tokens" => arg
            .parse::<u32>()
            .map(SlashCommand::MaxTokens)
            .map_err(|_| format!("Usage: /tokens <n> (got '{}')", arg)),
        "system" => {
            if arg.is_empty() {
                Err("Usage: /system <text>".to_string())
            } else {
                Ok(SlashCommand::System(arg.to_string()))
            }
        }
        "clear" => Ok(SlashCommand::Clear),
        "export" => Ok(SlashCommand::Export(
            (!arg.is_empty()).then(|| PathBuf::from(arg)),
        )),
        "help" => Ok(SlashCommand::Help),
        "quit" | "exit" => Ok(SlashCommand::Quit),
        other => Err(format!("Unknown command '/{}'. {}", other, HELP_TEXT)),
    };
    Some(parsed)
}

/// The known model after `current`, wrapping around.
pub fn next_model(current: &str) -> String {
    let next = SUPPORTED_MODELS
        .iter()
        .position(|m| *m == current)
        .map(|i| (i + 1) % SUPPORTED_MODELS.len())
        .unwrap_or(0);
    SUPPORTED_MODELS[next].to_string()
}

/// Turn a command into an action given the current view state.
pub fn command_action(
    command: SlashCommand,
    state: &TuiState,
    default_export: &std::path::Path,
) -> CommandAction {
    match command {
        SlashCommand::Model(model) => {
            let model = model.unwrap_or_else(|| next_model(&state.model));
            CommandAction::Send(UserEvent::Configure(ConfigUpdate::Model(model)))
        }
        SlashCommand::Temperature(t) => {
            CommandAction::Send(UserEvent::Configure(ConfigUpdate::Temperature(t)))
        }
        SlashCommand::MaxTokens(n) => {
            let (lo, hi) = MAX_TOKENS_RANGE;
            CommandAction::Send(UserEvent::Configure(ConfigUpdate::MaxTokens(
                n.clamp(lo, hi),
            )))
        }
        SlashCommand::System(text) => {
            CommandAction::Send(UserEvent::Configure(ConfigUpdate::SystemPrompt(text)))
        }
        SlashCommand::Clear => CommandAction::Send(UserEvent::Clear),
        SlashCommand::Export(path) => {
            if state.turn_count == 0 {
                CommandAction::Notice("Nothing to export yet".to_string())
            } else {
                let path = path.unwrap_or_else(|| default_export.to_path_buf());
                CommandAction::Send(UserEvent::Export(path))
            }
        }
        SlashCommand::Help => CommandAction::Notice(HELP_TEXT.to_string()),
        SlashCommand::Quit => CommandAction::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use crate::session::Configuration;
    use std::path::Path;

    fn state() -> TuiState {
        TuiState::new(&Configuration::from(&LlmConfig::default()))
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert!(parse_command("hello there").is_none());
        assert!(parse_command("what is 1/2?").is_none());
    }

    #[test]
    fn parses_settings_commands() {
        assert_eq!(
            parse_command("/temp 0.3"),
            Some(Ok(SlashCommand::Temperature(0.3)))
        );
        assert_eq!(
            parse_command("/tokens 200"),
            Some(Ok(SlashCommand::MaxTokens(200)))
        );
        assert_eq!(
            parse_command("/system  Answer like a pirate. "),
            Some(Ok(SlashCommand::System("Answer like a pirate.".to_string())))
        );
        assert_eq!(parse_command("/model"), Some(Ok(SlashCommand::Model(None))));
        assert_eq!(
            parse_command("/model gemma2-9b-it"),
            Some(Ok(SlashCommand::Model(Some("gemma2-9b-it".to_string()))))
        );
    }

    #[test]
    fn parses_action_commands() {
        assert_eq!(parse_command("/clear"), Some(Ok(SlashCommand::Clear)));
        assert_eq!(parse_command("/export"), Some(Ok(SlashCommand::Export(None))));
        assert_eq!(
            parse_command("/export out.json"),
            Some(Ok(SlashCommand::Export(Some(PathBuf::from("out.json")))))
        );
        assert_eq!(parse_command("/quit"), Some(Ok(SlashCommand::Quit)));
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert!(matches!(parse_command("/temp warm"), Some(Err(_))));
        assert!(matches!(parse_command("/tokens -5"), Some(Err(_))));
        assert!(matches!(parse_command("/system"), Some(Err(_))));
        let err = parse_command("/frobnicate").unwrap().unwrap_err();
        assert!(err.contains("Unknown command"));
    }

    #[test]
    fn next_model_cycles() {
        assert_eq!(next_model("llama-3.1-8b-instant"), "deepseek-r1-distill-llama-70b");
        assert_eq!(next_model("deepseek-r1-distill-llama-70b"), "gemma2-9b-it");
        assert_eq!(next_model("custom-model"), "deepseek-r1-distill-llama-70b");
    }

    #[test]
    fn tokens_are_clamped_to_slider_range() {
        let action = command_action(SlashCommand::MaxTokens(5000), &state(), Path::new("x.json"));
        assert!(matches!(
            action,
            CommandAction::Send(UserEvent::Configure(ConfigUpdate::MaxTokens(300)))
        ));
        let action = command_action(SlashCommand::MaxTokens(1), &state(), Path::new("x.json"));
        assert!(matches!(
            action,
            CommandAction::Send(UserEvent::Configure(ConfigUpdate::MaxTokens(50)))
        ));
    }

    #[test]
    fn export_requires_history() {
        let mut state = state();
        let action = command_action(SlashCommand::Export(None), &state, Path::new("x.json"));
        assert!(matches!(action, CommandAction::Notice(_)));

        state.turn_count = 2;
        let action = command_action(SlashCommand::Export(None), &state, Path::new("x.json"));
        match action {
            CommandAction::Send(UserEvent::Export(path)) => {
                assert_eq!(path, PathBuf::from("x.json"))
            }
            other => panic!("expected export event, got {:?}", other),
        }
    }
}
