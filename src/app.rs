// ABOUTME: App orchestrator — wires the session, completion client, controller task, and TUI.
// ABOUTME: Runs the terminal event loop, or a single prompt without the TUI.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, Event, EventStream};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::chat::{
    CompletionClient, ControllerEvent, ConversationController, TurnOutcome, UserEvent,
    run_controller_loop,
};
use crate::config::UiConfig;
use crate::session::{Configuration, Session};
use crate::tui::commands::{CommandAction, command_action};
use crate::tui::input::{InputResult, handle_key};
use crate::tui::state::{ChatMessageKind, TuiState};
use crate::tui::ui;

/// How long quitting waits for an in-flight request before abandoning it.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Top-level application that owns startup configuration and the client.
pub struct App {
    config: Configuration,
    ui: UiConfig,
    client: Arc<dyn CompletionClient>,
}

/// Whether the event loop should keep going.
#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

impl App {
    pub fn new(config: Configuration, ui: UiConfig, client: Arc<dyn CompletionClient>) -> Self {
        Self { config, ui, client }
    }

    /// Run the application: start the controller task and drive the TUI until quit.
    pub async fn run(self) -> anyhow::Result<()> {
        let session = Session::new(self.config.clone())?;
        let controller = ConversationController::new(session, self.client.clone());

        let (user_tx, user_rx) = mpsc::channel::<UserEvent>(16);
        let (event_tx, mut event_rx) = mpsc::channel::<ControllerEvent>(64);
        let controller_handle = tokio::spawn(run_controller_loop(controller, user_rx, event_tx));

        let mut state = TuiState::new(&self.config);
        state.push_message(
            ChatMessageKind::System,
            format!("Model {} ready. Type a message, or /help.", self.config.model_id),
        );

        let session_start = Instant::now();
        let mut terminal = ratatui::init();
        let _ = crossterm::execute!(std::io::stdout(), EnableBracketedPaste);

        let result = event_loop(&mut terminal, &mut state, &user_tx, &mut event_rx, &self.ui).await;

        let _ = crossterm::execute!(std::io::stdout(), DisableBracketedPaste);
        ratatui::restore();

        stop_controller(user_tx, controller_handle, SHUTDOWN_GRACE).await;

        if result.is_ok() {
            print_exit_screen(&state, session_start);
        }
        result
    }

    /// Run one turn without the TUI and print the reply.
    pub async fn run_single_prompt(self, prompt: &str) -> anyhow::Result<()> {
        let session = Session::new(self.config)?;
        let mut controller = ConversationController::new(session, self.client);

        match controller.submit(prompt).await {
            TurnOutcome::Replied(reply) => {
                println!("{}", reply);
                Ok(())
            }
            TurnOutcome::EmptyReply => Ok(()),
            TurnOutcome::Ignored => anyhow::bail!("prompt is empty"),
            TurnOutcome::Failed(message) => anyhow::bail!("Model error: {}", message),
        }
    }
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    state: &mut TuiState,
    user_tx: &mpsc::Sender<UserEvent>,
    event_rx: &mut mpsc::Receiver<ControllerEvent>,
    ui_config: &UiConfig,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(ui_config.tick_millis.max(1)));

    loop {
        terminal.draw(|frame| ui::render(frame, state))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => {
                    if handle_terminal_event(state, event, user_tx, &ui_config.export_path).await
                        == Flow::Quit
                    {
                        break;
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(event) = event_rx.recv() => apply_controller_event(state, event),
            _ = tick.tick(), if state.is_revealing() => {
                state.advance_reveal(ui_config.reveal_chars_per_tick);
            }
        }
    }

    Ok(())
}

async fn handle_terminal_event(
    state: &mut TuiState,
    event: Event,
    user_tx: &mpsc::Sender<UserEvent>,
    default_export: &Path,
) -> Flow {
    match event {
        Event::Key(key) => match handle_key(state, key) {
            InputResult::None => Flow::Continue,
            InputResult::Quit => Flow::Quit,
            InputResult::Send(text) => {
                // Echo the question before the remote call starts.
                state.finish_reveal();
                state.push_message(ChatMessageKind::User, text.clone());
                state.busy = true;
                send(user_tx, UserEvent::Message(text)).await
            }
            InputResult::Command(Err(message)) => {
                state.push_message(ChatMessageKind::System, message);
                Flow::Continue
            }
            InputResult::Command(Ok(command)) => {
                match command_action(command, state, default_export) {
                    CommandAction::Send(event) => {
                        state.finish_reveal();
                        send(user_tx, event).await
                    }
                    CommandAction::Notice(message) => {
                        state.push_message(ChatMessageKind::System, message);
                        Flow::Continue
                    }
                    CommandAction::Quit => Flow::Quit,
                }
            }
        },
        Event::Paste(text) if !state.busy => {
            state.insert_str_at_cursor(&text);
            Flow::Continue
        }
        _ => Flow::Continue,
    }
}

/// Ask the controller to stop and wait up to `grace` for it. A request still
/// in flight is abandoned. Returns true if the controller exited on its own.
async fn stop_controller(
    user_tx: mpsc::Sender<UserEvent>,
    mut handle: JoinHandle<ConversationController>,
    grace: Duration,
) -> bool {
    // try_send: a controller stuck mid-turn may have a full queue.
    let _ = user_tx.try_send(UserEvent::Quit);
    drop(user_tx);

    match tokio::time::timeout(grace, &mut handle).await {
        Ok(_) => true,
        Err(_) => {
            tracing::warn!("request still in flight at exit; abandoning it");
            handle.abort();
            false
        }
    }
}

/// Forward an event to the controller; a closed channel ends the app.
async fn send(user_tx: &mpsc::Sender<UserEvent>, event: UserEvent) -> Flow {
    if user_tx.send(event).await.is_err() {
        tracing::warn!("controller stopped; exiting");
        return Flow::Quit;
    }
    Flow::Continue
}

/// Reflect a controller event in the view.
pub fn apply_controller_event(state: &mut TuiState, event: ControllerEvent) {
    match event {
        ControllerEvent::Reply(text) => state.start_reveal(&text),
        ControllerEvent::EmptyReply => state.push_message(
            ChatMessageKind::System,
            "The model returned an empty reply".to_string(),
        ),
        ControllerEvent::Error(message) => state.push_message(ChatMessageKind::Error, message),
        ControllerEvent::Done { history } => {
            state.busy = false;
            state.sync_history(&history);
        }
        ControllerEvent::ConfigApplied(config) => {
            let notice = if config.system_prompt != state.system_prompt {
                "System prompt updated; applies from the next message".to_string()
            } else {
                format!(
                    "Settings: {} · temp {:.2} · max {} tokens",
                    config.model_id, config.temperature, config.max_tokens
                )
            };
            state.sync_config(&config);
            state.push_message(ChatMessageKind::System, notice);
        }
        ControllerEvent::ConfigRejected(message) => {
            state.push_message(ChatMessageKind::System, message)
        }
        ControllerEvent::Cleared => {
            state.clear_messages();
            state.push_message(ChatMessageKind::System, "Chat cleared".to_string());
        }
        ControllerEvent::Exported { path, count } => state.push_message(
            ChatMessageKind::System,
            format!("Exported {} messages to {}", count, path.display()),
        ),
        ControllerEvent::ExportFailed(message) => state.push_message(
            ChatMessageKind::System,
            format!("Export failed: {}", message),
        ),
    }
}

/// Print a farewell line after the TUI exits.
fn print_exit_screen(state: &TuiState, session_start: Instant) {
    let elapsed_secs = session_start.elapsed().as_secs();
    let elapsed = format!("{}m {:02}s", elapsed_secs / 60, elapsed_secs % 60);
    println!();
    println!(
        "  💬 Session lasted {elapsed} with {} messages exchanged.",
        state.turn_count
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use crate::prompt::PromptRequest;
    use crate::session::ExportRecord;
    use std::path::PathBuf;

    /// Client whose calls never resolve.
    struct PendingClient;

    #[async_trait::async_trait]
    impl CompletionClient for PendingClient {
        async fn complete(
            &self,
            _request: &PromptRequest,
            _model_id: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> crate::error::Result<String> {
            std::future::pending().await
        }
    }

    fn record(role: &str, text: &str) -> ExportRecord {
        ExportRecord {
            role: role.to_string(),
            text: text.to_string(),
        }
    }

    fn spawn_controller(
        client: Arc<dyn CompletionClient>,
    ) -> (mpsc::Sender<UserEvent>, JoinHandle<ConversationController>) {
        let session = Session::new(Configuration::from(&LlmConfig::default())).unwrap();
        let controller = ConversationController::new(session, client);
        let (user_tx, user_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(16);
        // Keep the receiver alive for the lifetime of the loop.
        let handle = tokio::spawn(async move {
            let _event_rx = event_rx;
            run_controller_loop(controller, user_rx, event_tx).await
        });
        (user_tx, handle)
    }

    fn state() -> TuiState {
        TuiState::new(&Configuration::from(&LlmConfig::default()))
    }

    #[test]
    fn done_clears_busy_and_updates_count() {
        let mut state = state();
        state.busy = true;
        apply_controller_event(
            &mut state,
            ControllerEvent::Done {
                history: vec![record("user", "2+2?"), record("assistant", "4")],
            },
        );
        assert!(!state.busy);
        assert_eq!(state.turn_count, 2);
        assert_eq!(state.messages[1].content, "4");
    }

    #[test]
    fn error_shows_only_for_its_turn() {
        let mut state = state();
        state.push_message(ChatMessageKind::User, "ping".to_string());
        apply_controller_event(&mut state, ControllerEvent::Error("down".to_string()));
        apply_controller_event(
            &mut state,
            ControllerEvent::Done {
                history: vec![record("user", "ping")],
            },
        );
        assert_eq!(state.messages[1].kind, ChatMessageKind::Error);

        state.push_message(ChatMessageKind::User, "ping again".to_string());
        apply_controller_event(&mut state, ControllerEvent::Reply("pong".to_string()));
        apply_controller_event(
            &mut state,
            ControllerEvent::Done {
                history: vec![
                    record("user", "ping"),
                    record("user", "ping again"),
                    record("assistant", "pong"),
                ],
            },
        );
        state.finish_reveal();

        assert!(
            state
                .messages
                .iter()
                .all(|m| m.kind != ChatMessageKind::Error)
        );
        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.messages[2].content, "pong");
    }

    #[tokio::test]
    async fn quit_abandons_a_request_that_never_resolves() {
        let (user_tx, handle) = spawn_controller(Arc::new(PendingClient));
        user_tx
            .send(UserEvent::Message("hi".to_string()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let stopped = tokio::time::timeout(
            Duration::from_secs(2),
            stop_controller(user_tx, handle, Duration::from_millis(100)),
        )
        .await;
        assert_eq!(stopped, Ok(false), "shutdown waited on the pending request");
    }

    #[tokio::test]
    async fn quit_stops_an_idle_controller_cleanly() {
        let (user_tx, handle) = spawn_controller(Arc::new(PendingClient));
        assert!(stop_controller(user_tx, handle, Duration::from_secs(2)).await);
    }

    #[test]
    fn reply_is_revealed_progressively() {
        let mut state = state();
        apply_controller_event(&mut state, ControllerEvent::Reply("four".to_string()));
        assert!(state.is_revealing());
        assert_eq!(state.messages[0].content, "");
        state.advance_reveal(100);
        assert_eq!(state.messages[0].content, "four");
    }

    #[test]
    fn error_is_shown_for_the_turn() {
        let mut state = state();
        apply_controller_event(&mut state, ControllerEvent::Error("401".to_string()));
        assert_eq!(state.messages[0].kind, ChatMessageKind::Error);
        assert_eq!(state.messages[0].content, "401");
    }

    #[test]
    fn cleared_resets_view() {
        let mut state = state();
        state.push_message(ChatMessageKind::User, "hi".to_string());
        state.turn_count = 1;
        apply_controller_event(&mut state, ControllerEvent::Cleared);
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].kind, ChatMessageKind::System);
        assert_eq!(state.turn_count, 0);
    }

    #[test]
    fn config_applied_syncs_status() {
        let mut state = state();
        let mut config = Configuration::from(&LlmConfig::default());
        config.temperature = 0.2;
        apply_controller_event(&mut state, ControllerEvent::ConfigApplied(config));
        assert_eq!(state.temperature, 0.2);
        assert!(state.messages[0].content.contains("temp 0.20"));
    }

    #[test]
    fn exported_reports_path() {
        let mut state = state();
        apply_controller_event(
            &mut state,
            ControllerEvent::Exported {
                path: PathBuf::from("chat_history.json"),
                count: 2,
            },
        );
        assert_eq!(
            state.messages[0].content,
            "Exported 2 messages to chat_history.json"
        );
    }

    #[tokio::test]
    async fn sending_echoes_before_controller_replies() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        let mut state = state();
        let (user_tx, mut user_rx) = mpsc::channel(4);
        state.input = "2+2?".to_string();
        state.cursor_pos = 4;

        let flow = handle_terminal_event(
            &mut state,
            Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            &user_tx,
            Path::new("chat_history.json"),
        )
        .await;

        assert_eq!(flow, Flow::Continue);
        assert!(state.busy);
        assert_eq!(state.messages[0].kind, ChatMessageKind::User);
        assert_eq!(state.messages[0].content, "2+2?");
        match user_rx.recv().await {
            Some(UserEvent::Message(text)) => assert_eq!(text, "2+2?"),
            other => panic!("expected message event, got {:?}", other),
        }
    }
}
