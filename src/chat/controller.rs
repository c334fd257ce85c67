// ABOUTME: Conversation controller — drives one turn: assemble, invoke, append, report.
// ABOUTME: Also runs the worker loop that serializes presenter events against the session.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::chat::client::CompletionClient;
use crate::error::ChatError;
use crate::prompt::build_prompt;
use crate::session::{
    ConfigUpdate, Configuration, ExportRecord, Role, Session, export_json, export_records,
    write_export,
};

/// Where the controller is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingInput,
    Assembling,
    Invoking,
    Appending,
    Failed,
}

/// Result of submitting one piece of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing stored, nothing sent.
    Ignored,
    /// The model answered; human and assistant turns were stored.
    Replied(String),
    /// The model answered with no text; only the human turn was stored.
    EmptyReply,
    /// The call failed; only the human turn was stored.
    Failed(String),
}

/// Orchestrates turns against the single session.
pub struct ConversationController {
    session: Session,
    client: Arc<dyn CompletionClient>,
    state: TurnState,
}

impl ConversationController {
    pub fn new(session: Session, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            session,
            client,
            state: TurnState::Idle,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    fn set_state(&mut self, next: TurnState) {
        debug!(from = ?self.state, to = ?next, "turn state");
        self.state = next;
    }

    /// Process one human message start to finish. Never returns an error:
    /// per-turn failures are reported through the outcome.
    pub async fn submit(&mut self, text: &str) -> TurnOutcome {
        self.set_state(TurnState::AwaitingInput);
        self.set_state(TurnState::Assembling);
        // Blank input is the only thing assembly rejects.
        let Ok(request) = build_prompt(self.session.store(), self.session.config(), text) else {
            debug!("blank input ignored");
            self.set_state(TurnState::Idle);
            return TurnOutcome::Ignored;
        };

        // Configuration snapshot for this call; later edits apply to the next turn.
        let config = self.session.config().clone();
        info!(
            model = %config.model_id,
            messages = request.messages.len(),
            chars = request.char_count(),
            "invoking model"
        );

        self.set_state(TurnState::Invoking);
        let result = self
            .client
            .complete(
                &request,
                &config.model_id,
                config.temperature,
                config.max_tokens,
            )
            .await;

        let outcome = match result {
            Ok(reply) => {
                self.set_state(TurnState::Appending);
                self.append(Role::Human, text);
                if reply.trim().is_empty() {
                    warn!("model returned an empty reply");
                    TurnOutcome::EmptyReply
                } else {
                    self.append(Role::Assistant, &reply);
                    TurnOutcome::Replied(reply)
                }
            }
            Err(e) => {
                self.set_state(TurnState::Failed);
                self.append(Role::Human, text);
                let message = match e {
                    ChatError::ModelInvocation { message } => message,
                    other => other.to_string(),
                };
                warn!(error = %message, "model invocation failed");
                TurnOutcome::Failed(message)
            }
        };

        self.set_state(TurnState::Idle);
        outcome
    }

    fn append(&mut self, role: Role, text: &str) {
        if let Err(e) = self.session.store_mut().append(role, text) {
            warn!(error = %e, "rejected turn");
        }
    }

    /// Apply a configuration change for the next turn.
    pub fn configure(&mut self, update: ConfigUpdate) -> Result<Configuration, ChatError> {
        self.session.apply(update).cloned()
    }

    pub fn clear(&mut self) {
        info!("clearing conversation");
        self.session.clear();
    }

    /// Serialize the conversation as it is right now.
    pub fn export_json(&self) -> Result<String, ChatError> {
        export_json(self.session.store())
    }

    /// Write the export file; returns the number of records.
    pub fn export_to(&self, path: &std::path::Path) -> Result<usize, ChatError> {
        write_export(self.session.store(), path)
    }
}

/// Events sent from the presenter to the controller.
#[derive(Debug)]
pub enum UserEvent {
    /// User submitted a chat message.
    Message(String),
    /// User changed a setting.
    Configure(ConfigUpdate),
    /// User asked to clear the conversation.
    Clear,
    /// User asked to export the conversation to a file.
    Export(PathBuf),
    /// User requested to quit.
    Quit,
}

/// Events sent from the controller back to the presenter.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// Complete assistant reply for the last message.
    Reply(String),
    EmptyReply,
    /// The model call failed.
    Error(String),
    /// The turn is finished; `history` is the stored conversation after it.
    Done { history: Vec<ExportRecord> },
    ConfigApplied(Configuration),
    ConfigRejected(String),
    Cleared,
    Exported { path: PathBuf, count: usize },
    ExportFailed(String),
}

/// Run the controller, handling presenter events one at a time until quit.
///
/// Events are processed strictly in order, so a turn always finishes before
/// the next message, clear, or export is looked at.
pub async fn run_controller_loop(
    mut controller: ConversationController,
    mut user_rx: mpsc::Receiver<UserEvent>,
    event_tx: mpsc::Sender<ControllerEvent>,
) -> ConversationController {
    while let Some(event) = user_rx.recv().await {
        let replies = match event {
            UserEvent::Quit => break,
            UserEvent::Message(text) => {
                let mut events = match controller.submit(&text).await {
                    TurnOutcome::Ignored => vec![],
                    TurnOutcome::Replied(reply) => vec![ControllerEvent::Reply(reply)],
                    TurnOutcome::EmptyReply => vec![ControllerEvent::EmptyReply],
                    TurnOutcome::Failed(message) => vec![ControllerEvent::Error(message)],
                };
                events.push(ControllerEvent::Done {
                    history: export_records(controller.session().store()),
                });
                events
            }
            UserEvent::Configure(update) => match controller.configure(update) {
                Ok(config) => vec![ControllerEvent::ConfigApplied(config)],
                Err(e) => vec![ControllerEvent::ConfigRejected(e.to_string())],
            },
            UserEvent::Clear => {
                controller.clear();
                vec![ControllerEvent::Cleared]
            }
            UserEvent::Export(path) => match controller.export_to(&path) {
                Ok(count) => {
                    info!(path = %path.display(), count, "exported conversation");
                    vec![ControllerEvent::Exported { path, count }]
                }
                Err(e) => vec![ControllerEvent::ExportFailed(e.to_string())],
            },
        };

        for reply in replies {
            if event_tx.send(reply).await.is_err() {
                return controller;
            }
        }
    }

    controller
}
