// ABOUTME: Chat module — remote completion client and the per-turn conversation controller.
// ABOUTME: The controller serializes turns; the client is the only suspending call.

pub mod client;
pub mod controller;
pub mod provider;

pub use client::{CompletionClient, GroqClient};
pub use controller::{
    ControllerEvent, ConversationController, TurnOutcome, TurnState, UserEvent,
    run_controller_loop,
};
pub use provider::create_client;
