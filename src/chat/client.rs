// ABOUTME: Completion client — the remote model boundary the controller depends on.
// ABOUTME: Groq implementation speaks the OpenAI-compatible chat completions API over reqwest.

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::prompt::PromptRequest;
use crate::session::Role;

/// Sends an assembled request to a remote model and returns the generated text.
///
/// One call is one attempt. Every failure (network, auth, rate limit,
/// malformed body) comes back as `ChatError::ModelInvocation`.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        request: &PromptRequest,
        model_id: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String>;
}

/// Client for Groq's OpenAI-compatible endpoint.
pub struct GroqClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.groq.com/openai".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    content: Option<String>,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::Human => "user",
        Role::Assistant => "assistant",
    }
}

fn wire_request<'a>(
    request: &'a PromptRequest,
    model_id: &'a str,
    temperature: f32,
    max_tokens: u32,
) -> WireRequest<'a> {
    WireRequest {
        model: model_id,
        messages: request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: wire_role(m.role),
                content: &m.content,
            })
            .collect(),
        temperature,
        max_tokens,
    }
}

/// Extract the generated text from a response body.
fn parse_response(body: &str) -> Result<String> {
    let response: WireResponse = serde_json::from_str(body)
        .map_err(|e| ChatError::model(format!("failed to parse response: {e}")))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::model("response contained no choices"))?;
    Ok(choice.message.content.unwrap_or_default())
}

#[async_trait::async_trait]
impl CompletionClient for GroqClient {
    async fn complete(
        &self,
        request: &PromptRequest,
        model_id: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let body = wire_request(request, model_id, temperature, max_tokens);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::model(format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ChatError::model(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(ChatError::model(format!("API error ({status}): {text}")));
        }

        parse_response(&text)
    }
}
