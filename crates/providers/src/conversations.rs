//! Stateful Mistral provider — the conversations API with continuation.
//!
//! The server keeps the conversation; after the first call this adapter
//! uploads only the messages the server has not seen yet, referencing the
//! conversation id it got back. The agent loop hands over the full history
//! either way and cannot tell this adapter from the stateless one.
//!
//! The local history is append-only between calls, so "what the server has
//! not seen" is a suffix. When that stops being true — compression rewrote
//! the log — the adapter abandons the server-side conversation and resends
//! everything.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use studyclaw_core::error::ProviderError;
use studyclaw_core::message::{Message, MessageToolCall, Role};
use studyclaw_core::provider::*;
use tracing::{debug, warn};

/// The Mistral conversations provider.
pub struct ConversationsProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    session: Mutex<Option<Session>>,
}

/// Continuation state for one server-side conversation.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    /// Server-issued conversation id
    pub(crate) conversation_id: String,
    /// History length the server already covers: the messages we uploaded
    /// plus the reply the server appended
    pub(crate) server_len: usize,
    /// Signature of that reply, to verify the local history still extends
    /// the server's view (message ids are reassigned locally, content and
    /// call ids are stable)
    pub(crate) reply_content: String,
    pub(crate) reply_call_ids: Vec<String>,
}

/// What the next request must upload.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum UploadPlan {
    /// No usable continuation: start a fresh conversation with the full
    /// history
    Start,
    /// Continue the identified conversation with the suffix starting at
    /// `from`
    Append { conversation_id: String, from: usize },
}

/// Decide between continuing the server-side conversation and starting
/// over. Pure so the reset logic is testable without HTTP.
pub(crate) fn plan_upload(session: Option<&Session>, messages: &[Message]) -> UploadPlan {
    let Some(session) = session else {
        return UploadPlan::Start;
    };

    if messages.len() < session.server_len {
        return UploadPlan::Start;
    }

    let Some(reply) = messages.get(session.server_len - 1) else {
        return UploadPlan::Start;
    };

    let call_ids_match = reply.tool_calls.len() == session.reply_call_ids.len()
        && reply
            .tool_calls
            .iter()
            .zip(&session.reply_call_ids)
            .all(|(tc, id)| &tc.id == id);

    if reply.role == Role::Assistant
        && reply.content == session.reply_content
        && call_ids_match
    {
        UploadPlan::Append {
            conversation_id: session.conversation_id.clone(),
            from: session.server_len,
        }
    } else {
        UploadPlan::Start
    }
}

impl ConversationsProvider {
    /// Create a provider for the public Mistral API.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: "https://api.mistral.ai/v1".into(),
            api_key: api_key.into(),
            client,
            session: Mutex::new(None),
        }
    }

    /// Point the provider at a different base URL (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Convert messages to conversation inputs. Assistant turns that
    /// requested tools are replayed as their individual call entries.
    fn to_api_inputs(messages: &[Message]) -> Vec<ApiInput> {
        let mut inputs = Vec::with_capacity(messages.len());
        for message in messages {
            match message.role {
                Role::Tool => inputs.push(ApiInput::FunctionResult {
                    tool_call_id: message.tool_call_id.clone().unwrap_or_default(),
                    result: message.content.clone(),
                }),
                Role::Assistant if !message.tool_calls.is_empty() => {
                    if !message.content.is_empty() {
                        inputs.push(ApiInput::Message {
                            role: "assistant".into(),
                            content: message.content.clone(),
                        });
                    }
                    for tc in &message.tool_calls {
                        inputs.push(ApiInput::FunctionCall {
                            tool_call_id: tc.id.clone(),
                            name: tc.name.clone(),
                            arguments: tc.arguments.clone(),
                        });
                    }
                }
                _ => inputs.push(ApiInput::Message {
                    role: match message.role {
                        Role::User => "user".into(),
                        Role::Assistant => "assistant".into(),
                        _ => "system".into(),
                    },
                    content: message.content.clone(),
                }),
            }
        }
        inputs
    }

    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }
}

#[async_trait]
impl Provider for ConversationsProvider {
    fn name(&self) -> &str {
        "mistral-conversations"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let plan = {
            let session = self.session.lock().expect("session lock poisoned");
            plan_upload(session.as_ref(), &request.messages)
        };

        let (url, body) = match &plan {
            UploadPlan::Start => {
                debug!(messages = request.messages.len(), "Starting a conversation");
                let mut body = serde_json::json!({
                    "model": request.model,
                    "instructions": request.system,
                    "inputs": Self::to_api_inputs(&request.messages),
                    "store": true,
                });
                if !request.tools.is_empty() {
                    body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
                }
                (format!("{}/conversations", self.base_url), body)
            }
            UploadPlan::Append {
                conversation_id,
                from,
            } => {
                debug!(
                    conversation_id = %conversation_id,
                    suffix = request.messages.len() - from,
                    "Continuing a conversation"
                );
                let body = serde_json::json!({
                    "inputs": Self::to_api_inputs(&request.messages[*from..]),
                });
                (
                    format!("{}/conversations/{conversation_id}", self.base_url),
                    body,
                )
            }
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            // The server-side conversation may be gone; start over next call.
            *self.session.lock().expect("session lock poisoned") = None;
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiConversationResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        for output in api_response.outputs {
            match output.kind.as_str() {
                "message.output" => {
                    if let Some(text) = output.content {
                        content.push_str(&text);
                    }
                }
                "function.call" => tool_calls.push(MessageToolCall {
                    id: output.tool_call_id.unwrap_or_default(),
                    name: output.name.unwrap_or_default(),
                    arguments: output.arguments.unwrap_or_default(),
                }),
                other => debug!(kind = %other, "Ignoring conversation output entry"),
            }
        }

        let message = Message::assistant_with_calls(content, tool_calls);

        *self.session.lock().expect("session lock poisoned") = Some(Session {
            conversation_id: api_response.conversation_id,
            server_len: request.messages.len() + 1,
            reply_content: message.content.clone(),
            reply_call_ids: message.tool_calls.iter().map(|tc| tc.id.clone()).collect(),
        });

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(CompletionResponse {
            message,
            model: request.model,
            usage,
        })
    }
}

// --- Wire format ---

#[derive(Serialize)]
#[serde(tag = "type")]
enum ApiInput {
    #[serde(rename = "message.input")]
    Message { role: String, content: String },
    #[serde(rename = "function.call")]
    FunctionCall {
        tool_call_id: String,
        name: String,
        arguments: String,
    },
    #[serde(rename = "function.result")]
    FunctionResult { tool_call_id: String, result: String },
}

#[derive(Serialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Serialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Deserialize)]
struct ApiConversationResponse {
    conversation_id: String,
    outputs: Vec<ApiOutput>,
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ApiOutput {
    #[serde(rename = "type")]
    kind: String,
    content: Option<String>,
    tool_call_id: Option<String>,
    name: Option<String>,
    arguments: Option<String>,
}

#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
