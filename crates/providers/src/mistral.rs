//! Stateless Mistral provider — OpenAI-compatible chat completions.
//!
//! Every call resends the full conversation history to
//! `/v1/chat/completions`. This is the portable baseline protocol; the
//! conversations adapter is the stateful alternative behind the same
//! trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use studyclaw_core::error::ProviderError;
use studyclaw_core::message::{Message, MessageToolCall, Role};
use studyclaw_core::provider::*;
use tracing::{debug, warn};

/// The Mistral chat-completions provider.
pub struct MistralProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl MistralProvider {
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
        }
    }

    /// Point the provider at a different base URL (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Convert our Message types to the wire format, with the system
    /// instruction prepended.
    fn to_api_messages(system: &str, messages: &[Message]) -> Vec<ApiMessage> {
        let mut api_messages = Vec::with_capacity(messages.len() + 1);
        if !system.is_empty() {
            api_messages.push(ApiMessage {
                role: "system".into(),
                content: Some(system.to_string()),
                tool_calls: None,
                tool_call_id: None,
            });
        }

        api_messages.extend(messages.iter().map(|m| ApiMessage {
            role: match m.role {
                Role::User => "user".into(),
                Role::Assistant => "assistant".into(),
                Role::System => "system".into(),
                Role::Tool => "tool".into(),
            },
            content: Some(m.content.clone()),
            tool_calls: if m.tool_calls.is_empty() {
                None
            } else {
                Some(
                    m.tool_calls
                        .iter()
                        .map(|tc| ApiToolCall {
                            id: tc.id.clone(),
                            r#type: "function".into(),
                            function: ApiFunction {
                                name: tc.name.clone(),
                                arguments: tc.arguments.clone(),
                            },
                        })
                        .collect(),
                )
            },
            tool_call_id: m.tool_call_id.clone(),
        }));

        api_messages
    }

    /// Convert tool definitions to the wire format.
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
impl Provider for MistralProvider {
    fn name(&self) -> &str {
        "mistral"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.system, &request.messages),
            "temperature": request.temperature,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        debug!(model = %request.model, messages = request.messages.len(), "Sending completion request");

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
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice =
            api_response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| ProviderError::ApiError {
                    status_code: 200,
                    message: "No choices in response".into(),
                })?;

        let tool_calls: Vec<MessageToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| MessageToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        let message = Message::assistant_with_calls(
            choice.message.content.unwrap_or_default(),
            tool_calls,
        );

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(CompletionResponse {
            message,
            model: api_response.model,
            usage,
        })
    }
}

// --- Wire format ---

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    r#type: String,
    function: ApiFunction,
}

#[derive(Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
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
struct ApiResponse {
    choices: Vec<ApiChoice>,
    model: String,
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_instruction_prepended() {
        let messages = vec![Message::user("hi")];
        let api = MistralProvider::to_api_messages("You are helpful.", &messages);
        assert_eq!(api.len(), 2);
        assert_eq!(api[0].role, "system");
        assert_eq!(api[0].content.as_deref(), Some("You are helpful."));
        assert_eq!(api[1].role, "user");
    }

    #[test]
    fn empty_system_instruction_omitted() {
        let messages = vec![Message::user("hi")];
        let api = MistralProvider::to_api_messages("", &messages);
        assert_eq!(api.len(), 1);
        assert_eq!(api[0].role, "user");
    }

    #[test]
    fn tool_call_messages_carry_wire_shape() {
        let messages = vec![
            Message::assistant_with_calls(
                "",
                vec![MessageToolCall {
                    id: "c1".into(),
                    name: "get_date".into(),
                    arguments: "{}".into(),
                }],
            ),
            Message::tool_result("c1", "2025-01-01"),
        ];
        let api = MistralProvider::to_api_messages("", &messages);

        let calls = api[0].tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].id, "c1");
        assert_eq!(calls[0].r#type, "function");
        assert_eq!(calls[0].function.name, "get_date");
        assert_eq!(api[1].role, "tool");
        assert_eq!(api[1].tool_call_id.as_deref(), Some("c1"));
    }

    #[test]
    fn response_parsing_with_tool_calls() {
        let raw = serde_json::json!({
            "model": "mistral-large-latest",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "c9",
                        "type": "function",
                        "function": { "name": "get_date", "arguments": "{}" }
                    }]
                }
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        });
        let parsed: ApiResponse = serde_json::from_value(raw).unwrap();
        let choice = &parsed.choices[0];
        assert!(choice.message.content.is_none());
        assert_eq!(
            choice.message.tool_calls.as_ref().unwrap()[0].function.name,
            "get_date"
        );
        assert_eq!(parsed.usage.unwrap().total_tokens, 15);
    }
}
