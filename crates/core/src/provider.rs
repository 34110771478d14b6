//! Provider trait — the abstraction over the completion service.
//!
//! A Provider knows how to send a conversation to an LLM and get a
//! response back. The gateway calls `complete()` without knowing which
//! adapter is behind it: the stateless one resends the full history every
//! call, the stateful one tracks a server-side continuation — pure
//! polymorphism.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::{Message, MessageToolCall};

/// A single request to the completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "mistral-large-latest")
    pub model: String,

    /// The system instruction. Kept out of the message history so the
    /// persisted log stays portable across prompt edits.
    pub system: String,

    /// The full conversation history, in order
    pub messages: Vec<Message>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A tool definition sent to the LLM so it knows what tools it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated assistant message (text, tool calls, or both)
    pub message: Message,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The normalized result of one completion call, as seen by the agent loop.
///
/// Some protocol variants return a text fragment *and* tool calls in the
/// same response; the presence of any tool call is authoritative — the turn
/// is only final once a response carries zero tool calls.
#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    /// A final natural-language answer
    Answer(String),
    /// One or more requested tool invocations, with any accompanying text
    ToolCalls {
        content: String,
        calls: Vec<MessageToolCall>,
    },
}

impl CompletionOutcome {
    /// Normalize an assistant message into the tagged outcome.
    pub fn from_message(message: &Message) -> Self {
        if message.tool_calls.is_empty() {
            Self::Answer(message.content.clone())
        } else {
            Self::ToolCalls {
                content: message.content.clone(),
                calls: message.tool_calls.clone(),
            }
        }
    }
}

/// The core Provider trait.
///
/// Every completion-service adapter implements this. Implementations must
/// tolerate being handed the full history on every call; a stateful
/// adapter may upload only the part the server has not seen yet.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "mistral").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError>;
}
