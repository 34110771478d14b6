//! The completion gateway — rate limiting and response normalization.
//!
//! The gateway is the only path to the completion service. It enforces a
//! fixed minimum interval between outbound calls (a plain spacing rule, no
//! burst credit) and normalizes provider responses into the tagged outcome
//! the agent loop consumes.
//!
//! The interval wait and the request itself happen under one lock, so at
//! most one request is ever in flight per gateway instance.

use std::sync::Arc;
use std::time::Duration;

use studyclaw_core::error::ProviderError;
use studyclaw_core::message::{Conversation, Message};
use studyclaw_core::provider::{
    CompletionOutcome, CompletionRequest, CompletionResponse, Provider, ToolDefinition,
};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// A rate-limited front over a completion provider.
pub struct Gateway {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Gateway {
    /// Create a gateway over the given provider.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, min_interval: Duration) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// The provider behind this gateway.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Space the call out from the previous one, then dispatch it.
    async fn call(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "Rate limit: spacing out request");
                tokio::time::sleep(wait).await;
            }
        }
        *last_call = Some(Instant::now());

        self.provider.complete(request).await
    }

    /// One completion call over the full history, normalized into the
    /// tagged outcome. Any tool call in the response wins over
    /// accompanying text.
    pub async fn complete(
        &self,
        system: &str,
        conversation: &Conversation,
        tools: &[ToolDefinition],
    ) -> std::result::Result<CompletionOutcome, ProviderError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: system.to_string(),
            messages: conversation.messages.clone(),
            tools: tools.to_vec(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.call(request).await?;
        Ok(CompletionOutcome::from_message(&response.message))
    }

    /// A plain, tool-free completion over a single user message — the
    /// shape the compression step uses to obtain a summary.
    pub async fn summarize(
        &self,
        prompt: &str,
    ) -> std::result::Result<String, ProviderError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: String::new(),
            messages: vec![Message::user(prompt)],
            tools: Vec::new(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.call(request).await?;
        Ok(response.message.content)
    }
}
