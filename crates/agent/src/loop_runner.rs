//! The agent reasoning loop implementation.

use std::sync::Arc;

use studyclaw_config::Prompts;
use studyclaw_core::error::Error;
use studyclaw_core::message::{Conversation, Message};
use studyclaw_core::provider::CompletionOutcome;
use studyclaw_core::tool::ToolRegistry;
use studyclaw_memory::ConversationStore;
use studyclaw_providers::Gateway;
use tracing::{debug, info, warn};

/// The answer returned when the round limit cuts a turn short.
const ROUND_LIMIT_MESSAGE: &str = "I've reached the maximum number of tool rounds for this \
request. Tell me how you'd like to continue and I'll pick it up from there.";

/// The core agent loop that orchestrates LLM calls and tool execution.
pub struct AgentLoop {
    /// The rate-limited completion gateway
    gateway: Gateway,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// Conversation persistence and compression
    store: ConversationStore,

    /// System and summarization prompts
    prompts: Prompts,

    /// Maximum gateway calls per user input
    max_tool_rounds: u32,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        gateway: Gateway,
        tools: Arc<ToolRegistry>,
        store: ConversationStore,
        prompts: Prompts,
        max_tool_rounds: u32,
    ) -> Self {
        Self {
            gateway,
            tools,
            store,
            prompts,
            max_tool_rounds,
        }
    }

    /// Process one user input and produce the assistant's answer.
    ///
    /// The user message is appended first and stays in the log even when
    /// the turn fails, so the next turn retries with full context. The log
    /// is persisted before this method returns on every path.
    pub async fn process(
        &self,
        conversation: &mut Conversation,
        user_input: &str,
    ) -> Result<String, Error> {
        info!(messages = conversation.len(), "Processing user input");
        conversation.push(Message::user(user_input));

        if let Err(e) = self.compress_if_needed(conversation).await {
            self.store.save(conversation);
            return Err(e);
        }

        let definitions = self.tools.definitions();

        for round in 1..=self.max_tool_rounds {
            debug!(round, "Agent loop round");

            let outcome = match self
                .gateway
                .complete(&self.prompts.system_prompt, conversation, &definitions)
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Surface the failure; the user message is not rolled
                    // back.
                    self.store.save(conversation);
                    return Err(e.into());
                }
            };

            match outcome {
                CompletionOutcome::Answer(text) => {
                    conversation.push(Message::assistant(text.as_str()));
                    self.store.save(conversation);
                    return Ok(text);
                }
                CompletionOutcome::ToolCalls { content, calls } => {
                    debug!(count = calls.len(), "Executing tool calls");
                    conversation.push(Message::assistant_with_calls(content, calls.clone()));

                    for call in &calls {
                        info!(tool = %call.name, "Executing tool");
                        let output = self.tools.dispatch(&call.name, &call.arguments).await;
                        conversation.push(Message::tool_result(&call.id, output));
                    }
                }
            }
        }

        warn!(
            rounds = self.max_tool_rounds,
            "Tool round limit reached, forcing a text response"
        );
        conversation.push(Message::assistant(ROUND_LIMIT_MESSAGE));
        self.store.save(conversation);
        Ok(ROUND_LIMIT_MESSAGE.to_string())
    }

    /// Compress the log when it has outgrown the threshold: ask the
    /// gateway for a summary of everything the retained tail will not
    /// cover, then rewrite the log as summary + tail.
    async fn compress_if_needed(&self, conversation: &mut Conversation) -> Result<(), Error> {
        if !self.store.should_compress(conversation)
            || conversation.len() <= self.store.retain_count()
        {
            return Ok(());
        }

        info!(
            bytes = self.store.size_bytes(conversation),
            "Memory threshold reached, summarizing conversation"
        );

        let transcript = self.store.transcript_before_tail(conversation);
        let request = self.prompts.summarization_request(&transcript);
        let summary = self.gateway.summarize(&request).await?;

        *conversation = self.store.compress(conversation, &summary);
        Ok(())
    }
}
