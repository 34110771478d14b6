//! End-to-end integration tests: a scripted provider drives the real
//! agent loop, tool registry, and file-backed persistence together.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use studyclaw_agent::AgentLoop;
use studyclaw_config::Prompts;
use studyclaw_core::error::ProviderError;
use studyclaw_core::message::{Message, MessageToolCall, Role};
use studyclaw_core::provider::{CompletionRequest, CompletionResponse, Provider};
use studyclaw_memory::ConversationStore;
use studyclaw_providers::Gateway;
use studyclaw_tools::StatsStore;

/// Replays a fixed sequence of assistant messages.
struct ScriptedProvider {
    script: Mutex<VecDeque<Message>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<Message>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let message = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::NotConfigured("script exhausted".into()))?;
        Ok(CompletionResponse {
            message,
            model: "test-model".into(),
            usage: None,
        })
    }
}

fn agent_for(
    replies: Vec<Message>,
    memory_path: &Path,
    stats_path: &Path,
) -> (AgentLoop, ConversationStore) {
    let store = ConversationStore::new(memory_path, 50 * 1024, 10);
    let gateway = Gateway::new(
        Arc::new(ScriptedProvider::new(replies)),
        "test-model",
        Duration::ZERO,
    );
    let tools = Arc::new(studyclaw_tools::default_registry(stats_path).unwrap());
    let agent = AgentLoop::new(
        gateway,
        tools,
        store.clone(),
        Prompts::default(),
        8,
    );
    (agent, store)
}

#[tokio::test]
async fn a_tool_turn_updates_the_stats_file_and_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let memory_path = dir.path().join("memory.json");
    let stats_path = dir.path().join("stats.json");

    let (agent, store) = agent_for(
        vec![
            Message::assistant_with_calls(
                "",
                vec![MessageToolCall {
                    id: "c1".into(),
                    name: "set_study_goal".into(),
                    arguments: r#"{"hours": 5}"#.into(),
                }],
            ),
            Message::assistant("Your weekly goal is set to 5 hours. Good luck!"),
        ],
        &memory_path,
        &stats_path,
    );

    let mut conversation = store.load();
    assert!(conversation.is_empty());

    let answer = agent
        .process(&mut conversation, "set my weekly goal to 5 hours")
        .await
        .unwrap();
    assert!(answer.contains("5 hours"));

    // The full round landed in the log: user, assistant-with-call,
    // tool result, final answer.
    assert_eq!(conversation.len(), 4);
    assert_eq!(conversation.messages[2].role, Role::Tool);
    assert!(conversation.messages[2].content.contains('✓'));

    // The tool really wrote the stats file.
    let stats = StatsStore::new(&stats_path).load();
    assert_eq!(stats.weekly_goal_hours, Some(5.0));
    assert!(stats.goal_week_start.is_some());

    // And the log really hit the disk.
    let persisted = store.load();
    assert_eq!(persisted.len(), 4);
}

#[tokio::test]
async fn history_survives_a_session_restart() {
    let dir = tempfile::tempdir().unwrap();
    let memory_path = dir.path().join("memory.json");
    let stats_path = dir.path().join("stats.json");

    // First session.
    {
        let (agent, store) = agent_for(
            vec![Message::assistant("Nice to meet you, Sam!")],
            &memory_path,
            &stats_path,
        );
        let mut conversation = store.load();
        agent
            .process(&mut conversation, "Hi, I'm Sam.")
            .await
            .unwrap();
    }

    // Second session: a fresh agent over the same files sees the history.
    let (agent, store) = agent_for(
        vec![Message::assistant("You told me your name is Sam.")],
        &memory_path,
        &stats_path,
    );
    let mut conversation = store.load();
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation.messages[0].content, "Hi, I'm Sam.");

    let answer = agent
        .process(&mut conversation, "What's my name?")
        .await
        .unwrap();
    assert!(answer.contains("Sam"));
    assert_eq!(store.load().len(), 4);
}

#[tokio::test]
async fn an_unknown_tool_request_still_reaches_an_answer() {
    let dir = tempfile::tempdir().unwrap();

    let (agent, store) = agent_for(
        vec![
            Message::assistant_with_calls(
                "",
                vec![MessageToolCall {
                    id: "c1".into(),
                    name: "frobnicate".into(),
                    arguments: "{}".into(),
                }],
            ),
            Message::assistant("Sorry, I can't do that."),
        ],
        &dir.path().join("memory.json"),
        &dir.path().join("stats.json"),
    );

    let mut conversation = store.load();
    let answer = agent.process(&mut conversation, "frob it").await.unwrap();

    assert_eq!(answer, "Sorry, I can't do that.");
    assert!(conversation.messages[2].content.contains("Error"));
}
