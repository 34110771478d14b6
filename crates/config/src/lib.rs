//! Configuration loading for studyclaw.
//!
//! Settings come from `~/.studyclaw/config.toml` with environment variable
//! overrides; every field has a default so a missing file is a working
//! setup (minus the API key). Prompt texts live in a separate
//! `prompts.yaml` next to the config, with built-in fallbacks.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Could not parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// The root configuration structure.
///
/// Maps directly to `~/.studyclaw/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider adapter: "mistral" (stateless) or "mistral-conversations"
    /// (stateful)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Override the provider base URL (proxies, test servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Conversation memory settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Path of the study statistics file (tools only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_file: Option<PathBuf>,

    /// Path of the prompts file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts_file: Option<PathBuf>,
}

fn default_provider() -> String {
    "mistral".into()
}
fn default_model() -> String {
    "mistral-large-latest".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            model: default_model(),
            api_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            memory: MemoryConfig::default(),
            agent: AgentConfig::default(),
            stats_file: None,
            prompts_file: None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("memory", &self.memory)
            .field("agent", &self.agent)
            .field("stats_file", &self.stats_file)
            .field("prompts_file", &self.prompts_file)
            .finish()
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

/// Conversation memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Path of the conversation log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Serialized size (KB) above which summarization triggers
    #[serde(default = "default_threshold_kb")]
    pub threshold_kb: usize,

    /// How many trailing messages survive compression
    #[serde(default = "default_keep_last_n")]
    pub keep_last_n: usize,
}

fn default_threshold_kb() -> usize {
    50
}
fn default_keep_last_n() -> usize {
    10
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            file: None,
            threshold_kb: default_threshold_kb(),
            keep_last_n: default_keep_last_n(),
        }
    }
}

impl MemoryConfig {
    /// The compression threshold in bytes.
    pub fn threshold_bytes(&self) -> usize {
        self.threshold_kb * 1024
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum gateway calls per user input (safety limit)
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Minimum spacing between completion requests, in milliseconds
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,
}

fn default_max_tool_rounds() -> u32 {
    8
}
fn default_min_request_interval_ms() -> u64 {
    1000
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
            min_request_interval_ms: default_min_request_interval_ms(),
        }
    }
}

impl AppConfig {
    /// The studyclaw configuration directory (`~/.studyclaw`).
    pub fn config_dir() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".studyclaw")
    }

    /// Load configuration from the default location plus environment
    /// overrides. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_dir().join("config.toml");
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("MISTRAL_API_KEY") {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }
        if self.api_key.is_none() {
            if let Ok(key) = std::env::var("STUDYCLAW_API_KEY") {
                if !key.is_empty() {
                    self.api_key = Some(key);
                }
            }
        }
        if let Ok(model) = std::env::var("STUDYCLAW_MODEL") {
            if !model.is_empty() {
                self.model = model;
            }
        }
        if let Ok(provider) = std::env::var("STUDYCLAW_PROVIDER") {
            if !provider.is_empty() {
                self.provider = provider;
            }
        }
    }

    /// The conversation log path.
    pub fn memory_path(&self) -> PathBuf {
        self.memory
            .file
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("memory.json"))
    }

    /// The study statistics file path.
    pub fn stats_path(&self) -> PathBuf {
        self.stats_file
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("stats.json"))
    }

    /// The prompts file path.
    pub fn prompts_path(&self) -> PathBuf {
        self.prompts_file
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("prompts.yaml"))
    }
}

/// Placeholder the summarization prompt must carry; the rendered
/// transcript is substituted for it.
pub const CONVERSATION_SLOT: &str = "{conversation}";

const DEFAULT_SYSTEM_PROMPT: &str = "\
You are studyclaw, a friendly and encouraging study coach. You help the user \
plan their learning, keep track of study goals and logged study time, and \
answer questions along the way.

You have access to tools: looking up today's date, writing files, and \
reading and updating the user's weekly study goal and study sessions. Use a \
tool whenever it gives a better answer than guessing; otherwise answer \
directly. Keep responses concise and concrete.";

const DEFAULT_SUMMARIZATION_PROMPT: &str = "\
Summarize the following conversation concisely. Preserve facts about the \
user, their study goals, logged study time, decisions made, and anything \
the assistant promised to remember. Write a compact paragraph.

{conversation}";

/// Prompt texts, loaded from `prompts.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompts {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_summarization_prompt")]
    pub summarization_prompt: String,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}
fn default_summarization_prompt() -> String {
    DEFAULT_SUMMARIZATION_PROMPT.into()
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            summarization_prompt: default_summarization_prompt(),
        }
    }
}

impl Prompts {
    /// Load prompts from a YAML file; a missing file yields the built-in
    /// texts, a broken one is warned about and also falls back.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };

        let mut prompts: Self = match serde_yaml::from_str(&content) {
            Ok(prompts) => prompts,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not parse prompts file, using defaults");
                return Self::default();
            }
        };

        if !prompts.summarization_prompt.contains(CONVERSATION_SLOT) {
            warn!(
                path = %path.display(),
                "Summarization prompt has no {} placeholder, using the default",
                CONVERSATION_SLOT
            );
            prompts.summarization_prompt = default_summarization_prompt();
        }

        prompts
    }

    /// Render the summarization request for a transcript.
    pub fn summarization_request(&self, transcript: &str) -> String {
        self.summarization_prompt
            .replace(CONVERSATION_SLOT, transcript)
    }
}
