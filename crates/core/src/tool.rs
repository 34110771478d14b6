//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world: look up
//! the date, write files, track study time. The registry owns every
//! registered tool and is the single dispatch point for the agent loop.
//!
//! Dispatch fails closed: whatever goes wrong — unknown name, malformed
//! arguments, an implementation error — the caller gets a descriptive
//! error *string*, never a panic or an `Err`. The consumer of tool output
//! is the language model itself, which distinguishes failure from success
//! by content.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// The core Tool trait.
///
/// Each tool implements this and deserializes the validated JSON value
/// into its own typed argument struct at the top of `execute`. Outcomes
/// the model is expected to handle (a file that cannot be written, a goal
/// not yet set) are returned as `Ok` text; `Err` is reserved for
/// conditions the tool cannot phrase itself.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "get_date").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given (already validated) arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<String, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// The agent loop uses this to:
/// 1. Get tool definitions to send to the LLM
/// 2. Look up and execute tools when the LLM requests them
///
/// Registration happens once at startup and the set is immutable
/// afterwards; schema and implementation live in the same object, so a
/// registration-time consistency check is enough to keep them agreeing.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool.
    ///
    /// Fails on a duplicate name or on a schema that does not describe a
    /// JSON object whose `required` entries all appear in `properties`.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> std::result::Result<(), ToolError> {
        let name = tool.name().to_string();

        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateName(name));
        }

        if let Err(reason) = check_schema(&tool.parameters_schema()) {
            return Err(ToolError::SchemaMismatch {
                tool_name: name,
                reason,
            });
        }

        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions (for sending to the LLM).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Execute a tool call and coerce the outcome to text.
    ///
    /// `raw_arguments` is the JSON-encoded argument object exactly as the
    /// completion service sent it. The arguments are validated against the
    /// tool's declared schema before the implementation runs.
    pub async fn dispatch(&self, name: &str, raw_arguments: &str) -> String {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = %name, "Unknown tool requested");
            return format!("Error: unknown tool '{name}'");
        };

        let raw = if raw_arguments.trim().is_empty() {
            "{}"
        } else {
            raw_arguments
        };
        let arguments: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => return format!("Error: invalid arguments for '{name}': {e}"),
        };

        if let Err(reason) = validate_arguments(&tool.parameters_schema(), &arguments) {
            return format!("Error: invalid arguments for '{name}': {reason}");
        }

        match tool.execute(arguments).await {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool execution failed");
                format!("Error executing {name}: {e}")
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that a parameter schema declares an object whose required keys
/// all exist in its properties.
fn check_schema(schema: &serde_json::Value) -> std::result::Result<(), String> {
    if schema.get("type").and_then(|t| t.as_str()) != Some("object") {
        return Err("parameter schema must declare type \"object\"".into());
    }

    let properties = match schema.get("properties") {
        Some(p) => p
            .as_object()
            .ok_or_else(|| "\"properties\" must be an object".to_string())?,
        None => return Err("parameter schema must declare \"properties\"".into()),
    };

    if let Some(required) = schema.get("required") {
        let required = required
            .as_array()
            .ok_or_else(|| "\"required\" must be an array".to_string())?;
        for key in required {
            let key = key
                .as_str()
                .ok_or_else(|| "\"required\" entries must be strings".to_string())?;
            if !properties.contains_key(key) {
                return Err(format!("required parameter '{key}' is not declared"));
            }
        }
    }

    Ok(())
}

/// Check that an argument value is an object carrying every required key.
fn validate_arguments(
    schema: &serde_json::Value,
    arguments: &serde_json::Value,
) -> std::result::Result<(), String> {
    let object = arguments
        .as_object()
        .ok_or_else(|| "arguments must be a JSON object".to_string())?;

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for key in required.iter().filter_map(|k| k.as_str()) {
            if !object.contains_key(key) {
                return Err(format!("missing required parameter '{key}'"));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
        ) -> std::result::Result<String, ToolError> {
            Ok(arguments["text"].as_str().unwrap_or("").to_string())
        }
    }

    /// A tool whose implementation always fails.
    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn name(&self) -> &str {
            "broken"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({ "type": "object", "properties": {}, "required": [] })
        }
        async fn execute(
            &self,
            _arguments: serde_json::Value,
        ) -> std::result::Result<String, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "broken".into(),
                reason: "simulated failure".into(),
            })
        }
    }

    fn registry_with_echo() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool)).unwrap();
        registry
    }

    #[test]
    fn registry_register_and_lookup() {
        let registry = registry_with_echo();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = registry_with_echo();
        let err = registry.register(Box::new(EchoTool)).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateName(name) if name == "echo"));
    }

    #[test]
    fn schema_missing_property_fails_registration() {
        struct BadSchemaTool;

        #[async_trait]
        impl Tool for BadSchemaTool {
            fn name(&self) -> &str {
                "bad"
            }
            fn description(&self) -> &str {
                "Declares a required parameter it never defines"
            }
            fn parameters_schema(&self) -> serde_json::Value {
                serde_json::json!({
                    "type": "object",
                    "properties": {},
                    "required": ["ghost"]
                })
            }
            async fn execute(
                &self,
                _arguments: serde_json::Value,
            ) -> std::result::Result<String, ToolError> {
                Ok(String::new())
            }
        }

        let mut registry = ToolRegistry::new();
        let err = registry.register(Box::new(BadSchemaTool)).unwrap_err();
        assert!(matches!(err, ToolError::SchemaMismatch { .. }));
    }

    #[test]
    fn registry_definitions() {
        let registry = registry_with_echo();
        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "echo");
    }

    #[tokio::test]
    async fn dispatch_executes_tool() {
        let registry = registry_with_echo();
        let output = registry
            .dispatch("echo", r#"{"text": "hello world"}"#)
            .await;
        assert_eq!(output, "hello world");
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_returns_error_string() {
        let registry = registry_with_echo();
        let output = registry.dispatch("frobnicate", "{}").await;
        assert!(output.contains("Error"));
        assert!(output.contains("frobnicate"));
    }

    #[tokio::test]
    async fn dispatch_missing_required_argument() {
        let registry = registry_with_echo();
        let output = registry.dispatch("echo", "{}").await;
        assert!(output.contains("Error"));
        assert!(output.contains("text"));
    }

    #[tokio::test]
    async fn dispatch_malformed_arguments() {
        let registry = registry_with_echo();
        let output = registry.dispatch("echo", "not json").await;
        assert!(output.contains("Error"));
    }

    #[tokio::test]
    async fn dispatch_empty_arguments_treated_as_object() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(BrokenTool)).unwrap();
        // Empty argument payloads arrive for zero-parameter tools.
        let output = registry.dispatch("broken", "").await;
        assert!(output.starts_with("Error executing broken"));
        assert!(output.contains("simulated failure"));
    }
}
