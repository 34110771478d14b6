//! File write tool — write text to a file.
//!
//! Failures the model should reason about (bad path, permissions) come
//! back as "Error ..." text rather than as errors; the registry's contract
//! is that every tool outcome is a string.

use async_trait::async_trait;
use serde::Deserialize;
use studyclaw_core::error::ToolError;
use studyclaw_core::tool::Tool;

pub struct WriteToFileTool;

#[derive(Deserialize)]
struct Args {
    filename: String,
    content: String,
}

#[async_trait]
impl Tool for WriteToFileTool {
    fn name(&self) -> &str {
        "write_to_file"
    }

    fn description(&self) -> &str {
        "Write content to a file in the current directory"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "The name of the file to write to"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write to the file"
                }
            },
            "required": ["filename", "content"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<String, ToolError> {
        let args: Args = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        match tokio::fs::write(&args.filename, &args.content).await {
            Ok(()) => Ok(format!("Successfully wrote to {}", args.filename)),
            Err(e) => Ok(format!("Error writing to file: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_definition() {
        let tool = WriteToFileTool;
        assert_eq!(tool.name(), "write_to_file");
        let schema = tool.parameters_schema();
        assert_eq!(
            schema["required"],
            serde_json::json!(["filename", "content"])
        );
    }

    #[tokio::test]
    async fn write_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");

        let output = WriteToFileTool
            .execute(serde_json::json!({
                "filename": path.to_str().unwrap(),
                "content": "Review chapter 3"
            }))
            .await
            .unwrap();

        assert!(output.contains("Successfully wrote to"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Review chapter 3"
        );
    }

    #[tokio::test]
    async fn overwrite_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "old").unwrap();

        WriteToFileTool
            .execute(serde_json::json!({
                "filename": path.to_str().unwrap(),
                "content": "new"
            }))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[tokio::test]
    async fn unwritable_path_reports_error_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("notes.txt");

        let output = WriteToFileTool
            .execute(serde_json::json!({
                "filename": path.to_str().unwrap(),
                "content": "text"
            }))
            .await
            .unwrap();

        assert!(output.starts_with("Error writing to file"));
    }
}
