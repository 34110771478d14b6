//! Date tool — today's date in a readable format.

use async_trait::async_trait;
use chrono::Local;
use studyclaw_core::error::ToolError;
use studyclaw_core::tool::Tool;

pub struct DateTool;

#[async_trait]
impl Tool for DateTool {
    fn name(&self) -> &str {
        "get_date"
    }

    fn description(&self) -> &str {
        "Get today's date in a readable format"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(
        &self,
        _arguments: serde_json::Value,
    ) -> std::result::Result<String, ToolError> {
        Ok(Local::now().format("%A, %B %d, %Y").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_definition() {
        let tool = DateTool;
        assert_eq!(tool.name(), "get_date");
        let schema = tool.parameters_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn returns_a_readable_date() {
        let output = DateTool.execute(serde_json::json!({})).await.unwrap();
        let year = Local::now().format("%Y").to_string();
        assert!(output.contains(&year));
        // "Weekday, Month DD, YYYY" has exactly two commas.
        assert_eq!(output.matches(',').count(), 2);
    }
}
