//! Study time tools — log sessions and read back the current week.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use studyclaw_core::error::ToolError;
use studyclaw_core::tool::Tool;

use crate::stats::{StatsStore, StudySession, today, week_start};

/// Log a study session.
pub struct LogStudyTimeTool {
    store: StatsStore,
}

impl LogStudyTimeTool {
    pub fn new(store: StatsStore) -> Self {
        Self { store }
    }
}

#[derive(Deserialize)]
struct LogArgs {
    hours: f64,
    #[serde(default)]
    date: Option<String>,
}

#[async_trait]
impl Tool for LogStudyTimeTool {
    fn name(&self) -> &str {
        "log_study_time"
    }

    fn description(&self) -> &str {
        "Log study time in hours. The date defaults to today; pass YYYY-MM-DD to log a past session."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "hours": {
                    "type": "number",
                    "description": "How many hours were studied (decimals allowed)"
                },
                "date": {
                    "type": "string",
                    "description": "The session date as YYYY-MM-DD (defaults to today)"
                }
            },
            "required": ["hours"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<String, ToolError> {
        let args: LogArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        if !args.hours.is_finite() || args.hours <= 0.0 {
            return Ok("Error: hours must be a positive number".into());
        }

        let date = match args.date {
            Some(raw) => match raw.parse::<NaiveDate>() {
                Ok(date) => date,
                Err(_) => {
                    return Ok(format!(
                        "Error: invalid date '{raw}', expected YYYY-MM-DD"
                    ));
                }
            },
            None => today(),
        };

        let mut stats = self.store.load();
        stats.learning_sessions.push(StudySession {
            date,
            hours: args.hours,
            logged_at: Utc::now(),
        });

        self.store
            .save(&stats)
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        Ok(format!(
            "✓ Logged {} hours of study time for {date}.",
            args.hours
        ))
    }
}

/// Read back this week's study time.
pub struct GetStudyTimeTool {
    store: StatsStore,
}

impl GetStudyTimeTool {
    pub fn new(store: StatsStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetStudyTimeTool {
    fn name(&self) -> &str {
        "get_study_time"
    }

    fn description(&self) -> &str {
        "Get the study time logged in the current week, per session and in total"
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
        let stats = self.store.load();
        let monday = week_start(today());

        let mut sessions: Vec<&StudySession> = stats.sessions_in_week(monday).collect();
        if sessions.is_empty() {
            return Ok("No study time logged yet this week.".into());
        }
        sessions.sort_by_key(|s| s.date);

        let mut lines = vec!["This week's study time:".to_string()];
        let mut total = 0.0;
        for session in sessions {
            total += session.hours;
            lines.push(format!("- {}: {:.1} hours", session.date, session.hours));
        }
        lines.push(format!("Total: {total:.1} hours"));

        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn store_at(dir: &Path) -> StatsStore {
        StatsStore::new(dir.join("stats.json"))
    }

    #[tokio::test]
    async fn log_defaults_to_today() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());

        let output = LogStudyTimeTool::new(store.clone())
            .execute(serde_json::json!({"hours": 2.0}))
            .await
            .unwrap();

        assert!(output.contains('✓'));
        assert!(output.contains('2'));
        assert!(output.contains("hours"));

        let stats = store.load();
        assert_eq!(stats.learning_sessions.len(), 1);
        assert_eq!(stats.learning_sessions[0].date, today());
    }

    #[tokio::test]
    async fn log_accepts_an_explicit_date() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());

        let output = LogStudyTimeTool::new(store.clone())
            .execute(serde_json::json!({"hours": 1.5, "date": "2025-10-20"}))
            .await
            .unwrap();

        assert!(output.contains("1.5"));
        assert!(output.contains("2025-10-20"));
        assert_eq!(
            store.load().learning_sessions[0].date.to_string(),
            "2025-10-20"
        );
    }

    #[tokio::test]
    async fn log_rejects_malformed_dates() {
        let dir = tempfile::tempdir().unwrap();
        let output = LogStudyTimeTool::new(store_at(dir.path()))
            .execute(serde_json::json!({"hours": 1.0, "date": "next tuesday"}))
            .await
            .unwrap();
        assert!(output.starts_with("Error"));
    }

    #[tokio::test]
    async fn multiple_sessions_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());
        let tool = LogStudyTimeTool::new(store.clone());

        tool.execute(serde_json::json!({"hours": 1.0, "date": "2025-10-21"}))
            .await
            .unwrap();
        tool.execute(serde_json::json!({"hours": 2.0, "date": "2025-10-22"}))
            .await
            .unwrap();
        tool.execute(serde_json::json!({"hours": 0.5, "date": "2025-10-23"}))
            .await
            .unwrap();

        let stats = store.load();
        assert_eq!(stats.learning_sessions.len(), 3);
        assert!((stats.learning_sessions[1].hours - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn logging_preserves_goal_fields() {
        use crate::stats::StatsFile;

        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());
        store
            .save(&StatsFile {
                weekly_goal_hours: Some(5.0),
                goal_updated_at: Some(Utc::now()),
                goal_week_start: Some(week_start(today())),
                ..Default::default()
            })
            .unwrap();

        LogStudyTimeTool::new(store.clone())
            .execute(serde_json::json!({"hours": 2.0}))
            .await
            .unwrap();

        let stats = store.load();
        assert_eq!(stats.weekly_goal_hours, Some(5.0));
        assert_eq!(stats.learning_sessions.len(), 1);
    }

    #[tokio::test]
    async fn get_time_when_nothing_logged() {
        let dir = tempfile::tempdir().unwrap();
        let output = GetStudyTimeTool::new(store_at(dir.path()))
            .execute(serde_json::json!({}))
            .await
            .unwrap();
        assert!(output.contains("No study time logged yet"));
    }

    #[tokio::test]
    async fn get_time_lists_current_week_with_total() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());
        let log = LogStudyTimeTool::new(store.clone());

        let monday = week_start(today());
        let midweek = monday + chrono::Days::new(2);
        log.execute(serde_json::json!({"hours": 1.5, "date": monday.to_string()}))
            .await
            .unwrap();
        log.execute(serde_json::json!({"hours": 2.0, "date": midweek.to_string()}))
            .await
            .unwrap();

        let output = GetStudyTimeTool::new(store)
            .execute(serde_json::json!({}))
            .await
            .unwrap();

        assert!(output.contains("This week's study time"));
        assert!(output.contains(&monday.to_string()));
        assert!(output.contains(&midweek.to_string()));
        assert!(output.contains("1.5 hours"));
        assert!(output.contains("2.0 hours"));
        assert!(output.contains("Total: 3.5 hours"));
    }

    #[tokio::test]
    async fn get_time_filters_out_old_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());
        let log = LogStudyTimeTool::new(store.clone());

        let monday = week_start(today());
        let last_month = monday - chrono::Days::new(30);
        log.execute(serde_json::json!({"hours": 5.0, "date": last_month.to_string()}))
            .await
            .unwrap();
        log.execute(serde_json::json!({"hours": 2.0, "date": monday.to_string()}))
            .await
            .unwrap();

        let output = GetStudyTimeTool::new(store)
            .execute(serde_json::json!({}))
            .await
            .unwrap();

        assert!(output.contains("Total: 2.0 hours"));
        assert!(!output.contains(&last_month.to_string()));
    }
}
