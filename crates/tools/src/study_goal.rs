//! Weekly study goal tools — set and read the goal in `stats.json`.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use studyclaw_core::error::ToolError;
use studyclaw_core::tool::Tool;

use crate::stats::{StatsStore, today, week_start};

/// Set (or replace) the weekly study goal.
pub struct SetStudyGoalTool {
    store: StatsStore,
}

impl SetStudyGoalTool {
    pub fn new(store: StatsStore) -> Self {
        Self { store }
    }
}

#[derive(Deserialize)]
struct SetGoalArgs {
    hours: f64,
}

#[async_trait]
impl Tool for SetStudyGoalTool {
    fn name(&self) -> &str {
        "set_study_goal"
    }

    fn description(&self) -> &str {
        "Set the weekly study goal in hours. Replaces any existing goal and marks the current week as the goal week."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "hours": {
                    "type": "number",
                    "description": "The weekly goal in hours"
                }
            },
            "required": ["hours"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<String, ToolError> {
        let args: SetGoalArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        if !args.hours.is_finite() || args.hours <= 0.0 {
            return Ok("Error: the goal must be a positive number of hours".into());
        }

        let mut stats = self.store.load();
        stats.weekly_goal_hours = Some(args.hours);
        stats.goal_updated_at = Some(Utc::now());
        stats.goal_week_start = Some(week_start(today()));

        self.store
            .save(&stats)
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        Ok(format!(
            "✓ Weekly study goal set to {} hours per week.",
            args.hours
        ))
    }
}

/// Read the current weekly study goal.
pub struct GetStudyGoalTool {
    store: StatsStore,
}

impl GetStudyGoalTool {
    pub fn new(store: StatsStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetStudyGoalTool {
    fn name(&self) -> &str {
        "get_study_goal"
    }

    fn description(&self) -> &str {
        "Get the current weekly study goal"
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
        match stats.weekly_goal_hours {
            Some(hours) => {
                let set_on = stats
                    .goal_updated_at
                    .map(|t| format!(" (set on {})", t.format("%Y-%m-%d")))
                    .unwrap_or_default();
                Ok(format!(
                    "Current weekly study goal: {hours} hours per week{set_on}."
                ))
            }
            None => Ok("No study goal set yet. Set one to start tracking progress.".into()),
        }
    }
}
