//! Week rollover and progress tools.
//!
//! The goal-week marker in `stats.json` records the Monday of the week the
//! goal was set. Comparing it with the current week tells the agent when
//! to nudge the user towards a fresh goal; the progress report compares
//! logged hours with the goal.

use async_trait::async_trait;
use studyclaw_core::error::ToolError;
use studyclaw_core::tool::Tool;

use crate::stats::{StatsStore, today, week_start};

/// Report whether a new week has started since the goal was set.
pub struct WeekCheckTool {
    store: StatsStore,
}

impl WeekCheckTool {
    pub fn new(store: StatsStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for WeekCheckTool {
    fn name(&self) -> &str {
        "check_new_week"
    }

    fn description(&self) -> &str {
        "Check whether a new week has started since the weekly goal was set"
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
        if !self.store.exists() {
            return Ok(
                "No data available. Set your first weekly study goal to get started.".into(),
            );
        }

        let stats = self.store.load();
        let (Some(goal), Some(goal_week)) = (stats.weekly_goal_hours, stats.goal_week_start)
        else {
            return Ok("No weekly goal set yet. Set one to start the week.".into());
        };

        let current_week = week_start(today());
        if current_week == goal_week {
            Ok(format!(
                "Week Status: Current Week. You're still in the same week your goal was set. \
                 Goal: {goal:.1} hours per week. Keep working towards your goal!"
            ))
        } else {
            Ok(format!(
                "Week Status: New Week! A new week has started since you set your goal \
                 (week of {goal_week}). Time to set a fresh weekly goal."
            ))
        }
    }
}

/// Compare this week's logged hours against the goal.
pub struct StudyProgressTool {
    store: StatsStore,
}

impl StudyProgressTool {
    pub fn new(store: StatsStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for StudyProgressTool {
    fn name(&self) -> &str {
        "study_progress"
    }

    fn description(&self) -> &str {
        "Compare this week's logged study time against the weekly goal"
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
        if !self.store.exists() {
            return Ok("No data available. Please set a weekly goal first.".into());
        }

        let stats = self.store.load();
        let Some(goal) = stats.weekly_goal_hours else {
            return Ok("No weekly goal set yet. Please set a goal first.".into());
        };

        let monday = week_start(today());
        let actual = stats.hours_in_week(monday);
        let percent = if goal > 0.0 { actual / goal * 100.0 } else { 0.0 };

        let mut lines = vec![
            "Progress Report".to_string(),
            format!("Weekly Goal: {goal:.1} hours"),
            format!("Actual Time: {actual:.1} hours"),
            format!("Progress: {percent:.1}%"),
        ];

        if percent >= 100.0 {
            lines.push("Goal exceeded! Amazing work 🌟".into());
        } else if percent >= 70.0 {
            lines.push("On track, keep it up! 👍".into());
        } else if actual > 0.0 {
            lines.push(format!(
                "Behind the goal. You need {:.1} more hours this week.",
                goal - actual
            ));
        } else {
            lines.push("Significantly behind. No sessions logged this week yet.".into());
        }

        Ok(lines.join("\n"))
    }
}
