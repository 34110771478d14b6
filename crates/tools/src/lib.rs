//! Built-in tool implementations for studyclaw.
//!
//! Tools give the agent its hands: looking up the date, writing files, and
//! tracking weekly study goals and logged study time in `stats.json`.

pub mod date;
pub mod file_write;
pub mod stats;
pub mod study_goal;
pub mod study_time;
pub mod study_week;

use std::path::Path;

use studyclaw_core::error::ToolError;
use studyclaw_core::tool::ToolRegistry;

pub use stats::{StatsFile, StatsStore, StudySession};

/// Create the default tool registry, with the study-tracking tools bound
/// to the given statistics file.
pub fn default_registry(stats_path: &Path) -> Result<ToolRegistry, ToolError> {
    let store = StatsStore::new(stats_path);

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(date::DateTool))?;
    registry.register(Box::new(file_write::WriteToFileTool))?;
    registry.register(Box::new(study_goal::SetStudyGoalTool::new(store.clone())))?;
    registry.register(Box::new(study_goal::GetStudyGoalTool::new(store.clone())))?;
    registry.register(Box::new(study_time::LogStudyTimeTool::new(store.clone())))?;
    registry.register(Box::new(study_time::GetStudyTimeTool::new(store.clone())))?;
    registry.register(Box::new(study_week::WeekCheckTool::new(store.clone())))?;
    registry.register(Box::new(study_week::StudyProgressTool::new(store)))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_tools() {
        let dir = tempfile::tempdir().unwrap();
        let registry = default_registry(&dir.path().join("stats.json")).unwrap();

        let mut names = registry.names();
        names.sort();
        assert_eq!(
            names,
            vec![
                "check_new_week",
                "get_date",
                "get_study_goal",
                "get_study_time",
                "log_study_time",
                "set_study_goal",
                "study_progress",
                "write_to_file",
            ]
        );
    }

    #[tokio::test]
    async fn registry_dispatches_study_tools_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let registry = default_registry(&dir.path().join("stats.json")).unwrap();

        let output = registry
            .dispatch("set_study_goal", r#"{"hours": 5}"#)
            .await;
        assert!(output.contains('✓'));

        let output = registry
            .dispatch("log_study_time", r#"{"hours": 2.5}"#)
            .await;
        assert!(output.contains("2.5"));

        let output = registry.dispatch("get_study_time", "{}").await;
        assert!(output.contains("2.5 hours"));
    }
}
