//! The study statistics file shared by the tracking tools.
//!
//! `stats.json` holds the weekly goal, the Monday of the week the goal was
//! set, and the logged study sessions. Only tools touch this file — the
//! orchestration core never reads or writes it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Contents of `stats.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsFile {
    /// Weekly study goal in hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_goal_hours: Option<f64>,

    /// When the goal was last set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_updated_at: Option<DateTime<Utc>>,

    /// Monday of the week the goal was set — the week-rollover marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_week_start: Option<NaiveDate>,

    /// Logged study sessions, in logging order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub learning_sessions: Vec<StudySession>,
}

impl StatsFile {
    /// Sum of hours logged within the week starting at `week_start`.
    pub fn hours_in_week(&self, week_start: NaiveDate) -> f64 {
        self.sessions_in_week(week_start).map(|s| s.hours).sum()
    }

    /// Sessions logged within the week starting at `week_start`.
    pub fn sessions_in_week(
        &self,
        week_start: NaiveDate,
    ) -> impl Iterator<Item = &StudySession> {
        let week_end = week_start + Days::new(7);
        self.learning_sessions
            .iter()
            .filter(move |s| s.date >= week_start && s.date < week_end)
    }
}

/// One logged study session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySession {
    /// The day the studying happened
    pub date: NaiveDate,

    /// Duration in (decimal) hours
    pub hours: f64,

    /// When the session was logged
    pub logged_at: DateTime<Utc>,
}

/// A handle on the statistics file.
#[derive(Debug, Clone)]
pub struct StatsStore {
    path: PathBuf,
}

impl StatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether any statistics have been recorded yet.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the statistics; missing or unparseable files degrade to empty.
    pub fn load(&self) -> StatsFile {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return StatsFile::default(),
        };
        match serde_json::from_str(&content) {
            Ok(stats) => stats,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not parse stats file, starting fresh");
                StatsFile::default()
            }
        }
    }

    /// Write the statistics back.
    pub fn save(&self, stats: &StatsFile) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(stats)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        std::fs::write(&self.path, json)
    }
}

/// The Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.weekday().num_days_from_monday() as u64)
}

/// Today's date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
