use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::WellnessGoals;
use super::services::{WellnessSeries, WellnessSummary};

/// Mood as a 1-5 level or as one of the five faces of the old scale.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MoodInput {
    Level(i64),
    Emoji(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLogRequest {
    pub mood: MoodInput,
    pub sleep_hours: f64,
    pub water_glasses: i64,
    pub exercise_minutes: i64,
    /// Defaults to now.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub logged_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoalsRequest {
    pub sleep_goal: f64,
    pub water_goal: i64,
    pub exercise_goal: i64,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub entries: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ImportReport {
    pub logs_imported: usize,
    pub goals_imported: bool,
    pub skipped: usize,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub deleted: u64,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: WellnessSummary,
    pub series: WellnessSeries,
    pub goals: Option<WellnessGoals>,
}
