use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct WellnessLog {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub mood: i16,
    pub sleep_hours: f64,
    pub water_glasses: i32,
    pub exercise_minutes: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct WellnessGoals {
    pub sleep_goal: f64,
    pub water_goal: i32,
    pub exercise_goal: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub set_at: OffsetDateTime,
}
