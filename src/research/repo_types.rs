use serde::Serialize;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ResearchHistoryRow {
    pub id: Uuid,
    pub file_name: String,
    pub s3_key: Option<String>,
    pub summary: String,
    pub key_points: Json<Vec<String>>,
    pub created_at: OffsetDateTime,
}

/// Saved analysis with a short-lived link to the archived PDF, if any.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchHistoryEntry {
    pub id: Uuid,
    pub file_name: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub document_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
