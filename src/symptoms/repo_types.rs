use serde::Serialize;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct SymptomHistoryRow {
    pub id: Uuid,
    pub symptoms: String,
    pub severity: String,
    pub confidence: f64,
    pub recommendations: Json<Vec<String>>,
    pub note: String,
    pub created_at: OffsetDateTime,
}

/// One stored analysis as returned by the history endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SymptomHistoryEntry {
    pub id: Uuid,
    pub symptoms: String,
    pub severity: String,
    pub confidence: String,
    pub recommendations: Vec<String>,
    pub note: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<SymptomHistoryRow> for SymptomHistoryEntry {
    fn from(r: SymptomHistoryRow) -> Self {
        Self {
            id: r.id,
            symptoms: r.symptoms,
            severity: r.severity,
            confidence: super::services::format_confidence(r.confidence),
            recommendations: r.recommendations.0,
            note: r.note,
            created_at: r.created_at,
        }
    }
}
