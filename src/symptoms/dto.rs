use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::services::AnalysisReport;

#[derive(Debug, Deserialize)]
pub struct AnalyzeSymptomsRequest {
    pub symptoms: String,
}

/// Analysis report plus what happened to its history record.
#[derive(Debug, Serialize)]
pub struct SymptomAnalysisResponse {
    #[serde(flatten)]
    pub report: AnalysisReport,
    pub history_id: Option<Uuid>,
    pub history_saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
}
