use serde::Serialize;
use uuid::Uuid;

use super::services::ResearchAnalysis;

#[derive(Debug, Serialize)]
pub struct ResearchAnalysisResponse {
    #[serde(flatten)]
    pub analysis: ResearchAnalysis,
    pub history_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Uploaded document pulled out of the multipart body.
#[derive(Debug)]
pub struct UploadedPaper {
    pub file_name: String,
    pub content_type: Option<String>,
    pub body: bytes::Bytes,
}

impl UploadedPaper {
    pub fn is_pdf(&self) -> bool {
        self.content_type.as_deref() == Some(crate::storage::PDF_CONTENT_TYPE)
            || self.file_name.to_ascii_lowercase().ends_with(".pdf")
    }
}
