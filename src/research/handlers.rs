use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::dto::{ResearchAnalysisResponse, UploadedPaper};
use super::repo::{self, NewResearchEntry};
use super::repo_types::ResearchHistoryEntry;
use super::services::{analyze_paper, AnalysisError, ResearchAnalysis};
use crate::{
    auth::AuthUser,
    db::Pagination,
    errors::{internal, ApiError},
    state::AppState,
    storage::{paper_key, PDF_CONTENT_TYPE},
};

const PRESIGN_SECONDS: u64 = 600;
const FAILED: &str = "Failed to analyze paper";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/research/analyze", post(analyze))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
        .route("/research/history", get(history))
}

fn truthy(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Reads the `file` and `save` fields; other fields are ignored.
async fn read_upload(mp: &mut Multipart) -> Result<(UploadedPaper, bool), (StatusCode, String)> {
    let mut paper = None;
    let mut save = false;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("paper.pdf").to_string();
                let content_type = field.content_type().map(str::to_string);
                let body = field
                    .bytes()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                paper = Some(UploadedPaper {
                    file_name,
                    content_type,
                    body,
                });
            }
            Some("save") => {
                let v = field
                    .text()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                save = truthy(&v);
            }
            _ => {}
        }
    }

    let paper = paper.ok_or((StatusCode::BAD_REQUEST, "No file uploaded".to_string()))?;
    if !paper.is_pdf() {
        return Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Only PDF documents are supported".into(),
        ));
    }
    if paper.body.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Uploaded file is empty".into()));
    }
    Ok((paper, save))
}

/// POST /research/analyze (multipart)
#[instrument(skip(state, mp), fields(user_id = %user.id))]
pub async fn analyze(
    State(state): State<AppState>,
    user: AuthUser,
    mut mp: Multipart,
) -> Result<Json<ResearchAnalysisResponse>, ApiError> {
    let (paper, save) = read_upload(&mut mp).await?;
    info!(file = %paper.file_name, bytes = paper.body.len(), save, "paper received");

    let analysis = analyze_paper(state.summarizer.as_ref(), paper.body.clone(), &state.research)
        .await
        .map_err(|e| {
            error!(error = %e, "paper analysis failed");
            let status = match e {
                AnalysisError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AnalysisError::Inference(_) => StatusCode::BAD_GATEWAY,
                AnalysisError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            ApiError::pipeline(status, e, FAILED)
        })?;

    let (history_id, warning) = if save {
        match save_to_history(&state, user.id, &paper, &analysis).await {
            Ok((id, warning)) => (Some(id), warning),
            Err(warning) => (None, Some(warning)),
        }
    } else {
        (None, None)
    };

    Ok(Json(ResearchAnalysisResponse {
        analysis,
        history_id,
        warning,
    }))
}

/// Archives the PDF and records the analysis.
///
/// A failed upload still records the analysis, without a document. A failed
/// insert returns the warning shown to the caller.
async fn save_to_history(
    state: &AppState,
    user_id: Uuid,
    paper: &UploadedPaper,
    analysis: &ResearchAnalysis,
) -> Result<(Uuid, Option<String>), String> {
    let db = state.db.pool().map_err(|e| {
        warn!(error = %e, "research history skipped");
        "Analysis complete, but history could not be saved.".to_string()
    })?;

    let id = Uuid::new_v4();
    let key = paper_key(user_id, id);
    let (s3_key, warning) = match state
        .storage
        .put_object(&key, paper.body.clone(), PDF_CONTENT_TYPE)
        .await
    {
        Ok(()) => (Some(key), None),
        Err(e) => {
            warn!(error = %e, key = %key, "archiving paper failed");
            (
                None,
                Some("Analysis saved, but the document could not be archived.".to_string()),
            )
        }
    };

    let entry = NewResearchEntry {
        id,
        user_id,
        file_name: &paper.file_name,
        s3_key: s3_key.as_deref(),
        analysis,
    };
    if let Err(e) = repo::insert_history(db, entry).await {
        error!(error = %e, "saving research history failed");
        if let Some(key) = &s3_key {
            if let Err(e) = state.storage.delete_object(key).await {
                warn!(error = %e, key = %key, "orphaned archived paper");
            }
        }
        return Err("Analysis complete, but history could not be saved.".into());
    }

    info!(history_id = %id, archived = s3_key.is_some(), "research history saved");
    Ok((id, warning))
}

/// GET /research/history
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ResearchHistoryEntry>>, (StatusCode, String)> {
    let rows = repo::list_history(state.db.pool()?, user.id, page)
        .await
        .map_err(internal)?;

    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        let document_url = match &r.s3_key {
            Some(key) => match state.storage.presign_get(key, PRESIGN_SECONDS).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(error = %e, key = %key, "presign failed");
                    None
                }
            },
            None => None,
        };
        out.push(ResearchHistoryEntry {
            id: r.id,
            file_name: r.file_name,
            summary: r.summary,
            key_points: r.key_points.0,
            document_url,
            created_at: r.created_at,
        });
    }
    Ok(Json(out))
}
