use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::dto::{AnalyzeSymptomsRequest, SymptomAnalysisResponse};
use super::repo;
use super::repo_types::SymptomHistoryEntry;
use super::services::{analyze_symptoms, Severity, SymptomError};
use crate::{
    auth::AuthUser,
    db::Pagination,
    errors::{internal, ApiError},
    state::AppState,
};

const HISTORY_NOT_SAVED: &str = "Analysis complete, but history could not be saved.";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/symptoms/analyze", post(analyze))
        .route("/symptoms/history", get(history))
}

/// POST /symptoms/analyze
#[instrument(skip(state, payload), fields(user_id = %user.id))]
pub async fn analyze(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AnalyzeSymptomsRequest>,
) -> Result<Json<SymptomAnalysisResponse>, ApiError> {
    user.require_symptom_access()?;

    let report = match analyze_symptoms(state.classifier.as_ref(), &payload.symptoms).await {
        Ok(r) => r,
        Err(SymptomError::TooShort) => {
            return Err((StatusCode::BAD_REQUEST, SymptomError::TooShort.to_string()).into())
        }
        Err(e) => {
            error!(error = %e, "symptom analysis failed");
            return Err(ApiError::pipeline(
                StatusCode::BAD_GATEWAY,
                e,
                "Failed to analyze symptoms",
            ));
        }
    };

    // History is best effort; the report goes out either way.
    let saved = match state.db.pool() {
        Ok(db) => repo::insert_history(db, user.id, payload.symptoms.trim(), &report)
            .await
            .map_err(|e| error!(error = %e, "saving symptom history failed")),
        Err(e) => {
            warn!(error = %e, "symptom history skipped");
            Err(())
        }
    };
    let history_id = saved.ok();

    let emergency_contact = (report.severity() == Severity::Critical)
        .then(|| state.config.emergency_phone.clone());
    if emergency_contact.is_some() {
        info!("critical severity reported");
    }

    Ok(Json(SymptomAnalysisResponse {
        report,
        history_id,
        history_saved: history_id.is_some(),
        warning: history_id.is_none().then(|| HISTORY_NOT_SAVED.to_string()),
        emergency_contact,
    }))
}

/// GET /symptoms/history
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<SymptomHistoryEntry>>, (StatusCode, String)> {
    user.require_symptom_access()?;

    let rows = repo::list_history(state.db.pool()?, user.id, page)
        .await
        .map_err(internal)?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
