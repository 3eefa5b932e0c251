use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{
    GoalsRequest, ImportReport, ImportRequest, NewLogRequest, ResetResponse, SummaryResponse,
};
use super::repo;
use super::repo_types::{WellnessGoals, WellnessLog};
use super::services::{partition_legacy, series, summarize, validate_goals, validate_log};
use crate::{auth::AuthUser, errors::internal, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wellness/logs", post(add_log).get(list_logs).delete(reset_logs))
        .route("/wellness/goals", get(get_goals).put(set_goals))
        .route("/wellness/summary", get(summary))
        .route("/wellness/import", post(import_legacy))
}

fn bad_request(msg: String) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, msg)
}

/// POST /wellness/logs
#[instrument(skip(state, payload), fields(user_id = %user.id))]
pub async fn add_log(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<NewLogRequest>,
) -> Result<(StatusCode, Json<WellnessLog>), (StatusCode, String)> {
    let log = validate_log(&payload).map_err(bad_request)?;
    let row = repo::insert_log(state.db.pool()?, user.id, &log)
        .await
        .map_err(internal)?;
    info!(log_id = %row.id, "wellness log saved");
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /wellness/logs
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn list_logs(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<WellnessLog>>, (StatusCode, String)> {
    let rows = repo::list_logs(state.db.pool()?, user.id)
        .await
        .map_err(internal)?;
    Ok(Json(rows))
}

/// DELETE /wellness/logs
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn reset_logs(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ResetResponse>, (StatusCode, String)> {
    let deleted = repo::reset_logs(state.db.pool()?, user.id)
        .await
        .map_err(internal)?;
    warn!(deleted, "wellness logs reset");
    Ok(Json(ResetResponse { deleted }))
}

/// GET /wellness/goals
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn get_goals(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Option<WellnessGoals>>, (StatusCode, String)> {
    let goals = repo::get_goals(state.db.pool()?, user.id)
        .await
        .map_err(internal)?;
    Ok(Json(goals))
}

/// PUT /wellness/goals
#[instrument(skip(state, payload), fields(user_id = %user.id))]
pub async fn set_goals(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<GoalsRequest>,
) -> Result<Json<WellnessGoals>, (StatusCode, String)> {
    let goals = validate_goals(&payload).map_err(bad_request)?;
    let row = repo::upsert_goals(state.db.pool()?, user.id, &goals)
        .await
        .map_err(internal)?;
    info!("wellness goals updated");
    Ok(Json(row))
}

/// GET /wellness/summary
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<SummaryResponse>, (StatusCode, String)> {
    let db = state.db.pool()?;
    let logs = repo::list_logs(db, user.id).await.map_err(internal)?;
    let goals = repo::get_goals(db, user.id).await.map_err(internal)?;

    Ok(Json(SummaryResponse {
        summary: summarize(&logs),
        series: series(&logs),
        goals,
    }))
}

/// POST /wellness/import
///
/// Takes entries in the old mixed layout and stores them in one transaction.
#[instrument(skip(state, payload), fields(user_id = %user.id))]
pub async fn import_legacy(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ImportRequest>,
) -> Result<Json<ImportReport>, (StatusCode, String)> {
    let parsed = partition_legacy(&payload.entries);
    let db = state.db.pool()?;

    let mut tx = db.begin().await.map_err(internal)?;
    for log in &parsed.logs {
        repo::insert_log(&mut *tx, user.id, log)
            .await
            .map_err(internal)?;
    }
    if let Some(goals) = &parsed.goals {
        repo::upsert_goals(&mut *tx, user.id, goals)
            .await
            .map_err(internal)?;
    }
    tx.commit().await.map_err(internal)?;

    let report = ImportReport {
        logs_imported: parsed.logs.len(),
        goals_imported: parsed.goals.is_some(),
        skipped: parsed.skipped,
    };
    info!(
        logs = report.logs_imported,
        goals = report.goals_imported,
        skipped = report.skipped,
        "legacy wellness data imported"
    );
    Ok(Json(report))
}
