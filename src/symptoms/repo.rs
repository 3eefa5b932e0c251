use anyhow::Context;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::repo_types::SymptomHistoryRow;
use super::services::AnalysisReport;
use crate::db::Pagination;

pub async fn insert_history(
    db: &PgPool,
    user_id: Uuid,
    symptoms: &str,
    report: &AnalysisReport,
) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO symptom_history (user_id, symptoms, severity, confidence, recommendations, note)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(symptoms)
    .bind(report.severity().as_str())
    .bind(report.confidence)
    .bind(Json(&report.results.recommendations))
    .bind(&report.results.note)
    .fetch_one(db)
    .await
    .context("insert symptom history")?;
    Ok(id)
}

/// Newest first.
pub async fn list_history(
    db: &PgPool,
    user_id: Uuid,
    page: Pagination,
) -> anyhow::Result<Vec<SymptomHistoryRow>> {
    let (limit, offset) = page.bounds();
    let rows = sqlx::query_as::<_, SymptomHistoryRow>(
        r#"
        SELECT id, symptoms, severity, confidence, recommendations, note, created_at
        FROM symptom_history
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list symptom history")?;
    Ok(rows)
}
