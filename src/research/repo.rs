use anyhow::Context;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::repo_types::ResearchHistoryRow;
use super::services::ResearchAnalysis;
use crate::db::Pagination;

pub struct NewResearchEntry<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: &'a str,
    pub s3_key: Option<&'a str>,
    pub analysis: &'a ResearchAnalysis,
}

pub async fn insert_history(db: &PgPool, entry: NewResearchEntry<'_>) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO research_history (id, user_id, file_name, s3_key, summary, key_points)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(entry.id)
    .bind(entry.user_id)
    .bind(entry.file_name)
    .bind(entry.s3_key)
    .bind(&entry.analysis.summary)
    .bind(Json(&entry.analysis.key_points))
    .execute(db)
    .await
    .context("insert research history")?;
    Ok(())
}

/// Newest first.
pub async fn list_history(
    db: &PgPool,
    user_id: Uuid,
    page: Pagination,
) -> anyhow::Result<Vec<ResearchHistoryRow>> {
    let (limit, offset) = page.bounds();
    let rows = sqlx::query_as::<_, ResearchHistoryRow>(
        r#"
        SELECT id, file_name, s3_key, summary, key_points, created_at
        FROM research_history
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
    .context("list research history")?;
    Ok(rows)
}

/// Object keys of every archived paper of the user.
pub async fn list_document_keys(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<String>> {
    let keys = sqlx::query_scalar::<_, String>(
        "SELECT s3_key FROM research_history WHERE user_id = $1 AND s3_key IS NOT NULL",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list archived papers")?;
    Ok(keys)
}
