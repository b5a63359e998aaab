use anyhow::Context;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::ats::pipeline::AnalysisResult;
use crate::errors::AppError;
use crate::models::analysis::AtsAnalysisRow;

/// Most rows the history endpoint returns.
pub const HISTORY_LIMIT: i64 = 50;

/// Persists a finished analysis and returns its id. Rows are insert-only.
pub async fn insert_analysis(
    pool: &PgPool,
    user_id: Option<Uuid>,
    source: &str,
    analysis: &AnalysisResult,
) -> Result<Uuid, AppError> {
    let result = serde_json::to_value(analysis).context("Failed to serialize analysis result")?;

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO ats_analyses (user_id, source, score, match_percentage, result)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(source)
    .bind(analysis.score as i32)
    .bind(analysis.match_result.match_percentage)
    .bind(result)
    .fetch_one(pool)
    .await?;

    info!(%id, source, score = analysis.score, "Stored ATS analysis");
    Ok(id)
}

pub async fn get_analysis(pool: &PgPool, id: Uuid) -> Result<Option<AtsAnalysisRow>, AppError> {
    let row = sqlx::query_as::<_, AtsAnalysisRow>("SELECT * FROM ats_analyses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Newest first, capped at `HISTORY_LIMIT`.
pub async fn list_analyses(pool: &PgPool, user_id: Uuid) -> Result<Vec<AtsAnalysisRow>, AppError> {
    let rows = sqlx::query_as::<_, AtsAnalysisRow>(
        "SELECT * FROM ats_analyses WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(HISTORY_LIMIT)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
