use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One stored ATS analysis. `result` holds the serialized `AnalysisResult`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AtsAnalysisRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub source: String, // "pdf" | "docx" | "image" | "text"
    pub score: i32,
    pub match_percentage: f64,
    pub result: Value,
    pub created_at: DateTime<Utc>,
}
