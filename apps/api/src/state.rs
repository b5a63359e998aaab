use std::sync::Arc;

use sqlx::PgPool;

use crate::ats::pipeline::AtsPipeline;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Extraction + analysis pipeline. Carries the OCR engine as `Arc<dyn OcrEngine>`.
    pub pipeline: Arc<AtsPipeline>,
}
