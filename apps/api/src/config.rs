use std::str::FromStr;
use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::ats::scoring::ScoringWeights;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    /// Hard deadline for one PDF decode.
    pub pdf_timeout: Duration,
    /// Deadline for one OCR run; the child process is killed when it fires.
    pub ocr_timeout: Duration,
    /// Blocking threads allowed to decode PDFs at once.
    pub max_pdf_workers: usize,
    pub tesseract_path: String,
    pub scoring_weights: ScoringWeights,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let scoring_weights = ScoringWeights {
            keyword_match: env_or("ATS_KEYWORD_WEIGHT", 0.7)?,
            section_coverage: env_or("ATS_SECTION_WEIGHT", 0.3)?,
        };
        ensure!(
            scoring_weights.keyword_match >= 0.0 && scoring_weights.section_coverage >= 0.0,
            "ATS_KEYWORD_WEIGHT and ATS_SECTION_WEIGHT must be non-negative"
        );
        ensure!(
            scoring_weights.keyword_match + scoring_weights.section_coverage > 0.0,
            "ATS_KEYWORD_WEIGHT and ATS_SECTION_WEIGHT cannot both be zero"
        );

        let pdf_timeout_secs: u64 = env_or("ATS_PDF_TIMEOUT_SECS", 8)?;
        let ocr_timeout_secs: u64 = env_or("ATS_OCR_TIMEOUT_SECS", 30)?;
        ensure!(
            pdf_timeout_secs > 0 && ocr_timeout_secs > 0,
            "Extraction timeouts must be at least one second"
        );
        let max_upload_mb: usize = env_or("ATS_MAX_UPLOAD_MB", 10)?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10)?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            pdf_timeout: Duration::from_secs(pdf_timeout_secs),
            ocr_timeout: Duration::from_secs(ocr_timeout_secs),
            max_pdf_workers: env_or("ATS_MAX_PDF_WORKERS", 4)?,
            tesseract_path: std::env::var("TESSERACT_PATH").unwrap_or_else(|_| "tesseract".to_string()),
            scoring_weights,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads and parses `key`, falling back to `default` when it is unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
