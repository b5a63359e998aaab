mod ats;
mod config;
mod db;
mod errors;
mod extraction;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ats::pipeline::AtsPipeline;
use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::{TesseractOcr, TextExtractor};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting atscore v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs pending migrations)
    let db = create_pool(&config.database_url, config.db_max_connections).await?;

    // Initialize the extraction + analysis pipeline
    let ocr = Arc::new(TesseractOcr::new(
        config.tesseract_path.clone(),
        config.ocr_timeout,
    ));
    let extractor = TextExtractor::new(config.pdf_timeout, config.max_pdf_workers, ocr);
    let pipeline = Arc::new(AtsPipeline::new(extractor, config.scoring_weights));
    info!(
        pdf_timeout_s = config.pdf_timeout.as_secs(),
        ocr_timeout_s = config.ocr_timeout.as_secs(),
        max_pdf_workers = config.max_pdf_workers,
        keyword_weight = pipeline.weights().keyword_match,
        section_weight = pipeline.weights().section_coverage,
        "ATS pipeline initialized"
    );

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        pipeline,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
