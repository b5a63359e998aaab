use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::ats::pipeline::AnalysisResult;
use crate::ats::store::{get_analysis, insert_analysis, list_analyses};
use crate::errors::AppError;
use crate::extraction::{ExtractionError, NormalizedText, RawDocument};
use crate::models::analysis::AtsAnalysisRow;
use crate::state::AppState;

/// Returned by both analyze endpoints.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub id: Uuid,
    pub analysis: AnalysisResult,
}

#[derive(Deserialize)]
pub struct AnalyzeTextRequest {
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
    pub user_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// The `file` part of the upload form with its declared metadata.
struct UploadedFile {
    bytes: Bytes,
    content_type: Option<String>,
    file_name: Option<String>,
}

/// Fields collected from the multipart upload form.
#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    job_description: String,
    user_id: Option<Uuid>,
}

/// POST /api/v1/ats/analyze
///
/// Multipart form: `file` (resume), `job_description`, optional `user_id`.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AnalyzeResponse>), AppError> {
    let form = read_upload_form(multipart).await?;

    let file = form
        .file
        .ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    if file.bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let document = RawDocument::from_upload(
        file.bytes,
        file.content_type.as_deref(),
        file.file_name.as_deref(),
    )?;
    info!(
        media_type = %document.media_type,
        bytes = document.bytes.len(),
        file_name = document.file_name.as_deref().unwrap_or("-"),
        "Analyzing uploaded resume"
    );

    let analysis = state
        .pipeline
        .analyze_document(&document, &form.job_description)
        .await?;
    let id = insert_analysis(&state.db, form.user_id, document.media_type.as_str(), &analysis).await?;

    Ok((StatusCode::CREATED, Json(AnalyzeResponse { id, analysis })))
}

/// POST /api/v1/ats/analyze-text
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeTextRequest>,
) -> Result<(StatusCode, Json<AnalyzeResponse>), AppError> {
    if req.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text must not be empty".to_string()));
    }

    let resume = NormalizedText::normalize(&req.resume_text);
    if resume.is_empty() {
        return Err(ExtractionError::EmptyContent.into());
    }

    let analysis = state.pipeline.analyze_text(&resume, &req.job_description);
    let id = insert_analysis(&state.db, req.user_id, "text", &analysis).await?;

    Ok((StatusCode::CREATED, Json(AnalyzeResponse { id, analysis })))
}

/// GET /api/v1/ats/analyses/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AtsAnalysisRow>, AppError> {
    let row = get_analysis(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))?;
    Ok(Json(row))
}

/// GET /api/v1/ats/analyses?user_id=
pub async fn handle_list_analyses(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<AtsAnalysisRow>>, AppError> {
    let rows = list_analyses(&state.db, params.user_id).await?;
    Ok(Json(rows))
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read 'file': {e}")))?;
                form.file = Some(UploadedFile {
                    bytes,
                    content_type,
                    file_name,
                });
            }
            "job_description" => {
                form.job_description = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read 'job_description': {e}")))?;
            }
            "user_id" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read 'user_id': {e}")))?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    let user_id = raw
                        .parse()
                        .map_err(|_| AppError::Validation(format!("Invalid user_id: '{raw}'")))?;
                    form.user_id = Some(user_id);
                }
            }
            // unknown fields are skipped
            _ => {}
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::FromRequest, http::Request};

    async fn form_from(body: &str) -> UploadForm {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "multipart/form-data; boundary=X")
            .body(Body::from(body.to_string()))
            .unwrap();
        let multipart = Multipart::from_request(request, &()).await.unwrap();
        read_upload_form(multipart).await.unwrap()
    }

    #[tokio::test]
    async fn test_file_part_keeps_its_metadata() {
        let body = "--X\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"cv.pdf\"\r\n\
            Content-Type: application/pdf\r\n\r\n\
            %PDF-1.4\r\n\
            --X\r\n\
            Content-Disposition: form-data; name=\"job_description\"\r\n\r\n\
            Rust engineer\r\n\
            --X--\r\n";
        let form = form_from(body).await;

        let file = form.file.expect("file part");
        assert_eq!(file.bytes.as_ref(), b"%PDF-1.4");
        assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(file.file_name.as_deref(), Some("cv.pdf"));
        assert_eq!(form.job_description, "Rust engineer");
        assert!(form.user_id.is_none());
    }

    #[tokio::test]
    async fn test_file_part_without_metadata() {
        let body = "--X\r\n\
            Content-Disposition: form-data; name=\"file\"\r\n\r\n\
            raw\r\n\
            --X--\r\n";
        let file = form_from(body).await.file.expect("file part");
        assert_eq!(file.bytes.as_ref(), b"raw");
        assert!(file.content_type.is_none());
        assert!(file.file_name.is_none());
    }
}
