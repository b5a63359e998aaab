//! Text extraction: turns an uploaded resume (PDF, DOCX, image) into `NormalizedText`.
//!
//! Each media type has its own decoder:
//! - PDF: `pdf-extract` page-by-page on the blocking pool, raced against a hard deadline.
//! - DOCX: `docx-rs` paragraph/table walk on the blocking pool.
//! - Image: a pluggable `OcrEngine` (tesseract CLI by default).
//!
//! Every decoder output goes through the same normalization pass before anything
//! downstream sees it. An empty result after normalization is an error, never a
//! silently empty analysis.

pub mod docx;
pub mod normalize;
pub mod ocr;
pub mod pdf;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub use normalize::NormalizedText;
pub use ocr::{OcrEngine, TesseractOcr};

use crate::extraction::pdf::PdfDecoder;

// ────────────────────────────────────────────────────────────────────────────
// Document model
// ────────────────────────────────────────────────────────────────────────────

/// Declared type of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Pdf,
    Docx,
    Image,
}

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "tif", "tiff", "bmp", "gif"];

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Pdf => "pdf",
            MediaType::Docx => "docx",
            MediaType::Image => "image",
        }
    }

    /// Resolves the media type from a declared content type, falling back to the
    /// file extension when the content type is missing or generic
    /// (`application/octet-stream` is what most browsers send for unknown files).
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Result<Self, ExtractionError> {
        let declared = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

        if let Some(ct) = declared.as_deref() {
            if let Some(media_type) = Self::from_content_type(ct) {
                return Ok(media_type);
            }
        }

        if let Some(media_type) = file_name.and_then(Self::from_file_name) {
            return Ok(media_type);
        }

        let described = declared
            .or_else(|| file_name.map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());
        Err(ExtractionError::UnsupportedType(described))
    }

    fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "application/pdf" | "application/x-pdf" => Some(MediaType::Pdf),
            DOCX_CONTENT_TYPE => Some(MediaType::Docx),
            ct if ct.starts_with("image/") => Some(MediaType::Image),
            _ => None,
        }
    }

    fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(MediaType::Pdf),
            "docx" => Some(MediaType::Docx),
            e if IMAGE_EXTENSIONS.contains(&e) => Some(MediaType::Image),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded document, owned by the request that received it.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Bytes,
    pub media_type: MediaType,
    pub file_name: Option<String>,
}

impl RawDocument {
    #[cfg(test)]
    pub fn new(bytes: Bytes, media_type: MediaType) -> Self {
        Self {
            bytes,
            media_type,
            file_name: None,
        }
    }

    /// Builds a document from multipart upload metadata.
    pub fn from_upload(
        bytes: Bytes,
        content_type: Option<&str>,
        file_name: Option<&str>,
    ) -> Result<Self, ExtractionError> {
        let media_type = MediaType::detect(content_type, file_name)?;
        Ok(Self {
            bytes,
            media_type,
            file_name: file_name.map(str::to_string),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Terminal extraction failures. None are retried; the request fails with the error.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported media type: {0}")]
    UnsupportedType(String),

    #[error("Failed to decode {media_type} document: {cause}")]
    DecodeFailed { media_type: MediaType, cause: String },

    #[error("{media_type} extraction exceeded the {}s deadline", .limit.as_secs_f32())]
    Timeout { media_type: MediaType, limit: Duration },

    #[error("Document contains no readable text")]
    EmptyContent,
}

/// Flat classification of `ExtractionError`, for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionErrorKind {
    UnsupportedType,
    DecodeFailed,
    Timeout,
    EmptyContent,
}

impl ExtractionError {
    pub fn kind(&self) -> ExtractionErrorKind {
        match self {
            ExtractionError::UnsupportedType(_) => ExtractionErrorKind::UnsupportedType,
            ExtractionError::DecodeFailed { .. } => ExtractionErrorKind::DecodeFailed,
            ExtractionError::Timeout { .. } => ExtractionErrorKind::Timeout,
            ExtractionError::EmptyContent => ExtractionErrorKind::EmptyContent,
        }
    }

    pub(crate) fn decode(media_type: MediaType, cause: impl fmt::Display) -> Self {
        ExtractionError::DecodeFailed {
            media_type,
            cause: cause.to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extractor
// ────────────────────────────────────────────────────────────────────────────

/// Dispatches a `RawDocument` to its decoder and normalizes the output.
pub struct TextExtractor {
    pdf: PdfDecoder,
    ocr: Arc<dyn OcrEngine>,
}

impl TextExtractor {
    pub fn new(pdf_timeout: Duration, max_pdf_workers: usize, ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            pdf: PdfDecoder::new(pdf_timeout, max_pdf_workers),
            ocr,
        }
    }

    pub async fn extract(&self, document: &RawDocument) -> Result<NormalizedText, ExtractionError> {
        let started = Instant::now();

        let raw = match document.media_type {
            MediaType::Pdf => self.pdf.extract(document.bytes.clone()).await?,
            MediaType::Docx => docx::extract(document.bytes.clone()).await?,
            MediaType::Image => self.ocr.recognize(document.bytes.clone()).await?,
        };

        let text = NormalizedText::normalize(&raw);
        if text.is_empty() {
            return Err(ExtractionError::EmptyContent);
        }

        info!(
            media_type = %document.media_type,
            bytes = document.bytes.len(),
            words = text.word_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Extracted resume text"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ocr::FixedOcr;

    fn extractor_with_ocr(text: &'static str) -> TextExtractor {
        TextExtractor::new(Duration::from_secs(2), 2, Arc::new(FixedOcr(text)))
    }

    #[test]
    fn test_detect_pdf_from_content_type() {
        let mt = MediaType::detect(Some("application/pdf"), None).unwrap();
        assert_eq!(mt, MediaType::Pdf);
    }

    #[test]
    fn test_detect_ignores_content_type_parameters() {
        let mt = MediaType::detect(Some("Application/PDF; charset=binary"), None).unwrap();
        assert_eq!(mt, MediaType::Pdf);
    }

    #[test]
    fn test_detect_docx_from_content_type() {
        let mt = MediaType::detect(Some(DOCX_CONTENT_TYPE), Some("cv.bin")).unwrap();
        assert_eq!(mt, MediaType::Docx);
    }

    #[test]
    fn test_detect_image_from_content_type() {
        assert_eq!(
            MediaType::detect(Some("image/png"), None).unwrap(),
            MediaType::Image
        );
    }

    #[test]
    fn test_detect_falls_back_to_extension_for_octet_stream() {
        let mt = MediaType::detect(Some("application/octet-stream"), Some("Resume.DOCX")).unwrap();
        assert_eq!(mt, MediaType::Docx);
    }

    #[test]
    fn test_detect_extension_without_content_type() {
        assert_eq!(
            MediaType::detect(None, Some("scan.jpeg")).unwrap(),
            MediaType::Image
        );
    }

    #[test]
    fn test_detect_rejects_plain_text() {
        let err = MediaType::detect(Some("text/plain"), Some("notes.txt")).unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::UnsupportedType);
        assert!(err.to_string().contains("text/plain"));
    }

    #[test]
    fn test_detect_rejects_missing_metadata() {
        let err = MediaType::detect(None, None).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedType(ref s) if s == "unknown"));
    }

    #[test]
    fn test_legacy_doc_is_unsupported() {
        let err = RawDocument::from_upload(Bytes::from_static(b"x"), None, Some("old.doc")).unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::UnsupportedType);
    }

    #[test]
    fn test_timeout_message_mentions_deadline() {
        let err = ExtractionError::Timeout {
            media_type: MediaType::Pdf,
            limit: Duration::from_secs(8),
        };
        assert_eq!(err.kind(), ExtractionErrorKind::Timeout);
        assert!(err.to_string().contains("8s"));
    }

    #[tokio::test]
    async fn test_image_path_normalizes_ocr_output() {
        let extractor = extractor_with_ocr("  SENIOR   Rust\nEngineer — AWS!  ");
        let doc = RawDocument::new(Bytes::from_static(b"\x89PNG"), MediaType::Image);
        let text = extractor.extract(&doc).await.unwrap();
        assert_eq!(text.as_str(), "senior rust engineer aws");
    }

    #[tokio::test]
    async fn test_blank_ocr_output_is_empty_content() {
        let extractor = extractor_with_ocr(" \n\t ** ");
        let doc = RawDocument::new(Bytes::from_static(b"\x89PNG"), MediaType::Image);
        let err = extractor.extract(&doc).await.unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::EmptyContent);
    }

    #[tokio::test]
    async fn test_corrupt_docx_is_decode_failure() {
        let extractor = extractor_with_ocr("unused");
        let doc = RawDocument::new(Bytes::from_static(b"not a zip archive"), MediaType::Docx);
        let err = extractor.extract(&doc).await.unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::DecodeFailed);
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_decode_failure() {
        let extractor = extractor_with_ocr("unused");
        let doc = RawDocument::new(Bytes::from_static(b"%PDF-1.4 truncated"), MediaType::Pdf);
        let err = extractor.extract(&doc).await.unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::DecodeFailed);
    }

    #[tokio::test]
    async fn test_valid_docx_is_normalized() {
        let extractor = extractor_with_ocr("unused");
        let doc = RawDocument::new(Bytes::from(docx::resume_docx()), MediaType::Docx);
        let text = extractor.extract(&doc).await.unwrap();
        assert_eq!(text.as_str(), "skills rust kafka experience acme");
    }

    #[tokio::test]
    async fn test_two_page_pdf_is_joined_and_normalized() {
        let extractor = extractor_with_ocr("unused");
        let pdf = pdf::text_pdf(&["SKILLS Go AWS", "EXPERIENCE Docker 2019 - 2023"]);
        let doc = RawDocument::new(Bytes::from(pdf), MediaType::Pdf);
        let text = extractor.extract(&doc).await.unwrap();
        assert_eq!(text.as_str(), "skills go aws experience docker 2019 - 2023");
    }
}
