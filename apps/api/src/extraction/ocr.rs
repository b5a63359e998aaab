//! OCR for image uploads.
//!
//! `OcrEngine` is the seam: `AppState` carries the extractor built around an
//! `Arc<dyn OcrEngine>`, and tests swap in a fixed-output engine. The default
//! engine shells out to the tesseract CLI.

use std::io::Write;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::extraction::{ExtractionError, MediaType};

#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognizes the text in an encoded image (PNG, JPEG, TIFF, ...).
    async fn recognize(&self, image: Bytes) -> Result<String, ExtractionError>;

    fn name(&self) -> &'static str;
}

/// Runs `tesseract <image> stdout` against a temp copy of the upload.
///
/// The child is spawned with `kill_on_drop`, so when the deadline fires and the
/// `output()` future is dropped the process is killed rather than left running.
pub struct TesseractOcr {
    binary: String,
    timeout: Duration,
}

impl TesseractOcr {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: Bytes) -> Result<String, ExtractionError> {
        let file = tokio::task::spawn_blocking(move || write_temp_image(&image))
            .await
            .map_err(|e| {
                ExtractionError::decode(MediaType::Image, format!("temp file writer panicked: {e}"))
            })?
            .map_err(|e| ExtractionError::decode(MediaType::Image, e))?;

        let mut command = Command::new(&self.binary);
        command
            .arg(file.path())
            .arg("stdout")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|e| {
                ExtractionError::decode(MediaType::Image, format!("failed to run {}: {e}", self.binary))
            })?,
            Err(_) => {
                warn!(
                    limit_ms = self.timeout.as_millis() as u64,
                    "OCR exceeded deadline; child process killed"
                );
                return Err(ExtractionError::Timeout {
                    media_type: MediaType::Image,
                    limit: self.timeout,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::decode(
                MediaType::Image,
                format!("{} exited with {}: {}", self.binary, output.status, stderr.trim()),
            ));
        }

        let text = strip_excess_whitespace(&String::from_utf8_lossy(&output.stdout));
        debug!(engine = self.name(), chars = text.len(), "OCR finished");
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}

/// Uploads can be several megabytes; callers run this on the blocking pool.
fn write_temp_image(image: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(image)?;
    file.flush()?;
    Ok(file)
}

/// Collapses the ragged line/column spacing OCR produces into single spaces.
fn strip_excess_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the same text for every image.
#[cfg(test)]
pub(crate) struct FixedOcr(pub &'static str);

#[cfg(test)]
#[async_trait]
impl OcrEngine for FixedOcr {
    async fn recognize(&self, _image: Bytes) -> Result<String, ExtractionError> {
        Ok(self.0.to_string())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionErrorKind;

    #[test]
    fn test_strip_excess_whitespace() {
        assert_eq!(
            strip_excess_whitespace("  Jane   Doe\n\n\nSoftware\tEngineer \u{c}"),
            "Jane Doe Software Engineer"
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_decode_failure() {
        let ocr = TesseractOcr::new("/nonexistent/tesseract-binary", Duration::from_secs(2));
        let err = ocr.recognize(Bytes::from_static(b"\x89PNG")).await.unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::DecodeFailed);
        assert!(err.to_string().contains("failed to run"));
    }

    // `sh <file> stdout` executes the temp file as a script, which stands in for
    // the tesseract binary without needing it installed.
    #[cfg(unix)]
    #[tokio::test]
    async fn test_engine_output_is_whitespace_stripped() {
        let ocr = TesseractOcr::new("sh", Duration::from_secs(5));
        let text = ocr
            .recognize(Bytes::from_static(b"printf 'Jane  Doe\\n\\n  Rust   Engineer\\n'"))
            .await
            .unwrap();
        assert_eq!(text, "Jane Doe Rust Engineer");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_decode_failure() {
        let ocr = TesseractOcr::new("sh", Duration::from_secs(5));
        let err = ocr
            .recognize(Bytes::from_static(b"echo 'Error in pixReadStream' >&2; exit 1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::DecodeFailed);
        assert!(err.to_string().contains("pixReadStream"));
    }

    #[test]
    fn test_temp_image_holds_upload_bytes() {
        let file = write_temp_image(b"\x89PNG\r\n").unwrap();
        assert_eq!(std::fs::read(file.path()).unwrap(), b"\x89PNG\r\n");
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "current_thread")]
    async fn test_multi_megabyte_upload_is_recognized() {
        let mut script = b"printf 'large upload'\nexit 0\n".to_vec();
        script.extend(std::iter::repeat(b'#').take(4 * 1024 * 1024));
        let ocr = TesseractOcr::new("sh", Duration::from_secs(10));
        let text = ocr.recognize(Bytes::from(script)).await.unwrap();
        assert_eq!(text, "large upload");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_engine_times_out() {
        let ocr = TesseractOcr::new("sh", Duration::from_millis(100));
        let started = std::time::Instant::now();
        let err = ocr.recognize(Bytes::from_static(b"sleep 5")).await.unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::Timeout);
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
