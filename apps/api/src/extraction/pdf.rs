//! PDF decoding with a hard wall-clock deadline.
//!
//! # Deadline race
//! `pdf-extract` is synchronous and CPU-bound, and some malformed PDFs make it spin for
//! a long time. Decoding runs on the blocking pool and the await on its `JoinHandle`
//! is wrapped in `tokio::time::timeout`. When the timer wins the request fails with
//! `ExtractionError::Timeout` immediately.
//!
//! A blocking thread cannot be interrupted, so an abandoned decode keeps running until
//! `pdf-extract` returns. Each decode holds an owned semaphore permit that is moved into
//! the blocking closure and released only when the closure really finishes. Abandoned
//! decodes therefore still count against `max_workers`, and a burst of pathological
//! uploads saturates the semaphore (and times out callers) instead of the blocking pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::extraction::{ExtractionError, MediaType};

pub struct PdfDecoder {
    timeout: Duration,
    workers: Arc<Semaphore>,
}

impl PdfDecoder {
    pub fn new(timeout: Duration, max_workers: usize) -> Self {
        Self {
            timeout,
            workers: Arc::new(Semaphore::new(max_workers.max(1))),
        }
    }

    /// Extracts the text of every page, joined with single spaces.
    pub async fn extract(&self, bytes: Bytes) -> Result<String, ExtractionError> {
        run_with_deadline(self.timeout, self.workers.clone(), move || {
            decode_pages(&bytes)
        })
        .await
    }
}

fn decode_pages(bytes: &[u8]) -> Result<String, String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| e.to_string())?;
    debug!(pages = pages.len(), "Decoded PDF pages");
    Ok(join_pages(&pages))
}

/// Joins per-page text runs with a single space, skipping blank pages.
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs `work` on the blocking pool and races it against `limit`.
///
/// Waiting for a worker permit counts against the deadline too: a caller queued behind
/// stuck decodes times out rather than waiting indefinitely.
async fn run_with_deadline<F>(
    limit: Duration,
    workers: Arc<Semaphore>,
    work: F,
) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Result<String, String> + Send + 'static,
{
    let started = Instant::now();

    match tokio::time::timeout(limit, decode_on_worker(workers, work)).await {
        Ok(result) => {
            debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                ok = result.is_ok(),
                "PDF decode finished"
            );
            result
        }
        Err(_) => {
            warn!(
                limit_ms = limit.as_millis() as u64,
                "PDF extraction exceeded deadline; abandoning decode"
            );
            Err(ExtractionError::Timeout {
                media_type: MediaType::Pdf,
                limit,
            })
        }
    }
}

async fn decode_on_worker<F>(workers: Arc<Semaphore>, work: F) -> Result<String, ExtractionError>
where
    F: FnOnce() -> Result<String, String> + Send + 'static,
{
    let permit = workers
        .acquire_owned()
        .await
        .map_err(|e| ExtractionError::decode(MediaType::Pdf, e))?;

    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work()
    })
    .await
    // pdf-extract panics on some inputs; a panicked decode is a decode failure.
    .map_err(|e| ExtractionError::decode(MediaType::Pdf, format!("decoder panicked: {e}")))?
    .map_err(|cause| ExtractionError::decode(MediaType::Pdf, cause))
}

/// Builds an uncompressed PDF with one line of Helvetica text per page.
/// `pages` must not contain parentheses or backslashes.
#[cfg(test)]
pub(crate) fn text_pdf(pages: &[&str]) -> Vec<u8> {
    // 1 catalog, 2 page tree, 3 font, then a (page, content stream) pair per page
    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
    ];
    for (i, text) in pages.iter().enumerate() {
        let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            5 + 2 * i
        ));
        objects.push(format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()));
    }

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_offset = pdf.len();
    let size = objects.len() + 1;
    pdf.extend_from_slice(format!("xref\n0 {size}\n0000000000 65535 f \n").as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!("trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n").as_bytes(),
    );
    pdf
}
