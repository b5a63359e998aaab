use bytes::Bytes;
use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};

use crate::extraction::{ExtractionError, MediaType};

/// Extracts the raw text of a DOCX file, discarding styling.
///
/// Parsing unzips and walks the whole XML tree, so it runs on the blocking pool.
pub async fn extract(bytes: Bytes) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || docx_to_text(&bytes))
        .await
        .map_err(|e| ExtractionError::decode(MediaType::Docx, format!("decoder panicked: {e}")))?
}

fn docx_to_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = read_docx(bytes).map_err(|e| ExtractionError::decode(MediaType::Docx, e))?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => push_paragraph(paragraph, &mut lines),
            // Many resume templates lay out whole sections inside tables.
            DocumentChild::Table(table) => push_table(table, &mut lines),
            _ => {}
        }
    }

    Ok(lines.join("\n"))
}

fn push_paragraph(paragraph: &Paragraph, lines: &mut Vec<String>) {
    let text = paragraph_text(paragraph);
    if !text.trim().is_empty() {
        lines.push(text);
    }
}

#[allow(irrefutable_let_patterns)]
fn push_table(table: &Table, lines: &mut Vec<String>) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row else { continue };
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell else { continue };
            for content in &cell.children {
                if let TableCellContent::Paragraph(paragraph) = content {
                    push_paragraph(paragraph, lines);
                }
            }
        }
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) | RunChild::Break(_) => text.push(' '),
                    _ => {}
                }
            }
        }
    }
    text
}

/// A small resume: a heading paragraph, a blank paragraph, and a one-cell table.
#[cfg(test)]
pub(crate) fn resume_docx() -> Vec<u8> {
    use docx_rs::{Docx, Run, TableCell, TableRow};

    let skills = Paragraph::new().add_run(Run::new().add_text("SKILLS Rust").add_tab().add_text("Kafka"));
    let cell = TableCell::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("EXPERIENCE Acme")));
    let table = Table::new(vec![TableRow::new(vec![cell])]);

    let mut out = std::io::Cursor::new(Vec::new());
    Docx::new()
        .add_paragraph(skills)
        .add_paragraph(Paragraph::new())
        .add_table(table)
        .build()
        .pack(&mut out)
        .expect("in-memory docx");
    out.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionErrorKind;

    #[test]
    fn test_paragraphs_and_table_cells_are_extracted() {
        let text = docx_to_text(&resume_docx()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["SKILLS Rust Kafka", "EXPERIENCE Acme"]);
    }

    #[tokio::test]
    async fn test_async_extract_reads_valid_docx() {
        let text = extract(Bytes::from(resume_docx())).await.unwrap();
        assert!(text.contains("SKILLS Rust"));
        assert!(text.contains("EXPERIENCE Acme"));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = docx_to_text(b"definitely not a docx").unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::DecodeFailed);
        assert!(err.to_string().contains("docx"));
    }

    #[tokio::test]
    async fn test_async_extract_reports_decode_failure() {
        let err = extract(Bytes::from_static(b"PK\x03\x04 truncated"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::DecodeFailed);
    }
}
