//! services/api/src/adapters/extract.rs
//!
//! This module contains the document-to-text adapter. It implements the
//! `TextExtractionService` port from the `core` crate, converting DOCX
//! files via `docx-rs` and decoding plain-text files as UTF-8.

use async_trait::async_trait;
use docx_rs::{
    read_docx, DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild,
    TableRowChild,
};
use summarizer_core::domain::DocumentKind;
use summarizer_core::ports::{PortError, PortResult, TextExtractionService};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `TextExtractionService` port.
#[derive(Clone, Default)]
pub struct DocumentExtractAdapter;

impl DocumentExtractAdapter {
    /// Creates a new `DocumentExtractAdapter`.
    pub fn new() -> Self {
        Self
    }
}

//=========================================================================================
// `TextExtractionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextExtractionService for DocumentExtractAdapter {
    /// Converts a document's raw bytes into plain text. A document that
    /// yields nothing but whitespace is an `InvalidInput` error; a
    /// conversion failure is `Unexpected`.
    async fn extract_text(&self, data: &[u8], kind: DocumentKind) -> PortResult<String> {
        let text = match kind {
            DocumentKind::PlainText => String::from_utf8_lossy(data).into_owned(),
            DocumentKind::Docx => docx_to_text(data)?,
        };
        if text.trim().is_empty() {
            return Err(PortError::InvalidInput(
                "No text could be extracted from the file.".to_string(),
            ));
        }
        Ok(text)
    }
}

//=========================================================================================
// DOCX Conversion
//=========================================================================================

/// Walks a parsed DOCX body and collects the text of every run, one line
/// per paragraph. Tables contribute their cell paragraphs in document
/// order.
fn docx_to_text(data: &[u8]) -> PortResult<String> {
    let docx = read_docx(data)
        .map_err(|e| PortError::Unexpected(format!("Failed to parse DOCX document: {}", e)))?;

    let mut lines: Vec<String> = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => {
                lines.push(paragraph_text(&paragraph.children));
            }
            DocumentChild::Table(table) => {
                for row in &table.rows {
                    let TableChild::TableRow(row) = row;
                    for cell in &row.cells {
                        let TableRowChild::TableCell(cell) = cell;
                        for content in &cell.children {
                            if let TableCellContent::Paragraph(paragraph) = content {
                                lines.push(paragraph_text(&paragraph.children));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(lines.join("\n"))
}

fn paragraph_text(children: &[ParagraphChild]) -> String {
    let mut text = String::new();
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => {
                text.push_str(&paragraph_text(&link.children));
            }
            _ => {}
        }
    }
    text
}
