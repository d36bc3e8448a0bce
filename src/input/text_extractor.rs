//! Text extraction from various file formats

use crate::error::{MatcherError, Result};
use crate::input::file_detector::DocumentFormat;
use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, Run, RunChild, TableCellContent, TableChild, TableRowChild};
use log::{debug, warn};
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Raw bytes of an uploaded document plus the format it claims to be
#[derive(Debug, Clone)]
pub struct DocumentSource {
    pub bytes: Vec<u8>,
    pub format: DocumentFormat,
}

impl DocumentSource {
    pub fn new(bytes: Vec<u8>, format: DocumentFormat) -> Self {
        Self { bytes, format }
    }

    /// Write the bytes to a temporary file named with the format's extension.
    /// The file is deleted when the returned handle drops.
    pub fn stage(&self) -> Result<NamedTempFile> {
        let mut staged = tempfile::Builder::new()
            .prefix("resume_upload_")
            .suffix(&format!(".{}", self.format.extension()))
            .tempfile()?;
        staged.write_all(&self.bytes)?;
        staged.flush()?;
        Ok(staged)
    }

    /// Stage the document and run the path extractor for its format over the staged
    /// file. Failures, staging included, are logged and yield an empty string.
    pub async fn extract_text(&self) -> String {
        let extracted = match self.stage() {
            Ok(staged) => {
                debug!("Staged {} document at {}", self.format.extension(), staged.path().display());
                match self.format {
                    DocumentFormat::Pdf => PdfExtractor.extract(staged.path()).await,
                    DocumentFormat::Docx => DocxExtractor.extract(staged.path()).await,
                }
            }
            Err(e) => Err(e),
        };

        match extracted {
            Ok(text) => text,
            Err(e) => {
                warn!("Error extracting text from {}: {}", self.format.extension(), e);
                String::new()
            }
        }
    }
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        pdf_text_from_bytes(&bytes).map_err(|e| {
            MatcherError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", path.display(), e))
        })
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        docx_text_from_bytes(&bytes).map_err(|e| {
            MatcherError::DocxExtraction(format!("Failed to extract text from DOCX '{}': {}", path.display(), e))
        })
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).await?;
        Ok(content)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;
        Ok(markdown_to_text(&markdown_content))
    }
}

pub fn markdown_to_text(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    let text = html_output
        .replace("<br>", "\n")
        .replace("</p>", "\n\n")
        .replace("</li>", "\n")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let tag_regex = Regex::new(r"<[^>]*>").expect("Invalid tag regex");
    let clean_text = tag_regex.replace_all(&text, "");

    clean_text
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn pdf_text_from_bytes(bytes: &[u8]) -> Result<String> {
    // pdf-extract panics on some malformed inputs instead of returning an error
    let outcome = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    match outcome {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(MatcherError::PdfExtraction(e.to_string())),
        Err(_) => Err(MatcherError::PdfExtraction("PDF parser aborted on malformed input".to_string())),
    }
}

fn docx_text_from_bytes(bytes: &[u8]) -> Result<String> {
    let docx = read_docx(bytes).map_err(|e| MatcherError::DocxExtraction(e.to_string()))?;

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => paragraphs.push(paragraph_text(paragraph)),
            DocumentChild::Table(table) => {
                for row in &table.rows {
                    let TableChild::TableRow(row) = row;
                    for cell in &row.cells {
                        let TableRowChild::TableCell(cell) = cell;
                        for content in &cell.children {
                            if let TableCellContent::Paragraph(paragraph) = content {
                                paragraphs.push(paragraph_text(paragraph));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut buffer = String::new();
    for child in &paragraph.children {
        match child {
            ParagraphChild::Run(run) => append_run_text(run, &mut buffer),
            ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let ParagraphChild::Run(run) = inner {
                        append_run_text(run, &mut buffer);
                    }
                }
            }
            _ => {}
        }
    }
    buffer
}

fn append_run_text(run: &Run, buffer: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(text) => buffer.push_str(&text.text),
            RunChild::Break(_) => buffer.push('\n'),
            RunChild::Tab(_) => buffer.push('\t'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_corrupt_pdf_yields_empty_text() {
        let source = DocumentSource::new(b"not a pdf at all".to_vec(), DocumentFormat::Pdf);
        assert_eq!(source.extract_text().await, "");
    }

    #[tokio::test]
    async fn test_corrupt_docx_yields_empty_text() {
        let source = DocumentSource::new(b"PK\x03\x04 broken".to_vec(), DocumentFormat::Docx);
        assert_eq!(source.extract_text().await, "");
    }

    #[test]
    fn test_staged_file_holds_bytes_and_is_removed_on_drop() {
        let source = DocumentSource::new(b"%PDF-1.4 stub".to_vec(), DocumentFormat::Pdf);
        let staged = source.stage().unwrap();
        let path = staged.path().to_path_buf();

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 stub");

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_markdown_to_text_strips_formatting() {
        let text = markdown_to_text("# Jane Doe\n\n**Skills**: Rust, *Python*\n\n- Docker\n- AWS");
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Rust, Python"));
        assert!(text.contains("Docker"));
        assert!(!text.contains("**"));
        assert!(!text.contains('#'));
    }

    #[tokio::test]
    async fn test_plain_text_extractor_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job.txt");
        std::fs::write(&path, "Looking for a Python developer").unwrap();

        let text = PlainTextExtractor.extract(&path).await.unwrap();
        assert_eq!(text, "Looking for a Python developer");
    }

    #[tokio::test]
    async fn test_pdf_extractor_reports_errors_for_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, "garbage").unwrap();

        let result = PdfExtractor.extract(&path).await;
        assert!(matches!(result, Err(MatcherError::PdfExtraction(_))));
    }
}
