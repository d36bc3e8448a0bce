//! Input manager for handling different file types

use crate::error::{MatcherError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{
    DocumentSource, DocxExtractor, MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;

pub struct InputManager {
    cache: HashMap<String, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Read a local file. Missing files and unsupported extensions are input errors.
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(&path_str) {
                info!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        if !path.exists() {
            return Err(MatcherError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let text = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                Self::swallow(path, PdfExtractor.extract(path).await)
            }
            FileType::Docx => {
                info!("Extracting text from DOCX: {}", path.display());
                Self::swallow(path, DocxExtractor.extract(path).await)
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown => {
                return Err(MatcherError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}. Please use PDF or DOCX",
                    path.display()
                )));
            }
        };

        if self.enable_cache {
            self.cache.insert(path_str, text.clone());
        }

        Ok(text)
    }

    /// Extract text from uploaded bytes. Only PDF and DOCX names are accepted; the
    /// bytes go through the same path extractors as files on disk.
    pub async fn extract_upload(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let format = FileType::from_path(Path::new(file_name))
            .document_format()
            .ok_or_else(|| {
                MatcherError::UnsupportedFormat(format!(
                    "Unsupported file format for '{}'. Please use PDF or DOCX",
                    file_name
                ))
            })?;

        info!("Extracting text from uploaded {}: {}", format.extension(), file_name);
        let text = DocumentSource::new(bytes.to_vec(), format).extract_text().await;
        if text.is_empty() {
            warn!("No text could be extracted from '{}'", file_name);
        }

        Ok(text)
    }

    fn swallow(path: &Path, extracted: Result<String>) -> String {
        match extracted {
            Ok(text) => text,
            Err(e) => {
                warn!("Treating '{}' as empty: {}", path.display(), e);
                String::new()
            }
        }
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_caching_functionality() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, "Jane Doe\nPython developer").unwrap();

        let mut manager = InputManager::new();
        let first = manager.extract_text(&path).await.unwrap();
        assert_eq!(manager.cache_size(), 1);

        let second = manager.extract_text(&path).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(manager.cache_size(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_pdf_becomes_empty_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, "definitely not a pdf").unwrap();

        let mut manager = InputManager::new().with_cache(false);
        let text = manager.extract_text(&path).await.unwrap();
        assert!(text.is_empty());
        assert_eq!(manager.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_and_missing_files_are_rejected() {
        let dir = TempDir::new().unwrap();
        let unsupported = dir.path().join("resume.xyz");
        std::fs::write(&unsupported, "text").unwrap();

        let mut manager = InputManager::new();
        assert!(matches!(
            manager.extract_text(&unsupported).await,
            Err(MatcherError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            manager.extract_text(&dir.path().join("missing.txt")).await,
            Err(MatcherError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_format() {
        let manager = InputManager::new();
        let result = manager.extract_upload("resume.rtf", b"{\\rtf1}").await;
        assert!(matches!(result, Err(MatcherError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn test_upload_with_corrupt_content_is_empty() {
        let manager = InputManager::new();
        let text = manager.extract_upload("resume.docx", b"corrupt").await.unwrap();
        assert!(text.is_empty());
        assert_eq!(manager.cache_size(), 0);
    }
}
