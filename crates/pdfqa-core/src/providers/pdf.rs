//! PDF loader: one document per page

use super::{keys, Document, DocumentLoader};
use crate::config::DocumentsConfig;
use crate::error::{PdfQaError, Result};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Loads every PDF under a directory, splitting each file into per-page documents
#[derive(Debug, Clone)]
pub struct PdfLoader {
    directory: PathBuf,
    pattern: String,
}

impl PdfLoader {
    /// Create a loader for `directory`, matching files against the glob `pattern`
    pub fn new(directory: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            pattern: pattern.into(),
        }
    }

    /// Create from configuration
    pub fn from_config(config: &DocumentsConfig) -> Self {
        Self::new(config.directory.clone(), config.pattern.clone())
    }

    /// Extract the text of every page of a PDF file
    fn extract_pages(path: &Path) -> Result<Vec<String>> {
        let bytes = fs::read(path).map_err(|e| {
            PdfQaError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read PDF file {:?}: {}", path, e),
            ))
        })?;

        // pdf-extract panics on some malformed inputs (unknown encodings, bad fonts)
        let extracted = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        }))
        .map_err(|panic_info| {
            let reason = panic_info
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic_info.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown error".to_string());
            PdfQaError::Parse(format!("PDF extractor panicked on {:?}: {}", path, reason))
        })?;

        let pages = extracted.map_err(|e| {
            PdfQaError::Parse(format!("Failed to extract text from PDF {:?}: {}", path, e))
        })?;

        if pages.iter().all(|p| p.trim().is_empty()) {
            return Err(PdfQaError::Parse(format!(
                "PDF file {:?} contains no extractable text (may be image-based)",
                path
            )));
        }

        Ok(pages)
    }

    /// Extract title from the first page, falling back to the file name
    fn extract_title(content: &str, path: &Path) -> String {
        let first_line = content
            .lines()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .unwrap_or("");

        if !first_line.is_empty() && first_line.chars().count() < 200 {
            return first_line.to_string();
        }

        path.file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.replace(['_', '-'], " "))
            .unwrap_or_else(|| "Untitled PDF".to_string())
    }

    /// Scan directory for PDF files matching pattern, sorted by path
    fn scan_directory(base_path: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let glob_pattern = glob::Pattern::new(pattern)?;
        let mut pdf_files = Vec::new();

        for entry in WalkDir::new(base_path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let is_pdf = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);
            if !is_pdf {
                continue;
            }

            if let Ok(relative) = path.strip_prefix(base_path) {
                let options = glob::MatchOptions {
                    case_sensitive: false,
                    ..Default::default()
                };
                if glob_pattern.matches_with(&relative.to_string_lossy(), options) {
                    pdf_files.push(path.to_path_buf());
                }
            }
        }

        Ok(pdf_files)
    }

    /// Turn the pages of one file into documents, skipping blank pages
    fn pages_to_documents(path: &Path, pages: Vec<String>) -> Vec<Document> {
        let source = path.to_string_lossy().to_string();
        let total_pages = pages.len();
        let title = pages
            .iter()
            .find(|p| !p.trim().is_empty())
            .map(|p| Self::extract_title(p, path))
            .unwrap_or_else(|| Self::extract_title("", path));

        pages
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(page, text)| {
                Document::new(text)
                    .with_metadata(keys::SOURCE, source.clone())
                    .with_metadata(keys::PAGE, page)
                    .with_metadata(keys::TOTAL_PAGES, total_pages)
                    .with_metadata(keys::TITLE, title.clone())
            })
            .collect()
    }

    fn load_blocking(directory: &Path, pattern: &str) -> Result<Vec<Document>> {
        if !directory.exists() {
            return Err(PdfQaError::InvalidInput(format!(
                "Document directory does not exist: {}",
                directory.display()
            )));
        }

        let pdf_files = if directory.is_file() {
            vec![directory.to_path_buf()]
        } else {
            Self::scan_directory(directory, pattern)?
        };

        tracing::info!("Loading {} PDF files from {:?}", pdf_files.len(), directory);

        let mut documents = Vec::new();
        for path in pdf_files {
            match Self::extract_pages(&path) {
                Ok(pages) => documents.extend(Self::pages_to_documents(&path, pages)),
                Err(e) => tracing::warn!("Skipping PDF {:?}: {}", path, e),
            }
        }

        tracing::info!("Loaded {} document pages", documents.len());
        Ok(documents)
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    fn loader_type(&self) -> &'static str {
        "pdf"
    }

    async fn load(&self) -> Result<Vec<Document>> {
        let directory = self.directory.clone();
        let pattern = self.pattern.clone();
        tokio::task::spawn_blocking(move || Self::load_blocking(&directory, &pattern))
            .await
            .map_err(|e| PdfQaError::Other(anyhow::anyhow!("PDF loading task failed: {}", e)))?
    }
}
