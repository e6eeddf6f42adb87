//! Document text extraction — PDF, Word and plain-text files to UTF-8 text.
//!
//! The matching engine only ever sees the output of this module; it never
//! analyzes raw bytes.

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

mod docx;
pub mod handlers;
mod pdf;
mod plain;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use plain::PlainTextExtractor;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error reading PDF: {0}")]
    Pdf(String),

    #[error("Error reading DOCX: {0}")]
    Docx(String),

    #[error("Error reading TXT: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    /// `.docx`, and legacy `.doc` which is routed through the same reader.
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Case-insensitive lookup by extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Result<Self, ExtractionError> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "doc" | "docx" => Ok(DocumentFormat::Docx),
            "txt" => Ok(DocumentFormat::Txt),
            _ => Err(ExtractionError::UnsupportedFormat(format!(
                ".{}",
                ext.trim_start_matches('.')
            ))),
        }
    }

    pub fn from_filename(name: impl AsRef<Path>) -> Result<Self, ExtractionError> {
        let ext = name
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext)
    }

    fn extractor(&self) -> &'static dyn TextExtractor {
        match self {
            DocumentFormat::Pdf => &PdfExtractor,
            DocumentFormat::Docx => &DocxExtractor,
            DocumentFormat::Txt => &PlainTextExtractor,
        }
    }
}

/// One extractor per format. Input is the whole file; output is untrimmed text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Extracted text plus a few size facts about it.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub filename: String,
    pub format: DocumentFormat,
    pub text: String,
    pub word_count: usize,
    pub char_count: usize,
}

impl DocumentSummary {
    pub fn new(filename: impl Into<String>, format: DocumentFormat, text: String) -> Self {
        Self {
            filename: filename.into(),
            format,
            word_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
            text,
        }
    }
}

/// Extracts text from an in-memory document, picking the reader by `filename`.
pub async fn extract_bytes(filename: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    let format = DocumentFormat::from_filename(filename)?;
    let text = format.extractor().extract(bytes).await?;
    debug!(
        "Extracted {} chars from {filename} ({:?})",
        text.len(),
        format
    );
    Ok(text.trim().to_string())
}

/// Extracts text from a file on disk.
#[allow(dead_code)] // path-based entry point; the HTTP surface only sees uploads
pub async fn extract_text(path: impl AsRef<Path>) -> Result<String, ExtractionError> {
    let path = path.as_ref();
    DocumentFormat::from_filename(path)?;

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExtractionError::NotFound(path.display().to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    extract_bytes(filename, &bytes).await
}
