//! Axum route handler for document text extraction.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::{extract_bytes, DocumentFormat, DocumentSummary};
use crate::state::AppState;

/// Name of the multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

/// POST /api/v1/documents/extract
///
/// Accepts a single PDF/DOC/DOCX/TXT upload and returns its plain text.
/// Nothing is stored.
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DocumentSummary>, AppError> {
    let limit = state.config.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
        let format = DocumentFormat::from_filename(&filename)?;

        let data: Bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        if data.len() > limit {
            return Err(too_large(limit));
        }

        let text = extract_bytes(&filename, &data).await?;
        info!("Extracted {} ({} bytes upload)", filename, data.len());

        return Ok(Json(DocumentSummary::new(filename, format, text)));
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}

fn multipart_error(error: MultipartError, limit: usize) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(limit)
    } else {
        AppError::Validation(format!("Malformed upload: {}", error.body_text()))
    }
}

fn too_large(limit: usize) -> AppError {
    AppError::PayloadTooLarge(format!("File too large. Maximum size: {}", format_size(limit)))
}

const MIB: usize = 1024 * 1024;

/// Whole mebibytes as `NMB`, anything else in bytes.
fn format_size(bytes: usize) -> String {
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limit_message_never_rounds_to_zero() {
        assert_eq!(format_size(10 * MIB), "10MB");
        assert_eq!(format_size(1024), "1024 bytes");
        assert_eq!(format_size(MIB + 1), "1048577 bytes");
    }

    #[test]
    fn test_too_large_reports_limit() {
        let err = too_large(1024);
        assert!(matches!(err, AppError::PayloadTooLarge(ref m) if m.ends_with("Maximum size: 1024 bytes")));
    }
}
