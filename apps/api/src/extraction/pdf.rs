use async_trait::async_trait;

use super::{ExtractionError, TextExtractor};

/// PDF text via `pdf-extract`. Parsing is CPU-bound, so it runs on the blocking pool.
pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            // pdf-extract can panic on malformed input; treat that as a bad file.
            .map_err(|e| ExtractionError::Pdf(format!("PDF reader aborted: {e}")))?
            .map_err(|e| ExtractionError::Pdf(e.to_string()))
    }
}
