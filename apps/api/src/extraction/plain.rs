use async_trait::async_trait;

use super::{ExtractionError, TextExtractor};

/// `.txt` files. Must be valid UTF-8; a leading BOM is dropped.
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}
