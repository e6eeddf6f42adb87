use std::io::{Cursor, Read};
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use super::{ExtractionError, TextExtractor};

const DOCUMENT_PART: &str = "word/document.xml";

/// Word documents: reads the main document part out of the zip container and
/// emits one line per paragraph. Legacy binary `.doc` files are not zip
/// archives and fail here.
pub struct DocxExtractor;

#[async_trait]
impl TextExtractor for DocxExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let xml = read_document_part(bytes)?;
        Ok(paragraphs_to_text(&xml))
    }
}

fn read_document_part(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Docx(format!("not a Word document: {e}")))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Docx(format!("{DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

fn paragraph_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<w:p[ >].*?</w:p>").expect("paragraph pattern is valid"))
}

/// Paragraph properties; their `<w:tab>` entries are tab stops, not content.
fn properties_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<w:pPr>.*?</w:pPr>").expect("properties pattern is valid"))
}

/// Text runs, tabs and line breaks inside one paragraph.
fn run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:(tab|br|cr)\b[^>]*/>")
            .expect("run pattern is valid")
    })
}

fn paragraphs_to_text(xml: &str) -> String {
    paragraph_pattern()
        .find_iter(xml)
        .map(|paragraph| {
            let content = properties_pattern().replace_all(paragraph.as_str(), "");
            let line: String = run_pattern()
                .captures_iter(&content)
                .map(|run| match (run.get(1), run.get(2).map(|m| m.as_str())) {
                    (Some(text), _) => unescape_xml(text.as_str()),
                    (None, Some("tab")) => "\t".to_string(),
                    (None, _) => "\n".to_string(),
                })
                .collect();
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Named and numeric (`&#8217;`, `&#xA0;`) character references.
fn entity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"&(?:(lt|gt|quot|apos|amp)|#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6}));")
            .expect("entity pattern is valid")
    })
}

/// Single pass, so `&amp;#65;` stays `&#65;`. Invalid code points are kept verbatim.
fn unescape_xml(text: &str) -> String {
    entity_pattern()
        .replace_all(text, |caps: &regex::Captures| {
            let decoded = if let Some(name) = caps.get(1) {
                match name.as_str() {
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    _ => Some('&'),
                }
            } else if let Some(dec) = caps.get(2) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else {
                caps.get(3)
                    .and_then(|hex| u32::from_str_radix(hex.as_str(), 16).ok())
                    .and_then(char::from_u32)
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
