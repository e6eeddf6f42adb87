//! Response Parser — turns raw model text into an `AnalysisResult`.
//!
//! Two tiers:
//! 1. Strict: unwrap an optional markdown fence, parse a JSON object, coerce
//!    every field into range. Produces `processing_status = success`.
//! 2. Fallback: when the text is not a JSON object at all, pull the two
//!    load-bearing fields (recommendation, match_score) out with patterns and
//!    keep the raw text as the reasoning. Produces `partial_success`.
//!
//! Parsing never fails outright; a caller always gets a usable recommendation.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::matching::models::{AnalysisResult, ProcessingStatus, Recommendation};

/// Score used when the model gave none (or gave garbage).
pub const DEFAULT_MATCH_SCORE: u8 = 50;
/// Confidence used by the strict path when the model omitted it.
pub const DEFAULT_CONFIDENCE_SCORE: u8 = 50;
/// Confidence reported for every fallback parse.
pub const FALLBACK_CONFIDENCE_SCORE: u8 = 70;

/// The model's text could not be read as the declared JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StructuralParseError(pub String);

impl From<serde_json::Error> for StructuralParseError {
    fn from(e: serde_json::Error) -> Self {
        StructuralParseError(e.to_string())
    }
}

/// Which tier produced the result.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Strict(AnalysisResult),
    Fallback {
        result: AnalysisResult,
        error: StructuralParseError,
    },
}

impl ParseOutcome {
    pub fn used_fallback(&self) -> bool {
        matches!(self, ParseOutcome::Fallback { .. })
    }

    /// `(result, used_fallback)`
    pub fn into_parts(self) -> (AnalysisResult, bool) {
        let used_fallback = self.used_fallback();
        let result = match self {
            ParseOutcome::Strict(result) | ParseOutcome::Fallback { result, .. } => result,
        };
        (result, used_fallback)
    }
}

/// Parses raw model output, stamping the result with the current time.
pub fn parse_response(raw: &str) -> ParseOutcome {
    parse_response_at(raw, Utc::now())
}

/// Parses raw model output, stamping the result with `completed_at`.
pub fn parse_response_at(raw: &str, completed_at: DateTime<Utc>) -> ParseOutcome {
    let body = strip_code_fence(raw);
    match parse_strict(body, completed_at) {
        Ok(result) => ParseOutcome::Strict(result),
        Err(error) => ParseOutcome::Fallback {
            result: parse_fallback(raw, &error, completed_at),
            error,
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fence handling
// ────────────────────────────────────────────────────────────────────────────

const FENCE: &str = "```";

/// Returns the contents of a ```json block if there is one, else of the first
/// plain ``` block, else the trimmed input. An unterminated fence runs to the
/// end of the text.
fn strip_code_fence(text: &str) -> &str {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();

    if let Some(tag) = lowered.find("```json") {
        let start = tag + "```json".len();
        return fenced_body(text, start);
    }

    if let Some(open) = text.find(FENCE) {
        let start = open + FENCE.len();
        let body = fenced_body(text, start);
        return skip_language_tag(body);
    }

    text.trim()
}

fn fenced_body(text: &str, start: usize) -> &str {
    let rest = &text[start..];
    let end = rest.find(FENCE).unwrap_or(rest.len());
    rest[..end].trim()
}

/// Drops a leading info-string line such as `JSON` or `javascript`.
fn skip_language_tag(body: &str) -> &str {
    match body.split_once('\n') {
        Some((first, rest))
            if !first.is_empty()
                && first.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
        {
            rest.trim()
        }
        _ => body,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Strict tier
// ────────────────────────────────────────────────────────────────────────────

fn parse_strict(
    body: &str,
    completed_at: DateTime<Utc>,
) -> Result<AnalysisResult, StructuralParseError> {
    let value: Value = serde_json::from_str(body)?;
    let object = match value {
        Value::Object(map) => map,
        other => {
            return Err(StructuralParseError(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            )))
        }
    };

    Ok(AnalysisResult {
        recommendation: object
            .get("recommendation")
            .and_then(Value::as_str)
            .map(Recommendation::normalize)
            .unwrap_or_default(),
        match_score: coerce_score(object.get("match_score"), DEFAULT_MATCH_SCORE),
        confidence_score: coerce_score(object.get("confidence_score"), DEFAULT_CONFIDENCE_SCORE),
        strengths: coerce_list(&object, "strengths"),
        weaknesses: coerce_list(&object, "weaknesses"),
        missing_skills: coerce_list(&object, "missing_skills"),
        experience_match: coerce_text(&object, "experience_match"),
        education_match: coerce_text(&object, "education_match"),
        detailed_reasoning: coerce_text(&object, "detailed_reasoning"),
        processing_status: ProcessingStatus::Success,
        analysis_timestamp: completed_at,
        ai_model: None,
        parse_error: None,
        error_message: None,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Integers, floats (rounded) and numeric strings (optionally with `%`) are
/// accepted and clamped to 0–100. Anything else yields `default`.
fn coerce_score(value: Option<&Value>, default: u8) -> u8 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite())
        .map(clamp_score)
        .unwrap_or(default)
}

fn clamp_score(n: f64) -> u8 {
    n.round().clamp(0.0, 100.0) as u8
}

fn coerce_list(object: &Map<String, Value>, key: &str) -> Vec<String> {
    match object.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => vec![],
    }
}

fn coerce_text(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" "),
        Some(other) => other.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback tier
// ────────────────────────────────────────────────────────────────────────────

fn recommendation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)"recommendation"\s*:\s*"(APPLY|AVOID|DECENT_CHANCE)""#)
            .expect("recommendation pattern is valid")
    })
}

fn match_score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""match_score"\s*:\s*(\d+)"#).expect("match_score pattern is valid")
    })
}

fn extract_recommendation(raw: &str) -> Recommendation {
    recommendation_pattern()
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| Recommendation::normalize(m.as_str()))
        .unwrap_or_default()
}

fn extract_match_score(raw: &str) -> u8 {
    match_score_pattern()
        .captures(raw)
        .and_then(|c| c.get(1))
        // Digit runs too long for u64 are still "more than 100".
        .map(|m| m.as_str().parse::<u64>().map_or(100, |n| n.min(100) as u8))
        .unwrap_or(DEFAULT_MATCH_SCORE)
}

fn parse_fallback(
    raw: &str,
    error: &StructuralParseError,
    completed_at: DateTime<Utc>,
) -> AnalysisResult {
    let detailed_reasoning = if raw.trim().is_empty() {
        "The model returned an empty response.".to_string()
    } else {
        raw.to_string()
    };

    AnalysisResult {
        recommendation: extract_recommendation(raw),
        match_score: extract_match_score(raw),
        confidence_score: FALLBACK_CONFIDENCE_SCORE,
        strengths: vec!["Analysis completed with fallback parsing".to_string()],
        weaknesses: vec!["Structured parsing failed".to_string()],
        missing_skills: vec!["Could not extract detailed skills".to_string()],
        experience_match: "Could not fully analyze experience match".to_string(),
        education_match: "Could not fully analyze education match".to_string(),
        detailed_reasoning,
        processing_status: ProcessingStatus::PartialSuccess,
        analysis_timestamp: completed_at,
        ai_model: None,
        parse_error: Some(error.to_string()),
        error_message: None,
    }
}
