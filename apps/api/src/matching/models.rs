//! Data model of the matching engine: verdicts, analysis results, batch entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_JOB_TITLE: &str = "Unknown Position";
pub const DEFAULT_COMPANY: &str = "Not specified";

/// Three-tier verdict on whether the candidate should apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Apply,
    #[default]
    DecentChance,
    Avoid,
}

impl Recommendation {
    pub const ALL: [Recommendation; 3] = [
        Recommendation::Apply,
        Recommendation::DecentChance,
        Recommendation::Avoid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Apply => "APPLY",
            Recommendation::DecentChance => "DECENT_CHANCE",
            Recommendation::Avoid => "AVOID",
        }
    }

    /// Case-insensitive match against the three labels, ignoring surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(label))
    }

    /// Like `from_label`, but anything unrecognized becomes `DecentChance`.
    pub fn normalize(label: &str) -> Self {
        Self::from_label(label).unwrap_or_default()
    }
}

/// Which code path produced an `AnalysisResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Success,
    PartialSuccess,
    Error,
}

/// The structured outcome of one résumé/job analysis.
///
/// `processing_status = error` means "no analysis available", not a genuine
/// AVOID verdict, even though the recommendation field reads AVOID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub recommendation: Recommendation,
    pub match_score: u8,    // 0 – 100
    pub confidence_score: u8, // 0 – 100
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub missing_skills: Vec<String>,
    pub experience_match: String,
    pub education_match: String,
    pub detailed_reasoning: String,
    pub processing_status: ProcessingStatus,
    pub analysis_timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
    /// Only set on `partial_success`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    /// Only set on `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AnalysisResult {
    /// Terminal result for an analysis whose model call failed.
    pub fn invocation_failure(message: &str, at: DateTime<Utc>) -> Self {
        Self {
            recommendation: Recommendation::Avoid,
            match_score: 0,
            confidence_score: 0,
            strengths: vec![],
            weaknesses: vec!["Analysis failed".to_string()],
            missing_skills: vec![],
            experience_match: "Could not analyze".to_string(),
            education_match: "Could not analyze".to_string(),
            detailed_reasoning: format!("Analysis failed due to error: {message}"),
            processing_status: ProcessingStatus::Error,
            analysis_timestamp: at,
            ai_model: None,
            parse_error: None,
            error_message: Some(message.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.processing_status == ProcessingStatus::Error
    }
}

/// One job description in a batch, plus display metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchEntry {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

impl BatchEntry {
    pub fn job_title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_JOB_TITLE)
    }

    pub fn job_filename(&self) -> &str {
        self.filename.as_deref().unwrap_or("")
    }

    pub fn company(&self) -> &str {
        self.company.as_deref().unwrap_or(DEFAULT_COMPANY)
    }
}

/// An `AnalysisResult` tagged with the batch entry it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub job_title: String,
    pub job_filename: String,
    pub company: String,
}

impl RankedResult {
    pub fn new(analysis: AnalysisResult, entry: &BatchEntry) -> Self {
        Self {
            analysis,
            job_title: entry.job_title().to_string(),
            job_filename: entry.job_filename().to_string(),
            company: entry.company().to_string(),
        }
    }

    pub fn match_score(&self) -> u8 {
        self.analysis.match_score
    }
}
