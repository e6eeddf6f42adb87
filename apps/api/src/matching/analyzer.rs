//! Match Analyzer — runs prompt → model → parser for one résumé/job pair.
//!
//! Model failures never escape: they become an `error`-status result so a
//! batch can keep going. Parse failures are already absorbed by the parser's
//! fallback tier.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::llm_client::ModelInvoker;
use crate::matching::models::AnalysisResult;
use crate::matching::parser::{parse_response, ParseOutcome};
use crate::matching::prompts::{build_match_prompt, MATCH_SYSTEM};

/// Cheap to clone; clones share the same model backend.
#[derive(Clone)]
pub struct MatchAnalyzer {
    invoker: Arc<dyn ModelInvoker>,
}

impl MatchAnalyzer {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self { invoker }
    }

    pub fn model_name(&self) -> &str {
        self.invoker.model_name()
    }

    pub async fn analyze(&self, resume_text: &str, job_text: &str) -> AnalysisResult {
        let prompt = build_match_prompt(resume_text, job_text);

        let raw = match self.invoker.complete(MATCH_SYSTEM, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Match analysis failed at model invocation: {e}");
                return AnalysisResult::invocation_failure(&e.to_string(), Utc::now());
            }
        };

        let outcome = parse_response(&raw);
        if let ParseOutcome::Fallback { error, .. } = &outcome {
            warn!("Model output was not a JSON object ({error}); using pattern fallback");
        }

        let (mut result, used_fallback) = outcome.into_parts();
        result.ai_model = Some(self.model_name().to_string());

        info!(
            "Match analysis complete: {} ({}/100, fallback={})",
            result.recommendation.as_str(),
            result.match_score,
            used_fallback
        );

        result
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::LlmError;
    use crate::matching::models::{ProcessingStatus, Recommendation};

    /// Returns canned replies in order and records every prompt it saw.
    pub(crate) struct ScriptedModel {
        replies: Mutex<Vec<Result<String, LlmError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub(crate) fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                prompts: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl ModelInvoker for ScriptedModel {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(LlmError::EmptyContent))
        }

        fn model_name(&self) -> &str {
            "scripted-model"
        }
    }

    fn analyzer(replies: Vec<Result<String, LlmError>>) -> (MatchAnalyzer, Arc<ScriptedModel>) {
        let model = Arc::new(ScriptedModel::new(replies));
        (MatchAnalyzer::new(model.clone()), model)
    }

    #[tokio::test]
    async fn test_strict_reply_yields_success() {
        let reply = r#"{"recommendation":"APPLY","match_score":85,"confidence_score":88,
            "strengths":["Python","AWS"],"weaknesses":[],"missing_skills":[],
            "experience_match":"Meets 5+ years","education_match":"n/a",
            "detailed_reasoning":"Strong overlap"}"#;
        let (analyzer, model) = analyzer(vec![Ok(reply.to_string())]);

        let result = analyzer
            .analyze("5 years Python, AWS", "Requires 5+ years Python and AWS")
            .await;

        assert_eq!(result.recommendation, Recommendation::Apply);
        assert_eq!(result.match_score, 85);
        assert_eq!(result.processing_status, ProcessingStatus::Success);
        assert_eq!(result.ai_model.as_deref(), Some("scripted-model"));

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("5 years Python, AWS"));
        assert!(prompts[0].contains("Requires 5+ years Python and AWS"));
    }

    #[tokio::test]
    async fn test_truncated_reply_yields_partial_success() {
        let reply = r#"Sure, here's my analysis: "recommendation": "AVOID", "match_score": 20"#;
        let (analyzer, _) = analyzer(vec![Ok(reply.to_string())]);

        let result = analyzer.analyze("resume", "job").await;

        assert_eq!(result.recommendation, Recommendation::Avoid);
        assert_eq!(result.match_score, 20);
        assert_eq!(result.processing_status, ProcessingStatus::PartialSuccess);
        assert!(result.parse_error.is_some());
    }

    #[tokio::test]
    async fn test_timeout_yields_error_result() {
        let (analyzer, _) = analyzer(vec![Err(LlmError::Timeout { secs: 60 })]);

        let result = analyzer.analyze("resume", "job").await;

        assert_eq!(result.processing_status, ProcessingStatus::Error);
        assert_eq!(result.recommendation, Recommendation::Avoid);
        assert_eq!(result.match_score, 0);
        assert_eq!(result.confidence_score, 0);
        assert!(result.detailed_reasoning.contains("timed out"));
        assert!(result.ai_model.is_none());
    }

    #[tokio::test]
    async fn test_api_error_message_is_reported() {
        let (analyzer, _) = analyzer(vec![Err(LlmError::Api {
            status: 401,
            message: "Incorrect API key provided".to_string(),
        })]);

        let result = analyzer.analyze("resume", "job").await;

        assert!(result.is_error());
        assert!(result
            .error_message
            .as_deref()
            .unwrap()
            .contains("Incorrect API key provided"));
    }

    #[tokio::test]
    async fn test_empty_inputs_are_still_analyzed() {
        let (analyzer, model) = analyzer(vec![Ok(r#"{"match_score": 5}"#.to_string())]);
        let result = analyzer.analyze("", "").await;
        assert_eq!(result.match_score, 5);
        assert_eq!(model.prompts.lock().unwrap().len(), 1);
    }
}
