//! Batch Ranker — one résumé against many job descriptions.
//!
//! Entries are analyzed concurrently (bounded by a semaphore), reassembled in
//! input order, and only then stably sorted by `match_score` descending, so
//! equal scores keep their input order.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};
use uuid::Uuid;

use crate::matching::analyzer::MatchAnalyzer;
use crate::matching::models::{AnalysisResult, BatchEntry, RankedResult};

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Clone)]
pub struct BatchRanker {
    analyzer: MatchAnalyzer,
    concurrency: usize,
}

impl BatchRanker {
    pub fn new(analyzer: MatchAnalyzer, concurrency: usize) -> Self {
        Self {
            analyzer,
            concurrency: concurrency.max(1),
        }
    }

    /// Returns exactly one `RankedResult` per entry, best match first.
    pub async fn rank(&self, resume_text: &str, entries: &[BatchEntry]) -> Vec<RankedResult> {
        let batch_id = Uuid::new_v4();
        info!(
            "Batch {batch_id}: ranking {} job descriptions (concurrency {})",
            entries.len(),
            self.concurrency
        );

        let resume_text: Arc<str> = Arc::from(resume_text);
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, entry) in entries.iter().enumerate() {
            let analyzer = self.analyzer.clone();
            let resume_text = Arc::clone(&resume_text);
            let permits = Arc::clone(&permits);
            let job_text = entry.text.clone();

            tasks.spawn(async move {
                // The semaphore is never closed, so acquire only fails if it were.
                let _permit = permits.acquire_owned().await.ok();
                (index, analyzer.analyze(&resume_text, &job_text).await)
            });
        }

        let mut analyses: Vec<Option<AnalysisResult>> = vec![None; entries.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, analysis)) => analyses[index] = Some(analysis),
                Err(e) => error!("Batch {batch_id}: analysis task did not finish: {e}"),
            }
        }

        let results = entries
            .iter()
            .zip(analyses)
            .map(|(entry, analysis)| {
                let analysis = analysis.unwrap_or_else(|| {
                    AnalysisResult::invocation_failure("analysis task did not finish", Utc::now())
                });
                RankedResult::new(analysis, entry)
            })
            .collect();

        let ranked = sort_by_match_score(results);

        let failures = ranked.iter().filter(|r| r.analysis.is_error()).count();
        info!(
            "Batch {batch_id}: ranked {} results ({} failed)",
            ranked.len(),
            failures
        );

        ranked
    }
}

/// Stable sort, highest `match_score` first.
pub fn sort_by_match_score(mut results: Vec<RankedResult>) -> Vec<RankedResult> {
    results.sort_by(|a, b| b.match_score().cmp(&a.match_score()));
    results
}
