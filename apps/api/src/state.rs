use crate::config::Config;
use crate::matching::analyzer::MatchAnalyzer;
use crate::matching::batch::BatchRanker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: MatchAnalyzer,
    pub ranker: BatchRanker,
    pub config: Config,
}

impl AppState {
    pub fn new(analyzer: MatchAnalyzer, config: Config) -> Self {
        let ranker = BatchRanker::new(analyzer.clone(), config.batch_concurrency);
        Self {
            analyzer,
            ranker,
            config,
        }
    }
}
