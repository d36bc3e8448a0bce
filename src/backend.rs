//! Interchangeable scoring strategies

use crate::processing::aggregator::{MatchAggregator, MatchResult};
use async_trait::async_trait;

/// Produces a match result for one résumé/job pair. Implementations never fail;
/// problems surface as degraded results.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    async fn score(&self, resume_text: &str, job_text: &str) -> MatchResult;

    fn name(&self) -> &str;
}

/// Deterministic skill + similarity pipeline
pub struct LocalBackend {
    aggregator: MatchAggregator,
}

impl LocalBackend {
    pub fn new(aggregator: MatchAggregator) -> Self {
        Self { aggregator }
    }
}

#[async_trait]
impl ScoringBackend for LocalBackend {
    async fn score(&self, resume_text: &str, job_text: &str) -> MatchResult {
        self.aggregator.analyze(resume_text, job_text)
    }

    fn name(&self) -> &str {
        "local"
    }
}
