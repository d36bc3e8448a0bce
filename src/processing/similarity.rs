//! Blended sparse + dense similarity between two normalized documents

use crate::processing::embeddings::{cosine_similarity, Embedder};
use crate::processing::tfidf::TfidfVectorizer;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Percentages in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityBreakdown {
    pub sparse: f64,
    pub dense: f64,
    pub blended: f64,
}

pub struct SimilarityScorer {
    vectorizer: TfidfVectorizer,
    embedder: Arc<dyn Embedder>,
}

fn clamp_percentage(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

impl SimilarityScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vectorizer: TfidfVectorizer::new(),
            embedder,
        }
    }

    pub fn sparse_similarity(&self, a: &str, b: &str) -> f64 {
        match self.vectorizer.similarity(a, b) {
            Ok(score) => clamp_percentage(score * 100.0),
            Err(e) => {
                debug!("Sparse similarity is 0: {}", e);
                0.0
            }
        }
    }

    pub fn dense_similarity(&self, a: &str, b: &str) -> f64 {
        let embed_pair = || -> crate::error::Result<f32> {
            let left = self.embedder.embed(a)?;
            let right = self.embedder.embed(b)?;
            cosine_similarity(&left, &right)
        };

        match embed_pair() {
            Ok(score) => clamp_percentage(score as f64 * 100.0),
            Err(e) => {
                warn!("Dense similarity via '{}' failed: {}", self.embedder.model_name(), e);
                0.0
            }
        }
    }

    pub fn score(&self, a: &str, b: &str) -> SimilarityBreakdown {
        let sparse = self.sparse_similarity(a, b);
        let dense = self.dense_similarity(a, b);
        SimilarityBreakdown {
            sparse,
            dense,
            blended: clamp_percentage((sparse + dense) / 2.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MatcherError, Result};

    struct BagOfLettersEmbedder;

    impl Embedder for BagOfLettersEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.is_empty() {
                return Ok(Vec::new());
            }
            let mut counts = vec![0.0f32; 26];
            for c in text.chars().filter(|c| c.is_ascii_lowercase()) {
                counts[(c as u8 - b'a') as usize] += 1.0;
            }
            Ok(counts)
        }

        fn model_name(&self) -> &str {
            "bag-of-letters"
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(MatcherError::Embedding("model unavailable".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_identical_texts_score_full() {
        let scorer = SimilarityScorer::new(Arc::new(BagOfLettersEmbedder));
        let breakdown = scorer.score("python developer", "python developer");
        assert!((breakdown.sparse - 100.0).abs() < 1e-6);
        assert!((breakdown.dense - 100.0).abs() < 1e-4);
        assert!((breakdown.blended - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_texts_score_zero() {
        let scorer = SimilarityScorer::new(Arc::new(BagOfLettersEmbedder));
        let breakdown = scorer.score("", "python");
        assert_eq!(breakdown.sparse, 0.0);
        assert_eq!(breakdown.dense, 0.0);
        assert_eq!(breakdown.blended, 0.0);
    }

    #[test]
    fn test_embedding_failure_only_zeroes_dense_signal() {
        let scorer = SimilarityScorer::new(Arc::new(FailingEmbedder));
        let breakdown = scorer.score("python developer", "python developer");
        assert_eq!(breakdown.dense, 0.0);
        assert!((breakdown.blended - 50.0).abs() < 1e-6);
    }
}
