//! Dense text embeddings using Model2Vec

use crate::error::{MatcherError, Result};
use lru::LruCache;
use model2vec_rs::model::StaticModel;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

const EMBEDDING_CACHE_CAPACITY: usize = 64;

/// Something that turns text into a dense vector
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
    fn model_name(&self) -> &str;
}

pub struct EmbeddingEngine {
    model: StaticModel,
    model_name: String,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl EmbeddingEngine {
    /// Load a Model2Vec model from a local directory or Hugging Face repo id
    pub fn load(model_path: &Path, model_name: &str) -> Result<Self> {
        let start_time = Instant::now();
        log::info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(model_path, None, None, None)
            .map_err(|e| MatcherError::ModelLoading(format!("Failed to load model: {}", e)))?;

        log::info!("Model loaded in {:.2?}", start_time.elapsed());

        let capacity = NonZeroUsize::new(EMBEDDING_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            model,
            model_name: model_name.to_string(),
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    pub fn cache_size(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Embedder for EmbeddingEngine {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut cache = self
            .cache
            .lock()
            .map_err(|_| MatcherError::Embedding("embedding cache lock poisoned".to_string()))?;
        if let Some(hit) = cache.get(text) {
            return Ok(hit.clone());
        }

        let embedding = self.model.encode_single(text);
        cache.put(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Cosine similarity; empty, zero-norm, or non-finite input scores 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.is_empty() || b.is_empty() {
        return Ok(0.0);
    }

    if a.len() != b.len() {
        return Err(MatcherError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let score = dot_product / (norm_a * norm_b);
    Ok(if score.is_finite() { score } else { 0.0 })
}
