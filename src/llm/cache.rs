//! Bounded memoization of model-backed match results

use crate::processing::aggregator::MatchResult;
use lru::LruCache;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    resume: String,
    job: String,
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl CacheKey {
    /// Whitespace-insensitive, case-sensitive key
    pub fn new(resume: &str, job: &str) -> Self {
        Self {
            resume: collapse_whitespace(resume),
            job: collapse_whitespace(job),
        }
    }
}

/// LRU of per-key cells so concurrent callers for one key share a single computation
pub struct ModelResultCache {
    entries: Mutex<LruCache<CacheKey, Arc<OnceCell<MatchResult>>>>,
}

impl ModelResultCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    async fn cell(&self, key: CacheKey) -> Arc<OnceCell<MatchResult>> {
        let mut entries = self.entries.lock().await;
        entries.get_or_insert(key, || Arc::new(OnceCell::new())).clone()
    }

    /// Return the cached result or run `compute`. Errors are handed back uncached.
    pub async fn get_or_try_compute<F, Fut, E>(&self, resume: &str, job: &str, compute: F) -> Result<MatchResult, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MatchResult, E>>,
    {
        let key = CacheKey::new(resume, job);
        let cell = self.cell(key.clone()).await;
        let outcome = cell.get_or_try_init(compute).await.cloned();
        if outcome.is_err() {
            // Drop the empty cell so failures do not take up capacity
            let mut entries = self.entries.lock().await;
            let stale = entries
                .peek(&key)
                .is_some_and(|current| Arc::ptr_eq(current, &cell) && !current.initialized());
            if stale {
                entries.pop(&key);
            }
        }
        outcome
    }

    pub async fn get(&self, resume: &str, job: &str) -> Option<MatchResult> {
        let mut entries = self.entries.lock().await;
        entries
            .get(&CacheKey::new(resume, job))
            .and_then(|cell| cell.get().cloned())
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}
