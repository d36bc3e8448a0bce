//! Keeping analysis results around for later retrieval

use crate::error::{MatcherError, Result};
use crate::processing::aggregator::MatchResult;
use crate::processing::comparator::ComparisonResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisId(Uuid);

impl AnalysisId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for AnalysisId {
    type Err = MatcherError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| MatcherError::InvalidInput(format!("'{}' is not a valid analysis id: {}", s, e)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "result", rename_all = "lowercase")]
pub enum AnalysisKind {
    Single(MatchResult),
    Comparison(ComparisonResult),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: AnalysisId,
    pub created_at: DateTime<Utc>,
    pub job_description: String,
    pub kind: AnalysisKind,
}

impl AnalysisRecord {
    pub fn new(job_description: impl Into<String>, kind: AnalysisKind) -> Self {
        Self {
            id: AnalysisId::new(),
            created_at: Utc::now(),
            job_description: job_description.into(),
            kind,
        }
    }
}

pub trait ResultStore: Send + Sync {
    fn insert(&self, record: AnalysisRecord) -> Result<AnalysisId>;
    fn get(&self, id: &AnalysisId) -> Result<Option<AnalysisRecord>>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-lifetime store; nothing expires
#[derive(Default)]
pub struct InMemoryResultStore {
    records: RwLock<HashMap<AnalysisId, AnalysisRecord>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for InMemoryResultStore {
    fn insert(&self, record: AnalysisRecord) -> Result<AnalysisId> {
        let id = record.id;
        self.records
            .write()
            .map_err(|_| MatcherError::Processing("result store lock poisoned".to_string()))?
            .insert(id, record);
        Ok(id)
    }

    fn get(&self, id: &AnalysisId) -> Result<Option<AnalysisRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| MatcherError::Processing("result store lock poisoned".to_string()))?;
        Ok(records.get(id).cloned())
    }

    fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }
}
