//! Text processing and matching pipeline

pub mod aggregator;
pub mod comparator;
pub mod contact;
pub mod embeddings;
pub mod entities;
pub mod lemmatizer;
pub mod model_manager;
pub mod normalizer;
pub mod similarity;
pub mod skills;
pub mod stopwords;
pub mod tfidf;

pub use aggregator::{MatchAggregator, MatchResult, ScoreWeights};
pub use comparator::{CandidateResult, ComparativeInsights, Comparator, ComparisonResult, ResumeInput};
pub use contact::{ContactExtractor, ContactInfo};
pub use embeddings::{Embedder, EmbeddingEngine};
pub use skills::{SkillExtractor, SkillSet};
