//! Resume matcher library

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod processing;
pub mod service;
pub mod storage;

pub use backend::{LocalBackend, ScoringBackend};
pub use config::Config;
pub use error::{MatcherError, Result};
pub use service::AnalysisService;
