//! Hosted language-model integration

pub mod analyzer;
pub mod cache;
pub mod client;
pub mod prompts;

pub use analyzer::{ModelAnalyst, ModelBackend};
pub use cache::ModelResultCache;
pub use client::{CompletionClient, HttpCompletionClient};
