//! Downloading and managing Model2Vec embedding models

use crate::config::{AvailableModel, Config};
use crate::error::{MatcherError, Result};
use crate::processing::embeddings::EmbeddingEngine;
use hf_hub::api::tokio::Api;
use log::{info, warn};
use std::path::{Path, PathBuf};
use tokio::fs;

const REQUIRED_FILES: &[&str] = &["model.safetensors", "tokenizer.json"];
const OPTIONAL_FILES: &[&str] = &["config.json", "README.md"];

#[derive(Debug, Clone)]
pub struct ModelStatus {
    pub model: AvailableModel,
    pub downloaded: bool,
    pub path: PathBuf,
}

pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    available_models: Vec<AvailableModel>,
}

impl EmbeddingModelManager {
    pub fn new(config: &Config) -> Self {
        Self {
            models_dir: config.models_dir().clone(),
            available_models: config.models.available_models.clone(),
        }
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn get_model_info(&self, name: &str) -> Option<&AvailableModel> {
        self.available_models.iter().find(|m| m.name == name)
    }

    fn require_model(&self, name: &str) -> Result<&AvailableModel> {
        self.get_model_info(name).ok_or_else(|| {
            MatcherError::ModelLoading(format!(
                "Unknown embedding model '{}'. Run `models list` to see available models",
                name
            ))
        })
    }

    pub fn model_dir(&self, name: &str) -> PathBuf {
        self.models_dir.join(name)
    }

    /// A model counts as downloaded once its weights and tokenizer are on disk
    pub fn is_downloaded(&self, name: &str) -> bool {
        let dir = self.model_dir(name);
        REQUIRED_FILES.iter().all(|file| dir.join(file).is_file())
    }

    pub fn list_models(&self) -> Vec<ModelStatus> {
        self.available_models
            .iter()
            .map(|model| ModelStatus {
                model: model.clone(),
                downloaded: self.is_downloaded(&model.name),
                path: self.model_dir(&model.name),
            })
            .collect()
    }

    pub async fn download_model(&self, name: &str) -> Result<PathBuf> {
        let model = self.require_model(name)?;
        let model_dir = self.model_dir(name);

        if self.is_downloaded(name) {
            info!("Embedding model '{}' already present at {}", name, model_dir.display());
            return Ok(model_dir);
        }

        info!("Downloading embedding model {} ({} MB) from {}", model.name, model.size_mb, model.repo_id);
        fs::create_dir_all(&model_dir).await?;

        let api = Api::new()
            .map_err(|e| MatcherError::Network(format!("Failed to initialize Hugging Face API: {}", e)))?;
        let repo = api.repo(hf_hub::Repo::model(model.repo_id.clone()));

        for file in REQUIRED_FILES.iter().chain(OPTIONAL_FILES.iter()) {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await?;
                    info!("Downloaded {}", file);
                }
                Err(e) if OPTIONAL_FILES.contains(file) => {
                    warn!("Optional file {} not available: {}", file, e);
                }
                Err(e) => {
                    return Err(MatcherError::Network(format!(
                        "Failed to download required file {}: {}",
                        file, e
                    )));
                }
            }
        }

        Ok(model_dir)
    }

    pub async fn remove_model(&self, name: &str) -> Result<()> {
        self.require_model(name)?;
        let model_dir = self.model_dir(name);
        if !model_dir.exists() {
            return Err(MatcherError::InvalidInput(format!(
                "Embedding model '{}' is not downloaded",
                name
            )));
        }
        fs::remove_dir_all(&model_dir).await?;
        info!("Removed embedding model '{}'", name);
        Ok(())
    }

    /// Local directory when downloaded, otherwise the Hub repo id for on-demand fetching
    pub fn resolve_source(&self, name: &str) -> Result<PathBuf> {
        if self.is_downloaded(name) {
            return Ok(self.model_dir(name));
        }
        let model = self.require_model(name)?;
        Ok(PathBuf::from(&model.repo_id))
    }

    pub fn load_default(&self, config: &Config) -> Result<EmbeddingEngine> {
        let name = &config.models.default_embedding_model;
        let source = self.resolve_source(name)?;
        EmbeddingEngine::load(&source, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager_in(dir: &TempDir) -> EmbeddingModelManager {
        let mut config = Config::default();
        config.models.models_dir = dir.path().to_path_buf();
        EmbeddingModelManager::new(&config)
    }

    #[test]
    fn test_list_models_reports_download_state() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);

        let model_dir = manager.model_dir("m2v-base");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("model.safetensors"), b"weights").unwrap();
        std::fs::write(model_dir.join("tokenizer.json"), b"{}").unwrap();

        let statuses = manager.list_models();
        assert_eq!(statuses.len(), 3);
        let base = statuses.iter().find(|s| s.model.name == "m2v-base").unwrap();
        assert!(base.downloaded);
        assert!(statuses.iter().filter(|s| s.downloaded).count() == 1);
    }

    #[test]
    fn test_resolve_source_falls_back_to_repo_id() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);
        assert_eq!(
            manager.resolve_source("potion-base-8m").unwrap(),
            PathBuf::from("minishlab/potion-base-8M")
        );
        assert!(manager.resolve_source("no-such-model").is_err());
    }

    #[tokio::test]
    async fn test_remove_model() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);

        assert!(manager.remove_model("m2v-large").await.is_err());

        let model_dir = manager.model_dir("m2v-large");
        std::fs::create_dir_all(&model_dir).unwrap();
        manager.remove_model("m2v-large").await.unwrap();
        assert!(!model_dir.exists());
    }
}
