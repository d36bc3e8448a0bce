//! Configuration management for the resume matcher

use crate::error::{MatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub scoring: ScoringConfig,
    pub llm: LlmConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub default_embedding_model: String,
    pub available_models: Vec<AvailableModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableModel {
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Deterministic skill + similarity pipeline
    Local,
    /// Delegate scoring to the external language model service
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub backend: BackendKind,
    pub skill_weight: f64,
    pub semantic_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub cache_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-matcher")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                default_embedding_model: "m2v-base".to_string(),
                available_models: vec![
                    AvailableModel {
                        name: "m2v-base".to_string(),
                        repo_id: "minishlab/M2V_base_output".to_string(),
                        size_mb: 90,
                        description: "Fast Model2Vec base embeddings model".to_string(),
                    },
                    AvailableModel {
                        name: "potion-base-8m".to_string(),
                        repo_id: "minishlab/potion-base-8M".to_string(),
                        size_mb: 30,
                        description: "Compact Model2Vec model distilled for retrieval".to_string(),
                    },
                    AvailableModel {
                        name: "m2v-large".to_string(),
                        repo_id: "minishlab/M2V_large_output".to_string(),
                        size_mb: 250,
                        description: "High-quality Model2Vec large embeddings model".to_string(),
                    },
                ],
            },
            scoring: ScoringConfig {
                backend: BackendKind::Local,
                skill_weight: 0.6,
                semantic_weight: 0.4,
            },
            llm: LlmConfig {
                endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
                model: "gpt-4o-mini".to_string(),
                api_key_env: "RESUME_MATCHER_API_KEY".to_string(),
                timeout_secs: 60,
                max_tokens: 2048,
                cache_capacity: 128,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| MatcherError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| MatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-matcher")
            .join("config.toml")
    }

    /// Reject weight combinations that would break the 0..=100 score range
    pub fn validate(&self) -> Result<()> {
        let weights = &self.scoring;
        if weights.skill_weight < 0.0 || weights.semantic_weight < 0.0 {
            return Err(MatcherError::Configuration(
                "Scoring weights must not be negative".to_string(),
            ));
        }
        if ((weights.skill_weight + weights.semantic_weight) - 1.0).abs() > 1e-6 {
            return Err(MatcherError::Configuration(format!(
                "Scoring weights must sum to 1.0 (got {} + {})",
                weights.skill_weight, weights.semantic_weight
            )));
        }
        if self.get_model_by_name(&self.models.default_embedding_model).is_none() {
            return Err(MatcherError::Configuration(format!(
                "Default embedding model '{}' is not in the available models list",
                self.models.default_embedding_model
            )));
        }
        if self.llm.cache_capacity == 0 {
            return Err(MatcherError::Configuration(
                "llm.cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply a `section.key = value` override as used by `config set`
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parse_f64 = |v: &str| {
            v.parse::<f64>()
                .map_err(|_| MatcherError::Configuration(format!("'{}' is not a number", v)))
        };
        let parse_bool = |v: &str| {
            v.parse::<bool>()
                .map_err(|_| MatcherError::Configuration(format!("'{}' is not a boolean", v)))
        };

        match key {
            "scoring.backend" => {
                self.scoring.backend = match value.to_lowercase().as_str() {
                    "local" => BackendKind::Local,
                    "model" => BackendKind::Model,
                    other => {
                        return Err(MatcherError::Configuration(format!(
                            "Unknown backend '{}'. Supported: local, model",
                            other
                        )))
                    }
                }
            }
            "scoring.skill_weight" => {
                self.scoring.skill_weight = parse_f64(value)?;
                self.scoring.semantic_weight = 1.0 - self.scoring.skill_weight;
            }
            "scoring.semantic_weight" => {
                self.scoring.semantic_weight = parse_f64(value)?;
                self.scoring.skill_weight = 1.0 - self.scoring.semantic_weight;
            }
            "models.default_embedding_model" => {
                self.models.default_embedding_model = value.to_string()
            }
            "models.models_dir" => self.models.models_dir = PathBuf::from(value),
            "llm.endpoint" => self.llm.endpoint = value.to_string(),
            "llm.model" => self.llm.model = value.to_string(),
            "llm.api_key_env" => self.llm.api_key_env = value.to_string(),
            "llm.timeout_secs" => {
                self.llm.timeout_secs = value
                    .parse()
                    .map_err(|_| MatcherError::Configuration(format!("'{}' is not an integer", value)))?
            }
            "llm.cache_capacity" => {
                self.llm.cache_capacity = value
                    .parse()
                    .map_err(|_| MatcherError::Configuration(format!("'{}' is not an integer", value)))?
            }
            "output.detailed" => self.output.detailed = parse_bool(value)?,
            "output.color_output" => self.output.color_output = parse_bool(value)?,
            _ => {
                return Err(MatcherError::Configuration(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }

        self.validate()
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }

    pub fn get_model_by_name(&self, name: &str) -> Option<&AvailableModel> {
        self.models.available_models.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scoring.backend, BackendKind::Local);
        assert!((config.scoring.skill_weight - 0.6).abs() < f64::EPSILON);
        assert!(config.get_model_by_name("m2v-base").is_some());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.llm.cache_capacity, 128);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.models.default_embedding_model, config.models.default_embedding_model);
    }

    #[test]
    fn test_set_value_keeps_weights_balanced() {
        let mut config = Config::default();
        config.set_value("scoring.skill_weight", "0.7").unwrap();
        assert!((config.scoring.semantic_weight - 0.3).abs() < 1e-9);

        config.set_value("scoring.backend", "model").unwrap();
        assert_eq!(config.scoring.backend, BackendKind::Model);

        assert!(config.set_value("scoring.backend", "oracle").is_err());
        assert!(config.set_value("no.such.key", "1").is_err());
        assert!(config.set_value("models.default_embedding_model", "gpt-2").is_err());
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut config = Config::default();
        config.scoring.skill_weight = 0.9;
        assert!(config.validate().is_err());
    }
}
