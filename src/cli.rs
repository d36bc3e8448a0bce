//! CLI interface for the resume matcher

use crate::config::{BackendKind, OutputFormat};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-matcher")]
#[command(about = "Score how well resumes match a job description")]
#[command(
    long_about = "Match resumes against a job description using skill overlap, TF-IDF and embedding similarity, with an optional hosted-model backend"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one resume against a job description
    Analyze {
        /// Path to resume file (PDF, DOCX, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job description file
        #[arg(short, long)]
        job: PathBuf,

        /// Scoring backend: local or model
        #[arg(short, long)]
        backend: Option<String>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Include the detailed sections of the report
        #[arg(short, long)]
        detailed: bool,
    },

    /// Rank several resumes against one job description
    Compare {
        /// Paths to resume files (at least two)
        #[arg(short, long, num_args = 1.., required = true)]
        resumes: Vec<PathBuf>,

        /// Path to job description file
        #[arg(short, long)]
        job: PathBuf,

        /// Scoring backend: local or model
        #[arg(short, long)]
        backend: Option<String>,

        /// Ask the model service for a narrative comparison
        #[arg(long)]
        insights: bool,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Ask a free-text question about a resume/job pair
    Ask {
        #[arg(short, long)]
        resume: PathBuf,

        #[arg(short, long)]
        job: PathBuf,

        #[arg(short, long)]
        question: String,
    },

    /// Embedding model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List available embedding models
    List,

    /// Download an embedding model from the Hugging Face Hub
    Download {
        /// Model name from the configuration
        model: String,
    },

    /// Remove a downloaded model
    Remove {
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "scoring.skill_weight")
        key: String,

        value: String,
    },
}

pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

pub fn parse_backend(backend: &str) -> Result<BackendKind, String> {
    match backend.to_lowercase().as_str() {
        "local" => Ok(BackendKind::Local),
        "model" | "llm" => Ok(BackendKind::Model),
        _ => Err(format!("Invalid backend: {}. Supported: local, model", backend)),
    }
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Report names for compared résumés. Base names that collide fall back to the full path.
pub fn candidate_names(paths: &[PathBuf]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for path in paths {
        *seen.entry(display_name(path)).or_default() += 1;
    }
    paths
        .iter()
        .map(|path| {
            let name = display_name(path);
            if seen.get(&name).copied().unwrap_or(0) > 1 {
                path.display().to_string()
            } else {
                name
            }
        })
        .collect()
}
