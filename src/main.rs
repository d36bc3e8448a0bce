//! Resume matcher: score resumes against a job description

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use resume_matcher::cli::{self, candidate_names, display_name, Cli, Commands, ConfigAction, ModelAction};
use resume_matcher::config::{BackendKind, Config, OutputFormat};
use resume_matcher::input::InputManager;
use resume_matcher::llm::{CompletionClient, HttpCompletionClient, ModelAnalyst, ModelBackend, ModelResultCache};
use resume_matcher::output::{save_report_to_file, suggest_filename, ReportGenerator};
use resume_matcher::processing::model_manager::EmbeddingModelManager;
use resume_matcher::processing::{MatchAggregator, ResumeInput, ScoreWeights};
use resume_matcher::storage::InMemoryResultStore;
use resume_matcher::{AnalysisService, LocalBackend, MatcherError, Result, ScoringBackend};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone();
    let config = match &config_path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            job,
            backend,
            output,
            save,
            detailed,
        } => {
            let kind = resolve_backend(backend.as_deref(), &config)?;
            let format = resolve_format(output.as_deref(), &config)?;
            let save = save.map(|path| report_path(path, format, &display_name(&resume)));

            let mut input_manager = InputManager::new();
            let job_text = input_manager.extract_text(&job).await?;
            info!("Extracted {} characters of job description", job_text.len());

            let service = build_service(&config, kind)?;
            info!("Scoring with the {} backend", service.backend_name());
            let stored = service.analyze_path(&mut input_manager, &resume, &job_text).await?;

            let reports = ReportGenerator::new(config.output.color_output && save.is_none(), detailed || config.output.detailed);
            let report = reports.match_report(&stored.result, stored.id.as_ref(), format)?;
            emit(&report, save.as_deref())?;
        }

        Commands::Compare {
            resumes,
            job,
            backend,
            insights,
            output,
            save,
        } => {
            let kind = resolve_backend(backend.as_deref(), &config)?;
            let format = resolve_format(output.as_deref(), &config)?;
            let save = save.map(|path| report_path(path, format, "comparison"));

            let mut input_manager = InputManager::new();
            let job_text = input_manager.extract_text(&job).await?;
            let mut inputs = Vec::with_capacity(resumes.len());
            for (path, name) in resumes.iter().zip(candidate_names(&resumes)) {
                let text = input_manager.extract_text(path).await?;
                inputs.push(ResumeInput::new(name, text));
            }

            let mut service = build_service(&config, kind)?;
            if insights {
                service = service.with_analyst(build_analyst(&config)?);
            }

            let progress = ProgressBar::new(inputs.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                    .map_err(|e| MatcherError::OutputFormatting(e.to_string()))?
                    .progress_chars("=> "),
            );
            let stored = service
                .compare_with_progress(&inputs, &job_text, insights, |_, name| {
                    progress.set_message(name.to_string());
                    progress.inc(1);
                })
                .await;
            progress.finish_and_clear();
            let stored = stored?;

            let reports = ReportGenerator::new(config.output.color_output && save.is_none(), config.output.detailed);
            let report = reports.comparison_report(&stored.result, stored.id.as_ref(), format)?;
            emit(&report, save.as_deref())?;
        }

        Commands::Ask { resume, job, question } => {
            let mut input_manager = InputManager::new();
            let resume_text = input_manager.extract_text(&resume).await?;
            let job_text = input_manager.extract_text(&job).await?;

            let service = build_service(&config, config.scoring.backend)?.with_analyst(build_analyst(&config)?);
            let answer = service.ask(&resume_text, &job_text, &question).await?;
            println!("{}", answer);
        }

        Commands::Models { action } => {
            let manager = EmbeddingModelManager::new(&config);
            match action {
                ModelAction::List => {
                    println!("Embedding models ({})\n", manager.models_dir().display());
                    for status in manager.list_models() {
                        let marker = if status.model.name == config.models.default_embedding_model {
                            " (default)"
                        } else {
                            ""
                        };
                        let state = if status.downloaded { "downloaded" } else { "not downloaded" };
                        println!(
                            "  • {}{} - {} MB, {} [{}]",
                            status.model.name, marker, status.model.size_mb, status.model.description, state
                        );
                    }
                }
                ModelAction::Download { model } => {
                    let path = manager.download_model(&model).await?;
                    println!("Model '{}' ready at {}", model, path.display());
                }
                ModelAction::Remove { model } => {
                    manager.remove_model(&model).await?;
                    println!("Model '{}' removed", model);
                }
            }
        }

        Commands::Config { action } => {
            let target = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    let rendered = toml::to_string_pretty(&config)
                        .map_err(|e| MatcherError::Configuration(format!("Failed to render config: {}", e)))?;
                    println!("# {}\n{}", target.display(), rendered);
                }
                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&target)?;
                    println!("Configuration reset to defaults at {}", target.display());
                }
                Some(ConfigAction::Set { key, value }) => {
                    let mut config = config;
                    config.set_value(&key, &value)?;
                    config.save_to(&target)?;
                    println!("Set {} = {}", key, value);
                }
            }
        }
    }

    Ok(())
}

fn resolve_backend(flag: Option<&str>, config: &Config) -> Result<BackendKind> {
    match flag {
        Some(value) => cli::parse_backend(value).map_err(MatcherError::InvalidInput),
        None => Ok(config.scoring.backend),
    }
}

fn resolve_format(flag: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match flag {
        Some(value) => cli::parse_output_format(value).map_err(MatcherError::InvalidInput),
        None => Ok(config.output.format),
    }
}

fn build_service(config: &Config, kind: BackendKind) -> Result<AnalysisService> {
    let weights = ScoreWeights::from(&config.scoring);
    let backend: Arc<dyn ScoringBackend> = match kind {
        BackendKind::Local => {
            let engine = EmbeddingModelManager::new(config).load_default(config)?;
            let aggregator = MatchAggregator::new(Arc::new(engine), weights)?;
            Arc::new(LocalBackend::new(aggregator))
        }
        BackendKind::Model => {
            let client: Arc<dyn CompletionClient> = Arc::new(HttpCompletionClient::new(&config.llm)?);
            let cache = Arc::new(ModelResultCache::new(config.llm.cache_capacity));
            Arc::new(ModelBackend::new(client, cache, weights))
        }
    };
    Ok(AnalysisService::new(backend).with_store(Arc::new(InMemoryResultStore::new())))
}

fn build_analyst(config: &Config) -> Result<ModelAnalyst> {
    let client: Arc<dyn CompletionClient> = Arc::new(HttpCompletionClient::new(&config.llm)?);
    Ok(ModelAnalyst::new(client))
}

/// A directory target gets a generated file name
fn report_path(path: PathBuf, format: OutputFormat, name: &str) -> PathBuf {
    if path.is_dir() {
        path.join(suggest_filename(format, name))
    } else {
        path
    }
}

fn emit(report: &str, save: Option<&Path>) -> Result<()> {
    match save {
        Some(path) => {
            save_report_to_file(report, path)?;
            println!("Report saved to {}", path.display());
        }
        None => println!("{}", report),
    }
    Ok(())
}
