//! Integration tests for the resume matcher

use resume_matcher::config::{BackendKind, Config};
use resume_matcher::input::InputManager;
use resume_matcher::processing::aggregator::round2;
use resume_matcher::processing::{Embedder, MatchAggregator, ResumeInput, ScoreWeights};
use resume_matcher::storage::{AnalysisKind, InMemoryResultStore};
use resume_matcher::{AnalysisService, LocalBackend, MatcherError, Result};
use std::sync::Arc;
use tempfile::TempDir;

/// Letter-frequency vectors: similar texts land close together without a model on disk
struct LetterEmbedder;

impl Embedder for LetterEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut counts = vec![0.0f32; 26];
        for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
            counts[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        Ok(counts)
    }

    fn model_name(&self) -> &str {
        "letters"
    }
}

fn local_service() -> AnalysisService {
    let aggregator = MatchAggregator::new(Arc::new(LetterEmbedder), ScoreWeights::default()).unwrap();
    AnalysisService::new(Arc::new(LocalBackend::new(aggregator))).with_store(Arc::new(InMemoryResultStore::new()))
}

#[tokio::test]
async fn test_empty_job_description_is_rejected() {
    let service = local_service();
    let result = service.analyze("Python developer", "").await;
    assert!(matches!(result, Err(MatcherError::InvalidInput(_))));
}

#[tokio::test]
async fn test_python_aws_match() {
    let service = local_service();
    let stored = service
        .analyze(
            "Experienced Python developer with AWS and Docker skills",
            "Looking for a Python developer with AWS experience",
        )
        .await
        .unwrap();
    let result = &stored.result;

    assert_eq!(result.matched_skills.as_slice(), &["python", "aws"]);
    assert!(result.missing_skills.is_empty());
    assert_eq!(result.skill_match_percentage, 100.0);
    assert!(result.semantic_match_percentage > 0.0);
    assert_eq!(
        result.match_percentage,
        round2(0.6 * result.skill_match_percentage + 0.4 * result.semantic_match_percentage)
    );

    let record = service.get(&stored.id.unwrap()).unwrap().unwrap();
    assert_eq!(record.kind, AnalysisKind::Single(stored.result.clone()));
}

#[tokio::test]
async fn test_phone_and_contact_extraction() {
    let service = local_service();
    let stored = service
        .analyze(
            "Jane Doe\njane.doe@example.com\nCall me at (555) 123-4567\nSQL and Tableau analyst",
            "Data analyst with SQL",
        )
        .await
        .unwrap();
    let contact = &stored.result.contact_info;
    assert_eq!(contact.name.as_deref(), Some("Jane Doe"));
    assert_eq!(contact.email.as_deref(), Some("jane.doe@example.com"));
    assert_eq!(contact.phone.as_deref(), Some("5551234567"));
}

#[tokio::test]
async fn test_scores_stay_in_range_and_are_deterministic() {
    let service = local_service();
    let resume = "Java engineer. Built microservices with Kubernetes and Terraform.";
    let job = "Senior Java engineer with Kubernetes, Go and machine learning experience";

    let first = service.analyze(resume, job).await.unwrap().result;
    let second = service.analyze(resume, job).await.unwrap().result;
    assert_eq!(first, second);

    for score in [
        first.match_percentage,
        first.skill_match_percentage,
        first.semantic_match_percentage,
    ] {
        assert!((0.0..=100.0).contains(&score));
    }
    assert!(first.matched_skills.iter().all(|s| !first.missing_skills.contains(s)));
}

#[tokio::test]
async fn test_identical_resumes_compare_equally() {
    let service = local_service();
    let text = "Python and SQL developer with Docker experience";
    let resumes = vec![ResumeInput::new("first.pdf", text), ResumeInput::new("second.pdf", text)];

    let comparison = service
        .compare(&resumes, "Python developer with SQL and AWS", false)
        .await
        .unwrap()
        .result;

    let first = &comparison.candidates[0];
    let second = &comparison.candidates[1];
    assert_eq!(first.result.match_percentage, second.result.match_percentage);
    // Ties keep upload order
    assert_eq!(first.file_name, "first.pdf");
    assert_eq!(second.file_name, "second.pdf");
    assert_eq!(comparison.common_skills, first.result.matched_skills);
    assert!(comparison.unique_skills_by_resume.values().all(|skills| skills.is_empty()));
}

#[tokio::test]
async fn test_comparison_ranks_descending() {
    let service = local_service();
    let resumes = vec![
        ResumeInput::new("weak.pdf", "Retail associate with customer service"),
        ResumeInput::new("strong.pdf", "Python developer with AWS, Docker and SQL"),
        ResumeInput::new("middle.pdf", "Python scripting"),
    ];

    let comparison = service
        .compare(&resumes, "Python developer with AWS, Docker and SQL", false)
        .await
        .unwrap()
        .result;

    assert_eq!(comparison.candidates.len(), 3);
    assert_eq!(comparison.top_candidate().map(|c| c.file_name.as_str()), Some("strong.pdf"));
    assert_eq!(comparison.top_candidate().map(|c| c.index), Some(2));
    assert!(comparison
        .candidates
        .windows(2)
        .all(|pair| pair[0].result.match_percentage >= pair[1].result.match_percentage));
}

#[tokio::test]
async fn test_text_extraction_from_files() {
    let dir = TempDir::new().unwrap();
    let txt = dir.path().join("resume.txt");
    let md = dir.path().join("job.md");
    std::fs::write(&txt, "Jane Doe\nPython developer").unwrap();
    std::fs::write(&md, "# Role\n\n**Python** developer with *AWS*").unwrap();

    let mut manager = InputManager::new();
    let resume = manager.extract_text(&txt).await.unwrap();
    let job = manager.extract_text(&md).await.unwrap();
    assert!(resume.contains("Jane Doe"));
    assert!(job.contains("Python"));
    assert!(!job.contains("**"));
    assert!(!job.contains('#'));
    assert_eq!(manager.cache_size(), 2);

    let missing = manager.extract_text(&dir.path().join("absent.txt")).await;
    assert!(matches!(missing, Err(MatcherError::InvalidInput(_))));
}

#[tokio::test]
async fn test_corrupt_resume_file_scores_zero_skills() {
    let dir = TempDir::new().unwrap();
    let resume = dir.path().join("resume.pdf");
    std::fs::write(&resume, "not a pdf").unwrap();

    let service = local_service();
    let mut manager = InputManager::new();
    let stored = service
        .analyze_path(&mut manager, &resume, "Python developer")
        .await
        .unwrap();

    assert_eq!(stored.result.skill_match_percentage, 0.0);
    assert!(stored.result.matched_skills.is_empty());
    assert!(stored.id.is_some());
}

#[test]
fn test_config_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::load_from(&path).unwrap();
    assert!(path.exists());
    assert_eq!(config.scoring.backend, BackendKind::Local);

    config.set_value("scoring.backend", "model").unwrap();
    config.set_value("scoring.skill_weight", "0.7").unwrap();
    config.save_to(&path).unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.scoring.backend, BackendKind::Model);
    assert!((reloaded.scoring.semantic_weight - 0.3).abs() < 1e-9);
    assert!(config.set_value("scoring.skill_weight", "1.5").is_err());
}
