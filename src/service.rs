//! Request boundary: input validation, backend dispatch and result storage

use crate::backend::ScoringBackend;
use crate::error::{MatcherError, Result};
use crate::input::InputManager;
use crate::llm::analyzer::{summarize_for_question, ModelAnalyst};
use crate::processing::aggregator::MatchResult;
use crate::processing::comparator::{Comparator, ComparisonResult, ResumeInput};
use crate::storage::{AnalysisId, AnalysisKind, AnalysisRecord, ResultStore};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

/// A result plus the id it was stored under, when a store is configured
#[derive(Debug, Clone)]
pub struct Stored<T> {
    pub id: Option<AnalysisId>,
    pub result: T,
}

pub struct AnalysisService {
    backend: Arc<dyn ScoringBackend>,
    analyst: Option<ModelAnalyst>,
    store: Option<Arc<dyn ResultStore>>,
}

fn require_text(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MatcherError::InvalidInput(message.to_string()));
    }
    Ok(())
}

impl AnalysisService {
    pub fn new(backend: Arc<dyn ScoringBackend>) -> Self {
        Self {
            backend,
            analyst: None,
            store: None,
        }
    }

    pub fn with_analyst(mut self, analyst: ModelAnalyst) -> Self {
        self.analyst = Some(analyst);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    fn store_record(&self, job_text: &str, kind: AnalysisKind) -> Result<Option<AnalysisId>> {
        match &self.store {
            Some(store) => {
                let id = store.insert(AnalysisRecord::new(job_text, kind))?;
                info!("Stored analysis {}", id);
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    pub async fn analyze(&self, resume_text: &str, job_text: &str) -> Result<Stored<MatchResult>> {
        require_text(resume_text, "No resume text provided")?;
        require_text(job_text, "No job description provided")?;
        self.score_and_store(resume_text, job_text).await
    }

    /// Analyze an uploaded PDF/DOCX. Unreadable documents are scored as empty text.
    pub async fn analyze_upload(
        &self,
        input: &InputManager,
        file_name: &str,
        bytes: &[u8],
        job_text: &str,
    ) -> Result<Stored<MatchResult>> {
        if bytes.is_empty() {
            return Err(MatcherError::InvalidInput("No resume file provided".to_string()));
        }
        require_text(job_text, "No job description provided")?;

        let resume_text = input.extract_upload(file_name, bytes).await?;
        self.score_and_store(&resume_text, job_text).await
    }

    /// Analyze a résumé on disk. The file must exist and be a supported type; an
    /// unreadable PDF/DOCX is scored as empty text.
    pub async fn analyze_path(
        &self,
        input: &mut InputManager,
        resume_path: &Path,
        job_text: &str,
    ) -> Result<Stored<MatchResult>> {
        require_text(job_text, "No job description provided")?;

        let resume_text = input.extract_text(resume_path).await?;
        if resume_text.trim().is_empty() {
            warn!("No text extracted from {}, scoring it as empty", resume_path.display());
        }
        self.score_and_store(&resume_text, job_text).await
    }

    async fn score_and_store(&self, resume_text: &str, job_text: &str) -> Result<Stored<MatchResult>> {
        let result = self.backend.score(resume_text, job_text).await;
        let id = self.store_record(job_text, AnalysisKind::Single(result.clone()))?;
        Ok(Stored { id, result })
    }

    pub async fn compare(
        &self,
        resumes: &[ResumeInput],
        job_text: &str,
        with_insights: bool,
    ) -> Result<Stored<ComparisonResult>> {
        self.compare_with_progress(resumes, job_text, with_insights, |_, _| {}).await
    }

    pub async fn compare_with_progress<F>(
        &self,
        resumes: &[ResumeInput],
        job_text: &str,
        with_insights: bool,
        on_scored: F,
    ) -> Result<Stored<ComparisonResult>>
    where
        F: FnMut(usize, &str),
    {
        if resumes.len() < 2 {
            return Err(MatcherError::InvalidInput(
                "Please provide at least 2 resumes to compare".to_string(),
            ));
        }
        require_text(job_text, "No job description provided")?;

        let analyst = match (with_insights, &self.analyst) {
            (false, _) => None,
            (true, Some(analyst)) => Some(analyst),
            (true, None) => {
                return Err(MatcherError::Configuration(
                    "Comparative insights require the model service to be configured".to_string(),
                ))
            }
        };

        let mut comparison =
            Comparator::compare_with_progress(self.backend.as_ref(), resumes, job_text, on_scored).await;

        if let Some(analyst) = analyst {
            comparison.insights = Some(analyst.comparative_insights(job_text, &comparison.candidates).await);
        }

        let id = self.store_record(job_text, AnalysisKind::Comparison(comparison.clone()))?;
        Ok(Stored { id, result: comparison })
    }

    /// Score the pair, then ask the model a free-text question about the outcome
    pub async fn ask(&self, resume_text: &str, job_text: &str, question: &str) -> Result<String> {
        require_text(resume_text, "No resume text provided")?;
        require_text(job_text, "No job description provided")?;
        require_text(question, "No question provided")?;

        let analyst = self.analyst.as_ref().ok_or_else(|| {
            MatcherError::Configuration("Questions require the model service to be configured".to_string())
        })?;

        let result = self.backend.score(resume_text, job_text).await;
        Ok(analyst
            .ask_question(job_text, &summarize_for_question(&result), question)
            .await)
    }

    pub fn get(&self, id: &AnalysisId) -> Result<Option<AnalysisRecord>> {
        match &self.store {
            Some(store) => store.get(id),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryResultStore;
    use async_trait::async_trait;

    struct FixedBackend;

    #[async_trait]
    impl ScoringBackend for FixedBackend {
        async fn score(&self, resume_text: &str, _job_text: &str) -> MatchResult {
            MatchResult {
                match_percentage: resume_text.len() as f64,
                ..MatchResult::default()
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn service_with_store() -> (AnalysisService, Arc<InMemoryResultStore>) {
        let store = Arc::new(InMemoryResultStore::new());
        let service = AnalysisService::new(Arc::new(FixedBackend)).with_store(store.clone());
        (service, store)
    }

    #[tokio::test]
    async fn test_missing_inputs_are_rejected() {
        let (service, store) = service_with_store();
        assert!(matches!(service.analyze("resume", "   ").await, Err(MatcherError::InvalidInput(_))));
        assert!(matches!(service.analyze("", "job").await, Err(MatcherError::InvalidInput(_))));
        assert!(matches!(
            service.compare(&[ResumeInput::new("a.pdf", "x")], "job", false).await,
            Err(MatcherError::InvalidInput(_))
        ));
        assert!(matches!(service.ask("r", "j", " ").await, Err(MatcherError::InvalidInput(_))));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_results_are_stored() {
        let (service, store) = service_with_store();
        let stored = service.analyze("resume", "job").await.unwrap();
        let id = stored.id.unwrap();

        let record = service.get(&id).unwrap().unwrap();
        assert_eq!(record.job_description, "job");
        assert_eq!(record.kind, AnalysisKind::Single(stored.result));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_compare_ranks_and_stores() {
        let (service, store) = service_with_store();
        let resumes = vec![ResumeInput::new("short.pdf", "ab"), ResumeInput::new("long.pdf", "abcdef")];
        let mut progress = Vec::new();
        let stored = service
            .compare_with_progress(&resumes, "job", false, |i, name| progress.push((i, name.to_string())))
            .await
            .unwrap();

        assert_eq!(stored.result.candidates[0].file_name, "long.pdf");
        assert_eq!(stored.result.candidates[0].index, 2);
        assert!(stored.result.insights.is_none());
        assert_eq!(progress, vec![(1, "short.pdf".to_string()), (2, "long.pdf".to_string())]);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_model_features_need_an_analyst() {
        let service = AnalysisService::new(Arc::new(FixedBackend));
        let resumes = vec![ResumeInput::new("a.pdf", "a"), ResumeInput::new("b.pdf", "b")];
        assert!(matches!(
            service.compare(&resumes, "job", true).await,
            Err(MatcherError::Configuration(_))
        ));
        assert!(matches!(
            service.ask("resume", "job", "Why?").await,
            Err(MatcherError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_boundary() {
        let service = AnalysisService::new(Arc::new(FixedBackend));
        let input = InputManager::new();

        assert!(matches!(
            service.analyze_upload(&input, "resume.txt", b"hello", "job").await,
            Err(MatcherError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            service.analyze_upload(&input, "resume.pdf", b"", "job").await,
            Err(MatcherError::InvalidInput(_))
        ));

        let stored = service.analyze_upload(&input, "resume.pdf", b"broken", "job").await.unwrap();
        assert_eq!(stored.result.match_percentage, 0.0);
        assert!(stored.id.is_none());
    }

    #[tokio::test]
    async fn test_analyze_path_requires_an_existing_file() {
        let service = AnalysisService::new(Arc::new(FixedBackend));
        let mut input = InputManager::new();
        let dir = tempfile::TempDir::new().unwrap();

        let missing = service
            .analyze_path(&mut input, &dir.path().join("absent.pdf"), "job")
            .await;
        assert!(matches!(missing, Err(MatcherError::InvalidInput(_))));

        let corrupt = dir.path().join("resume.pdf");
        std::fs::write(&corrupt, b"not a pdf").unwrap();
        let stored = service.analyze_path(&mut input, &corrupt, "job").await.unwrap();
        assert_eq!(stored.result.match_percentage, 0.0);
    }
}
