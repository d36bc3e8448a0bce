//! Combines skill overlap and semantic similarity into a single explainable match

use crate::config::ScoringConfig;
use crate::error::Result;
use crate::processing::contact::{ContactExtractor, ContactInfo};
use crate::processing::embeddings::Embedder;
use crate::processing::entities::{EntityRecognizer, RuleBasedRecognizer};
use crate::processing::normalizer::TextNormalizer;
use crate::processing::similarity::SimilarityScorer;
use crate::processing::skills::{SkillExtractor, SkillSet};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_percentage: f64,
    pub skill_match_percentage: f64,
    pub semantic_match_percentage: f64,
    pub matched_skills: SkillSet,
    pub missing_skills: SkillSet,
    pub recommendations: Vec<String>,
    pub contact_info: ContactInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Weights applied to the skill and semantic components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub skill: f64,
    pub semantic: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            skill: 0.6,
            semantic: 0.4,
        }
    }
}

impl From<&ScoringConfig> for ScoreWeights {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            skill: config.skill_weight,
            semantic: config.semantic_weight,
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn clamp_percentage(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

impl MatchResult {
    /// Well-formed zero result carrying an explanation
    pub fn degraded(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..Self::default()
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.match_percentage == 0.0
            && self.skill_match_percentage == 0.0
            && self.semantic_match_percentage == 0.0
            && self.matched_skills.is_empty()
            && self.missing_skills.is_empty()
            && self.summary.is_some()
    }

    /// Clamp and round the components, then derive the overall score from them
    pub fn finalize(&mut self, weights: ScoreWeights) {
        self.skill_match_percentage = round2(clamp_percentage(self.skill_match_percentage));
        self.semantic_match_percentage = round2(clamp_percentage(self.semantic_match_percentage));
        self.match_percentage = round2(clamp_percentage(
            weights.skill * self.skill_match_percentage + weights.semantic * self.semantic_match_percentage,
        ));
    }
}

pub struct MatchAggregator {
    contact_extractor: ContactExtractor,
    skill_extractor: SkillExtractor,
    normalizer: TextNormalizer,
    scorer: SimilarityScorer,
    weights: ScoreWeights,
}

impl MatchAggregator {
    pub fn new(embedder: Arc<dyn Embedder>, weights: ScoreWeights) -> Result<Self> {
        let recognizer: Arc<dyn EntityRecognizer> = Arc::new(RuleBasedRecognizer::new()?);
        Ok(Self {
            contact_extractor: ContactExtractor::new(recognizer.clone()),
            skill_extractor: SkillExtractor::with_recognizer(Vec::new(), recognizer)?,
            normalizer: TextNormalizer::new(),
            scorer: SimilarityScorer::new(embedder),
            weights,
        })
    }

    pub fn with_skill_extractor(mut self, skill_extractor: SkillExtractor) -> Self {
        self.skill_extractor = skill_extractor;
        self
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    pub fn analyze(&self, resume_text: &str, job_text: &str) -> MatchResult {
        let contact_info = self.contact_extractor.extract(resume_text);

        let normalized_resume = self.normalizer.normalize(resume_text);
        let normalized_job = self.normalizer.normalize(job_text);

        let resume_skills = self.skill_extractor.extract(resume_text);
        let job_skills = self.skill_extractor.extract(job_text);

        let matched_skills = resume_skills.intersection(&job_skills);
        let missing_skills = job_skills.difference(&resume_skills);

        let skill_match_percentage = if job_skills.is_empty() {
            0.0
        } else {
            100.0 * matched_skills.len() as f64 / job_skills.len() as f64
        };

        let similarity = self.scorer.score(&normalized_resume, &normalized_job);
        debug!(
            "Similarity: sparse {:.2}, dense {:.2}, blended {:.2}",
            similarity.sparse, similarity.dense, similarity.blended
        );

        let recommendations = build_recommendations(&missing_skills, &normalized_resume, &normalized_job);

        let mut result = MatchResult {
            match_percentage: 0.0,
            skill_match_percentage,
            semantic_match_percentage: similarity.blended,
            matched_skills,
            missing_skills,
            recommendations,
            contact_info,
            summary: None,
        };
        result.finalize(self.weights);
        result
    }
}

fn build_recommendations(missing_skills: &SkillSet, resume: &str, job: &str) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !missing_skills.is_empty() {
        recommendations.push(format!(
            "Consider adding these skills to your resume: {}",
            missing_skills.join(", ")
        ));
    }

    let emphasized = |term: &str| job.contains(term) && !resume.contains(term);

    if emphasized("education") {
        recommendations.push(
            "The job posting emphasizes education credentials. Consider highlighting your education section."
                .to_string(),
        );
    }
    if emphasized("experience") {
        recommendations.push(
            "The job posting emphasizes work experience. Make sure your experience section is well-detailed."
                .to_string(),
        );
    }
    if emphasized("certification") {
        recommendations.push(
            "The job posting mentions certifications. Consider adding relevant certifications to your resume."
                .to_string(),
        );
    }

    recommendations
}
