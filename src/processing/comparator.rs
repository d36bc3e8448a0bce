//! Ranking several résumés against one job description

use crate::backend::ScoringBackend;
use crate::processing::aggregator::MatchResult;
use crate::processing::skills::SkillSet;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeInput {
    pub file_name: String,
    pub text: String,
}

impl ResumeInput {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    #[serde(flatten)]
    pub result: MatchResult,
    pub file_name: String,
    /// 1-based upload position
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparativeInsights {
    pub overall_comparison: String,
    pub top_candidate_rationale: String,
    pub interview_priority: Vec<String>,
    pub skill_distribution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub candidates: Vec<CandidateResult>,
    pub common_skills: SkillSet,
    /// Keyed by the candidate's 1-based upload index
    pub unique_skills_by_resume: BTreeMap<usize, SkillSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<ComparativeInsights>,
}

impl ComparisonResult {
    pub fn top_candidate(&self) -> Option<&CandidateResult> {
        self.candidates.first()
    }
}

pub struct Comparator;

impl Comparator {
    /// Score each résumé in upload order, then rank and diff the results
    pub async fn compare(
        backend: &dyn ScoringBackend,
        resumes: &[ResumeInput],
        job_text: &str,
    ) -> ComparisonResult {
        Self::compare_with_progress(backend, resumes, job_text, |_, _| {}).await
    }

    pub async fn compare_with_progress<F>(
        backend: &dyn ScoringBackend,
        resumes: &[ResumeInput],
        job_text: &str,
        mut on_scored: F,
    ) -> ComparisonResult
    where
        F: FnMut(usize, &str),
    {
        let mut candidates = Vec::with_capacity(resumes.len());
        for (position, resume) in resumes.iter().enumerate() {
            let result = backend.score(&resume.text, job_text).await;
            info!(
                "Scored '{}' with {} backend: {:.2}%",
                resume.file_name,
                backend.name(),
                result.match_percentage
            );
            candidates.push(CandidateResult {
                result,
                file_name: resume.file_name.clone(),
                index: position + 1,
            });
            on_scored(position + 1, &resume.file_name);
        }

        Self::rank(candidates)
    }

    /// Stable descending sort plus cross-candidate skill set algebra
    pub fn rank(mut candidates: Vec<CandidateResult>) -> ComparisonResult {
        candidates.sort_by(|a, b| {
            b.result
                .match_percentage
                .partial_cmp(&a.result.match_percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let common_skills = match candidates.split_first() {
            Some((top, rest)) => top
                .result
                .matched_skills
                .iter()
                .filter(|skill| rest.iter().all(|c| c.result.matched_skills.contains(skill)))
                .cloned()
                .collect(),
            None => SkillSet::new(),
        };

        let mut unique_skills_by_resume = BTreeMap::new();
        for (i, candidate) in candidates.iter().enumerate() {
            let unique: SkillSet = candidate
                .result
                .matched_skills
                .iter()
                .filter(|skill| {
                    !candidates
                        .iter()
                        .enumerate()
                        .any(|(j, other)| j != i && other.result.matched_skills.contains(skill))
                })
                .cloned()
                .collect();
            unique_skills_by_resume.insert(candidate.index, unique);
        }

        ComparisonResult {
            candidates,
            common_skills,
            unique_skills_by_resume,
            insights: None,
        }
    }
}
