//! Skill extraction from a curated vocabulary plus recognized organizations and products

use crate::error::{MatcherError, Result};
use crate::processing::entities::{EntityLabel, EntityRecognizer, RuleBasedRecognizer};
use aho_corasick::{AhoCorasick, MatchKind};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Curated vocabulary, matched in this order
pub const SKILL_VOCABULARY: &[&str] = &[
    "python", "java", "javascript", "html", "css", "sql", "nosql", "mongodb", "react", "angular",
    "vue", "node", "express", "django", "flask", "spring", "aws", "azure", "gcp", "docker",
    "kubernetes", "terraform", "jenkins", "git", "agile", "scrum", "kanban", "jira", "confluence",
    "bitbucket", "machine learning", "artificial intelligence", "data science", "nlp",
    "deep learning", "computer vision", "statistics", "data analysis", "leadership",
    "communication", "teamwork", "problem solving", "critical thinking",
];

const CORPORATE_SUFFIXES: &[&str] = &[
    "inc", "corp", "corporation", "llc", "ltd", "co", "company", "gmbh", "plc",
];

/// Ordered, duplicate-free list of lowercase skills
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSet(Vec<String>);

impl SkillSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append unless already present. Returns whether the skill was added.
    pub fn push(&mut self, skill: impl Into<String>) -> bool {
        let skill = skill.into();
        if self.contains(&skill) {
            return false;
        }
        self.0.push(skill);
        true
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.0.iter().any(|s| s == skill)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Members of `self` that are also in `other`, in `self`'s order
    pub fn intersection(&self, other: &SkillSet) -> SkillSet {
        self.iter().filter(|s| other.contains(s)).cloned().collect()
    }

    /// Members of `self` missing from `other`, in `self`'s order
    pub fn difference(&self, other: &SkillSet) -> SkillSet {
        self.iter().filter(|s| !other.contains(s)).cloned().collect()
    }

    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl FromIterator<String> for SkillSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        for skill in iter {
            set.push(skill);
        }
        set
    }
}

impl From<Vec<String>> for SkillSet {
    fn from(skills: Vec<String>) -> Self {
        skills.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a SkillSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// True when the byte range is not glued to other word characters
pub(crate) fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let before_ok = text[..start].chars().next_back().map_or(true, |c| !is_word(c));
    let after_ok = text[end..].chars().next().map_or(true, |c| !is_word(c));
    before_ok && after_ok
}

/// Key used to fold recognized entities into vocabulary skills they duplicate
fn fold_key(skill: &str) -> String {
    let collapsed = skill
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ','])
        .to_string();

    if let Some((head, last)) = collapsed.rsplit_once(' ') {
        if CORPORATE_SUFFIXES.contains(&last.trim_end_matches(['.', ','])) {
            return head.trim_end_matches(['.', ',']).to_string();
        }
    }
    collapsed
}

pub struct SkillExtractor {
    vocabulary: Vec<String>,
    matcher: AhoCorasick,
    recognizer: Arc<dyn EntityRecognizer>,
}

impl SkillExtractor {
    pub fn new() -> Result<Self> {
        Self::with_additional_skills(Vec::new())
    }

    /// Extend the curated vocabulary; extra skills are matched after the built-in ones
    pub fn with_additional_skills(additional_skills: Vec<String>) -> Result<Self> {
        let recognizer = RuleBasedRecognizer::new()?;
        Self::with_recognizer(additional_skills, Arc::new(recognizer))
    }

    pub fn with_recognizer(
        additional_skills: Vec<String>,
        recognizer: Arc<dyn EntityRecognizer>,
    ) -> Result<Self> {
        let mut vocabulary: Vec<String> = SKILL_VOCABULARY.iter().map(|s| s.to_string()).collect();
        for skill in additional_skills {
            let skill = skill.trim().to_lowercase();
            if !skill.is_empty() && !vocabulary.contains(&skill) {
                vocabulary.push(skill);
            }
        }

        // Standard semantics so overlapping phrases ("java" / "javascript") are all reported
        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&vocabulary)
            .map_err(|e| MatcherError::TextProcessing(format!("Failed to build skill matcher: {}", e)))?;

        Ok(Self {
            vocabulary,
            matcher,
            recognizer,
        })
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn extract(&self, text: &str) -> SkillSet {
        let lowered = text.to_lowercase();

        let mut hits = vec![false; self.vocabulary.len()];
        for m in self.matcher.find_overlapping_iter(&lowered) {
            if on_word_boundary(&lowered, m.start(), m.end()) {
                hits[m.pattern().as_usize()] = true;
            }
        }

        let mut skills: SkillSet = self
            .vocabulary
            .iter()
            .zip(hits)
            .filter(|(_, hit)| *hit)
            .map(|(skill, _)| skill.clone())
            .collect();

        for entity in self.recognizer.recognize(&lowered) {
            if !matches!(entity.label, EntityLabel::Organization | EntityLabel::Product) {
                continue;
            }
            let candidate = entity.text.to_lowercase();
            if candidate.chars().count() <= 2 || candidate.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }

            let key = fold_key(&candidate);
            if skills.iter().any(|existing| fold_key(existing) == key) {
                debug!("Folding entity '{}' into existing skill", candidate);
                continue;
            }
            skills.push(candidate);
        }

        skills
    }
}
