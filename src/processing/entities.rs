//! Rule-based named-entity recognition for people, organizations and products

use crate::error::{MatcherError, Result};
use crate::processing::skills::on_word_boundary;
use aho_corasick::{AhoCorasick, MatchKind};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityLabel {
    Person,
    Organization,
    Product,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

/// Anything that can tag spans of text. Entities come back in text order.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Vec<Entity>;
}

const KNOWN_ORGANIZATIONS: &[&str] = &[
    "google", "microsoft", "amazon", "apple", "meta", "facebook", "netflix", "ibm", "oracle",
    "salesforce", "adobe", "intel", "nvidia", "github", "gitlab", "atlassian", "red hat",
    "spotify", "uber", "airbnb", "twitter", "linkedin",
];

const KNOWN_PRODUCTS: &[&str] = &[
    "excel", "tableau", "power bi", "photoshop", "illustrator", "figma", "slack", "postgresql",
    "mysql", "redis", "kafka", "spark", "hadoop", "pytorch", "tensorflow", "android", "linux",
];

/// Capitalized words that start lines of a résumé but are not names
const NON_NAME_WORDS: &[&str] = &[
    "Software", "Engineer", "Engineering", "Developer", "Development", "Summary", "Experience",
    "Education", "Skills", "Manager", "Management", "Senior", "Junior", "Lead", "Principal",
    "Street", "Avenue", "Road", "Professional", "Profile", "Objective", "Contact", "Resume",
    "Curriculum", "Vitae", "Data", "Scientist", "Analyst", "Projects", "Certifications",
    "References", "University", "College", "Bachelor", "Master", "Science", "Technology",
    "Looking", "Required", "Requirements", "Responsibilities", "About", "Team", "Company",
    "Inc", "Corp", "Ltd", "Group", "Systems", "Solutions", "Technologies", "Labs",
];

pub struct RuleBasedRecognizer {
    person_regex: Regex,
    cased_org_regex: Regex,
    university_regex: Regex,
    uncased_org_regex: Regex,
    gazetteer: AhoCorasick,
    gazetteer_labels: Vec<EntityLabel>,
}

impl RuleBasedRecognizer {
    pub fn new() -> Result<Self> {
        let person_regex = Regex::new(r"\b([A-Z][a-z]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z]+){1,2})\b")
            .expect("Invalid person regex");
        let cased_org_regex = Regex::new(
            r"\b((?:[A-Z][\w&]*[ \t]+){1,3}(?:Inc|Corp|Corporation|LLC|Ltd|Limited|GmbH|PLC|Technologies|Labs|Systems|Group|Solutions))\b",
        )
        .expect("Invalid organization regex");
        let university_regex = Regex::new(r"\bUniversity[ \t]+of[ \t]+[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)?\b")
            .expect("Invalid university regex");
        let uncased_org_regex = Regex::new(
            r"\b([a-z][a-z0-9]+[ \t]+(?:inc|corp|corporation|llc|ltd|gmbh|plc|technologies|labs))\b",
        )
        .expect("Invalid lowercase organization regex");

        let mut patterns = Vec::new();
        let mut gazetteer_labels = Vec::new();
        for org in KNOWN_ORGANIZATIONS {
            patterns.push(*org);
            gazetteer_labels.push(EntityLabel::Organization);
        }
        for product in KNOWN_PRODUCTS {
            patterns.push(*product);
            gazetteer_labels.push(EntityLabel::Product);
        }

        let gazetteer = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| MatcherError::TextProcessing(format!("Failed to build entity gazetteer: {}", e)))?;

        Ok(Self {
            person_regex,
            cased_org_regex,
            university_regex,
            uncased_org_regex,
            gazetteer,
            gazetteer_labels,
        })
    }

    fn is_plausible_name(&self, candidate: &str) -> bool {
        let lowered = candidate.to_lowercase();
        let mentions_org = KNOWN_ORGANIZATIONS
            .iter()
            .chain(KNOWN_PRODUCTS.iter())
            .any(|known| lowered.split_whitespace().any(|w| w == *known));

        !mentions_org
            && !candidate
                .split_whitespace()
                .any(|word| NON_NAME_WORDS.contains(&word.trim_end_matches('.')))
    }

    fn push_regex_matches(regex: &Regex, text: &str, label: EntityLabel, found: &mut Vec<Entity>) {
        for m in regex.find_iter(text) {
            found.push(Entity {
                text: m.as_str().to_string(),
                label,
                start: m.start(),
                end: m.end(),
            });
        }
    }
}

impl EntityRecognizer for RuleBasedRecognizer {
    fn recognize(&self, text: &str) -> Vec<Entity> {
        let mut found = Vec::new();

        Self::push_regex_matches(&self.cased_org_regex, text, EntityLabel::Organization, &mut found);
        Self::push_regex_matches(&self.university_regex, text, EntityLabel::Organization, &mut found);
        Self::push_regex_matches(&self.uncased_org_regex, text, EntityLabel::Organization, &mut found);

        for m in self.gazetteer.find_iter(text) {
            if on_word_boundary(text, m.start(), m.end()) {
                found.push(Entity {
                    text: text[m.start()..m.end()].to_string(),
                    label: self.gazetteer_labels[m.pattern().as_usize()],
                    start: m.start(),
                    end: m.end(),
                });
            }
        }

        for m in self.person_regex.find_iter(text) {
            if self.is_plausible_name(m.as_str()) {
                found.push(Entity {
                    text: m.as_str().to_string(),
                    label: EntityLabel::Person,
                    start: m.start(),
                    end: m.end(),
                });
            }
        }

        // Earlier spans win; on a tie the longer one does
        found.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        let mut entities: Vec<Entity> = Vec::with_capacity(found.len());
        for entity in found {
            if entities.last().map_or(true, |prev| entity.start >= prev.end) {
                entities.push(entity);
            }
        }
        entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_of(entities: &[Entity], label: EntityLabel) -> Vec<String> {
        entities
            .iter()
            .filter(|e| e.label == label)
            .map(|e| e.text.clone())
            .collect()
    }

    #[test]
    fn test_person_detection() {
        let recognizer = RuleBasedRecognizer::new().unwrap();
        let entities = recognizer.recognize("Jane Q. Doe\nSoftware Engineer\njane@example.com");
        assert_eq!(labels_of(&entities, EntityLabel::Person), vec!["Jane Q. Doe"]);
    }

    #[test]
    fn test_job_titles_are_not_people() {
        let recognizer = RuleBasedRecognizer::new().unwrap();
        let entities = recognizer.recognize("Senior Software Engineer\nProfessional Summary");
        assert!(labels_of(&entities, EntityLabel::Person).is_empty());
    }

    #[test]
    fn test_organizations_and_products() {
        let recognizer = RuleBasedRecognizer::new().unwrap();
        let entities = recognizer.recognize("worked at acme corp and google using tableau and excel");
        assert_eq!(labels_of(&entities, EntityLabel::Organization), vec!["acme corp", "google"]);
        assert_eq!(labels_of(&entities, EntityLabel::Product), vec!["tableau", "excel"]);
    }

    #[test]
    fn test_gazetteer_respects_word_boundaries() {
        let recognizer = RuleBasedRecognizer::new().unwrap();
        let entities = recognizer.recognize("metadata and applesauce");
        assert!(entities.is_empty());
    }

    #[test]
    fn test_cased_organization_suffix() {
        let recognizer = RuleBasedRecognizer::new().unwrap();
        let entities = recognizer.recognize("Previously at Initech Solutions in Austin.");
        assert_eq!(labels_of(&entities, EntityLabel::Organization), vec!["Initech Solutions"]);
    }
}
