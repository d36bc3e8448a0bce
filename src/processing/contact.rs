//! Contact details (name, email, phone) pulled out of résumé text

use crate::processing::entities::{EntityLabel, EntityRecognizer};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const NAME_WINDOW_CHARS: usize = 500;
const HEADER_SCAN_LINES: usize = 10;
const HEADER_KEYWORDS: &[&str] = &["resume", "cv", "curriculum", "email", "phone", "address", "objective"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// One way of finding the candidate's name; strategies are tried in order
pub trait NameStrategy: Send + Sync {
    fn label(&self) -> &'static str;
    fn find_name(&self, text: &str) -> Option<String>;
}

/// First person entity near the top of the document
pub struct EntityNameStrategy {
    recognizer: Arc<dyn EntityRecognizer>,
}

impl EntityNameStrategy {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }
}

impl NameStrategy for EntityNameStrategy {
    fn label(&self) -> &'static str {
        "entity"
    }

    fn find_name(&self, text: &str) -> Option<String> {
        let window: String = text.chars().take(NAME_WINDOW_CHARS).collect();
        self.recognizer
            .recognize(&window)
            .into_iter()
            .find(|e| e.label == EntityLabel::Person)
            .map(|e| e.text)
    }
}

/// Short header line that looks like a name
pub struct HeaderLineStrategy;

impl NameStrategy for HeaderLineStrategy {
    fn label(&self) -> &'static str {
        "header-line"
    }

    fn find_name(&self, text: &str) -> Option<String> {
        text.lines()
            .take(HEADER_SCAN_LINES)
            .map(str::trim)
            .find(|line| {
                let lowered = line.to_lowercase();
                let word_count = line.split_whitespace().count();
                !line.is_empty()
                    && line.chars().count() > 3
                    && !HEADER_KEYWORDS.iter().any(|k| lowered.contains(k))
                    && (1..=3).contains(&word_count)
                    && !line.chars().any(|c| c.is_ascii_digit())
            })
            .map(str::to_string)
    }
}

pub struct ContactExtractor {
    email_regex: Regex,
    phone_regex: Regex,
    strip_regex: Regex,
    name_strategies: Vec<Box<dyn NameStrategy>>,
}

impl ContactExtractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self::with_strategies(vec![
            Box::new(EntityNameStrategy::new(recognizer)),
            Box::new(HeaderLineStrategy),
        ])
    }

    pub fn with_strategies(name_strategies: Vec<Box<dyn NameStrategy>>) -> Self {
        let email_regex = Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
            .expect("Invalid email regex");
        let phone_regex = Regex::new(
            r"(\+\d{1,3}[-.\s]?)?(\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}|\d{10}|\d{3}[-.\s]?\d{3}[-.\s]?\d{4})",
        )
        .expect("Invalid phone regex");
        let strip_regex = Regex::new(r"[^\d+]").expect("Invalid phone cleanup regex");

        Self {
            email_regex,
            phone_regex,
            strip_regex,
            name_strategies,
        }
    }

    pub fn extract(&self, text: &str) -> ContactInfo {
        ContactInfo {
            name: self.extract_name(text),
            email: self.extract_email(text),
            phone: self.extract_phone(text),
        }
    }

    pub fn extract_email(&self, text: &str) -> Option<String> {
        self.email_regex.find(text).map(|m| m.as_str().to_string())
    }

    pub fn extract_phone(&self, text: &str) -> Option<String> {
        let caps = self.phone_regex.captures(text)?;
        let joined: String = caps
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str())
            .collect();
        let cleaned = self.strip_regex.replace_all(&joined, "").to_string();
        (cleaned.len() >= 10).then_some(cleaned)
    }

    pub fn extract_name(&self, text: &str) -> Option<String> {
        self.name_strategies.iter().find_map(|strategy| {
            let name = strategy.find_name(text);
            if let Some(found) = &name {
                debug!("Name '{}' found by {} strategy", found, strategy.label());
            }
            name
        })
    }
}
