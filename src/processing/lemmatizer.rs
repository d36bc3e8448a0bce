//! Noun lemmatization with morphological suffix rules and an exception table

use std::collections::{HashMap, HashSet};

const EXCEPTIONS: &[(&str, &str)] = &[
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("women", "woman"),
    ("men", "man"),
    ("people", "person"),
    ("analyses", "analysis"),
    ("criteria", "criterion"),
    ("data", "data"),
];

/// Words that look plural but are already in base form
const INVARIANT: &[&str] = &[
    "news", "series", "species", "physics", "mathematics", "analytics", "economics",
    "logistics", "statistics", "kubernetes", "jenkins", "aws", "ios", "windows", "sales",
];

const ES_KEEPERS: &[&str] = &["caches", "niches", "headaches", "moustaches"];

const MEN_KEEPERS: &[&str] = &["specimen", "abdomen", "omen", "amen"];

pub struct Lemmatizer {
    exceptions: HashMap<&'static str, &'static str>,
    protected: HashSet<String>,
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer {
    pub fn new() -> Self {
        Self {
            exceptions: EXCEPTIONS.iter().copied().collect(),
            protected: INVARIANT.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Leave these tokens untouched (e.g. words of the skill vocabulary)
    pub fn with_protected<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected.extend(words.into_iter().map(Into::into));
        self
    }

    /// Reduce a lowercase token to its noun base form
    pub fn lemmatize(&self, token: &str) -> String {
        if let Some(base) = self.exceptions.get(token) {
            return (*base).to_string();
        }
        if self.protected.contains(token) || token.chars().count() <= 3 {
            return token.to_string();
        }
        if token.ends_with("ss") || token.ends_with("us") || token.ends_with("is") {
            return token.to_string();
        }

        if let Some(stem) = token.strip_suffix("ies") {
            if token.len() > 4 {
                return format!("{}y", stem);
            }
        }

        if let Some(stem) = token.strip_suffix("men") {
            if !MEN_KEEPERS.contains(&token) {
                return format!("{}man", stem);
            }
            return token.to_string();
        }

        if let Some(stem) = token.strip_suffix("ses") {
            // processes -> process, databases -> database
            let with_s = format!("{}s", stem);
            if with_s.ends_with("ss") {
                return with_s;
            }
            return format!("{}se", stem);
        }

        if token.ends_with("xes") || token.ends_with("zes") {
            return token[..token.len() - 2].to_string();
        }

        if token.ends_with("ches") || token.ends_with("shes") {
            if ES_KEEPERS.contains(&token) {
                return token[..token.len() - 1].to_string();
            }
            return token[..token.len() - 2].to_string();
        }

        if let Some(stem) = token.strip_suffix('s') {
            return stem.to_string();
        }

        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        let lemmatizer = Lemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("developers"), "developer");
        assert_eq!(lemmatizer.lemmatize("technologies"), "technology");
        assert_eq!(lemmatizer.lemmatize("processes"), "process");
        assert_eq!(lemmatizer.lemmatize("databases"), "database");
        assert_eq!(lemmatizer.lemmatize("boxes"), "box");
        assert_eq!(lemmatizer.lemmatize("branches"), "branch");
        assert_eq!(lemmatizer.lemmatize("caches"), "cache");
        assert_eq!(lemmatizer.lemmatize("chairmen"), "chairman");
    }

    #[test]
    fn test_exceptions_and_invariants() {
        let lemmatizer = Lemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("children"), "child");
        assert_eq!(lemmatizer.lemmatize("analyses"), "analysis");
        assert_eq!(lemmatizer.lemmatize("business"), "business");
        assert_eq!(lemmatizer.lemmatize("status"), "status");
        assert_eq!(lemmatizer.lemmatize("kubernetes"), "kubernetes");
        assert_eq!(lemmatizer.lemmatize("specimen"), "specimen");
        assert_eq!(lemmatizer.lemmatize("experience"), "experience");
    }

    #[test]
    fn test_protected_words_are_kept() {
        let lemmatizer = Lemmatizer::new().with_protected(["scrums"]);
        assert_eq!(lemmatizer.lemmatize("scrums"), "scrums");
    }
}
