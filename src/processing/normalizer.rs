//! Text normalization into a canonical token stream

use crate::processing::lemmatizer::Lemmatizer;
use crate::processing::skills::SKILL_VOCABULARY;
use crate::processing::stopwords::normalizer_stopwords;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

pub struct TextNormalizer {
    punctuation_regex: Regex,
    digit_regex: Regex,
    lemmatizer: Lemmatizer,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        let punctuation_regex = Regex::new(r"[^\w\s]").expect("Invalid punctuation regex");
        let digit_regex = Regex::new(r"\d+").expect("Invalid digit regex");

        let skill_words = SKILL_VOCABULARY
            .iter()
            .flat_map(|phrase| phrase.split_whitespace())
            .map(str::to_string);

        Self {
            punctuation_regex,
            digit_regex,
            lemmatizer: Lemmatizer::new().with_protected(skill_words),
        }
    }

    /// Lowercase, strip punctuation and digits, drop stopwords, lemmatize
    pub fn normalize(&self, text: &str) -> String {
        self.tokenize(text).join(" ")
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let without_punct = self.punctuation_regex.replace_all(&lowered, " ");
        let cleaned = self.digit_regex.replace_all(&without_punct, " ");

        let stopwords = normalizer_stopwords();
        cleaned
            .unicode_words()
            .filter(|word| !stopwords.contains(word))
            .map(|word| self.lemmatizer.lemmatize(word))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pipeline() {
        let normalizer = TextNormalizer::new();
        let normalized = normalizer.normalize("The Developers built 3 APIs, with Python & Docker!");
        assert_eq!(normalized, "developer built apis python docker");
    }

    #[test]
    fn test_skill_words_are_not_lemmatized() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("Kubernetes and Jenkins pipelines"), "kubernetes jenkins pipeline");
        assert_eq!(normalizer.normalize("statistics"), "statistics");
    }

    #[test]
    fn test_empty_and_stopword_only_input() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("the and of 2024 !!!"), "");
    }

    #[test]
    fn test_deterministic() {
        let normalizer = TextNormalizer::new();
        let text = "Senior engineer; 10 years of experience in data analysis.";
        assert_eq!(normalizer.normalize(text), normalizer.normalize(text));
    }
}
