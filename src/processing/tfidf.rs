//! Sparse unigram + bigram TF-IDF vectors fitted jointly over a small corpus

use crate::error::{MatcherError, Result};
use crate::processing::stopwords::vectorizer_stopwords;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

pub type SparseVector = HashMap<usize, f64>;

pub struct TfidfVectorizer {
    token_regex: Regex,
    max_ngram: usize,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self {
            token_regex: Regex::new(r"\b\w\w+\b").expect("Invalid token regex"),
            max_ngram: 2,
        }
    }

    fn analyze(&self, document: &str) -> Vec<String> {
        let lowered = document.to_lowercase();
        let stopwords = vectorizer_stopwords();
        let tokens: Vec<&str> = self
            .token_regex
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !stopwords.contains(t))
            .collect();

        let mut terms = Vec::new();
        for n in 1..=self.max_ngram {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Fit on `documents` and return one L2-normalized row per document
    pub fn fit_transform(&self, documents: &[&str]) -> Result<Vec<SparseVector>> {
        let analyzed: Vec<Vec<String>> = documents.iter().map(|d| self.analyze(d)).collect();

        // Sorted vocabulary keeps feature indices reproducible
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for terms in &analyzed {
            let mut seen: Vec<&str> = terms.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(MatcherError::TextProcessing(
                "empty vocabulary; documents contain only stop words".to_string(),
            ));
        }

        let n_docs = documents.len() as f64;
        let mut index = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (i, (term, df)) in document_frequency.iter().enumerate() {
            index.insert(*term, i);
            idf.push(((1.0 + n_docs) / (1.0 + *df as f64)).ln() + 1.0);
        }

        let rows = analyzed
            .iter()
            .map(|terms| {
                let mut row = SparseVector::new();
                for term in terms {
                    if let Some(&i) = index.get(term.as_str()) {
                        *row.entry(i).or_insert(0.0) += 1.0;
                    }
                }
                for (i, value) in row.iter_mut() {
                    *value *= idf[*i];
                }
                let norm = row.values().map(|v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for value in row.values_mut() {
                        *value /= norm;
                    }
                }
                row
            })
            .collect();

        Ok(rows)
    }

    /// Cosine similarity of two documents in `[0, 1]`
    pub fn similarity(&self, a: &str, b: &str) -> Result<f64> {
        let rows = self.fit_transform(&[a, b])?;
        Ok(sparse_dot(&rows[0], &rows[1]))
    }
}

pub fn sparse_dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(i, v)| large.get(i).map(|w| v * w))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_documents() {
        let vectorizer = TfidfVectorizer::new();
        let score = vectorizer.similarity("python developer aws", "python developer aws").unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_documents() {
        let vectorizer = TfidfVectorizer::new();
        let score = vectorizer.similarity("python developer", "accountant ledger").unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_partial_overlap_is_between_zero_and_one() {
        let vectorizer = TfidfVectorizer::new();
        let score = vectorizer
            .similarity("experienced python developer aws docker", "looking python developer aws")
            .unwrap();
        assert!(score > 0.0 && score < 1.0);
    }

    #[test]
    fn test_bigrams_skip_stop_words() {
        let vectorizer = TfidfVectorizer::new();
        let terms = vectorizer.analyze("data and science");
        assert_eq!(terms, vec!["data", "science", "data science"]);
    }

    #[test]
    fn test_single_characters_and_stop_words_give_empty_vocabulary() {
        let vectorizer = TfidfVectorizer::new();
        assert!(vectorizer.similarity("a b c", "the and").is_err());
        assert!(vectorizer.similarity("", "").is_err());
    }

    #[test]
    fn test_rows_are_unit_length() {
        let vectorizer = TfidfVectorizer::new();
        let rows = vectorizer.fit_transform(&["rust rust tokio", "tokio serde"]).unwrap();
        for row in rows {
            let norm: f64 = row.values().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }
}
