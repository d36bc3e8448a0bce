//! Model-backed scoring, comparative insights and free-text questions

use crate::backend::ScoringBackend;
use crate::error::{MatcherError, Result};
use crate::llm::cache::ModelResultCache;
use crate::llm::client::CompletionClient;
use crate::llm::prompts;
use crate::processing::aggregator::{MatchResult, ScoreWeights};
use crate::processing::comparator::{CandidateResult, ComparativeInsights};
use crate::processing::contact::ContactInfo;
use crate::processing::skills::SkillSet;
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Strips ```json ... ``` or ``` ... ``` fences around a model reply
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped.strip_suffix("```").map(str::trim).unwrap_or(stripped)
        }
        None => text,
    }
}

/// Parse the outermost JSON object out of free-form model output
fn extract_json_object(raw: &str) -> Result<Map<String, Value>> {
    let text = strip_json_fences(raw);
    let start = text.find('{');
    let end = text.rfind('}');
    let sliced = match (start, end) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            return Err(MatcherError::ModelResponse(
                "response does not contain a JSON object".to_string(),
            ))
        }
    };

    match serde_json::from_str::<Value>(sliced)? {
        Value::Object(map) => Ok(map),
        _ => Err(MatcherError::ModelResponse("response JSON is not an object".to_string())),
    }
}

fn number_field(map: &Map<String, Value>, key: &str) -> f64 {
    match map.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn string_list_field(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => {
            s.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect()
        }
        _ => Vec::new(),
    }
}

fn optional_string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn skill_set_field(map: &Map<String, Value>, key: &str) -> SkillSet {
    string_list_field(map, key)
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect()
}

/// Turn a loosely formatted model reply into a valid match result
pub fn repair_match_response(raw: &str, weights: ScoreWeights) -> Result<MatchResult> {
    let map = extract_json_object(raw)?;

    let contact_info = match map.get("contact_info") {
        Some(Value::Object(contact)) => ContactInfo {
            name: optional_string_field(contact, "name"),
            email: optional_string_field(contact, "email"),
            phone: optional_string_field(contact, "phone"),
        },
        _ => ContactInfo::default(),
    };

    let matched_skills = skill_set_field(&map, "matched_skills");
    let missing_skills = skill_set_field(&map, "missing_skills").difference(&matched_skills);

    let mut result = MatchResult {
        match_percentage: 0.0,
        skill_match_percentage: number_field(&map, "skill_match_percentage"),
        semantic_match_percentage: number_field(&map, "semantic_match_percentage"),
        matched_skills,
        missing_skills,
        recommendations: string_list_field(&map, "recommendations"),
        contact_info,
        summary: optional_string_field(&map, "summary"),
    };
    result.finalize(weights);
    Ok(result)
}

pub fn repair_insights_response(raw: &str) -> Result<ComparativeInsights> {
    let map = extract_json_object(raw)?;
    Ok(ComparativeInsights {
        overall_comparison: optional_string_field(&map, "overall_comparison").unwrap_or_default(),
        top_candidate_rationale: optional_string_field(&map, "top_candidate_rationale").unwrap_or_default(),
        interview_priority: string_list_field(&map, "interview_priority"),
        skill_distribution: optional_string_field(&map, "skill_distribution").unwrap_or_default(),
    })
}

/// Scores résumés by asking the hosted model
pub struct ModelBackend {
    client: Arc<dyn CompletionClient>,
    cache: Arc<ModelResultCache>,
    weights: ScoreWeights,
}

impl ModelBackend {
    pub fn new(client: Arc<dyn CompletionClient>, cache: Arc<ModelResultCache>, weights: ScoreWeights) -> Self {
        Self { client, cache, weights }
    }

    async fn request_match(&self, resume_text: &str, job_text: &str) -> Result<MatchResult> {
        let prompt = prompts::render_match(resume_text, job_text);
        let reply = self.client.complete(prompts::MATCH_SYSTEM, &prompt).await?;
        debug!("Model reply ({} chars) from {}", reply.len(), self.client.model());
        repair_match_response(&reply, self.weights)
    }
}

#[async_trait]
impl ScoringBackend for ModelBackend {
    async fn score(&self, resume_text: &str, job_text: &str) -> MatchResult {
        let outcome = self
            .cache
            .get_or_try_compute(resume_text, job_text, || self.request_match(resume_text, job_text))
            .await;

        outcome.unwrap_or_else(|e| {
            warn!("Model-backed scoring failed: {}", e);
            MatchResult::degraded(format!("The analysis service is currently unavailable: {}", e))
        })
    }

    fn name(&self) -> &str {
        "model"
    }
}

/// Narrative features that only the hosted model can provide
pub struct ModelAnalyst {
    client: Arc<dyn CompletionClient>,
}

impl ModelAnalyst {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Answer a question about an analysis. Failures come back as an explanatory answer.
    pub async fn ask_question(&self, job_description: &str, analysis_summary: &str, question: &str) -> String {
        let prompt = prompts::render_question(job_description, analysis_summary, question);
        match self.client.complete(prompts::QUESTION_SYSTEM, &prompt).await {
            Ok(answer) => answer.trim().to_string(),
            Err(e) => {
                warn!("Question answering failed: {}", e);
                format!("Sorry, the question could not be answered right now: {}", e)
            }
        }
    }

    pub async fn comparative_insights(&self, job_description: &str, ranked: &[CandidateResult]) -> ComparativeInsights {
        let prompt = prompts::render_insights(job_description, ranked);
        let outcome = match self.client.complete(prompts::INSIGHTS_SYSTEM, &prompt).await {
            Ok(reply) => repair_insights_response(&reply),
            Err(e) => Err(e),
        };

        outcome.unwrap_or_else(|e| {
            warn!("Comparative insights failed: {}", e);
            ComparativeInsights {
                overall_comparison: format!("Comparative insights are currently unavailable: {}", e),
                ..ComparativeInsights::default()
            }
        })
    }
}

/// Plain-text digest of a result, used as context for follow-up questions
pub fn summarize_for_question(result: &MatchResult) -> String {
    let mut lines = vec![
        format!("Overall match: {:.2}%", result.match_percentage),
        format!("Skill match: {:.2}%", result.skill_match_percentage),
        format!("Semantic match: {:.2}%", result.semantic_match_percentage),
        format!("Matched skills: {}", result.matched_skills.join(", ")),
        format!("Missing skills: {}", result.missing_skills.join(", ")),
    ];
    if let Some(summary) = &result.summary {
        lines.push(format!("Summary: {}", summary));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedClient {
        replies: Mutex<Vec<Result<String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(MatcherError::Network("no scripted reply".to_string()));
            }
            replies.remove(0)
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_repair_strips_fences_and_backfills() {
        let raw = "Here you go:\n```json\n{\"skill_match_percentage\": \"80%\", \"semantic_match_percentage\": 150, \"matched_skills\": [\"Python\", \"python\"], \"missing_skills\": [\"python\", \"AWS\"]}\n```";
        let result = repair_match_response(raw, ScoreWeights::default()).unwrap();
        assert_eq!(result.skill_match_percentage, 80.0);
        assert_eq!(result.semantic_match_percentage, 100.0);
        assert_eq!(result.match_percentage, 88.0);
        assert_eq!(result.matched_skills.as_slice(), &["python"]);
        assert_eq!(result.missing_skills.as_slice(), &["aws"]);
        assert!(result.recommendations.is_empty());
        assert_eq!(result.contact_info, ContactInfo::default());
    }

    #[test]
    fn test_repair_recomputes_overall_score() {
        let raw = r#"{"match_percentage": 99, "skill_match_percentage": 50, "semantic_match_percentage": 25}"#;
        let result = repair_match_response(raw, ScoreWeights::default()).unwrap();
        assert_eq!(result.match_percentage, 40.0);
    }

    #[test]
    fn test_repair_rejects_non_json() {
        assert!(repair_match_response("I cannot help with that.", ScoreWeights::default()).is_err());
        assert!(repair_match_response("{not json}", ScoreWeights::default()).is_err());
    }

    #[tokio::test]
    async fn test_model_backend_caches_successes() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(
            r#"{"skill_match_percentage": 100, "semantic_match_percentage": 50, "summary": "Strong fit"}"#.to_string(),
        )]));
        let backend = ModelBackend::new(client.clone(), Arc::new(ModelResultCache::new(8)), ScoreWeights::default());

        let first = backend.score("Rust dev", "Rust job").await;
        let second = backend.score("Rust   dev", "Rust job").await;
        assert_eq!(first, second);
        assert_eq!(first.match_percentage, 80.0);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_model_backend_degrades_on_failure() {
        let client = Arc::new(ScriptedClient::new(vec![
            Err(MatcherError::Network("timeout".to_string())),
            Ok(r#"{"skill_match_percentage": 10, "semantic_match_percentage": 10}"#.to_string()),
        ]));
        let backend = ModelBackend::new(client.clone(), Arc::new(ModelResultCache::new(8)), ScoreWeights::default());

        let degraded = backend.score("resume", "job").await;
        assert!(degraded.is_degraded());
        assert!(degraded.summary.unwrap().contains("unavailable"));

        let retried = backend.score("resume", "job").await;
        assert_eq!(retried.match_percentage, 10.0);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_ask_question_never_fails() {
        let analyst = ModelAnalyst::new(Arc::new(ScriptedClient::new(vec![Ok("  Learn Terraform.  ".to_string())])));
        assert_eq!(analyst.ask_question("job", "summary", "What next?").await, "Learn Terraform.");

        let answer = analyst.ask_question("job", "summary", "What next?").await;
        assert!(answer.starts_with("Sorry"));
    }

    #[tokio::test]
    async fn test_insights_repair_and_degrade() {
        let analyst = ModelAnalyst::new(Arc::new(ScriptedClient::new(vec![
            Ok(r#"{"overall_comparison": "Close race", "interview_priority": ["b.pdf", "a.pdf"]}"#.to_string()),
            Ok("garbage".to_string()),
        ])));

        let insights = analyst.comparative_insights("job", &[]).await;
        assert_eq!(insights.overall_comparison, "Close race");
        assert_eq!(insights.interview_priority, vec!["b.pdf", "a.pdf"]);
        assert!(insights.top_candidate_rationale.is_empty());

        let degraded = analyst.comparative_insights("job", &[]).await;
        assert!(degraded.overall_comparison.contains("unavailable"));
        assert!(degraded.interview_priority.is_empty());
    }
}
