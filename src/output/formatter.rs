//! Output formatters for console, JSON and Markdown reports

use crate::config::OutputFormat;
use crate::error::{MatcherError, Result};
use crate::processing::aggregator::MatchResult;
use crate::processing::comparator::ComparisonResult;
use crate::processing::contact::ContactInfo;
use crate::storage::AnalysisId;
use colored::{Color, Colorize};
use std::path::Path;

pub trait OutputFormatter {
    fn format_match(&self, result: &MatchResult, id: Option<&AnalysisId>) -> Result<String>;
    fn format_comparison(&self, comparison: &ComparisonResult, id: Option<&AnalysisId>) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter;

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn score_label(score: f64) -> &'static str {
    match score {
        s if s >= 80.0 => "EXCELLENT",
        s if s >= 65.0 => "GOOD",
        s if s >= 50.0 => "FAIR",
        _ => "POOR",
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f64) -> String {
        let label = score_label(score);
        let color = match label {
            "EXCELLENT" => Color::Green,
            "GOOD" => Color::BrightGreen,
            "FAIR" => Color::Yellow,
            _ => Color::Red,
        };
        if self.use_colors {
            format!("[{}]", label.color(color).bold())
        } else {
            format!("[{}]", label)
        }
    }

    fn format_contact(&self, contact: &ContactInfo) -> String {
        let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "not found".to_string());
        format!(
            "Name: {}\nEmail: {}\nPhone: {}\n",
            field(&contact.name),
            field(&contact.email),
            field(&contact.phone)
        )
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_match(&self, result: &MatchResult, id: Option<&AnalysisId>) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME MATCH ANALYSIS", 1));
        if let Some(id) = id {
            output.push_str(&format!("Analysis ID: {}\n", id));
        }

        output.push_str(&self.format_header("Candidate", 2));
        output.push_str(&self.format_contact(&result.contact_info));

        output.push_str(&self.format_header("Scores", 2));
        output.push_str(&format!(
            "Overall Match: {:.2}% {}\n",
            result.match_percentage,
            self.format_score_badge(result.match_percentage)
        ));
        output.push_str(&format!("Skill Match: {:.2}%\n", result.skill_match_percentage));
        output.push_str(&format!("Semantic Match: {:.2}%\n", result.semantic_match_percentage));

        output.push_str(&self.format_header("Skills", 3));
        output.push_str(&format!(
            "Matched: {}\n",
            self.colorize(&join_or_none(result.matched_skills.as_slice()), Color::Green)
        ));
        output.push_str(&format!(
            "Missing: {}\n",
            self.colorize(&join_or_none(result.missing_skills.as_slice()), Color::Yellow)
        ));

        if !result.recommendations.is_empty() {
            output.push_str(&self.format_header("Recommendations", 2));
            for (i, recommendation) in result.recommendations.iter().enumerate() {
                output.push_str(&format!("{}. {}\n", i + 1, recommendation));
            }
        }

        if let Some(summary) = &result.summary {
            if self.detailed || result.match_percentage == 0.0 {
                output.push_str(&self.format_header("Summary", 3));
                output.push_str(&format!("{}\n", self.colorize(summary, Color::Cyan)));
            }
        }

        Ok(output)
    }

    fn format_comparison(&self, comparison: &ComparisonResult, id: Option<&AnalysisId>) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("CANDIDATE COMPARISON", 1));
        if let Some(id) = id {
            output.push_str(&format!("Analysis ID: {}\n", id));
        }

        output.push_str(&self.format_header("Ranking", 2));
        for (rank, candidate) in comparison.candidates.iter().enumerate() {
            let name = candidate
                .result
                .contact_info
                .name
                .as_deref()
                .map(|n| format!(" ({})", n))
                .unwrap_or_default();
            output.push_str(&format!(
                "{}. {}{}: {:.2}% {}\n",
                rank + 1,
                self.colorize(&candidate.file_name, Color::White),
                name,
                candidate.result.match_percentage,
                self.format_score_badge(candidate.result.match_percentage)
            ));
            if self.detailed {
                output.push_str(&format!(
                    "   skills {:.2}% | semantic {:.2}% | missing: {}\n",
                    candidate.result.skill_match_percentage,
                    candidate.result.semantic_match_percentage,
                    join_or_none(candidate.result.missing_skills.as_slice())
                ));
            }
        }

        output.push_str(&self.format_header("Common Skills", 3));
        output.push_str(&format!("{}\n", join_or_none(comparison.common_skills.as_slice())));

        output.push_str(&self.format_header("Unique Skills", 3));
        for candidate in &comparison.candidates {
            if let Some(unique) = comparison.unique_skills_by_resume.get(&candidate.index) {
                output.push_str(&format!("{}: {}\n", candidate.file_name, join_or_none(unique.as_slice())));
            }
        }

        if let Some(insights) = &comparison.insights {
            output.push_str(&self.format_header("Insights", 2));
            output.push_str(&format!("{}\n", insights.overall_comparison));
            if !insights.top_candidate_rationale.is_empty() {
                output.push_str(&format!("Top candidate: {}\n", insights.top_candidate_rationale));
            }
            if !insights.interview_priority.is_empty() {
                output.push_str(&format!("Interview order: {}\n", insights.interview_priority.join(" > ")));
            }
            if !insights.skill_distribution.is_empty() {
                output.push_str(&format!("Skill distribution: {}\n", insights.skill_distribution));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

#[derive(serde::Serialize)]
struct WithId<'a, T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis_id: Option<String>,
    #[serde(flatten)]
    body: &'a T,
}

impl OutputFormatter for JsonFormatter {
    fn format_match(&self, result: &MatchResult, id: Option<&AnalysisId>) -> Result<String> {
        self.render(&WithId {
            analysis_id: id.map(ToString::to_string),
            body: result,
        })
    }

    fn format_comparison(&self, comparison: &ComparisonResult, id: Option<&AnalysisId>) -> Result<String> {
        self.render(&WithId {
            analysis_id: id.map(ToString::to_string),
            body: comparison,
        })
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    fn bullet_list(items: &[String]) -> String {
        if items.is_empty() {
            return "_None_\n".to_string();
        }
        items.iter().map(|item| format!("- {}\n", item)).collect()
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_match(&self, result: &MatchResult, id: Option<&AnalysisId>) -> Result<String> {
        let mut output = String::from("# Resume Match Analysis\n\n");
        if let Some(id) = id {
            output.push_str(&format!("Analysis ID: `{}`\n\n", id));
        }

        output.push_str("## Scores\n\n| Metric | Score |\n|---|---|\n");
        output.push_str(&format!(
            "| Overall | {:.2}% ({}) |\n",
            result.match_percentage,
            score_label(result.match_percentage)
        ));
        output.push_str(&format!("| Skills | {:.2}% |\n", result.skill_match_percentage));
        output.push_str(&format!("| Semantic | {:.2}% |\n\n", result.semantic_match_percentage));

        let contact = &result.contact_info;
        output.push_str("## Contact\n\n");
        output.push_str(&format!("- **Name:** {}\n", contact.name.as_deref().unwrap_or("not found")));
        output.push_str(&format!("- **Email:** {}\n", contact.email.as_deref().unwrap_or("not found")));
        output.push_str(&format!("- **Phone:** {}\n\n", contact.phone.as_deref().unwrap_or("not found")));

        output.push_str("## Matched Skills\n\n");
        output.push_str(&Self::bullet_list(result.matched_skills.as_slice()));
        output.push_str("\n## Missing Skills\n\n");
        output.push_str(&Self::bullet_list(result.missing_skills.as_slice()));
        output.push_str("\n## Recommendations\n\n");
        output.push_str(&Self::bullet_list(&result.recommendations));

        if let Some(summary) = &result.summary {
            output.push_str(&format!("\n## Summary\n\n{}\n", summary));
        }

        Ok(output)
    }

    fn format_comparison(&self, comparison: &ComparisonResult, id: Option<&AnalysisId>) -> Result<String> {
        let mut output = String::from("# Candidate Comparison\n\n");
        if let Some(id) = id {
            output.push_str(&format!("Analysis ID: `{}`\n\n", id));
        }

        output.push_str("| Rank | Resume | Overall | Skills | Semantic |\n|---|---|---|---|---|\n");
        for (rank, candidate) in comparison.candidates.iter().enumerate() {
            output.push_str(&format!(
                "| {} | {} | {:.2}% | {:.2}% | {:.2}% |\n",
                rank + 1,
                candidate.file_name,
                candidate.result.match_percentage,
                candidate.result.skill_match_percentage,
                candidate.result.semantic_match_percentage
            ));
        }

        output.push_str("\n## Common Skills\n\n");
        output.push_str(&Self::bullet_list(comparison.common_skills.as_slice()));

        output.push_str("\n## Unique Skills\n\n");
        for candidate in &comparison.candidates {
            if let Some(unique) = comparison.unique_skills_by_resume.get(&candidate.index) {
                output.push_str(&format!("- **{}:** {}\n", candidate.file_name, join_or_none(unique.as_slice())));
            }
        }

        if let Some(insights) = &comparison.insights {
            output.push_str(&format!("\n## Insights\n\n{}\n", insights.overall_comparison));
            if !insights.interview_priority.is_empty() {
                output.push_str("\n### Interview Priority\n\n");
                for (i, file_name) in insights.interview_priority.iter().enumerate() {
                    output.push_str(&format!("{}. {}\n", i + 1, file_name));
                }
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter,
        }
    }

    fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        }
    }

    pub fn match_report(&self, result: &MatchResult, id: Option<&AnalysisId>, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_match(result, id)
    }

    pub fn comparison_report(
        &self,
        comparison: &ComparisonResult,
        id: Option<&AnalysisId>,
        format: OutputFormat,
    ) -> Result<String> {
        self.formatter(format).format_comparison(comparison, id)
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)
        .map_err(|e| MatcherError::OutputFormatting(format!("Failed to write {}: {}", file_path.display(), e)))
}

pub fn suggest_filename(format: OutputFormat, resume_name: &str) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");

    match format {
        OutputFormat::Console => format!("{}_match_{}.txt", base_name, timestamp),
        OutputFormat::Json => format!("{}_match_{}.json", base_name, timestamp),
        OutputFormat::Markdown => format!("{}_match_{}.md", base_name, timestamp),
    }
}
