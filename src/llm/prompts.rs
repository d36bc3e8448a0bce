//! Prompt templates for the hosted model

use crate::processing::comparator::CandidateResult;

pub const MATCH_SYSTEM: &str =
    "You are an expert technical recruiter. You compare resumes with job descriptions and answer only with valid JSON.";

pub const QUESTION_SYSTEM: &str =
    "You are a career advisor helping a candidate understand how their resume fits a job. Answer concisely in plain text.";

pub const INSIGHTS_SYSTEM: &str =
    "You are a hiring manager's assistant comparing several candidates for one role. Answer only with valid JSON.";

const MATCH_TEMPLATE: &str = r#"Compare the resume with the job description.

<RESUME>
{resume}
</RESUME>

<JOB DESCRIPTION>
{job}
</JOB DESCRIPTION>

Respond with a single JSON object with exactly these keys:
{
  "match_percentage": number 0-100,
  "skill_match_percentage": number 0-100,
  "semantic_match_percentage": number 0-100,
  "matched_skills": [lowercase skills present in both],
  "missing_skills": [lowercase skills the job needs that the resume lacks],
  "recommendations": [short actionable suggestions],
  "contact_info": {"name": string or null, "email": string or null, "phone": string or null},
  "summary": one paragraph explaining the score
}"#;

const QUESTION_TEMPLATE: &str = r#"<JOB DESCRIPTION>
{job}
</JOB DESCRIPTION>

<ANALYSIS SUMMARY>
{summary}
</ANALYSIS SUMMARY>

Question: {question}"#;

const INSIGHTS_TEMPLATE: &str = r#"Candidates for the role below, ranked by match score.

<JOB DESCRIPTION>
{job}
</JOB DESCRIPTION>

<CANDIDATES>
{candidates}
</CANDIDATES>

Respond with a single JSON object with exactly these keys:
{
  "overall_comparison": string,
  "top_candidate_rationale": string,
  "interview_priority": [file names in the order they should be interviewed],
  "skill_distribution": string
}"#;

/// Substitute `{name}` placeholders in one pass over the template. Inserted values
/// are never rescanned, so a document quoting `{job}` stays verbatim.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let placeholder = values.iter().find(|(name, _)| {
            tail.strip_prefix(*name).is_some_and(|after| after.starts_with('}'))
        });
        match placeholder {
            Some((name, value)) => {
                output.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                output.push('{');
                rest = tail;
            }
        }
    }
    output.push_str(rest);
    output
}

pub fn render_match(resume: &str, job: &str) -> String {
    fill(MATCH_TEMPLATE, &[("resume", resume), ("job", job)])
}

pub fn render_question(job: &str, analysis_summary: &str, question: &str) -> String {
    fill(
        QUESTION_TEMPLATE,
        &[("job", job), ("summary", analysis_summary), ("question", question)],
    )
}

pub fn render_insights(job: &str, candidates: &[CandidateResult]) -> String {
    let lines: Vec<String> = candidates
        .iter()
        .map(|c| {
            format!(
                "- {} (upload #{}): match {:.2}%, skills {:.2}%, semantic {:.2}%; matched: [{}]; missing: [{}]",
                c.file_name,
                c.index,
                c.result.match_percentage,
                c.result.skill_match_percentage,
                c.result.semantic_match_percentage,
                c.result.matched_skills.join(", "),
                c.result.missing_skills.join(", "),
            )
        })
        .collect();

    let candidates = lines.join("\n");
    fill(INSIGHTS_TEMPLATE, &[("job", job), ("candidates", candidates.as_str())])
}
