//! Insight generation: rule-based strengths / weaknesses / recommendations.
//!
//! Pure and deterministic: the same match result, section map and texts always
//! produce the same three lists in the same order. Rules run in a fixed sequence
//! (keyword alignment, sections, quantified achievements, length), and each rule
//! appends to whichever lists it concerns.

use serde::{Deserialize, Serialize};

use crate::ats::matcher::MatchResult;
use crate::ats::sections::{ResumeSection, SectionMap};
use crate::extraction::NormalizedText;

/// Match percentage at or above which keyword alignment counts as strong.
const STRONG_MATCH_PCT: f64 = 75.0;
/// Match percentage below which keyword alignment counts as weak.
const WEAK_MATCH_PCT: f64 = 50.0;
/// How many matched / missing keywords an insight message names.
const KEYWORDS_PER_MESSAGE: usize = 5;
/// Metrics needed before the resume reads as quantified.
const MIN_QUANTIFIED_METRICS: usize = 2;
const MIN_RESUME_WORDS: usize = 150;
const MAX_RESUME_WORDS: usize = 1000;

/// Suffixes a number may carry and still read as a metric ("10k", "3x", "50+").
const METRIC_SUFFIXES: &[&str] = &["", "k", "m", "b", "bn", "mm", "x", "+"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

pub fn generate_insights(
    match_result: &MatchResult,
    sections: &SectionMap,
    resume: &NormalizedText,
    job_description: &NormalizedText,
) -> Insights {
    let mut insights = Insights::default();

    keyword_rules(&mut insights, match_result, job_description);
    section_rules(&mut insights, sections);
    quantified_rules(&mut insights, resume);
    length_rules(&mut insights, resume);

    if insights.recommendations.is_empty() {
        insights.recommendations.push(
            "Your resume is well aligned with this role. Tailor the summary to the company before applying."
                .to_string(),
        );
    }

    insights
}

// ────────────────────────────────────────────────────────────────────────────
// Rules
// ────────────────────────────────────────────────────────────────────────────

fn keyword_rules(insights: &mut Insights, result: &MatchResult, job_description: &NormalizedText) {
    if result.total() == 0 {
        let reason = if job_description.is_empty() {
            "No job description was provided"
        } else {
            "The job description contained no recognizable keywords"
        };
        insights
            .weaknesses
            .push(format!("{reason}, so keyword alignment could not be measured."));
        insights.recommendations.push(
            "Paste the full job description to see which keywords your resume covers.".to_string(),
        );
        return;
    }

    let pct = result.match_percentage;
    if pct >= STRONG_MATCH_PCT {
        insights.strengths.push(format!(
            "Strong keyword alignment: {pct:.0}% of the job description keywords appear in your resume."
        ));
    } else if pct >= WEAK_MATCH_PCT {
        insights.strengths.push(format!(
            "Solid keyword alignment: {pct:.0}% of the job description keywords appear in your resume."
        ));
    } else {
        insights.weaknesses.push(format!(
            "Low keyword alignment: only {pct:.0}% of the job description keywords appear in your resume."
        ));
    }

    if !result.matched.is_empty() {
        insights.strengths.push(format!(
            "Matches key requirements: {}.",
            top(&result.matched).join(", ")
        ));
    }

    if !result.missing.is_empty() {
        let missing = top(&result.missing).join(", ");
        insights
            .weaknesses
            .push(format!("Missing keywords from the job description: {missing}."));
        insights.recommendations.push(format!(
            "Work these keywords into your experience or skills where they genuinely apply: {missing}."
        ));
    }
}

fn section_rules(insights: &mut Insights, sections: &SectionMap) {
    let core_present = ResumeSection::ALL
        .iter()
        .filter(|s| s.is_core())
        .all(|s| sections.is_present(*s));
    if core_present {
        insights.strengths.push(
            "Includes the core sections ATS parsers look for: contact information, work experience, education and skills."
                .to_string(),
        );
    }

    for section in sections.missing() {
        insights
            .weaknesses
            .push(format!("No {} section was detected.", section.label()));
        insights.recommendations.push(section_recommendation(section).to_string());
    }
}

fn section_recommendation(section: ResumeSection) -> &'static str {
    match section {
        ResumeSection::Contact => {
            "Add your email address and phone number at the top so recruiters can reach you."
        }
        ResumeSection::Summary => {
            "Open with a two or three line professional summary aimed at this role."
        }
        ResumeSection::Experience => {
            "Add a \"Work Experience\" section listing roles with employers and dates."
        }
        ResumeSection::Education => {
            "Add an \"Education\" section with your degree, institution and graduation year."
        }
        ResumeSection::Skills => {
            "Add a dedicated \"Skills\" section so ATS parsers can pick up your technical keywords."
        }
        ResumeSection::Projects => {
            "Consider a \"Projects\" section to show hands-on work relevant to the role."
        }
        ResumeSection::Certifications => {
            "List any relevant certifications under a \"Certifications\" heading."
        }
    }
}

fn quantified_rules(insights: &mut Insights, resume: &NormalizedText) {
    let metrics = count_metrics(resume);
    if metrics >= MIN_QUANTIFIED_METRICS {
        insights
            .strengths
            .push("Uses numbers to quantify achievements.".to_string());
    } else {
        insights
            .weaknesses
            .push("Few quantified achievements were found.".to_string());
        insights.recommendations.push(
            "Quantify your impact with concrete numbers (percentages, revenue, users, time saved)."
                .to_string(),
        );
    }
}

fn length_rules(insights: &mut Insights, resume: &NormalizedText) {
    let words = resume.word_count();
    if words < MIN_RESUME_WORDS {
        insights
            .weaknesses
            .push(format!("The resume is short ({words} words)."));
        insights.recommendations.push(
            "Expand your experience bullets with responsibilities, technologies and results.".to_string(),
        );
    } else if words > MAX_RESUME_WORDS {
        insights
            .weaknesses
            .push(format!("The resume is long ({words} words)."));
        insights.recommendations.push(
            "Trim older or less relevant roles to keep the resume focused and around one to two pages."
                .to_string(),
        );
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn top(keywords: &[String]) -> Vec<&str> {
    keywords
        .iter()
        .take(KEYWORDS_PER_MESSAGE)
        .map(String::as_str)
        .collect()
}

/// Counts tokens that read as a metric: a number (optionally decimal, optionally
/// suffixed with k/m/x/+) that is not a calendar year or a phone-number-sized run.
fn count_metrics(text: &NormalizedText) -> usize {
    text.tokens().filter(|token| is_metric(token)).count()
}

fn is_metric(token: &str) -> bool {
    let token = token.trim_end_matches('.');
    let number_len = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    let (number, suffix) = token.split_at(number_len);

    let digits = number.chars().filter(char::is_ascii_digit).count();
    if digits == 0 || digits > 6 || !METRIC_SUFFIXES.contains(&suffix) {
        return false;
    }
    !is_calendar_year(number)
}

fn is_calendar_year(number: &str) -> bool {
    number.len() == 4
        && number.chars().all(|c| c.is_ascii_digit())
        && (number.starts_with("19") || number.starts_with("20"))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
