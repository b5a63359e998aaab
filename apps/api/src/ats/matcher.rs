use serde::{Deserialize, Serialize};

use crate::ats::keywords::KeywordSet;

/// Keyword match of a resume against a job description.
///
/// `matched` and `missing` partition the job-description keywords and keep their
/// first-seen order. Resume-only keywords appear in neither list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    /// 0 – 100, rounded to two decimals.
    pub match_percentage: f64,
    /// Overall ATS score (0 – 100) once the score calculator has run.
    pub score: f64,
}

impl MatchResult {
    /// Number of job-description keywords considered.
    pub fn total(&self) -> usize {
        self.matched.len() + self.missing.len()
    }
}

/// Splits `job_keywords` into matched / missing against `resume_keywords`.
///
/// Equality is exact: both sets were built from normalized text. `score` is left
/// at 0 for the score calculator to fill.
pub fn match_keywords(resume_keywords: &KeywordSet, job_keywords: &KeywordSet) -> MatchResult {
    let (matched, missing): (Vec<String>, Vec<String>) = job_keywords
        .iter()
        .map(str::to_string)
        .partition(|keyword| resume_keywords.contains(keyword));

    MatchResult {
        match_percentage: percentage(matched.len(), job_keywords.len()),
        matched,
        missing,
        score: 0.0,
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = part as f64 / whole as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}
