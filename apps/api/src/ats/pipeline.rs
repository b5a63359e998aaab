use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ats::insights::{generate_insights, Insights};
use crate::ats::keywords::extract_keywords;
use crate::ats::matcher::{match_keywords, MatchResult};
use crate::ats::scoring::{compute_ats_score, ScoringWeights};
use crate::ats::sections::{detect_sections, SectionMap};
use crate::extraction::{ExtractionError, NormalizedText, RawDocument, TextExtractor};

/// Everything one analysis produces. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Overall ATS compatibility score, 0 – 100.
    pub score: u32,
    pub match_result: MatchResult,
    pub sections: SectionMap,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub resume_keyword_count: usize,
    pub job_keyword_count: usize,
}

/// Extractor → {keywords, sections} → matcher → insights → score.
pub struct AtsPipeline {
    extractor: TextExtractor,
    weights: ScoringWeights,
}

impl AtsPipeline {
    pub fn new(extractor: TextExtractor, weights: ScoringWeights) -> Self {
        Self { extractor, weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Full analysis of an uploaded document. Extraction errors are terminal:
    /// no partial result is returned.
    pub async fn analyze_document(
        &self,
        document: &RawDocument,
        job_description: &str,
    ) -> Result<AnalysisResult, ExtractionError> {
        let resume = self.extractor.extract(document).await?;
        Ok(self.analyze_text(&resume, job_description))
    }

    /// Analysis of text that is already extracted (pasted or previously parsed).
    pub fn analyze_text(&self, resume: &NormalizedText, job_description: &str) -> AnalysisResult {
        analyze(resume, job_description, &self.weights)
    }
}

pub fn analyze(resume: &NormalizedText, job_description: &str, weights: &ScoringWeights) -> AnalysisResult {
    let started = Instant::now();
    let job_text = NormalizedText::normalize(job_description);

    let resume_keywords = extract_keywords(resume);
    let job_keywords = extract_keywords(&job_text);
    if job_keywords.is_empty() {
        debug!(job_chars = job_text.as_str().len(), "Job description produced no keywords");
    }
    let sections = detect_sections(resume);

    let mut match_result = match_keywords(&resume_keywords, &job_keywords);
    let Insights {
        strengths,
        weaknesses,
        recommendations,
    } = generate_insights(&match_result, &sections, resume, &job_text);

    let score = compute_ats_score(match_result.match_percentage, &sections, weights);
    match_result.score = score as f64;

    info!(
        score,
        match_percentage = match_result.match_percentage,
        resume_keywords = resume_keywords.len(),
        job_keywords = job_keywords.len(),
        sections_present = sections.present().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "ATS analysis complete"
    );

    AnalysisResult {
        score,
        match_result,
        sections,
        strengths,
        weaknesses,
        recommendations,
        resume_keyword_count: resume_keywords.len(),
        job_keyword_count: job_keywords.len(),
    }
}
