use serde::{Deserialize, Serialize};

use crate::ats::sections::SectionMap;

/// Relative weights of the two score components.
///
/// `score = (keyword_match × match_ratio + section_coverage × coverage) / (keyword_match + section_coverage) × 100`
///
/// Both weights must be non-negative; they do not need to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub keyword_match: f64,
    pub section_coverage: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            keyword_match: 0.7,
            section_coverage: 0.3,
        }
    }
}

/// Combines keyword match (0 – 100) and weighted section coverage into a 0 – 100 score.
///
/// Monotonic in both inputs: raising either one never lowers the score.
pub fn compute_ats_score(match_percentage: f64, sections: &SectionMap, weights: &ScoringWeights) -> u32 {
    let match_ratio = if match_percentage.is_finite() {
        (match_percentage / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let coverage = sections.coverage();

    let keyword_weight = weights.keyword_match.max(0.0);
    let section_weight = weights.section_coverage.max(0.0);
    let total_weight = keyword_weight + section_weight;
    if total_weight <= 0.0 {
        return 0;
    }

    let combined = (keyword_weight * match_ratio + section_weight * coverage) / total_weight;
    (combined * 100.0).round().clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ats::sections::ResumeSection;

    fn all_sections() -> SectionMap {
        SectionMap::with_present(&ResumeSection::ALL)
    }

    #[test]
    fn test_perfect_resume_scores_100() {
        let score = compute_ats_score(100.0, &all_sections(), &ScoringWeights::default());
        assert_eq!(score, 100);
    }

    #[test]
    fn test_nothing_scores_0() {
        let score = compute_ats_score(0.0, &SectionMap::empty(), &ScoringWeights::default());
        assert_eq!(score, 0);
    }

    #[test]
    fn test_default_weighting() {
        // 0.7 × 0.5 + 0.3 × 1.0 = 0.65
        let score = compute_ats_score(50.0, &all_sections(), &ScoringWeights::default());
        assert_eq!(score, 65);
    }

    #[test]
    fn test_weights_need_not_sum_to_one() {
        let weights = ScoringWeights {
            keyword_match: 7.0,
            section_coverage: 3.0,
        };
        assert_eq!(compute_ats_score(50.0, &all_sections(), &weights), 65);
    }

    #[test]
    fn test_monotonic_in_match_percentage() {
        let weights = ScoringWeights::default();
        for sections in [
            SectionMap::empty(),
            SectionMap::with_present(&[ResumeSection::Experience, ResumeSection::Skills]),
            all_sections(),
        ] {
            let mut last = 0;
            for step in 0..=400 {
                let pct = step as f64 * 0.25;
                let score = compute_ats_score(pct, &sections, &weights);
                assert!(score >= last, "score dropped at {pct}%");
                last = score;
            }
        }
    }

    #[test]
    fn test_monotonic_in_section_coverage() {
        let weights = ScoringWeights::default();
        for pct in [0.0, 33.33, 66.67, 100.0] {
            let mut present = Vec::new();
            let mut last = compute_ats_score(pct, &SectionMap::empty(), &weights);
            for section in ResumeSection::ALL {
                present.push(section);
                let score = compute_ats_score(pct, &SectionMap::with_present(&present), &weights);
                assert!(score >= last);
                last = score;
            }
        }
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        let weights = ScoringWeights::default();
        assert_eq!(compute_ats_score(250.0, &all_sections(), &weights), 100);
        assert_eq!(compute_ats_score(-10.0, &SectionMap::empty(), &weights), 0);
        assert_eq!(compute_ats_score(f64::NAN, &SectionMap::empty(), &weights), 0);
    }

    #[test]
    fn test_zero_weights_score_zero() {
        let weights = ScoringWeights {
            keyword_match: 0.0,
            section_coverage: 0.0,
        };
        assert_eq!(compute_ats_score(100.0, &all_sections(), &weights), 0);
    }

    #[test]
    fn test_keyword_only_weighting_ignores_sections() {
        let weights = ScoringWeights {
            keyword_match: 1.0,
            section_coverage: 0.0,
        };
        assert_eq!(compute_ats_score(42.0, &SectionMap::empty(), &weights), 42);
        assert_eq!(compute_ats_score(42.0, &all_sections(), &weights), 42);
    }
}
