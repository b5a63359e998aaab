//! Section detection: best-effort presence check for the canonical resume sections.
//!
//! Works on normalized text (headings have already lost their line breaks), so every
//! cue is a word-bounded regex: a heading word ("education", "work history") or a
//! strong contextual signal (a date range for experience, a phone number for contact).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extraction::NormalizedText;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSection {
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
}

impl ResumeSection {
    pub const ALL: [ResumeSection; 7] = [
        ResumeSection::Contact,
        ResumeSection::Summary,
        ResumeSection::Experience,
        ResumeSection::Education,
        ResumeSection::Skills,
        ResumeSection::Projects,
        ResumeSection::Certifications,
    ];

    /// Human-facing name used in insight messages.
    pub fn label(&self) -> &'static str {
        match self {
            ResumeSection::Contact => "contact information",
            ResumeSection::Summary => "professional summary",
            ResumeSection::Experience => "work experience",
            ResumeSection::Education => "education",
            ResumeSection::Skills => "skills",
            ResumeSection::Projects => "projects",
            ResumeSection::Certifications => "certifications",
        }
    }

    /// Share of the section-coverage score. Sums to 1.0 over `ALL`.
    pub fn weight(&self) -> f64 {
        match self {
            ResumeSection::Contact => 0.15,
            ResumeSection::Summary => 0.10,
            ResumeSection::Experience => 0.30,
            ResumeSection::Education => 0.15,
            ResumeSection::Skills => 0.20,
            ResumeSection::Projects => 0.05,
            ResumeSection::Certifications => 0.05,
        }
    }

    /// Core sections are the ones ATS parsers expect on every resume.
    pub fn is_core(&self) -> bool {
        matches!(
            self,
            ResumeSection::Contact
                | ResumeSection::Experience
                | ResumeSection::Education
                | ResumeSection::Skills
        )
    }

    fn cues(&self) -> &'static [&'static str] {
        match self {
            ResumeSection::Contact => &[
                r"\b(?:contact|email|e-mail|phone|mobile|tel|linkedin|github)\b",
                r"\b(?:gmail|outlook|yahoo|hotmail|icloud|protonmail)\.com\b",
                r"(?:^|\s)(?:\+?\d{1,3}[\s.-]?)?\d{3}[\s.-]?\d{3}[\s.-]?\d{4}\b",
            ],
            ResumeSection::Summary => &[
                r"\b(?:summary|profile|objective|about me|career overview)\b",
            ],
            ResumeSection::Experience => &[
                r"\b(?:experience|employment|work history|career history|professional background)\b",
                r"\b(?:19|20)\d{2}\s*(?:-|to)\s*(?:(?:19|20)\d{2}|present|current|now)\b",
            ],
            ResumeSection::Education => &[
                r"\b(?:education|academic|university|college|degree|diploma)\b",
                r"\b(?:bachelors?|masters?|b\.?sc|m\.?sc|b\.s|m\.s|b\.a|m\.a|b\.?tech|m\.?tech|ph\.?d|mba)\b",
            ],
            ResumeSection::Skills => &[
                r"\b(?:skills|competencies|technologies|tech stack|toolkit|proficiencies)\b",
            ],
            ResumeSection::Projects => &[r"\b(?:projects?|portfolio|side project)\b"],
            ResumeSection::Certifications => &[
                r"\b(?:certifications?|certificates?|certified|licen[cs]es?|accreditations?)\b",
            ],
        }
    }
}

static SECTION_CUES: LazyLock<Vec<(ResumeSection, Vec<Regex>)>> = LazyLock::new(|| {
    ResumeSection::ALL
        .iter()
        .map(|section| {
            let regexes = section
                .cues()
                .iter()
                .map(|cue| Regex::new(cue).expect("section cues are valid regexes"))
                .collect();
            (*section, regexes)
        })
        .collect()
});

/// Presence flag for every canonical section. Always holds all keys of `ResumeSection::ALL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionMap(BTreeMap<ResumeSection, bool>);

impl SectionMap {
    /// A map with every section absent.
    pub fn empty() -> Self {
        SectionMap(ResumeSection::ALL.iter().map(|s| (*s, false)).collect())
    }

    #[cfg(test)]
    pub fn with_present(sections: &[ResumeSection]) -> Self {
        let mut map = Self::empty();
        for section in sections {
            map.0.insert(*section, true);
        }
        map
    }

    pub fn is_present(&self, section: ResumeSection) -> bool {
        self.0.get(&section).copied().unwrap_or(false)
    }

    pub fn present(&self) -> Vec<ResumeSection> {
        self.0.iter().filter(|(_, p)| **p).map(|(s, _)| *s).collect()
    }

    pub fn missing(&self) -> Vec<ResumeSection> {
        self.0.iter().filter(|(_, p)| !**p).map(|(s, _)| *s).collect()
    }

    /// Weighted share of present sections, in [0, 1].
    pub fn coverage(&self) -> f64 {
        self.present()
            .iter()
            .map(ResumeSection::weight)
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }
}

pub fn detect_sections(text: &NormalizedText) -> SectionMap {
    let mut map = SectionMap::empty();
    for (section, cues) in SECTION_CUES.iter() {
        let found = cues.iter().any(|cue| cue.is_match(text.as_str()));
        map.0.insert(*section, found);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESUME: &str = "
        Jane Doe | jane.doe@gmail.com | +1 415-555-0134 | linkedin.com/in/janedoe
        SUMMARY
        Backend engineer focused on distributed systems.
        WORK EXPERIENCE
        Acme Corp, Senior Engineer, 2019 - Present
        EDUCATION
        B.Sc. Computer Science, State University
        SKILLS
        Rust, Go, PostgreSQL, Kafka
        PROJECTS
        Open-source rate limiter
        CERTIFICATIONS
        AWS Certified Solutions Architect
    ";

    fn detect(raw: &str) -> SectionMap {
        detect_sections(&NormalizedText::normalize(raw))
    }

    #[test]
    fn test_full_resume_has_every_section() {
        let map = detect(FULL_RESUME);
        assert!(map.missing().is_empty(), "missing: {:?}", map.missing());
        assert!((map.coverage() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_plain_text_has_no_sections() {
        let map = detect("Lorem ipsum dolor sit amet consectetur adipiscing");
        assert!(map.present().is_empty());
        assert_eq!(map.coverage(), 0.0);
    }

    #[test]
    fn test_experience_detected_from_date_range_alone() {
        let map = detect("Acme Corp Staff Engineer 2018 to 2022");
        assert!(map.is_present(ResumeSection::Experience));
    }

    #[test]
    fn test_contact_detected_from_phone_number() {
        let map = detect("Call 415 555 0134 anytime");
        assert!(map.is_present(ResumeSection::Contact));
    }

    #[test]
    fn test_education_detected_from_degree() {
        assert!(detect("MSc in Data Science").is_present(ResumeSection::Education));
        assert!(detect("PhD, Physics").is_present(ResumeSection::Education));
    }

    #[test]
    fn test_heading_word_inside_other_word_does_not_count() {
        // "skillset" and "summarys" are not headings
        let map = detect("skillset summarys");
        assert!(!map.is_present(ResumeSection::Skills));
        assert!(!map.is_present(ResumeSection::Summary));
    }

    #[test]
    fn test_map_always_holds_every_section() {
        let map = detect("");
        assert_eq!(map.present().len() + map.missing().len(), ResumeSection::ALL.len());
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = ResumeSection::ALL.iter().map(ResumeSection::weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_coverage_grows_with_each_section() {
        let mut present = Vec::new();
        let mut last = SectionMap::empty().coverage();
        for section in ResumeSection::ALL {
            present.push(section);
            let coverage = SectionMap::with_present(&present).coverage();
            assert!(coverage > last);
            last = coverage;
        }
    }

    #[test]
    fn test_section_map_serializes_by_name() {
        let map = SectionMap::with_present(&[ResumeSection::Skills]);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["skills"], true);
        assert_eq!(json["experience"], false);
        assert_eq!(json.as_object().unwrap().len(), 7);
    }
}
