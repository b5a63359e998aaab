//! Keyword/phrase extraction over `NormalizedText`.
//!
//! Token filter order per whitespace token:
//! 1. strip one trailing period (`aws.` → `aws`)
//! 2. drop stop-words, unless the token is an allow-listed short technical term
//! 3. drop tokens of ≤ 2 chars, unless allow-listed
//! 4. drop tokens with no alphabetic char (`2019`, `5+`, `-`, `&`)
//!
//! Multi-word and punctuation-heavy technical phrases are detected separately with a
//! fixed ordered list of (pattern, canonical form) pairs and merged into the same set.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::extraction::NormalizedText;

// ────────────────────────────────────────────────────────────────────────────
// Word lists
// ────────────────────────────────────────────────────────────────────────────

/// English function words plus the filler vocabulary of job ads and resumes
/// ("looking", "expert", "strong", "years") that carries no matching signal.
const STOP_WORDS: &[&str] = &[
    // function words
    "a", "about", "above", "across", "after", "again", "against", "all", "also", "am", "an",
    "and", "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
    "during", "each", "etc", "few", "for", "from", "further", "had", "has", "have", "having",
    "he", "her", "here", "hers", "him", "his", "how", "i", "if", "in", "into", "is", "it",
    "its", "itself", "just", "may", "me", "might", "more", "most", "must", "my", "no", "nor",
    "not", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "out", "over",
    "own", "per", "same", "shall", "she", "should", "so", "some", "such", "than", "that",
    "the", "their", "them", "then", "there", "these", "they", "this", "those", "through",
    "to", "too", "under", "until", "up", "upon", "us", "very", "via", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "whose", "why", "will", "with",
    "within", "without", "would", "you", "your", "yours",
    // job-ad and resume filler
    "ability", "able", "candidate", "candidates", "company", "environment", "excellent",
    "experience", "experienced", "expert", "expertise", "familiar", "familiarity", "good",
    "great", "highly", "ideal", "including", "join", "knowledge", "like", "looking", "new",
    "opportunity", "plus", "position", "preferred", "proficiency", "proficient", "required",
    "requirements", "responsibilities", "responsible", "role", "seeking", "skills", "strong",
    "team", "understanding", "using", "well", "work", "working", "year", "years",
];

/// Short technical terms that survive both the stop-word and the length filter.
const SHORT_TERMS: &[&str] = &[
    // languages
    "c", "r", "go", "c#", "f#", "js", "ts", "vb", "sql", "php", "css",
    // cloud / devops
    "aws", "gcp", "k8s", "ci", "cd", "vm", "os", "iac", "sre",
    // web / networking
    "ui", "ux", "api", "ip", "dns", "tcp", "udp", "seo", "cms",
    // data / ai
    "ai", "ml", "bi", "db", "nlp", "llm", "etl", "3d", "ar", "vr",
    // methodology
    "qa", "tdd", "bdd", "oop", "r&d",
    // roles
    "pm", "hr", "cto", "ceo", "vp",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

static SHORT_TERM_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| SHORT_TERMS.iter().copied().collect());

/// (pattern, canonical form). Patterns run against normalized text, so the only
/// punctuation they can meet is `+ # . - &`. Canonical forms are themselves
/// normalized text.
///
/// A detected phrase is added next to the tokens it was matched from, never in
/// place of them: "NodeJS" yields both `nodejs` and `node.js`.
const PHRASE_PATTERNS: &[(&str, &str)] = &[
    (r"react[\s-]*native", "react native"),
    (r"machine[\s-]+learning", "machine learning"),
    (r"deep[\s-]+learning", "deep learning"),
    (r"natural\s+language\s+processing", "natural language processing"),
    (r"computer\s+vision", "computer vision"),
    (r"large\s+language\s+models?", "large language models"),
    (r"data\s+science", "data science"),
    (r"data\s+engineering", "data engineering"),
    (r"data\s+analysis", "data analysis"),
    (r"full[\s-]*stack", "full stack"),
    (r"front[\s-]+end", "front end"),
    (r"back[\s-]+end", "back end"),
    (r"c\+\+", "c++"),
    (r"c#", "c#"),
    (r"\.net", ".net"),
    (r"node\.?js", "node.js"),
    (r"next\.?js", "next.js"),
    (r"vue\.?js", "vue.js"),
    (r"ci[\s-]*cd", "ci-cd"),
    (r"rest(?:ful)?\s+apis?", "rest api"),
    (r"google\s+cloud(?:\s+platform)?", "google cloud"),
    (r"amazon\s+web\s+services", "amazon web services"),
    (r"microsoft\s+azure", "microsoft azure"),
    (r"distributed\s+systems?", "distributed systems"),
    (r"cloud\s+computing", "cloud computing"),
    (r"unit\s+testing", "unit testing"),
    (r"test[\s-]+driven\s+development", "test driven development"),
    (r"object[\s-]+oriented(?:\s+programming)?", "object oriented programming"),
    (r"version\s+control", "version control"),
    (r"project\s+management", "project management"),
    (r"product\s+management", "product management"),
    (r"problem[\s-]+solving", "problem solving"),
];

/// Characters that, when adjacent, mean a match is part of a longer token.
const TOKEN_CHARS: &str = "a-z0-9+#";

static PHRASE_MATCHERS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    PHRASE_PATTERNS
        .iter()
        .map(|(pattern, canonical)| {
            let bounded = format!(r"(?:^|[^{TOKEN_CHARS}])(?:{pattern})(?:[^{TOKEN_CHARS}]|$)");
            let regex = Regex::new(&bounded).expect("phrase patterns are valid regexes");
            (regex, *canonical)
        })
        .collect()
});

// ────────────────────────────────────────────────────────────────────────────
// KeywordSet
// ────────────────────────────────────────────────────────────────────────────

/// A set of keywords that remembers first-insertion order.
///
/// Membership is what matters; the order only keeps downstream output (matched /
/// missing lists) deterministic. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    ordered: Vec<String>,
    index: HashSet<String>,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `keyword`, returning false if it was already present.
    pub fn insert(&mut self, keyword: impl Into<String>) -> bool {
        let keyword = keyword.into();
        if self.index.contains(&keyword) {
            return false;
        }
        self.index.insert(keyword.clone());
        self.ordered.push(keyword);
        true
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.index.contains(keyword)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }
}

impl PartialEq for KeywordSet {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for KeywordSet {}

impl<S: Into<String>> FromIterator<S> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = KeywordSet::new();
        for keyword in iter {
            set.insert(keyword);
        }
        set
    }
}

impl Serialize for KeywordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.ordered)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Extracts filtered tokens (in text order) followed by detected phrases (in pattern order).
pub fn extract_keywords(text: &NormalizedText) -> KeywordSet {
    let mut keywords = KeywordSet::new();

    for token in text.tokens().filter_map(filter_token) {
        keywords.insert(token);
    }
    for phrase in detect_phrases(text) {
        keywords.insert(phrase);
    }

    keywords
}

fn filter_token(raw: &str) -> Option<&str> {
    let token = raw.strip_suffix('.').unwrap_or(raw);
    let allow_listed = is_short_term(token);

    if !allow_listed && is_stop_word(token) {
        return None;
    }
    if !allow_listed && token.chars().count() <= 2 {
        return None;
    }
    if !token.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(token)
}

/// Canonical forms of every phrase pattern found in `text`, in pattern order.
pub fn detect_phrases(text: &NormalizedText) -> Vec<&'static str> {
    PHRASE_MATCHERS
        .iter()
        .filter(|(regex, _)| regex.is_match(text.as_str()))
        .map(|(_, canonical)| *canonical)
        .collect()
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORD_SET.contains(token)
}

pub fn is_short_term(token: &str) -> bool {
    SHORT_TERM_SET.contains(token)
}
