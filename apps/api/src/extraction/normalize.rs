use serde::Serialize;

/// Punctuation kept by normalization because it is meaningful in technical terms
/// (`c++`, `c#`, `node.js`, `ci-cd`, `r&d`).
const KEPT_PUNCTUATION: &[char] = &['+', '#', '.', '-', '&'];

/// Lowercase, whitespace-collapsed text restricted to `[a-z0-9+#.\-&]` and single spaces.
///
/// The only way to build one is `NormalizedText::normalize`, so holders can rely on
/// the character set. Normalizing an already-normalized string returns it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn normalize(raw: &str) -> Self {
        let replaced: String = raw
            .to_lowercase()
            .chars()
            .map(|c| if is_kept(c) { c } else { ' ' })
            .collect();

        NormalizedText(replaced.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.0.split(' ').filter(|w| !w.is_empty()).count()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|w| !w.is_empty())
    }
}

fn is_kept(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || KEPT_PUNCTUATION.contains(&c)
}
