use std::collections::HashSet;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::config::SimilarityConfig;

fn non_alpha() -> &'static Regex {
    static NON_ALPHA: OnceLock<Regex> = OnceLock::new();
    NON_ALPHA.get_or_init(|| Regex::new(r"[^a-z\s]").expect("static pattern compiles"))
}

/// Lowercase, drop everything outside `a-z` and whitespace, split on whitespace runs.
/// Order is preserved so the lead phrase can be read off the front.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    non_alpha()
        .replace_all(&lowered, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Intersection over union of two token sets; 0.0 when both are empty.
pub fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Flags prompts that are near-duplicates of something recently shown.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityFilter {
    config: SimilarityConfig,
}

impl SimilarityFilter {
    pub fn new(config: SimilarityConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    /// True when `candidate` matches any history entry by token overlap or
    /// by an identical lead phrase. Empty candidate or history is never similar.
    pub fn is_too_similar<I, S>(&self, candidate: &str, history: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if candidate.trim().is_empty() {
            return false;
        }

        let candidate = Fingerprint::new(candidate, self.config.lead_phrase_tokens);
        history.into_iter().any(|previous| {
            let previous = Fingerprint::new(previous.as_ref(), self.config.lead_phrase_tokens);
            self.matches(&candidate, &previous)
        })
    }

    fn matches(&self, a: &Fingerprint, b: &Fingerprint) -> bool {
        let a_set = a.token_set();
        let b_set = b.token_set();
        if jaccard(&a_set, &b_set) >= self.config.jaccard_threshold {
            return true;
        }
        !a.lead.is_empty() && a.lead == b.lead
    }
}

struct Fingerprint {
    tokens: Vec<String>,
    lead: String,
}

impl Fingerprint {
    fn new(text: &str, lead_len: usize) -> Self {
        let tokens = tokenize(text);
        let lead = tokens
            .iter()
            .take(lead_len)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        Self { tokens, lead }
    }

    fn token_set(&self) -> HashSet<&str> {
        self.tokens.iter().map(String::as_str).collect()
    }
}
