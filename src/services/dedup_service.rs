use crate::models::question::Question;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Candidates more similar than this to an already kept question are dropped.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

struct Patterns {
    url: Regex,
    punctuation: Regex,
    digits: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        url: Regex::new(r"https?://\S+").expect("valid url pattern"),
        punctuation: Regex::new(r#"[\\/\-_.:,;()\[\]{}"'`<>]"#).expect("valid punctuation pattern"),
        digits: Regex::new(r"\d+").expect("valid digit pattern"),
        whitespace: Regex::new(r"\s+").expect("valid whitespace pattern"),
    })
}

pub fn normalize_text(text: &str) -> String {
    let p = patterns();
    let lowered = text.to_lowercase();
    let s = p.url.replace_all(&lowered, "");
    let s = p.punctuation.replace_all(&s, " ");
    let s = p.digits.replace_all(&s, " ");
    let s = p.whitespace.replace_all(&s, " ");
    s.trim().to_string()
}

/// Jaccard index over the word sets of the normalized texts.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize_text(a);
    let b = normalize_text(b);
    let set_a: HashSet<&str> = a.split_whitespace().collect();
    let set_b: HashSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}

/// Keeps questions in order, skipping near-duplicates of already kept ones, up to `needed`.
pub fn dedupe(items: Vec<Question>, needed: usize) -> Vec<Question> {
    let mut kept: Vec<Question> = Vec::with_capacity(needed.min(items.len()));
    for candidate in items {
        if kept.len() >= needed {
            break;
        }
        let duplicate = kept
            .iter()
            .any(|k| similarity(candidate.dedup_text(), k.dedup_text()) > SIMILARITY_THRESHOLD);
        if duplicate {
            tracing::debug!(id = %candidate.id, "Dropping near-duplicate question");
            continue;
        }
        kept.push(candidate);
    }
    kept
}
