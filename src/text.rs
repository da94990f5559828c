//! Text normalization shared by the scorer, ranker, and classifier.
//!
//! Everything the engine compares goes through [`normalize`] first, so
//! matching is case-insensitive and ignores surrounding whitespace.

/// Words that carry no topical signal in a knowledge-base question.
const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "any", "are", "be", "can", "do", "does", "find", "for", "get",
    "hello", "hey", "hi", "how", "i", "in", "is", "it", "me", "my", "of", "on", "or", "our",
    "please", "show", "some", "thanks", "that", "the", "there", "this", "to", "us", "we", "what",
    "when", "where", "which", "who", "why", "with", "you", "your",
];

/// Case-fold and trim.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Split lowercased text into alphanumeric tokens.
///
/// Punctuation and whitespace both separate tokens: `"CI/CD on-call"`
/// becomes `["ci", "cd", "on", "call"]`.
pub fn tokenize(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Distinct query tokens worth matching on their own.
///
/// Drops stop words and single-character tokens; keeps first-seen order.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for token in tokenize(query) {
        if token.chars().count() < 2 || is_stop_word(&token) {
            continue;
        }
        if !terms.contains(&token) {
            terms.push(token);
        }
    }
    terms
}

/// Tokens joined by single spaces, used for whole-phrase comparisons.
pub fn phrase(s: &str) -> String {
    tokenize(s).join(" ")
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}
