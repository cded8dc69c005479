//! Keyword-coverage scoring for intents.
//!
//! The score is the fraction of an intent's keywords that occur (as
//! case-insensitive substrings) anywhere in the query. Extra words in the
//! query never lower it, so intents with a few specific keywords saturate
//! faster than intents with many generic ones.

/// Returns a confidence in `[0, 1]`; exactly `0.0` when nothing matches or
/// the keyword list is empty.
pub fn score(query: &str, keywords: &[&str]) -> f32 {
    if keywords.is_empty() {
        return 0.0;
    }

    let query_lower = query.to_lowercase();
    let matches = keywords
        .iter()
        .filter(|keyword| query_lower.contains(&keyword.to_lowercase()))
        .count();

    if matches == 0 {
        return 0.0;
    }

    (matches as f32 / keywords.len() as f32).min(1.0)
}
