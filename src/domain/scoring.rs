use super::text::{normalize, tokens};

pub const EXACT_SCORE: u32 = 1000;
pub const PREFIX_SCORE: u32 = 800;
pub const SUBSTRING_SCORE: u32 = 600;
pub const TOKEN_SCORE: u32 = 100;

/// Relevance of `name` for `query`. Zero means no match evidence.
pub fn score_match(name: &str, query: &str) -> u32 {
    let name_norm = normalize(Some(name));
    let query_norm = normalize(Some(query));
    if name_norm.is_empty() || query_norm.is_empty() {
        return 0;
    }

    if name_norm == query_norm {
        return EXACT_SCORE;
    }
    if name_norm.starts_with(&query_norm) {
        return PREFIX_SCORE;
    }
    if name_norm.contains(&query_norm) {
        return SUBSTRING_SCORE;
    }

    tokens(&query_norm)
        .into_iter()
        .filter(|token| name_norm.contains(token))
        .map(|_| TOKEN_SCORE)
        .sum()
}
