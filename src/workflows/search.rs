use regex::Regex;
use tracing::{debug, warn};

use crate::domain::models::SearchResult;
use crate::domain::scoring::score_match;
use crate::domain::text::{normalize, tokens};
use crate::infra::dataset::Dataset;
use crate::infra::query::NameFilter;

/// Coarse retrieval cap and final ranked cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub retrieval: usize,
    pub results: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            retrieval: 100,
            results: 15,
        }
    }
}

/// Recognizes queries that are exact catalog keys rather than names.
#[derive(Debug, Clone)]
pub struct DirectIdentifier {
    re: Regex,
}

impl DirectIdentifier {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            re: Regex::new(pattern)?,
        })
    }

    pub fn matches(&self, query: &str) -> bool {
        self.re.is_match(query)
    }
}

impl Default for DirectIdentifier {
    fn default() -> Self {
        Self {
            re: Regex::new(r"^tt\d+$").unwrap(),
        }
    }
}

/// Ranked shows for a free-text name query, most relevant first.
///
/// A missing dataset or a failing query yields no results.
pub fn search_shows(
    dataset: Option<&Dataset>,
    query: &str,
    limits: SearchLimits,
) -> Vec<SearchResult> {
    let Some(dataset) = dataset else {
        return Vec::new();
    };

    let normalized = normalize(Some(query));
    let Some(filter) = NameFilter::from_tokens(&tokens(&normalized), limits.retrieval) else {
        return Vec::new();
    };

    let candidates = match dataset.find_shows(&filter) {
        Ok(shows) => shows,
        Err(e) => {
            warn!(query, error = %e, "show search failed");
            return Vec::new();
        }
    };
    debug!(query, candidates = candidates.len(), "retrieved search candidates");

    let mut results: Vec<SearchResult> = candidates
        .into_iter()
        .map(|show| {
            let score = score_match(&show.name, query);
            SearchResult { show, score }
        })
        .collect();
    // sort_by is stable, so equal scores keep retrieval order.
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(limits.results);
    results
}
