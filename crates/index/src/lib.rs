//! In-memory fuzzy index over a list of candidate strings.
//!
//! `FuzzyIndex::build` takes ownership of the candidates; `search` returns
//! scored results with matched char ranges for highlighting. The index never
//! truncates result lists. Presentation limits such as a maximum suggestion
//! count belong to the caller.

pub mod highlight;
pub mod score;

pub use highlight::{collapse_positions, segments, Segment};
pub use score::{match_query, QueryMatch};

use serde::Serialize;

/// Matching knobs, mirroring the widget settings that feed them.
///
/// `threshold` 0 admits only contiguous prefix matches; 1 admits any
/// subsequence match the `distance` gate allows. `distance` caps the extra
/// character positions tolerated inside and before the match window.
/// Queries shorter than `min_match_char_length` chars return no results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexConfig {
    pub threshold: f32,
    pub distance: u32,
    pub min_match_char_length: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { threshold: 0.3, distance: 100, min_match_char_length: 2 }
    }
}

/// One search hit. `index` is the position in the built candidate list,
/// `ranges` the matched half-open char ranges, `score` ascending-is-better.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub index: usize,
    pub text: String,
    pub score: f32,
    pub ranges: Vec<(usize, usize)>,
}

impl SearchResult {
    /// Render the hit as highlight segments.
    pub fn segments(&self) -> Vec<Segment> {
        segments(&self.text, &self.ranges)
    }
}

pub struct FuzzyIndex {
    items: Vec<String>,
    config: IndexConfig,
}

impl FuzzyIndex {
    pub fn build(items: Vec<String>, config: IndexConfig) -> Self {
        Self { items, config }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All candidates matching `query` within the configured threshold,
    /// ranked ascending by score. The sort is stable, so candidates with
    /// equal scores keep their list order.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        if (query.chars().count() as u32) < self.config.min_match_char_length {
            return Vec::new();
        }

        let mut results: Vec<SearchResult> = Vec::new();
        for (index, item) in self.items.iter().enumerate() {
            let Some(found) = match_query(item, query, self.config.distance) else {
                continue;
            };
            if found.score > self.config.threshold {
                continue;
            }
            results.push(SearchResult {
                index,
                text: item.clone(),
                score: found.score,
                ranges: collapse_positions(&found.positions),
            });
        }
        results.sort_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results
    }
}
