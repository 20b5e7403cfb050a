//! Case-insensitive subsequence matching with a documented score.
//!
//! A query matches a candidate when every query character appears in the
//! candidate in order, compared on lowercased text. The greedy leftmost
//! alignment is used. With `first`/`last` the positions of the first and
//! last matched character and `m` the query length:
//!
//! ```text
//! slack = (last - first + 1) - m      extra characters inside the window
//! lead  = first                        characters before the window
//! slack + lead > distance           -> no match
//! score = (slack + lead) / (slack + lead + 4 * m)
//! ```
//!
//! Score is 0.0 exactly when the query occurs contiguously at the start of
//! the candidate and grows toward 1.0 as the match loosens. Lower is better.

/// A successful match: the candidate char positions that matched, in
/// ascending order, and the score.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub positions: Vec<usize>,
    pub score: f32,
}

/// Match `query` against `candidate`, or `None` when the query is not a
/// subsequence or falls outside the `distance` gate.
///
/// Matching is performed on lowercased copies while keeping a mapping back
/// to original character positions, so candidates whose lowercasing expands
/// (İ becomes i̇) still highlight the right characters. An empty query never
/// matches.
pub fn match_query(candidate: &str, query: &str, distance: u32) -> Option<QueryMatch> {
    // Lowercased candidate with a map back to original char positions
    let mut lowered: Vec<char> = Vec::new();
    let mut lowered_to_orig: Vec<usize> = Vec::new();
    for (orig_idx, ch) in candidate.chars().enumerate() {
        for lc in ch.to_lowercase() {
            lowered.push(lc);
            lowered_to_orig.push(orig_idx);
        }
    }

    let needle: Vec<char> = query.to_lowercase().chars().collect();
    if needle.is_empty() {
        return None;
    }

    // Greedy leftmost subsequence scan
    let mut hits: Vec<usize> = Vec::with_capacity(needle.len());
    let mut cur = 0usize;
    for &nc in &needle {
        let mut found = None;
        while cur < lowered.len() {
            if lowered[cur] == nc {
                found = Some(cur);
                cur += 1;
                break;
            }
            cur += 1;
        }
        hits.push(found?);
    }

    let first = hits[0];
    let last = hits[hits.len() - 1];
    let m = needle.len();

    let slack = (last - first + 1) - m;
    let lead = first;
    let spread = slack + lead;
    if spread > distance as usize {
        return None;
    }
    let score = spread as f32 / (spread + 4 * m) as f32;

    let mut positions: Vec<usize> = hits.iter().map(|&p| lowered_to_orig[p]).collect();
    positions.dedup();
    Some(QueryMatch { positions, score })
}
