//! Segment-based highlighting.
//!
//! Matched character positions collapse into half-open char ranges, and
//! ranges render as an ordered list of segments that concatenate back to
//! the original string. Renderers style matched segments however they like;
//! no offset arithmetic crosses an API boundary.

use serde::{Deserialize, Serialize};

/// One run of candidate text, either entirely matched or entirely not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub matched: bool,
    pub text: String,
}

impl Segment {
    pub fn matched(text: impl Into<String>) -> Self {
        Self { matched: true, text: text.into() }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self { matched: false, text: text.into() }
    }
}

/// Collapse ascending char positions into half-open `(start, end)` ranges.
///
/// `[0, 1, 2, 5]` becomes `[(0, 3), (5, 6)]`.
pub fn collapse_positions(positions: &[usize]) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for &pos in positions {
        match ranges.last_mut() {
            Some((_, end)) if *end == pos => *end = pos + 1,
            _ => ranges.push((pos, pos + 1)),
        }
    }
    ranges
}

/// Split `text` into segments along `ranges` (half-open, in char positions,
/// ascending and non-overlapping). Positions beyond the end of `text` are
/// ignored. The segment texts always concatenate to `text`.
pub fn segments(text: &str, ranges: &[(usize, usize)]) -> Vec<Segment> {
    // Char position -> byte offset, with a sentinel for the end
    let mut bounds: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    bounds.push(text.len());
    let char_count = bounds.len() - 1;

    let mut out: Vec<Segment> = Vec::new();
    let mut cursor = 0usize;
    for &(start, end) in ranges {
        let start = start.min(char_count);
        let end = end.min(char_count);
        if end <= start || start < cursor {
            continue;
        }
        if cursor < start {
            out.push(Segment::plain(&text[bounds[cursor]..bounds[start]]));
        }
        out.push(Segment::matched(&text[bounds[start]..bounds[end]]));
        cursor = end;
    }
    if cursor < char_count {
        out.push(Segment::plain(&text[bounds[cursor]..]));
    }
    if out.is_empty() && !text.is_empty() {
        out.push(Segment::plain(text));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(segments: &[Segment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn consecutive_positions_collapse() {
        assert_eq!(collapse_positions(&[0, 1, 2, 5]), vec![(0, 3), (5, 6)]);
    }

    #[test]
    fn isolated_positions_stay_separate() {
        assert_eq!(
            collapse_positions(&[1, 3, 5]),
            vec![(1, 2), (3, 4), (5, 6)]
        );
    }

    #[test]
    fn no_positions_no_ranges() {
        assert!(collapse_positions(&[]).is_empty());
    }

    #[test]
    fn segments_split_around_match() {
        let segs = segments("Alice Johnson", &[(6, 10)]);
        assert_eq!(
            segs,
            vec![
                Segment::plain("Alice "),
                Segment::matched("John"),
                Segment::plain("son"),
            ]
        );
    }

    #[test]
    fn segments_concatenate_to_original() {
        let text = "Alice Johnson";
        let segs = segments(text, &[(0, 3), (6, 10)]);
        assert_eq!(joined(&segs), text);
    }

    #[test]
    fn full_range_is_one_matched_segment() {
        let segs = segments("Bob", &[(0, 3)]);
        assert_eq!(segs, vec![Segment::matched("Bob")]);
    }

    #[test]
    fn no_ranges_is_one_plain_segment() {
        let segs = segments("Bob", &[]);
        assert_eq!(segs, vec![Segment::plain("Bob")]);
    }

    #[test]
    fn empty_text_has_no_segments() {
        assert!(segments("", &[]).is_empty());
    }

    #[test]
    fn multibyte_chars_split_on_char_positions() {
        // "héllo" with 'é' matched: char positions, not byte offsets
        let segs = segments("héllo", &[(1, 2)]);
        assert_eq!(
            segs,
            vec![
                Segment::plain("h"),
                Segment::matched("é"),
                Segment::plain("llo"),
            ]
        );
    }

    #[test]
    fn out_of_bounds_ranges_are_clamped() {
        let segs = segments("ab", &[(1, 9)]);
        assert_eq!(segs, vec![Segment::plain("a"), Segment::matched("b")]);
    }

    #[test]
    fn rendering_twice_is_identical() {
        let ranges = [(0, 2), (4, 6)];
        assert_eq!(segments("abcdef", &ranges), segments("abcdef", &ranges));
    }
}
