// Property-based tests for fuzzy index invariants.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;
use sheetpick_index::{match_query, segments, FuzzyIndex, IndexConfig};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_candidate() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[a-zA-Z ]{0,24}",
        1 => r"[a-zA-Z0-9 '\-\.]{0,24}",
        1 => r"[a-zA-Zéüñçİß]{0,12}",
    ]
}

fn arb_query() -> impl Strategy<Value = String> {
    r"[a-z]{2,6}"
}

fn arb_candidates() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_candidate(), 0..16)
}

fn admit_all() -> IndexConfig {
    IndexConfig {
        threshold: 1.0,
        distance: 10_000,
        min_match_char_length: 1,
    }
}

// ===========================================================================
// Matcher invariants (256 cases)
// ===========================================================================

// Scores live in [0, 1) and positions stay inside the candidate
proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn score_and_positions_are_well_formed(
        candidate in arb_candidate(),
        query in arb_query(),
    ) {
        if let Some(found) = match_query(&candidate, &query, 10_000) {
            prop_assert!(found.score >= 0.0 && found.score < 1.0,
                "score {} out of range for {:?} / {:?}", found.score, candidate, query);

            let char_count = candidate.chars().count();
            prop_assert!(!found.positions.is_empty(),
                "a match must carry positions");
            for window in found.positions.windows(2) {
                prop_assert!(window[0] < window[1],
                    "positions not strictly ascending: {:?}", found.positions);
            }
            if let Some(&last) = found.positions.last() {
                prop_assert!(last < char_count,
                    "position {} beyond candidate length {}", last, char_count);
            }
        }
    }
}

// On plain ASCII the matched characters spell the query in order
proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn matched_chars_spell_the_query(
        candidate in r"[a-zA-Z ]{0,24}",
        query in arb_query(),
    ) {
        if let Some(found) = match_query(&candidate, &query, 10_000) {
            let chars: Vec<char> = candidate.chars().collect();
            let matched: String = found
                .positions
                .iter()
                .map(|&p| chars[p].to_ascii_lowercase())
                .collect();
            prop_assert_eq!(&matched, &query,
                "positions {:?} in {:?} do not spell {:?}", found.positions, candidate, query);
        }
    }
}

// The distance gate is monotone: widening it never loses a match
proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn distance_gate_is_monotone(
        candidate in arb_candidate(),
        query in arb_query(),
        d1 in 0u32..60,
        gap in 0u32..60,
    ) {
        let tight = match_query(&candidate, &query, d1);
        let loose = match_query(&candidate, &query, d1 + gap);
        if let Some(t) = tight {
            let l = loose.expect("widening distance lost a match");
            prop_assert_eq!(t.positions, l.positions);
            prop_assert_eq!(t.score, l.score);
        }
    }
}

// ===========================================================================
// Search invariants (256 cases)
// ===========================================================================

// Results are sorted ascending by score, and equal scores keep list order
proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn results_sorted_and_stable(
        items in arb_candidates(),
        query in arb_query(),
    ) {
        let index = FuzzyIndex::build(items, admit_all());
        let results = index.search(&query);

        for window in results.windows(2) {
            prop_assert!(window[0].score <= window[1].score,
                "scores out of order: {} then {}", window[0].score, window[1].score);
            if window[0].score == window[1].score {
                prop_assert!(window[0].index < window[1].index,
                    "tie broke list order: {} then {}", window[0].index, window[1].index);
            }
        }
    }
}

// Search is deterministic
proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn search_is_deterministic(
        items in arb_candidates(),
        query in arb_query(),
    ) {
        let index = FuzzyIndex::build(items, admit_all());
        prop_assert_eq!(index.search(&query), index.search(&query));
    }
}

// Raising the threshold only adds results
proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn threshold_is_monotone(
        items in arb_candidates(),
        query in arb_query(),
        t1 in 0.0f32..1.0,
        t2 in 0.0f32..1.0,
    ) {
        let (low, high) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let strict = FuzzyIndex::build(items.clone(), IndexConfig { threshold: low, ..admit_all() });
        let lenient = FuzzyIndex::build(items, IndexConfig { threshold: high, ..admit_all() });

        let strict_hits: HashSet<usize> = strict.search(&query).iter().map(|r| r.index).collect();
        let lenient_hits: HashSet<usize> = lenient.search(&query).iter().map(|r| r.index).collect();
        prop_assert!(strict_hits.is_subset(&lenient_hits),
            "threshold {} admitted {:?} that {} dropped", low, strict_hits, high);
    }
}

// Segments always reassemble the candidate, and ranges never overlap
proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn segments_reassemble_candidates(
        items in arb_candidates(),
        query in arb_query(),
    ) {
        let index = FuzzyIndex::build(items, admit_all());
        for result in index.search(&query) {
            for window in result.ranges.windows(2) {
                prop_assert!(window[0].1 < window[1].0,
                    "ranges touch or overlap: {:?}", result.ranges);
            }
            for &(start, end) in &result.ranges {
                prop_assert!(start < end, "empty range in {:?}", result.ranges);
            }

            let joined: String = result
                .segments()
                .iter()
                .map(|s| s.text.as_str())
                .collect();
            prop_assert_eq!(&joined, &result.text,
                "segments do not reassemble {:?}", result.text);

            let rendered_again = segments(&result.text, &result.ranges);
            prop_assert_eq!(result.segments(), rendered_again,
                "rendering is not idempotent");
        }
    }
}
