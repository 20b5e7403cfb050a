//! `spick search` — one-shot fuzzy query over the sheet.
//!
//! Runs the same index the widget uses, without the widget: fetch (or
//! read `--from-csv`), build the index, print ranked hits. Exit code 1
//! means the query matched nothing, like grep.

use std::path::PathBuf;

use serde::Serialize;

use sheetpick_config::WidgetSettings;
use sheetpick_index::{FuzzyIndex, IndexConfig, Segment};
use sheetpick_sheet::{parse_rows, usable_items};

use crate::exit_codes::EXIT_SEARCH_NO_MATCH;
use crate::fetch;
use crate::CliError;

#[derive(Serialize)]
struct SearchHit {
    text: String,
    score: f32,
    segments: Vec<Segment>,
}

pub(crate) fn index_config(settings: &WidgetSettings) -> IndexConfig {
    IndexConfig {
        threshold: settings.threshold,
        distance: settings.distance,
        min_match_char_length: settings.min_char_required,
    }
}

pub(crate) fn cmd_search(
    query: &str,
    settings: &WidgetSettings,
    range: Option<String>,
    from_csv: Option<PathBuf>,
    json: bool,
    no_cache: bool,
    base_url: Option<String>,
) -> Result<(), CliError> {
    let items = match from_csv {
        Some(path) => items_from_csv(&path, settings)?,
        None => {
            let store = fetch::build_store(base_url.as_deref(), no_cache);
            let key = fetch::sheet_key(settings, range);
            let rows = store.rows(&key, settings.max_rows).map_err(CliError::sheet)?;
            usable_items(&rows, settings.column_index).map_err(CliError::sheet)?
        }
    };

    let index = FuzzyIndex::build(items, index_config(settings));
    let results = index.search(query);

    if results.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("no matches for {:?}", query);
        }
        return Err(CliError::silent(EXIT_SEARCH_NO_MATCH));
    }

    let top = results.into_iter().take(settings.max_results as usize);

    if json {
        let hits: Vec<SearchHit> = top
            .map(|r| SearchHit { segments: r.segments(), text: r.text, score: r.score })
            .collect();
        let rendered = serde_json::to_string_pretty(&hits)
            .map_err(|e| CliError::general(format!("JSON encode error: {}", e)))?;
        println!("{}", rendered);
    } else {
        for result in top {
            println!("{:>7.3}  {}", result.score, marked(&result.segments()));
        }
    }

    Ok(())
}

fn items_from_csv(path: &PathBuf, settings: &WidgetSettings) -> Result<Vec<String>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::general(format!("cannot read {}: {}", path.display(), e)))?;
    let rows = parse_rows(&text, settings.max_rows)
        .map_err(|e| CliError::general(format!("{}: {}", path.display(), e)))?;
    usable_items(&rows, settings.column_index).map_err(CliError::sheet)
}

/// Bracket the matched runs: `[Ali]ce`.
fn marked(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        if segment.matched {
            out.push('[');
            out.push_str(&segment.text);
            out.push(']');
        } else {
            out.push_str(&segment.text);
        }
    }
    out
}
