//! `spick cache` — inspect and clear the on-disk sheet cache.

use chrono::{DateTime, Duration, Utc};

use sheetpick_sheet::{CacheEntryInfo, DiskCache};

use crate::CliError;

pub(crate) fn cmd_status(json: bool) -> Result<(), CliError> {
    let entries = match DiskCache::default_dir() {
        Some(dir) => DiskCache::new(dir).entries(),
        None => Vec::new(),
    };

    if json {
        let rendered = serde_json::to_string_pretty(&entries)
            .map_err(|e| CliError::general(format!("JSON encode error: {}", e)))?;
        println!("{}", rendered);
        return Ok(());
    }

    if entries.is_empty() {
        println!("cache is empty");
        return Ok(());
    }

    let now = Utc::now();
    for entry in &entries {
        println!(
            "{:<44}  {:>6} rows  fetched {}",
            entry.name,
            entry.row_count,
            age_label(entry, now),
        );
    }
    Ok(())
}

pub(crate) fn cmd_clear() -> Result<(), CliError> {
    let Some(dir) = DiskCache::default_dir() else {
        println!("cache is empty");
        return Ok(());
    };
    let removed = DiskCache::new(dir)
        .clear()
        .map_err(|e| CliError::general(format!("cache clear failed: {}", e)))?;
    println!("removed {} cached sheet(s)", removed);
    Ok(())
}

fn age_label(entry: &CacheEntryInfo, now: DateTime<Utc>) -> String {
    match DateTime::from_timestamp_millis(entry.fetched_at_ms as i64) {
        Some(fetched) => humanize_age(now.signed_duration_since(fetched)),
        None => "at an unknown time".to_string(),
    }
}

/// "37s ago", "5m ago", "3h ago", "2d ago". Clock skew reads as "just now".
fn humanize_age(age: Duration) -> String {
    let secs = age.num_seconds();
    if secs < 0 {
        return "just now".to_string();
    }
    if secs < 60 {
        return format!("{}s ago", secs);
    }
    if age.num_minutes() < 60 {
        return format!("{}m ago", age.num_minutes());
    }
    if age.num_hours() < 24 {
        return format!("{}h ago", age.num_hours());
    }
    format!("{}d ago", age.num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ages_pick_the_largest_whole_unit() {
        assert_eq!(humanize_age(Duration::seconds(0)), "0s ago");
        assert_eq!(humanize_age(Duration::seconds(59)), "59s ago");
        assert_eq!(humanize_age(Duration::seconds(60)), "1m ago");
        assert_eq!(humanize_age(Duration::minutes(59)), "59m ago");
        assert_eq!(humanize_age(Duration::minutes(60)), "1h ago");
        assert_eq!(humanize_age(Duration::hours(23)), "23h ago");
        assert_eq!(humanize_age(Duration::hours(24)), "1d ago");
        assert_eq!(humanize_age(Duration::days(400)), "400d ago");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        assert_eq!(humanize_age(Duration::seconds(-5)), "just now");
    }
}
