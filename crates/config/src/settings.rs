// Widget settings
// Loaded from ~/.config/sheetpick/settings.json, overlaid by host-provided values

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::resolve::{parse_bool, parse_u32, Resolver, SettingWarning};
use crate::SettingsSource;

/// Wire-format setting names, as the host supplies them.
pub mod names {
    pub const GOOGLE_SHEET_ID: &str = "googleSheetId";
    pub const COLUMN_INDEX: &str = "columnIndex";
    pub const PLACEHOLDER_TEXT: &str = "placeholderText";
    pub const INPUT_WIDTH: &str = "inputWidth";
    pub const AUTOCOMPLETE_WIDTH: &str = "autocompleteWidth";
    pub const DYNAMIC_RESIZE: &str = "dynamicResize";
    pub const THRESHOLD: &str = "threshold";
    pub const DISTANCE: &str = "distance";
    pub const MAX_RESULTS: &str = "maxResults";
    pub const MIN_CHAR_REQUIRED: &str = "minCharRequired";
    pub const DEBOUNCE_TIME: &str = "debounceTime";
    pub const MAX_ROWS: &str = "maxRows";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    /// ID of the published Google Sheet. Required; there is no usable default.
    #[serde(rename = "googleSheetId")]
    pub sheet_id: String,

    /// Column to index, 0-based.
    #[serde(rename = "columnIndex")]
    pub column_index: u32,

    #[serde(rename = "placeholderText")]
    pub placeholder_text: String,

    // Widths are opaque CSS strings, forwarded to the host untouched.
    #[serde(rename = "inputWidth")]
    pub input_width: String,

    #[serde(rename = "autocompleteWidth")]
    pub autocomplete_width: String,

    /// Grow the container with the suggestion list; when false the host is
    /// asked for one fixed height.
    #[serde(rename = "dynamicResize")]
    pub dynamic_resize: bool,

    /// Match strictness, 0 = contiguous prefix only, 1 = any subsequence.
    #[serde(rename = "threshold")]
    pub threshold: f32,

    /// Positional slack tolerated by the matcher, in characters.
    #[serde(rename = "distance")]
    pub distance: u32,

    #[serde(rename = "maxResults")]
    pub max_results: u32,

    #[serde(rename = "minCharRequired")]
    pub min_char_required: u32,

    /// Quiet period after the last keystroke before a search runs.
    #[serde(rename = "debounceTime")]
    pub debounce_time_ms: u32,

    /// Cap on fetched data rows, header excluded.
    #[serde(rename = "maxRows")]
    pub max_rows: u32,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            sheet_id: String::new(),
            column_index: 0,
            placeholder_text: "Start typing...".to_string(),
            input_width: "100%".to_string(),
            autocomplete_width: "100%".to_string(),
            dynamic_resize: true,
            threshold: 0.3,
            distance: 100,
            max_results: 5,
            min_char_required: 2,
            debounce_time_ms: 300,
            max_rows: 1000,
        }
    }
}

impl WidgetSettings {
    /// Resolve the full setting table from a host source over built-in defaults.
    pub fn from_source(source: &dyn SettingsSource) -> (Self, Vec<SettingWarning>) {
        let mut settings = Self::default();
        let warnings = settings.apply_source(source);
        (settings, warnings)
    }

    /// Overlay provided values onto `self`; current values act as defaults.
    ///
    /// Layering order is caller-driven: built-in defaults, then the settings
    /// file, then host-provided values, each pass a separate call.
    pub fn apply_source(&mut self, source: &dyn SettingsSource) -> Vec<SettingWarning> {
        let mut r = Resolver::new(source);

        self.sheet_id = r.resolve_string(names::GOOGLE_SHEET_ID, &self.sheet_id);
        self.column_index = r.resolve(names::COLUMN_INDEX, self.column_index, parse_column_ref);
        self.placeholder_text = r.resolve_string(names::PLACEHOLDER_TEXT, &self.placeholder_text);
        self.input_width = r.resolve_string(names::INPUT_WIDTH, &self.input_width);
        self.autocomplete_width =
            r.resolve_string(names::AUTOCOMPLETE_WIDTH, &self.autocomplete_width);
        self.dynamic_resize = r.resolve(names::DYNAMIC_RESIZE, self.dynamic_resize, parse_bool);
        self.threshold = r.resolve(names::THRESHOLD, self.threshold, parse_threshold);
        self.distance = r.resolve(names::DISTANCE, self.distance, parse_u32);
        self.max_results = r.resolve(names::MAX_RESULTS, self.max_results, parse_u32);
        self.min_char_required =
            r.resolve(names::MIN_CHAR_REQUIRED, self.min_char_required, parse_u32);
        self.debounce_time_ms = r.resolve(names::DEBOUNCE_TIME, self.debounce_time_ms, parse_u32);
        self.max_rows = r.resolve(names::MAX_ROWS, self.max_rows, parse_u32);

        r.take_warnings()
    }

    /// A widget without a sheet ID has nothing to index.
    pub fn is_configured(&self) -> bool {
        !self.sheet_id.is_empty()
    }

    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetpick");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str(&cleaned) {
                    Ok(settings) => settings,
                    Err(e) => {
                        eprintln!("warning: could not parse {}: {}", path.display(), e);
                        eprintln!("warning: using default settings");
                        Self::default()
                    }
                }
            }
            Err(e) => {
                eprintln!("warning: could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save current settings to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Write the commented default template to `path`.
    pub fn create_default_file(path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let default_config = r#"{
    // The published Google Sheet to index (required)
    "googleSheetId": "",

    // Column to index: 0-based number or sheet letter ("0", "2", "C")
    "columnIndex": 0,

    // Input presentation, forwarded to the host
    "placeholderText": "Start typing...",
    "inputWidth": "100%",
    "autocompleteWidth": "100%",

    // Container height: grow with the list, or pin to the fixed height
    "dynamicResize": true,

    // Matching: threshold 0 = strictest, 1 = loosest; distance caps slack
    "threshold": 0.3,
    "distance": 100,

    // Suggestion list
    "maxResults": 5,
    "minCharRequired": 2,

    // Milliseconds of quiet before a search fires
    "debounceTime": 300,

    // Cap on fetched data rows (header excluded)
    "maxRows": 1000
}
"#;

        fs::write(path, default_config).map_err(|e| e.to_string())
    }
}

/// Parse a column reference: a 0-based index ("0", "2") or a spreadsheet
/// letter ("C", "AA", case-insensitive).
pub fn parse_column_ref(raw: &str) -> Result<u32, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("expected a column number or letter".to_string());
    }

    if raw.chars().all(|c| c.is_ascii_digit()) {
        return raw
            .parse::<u32>()
            .map_err(|_| "column number out of range".to_string());
    }

    if raw.chars().all(|c| c.is_ascii_alphabetic()) {
        let mut index: u32 = 0;
        for c in raw.chars() {
            let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
            index = index
                .checked_mul(26)
                .and_then(|i| i.checked_add(digit))
                .ok_or_else(|| "column letter out of range".to_string())?;
        }
        return Ok(index - 1);
    }

    Err("expected a column number or letter".to_string())
}

/// Threshold is a match-strictness ratio; values outside [0, 1] are malformed.
fn parse_threshold(raw: &str) -> Result<f32, String> {
    let value = crate::resolve::parse_f32(raw)?;
    if !(0.0..=1.0).contains(&value) {
        return Err("expected a number between 0 and 1".to_string());
    }
    Ok(value)
}
