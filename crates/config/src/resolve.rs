// Typed setting resolution with default fallback

use std::fmt;

use crate::SettingsSource;

/// A setting that was provided but could not be parsed.
///
/// The resolver substitutes the declared default and records one of these;
/// a malformed setting is never fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingWarning {
    pub name: String,
    pub raw: String,
    pub message: String,
}

impl fmt::Display for SettingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "setting {}: {} (got {:?}), using default",
            self.name, self.message, self.raw
        )
    }
}

/// Resolves named settings from a [`SettingsSource`].
///
/// Resolution rules, in order:
/// 1. name absent, or raw value is the empty string -> declared default
/// 2. raw value parses -> parsed value
/// 3. raw value fails to parse -> declared default, warning recorded
pub struct Resolver<'a> {
    source: &'a dyn SettingsSource,
    warnings: Vec<SettingWarning>,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a dyn SettingsSource) -> Self {
        Self { source, warnings: Vec::new() }
    }

    pub fn resolve<T, F>(&mut self, name: &str, default: T, parse: F) -> T
    where
        F: Fn(&str) -> Result<T, String>,
    {
        let raw = match self.source.raw(name) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return default,
        };

        match parse(&raw) {
            Ok(value) => value,
            Err(message) => {
                self.warnings.push(SettingWarning {
                    name: name.to_string(),
                    raw,
                    message,
                });
                default
            }
        }
    }

    /// String settings pass through unparsed; only absence/empty falls back.
    pub fn resolve_string(&mut self, name: &str, default: &str) -> String {
        self.resolve(name, default.to_string(), |raw| Ok(raw.to_string()))
    }

    /// Drain warnings accumulated so far.
    pub fn take_warnings(&mut self) -> Vec<SettingWarning> {
        std::mem::take(&mut self.warnings)
    }
}

pub fn parse_u32(raw: &str) -> Result<u32, String> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| "expected a whole number".to_string())
}

pub fn parse_f32(raw: &str) -> Result<f32, String> {
    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|_| "expected a number".to_string())?;
    if !value.is_finite() {
        return Err("expected a finite number".to_string());
    }
    Ok(value)
}

/// Accepts true/false, 1/0, yes/no (case-insensitive).
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn provided_value_is_parsed() {
        let src = source(&[("maxResults", "12")]);
        let mut r = Resolver::new(&src);
        assert_eq!(r.resolve("maxResults", 5u32, parse_u32), 12);
        assert!(r.take_warnings().is_empty());
    }

    #[test]
    fn absent_value_uses_default() {
        let src = source(&[]);
        let mut r = Resolver::new(&src);
        assert_eq!(r.resolve("maxResults", 5u32, parse_u32), 5);
        assert!(r.take_warnings().is_empty());
    }

    #[test]
    fn empty_value_uses_default() {
        let src = source(&[("maxResults", "")]);
        let mut r = Resolver::new(&src);
        assert_eq!(r.resolve("maxResults", 5u32, parse_u32), 5);
        assert!(r.take_warnings().is_empty(), "empty is not a parse error");
    }

    #[test]
    fn unparsable_value_uses_default_and_warns() {
        let src = source(&[("maxResults", "lots")]);
        let mut r = Resolver::new(&src);
        assert_eq!(r.resolve("maxResults", 5u32, parse_u32), 5);

        let warnings = r.take_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].name, "maxResults");
        assert_eq!(warnings[0].raw, "lots");
    }

    #[test]
    fn string_passes_through() {
        let src = source(&[("placeholderText", "Pick a city")]);
        let mut r = Resolver::new(&src);
        assert_eq!(
            r.resolve_string("placeholderText", "Start typing..."),
            "Pick a city"
        );
        assert_eq!(
            r.resolve_string("missing", "Start typing..."),
            "Start typing..."
        );
    }

    #[test]
    fn bool_accepted_spellings() {
        for raw in ["true", "TRUE", "1", "yes"] {
            assert_eq!(parse_bool(raw), Ok(true), "raw: {raw}");
        }
        for raw in ["false", "False", "0", "no"] {
            assert_eq!(parse_bool(raw), Ok(false), "raw: {raw}");
        }
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn numbers_trim_whitespace() {
        assert_eq!(parse_u32(" 42 "), Ok(42));
        assert_eq!(parse_f32(" 0.3 "), Ok(0.3));
    }

    #[test]
    fn non_finite_rejected() {
        assert!(parse_f32("NaN").is_err());
        assert!(parse_f32("inf").is_err());
    }

    #[test]
    fn negative_rejected_for_u32() {
        assert!(parse_u32("-1").is_err());
    }

    #[test]
    fn warning_display_names_the_setting() {
        let w = SettingWarning {
            name: "threshold".to_string(),
            raw: "high".to_string(),
            message: "expected a number".to_string(),
        };
        let text = w.to_string();
        assert!(text.contains("threshold"), "got: {text}");
        assert!(text.contains("default"), "got: {text}");
    }
}
