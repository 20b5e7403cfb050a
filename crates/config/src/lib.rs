// Configuration loading

pub mod resolve;
pub mod settings;

pub use resolve::{parse_bool, parse_f32, parse_u32, Resolver, SettingWarning};
pub use settings::{parse_column_ref, WidgetSettings};

use std::collections::HashMap;

/// Source of raw setting values, as provided by the embedding host.
///
/// Raw values are always text; typed interpretation happens in [`Resolver`].
/// An absent name and an empty string are both treated as "not provided".
pub trait SettingsSource {
    fn raw(&self, name: &str) -> Option<String>;
}

impl SettingsSource for HashMap<String, String> {
    fn raw(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// A source with no values; every lookup falls through to the default.
pub struct EmptySource;

impl SettingsSource for EmptySource {
    fn raw(&self, _name: &str) -> Option<String> {
        None
    }
}
