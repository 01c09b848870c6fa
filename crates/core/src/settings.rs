//! Plugin settings: which trigger characters start a conversion.
//!
//! Persisted layout under namespace `Datetime`, key `settings`:
//!
//! ```json
//! { "formatSelected": ["o"] }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{SettingsStore, StoreError};

pub const NAMESPACE: &str = "Datetime";
pub const SETTINGS_KEY: &str = "settings";

/// Trigger used when nothing usable is stored.
pub const DEFAULT_TRIGGER: &str = "o";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Single-character trigger keys, compared against the lowercased key.
    #[serde(rename = "formatSelected")]
    pub format_selected: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format_selected: vec![DEFAULT_TRIGGER.to_string()],
        }
    }
}

impl Settings {
    /// Normalise a stored blob.
    ///
    /// A missing blob or field falls back to the default. A legacy blob that
    /// stored `formatSelected` as a plain string also resets to the default.
    /// Non-string array entries are dropped.
    pub fn from_value(value: Option<Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return Self::default();
        };
        match map.get("formatSelected") {
            Some(Value::Array(items)) => Self {
                format_selected: items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            },
            _ => Self::default(),
        }
    }

    /// Load from a store. Read failures are logged and yield the default.
    pub fn load<S: SettingsStore + ?Sized>(store: &S) -> Self {
        match store.load(NAMESPACE, SETTINGS_KEY) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load settings, using defaults");
                Self::default()
            }
        }
    }

    pub fn save<S: SettingsStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        let value = serde_json::to_value(self)?;
        store.save(NAMESPACE, SETTINGS_KEY, value)
    }

    /// Whether a pressed key (as reported by the host) is a trigger.
    pub fn is_trigger(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.format_selected.iter().any(|t| *t == key)
    }

    /// Value shown in the "Bind Characters" field.
    pub fn bind_characters(&self) -> String {
        self.format_selected.concat()
    }

    /// Apply an edit of the "Bind Characters" field: one trigger per
    /// character, lowercased, whitespace and repeats dropped. An edit with no
    /// usable characters restores the default.
    pub fn set_bind_characters(&mut self, text: &str) {
        let mut triggers: Vec<String> = Vec::new();
        for c in text.chars().filter(|c| !c.is_whitespace()) {
            let trigger: String = c.to_lowercase().collect();
            if !triggers.contains(&trigger) {
                triggers.push(trigger);
            }
        }
        if triggers.is_empty() {
            *self = Self::default();
        } else {
            self.format_selected = triggers;
        }
    }
}
