//! Localized text resolution.
//!
//! Two kinds of strings are resolved here: item display names, looked up
//! through an embedded name→key map and the host's localization table, and
//! the browser's own UI strings, which ship as an embedded per-language
//! table under the `MOD_ITEMBROWSER_` namespace.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use anyhow::{Context, Result};
use rust_embed::RustEmbed;
use tracing::warn;

use crate::model::LanguageFence;

pub const MOD_NAME: &str = "ItemBrowser";
const LOC_PREFIX: &str = "LOC:";
const CLONE_SUFFIX: &str = "(Clone)";
const NAME_KEY_FILE: &str = "item_name_keys.json";
const UI_TEXT_FILE: &str = "localized_text.json";

/// Names the host may answer to with the active language index.
const LANGUAGE_PROBES: &[&str] = &[
    "CurrentLanguage",
    "currentLanguage",
    "CURRENT_LANGUAGE",
    "Language",
    "language",
];

/// UI keys sampled into the language fence.
const FENCE_UI_KEYS: &[&str] = &["TITLE", "CATEGORY_NATURAL_FOOD", "CATEGORY_MISC_EQUIPMENT"];
/// Number of item-name keys sampled into the language fence.
const FENCE_NAME_SAMPLES: usize = 4;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct EmbeddedText;

/// Host localization collaborator.
pub trait TextSource {
    /// Localized text for `key`, or `None` when the host has no entry.
    fn lookup(&self, key: &str) -> Option<String>;

    /// Best-effort read of a named language setting.
    fn probe_language(&self, _name: &str) -> Option<i32> {
        None
    }
}

/// Resolves display names and UI strings against a [`TextSource`].
#[derive(Debug, Clone, Default)]
pub struct TextResolver {
    /// Lowercased item name → localization key.
    name_keys: HashMap<String, String>,
    /// First few distinct name keys in sorted order, hashed into the language fence.
    fence_sample: Vec<String>,
    /// Uppercased namespaced UI key → one string per language.
    ui_table: HashMap<String, Vec<String>>,
}

impl TextResolver {
    /// Build from the tables embedded in the binary. Missing or malformed
    /// tables are logged and left empty.
    pub fn embedded() -> Self {
        let mut resolver = Self::default();
        match read_embedded(NAME_KEY_FILE) {
            Ok(json) => {
                if let Err(e) = resolver.load_name_keys(&json) {
                    warn!(file = NAME_KEY_FILE, error = %e, "failed to load embedded name map");
                }
            }
            Err(e) => warn!(file = NAME_KEY_FILE, error = %e, "embedded name map not found"),
        }
        match read_embedded(UI_TEXT_FILE) {
            Ok(json) => {
                if let Err(e) = resolver.load_ui_table(&json) {
                    warn!(file = UI_TEXT_FILE, error = %e, "failed to load embedded UI text");
                }
            }
            Err(e) => warn!(file = UI_TEXT_FILE, error = %e, "embedded UI text not found"),
        }
        resolver
    }

    /// Load a `{ "Item Name": "NAME_KEY" }` map. Blank keys or values are skipped.
    pub fn load_name_keys(&mut self, json: &str) -> Result<usize> {
        let data: HashMap<String, String> =
            serde_json::from_str(json).context("Failed to parse item name map")?;
        self.name_keys.clear();
        for (name, key) in data {
            if name.trim().is_empty() || key.trim().is_empty() {
                continue;
            }
            self.name_keys.insert(name.trim().to_lowercase(), key);
        }
        let mut sample: Vec<&String> = self.name_keys.values().collect();
        sample.sort();
        sample.dedup();
        self.fence_sample = sample.into_iter().take(FENCE_NAME_SAMPLES).cloned().collect();
        Ok(self.name_keys.len())
    }

    /// Load a `{ "KEY": ["english", "french", ...] }` table. Empty cells
    /// fall back to the first language.
    pub fn load_ui_table(&mut self, json: &str) -> Result<usize> {
        let data: HashMap<String, Vec<String>> =
            serde_json::from_str(json).context("Failed to parse UI text table")?;
        self.ui_table.clear();
        for (key, values) in data {
            let Some(first) = values.first().cloned() else {
                continue;
            };
            let values = values
                .into_iter()
                .map(|v| if v.is_empty() { first.clone() } else { v })
                .collect();
            self.ui_table.insert(namespaced_key(&key), values);
        }
        Ok(self.ui_table.len())
    }

    pub fn name_key_count(&self) -> usize {
        self.name_keys.len()
    }

    /// Resolve a localization key. Returns an empty string when the host
    /// has no translation: no entry, the key echoed back, or a `LOC:` marker.
    pub fn resolve(&self, source: &dyn TextSource, key: &str) -> String {
        let key = strip_loc_prefix(key.trim());
        if key.is_empty() {
            return String::new();
        }
        let Some(text) = source.lookup(key) else {
            return String::new();
        };
        let text = text.trim();
        if text.is_empty()
            || starts_with_ignore_case(text, LOC_PREFIX)
            || text.eq_ignore_ascii_case(key)
        {
            return String::new();
        }
        text.to_string()
    }

    /// Localized display name for a record, or empty when none is known.
    pub fn localized_item_name(&self, source: &dyn TextSource, record_name: &str) -> String {
        if !record_name.is_ascii() {
            return record_name.trim().to_string();
        }
        let normalized = normalize_item_name(record_name);
        if normalized.is_empty() {
            return String::new();
        }
        match self.name_keys.get(&normalized.to_lowercase()) {
            Some(key) => self.resolve(source, key),
            None => String::new(),
        }
    }

    /// Browser UI string for `key` in the active language. Falls back to the
    /// host table, then to the key itself.
    pub fn ui_text(&self, source: &dyn TextSource, key: &str) -> String {
        let full = namespaced_key(key);
        if let Some(values) = self.ui_table.get(&full) {
            let index = self.current_language_index(source).max(0) as usize;
            if let Some(text) = values.get(index).or_else(|| values.first()) {
                return text.clone();
            }
        }
        match source.lookup(&full) {
            Some(text) if !text.trim().is_empty() => text,
            _ => key.to_string(),
        }
    }

    /// [`TextResolver::ui_text`] with `{0}`, `{1}`, ... placeholders filled in.
    pub fn ui_text_with(&self, source: &dyn TextSource, key: &str, args: &[&str]) -> String {
        let mut text = self.ui_text(source, key);
        for (i, arg) in args.iter().enumerate() {
            text = text.replace(&format!("{{{}}}", i), arg);
        }
        text
    }

    /// Active language index, probing several names and defaulting to 0.
    pub fn current_language_index(&self, source: &dyn TextSource) -> i32 {
        LANGUAGE_PROBES
            .iter()
            .find_map(|name| source.probe_language(name))
            .unwrap_or(0)
    }

    /// Fingerprint of the active localization state: the language index
    /// plus a fixed sample of resolved strings.
    pub fn language_fence(&self, source: &dyn TextSource) -> LanguageFence {
        let mut hasher = DefaultHasher::new();
        self.current_language_index(source).hash(&mut hasher);
        for key in FENCE_UI_KEYS {
            source.lookup(&namespaced_key(key)).hash(&mut hasher);
        }
        for key in &self.fence_sample {
            self.resolve(source, key).hash(&mut hasher);
        }
        LanguageFence(hasher.finish())
    }
}

fn read_embedded(file: &str) -> Result<String> {
    let embedded = EmbeddedText::get(file).with_context(|| format!("{} is not embedded", file))?;
    String::from_utf8(embedded.data.into_owned()).with_context(|| format!("{} is not UTF-8", file))
}

/// `"Mod_ItemBrowser_<key>"`, uppercased.
pub fn namespaced_key(key: &str) -> String {
    format!("Mod_{}_{}", MOD_NAME, key).to_uppercase()
}

/// Strip a `LOC:` prefix and `(Clone)` marker from a host item name.
pub fn normalize_item_name(name: &str) -> String {
    let stripped = strip_loc_prefix(name.trim());
    stripped.replace(CLONE_SUFFIX, "").trim().to_string()
}

fn strip_loc_prefix(key: &str) -> &str {
    if starts_with_ignore_case(key, LOC_PREFIX) {
        key[LOC_PREFIX.len()..].trim()
    } else {
        key
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}
