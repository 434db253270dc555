//! Which records are listed, and under what name.
//!
//! Some host records are props, temporary objects or leftovers that should
//! never appear in the browser; a few others need a hand-picked display name
//! because the localized one is missing or ambiguous.

/// Records hidden regardless of category logic.
const BLOCKED_NAMES: &[&str] = &[
    "Berrynana Peel Yellow",
    "Berrynana Peel Blue",
    "Berrynana Peel Pink",
    "Berrynana Peel Brown",
    "Coconut Shell",
    "Passport",
    "Guidebook",
    "GuidebookPage",
    "BeeSwarm",
    "Torn Page",
];

const RESERVED_PREFIX: &str = "_";

/// Name families meaning prop / temporary / unused / hidden.
const SUPPRESSED_SUFFIXES: &[&str] = &["prop", "temp", "unused", "hidden"];

/// Stable name → display name for records whose localized name is wrong.
const DISPLAY_OVERRIDES: &[(&str, &str)] = &[
    ("Bugle_Scoutmaster", "Scoutmaster's Bugle"),
    ("Lantern_Faerie", "Faerie Lantern"),
    ("Bugle_Magic", "Bugle of Friendship"),
    ("Mushroom Normie", "Normie Mushroom"),
    ("Mushroom Lace", "Lace Mushroom"),
    ("Mushroom Cluster", "Cluster Mushroom"),
    ("Mushroom Chubby", "Chubby Mushroom"),
];

/// Whether a record should be left out of the catalog.
pub fn is_suppressed(stable_name: &str) -> bool {
    let name = stable_name.trim();
    if name.is_empty() || name.starts_with(RESERVED_PREFIX) {
        return true;
    }
    if BLOCKED_NAMES.iter().any(|b| b.eq_ignore_ascii_case(name)) {
        return true;
    }
    let lower = name.to_ascii_lowercase();
    SUPPRESSED_SUFFIXES.iter().any(|suffix| {
        ['_', ' ', '-'].iter().any(|sep| lower.ends_with(&format!("{}{}", sep, suffix)))
            || ends_with_camel_suffix(name, suffix)
    })
}

/// `LanternProp`, `RopeTemp`: the suffix starts with an uppercase letter
/// directly after a lowercase one.
fn ends_with_camel_suffix(name: &str, suffix: &str) -> bool {
    if name.len() <= suffix.len() || !name.is_char_boundary(name.len() - suffix.len()) {
        return false;
    }
    let (head, tail) = name.split_at(name.len() - suffix.len());
    tail.eq_ignore_ascii_case(suffix)
        && tail.starts_with(|c: char| c.is_ascii_uppercase())
        && head.ends_with(|c: char| c.is_ascii_lowercase())
}

/// Apply the display-name override for `stable_name`, if any.
pub fn display_override(stable_name: &str, derived: String) -> String {
    DISPLAY_OVERRIDES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(stable_name.trim()))
        .map(|(_, display)| display.to_string())
        .unwrap_or(derived)
}
