//! Curated alias table mapping normalized item names to categories.
//!
//! The table is static data, built once on first access. Lookups go through
//! [`normalize_token`] so that `"Granola Bar"`, `"granola_bar"` and
//! `"GranolaBar"` all hit the same alias.
//!
//! # Usage
//!
//! ```rust,ignore
//! use itembrowser::alias::{lookup_exact, best_fuzzy};
//!
//! let cat = lookup_exact("trailmix");
//! let fuzzy = best_fuzzy(&["trailmixbag".to_string()]);
//! ```

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::model::Category;

/// Score of an exact candidate/alias match. No other pair scores this high.
pub const EXACT_SCORE: i32 = 1000;
/// Minimum fuzzy score accepted as an override.
pub const FUZZY_THRESHOLD: i32 = 260;

const CONTAINMENT_BASE: i32 = 280;
const CONTAINMENT_PER_CHAR: i32 = 4;
const COMMON_RUN_PER_CHAR: i32 = 24;
const LENGTH_DIFF_PENALTY: i32 = 3;
const PREFIX_BONUS: i32 = 30;
const PREFIX_LEN: usize = 6;

/// Trailing words that only distinguish variants of the same item.
const VARIANT_WORDS: &[&str] = &[
    "yellow", "red", "blue", "green", "purple", "orange", "pink", "black", "white", "brown",
    "variant", "clone", "small", "big", "large", "old",
];

/// Lowercase alphanumeric form used for every alias comparison.
pub fn normalize_token(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Strip one trailing variant suffix (`"Berrynana Yellow"` → `"Berrynana"`,
/// `"Rope Spool 2"` → `"Rope Spool"`, `"Lantern(Clone)"` → `"Lantern"`).
///
/// Returns the input unchanged when there is nothing to strip or when
/// stripping would leave nothing.
pub fn strip_variant_suffix(name: &str) -> &str {
    let trimmed = name.trim();
    let without_clone = trimmed
        .strip_suffix("(Clone)")
        .map(str::trim_end)
        .unwrap_or(trimmed);
    if without_clone.len() != trimmed.len() && !without_clone.is_empty() {
        return without_clone;
    }
    let cut = trimmed
        .rfind(|c: char| c == ' ' || c == '_' || c == '-')
        .filter(|&i| i > 0);
    if let Some(i) = cut {
        let last = &trimmed[i + 1..];
        let lower = last.to_ascii_lowercase();
        let is_variant = VARIANT_WORDS.contains(&lower.as_str())
            || (!last.is_empty() && last.chars().all(|c| c.is_ascii_digit()));
        if is_variant {
            return trimmed[..i].trim_end();
        }
    }
    trimmed
}

/// Exact lookup of an already normalized key.
pub fn lookup_exact(key: &str) -> Option<Category> {
    ALIASES.get(key).copied()
}

/// Number of aliases in the table.
pub fn alias_count() -> usize {
    ALIASES.len()
}

/// Best (candidate, alias) pairing found by [`best_fuzzy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    pub candidate: String,
    pub alias: String,
    pub category: Category,
    pub score: i32,
}

/// Score every candidate against every alias and return the best pair if it
/// clears [`FUZZY_THRESHOLD`]. Ties keep the first pair encountered.
pub fn best_fuzzy(candidates: &[String]) -> Option<FuzzyMatch> {
    let mut best: Option<FuzzyMatch> = None;
    for candidate in candidates.iter().filter(|c| !c.is_empty()) {
        for (alias, category) in ALIASES.iter() {
            let score = fuzzy_score(candidate, alias);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(FuzzyMatch {
                    candidate: candidate.clone(),
                    alias: alias.clone(),
                    category: *category,
                    score,
                });
            }
        }
    }
    best.filter(|b| b.score >= FUZZY_THRESHOLD)
}

/// Similarity between two normalized tokens.
///
/// Exact equality scores [`EXACT_SCORE`]; every other pair is capped below it.
pub fn fuzzy_score(a: &str, b: &str) -> i32 {
    if a == b {
        return EXACT_SCORE;
    }
    let ac: Vec<char> = a.chars().collect();
    let bc: Vec<char> = b.chars().collect();
    if ac.is_empty() || bc.is_empty() {
        return 0;
    }
    let min_len = ac.len().min(bc.len()) as i32;
    let mut score = if a.contains(b) || b.contains(a) {
        CONTAINMENT_BASE + CONTAINMENT_PER_CHAR * min_len
    } else {
        let diff = (ac.len() as i32 - bc.len() as i32).abs();
        longest_common_run(&ac, &bc) as i32 * COMMON_RUN_PER_CHAR - LENGTH_DIFF_PENALTY * diff
    };
    if shares_prefix(&ac, &bc) {
        score += PREFIX_BONUS;
    }
    score.min(EXACT_SCORE - 1)
}

fn shares_prefix(a: &[char], b: &[char]) -> bool {
    let pa = &a[..a.len().min(PREFIX_LEN)];
    let pb = &b[..b.len().min(PREFIX_LEN)];
    a.starts_with(pb) || b.starts_with(pa)
}

/// Length of the longest common substring.
fn longest_common_run(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    let mut best = 0;
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            cur[j] = if a[i - 1] == b[j - 1] { prev[j - 1] + 1 } else { 0 };
            best = best.max(cur[j]);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}

static ALIASES: Lazy<IndexMap<String, Category>> = Lazy::new(build_aliases);

fn build_aliases() -> IndexMap<String, Category> {
    let mut m = IndexMap::with_capacity(128);
    let mut add = |names: &[&str], category: Category| {
        for name in names {
            m.insert(normalize_token(name), category);
        }
    };

    // ── Natural food ────────────────────────────────────────────────────
    add(
        &[
            "Berrynana", "Clusterberry", "Kingberry", "Winterberry", "Napberry",
            "Apple Berry", "Red Crispberry", "Prickleberry", "Scorchberry", "Pepper Berry",
            "Coconut", "Coconut Half", "Honeycomb", "Egg", "Big Egg", "Cooked Bird",
        ],
        Category::NaturalFood,
    );

    // ── Mystical food ───────────────────────────────────────────────────
    add(
        &[
            "Shroomberry", "Pandora's Lunchbox", "Golden Honeycomb", "Faerie Fruit",
            "Ancient Fruit",
        ],
        Category::MysticalFood,
    );

    // ── Packaged food ───────────────────────────────────────────────────
    add(
        &[
            "Granola Bar", "Trail Mix", "Airline Food", "Lollipop", "Marshmallow",
            "Energy Drink", "Sports Drink", "Scout Cookies", "Canned Beans", "Beef Jerky",
        ],
        Category::PackagedFood,
    );

    // ── Mushrooms ───────────────────────────────────────────────────────
    add(
        &[
            "Mushroom Normie", "Mushroom Lace", "Mushroom Cluster", "Mushroom Chubby",
            "Button Shroom", "Bugle Shroom", "Cloud Fungus", "Shelf Fungus",
        ],
        Category::Mushroom,
    );

    // ── Consumables ─────────────────────────────────────────────────────
    add(
        &[
            "Bandages", "First Aid Kit", "Cure-All", "Antidote", "Heat Pack", "Sunscreen",
            "Aloe Vera", "Medicinal Root", "Remedy",
        ],
        Category::Consumable,
    );

    // ── Deployables ─────────────────────────────────────────────────────
    add(
        &[
            "Rope Spool", "Anti-Rope Spool", "Rope Cannon", "Chain Launcher", "Piton",
            "Magic Bean", "Portable Stove", "Scout Cannon", "Checkpoint Flag", "Bounce Shroom",
        ],
        Category::Deployable,
    );

    // ── Misc equipment ──────────────────────────────────────────────────
    add(
        &[
            "Compass", "Binoculars", "Parasol", "Balloon", "Balloon Bunch", "Lantern", "Flare",
            "Bugle", "Backpack", "Frisbee", "Blowgun", "Dynamite", "Bing Bong", "Conch",
        ],
        Category::MiscEquipment,
    );

    // ── Mystical items ──────────────────────────────────────────────────
    add(
        &[
            "Cursed Skull", "Ancient Idol", "Book of Bones", "Scoutmaster's Bugle",
            "Faerie Lantern", "Pirate's Compass", "Warp Compass", "Scout Effigy",
            "Bugle of Friendship", "Cursed Totem",
        ],
        Category::MysticalItem,
    );

    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_punctuation_and_case() {
        assert_eq!(normalize_token("Pandora's Lunch-box"), "pandoraslunchbox");
        assert_eq!(normalize_token("  Rope_Spool 2 "), "ropespool2");
    }

    #[test]
    fn strip_variant_suffix_handles_colours_digits_and_clones() {
        assert_eq!(strip_variant_suffix("Berrynana Yellow"), "Berrynana");
        assert_eq!(strip_variant_suffix("Rope Spool 2"), "Rope Spool");
        assert_eq!(strip_variant_suffix("Lantern(Clone)"), "Lantern");
        assert_eq!(strip_variant_suffix("Lantern"), "Lantern");
        assert_eq!(strip_variant_suffix("Yellow"), "Yellow");
    }

    #[test]
    fn exact_score_is_maximal() {
        for (alias, _) in ALIASES.iter() {
            assert_eq!(fuzzy_score(alias, alias), EXACT_SCORE);
        }
        let long_a = "a".repeat(300);
        let long_b = "a".repeat(299);
        assert!(fuzzy_score(&long_a, &long_b) < EXACT_SCORE);
    }

    #[test]
    fn disjoint_strings_score_non_positive() {
        assert!(fuzzy_score("xyz", "abcdef") <= 0);
        assert!(fuzzy_score("qqqq", "granolabar") <= 0);
    }

    #[test]
    fn containment_scores_above_threshold() {
        // "trailmix" is contained in the candidate
        let score = fuzzy_score("trailmixbag", "trailmix");
        assert_eq!(score, 280 + 4 * 8 + 30);
        let m = best_fuzzy(&["trailmixbag".to_string()]).unwrap();
        assert_eq!(m.category, Category::PackagedFood);
    }

    #[test]
    fn weak_fuzzy_matches_are_rejected() {
        assert!(best_fuzzy(&["zzzzqqq".to_string()]).is_none());
        assert!(best_fuzzy(&[String::new()]).is_none());
    }

    #[test]
    fn table_has_no_empty_keys() {
        assert!(alias_count() > 50);
        assert!(ALIASES.keys().all(|k| !k.is_empty()));
        assert_eq!(lookup_exact("cursedskull"), Some(Category::MysticalItem));
    }
}
