//! Category assignment for a single record.
//!
//! Strategies run in a fixed order: capability markers on the record's
//! components, the curated alias table (exact, then fuzzy), keyword groups
//! over the names, and finally a catch-all. A matching alias always beats a
//! capability default so that curated data can correct what the components
//! suggest.

use std::rc::Rc;

use tracing::debug;

use crate::alias::{self, normalize_token, strip_variant_suffix};
use crate::model::{Category, Probe, ProbeValue, Record};

/// Which strategy decided a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassSource {
    Alias,
    FuzzyAlias,
    Capability,
    Keyword,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub source: ClassSource,
}

const CONSUME_ACTIONS: &[&str] = &[
    "Action_Consume",
    "Action_RestoreHunger",
    "Action_GiveExtraStamina",
    "Action_InflictPoison",
];
const USE_FEEDBACK: &str = "ItemUseFeedback";
const USE_ANIMATION: &str = "useAnimation";
const CONSUME_ANIMATIONS: &[&str] = &["eat", "drink", "heal"];
const COOKING: &str = "ItemCooking";

/// Component type-name markers, checked in order after the consumable and
/// cooking checks.
const CAPABILITY_MARKERS: &[(&[&str], Category)] = &[
    (&["hostile", "creature", "enemy", "monster"], Category::MiscEquipment),
    (&["magic", "relic", "artifact", "cursed", "mystic"], Category::MysticalItem),
    (&["deployable", "placeable", "constructable", "spawner"], Category::Deployable),
    (&["wearable", "equip", "clothing", "costume"], Category::MiscEquipment),
];

/// Keyword groups tested against `display + " " + stable`, in priority order.
const KEYWORD_GROUPS: &[(&[&str], Category)] = &[
    (&["berry", "berries", "nana", "fruit"], Category::NaturalFood),
    (&["mushroom", "shroom", "fungus", "fungi"], Category::Mushroom),
    (
        &["granola", "trail mix", "jerky", "cookie", "candy", "lollipop", "ration", "snack", "canned", "drink"],
        Category::PackagedFood,
    ),
    (&["food", "meat", "egg", "fish", "honey", "coconut", "bread", "soup"], Category::NaturalFood),
];

/// Stateless apart from the verbose flag; the alias table is static.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    pub verbose: bool,
}

impl Classifier {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn classify(&self, record: &dyn Record, display_name: &str) -> Category {
        self.classify_detailed(record, display_name).category
    }

    pub fn classify_detailed(&self, record: &dyn Record, display_name: &str) -> Classification {
        let capability = capability_category(record);
        if let Some(c) = override_category(record.name(), display_name) {
            return c;
        }
        if let Some(category) = capability {
            return Classification {
                category,
                source: ClassSource::Capability,
            };
        }
        if let Some(category) = keyword_category(display_name, record.name()) {
            return Classification {
                category,
                source: ClassSource::Keyword,
            };
        }
        if self.verbose {
            debug!(record = record.name(), display = display_name, "no category rule matched, using default");
        }
        Classification {
            category: Category::MiscEquipment,
            source: ClassSource::Default,
        }
    }
}

/// Normalized alias candidates: full stable name, variant-stripped stable
/// name, display name. Empty and duplicate keys are dropped.
pub fn candidate_keys(stable_name: &str, display_name: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(3);
    for raw in [stable_name, strip_variant_suffix(stable_name), display_name] {
        let key = normalize_token(raw);
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

fn override_category(stable_name: &str, display_name: &str) -> Option<Classification> {
    let keys = candidate_keys(stable_name, display_name);
    if let Some(category) = keys.iter().find_map(|k| alias::lookup_exact(k)) {
        return Some(Classification {
            category,
            source: ClassSource::Alias,
        });
    }
    alias::best_fuzzy(&keys).map(|m| Classification {
        category: m.category,
        source: ClassSource::FuzzyAlias,
    })
}

/// Category implied by the record's components, if any.
pub fn capability_category(record: &dyn Record) -> Option<Category> {
    let components = record.components();
    if components.iter().any(|c| is_consumable(c)) {
        return Some(Category::Consumable);
    }
    if components.iter().any(|c| c.type_name() == COOKING) {
        return Some(Category::NaturalFood);
    }
    for (markers, category) in CAPABILITY_MARKERS {
        let hit = components.iter().any(|c| {
            let name = c.type_name().to_ascii_lowercase();
            markers.iter().any(|m| name.contains(m))
        });
        if hit {
            return Some(*category);
        }
    }
    None
}

fn is_consumable(component: &Rc<dyn Probe>) -> bool {
    let type_name = component.type_name();
    if CONSUME_ACTIONS.contains(&type_name) {
        return true;
    }
    if type_name != USE_FEEDBACK {
        return false;
    }
    match component.read(USE_ANIMATION) {
        Ok(ProbeValue::Scalar(anim)) => {
            let anim = anim.trim().to_ascii_lowercase();
            CONSUME_ANIMATIONS.contains(&anim.as_str())
        }
        _ => false,
    }
}

fn keyword_category(display_name: &str, stable_name: &str) -> Option<Category> {
    let text = format!("{} {}", display_name, stable_name).to_lowercase();
    KEYWORD_GROUPS
        .iter()
        .find(|(words, _)| words.iter().any(|w| text.contains(w)))
        .map(|(_, category)| *category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_keys_are_unique_and_ordered() {
        let keys = candidate_keys("Berrynana Yellow", "Berrynana");
        assert_eq!(keys, vec!["berrynanayellow".to_string(), "berrynana".to_string()]);
    }

    #[test]
    fn keyword_groups_follow_priority() {
        assert_eq!(keyword_category("Glowing Berry", "x"), Some(Category::NaturalFood));
        assert_eq!(keyword_category("Weird Shroom", "x"), Some(Category::Mushroom));
        assert_eq!(keyword_category("Cave Snack", "x"), Some(Category::PackagedFood));
        assert_eq!(keyword_category("Roast Meat", "x"), Some(Category::NaturalFood));
        assert_eq!(keyword_category("Rock", "Stone"), None);
    }
}
