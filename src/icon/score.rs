//! Heuristic scoring for texture candidates found by the heavy strategies.

use crate::alias::normalize_token;
use crate::model::Texture;

const PATH_ICON_BONUS: i32 = 120;
const NAME_ICON_BONUS: i32 = 100;
const NAME_CONTAINS_RECORD_BONUS: i32 = 90;
/// Stepped bonuses for `<= 1024`, `<= 512` and `<= 256` pixels.
const SIZE_TIERS: &[(u32, i32)] = &[(1024, 20), (512, 20), (256, 10)];
const PLAYER_PATH_PENALTY: i32 = 300;
const PLACEHOLDER_PENALTY: i32 = 80;
const DEFAULT_NAME_PENALTY: i32 = 60;
const FOLIAGE_PENALTY: i32 = 80;

const PLACEHOLDER_PREFIXES: &[&str] = &[
    "placeholder",
    "missing",
    "unitywhite",
    "unity_",
    "sprites-default",
    "ui_default",
    "blank",
];
const DEFAULT_MARKERS: &[&str] = &["default", "fallback", "noise"];
const FOLIAGE_MARKERS: &[&str] = &["leaf", "leaves", "foliage", "grass", "bark"];
const PLAYER_PATH_MARKERS: &[&str] = &["hand", "player", "firstperson", "first_person"];
const GENERIC_MARKERS: &[&str] = &[
    "noise", "gradient", "checker", "default", "white", "black", "blank", "mask", "ramp",
];
const PLAYER_VIEW_MARKERS: &[&str] = &["hand", "player", "firstperson", "first_person", "fpv", "arms"];
const BODY_MATERIAL_MARKERS: &[&str] = &["skin", "hair", "player", "body"];

/// Score a texture as an icon for the record whose normalized name is
/// `record_token`.
pub fn score_texture(texture: &Texture, record_token: &str) -> i32 {
    let path = texture.source_path.to_ascii_lowercase();
    let name = texture.name.to_ascii_lowercase();
    let mut score = 0;

    if path.contains("icon") || path.contains("thumb") {
        score += PATH_ICON_BONUS;
    }
    if name.contains("icon") || name.contains("thumb") {
        score += NAME_ICON_BONUS;
    }
    if !record_token.is_empty() && normalize_token(&texture.name).contains(record_token) {
        score += NAME_CONTAINS_RECORD_BONUS;
    }
    let size = texture.width.max(texture.height);
    if size > 0 {
        for (limit, bonus) in SIZE_TIERS {
            if size <= *limit {
                score += bonus;
            }
        }
    }
    if PLAYER_PATH_MARKERS.iter().any(|m| path.contains(m)) {
        score -= PLAYER_PATH_PENALTY;
    }
    if PLACEHOLDER_PREFIXES.iter().any(|p| name.starts_with(p)) {
        score -= PLACEHOLDER_PENALTY;
    }
    if DEFAULT_MARKERS.iter().any(|m| name.contains(m)) {
        score -= DEFAULT_NAME_PENALTY;
    }
    if FOLIAGE_MARKERS.iter().any(|m| name.contains(m)) {
        score -= FOLIAGE_PENALTY;
    }
    score
}

/// Names of shared utility textures that are never a real item icon.
pub fn looks_generic(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    GENERIC_MARKERS.iter().any(|m| lower.contains(m))
}

/// Renderers that draw the first-person / held view of an item.
pub fn is_player_view(renderer_name: &str) -> bool {
    let lower = renderer_name.to_ascii_lowercase();
    PLAYER_VIEW_MARKERS.iter().any(|m| lower.contains(m))
}

/// Materials belonging to the character rather than the item.
pub fn is_body_material(material_name: &str) -> bool {
    let lower = material_name.to_ascii_lowercase();
    BODY_MATERIAL_MARKERS.iter().any(|m| lower.contains(m))
}
