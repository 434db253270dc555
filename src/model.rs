use serde::{Deserialize, Serialize};
use std::rc::Rc;

// ────────────────────────────────────────────────────────────────────────────
// Categories
// ────────────────────────────────────────────────────────────────────────────

/// Coarse two-way partition shown as the top-level tabs of the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MajorGroup {
    Food,
    Equipment,
}

impl MajorGroup {
    pub const ALL: [MajorGroup; 2] = [MajorGroup::Food, MajorGroup::Equipment];

    /// Categories belonging to this group, in list priority order.
    pub fn categories(self) -> impl Iterator<Item = Category> {
        Category::ALL
            .into_iter()
            .filter(move |c| c.major_group() == self)
    }

    /// UI-string key for the group tab.
    pub fn label_key(self) -> &'static str {
        match self {
            MajorGroup::Food => "GROUP_FOOD",
            MajorGroup::Equipment => "GROUP_EQUIPMENT",
        }
    }
}

/// Category assigned to every catalog entry.
///
/// Declaration order is the list priority order used when no sub-category
/// filter is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    NaturalFood,
    MysticalFood,
    PackagedFood,
    Mushroom,
    Consumable,
    Deployable,
    MiscEquipment,
    MysticalItem,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::NaturalFood,
        Category::MysticalFood,
        Category::PackagedFood,
        Category::Mushroom,
        Category::Consumable,
        Category::Deployable,
        Category::MiscEquipment,
        Category::MysticalItem,
    ];

    pub fn order(self) -> usize {
        self as usize
    }

    pub fn major_group(self) -> MajorGroup {
        match self {
            Category::NaturalFood
            | Category::MysticalFood
            | Category::PackagedFood
            | Category::Mushroom
            | Category::Consumable => MajorGroup::Food,
            Category::Deployable | Category::MiscEquipment | Category::MysticalItem => {
                MajorGroup::Equipment
            }
        }
    }

    /// UI-string key for the category header / tab.
    pub fn label_key(self) -> &'static str {
        match self {
            Category::NaturalFood => "CATEGORY_NATURAL_FOOD",
            Category::MysticalFood => "CATEGORY_MYSTICAL_FOOD",
            Category::PackagedFood => "CATEGORY_PACKAGED_FOOD",
            Category::Mushroom => "CATEGORY_MUSHROOM",
            Category::Consumable => "CATEGORY_CONSUMABLE",
            Category::Deployable => "CATEGORY_DEPLOYABLE",
            Category::MiscEquipment => "CATEGORY_MISC_EQUIPMENT",
            Category::MysticalItem => "CATEGORY_MYSTICAL_ITEM",
        }
    }

    /// Parse the snake_case form used on the command line and in data files.
    pub fn parse(text: &str) -> Option<Category> {
        let t = text.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Category::ALL.into_iter().find(|c| {
            serde_json::to_value(c)
                .ok()
                .and_then(|v| v.as_str().map(|s| s == t))
                .unwrap_or(false)
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fences
// ────────────────────────────────────────────────────────────────────────────

/// Identity of the source collection currently loaded or loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetFence(pub u64);

/// Identity of the active localization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageFence(pub u64);

// ────────────────────────────────────────────────────────────────────────────
// Asset handles
// ────────────────────────────────────────────────────────────────────────────

/// A displayable image (sprite) owned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Image {
    pub id: u64,
    pub name: String,
}

/// A raw pixel buffer owned by the host. Needs conversion through
/// [`AssetSurface::to_image`] before it can be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Texture {
    pub id: u64,
    pub name: String,
    /// Asset path or material path the texture was loaded from.
    #[serde(default)]
    pub source_path: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// A material attached to a visual renderer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(default)]
    pub main_texture: Option<Texture>,
    /// Named texture slots (`_BaseMap`, `_MainTex`, ...).
    #[serde(default)]
    pub texture_slots: Vec<(String, Texture)>,
}

/// A visual renderer attached to a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Renderer {
    pub name: String,
    #[serde(default)]
    pub materials: Vec<Material>,
}

// ────────────────────────────────────────────────────────────────────────────
// Probe surface
// ────────────────────────────────────────────────────────────────────────────

/// Name and declared type of a member exposed by a [`Probe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub name: String,
    /// Declared type as reported by the host (`Sprite`, `Texture2D`,
    /// `List<Sprite>`, `Int32`, ...).
    pub declared_type: String,
}

impl MemberInfo {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }
}

/// A value read from a member during a structural probe.
#[derive(Clone)]
pub enum ProbeValue {
    None,
    Image(Image),
    Texture(Texture),
    Object(Rc<dyn Probe>),
    List(Vec<ProbeValue>),
    /// Primitive, enum or string. Never recursed into.
    Scalar(String),
}

impl std::fmt::Debug for ProbeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeValue::None => write!(f, "None"),
            ProbeValue::Image(i) => write!(f, "Image({})", i.name),
            ProbeValue::Texture(t) => write!(f, "Texture({})", t.name),
            ProbeValue::Object(o) => write!(f, "Object({})", o.type_name()),
            ProbeValue::List(v) => write!(f, "List[{}]", v.len()),
            ProbeValue::Scalar(s) => write!(f, "Scalar({s})"),
        }
    }
}

/// Declarative member query over a host object.
///
/// This is the only view the icon resolver and the classifier have of host
/// objects: a list of named, typed members and a fallible read.
pub trait Probe {
    /// Identity used for cycle detection. Two handles to the same host
    /// object must report the same id.
    fn object_id(&self) -> u64;
    /// Host type name (`ItemCooking`, `Action_Consume`, ...).
    fn type_name(&self) -> &str;
    fn members(&self) -> Vec<MemberInfo>;
    /// Read a member by exact name. Unknown members yield `ProbeValue::None`.
    fn read(&self, member: &str) -> anyhow::Result<ProbeValue>;
}

/// An externally owned record. The catalog never mutates it.
pub trait Record: Probe {
    fn name(&self) -> &str;

    /// Attached capabilities / components.
    fn components(&self) -> Vec<Rc<dyn Probe>> {
        Vec::new()
    }

    /// The record's own UI image field.
    fn native_icon(&self) -> anyhow::Result<Option<Image>> {
        Ok(None)
    }

    /// Alternate of [`Record::native_icon`].
    fn native_icon_alt(&self) -> anyhow::Result<Option<Image>> {
        Ok(None)
    }

    fn renderers(&self) -> Vec<Renderer> {
        Vec::new()
    }

    /// Primary image of a child visual renderer, if any.
    fn child_renderer_image(&self) -> anyhow::Result<Option<Image>> {
        Ok(None)
    }

    /// Generic UI-image component on the record.
    fn ui_image_component(&self) -> anyhow::Result<Option<Image>> {
        Ok(None)
    }
}

pub type RecordRef = Rc<dyn Record>;

// ────────────────────────────────────────────────────────────────────────────
// Collaborators
// ────────────────────────────────────────────────────────────────────────────

/// Source collection provider.
pub trait RecordSource {
    /// Identity of the collection, or `None` while it is not available.
    fn identity(&self) -> Option<DatasetFence>;
    /// Ordered, possibly empty sequence of records.
    fn records(&self) -> Vec<RecordRef>;
}

/// Render/asset layer surface used by the icon resolver.
pub trait AssetSurface {
    /// Every raw image buffer currently loaded, for name indexing.
    fn loaded_textures(&self) -> anyhow::Result<Vec<Texture>>;
    /// Convert a raw buffer into a displayable image.
    fn to_image(&self, texture: &Texture) -> anyhow::Result<Image>;
}

// ────────────────────────────────────────────────────────────────────────────
// CatalogEntry
// ────────────────────────────────────────────────────────────────────────────

/// Derived projection of one record.
#[derive(Clone)]
pub struct CatalogEntry {
    pub record: RecordRef,
    pub stable_name: String,
    pub display_name: String,
    pub category: Category,
    pub icon: Option<Image>,
    /// Lowercase `display_name + " " + stable_name`.
    pub search_key: String,
}

impl CatalogEntry {
    pub fn new(record: RecordRef, display_name: String, category: Category) -> Self {
        let stable_name = record.name().to_string();
        let search_key = search_key_for(&display_name, &stable_name);
        Self {
            record,
            stable_name,
            display_name,
            category,
            icon: None,
            search_key,
        }
    }

    /// Replace the display name, keeping the search key in sync.
    pub fn set_display_name(&mut self, display_name: String) {
        self.search_key = search_key_for(&display_name, &self.stable_name);
        self.display_name = display_name;
    }

    pub fn matches_query(&self, query: &str) -> bool {
        query.is_empty() || self.search_key.contains(query)
    }
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("stable_name", &self.stable_name)
            .field("display_name", &self.display_name)
            .field("category", &self.category)
            .field("icon", &self.icon)
            .finish()
    }
}

fn search_key_for(display_name: &str, stable_name: &str) -> String {
    format!("{} {}", display_name, stable_name).to_lowercase()
}
