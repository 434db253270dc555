//! JSON-described record collections.
//!
//! A [`DataSet`] is a self-contained stand-in for the host: records with
//! typed members and components, the loaded textures, and a localization
//! table. It implements every collaborator trait the browser needs, which
//! makes it the backing store for the command-line tool and the tests.
//!
//! ```json
//! {
//!   "identity": 7,
//!   "language": 0,
//!   "records": [
//!     { "name": "Compass",
//!       "fields": { "icon": { "image": { "id": 1, "name": "Compass_Icon" } } },
//!       "components": [ { "type": "ItemUseFeedback",
//!                         "fields": { "useAnimation": { "scalar": "Hold" } } } ] }
//!   ],
//!   "textures": [ { "id": 10, "name": "Compass", "width": 256, "height": 256 } ],
//!   "text": { "NAME_COMPASS": ["Compass", "Boussole"] }
//! }
//! ```

use std::cell::Cell;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::model::{
    AssetSurface, DatasetFence, Image, MemberInfo, Probe, ProbeValue, Record, RecordRef,
    RecordSource, Renderer, Texture,
};
use crate::text::TextSource;

// ────────────────────────────────────────────────────────────────────────────
// Documents
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSetDoc {
    #[serde(default)]
    pub identity: u64,
    #[serde(default)]
    pub language: i32,
    #[serde(default)]
    pub records: Vec<RecordDoc>,
    #[serde(default)]
    pub textures: Vec<Texture>,
    /// Localization key → one string per language.
    #[serde(default)]
    pub text: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordDoc {
    pub name: String,
    #[serde(default)]
    pub icon: Option<Image>,
    #[serde(default)]
    pub icon_alt: Option<Image>,
    /// Members of the record itself, visible to the structural probe.
    #[serde(default)]
    pub fields: IndexMap<String, FieldDoc>,
    #[serde(default)]
    pub components: Vec<ObjectDoc>,
    #[serde(default)]
    pub renderers: Vec<Renderer>,
    #[serde(default)]
    pub child_image: Option<Image>,
    #[serde(default)]
    pub ui_image: Option<Image>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectDoc {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDoc {
    Image(Image),
    Texture(Texture),
    Object(ObjectDoc),
    List {
        element: String,
        items: Vec<FieldDoc>,
    },
    Scalar(serde_json::Value),
    /// A member whose read fails.
    Error(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Runtime objects
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum Field {
    Image(Image),
    Texture(Texture),
    Object(Rc<DataObject>),
    List { element: String, items: Vec<Field> },
    Scalar(serde_json::Value),
    Error(String),
}

impl Field {
    fn declared_type(&self) -> String {
        match self {
            Field::Image(_) => "Sprite".to_string(),
            Field::Texture(_) => "Texture2D".to_string(),
            Field::Object(o) => o.type_name.clone(),
            Field::List { element, .. } => format!("List<{}>", element),
            Field::Scalar(v) => scalar_type(v).to_string(),
            Field::Error(_) => "Object".to_string(),
        }
    }

    fn value(&self) -> Result<ProbeValue> {
        Ok(match self {
            Field::Image(i) => ProbeValue::Image(i.clone()),
            Field::Texture(t) => ProbeValue::Texture(t.clone()),
            Field::Object(o) => ProbeValue::Object(o.clone() as Rc<dyn Probe>),
            Field::List { items, .. } => {
                ProbeValue::List(items.iter().map(|f| f.value()).collect::<Result<_>>()?)
            }
            Field::Scalar(serde_json::Value::String(s)) => ProbeValue::Scalar(s.clone()),
            Field::Scalar(v) => ProbeValue::Scalar(v.to_string()),
            Field::Error(msg) => return Err(anyhow!("{}", msg)),
        })
    }
}

fn scalar_type(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Bool(_) => "Boolean",
        serde_json::Value::Number(n) if n.is_f64() => "Single",
        serde_json::Value::Number(_) => "Int32",
        _ => "String",
    }
}

/// A component or nested object.
#[derive(Debug)]
pub struct DataObject {
    id: u64,
    type_name: String,
    fields: IndexMap<String, Field>,
}

impl Probe for DataObject {
    fn object_id(&self) -> u64 {
        self.id
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn members(&self) -> Vec<MemberInfo> {
        members_of(&self.fields)
    }

    fn read(&self, member: &str) -> Result<ProbeValue> {
        read_field(&self.fields, member)
    }
}

fn members_of(fields: &IndexMap<String, Field>) -> Vec<MemberInfo> {
    fields
        .iter()
        .map(|(name, f)| MemberInfo::new(name.clone(), f.declared_type()))
        .collect()
}

fn read_field(fields: &IndexMap<String, Field>, member: &str) -> Result<ProbeValue> {
    match fields.get(member) {
        Some(f) => f.value(),
        None => Ok(ProbeValue::None),
    }
}

#[derive(Debug)]
pub struct DataRecord {
    id: u64,
    doc: RecordDoc,
    fields: IndexMap<String, Field>,
    components: Vec<Rc<DataObject>>,
}

impl Probe for DataRecord {
    fn object_id(&self) -> u64 {
        self.id
    }

    fn type_name(&self) -> &str {
        "Item"
    }

    fn members(&self) -> Vec<MemberInfo> {
        members_of(&self.fields)
    }

    fn read(&self, member: &str) -> Result<ProbeValue> {
        read_field(&self.fields, member)
    }
}

impl Record for DataRecord {
    fn name(&self) -> &str {
        &self.doc.name
    }

    fn components(&self) -> Vec<Rc<dyn Probe>> {
        self.components
            .iter()
            .map(|c| c.clone() as Rc<dyn Probe>)
            .collect()
    }

    fn native_icon(&self) -> Result<Option<Image>> {
        Ok(self.doc.icon.clone())
    }

    fn native_icon_alt(&self) -> Result<Option<Image>> {
        Ok(self.doc.icon_alt.clone())
    }

    fn renderers(&self) -> Vec<Renderer> {
        self.doc.renderers.clone()
    }

    fn child_renderer_image(&self) -> Result<Option<Image>> {
        Ok(self.doc.child_image.clone())
    }

    fn ui_image_component(&self) -> Result<Option<Image>> {
        Ok(self.doc.ui_image.clone())
    }
}

/// Hands out object ids while a dataset is being assembled.
struct IdAllocator(u64);

impl IdAllocator {
    fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    fn fields(&mut self, docs: &IndexMap<String, FieldDoc>) -> IndexMap<String, Field> {
        docs.iter()
            .map(|(name, doc)| (name.clone(), self.field(doc)))
            .collect()
    }

    fn field(&mut self, doc: &FieldDoc) -> Field {
        match doc {
            FieldDoc::Image(i) => Field::Image(i.clone()),
            FieldDoc::Texture(t) => Field::Texture(t.clone()),
            FieldDoc::Object(o) => Field::Object(Rc::new(self.object(o))),
            FieldDoc::List { element, items } => Field::List {
                element: element.clone(),
                items: items.iter().map(|i| self.field(i)).collect(),
            },
            FieldDoc::Scalar(v) => Field::Scalar(v.clone()),
            FieldDoc::Error(msg) => Field::Error(msg.clone()),
        }
    }

    fn object(&mut self, doc: &ObjectDoc) -> DataObject {
        DataObject {
            id: self.next(),
            type_name: doc.type_name.clone(),
            fields: self.fields(&doc.fields),
        }
    }

    fn record(&mut self, doc: RecordDoc) -> DataRecord {
        let id = self.next();
        let fields = self.fields(&doc.fields);
        let components = doc
            .components
            .iter()
            .map(|c| Rc::new(self.object(c)))
            .collect();
        DataRecord {
            id,
            doc,
            fields,
            components,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DataSet
// ────────────────────────────────────────────────────────────────────────────

/// In-memory host stand-in built from one or more [`DataSetDoc`]s.
pub struct DataSet {
    identity: Option<DatasetFence>,
    language: i32,
    records: Vec<RecordRef>,
    textures: Vec<Texture>,
    text: HashMap<String, Vec<String>>,
    conversions: Cell<usize>,
    ids: IdAllocator,
}

impl std::fmt::Debug for DataSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSet")
            .field("identity", &self.identity)
            .field("language", &self.language)
            .field("records", &self.records.len())
            .field("textures", &self.textures)
            .finish_non_exhaustive()
    }
}

impl DataSet {
    pub fn from_doc(doc: DataSetDoc) -> Self {
        let mut set = DataSet {
            identity: Some(DatasetFence(doc.identity)),
            language: doc.language,
            records: Vec::new(),
            textures: Vec::new(),
            text: HashMap::new(),
            conversions: Cell::new(0),
            ids: IdAllocator(0),
        };
        set.merge(doc);
        set
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: DataSetDoc = serde_json::from_str(json).context("Failed to parse dataset")?;
        Ok(Self::from_doc(doc))
    }

    /// Load a dataset file, or every `*.json` file under a directory
    /// (sorted by path) merged into one dataset.
    pub fn load_path(path: &Utf8Path) -> Result<Self> {
        if !path.is_dir() {
            let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
            return Self::from_json_str(&text).with_context(|| format!("Invalid dataset {}", path));
        }

        let mut files: Vec<Utf8PathBuf> = Vec::new();
        for entry in WalkDir::new(path.as_std_path()) {
            let entry = entry.with_context(|| format!("Walk {}", path))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let p = Utf8PathBuf::from_path_buf(entry.into_path())
                .map_err(|p| anyhow!("Non-UTF8 path {}", p.display()))?;
            if p.extension() == Some("json") {
                files.push(p);
            }
        }
        files.sort();
        if files.is_empty() {
            anyhow::bail!("No dataset files under {}", path);
        }

        let mut hasher = DefaultHasher::new();
        let mut merged: Option<DataSet> = None;
        for file in &files {
            let text = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))?;
            let doc: DataSetDoc =
                serde_json::from_str(&text).with_context(|| format!("Invalid dataset {}", file))?;
            doc.identity.hash(&mut hasher);
            file.as_str().hash(&mut hasher);
            match merged.as_mut() {
                Some(set) => set.merge(doc),
                None => merged = Some(DataSet::from_doc(doc)),
            }
        }
        let mut set = merged.ok_or_else(|| anyhow!("No dataset files under {}", path))?;
        set.identity = Some(DatasetFence(hasher.finish()));
        Ok(set)
    }

    /// Append another document's records, textures and text.
    pub fn merge(&mut self, doc: DataSetDoc) {
        for record in doc.records {
            let record = self.ids.record(record);
            self.records.push(Rc::new(record));
        }
        self.textures.extend(doc.textures);
        self.text.extend(doc.text);
    }

    /// Replace the records and move to a new identity, as the host does
    /// when it reloads its item database.
    pub fn replace(&mut self, identity: u64, records: Vec<RecordDoc>) {
        self.identity = Some(DatasetFence(identity));
        self.records.clear();
        for record in records {
            let record = self.ids.record(record);
            self.records.push(Rc::new(record));
        }
    }

    pub fn set_identity(&mut self, identity: Option<u64>) {
        self.identity = identity.map(DatasetFence);
    }

    pub fn set_language(&mut self, language: i32) {
        self.language = language;
    }

    /// Number of texture → image conversions performed so far.
    pub fn conversions(&self) -> usize {
        self.conversions.get()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for DataSet {
    fn identity(&self) -> Option<DatasetFence> {
        self.identity
    }

    fn records(&self) -> Vec<RecordRef> {
        self.records.clone()
    }
}

impl AssetSurface for DataSet {
    fn loaded_textures(&self) -> Result<Vec<Texture>> {
        Ok(self.textures.clone())
    }

    fn to_image(&self, texture: &Texture) -> Result<Image> {
        self.conversions.set(self.conversions.get() + 1);
        Ok(Image {
            id: texture.id,
            name: texture.name.clone(),
        })
    }
}

impl TextSource for DataSet {
    fn lookup(&self, key: &str) -> Option<String> {
        let values = self.text.get(key)?;
        values
            .get(self.language.max(0) as usize)
            .filter(|v| !v.is_empty())
            .or_else(|| values.first())
            .cloned()
    }

    fn probe_language(&self, name: &str) -> Option<i32> {
        (name == "CurrentLanguage").then_some(self.language)
    }
}
