#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Result, anyhow};
use itembrowser::data::{DataSet, DataSetDoc, FieldDoc, ObjectDoc, RecordDoc};
use itembrowser::model::{MemberInfo, Renderer};
use itembrowser::{
    AssetSurface, Browser, DatasetFence, Host, Image, Probe, ProbeValue, Record, RecordRef,
    RecordSource, Texture,
};

// ── Dataset helpers ─────────────────────────────────────────────────────

pub fn record(name: &str) -> RecordDoc {
    RecordDoc {
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn with_component(mut doc: RecordDoc, type_name: &str) -> RecordDoc {
    doc.components.push(ObjectDoc {
        type_name: type_name.to_string(),
        fields: Default::default(),
    });
    doc
}

pub fn with_icon(mut doc: RecordDoc, id: u64, name: &str) -> RecordDoc {
    doc.icon = Some(image(id, name));
    doc
}

pub fn with_scalar_component(mut doc: RecordDoc, type_name: &str, field: &str, value: &str) -> RecordDoc {
    let mut object = ObjectDoc {
        type_name: type_name.to_string(),
        fields: Default::default(),
    };
    object
        .fields
        .insert(field.to_string(), FieldDoc::Scalar(serde_json::Value::String(value.to_string())));
    doc.components.push(object);
    doc
}

pub fn dataset(identity: u64, records: Vec<RecordDoc>) -> DataSet {
    DataSet::from_doc(DataSetDoc {
        identity,
        records,
        ..Default::default()
    })
}

pub fn host(set: &DataSet) -> Host<'_> {
    Host {
        source: set,
        text: set,
        assets: set,
    }
}

pub fn image(id: u64, name: &str) -> Image {
    Image {
        id,
        name: name.to_string(),
    }
}

pub fn texture(id: u64, name: &str, path: &str, size: u32) -> Texture {
    Texture {
        id,
        name: name.to_string(),
        source_path: path.to_string(),
        width: size,
        height: size,
    }
}

/// Tick until the browser has nothing left to do. Returns the tick count.
pub fn settle(browser: &mut Browser, host: &Host<'_>) -> usize {
    for tick in 1..=1000 {
        browser.tick(host);
        if browser.is_settled() {
            return tick;
        }
    }
    panic!("browser did not settle");
}

// ── Hand-written host objects ───────────────────────────────────────────

/// Component with a fixed type name and optional scalar members.
pub struct Component {
    pub id: u64,
    pub type_name: String,
    pub scalars: Vec<(String, String)>,
}

impl Component {
    pub fn new(id: u64, type_name: &str) -> Rc<dyn Probe> {
        Rc::new(Component {
            id,
            type_name: type_name.to_string(),
            scalars: Vec::new(),
        })
    }

    pub fn with_scalar(id: u64, type_name: &str, member: &str, value: &str) -> Rc<dyn Probe> {
        Rc::new(Component {
            id,
            type_name: type_name.to_string(),
            scalars: vec![(member.to_string(), value.to_string())],
        })
    }
}

impl Probe for Component {
    fn object_id(&self) -> u64 {
        self.id
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn members(&self) -> Vec<MemberInfo> {
        self.scalars
            .iter()
            .map(|(name, _)| MemberInfo::new(name.clone(), "String"))
            .collect()
    }

    fn read(&self, member: &str) -> Result<ProbeValue> {
        Ok(self
            .scalars
            .iter()
            .find(|(name, _)| name == member)
            .map(|(_, value)| ProbeValue::Scalar(value.clone()))
            .unwrap_or(ProbeValue::None))
    }
}

/// Record assembled field by field in tests.
#[derive(Default)]
pub struct TestRecord {
    pub id: u64,
    pub name: String,
    pub components: Vec<Rc<dyn Probe>>,
    pub members: Vec<(MemberInfo, ProbeValue)>,
    pub native: Option<Image>,
    pub native_fails: bool,
    pub renderers: Vec<Renderer>,
    pub ui_image: Option<Image>,
    /// Panic while listing components, to simulate a broken record.
    pub explode: bool,
    /// Panic while listing renderers, which only the heavy icon lookup does.
    pub renderers_explode: bool,
}

impl TestRecord {
    pub fn named(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            ..Default::default()
        }
    }
}

impl Probe for TestRecord {
    fn object_id(&self) -> u64 {
        self.id
    }

    fn type_name(&self) -> &str {
        "Item"
    }

    fn members(&self) -> Vec<MemberInfo> {
        self.members.iter().map(|(m, _)| m.clone()).collect()
    }

    fn read(&self, member: &str) -> Result<ProbeValue> {
        Ok(self
            .members
            .iter()
            .find(|(m, _)| m.name == member)
            .map(|(_, v)| v.clone())
            .unwrap_or(ProbeValue::None))
    }
}

impl Record for TestRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn components(&self) -> Vec<Rc<dyn Probe>> {
        if self.explode {
            panic!("component table corrupted for {}", self.name);
        }
        self.components.clone()
    }

    fn native_icon(&self) -> Result<Option<Image>> {
        if self.native_fails {
            return Err(anyhow!("icon field unreadable"));
        }
        Ok(self.native.clone())
    }

    fn renderers(&self) -> Vec<Renderer> {
        if self.renderers_explode {
            panic!("renderer table corrupted for {}", self.name);
        }
        self.renderers.clone()
    }

    fn ui_image_component(&self) -> Result<Option<Image>> {
        Ok(self.ui_image.clone())
    }
}

/// Source over a fixed list of hand-written records.
pub struct StaticSource {
    pub identity: Option<u64>,
    pub records: Vec<RecordRef>,
}

impl RecordSource for StaticSource {
    fn identity(&self) -> Option<DatasetFence> {
        self.identity.map(DatasetFence)
    }

    fn records(&self) -> Vec<RecordRef> {
        self.records.clone()
    }
}

/// Asset surface that counts enumerations and conversions.
#[derive(Default)]
pub struct CountingAssets {
    pub textures: Vec<Texture>,
    pub enumerations: Cell<usize>,
    pub conversions: Cell<usize>,
}

impl AssetSurface for CountingAssets {
    fn loaded_textures(&self) -> Result<Vec<Texture>> {
        self.enumerations.set(self.enumerations.get() + 1);
        Ok(self.textures.clone())
    }

    fn to_image(&self, texture: &Texture) -> Result<Image> {
        self.conversions.set(self.conversions.get() + 1);
        Ok(Image {
            id: texture.id + 1000,
            name: format!("{}_sprite", texture.name),
        })
    }
}

/// Text source with no translations at all.
pub struct NoText;

impl itembrowser::TextSource for NoText {
    fn lookup(&self, _key: &str) -> Option<String> {
        None
    }
}
