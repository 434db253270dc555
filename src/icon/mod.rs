//! Icon resolution for catalog entries.
//!
//! [`IconResolver::resolve`] walks a cascade of strategies and stops at the
//! first one that yields an image:
//!
//! 1. the record's own UI image field, then its alternate
//! 2. a bounded structural scan of the record ([`probe`])
//! 3. the same scan over every attached component
//! 4. a child visual renderer's primary image
//! 5. (heavy) the process-wide texture-name index
//! 6. (heavy) textures of the record's renderer materials
//! 7. a generic UI-image component
//!
//! Results are memoized per stable record name. A record that resolved to
//! nothing in light mode is retried once in heavy mode. Strategy failures
//! only add a line to the probe trace.

pub mod probe;
pub mod score;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::alias::{normalize_token, strip_variant_suffix};
use crate::model::{AssetSurface, Image, Record, Texture};

use probe::{Found, Scan};
use score::{is_body_material, is_player_view, looks_generic, score_texture};

const INDEX_HIT_BONUS: i32 = 220;
const GENERIC_NAME_PENALTY: i32 = 120;
const INDEX_ACCEPT: i32 = 120;
const MATERIAL_ACCEPT: i32 = 80;

/// Memoized outcome for one record name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IconSlot {
    pub image: Option<Image>,
    /// Whether the heavy strategies have already run for this name.
    pub heavy_tried: bool,
}

#[derive(Debug, Default)]
pub struct IconResolver {
    slots: HashMap<String, IconSlot>,
    /// Normalized texture name → textures sharing it. Built on first heavy lookup.
    name_index: HashMap<String, Vec<Texture>>,
    index_built: bool,
    /// Texture id → converted image.
    converted: HashMap<u64, Image>,
    last_trace: Vec<String>,
    pub verbose: bool,
}

impl IconResolver {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Default::default()
        }
    }

    /// Drop every cache, including the texture-name index.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.name_index.clear();
        self.index_built = false;
        self.converted.clear();
        self.last_trace.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.name_index.is_empty() && self.converted.is_empty()
    }

    pub fn slot(&self, stable_name: &str) -> Option<&IconSlot> {
        self.slots.get(stable_name)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn index_len(&self) -> usize {
        self.name_index.len()
    }

    pub fn index_built(&self) -> bool {
        self.index_built
    }

    pub fn converted_count(&self) -> usize {
        self.converted.len()
    }

    /// Record `stable_name` as resolved to nothing after every strategy ran,
    /// so later lookups skip it.
    pub fn mark_failed(&mut self, stable_name: &str) {
        self.slots.insert(
            stable_name.to_string(),
            IconSlot {
                image: None,
                heavy_tried: true,
            },
        );
    }

    /// Probe trace of the most recent uncached resolution.
    pub fn last_trace(&self) -> &[String] {
        &self.last_trace
    }

    pub fn resolve(
        &mut self,
        record: &dyn Record,
        assets: &dyn AssetSurface,
        allow_heavy: bool,
    ) -> Option<Image> {
        let key = record.name().to_string();
        if let Some(slot) = self.slots.get(&key) {
            if slot.image.is_some() || slot.heavy_tried || !allow_heavy {
                return slot.image.clone();
            }
        }

        let mut trace = Vec::new();
        let image = self.run_cascade(record, assets, allow_heavy, &mut trace);
        if image.is_none() && self.verbose {
            debug!(record = %key, heavy = allow_heavy, trace = ?trace, "icon cascade exhausted");
        }
        self.last_trace = trace;
        self.slots.insert(
            key,
            IconSlot {
                image: image.clone(),
                heavy_tried: allow_heavy,
            },
        );
        image
    }

    fn run_cascade(
        &mut self,
        record: &dyn Record,
        assets: &dyn AssetSurface,
        allow_heavy: bool,
        trace: &mut Vec<String>,
    ) -> Option<Image> {
        for (label, result) in [
            ("native", record.native_icon()),
            ("native_alt", record.native_icon_alt()),
        ] {
            match result {
                Ok(Some(image)) => {
                    trace.push(format!("{}={}", label, image.name));
                    return Some(image);
                }
                Ok(None) => trace.push(format!("{}=none", label)),
                Err(e) => trace.push(format!("{}=error: {}", label, e)),
            }
        }

        let found = {
            let mut scan = Scan::new(trace);
            scan.run(record).or_else(|| {
                record
                    .components()
                    .iter()
                    .find_map(|component| scan.run(&**component))
            })
        };
        if let Some(found) = found {
            if let Some(image) = self.materialize(found, assets, trace) {
                return Some(image);
            }
        }

        match record.child_renderer_image() {
            Ok(Some(image)) => {
                trace.push(format!("child_renderer={}", image.name));
                return Some(image);
            }
            Ok(None) => {}
            Err(e) => trace.push(format!("child_renderer=error: {}", e)),
        }

        if allow_heavy {
            if let Some(image) = self.from_name_index(record, assets, trace) {
                return Some(image);
            }
            if let Some(image) = self.from_materials(record, assets, trace) {
                return Some(image);
            }
        }

        match record.ui_image_component() {
            Ok(Some(image)) => {
                trace.push(format!("ui_image={}", image.name));
                Some(image)
            }
            Ok(None) => None,
            Err(e) => {
                trace.push(format!("ui_image=error: {}", e));
                None
            }
        }
    }

    fn materialize(
        &mut self,
        found: Found,
        assets: &dyn AssetSurface,
        trace: &mut Vec<String>,
    ) -> Option<Image> {
        match found {
            Found::Image(image) => Some(image),
            Found::Texture(texture) => self.convert(&texture, assets, trace),
        }
    }

    /// Convert a raw texture once; later hits reuse the cached image.
    fn convert(
        &mut self,
        texture: &Texture,
        assets: &dyn AssetSurface,
        trace: &mut Vec<String>,
    ) -> Option<Image> {
        if let Some(image) = self.converted.get(&texture.id) {
            return Some(image.clone());
        }
        match assets.to_image(texture) {
            Ok(image) => {
                self.converted.insert(texture.id, image.clone());
                Some(image)
            }
            Err(e) => {
                trace.push(format!("convert {}=error: {}", texture.name, e));
                None
            }
        }
    }

    fn ensure_index(&mut self, assets: &dyn AssetSurface, trace: &mut Vec<String>) {
        if self.index_built {
            return;
        }
        self.index_built = true;
        match assets.loaded_textures() {
            Ok(textures) => {
                for texture in textures {
                    let token = normalize_token(&texture.name);
                    if !token.is_empty() {
                        self.name_index.entry(token).or_default().push(texture);
                    }
                }
                if self.verbose {
                    debug!(tokens = self.name_index.len(), "texture name index built");
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to enumerate loaded textures");
                trace.push(format!("index=error: {}", e));
            }
        }
    }

    fn from_name_index(
        &mut self,
        record: &dyn Record,
        assets: &dyn AssetSurface,
        trace: &mut Vec<String>,
    ) -> Option<Image> {
        self.ensure_index(assets, trace);
        let record_token = normalize_token(record.name());
        let mut tokens = vec![record_token.clone()];
        let stripped = normalize_token(strip_variant_suffix(record.name()));
        if !tokens.contains(&stripped) {
            tokens.push(stripped);
        }

        let mut best: Option<(i32, Texture)> = None;
        for token in tokens.iter().filter(|t| !t.is_empty()) {
            for texture in self.name_index.get(token).into_iter().flatten() {
                let mut score = score_texture(texture, &record_token) + INDEX_HIT_BONUS;
                if looks_generic(&texture.name) {
                    score -= GENERIC_NAME_PENALTY;
                }
                if best.as_ref().map_or(true, |(s, _)| score > *s) {
                    best = Some((score, texture.clone()));
                }
            }
        }

        let (score, texture) = best?;
        trace.push(format!("index {}={}", texture.name, score));
        if score < INDEX_ACCEPT {
            return None;
        }
        self.convert(&texture, assets, trace)
    }

    fn from_materials(
        &mut self,
        record: &dyn Record,
        assets: &dyn AssetSurface,
        trace: &mut Vec<String>,
    ) -> Option<Image> {
        let record_token = normalize_token(record.name());
        let mut best: Option<(i32, Texture)> = None;
        for renderer in record.renderers() {
            if is_player_view(&renderer.name) {
                trace.push(format!("renderer {}=skipped", renderer.name));
                continue;
            }
            for material in &renderer.materials {
                if is_body_material(&material.name) {
                    trace.push(format!("material {}=skipped", material.name));
                    continue;
                }
                let slots = material.texture_slots.iter().map(|(_, t)| t);
                for texture in material.main_texture.iter().chain(slots) {
                    let score = score_texture(texture, &record_token);
                    if best.as_ref().map_or(true, |(s, _)| score > *s) {
                        best = Some((score, texture.clone()));
                    }
                }
            }
        }

        let (score, texture) = best?;
        trace.push(format!("material {}={}", texture.name, score));
        if score < MATERIAL_ACCEPT {
            return None;
        }
        self.convert(&texture, assets, trace)
    }
}
