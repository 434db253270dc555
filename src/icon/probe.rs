//! Bounded structural scan for image-like members.
//!
//! The scan first tries a short list of member names that usually hold an
//! icon, then falls back to every member whose name or declared type
//! suggests an image. Nested objects are followed up to [`MAX_DEPTH`] levels,
//! lists are sampled up to [`MAX_LIST_ITEMS`] elements, and a visited set
//! keyed by [`Probe::object_id`] keeps cycles from looping.

use std::collections::HashSet;

use crate::model::{Image, MemberInfo, Probe, ProbeValue, Texture};

pub const MAX_DEPTH: usize = 2;
pub const MAX_LIST_ITEMS: usize = 8;

/// Member names checked first, in order.
const LIKELY_MEMBERS: &[&str] = &[
    "icon",
    "itemIcon",
    "uiIcon",
    "sprite",
    "thumbnail",
    "thumb",
    "atlas",
    "texture",
    "mainTexture",
    "image",
];

const IMAGE_HINTS: &[&str] = &[
    "icon", "sprite", "thumb", "atlas", "texture", "image", "picture", "preview", "tex2d",
];

const SCALAR_TYPES: &[&str] = &[
    "bool", "boolean", "byte", "sbyte", "char", "short", "int", "int16", "int32", "int64",
    "uint", "uint16", "uint32", "uint64", "long", "ulong", "float", "single", "double",
    "decimal", "string", "vector2", "vector3", "vector4", "color", "quaternion",
];

/// Image-like value found by a scan.
#[derive(Debug, Clone, PartialEq)]
pub enum Found {
    Image(Image),
    Texture(Texture),
}

/// One scan session. Shares its visited set across every object scanned
/// through it, so a component reachable from the record is visited once.
pub struct Scan<'t> {
    visited: HashSet<u64>,
    trace: &'t mut Vec<String>,
}

impl<'t> Scan<'t> {
    pub fn new(trace: &'t mut Vec<String>) -> Self {
        Self {
            visited: HashSet::new(),
            trace,
        }
    }

    /// Scan `obj` and return the first image-like value.
    pub fn run<P: Probe + ?Sized>(&mut self, obj: &P) -> Option<Found> {
        self.scan_at(obj, 0)
    }

    fn scan_at<P: Probe + ?Sized>(&mut self, obj: &P, depth: usize) -> Option<Found> {
        if depth > MAX_DEPTH || !self.visited.insert(obj.object_id()) {
            return None;
        }
        let members = obj.members();

        for likely in LIKELY_MEMBERS {
            let hit = members.iter().find(|m| m.name.eq_ignore_ascii_case(likely));
            if let Some(member) = hit {
                if let Some(found) = self.visit_member(obj, member, depth) {
                    return Some(found);
                }
            }
        }

        for member in &members {
            if is_likely_name(&member.name) || is_scalar_type(&member.declared_type) {
                continue;
            }
            if let Some(found) = self.visit_member(obj, member, depth) {
                return Some(found);
            }
        }
        None
    }

    fn visit_member<P: Probe + ?Sized>(
        &mut self,
        obj: &P,
        member: &MemberInfo,
        depth: usize,
    ) -> Option<Found> {
        let value = match obj.read(&member.name) {
            Ok(v) => v,
            Err(e) => {
                self.trace
                    .push(format!("{}.{}=error: {}", obj.type_name(), member.name, e));
                return None;
            }
        };
        let suggestive = suggests_image(&member.name) || suggests_image(&member.declared_type);
        match value {
            ProbeValue::Image(image) => {
                self.trace
                    .push(format!("{}.{}={}", obj.type_name(), member.name, image.name));
                Some(Found::Image(image))
            }
            ProbeValue::Texture(texture) => {
                self.trace
                    .push(format!("{}.{}={}", obj.type_name(), member.name, texture.name));
                Some(Found::Texture(texture))
            }
            ProbeValue::Object(nested) => self.scan_at(&*nested, depth + 1),
            ProbeValue::List(items) => {
                let element = element_type(&member.declared_type);
                if !suggestive && !suggests_image(element) {
                    return None;
                }
                self.visit_list(&member.name, items, depth)
            }
            ProbeValue::Scalar(_) | ProbeValue::None => None,
        }
    }

    fn visit_list(&mut self, name: &str, items: Vec<ProbeValue>, depth: usize) -> Option<Found> {
        for (i, item) in items.into_iter().take(MAX_LIST_ITEMS).enumerate() {
            match item {
                ProbeValue::Image(image) => {
                    self.trace.push(format!("{}[{}]={}", name, i, image.name));
                    return Some(Found::Image(image));
                }
                ProbeValue::Texture(texture) => {
                    self.trace.push(format!("{}[{}]={}", name, i, texture.name));
                    return Some(Found::Texture(texture));
                }
                ProbeValue::Object(nested) => {
                    if let Some(found) = self.scan_at(&*nested, depth + 1) {
                        return Some(found);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

fn is_likely_name(name: &str) -> bool {
    LIKELY_MEMBERS.iter().any(|l| l.eq_ignore_ascii_case(name))
}

pub fn suggests_image(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    IMAGE_HINTS.iter().any(|h| lower.contains(h))
}

pub fn is_scalar_type(declared_type: &str) -> bool {
    let lower = declared_type.trim().to_ascii_lowercase();
    let base = lower.rsplit('.').next().unwrap_or(&lower);
    SCALAR_TYPES.contains(&base) || base.starts_with("enum")
}

/// Element type of `List<T>`, `T[]` or `IEnumerable<T>`; the input itself otherwise.
pub fn element_type(declared_type: &str) -> &str {
    let t = declared_type.trim();
    if let Some(inner) = t.strip_suffix("[]") {
        return inner;
    }
    match (t.find('<'), t.rfind('>')) {
        (Some(open), Some(close)) if open < close => &t[open + 1..close],
        _ => t,
    }
}
