mod common;

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Result, anyhow};
use common::{CountingAssets, TestRecord, image, texture};
use itembrowser::icon::IconResolver;
use itembrowser::icon::probe::{Found, Scan};
use itembrowser::model::{Material, MemberInfo, Renderer};
use itembrowser::{Probe, ProbeValue};

/// Object whose `next` member points back at itself (same identity).
struct Loop {
    id: u64,
    reads: Rc<Cell<usize>>,
}

impl Probe for Loop {
    fn object_id(&self) -> u64 {
        self.id
    }

    fn type_name(&self) -> &str {
        "Node"
    }

    fn members(&self) -> Vec<MemberInfo> {
        vec![MemberInfo::new("next", "Node"), MemberInfo::new("broken", "Node")]
    }

    fn read(&self, member: &str) -> Result<ProbeValue> {
        self.reads.set(self.reads.get() + 1);
        match member {
            "next" => Ok(ProbeValue::Object(Rc::new(Loop {
                id: self.id,
                reads: self.reads.clone(),
            }))),
            _ => Err(anyhow!("member not accessible")),
        }
    }
}

/// Object with a single nested object member holding an image.
struct Holder {
    id: u64,
    inner: Option<Rc<dyn Probe>>,
    icon: Option<String>,
}

impl Probe for Holder {
    fn object_id(&self) -> u64 {
        self.id
    }

    fn type_name(&self) -> &str {
        "Holder"
    }

    fn members(&self) -> Vec<MemberInfo> {
        let mut m = vec![MemberInfo::new("count", "Int32")];
        if self.inner.is_some() {
            m.push(MemberInfo::new("data", "ItemData"));
        }
        if self.icon.is_some() {
            m.push(MemberInfo::new("uiIcon", "Sprite"));
        }
        m
    }

    fn read(&self, member: &str) -> Result<ProbeValue> {
        Ok(match member {
            "count" => ProbeValue::Scalar("3".to_string()),
            "data" => self.inner.clone().map(ProbeValue::Object).unwrap_or(ProbeValue::None),
            "uiIcon" => self
                .icon
                .as_ref()
                .map(|n| ProbeValue::Image(image(99, n)))
                .unwrap_or(ProbeValue::None),
            _ => ProbeValue::None,
        })
    }
}

fn nested(depth: usize, id: u64) -> Rc<dyn Probe> {
    if depth == 0 {
        return Rc::new(Holder {
            id,
            inner: None,
            icon: Some("Deep_Icon".to_string()),
        });
    }
    Rc::new(Holder {
        id,
        inner: Some(nested(depth - 1, id + 1)),
        icon: None,
    })
}

// ── Structural scan ─────────────────────────────────────────────────────

#[test]
fn scan_terminates_on_self_reference() {
    let reads = Rc::new(Cell::new(0));
    let root = Loop {
        id: 7,
        reads: reads.clone(),
    };
    let mut trace = Vec::new();
    let found = Scan::new(&mut trace).run(&root);
    assert!(found.is_none());
    // `next` once (the nested copy is already visited) plus the failing member.
    assert_eq!(reads.get(), 2);
    assert!(trace.iter().any(|t| t.contains("broken=error")));
}

#[test]
fn scan_depth_is_bounded() {
    let mut trace = Vec::new();
    let found = Scan::new(&mut trace).run(&*nested(2, 1));
    assert_eq!(found, Some(Found::Image(image(99, "Deep_Icon"))));

    let mut trace = Vec::new();
    assert!(Scan::new(&mut trace).run(&*nested(3, 1)).is_none());
}

#[test]
fn scan_samples_at_most_eight_list_items() {
    let mut items: Vec<ProbeValue> = (0..8).map(|i| ProbeValue::Scalar(i.to_string())).collect();
    items.push(ProbeValue::Image(image(5, "Late")));
    let mut record = TestRecord::named(1, "Pouch");
    record
        .members
        .push((MemberInfo::new("sprites", "List<Sprite>"), ProbeValue::List(items.clone())));
    let mut trace = Vec::new();
    assert!(Scan::new(&mut trace).run(&record).is_none());

    items.swap(0, 8);
    let mut record = TestRecord::named(1, "Pouch");
    record
        .members
        .push((MemberInfo::new("sprites", "List<Sprite>"), ProbeValue::List(items)));
    let mut trace = Vec::new();
    assert_eq!(Scan::new(&mut trace).run(&record), Some(Found::Image(image(5, "Late"))));
}

// ── Cascade ─────────────────────────────────────────────────────────────

#[test]
fn native_icon_wins_and_is_memoized() {
    let assets = CountingAssets::default();
    let mut resolver = IconResolver::new(false);
    let mut record = TestRecord::named(1, "Compass");
    record.native = Some(image(1, "Compass_UI"));
    record.ui_image = Some(image(2, "Generic"));

    assert_eq!(resolver.resolve(&record, &assets, false), Some(image(1, "Compass_UI")));
    record.native = None;
    assert_eq!(resolver.resolve(&record, &assets, true), Some(image(1, "Compass_UI")));
    assert_eq!(resolver.slot_count(), 1);
}

#[test]
fn failing_strategy_is_traced_not_fatal() {
    let assets = CountingAssets::default();
    let mut resolver = IconResolver::new(false);
    let mut record = TestRecord::named(1, "Compass");
    record.native_fails = true;
    record.ui_image = Some(image(2, "Generic"));

    assert_eq!(resolver.resolve(&record, &assets, false), Some(image(2, "Generic")));
    assert!(resolver.last_trace().iter().any(|t| t.starts_with("native=error")));
}

#[test]
fn component_scan_converts_textures() {
    let assets = CountingAssets::default();
    let mut resolver = IconResolver::new(false);
    let mut record = TestRecord::named(1, "Lantern");
    let component = Rc::new(common::TestRecord {
        id: 2,
        name: "LanternUI".to_string(),
        members: vec![(
            MemberInfo::new("thumbnail", "Texture2D"),
            ProbeValue::Texture(texture(40, "Lantern_Thumb", "", 128)),
        )],
        ..Default::default()
    });
    record.components.push(component);

    let icon = resolver.resolve(&record, &assets, false);
    assert_eq!(icon, Some(image(1040, "Lantern_Thumb_sprite")));
    assert_eq!(assets.conversions.get(), 1);
}

#[test]
fn heavy_strategies_are_retried_lazily() {
    let assets = CountingAssets {
        textures: vec![texture(10, "Compass", "Items/Icons/compass.png", 256)],
        ..Default::default()
    };
    let mut resolver = IconResolver::new(false);
    let record = TestRecord::named(1, "Compass");

    assert_eq!(resolver.resolve(&record, &assets, false), None);
    assert!(!resolver.index_built());
    assert_eq!(resolver.slot("Compass").map(|s| s.heavy_tried), Some(false));

    let icon = resolver.resolve(&record, &assets, true);
    assert_eq!(icon, Some(image(1010, "Compass_sprite")));
    assert!(resolver.index_built());
    assert_eq!(resolver.index_len(), 1);
}

#[test]
fn heavy_miss_is_cached() {
    let assets = CountingAssets::default();
    let mut resolver = IconResolver::new(true);
    let record = TestRecord::named(1, "Zorblax");

    assert_eq!(resolver.resolve(&record, &assets, true), None);
    assert_eq!(resolver.resolve(&record, &assets, true), None);
    assert_eq!(assets.enumerations.get(), 1);
    assert_eq!(resolver.slot("Zorblax").map(|s| s.heavy_tried), Some(true));
}

#[test]
fn conversions_are_cached_by_texture() {
    let assets = CountingAssets {
        textures: vec![texture(10, "Compass", "Items/Icons/compass.png", 256)],
        ..Default::default()
    };
    let mut resolver = IconResolver::new(false);

    let plain = TestRecord::named(1, "Compass");
    let variant = TestRecord::named(2, "Compass Red");
    let a = resolver.resolve(&plain, &assets, true);
    let b = resolver.resolve(&variant, &assets, true);
    assert!(a.is_some());
    assert_eq!(a, b);
    assert_eq!(assets.conversions.get(), 1);
    assert_eq!(resolver.converted_count(), 1);
}

#[test]
fn index_hits_are_scored_against_threshold() {
    let assets = CountingAssets {
        textures: vec![texture(10, "Default Noise", "Shared/noise.png", 4096)],
        ..Default::default()
    };
    let mut resolver = IconResolver::new(false);
    // 220 index bonus + 90 name match - 60 default - 120 generic = 130
    let record = TestRecord::named(1, "Default Noise");
    assert!(resolver.resolve(&record, &assets, true).is_some());

    // Same texture under a player path drops to -170.
    let assets = CountingAssets {
        textures: vec![texture(11, "Default Noise", "Player/Hand/noise.png", 4096)],
        ..Default::default()
    };
    let mut resolver = IconResolver::new(false);
    assert!(resolver.resolve(&record, &assets, true).is_none());
}

#[test]
fn material_lookup_skips_player_views_and_body_materials() {
    let assets = CountingAssets::default();
    let mut resolver = IconResolver::new(false);
    let mut record = TestRecord::named(1, "Lantern");
    record.renderers = vec![
        Renderer {
            name: "FirstPersonHands".to_string(),
            materials: vec![Material {
                name: "LanternHeld".to_string(),
                main_texture: Some(texture(1, "Lantern_Icon", "", 128)),
                texture_slots: Vec::new(),
            }],
        },
        Renderer {
            name: "WorldModel".to_string(),
            materials: vec![
                Material {
                    name: "PlayerSkin".to_string(),
                    main_texture: Some(texture(2, "Lantern_Icon_Skin", "", 128)),
                    texture_slots: Vec::new(),
                },
                Material {
                    name: "LanternGlass".to_string(),
                    main_texture: Some(texture(3, "Glass_Albedo", "", 2048)),
                    texture_slots: vec![("_BaseMap".to_string(), texture(4, "Lantern_Thumb", "", 256))],
                },
            ],
        },
    ];

    let icon = resolver.resolve(&record, &assets, true);
    assert_eq!(icon, Some(image(1004, "Lantern_Thumb_sprite")));
    let trace = resolver.last_trace();
    assert!(trace.iter().any(|t| t == "renderer FirstPersonHands=skipped"));
    assert!(trace.iter().any(|t| t == "material PlayerSkin=skipped"));
}

#[test]
fn weak_material_textures_are_rejected() {
    let assets = CountingAssets::default();
    let mut resolver = IconResolver::new(false);
    let mut record = TestRecord::named(1, "Boulder");
    record.renderers = vec![Renderer {
        name: "World".to_string(),
        materials: vec![Material {
            name: "Rock".to_string(),
            main_texture: Some(texture(3, "Rock_Albedo", "", 2048)),
            texture_slots: Vec::new(),
        }],
    }];
    assert_eq!(resolver.resolve(&record, &assets, true), None);
}

#[test]
fn clear_empties_every_cache() {
    let assets = CountingAssets {
        textures: vec![texture(10, "Compass", "Items/Icons/compass.png", 256)],
        ..Default::default()
    };
    let mut resolver = IconResolver::new(false);
    resolver.resolve(&TestRecord::named(1, "Compass"), &assets, true);
    assert!(!resolver.is_empty());

    resolver.clear();
    assert!(resolver.is_empty());
    assert!(!resolver.index_built());
    assert_eq!(resolver.index_len(), 0);
    assert_eq!(resolver.converted_count(), 0);
}
