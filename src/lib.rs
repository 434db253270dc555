//! Incremental item catalog for an in-game browser.
//!
//! The crate turns a host-owned collection of item records into a
//! categorized, localized and iconified catalog without stalling the host's
//! frame loop: building and list emission both advance a bounded amount of
//! work per [`Browser::tick`] and are cancelled through generation counters
//! when the underlying collection or language changes.
//!
//! The binary `itembrowser` loads a JSON dataset (see [`data`]) and prints
//! the list the browser would show for a filter.

pub mod alias;
pub mod browser;
pub mod builder;
pub mod classifier;
pub mod config;
pub mod data;
pub mod error;
pub mod icon;
pub mod materializer;
pub mod model;
pub mod state;
pub mod text;
pub mod visibility;

// Optional egui rendering of the browser list lives behind the `egui` feature flag.
#[cfg(feature = "egui")]
pub mod egui_view;

pub use browser::{Browser, SpawnRequest, Spawner};
pub use config::BrowserConfig;
pub use error::SpawnError;
pub use materializer::{EntryRow, ListFilter, Row};
pub use model::{
    AssetSurface, CatalogEntry, Category, DatasetFence, Image, LanguageFence, MajorGroup, Probe,
    ProbeValue, Record, RecordRef, RecordSource, Texture,
};
pub use state::{BuildPhase, CatalogState, Host, InvalidationReason};
pub use text::{TextResolver, TextSource};
