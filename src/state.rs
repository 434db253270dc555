//! Catalog state and its invalidation rules.
//!
//! [`CatalogState`] is the single owned context every incremental task reads
//! and writes: the entry list, the icon caches, the dataset and language
//! fences, and the generation counters used to cancel stale tasks.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, info, warn};

use crate::classifier::Classifier;
use crate::icon::IconResolver;
use crate::model::{AssetSurface, CatalogEntry, DatasetFence, LanguageFence, RecordSource};
use crate::text::{TextResolver, TextSource};

/// Collaborators handed to every tick.
#[derive(Clone, Copy)]
pub struct Host<'a> {
    pub source: &'a dyn RecordSource,
    pub text: &'a dyn TextSource,
    pub assets: &'a dyn AssetSurface,
}

// ────────────────────────────────────────────────────────────────────────────
// Generations
// ────────────────────────────────────────────────────────────────────────────

/// Monotonic counter. Tasks hold a [`CancelToken`] captured at start and
/// stop as soon as the counter moves past it.
#[derive(Debug, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn current(&self) -> u64 {
        self.0
    }

    /// Advance the counter, cancelling every outstanding token, and return
    /// a token for the new generation.
    pub fn bump(&mut self) -> CancelToken {
        self.0 += 1;
        CancelToken(self.0)
    }
}

/// Snapshot of a [`Generation`] held by an incremental task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelToken(u64);

impl CancelToken {
    pub fn value(self) -> u64 {
        self.0
    }

    pub fn is_live(self, generation: &Generation) -> bool {
        self.0 == generation.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Build phase
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Idle,
    Preloading,
    Ready,
}

/// Why the catalog was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    /// The collection being preloaded is no longer the live one.
    LoadingFenceChanged,
    /// The loaded collection is no longer the live one.
    LoadedFenceChanged,
    /// The catalog was built from an empty collection that has since filled up.
    SourcePopulated,
    Explicit,
}

// ────────────────────────────────────────────────────────────────────────────
// CatalogState
// ────────────────────────────────────────────────────────────────────────────

pub struct CatalogState {
    pub(crate) entries: Vec<CatalogEntry>,
    pub(crate) icons: IconResolver,
    pub(crate) text: TextResolver,
    pub(crate) classifier: Classifier,
    phase: BuildPhase,
    build_generation: Generation,
    list_generation: Generation,
    loading_fence: Option<DatasetFence>,
    loaded_fence: Option<DatasetFence>,
    loaded_empty: bool,
    language_fence: Option<LanguageFence>,
    list_dirty: bool,
    /// Heavy icons have been warmed for every entry.
    pub(crate) icons_primed: bool,
    /// Next entry the icon warm-up will visit.
    pub(crate) warm_cursor: usize,
    verbose: bool,
}

impl CatalogState {
    pub fn new(text: TextResolver, verbose: bool) -> Self {
        Self {
            entries: Vec::new(),
            icons: IconResolver::new(verbose),
            text,
            classifier: Classifier::new(verbose),
            phase: BuildPhase::Idle,
            build_generation: Generation::default(),
            list_generation: Generation::default(),
            loading_fence: None,
            loaded_fence: None,
            loaded_empty: false,
            language_fence: None,
            list_dirty: false,
            icons_primed: false,
            warm_cursor: 0,
            verbose,
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn icons(&self) -> &IconResolver {
        &self.icons
    }

    pub fn text(&self) -> &TextResolver {
        &self.text
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    /// Whether a complete catalog is available.
    pub fn is_ready(&self) -> bool {
        self.phase == BuildPhase::Ready
    }

    pub fn build_generation(&self) -> &Generation {
        &self.build_generation
    }

    pub fn list_generation(&self) -> &Generation {
        &self.list_generation
    }

    pub fn loaded_fence(&self) -> Option<DatasetFence> {
        self.loaded_fence
    }

    pub fn loading_fence(&self) -> Option<DatasetFence> {
        self.loading_fence
    }

    pub fn language_fence(&self) -> Option<LanguageFence> {
        self.language_fence
    }

    pub fn icons_primed(&self) -> bool {
        self.icons_primed
    }

    pub fn is_list_dirty(&self) -> bool {
        self.list_dirty
    }

    pub fn mark_list_dirty(&mut self) {
        self.list_dirty = true;
    }

    pub(crate) fn take_list_dirty(&mut self) -> bool {
        std::mem::take(&mut self.list_dirty)
    }

    /// Cancel any in-flight list emission and return a token for a new one.
    pub(crate) fn next_list_token(&mut self) -> CancelToken {
        self.list_generation.bump()
    }

    /// Enter `Preloading` for `fence`: clear entries and icon caches and
    /// start a new build generation.
    pub(crate) fn begin_build(&mut self, fence: DatasetFence) -> CancelToken {
        let token = self.build_generation.bump();
        self.entries.clear();
        self.icons.clear();
        self.icons_primed = false;
        self.warm_cursor = 0;
        self.phase = BuildPhase::Preloading;
        self.loading_fence = Some(fence);
        token
    }

    /// Enter `Ready` for `fence`.
    pub(crate) fn finish_build(&mut self, fence: DatasetFence) {
        self.phase = BuildPhase::Ready;
        self.loaded_fence = Some(fence);
        self.loading_fence = None;
        self.loaded_empty = self.entries.is_empty();
        self.list_dirty = true;
    }

    /// Throw away everything derived from the source collection and cancel
    /// every in-flight task.
    pub fn invalidate(&mut self, reason: InvalidationReason) {
        self.build_generation.bump();
        self.list_generation.bump();
        self.entries.clear();
        self.icons.clear();
        self.phase = BuildPhase::Idle;
        self.loading_fence = None;
        self.loaded_fence = None;
        self.loaded_empty = false;
        self.icons_primed = false;
        self.warm_cursor = 0;
        self.list_dirty = true;
        info!(?reason, "catalog invalidated");
    }

    /// Compare the live collection against the loading and loaded fences.
    /// Returns `true` when the catalog was invalidated.
    pub fn check_dataset(&mut self, source: &dyn RecordSource) -> bool {
        let live = source.identity();
        let reason = match self.phase {
            BuildPhase::Preloading if self.loading_fence != live => {
                Some(InvalidationReason::LoadingFenceChanged)
            }
            BuildPhase::Ready if self.loaded_fence != live => {
                Some(InvalidationReason::LoadedFenceChanged)
            }
            BuildPhase::Ready if self.loaded_empty && !source.records().is_empty() => {
                Some(InvalidationReason::SourcePopulated)
            }
            _ => None,
        };
        match reason {
            Some(reason) => {
                self.invalidate(reason);
                true
            }
            None => false,
        }
    }

    /// Fill in the icon of entry `index` with the heavy strategies enabled.
    /// A record that fails while resolving keeps no icon and is not retried.
    pub(crate) fn resolve_heavy_icon(&mut self, index: usize, assets: &dyn AssetSurface) {
        let Some(entry) = self.entries.get(index) else {
            return;
        };
        if entry.icon.is_some() {
            return;
        }
        let record = entry.record.clone();
        let icons = &mut self.icons;
        match catch_unwind(AssertUnwindSafe(|| icons.resolve(&*record, assets, true))) {
            Ok(icon) => self.entries[index].icon = icon,
            Err(_) => {
                warn!(record = record.name(), "failed to resolve icon, skipping");
                self.icons.mark_failed(record.name());
            }
        }
    }

    /// Recompute the language fence; on change, re-derive every display
    /// name without touching categories or icons. Returns `true` on change.
    pub fn refresh_language(&mut self, source: &dyn TextSource) -> bool {
        let fence = self.text.language_fence(source);
        let previous = self.language_fence.replace(fence);
        if previous.is_none() || previous == Some(fence) {
            return false;
        }
        for entry in &mut self.entries {
            let name = crate::builder::derive_display_name(&self.text, source, &entry.stable_name);
            entry.set_display_name(name);
        }
        self.list_dirty = true;
        if self.verbose {
            debug!(entries = self.entries.len(), "language changed, display names re-derived");
        }
        true
    }
}
