//! Incremental catalog construction.
//!
//! A [`BuildTask`] snapshots the source collection and turns a bounded batch
//! of records into [`CatalogEntry`] values on every [`BuildTask::step`]. The
//! task holds the build generation it started under and stops without
//! finalizing as soon as that generation is no longer live.

use std::panic::{AssertUnwindSafe, catch_unwind};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::model::{CatalogEntry, Category, DatasetFence, LanguageFence, RecordRef};
use crate::state::{BuildPhase, CancelToken, CatalogState, Host};
use crate::text::{TextResolver, TextSource};
use crate::visibility::{display_override, is_suppressed};

/// Display name for a record: localized name when known, the stable name
/// otherwise, then the fixed display overrides.
pub fn derive_display_name(text: &TextResolver, source: &dyn TextSource, stable_name: &str) -> String {
    let localized = text.localized_item_name(source, stable_name);
    let derived = if localized.trim().is_empty() {
        stable_name.trim().to_string()
    } else {
        localized
    };
    display_override(stable_name, derived)
}

/// Outcome of trying to start a build.
pub enum BuildStart {
    Started(BuildTask),
    /// The source was available but empty; the catalog is ready and empty.
    Completed,
    /// Nothing to do yet: a build is not needed or the source is unavailable.
    Deferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Continue,
    Finished,
    Cancelled,
}

pub struct BuildTask {
    token: CancelToken,
    dataset: DatasetFence,
    language: Option<LanguageFence>,
    records: Vec<RecordRef>,
    cursor: usize,
    batch: usize,
    counts: IndexMap<Category, usize>,
    suppressed: usize,
    failed: usize,
}

impl BuildTask {
    /// Start a build if the catalog is idle and the source is available.
    pub fn start(state: &mut CatalogState, host: &Host<'_>, batch: usize) -> BuildStart {
        if state.phase() != BuildPhase::Idle {
            return BuildStart::Deferred;
        }
        let Some(dataset) = host.source.identity() else {
            return BuildStart::Deferred;
        };
        let records = host.source.records();
        let token = state.begin_build(dataset);
        if records.is_empty() {
            state.finish_build(dataset);
            info!(dataset = dataset.0, "source collection is empty, catalog ready");
            return BuildStart::Completed;
        }
        debug!(dataset = dataset.0, records = records.len(), generation = token.value(), "catalog build started");
        BuildStart::Started(BuildTask {
            token,
            dataset,
            language: state.language_fence(),
            records,
            cursor: 0,
            batch: batch.max(1),
            counts: IndexMap::new(),
            suppressed: 0,
            failed: 0,
        })
    }

    pub fn dataset(&self) -> DatasetFence {
        self.dataset
    }

    pub fn token(&self) -> CancelToken {
        self.token
    }

    pub fn processed(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// Process at most one batch of records.
    pub fn step(&mut self, state: &mut CatalogState, host: &Host<'_>) -> BuildStep {
        if !self.token.is_live(state.build_generation()) {
            debug!(generation = self.token.value(), processed = self.cursor, "stale catalog build abandoned");
            return BuildStep::Cancelled;
        }

        let end = (self.cursor + self.batch).min(self.records.len());
        for i in self.cursor..end {
            let record = self.records[i].clone();
            let outcome = catch_unwind(AssertUnwindSafe(|| build_entry(state, host, &record)));
            match outcome {
                Ok(Some(entry)) => {
                    *self.counts.entry(entry.category).or_default() += 1;
                    state.entries.push(entry);
                }
                Ok(None) => self.suppressed += 1,
                Err(_) => {
                    self.failed += 1;
                    warn!(record = record.name(), "failed to catalog record, skipping");
                }
            }
        }
        self.cursor = end;

        if self.cursor < self.records.len() {
            return BuildStep::Continue;
        }
        state.finish_build(self.dataset);
        if state.classifier.verbose {
            let counts: Vec<String> = Category::ALL
                .iter()
                .filter_map(|c| self.counts.get(c).map(|n| format!("{:?}={}", c, n)))
                .collect();
            info!(
                dataset = self.dataset.0,
                language = ?self.language.map(|l| l.0),
                entries = state.entries().len(),
                suppressed = self.suppressed,
                failed = self.failed,
                "catalog ready: {}",
                counts.join(", ")
            );
        }
        BuildStep::Finished
    }
}

fn build_entry(state: &mut CatalogState, host: &Host<'_>, record: &RecordRef) -> Option<CatalogEntry> {
    let stable_name = record.name();
    if is_suppressed(stable_name) {
        return None;
    }
    let display_name = derive_display_name(&state.text, host.text, stable_name);
    let category = state.classifier.classify(&**record, &display_name);
    let icon = state.icons.resolve(&**record, host.assets, false);
    let mut entry = CatalogEntry::new(record.clone(), display_name, category);
    entry.icon = icon;
    Some(entry)
}
