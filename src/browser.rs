//! The host-facing browser session.
//!
//! [`Browser`] ties the catalog state to the host's update loop. The host
//! calls [`Browser::tick`] once per frame; everything else (opening,
//! filtering, activating rows) is driven by UI events.

use tracing::{debug, error, info, warn};

use crate::builder::{BuildStart, BuildStep, BuildTask};
use crate::config::BrowserConfig;
use crate::error::SpawnError;
use crate::materializer::{ListFilter, ListStep, ListTask, Row};
use crate::model::{Category, MajorGroup, Record};
use crate::state::{CatalogState, Host, InvalidationReason};
use crate::text::{TextResolver, TextSource};

/// Parameters handed to the [`Spawner`] along with the chosen record.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub distance: f32,
    pub allow_online: bool,
}

/// Host collaborator that instantiates a record into the live session.
pub trait Spawner {
    /// Spawn `record` `request.distance` ahead of the local character.
    ///
    /// The browser only checks that the entry exists. Everything that
    /// depends on the live session is decided here: return
    /// [`SpawnError::NoCharacter`] when there is no local character, and
    /// [`SpawnError::OnlineDisabled`] when the session is networked and
    /// `request.allow_online` is `false` (or the session is not in a room).
    /// The error is logged and handed back to the caller of
    /// [`Browser::activate`] unchanged.
    fn spawn(&mut self, record: &dyn Record, request: &SpawnRequest) -> Result<(), SpawnError>;
}

pub struct Browser {
    config: BrowserConfig,
    state: CatalogState,
    filter: ListFilter,
    open: bool,
    refresh_requested: bool,
    build: Option<BuildTask>,
    list: Option<ListTask>,
    rows: Vec<Row>,
}

impl Browser {
    /// Browser using the embedded text tables.
    pub fn new(config: BrowserConfig) -> Self {
        Self::with_text(config, TextResolver::embedded())
    }

    pub fn with_text(config: BrowserConfig, text: TextResolver) -> Self {
        let state = CatalogState::new(text, config.verbose);
        Self {
            config,
            state,
            filter: ListFilter::default(),
            open: false,
            refresh_requested: false,
            build: None,
            list: None,
            rows: Vec::new(),
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn filter(&self) -> &ListFilter {
        &self.filter
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Rows emitted so far for the current filter.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_building(&self) -> bool {
        self.build.is_some()
    }

    pub fn is_listing(&self) -> bool {
        self.list.is_some()
    }

    /// Nothing left to do until the source, language or filter changes.
    pub fn is_settled(&self) -> bool {
        let list_pending = self.open && (self.state.is_list_dirty() || self.refresh_requested);
        self.state.is_ready() && self.build.is_none() && self.list.is_none() && !list_pending
    }

    // ── Frame loop ──────────────────────────────────────────────────────

    pub fn tick(&mut self, host: &Host<'_>) {
        self.state.refresh_language(host.text);

        if self.state.check_dataset(host.source) {
            self.build = None;
            self.list = None;
            if self.open {
                self.refresh_requested = true;
            }
        }

        self.tick_build(host);

        if self.open {
            if self.refresh_requested || self.state.is_list_dirty() {
                self.restart_list();
            }
            self.tick_list(host);
        } else if self.config.prewarm_icons {
            self.tick_warmup(host);
        }
    }

    fn tick_build(&mut self, host: &Host<'_>) {
        if self.build.is_none() && !self.state.is_ready() {
            match BuildTask::start(&mut self.state, host, self.config.build_batch) {
                BuildStart::Started(task) => self.build = Some(task),
                BuildStart::Completed | BuildStart::Deferred => {}
            }
        }
        let Some(task) = self.build.as_mut() else {
            return;
        };
        match task.step(&mut self.state, host) {
            BuildStep::Continue => {}
            BuildStep::Finished | BuildStep::Cancelled => self.build = None,
        }
    }

    fn tick_list(&mut self, host: &Host<'_>) {
        let Some(task) = self.list.as_mut() else {
            return;
        };
        match task.step(&mut self.state, host, &mut self.rows) {
            ListStep::Continue => {}
            ListStep::Finished | ListStep::Cancelled => self.list = None,
        }
    }

    /// Resolve heavy icons for a few entries per tick while the view is closed.
    fn tick_warmup(&mut self, host: &Host<'_>) {
        if !self.state.is_ready() || self.state.icons_primed {
            return;
        }
        let end = (self.state.warm_cursor + self.config.build_batch.max(1)).min(self.state.entries.len());
        for index in self.state.warm_cursor..end {
            self.state.resolve_heavy_icon(index, host.assets);
        }
        self.state.warm_cursor = end;
        if end >= self.state.entries.len() {
            self.state.icons_primed = true;
            if self.config.verbose {
                debug!(entries = end, "icon warm-up complete");
            }
        }
    }

    /// Cancel the current emission and start over with the current filter.
    fn restart_list(&mut self) {
        self.refresh_requested = false;
        self.rows.clear();
        if !self.state.is_ready() {
            // Cancel whatever was emitting; the finished build marks the list dirty again.
            self.state.next_list_token();
            self.list = None;
            self.rows.push(Row::Loading);
            self.state.take_list_dirty();
            return;
        }
        self.state.take_list_dirty();
        self.list = Some(ListTask::start(&mut self.state, &self.filter, self.config.list_batch));
    }

    // ── Open / close ────────────────────────────────────────────────────

    /// Toggle the view. Returns `false` when the host UI is not ready yet;
    /// the caller should retry on a later tick.
    pub fn toggle(&mut self, ui_ready: bool) -> bool {
        if !ui_ready {
            warn!("UI not ready yet, try again after fully entering a match");
            return false;
        }
        if self.open {
            self.close();
        } else {
            self.open();
        }
        true
    }

    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.open = true;
        self.refresh_requested = true;
    }

    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.state.next_list_token();
        self.list = None;
    }

    /// Drop the catalog and rebuild it from scratch on the next tick.
    pub fn invalidate(&mut self) {
        self.state.invalidate(InvalidationReason::Explicit);
        self.build = None;
        self.list = None;
        if self.open {
            self.refresh_requested = true;
        }
    }

    // ── Filter entry points ─────────────────────────────────────────────

    pub fn set_query(&mut self, query: &str) {
        if self.filter.query == query {
            return;
        }
        self.filter.query = query.to_string();
        self.filter_changed();
    }

    /// Switch the top-level tab. Clears the sub-category.
    pub fn set_group(&mut self, group: MajorGroup) {
        if self.filter.group == group && self.filter.category.is_none() {
            return;
        }
        self.filter.group = group;
        self.filter.category = None;
        self.filter_changed();
    }

    /// Select a sub-category (or all of the current group with `None`).
    /// Selecting a category of the other group switches the group too.
    pub fn set_category(&mut self, category: Option<Category>) {
        if self.filter.category == category {
            return;
        }
        if let Some(c) = category {
            self.filter.group = c.major_group();
        }
        self.filter.category = category;
        self.filter_changed();
    }

    fn filter_changed(&mut self) {
        if self.open {
            self.restart_list();
        }
    }

    // ── Activation ──────────────────────────────────────────────────────

    /// Spawn the record behind catalog entry `index`.
    pub fn activate(&mut self, index: usize, spawner: &mut dyn Spawner) -> Result<(), SpawnError> {
        let Some(entry) = self.state.entry(index) else {
            warn!(index, "activated row is not in the catalog");
            return Err(SpawnError::UnknownEntry(index));
        };
        let request = SpawnRequest {
            distance: self.config.spawn_distance,
            allow_online: self.config.allow_online_spawn,
        };
        match spawner.spawn(&*entry.record, &request) {
            Ok(()) => {
                info!(record = %entry.stable_name, distance = request.distance, "spawned item");
                Ok(())
            }
            Err(e) => {
                error!(record = %entry.stable_name, error = %e, "spawn failed");
                Err(e)
            }
        }
    }

    // ── Labels ──────────────────────────────────────────────────────────

    pub fn ui_text(&self, text: &dyn TextSource, key: &str) -> String {
        self.state.text().ui_text(text, key)
    }

    pub fn category_label(&self, text: &dyn TextSource, category: Category) -> String {
        self.ui_text(text, category.label_key())
    }

    pub fn group_label(&self, text: &dyn TextSource, group: MajorGroup) -> String {
        self.ui_text(text, group.label_key())
    }

    /// Text for a non-entry row.
    pub fn status_text(&self, text: &dyn TextSource, row: &Row) -> Option<String> {
        match row {
            Row::Header { category } => Some(self.category_label(text, *category)),
            Row::NoResults => Some(self.ui_text(text, "STATUS_EMPTY")),
            Row::Loading => Some(self.ui_text(text, "STATUS_NOT_READY")),
            Row::Entry(_) => None,
        }
    }
}
