//! Filtering, ordering and budgeted emission of the visible list.

use serde::Serialize;

use crate::model::{CatalogEntry, Category, Image, MajorGroup};
use crate::state::{CancelToken, CatalogState, Host};

/// Current filter state of the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    /// Free text; matched case-insensitively against the search key.
    pub query: String,
    pub group: MajorGroup,
    /// Sub-category; `None` shows every category of `group`.
    pub category: Option<Category>,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            group: MajorGroup::Food,
            category: None,
        }
    }
}

/// One renderable line of the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Row {
    Header { category: Category },
    Entry(EntryRow),
    /// The filter matched nothing.
    NoResults,
    /// The catalog is still being built.
    Loading,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryRow {
    /// Index into [`CatalogState::entries`].
    pub index: usize,
    pub display_name: String,
    pub stable_name: String,
    pub category: Category,
    pub icon: Option<Image>,
}

impl EntryRow {
    /// Display name, followed by the stable name in parentheses when the
    /// two differ.
    pub fn label(&self) -> String {
        if self.display_name.eq_ignore_ascii_case(&self.stable_name) {
            self.display_name.clone()
        } else {
            format!("{} ({})", self.display_name, self.stable_name)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Planned {
    Header(Category),
    Entry(usize),
}

/// Filter and order `entries` for `filter`.
///
/// Without a sub-category the result is grouped by category in priority
/// order, each group in discovery order, with a header before each group.
/// With a sub-category it is a flat list sorted by display name.
pub fn plan(entries: &[CatalogEntry], filter: &ListFilter) -> Vec<Planned> {
    let query = filter.query.trim().to_lowercase();
    let visible = |e: &CatalogEntry| {
        e.category.major_group() == filter.group
            && filter.category.map_or(true, |c| e.category == c)
            && e.matches_query(&query)
    };

    if filter.category.is_some() {
        let mut picked: Vec<usize> = (0..entries.len()).filter(|&i| visible(&entries[i])).collect();
        picked.sort_by_cached_key(|&i| entries[i].display_name.to_lowercase());
        return picked.into_iter().map(Planned::Entry).collect();
    }

    let mut out = Vec::new();
    for category in filter.group.categories() {
        let start = out.len();
        for (i, entry) in entries.iter().enumerate() {
            if entry.category == category && visible(entry) {
                if out.len() == start {
                    out.push(Planned::Header(category));
                }
                out.push(Planned::Entry(i));
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStep {
    Continue,
    Finished,
    Cancelled,
}

/// Budgeted emission of a planned list.
pub struct ListTask {
    token: CancelToken,
    plan: Vec<Planned>,
    cursor: usize,
    batch: usize,
}

impl ListTask {
    /// Plan the list for `filter`, cancelling any emission already running.
    pub fn start(state: &mut CatalogState, filter: &ListFilter, batch: usize) -> ListTask {
        let token = state.next_list_token();
        ListTask {
            token,
            plan: plan(state.entries(), filter),
            cursor: 0,
            batch: batch.max(1),
        }
    }

    pub fn token(&self) -> CancelToken {
        self.token
    }

    pub fn planned(&self) -> &[Planned] {
        &self.plan
    }

    /// Emit at most one batch of rows into `out`. Entry icons that are not
    /// resolved yet are resolved here with the heavy strategies enabled.
    pub fn step(&mut self, state: &mut CatalogState, host: &Host<'_>, out: &mut Vec<Row>) -> ListStep {
        if !self.token.is_live(state.list_generation()) {
            return ListStep::Cancelled;
        }
        if self.plan.is_empty() {
            out.push(Row::NoResults);
            return ListStep::Finished;
        }

        let end = (self.cursor + self.batch).min(self.plan.len());
        for item in &self.plan[self.cursor..end] {
            match *item {
                Planned::Header(category) => out.push(Row::Header { category }),
                Planned::Entry(index) => {
                    if let Some(row) = entry_row(state, host, index) {
                        out.push(row);
                    }
                }
            }
        }
        self.cursor = end;

        if self.cursor < self.plan.len() {
            ListStep::Continue
        } else {
            ListStep::Finished
        }
    }
}

fn entry_row(state: &mut CatalogState, host: &Host<'_>, index: usize) -> Option<Row> {
    state.resolve_heavy_icon(index, host.assets);
    let entry = state.entries.get(index)?;
    Some(Row::Entry(EntryRow {
        index,
        display_name: entry.display_name.clone(),
        stable_name: entry.stable_name.clone(),
        category: entry.category,
        icon: entry.icon.clone(),
    }))
}
