#![cfg(feature = "egui")]

//! egui rendering of the browser: search box, group tabs, sub-category
//! selector and the emitted rows.

use egui::text::LayoutJob;
use egui::{Color32, RichText, Sense};

use crate::browser::Browser;
use crate::materializer::Row;
use crate::model::{Category, MajorGroup};
use crate::text::TextSource;

/// Case-insensitive highlighter: builds a LayoutJob for `text` with every
/// occurrence of `query` on a yellow background.
pub fn highlight_query_job(text: &str, query: &str) -> LayoutJob {
    let mut job = LayoutJob::default();
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        job.append(text, 0.0, egui::TextFormat::default());
        return job;
    }

    // Lowercasing can change byte lengths per character, so every byte of
    // `lower` remembers the span of the character it came from in `text`.
    let mut lower = String::with_capacity(text.len());
    let mut spans: Vec<(usize, usize)> = Vec::with_capacity(text.len());
    for (at, c) in text.char_indices() {
        let span = (at, at + c.len_utf8());
        for lc in c.to_lowercase() {
            lower.push(lc);
            spans.extend(std::iter::repeat_n(span, lc.len_utf8()));
        }
    }

    let mut i = 0;
    let mut from = 0;
    while let Some(pos) = lower[from..].find(&q) {
        let hit = from + pos;
        from = hit + q.len();
        let start = spans[hit].0.max(i);
        let end = spans[from - 1].1;
        if end <= start {
            continue;
        }
        if start > i {
            job.append(&text[i..start], 0.0, egui::TextFormat::default());
        }
        let mut fmt = egui::TextFormat::default();
        fmt.background = Color32::YELLOW;
        job.append(&text[start..end], 0.0, fmt);
        i = end;
    }
    if i < text.len() {
        job.append(&text[i..], 0.0, egui::TextFormat::default());
    }
    job
}

/// Draw the browser. Returns the catalog index of a clicked entry row; the
/// host passes it to [`Browser::activate`].
pub fn show(ui: &mut egui::Ui, browser: &mut Browser, text: &dyn TextSource) -> Option<usize> {
    let mut activated = None;

    ui.heading(browser.ui_text(text, "TITLE"));

    let mut query = browser.filter().query.clone();
    ui.horizontal(|ui| {
        let resp = ui.add(
            egui::TextEdit::singleline(&mut query).hint_text(browser.ui_text(text, "SEARCH_PLACEHOLDER")),
        );
        if resp.changed() {
            browser.set_query(&query);
        }
    });

    let current_group = browser.filter().group;
    ui.horizontal(|ui| {
        for group in MajorGroup::ALL {
            let label = browser.group_label(text, group);
            if ui.selectable_label(group == current_group, label).clicked() {
                browser.set_group(group);
            }
        }
    });

    let group = browser.filter().group;
    let mut selected: Option<Category> = browser.filter().category;
    let all_label = browser.ui_text(text, "CATEGORY_ALL");
    let selected_text = match selected {
        Some(c) => browser.category_label(text, c),
        None => all_label.clone(),
    };
    egui::ComboBox::from_id_salt("itembrowser_category")
        .selected_text(selected_text)
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut selected, None, all_label);
            for category in group.categories() {
                let label = browser.category_label(text, category);
                ui.selectable_value(&mut selected, Some(category), label);
            }
        });
    if selected != browser.filter().category {
        browser.set_category(selected);
    }

    ui.separator();

    let query = browser.filter().query.clone();
    egui::ScrollArea::vertical().show(ui, |ui| {
        for row in browser.rows() {
            match row {
                Row::Header { .. } => {
                    let label = browser.status_text(text, row).unwrap_or_default();
                    ui.label(RichText::new(label).strong());
                }
                Row::Entry(entry) => {
                    let job = highlight_query_job(&entry.label(), &query);
                    let resp = ui.add(egui::Label::new(job).sense(Sense::click()));
                    if resp.clicked() {
                        activated = Some(entry.index);
                    }
                }
                Row::NoResults | Row::Loading => {
                    let label = browser.status_text(text, row).unwrap_or_default();
                    ui.label(RichText::new(label).italics());
                }
            }
        }
    });

    activated
}
