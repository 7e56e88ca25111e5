//! Schedule search panel
//!
//! Search-as-you-type over the lecture schedule. Each edit issues a fetch
//! through the search session, which enforces last-issued-wins; picking a
//! hit publishes its room as the destination without starting navigation.

use egui::Ui;

use crate::UiContext;

pub struct SearchPanel {
    buffer: String,
}

impl SearchPanel {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn ui(&mut self, ui: &mut Ui, ctx: &UiContext) {
        ui.strong("Lecture search");
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.buffer)
                .hint_text("Search courses or rooms...")
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            if let Some(epoch) = ctx.search.on_query_change(&self.buffer) {
                let search = ctx.search.clone();
                let schedule = ctx.schedule.clone();
                let repaint = ctx.egui_ctx.clone();
                let query = self.buffer.clone();
                ctx.runtime.spawn(async move {
                    let outcome = schedule.search(&query).await;
                    search.apply_results(epoch, outcome);
                    repaint.request_repaint();
                });
            }
        }

        let snapshot = ctx.search.snapshot();
        if !snapshot.open {
            return;
        }
        if snapshot.pending {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.weak("Searching...");
            });
        }
        for (index, hit) in snapshot.results.iter().enumerate() {
            let text = format!(
                "{} ({}, {} {}-{})",
                hit.course, hit.room, hit.day, hit.start, hit.end
            );
            if ui.selectable_label(false, text).clicked() {
                if let Some(hit) = ctx.search.select(index) {
                    ctx.nav.set_end(hit.room.clone());
                    self.buffer = hit.course;
                }
            }
        }
        if !snapshot.pending && snapshot.results.is_empty() {
            ui.weak("No matches");
        }
    }
}

impl Default for SearchPanel {
    fn default() -> Self {
        Self::new()
    }
}
