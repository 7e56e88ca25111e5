//! Floor switcher bar

use egui::Ui;

use crate::UiContext;

/// Horizontal row of floor buttons plus an explicit view reset.
///
/// Button index is the floor number; labels come from configuration.
pub struct FloorSwitcher {
    labels: Vec<String>,
}

impl FloorSwitcher {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Returns true when the user asked to reset the pan/zoom view.
    pub fn ui(&self, ui: &mut Ui, ctx: &UiContext, current_floor: u32) -> bool {
        let mut reset_view = false;
        ui.horizontal(|ui| {
            for (floor, label) in self.labels.iter().enumerate() {
                let floor = floor as u32;
                if ui.selectable_label(current_floor == floor, label).clicked()
                    && floor != current_floor
                {
                    // Switching floors deliberately keeps the pan/zoom view.
                    ctx.nav.set_floor(floor);
                }
            }
            ui.separator();
            if ui.button("Reset view").clicked() {
                reset_view = true;
            }
        });
        reset_view
    }
}
