//! Navigation controls panel
//!
//! Start/destination pickers over the directory snapshot, the travel mode
//! selector, the Navigate/Clear actions, and the loaded route's stats,
//! occupancy note and turn-by-turn directions.

use egui::{Color32, RichText, ScrollArea, Ui};

use um_core::model::{Occupancy, OccupancyStatus, Route, TravelMode};
use um_core::session::NavigationSnapshot;

use crate::UiContext;

const OCCUPIED_COLOR: Color32 = Color32::from_rgb(220, 38, 38);
const AVAILABLE_COLOR: Color32 = Color32::from_rgb(22, 163, 74);

pub struct ControlsPanel;

impl ControlsPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn ui(&mut self, ui: &mut Ui, ctx: &UiContext, snapshot: &NavigationSnapshot) {
        ui.heading("UniMap");
        ui.add_space(8.0);

        self.endpoint_picker(ui, ctx, snapshot, Endpoint::Start);
        self.endpoint_picker(ui, ctx, snapshot, Endpoint::Destination);
        ui.add_space(4.0);
        self.mode_picker(ui, ctx, snapshot);
        ui.add_space(8.0);

        let ready = !snapshot.start.is_empty() && !snapshot.end.is_empty();
        ui.horizontal(|ui| {
            if ui.add_enabled(ready, egui::Button::new("Navigate")).clicked() {
                let nav = ctx.nav.clone();
                let repaint = ctx.egui_ctx.clone();
                ctx.runtime.spawn(async move {
                    nav.go().await;
                    repaint.request_repaint();
                });
            }
            if snapshot.route.is_some() && ui.button("Clear route").clicked() {
                ctx.nav.reset();
            }
        });

        if let Some(route) = &snapshot.route {
            ui.add_space(12.0);
            self.route_stats(ui, route);
            if let Some(occupancy) = &snapshot.occupancy {
                self.occupancy_note(ui, occupancy);
            }
            self.directions(ui, route);
        }
    }

    fn endpoint_picker(
        &self,
        ui: &mut Ui,
        ctx: &UiContext,
        snapshot: &NavigationSnapshot,
        endpoint: Endpoint,
    ) {
        let current = match endpoint {
            Endpoint::Start => &snapshot.start,
            Endpoint::Destination => &snapshot.end,
        };
        let selected = if current.is_empty() {
            endpoint.placeholder().to_string()
        } else {
            current.clone()
        };
        egui::ComboBox::from_label(endpoint.label())
            .selected_text(selected)
            .width(220.0)
            .show_ui(ui, |ui| {
                for node in snapshot.directory.iter() {
                    let text = format!("{} ({})", node.name, floor_tag(node.floor));
                    if ui.selectable_label(*current == node.name, text).clicked() {
                        match endpoint {
                            Endpoint::Start => ctx.nav.set_start(node.name.clone()),
                            Endpoint::Destination => ctx.nav.set_end(node.name.clone()),
                        }
                    }
                }
            });
    }

    fn mode_picker(&self, ui: &mut Ui, ctx: &UiContext, snapshot: &NavigationSnapshot) {
        ui.horizontal(|ui| {
            for mode in TravelMode::ALL {
                if ui
                    .selectable_label(snapshot.mode == mode, mode.label())
                    .clicked()
                {
                    ctx.nav.set_mode(mode);
                }
            }
        });
    }

    fn route_stats(&self, ui: &mut Ui, route: &Route) {
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new("TIME").small().weak());
                ui.label(
                    RichText::new(format!(
                        "{:.1} min",
                        route.stats.total_time_seconds / 60.0
                    ))
                    .strong()
                    .size(20.0),
                );
            });
            ui.separator();
            ui.vertical(|ui| {
                ui.label(RichText::new("DISTANCE").small().weak());
                ui.label(
                    RichText::new(format!(
                        "{} m",
                        route.stats.total_distance_meters.round() as i64
                    ))
                    .strong()
                    .size(20.0),
                );
            });
        });
    }

    fn occupancy_note(&self, ui: &mut Ui, occupancy: &Occupancy) {
        match occupancy.status {
            OccupancyStatus::Occupied => {
                ui.add_space(8.0);
                ui.colored_label(OCCUPIED_COLOR, "Room occupied");
                if let Some(details) = &occupancy.details {
                    ui.label(format!("Course: {}", details.course));
                    ui.label(format!("By: {}", details.instructor));
                    if let Some(until) = details.time.split('-').nth(1) {
                        ui.label(format!("Until: {}", until.trim()));
                    }
                }
            }
            OccupancyStatus::Available => {
                ui.add_space(8.0);
                ui.colored_label(AVAILABLE_COLOR, "Room available");
            }
            OccupancyStatus::Unknown => {}
        }
    }

    fn directions(&self, ui: &mut Ui, route: &Route) {
        if route.directions.is_empty() {
            return;
        }
        ui.add_space(12.0);
        ui.strong("Directions");
        ui.separator();
        ScrollArea::vertical()
            .id_source("directions")
            .max_height(260.0)
            .show(ui, |ui| {
                for (index, step) in route.directions.iter().enumerate() {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(format!("{}.", index + 1)).weak());
                        ui.label(step);
                    });
                }
            });
    }
}

impl Default for ControlsPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
enum Endpoint {
    Start,
    Destination,
}

impl Endpoint {
    fn label(self) -> &'static str {
        match self {
            Endpoint::Start => "Start",
            Endpoint::Destination => "Destination",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            Endpoint::Start => "Choose start location...",
            Endpoint::Destination => "Choose destination...",
        }
    }
}

/// The ground floor shows as "G" in pickers, matching the floor buttons.
fn floor_tag(floor: u32) -> String {
    if floor == 0 {
        "G".to_string()
    } else {
        floor.to_string()
    }
}
