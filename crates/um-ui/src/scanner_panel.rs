//! QR scanner dialog
//!
//! Hosts the one-shot capture session. The camera is released on every exit
//! path: explicit stop, the Close button, the window's close box, and the
//! automatic close after a successful capture.

use std::time::Duration;

use egui::{Align2, Color32, Ui};

use um_core::session::ScanPhase;

use crate::UiContext;

const ERROR_COLOR: Color32 = Color32::from_rgb(220, 38, 38);
const SUCCESS_COLOR: Color32 = Color32::from_rgb(22, 163, 74);

pub struct ScannerDialog {
    open: bool,
}

impl ScannerDialog {
    pub fn new() -> Self {
        Self { open: false }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn ui(&mut self, egui_ctx: &egui::Context, ctx: &UiContext) {
        if !self.open {
            return;
        }

        // The capture session closes itself a moment after a successful
        // scan; take the dialog down with it.
        if ctx.scan.tick() {
            self.open = false;
            return;
        }

        let mut keep_open = true;
        let mut close_clicked = false;
        egui::Window::new("Scan QR code")
            .open(&mut keep_open)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(egui_ctx, |ui| {
                self.body(ui, ctx);
                ui.add_space(8.0);
                if ui.button("Close").clicked() {
                    close_clicked = true;
                }
            });

        if !keep_open || close_clicked {
            ctx.scan.stop();
            self.open = false;
            return;
        }

        // Frames and the auto-close deadline arrive off the UI thread.
        if matches!(ctx.scan.phase(), ScanPhase::Scanning | ScanPhase::Captured) {
            egui_ctx.request_repaint_after(Duration::from_millis(150));
        }
    }

    fn body(&self, ui: &mut Ui, ctx: &UiContext) {
        match ctx.scan.phase() {
            ScanPhase::Idle => {
                if let Some(value) = ctx.scan.result() {
                    success_note(ui, &value);
                } else {
                    ui.label(
                        "Position the QR code inside the camera frame. \
                         The decoded location becomes your start point.",
                    );
                }
                if ui.button("Start camera").clicked() {
                    ctx.scan.start(ctx.camera.as_ref());
                }
            }
            ScanPhase::Scanning => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Scanning...");
                });
                if ui.button("Stop scanning").clicked() {
                    ctx.scan.stop();
                }
            }
            ScanPhase::Captured => {
                if let Some(value) = ctx.scan.result() {
                    success_note(ui, &value);
                }
            }
            ScanPhase::Error => {
                ui.colored_label(ERROR_COLOR, "Camera error");
                let message = ctx
                    .scan
                    .error()
                    .unwrap_or_else(|| "Camera unavailable".to_string());
                ui.label(message);
            }
        }
    }
}

impl Default for ScannerDialog {
    fn default() -> Self {
        Self::new()
    }
}

fn success_note(ui: &mut Ui, value: &str) {
    ui.colored_label(SUCCESS_COLOR, "QR code scanned");
    ui.label(format!("Start point: {value}"));
}
