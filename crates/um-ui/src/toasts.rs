//! Transient failure notices

use std::sync::Arc;
use std::time::{Duration, Instant};

use egui::{Align2, Color32, RichText};
use parking_lot::Mutex;

const TOAST_TTL: Duration = Duration::from_secs(6);

/// A transient notice shown in the corner of the window.
pub struct Toast {
    pub title: String,
    pub message: String,
    pub created: Instant,
}

impl Toast {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            created: Instant::now(),
        }
    }
}

/// Corner stack of transient notices.
///
/// The inner list is shared so event subscribers can push from outside the
/// frame loop.
#[derive(Clone)]
pub struct ToastStack {
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl ToastStack {
    pub fn new() -> Self {
        Self {
            toasts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, toast: Toast) {
        self.toasts.lock().push(toast);
    }

    pub fn ui(&self, ctx: &egui::Context) {
        let mut toasts = self.toasts.lock();
        toasts.retain(|t| t.created.elapsed() < TOAST_TTL);
        if toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("unimap_toasts"))
            .anchor(Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .interactable(false)
            .show(ctx, |ui| {
                for toast in toasts.iter() {
                    egui::Frame::popup(&ctx.style()).show(ui, |ui| {
                        ui.label(
                            RichText::new(&toast.title)
                                .strong()
                                .color(Color32::from_rgb(220, 38, 38)),
                        );
                        ui.label(&toast.message);
                    });
                }
            });

        // Keep repainting so notices expire without user input.
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

impl Default for ToastStack {
    fn default() -> Self {
        Self::new()
    }
}
