//! User interface components for the UniMap client
//!
//! This crate provides the egui-based panels: navigation controls, floor
//! switcher, schedule search, the QR scanner dialog, transient failure
//! toasts and the theme.

pub mod controls_panel;
pub mod floor_switcher;
pub mod scanner_panel;
pub mod search_panel;
pub mod theme;
mod toasts;

pub use controls_panel::ControlsPanel;
pub use floor_switcher::FloorSwitcher;
pub use scanner_panel::ScannerDialog;
pub use search_panel::SearchPanel;
pub use theme::{apply_theme, Theme};
pub use toasts::{Toast, ToastStack};

use std::sync::Arc;

use um_core::ports::SchedulePort;
use um_core::session::{CameraPort, NavigationSession, ScanSession, SearchSession};

/// Context shared by all panels
///
/// Panels read session snapshots each frame and push user intent back into
/// the sessions; async work is spawned on the app's runtime with a cloned
/// egui context for repaint on completion.
#[derive(Clone)]
pub struct UiContext {
    pub nav: Arc<NavigationSession>,
    pub search: Arc<SearchSession>,
    pub scan: Arc<ScanSession>,
    pub schedule: Arc<dyn SchedulePort>,
    pub camera: Arc<dyn CameraPort>,
    pub runtime: tokio::runtime::Handle,
    pub egui_ctx: egui::Context,
}
