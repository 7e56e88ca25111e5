//! UniMap desktop client entry point

use std::sync::Arc;

use anyhow::Result;
use eframe::egui::{self, Context};
use tracing::{info, warn};

use um_api::CampusApi;
use um_core::events::events::{DirectoryFailed, RouteFailed, ScanCaptured};
use um_core::events::{handler_from_fn, EventBus};
use um_core::ports::{DirectoryPort, RoutePort, SchedulePort};
use um_core::session::{CameraPort, CaptureConfig, NavigationSession, ScanSession, SearchSession};
use um_map::FloorMapView;
use um_ui::{
    apply_theme, ControlsPanel, FloorSwitcher, ScannerDialog, SearchPanel, Theme, Toast,
    ToastStack, UiContext,
};

mod camera;
mod config;
mod demo;

use config::AppConfig;

/// Start value carried by the demo camera's QR payload.
const DEMO_SCAN_PAYLOAD: &str = "Gate-1";

struct UniMapApp {
    ui_ctx: UiContext,
    controls: ControlsPanel,
    search_panel: SearchPanel,
    scanner: ScannerDialog,
    floor_switcher: FloorSwitcher,
    map_view: FloorMapView,
    toasts: ToastStack,

    /// Tokio runtime backing all outbound requests; owned by the app so it
    /// lives as long as the window.
    _runtime: tokio::runtime::Runtime,
}

impl UniMapApp {
    fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, demo: bool) -> Result<Self> {
        apply_theme(&cc.egui_ctx, &Theme::default());

        let runtime = tokio::runtime::Runtime::new()?;

        let (directory, route_port, schedule, camera): (
            Arc<dyn DirectoryPort>,
            Arc<dyn RoutePort>,
            Arc<dyn SchedulePort>,
            Arc<dyn CameraPort>,
        ) = if demo {
            info!("demo mode: using the built-in campus dataset");
            let campus = Arc::new(demo::DemoCampus::new());
            let camera = Arc::new(demo::DemoCamera::new(
                runtime.handle().clone(),
                DEMO_SCAN_PAYLOAD,
            ));
            (campus.clone(), campus.clone(), campus, camera)
        } else {
            let api = Arc::new(CampusApi::new(&config.api)?);
            (
                api.clone(),
                api.clone(),
                api,
                Arc::new(camera::SystemCamera::default()),
            )
        };

        let events = Arc::new(EventBus::new());
        let nav = Arc::new(NavigationSession::new(
            route_port,
            schedule.clone(),
            events.clone(),
        ));
        let search = Arc::new(SearchSession::new());
        let scan = ScanSession::new(CaptureConfig::default(), events.clone());
        let toasts = ToastStack::new();

        // Failure notices surface as toasts.
        {
            let sink = toasts.clone();
            events.subscribe::<RouteFailed>(handler_from_fn(move |event| {
                if let Some(e) = event.as_any().downcast_ref::<RouteFailed>() {
                    sink.push(Toast::new("Navigation failed", e.message.clone()));
                }
            }));
        }
        {
            let sink = toasts.clone();
            events.subscribe::<DirectoryFailed>(handler_from_fn(move |event| {
                if let Some(e) = event.as_any().downcast_ref::<DirectoryFailed>() {
                    sink.push(Toast::new("Directory unavailable", e.message.clone()));
                }
            }));
        }
        // The scan session publishes its accepted decode; it never touches
        // the navigation session directly.
        {
            let nav = nav.clone();
            let repaint = cc.egui_ctx.clone();
            events.subscribe::<ScanCaptured>(handler_from_fn(move |event| {
                if let Some(e) = event.as_any().downcast_ref::<ScanCaptured>() {
                    nav.set_start(e.value.clone());
                    repaint.request_repaint();
                }
            }));
        }

        // Fetch the node directory once at startup.
        {
            let nav = nav.clone();
            let directory = directory.clone();
            let events = events.clone();
            let repaint = cc.egui_ctx.clone();
            runtime.spawn(async move {
                match directory.nodes().await {
                    Ok(nodes) => nav.load_directory(nodes),
                    Err(err) => {
                        warn!(error = %err, "directory fetch failed");
                        events.publish(DirectoryFailed {
                            message: "Could not load the campus directory.".to_string(),
                        });
                    }
                }
                repaint.request_repaint();
            });
        }

        let ui_ctx = UiContext {
            nav,
            search,
            scan,
            schedule,
            camera,
            runtime: runtime.handle().clone(),
            egui_ctx: cc.egui_ctx.clone(),
        };

        Ok(Self {
            ui_ctx,
            controls: ControlsPanel::new(),
            search_panel: SearchPanel::new(),
            scanner: ScannerDialog::new(),
            floor_switcher: FloorSwitcher::new(config.floor_labels.clone()),
            map_view: FloorMapView::new(config.assets_dir.clone()),
            toasts,
            _runtime: runtime,
        })
    }
}

impl eframe::App for UniMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let snapshot = self.ui_ctx.nav.snapshot();

        egui::SidePanel::left("controls")
            .resizable(false)
            .min_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.controls.ui(ui, &self.ui_ctx, &snapshot);
                    ui.add_space(12.0);
                    ui.separator();
                    self.search_panel.ui(ui, &self.ui_ctx);
                    ui.add_space(12.0);
                    ui.separator();
                    if ui.button("Scan QR code").clicked() {
                        self.scanner.open();
                    }
                });
            });

        egui::TopBottomPanel::bottom("floor_bar").show(ctx, |ui| {
            if self.floor_switcher.ui(ui, &self.ui_ctx, snapshot.floor) {
                self.map_view.reset_view();
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.map_view.ui(
                ui,
                snapshot.floor,
                snapshot.route.as_ref(),
                snapshot.route_epoch,
            );
        });

        self.scanner.ui(ctx, &self.ui_ctx);
        self.toasts.ui(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Hosting view teardown: release the camera if a scan is live.
        self.ui_ctx.scan.stop();
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = AppConfig::load();
    let demo = config.demo || std::env::args().any(|arg| arg == "--demo");
    info!(demo, "starting UniMap");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        default_theme: eframe::Theme::Light,
        ..Default::default()
    };

    eframe::run_native(
        "UniMap",
        options,
        Box::new(move |cc| {
            let app = UniMapApp::new(cc, config, demo).expect("failed to initialize UniMap");
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("failed to run app: {e}"))?;

    Ok(())
}
