//! Floor map canvas
//!
//! Draws the active floor's raster map under the pan/zoom transform, then
//! overlays the route polylines and the start/end markers. Map images are
//! loaded once per floor and cached as textures; a missing image falls back
//! to a placeholder surface instead of failing the view.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context as _;
use egui::{
    pos2, vec2, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, TextureHandle,
    TextureOptions, Ui,
};
use tracing::warn;

use um_core::model::{Route, Waypoint};

use crate::segment::{drawable_segments, segment_length, segments_for_floor, Segment};
use crate::viewport::ViewportTransform;

const ROUTE_COLOR: Color32 = Color32::from_rgb(59, 130, 246);
const START_COLOR: Color32 = Color32::from_rgb(34, 197, 94);
const END_COLOR: Color32 = Color32::from_rgb(239, 68, 68);
const SURFACE_COLOR: Color32 = Color32::from_rgb(243, 244, 246);
const PLACEHOLDER_SIZE: egui::Vec2 = egui::Vec2 { x: 800.0, y: 600.0 };

/// Map-space pixels of route drawn in per second.
const DRAW_IN_SPEED: f64 = 600.0;

pub struct FloorMapView {
    assets_dir: PathBuf,
    transform: ViewportTransform,
    /// Texture per floor; `None` marks a failed load so it is not retried
    /// every frame.
    textures: HashMap<u32, Option<TextureHandle>>,
    route_epoch: u64,
    animation_started: Option<Instant>,
}

impl FloorMapView {
    pub fn new(assets_dir: PathBuf) -> Self {
        Self {
            assets_dir,
            transform: ViewportTransform::default(),
            textures: HashMap::new(),
            route_epoch: 0,
            animation_started: None,
        }
    }

    /// Explicit reset of pan/zoom. Floor switches never call this.
    pub fn reset_view(&mut self) {
        self.transform.reset();
    }

    pub fn ui(&mut self, ui: &mut Ui, floor: u32, route: Option<&Route>, route_epoch: u64) {
        if route.is_none() {
            self.animation_started = None;
            self.route_epoch = route_epoch;
        } else if route_epoch != self.route_epoch {
            self.route_epoch = route_epoch;
            self.animation_started = Some(Instant::now());
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        if response.dragged() {
            self.transform.pan_by(response.drag_delta());
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.scroll_delta.y);
            if scroll != 0.0 {
                // Wheel-up means zoom in; the transform expects the browser
                // sign convention where positive delta zooms out.
                self.transform.zoom(-scroll);
            }
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, SURFACE_COLOR);

        match self.texture_for(ui.ctx(), floor) {
            Some(texture) => {
                let top_left = self.to_surface(rect.min, pos2(0.0, 0.0));
                let size = texture.size_vec2() * self.transform.scale();
                painter.image(
                    texture.id(),
                    Rect::from_min_size(top_left, size),
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            None => self.paint_placeholder(&painter, rect.min, floor),
        }

        if let Some(route) = route {
            self.paint_route(&painter, rect.min, floor, route);
        }

        painter.text(
            rect.right_bottom() - vec2(10.0, 8.0),
            Align2::RIGHT_BOTTOM,
            "Scroll to zoom, drag to pan",
            FontId::proportional(12.0),
            Color32::from_gray(130),
        );
    }

    fn to_surface(&self, origin: Pos2, point: Pos2) -> Pos2 {
        origin + self.transform.to_screen(point).to_vec2()
    }

    fn waypoint_pos(&self, origin: Pos2, waypoint: &Waypoint) -> Pos2 {
        self.to_surface(origin, pos2(waypoint.x as f32, waypoint.y as f32))
    }

    fn paint_placeholder(&self, painter: &egui::Painter, origin: Pos2, floor: u32) {
        let top_left = self.to_surface(origin, pos2(0.0, 0.0));
        let rect = Rect::from_min_size(top_left, PLACEHOLDER_SIZE * self.transform.scale());
        painter.rect_filled(rect, 4.0, Color32::from_gray(225));
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            format!("Floor {floor} map not found"),
            FontId::proportional(16.0 * self.transform.scale()),
            Color32::from_gray(110),
        );
    }

    fn paint_route(&self, painter: &egui::Painter, origin: Pos2, floor: u32, route: &Route) {
        let segments = segments_for_floor(route, floor);
        let scale = self.transform.scale();

        if route.waypoints.len() >= 2 && !segments.is_empty() {
            let drawable = drawable_segments(&segments);
            let total: f64 = drawable.iter().map(|s| segment_length(s)).sum();
            let progress = self.animation_progress(painter.ctx(), total);
            let mut remaining = total * f64::from(progress);
            let stroke = Stroke::new(6.0 * scale, ROUTE_COLOR);

            for segment in drawable {
                if segment.points.len() < 2 {
                    continue;
                }
                let points = self.clip_segment(origin, segment, &mut remaining);
                if points.len() >= 2 {
                    painter.add(Shape::line(points, stroke));
                }
                if remaining <= 0.0 {
                    break;
                }
            }
        }

        // Start/end markers belong to the route's true endpoints, singleton
        // segments included.
        if let Some(first) = route.waypoints.first() {
            if first.floor == floor {
                self.paint_marker(painter, self.waypoint_pos(origin, first), START_COLOR);
            }
        }
        if let Some(last) = route.waypoints.last() {
            if last.floor == floor {
                self.paint_marker(painter, self.waypoint_pos(origin, last), END_COLOR);
            }
        }
    }

    /// Screen points of the segment, truncated to the remaining
    /// draw-in length (map-space).
    fn clip_segment(&self, origin: Pos2, segment: &Segment, remaining: &mut f64) -> Vec<Pos2> {
        let mut points = vec![self.waypoint_pos(origin, &segment.points[0])];
        for pair in segment.points.windows(2) {
            if *remaining <= 0.0 {
                break;
            }
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            let length = (dx * dx + dy * dy).sqrt();
            if length <= *remaining {
                points.push(self.waypoint_pos(origin, &pair[1]));
                *remaining -= length;
            } else {
                let t = if length > 0.0 { *remaining / length } else { 1.0 };
                let partial = Waypoint {
                    x: pair[0].x + dx * t,
                    y: pair[0].y + dy * t,
                    floor: pair[0].floor,
                };
                points.push(self.waypoint_pos(origin, &partial));
                *remaining = 0.0;
            }
        }
        points
    }

    fn paint_marker(&self, painter: &egui::Painter, center: Pos2, fill: Color32) {
        let scale = self.transform.scale();
        painter.circle(
            center,
            8.0 * scale,
            fill,
            Stroke::new(3.0 * scale, Color32::WHITE),
        );
    }

    fn animation_progress(&self, ctx: &egui::Context, total_length: f64) -> f32 {
        let Some(started) = self.animation_started else {
            return 1.0;
        };
        let duration = (total_length / DRAW_IN_SPEED).clamp(0.6, 3.0);
        let t = started.elapsed().as_secs_f64() / duration;
        if t >= 1.0 {
            1.0
        } else {
            ctx.request_repaint();
            t as f32
        }
    }

    fn texture_for(&mut self, ctx: &egui::Context, floor: u32) -> Option<TextureHandle> {
        if let Some(slot) = self.textures.get(&floor) {
            return slot.clone();
        }
        let handle = match load_floor_image(&self.assets_dir, floor) {
            Ok(image) => {
                Some(ctx.load_texture(format!("floor-{floor}"), image, TextureOptions::LINEAR))
            }
            Err(err) => {
                warn!(floor, error = %err, "floor map image unavailable, using placeholder");
                None
            }
        };
        self.textures.insert(floor, handle.clone());
        handle
    }
}

fn load_floor_image(assets_dir: &Path, floor: u32) -> anyhow::Result<egui::ColorImage> {
    let path = assets_dir.join(format!("floor_{floor}.jpg"));
    let bytes =
        std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let rgba = image::load_from_memory(&bytes)
        .with_context(|| format!("decoding {}", path.display()))?
        .to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}
