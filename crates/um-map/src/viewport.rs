//! Pan/zoom transform for the floor-map surface

use egui::{pos2, Pos2, Vec2};

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 4.0;
const ZOOM_SENSITIVITY: f32 = 0.001;

/// Pan/zoom state for the map surface.
///
/// One transform serves every floor: switching floors keeps the current
/// pan/zoom so the view does not jump. Zoom is anchored at the map origin
/// rather than the pointer; that is the intended behavior, not an
/// oversight.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportTransform {
    scale: f32,
    offset: Vec2,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl ViewportTransform {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Apply wheel input. Positive `delta_y` zooms out; the scale saturates
    /// at the clamp bounds. Returns the new scale.
    pub fn zoom(&mut self, delta_y: f32) -> f32 {
        self.scale = (self.scale - delta_y * ZOOM_SENSITIVITY).clamp(MIN_SCALE, MAX_SCALE);
        self.scale
    }

    /// Accumulate a drag delta. Only called while a drag gesture is held.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Map a point from map-image space to surface space.
    pub fn to_screen(&self, point: Pos2) -> Pos2 {
        pos2(
            point.x * self.scale + self.offset.x,
            point.y * self.scale + self.offset.y,
        )
    }

    /// Back to the identity view. Only invoked explicitly, never on a floor
    /// switch.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
