//! Floor-map rendering for the UniMap client
//!
//! Turns a flat, floor-tagged waypoint sequence into per-floor polylines
//! and draws them over the floor's raster map under a pan/zoom transform.

mod floor_view;
pub mod segment;
pub mod viewport;

pub use floor_view::FloorMapView;
pub use segment::{drawable_segments, segment_length, segments_for_floor, Segment};
pub use viewport::ViewportTransform;
