//! Core session engine for the UniMap campus-navigation client
//!
//! This crate holds the data model, the port traits behind which the
//! external collaborators live (routing service, schedule service, camera),
//! and the three session state machines: navigation, schedule search, and
//! QR capture. No I/O happens here; the app crate wires the ports in.

pub mod events;
pub mod model;
pub mod ports;
pub mod session;

// Re-export commonly used types
pub use model::{
    Node, NodeKind, Occupancy, OccupancyDetails, OccupancyStatus, Route, RouteStats, SearchHit,
    TravelMode, Waypoint,
};
pub use ports::{DirectoryPort, RoutePort, SchedulePort};
pub use session::{
    CameraError, CameraFacing, CameraFeed, CameraPort, CaptureConfig, DecodeAttempt, FrameSink,
    NavigationSession, NavigationSnapshot, ScanPhase, ScanSession, SearchSession, SearchSnapshot,
};
