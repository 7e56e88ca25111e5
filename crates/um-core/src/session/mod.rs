//! Session state machines
//!
//! Each interactive workflow owns its own state struct and mutates it only
//! through its own operations: the navigation session (start/end/mode/floor
//! selection and the route it produced), the schedule search session, and
//! the camera-backed QR capture session.

mod navigation;
mod scan;
mod search;

pub use navigation::{NavigationSession, NavigationSnapshot};
pub use scan::{
    CameraError, CameraFacing, CameraFeed, CameraPort, CaptureConfig, DecodeAttempt, FrameSink,
    ScanPhase, ScanSession,
};
pub use search::{SearchSession, SearchSnapshot};
