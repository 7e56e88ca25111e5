//! Camera devices

use um_core::session::{CameraError, CameraFeed, CameraPort, CaptureConfig, FrameSink};

/// Device used outside demo mode.
///
/// No capture backend is wired on desktop builds yet, so acquisition fails
/// fast into the scanner's inline error path instead of hanging.
#[derive(Default)]
pub struct SystemCamera;

impl CameraPort for SystemCamera {
    fn acquire(
        &self,
        _config: &CaptureConfig,
        _sink: FrameSink,
    ) -> Result<Box<dyn CameraFeed>, CameraError> {
        Err(CameraError::Unavailable(
            "no capture backend on this platform".to_string(),
        ))
    }
}
