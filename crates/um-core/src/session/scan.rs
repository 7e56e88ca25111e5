//! QR capture session
//!
//! Owns the exclusive camera resource for the duration of a scan and
//! accepts at most one decode per session. The camera itself and the QR
//! decoder are a black box behind [`CameraPort`]: the device delivers a
//! stream of per-frame decode attempts into the sink handed to `acquire`.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::events::events::ScanCaptured;
use crate::events::EventBus;

/// Capture session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Scanning,
    Captured,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraFacing {
    Environment,
    User,
}

/// Capture parameters handed to the device on acquisition.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub facing: CameraFacing,
    /// Target decode attempts per second.
    pub fps: u32,
    /// Detection region, in device pixels.
    pub detection_box: (u32, u32),
    /// How long the success confirmation stays up before the session
    /// closes itself.
    pub auto_close_delay: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            facing: CameraFacing::Environment,
            fps: 10,
            detection_box: (250, 250),
            auto_close_delay: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("camera access denied: {0}")]
    Denied(String),
    #[error("no camera available: {0}")]
    Unavailable(String),
    #[error("camera is already in use")]
    Busy,
}

/// One per-frame decode attempt from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeAttempt {
    /// No code in view this frame; the expected steady state.
    NoCode,
    Decoded(String),
}

/// Where the device delivers decode attempts.
pub type FrameSink = Arc<dyn Fn(DecodeAttempt) + Send + Sync>;

/// Device boundary granting exclusive access to a capture feed.
///
/// At most one feed may be live at a time; a device that cannot grant
/// access fails fast instead of queueing. Frames must be delivered
/// asynchronously, never from inside `acquire`.
pub trait CameraPort: Send + Sync {
    fn acquire(
        &self,
        config: &CaptureConfig,
        sink: FrameSink,
    ) -> Result<Box<dyn CameraFeed>, CameraError>;
}

/// A live camera feed. `shut_down` stops frame delivery and releases the
/// device; it must be idempotent.
pub trait CameraFeed: Send {
    fn shut_down(&mut self);
}

struct ScanState {
    phase: ScanPhase,
    feed: Option<Box<dyn CameraFeed>>,
    result: Option<String>,
    error: Option<String>,
    close_at: Option<Instant>,
}

/// One-shot QR capture session.
pub struct ScanSession {
    state: Mutex<ScanState>,
    config: CaptureConfig,
    events: Arc<EventBus>,
    /// Self-reference handed to the device so the frame stream cannot keep
    /// a dead session alive.
    weak: Weak<ScanSession>,
}

impl ScanSession {
    pub fn new(config: CaptureConfig, events: Arc<EventBus>) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            state: Mutex::new(ScanState {
                phase: ScanPhase::Idle,
                feed: None,
                result: None,
                error: None,
                close_at: None,
            }),
            config,
            events,
            weak: weak.clone(),
        })
    }

    pub fn phase(&self) -> ScanPhase {
        self.state.lock().phase
    }

    /// The accepted decode, kept around for the success confirmation.
    pub fn result(&self) -> Option<String> {
        self.state.lock().result.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Acquire the camera and begin the per-frame decode stream.
    pub fn start(&self, camera: &dyn CameraPort) {
        let mut s = self.state.lock();
        if matches!(s.phase, ScanPhase::Scanning | ScanPhase::Captured) {
            return;
        }
        s.error = None;
        s.result = None;
        s.close_at = None;

        let weak = self.weak.clone();
        let sink: FrameSink = Arc::new(move |attempt| {
            if let Some(session) = weak.upgrade() {
                session.on_frame(attempt);
            }
        });

        match camera.acquire(&self.config, sink) {
            Ok(feed) => {
                s.feed = Some(feed);
                s.phase = ScanPhase::Scanning;
                info!(fps = self.config.fps, "camera feed opened");
            }
            Err(err) => {
                warn!(error = %err, "camera acquisition failed");
                s.error = Some(err.to_string());
                s.phase = ScanPhase::Error;
            }
        }
    }

    /// Handle one decode attempt from the device.
    pub fn on_frame(&self, attempt: DecodeAttempt) {
        // Failed per-frame decodes are the steady state while no code is in
        // view; they are not errors.
        let text = match attempt {
            DecodeAttempt::Decoded(text) => text,
            DecodeAttempt::NoCode => return,
        };
        let value = {
            let mut s = self.state.lock();
            // One accepted decode per session.
            if s.phase != ScanPhase::Scanning || s.result.is_some() {
                return;
            }
            let value = text.trim().to_string();
            s.result = Some(value.clone());
            s.phase = ScanPhase::Captured;
            s.close_at = Some(Instant::now() + self.config.auto_close_delay);
            value
        };
        info!(value = %value, "QR code captured");
        self.events.publish(ScanCaptured { value });
    }

    /// Drive the scheduled auto-close from the frame loop.
    ///
    /// Returns true when this call closed the session.
    pub fn tick(&self) -> bool {
        let due = {
            let s = self.state.lock();
            s.phase == ScanPhase::Captured
                && s.close_at.map_or(false, |at| Instant::now() >= at)
        };
        if due {
            self.stop();
        }
        due
    }

    /// Release the camera unconditionally. Safe from any phase; a second
    /// call is a no-op.
    pub fn stop(&self) {
        let feed = {
            let mut s = self.state.lock();
            s.close_at = None;
            if s.phase != ScanPhase::Error {
                s.phase = ScanPhase::Idle;
            }
            s.feed.take()
        };
        // Shut down outside the lock: the device may block until its frame
        // thread, which can be inside on_frame, has finished.
        if let Some(mut feed) = feed {
            feed.shut_down();
            debug!("camera feed released");
        }
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        if let Some(mut feed) = self.state.get_mut().feed.take() {
            feed.shut_down();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::handler_from_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TestCamera {
        deny: bool,
        sink: Mutex<Option<FrameSink>>,
        acquires: AtomicUsize,
        releases: Arc<AtomicUsize>,
    }

    impl TestCamera {
        fn new(deny: bool) -> Self {
            Self {
                deny,
                sink: Mutex::new(None),
                acquires: AtomicUsize::new(0),
                releases: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn feed(&self, attempt: DecodeAttempt) {
            let sink = self.sink.lock().clone().expect("no live feed");
            (*sink)(attempt);
        }

        fn releases(&self) -> usize {
            self.releases.load(Ordering::SeqCst)
        }
    }

    impl CameraPort for TestCamera {
        fn acquire(
            &self,
            _config: &CaptureConfig,
            sink: FrameSink,
        ) -> Result<Box<dyn CameraFeed>, CameraError> {
            self.acquires.fetch_add(1, Ordering::SeqCst);
            if self.deny {
                return Err(CameraError::Denied("permission dismissed".to_string()));
            }
            *self.sink.lock() = Some(sink);
            Ok(Box::new(TestFeed {
                released: self.releases.clone(),
                down: false,
            }))
        }
    }

    struct TestFeed {
        released: Arc<AtomicUsize>,
        down: bool,
    }

    impl CameraFeed for TestFeed {
        fn shut_down(&mut self) {
            if !self.down {
                self.down = true;
                self.released.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn scan_session(delay: Duration) -> (Arc<ScanSession>, Arc<EventBus>, Arc<Mutex<Vec<String>>>) {
        let events = Arc::new(EventBus::new());
        let published = Arc::new(Mutex::new(Vec::new()));
        let sink = published.clone();
        events.subscribe::<ScanCaptured>(handler_from_fn(move |event| {
            if let Some(e) = event.as_any().downcast_ref::<ScanCaptured>() {
                sink.lock().push(e.value.clone());
            }
        }));
        let config = CaptureConfig {
            auto_close_delay: delay,
            ..CaptureConfig::default()
        };
        (ScanSession::new(config, events.clone()), events, published)
    }

    #[test]
    fn first_decode_wins_and_is_trimmed() {
        let camera = TestCamera::new(false);
        let (session, _events, published) = scan_session(Duration::from_secs(5));

        session.start(&camera);
        assert_eq!(session.phase(), ScanPhase::Scanning);

        camera.feed(DecodeAttempt::NoCode);
        assert_eq!(session.phase(), ScanPhase::Scanning);

        camera.feed(DecodeAttempt::Decoded("  A101  ".to_string()));
        assert_eq!(session.phase(), ScanPhase::Captured);
        assert_eq!(session.result().as_deref(), Some("A101"));

        // A second decode before the scheduled close changes nothing.
        camera.feed(DecodeAttempt::Decoded("B202".to_string()));
        assert_eq!(session.result().as_deref(), Some("A101"));
        assert_eq!(published.lock().as_slice(), ["A101"]);
    }

    #[test]
    fn stop_releases_the_camera_exactly_once() {
        let camera = TestCamera::new(false);
        let (session, _events, _published) = scan_session(Duration::from_secs(5));

        session.start(&camera);
        session.stop();
        session.stop();

        assert_eq!(camera.releases(), 1);
        assert_eq!(session.phase(), ScanPhase::Idle);
    }

    #[test]
    fn denied_camera_surfaces_an_error_and_stays_closable() {
        let camera = TestCamera::new(true);
        let (session, _events, _published) = scan_session(Duration::from_secs(5));

        session.start(&camera);
        assert_eq!(session.phase(), ScanPhase::Error);
        assert!(session.error().unwrap().contains("denied"));

        session.stop();
        assert_eq!(camera.releases(), 0);
        assert_eq!(session.phase(), ScanPhase::Error);
    }

    #[test]
    fn capture_auto_closes_after_the_configured_delay() {
        let camera = TestCamera::new(false);
        let (session, _events, _published) = scan_session(Duration::ZERO);

        session.start(&camera);
        camera.feed(DecodeAttempt::Decoded("Gate-1".to_string()));
        assert_eq!(session.phase(), ScanPhase::Captured);

        assert!(session.tick());
        assert_eq!(session.phase(), ScanPhase::Idle);
        assert_eq!(camera.releases(), 1);
        // The confirmation value survives the close.
        assert_eq!(session.result().as_deref(), Some("Gate-1"));
        assert!(!session.tick());
    }

    #[test]
    fn start_while_live_is_a_no_op() {
        let camera = TestCamera::new(false);
        let (session, _events, _published) = scan_session(Duration::from_secs(5));

        session.start(&camera);
        session.start(&camera);
        assert_eq!(camera.acquires.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_the_session_releases_the_feed() {
        let camera = TestCamera::new(false);
        let (session, _events, _published) = scan_session(Duration::from_secs(5));

        session.start(&camera);
        drop(session);
        assert_eq!(camera.releases(), 1);
    }
}
