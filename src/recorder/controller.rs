//! Recording controller
//!
//! Owns the lifecycle state machine, the frame counter, and the open
//! encoder sink. All per-tick work funnels through here, which makes the
//! per-frame step and the idle-preview step mutually exclusive at the
//! call site: whoever holds the controller runs exactly one of them.

use crate::capture::traits::{CaptureProvider, Frame};
use crate::encoder::codec::resolve_output_path;
use crate::encoder::sink::{EncoderBackend, FrameSink, SinkSpec};
use crate::recorder::state::{
    RecordingState, RecordingSummary, SessionConfig, Status, PREVIEW_HEIGHT, PREVIEW_WIDTH,
};
use crate::utils::error::{RecordingError, RecordingResult};
use std::path::PathBuf;

/// Returned by start/resume so the caller can schedule the capture loop.
#[derive(Debug, Clone)]
pub struct StartedRecording {
    /// Resolved output path (canonical extension applied)
    pub path: PathBuf,
    /// Frame rate the capture timer should tick at
    pub fps: u32,
    /// Epoch the capture loop belongs to
    pub epoch: u64,
}

struct ActiveSession {
    config: SessionConfig,
    path: PathBuf,
    sink: Box<dyn FrameSink>,
}

pub struct RecordingController {
    capture: Box<dyn CaptureProvider>,
    backend: Box<dyn EncoderBackend>,
    state: RecordingState,
    frame_count: u64,
    /// Bumped on every start and resume; stale capture loops compare their
    /// remembered epoch against this and exit on mismatch.
    epoch: u64,
    session: Option<ActiveSession>,
    status: Status,
}

impl RecordingController {
    pub fn new(capture: Box<dyn CaptureProvider>, backend: Box<dyn EncoderBackend>) -> Self {
        Self {
            capture,
            backend,
            state: RecordingState::Idle,
            frame_count: 0,
            epoch: 0,
            session: None,
            status: Status::Ready,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn status(&self) -> Status {
        self.status.clone()
    }

    pub fn status_text(&self) -> String {
        self.status.text()
    }

    /// Start a recording: open the sink, reset the counter, enter Recording.
    ///
    /// An encoder-open failure is surfaced without changing state and
    /// without leaving a partial file behind.
    pub fn start(&mut self, config: SessionConfig) -> RecordingResult<StartedRecording> {
        if self.state != RecordingState::Idle {
            return Err(RecordingError::AlreadyRecording);
        }
        config.validate()?;

        let path = resolve_output_path(&config.output_path, config.codec);
        let spec = SinkSpec {
            path: path.clone(),
            codec: config.codec,
            fps: config.fps,
            width: config.width,
            height: config.height,
        };

        let sink = match self.backend.open(&spec) {
            Ok(sink) => sink,
            Err(e) => {
                self.status = Status::Failed {
                    message: e.to_string(),
                };
                return Err(e);
            }
        };

        tracing::info!("Recording to {}", path.display());
        self.frame_count = 0;
        self.epoch += 1;
        self.state = RecordingState::Recording;
        self.status = Status::Recording {
            path: path.display().to_string(),
        };
        let fps = config.fps;
        self.session = Some(ActiveSession { config, path: path.clone(), sink });

        Ok(StartedRecording {
            path,
            fps,
            epoch: self.epoch,
        })
    }

    /// Pause: the capture loop observes the state change and exits; the
    /// sink stays open and the counter is untouched.
    pub fn pause(&mut self) -> RecordingResult<()> {
        if self.state != RecordingState::Recording {
            return Err(RecordingError::NotRecording);
        }
        self.state = RecordingState::Paused;
        self.status = Status::Paused {
            frame_count: self.frame_count,
        };
        tracing::info!("Recording paused at {} frames", self.frame_count);
        Ok(())
    }

    /// Resume from pause without reopening the sink or resetting the counter.
    pub fn resume(&mut self) -> RecordingResult<StartedRecording> {
        if self.state != RecordingState::Paused {
            return Err(RecordingError::NotRecording);
        }
        let session = self
            .session
            .as_ref()
            .ok_or(RecordingError::NotRecording)?;
        self.epoch += 1;
        self.state = RecordingState::Recording;
        self.status = Status::Recording {
            path: session.path.display().to_string(),
        };
        tracing::info!("Recording resumed at {} frames", self.frame_count);
        Ok(StartedRecording {
            path: session.path.clone(),
            fps: session.config.fps,
            epoch: self.epoch,
        })
    }

    /// Stop: finalize and release the sink, report the final count, reset.
    /// Stopping while idle is a no-op.
    pub fn stop(&mut self) -> RecordingResult<Option<RecordingSummary>> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        let summary = RecordingSummary {
            output_path: session.path.display().to_string(),
            frame_count: self.frame_count,
        };
        self.state = RecordingState::Idle;
        self.frame_count = 0;

        match session.sink.finish() {
            Ok(()) => {
                self.status = Status::Saved {
                    frame_count: summary.frame_count,
                };
                tracing::info!(
                    "Recording saved: {} ({} frames)",
                    summary.output_path,
                    summary.frame_count
                );
                Ok(Some(summary))
            }
            Err(e) => {
                self.status = Status::Failed {
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Toggle the live preview copy for the active session.
    pub fn set_show_preview(&mut self, show: bool) {
        if let Some(session) = self.session.as_mut() {
            session.config.show_preview = show;
        }
    }

    /// Per-frame step: capture, resize to the configured resolution, write
    /// to the sink, bump the counter. Returns the preview copy when preview
    /// is enabled.
    ///
    /// A stale tick firing after stop or pause finds no open sink in the
    /// Recording state and does nothing. Capture or write failures trigger
    /// the fail-safe shutdown, preserving the partially written file.
    pub fn tick_frame(&mut self) -> RecordingResult<Option<Frame>> {
        if self.state != RecordingState::Recording || self.session.is_none() {
            return Ok(None);
        }

        let frame = match self.capture.capture() {
            Ok(frame) => frame,
            Err(e) => {
                self.fail_safe(&e);
                return Err(e);
            }
        };

        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };
        let resized = frame.resized(session.config.width, session.config.height);
        let show_preview = session.config.show_preview;

        if let Err(e) = session.sink.write_frame(&resized) {
            self.fail_safe(&e);
            return Err(e);
        }
        self.frame_count += 1;

        if show_preview {
            Ok(Some(resized.resized(PREVIEW_WIDTH, PREVIEW_HEIGHT)))
        } else {
            Ok(None)
        }
    }

    /// Idle-preview step: capture and resize for the preview surface, never
    /// touching the sink. Skipped while Recording, because the per-frame
    /// step supplies its own preview copy.
    pub fn tick_preview(&mut self) -> RecordingResult<Option<Frame>> {
        if self.state == RecordingState::Recording {
            return Ok(None);
        }
        let frame = self.capture.capture()?;
        Ok(Some(frame.resized(PREVIEW_WIDTH, PREVIEW_HEIGHT)))
    }

    /// Fail-safe shutdown after a per-frame failure: finalize the sink so
    /// the frames written so far stay playable, reset to Idle, and report
    /// the failure (never "saved").
    fn fail_safe(&mut self, error: &RecordingError) {
        tracing::error!("Per-frame step failed, shutting recording down: {}", error);
        if let Some(session) = self.session.take() {
            if let Err(finish_err) = session.sink.finish() {
                tracing::warn!("Finalizing partial recording failed: {}", finish_err);
            }
        }
        self.state = RecordingState::Idle;
        self.frame_count = 0;
        self.status = Status::Failed {
            message: error.to_string(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::codec::Codec;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Capture provider yielding solid frames at a fixed native size,
    /// optionally failing after N successful captures.
    struct MockCapture {
        native: (u32, u32),
        captures: u64,
        fail_after: Option<u64>,
    }

    impl MockCapture {
        fn new(width: u32, height: u32) -> Self {
            Self {
                native: (width, height),
                captures: 0,
                fail_after: None,
            }
        }

        fn failing_after(width: u32, height: u32, ok_captures: u64) -> Self {
            Self {
                native: (width, height),
                captures: 0,
                fail_after: Some(ok_captures),
            }
        }
    }

    impl CaptureProvider for MockCapture {
        fn capture(&mut self) -> RecordingResult<Frame> {
            if let Some(limit) = self.fail_after {
                if self.captures >= limit {
                    return Err(RecordingError::Capture("display went away".to_string()));
                }
            }
            self.captures += 1;
            let (w, h) = self.native;
            Frame::from_raw(w, h, vec![0x7F; (w * h * 4) as usize])
        }
    }

    #[derive(Default)]
    struct SinkLog {
        opened_spec: Option<SinkSpec>,
        frames: Vec<(u32, u32)>,
        finished: bool,
    }

    struct MockSink {
        log: Arc<Mutex<SinkLog>>,
        fail_writes: bool,
    }

    impl FrameSink for MockSink {
        fn write_frame(&mut self, frame: &Frame) -> RecordingResult<()> {
            if self.fail_writes {
                return Err(RecordingError::EncodeWrite("pipe closed".to_string()));
            }
            let mut log = self.log.lock();
            assert!(!log.finished, "write after finish");
            log.frames.push((frame.width(), frame.height()));
            Ok(())
        }

        fn finish(self: Box<Self>) -> RecordingResult<()> {
            self.log.lock().finished = true;
            Ok(())
        }
    }

    struct MockBackend {
        log: Arc<Mutex<SinkLog>>,
        fail_open: bool,
        fail_writes: bool,
    }

    impl MockBackend {
        fn new() -> (Self, Arc<Mutex<SinkLog>>) {
            let log = Arc::new(Mutex::new(SinkLog::default()));
            (
                Self {
                    log: Arc::clone(&log),
                    fail_open: false,
                    fail_writes: false,
                },
                log,
            )
        }
    }

    impl EncoderBackend for MockBackend {
        fn open(&self, spec: &SinkSpec) -> RecordingResult<Box<dyn FrameSink>> {
            if self.fail_open {
                return Err(RecordingError::EncoderOpen("unwritable".to_string()));
            }
            self.log.lock().opened_spec = Some(spec.clone());
            Ok(Box::new(MockSink {
                log: Arc::clone(&self.log),
                fail_writes: self.fail_writes,
            }))
        }
    }

    fn config() -> SessionConfig {
        SessionConfig {
            output_path: "demo".to_string(),
            width: 1440,
            height: 900,
            fps: 30,
            codec: Codec::Mp4v,
            show_preview: true,
        }
    }

    fn controller_with(
        capture: MockCapture,
        backend: MockBackend,
    ) -> RecordingController {
        RecordingController::new(Box::new(capture), Box::new(backend))
    }

    #[test]
    fn start_opens_sink_at_canonical_path() {
        let (backend, log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::new(1920, 1080), backend);

        let started = ctl.start(config()).unwrap();
        assert_eq!(started.path, PathBuf::from("demo.mp4"));
        assert_eq!(started.fps, 30);
        assert_eq!(ctl.state(), RecordingState::Recording);

        let spec = log.lock().opened_spec.clone().unwrap();
        assert_eq!(spec.path, PathBuf::from("demo.mp4"));
        assert_eq!((spec.width, spec.height, spec.fps), (1440, 900, 30));
    }

    #[test]
    fn frames_are_resized_to_configured_resolution() {
        let (backend, log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::new(2560, 1440), backend);
        ctl.start(config()).unwrap();

        for _ in 0..3 {
            ctl.tick_frame().unwrap();
        }
        let log = log.lock();
        assert_eq!(log.frames.len(), 3);
        assert!(log.frames.iter().all(|&dims| dims == (1440, 900)));
    }

    #[test]
    fn frame_count_matches_successful_ticks() {
        let (backend, _log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::new(1920, 1080), backend);
        ctl.start(config()).unwrap();

        for _ in 0..90 {
            ctl.tick_frame().unwrap();
        }
        assert_eq!(ctl.frame_count(), 90);

        let summary = ctl.stop().unwrap().unwrap();
        assert_eq!(summary.frame_count, 90);
        assert_eq!(summary.output_path, "demo.mp4");
        assert_eq!(ctl.frame_count(), 0);
    }

    #[test]
    fn pause_and_resume_preserve_the_count() {
        let (backend, log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::new(1920, 1080), backend);
        let started = ctl.start(config()).unwrap();

        for _ in 0..10 {
            ctl.tick_frame().unwrap();
        }
        ctl.pause().unwrap();
        assert_eq!(ctl.state(), RecordingState::Paused);
        assert_eq!(ctl.status(), Status::Paused { frame_count: 10 });

        // Ticks while paused write nothing.
        assert!(ctl.tick_frame().unwrap().is_none());
        assert_eq!(log.lock().frames.len(), 10);

        let resumed = ctl.resume().unwrap();
        assert!(resumed.epoch > started.epoch);
        for _ in 0..5 {
            ctl.tick_frame().unwrap();
        }

        let summary = ctl.stop().unwrap().unwrap();
        assert_eq!(summary.frame_count, 15);
        assert_eq!(log.lock().frames.len(), 15);
        assert!(log.lock().finished);
    }

    #[test]
    fn sink_open_iff_recording_or_paused() {
        let (backend, log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::new(1920, 1080), backend);
        assert!(ctl.session.is_none());

        ctl.start(config()).unwrap();
        assert!(ctl.session.is_some());

        ctl.pause().unwrap();
        assert!(ctl.session.is_some());
        assert!(!log.lock().finished);

        ctl.resume().unwrap();
        ctl.stop().unwrap();
        assert!(ctl.session.is_none());
        assert!(log.lock().finished);
    }

    #[test]
    fn stop_when_idle_is_a_noop() {
        let (backend, _log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::new(1920, 1080), backend);
        assert!(ctl.stop().unwrap().is_none());
        assert_eq!(ctl.state(), RecordingState::Idle);
        assert_eq!(ctl.status(), Status::Ready);
    }

    #[test]
    fn stale_tick_after_stop_writes_nothing() {
        let (backend, log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::new(1920, 1080), backend);
        ctl.start(config()).unwrap();
        ctl.tick_frame().unwrap();
        ctl.stop().unwrap();

        assert!(ctl.tick_frame().unwrap().is_none());
        assert_eq!(log.lock().frames.len(), 1);
    }

    #[test]
    fn encoder_open_failure_leaves_state_idle() {
        let (mut backend, _log) = MockBackend::new();
        backend.fail_open = true;
        let mut ctl = controller_with(MockCapture::new(1920, 1080), backend);

        let err = ctl.start(config()).unwrap_err();
        assert!(matches!(err, RecordingError::EncoderOpen(_)));
        assert_eq!(ctl.state(), RecordingState::Idle);
        assert!(ctl.session.is_none());
        assert!(matches!(ctl.status(), Status::Failed { .. }));
    }

    #[test]
    fn double_start_is_rejected() {
        let (backend, _log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::new(1920, 1080), backend);
        ctl.start(config()).unwrap();
        assert!(matches!(
            ctl.start(config()),
            Err(RecordingError::AlreadyRecording)
        ));
    }

    #[test]
    fn pause_and_resume_require_an_active_state() {
        let (backend, _log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::new(1920, 1080), backend);
        assert!(matches!(ctl.pause(), Err(RecordingError::NotRecording)));
        assert!(matches!(ctl.resume(), Err(RecordingError::NotRecording)));
    }

    #[test]
    fn invalid_config_is_rejected_before_opening() {
        let (backend, log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::new(1920, 1080), backend);
        let mut bad = config();
        bad.fps = 240;
        assert!(matches!(
            ctl.start(bad),
            Err(RecordingError::InvalidConfig(_))
        ));
        assert!(log.lock().opened_spec.is_none());
    }

    #[test]
    fn capture_failure_triggers_fail_safe_shutdown() {
        let (backend, log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::failing_after(1920, 1080, 3), backend);
        ctl.start(config()).unwrap();

        for _ in 0..3 {
            ctl.tick_frame().unwrap();
        }
        let err = ctl.tick_frame().unwrap_err();
        assert!(matches!(err, RecordingError::Capture(_)));

        // Partial file finalized, state reset, failure (not success) reported.
        let log = log.lock();
        assert_eq!(log.frames.len(), 3);
        assert!(log.finished);
        assert_eq!(ctl.state(), RecordingState::Idle);
        assert!(matches!(ctl.status(), Status::Failed { .. }));
    }

    #[test]
    fn write_failure_triggers_fail_safe_shutdown() {
        let (mut backend, log) = MockBackend::new();
        backend.fail_writes = true;
        let mut ctl = controller_with(MockCapture::new(1920, 1080), backend);
        ctl.start(config()).unwrap();

        let err = ctl.tick_frame().unwrap_err();
        assert!(matches!(err, RecordingError::EncodeWrite(_)));
        assert_eq!(ctl.state(), RecordingState::Idle);
        assert!(log.lock().finished);
    }

    #[test]
    fn preview_copy_follows_the_toggle() {
        let (backend, _log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::new(1920, 1080), backend);
        let mut cfg = config();
        cfg.show_preview = false;
        ctl.start(cfg).unwrap();
        assert!(ctl.tick_frame().unwrap().is_none());

        ctl.set_show_preview(true);
        let preview = ctl.tick_frame().unwrap().unwrap();
        assert_eq!(
            (preview.width(), preview.height()),
            (PREVIEW_WIDTH, PREVIEW_HEIGHT)
        );
    }

    #[test]
    fn idle_preview_runs_only_outside_recording() {
        let (backend, _log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::new(1920, 1080), backend);

        let preview = ctl.tick_preview().unwrap().unwrap();
        assert_eq!(
            (preview.width(), preview.height()),
            (PREVIEW_WIDTH, PREVIEW_HEIGHT)
        );

        ctl.start(config()).unwrap();
        assert!(ctl.tick_preview().unwrap().is_none());

        ctl.pause().unwrap();
        assert!(ctl.tick_preview().unwrap().is_some());
    }

    #[test]
    fn idle_preview_failure_does_not_touch_state() {
        let (backend, _log) = MockBackend::new();
        let mut ctl = controller_with(MockCapture::failing_after(1920, 1080, 0), backend);
        assert!(ctl.tick_preview().is_err());
        assert_eq!(ctl.state(), RecordingState::Idle);
        assert_eq!(ctl.status(), Status::Ready);
    }
}
