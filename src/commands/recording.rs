//! Recording-related Tauri commands
//!
//! IPC surface consumed by the UI shell, plus the two periodic timer tasks
//! that drive the controller: the always-on idle-preview loop and the
//! per-session capture loop.

use crate::capture::screen::{get_displays as enumerate_displays, PrimaryDisplayCapture};
use crate::capture::traits::DisplayInfo;
use crate::encoder::codec::{resolve_output_path, Codec};
use crate::encoder::ffmpeg::FfmpegBackend;
use crate::encoder::probe::{probe_video, VideoMetadata};
use crate::events;
use crate::recorder::controller::RecordingController;
use crate::recorder::state::{RecordingState, RecordingSummary, SessionConfig};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tauri::{AppHandle, State};
use tokio::time::MissedTickBehavior;

/// Refresh period of the idle preview (10 Hz)
const PREVIEW_PERIOD: Duration = Duration::from_millis(100);

/// Application state for recording
pub struct RecorderState {
    pub controller: Arc<Mutex<RecordingController>>,
}

impl Default for RecorderState {
    fn default() -> Self {
        Self {
            controller: Arc::new(Mutex::new(RecordingController::new(
                Box::new(PrimaryDisplayCapture::new()),
                Box::new(FfmpegBackend),
            ))),
        }
    }
}

/// Get list of available displays
#[tauri::command]
pub async fn get_displays() -> Result<Vec<DisplayInfo>, String> {
    enumerate_displays().map_err(|e| e.to_string())
}

/// Start recording; returns the resolved output path
#[tauri::command]
pub async fn start_recording(
    app: AppHandle,
    state: State<'_, RecorderState>,
    config: SessionConfig,
) -> Result<String, String> {
    let started = {
        let mut controller = state.controller.lock();
        let result = controller.start(config);
        events::emit_status(&app, &controller.status_text());
        result.map_err(|e| e.to_string())?
    };
    spawn_capture_loop(
        app,
        Arc::clone(&state.controller),
        started.fps,
        started.epoch,
    );
    Ok(started.path.display().to_string())
}

/// Pause recording; the capture loop drains on the next tick
#[tauri::command]
pub async fn pause_recording(
    app: AppHandle,
    state: State<'_, RecorderState>,
) -> Result<(), String> {
    let mut controller = state.controller.lock();
    let result = controller.pause();
    events::emit_status(&app, &controller.status_text());
    result.map_err(|e| e.to_string())
}

/// Resume a paused recording
#[tauri::command]
pub async fn resume_recording(
    app: AppHandle,
    state: State<'_, RecorderState>,
) -> Result<(), String> {
    let resumed = {
        let mut controller = state.controller.lock();
        let result = controller.resume();
        events::emit_status(&app, &controller.status_text());
        result.map_err(|e| e.to_string())?
    };
    spawn_capture_loop(
        app,
        Arc::clone(&state.controller),
        resumed.fps,
        resumed.epoch,
    );
    Ok(())
}

/// Stop recording, finalize the file, and report the final frame count.
/// A no-op when nothing is being recorded.
#[tauri::command]
pub async fn stop_recording(
    app: AppHandle,
    state: State<'_, RecorderState>,
) -> Result<Option<RecordingSummary>, String> {
    let mut controller = state.controller.lock();
    let result = controller.stop();
    events::emit_status(&app, &controller.status_text());
    match result {
        Ok(Some(summary)) => {
            events::emit_saved(&app, &summary);
            Ok(Some(summary))
        }
        Ok(None) => Ok(None),
        Err(e) => Err(e.to_string()),
    }
}

/// Get current recording state
#[tauri::command]
pub async fn get_recording_state(
    state: State<'_, RecorderState>,
) -> Result<RecordingState, String> {
    Ok(state.controller.lock().state())
}

/// Get the human-readable status string
#[tauri::command]
pub async fn get_status(state: State<'_, RecorderState>) -> Result<String, String> {
    Ok(state.controller.lock().status_text())
}

/// Get the current frame counter
#[tauri::command]
pub async fn get_frame_count(state: State<'_, RecorderState>) -> Result<u64, String> {
    Ok(state.controller.lock().frame_count())
}

/// Toggle the live preview copy while recording
#[tauri::command]
pub async fn set_show_preview(
    state: State<'_, RecorderState>,
    show: bool,
) -> Result<(), String> {
    state.controller.lock().set_show_preview(show);
    Ok(())
}

/// Suggest a timestamped default output file name for the chosen codec
#[tauri::command]
pub async fn suggest_output_path(codec: Codec) -> Result<String, String> {
    let base = format!("Recording-{}", chrono::Local::now().format("%Y%m%d-%H%M%S"));
    Ok(resolve_output_path(&base, codec).display().to_string())
}

/// Probe a finished video file with ffprobe
#[tauri::command]
pub async fn get_video_metadata(path: String) -> Result<VideoMetadata, String> {
    probe_video(Path::new(&path)).map_err(|e| e.to_string())
}

/// Spawn the per-session capture loop, ticking at the configured fps.
///
/// The loop exits as soon as the controller leaves Recording or the epoch
/// changes (a newer start/resume owns the session now), so pause, stop, and
/// fail-safe shutdown all drain it without explicit cancellation.
fn spawn_capture_loop(
    app: AppHandle,
    controller: Arc<Mutex<RecordingController>>,
    fps: u32,
    epoch: u64,
) {
    tauri::async_runtime::spawn(async move {
        let period = Duration::from_millis(u64::from(1000 / fps.max(1)).max(1));
        let mut ticker = tokio::time::interval(period);
        // A slow encoder delays the next tick instead of bursting: frames
        // are produced at most once per tick.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let tick = {
                let mut controller = controller.lock();
                if controller.epoch() != epoch
                    || controller.state() != RecordingState::Recording
                {
                    break;
                }
                controller.tick_frame()
            };
            match tick {
                Ok(Some(preview)) => {
                    if let Err(e) = events::emit_preview(&app, &preview) {
                        tracing::warn!("Preview emission failed: {}", e);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    // Controller already performed the fail-safe shutdown.
                    events::emit_error(&app, &e);
                    events::emit_status(&app, &controller.lock().status_text());
                    break;
                }
            }
        }
        tracing::debug!("Capture loop for epoch {} exited", epoch);
    });
}

/// Spawn the always-on idle-preview loop. Runs for the life of the app;
/// skips itself while a capture loop is recording.
pub fn spawn_preview_loop(app: AppHandle, controller: Arc<Mutex<RecordingController>>) {
    tauri::async_runtime::spawn(async move {
        let mut ticker = tokio::time::interval(PREVIEW_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let tick = controller.lock().tick_preview();
            match tick {
                Ok(Some(preview)) => {
                    if let Err(e) = events::emit_preview(&app, &preview) {
                        tracing::warn!("Preview emission failed: {}", e);
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Idle preview capture failed: {}", e),
            }
        }
    });
}
