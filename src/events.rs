//! Frontend event channel
//!
//! Typed payloads and emit helpers for everything the backend pushes to the
//! webview: preview frames, status strings, saved recordings, and errors.

use crate::capture::traits::Frame;
use crate::recorder::state::RecordingSummary;
use crate::utils::error::{ErrorResponse, RecordingError};
use serde::Serialize;
use tauri::{AppHandle, Emitter};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewFrameEvent {
    pub width: u32,
    pub height: u32,
    /// PNG-encoded pixels
    pub png: Vec<u8>,
}

/// Emit one preview frame to the display surface
pub fn emit_preview(app: &AppHandle, frame: &Frame) -> Result<(), RecordingError> {
    let png = frame.encode_png()?;
    app.emit(
        "preview-frame",
        PreviewFrameEvent {
            width: frame.width(),
            height: frame.height(),
            png,
        },
    )
    .map_err(|e| RecordingError::Preview(e.to_string()))
}

/// Emit the human-readable status string
pub fn emit_status(app: &AppHandle, status: &str) {
    if let Err(e) = app.emit("recorder-status", status) {
        tracing::warn!("Failed to emit status: {}", e);
    }
}

/// Emit a finished-recording notification
pub fn emit_saved(app: &AppHandle, summary: &RecordingSummary) {
    if let Err(e) = app.emit("recording-saved", summary) {
        tracing::warn!("Failed to emit recording-saved: {}", e);
    }
}

/// Emit a recorder error to the frontend
pub fn emit_error(app: &AppHandle, error: &RecordingError) {
    if let Err(e) = app.emit("recorder-error", ErrorResponse::from(error)) {
        tracing::warn!("Failed to emit recorder-error: {}", e);
    }
}

/// Ask the frontend to confirm quitting while a recording is active
pub fn emit_close_requested(app: &AppHandle) {
    if let Err(e) = app.emit("close-requested", ()) {
        tracing::warn!("Failed to emit close-requested: {}", e);
    }
}
