//! Recording state management
//!
//! Defines the recording state machine's states, the session configuration,
//! and status reporting.

use crate::encoder::codec::Codec;
use crate::utils::error::{RecordingError, RecordingResult};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Output width bounds in pixels
pub const WIDTH_RANGE: RangeInclusive<u32> = 640..=3840;
/// Output height bounds in pixels
pub const HEIGHT_RANGE: RangeInclusive<u32> = 480..=2160;
/// Frame rate bounds
pub const FPS_RANGE: RangeInclusive<u32> = 1..=120;

/// Fixed preview surface size
pub const PREVIEW_WIDTH: u32 = 640;
pub const PREVIEW_HEIGHT: u32 = 360;

/// Current state of the recording system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    #[default]
    Idle,
    /// Currently recording
    Recording,
    /// Recording is paused; the sink stays open
    Paused,
}

/// Configuration for starting a recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Target file path; the canonical extension is appended if absent
    pub output_path: String,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// Frames per second
    pub fps: u32,

    /// Video codec
    pub codec: Codec,

    /// Whether to hand preview copies to the display surface while recording
    pub show_preview: bool,
}

impl SessionConfig {
    pub fn validate(&self) -> RecordingResult<()> {
        if self.output_path.trim().is_empty() {
            return Err(RecordingError::InvalidConfig(
                "output path must not be empty".to_string(),
            ));
        }
        if !WIDTH_RANGE.contains(&self.width) {
            return Err(RecordingError::InvalidConfig(format!(
                "width {} outside {}-{}",
                self.width,
                WIDTH_RANGE.start(),
                WIDTH_RANGE.end()
            )));
        }
        if !HEIGHT_RANGE.contains(&self.height) {
            return Err(RecordingError::InvalidConfig(format!(
                "height {} outside {}-{}",
                self.height,
                HEIGHT_RANGE.start(),
                HEIGHT_RANGE.end()
            )));
        }
        if !FPS_RANGE.contains(&self.fps) {
            return Err(RecordingError::InvalidConfig(format!(
                "fps {} outside {}-{}",
                self.fps,
                FPS_RANGE.start(),
                FPS_RANGE.end()
            )));
        }
        Ok(())
    }
}

/// Result of a completed recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSummary {
    /// Path of the finalized video file
    pub output_path: String,

    /// Number of frames written
    pub frame_count: u64,
}

/// Human-readable phase reported to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Status {
    Ready,
    Recording { path: String },
    Paused { frame_count: u64 },
    Saved { frame_count: u64 },
    Failed { message: String },
}

impl Status {
    /// The status-bar string shown in the UI
    pub fn text(&self) -> String {
        match self {
            Status::Ready => "Ready".to_string(),
            Status::Recording { path } => format!("Recording to {}...", path),
            Status::Paused { frame_count } => {
                format!("Recording paused - {} frames captured", frame_count)
            }
            Status::Saved { frame_count } => {
                format!("Recording saved - {} frames captured", frame_count)
            }
            Status::Failed { message } => format!("Error: {}", message),
        }
    }
}
