//! Primary-display capture via xcap
//!
//! Cross-platform screenshot capture. The monitor handle is resolved lazily
//! and cached; capture re-resolves on the next call if a capture fails
//! (displays can be unplugged between ticks).

use crate::capture::traits::{CaptureProvider, DisplayInfo, Frame};
use crate::utils::error::{RecordingError, RecordingResult};
use xcap::Monitor;

/// Get list of available displays
pub fn get_displays() -> RecordingResult<Vec<DisplayInfo>> {
    let monitors = Monitor::all().map_err(|e| RecordingError::Capture(e.to_string()))?;
    Ok(monitors
        .iter()
        .map(|m| DisplayInfo {
            id: m.id().unwrap_or(0),
            name: m.name().unwrap_or_else(|_| "Unknown Display".to_string()),
            width: m.width().unwrap_or(0),
            height: m.height().unwrap_or(0),
            is_primary: m.is_primary().unwrap_or(false),
        })
        .collect())
}

/// Captures the primary display.
#[derive(Default)]
pub struct PrimaryDisplayCapture {
    monitor: Option<Monitor>,
}

impl PrimaryDisplayCapture {
    pub fn new() -> Self {
        Self::default()
    }

    fn monitor(&mut self) -> RecordingResult<&Monitor> {
        if self.monitor.is_none() {
            let monitors = Monitor::all().map_err(|e| RecordingError::Capture(e.to_string()))?;
            let index = monitors
                .iter()
                .position(|m| m.is_primary().unwrap_or(false))
                .unwrap_or(0);
            let monitor = monitors
                .into_iter()
                .nth(index)
                .ok_or_else(|| RecordingError::Capture("no displays found".to_string()))?;
            self.monitor = Some(monitor);
        }
        // Just populated above when empty.
        self.monitor
            .as_ref()
            .ok_or_else(|| RecordingError::Capture("no displays found".to_string()))
    }
}

impl CaptureProvider for PrimaryDisplayCapture {
    fn capture(&mut self) -> RecordingResult<Frame> {
        let captured = self.monitor()?.capture_image();
        let image = match captured {
            Ok(image) => image,
            Err(e) => {
                // Drop the cached handle so the next tick re-enumerates.
                self.monitor = None;
                return Err(RecordingError::Capture(e.to_string()));
            }
        };
        let (width, height) = (image.width(), image.height());
        Frame::from_raw(width, height, image.into_raw())
    }
}
