//! FFprobe metadata lookup
//!
//! Used by the UI after a recording is saved to show the finished file's
//! real dimensions, frame rate, and frame count.

use crate::utils::error::{RecordingError, RecordingResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

/// Video metadata returned from FFprobe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: u64,
    pub codec: String,
}

/// Parse a frame rate in FFprobe's "30/1" or "29.97" notation.
fn parse_frame_rate(raw: &str) -> f64 {
    if let Some((num, den)) = raw.split_once('/') {
        let num: f64 = num.parse().unwrap_or(0.0);
        let den: f64 = den.parse().unwrap_or(1.0);
        if den > 0.0 {
            num / den
        } else {
            0.0
        }
    } else {
        raw.parse().unwrap_or(0.0)
    }
}

/// Probe a finished video file with ffprobe.
pub fn probe_video(path: &Path) -> RecordingResult<VideoMetadata> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-count_packets",
            "-show_streams",
            "-select_streams",
            "v:0",
        ])
        .arg(path)
        .output()
        .map_err(|e| RecordingError::Probe(format!("failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(RecordingError::Probe(format!(
            "ffprobe failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| RecordingError::Probe(format!("bad ffprobe output: {}", e)))?;

    let stream = json
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|s| s.first())
        .ok_or_else(|| RecordingError::Probe("no video stream found".to_string()))?;

    let width = stream.get("width").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
    let height = stream.get("height").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
    let codec = stream
        .get("codec_name")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();
    let fps = stream
        .get("r_frame_rate")
        .and_then(|v| v.as_str())
        .map(parse_frame_rate)
        .unwrap_or(0.0);
    let frame_count = stream
        .get("nb_read_packets")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    Ok(VideoMetadata {
        width,
        height,
        fps,
        frame_count,
        codec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rational_frame_rate() {
        assert_eq!(parse_frame_rate("30/1"), 30.0);
        assert!((parse_frame_rate("30000/1001") - 29.97).abs() < 0.01);
    }

    #[test]
    fn parses_decimal_frame_rate() {
        assert_eq!(parse_frame_rate("25"), 25.0);
        assert_eq!(parse_frame_rate("garbage"), 0.0);
    }

    #[test]
    fn zero_denominator_is_zero() {
        assert_eq!(parse_frame_rate("30/0"), 0.0);
    }
}
