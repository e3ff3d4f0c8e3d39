//! Capture trait definitions
//!
//! Platform-agnostic traits and pixel-buffer types for capture sources.

use crate::utils::error::{RecordingError, RecordingResult};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Information about a display/screen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    /// Unique display ID
    pub id: u32,

    /// Display name
    pub name: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Whether this is the primary display
    pub is_primary: bool,
}

/// One captured screen image as an RGBA8 pixel buffer.
///
/// Frames are transient: captured, resized, handed to the encoder or the
/// preview channel, then dropped.
#[derive(Debug, Clone)]
pub struct Frame(RgbaImage);

impl Frame {
    /// Build a frame from raw RGBA bytes. Fails if `data` does not hold
    /// exactly `width * height * 4` bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> RecordingResult<Self> {
        RgbaImage::from_raw(width, height, data)
            .map(Frame)
            .ok_or_else(|| {
                RecordingError::Capture(format!(
                    "pixel buffer does not match {}x{} RGBA dimensions",
                    width, height
                ))
            })
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Raw RGBA bytes, row-major, 4 bytes per pixel.
    pub fn as_raw(&self) -> &[u8] {
        self.0.as_raw()
    }

    /// Return a copy scaled to exactly `width` x `height`.
    pub fn resized(&self, width: u32, height: u32) -> Frame {
        if self.width() == width && self.height() == height {
            return self.clone();
        }
        Frame(image::imageops::resize(
            &self.0,
            width,
            height,
            image::imageops::FilterType::Triangle,
        ))
    }

    /// Encode as PNG for the preview event channel.
    pub fn encode_png(&self) -> RecordingResult<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width(), self.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| RecordingError::Preview(e.to_string()))?;
            writer
                .write_image_data(self.0.as_raw())
                .map_err(|e| RecordingError::Preview(e.to_string()))?;
        }
        Ok(out)
    }
}

/// A source of full-display still images.
///
/// `capture` is synchronous and may be called at any rate; throttling to the
/// configured fps is the controller's job.
pub trait CaptureProvider: Send {
    fn capture(&mut self) -> RecordingResult<Frame>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32) -> Frame {
        Frame::from_raw(width, height, vec![0x40; (width * height * 4) as usize]).unwrap()
    }

    #[test]
    fn from_raw_rejects_short_buffer() {
        assert!(Frame::from_raw(16, 16, vec![0; 16]).is_err());
    }

    #[test]
    fn resized_produces_exact_dimensions() {
        let frame = solid(1920, 1080);
        let out = frame.resized(1440, 900);
        assert_eq!((out.width(), out.height()), (1440, 900));
        assert_eq!(out.as_raw().len(), 1440 * 900 * 4);
    }

    #[test]
    fn resized_is_copy_free_of_source_dimensions() {
        let frame = solid(640, 360);
        let out = frame.resized(640, 360);
        assert_eq!((out.width(), out.height()), (640, 360));
    }

    #[test]
    fn encode_png_produces_png_signature() {
        let png = solid(8, 8).encode_png().unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n']);
    }
}
