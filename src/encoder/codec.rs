//! Codec selection and output-path resolution
//!
//! Maps each supported codec to its FFmpeg encoder, output pixel format,
//! and canonical container extension.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Supported video codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Xvid,
    Mp4v,
    Mjpg,
}

impl Codec {
    /// Canonical container extension for this codec
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::Xvid => "avi",
            Codec::Mp4v => "mp4",
            Codec::Mjpg => "avi",
        }
    }

    /// FFmpeg encoder name
    pub fn ffmpeg_encoder(&self) -> &'static str {
        match self {
            Codec::Xvid => "libxvid",
            Codec::Mp4v => "mpeg4",
            Codec::Mjpg => "mjpeg",
        }
    }

    /// Output pixel format handed to FFmpeg
    pub fn pixel_format(&self) -> &'static str {
        match self {
            Codec::Xvid => "yuv420p",
            Codec::Mp4v => "yuv420p",
            // MJPEG wants full-range YUV
            Codec::Mjpg => "yuvj420p",
        }
    }
}

/// Append the codec's canonical extension when the user-supplied name lacks
/// it. A name that already carries the right extension is kept as-is; any
/// other extension gets the canonical one appended after it.
pub fn resolve_output_path(raw: &str, codec: Codec) -> PathBuf {
    let has_canonical = Path::new(raw)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(codec.extension()))
        .unwrap_or(false);

    if has_canonical {
        PathBuf::from(raw)
    } else {
        PathBuf::from(format!("{}.{}", raw, codec.extension()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_extension_when_absent() {
        assert_eq!(resolve_output_path("demo", Codec::Mp4v), PathBuf::from("demo.mp4"));
        assert_eq!(resolve_output_path("demo", Codec::Xvid), PathBuf::from("demo.avi"));
        assert_eq!(resolve_output_path("demo", Codec::Mjpg), PathBuf::from("demo.avi"));
    }

    #[test]
    fn keeps_existing_canonical_extension() {
        assert_eq!(
            resolve_output_path("clip.avi", Codec::Xvid),
            PathBuf::from("clip.avi")
        );
        assert_eq!(
            resolve_output_path("clip.MP4", Codec::Mp4v),
            PathBuf::from("clip.MP4")
        );
    }

    #[test]
    fn appends_after_foreign_extension() {
        assert_eq!(
            resolve_output_path("clip.mov", Codec::Xvid),
            PathBuf::from("clip.mov.avi")
        );
    }

    #[test]
    fn codec_tables_are_consistent() {
        for codec in [Codec::Xvid, Codec::Mp4v, Codec::Mjpg] {
            assert!(!codec.extension().is_empty());
            assert!(!codec.ffmpeg_encoder().is_empty());
            assert!(codec.pixel_format().starts_with("yuv"));
        }
    }
}
