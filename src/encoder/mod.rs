//! Video encoding
//!
//! Codec selection, the sink abstraction the controller writes through,
//! and the FFmpeg-backed implementation.

pub mod codec;
pub mod ffmpeg;
pub mod probe;
pub mod sink;

pub use codec::{resolve_output_path, Codec};
pub use ffmpeg::{FfmpegBackend, FfmpegSink};
pub use probe::{probe_video, VideoMetadata};
pub use sink::{EncoderBackend, FrameSink, SinkSpec};
