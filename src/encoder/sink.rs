//! Encoder sink traits
//!
//! The controller talks to the encoder only through these traits, which is
//! also what lets the state machine be tested without FFmpeg.

use crate::capture::traits::Frame;
use crate::encoder::codec::Codec;
use crate::utils::error::RecordingResult;
use std::path::PathBuf;

/// Everything the backend needs to open a sink.
#[derive(Debug, Clone)]
pub struct SinkSpec {
    pub path: PathBuf,
    pub codec: Codec,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
}

/// An open video writer. Frames must exactly match the dimensions the sink
/// was opened with; `finish` flushes and finalizes the container so the
/// file is independently playable.
pub trait FrameSink: Send {
    fn write_frame(&mut self, frame: &Frame) -> RecordingResult<()>;

    fn finish(self: Box<Self>) -> RecordingResult<()>;
}

/// Creates sinks. The production implementation spawns FFmpeg.
pub trait EncoderBackend: Send + Sync {
    fn open(&self, spec: &SinkSpec) -> RecordingResult<Box<dyn FrameSink>>;
}
