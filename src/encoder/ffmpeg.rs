//! FFmpeg-backed encoder sink
//!
//! Spawns an `ffmpeg` child process and pipes raw RGBA frames into its
//! stdin; FFmpeg handles channel-order conversion, encoding, and container
//! finalization.

use crate::capture::traits::Frame;
use crate::encoder::sink::{EncoderBackend, FrameSink, SinkSpec};
use crate::utils::error::{RecordingError, RecordingResult};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

static SINK_SEQ: AtomicU64 = AtomicU64::new(0);

/// Scratch file receiving the encoder's stderr. A file, not a pipe: nothing
/// drains stderr during a session, and a full pipe would stall the encoder
/// mid-recording while the controller lock is held.
fn stderr_log_path() -> PathBuf {
    let seq = SINK_SEQ.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("quickrec-ffmpeg-{}-{}.log", std::process::id(), seq))
}

/// Last few lines of the encoder log, for error reporting.
fn read_log_tail(path: &Path) -> String {
    let contents = std::fs::read_to_string(path).unwrap_or_default();
    let mut lines: Vec<&str> = contents.lines().rev().take(4).collect();
    lines.reverse();
    lines.join("\n")
}

/// Build the FFmpeg argument list for a sink spec.
fn build_encoder_args(spec: &SinkSpec) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgba".to_string(),
        "-s".to_string(),
        format!("{}x{}", spec.width, spec.height),
        "-r".to_string(),
        spec.fps.to_string(),
        "-i".to_string(),
        "-".to_string(),
        "-c:v".to_string(),
        spec.codec.ffmpeg_encoder().to_string(),
        "-pix_fmt".to_string(),
        spec.codec.pixel_format().to_string(),
        "-qscale:v".to_string(),
        "5".to_string(),
        spec.path.to_string_lossy().to_string(),
    ]
}

/// Opens [`FfmpegSink`]s.
pub struct FfmpegBackend;

impl EncoderBackend for FfmpegBackend {
    fn open(&self, spec: &SinkSpec) -> RecordingResult<Box<dyn FrameSink>> {
        Ok(Box::new(FfmpegSink::open(spec)?))
    }
}

/// One FFmpeg child process writing a single output file.
#[derive(Debug)]
pub struct FfmpegSink {
    process: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_path: PathBuf,
    width: u32,
    height: u32,
}

impl FfmpegSink {
    pub fn open(spec: &SinkSpec) -> RecordingResult<Self> {
        // Probe writability up front: an unwritable target must fail the
        // start transition without leaving a partial file behind.
        let existed = spec.path.exists();
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .open(&spec.path)
            .map_err(|e| {
                RecordingError::EncoderOpen(format!("{}: {}", spec.path.display(), e))
            })?;

        let stderr_path = stderr_log_path();
        let stderr_log = match File::create(&stderr_path) {
            Ok(file) => file,
            Err(e) => {
                if !existed {
                    let _ = std::fs::remove_file(&spec.path);
                }
                return Err(RecordingError::EncoderOpen(format!(
                    "failed to create encoder log: {}",
                    e
                )));
            }
        };

        let args = build_encoder_args(spec);
        tracing::info!("Starting FFmpeg encoder: {:?}", args);

        let spawned = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_log))
            .spawn();

        let mut process = match spawned {
            Ok(process) => process,
            Err(e) => {
                if !existed {
                    let _ = std::fs::remove_file(&spec.path);
                }
                let _ = std::fs::remove_file(&stderr_path);
                return Err(RecordingError::EncoderOpen(format!(
                    "failed to start ffmpeg: {}",
                    e
                )));
            }
        };

        let stdin = process.stdin.take().ok_or_else(|| {
            RecordingError::EncoderOpen("failed to open ffmpeg stdin".to_string())
        })?;

        Ok(Self {
            process: Some(process),
            stdin: Some(stdin),
            stderr_path,
            width: spec.width,
            height: spec.height,
        })
    }
}

impl FrameSink for FfmpegSink {
    fn write_frame(&mut self, frame: &Frame) -> RecordingResult<()> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(RecordingError::EncodeWrite(format!(
                "frame is {}x{}, sink expects {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| RecordingError::EncodeWrite("encoder already closed".to_string()))?;
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| RecordingError::EncodeWrite(e.to_string()))
    }

    fn finish(mut self: Box<Self>) -> RecordingResult<()> {
        // Closing stdin signals EOF; FFmpeg then flushes and finalizes.
        drop(self.stdin.take());

        let Some(mut process) = self.process.take() else {
            return Ok(());
        };
        let status = process
            .wait()
            .map_err(|e| RecordingError::EncodeWrite(format!("failed to wait for ffmpeg: {}", e)))?;

        if !status.success() {
            // The log file is still on disk here; Drop removes it after
            // the tail is captured.
            let tail = read_log_tail(&self.stderr_path);
            return Err(RecordingError::EncodeWrite(format!(
                "ffmpeg exited with error: {}",
                tail
            )));
        }

        tracing::info!("FFmpeg encoder finished");
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // Normal shutdown goes through finish(); this also covers abandoned
        // sinks so no zombie ffmpeg or stale log is left behind.
        drop(self.stdin.take());
        if let Some(mut process) = self.process.take() {
            let _ = process.wait();
        }
        let _ = std::fs::remove_file(&self.stderr_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::codec::Codec;
    use std::path::PathBuf;

    fn spec(codec: Codec, path: &str) -> SinkSpec {
        SinkSpec {
            path: PathBuf::from(path),
            codec,
            fps: 30,
            width: 1440,
            height: 900,
        }
    }

    #[test]
    fn encoder_args_pipe_raw_rgba() {
        let args = build_encoder_args(&spec(Codec::Mp4v, "demo.mp4"));
        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo"));
        assert!(joined.contains("-pix_fmt rgba"));
        assert!(joined.contains("-s 1440x900"));
        assert!(joined.contains("-r 30"));
        assert!(joined.contains("-c:v mpeg4"));
        assert_eq!(args.last().unwrap(), "demo.mp4");
    }

    #[test]
    fn encoder_args_select_codec() {
        let xvid = build_encoder_args(&spec(Codec::Xvid, "a.avi")).join(" ");
        assert!(xvid.contains("-c:v libxvid"));
        assert!(xvid.contains("-pix_fmt yuv420p"));

        let mjpg = build_encoder_args(&spec(Codec::Mjpg, "a.avi")).join(" ");
        assert!(mjpg.contains("-c:v mjpeg"));
        assert!(mjpg.contains("-pix_fmt yuvj420p"));
    }

    #[test]
    fn log_tail_keeps_the_last_lines_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encode.log");
        std::fs::write(&path, "one\ntwo\nthree\nfour\nfive\nsix\n").unwrap();
        assert_eq!(read_log_tail(&path), "three\nfour\nfive\nsix");
    }

    #[test]
    fn log_tail_of_a_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_log_tail(&dir.path().join("absent.log")), "");
    }

    #[test]
    fn log_paths_are_unique_per_sink() {
        assert_ne!(stderr_log_path(), stderr_log_path());
    }

    #[test]
    fn open_fails_for_missing_directory_without_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.avi");
        let err = FfmpegSink::open(&spec(Codec::Xvid, path.to_str().unwrap())).unwrap_err();
        assert!(matches!(err, RecordingError::EncoderOpen(_)));
        assert!(!path.exists());
    }
}
