//! Recording system module
//!
//! This module implements the recording lifecycle:
//! - the state machine and session configuration
//! - the controller that captures, resizes, and encodes frames per tick

pub mod controller;
pub mod state;

pub use controller::{RecordingController, StartedRecording};
pub use state::{RecordingState, RecordingSummary, SessionConfig, Status};
