//! Screen capture
//!
//! This module provides the capture provider abstraction and the
//! cross-platform primary-display implementation.

pub mod screen;
pub mod traits;

pub use screen::{get_displays, PrimaryDisplayCapture};
pub use traits::{CaptureProvider, DisplayInfo, Frame};
