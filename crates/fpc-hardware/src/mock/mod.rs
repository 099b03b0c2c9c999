//! Simulated platform for testing and development.
//!
//! This module provides a platform implementation that can be inspected and
//! steered programmatically without requiring physical hardware.

pub mod delay;
pub mod platform;

// Re-export commonly used types
pub use delay::RecordingDelay;
pub use platform::{
    HwEvent, MAX_EVENT_LOG_SIZE, MockPlatform, MockPlatformBuilder, MockPlatformHandle,
    PinctrlMode, TimedEvent,
};
