//! Common test utilities for bring-up integration tests.
//!
//! Every helper attaches against the mock platform with a
//! [`RecordingDelay`], so the tests run without sleeping and can assert on
//! the hold windows that were requested.

#![allow(dead_code)]

use std::sync::Arc;

use fpc_bringup::{DeviceBuilder, DeviceHandle};
use fpc_core::{BringupConfig, PinLevel, PlatformKind, Result};
use fpc_hardware::mock::{HwEvent, MockPlatform, MockPlatformHandle, RecordingDelay};

/// Label of the reset line the mock platform declares.
pub const RESET_LINE: &str = "fpc,gpio_rst";

/// An attached device with its inspection handles.
pub struct Bench {
    pub device: DeviceHandle,
    pub hw: MockPlatformHandle,
    pub delay: RecordingDelay,
}

/// Attach on the default mock platform.
pub fn attach(kind: PlatformKind) -> Bench {
    let (platform, hw) = MockPlatform::new();
    let delay = RecordingDelay::new();
    let device = try_attach(platform, BringupConfig::new(kind), delay.clone())
        .expect("attach on default mock platform");
    Bench { device, hw, delay }
}

/// Attach on a prepared platform, returning the attach result.
pub fn try_attach(
    platform: MockPlatform,
    config: BringupConfig,
    delay: RecordingDelay,
) -> Result<DeviceHandle> {
    DeviceBuilder::new(Arc::new(platform))
        .with_config(config)
        .with_delay(Arc::new(delay))
        .attach()
}

/// Levels written to the reset line, in order.
pub fn reset_writes(hw: &MockPlatformHandle) -> Vec<PinLevel> {
    hw.events()
        .into_iter()
        .filter_map(|event| match event {
            HwEvent::GpioWrite { level, .. } => Some(level),
            _ => None,
        })
        .collect()
}

/// Number of complete reset pulses written to the reset line.
pub fn reset_pulses(hw: &MockPlatformHandle) -> usize {
    let writes = reset_writes(hw);
    writes
        .chunks_exact(3)
        .filter(|chunk| *chunk == [PinLevel::High, PinLevel::Low, PinLevel::High])
        .count()
}

/// Assert that nothing acquired by an attach is still held.
pub fn assert_all_released(hw: &MockPlatformHandle) {
    assert!(!hw.gpio_requested(RESET_LINE), "reset line still requested");
    assert!(!hw.clock_acquired("spi-main"), "clock still acquired");
    assert_eq!(hw.clock_enable_count("spi-main"), 0, "clock still enabled");
    assert_eq!(hw.clock_prepare_count("spi-main"), 0, "clock still prepared");
    assert_eq!(hw.live_rail_handles("vdd_pwr"), 0, "rail handle still live");
    assert!(!hw.rail_enabled("vdd_pwr"), "rail still enabled");
}
