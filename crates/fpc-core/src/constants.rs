//! Sequencing constants for the FPC16xx sensor family.
//!
//! # Reset Pulse
//!
//! The sensor latches a reset on a high-low-high sequence on its reset line:
//!
//! ```text
//!        ┌────────┐                     ┌──────
//!  RST   │ HIGH1  │        LOW          │ HIGH2
//!  ──────┘        └─────────────────────┘
//!         1.0-2.0ms      10.5-21.0ms     0.6-1.2ms
//! ```
//!
//! Every window is `[min, 2 * min]`. Only the lower bound is a hardware
//! requirement; the upper bound leaves the scheduler room to coalesce wakeups.
//!
//! # Usage
//!
//! ```
//! use fpc_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(RESET_LOW_HOLD.min(), Duration::from_micros(10_500));
//! assert_eq!(PRIMARY_REGULATOR, "vdd_pwr");
//! ```

use crate::types::{HoldWindow, RegulatorSpec};

/// First high phase of the reset pulse, in microseconds.
pub const RESET_HIGH1_US: u64 = 1_000;

/// Low phase of the reset pulse, in microseconds.
pub const RESET_LOW_US: u64 = 10_500;

/// Second high phase of the reset pulse, in microseconds.
pub const RESET_HIGH2_US: u64 = 600;

/// Settle time around power transitions, in microseconds.
pub const POWER_SETTLE_US: u64 = 10_000;

/// Hold window for the first high phase of the reset pulse.
pub const RESET_HIGH1_HOLD: HoldWindow = HoldWindow::doubling_micros(RESET_HIGH1_US);

/// Hold window for the low phase of the reset pulse.
pub const RESET_LOW_HOLD: HoldWindow = HoldWindow::doubling_micros(RESET_LOW_US);

/// Hold window for the second high phase of the reset pulse.
pub const RESET_HIGH2_HOLD: HoldWindow = HoldWindow::doubling_micros(RESET_HIGH2_US);

/// Settle window between rail and pin-mux changes in prepare/unprepare.
pub const POWER_SETTLE_HOLD: HoldWindow = HoldWindow::doubling_micros(POWER_SETTLE_US);

/// Name of the rail that powers the sensor.
pub const PRIMARY_REGULATOR: &str = "vdd_pwr";

/// Compiled-in rail table.
pub const REGULATORS: &[RegulatorSpec] = &[RegulatorSpec {
    name: PRIMARY_REGULATOR,
    min_uv: 3_000_000,
    max_uv: 3_000_000,
    load_ua: 25_000,
}];

/// Longest rail name accepted on the control surface.
pub const MAX_REGULATOR_NAME_LEN: usize = 15;

/// Default device-tree label of the reset line.
pub const DEFAULT_RESET_GPIO_LABEL: &str = "fpc,gpio_rst";

/// Default pin group holding the sensor in reset.
pub const DEFAULT_PIN_GROUP_RESET: &str = "reset-reset";

/// Default pin group releasing the sensor from reset.
pub const DEFAULT_PIN_GROUP_ACTIVE: &str = "reset-active";

/// Default name of the SPI main clock on platforms with clock gating.
pub const DEFAULT_CLOCK_NAME: &str = "spi-main";

/// Default device name used in logs and attribute registration.
pub const DEFAULT_DEVICE_NAME: &str = "fpc16xx";
