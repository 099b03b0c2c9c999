//! Reset pulse generator.
//!
//! The sensor resets on a high-low-high sequence on its reset line. All
//! three phases always run in order; writes on an acquired line cannot fail,
//! so there is no error path.

use fpc_core::{
    GpioId, HoldWindow, PinLevel,
    constants::{RESET_HIGH1_HOLD, RESET_HIGH2_HOLD, RESET_LOW_HOLD},
};

use crate::backend::VendorBackend;
use crate::context::DeviceContext;

/// One phase of the reset pulse: drive `level`, then hold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetPhase {
    pub level: PinLevel,
    pub hold: HoldWindow,
}

/// The reset pulse, in order.
pub const RESET_SEQUENCE: [ResetPhase; 3] = [
    ResetPhase {
        level: PinLevel::High,
        hold: RESET_HIGH1_HOLD,
    },
    ResetPhase {
        level: PinLevel::Low,
        hold: RESET_LOW_HOLD,
    },
    ResetPhase {
        level: PinLevel::High,
        hold: RESET_HIGH2_HOLD,
    },
];

/// Drive the reset pulse on `gpio` through the context's backend.
pub fn pulse(ctx: &DeviceContext, gpio: GpioId) {
    for phase in RESET_SEQUENCE {
        ctx.backend.write_pin(ctx, gpio, phase.level);
        ctx.delay.sleep_range(phase.hold);
    }
}
