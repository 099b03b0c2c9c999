//! Delay double that records requested windows without sleeping.

use std::sync::Arc;

use fpc_core::HoldWindow;
use parking_lot::Mutex;

use crate::traits::Delay;

/// Records every requested hold window and returns immediately.
///
/// Clones share the same log, so a test can keep one clone and hand the
/// other to the code under test.
///
/// # Examples
///
/// ```
/// use fpc_core::constants::POWER_SETTLE_HOLD;
/// use fpc_hardware::Delay;
/// use fpc_hardware::mock::RecordingDelay;
///
/// let delay = RecordingDelay::new();
/// delay.clone().sleep_range(POWER_SETTLE_HOLD);
/// assert_eq!(delay.windows(), vec![POWER_SETTLE_HOLD]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay {
    windows: Arc<Mutex<Vec<HoldWindow>>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Windows requested so far, in order.
    pub fn windows(&self) -> Vec<HoldWindow> {
        self.windows.lock().clone()
    }

    pub fn clear(&self) {
        self.windows.lock().clear();
    }
}

impl Delay for RecordingDelay {
    fn sleep_range(&self, window: HoldWindow) {
        self.windows.lock().push(window);
    }
}
