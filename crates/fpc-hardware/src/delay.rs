//! Blocking delays for hold windows.

use std::thread;
use std::time::{Duration, Instant};

use fpc_core::HoldWindow;
use rand::Rng;
use tracing::trace;

use crate::traits::Delay;

/// Production delay: sleeps a duration drawn uniformly from the window.
///
/// Spreading wakeups over the window lets the scheduler coalesce timers the
/// way `usleep_range` does. The drawn duration is never below the minimum and
/// `thread::sleep` never returns early, so the lower bound always holds.
///
/// # Examples
///
/// ```
/// use fpc_core::HoldWindow;
/// use fpc_hardware::{Delay, JitterDelay};
/// use std::time::Instant;
///
/// let window = HoldWindow::doubling_micros(200);
/// let start = Instant::now();
/// JitterDelay.sleep_range(window);
/// assert!(start.elapsed() >= window.min());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JitterDelay;

impl JitterDelay {
    /// Pick a duration inside the window.
    pub fn draw(window: HoldWindow) -> Duration {
        let min = window.min().as_micros() as u64;
        let max = window.max().as_micros() as u64;
        if min >= max {
            return window.min();
        }
        Duration::from_micros(rand::thread_rng().gen_range(min..=max))
    }
}

impl Delay for JitterDelay {
    fn sleep_range(&self, window: HoldWindow) {
        let target = Self::draw(window);
        let start = Instant::now();
        thread::sleep(target);

        // Sub-microsecond truncation must not leave us short of the minimum.
        let elapsed = start.elapsed();
        if elapsed < window.min() {
            thread::sleep(window.min() - elapsed);
        }
        trace!("held {}us within {}", start.elapsed().as_micros(), window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpc_core::constants::{
        POWER_SETTLE_HOLD, RESET_HIGH1_HOLD, RESET_HIGH2_HOLD, RESET_LOW_HOLD,
    };
    use rstest::rstest;

    #[rstest]
    #[case(RESET_HIGH1_HOLD)]
    #[case(RESET_LOW_HOLD)]
    #[case(RESET_HIGH2_HOLD)]
    #[case(POWER_SETTLE_HOLD)]
    fn test_draw_stays_inside_window(#[case] window: HoldWindow) {
        for _ in 0..1_000 {
            let drawn = JitterDelay::draw(window);
            assert!(drawn >= window.min());
            assert!(drawn <= window.max());
        }
    }

    #[test]
    fn test_draw_degenerate_window() {
        let window = HoldWindow::new(Duration::from_micros(50), Duration::from_micros(50));
        assert_eq!(JitterDelay::draw(window), Duration::from_micros(50));
    }

    #[test]
    fn test_jitter_delay_honours_minimum() {
        let window = HoldWindow::doubling_micros(600);
        let start = Instant::now();
        JitterDelay.sleep_range(window);
        assert!(window.is_satisfied_by(start.elapsed()));
    }
}
