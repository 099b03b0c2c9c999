//! Per-sensor device context.
//!
//! One [`DeviceContext`] exists per attached sensor. It owns every handle the
//! bring-up acquired (reset line, rail consumers, resolved pin states, the
//! backend's private clock slot) and the `prepared` flag. Contexts are only
//! reachable through a [`DeviceHandle`](crate::DeviceHandle), which keeps them
//! behind a single lock.
//!
//! Dropping a context releases whatever it still holds.

use std::collections::VecDeque;
use std::sync::Arc;

use fpc_core::{BringupConfig, ClockId, Error, GpioId, PinLevel, PowerState, Result};
use fpc_hardware::{Delay, Platform};
use tracing::{debug, warn};

use crate::backend::{AnyBackend, VendorBackend};
use crate::pinctrl::PinGroups;
use crate::regulator::RegulatorRegistry;
use crate::sequencer::PowerTransition;

/// Backend-private clock holder, allocated by backends with clock gating.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClockSlot {
    pub(crate) handle: Option<ClockId>,
    pub(crate) prepared: bool,
    pub(crate) enabled: bool,
}

impl ClockSlot {
    pub fn handle(&self) -> Option<ClockId> {
        self.handle
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Electrical state and resource handles of one attached sensor.
#[derive(Debug)]
pub struct DeviceContext {
    pub(crate) config: BringupConfig,
    pub(crate) platform: Arc<dyn Platform>,
    pub(crate) backend: AnyBackend,
    pub(crate) delay: Arc<dyn Delay>,
    pub(crate) reset_gpio: Option<GpioId>,
    pub(crate) regulators: RegulatorRegistry,
    pub(crate) pins: PinGroups,
    pub(crate) clock: Option<ClockSlot>,
    pub(crate) prepared: bool,
    pub(crate) history: VecDeque<PowerTransition>,
}

impl DeviceContext {
    pub(crate) fn new(
        config: BringupConfig,
        platform: Arc<dyn Platform>,
        backend: AnyBackend,
        delay: Arc<dyn Delay>,
    ) -> Self {
        Self {
            config,
            platform,
            backend,
            delay,
            reset_gpio: None,
            regulators: RegulatorRegistry::default(),
            pins: PinGroups::default(),
            clock: None,
            prepared: false,
            history: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &BringupConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.device_name
    }

    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    pub fn backend(&self) -> AnyBackend {
        self.backend
    }

    /// The reset line acquired at attach.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigureFailed` if called before the line was acquired.
    pub fn reset_gpio(&self) -> Result<GpioId> {
        self.reset_gpio
            .ok_or_else(|| Error::configure_failed("reset line not acquired"))
    }

    /// Read the reset line through the backend.
    pub fn reset_line_level(&self) -> Option<PinLevel> {
        let gpio = self.reset_gpio?;
        Some(self.backend.read_pin(self, gpio))
    }

    pub fn regulators(&self) -> &RegulatorRegistry {
        &self.regulators
    }

    pub fn pin_groups(&self) -> &PinGroups {
        &self.pins
    }

    pub fn clock(&self) -> Option<ClockSlot> {
        self.clock
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn power_state(&self) -> PowerState {
        PowerState::from_prepared(self.prepared)
    }

    /// Turn a rail on or off through the backend.
    pub fn set_regulator(&mut self, name: &str, enable: bool) -> Result<()> {
        let backend = self.backend;
        backend.set_regulator(self, name, enable)
    }

    /// Gate the clock through the backend; a no-op without clock control.
    pub fn set_clock(&mut self, enabled: bool) -> Result<()> {
        let backend = self.backend;
        if !backend.has_clock_control() {
            debug!("{}: no clock control, ignoring", self.name());
            return Ok(());
        }
        backend.set_clock(self, enabled)
    }

    /// Select a resolved pin-control group.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no resolved group matches `group`, or the
    /// platform's error if selection fails.
    pub fn select_pin_group(&self, group: &str) -> Result<()> {
        self.pins.select(self.platform.as_ref(), group)
    }

    /// Release every attach-scoped resource still held.
    ///
    /// Best-effort: failures are logged and the remaining resources are still
    /// released. Safe to call more than once.
    pub(crate) fn release(&mut self) {
        self.regulators.release_all(self.platform.as_ref());
        self.prepared = false;

        if let Some(slot) = self.clock.as_mut() {
            if let Some(clk) = slot.handle.take() {
                if slot.enabled {
                    self.platform.clk_disable(clk);
                    slot.enabled = false;
                }
                if slot.prepared {
                    self.platform.clk_unprepare(clk);
                    slot.prepared = false;
                }
                self.platform.clk_put(clk);
                debug!("{}: released {}", self.config.device_name, clk);
            }
        }

        if let Some(gpio) = self.reset_gpio.take() {
            self.platform.gpio_free(gpio);
            debug!("{}: released reset line {}", self.config.device_name, gpio);
        }
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        if self.prepared {
            warn!(
                "{}: dropped while prepared, releasing rails",
                self.config.device_name
            );
        }
        self.release();
    }
}
