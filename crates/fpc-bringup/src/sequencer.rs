//! Power/reset sequencing state machine.
//!
//! Brings the sensor's electrical environment up or down. The machine has
//! two states and cycles freely between them for the lifetime of a device:
//!
//! ```text
//!              prepare()
//!   TornDown ────────────► Prepared
//!      ▲                      │
//!      └──────────────────────┘
//!             unprepare()
//! ```
//!
//! Both transitions are idempotent: asking for the current state returns
//! success without touching the hardware.
//!
//! # Failure Policy
//!
//! Only a rail that refuses to enable during `prepare()` is fatal; the
//! machine rolls back to `TornDown` and reports the enable failure.
//! Pin-group selection is advisory on some platforms, so its failures are
//! logged and the sequence continues. Tear-down never stops early.
//!
//! # Protocol Readiness
//!
//! Chip-select is not controlled here. After power-up the protocol layer has
//! to issue its own soft reset before talking to the sensor; this machine
//! only guarantees electrical readiness.

use std::time::{Duration, Instant};

use fpc_core::{
    PowerState, RegulatorSpec, Result,
    constants::{POWER_SETTLE_HOLD, PRIMARY_REGULATOR},
};
use tracing::{debug, error, info, warn};

use crate::backend::VendorBackend;
use crate::context::DeviceContext;
use crate::reset;

/// Maximum number of power transitions kept per device.
const MAX_HISTORY_SIZE: usize = 64;

/// A completed power transition.
#[derive(Debug, Clone)]
pub struct PowerTransition {
    /// The state transitioned from.
    pub from: PowerState,

    /// The state transitioned to.
    pub to: PowerState,

    /// When the transition completed.
    pub timestamp: Instant,
}

impl PowerTransition {
    pub fn new(from: PowerState, to: PowerState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Time since the transition completed.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

impl DeviceContext {
    /// Power the sensor up: `TornDown` → `Prepared`.
    ///
    /// Sequence: hold the reset group, enable the primary rail, let it
    /// settle, release the reset group.
    ///
    /// # Errors
    ///
    /// Returns the rail's enable error. The rail is released, the context is
    /// back in `TornDown` and no live handle remains.
    pub fn prepare(&mut self) -> Result<()> {
        if self.prepared {
            debug!("{}: already prepared", self.name());
            return Ok(());
        }
        self.prepared = true;

        let groups = self.config.pin_groups.clone();
        self.select_best_effort(&groups.reset);

        if let Err(e) = self.set_regulator(PRIMARY_REGULATOR, true) {
            error!(
                "{}: failed to power {}: {}",
                self.name(),
                PRIMARY_REGULATOR,
                e
            );
            if let Err(cleanup) = self.set_regulator(PRIMARY_REGULATOR, false) {
                warn!(
                    "{}: rollback of {} failed: {}",
                    self.name(),
                    PRIMARY_REGULATOR,
                    cleanup
                );
            }
            self.prepared = false;
            return Err(e);
        }

        self.delay.sleep_range(POWER_SETTLE_HOLD);

        self.select_best_effort(&groups.active);

        self.record_transition(PowerState::TornDown, PowerState::Prepared);
        info!("{}: prepared", self.name());
        Ok(())
    }

    /// Power the sensor down: `Prepared` → `TornDown`.
    ///
    /// Sequence: hold the reset group, let the sensor settle, disable the
    /// primary rail. Never fails; problems are logged. The reset line stays
    /// acquired.
    pub fn unprepare(&mut self) {
        if !self.prepared {
            debug!("{}: already torn down", self.name());
            return;
        }

        let groups = self.config.pin_groups.clone();
        self.select_best_effort(&groups.reset);

        self.delay.sleep_range(POWER_SETTLE_HOLD);

        if let Err(e) = self.set_regulator(PRIMARY_REGULATOR, false) {
            warn!(
                "{}: failed to disable {}: {}",
                self.name(),
                PRIMARY_REGULATOR,
                e
            );
        }
        self.prepared = false;

        self.record_transition(PowerState::Prepared, PowerState::TornDown);
        info!("{}: torn down", self.name());
    }

    /// Switch a rail on an operator's request.
    ///
    /// Cutting the primary rail on a regulated board while prepared leaves
    /// the sensor unpowered, so the machine drops to `TornDown` and a later
    /// `prepare()` powers it up again.
    pub fn switch_rail(&mut self, name: &str, enable: bool) -> Result<()> {
        self.set_regulator(name, enable)?;

        if enable || !self.prepared || !self.backend.has_regulator_control() {
            return Ok(());
        }
        let (_, spec) = RegulatorSpec::lookup(name)?;
        if spec.name == PRIMARY_REGULATOR {
            warn!("{}: {} cut while prepared", self.name(), spec.name);
            self.prepared = false;
            self.record_transition(PowerState::Prepared, PowerState::TornDown);
        }
        Ok(())
    }

    /// Pulse the reset line. Valid in either power state.
    pub fn hw_reset(&self) {
        match self.reset_gpio {
            Some(gpio) => {
                reset::pulse(self, gpio);
                info!("{}: Using {} as RST", self.name(), gpio);
            }
            None => warn!("{}: reset requested without a reset line", self.name()),
        }
    }

    /// Completed power transitions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &PowerTransition> {
        self.history.iter()
    }

    fn select_best_effort(&self, group: &str) {
        if let Err(e) = self.select_pin_group(group) {
            debug!("{}: continuing without '{}': {}", self.name(), group, e);
        }
    }

    fn record_transition(&mut self, from: PowerState, to: PowerState) {
        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(PowerTransition::new(from, to));
    }
}
