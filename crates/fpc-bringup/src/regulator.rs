//! Regulator registry.
//!
//! Tracks at most one live consumer handle per rail in the compiled-in
//! [`REGULATORS`] table. Handles are acquired lazily on first enable and
//! released on disable, so every enable after a disable starts from a fresh
//! handle and reapplies voltage and load.

use fpc_core::{Error, RegulatorId, RegulatorSpec, Result, constants::REGULATORS};
use fpc_hardware::Platform;
use tracing::{debug, error, warn};

/// Live rail handles, indexed parallel to [`REGULATORS`].
#[derive(Debug)]
pub struct RegulatorRegistry {
    slots: Vec<Option<RegulatorId>>,
}

impl Default for RegulatorRegistry {
    fn default() -> Self {
        Self {
            slots: vec![None; REGULATORS.len()],
        }
    }
}

impl RegulatorRegistry {
    /// Live handle of a rail, if one is held.
    pub fn live_handle(&self, name: &str) -> Option<RegulatorId> {
        let (index, _) = RegulatorSpec::lookup(name).ok()?;
        self.slots[index]
    }

    /// Number of rails with a live handle.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Turn a rail on or off.
    ///
    /// Enabling a rail that is already on, or disabling one without a live
    /// handle, succeeds without touching the platform.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` if `name` matches no rail.
    /// - `Error::ResourceAcquireFailed` if no handle can be acquired.
    /// - `Error::HardwareEnableFailed` if the rail rejects the enable; the
    ///   handle is released before returning.
    pub fn set(&mut self, platform: &dyn Platform, name: &str, enable: bool) -> Result<()> {
        let (index, spec) = RegulatorSpec::lookup(name).inspect_err(|_| {
            error!("Regulator {} not found", name);
        })?;

        if enable {
            self.enable(platform, index, spec)
        } else {
            self.disable(platform, index, spec);
            Ok(())
        }
    }

    fn enable(
        &mut self,
        platform: &dyn Platform,
        index: usize,
        spec: &RegulatorSpec,
    ) -> Result<()> {
        let reg = match self.slots[index] {
            Some(reg) if platform.regulator_is_enabled(reg) => {
                debug!("{} already enabled", spec.name);
                return Ok(());
            }
            Some(reg) => reg,
            None => platform.regulator_get(spec.name).map_err(|e| {
                error!("Unable to get {}: {}", spec.name, e);
                Error::acquire_failed(spec.name, e.to_string())
            })?,
        };

        if platform.regulator_count_voltages(reg) > 0 {
            if let Err(e) = platform.regulator_set_voltage(reg, spec.min_uv, spec.max_uv) {
                error!("Unable to set voltage on {}, {}", spec.name, e);
            }
        }

        if let Err(e) = platform.regulator_set_load(reg, spec.load_ua) {
            error!("Unable to set current on {}, {}", spec.name, e);
        }

        if let Err(e) = platform.regulator_enable(reg) {
            error!("error enabling {}: {}", spec.name, e);
            platform.regulator_put(reg);
            self.slots[index] = None;
            return Err(Error::enable_failed(spec.name, e.to_string()));
        }

        self.slots[index] = Some(reg);
        debug!("enabled {}", spec.name);
        Ok(())
    }

    fn disable(&mut self, platform: &dyn Platform, index: usize, spec: &RegulatorSpec) {
        let Some(reg) = self.slots[index].take() else {
            return;
        };

        if platform.regulator_is_enabled(reg) {
            match platform.regulator_disable(reg) {
                Ok(()) => debug!("disabled {}", spec.name),
                Err(e) => warn!("error disabling {}: {}", spec.name, e),
            }
        }
        platform.regulator_put(reg);
    }

    /// Disable and release every live rail.
    pub(crate) fn release_all(&mut self, platform: &dyn Platform) {
        for (index, spec) in REGULATORS.iter().enumerate() {
            self.disable(platform, index, spec);
        }
    }
}
