//! Attach, detach and the locked device handle.
//!
//! Attach runs the bring-up once per sensor:
//!
//! 1. pick the backend from the configured platform
//! 2. `init()` the backend
//! 3. acquire the reset line by label
//! 4. `configure()` the backend
//! 5. register the control attributes
//! 6. pulse the reset line
//!
//! Any failure aborts the attach. Everything acquired so far is held by the
//! half-built [`DeviceContext`], which releases it when dropped.

use std::sync::Arc;

use fpc_core::{BringupConfig, Error, PinLevel, PowerState, Result};
use fpc_hardware::{Delay, JitterDelay, Platform};
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::backend::{AnyBackend, VendorBackend};
use crate::context::DeviceContext;
use crate::control::{ControlCommand, ControlRequest};
use crate::sequencer::PowerTransition;

/// Builder for attaching a sensor.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use fpc_bringup::DeviceBuilder;
/// use fpc_core::{BringupConfig, PlatformKind, PowerState};
/// use fpc_hardware::mock::{MockPlatform, RecordingDelay};
///
/// let (platform, handle) = MockPlatform::new();
/// let device = DeviceBuilder::new(Arc::new(platform))
///     .with_config(BringupConfig::new(PlatformKind::Qcom))
///     .with_delay(Arc::new(RecordingDelay::new()))
///     .attach()
///     .unwrap();
///
/// assert_eq!(device.power_state(), PowerState::Prepared);
/// assert!(handle.rail_enabled("vdd_pwr"));
/// ```
#[derive(Debug)]
pub struct DeviceBuilder {
    platform: Arc<dyn Platform>,
    config: BringupConfig,
    backend: Option<AnyBackend>,
    delay: Arc<dyn Delay>,
}

impl DeviceBuilder {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            config: BringupConfig::default(),
            backend: None,
            delay: Arc::new(JitterDelay),
        }
    }

    pub fn with_config(mut self, config: BringupConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the backend picked from `config.platform`.
    pub fn with_backend(mut self, backend: AnyBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Bring the sensor up.
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the configuration is invalid.
    /// - `Error::ResourceAcquireFailed` if the reset line or clock cannot be
    ///   acquired.
    /// - `Error::Defer` if a platform subsystem is not ready; retry later.
    /// - `Error::ConfigureFailed` or the platform's error from configure or
    ///   attribute registration.
    pub fn attach(self) -> Result<DeviceHandle> {
        self.config.validate()?;

        let backend = self
            .backend
            .unwrap_or_else(|| AnyBackend::for_platform(self.config.platform));
        let mut ctx = DeviceContext::new(self.config, self.platform, backend, self.delay);
        info!("{}: attaching on {}", ctx.name(), backend.kind());

        backend.init(&mut ctx)?;

        let label = ctx.config.reset_gpio_label.clone();
        let gpio = ctx.platform().gpio_request(&label).map_err(|e| {
            error!("{}: failed to request {}: {}", ctx.name(), label, e);
            match e {
                Error::ResourceAcquireFailed { .. } | Error::Defer { .. } => e,
                other => Error::acquire_failed(label.as_str(), other.to_string()),
            }
        })?;
        ctx.reset_gpio = Some(gpio);
        debug!("{}: {} is {}", ctx.name(), label, gpio);

        backend.configure(&mut ctx)?;

        ctx.platform()
            .register_attributes(ctx.name(), &ControlCommand::ATTRIBUTE_NAMES)
            .inspect_err(|e| error!("{}: could not create attributes: {}", ctx.name(), e))?;

        ctx.hw_reset();

        info!("{}: attached, {}", ctx.name(), ctx.power_state());
        Ok(DeviceHandle {
            ctx: Mutex::new(ctx),
        })
    }
}

/// Attach with the backend picked from `config.platform` and the jittered
/// production delay.
pub fn attach(config: BringupConfig, platform: Arc<dyn Platform>) -> Result<DeviceHandle> {
    DeviceBuilder::new(platform).with_config(config).attach()
}

/// An attached sensor.
///
/// Every operation takes the device lock for its full duration, so callers
/// from any number of threads see the operations one at a time. Dropping
/// the handle detaches the device.
#[derive(Debug)]
pub struct DeviceHandle {
    ctx: Mutex<DeviceContext>,
}

impl DeviceHandle {
    /// Pulse the reset line.
    pub fn hw_reset(&self) {
        self.ctx.lock().hw_reset();
    }

    /// Power the sensor up. See [`DeviceContext::prepare`].
    pub fn prepare(&self) -> Result<()> {
        self.ctx.lock().prepare()
    }

    /// Power the sensor down. See [`DeviceContext::unprepare`].
    pub fn unprepare(&self) {
        self.ctx.lock().unprepare();
    }

    pub fn set_clock(&self, enabled: bool) -> Result<()> {
        self.ctx.lock().set_clock(enabled)
    }

    /// Switch a rail. See [`DeviceContext::switch_rail`].
    pub fn set_regulator(&self, name: &str, enable: bool) -> Result<()> {
        self.ctx.lock().switch_rail(name, enable)
    }

    pub fn power_state(&self) -> PowerState {
        self.ctx.lock().power_state()
    }

    pub fn is_prepared(&self) -> bool {
        self.ctx.lock().is_prepared()
    }

    /// Copy of the completed power transitions, oldest first.
    pub fn history(&self) -> Vec<PowerTransition> {
        self.ctx.lock().history().cloned().collect()
    }

    /// Current level of the reset line, as read through the backend.
    pub fn reset_line_level(&self) -> Option<PinLevel> {
        self.ctx.lock().reset_line_level()
    }

    pub fn name(&self) -> String {
        self.ctx.lock().name().to_string()
    }

    /// Run `f` against the context under the device lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&DeviceContext) -> R) -> R {
        f(&self.ctx.lock())
    }

    /// Handle a write to a control attribute.
    ///
    /// Returns the payload length on success.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidArgument` for a malformed payload.
    /// - `Error::NotFound` for an unknown rail name.
    /// - Any error of the operation the write triggers.
    pub fn store(&self, command: ControlCommand, payload: &str) -> Result<usize> {
        let request = ControlRequest::parse(command, payload).inspect_err(|e| {
            debug!("rejected {} write: {}", command, e);
        })?;

        let mut ctx = self.ctx.lock();
        match request {
            ControlRequest::Reset => ctx.hw_reset(),
            ControlRequest::Clock { enable } => ctx.set_clock(enable)?,
            ControlRequest::Regulator { name, enable } => ctx.switch_rail(&name, enable)?,
            ControlRequest::Power { prepare: true } => ctx.prepare()?,
            ControlRequest::Power { prepare: false } => ctx.unprepare(),
        }
        Ok(payload.len())
    }

    /// Detach the device: unregister the control attributes and release the
    /// rails, clock and reset line. Always succeeds.
    pub fn detach(self) {
        drop(self);
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        let ctx = self.ctx.get_mut();
        ctx.platform()
            .unregister_attributes(ctx.name(), &ControlCommand::ATTRIBUTE_NAMES);
        info!("{}: detached", ctx.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpc_core::PlatformKind;
    use fpc_hardware::mock::{MockPlatform, RecordingDelay};

    #[test]
    fn test_attach_rejects_invalid_config() {
        let (platform, handle) = MockPlatform::new();
        let config = BringupConfig::new(PlatformKind::Hikey).reset_gpio_label("");

        let err = DeviceBuilder::new(Arc::new(platform))
            .with_config(config)
            .with_delay(Arc::new(RecordingDelay::new()))
            .attach()
            .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
        assert!(handle.events().is_empty());
    }

    #[test]
    fn test_backend_override() {
        let (platform, handle) = MockPlatform::new();

        let device = DeviceBuilder::new(Arc::new(platform))
            .with_config(BringupConfig::new(PlatformKind::Qcom))
            .with_backend(AnyBackend::for_platform(PlatformKind::Hikey))
            .with_delay(Arc::new(RecordingDelay::new()))
            .attach()
            .unwrap();

        assert_eq!(device.inspect(|ctx| ctx.backend().kind()), PlatformKind::Hikey);
        assert_eq!(device.power_state(), PowerState::TornDown);
        assert!(handle.gpio_is_output("fpc,gpio_rst"));
    }

    #[test]
    fn test_store_returns_payload_length() {
        let (platform, _handle) = MockPlatform::new();
        let device = DeviceBuilder::new(Arc::new(platform))
            .with_config(BringupConfig::new(PlatformKind::Hikey))
            .with_delay(Arc::new(RecordingDelay::new()))
            .attach()
            .unwrap();

        assert_eq!(device.store(ControlCommand::Reset, "reset\n").unwrap(), 6);
        assert_eq!(device.store(ControlCommand::ClockEnable, "1").unwrap(), 1);
    }

    #[test]
    fn test_drop_unregisters_attributes() {
        let (platform, handle) = MockPlatform::new();
        let device = DeviceBuilder::new(Arc::new(platform))
            .with_config(BringupConfig::new(PlatformKind::Hikey))
            .with_delay(Arc::new(RecordingDelay::new()))
            .attach()
            .unwrap();
        assert!(handle.registered_attributes().is_some());

        drop(device);
        assert!(handle.registered_attributes().is_none());
        assert!(!handle.gpio_requested("fpc,gpio_rst"));
    }
}
