//! MediaTek MT6797 backend.
//!
//! The sensor's SPI block is clocked from `spi-main`, which the platform gates
//! when idle. The backend keeps the clock handle in a private slot allocated
//! at init.

use fpc_core::{Error, PinLevel, PlatformKind, Result};
use tracing::{debug, error, warn};

use super::{VendorBackend, board_managed_rail};
use crate::context::{ClockSlot, DeviceContext};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MtkBackend;

impl VendorBackend for MtkBackend {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Mtk
    }

    fn init(&self, ctx: &mut DeviceContext) -> Result<()> {
        ctx.clock.get_or_insert_with(ClockSlot::default);
        Ok(())
    }

    fn configure(&self, ctx: &mut DeviceContext) -> Result<()> {
        let gpio = ctx.reset_gpio()?;
        ctx.platform()
            .gpio_direction_output(gpio, PinLevel::High)
            .map_err(|e| {
                error!(
                    "{}: gpio_direction_output failed for RST: {}",
                    ctx.name(),
                    e
                );
                Error::configure_failed(format!("reset line direction: {e}"))
            })?;

        if ctx.clock.is_none() {
            return Err(Error::configure_failed("clock slot not allocated"));
        }

        let clock_name = ctx.config.clock_name.clone();
        let clk = ctx.platform().clk_get(&clock_name).map_err(|e| {
            error!("{}: failed to get {}: {}", ctx.name(), clock_name, e);
            Error::acquire_failed(clock_name.as_str(), e.to_string())
        })?;
        if let Some(slot) = ctx.clock.as_mut() {
            slot.handle = Some(clk);
        }

        ctx.platform().clk_prepare(clk).map_err(|e| {
            error!("{}: failed to prepare {}: {}", ctx.name(), clock_name, e);
            Error::configure_failed(format!("prepare {clock_name}: {e}"))
        })?;
        if let Some(slot) = ctx.clock.as_mut() {
            slot.prepared = true;
        }

        if let Err(e) = self.set_clock(ctx, true) {
            warn!(
                "{}: {} left gated after configure: {}",
                ctx.name(),
                clock_name,
                e
            );
        }

        Ok(())
    }

    fn has_clock_control(&self) -> bool {
        true
    }

    fn set_clock(&self, ctx: &mut DeviceContext, enabled: bool) -> Result<()> {
        let slot = ctx.clock.unwrap_or_default();
        let clk = slot.handle.ok_or_else(|| {
            Error::acquire_failed(ctx.config.clock_name.as_str(), "not acquired")
        })?;

        // Platform enables are counted; only switch on a change.
        if slot.enabled == enabled {
            debug!(
                "{}: {} already {}",
                ctx.name(),
                ctx.config.clock_name,
                if enabled { "enabled" } else { "disabled" }
            );
            return Ok(());
        }

        if enabled {
            ctx.platform().clk_enable(clk).inspect_err(|e| {
                error!(
                    "{}: Error enabling {}: {}",
                    ctx.name(),
                    ctx.config.clock_name,
                    e
                );
            })?;
        } else {
            ctx.platform().clk_disable(clk);
        }

        if let Some(slot) = ctx.clock.as_mut() {
            slot.enabled = enabled;
        }
        debug!(
            "{}: {} {}",
            ctx.name(),
            ctx.config.clock_name,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    fn set_regulator(&self, ctx: &mut DeviceContext, name: &str, enable: bool) -> Result<()> {
        board_managed_rail(ctx, name, enable)
    }
}
