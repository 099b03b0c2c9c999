//! HiKey960 backend.
//!
//! The development board wires the reset line straight to a SoC GPIO and
//! powers the sensor from an always-on rail, so the only setup is putting the
//! reset line into output mode.

use fpc_core::{Error, PinLevel, PlatformKind, Result};
use tracing::{error, info};

use super::{VendorBackend, board_managed_rail};
use crate::context::DeviceContext;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HikeyBackend;

impl VendorBackend for HikeyBackend {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Hikey
    }

    fn configure(&self, ctx: &mut DeviceContext) -> Result<()> {
        info!("{}: configuring for {}", ctx.name(), self.kind());

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
            })
    }

    fn set_regulator(&self, ctx: &mut DeviceContext, name: &str, enable: bool) -> Result<()> {
        board_managed_rail(ctx, name, enable)
    }
}
