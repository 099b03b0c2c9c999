//! Qualcomm backend.
//!
//! Reset routing is done through two pin-control groups rather than by
//! driving the line's direction, and the sensor rail is a real regulator.
//! Configure resolves both groups and powers the sensor up so it is ready by
//! the end of attach.

use fpc_core::{PlatformKind, Result};
use tracing::{info, warn};

use super::VendorBackend;
use crate::context::DeviceContext;
use crate::pinctrl::PinGroups;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QcomBackend;

impl VendorBackend for QcomBackend {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Qcom
    }

    fn configure(&self, ctx: &mut DeviceContext) -> Result<()> {
        let names = ctx.config.pin_groups.clone();
        ctx.pins = PinGroups::resolve(ctx.platform(), &names.all())?;
        info!("{}: resolved {} pin groups", ctx.name(), ctx.pins.len());

        if let Err(e) = ctx.prepare() {
            warn!("{}: initial power-up failed: {}", ctx.name(), e);
        }
        Ok(())
    }

    fn has_regulator_control(&self) -> bool {
        true
    }

    fn set_regulator(&self, ctx: &mut DeviceContext, name: &str, enable: bool) -> Result<()> {
        ctx.regulators.set(ctx.platform.as_ref(), name, enable)
    }
}
