//! Vendor capability table.
//!
//! Each supported platform provides one [`VendorBackend`] implementation.
//! The platforms disagree on which primitives exist:
//!
//! | Backend | Reset line | Clock gating | Pin-control groups | Voltage regulation |
//! |---------|------------|--------------|--------------------|--------------------|
//! | [`HikeyBackend`] | yes | no | no | no |
//! | [`MtkBackend`] | yes | yes | no | no |
//! | [`QcomBackend`] | via pin groups | no | yes | yes |
//!
//! Missing capabilities are trait default methods rather than optional slots,
//! so call sites never branch on a capability except through
//! [`VendorBackend::has_clock_control`] and
//! [`VendorBackend::has_regulator_control`].
//!
//! # Enum Dispatch
//!
//! [`AnyBackend`] wraps the three implementations so a device context can
//! hold its backend by value. The backend is picked once at attach from the
//! platform identity and never swapped.
//!
//! ```
//! use fpc_bringup::backend::{AnyBackend, VendorBackend};
//! use fpc_core::PlatformKind;
//!
//! let backend = AnyBackend::for_platform(PlatformKind::Mtk);
//! assert!(backend.has_clock_control());
//! assert!(!AnyBackend::for_platform(PlatformKind::Qcom).has_clock_control());
//! ```

pub mod hikey;
pub mod mtk;
pub mod qcom;

pub use hikey::HikeyBackend;
pub use mtk::MtkBackend;
pub use qcom::QcomBackend;

use fpc_core::{GpioId, PinLevel, PlatformKind, RegulatorSpec, Result};
use tracing::{debug, error};

use crate::context::DeviceContext;

/// Platform-specific implementation of the hardware control primitives.
pub trait VendorBackend {
    /// Platform this backend drives.
    fn kind(&self) -> PlatformKind;

    /// Backend-local preallocation, run once per attach before the reset line
    /// is acquired.
    fn init(&self, _ctx: &mut DeviceContext) -> Result<()> {
        Ok(())
    }

    /// One-time setup, run once per attach after the reset line is acquired.
    ///
    /// A failure aborts the attach; nothing is retried.
    fn configure(&self, ctx: &mut DeviceContext) -> Result<()>;

    fn read_pin(&self, ctx: &DeviceContext, gpio: GpioId) -> PinLevel {
        ctx.platform().gpio_get_value(gpio)
    }

    fn write_pin(&self, ctx: &DeviceContext, gpio: GpioId, level: PinLevel) {
        ctx.platform().gpio_set_value(gpio, level);
    }

    /// Whether [`set_clock`](VendorBackend::set_clock) does anything.
    fn has_clock_control(&self) -> bool {
        false
    }

    /// Gate the sensor clock. Backends without clock control succeed.
    fn set_clock(&self, _ctx: &mut DeviceContext, _enabled: bool) -> Result<()> {
        Ok(())
    }

    /// Whether rails are switched by this backend rather than the board.
    fn has_regulator_control(&self) -> bool {
        false
    }

    /// Turn a named rail on or off.
    fn set_regulator(&self, ctx: &mut DeviceContext, name: &str, enable: bool) -> Result<()>;
}

/// Rails on boards without voltage regulation are powered by the board.
///
/// The name is still checked against the rail table so operators get the
/// same `NotFound` on every platform.
pub(crate) fn board_managed_rail(ctx: &DeviceContext, name: &str, enable: bool) -> Result<()> {
    let (_, spec) = RegulatorSpec::lookup(name).inspect_err(|_| {
        error!("{}: Regulator {} not found", ctx.name(), name);
    })?;
    debug!(
        "{}: {} is board-managed, ignoring {}",
        ctx.name(),
        spec.name,
        if enable { "enable" } else { "disable" }
    );
    Ok(())
}

/// Enum wrapper for backend dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnyBackend {
    /// HiKey960: reset line only.
    Hikey(HikeyBackend),
    /// MediaTek MT6797: reset line and SPI clock gating.
    Mtk(MtkBackend),
    /// Qualcomm: pin-control groups and voltage regulation.
    Qcom(QcomBackend),
}

impl AnyBackend {
    /// Pick the backend for a platform.
    pub fn for_platform(kind: PlatformKind) -> Self {
        match kind {
            PlatformKind::Hikey => Self::Hikey(HikeyBackend),
            PlatformKind::Mtk => Self::Mtk(MtkBackend),
            PlatformKind::Qcom => Self::Qcom(QcomBackend),
        }
    }
}

impl VendorBackend for AnyBackend {
    fn kind(&self) -> PlatformKind {
        match self {
            Self::Hikey(backend) => backend.kind(),
            Self::Mtk(backend) => backend.kind(),
            Self::Qcom(backend) => backend.kind(),
        }
    }

    fn init(&self, ctx: &mut DeviceContext) -> Result<()> {
        match self {
            Self::Hikey(backend) => backend.init(ctx),
            Self::Mtk(backend) => backend.init(ctx),
            Self::Qcom(backend) => backend.init(ctx),
        }
    }

    fn configure(&self, ctx: &mut DeviceContext) -> Result<()> {
        match self {
            Self::Hikey(backend) => backend.configure(ctx),
            Self::Mtk(backend) => backend.configure(ctx),
            Self::Qcom(backend) => backend.configure(ctx),
        }
    }

    fn read_pin(&self, ctx: &DeviceContext, gpio: GpioId) -> PinLevel {
        match self {
            Self::Hikey(backend) => backend.read_pin(ctx, gpio),
            Self::Mtk(backend) => backend.read_pin(ctx, gpio),
            Self::Qcom(backend) => backend.read_pin(ctx, gpio),
        }
    }

    fn write_pin(&self, ctx: &DeviceContext, gpio: GpioId, level: PinLevel) {
        match self {
            Self::Hikey(backend) => backend.write_pin(ctx, gpio, level),
            Self::Mtk(backend) => backend.write_pin(ctx, gpio, level),
            Self::Qcom(backend) => backend.write_pin(ctx, gpio, level),
        }
    }

    fn has_clock_control(&self) -> bool {
        match self {
            Self::Hikey(backend) => backend.has_clock_control(),
            Self::Mtk(backend) => backend.has_clock_control(),
            Self::Qcom(backend) => backend.has_clock_control(),
        }
    }

    fn set_clock(&self, ctx: &mut DeviceContext, enabled: bool) -> Result<()> {
        match self {
            Self::Hikey(backend) => backend.set_clock(ctx, enabled),
            Self::Mtk(backend) => backend.set_clock(ctx, enabled),
            Self::Qcom(backend) => backend.set_clock(ctx, enabled),
        }
    }

    fn has_regulator_control(&self) -> bool {
        match self {
            Self::Hikey(backend) => backend.has_regulator_control(),
            Self::Mtk(backend) => backend.has_regulator_control(),
            Self::Qcom(backend) => backend.has_regulator_control(),
        }
    }

    fn set_regulator(&self, ctx: &mut DeviceContext, name: &str, enable: bool) -> Result<()> {
        match self {
            Self::Hikey(backend) => backend.set_regulator(ctx, name, enable),
            Self::Mtk(backend) => backend.set_regulator(ctx, name, enable),
            Self::Qcom(backend) => backend.set_regulator(ctx, name, enable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_for_platform() {
        for kind in PlatformKind::ALL {
            assert_eq!(AnyBackend::for_platform(kind).kind(), kind);
        }
    }

    #[test]
    fn test_clock_capability() {
        assert!(!AnyBackend::for_platform(PlatformKind::Hikey).has_clock_control());
        assert!(AnyBackend::for_platform(PlatformKind::Mtk).has_clock_control());
        assert!(!AnyBackend::for_platform(PlatformKind::Qcom).has_clock_control());
    }

    #[test]
    fn test_regulator_capability() {
        assert!(!AnyBackend::for_platform(PlatformKind::Hikey).has_regulator_control());
        assert!(!AnyBackend::for_platform(PlatformKind::Mtk).has_regulator_control());
        assert!(AnyBackend::for_platform(PlatformKind::Qcom).has_regulator_control());
    }
}
