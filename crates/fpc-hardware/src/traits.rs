//! Platform primitive trait definitions.
//!
//! These traits are the contract between the bring-up engine and whatever
//! actually owns the hardware: a kernel's GPIO, regulator, pin-control and
//! clock frameworks, a userspace character-device shim, or the simulated
//! platform in [`mock`](crate::mock).
//!
//! All methods take `&self`: the underlying frameworks are internally
//! synchronized and handles are plain copyable ids. Serializing *sequences*
//! of calls is the caller's job.
//!
//! # Object Safety
//!
//! Every trait here is object-safe, and the bring-up engine holds the platform
//! as `Arc<dyn Platform>` so that one platform instance can serve several
//! attached sensors.

use std::fmt::Debug;

use fpc_core::{
    ClockId, GpioId, HoldWindow, PinLevel, PinStateId, PinctrlId, RegulatorId, Result,
};

/// GPIO line control.
pub trait GpioOps: Send + Sync {
    /// Request the line registered under `label` for exclusive use.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is unknown or the line is already owned.
    fn gpio_request(&self, label: &str) -> Result<GpioId>;

    /// Release a previously requested line.
    fn gpio_free(&self, gpio: GpioId);

    /// Switch the line to output, driving `level` immediately.
    fn gpio_direction_output(&self, gpio: GpioId, level: PinLevel) -> Result<()>;

    /// Read the current level of the line.
    fn gpio_get_value(&self, gpio: GpioId) -> PinLevel;

    /// Drive the line. Writes on a requested line cannot fail.
    fn gpio_set_value(&self, gpio: GpioId, level: PinLevel);
}

/// Power rail control, modeled on consumer-side regulator APIs.
pub trait RegulatorOps: Send + Sync {
    /// Acquire a consumer handle for the named supply.
    fn regulator_get(&self, name: &str) -> Result<RegulatorId>;

    /// Release a consumer handle.
    fn regulator_put(&self, reg: RegulatorId);

    /// Number of selectable voltages; zero means the rail is fixed.
    fn regulator_count_voltages(&self, reg: RegulatorId) -> usize;

    fn regulator_set_voltage(&self, reg: RegulatorId, min_uv: u32, max_uv: u32) -> Result<()>;

    fn regulator_set_load(&self, reg: RegulatorId, load_ua: u32) -> Result<()>;

    fn regulator_enable(&self, reg: RegulatorId) -> Result<()>;

    fn regulator_disable(&self, reg: RegulatorId) -> Result<()>;

    fn regulator_is_enabled(&self, reg: RegulatorId) -> bool;
}

/// Pin multiplexing control.
pub trait PinctrlOps: Send + Sync {
    /// Get the device's pin controller.
    ///
    /// # Errors
    ///
    /// Returns `Error::Defer` when the pin-control subsystem is not ready
    /// yet, any other error when the target does not use pin control.
    fn pinctrl_get(&self) -> Result<PinctrlId>;

    /// Resolve a named state of the pin controller.
    fn pinctrl_lookup_state(&self, pinctrl: PinctrlId, name: &str) -> Result<PinStateId>;

    /// Activate a state, deactivating whatever state was active before.
    fn pinctrl_select_state(&self, pinctrl: PinctrlId, state: PinStateId) -> Result<()>;
}

/// Clock gating.
///
/// Prepare and enable are reference counted on the platform side: every
/// successful `clk_prepare` needs one `clk_unprepare` and every successful
/// `clk_enable` needs one `clk_disable` before the clock is actually gated.
pub trait ClockOps: Send + Sync {
    fn clk_get(&self, name: &str) -> Result<ClockId>;

    fn clk_put(&self, clk: ClockId);

    fn clk_prepare(&self, clk: ClockId) -> Result<()>;

    fn clk_unprepare(&self, clk: ClockId);

    fn clk_enable(&self, clk: ClockId) -> Result<()>;

    fn clk_disable(&self, clk: ClockId);
}

/// Host of the operator-facing attribute files.
pub trait AttributeOps: Send + Sync {
    /// Expose the named attributes for `device`.
    fn register_attributes(&self, device: &str, names: &[&str]) -> Result<()>;

    /// Remove previously exposed attributes.
    fn unregister_attributes(&self, device: &str, names: &[&str]);
}

/// Everything a sensor bring-up needs from its platform.
///
/// Blanket-implemented for any type providing all primitive families.
pub trait Platform: GpioOps + RegulatorOps + PinctrlOps + ClockOps + AttributeOps + Debug {}

impl<T> Platform for T where
    T: GpioOps + RegulatorOps + PinctrlOps + ClockOps + AttributeOps + Debug
{
}

/// Blocking sleep over a hold window.
///
/// Implementations must never return before `window.min()` has elapsed on the
/// caller's clock, except for test doubles that do not touch real hardware.
pub trait Delay: Send + Sync + Debug {
    fn sleep_range(&self, window: HoldWindow);
}
