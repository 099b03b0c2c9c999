//! Platform primitive layer for FPC sensor bring-up.
//!
//! This crate defines the small set of control primitives the bring-up
//! engine needs from a hardware platform, as object-safe traits:
//!
//! - [`GpioOps`]: request a line, set its direction, read and drive it.
//! - [`RegulatorOps`]: acquire a supply, set voltage and load, enable and
//!   disable it.
//! - [`PinctrlOps`]: acquire the pin controller, resolve and select states.
//! - [`ClockOps`]: acquire, prepare and gate a clock.
//! - [`AttributeOps`]: expose the operator attributes.
//!
//! [`Platform`] bundles them. Sleeps go through the [`Delay`] trait so the
//! timing-sensitive sequences can run against a recording double in tests.
//!
//! # Mock Implementations
//!
//! The [`mock`] module (enabled by the default `mock` feature) provides a
//! simulated platform that records every state change, for development and
//! testing without physical hardware:
//!
//! ```
//! use fpc_hardware::mock::{HwEvent, MockPlatform};
//! use fpc_hardware::RegulatorOps;
//!
//! let (platform, handle) = MockPlatform::new();
//! let vdd = platform.regulator_get("vdd_pwr").unwrap();
//! platform.regulator_enable(vdd).unwrap();
//!
//! assert!(handle.rail_enabled("vdd_pwr"));
//! assert_eq!(handle.count_events(|e| matches!(e, HwEvent::RegulatorEnabled { .. })), 1);
//! ```

pub mod delay;
#[cfg(feature = "mock")]
pub mod mock;
pub mod traits;

pub use delay::JitterDelay;
pub use traits::{AttributeOps, ClockOps, Delay, GpioOps, PinctrlOps, Platform, RegulatorOps};
