//! Electrical bring-up for FPC fingerprint sensors.
//!
//! This crate sequences power, reset, clock and pin-mux for a sensor so that
//! the protocol layer above it finds the chip electrically ready. It drives
//! the hardware only through the primitives in `fpc_hardware`, so the same
//! sequencing runs on a real platform or the mock.
//!
//! # Architecture
//!
//! - [`backend`]: one implementation per vendor platform, dispatched through
//!   [`AnyBackend`]
//! - [`regulator`]: lazily acquired rail handles
//! - [`pinctrl`]: resolved pin-control groups
//! - [`reset`]: the reset pulse
//! - [`sequencer`]: the `TornDown`/`Prepared` state machine
//! - [`control`]: operator attribute parsing
//! - [`device`]: attach, detach and the locked [`DeviceHandle`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fpc_bringup::{ControlCommand, DeviceBuilder};
//! use fpc_core::{BringupConfig, PlatformKind};
//! use fpc_hardware::mock::{MockPlatform, RecordingDelay};
//!
//! let (platform, handle) = MockPlatform::new();
//! let device = DeviceBuilder::new(Arc::new(platform))
//!     .with_config(BringupConfig::new(PlatformKind::Qcom))
//!     .with_delay(Arc::new(RecordingDelay::new()))
//!     .attach()?;
//!
//! device.store(ControlCommand::DevicePrepare, "0")?;
//! assert!(!handle.rail_enabled("vdd_pwr"));
//!
//! device.store(ControlCommand::RegulatorEnableSet, "vdd_pwr,e")?;
//! assert!(handle.rail_enabled("vdd_pwr"));
//!
//! device.detach();
//! # Ok::<(), fpc_core::Error>(())
//! ```

pub mod backend;
pub mod context;
pub mod control;
pub mod device;
pub mod pinctrl;
pub mod regulator;
pub mod reset;
pub mod sequencer;

pub use backend::{AnyBackend, VendorBackend};
pub use context::{ClockSlot, DeviceContext};
pub use control::{ControlCommand, ControlRequest};
pub use device::{DeviceBuilder, DeviceHandle, attach};
pub use pinctrl::PinGroups;
pub use regulator::RegulatorRegistry;
pub use sequencer::PowerTransition;
