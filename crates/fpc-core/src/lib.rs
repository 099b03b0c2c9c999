//! Core building blocks shared by the FPC sensor bring-up crates.
//!
//! This crate holds everything that both the platform primitives
//! (`fpc-hardware`) and the orchestration engine (`fpc-bringup`) need to agree
//! on: the error taxonomy, strongly typed resource handles, the compiled-in
//! regulator table, sequencing timings and the attach configuration.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{BringupConfig, PinGroupNames};
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
