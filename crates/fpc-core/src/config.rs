//! Attach-time configuration.
//!
//! Carries the resource identifiers normally discovered from the device tree:
//! which platform the sensor sits on, the label of its reset line, the pin
//! groups the platform declares and the SPI clock name.
//!
//! ```
//! use fpc_core::{BringupConfig, PlatformKind};
//!
//! let config = BringupConfig::new(PlatformKind::Qcom)
//!     .device_name("fpc1020")
//!     .reset_gpio_label("fpc,gpio_rst");
//! assert!(config.validate().is_ok());
//! ```

use crate::constants::{
    DEFAULT_CLOCK_NAME, DEFAULT_DEVICE_NAME, DEFAULT_PIN_GROUP_ACTIVE, DEFAULT_PIN_GROUP_RESET,
    DEFAULT_RESET_GPIO_LABEL,
};
use crate::error::{Error, Result};
use crate::types::PlatformKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names of the two pin-control groups a platform declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinGroupNames {
    /// Group that holds the sensor in reset.
    pub reset: String,

    /// Group that releases the sensor from reset.
    pub active: String,
}

impl Default for PinGroupNames {
    fn default() -> Self {
        Self {
            reset: DEFAULT_PIN_GROUP_RESET.to_string(),
            active: DEFAULT_PIN_GROUP_ACTIVE.to_string(),
        }
    }
}

impl PinGroupNames {
    /// Groups in declaration order.
    pub fn all(&self) -> [&str; 2] {
        [&self.reset, &self.active]
    }
}

/// Bring-up configuration for one sensor instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BringupConfig {
    /// Device name used in logs and attribute registration
    pub device_name: String,

    /// Platform the sensor is attached to
    pub platform: PlatformKind,

    /// Device-tree label of the reset line
    pub reset_gpio_label: String,

    /// Pin-control group names
    pub pin_groups: PinGroupNames,

    /// Clock gated on platforms with clock control
    pub clock_name: String,
}

impl Default for BringupConfig {
    fn default() -> Self {
        Self {
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            platform: PlatformKind::Qcom,
            reset_gpio_label: DEFAULT_RESET_GPIO_LABEL.to_string(),
            pin_groups: PinGroupNames::default(),
            clock_name: DEFAULT_CLOCK_NAME.to_string(),
        }
    }
}

impl BringupConfig {
    /// Create a default configuration for the given platform
    pub fn new(platform: PlatformKind) -> Self {
        Self {
            platform,
            ..Default::default()
        }
    }

    /// Set the device name
    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    /// Set the reset line label
    pub fn reset_gpio_label(mut self, label: impl Into<String>) -> Self {
        self.reset_gpio_label = label.into();
        self
    }

    /// Set the pin group names
    pub fn pin_groups(mut self, reset: impl Into<String>, active: impl Into<String>) -> Self {
        self.pin_groups = PinGroupNames {
            reset: reset.into(),
            active: active.into(),
        };
        self
    }

    /// Set the clock name
    pub fn clock_name(mut self, name: impl Into<String>) -> Self {
        self.clock_name = name.into();
        self
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    /// Returns `Error::Config` on malformed JSON or invalid values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, `Error::Config` if it
    /// does not hold a valid configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that every identifier is usable.
    ///
    /// # Errors
    /// Returns `Error::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("device_name", &self.device_name),
            ("reset_gpio_label", &self.reset_gpio_label),
            ("pin_groups.reset", &self.pin_groups.reset),
            ("pin_groups.active", &self.pin_groups.active),
            ("clock_name", &self.clock_name),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(Error::config(format!("{field} must not be empty")));
        }

        // Selection is prefix-matched, so one group must not shadow the other.
        let PinGroupNames { reset, active } = &self.pin_groups;
        if reset.starts_with(active.as_str()) || active.starts_with(reset.as_str()) {
            return Err(Error::config(format!(
                "pin groups must be distinct: '{reset}' and '{active}'"
            )));
        }

        Ok(())
    }
}
