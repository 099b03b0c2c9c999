use crate::{Result, constants::REGULATORS, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Logic level of a GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinLevel {
    Low,
    High,
}

impl fmt::Display for PinLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PinLevel::Low => write!(f, "low"),
            PinLevel::High => write!(f, "high"),
        }
    }
}

macro_rules! handle_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Wrap a raw platform handle.
            #[must_use]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw platform handle.
            #[must_use]
            pub const fn as_u32(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

handle_id!(
    /// Handle of a requested GPIO line.
    GpioId,
    "GPIO"
);
handle_id!(
    /// Handle of an acquired regulator consumer.
    RegulatorId,
    "REG"
);
handle_id!(
    /// Handle of the device's pin controller.
    PinctrlId,
    "PINCTRL"
);
handle_id!(
    /// Handle of a resolved pin-control state.
    PinStateId,
    "PINSTATE"
);
handle_id!(
    /// Handle of an acquired clock.
    ClockId,
    "CLK"
);

/// A sleep window: hold at least `min`, at most `max`.
///
/// Only the lower bound is a correctness requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoldWindow {
    min: Duration,
    max: Duration,
}

impl HoldWindow {
    /// Create a window, swapping the bounds if given in reverse.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Window `[min_us, 2 * min_us]` microseconds.
    #[must_use]
    pub const fn doubling_micros(min_us: u64) -> Self {
        Self {
            min: Duration::from_micros(min_us),
            max: Duration::from_micros(min_us << 1),
        }
    }

    #[must_use]
    pub fn min(&self) -> Duration {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Whether `elapsed` satisfies the lower bound.
    #[must_use]
    pub fn is_satisfied_by(&self, elapsed: Duration) -> bool {
        elapsed >= self.min
    }
}

impl fmt::Display for HoldWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}us, {}us]",
            self.min.as_micros(),
            self.max.as_micros()
        )
    }
}

/// Compiled-in description of a power rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegulatorSpec {
    pub name: &'static str,
    /// Minimum voltage in microvolts.
    pub min_uv: u32,
    /// Maximum voltage in microvolts.
    pub max_uv: u32,
    /// Load current in microamps.
    pub load_ua: u32,
}

impl RegulatorSpec {
    /// Whether a requested name addresses this rail.
    ///
    /// The requested name must start with the rail name, so payloads carrying
    /// trailing characters still resolve.
    #[must_use]
    pub fn matches(&self, requested: &str) -> bool {
        requested.starts_with(self.name)
    }

    /// Find a rail in the compiled-in table, returning its slot index.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if no rail matches.
    pub fn lookup(requested: &str) -> Result<(usize, &'static RegulatorSpec)> {
        REGULATORS
            .iter()
            .enumerate()
            .find(|(_, spec)| spec.matches(requested))
            .ok_or_else(|| Error::regulator_not_found(requested))
    }
}

/// Hardware platform a sensor is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    /// HiKey960 development board: reset line only.
    Hikey,
    /// MediaTek MT6797: reset line and SPI clock gating.
    Mtk,
    /// Qualcomm: pin-control groups and voltage regulation.
    Qcom,
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 3] = [PlatformKind::Hikey, PlatformKind::Mtk, PlatformKind::Qcom];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Hikey => "hikey",
            PlatformKind::Mtk => "mtk",
            PlatformKind::Qcom => "qcom",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlatformKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hikey" | "hikey960" => Ok(PlatformKind::Hikey),
            "mtk" | "mt6797" => Ok(PlatformKind::Mtk),
            "qcom" => Ok(PlatformKind::Qcom),
            other => Err(Error::config(format!("Unknown platform: {other}"))),
        }
    }
}

/// Electrical state of the sensor as tracked by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    /// Rails off, pin-mux holding reset.
    TornDown,
    /// Rails on, pin-mux in the active group.
    Prepared,
}

impl PowerState {
    #[must_use]
    pub fn from_prepared(prepared: bool) -> Self {
        if prepared {
            PowerState::Prepared
        } else {
            PowerState::TornDown
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PowerState::TornDown => write!(f, "TornDown"),
            PowerState::Prepared => write!(f, "Prepared"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("vdd_pwr", 0)]
    #[case("vdd_pwr\n", 0)]
    #[case("vdd_pwr_extra", 0)]
    fn test_regulator_lookup_valid(#[case] input: &str, #[case] slot: usize) {
        let (index, spec) = RegulatorSpec::lookup(input).unwrap();
        assert_eq!(index, slot);
        assert_eq!(spec.name, "vdd_pwr");
    }

    #[rstest]
    #[case("badname")]
    #[case("vdd")]
    #[case("")]
    fn test_regulator_lookup_invalid(#[case] input: &str) {
        let err = RegulatorSpec::lookup(input).unwrap_err();
        assert!(err.is_not_found());
    }

    #[rstest]
    #[case("hikey", PlatformKind::Hikey)]
    #[case("MT6797", PlatformKind::Mtk)]
    #[case(" qcom ", PlatformKind::Qcom)]
    fn test_platform_kind_parse(#[case] input: &str, #[case] expected: PlatformKind) {
        assert_eq!(input.parse::<PlatformKind>().unwrap(), expected);
        assert_eq!(expected.as_str().parse::<PlatformKind>().unwrap(), expected);
    }

    #[test]
    fn test_platform_kind_unknown() {
        assert!("exynos".parse::<PlatformKind>().is_err());
    }

    #[test]
    fn test_hold_window() {
        let window = HoldWindow::new(Duration::from_micros(20), Duration::from_micros(10));
        assert_eq!(window.min(), Duration::from_micros(10));
        assert_eq!(window.max(), Duration::from_micros(20));
        assert!(window.is_satisfied_by(Duration::from_micros(10)));
        assert!(!window.is_satisfied_by(Duration::from_micros(9)));
        assert_eq!(window.to_string(), "[10us, 20us]");
    }

    #[test]
    fn test_power_state() {
        assert_eq!(PowerState::from_prepared(true), PowerState::Prepared);
        assert_eq!(PowerState::from_prepared(false), PowerState::TornDown);
        assert_eq!(
            serde_json::to_string(&PowerState::TornDown).unwrap(),
            "\"torn_down\""
        );
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(GpioId::new(42).to_string(), "GPIO#42");
        assert_eq!(RegulatorId::new(3).as_u32(), 3);
    }
}
