//! Operator control surface.
//!
//! Four write-only attributes are exposed per device. Each write carries a
//! raw text payload; a successful write reports the full payload length as
//! consumed, whatever part of it was actually parsed.
//!
//! | Attribute | Payload | Effect |
//! |-----------|---------|--------|
//! | `reset` | starts with `reset` | pulse the reset line |
//! | `clock_enable` | `1` enables, anything else disables | gate the clock |
//! | `regulator_enable_set` | `<name>,<e\|d>` | switch a rail |
//! | `device_prepare` | `1` or `0` | power up or down |
//!
//! Parsing is separate from execution: [`ControlRequest::parse`] turns a
//! write into a typed request, and [`DeviceHandle::store`](crate::DeviceHandle::store)
//! runs it under the device lock.

use std::fmt;
use std::str::FromStr;

use fpc_core::{Error, Result, constants::MAX_REGULATOR_NAME_LEN};

/// Control attributes exposed per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCommand {
    Reset,
    ClockEnable,
    RegulatorEnableSet,
    DevicePrepare,
}

impl ControlCommand {
    pub const ALL: [ControlCommand; 4] = [
        Self::Reset,
        Self::ClockEnable,
        Self::RegulatorEnableSet,
        Self::DevicePrepare,
    ];

    /// Attribute names, in registration order.
    pub const ATTRIBUTE_NAMES: [&'static str; 4] = [
        "reset",
        "clock_enable",
        "regulator_enable_set",
        "device_prepare",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::ClockEnable => "clock_enable",
            Self::RegulatorEnableSet => "regulator_enable_set",
            Self::DevicePrepare => "device_prepare",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| Error::invalid_argument(format!("unknown control attribute '{s}'")))
    }
}

/// A parsed control write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRequest {
    /// Pulse the reset line.
    Reset,

    /// Gate the sensor clock.
    Clock { enable: bool },

    /// Switch a rail. The name is matched against the rail table later, so
    /// an unknown name parses fine and fails with `NotFound` on execution.
    Regulator { name: String, enable: bool },

    /// Run the power sequencing state machine.
    Power { prepare: bool },
}

impl ControlRequest {
    /// Parse a write to `command`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the payload is malformed for the
    /// attribute.
    pub fn parse(command: ControlCommand, payload: &str) -> Result<Self> {
        match command {
            ControlCommand::Reset => parse_reset(payload),
            ControlCommand::ClockEnable => Ok(Self::Clock {
                enable: payload.starts_with('1'),
            }),
            ControlCommand::RegulatorEnableSet => parse_regulator(payload),
            ControlCommand::DevicePrepare => parse_power(payload),
        }
    }
}

fn parse_reset(payload: &str) -> Result<ControlRequest> {
    if payload.starts_with("reset") {
        Ok(ControlRequest::Reset)
    } else {
        Err(Error::invalid_argument(format!(
            "reset expects 'reset', got {payload:?}"
        )))
    }
}

/// `<name>,<op>`: at most 15 bytes of name, then one op character.
fn parse_regulator(payload: &str) -> Result<ControlRequest> {
    let malformed =
        || Error::invalid_argument(format!("expected '<name>,<e|d>', got {payload:?}"));

    let (name, rest) = payload.split_once(',').ok_or_else(malformed)?;
    if name.is_empty() || name.len() > MAX_REGULATOR_NAME_LEN {
        return Err(malformed());
    }

    let enable = match rest.chars().next() {
        Some('e') => true,
        Some('d') => false,
        Some(op) => {
            return Err(Error::invalid_argument(format!(
                "unknown regulator op '{op}'"
            )));
        }
        None => return Err(malformed()),
    };

    Ok(ControlRequest::Regulator {
        name: name.to_string(),
        enable,
    })
}

fn parse_power(payload: &str) -> Result<ControlRequest> {
    match payload.chars().next() {
        Some('1') => Ok(ControlRequest::Power { prepare: true }),
        Some('0') => Ok(ControlRequest::Power { prepare: false }),
        _ => Err(Error::invalid_argument(format!(
            "device_prepare expects '1' or '0', got {payload:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("reset", ControlCommand::Reset)]
    #[case("clock_enable", ControlCommand::ClockEnable)]
    #[case("regulator_enable_set", ControlCommand::RegulatorEnableSet)]
    #[case("device_prepare", ControlCommand::DevicePrepare)]
    fn test_command_names(#[case] name: &str, #[case] command: ControlCommand) {
        assert_eq!(name.parse::<ControlCommand>().unwrap(), command);
        assert_eq!(command.to_string(), name);
    }

    #[test]
    fn test_attribute_names_follow_commands() {
        let names: Vec<_> = ControlCommand::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, ControlCommand::ATTRIBUTE_NAMES);
    }

    #[test]
    fn test_unknown_command() {
        let err = "power".parse::<ControlCommand>().unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[rstest]
    #[case("reset")]
    #[case("reset\n")]
    #[case("resetting")]
    fn test_reset_accepted(#[case] payload: &str) {
        assert_eq!(
            ControlRequest::parse(ControlCommand::Reset, payload).unwrap(),
            ControlRequest::Reset
        );
    }

    #[rstest]
    #[case("")]
    #[case("rese")]
    #[case(" reset")]
    #[case("RESET")]
    fn test_reset_rejected(#[case] payload: &str) {
        let err = ControlRequest::parse(ControlCommand::Reset, payload).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[rstest]
    #[case("1", true)]
    #[case("1\n", true)]
    #[case("10", true)]
    #[case("0", false)]
    #[case("", false)]
    #[case("on", false)]
    fn test_clock_switch(#[case] payload: &str, #[case] enable: bool) {
        assert_eq!(
            ControlRequest::parse(ControlCommand::ClockEnable, payload).unwrap(),
            ControlRequest::Clock { enable }
        );
    }

    #[rstest]
    #[case("vdd_pwr,e", "vdd_pwr", true)]
    #[case("vdd_pwr,d", "vdd_pwr", false)]
    #[case("vdd_pwr,enable\n", "vdd_pwr", true)]
    #[case("badname,e", "badname", true)]
    #[case("abcdefghijklmno,d", "abcdefghijklmno", false)]
    fn test_regulator_accepted(#[case] payload: &str, #[case] name: &str, #[case] enable: bool) {
        assert_eq!(
            ControlRequest::parse(ControlCommand::RegulatorEnableSet, payload).unwrap(),
            ControlRequest::Regulator {
                name: name.to_string(),
                enable
            }
        );
    }

    #[rstest]
    #[case("vdd_pwr,x")]
    #[case("vdd_pwr,")]
    #[case("vdd_pwr")]
    #[case(",e")]
    #[case("")]
    #[case("abcdefghijklmnop,e")]
    fn test_regulator_rejected(#[case] payload: &str) {
        let err = ControlRequest::parse(ControlCommand::RegulatorEnableSet, payload).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[rstest]
    #[case("1", true)]
    #[case("1\n", true)]
    #[case("0", false)]
    fn test_power_accepted(#[case] payload: &str, #[case] prepare: bool) {
        assert_eq!(
            ControlRequest::parse(ControlCommand::DevicePrepare, payload).unwrap(),
            ControlRequest::Power { prepare }
        );
    }

    #[rstest]
    #[case("")]
    #[case("2")]
    #[case("yes")]
    fn test_power_rejected(#[case] payload: &str) {
        let err = ControlRequest::parse(ControlCommand::DevicePrepare, payload).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
