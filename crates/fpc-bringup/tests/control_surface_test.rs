//! Operator writes through the control attributes.

mod common;

use common::{RESET_LINE, assert_all_released, reset_pulses, try_attach};
use fpc_bringup::ControlCommand;
use fpc_core::{BringupConfig, Error, PlatformKind, PowerState};
use fpc_hardware::mock::{HwEvent, MockPlatform, RecordingDelay};
use rstest::rstest;

#[test]
fn test_regulator_enable_and_disable() {
    let bench = common::attach(PlatformKind::Qcom);
    bench.device.unprepare();

    assert_eq!(
        bench.device.store(ControlCommand::RegulatorEnableSet, "vdd_pwr,e").unwrap(),
        9
    );
    assert!(bench.hw.rail_enabled("vdd_pwr"));

    bench.device.store(ControlCommand::RegulatorEnableSet, "vdd_pwr,d").unwrap();
    assert!(!bench.hw.rail_enabled("vdd_pwr"));
    assert!(bench.device.inspect(|ctx| ctx.regulators().live_handle("vdd_pwr").is_none()));
}

#[test]
fn test_cutting_primary_rail_while_prepared_tears_down() {
    let bench = common::attach(PlatformKind::Qcom);
    assert!(bench.device.is_prepared());

    bench.device.store(ControlCommand::RegulatorEnableSet, "vdd_pwr,d").unwrap();

    assert_eq!(bench.device.power_state(), PowerState::TornDown);
    assert!(!bench.hw.rail_enabled("vdd_pwr"));
    let last = bench.device.history().last().map(|t| (t.from, t.to));
    assert_eq!(last, Some((PowerState::Prepared, PowerState::TornDown)));

    bench.device.store(ControlCommand::DevicePrepare, "1").unwrap();

    assert_eq!(bench.device.power_state(), PowerState::Prepared);
    assert!(bench.hw.rail_enabled("vdd_pwr"));
    assert_eq!(bench.hw.rail_use_count("vdd_pwr"), 1);
}

#[rstest]
#[case(PlatformKind::Hikey)]
#[case(PlatformKind::Mtk)]
fn test_board_managed_rail_keeps_power_state(#[case] kind: PlatformKind) {
    let bench = common::attach(kind);
    bench.device.prepare().unwrap();

    bench.device.store(ControlCommand::RegulatorEnableSet, "vdd_pwr,d").unwrap();

    assert_eq!(bench.device.power_state(), PowerState::Prepared);
}

#[test]
fn test_regulator_bad_op() {
    let bench = common::attach(PlatformKind::Qcom);
    bench.hw.clear_events();

    let err = bench
        .device
        .store(ControlCommand::RegulatorEnableSet, "vdd_pwr,x")
        .unwrap_err();

    assert!(err.is_invalid_argument());
    assert!(bench.hw.events().is_empty());
}

#[rstest]
#[case(PlatformKind::Hikey)]
#[case(PlatformKind::Mtk)]
#[case(PlatformKind::Qcom)]
fn test_regulator_unknown_name(#[case] kind: PlatformKind) {
    let bench = common::attach(kind);

    let err = bench
        .device
        .store(ControlCommand::RegulatorEnableSet, "badname,e")
        .unwrap_err();

    assert!(err.is_not_found());
}

#[rstest]
#[case(PlatformKind::Hikey)]
#[case(PlatformKind::Mtk)]
fn test_board_managed_rail_touches_nothing(#[case] kind: PlatformKind) {
    let bench = common::attach(kind);
    bench.hw.clear_events();

    bench.device.store(ControlCommand::RegulatorEnableSet, "vdd_pwr,e").unwrap();

    assert!(bench.hw.events().is_empty());
}

#[test]
fn test_regulator_enable_failure_is_reported() {
    let bench = common::attach(PlatformKind::Qcom);
    bench.device.unprepare();
    bench.hw.fail_regulator_enable("vdd_pwr", true);

    let err = bench
        .device
        .store(ControlCommand::RegulatorEnableSet, "vdd_pwr,e")
        .unwrap_err();

    assert!(matches!(err, Error::HardwareEnableFailed { .. }));
    assert_eq!(bench.hw.live_rail_handles("vdd_pwr"), 0);
}

#[test]
fn test_clock_switch_on_mtk() {
    let bench = common::attach(PlatformKind::Mtk);

    assert_eq!(bench.device.store(ControlCommand::ClockEnable, "0").unwrap(), 1);
    assert!(!bench.hw.clock_enabled("spi-main"));

    bench.device.store(ControlCommand::ClockEnable, "1\n").unwrap();
    assert!(bench.hw.clock_enabled("spi-main"));

    bench.device.store(ControlCommand::ClockEnable, "off").unwrap();
    assert!(!bench.hw.clock_enabled("spi-main"));
}

#[test]
fn test_repeated_clock_writes_are_balanced() {
    let bench = common::attach(PlatformKind::Mtk);
    bench.device.store(ControlCommand::ClockEnable, "0").unwrap();
    bench.hw.clear_events();

    for payload in ["1", "1", "0", "0"] {
        bench.device.store(ControlCommand::ClockEnable, payload).unwrap();
    }

    let enabled = bench
        .hw
        .count_events(|e| matches!(e, HwEvent::ClockEnabled { .. }));
    let disabled = bench
        .hw
        .count_events(|e| matches!(e, HwEvent::ClockDisabled { .. }));
    assert_eq!((enabled, disabled), (1, 1));
    assert_eq!(bench.hw.clock_enable_count("spi-main"), 0);
    assert_eq!(bench.hw.clock_unbalanced_calls("spi-main"), 0);
}

#[test]
fn test_disabling_gated_clock_touches_nothing() {
    let (platform, hw) = MockPlatform::new();
    hw.fail_clock_enable("spi-main", true);
    let device = try_attach(platform, BringupConfig::new(PlatformKind::Mtk), RecordingDelay::new())
        .unwrap();

    device.store(ControlCommand::ClockEnable, "0").unwrap();

    assert_eq!(
        hw.count_events(|e| matches!(e, HwEvent::ClockDisabled { .. })),
        0
    );
    assert_eq!(hw.clock_unbalanced_calls("spi-main"), 0);

    device.detach();
    assert_all_released(&hw);
    assert_eq!(hw.clock_unbalanced_calls("spi-main"), 0);
}

#[test]
fn test_detach_unprepares_clock() {
    let bench = common::attach(PlatformKind::Mtk);
    assert_eq!(bench.hw.clock_prepare_count("spi-main"), 1);

    bench.device.detach();

    assert_all_released(&bench.hw);
    assert_eq!(
        bench
            .hw
            .count_events(|e| matches!(e, HwEvent::ClockUnprepared { .. })),
        1
    );
    assert_eq!(bench.hw.clock_unbalanced_calls("spi-main"), 0);
}

#[rstest]
#[case(PlatformKind::Hikey)]
#[case(PlatformKind::Qcom)]
fn test_clock_without_capability(#[case] kind: PlatformKind) {
    let bench = common::attach(kind);
    bench.hw.clear_events();

    assert_eq!(bench.device.store(ControlCommand::ClockEnable, "1").unwrap(), 1);
    assert_eq!(bench.device.store(ControlCommand::ClockEnable, "0").unwrap(), 1);

    assert!(bench.hw.events().is_empty());
    assert!(bench.device.inspect(|ctx| ctx.clock().is_none()));
}

#[test]
fn test_reset_command() {
    let bench = common::attach(PlatformKind::Hikey);

    assert_eq!(bench.device.store(ControlCommand::Reset, "reset\n").unwrap(), 6);
    assert_eq!(reset_pulses(&bench.hw), 2);
    assert_eq!(bench.delay.windows().len(), 6);
}

#[test]
fn test_reset_command_rejects_other_payloads() {
    let bench = common::attach(PlatformKind::Hikey);

    let err = bench.device.store(ControlCommand::Reset, "1").unwrap_err();

    assert!(err.is_invalid_argument());
    assert_eq!(reset_pulses(&bench.hw), 1);
    assert!(bench.hw.gpio_requested(RESET_LINE));
}

#[rstest]
#[case(PlatformKind::Hikey)]
#[case(PlatformKind::Mtk)]
#[case(PlatformKind::Qcom)]
fn test_device_prepare_command(#[case] kind: PlatformKind) {
    let bench = common::attach(kind);

    bench.device.store(ControlCommand::DevicePrepare, "1").unwrap();
    assert_eq!(bench.device.power_state(), PowerState::Prepared);

    bench.device.store(ControlCommand::DevicePrepare, "0").unwrap();
    assert_eq!(bench.device.power_state(), PowerState::TornDown);

    let err = bench.device.store(ControlCommand::DevicePrepare, "x").unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_device_prepare_reports_enable_failure() {
    let bench = common::attach(PlatformKind::Qcom);
    bench.device.unprepare();
    bench.hw.fail_regulator_enable("vdd_pwr", true);

    let err = bench.device.store(ControlCommand::DevicePrepare, "1").unwrap_err();

    assert!(matches!(err, Error::HardwareEnableFailed { .. }));
    assert_eq!(bench.device.power_state(), PowerState::TornDown);
    assert_eq!(
        bench
            .hw
            .count_events(|e| matches!(e, HwEvent::RegulatorEnabled { .. })),
        1
    );
}
