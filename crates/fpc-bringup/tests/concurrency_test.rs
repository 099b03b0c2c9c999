//! Operator writes racing from several threads.

mod common;

use std::thread;

use fpc_bringup::ControlCommand;
use fpc_core::{PlatformKind, PowerState};

const THREADS: usize = 8;
const ROUNDS: usize = 50;

#[test]
fn test_concurrent_regulator_writes_never_double_enable() {
    let bench = common::attach(PlatformKind::Qcom);

    thread::scope(|scope| {
        for worker in 0..THREADS {
            let device = &bench.device;
            scope.spawn(move || {
                for round in 0..ROUNDS {
                    let payload = if (worker + round) % 2 == 0 {
                        "vdd_pwr,e"
                    } else {
                        "vdd_pwr,d"
                    };
                    device
                        .store(ControlCommand::RegulatorEnableSet, payload)
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(bench.hw.rail_max_use_count("vdd_pwr"), 1);
    assert!(bench.hw.live_rail_handles("vdd_pwr") <= 1);
}

#[test]
fn test_concurrent_prepare_and_unprepare() {
    let bench = common::attach(PlatformKind::Qcom);

    thread::scope(|scope| {
        for worker in 0..THREADS {
            let device = &bench.device;
            scope.spawn(move || {
                for _ in 0..ROUNDS {
                    if worker % 2 == 0 {
                        device.prepare().unwrap();
                    } else {
                        device.unprepare();
                    }
                    device.hw_reset();
                }
            });
        }
    });

    assert_eq!(bench.hw.rail_max_use_count("vdd_pwr"), 1);
    let prepared = bench.device.power_state() == PowerState::Prepared;
    assert_eq!(bench.hw.rail_enabled("vdd_pwr"), prepared);

    // Transitions alternate because each one completes under the lock.
    let history = bench.device.history();
    for pair in history.windows(2) {
        assert_eq!(pair[0].to, pair[1].from);
    }
}
