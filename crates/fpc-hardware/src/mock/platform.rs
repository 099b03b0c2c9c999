//! Simulated platform for testing and development.
//!
//! The simulation keeps the electrical state a real platform would keep
//! (line levels, rail use counts, the selected pin state, clock gating) and
//! records every successful state change as an [`HwEvent`] so tests can
//! assert on exact sequences. Failures are injected through the
//! [`MockPlatformHandle`].

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use fpc_core::{
    ClockId, Error, GpioId, PinLevel, PinStateId, PinctrlId, RegulatorId, Result,
    constants::{
        DEFAULT_CLOCK_NAME, DEFAULT_PIN_GROUP_ACTIVE, DEFAULT_PIN_GROUP_RESET,
        DEFAULT_RESET_GPIO_LABEL, PRIMARY_REGULATOR,
    },
};
use parking_lot::Mutex;
use tracing::trace;

use crate::traits::{AttributeOps, ClockOps, GpioOps, PinctrlOps, RegulatorOps};

/// Maximum number of events kept; the oldest are dropped first.
pub const MAX_EVENT_LOG_SIZE: usize = 4096;

/// A state change observed on the simulated platform.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HwEvent {
    GpioRequested { label: String },
    GpioFreed { label: String },
    GpioDirectionOutput { label: String, level: PinLevel },
    GpioWrite { label: String, level: PinLevel },
    RegulatorAcquired { name: String },
    RegulatorReleased { name: String },
    VoltageSet { name: String, min_uv: u32, max_uv: u32 },
    LoadSet { name: String, load_ua: u32 },
    RegulatorEnabled { name: String },
    RegulatorDisabled { name: String },
    PinStateSelected { name: String },
    ClockAcquired { name: String },
    ClockReleased { name: String },
    ClockPrepared { name: String },
    ClockUnprepared { name: String },
    ClockEnabled { name: String },
    ClockDisabled { name: String },
    AttributesRegistered { device: String, names: Vec<String> },
    AttributesUnregistered { device: String },
}

/// An [`HwEvent`] with the instant it happened.
#[derive(Debug, Clone)]
pub struct TimedEvent {
    pub at: Instant,
    pub event: HwEvent,
}

/// Availability of the simulated pin controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinctrlMode {
    /// Pin controller present and ready.
    #[default]
    Available,
    /// Pin-control subsystem is not ready yet.
    NotReady,
    /// Target does not use pin control.
    Absent,
}

#[derive(Debug)]
struct Line {
    label: String,
    requested: bool,
    output: bool,
    level: PinLevel,
}

#[derive(Debug)]
struct Rail {
    name: String,
    voltages: usize,
    use_count: u32,
    max_use_count: u32,
    voltage: Option<(u32, u32)>,
    load_ua: Option<u32>,
    fail_enable: bool,
    fail_voltage: bool,
}

#[derive(Debug)]
struct PinState {
    name: String,
    fail_select: bool,
}

#[derive(Debug)]
struct Clock {
    name: String,
    acquired: bool,
    prepare_count: u32,
    enable_count: u32,
    unbalanced: u32,
    fail_enable: bool,
}

#[derive(Debug, Default)]
struct MockState {
    lines: Vec<Line>,
    rails: Vec<Rail>,
    rail_handles: BTreeMap<u32, usize>,
    next_rail_handle: u32,
    pinctrl: PinctrlMode,
    pin_states: Vec<PinState>,
    selected: Option<String>,
    clocks: Vec<Clock>,
    attributes: Option<(String, Vec<String>)>,
    fail_attributes: bool,
    fail_direction: bool,
    events: VecDeque<TimedEvent>,
}

impl MockState {
    fn record(&mut self, event: HwEvent) {
        trace!(?event, "mock platform");
        if self.events.len() >= MAX_EVENT_LOG_SIZE {
            self.events.pop_front();
        }
        self.events.push_back(TimedEvent {
            at: Instant::now(),
            event,
        });
    }

    fn line(&self, gpio: GpioId) -> Option<&Line> {
        self.lines.get(gpio.as_u32() as usize)
    }

    fn rail_index(&self, reg: RegulatorId) -> Result<usize> {
        self.rail_handles
            .get(&reg.as_u32())
            .copied()
            .ok_or_else(|| Error::platform("regulator", format!("stale handle {reg}")))
    }

    fn rail_by_name(&self, name: &str) -> Option<&Rail> {
        self.rails.iter().find(|rail| rail.name == name)
    }

    fn rail_by_name_mut(&mut self, name: &str) -> Option<&mut Rail> {
        self.rails.iter_mut().find(|rail| rail.name == name)
    }

    fn clock(&mut self, clk: ClockId) -> Result<&mut Clock> {
        self.clocks
            .get_mut(clk.as_u32() as usize)
            .filter(|clock| clock.acquired)
            .ok_or_else(|| Error::platform("clk", format!("stale handle {clk}")))
    }
}

/// Builder declaring the resources a simulated platform exposes.
///
/// # Examples
///
/// ```
/// use fpc_hardware::mock::{MockPlatform, PinctrlMode};
///
/// let (platform, handle) = MockPlatform::builder()
///     .gpio("fpc,gpio_rst")
///     .regulator("vdd_pwr", 1)
///     .pinctrl(PinctrlMode::Absent)
///     .build();
/// # let _ = (platform, handle);
/// ```
#[derive(Debug, Default)]
pub struct MockPlatformBuilder {
    state: MockState,
}

impl MockPlatformBuilder {
    /// Declare a GPIO line under a device-tree label.
    pub fn gpio(mut self, label: impl Into<String>) -> Self {
        self.state.lines.push(Line {
            label: label.into(),
            requested: false,
            output: false,
            level: PinLevel::Low,
        });
        self
    }

    /// Declare a supply; `voltages == 0` makes it a fixed rail.
    pub fn regulator(mut self, name: impl Into<String>, voltages: usize) -> Self {
        self.state.rails.push(Rail {
            name: name.into(),
            voltages,
            use_count: 0,
            max_use_count: 0,
            voltage: None,
            load_ua: None,
            fail_enable: false,
            fail_voltage: false,
        });
        self
    }

    /// Declare a pin-control state.
    pub fn pin_state(mut self, name: impl Into<String>) -> Self {
        self.state.pin_states.push(PinState {
            name: name.into(),
            fail_select: false,
        });
        self
    }

    /// Declare a clock.
    pub fn clock(mut self, name: impl Into<String>) -> Self {
        self.state.clocks.push(Clock {
            name: name.into(),
            acquired: false,
            prepare_count: 0,
            enable_count: 0,
            unbalanced: 0,
            fail_enable: false,
        });
        self
    }

    /// Set pin controller availability.
    pub fn pinctrl(mut self, mode: PinctrlMode) -> Self {
        self.state.pinctrl = mode;
        self
    }

    pub fn build(self) -> (MockPlatform, MockPlatformHandle) {
        let state = Arc::new(Mutex::new(self.state));
        (
            MockPlatform {
                state: Arc::clone(&state),
            },
            MockPlatformHandle { state },
        )
    }
}

/// Simulated platform implementing every primitive family.
///
/// # Examples
///
/// ```
/// use fpc_hardware::mock::MockPlatform;
/// use fpc_hardware::GpioOps;
/// use fpc_core::PinLevel;
///
/// let (platform, handle) = MockPlatform::new();
/// let rst = platform.gpio_request("fpc,gpio_rst").unwrap();
/// platform.gpio_direction_output(rst, PinLevel::High).unwrap();
/// assert_eq!(handle.gpio_level("fpc,gpio_rst"), Some(PinLevel::High));
/// ```
#[derive(Debug, Clone)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
}

impl MockPlatform {
    /// Create a platform declaring everything an FPC16xx sensor uses.
    ///
    /// Returns a tuple of (MockPlatform, MockPlatformHandle) where the handle
    /// inspects state and injects failures.
    pub fn new() -> (Self, MockPlatformHandle) {
        Self::builder()
            .gpio(DEFAULT_RESET_GPIO_LABEL)
            .regulator(PRIMARY_REGULATOR, 1)
            .pin_state(DEFAULT_PIN_GROUP_RESET)
            .pin_state(DEFAULT_PIN_GROUP_ACTIVE)
            .clock(DEFAULT_CLOCK_NAME)
            .build()
    }

    /// Start from an empty platform.
    pub fn builder() -> MockPlatformBuilder {
        MockPlatformBuilder::default()
    }
}

impl GpioOps for MockPlatform {
    fn gpio_request(&self, label: &str) -> Result<GpioId> {
        let mut state = self.state.lock();
        let index = state
            .lines
            .iter()
            .position(|line| line.label == label)
            .ok_or_else(|| Error::acquire_failed(label, "no such line"))?;

        let line = &mut state.lines[index];
        if line.requested {
            return Err(Error::acquire_failed(label, "line busy"));
        }
        line.requested = true;

        state.record(HwEvent::GpioRequested {
            label: label.to_string(),
        });
        Ok(GpioId::new(index as u32))
    }

    fn gpio_free(&self, gpio: GpioId) {
        let mut state = self.state.lock();
        let Some(line) = state.lines.get_mut(gpio.as_u32() as usize) else {
            return;
        };
        if !line.requested {
            return;
        }
        line.requested = false;
        line.output = false;
        let label = line.label.clone();
        state.record(HwEvent::GpioFreed { label });
    }

    fn gpio_direction_output(&self, gpio: GpioId, level: PinLevel) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_direction {
            return Err(Error::platform("gpio_direction_output", "-EIO"));
        }
        let line = state
            .lines
            .get_mut(gpio.as_u32() as usize)
            .filter(|line| line.requested)
            .ok_or_else(|| {
                Error::platform("gpio_direction_output", format!("{gpio} not requested"))
            })?;

        line.output = true;
        line.level = level;
        let label = line.label.clone();
        state.record(HwEvent::GpioDirectionOutput { label, level });
        Ok(())
    }

    fn gpio_get_value(&self, gpio: GpioId) -> PinLevel {
        self.state
            .lock()
            .line(gpio)
            .map_or(PinLevel::Low, |line| line.level)
    }

    fn gpio_set_value(&self, gpio: GpioId, level: PinLevel) {
        let mut state = self.state.lock();
        let Some(line) = state.lines.get_mut(gpio.as_u32() as usize) else {
            return;
        };
        line.level = level;
        let label = line.label.clone();
        state.record(HwEvent::GpioWrite { label, level });
    }
}

impl RegulatorOps for MockPlatform {
    fn regulator_get(&self, name: &str) -> Result<RegulatorId> {
        let mut state = self.state.lock();
        let index = state
            .rails
            .iter()
            .position(|rail| rail.name == name)
            .ok_or_else(|| Error::acquire_failed(name, "no such supply"))?;

        state.next_rail_handle += 1;
        let handle = state.next_rail_handle;
        state.rail_handles.insert(handle, index);
        state.record(HwEvent::RegulatorAcquired {
            name: name.to_string(),
        });
        Ok(RegulatorId::new(handle))
    }

    fn regulator_put(&self, reg: RegulatorId) {
        let mut state = self.state.lock();
        if let Some(index) = state.rail_handles.remove(&reg.as_u32()) {
            let name = state.rails[index].name.clone();
            state.record(HwEvent::RegulatorReleased { name });
        }
    }

    fn regulator_count_voltages(&self, reg: RegulatorId) -> usize {
        let state = self.state.lock();
        state
            .rail_index(reg)
            .map_or(0, |index| state.rails[index].voltages)
    }

    fn regulator_set_voltage(&self, reg: RegulatorId, min_uv: u32, max_uv: u32) -> Result<()> {
        let mut state = self.state.lock();
        let index = state.rail_index(reg)?;
        let rail = &mut state.rails[index];
        if rail.fail_voltage {
            return Err(Error::platform("regulator_set_voltage", "-EINVAL"));
        }
        rail.voltage = Some((min_uv, max_uv));
        let name = rail.name.clone();
        state.record(HwEvent::VoltageSet {
            name,
            min_uv,
            max_uv,
        });
        Ok(())
    }

    fn regulator_set_load(&self, reg: RegulatorId, load_ua: u32) -> Result<()> {
        let mut state = self.state.lock();
        let index = state.rail_index(reg)?;
        let rail = &mut state.rails[index];
        rail.load_ua = Some(load_ua);
        let name = rail.name.clone();
        state.record(HwEvent::LoadSet { name, load_ua });
        Ok(())
    }

    fn regulator_enable(&self, reg: RegulatorId) -> Result<()> {
        let mut state = self.state.lock();
        let index = state.rail_index(reg)?;
        let rail = &mut state.rails[index];
        if rail.fail_enable {
            return Err(Error::platform("regulator_enable", "-EIO"));
        }
        rail.use_count += 1;
        rail.max_use_count = rail.max_use_count.max(rail.use_count);
        let name = rail.name.clone();
        state.record(HwEvent::RegulatorEnabled { name });
        Ok(())
    }

    fn regulator_disable(&self, reg: RegulatorId) -> Result<()> {
        let mut state = self.state.lock();
        let index = state.rail_index(reg)?;
        let rail = &mut state.rails[index];
        if rail.use_count == 0 {
            return Err(Error::platform("regulator_disable", "unbalanced disable"));
        }
        rail.use_count -= 1;
        let name = rail.name.clone();
        state.record(HwEvent::RegulatorDisabled { name });
        Ok(())
    }

    fn regulator_is_enabled(&self, reg: RegulatorId) -> bool {
        let state = self.state.lock();
        state
            .rail_index(reg)
            .is_ok_and(|index| state.rails[index].use_count > 0)
    }
}

impl PinctrlOps for MockPlatform {
    fn pinctrl_get(&self) -> Result<PinctrlId> {
        match self.state.lock().pinctrl {
            PinctrlMode::Available => Ok(PinctrlId::new(0)),
            PinctrlMode::NotReady => Err(Error::defer("pinctrl")),
            PinctrlMode::Absent => Err(Error::platform("pinctrl_get", "-ENODEV")),
        }
    }

    fn pinctrl_lookup_state(&self, _pinctrl: PinctrlId, name: &str) -> Result<PinStateId> {
        self.state
            .lock()
            .pin_states
            .iter()
            .position(|pin_state| pin_state.name == name)
            .map(|index| PinStateId::new(index as u32))
            .ok_or_else(|| Error::platform("pinctrl_lookup_state", format!("no state '{name}'")))
    }

    fn pinctrl_select_state(&self, _pinctrl: PinctrlId, pin_state: PinStateId) -> Result<()> {
        let mut state = self.state.lock();
        let target = state
            .pin_states
            .get(pin_state.as_u32() as usize)
            .ok_or_else(|| {
                Error::platform("pinctrl_select_state", format!("{pin_state} unknown"))
            })?;
        if target.fail_select {
            return Err(Error::platform("pinctrl_select_state", "-EIO"));
        }
        let name = target.name.clone();
        state.selected = Some(name.clone());
        state.record(HwEvent::PinStateSelected { name });
        Ok(())
    }
}

impl ClockOps for MockPlatform {
    fn clk_get(&self, name: &str) -> Result<ClockId> {
        let mut state = self.state.lock();
        let index = state
            .clocks
            .iter()
            .position(|clock| clock.name == name)
            .ok_or_else(|| Error::acquire_failed(name, "no such clock"))?;
        state.clocks[index].acquired = true;
        state.record(HwEvent::ClockAcquired {
            name: name.to_string(),
        });
        Ok(ClockId::new(index as u32))
    }

    fn clk_put(&self, clk: ClockId) {
        let mut state = self.state.lock();
        let Ok(clock) = state.clock(clk) else {
            return;
        };
        // Outstanding prepare/enable counts survive the put, as a leak would.
        clock.acquired = false;
        let name = clock.name.clone();
        state.record(HwEvent::ClockReleased { name });
    }

    fn clk_prepare(&self, clk: ClockId) -> Result<()> {
        let mut state = self.state.lock();
        let clock = state.clock(clk)?;
        clock.prepare_count += 1;
        let name = clock.name.clone();
        state.record(HwEvent::ClockPrepared { name });
        Ok(())
    }

    fn clk_enable(&self, clk: ClockId) -> Result<()> {
        let mut state = self.state.lock();
        let clock = state.clock(clk)?;
        if clock.prepare_count == 0 {
            return Err(Error::platform("clk_enable", "clock not prepared"));
        }
        if clock.fail_enable {
            return Err(Error::platform("clk_enable", "-EIO"));
        }
        clock.enable_count += 1;
        let name = clock.name.clone();
        state.record(HwEvent::ClockEnabled { name });
        Ok(())
    }

    fn clk_disable(&self, clk: ClockId) {
        let mut state = self.state.lock();
        let Ok(clock) = state.clock(clk) else {
            return;
        };
        if clock.enable_count == 0 {
            clock.unbalanced += 1;
            return;
        }
        clock.enable_count -= 1;
        let name = clock.name.clone();
        state.record(HwEvent::ClockDisabled { name });
    }

    fn clk_unprepare(&self, clk: ClockId) {
        let mut state = self.state.lock();
        let Ok(clock) = state.clock(clk) else {
            return;
        };
        if clock.prepare_count == 0 || clock.enable_count > 0 {
            clock.unbalanced += 1;
            return;
        }
        clock.prepare_count -= 1;
        let name = clock.name.clone();
        state.record(HwEvent::ClockUnprepared { name });
    }
}

impl AttributeOps for MockPlatform {
    fn register_attributes(&self, device: &str, names: &[&str]) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_attributes {
            return Err(Error::platform("register_attributes", "-ENOMEM"));
        }
        if state.attributes.is_some() {
            return Err(Error::platform("register_attributes", "-EEXIST"));
        }
        let names: Vec<String> = names.iter().map(|name| name.to_string()).collect();
        state.attributes = Some((device.to_string(), names.clone()));
        state.record(HwEvent::AttributesRegistered {
            device: device.to_string(),
            names,
        });
        Ok(())
    }

    fn unregister_attributes(&self, device: &str, _names: &[&str]) {
        let mut state = self.state.lock();
        if state.attributes.take().is_some() {
            state.record(HwEvent::AttributesUnregistered {
                device: device.to_string(),
            });
        }
    }
}

/// Handle for inspecting and steering a [`MockPlatform`].
///
/// # Examples
///
/// ```
/// use fpc_hardware::mock::MockPlatform;
///
/// let (_platform, handle) = MockPlatform::new();
/// handle.fail_regulator_enable("vdd_pwr", true);
/// assert!(!handle.rail_enabled("vdd_pwr"));
/// ```
#[derive(Debug, Clone)]
pub struct MockPlatformHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockPlatformHandle {
    /// All recorded events in order.
    pub fn events(&self) -> Vec<HwEvent> {
        self.state
            .lock()
            .events
            .iter()
            .map(|timed| timed.event.clone())
            .collect()
    }

    /// All recorded events with their timestamps.
    pub fn timed_events(&self) -> Vec<TimedEvent> {
        self.state.lock().events.iter().cloned().collect()
    }

    /// Number of recorded events matching `predicate`.
    pub fn count_events(&self, predicate: impl Fn(&HwEvent) -> bool) -> usize {
        self.state
            .lock()
            .events
            .iter()
            .filter(|timed| predicate(&timed.event))
            .count()
    }

    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    /// Current level of a line, `None` if the label is not declared.
    pub fn gpio_level(&self, label: &str) -> Option<PinLevel> {
        self.state
            .lock()
            .lines
            .iter()
            .find(|line| line.label == label)
            .map(|line| line.level)
    }

    pub fn gpio_requested(&self, label: &str) -> bool {
        self.state
            .lock()
            .lines
            .iter()
            .any(|line| line.label == label && line.requested)
    }

    pub fn gpio_is_output(&self, label: &str) -> bool {
        self.state
            .lock()
            .lines
            .iter()
            .any(|line| line.label == label && line.output)
    }

    pub fn rail_enabled(&self, name: &str) -> bool {
        self.state
            .lock()
            .rail_by_name(name)
            .is_some_and(|rail| rail.use_count > 0)
    }

    /// Current enable count of a rail.
    pub fn rail_use_count(&self, name: &str) -> u32 {
        self.state
            .lock()
            .rail_by_name(name)
            .map_or(0, |rail| rail.use_count)
    }

    /// Highest enable count a rail has ever reached.
    pub fn rail_max_use_count(&self, name: &str) -> u32 {
        self.state
            .lock()
            .rail_by_name(name)
            .map_or(0, |rail| rail.max_use_count)
    }

    /// Number of consumer handles currently held on a rail.
    pub fn live_rail_handles(&self, name: &str) -> usize {
        let state = self.state.lock();
        state
            .rail_handles
            .values()
            .filter(|&&index| state.rails[index].name == name)
            .count()
    }

    pub fn rail_voltage(&self, name: &str) -> Option<(u32, u32)> {
        self.state.lock().rail_by_name(name).and_then(|rail| rail.voltage)
    }

    pub fn rail_load(&self, name: &str) -> Option<u32> {
        self.state.lock().rail_by_name(name).and_then(|rail| rail.load_ua)
    }

    /// Currently selected pin state.
    pub fn selected_pin_state(&self) -> Option<String> {
        self.state.lock().selected.clone()
    }

    pub fn clock_enabled(&self, name: &str) -> bool {
        self.state
            .lock()
            .clocks
            .iter()
            .any(|clock| clock.name == name && clock.enable_count > 0)
    }

    /// Outstanding enable count of a clock.
    pub fn clock_enable_count(&self, name: &str) -> u32 {
        self.clock_count(name, |clock| clock.enable_count)
    }

    /// Outstanding prepare count of a clock.
    pub fn clock_prepare_count(&self, name: &str) -> u32 {
        self.clock_count(name, |clock| clock.prepare_count)
    }

    /// Disable or unprepare calls that had no matching enable or prepare.
    pub fn clock_unbalanced_calls(&self, name: &str) -> u32 {
        self.clock_count(name, |clock| clock.unbalanced)
    }

    fn clock_count(&self, name: &str, count: impl Fn(&Clock) -> u32) -> u32 {
        self.state
            .lock()
            .clocks
            .iter()
            .find(|clock| clock.name == name)
            .map_or(0, count)
    }

    pub fn clock_acquired(&self, name: &str) -> bool {
        self.state
            .lock()
            .clocks
            .iter()
            .any(|clock| clock.name == name && clock.acquired)
    }

    /// Attribute names currently registered, if any.
    pub fn registered_attributes(&self) -> Option<Vec<String>> {
        self.state
            .lock()
            .attributes
            .as_ref()
            .map(|(_, names)| names.clone())
    }

    pub fn fail_regulator_enable(&self, name: &str, fail: bool) {
        if let Some(rail) = self.state.lock().rail_by_name_mut(name) {
            rail.fail_enable = fail;
        }
    }

    pub fn fail_regulator_voltage(&self, name: &str, fail: bool) {
        if let Some(rail) = self.state.lock().rail_by_name_mut(name) {
            rail.fail_voltage = fail;
        }
    }

    pub fn fail_pin_select(&self, name: &str, fail: bool) {
        if let Some(pin_state) = self
            .state
            .lock()
            .pin_states
            .iter_mut()
            .find(|pin_state| pin_state.name == name)
        {
            pin_state.fail_select = fail;
        }
    }

    pub fn fail_clock_enable(&self, name: &str, fail: bool) {
        if let Some(clock) = self
            .state
            .lock()
            .clocks
            .iter_mut()
            .find(|clock| clock.name == name)
        {
            clock.fail_enable = fail;
        }
    }

    pub fn fail_gpio_direction(&self, fail: bool) {
        self.state.lock().fail_direction = fail;
    }

    pub fn fail_attribute_registration(&self, fail: bool) {
        self.state.lock().fail_attributes = fail;
    }

    pub fn set_pinctrl(&self, mode: PinctrlMode) {
        self.state.lock().pinctrl = mode;
    }
}
