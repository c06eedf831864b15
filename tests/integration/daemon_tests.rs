//! Tests for the daemon cycle: engine output fanned out to the property
//! registry, the signal bus, power control, and the indicator.

use std::{cell::RefCell, rc::Rc};

use batmon::daemon::{Daemon, InfoRequest};
use batmon::engine::pattern::{IndicatorController, IndicatorPattern};
use batmon::engine::telemetry::{BatteryStatus, CapacityLevel, ChargerMode, Telemetry};
use batmon::engine::EngineEvent;
use batmon::registry::{keys, PropertySink, PropertyTable, PropertyValue};
use batmon::signals::{PowerControl, Signal, SignalBus};
use batmon::utils::error::{BatmonError, Result};

/// Signal bus backed by a shared vec, with a scriptable failure flag.
#[derive(Clone, Default)]
struct SharedBus {
    emitted: Rc<RefCell<Vec<Signal>>>,
    fail: Rc<RefCell<bool>>,
}

impl SignalBus for SharedBus {
    fn emit(&mut self, signal: Signal) -> Result<()> {
        self.emitted.borrow_mut().push(signal);
        if *self.fail.borrow() {
            Err(BatmonError::Publish("bus down".into()))
        } else {
            Ok(())
        }
    }
}

#[derive(Clone, Default)]
struct SharedPower {
    empty_assertions: Rc<RefCell<u32>>,
    charger_states: Rc<RefCell<Vec<bool>>>,
}

impl PowerControl for SharedPower {
    fn assert_battery_empty(&mut self) -> Result<()> {
        *self.empty_assertions.borrow_mut() += 1;
        Ok(())
    }

    fn set_charger_state(&mut self, connected: bool) -> Result<()> {
        self.charger_states.borrow_mut().push(connected);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct SharedIndicator {
    requests: Rc<RefCell<Vec<(&'static str, IndicatorPattern)>>>,
}

impl IndicatorController for SharedIndicator {
    fn activate(&mut self, pattern: IndicatorPattern) -> Result<()> {
        self.requests.borrow_mut().push(("activate", pattern));
        Ok(())
    }

    fn deactivate(&mut self, pattern: IndicatorPattern) -> Result<()> {
        self.requests.borrow_mut().push(("deactivate", pattern));
        Ok(())
    }
}

/// Property sink recording every forwarded write, for order-sensitive
/// assertions the diffing table can't express.
#[derive(Clone, Default)]
struct SharedSink {
    writes: Rc<RefCell<Vec<(&'static str, PropertyValue)>>>,
}

impl PropertySink for SharedSink {
    fn set_property(&mut self, name: &'static str, value: PropertyValue) -> Result<()> {
        self.writes.borrow_mut().push((name, value));
        Ok(())
    }
}

type TestDaemon<P> = Daemon<P, SharedBus, SharedIndicator, SharedPower>;

fn table_daemon() -> (TestDaemon<PropertyTable>, SharedBus, SharedIndicator, SharedPower) {
    let bus = SharedBus::default();
    let indicator = SharedIndicator::default();
    let power = SharedPower::default();
    let mut daemon = Daemon::new(
        PropertyTable::new(),
        bus.clone(),
        indicator.clone(),
        power.clone(),
    );
    daemon.startup().unwrap();
    (daemon, bus, indicator, power)
}

fn calibrated_sample() -> Telemetry {
    Telemetry {
        status: Some(BatteryStatus::Discharging),
        voltage_mv: 3868,
        capacity_percent_raw: 53,
        charge_now_mah: 500,
        charge_full_mah: 1200,
        charge_design_mah: 1000,
        time_to_empty_s: 7200,
        ..Telemetry::default()
    }
}

#[test]
fn cycle_publishes_the_property_table() {
    let (mut daemon, _bus, _indicator, _power) = table_daemon();
    daemon.on_sample(calibrated_sample()).unwrap();

    let p = daemon.properties();
    assert_eq!(p.get(keys::PERCENTAGE), Some(&PropertyValue::Int(46)));
    assert_eq!(p.get(keys::VOLTAGE_CURRENT), Some(&PropertyValue::Int(3868)));
    assert_eq!(p.get(keys::REPORTING_DESIGN), Some(&PropertyValue::Int(1000)));
    assert_eq!(p.get(keys::REPORTING_CURRENT), Some(&PropertyValue::Int(500)));
    // Last-full is clamped to the design capacity, and exported in bars.
    assert_eq!(
        p.get(keys::REPORTING_LAST_FULL),
        Some(&PropertyValue::Int(1000))
    );
    assert_eq!(
        p.get(keys::CHARGE_BARS_LAST_FULL),
        Some(&PropertyValue::Int(8))
    );
    assert_eq!(p.get(keys::REMAINING_TIME), Some(&PropertyValue::Int(7200)));
    assert_eq!(
        p.get(keys::CHARGING_STATUS),
        Some(&PropertyValue::Str("off".into()))
    );
    assert_eq!(
        p.get(keys::CHARGER_CONNECTION_STATUS),
        Some(&PropertyValue::Str("disconnected".into()))
    );
    // No capacity-state change fired (ok at startup, ok now), so the
    // startup default is still in place.
    assert_eq!(
        p.get(keys::CAPACITY_STATE),
        Some(&PropertyValue::Str("ok".into()))
    );
}

#[test]
fn charger_connect_fires_in_order() {
    let (mut daemon, bus, _indicator, power) = table_daemon();
    let t = Telemetry {
        voltage_mv: 3800,
        charger_mode: ChargerMode::Host,
        ..Telemetry::default()
    };
    daemon.on_sample(t).unwrap();

    let emitted = bus.emitted.borrow();
    let connect = emitted
        .iter()
        .position(|s| *s == Signal::ChargerConnected)
        .unwrap();
    let charging = emitted
        .iter()
        .position(|s| *s == Signal::ChargerChargingOn)
        .unwrap();
    assert!(connect < charging);
    assert_eq!(*power.charger_states.borrow(), vec![true]);

    let p = daemon.properties();
    assert_eq!(
        p.get(keys::CHARGER_TYPE),
        Some(&PropertyValue::Str("host 500 mA".into()))
    );
    assert_eq!(
        p.get(keys::CHARGING_STATUS),
        Some(&PropertyValue::Str("on".into()))
    );
    assert_eq!(p.get(keys::IS_CHARGING), Some(&PropertyValue::Bool(true)));
}

#[test]
fn empty_battery_reasserts_shutdown_policy() {
    let (mut daemon, bus, _indicator, power) = table_daemon();
    let t = Telemetry {
        voltage_mv: 2900,
        ..Telemetry::default()
    };

    daemon.on_sample(t.clone()).unwrap();
    daemon.on_sample(t).unwrap();

    assert_eq!(*power.empty_assertions.borrow(), 2);
    let empties = bus
        .emitted
        .borrow()
        .iter()
        .filter(|s| **s == Signal::BatteryEmpty)
        .count();
    assert_eq!(empties, 2);
}

#[test]
fn full_on_charger_shows_full_pattern_and_status() {
    let (mut daemon, _bus, indicator, _power) = table_daemon();
    let t = Telemetry {
        capacity_level: Some(CapacityLevel::Full),
        voltage_mv: 4180,
        charger_mode: ChargerMode::Dedicated,
        ..Telemetry::default()
    };
    let events = daemon.on_sample(t).unwrap();

    let p = daemon.properties();
    assert_eq!(
        p.get(keys::CHARGING_STATUS),
        Some(&PropertyValue::Str("full".into()))
    );
    assert_eq!(p.get(keys::IS_CHARGING), Some(&PropertyValue::Bool(true)));
    assert_eq!(p.get(keys::IS_DISCHARGING), Some(&PropertyValue::Bool(true)));

    assert!(indicator
        .requests
        .borrow()
        .contains(&("activate", IndicatorPattern::Full)));
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::IndicatorPatternChanged {
            old: None,
            new: Some(IndicatorPattern::Full)
        }
    )));
}

#[test]
fn status_request_reemits_current_state() {
    let (mut daemon, bus, _indicator, _power) = table_daemon();
    let t = Telemetry {
        voltage_mv: 3800,
        charger_mode: ChargerMode::Host,
        ..Telemetry::default()
    };
    daemon.on_sample(t).unwrap();
    bus.emitted.borrow_mut().clear();

    daemon.handle_request(InfoRequest::Status).unwrap();

    let emitted = bus.emitted.borrow();
    assert_eq!(emitted[0], Signal::ChargerConnected);
    assert_eq!(emitted[1], Signal::ChargerChargingOn);
    assert!(matches!(emitted[2], Signal::BatteryStateChanged { .. }));
}

#[test]
fn timeleft_request_prefers_time_to_empty() {
    let (mut daemon, bus, _indicator, _power) = table_daemon();
    daemon.on_sample(calibrated_sample()).unwrap();
    bus.emitted.borrow_mut().clear();

    daemon.handle_request(InfoRequest::Timeleft).unwrap();
    assert_eq!(
        bus.emitted.borrow().last(),
        Some(&Signal::BatteryTimeleft { minutes: 120 })
    );

    // With no time-to-empty, fall back to time-to-full.
    let t = Telemetry {
        time_to_empty_s: 0,
        time_to_full_s: 3600,
        ..calibrated_sample()
    };
    daemon.on_sample(t).unwrap();
    bus.emitted.borrow_mut().clear();

    daemon.handle_request(InfoRequest::Timeleft).unwrap();
    assert_eq!(
        bus.emitted.borrow().last(),
        Some(&Signal::BatteryTimeleft { minutes: 60 })
    );
}

#[test]
fn bus_failure_still_commits_the_state() {
    let (mut daemon, bus, _indicator, _power) = table_daemon();
    *bus.fail.borrow_mut() = true;

    let t = Telemetry {
        voltage_mv: 3800,
        charger_mode: ChargerMode::Host,
        ..Telemetry::default()
    };
    assert!(daemon.on_sample(t.clone()).is_err());
    assert!(daemon.state().charger_connected);

    // The failed cycle committed, so a healthy bus sees no duplicate
    // connect notification for the same telemetry.
    *bus.fail.borrow_mut() = false;
    bus.emitted.borrow_mut().clear();
    daemon.on_sample(t).unwrap();
    assert!(!bus
        .emitted
        .borrow()
        .iter()
        .any(|s| *s == Signal::ChargerConnected));
}

#[test]
fn capacity_state_change_writes_empty_string_first() {
    let sink = SharedSink::default();
    let bus = SharedBus::default();
    let indicator = SharedIndicator::default();
    let power = SharedPower::default();
    let mut daemon = Daemon::new(sink.clone(), bus, indicator, power);
    daemon.startup().unwrap();
    sink.writes.borrow_mut().clear();

    let t = Telemetry {
        voltage_mv: 3500,
        ..Telemetry::default()
    };
    daemon.on_sample(t).unwrap();

    let writes = sink.writes.borrow();
    let state_writes: Vec<_> = writes
        .iter()
        .filter(|(name, _)| *name == keys::CAPACITY_STATE)
        .collect();
    assert_eq!(
        state_writes,
        vec![
            &(keys::CAPACITY_STATE, PropertyValue::Str("".into())),
            &(keys::CAPACITY_STATE, PropertyValue::Str("low".into())),
        ]
    );
}
