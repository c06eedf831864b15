//! The daemon cycle: telemetry in, properties/signals/indicator out.
//!
//! [`Daemon`] owns the [`EngineState`] plus the collaborator sinks and runs
//! one engine cycle per telemetry sample. Collaborator failures are logged
//! and surfaced as the per-call status, but the engine state is committed
//! regardless; a flaky bus never blocks future polls.

use crate::engine::pattern::{IndicatorController, IndicatorPattern};
use crate::engine::telemetry::{BatteryStatus, Telemetry};
use crate::engine::{self, CapacityState, EngineEvent, EngineState, BARS_MAX};
use crate::registry::{keys, PropertySink};
use crate::signals::{PowerControl, Signal, SignalBus};
use crate::utils::error::{BatmonError, Result};

/// On-demand re-emission requests from downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoRequest {
    /// Re-emit charger and charge-level state.
    Status,
    /// Emit the estimated remaining minutes.
    Timeleft,
}

/// The polling daemon. One instance per battery; the poll loop is the only
/// mutator, so cycles always run to completion without locking.
#[derive(Debug)]
pub struct Daemon<P, B, C, W> {
    properties: P,
    bus: B,
    indicator: C,
    power: W,
    state: EngineState,
    last_telemetry: Telemetry,
}

impl<P, B, C, W> Daemon<P, B, C, W>
where
    P: PropertySink,
    B: SignalBus,
    C: IndicatorController,
    W: PowerControl,
{
    pub fn new(properties: P, bus: B, indicator: C, power: W) -> Self {
        Daemon {
            properties,
            bus,
            indicator,
            power,
            state: EngineState::default(),
            last_telemetry: Telemetry::default(),
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn properties(&self) -> &P {
        &self.properties
    }

    /// Publish the static property defaults and clear any indicator
    /// pattern a previous run may have left behind. Run once, before the
    /// first poll.
    pub fn startup(&mut self) -> Result<()> {
        let mut failure = None;

        let p = &mut self.properties;
        note(&mut failure, p.set_property(keys::CAPACITY_STATE, "ok".into()));
        note(&mut failure, p.set_property(keys::CHARGE_BARS, 0_u32.into()));
        note(&mut failure, p.set_property(keys::CHARGE_BARS_DESIGN, BARS_MAX.into()));
        note(&mut failure, p.set_property(keys::CHARGE_BARS_LAST_FULL, 0_u32.into()));
        note(&mut failure, p.set_property(keys::PERCENTAGE, 0_u32.into()));
        note(&mut failure, p.set_property(keys::CHARGE_LEVEL_UNIT, "bars".into()));
        note(&mut failure, p.set_property(keys::IS_RECHARGEABLE, true.into()));
        note(&mut failure, p.set_property(keys::PRESENT, true.into()));
        note(&mut failure, p.set_property(keys::IS_CHARGING, false.into()));
        note(&mut failure, p.set_property(keys::IS_DISCHARGING, true.into()));
        note(&mut failure, p.set_property(keys::REMAINING_TIME, 0_u32.into()));
        note(&mut failure, p.set_property(keys::REMAINING_TIME_PER_TIME, false.into()));
        note(&mut failure, p.set_property(keys::REPORTING_CURRENT, 0_u32.into()));
        note(&mut failure, p.set_property(keys::REPORTING_DESIGN, 0_u32.into()));
        note(&mut failure, p.set_property(keys::REPORTING_LAST_FULL, 0_u32.into()));
        note(&mut failure, p.set_property(keys::REPORTING_UNIT, "mAh".into()));
        note(&mut failure, p.set_property(keys::BATTERY_TYPE, "internal".into()));
        note(&mut failure, p.set_property(keys::VOLTAGE_CURRENT, 0_u32.into()));
        note(&mut failure, p.set_property(keys::VOLTAGE_DESIGN, 4200_u32.into()));
        note(&mut failure, p.set_property(keys::VOLTAGE_UNIT, "mV".into()));
        note(&mut failure, p.set_property(keys::CHARGER_CONNECTION_STATUS, "disconnected".into()));
        note(&mut failure, p.set_property(keys::CHARGER_TYPE, "none".into()));
        note(&mut failure, p.set_property(keys::CHARGING_STATUS, "off".into()));
        note(&mut failure, p.set_property(keys::POSITIVE_RATE, false.into()));

        for pattern in [
            IndicatorPattern::Full,
            IndicatorPattern::Charging,
            IndicatorPattern::Boost,
        ] {
            // Best effort: the patterns are normally inactive already.
            let _ = self.indicator.deactivate(pattern);
        }

        failure.map_or(Ok(()), Err)
    }

    /// Run one poll cycle and return the events that fired.
    ///
    /// The new engine state is committed even when a collaborator fails;
    /// the first failure is returned after the commit.
    pub fn on_sample(&mut self, telemetry: Telemetry) -> Result<Vec<EngineEvent>> {
        let mut update = engine::process_sample(&self.state, &telemetry);
        let mut failure = None;

        let state_change_fired = update
            .events
            .iter()
            .any(|e| matches!(e, EngineEvent::CapacityStateChanged(_)));
        self.publish_properties(&telemetry, &update.next, state_change_fired, &mut failure);

        for event in &update.events {
            self.dispatch_event(*event, &mut failure);
        }

        if let Some((old, new)) = update
            .next
            .pattern
            .drive(update.desired_pattern, &mut self.indicator)
        {
            log::info!("indicator pattern changed: {old:?} -> {new:?}");
            update.events.push(EngineEvent::IndicatorPatternChanged { old, new });
        }

        self.state = update.next;
        self.last_telemetry = telemetry;

        match failure {
            Some(err) => Err(err),
            None => Ok(update.events),
        }
    }

    /// Handle an on-demand information request by re-emitting the current
    /// state. Never mutates the engine state.
    pub fn handle_request(&mut self, request: InfoRequest) -> Result<()> {
        match request {
            InfoRequest::Status => {
                let connected = self.state.charger_connected;
                self.bus.emit(if connected {
                    Signal::ChargerConnected
                } else {
                    Signal::ChargerDisconnected
                })?;
                if self.state.capacity_state != CapacityState::Full {
                    self.bus.emit(if connected {
                        Signal::ChargerChargingOn
                    } else {
                        Signal::ChargerChargingOff
                    })?;
                }
                self.bus.emit(Signal::BatteryStateChanged {
                    now: self.state.bars,
                    max: BARS_MAX,
                })
            }
            InfoRequest::Timeleft => {
                let seconds = if self.last_telemetry.time_to_empty_s > 0 {
                    self.last_telemetry.time_to_empty_s
                } else {
                    self.last_telemetry.time_to_full_s
                };
                self.bus.emit(Signal::BatteryTimeleft {
                    minutes: seconds / 60,
                })
            }
        }
    }

    fn publish_properties(
        &mut self, telemetry: &Telemetry, next: &EngineState, state_change_fired: bool,
        failure: &mut Option<BatmonError>,
    ) {
        let calibrated = telemetry.is_calibrated();
        let connected = next.charger_connected;
        let p = &mut self.properties;

        note(&mut *failure, p.set_property(keys::PRESENT, telemetry.present.into()));
        note(&mut *failure, p.set_property(keys::VOLTAGE_CURRENT, telemetry.voltage_mv.into()));
        if telemetry.voltage_design_mv > 0 {
            note(
                &mut *failure,
                p.set_property(keys::VOLTAGE_DESIGN, telemetry.voltage_design_mv.into()),
            );
        }
        if telemetry.charge_design_mah > 0 {
            note(
                &mut *failure,
                p.set_property(keys::REPORTING_DESIGN, telemetry.charge_design_mah.into()),
            );
        }

        note(&mut *failure, p.set_property(keys::PERCENTAGE, next.capacity_percent.into()));

        if state_change_fired {
            // Edge-triggered consumers need an empty value first so the
            // re-read fires even when the state string is unchanged.
            note(&mut *failure, p.set_property(keys::CAPACITY_STATE, String::new().into()));
            note(
                &mut *failure,
                p.set_property(keys::CAPACITY_STATE, next.capacity_state.as_str().into()),
            );
        }

        if next.capacity_state == CapacityState::Full && connected {
            note(&mut *failure, p.set_property(keys::CHARGING_STATUS, "full".into()));
            note(&mut *failure, p.set_property(keys::IS_CHARGING, true.into()));
            note(&mut *failure, p.set_property(keys::IS_DISCHARGING, true.into()));
        } else {
            note(
                &mut *failure,
                p.set_property(keys::CHARGING_STATUS, if connected { "on" } else { "off" }.into()),
            );
            note(&mut *failure, p.set_property(keys::IS_CHARGING, connected.into()));
            note(&mut *failure, p.set_property(keys::IS_DISCHARGING, (!connected).into()));
        }

        // An uncalibrated gauge has no usable charge counter; synthesize
        // one from the estimate so consumers still see a number.
        let charge_now = if !calibrated && telemetry.charge_design_mah > 0 {
            next.capacity_percent * telemetry.charge_design_mah / 100
        } else {
            telemetry.charge_now_mah
        };
        note(&mut *failure, p.set_property(keys::REPORTING_CURRENT, charge_now.into()));

        if calibrated {
            let mut charge_full = telemetry.charge_full_mah;
            if telemetry.charge_design_mah > 0 {
                charge_full = charge_full.min(telemetry.charge_design_mah);
                note(
                    &mut *failure,
                    p.set_property(
                        keys::CHARGE_BARS_LAST_FULL,
                        (BARS_MAX * charge_full / telemetry.charge_design_mah).into(),
                    ),
                );
            }
            note(&mut *failure, p.set_property(keys::REPORTING_LAST_FULL, charge_full.into()));

            match telemetry.status {
                Some(BatteryStatus::Charging) => {
                    note(
                        &mut *failure,
                        p.set_property(keys::REMAINING_TIME, telemetry.time_to_full_s.into()),
                    );
                }
                Some(BatteryStatus::Discharging) => {
                    note(
                        &mut *failure,
                        p.set_property(keys::REMAINING_TIME, telemetry.time_to_empty_s.into()),
                    );
                }
                _ => {}
            }
        }

        note(&mut *failure, p.set_property(keys::CHARGE_BARS, next.bars.into()));
        note(
            &mut *failure,
            p.set_property(
                keys::CHARGER_CONNECTION_STATUS,
                telemetry.charger_mode.connection_status().into(),
            ),
        );
        note(
            &mut *failure,
            p.set_property(keys::CHARGER_TYPE, telemetry.charger_mode.type_label().into()),
        );
    }

    fn dispatch_event(&mut self, event: EngineEvent, failure: &mut Option<BatmonError>) {
        match event {
            EngineEvent::CapacityStateChanged(state) => {
                log::info!("capacity state changed to {}", state.as_str());
                match state {
                    CapacityState::Low => note(failure, self.bus.emit(Signal::BatteryLow)),
                    CapacityState::Full => note(failure, self.bus.emit(Signal::BatteryFull)),
                    CapacityState::Empty => {
                        // Shutdown policy must keep seeing the assertion.
                        note(failure, self.power.assert_battery_empty());
                        note(failure, self.bus.emit(Signal::BatteryEmpty));
                    }
                    CapacityState::Ok => {}
                }
            }
            EngineEvent::ChargerConnected(connected) => {
                note(
                    failure,
                    self.bus.emit(if connected {
                        Signal::ChargerConnected
                    } else {
                        Signal::ChargerDisconnected
                    }),
                );
                note(failure, self.power.set_charger_state(connected));
            }
            EngineEvent::ChargingStatus(on) => {
                note(
                    failure,
                    self.bus.emit(if on {
                        Signal::ChargerChargingOn
                    } else {
                        Signal::ChargerChargingOff
                    }),
                );
            }
            EngineEvent::BarsChanged { now, max } => {
                note(failure, self.bus.emit(Signal::BatteryStateChanged { now, max }));
            }
            EngineEvent::IndicatorPatternChanged { .. } => {
                // Decided after the pattern machine runs, never by the engine.
            }
        }
    }
}

fn note(failure: &mut Option<BatmonError>, result: Result<()>) {
    if let Err(err) = result {
        log::warn!("collaborator failure: {err}");
        if failure.is_none() {
            *failure = Some(err);
        }
    }
}
