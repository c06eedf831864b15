//! The battery state-estimation engine.
//!
//! Pure decision core: one call per poll cycle takes the previous
//! [`EngineState`] and a fresh [`Telemetry`](telemetry::Telemetry) sample,
//! and returns the next state plus the ordered list of notification events
//! that must fire. No I/O happens here; the caller owns persistence,
//! scheduling, and every collaborator.

pub mod classifier;
pub mod estimator;
pub mod notifier;
pub mod pattern;
pub mod telemetry;

use pattern::{IndicatorPattern, PatternState};
use telemetry::Telemetry;

/// Published percentage above which a calibrated battery reads as full.
pub(crate) const CAPACITY_THRESHOLD_FULL: i32 = 95;

/// Charge-counter thresholds, mAh.
pub(crate) const CHARGE_THRESHOLD_LOW: u32 = 200;
pub(crate) const CHARGE_THRESHOLD_VERYLOW: u32 = 80;
pub(crate) const CHARGE_THRESHOLD_EMPTY: u32 = 20;

/// Voltage thresholds for uncalibrated estimation, mV.
pub(crate) const VOLTAGE_THRESHOLD_FULL: u32 = 4050;
pub(crate) const VOLTAGE_THRESHOLD_LOW: u32 = 3580;
pub(crate) const VOLTAGE_THRESHOLD_VERYLOW: u32 = 3248;
pub(crate) const VOLTAGE_THRESHOLD_EMPTY: u32 = 3000;

/// Number of charge bars shown by simple UI indicators.
pub const BARS_MAX: u32 = 8;

/// Coarse classification of remaining charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapacityState {
    Empty,
    Low,
    #[default]
    Ok,
    Full,
}

impl CapacityState {
    /// Value for the `battery.charge_level.capacity_state` property.
    pub fn as_str(self) -> &'static str {
        match self {
            CapacityState::Empty => "empty",
            CapacityState::Low => "low",
            CapacityState::Ok => "ok",
            CapacityState::Full => "full",
        }
    }
}

/// Last-published engine outputs, fed back into the next poll. Created
/// once at startup and owned by the polling loop for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineState {
    pub capacity_state: CapacityState,
    /// Last published percentage, always within `[0, 100]`.
    pub capacity_percent: u32,
    pub charger_connected: bool,
    /// Last published 0-8 bar level.
    pub bars: u32,
    /// Indicator pattern machine; driven by the caller, not by
    /// [`process_sample`].
    pub pattern: PatternState,
}

/// A discrete notification decided by the engine, in firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    CapacityStateChanged(CapacityState),
    ChargerConnected(bool),
    ChargingStatus(bool),
    BarsChanged {
        now: u32,
        max: u32,
    },
    IndicatorPatternChanged {
        old: Option<IndicatorPattern>,
        new: Option<IndicatorPattern>,
    },
}

/// Result of one engine cycle: the state to commit, the events to fire,
/// and the indicator pattern the cycle wants showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub next: EngineState,
    pub events: Vec<EngineEvent>,
    pub desired_pattern: Option<IndicatorPattern>,
}

/// Run one poll cycle of the estimation engine.
///
/// The returned [`EngineState`] must be committed by the caller after all
/// events for this poll have been dispatched; one atomic commit per poll,
/// not per event.
pub fn process_sample(prev: &EngineState, telemetry: &Telemetry) -> Update {
    let charger_connected = telemetry.charger_mode.is_connected();

    let mut percent = estimator::estimate_percent(telemetry, charger_connected);
    let classification = classifier::classify(telemetry, charger_connected);
    let state = classification.state;

    // Display consistency: an uncalibrated battery classified as full
    // shows 100%, and the very-low band always shows 0%.
    if state == CapacityState::Full && !telemetry.is_calibrated() {
        percent = 100;
    }
    if classification.very_low {
        percent = 0;
    }

    let bars = notifier::bars(percent);
    let events = notifier::decide(prev, state, percent, charger_connected, bars);
    let desired_pattern = notifier::desired_pattern(state, charger_connected, telemetry.charger_mode);

    Update {
        next: EngineState {
            capacity_state: state,
            capacity_percent: percent,
            charger_connected,
            bars,
            pattern: prev.pattern,
        },
        events,
        desired_pattern,
    }
}
