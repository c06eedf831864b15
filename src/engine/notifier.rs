//! Transition notification decisions.
//!
//! Compares a freshly computed classification against the previously
//! published [`EngineState`](super::EngineState) and decides which discrete
//! events must fire this poll, exactly once per qualifying transition.

use super::pattern::IndicatorPattern;
use super::telemetry::ChargerMode;
use super::{CapacityState, EngineEvent, EngineState, BARS_MAX};

/// Discretize a percentage into 0-8 bars for simple UI indicators.
/// Equivalent to rounding `8 * percent / 100` to the nearest bar.
pub(crate) fn bars(percent: u32) -> u32 {
    (BARS_MAX * percent + 50) / 100
}

pub(crate) fn decide(
    prev: &EngineState, state: CapacityState, percent: u32, charger_connected: bool, bars: u32,
) -> Vec<EngineEvent> {
    let mut events = Vec::new();

    // Empty is always re-asserted so shutdown policy keeps seeing it; the
    // even-percent Low refresh and the drop-to-zero rule are anti-flap
    // compromises for the borderline states.
    let state_changed = state != prev.capacity_state
        || state == CapacityState::Empty
        || (state == CapacityState::Low
            && percent != prev.capacity_percent
            && percent % 2 == 0)
        || (percent == 0 && percent != prev.capacity_percent);
    if state_changed {
        events.push(EngineEvent::CapacityStateChanged(state));
    }

    if charger_connected != prev.charger_connected {
        events.push(EngineEvent::ChargerConnected(charger_connected));
        if state != CapacityState::Full {
            events.push(EngineEvent::ChargingStatus(charger_connected));
        }
    }

    if bars != prev.bars {
        events.push(EngineEvent::BarsChanged {
            now: bars,
            max: BARS_MAX,
        });
    }

    events
}

/// The indicator pattern this cycle wants showing.
pub(crate) fn desired_pattern(
    state: CapacityState, charger_connected: bool, charger_mode: ChargerMode,
) -> Option<IndicatorPattern> {
    if charger_connected {
        if state == CapacityState::Full {
            Some(IndicatorPattern::Full)
        } else {
            Some(IndicatorPattern::Charging)
        }
    } else if charger_mode == ChargerMode::Boost {
        Some(IndicatorPattern::Boost)
    } else {
        None
    }
}
