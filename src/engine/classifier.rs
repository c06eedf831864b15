//! Capacity-state classification.
//!
//! Maps one telemetry sample onto Empty/Low/Ok/Full by arbitrating across
//! the available sources in fixed priority: vendor capacity level, then
//! gauge flag bits, then charge-counter thresholds, then voltage
//! thresholds. Overrides for a reported-full gauge and a connected charger
//! are applied last.

use super::telemetry::{BatteryStatus, CapacityLevel, Telemetry};
use super::{
    CapacityState, CHARGE_THRESHOLD_EMPTY, CHARGE_THRESHOLD_LOW, CHARGE_THRESHOLD_VERYLOW,
    CAPACITY_THRESHOLD_FULL, VOLTAGE_THRESHOLD_EMPTY, VOLTAGE_THRESHOLD_FULL,
    VOLTAGE_THRESHOLD_LOW, VOLTAGE_THRESHOLD_VERYLOW,
};

/// Full-charge flag bit.
const FLAG_FC: u32 = 0x20;
/// End-of-discharge, final severity: the cell is effectively empty.
const FLAG_EDVF: u32 = 0x01;
/// End-of-discharge, first warning: very low but not yet empty.
const FLAG_EDV1: u32 = 0x02;

/// Classification result. `very_low` marks the band between Low and Empty
/// where the displayed percentage is forced to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Classification {
    pub state: CapacityState,
    pub very_low: bool,
}

pub(crate) fn classify(telemetry: &Telemetry, charger_connected: bool) -> Classification {
    let calibrated = telemetry.is_calibrated();
    let mut very_low = false;

    let mut state = if let Some(level) = telemetry.capacity_level {
        match level {
            CapacityLevel::Full | CapacityLevel::High => CapacityState::Full,
            CapacityLevel::Normal => below_low_threshold(telemetry, calibrated),
            CapacityLevel::Low => {
                very_low = true;
                CapacityState::Low
            }
            CapacityLevel::Critical => CapacityState::Empty,
        }
    } else if let Some(flags) = telemetry.flags_register {
        if flags & FLAG_FC != 0 {
            CapacityState::Full
        } else if flags & FLAG_EDVF != 0 {
            CapacityState::Empty
        } else if flags & FLAG_EDV1 != 0 {
            very_low = true;
            CapacityState::Low
        } else {
            below_low_threshold(telemetry, calibrated)
        }
    } else if calibrated {
        if telemetry.charge_now_mah <= CHARGE_THRESHOLD_EMPTY {
            CapacityState::Empty
        } else if telemetry.charge_now_mah <= CHARGE_THRESHOLD_VERYLOW {
            very_low = true;
            CapacityState::Low
        } else if telemetry.charge_now_mah <= CHARGE_THRESHOLD_LOW {
            CapacityState::Low
        } else if telemetry.capacity_percent_raw > CAPACITY_THRESHOLD_FULL {
            CapacityState::Full
        } else {
            CapacityState::Ok
        }
    } else if telemetry.voltage_mv <= VOLTAGE_THRESHOLD_EMPTY {
        CapacityState::Empty
    } else if telemetry.voltage_mv <= VOLTAGE_THRESHOLD_VERYLOW {
        very_low = true;
        CapacityState::Low
    } else if telemetry.voltage_mv <= VOLTAGE_THRESHOLD_LOW {
        CapacityState::Low
    } else if telemetry.voltage_mv > VOLTAGE_THRESHOLD_FULL {
        CapacityState::Full
    } else {
        CapacityState::Ok
    };

    if telemetry.status == Some(BatteryStatus::Full) {
        state = CapacityState::Full;
    }

    // A charging battery is never reported as critically low.
    if matches!(state, CapacityState::Low | CapacityState::Empty) && charger_connected {
        state = CapacityState::Ok;
    }

    Classification { state, very_low }
}

/// The low/ok split used by the capacity-level and flag branches:
/// charge-based when calibrated, voltage-based otherwise.
fn below_low_threshold(telemetry: &Telemetry, calibrated: bool) -> CapacityState {
    if calibrated && telemetry.charge_now_mah <= CHARGE_THRESHOLD_LOW {
        CapacityState::Low
    } else if !calibrated && telemetry.voltage_mv <= VOLTAGE_THRESHOLD_LOW {
        CapacityState::Low
    } else {
        CapacityState::Ok
    }
}
