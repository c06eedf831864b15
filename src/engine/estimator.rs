//! Capacity estimation.
//!
//! Produces a 0-100 percentage from whatever the hardware managed to
//! report this cycle. The calibrated path rescales the gauge's 6%-100%
//! dead zone onto the full output range; the uncalibrated paths fall back
//! to voltage heuristics of decreasing fidelity.

use super::telemetry::Telemetry;
use super::{
    VOLTAGE_THRESHOLD_EMPTY, VOLTAGE_THRESHOLD_FULL, VOLTAGE_THRESHOLD_LOW,
    VOLTAGE_THRESHOLD_VERYLOW,
};

/// The gauge reports 0% while a residual charge remains; EDV1 asserts at
/// this percentage, so output is rescaled from 6%-100% to 0%-100%.
pub(crate) const DEAD_ZONE_PERCENT: i64 = 6;

/// Charging-curve lookup: upper voltage bound (mV) to output percent.
/// A charging cell's voltage is a denser, more monotonic proxy than the
/// resting-cell thresholds; anything above the last bound reads as 100.
const CHARGING_CURVE: [(u32, i64); 8] = [
    (4036, 0),
    (4089, 13),
    (4099, 25),
    (4110, 38),
    (4120, 50),
    (4134, 63),
    (4150, 75),
    (4168, 88),
];

/// Estimate the capacity percentage for one telemetry sample.
///
/// Branches are tried in order and the first viable one wins; the result
/// is always clamped to `[0, 100]`.
pub(crate) fn estimate_percent(telemetry: &Telemetry, charger_connected: bool) -> u32 {
    let percent = if let Some(p) = rescale_calibrated(telemetry) {
        p
    } else if telemetry.voltage_mv > 0 && !charger_connected {
        resting_voltage_percent(telemetry.voltage_mv)
    } else if telemetry.voltage_mv > 0 {
        charging_voltage_percent(telemetry.voltage_mv)
    } else {
        logarithmic_percent(telemetry.voltage_mv)
    };

    percent.clamp(0, 100) as u32
}

/// Dead-zone rescale against design capacity when available, otherwise
/// against last-full capacity. Requires a calibrated gauge and a non-zero
/// charge counter; integer division truncates exactly as the gauge math
/// expects, so intermediate values may dip below zero.
fn rescale_calibrated(telemetry: &Telemetry) -> Option<i64> {
    if !telemetry.is_calibrated() || telemetry.charge_now_mah == 0 {
        return None;
    }

    let base = if telemetry.charge_design_mah > 0 {
        telemetry.charge_design_mah
    } else if telemetry.charge_full_mah > 0 {
        telemetry.charge_full_mah
    } else {
        return None;
    };

    let now = i64::from(telemetry.charge_now_mah);
    let base = i64::from(base);
    Some(100 * (100 * now - DEAD_ZONE_PERCENT * base) / ((100 - DEAD_ZONE_PERCENT) * base))
}

/// A resting cell's open-circuit voltage is a rough proxy for remaining
/// energy: four fixed breakpoints spanning empty to full, expressed as
/// gauge-style percentages and then dead-zone rescaled.
fn resting_voltage_percent(voltage_mv: u32) -> i64 {
    let gauge_percent: i64 = if voltage_mv <= VOLTAGE_THRESHOLD_EMPTY {
        0
    } else if voltage_mv <= VOLTAGE_THRESHOLD_VERYLOW {
        6
    } else if voltage_mv <= VOLTAGE_THRESHOLD_LOW {
        20
    } else if voltage_mv > VOLTAGE_THRESHOLD_FULL {
        100
    } else {
        53
    };

    100 * (gauge_percent - DEAD_ZONE_PERCENT) / (100 - DEAD_ZONE_PERCENT)
}

fn charging_voltage_percent(voltage_mv: u32) -> i64 {
    for (bound_mv, percent) in CHARGING_CURVE {
        if voltage_mv <= bound_mv {
            return percent;
        }
    }
    100
}

/// Last resort when neither calibrated data nor a usable voltage branch
/// exists: a lithium cell's voltage-vs-charge curve is approximately
/// logarithmic, so invert that shape and clamp to the trustworthy band.
fn logarithmic_percent(voltage_mv: u32) -> i64 {
    let exponent = (f64::from(voltage_mv) - 3200.0) * 3.0_f64.ln() / 800.0;
    let percent = 50.0 * (exponent.exp() - 1.0);
    percent.clamp(3.0, 90.0) as i64
}
