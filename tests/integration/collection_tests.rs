//! Telemetry collection tests, run against real files in a temp dir.

use std::{fs, path::Path};

use batmon::collection::{Collector, SourcePaths};
use batmon::engine::telemetry::{BatteryStatus, CapacityLevel, ChargerMode};
use tempfile::TempDir;

fn paths_in(dir: &Path) -> SourcePaths {
    SourcePaths {
        gauge_uevent: dir.join("uevent"),
        gauge_registers: dir.join("registers"),
        aux_uevent: dir.join("aux_uevent"),
        charger_mode: dir.join("mode"),
        charger_stat_pin: dir.join("stat_pin_enable"),
    }
}

const GAUGE_UEVENT: &str = "\
POWER_SUPPLY_NAME=bq27200-0
POWER_SUPPLY_STATUS=Discharging
POWER_SUPPLY_PRESENT=1
POWER_SUPPLY_VOLTAGE_NOW=3868000
POWER_SUPPLY_CURRENT_NOW=-235000
POWER_SUPPLY_CAPACITY=53
POWER_SUPPLY_CHARGE_NOW=682000
POWER_SUPPLY_CHARGE_FULL=1275000
POWER_SUPPLY_TIME_TO_EMPTY_AVG=7200
POWER_SUPPLY_CAPACITY_LEVEL=Normal
";

#[test]
fn full_snapshot_is_normalized() {
    let tmp = TempDir::new().unwrap();
    let paths = paths_in(tmp.path());

    fs::write(&paths.gauge_uevent, GAUGE_UEVENT).unwrap();
    fs::write(&paths.gauge_registers, "0x00=0x7f\n0x0a=0x02\n").unwrap();
    fs::write(
        &paths.aux_uevent,
        "POWER_SUPPLY_VOLTAGE_MAX_DESIGN=4200000\nPOWER_SUPPLY_CHARGE_FULL_DESIGN=1320000\n",
    )
    .unwrap();
    fs::write(&paths.charger_mode, "host 500 mA\n").unwrap();

    let mut collector = Collector::new(paths);
    let t = collector.poll();

    assert_eq!(t.status, Some(BatteryStatus::Discharging));
    assert!(t.present);
    assert_eq!(t.voltage_mv, 3868);
    assert_eq!(t.current_ma, -235);
    assert_eq!(t.capacity_percent_raw, 53);
    assert_eq!(t.charge_now_mah, 682);
    assert_eq!(t.charge_full_mah, 1275);
    assert_eq!(t.charge_design_mah, 1320);
    assert_eq!(t.voltage_design_mv, 4200);
    assert_eq!(t.time_to_empty_s, 7200);
    assert_eq!(t.capacity_level, Some(CapacityLevel::Normal));
    assert_eq!(t.flags_register, Some(0x02));
    assert_eq!(t.charger_mode, ChargerMode::Host);
    assert!(t.is_calibrated());
}

#[test]
fn malformed_fields_do_not_poison_the_snapshot() {
    let tmp = TempDir::new().unwrap();
    let paths = paths_in(tmp.path());

    fs::write(
        &paths.gauge_uevent,
        "POWER_SUPPLY_VOLTAGE_NOW=notanumber\nPOWER_SUPPLY_CHARGE_NOW=682000\n",
    )
    .unwrap();

    let mut collector = Collector::new(paths);
    let t = collector.poll();

    assert_eq!(t.voltage_mv, 0);
    assert_eq!(t.charge_now_mah, 682);
}

#[test]
fn missing_sources_degrade_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let mut collector = Collector::new(paths_in(tmp.path()));

    let t = collector.poll();

    assert!(!t.is_calibrated());
    assert_eq!(t.flags_register, None);
    assert_eq!(t.charger_mode, ChargerMode::None);
    assert_eq!(t.voltage_mv, 0);
}

#[test]
fn close_design_readings_are_retained() {
    let tmp = TempDir::new().unwrap();
    let paths = paths_in(tmp.path());
    let mut collector = Collector::new(paths.clone());

    fs::write(
        &paths.aux_uevent,
        "POWER_SUPPLY_CHARGE_FULL_DESIGN=1320000\n",
    )
    .unwrap();
    assert_eq!(collector.poll().charge_design_mah, 1320);

    // 70 mAh of jitter: the previous reading stands.
    fs::write(
        &paths.aux_uevent,
        "POWER_SUPPLY_CHARGE_FULL_DESIGN=1250000\n",
    )
    .unwrap();
    assert_eq!(collector.poll().charge_design_mah, 1320);

    // A genuinely different battery is picked up.
    fs::write(
        &paths.aux_uevent,
        "POWER_SUPPLY_CHARGE_FULL_DESIGN=2000000\n",
    )
    .unwrap();
    assert_eq!(collector.poll().charge_design_mah, 2000);
}

#[test]
fn charger_mode_is_retained_when_unreadable() {
    let tmp = TempDir::new().unwrap();
    let paths = paths_in(tmp.path());
    let mut collector = Collector::new(paths.clone());

    fs::write(&paths.charger_mode, "dedicated\n").unwrap();
    assert_eq!(collector.poll().charger_mode, ChargerMode::Dedicated);

    fs::remove_file(&paths.charger_mode).unwrap();
    assert_eq!(collector.poll().charger_mode, ChargerMode::Dedicated);
}

#[test]
fn init_disables_the_charger_stat_pin() {
    let tmp = TempDir::new().unwrap();
    let paths = paths_in(tmp.path());
    let mut collector = Collector::new(paths.clone());

    collector.init();

    assert_eq!(fs::read_to_string(&paths.charger_stat_pin).unwrap(), "0");
}
