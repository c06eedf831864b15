//! Daemon-level defaults.

pub const DEFAULT_POLL_RATE_IN_MILLISECONDS: u64 = 30_000;
pub const MINIMUM_POLL_RATE_IN_MILLISECONDS: u64 = 1_000;

/// How often the main loop wakes up to check for termination.
pub const TICK_RATE_IN_MILLISECONDS: u64 = 250;

pub const DEFAULT_CONFIG_FILE_PATH: &str = "batmon/batmon.toml";

// Default telemetry source locations: the bq27200 fuel gauge, the rx51
// battery node carrying design data, and the bq24150a charger.
pub const DEFAULT_GAUGE_UEVENT_PATH: &str = "/sys/class/power_supply/bq27200-0/uevent";
pub const DEFAULT_GAUGE_REGISTERS_PATH: &str = "/sys/class/power_supply/bq27200-0/registers";
pub const DEFAULT_AUX_UEVENT_PATH: &str = "/sys/class/power_supply/rx51-battery/uevent";
pub const DEFAULT_CHARGER_MODE_PATH: &str = "/sys/class/power_supply/bq24150a-0/mode";
pub const DEFAULT_CHARGER_STAT_PIN_PATH: &str =
    "/sys/class/power_supply/bq24150a-0/stat_pin_enable";

pub const CONFIG_TEXT: &str = r#"# This is a default config file for batmon. All of the settings are commented
# out; remove the # in front of a setting to enable it.

[flags]
# How often telemetry is polled. Accepts a human time (e.g. "30s") or a number
# of milliseconds.
#rate = "30s"

[sources]
# Overrides for the telemetry source files. The defaults target the usual
# sysfs locations; point these at copies to replay captured telemetry.
#gauge_uevent = "/sys/class/power_supply/bq27200-0/uevent"
#gauge_registers = "/sys/class/power_supply/bq27200-0/registers"
#aux_uevent = "/sys/class/power_supply/rx51-battery/uevent"
#charger_mode = "/sys/class/power_supply/bq24150a-0/mode"
#charger_stat_pin = "/sys/class/power_supply/bq24150a-0/stat_pin_enable"
"#;
