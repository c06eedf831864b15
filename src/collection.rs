//! Telemetry collection from the power-supply sysfs sources.
//!
//! The collector assembles one [`Telemetry`] snapshot per poll from up to
//! three files: the fuel-gauge uevent, the gauge's raw register dump, and
//! an auxiliary battery uevent carrying design data, plus the charger mode
//! file. Every source is best-effort; a missing file degrades capability
//! but never aborts the poll.

pub mod sysfs;

use std::{fs, path::PathBuf};

use crate::constants::{
    DEFAULT_AUX_UEVENT_PATH, DEFAULT_CHARGER_MODE_PATH, DEFAULT_CHARGER_STAT_PIN_PATH,
    DEFAULT_GAUGE_REGISTERS_PATH, DEFAULT_GAUGE_UEVENT_PATH,
};
use crate::engine::telemetry::{ChargerMode, Telemetry};

/// Locations of the telemetry source files. Defaults are the usual sysfs
/// locations; tests and unusual boards point these elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub gauge_uevent: PathBuf,
    pub gauge_registers: PathBuf,
    pub aux_uevent: PathBuf,
    pub charger_mode: PathBuf,
    pub charger_stat_pin: PathBuf,
}

impl Default for SourcePaths {
    fn default() -> Self {
        SourcePaths {
            gauge_uevent: DEFAULT_GAUGE_UEVENT_PATH.into(),
            gauge_registers: DEFAULT_GAUGE_REGISTERS_PATH.into(),
            aux_uevent: DEFAULT_AUX_UEVENT_PATH.into(),
            charger_mode: DEFAULT_CHARGER_MODE_PATH.into(),
            charger_stat_pin: DEFAULT_CHARGER_STAT_PIN_PATH.into(),
        }
    }
}

/// Polls the telemetry sources and produces normalized snapshots.
#[derive(Debug)]
pub struct Collector {
    paths: SourcePaths,
    /// Design capacity from the previous poll; close re-readings are
    /// replaced by it to suppress jitter between the reporting sources.
    last_design_mah: u32,
    /// Last successfully classified charger mode; reused when the mode
    /// file cannot be read.
    last_mode: ChargerMode,
}

/// Design-capacity readings within this many mAh of the previous poll are
/// treated as the same value.
const DESIGN_JITTER_MAH: u32 = 100;

impl Collector {
    pub fn new(paths: SourcePaths) -> Self {
        Collector {
            paths,
            last_design_mah: 0,
            last_mode: ChargerMode::None,
        }
    }

    /// One-time source setup: the charger's status pin interrupt is
    /// disabled so mode changes are picked up by polling alone, and the
    /// initial charger mode is read.
    pub fn init(&mut self) {
        if let Err(err) = fs::write(&self.paths.charger_stat_pin, "0") {
            log::warn!(
                "unable to disable charger stat pin at {:?} ({err})",
                self.paths.charger_stat_pin
            );
        }
        self.refresh_charger_mode();
    }

    /// Read all sources and assemble one snapshot.
    pub fn poll(&mut self) -> Telemetry {
        let mut telemetry = Telemetry::default();

        match sysfs::read_key_values(&self.paths.gauge_uevent) {
            Ok(pairs) => {
                for (key, value) in &pairs {
                    telemetry.apply_gauge_entry(key, value);
                }
            }
            Err(err) => {
                log::warn!("unable to read {:?} ({err})", self.paths.gauge_uevent);
            }
        }

        match sysfs::read_flags_register(&self.paths.gauge_registers) {
            Ok(flags) => telemetry.flags_register = flags,
            Err(err) => {
                log::debug!("unable to read {:?} ({err})", self.paths.gauge_registers);
            }
        }

        match sysfs::read_key_values(&self.paths.aux_uevent) {
            Ok(pairs) => {
                for (key, value) in &pairs {
                    telemetry.apply_aux_entry(key, value);
                }
            }
            Err(err) => {
                log::debug!("unable to read {:?} ({err})", self.paths.aux_uevent);
            }
        }

        if telemetry.charge_design_mah > 0
            && self.last_design_mah > 0
            && telemetry.charge_design_mah.abs_diff(self.last_design_mah) < DESIGN_JITTER_MAH
        {
            telemetry.charge_design_mah = self.last_design_mah;
        }
        if telemetry.charge_design_mah > 0 {
            self.last_design_mah = telemetry.charge_design_mah;
        }

        self.refresh_charger_mode();
        telemetry.charger_mode = self.last_mode;

        telemetry
    }

    fn refresh_charger_mode(&mut self) {
        match sysfs::read_first_line(&self.paths.charger_mode) {
            Ok(line) => {
                self.last_mode = ChargerMode::classify(line.trim());
            }
            Err(err) => {
                log::debug!("unable to read {:?} ({err})", self.paths.charger_mode);
            }
        }
    }
}
