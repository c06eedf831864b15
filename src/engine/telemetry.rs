//! Telemetry normalization.
//!
//! Raw key/value snapshots from the power-supply sources are folded into a
//! canonical [`Telemetry`] record with fixed units (mV, mA, mAh, seconds).
//! Parsing is best-effort per field; a field that fails to parse is treated
//! as absent and the documented default stands.

/// Fuel-gauge status as reported by the kernel's `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryStatus {
    Charging,
    Discharging,
    Full,
}

impl BatteryStatus {
    /// Parse a kernel status token. Anything that is not `Full` or
    /// `Charging` (e.g. `Not charging`, `Unknown`) counts as discharging.
    pub fn parse(token: &str) -> Self {
        match token {
            "Full" => BatteryStatus::Full,
            "Charging" => BatteryStatus::Charging,
            _ => BatteryStatus::Discharging,
        }
    }
}

/// Coarse vendor-reported capacity level from the kernel's
/// `capacity_level` field. Takes precedence over numeric thresholds
/// when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityLevel {
    Full,
    High,
    Normal,
    Low,
    Critical,
}

impl CapacityLevel {
    /// Parse a `capacity_level` token; unknown tokens are treated as absent.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "Full" => Some(CapacityLevel::Full),
            "High" => Some(CapacityLevel::High),
            "Normal" => Some(CapacityLevel::Normal),
            "Low" => Some(CapacityLevel::Low),
            "Critical" => Some(CapacityLevel::Critical),
            _ => None,
        }
    }
}

/// Charger mode, classified once here from the free-form mode string.
/// Downstream code matches on this enum and never on the raw string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargerMode {
    #[default]
    None,
    /// USB host port, limited current.
    Host,
    /// Dedicated wall charger.
    Dedicated,
    /// The device is powering the port rather than charging from it.
    Boost,
}

impl ChargerMode {
    /// Classify a raw mode string by substring match.
    pub fn classify(raw: &str) -> Self {
        if raw.contains("host") {
            ChargerMode::Host
        } else if raw.contains("dedicated") {
            ChargerMode::Dedicated
        } else if raw.contains("boost") {
            ChargerMode::Boost
        } else {
            ChargerMode::None
        }
    }

    /// Whether a charger is connected. Derived solely from the mode
    /// classification, never from voltage or current readings.
    pub fn is_connected(self) -> bool {
        matches!(self, ChargerMode::Host | ChargerMode::Dedicated)
    }

    /// Value for the `charger.connection_status` property.
    pub fn connection_status(self) -> &'static str {
        if self.is_connected() {
            "connected"
        } else {
            "disconnected"
        }
    }

    /// Value for the `charger.type` property.
    pub fn type_label(self) -> &'static str {
        match self {
            ChargerMode::Host => "host 500 mA",
            ChargerMode::Dedicated => "wall charger",
            ChargerMode::None | ChargerMode::Boost => "none",
        }
    }
}

/// One normalized telemetry sample, produced fresh each poll cycle.
///
/// Counters default to 0 ("not reported"); `capacity_percent_raw` uses -1
/// to distinguish "not calibrated" from an actual 0%.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telemetry {
    pub status: Option<BatteryStatus>,
    pub present: bool,
    /// Battery terminal voltage, mV.
    pub voltage_mv: u32,
    /// Design (maximum) voltage, mV.
    pub voltage_design_mv: u32,
    /// Instantaneous current, mA; negative while discharging.
    pub current_ma: i32,
    pub charge_now_mah: u32,
    pub charge_full_mah: u32,
    pub charge_design_mah: u32,
    /// Hardware-reported percentage; -1 when the gauge is uncalibrated.
    pub capacity_percent_raw: i32,
    pub capacity_level: Option<CapacityLevel>,
    /// Raw fuel-gauge flags register, when the kernel exposes it.
    pub flags_register: Option<u32>,
    pub charger_mode: ChargerMode,
    pub time_to_empty_s: u32,
    pub time_to_full_s: u32,
}

impl Default for Telemetry {
    fn default() -> Self {
        Telemetry {
            status: None,
            present: true,
            voltage_mv: 0,
            voltage_design_mv: 0,
            current_ma: 0,
            charge_now_mah: 0,
            charge_full_mah: 0,
            charge_design_mah: 0,
            capacity_percent_raw: -1,
            capacity_level: None,
            flags_register: None,
            charger_mode: ChargerMode::None,
            time_to_empty_s: 0,
            time_to_full_s: 0,
        }
    }
}

impl Telemetry {
    /// Whether the gauge reported a trustworthy percentage.
    pub fn is_calibrated(&self) -> bool {
        self.capacity_percent_raw >= 0
    }

    /// Fold one fuel-gauge uevent entry into the record.
    ///
    /// Unknown keys are ignored; malformed values leave the field at its
    /// default so one bad entry never poisons the rest of the snapshot.
    pub fn apply_gauge_entry(&mut self, key: &str, value: &str) {
        match key {
            "POWER_SUPPLY_CAPACITY" => {
                if let Some(v) = parse_int(value) {
                    self.capacity_percent_raw = v as i32;
                }
            }
            "POWER_SUPPLY_STATUS" => {
                self.status = Some(BatteryStatus::parse(value));
            }
            "POWER_SUPPLY_PRESENT" => {
                if let Some(v) = parse_int(value) {
                    self.present = v != 0;
                }
            }
            "POWER_SUPPLY_VOLTAGE_NOW" => {
                if let Some(v) = parse_micro(value) {
                    self.voltage_mv = v;
                }
            }
            "POWER_SUPPLY_CURRENT_NOW" => {
                if let Some(v) = parse_int(value) {
                    self.current_ma = (v / 1000) as i32;
                }
            }
            "POWER_SUPPLY_TIME_TO_FULL_NOW" => {
                if let Some(v) = parse_int(value) {
                    self.time_to_full_s = v.max(0) as u32;
                }
            }
            "POWER_SUPPLY_TIME_TO_EMPTY_AVG" => {
                if let Some(v) = parse_int(value) {
                    self.time_to_empty_s = v.max(0) as u32;
                }
            }
            "POWER_SUPPLY_CHARGE_FULL" => {
                if let Some(v) = parse_micro(value) {
                    self.charge_full_mah = v;
                }
            }
            "POWER_SUPPLY_CHARGE_NOW" => {
                if let Some(v) = parse_micro(value) {
                    self.charge_now_mah = v;
                }
            }
            "POWER_SUPPLY_CAPACITY_LEVEL" => {
                self.capacity_level = CapacityLevel::parse(value);
            }
            _ => {}
        }
    }

    /// Fold one auxiliary-battery uevent entry (design data) into the record.
    pub fn apply_aux_entry(&mut self, key: &str, value: &str) {
        match key {
            "POWER_SUPPLY_VOLTAGE_MAX_DESIGN" => {
                if let Some(v) = parse_micro(value) {
                    self.voltage_design_mv = v;
                }
            }
            "POWER_SUPPLY_CHARGE_FULL_DESIGN" => {
                if let Some(v) = parse_micro(value) {
                    self.charge_design_mah = v;
                }
            }
            _ => {}
        }
    }
}

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// Parse a µ-unit value and scale it down to its milli-unit.
fn parse_micro(value: &str) -> Option<u32> {
    let v = parse_int(value)? / 1000;
    u32::try_from(v).ok()
}
