//! Device-property registry.
//!
//! Computed values are mirrored into a string/int/bool key-value store
//! under fixed property names. The in-process [`PropertyTable`] only
//! forwards a write when the value actually changed, so callers can
//! republish the full set every poll without spamming consumers.

use std::borrow::Cow;

use hashbrown::HashMap;

use crate::utils::error::Result;

/// Property names published by the daemon.
pub mod keys {
    pub const CAPACITY_STATE: &str = "battery.charge_level.capacity_state";
    pub const CHARGE_BARS: &str = "battery.charge_level.current";
    pub const CHARGE_BARS_DESIGN: &str = "battery.charge_level.design";
    pub const CHARGE_BARS_LAST_FULL: &str = "battery.charge_level.last_full";
    pub const PERCENTAGE: &str = "battery.charge_level.percentage";
    pub const CHARGE_LEVEL_UNIT: &str = "battery.charge_level.unit";
    pub const IS_RECHARGEABLE: &str = "battery.is_rechargeable";
    pub const PRESENT: &str = "battery.present";
    pub const IS_CHARGING: &str = "battery.rechargeable.is_charging";
    pub const IS_DISCHARGING: &str = "battery.rechargeable.is_discharging";
    pub const REMAINING_TIME: &str = "battery.remaining_time";
    pub const REMAINING_TIME_PER_TIME: &str = "battery.remaining_time.calculate_per_time";
    pub const REPORTING_CURRENT: &str = "battery.reporting.current";
    pub const REPORTING_DESIGN: &str = "battery.reporting.design";
    pub const REPORTING_LAST_FULL: &str = "battery.reporting.last_full";
    pub const REPORTING_UNIT: &str = "battery.reporting.unit";
    pub const BATTERY_TYPE: &str = "battery.type";
    pub const VOLTAGE_CURRENT: &str = "battery.voltage.current";
    pub const VOLTAGE_DESIGN: &str = "battery.voltage.design";
    pub const VOLTAGE_UNIT: &str = "battery.voltage.unit";
    pub const CHARGER_CONNECTION_STATUS: &str = "charger.connection_status";
    pub const CHARGER_TYPE: &str = "charger.type";
    pub const CHARGING_STATUS: &str = "rechargeable.charging_status";
    pub const POSITIVE_RATE: &str = "rechargeable.positive_rate";
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Str(Cow<'static, str>),
    Int(i64),
    Bool(bool),
}

impl From<&'static str> for PropertyValue {
    fn from(value: &'static str) -> Self {
        PropertyValue::Str(Cow::Borrowed(value))
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(Cow::Owned(value))
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Int(i64::from(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// External collaborator that stores published properties.
pub trait PropertySink {
    fn set_property(&mut self, name: &'static str, value: PropertyValue) -> Result<()>;
}

/// In-process registry with change-only forwarding.
#[derive(Debug, Default)]
pub struct PropertyTable {
    values: HashMap<&'static str, PropertyValue>,
}

impl PropertyTable {
    pub fn new() -> Self {
        PropertyTable::default()
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }
}

impl PropertySink for PropertyTable {
    fn set_property(&mut self, name: &'static str, value: PropertyValue) -> Result<()> {
        if self.values.get(name) == Some(&value) {
            return Ok(());
        }
        log::debug!("property {name} changed, updating to {value:?}");
        self.values.insert(name, value);
        Ok(())
    }
}
