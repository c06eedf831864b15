//! The config file layout.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub(crate) flags: Option<ConfigFlags>,
    pub(crate) sources: Option<SourcesConfig>,
}

/// Workaround as per <https://github.com/serde-rs/serde/issues/1030>;
/// lets `rate` take either `"30s"` or a plain millisecond count.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StringOrNum {
    String(String),
    Num(u64),
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct ConfigFlags {
    pub(crate) rate: Option<StringOrNum>,
}

/// Telemetry source file overrides.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct SourcesConfig {
    pub(crate) gauge_uevent: Option<String>,
    pub(crate) gauge_registers: Option<String>,
    pub(crate) aux_uevent: Option<String>,
    pub(crate) charger_mode: Option<String>,
    pub(crate) charger_stat_pin: Option<String>,
}
