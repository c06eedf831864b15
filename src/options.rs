//! How the daemon's options are set up: CLI arguments layered over the
//! config file, with documented defaults underneath.

pub mod args;
pub mod config;
mod error;

use std::{
    fs,
    io::Write,
    path::PathBuf,
    time::Duration,
};

pub use config::Config;
pub use error::{OptionError, OptionResult};

use args::BatmonArgs;
use config::StringOrNum;

use crate::collection::SourcePaths;
use crate::constants::{
    CONFIG_TEXT, DEFAULT_CONFIG_FILE_PATH, DEFAULT_POLL_RATE_IN_MILLISECONDS,
    MINIMUM_POLL_RATE_IN_MILLISECONDS,
};

/// Fully resolved daemon settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonSettings {
    pub poll_rate: Duration,
    pub sources: SourcePaths,
    pub oneshot: bool,
}

pub fn init_settings(args: &BatmonArgs, config: &Config) -> OptionResult<DaemonSettings> {
    Ok(DaemonSettings {
        poll_rate: get_poll_rate(args, config)?,
        sources: get_source_paths(args, config),
        oneshot: args.general_args.oneshot,
    })
}

/// Where the config file lives: an explicit location, or the platform
/// config directory.
pub fn get_config_path(config_location: Option<&str>) -> Option<PathBuf> {
    if let Some(conf_loc) = config_location {
        Some(PathBuf::from(conf_loc))
    } else {
        dirs::config_dir().map(|mut path| {
            path.push(DEFAULT_CONFIG_FILE_PATH);
            path
        })
    }
}

/// Read the config file, creating a documented default one if it does not
/// exist yet.
pub fn create_or_get_config(config_path: &Option<PathBuf>) -> OptionResult<Config> {
    if let Some(path) = config_path {
        if let Ok(config_string) = fs::read_to_string(path) {
            Ok(toml_edit::de::from_str(config_string.as_str())?)
        } else {
            // Config file DNE...
            if let Some(parent_path) = path.parent() {
                fs::create_dir_all(parent_path)?;
            }
            fs::File::create(path)?.write_all(CONFIG_TEXT.as_bytes())?;
            Ok(Config::default())
        }
    } else {
        // Don't write, the config path was somehow None...
        Ok(Config::default())
    }
}

fn get_poll_rate(args: &BatmonArgs, config: &Config) -> OptionResult<Duration> {
    let rate_ms = if let Some(rate) = &args.general_args.rate {
        try_parse_ms(rate).map_err(|()| OptionError::invalid_arg_value("rate"))?
    } else if let Some(rate) = config.flags.as_ref().and_then(|flags| flags.rate.as_ref()) {
        match rate {
            StringOrNum::String(s) => {
                try_parse_ms(s).map_err(|()| OptionError::invalid_config_value("rate"))?
            }
            StringOrNum::Num(n) => *n,
        }
    } else {
        DEFAULT_POLL_RATE_IN_MILLISECONDS
    };

    if rate_ms < MINIMUM_POLL_RATE_IN_MILLISECONDS {
        return Err(OptionError::arg(format!(
            "'--rate' must be greater than {MINIMUM_POLL_RATE_IN_MILLISECONDS} milliseconds."
        )));
    }

    Ok(Duration::from_millis(rate_ms))
}

/// Parse a string value to milliseconds: a human duration (e.g. `30s`), or
/// a plain millisecond count.
fn try_parse_ms(s: &str) -> Result<u64, ()> {
    if let Ok(duration) = humantime::parse_duration(s) {
        Ok(duration.as_millis() as u64)
    } else if let Ok(ms) = s.parse::<u64>() {
        Ok(ms)
    } else {
        Err(())
    }
}

fn get_source_paths(args: &BatmonArgs, config: &Config) -> SourcePaths {
    let mut paths = SourcePaths::default();

    if let Some(sources) = &config.sources {
        if let Some(path) = &sources.gauge_uevent {
            paths.gauge_uevent = path.into();
        }
        if let Some(path) = &sources.gauge_registers {
            paths.gauge_registers = path.into();
        }
        if let Some(path) = &sources.aux_uevent {
            paths.aux_uevent = path.into();
        }
        if let Some(path) = &sources.charger_mode {
            paths.charger_mode = path.into();
        }
        if let Some(path) = &sources.charger_stat_pin {
            paths.charger_stat_pin = path.into();
        }
    }

    // Arguments beat the config file.
    let sources = &args.source_args;
    if let Some(path) = &sources.gauge_uevent {
        paths.gauge_uevent = path.into();
    }
    if let Some(path) = &sources.gauge_registers {
        paths.gauge_registers = path.into();
    }
    if let Some(path) = &sources.aux_uevent {
        paths.aux_uevent = path.into();
    }
    if let Some(path) = &sources.charger_mode {
        paths.charger_mode = path.into();
    }
    if let Some(path) = &sources.charger_stat_pin {
        paths.charger_stat_pin = path.into();
    }

    paths
}
