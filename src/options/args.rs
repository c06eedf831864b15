//! Argument parsing via clap.
//!
//! Note that you probably want to keep this as a single file so the build
//! script doesn't trip all over itself.

use clap::*;
use indoc::indoc;

const TEMPLATE: &str = indoc! {
    "{name} {version}

    {about}

    {usage-heading} {usage}

    {all-args}"
};

const USAGE: &str = "batmond [OPTIONS]";

/// The arguments for batmon.
#[derive(Parser, Debug)]
#[command(
    name = crate_name!(),
    version = crate_version!(),
    about = crate_description!(),
    color = ColorChoice::Auto,
    help_template = TEMPLATE,
    override_usage = USAGE,
)]
pub struct BatmonArgs {
    #[command(flatten)]
    pub general_args: GeneralArgs,

    #[command(flatten)]
    pub source_args: SourceArgs,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "General Options")]
pub struct GeneralArgs {
    #[arg(
        short = 'C',
        long,
        value_name = "PATH",
        help = "Sets the location of the config file.",
        long_help = "Sets the location of the config file. Expects a config file in the TOML format. \
                    If it doesn't exist, a default config file is created at the path."
    )]
    pub config_location: Option<String>,

    #[arg(
        short = 'r',
        long,
        value_name = "TIME",
        help = "Sets how often telemetry is polled.",
        long_help = indoc! {
            "Sets how often telemetry is polled. Takes a number in milliseconds or a
            human duration (e.g. 30s). The minimum is 1s, and the default is 30s."
        }
    )]
    pub rate: Option<String>,

    #[arg(
        long,
        help = "Runs a single poll cycle, prints the computed state, and exits.",
        long_help = "Runs a single poll cycle against the telemetry sources, prints the computed \
                    battery state to stdout, and exits without starting the poll loop."
    )]
    pub oneshot: bool,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Telemetry Sources")]
pub struct SourceArgs {
    #[arg(
        long,
        value_name = "PATH",
        help = "Overrides the fuel-gauge uevent file."
    )]
    pub gauge_uevent: Option<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Overrides the fuel-gauge register dump file."
    )]
    pub gauge_registers: Option<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Overrides the auxiliary battery uevent file carrying design data."
    )]
    pub aux_uevent: Option<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Overrides the charger mode file."
    )]
    pub charger_mode: Option<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Overrides the charger stat-pin control file."
    )]
    pub charger_stat_pin: Option<String>,
}

pub fn get_args() -> BatmonArgs {
    BatmonArgs::parse()
}
