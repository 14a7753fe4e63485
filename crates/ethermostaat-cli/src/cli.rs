//! Command-line interface parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ethermostaat_core::Capability;

/// Control an ICY E-Thermostaat from the terminal
#[derive(Parser, Debug)]
#[command(name = "ethermostaat")]
#[command(version)]
pub struct Cli {
    /// Portal base URL (defaults to the config file, then https://portal.icy.nl)
    #[arg(long, global = true, env = "ETHERMOSTAAT_API_URL")]
    pub api_url: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check credentials and remember the thermostat on the account
    Pair {
        /// Portal username (prompted when omitted)
        #[arg(long)]
        username: Option<String>,
    },
    /// Read one capability
    Get {
        #[arg(long, short, value_enum, default_value_t = CapabilityArg::Target)]
        capability: CapabilityArg,
        /// Skip the cache
        #[arg(long)]
        force: bool,
    },
    /// Set the target temperature (clamped to 5-30, rounded to 0.5)
    Set {
        #[arg(allow_negative_numbers = true)]
        celsius: f64,
    },
    /// Show target and measured temperature
    Status {
        /// Skip the cache
        #[arg(long)]
        force: bool,
    },
    /// Forget the stored password and paired thermostat
    Logout,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapabilityArg {
    Target,
    Measure,
}

impl From<CapabilityArg> for Capability {
    fn from(arg: CapabilityArg) -> Self {
        match arg {
            CapabilityArg::Target => Capability::TargetTemperature,
            CapabilityArg::Measure => Capability::MeasureTemperature,
        }
    }
}
